// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! The central dispatch hub for inter-subsystem communication.
//!
//! The [`MessageBus`] owns eight dispatch tables covering six channel
//! styles:
//!
//! | Channel | Key | Bindings | Dispatch |
//! |---|---|---|---|
//! | event | name | many, registration order | [`broadcast`](MessageBus::broadcast) / [`broadcast_by_name`](MessageBus::broadcast_by_name) |
//! | event creator | name | one, last wins | resolved by `broadcast_by_name` |
//! | query | type | one, last wins | [`query`](MessageBus::query) |
//! | request | type | one, last wins | [`request`](MessageBus::request) |
//! | create | type | one, last wins | [`create`](MessageBus::create) |
//! | state change | type | one, last wins | [`set_state`](MessageBus::set_state) |
//! | special event | name | many, registration order | [`broadcast_special`](MessageBus::broadcast_special) |
//! | special request | name | one, last wins | [`special_request`](MessageBus::special_request) |
//!
//! Type-keyed tables use [`TypeId`] as their token: stable for the life of
//! the process and distinct per type, so a registration under `T` can only
//! be resolved by a call site naming `T`.
//!
//! Dispatch is synchronous and re-entrant. Fan-out iterates over a snapshot
//! of the handler sequence taken at the start of the broadcast, so a
//! handler may register new handlers (they take effect on the next
//! broadcast) or broadcast further events (they recurse and complete before
//! the outer fan-out resumes). A handler that returns an error is traced at
//! warning severity and skipped; its peers still run.

use crate::event::{EntityId, Event, EventArgs};
use std::any::{Any, TypeId};
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

type EventHandlerFn = Rc<dyn Fn(&dyn Event) -> anyhow::Result<()>>;
type EventCreatorFn = Rc<dyn Fn(&EventArgs) -> anyhow::Result<Box<dyn Event>>>;
type QueryFn = Rc<dyn Fn(EntityId) -> bool>;
type CreateFn = Rc<dyn Fn(&str, EntityId)>;
type StateChangeFn = Rc<dyn Fn(EntityId, bool)>;
type SpecialEventFn = Rc<dyn Fn(EntityId) -> anyhow::Result<()>>;
type SpecialRequestFn = Rc<dyn Fn(&str) -> Option<EntityId>>;

/// The typed resolver stored in the request table for a concrete `T`.
///
/// The table erases it behind `Box<dyn Any>`; [`MessageBus::request`]
/// recovers it by downcasting back to this exact type.
type RequestFn<T> = Rc<dyn Fn(EntityId) -> Option<Rc<T>>>;

/// Central, synchronous dispatch across the engine's six channel styles.
///
/// The bus lives on the engine thread and is shared as `Rc<MessageBus>`.
/// Interior mutability keeps registration available from inside handlers;
/// every table is released before any caller-supplied code runs.
#[derive(Default)]
pub struct MessageBus {
    event_handlers: RefCell<HashMap<String, Vec<EventHandlerFn>>>,
    event_creators: RefCell<HashMap<String, EventCreatorFn>>,
    query_handlers: RefCell<HashMap<TypeId, QueryFn>>,
    request_handlers: RefCell<HashMap<TypeId, Box<dyn Any>>>,
    create_handlers: RefCell<HashMap<TypeId, CreateFn>>,
    state_change_handlers: RefCell<HashMap<TypeId, StateChangeFn>>,
    special_event_handlers: RefCell<HashMap<String, Vec<SpecialEventFn>>>,
    special_request_handlers: RefCell<HashMap<String, SpecialRequestFn>>,
}

impl MessageBus {
    /// Creates a bus with empty dispatch tables.
    #[must_use]
    pub fn new() -> Self {
        log::info!("MessageBus initialized.");
        Self::default()
    }

    /// Registers `handler` for the named event channel.
    ///
    /// Handlers are appended, never deduplicated: registering the same
    /// closure twice means it runs twice per broadcast. Invocation order is
    /// strictly registration order.
    pub fn register_event_handler(
        &self,
        name: impl Into<String>,
        handler: impl Fn(&dyn Event) -> anyhow::Result<()> + 'static,
    ) {
        self.event_handlers
            .borrow_mut()
            .entry(name.into())
            .or_default()
            .push(Rc::new(handler));
    }

    /// Registers the factory that builds the event payload for
    /// [`broadcast_by_name`](Self::broadcast_by_name).
    ///
    /// A channel has at most one creator; a second registration under the
    /// same name silently replaces the first.
    pub fn register_event_creator(
        &self,
        name: impl Into<String>,
        creator: impl Fn(&EventArgs) -> anyhow::Result<Box<dyn Event>> + 'static,
    ) {
        self.event_creators
            .borrow_mut()
            .insert(name.into(), Rc::new(creator));
    }

    /// Registers the predicate answering "does a `T` exist for this id?".
    ///
    /// Replaces any previous predicate for `T`.
    pub fn register_query<T: 'static>(&self, predicate: impl Fn(EntityId) -> bool + 'static) {
        self.query_handlers
            .borrow_mut()
            .insert(TypeId::of::<T>(), Rc::new(predicate));
    }

    /// Registers the resolver that hands out the `T` associated with an id.
    ///
    /// Replaces any previous resolver for `T`.
    pub fn register_request<T: 'static>(
        &self,
        resolver: impl Fn(EntityId) -> Option<Rc<T>> + 'static,
    ) {
        let resolver: RequestFn<T> = Rc::new(resolver);
        self.request_handlers
            .borrow_mut()
            .insert(TypeId::of::<T>(), Box::new(resolver));
    }

    /// Registers the constructor invoked by [`create`](Self::create) for `T`.
    ///
    /// Replaces any previous constructor for `T`.
    pub fn register_create<T: 'static>(&self, constructor: impl Fn(&str, EntityId) + 'static) {
        self.create_handlers
            .borrow_mut()
            .insert(TypeId::of::<T>(), Rc::new(constructor));
    }

    /// Registers the mutator that activates or deactivates the `T` for an id.
    ///
    /// Replaces any previous mutator for `T`.
    pub fn register_state_change<T: 'static>(&self, mutator: impl Fn(EntityId, bool) + 'static) {
        self.state_change_handlers
            .borrow_mut()
            .insert(TypeId::of::<T>(), Rc::new(mutator));
    }

    /// Registers `handler` on the id-scoped special event channel.
    ///
    /// Like the named event channel, registrations accumulate and fan out
    /// in registration order.
    pub fn register_special_event_handler(
        &self,
        name: impl Into<String>,
        handler: impl Fn(EntityId) -> anyhow::Result<()> + 'static,
    ) {
        self.special_event_handlers
            .borrow_mut()
            .entry(name.into())
            .or_default()
            .push(Rc::new(handler));
    }

    /// Registers the resolver for a named special request.
    ///
    /// Replaces any previous resolver for `name`.
    pub fn register_special_request(
        &self,
        name: impl Into<String>,
        resolver: impl Fn(&str) -> Option<EntityId> + 'static,
    ) {
        self.special_request_handlers
            .borrow_mut()
            .insert(name.into(), Rc::new(resolver));
    }

    /// Builds the event for `name` from `args` via its registered creator,
    /// then fans it out to every handler in registration order.
    ///
    /// A missing creator, or a creator that fails, aborts the broadcast
    /// before any handler runs; both are traced at error severity. The
    /// constructed event is owned by the bus and dropped after the last
    /// handler returns.
    pub fn broadcast_by_name(&self, name: &str, args: EventArgs) {
        let creator = self.event_creators.borrow().get(name).cloned();
        let Some(creator) = creator else {
            log::error!("no event creator registered for \"{name}\"");
            return;
        };
        let event = match creator(&args) {
            Ok(event) => event,
            Err(e) => {
                log::error!("event creator for \"{name}\" failed: {e}");
                return;
            }
        };
        self.fan_out(name, event.as_ref());
    }

    /// Fans `event` out to every handler registered for `name`, in
    /// registration order.
    ///
    /// The caller surrenders ownership; the bus drops the event after the
    /// last handler returns, whether or not any handler failed.
    pub fn broadcast(&self, name: &str, event: Box<dyn Event>) {
        self.fan_out(name, event.as_ref());
    }

    /// Fans an id out to every special event handler registered for `name`.
    pub fn broadcast_special(&self, name: &str, id: EntityId) {
        let snapshot: Vec<SpecialEventFn> = self
            .special_event_handlers
            .borrow()
            .get(name)
            .map(|handlers| handlers.to_vec())
            .unwrap_or_default();
        for handler in snapshot {
            if let Err(e) = handler(id) {
                log::warn!("special event handler for \"{name}\" failed: {e}");
            }
        }
    }

    /// Asks the registered predicate whether a `T` exists for `id`.
    ///
    /// Returns `false` when no predicate is registered for `T`.
    #[must_use]
    pub fn query<T: 'static>(&self, id: EntityId) -> bool {
        let predicate = self.query_handlers.borrow().get(&TypeId::of::<T>()).cloned();
        match predicate {
            Some(predicate) => predicate(id),
            None => {
                log::warn!(
                    "no query handler registered for {}",
                    std::any::type_name::<T>()
                );
                false
            }
        }
    }

    /// Resolves the `T` associated with `id` via the registered resolver.
    ///
    /// Returns `None` when no resolver is registered for `T`, when the
    /// stored binding cannot be recovered as `T`'s, or when the resolver
    /// itself has nothing for `id`.
    #[must_use]
    pub fn request<T: 'static>(&self, id: EntityId) -> Option<Rc<T>> {
        let resolver = {
            let handlers = self.request_handlers.borrow();
            let Some(entry) = handlers.get(&TypeId::of::<T>()) else {
                log::warn!(
                    "no request handler registered for {}",
                    std::any::type_name::<T>()
                );
                return None;
            };
            let Some(resolver) = entry.downcast_ref::<RequestFn<T>>() else {
                log::warn!(
                    "request binding for {} has an unexpected signature",
                    std::any::type_name::<T>()
                );
                return None;
            };
            Rc::clone(resolver)
        };
        resolver(id)
    }

    /// Asks the registered constructor to create a `T` from `archetype`
    /// under `id`.
    ///
    /// A missing constructor is a traced no-op.
    pub fn create<T: 'static>(&self, archetype: &str, id: EntityId) {
        let constructor = self
            .create_handlers
            .borrow()
            .get(&TypeId::of::<T>())
            .cloned();
        match constructor {
            Some(constructor) => constructor(archetype, id),
            None => log::warn!(
                "no create handler registered for {}",
                std::any::type_name::<T>()
            ),
        }
    }

    /// Activates (`true`) or deactivates (`false`) the `T` associated with
    /// `id`.
    ///
    /// A missing mutator is a traced no-op.
    pub fn set_state<T: 'static>(&self, id: EntityId, active: bool) {
        let mutator = self
            .state_change_handlers
            .borrow()
            .get(&TypeId::of::<T>())
            .cloned();
        match mutator {
            Some(mutator) => mutator(id, active),
            None => log::warn!(
                "no state change handler registered for {}",
                std::any::type_name::<T>()
            ),
        }
    }

    /// Resolves a named special request, typically "the id of the first
    /// entity called `arg`".
    ///
    /// Returns `None` when no resolver is registered for `name`.
    #[must_use]
    pub fn special_request(&self, name: &str, arg: &str) -> Option<EntityId> {
        let resolver = self.special_request_handlers.borrow().get(name).cloned();
        match resolver {
            Some(resolver) => resolver(arg),
            None => {
                log::warn!("no special request resolver registered for \"{name}\"");
                None
            }
        }
    }

    /// Empties every dispatch table.
    pub fn clear(&self) {
        self.event_handlers.borrow_mut().clear();
        self.event_creators.borrow_mut().clear();
        self.query_handlers.borrow_mut().clear();
        self.request_handlers.borrow_mut().clear();
        self.create_handlers.borrow_mut().clear();
        self.state_change_handlers.borrow_mut().clear();
        self.special_event_handlers.borrow_mut().clear();
        self.special_request_handlers.borrow_mut().clear();
    }

    /// Fan-out core shared by both broadcast entry points.
    ///
    /// Iterates over a snapshot of the handler sequence, so registrations
    /// made by a handler take effect on the next broadcast rather than the
    /// one in flight.
    fn fan_out(&self, name: &str, event: &dyn Event) {
        let snapshot: Vec<EventHandlerFn> = self
            .event_handlers
            .borrow()
            .get(name)
            .map(|handlers| handlers.to_vec())
            .unwrap_or_default();
        for handler in snapshot {
            if let Err(e) = handler(event) {
                log::warn!("event handler for \"{name}\" failed: {e}");
            }
        }
    }
}

impl std::fmt::Debug for MessageBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MessageBus")
            .field("event_channels", &self.event_handlers.borrow().len())
            .field("event_creators", &self.event_creators.borrow().len())
            .field("queries", &self.query_handlers.borrow().len())
            .field("requests", &self.request_handlers.borrow().len())
            .field("creates", &self.create_handlers.borrow().len())
            .field("state_changes", &self.state_change_handlers.borrow().len())
            .field(
                "special_channels",
                &self.special_event_handlers.borrow().len(),
            )
            .field(
                "special_requests",
                &self.special_request_handlers.borrow().len(),
            )
            .finish()
    }
}
