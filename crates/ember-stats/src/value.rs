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

//! The tagged value a single statistic carries.
//!
//! A stat is an integer, a float or a text, and its tag is part of its
//! identity: there is no implicit cross-variant arithmetic. Addition is
//! defined for int+int and float+float only; every other pairing degrades
//! to a copy of the left operand. Ordering likewise only exists between
//! values of the same tag.

use serde_json::Value;
use std::cmp::Ordering;

/// A single statistic's value.
#[derive(Debug, Clone, PartialEq)]
pub enum StatValue {
    /// A whole-number counter (kills, levels, games played).
    Int(i64),
    /// A fractional measure (time alive, best time).
    Float(f64),
    /// Free-form text (player name, last cause of death).
    Text(String),
}

impl StatValue {
    /// Adds `rhs` to this value where the tags allow it.
    ///
    /// `Int + Int` and `Float + Float` add; any other pairing returns a
    /// copy of `self` unchanged, discarding `rhs`.
    #[must_use]
    pub fn add(&self, rhs: &StatValue) -> StatValue {
        match (self, rhs) {
            (StatValue::Int(a), StatValue::Int(b)) => StatValue::Int(a + b),
            (StatValue::Float(a), StatValue::Float(b)) => StatValue::Float(a + b),
            (lhs, _) => lhs.clone(),
        }
    }

    /// Returns the zero of this value's tag: `0`, `0.0`, or the empty
    /// string.
    #[must_use]
    pub fn zeroed(&self) -> StatValue {
        match self {
            StatValue::Int(_) => StatValue::Int(0),
            StatValue::Float(_) => StatValue::Float(0.0),
            StatValue::Text(_) => StatValue::Text(String::new()),
        }
    }

    /// Returns the inner integer, if this is an `Int`.
    #[must_use]
    pub fn as_int(&self) -> Option<i64> {
        match self {
            StatValue::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns the inner float, if this is a `Float`.
    #[must_use]
    pub fn as_float(&self) -> Option<f64> {
        match self {
            StatValue::Float(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns the inner text, if this is a `Text`.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            StatValue::Text(v) => Some(v),
            _ => None,
        }
    }

    /// Converts the value to its wire representation. Scalars keep their
    /// type on the wire: integers, floats and strings stay distinct JSON
    /// kinds.
    #[must_use]
    pub fn to_json(&self) -> Value {
        match self {
            StatValue::Int(v) => Value::from(*v),
            StatValue::Float(v) => Value::from(*v),
            StatValue::Text(v) => Value::from(v.clone()),
        }
    }

    /// Reads a value back from its wire representation, choosing the tag
    /// from the scalar's runtime type.
    ///
    /// Returns `None` for JSON kinds that do not map to a stat (null,
    /// booleans, arrays, objects, or integers outside the `i64` range).
    #[must_use]
    pub fn from_json(value: &Value) -> Option<StatValue> {
        if value.is_f64() {
            value.as_f64().map(StatValue::Float)
        } else if value.is_i64() || value.is_u64() {
            value.as_i64().map(StatValue::Int)
        } else if let Some(text) = value.as_str() {
            Some(StatValue::Text(text.to_string()))
        } else {
            None
        }
    }
}

impl PartialOrd for StatValue {
    /// Natural ordering within a tag; values of different tags are
    /// unordered.
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (StatValue::Int(a), StatValue::Int(b)) => a.partial_cmp(b),
            (StatValue::Float(a), StatValue::Float(b)) => a.partial_cmp(b),
            (StatValue::Text(a), StatValue::Text(b)) => a.partial_cmp(b),
            _ => None,
        }
    }
}
