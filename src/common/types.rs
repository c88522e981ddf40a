// Copyright 2022 Singularity Data
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
// http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! The closed type system the core operates over, and the implicit-cast
//! promotion lattice that `ApplyImplicitCasts` walks (spec §4.3).
//!
//! Only numeric types widen into one another. Boolean and Varchar never
//! implicitly cast to or from anything else; the spec calls this out
//! explicitly ("string<->numeric disallowed except where the signature
//! permits") and no operator signature in this core grants that permission.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataType {
    Boolean,
    Int32,
    Int64,
    Float64,
    Varchar,
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DataType::Boolean => "BOOLEAN",
            DataType::Int32 => "INT",
            DataType::Int64 => "BIGINT",
            DataType::Float64 => "DOUBLE",
            DataType::Varchar => "VARCHAR",
        };
        f.write_str(s)
    }
}

impl DataType {
    fn numeric_rank(self) -> Option<u8> {
        match self {
            DataType::Int32 => Some(0),
            DataType::Int64 => Some(1),
            DataType::Float64 => Some(2),
            _ => None,
        }
    }

    pub fn is_numeric(self) -> bool {
        self.numeric_rank().is_some()
    }

    /// Whether a value of type `self` can be implicitly cast to `target`.
    pub fn can_implicit_cast_to(self, target: DataType) -> bool {
        if self == target {
            return true;
        }
        match (self.numeric_rank(), target.numeric_rank()) {
            (Some(from), Some(to)) => from <= to,
            _ => false,
        }
    }

    /// The least upper bound of two types in the widening lattice, used to
    /// pick a common type for binary arithmetic/comparison operands.
    pub fn widen(a: DataType, b: DataType) -> Option<DataType> {
        if a == b {
            return Some(a);
        }
        match (a.numeric_rank(), b.numeric_rank()) {
            (Some(ra), Some(rb)) => Some(if ra >= rb { a } else { b }),
            _ => None,
        }
    }
}

/// A runtime value, used both for `Literal.value` and for the result of
/// folding a `foldable` expression (spec §3, `Expr::evaluated`).
#[derive(Debug, Clone, PartialEq)]
pub enum ScalarValue {
    Null,
    Boolean(bool),
    Int32(i32),
    Int64(i64),
    Float64(f64),
    Varchar(String),
}

impl fmt::Display for ScalarValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScalarValue::Null => f.write_str("NULL"),
            ScalarValue::Boolean(b) => write!(f, "{b}"),
            ScalarValue::Int32(v) => write!(f, "{v}"),
            ScalarValue::Int64(v) => write!(f, "{v}"),
            ScalarValue::Float64(v) => write!(f, "{v}"),
            ScalarValue::Varchar(v) => write!(f, "{v:?}"),
        }
    }
}

impl ScalarValue {
    pub fn data_type(&self) -> DataType {
        match self {
            ScalarValue::Null => DataType::Boolean, // untyped null; caller carries the declared type alongside
            ScalarValue::Boolean(_) => DataType::Boolean,
            ScalarValue::Int32(_) => DataType::Int32,
            ScalarValue::Int64(_) => DataType::Int64,
            ScalarValue::Float64(_) => DataType::Float64,
            ScalarValue::Varchar(_) => DataType::Varchar,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, ScalarValue::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ScalarValue::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ScalarValue::Int32(v) => Some(*v as f64),
            ScalarValue::Int64(v) => Some(*v as f64),
            ScalarValue::Float64(v) => Some(*v),
            _ => None,
        }
    }

    /// Casts this value to `target`, assuming `self.data_type()` (or `Null`)
    /// is already implicitly castable to `target` per the lattice above.
    pub fn cast_to(&self, target: DataType) -> ScalarValue {
        if self.is_null() {
            return ScalarValue::Null;
        }
        if self.data_type() == target {
            return self.clone();
        }
        let v = self.as_f64().expect("cast source must be numeric");
        match target {
            DataType::Int32 => ScalarValue::Int32(v as i32),
            DataType::Int64 => ScalarValue::Int64(v as i64),
            DataType::Float64 => ScalarValue::Float64(v),
            _ => unreachable!("non-numeric cast target in widening lattice"),
        }
    }
}
