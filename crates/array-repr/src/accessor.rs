//! Bound accessors: a field name captured once and applied to many objects.
//!
//! [`Getter`] and [`Setter`] go through the safe path of [`ArrayRepr`] and
//! fall back to the ad-hoc bag. [`FastGetter`] and [`FastSetter`] resolve the
//! field's position for every class up front and never look at the bag; an
//! object whose class does not declare the field is a
//! [`ArrayReprError::FieldNotFound`].

use serde_json::Value;

use crate::codec::{class_tag, slot, slot_mut, ArrayRepr, EncodedObject};
use crate::error::{ArrayReprError, Result};

#[derive(Debug, Clone)]
pub struct Getter<'r> {
    repr: &'r ArrayRepr,
    attr: String,
}

impl Getter<'_> {
    pub fn attr(&self) -> &str {
        &self.attr
    }

    /// Same as [`ArrayRepr::get_attr`].
    pub fn get<'a>(&self, obj: &'a [Value]) -> Result<&'a Value> {
        self.repr.get_attr(obj, &self.attr)
    }
}

#[derive(Debug, Clone)]
pub struct Setter<'r> {
    repr: &'r ArrayRepr,
    attr: String,
}

impl Setter<'_> {
    pub fn attr(&self) -> &str {
        &self.attr
    }

    /// Same as [`ArrayRepr::set_attr`].
    pub fn set(&self, obj: &mut EncodedObject, value: Value) -> Result<()> {
        self.repr.set_attr(obj, &self.attr, value)
    }
}

/// Per-class positions of one field, resolved when the accessor is made.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Positions {
    attr: String,
    indices: Vec<Option<usize>>,
}

impl Positions {
    fn resolve(repr: &ArrayRepr, attr: &str) -> Self {
        Self {
            attr: attr.to_owned(),
            indices: repr.attr_indices(attr),
        }
    }

    fn lookup(&self, obj: &[Value]) -> Result<(usize, usize)> {
        let class = class_tag(obj, self.indices.len())?;
        match self.indices[class] {
            Some(pos) => Ok((class, pos)),
            None => Err(ArrayReprError::FieldNotFound(self.attr.clone())),
        }
    }
}

/// Getter with positions precomputed per class. Holds no reference to the
/// codec.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FastGetter {
    positions: Positions,
}

impl FastGetter {
    pub fn attr(&self) -> &str {
        &self.positions.attr
    }

    pub fn indices(&self) -> &[Option<usize>] {
        &self.positions.indices
    }

    pub fn get<'a>(&self, obj: &'a [Value]) -> Result<&'a Value> {
        let (class, pos) = self.positions.lookup(obj)?;
        slot(obj, class, pos)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FastSetter {
    positions: Positions,
}

impl FastSetter {
    pub fn attr(&self) -> &str {
        &self.positions.attr
    }

    pub fn indices(&self) -> &[Option<usize>] {
        &self.positions.indices
    }

    pub fn set(&self, obj: &mut [Value], value: Value) -> Result<()> {
        let (class, pos) = self.positions.lookup(obj)?;
        *slot_mut(obj, class, pos)? = value;
        Ok(())
    }
}

impl ArrayRepr {
    pub fn make_getter(&self, attr: &str) -> Getter<'_> {
        Getter {
            repr: self,
            attr: attr.to_owned(),
        }
    }

    pub fn make_setter(&self, attr: &str) -> Setter<'_> {
        Setter {
            repr: self,
            attr: attr.to_owned(),
        }
    }

    /// Resolves `attr` against every class once; see [`FastGetter`].
    pub fn make_fast_getter(&self, attr: &str) -> FastGetter {
        FastGetter {
            positions: Positions::resolve(self, attr),
        }
    }

    pub fn make_fast_setter(&self, attr: &str) -> FastSetter {
        FastSetter {
            positions: Positions::resolve(self, attr),
        }
    }
}
