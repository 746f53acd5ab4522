//! The indexed-array codec: schema, field-index tables and attribute access.
//!
//! An encoded object is a JSON array whose first element is the class tag,
//! followed by the declared fields of that class in declared order, followed
//! by an optional trailing object (the ad-hoc bag) holding fields the class
//! does not declare:
//!
//! ```text
//! classes = [["start", "end", "strand"], ["start", "end", "chunk"]]
//! [0, 1, 2, -1]
//! [1, 10, 20, 1]
//! [0, 5, 6, 1, {"foo": 1}]
//! ```

use std::cmp::Reverse;

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{ArrayReprError, Result};

/// An object in positional form: class tag, declared fields, optional bag.
pub type EncodedObject = Vec<Value>;

/// Sentinel returned for fields that hold no value.
///
/// Unset declared fields are stored as `null` as well, so this is also what
/// appears on the wire.
pub static ABSENT: Value = Value::Null;

/// Reads the class tag at position 0 and checks it against `class_count`.
pub(crate) fn class_tag(obj: &[Value], class_count: usize) -> Result<usize> {
    let tag = obj
        .first()
        .and_then(Value::as_u64)
        .ok_or(ArrayReprError::MissingTag)?;
    usize::try_from(tag)
        .ok()
        .filter(|class| *class < class_count)
        .ok_or(ArrayReprError::UnknownClass(tag))
}

/// Reads the element at a declared-field position.
pub(crate) fn slot(obj: &[Value], class: usize, pos: usize) -> Result<&Value> {
    obj.get(pos).ok_or(ArrayReprError::Truncated {
        class,
        expected: pos + 1,
        actual: obj.len(),
    })
}

pub(crate) fn slot_mut(obj: &mut [Value], class: usize, pos: usize) -> Result<&mut Value> {
    let actual = obj.len();
    obj.get_mut(pos).ok_or(ArrayReprError::Truncated {
        class,
        expected: pos + 1,
        actual,
    })
}

/// Schema of named-field classes plus the derived per-class field-index
/// tables.
///
/// Each class is kept as an insertion-ordered set, so a field's table
/// position is its set index plus one (position 0 is the tag).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "Vec<Vec<String>>", into = "Vec<Vec<String>>")]
pub struct ArrayRepr {
    classes: Vec<IndexSet<String>>,
}

impl ArrayRepr {
    /// Builds a codec from an ordered list of classes.
    ///
    /// Fails with [`ArrayReprError::DuplicateField`] if any class names the
    /// same field twice.
    pub fn new<C, F>(classes: C) -> Result<Self>
    where
        C: IntoIterator,
        C::Item: IntoIterator<Item = F>,
        F: Into<String>,
    {
        let mut tables = Vec::new();
        for (class, fields) in classes.into_iter().enumerate() {
            let mut table = IndexSet::new();
            for field in fields {
                let field = field.into();
                if table.contains(&field) {
                    return Err(ArrayReprError::DuplicateField { class, field });
                }
                table.insert(field);
            }
            tables.push(table);
        }
        tracing::debug!(classes = tables.len(), "built indexed-array codec");
        Ok(Self { classes: tables })
    }

    pub fn class_count(&self) -> usize {
        self.classes.len()
    }

    /// Declared field names of `class`, in declared order.
    pub fn fields(&self, class: usize) -> Option<impl ExactSizeIterator<Item = &str> + '_> {
        self.classes
            .get(class)
            .map(|table| table.iter().map(String::as_str))
    }

    /// 1-based position of `attr` within objects of `class`.
    pub fn field_index(&self, class: usize, attr: &str) -> Option<usize> {
        self.classes.get(class)?.get_index_of(attr).map(|i| i + 1)
    }

    /// Position of `attr` in every class, in schema order; `None` where the
    /// class does not declare it.
    pub fn attr_indices(&self, attr: &str) -> Vec<Option<usize>> {
        self.classes
            .iter()
            .map(|table| table.get_index_of(attr).map(|i| i + 1))
            .collect()
    }

    /// Reads and validates the class tag of `obj`.
    pub fn class_of(&self, obj: &[Value]) -> Result<usize> {
        class_tag(obj, self.classes.len())
    }

    fn adhoc_index(&self, class: usize) -> usize {
        self.classes[class].len() + 1
    }

    /// Reads `attr` from `obj`, falling back to the ad-hoc bag for fields the
    /// class does not declare.
    ///
    /// A field that is neither declared nor present in the bag yields
    /// [`ABSENT`] rather than an error.
    pub fn get_attr<'a>(&self, obj: &'a [Value], attr: &str) -> Result<&'a Value> {
        let class = self.class_of(obj)?;
        if let Some(pos) = self.field_index(class, attr) {
            return slot(obj, class, pos);
        }
        match obj.get(self.adhoc_index(class)) {
            None => Ok(&ABSENT),
            Some(Value::Object(bag)) => Ok(bag.get(attr).unwrap_or(&ABSENT)),
            Some(_) => Err(ArrayReprError::InvalidAdhocBag(class)),
        }
    }

    /// Writes `attr` on `obj` in place.
    ///
    /// Undeclared fields go into the ad-hoc bag, which is appended the first
    /// time one is written.
    pub fn set_attr(&self, obj: &mut EncodedObject, attr: &str, value: Value) -> Result<()> {
        let class = self.class_of(obj)?;
        if let Some(pos) = self.field_index(class, attr) {
            *slot_mut(obj, class, pos)? = value;
            return Ok(());
        }
        let adhoc = self.adhoc_index(class);
        if obj.len() < adhoc {
            return Err(ArrayReprError::Truncated {
                class,
                expected: adhoc,
                actual: obj.len(),
            });
        }
        if obj.len() == adhoc {
            tracing::trace!(class, field = attr, "materializing ad-hoc bag");
            obj.push(Value::Object(Map::new()));
        }
        match &mut obj[adhoc] {
            Value::Object(bag) => {
                bag.insert(attr.to_owned(), value);
                Ok(())
            }
            _ => Err(ArrayReprError::InvalidAdhocBag(class)),
        }
    }

    /// Reads a field that must be declared by the object's class. There is
    /// no ad-hoc fallback.
    pub fn fast_get<'a>(&self, obj: &'a [Value], attr: &str) -> Result<&'a Value> {
        let class = self.class_of(obj)?;
        let pos = self.declared(class, attr)?;
        slot(obj, class, pos)
    }

    /// Writes a field that must be declared by the object's class.
    pub fn fast_set(&self, obj: &mut [Value], attr: &str, value: Value) -> Result<()> {
        let class = self.class_of(obj)?;
        let pos = self.declared(class, attr)?;
        *slot_mut(obj, class, pos)? = value;
        Ok(())
    }

    fn declared(&self, class: usize, attr: &str) -> Result<usize> {
        self.field_index(class, attr)
            .ok_or_else(|| ArrayReprError::FieldNotFound(attr.to_owned()))
    }

    /// Creates an object of `class` with every declared field absent, then
    /// applies [`set_attr`](Self::set_attr) for each initial value.
    pub fn construct<I, K>(&self, values: I, class: usize) -> Result<EncodedObject>
    where
        I: IntoIterator<Item = (K, Value)>,
        K: AsRef<str>,
    {
        let width = self
            .classes
            .get(class)
            .ok_or(ArrayReprError::UnknownClass(class as u64))?
            .len();
        let mut obj = Vec::with_capacity(width + 1);
        obj.push(Value::from(class));
        obj.resize(width + 1, Value::Null);
        for (attr, value) in values {
            self.set_attr(&mut obj, attr.as_ref(), value)?;
        }
        Ok(obj)
    }

    /// Encodes a keyed object as `class`.
    ///
    /// `null` entries are treated as absent: they leave declared fields unset
    /// and never create an ad-hoc bag.
    pub fn encode(&self, object: &Map<String, Value>, class: usize) -> Result<EncodedObject> {
        let present = object
            .iter()
            .filter(|(_, v)| !v.is_null())
            .map(|(k, v)| (k, v.clone()));
        self.construct(present, class)
    }

    /// Rebuilds the keyed form of `obj`: non-null declared fields in declared
    /// order, then the ad-hoc bag entries.
    pub fn decode(&self, obj: &[Value]) -> Result<Map<String, Value>> {
        let class = self.class_of(obj)?;
        let table = &self.classes[class];
        let mut out = Map::new();
        for (i, name) in table.iter().enumerate() {
            let value = slot(obj, class, i + 1)?;
            if !value.is_null() {
                out.insert(name.clone(), value.clone());
            }
        }
        match obj.get(table.len() + 1) {
            None => {}
            Some(Value::Object(bag)) => {
                for (key, value) in bag {
                    out.insert(key.clone(), value.clone());
                }
            }
            Some(_) => return Err(ArrayReprError::InvalidAdhocBag(class)),
        }
        Ok(out)
    }

    /// The class declaring the most keys of `object`; ties go to the lowest
    /// class index.
    pub fn best_class(&self, object: &Map<String, Value>) -> Option<usize> {
        self.classes
            .iter()
            .enumerate()
            .max_by_key(|(i, table)| {
                let covered = object.keys().filter(|k| table.contains(k.as_str())).count();
                (covered, Reverse(*i))
            })
            .map(|(i, _)| i)
    }
}

impl PartialEq for ArrayRepr {
    fn eq(&self, other: &Self) -> bool {
        self.classes.len() == other.classes.len()
            && self
                .classes
                .iter()
                .zip(&other.classes)
                .all(|(a, b)| a.iter().eq(b.iter()))
    }
}

impl Eq for ArrayRepr {}

impl TryFrom<Vec<Vec<String>>> for ArrayRepr {
    type Error = ArrayReprError;

    fn try_from(classes: Vec<Vec<String>>) -> Result<Self> {
        Self::new(classes)
    }
}

impl From<ArrayRepr> for Vec<Vec<String>> {
    fn from(repr: ArrayRepr) -> Self {
        repr.classes
            .into_iter()
            .map(|table| table.into_iter().collect())
            .collect()
    }
}
