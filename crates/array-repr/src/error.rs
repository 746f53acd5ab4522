//! Error types for the indexed-array codec.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ArrayReprError {
    /// A class declares the same field name twice.
    #[error("duplicate field {field:?} in class {class}")]
    DuplicateField { class: usize, field: String },
    /// A fast-path access named a field the object's class does not declare.
    #[error("field not found: {0}")]
    FieldNotFound(String),
    /// The class tag does not index into the schema.
    #[error("unknown class tag {0}")]
    UnknownClass(u64),
    /// Position 0 is missing or is not a non-negative integer.
    #[error("encoded object has no valid class tag")]
    MissingTag,
    #[error("encoded object of class {class} has {actual} elements, expected at least {expected}")]
    Truncated {
        class: usize,
        expected: usize,
        actual: usize,
    },
    /// The trailing slot after the declared fields holds something other than an object.
    #[error("ad-hoc slot of class {0} is not an object")]
    InvalidAdhocBag(usize),
    #[error("schema declares no classes")]
    EmptySchema,
    /// An error raised while handling one object of a collection.
    #[error("object {index}: {source}")]
    InObject {
        index: usize,
        source: Box<ArrayReprError>,
    },
}

impl ArrayReprError {
    /// Attributes this error to the object at `index` of a collection.
    pub fn at(self, index: usize) -> Self {
        ArrayReprError::InObject {
            index,
            source: Box::new(self),
        }
    }
}

pub type Result<T> = std::result::Result<T, ArrayReprError>;
