//! array-repr - compact positional encoding for collections of similar objects.
//!
//! Objects that share a shape are stored as arrays instead of keyed maps. A
//! schema of "classes" (ordered field-name lists) is kept once, and every
//! encoded object starts with the index of its class:
//!
//! ```
//! use array_repr::ArrayRepr;
//! use serde_json::json;
//!
//! let repr = ArrayRepr::new([["start", "end", "strand"], ["start", "end", "chunk"]]).unwrap();
//!
//! let mut feature = repr
//!     .construct([("start", json!(1)), ("end", json!(2)), ("strand", json!(-1))], 0)
//!     .unwrap();
//! assert_eq!(feature, vec![json!(0), json!(1), json!(2), json!(-1)]);
//!
//! // Fields the class does not declare land in a trailing bag.
//! repr.set_attr(&mut feature, "foo", json!(1)).unwrap();
//! assert_eq!(json!(feature), json!([0, 1, 2, -1, {"foo": 1}]));
//! assert_eq!(repr.get_attr(&feature, "foo").unwrap(), &json!(1));
//! assert!(repr.get_attr(&feature, "bar").unwrap().is_null());
//!
//! let chunk = repr.make_fast_getter("chunk");
//! assert_eq!(chunk.indices(), &[None, Some(3)]);
//! assert!(chunk.get(&feature).is_err());
//! ```
//!
//! [`IndexedCollection`] bundles a schema with its encoded objects for
//! serialization.

mod accessor;
mod codec;
mod collection;
mod error;

pub use accessor::{FastGetter, FastSetter, Getter, Setter};
pub use codec::{ArrayRepr, EncodedObject, ABSENT};
pub use collection::IndexedCollection;
pub use error::{ArrayReprError, Result};
