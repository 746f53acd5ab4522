//! Self-describing payload: a schema embedded once next to the encoded
//! objects it describes.
//!
//! Serialized shape:
//!
//! ```text
//! {"classes": [["start", "end", "strand"], ...], "data": [[0, 1, 2, -1], ...]}
//! ```

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::codec::{ArrayRepr, EncodedObject};
use crate::error::{ArrayReprError, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexedCollection {
    pub classes: ArrayRepr,
    pub data: Vec<EncodedObject>,
}

impl IndexedCollection {
    pub fn new(classes: ArrayRepr) -> Self {
        Self {
            classes,
            data: Vec::new(),
        }
    }

    /// Encodes every object with the class that declares most of its keys.
    pub fn pack<'o, I>(classes: ArrayRepr, objects: I) -> Result<Self>
    where
        I: IntoIterator<Item = &'o Map<String, Value>>,
    {
        if classes.class_count() == 0 {
            return Err(ArrayReprError::EmptySchema);
        }
        let mut collection = Self::new(classes);
        for (index, object) in objects.into_iter().enumerate() {
            let class = collection
                .classes
                .best_class(object)
                .ok_or(ArrayReprError::EmptySchema)?;
            collection.push(object, class).map_err(|err| err.at(index))?;
        }
        tracing::debug!(objects = collection.len(), "packed indexed collection");
        Ok(collection)
    }

    /// Encodes every object with the class picked by `classify`.
    pub fn pack_with<'o, I, F>(classes: ArrayRepr, objects: I, mut classify: F) -> Result<Self>
    where
        I: IntoIterator<Item = &'o Map<String, Value>>,
        F: FnMut(&Map<String, Value>) -> usize,
    {
        let mut collection = Self::new(classes);
        for (index, object) in objects.into_iter().enumerate() {
            let class = classify(object);
            collection.push(object, class).map_err(|err| err.at(index))?;
        }
        tracing::debug!(objects = collection.len(), "packed indexed collection");
        Ok(collection)
    }

    pub fn push(&mut self, object: &Map<String, Value>, class: usize) -> Result<()> {
        let encoded = self.classes.encode(object, class)?;
        self.data.push(encoded);
        Ok(())
    }

    /// Decodes every object back to keyed form. Errors name the index of
    /// the offending object.
    pub fn unpack(&self) -> Result<Vec<Map<String, Value>>> {
        self.data
            .iter()
            .enumerate()
            .map(|(index, obj)| self.classes.decode(obj).map_err(|err| err.at(index)))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, EncodedObject> {
        self.data.iter()
    }

    /// Reads `attr` from the object at `index`; `None` if out of range.
    pub fn get(&self, index: usize, attr: &str) -> Result<Option<&Value>> {
        self.data
            .get(index)
            .map(|obj| self.classes.get_attr(obj, attr))
            .transpose()
    }
}

impl<'a> IntoIterator for &'a IndexedCollection {
    type Item = &'a EncodedObject;
    type IntoIter = std::slice::Iter<'a, EncodedObject>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn features() -> ArrayRepr {
        ArrayRepr::new([
            vec!["start", "end", "strand", "id"],
            vec!["start", "end", "chunk"],
        ])
        .unwrap()
    }

    fn objects(value: Value) -> Vec<Map<String, Value>> {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn pack_picks_classes_by_coverage() {
        let input = objects(json!([
            {"start": 1, "end": 2, "strand": 1, "id": 1},
            {"start": 5, "end": 6, "strand": 1, "id": 2, "foo": 1},
            {"start": 10, "end": 20, "chunk": 1},
        ]));
        let packed = IndexedCollection::pack(features(), &input).unwrap();
        assert_eq!(
            serde_json::to_value(&packed).unwrap(),
            json!({
                "classes": [["start", "end", "strand", "id"], ["start", "end", "chunk"]],
                "data": [
                    [0, 1, 2, 1, 1],
                    [0, 5, 6, 1, 2, {"foo": 1}],
                    [1, 10, 20, 1]
                ]
            })
        );
        assert_eq!(packed.unpack().unwrap(), input);
    }

    #[test]
    fn pack_with_uses_caller_classes() {
        let input = objects(json!([{"start": 1, "chunk": 3}]));
        let packed = IndexedCollection::pack_with(features(), &input, |_| 0).unwrap();
        assert_eq!(
            serde_json::to_value(&packed.data).unwrap(),
            json!([[0, 1, null, null, null, {"chunk": 3}]])
        );
        let err = IndexedCollection::pack_with(features(), &input, |_| 4).unwrap_err();
        assert_eq!(err, ArrayReprError::UnknownClass(4).at(0));
    }

    #[test]
    fn pack_requires_a_schema() {
        let empty = ArrayRepr::new(Vec::<Vec<String>>::new()).unwrap();
        let input = objects(json!([{"a": 1}]));
        assert_eq!(
            IndexedCollection::pack(empty, &input).unwrap_err(),
            ArrayReprError::EmptySchema
        );
    }

    #[test]
    fn null_entries_never_create_a_bag() {
        let classes = ArrayRepr::new([["start", "end"]]).unwrap();
        let input = objects(json!([{"start": 1, "end": null, "foo": null}]));
        let packed = IndexedCollection::pack(classes, &input).unwrap();
        assert_eq!(serde_json::to_value(&packed.data).unwrap(), json!([[0, 1, null]]));
        assert_eq!(packed.unpack().unwrap(), objects(json!([{"start": 1}])));
    }

    #[test]
    fn unpack_names_the_failing_object() {
        let payload: IndexedCollection = serde_json::from_value(json!({
            "classes": [["start", "end"]],
            "data": [[0, 1, 2], [0, 1, 5, 7]]
        }))
        .unwrap();
        let err = payload.unpack().unwrap_err();
        assert_eq!(err, ArrayReprError::InvalidAdhocBag(0).at(1));
        assert_eq!(err.to_string(), "object 1: ad-hoc slot of class 0 is not an object");
    }

    #[test]
    fn deserialized_payload_is_validated() {
        let payload = json!({"classes": [["a", "b", "a"]], "data": []});
        assert!(serde_json::from_value::<IndexedCollection>(payload).is_err());
    }

    #[test]
    fn get_reads_through_the_schema() {
        let payload: IndexedCollection = serde_json::from_value(json!({
            "classes": [["start", "end"]],
            "data": [[0, 3, 4, {"name": "x"}]]
        }))
        .unwrap();
        assert_eq!(payload.len(), 1);
        assert!(!payload.is_empty());
        assert_eq!(payload.get(0, "end").unwrap(), Some(&json!(4)));
        assert_eq!(payload.get(0, "name").unwrap(), Some(&json!("x")));
        assert_eq!(payload.get(0, "other").unwrap(), Some(&Value::Null));
        assert_eq!(payload.get(1, "end").unwrap(), None);
        assert_eq!((&payload).into_iter().count(), 1);
    }
}
