use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

/// The document ingested by the smoke test: a single raw vector stored under a
/// configurable field name. The processed field is added server side by the
/// pipeline.
#[derive(Debug, Clone, PartialEq)]
pub struct VectorDocument {
    pub field: String,
    pub vector: Vec<f64>,
}

impl VectorDocument {
    pub fn new(field: &str, vector: Vec<f64>) -> Self {
        VectorDocument {
            field: field.to_owned(),
            vector,
        }
    }
}

impl Serialize for VectorDocument {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(&self.field, &self.vector)?;
        map.end()
    }
}
