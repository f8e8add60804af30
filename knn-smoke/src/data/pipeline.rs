use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

/// An ingest pipeline definition as accepted by `PUT /_ingest/pipeline/<id>`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Pipeline {
    pub description: String,
    pub processors: Vec<Processor>,
}

/// A single pipeline stage.
///
/// Elasticsearch expects every processor as a single key object, the key being
/// the processor type. For the plugin that is the processor id, which the
/// k-NN query later refers to as `processorId`.
#[derive(Debug, Clone, PartialEq)]
pub struct Processor {
    pub id: String,
    pub options: ProcessorOptions,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessorOptions {
    pub field_raw: String,
    pub field_processed: String,
    pub dimension: usize,
    #[serde(flatten)]
    pub mode: ProcessorMode,
}

/// How the processor prepares vectors for later queries
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProcessorMode {
    /// Keep vectors as they are, only usable by exact queries
    Exact {},
}

impl Serialize for Processor {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(&self.id, &self.options)?;
        map.end()
    }
}

impl Pipeline {
    /// A pipeline holding exactly one exact mode processor
    pub fn exact(
        description: &str,
        processor: &str,
        field_raw: &str,
        field_processed: &str,
        dimension: usize,
    ) -> Self {
        Pipeline {
            description: description.to_owned(),
            processors: vec![Processor {
                id: processor.to_owned(),
                options: ProcessorOptions {
                    field_raw: field_raw.to_owned(),
                    field_processed: field_processed.to_owned(),
                    dimension,
                    mode: ProcessorMode::Exact {},
                },
            }],
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_exact_pipeline_body() {
        let pipeline = Pipeline::exact("elastiknn pipeline 1", "elastiknn", "vec_raw", "vec_proc", 2);

        assert_eq!(
            serde_json::to_value(&pipeline).unwrap(),
            json!({
                "description": "elastiknn pipeline 1",
                "processors": [
                    {
                        "elastiknn": {
                            "fieldRaw": "vec_raw",
                            "fieldProcessed": "vec_proc",
                            "dimension": 2,
                            "exact": {}
                        }
                    }
                ]
            })
        );
    }
}
