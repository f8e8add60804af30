use serde::Deserialize;
use serde_json::{Map, Value};

/// The parts of a `_search` response the verification looks at.
/// Everything else in the response is ignored.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub took: Option<u64>,
    pub hits: Hits,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Hits {
    #[serde(default)]
    pub total: Option<Total>,
    #[serde(default)]
    pub hits: Vec<Hit>,
}

/// Elasticsearch 6 reports the total as a plain number, later versions as an
/// object (whose `relation` is ignored)
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Total {
    Count(u64),
    Object { value: u64 },
}

impl Total {
    pub fn value(&self) -> u64 {
        match self {
            Total::Count(count) => *count,
            Total::Object { value } => *value,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Hit {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "_score", default)]
    pub score: Option<f64>,
    #[serde(rename = "_source", default)]
    pub source: Option<Map<String, Value>>,
}

impl SearchResponse {
    pub fn from_value(value: &Value) -> Result<Self, serde_json::Error> {
        Self::deserialize(value)
    }

    /// Number of matching documents, falls back to the number of returned
    /// hits if the response carries no total
    pub fn total(&self) -> u64 {
        self.hits
            .total
            .as_ref()
            .map_or(self.hits.hits.len() as u64, Total::value)
    }

    pub fn find(&self, id: &str) -> Option<&Hit> {
        self.hits.hits.iter().find(|hit| hit.id == id)
    }
}

impl Hit {
    pub fn has_field(&self, field: &str) -> bool {
        self.source
            .as_ref()
            .map_or(false, |source| source.contains_key(field))
    }

    /// Reads a numeric array field of the stored document
    pub fn vector(&self, field: &str) -> Option<Vec<f64>> {
        self.source
            .as_ref()?
            .get(field)?
            .as_array()?
            .iter()
            .map(Value::as_f64)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_parse_es7_response() {
        let value = json!({
            "took": 3,
            "timed_out": false,
            "hits": {
                "total": { "value": 1, "relation": "eq" },
                "max_score": 1.0,
                "hits": [
                    {
                        "_index": "elastiknn-index-01",
                        "_id": "abc",
                        "_score": 1.0,
                        "_source": {
                            "vec_raw": [0.0, 0.11],
                            "vec_proc": { "exactVector": [0.0, 0.11] }
                        }
                    }
                ]
            }
        });

        let response = SearchResponse::from_value(&value).unwrap();
        assert_eq!(response.took, Some(3));
        assert_eq!(response.total(), 1);

        let hit = response.find("abc").unwrap();
        assert!(hit.has_field("vec_raw"));
        assert!(hit.has_field("vec_proc"));
        assert!(!hit.has_field("vec_other"));
        assert_eq!(hit.vector("vec_raw"), Some(vec![0.0, 0.11]));
        assert_eq!(hit.vector("vec_proc"), None);
    }

    #[test]
    fn test_parse_es6_total() {
        let value = json!({
            "hits": { "total": 4, "hits": [] }
        });

        let response = SearchResponse::from_value(&value).unwrap();
        assert_eq!(response.total(), 4);
        assert!(response.find("abc").is_none());
    }

    #[test]
    fn test_missing_total_counts_hits() {
        let value = json!({
            "hits": { "hits": [ { "_index": "i", "_id": "1" }, { "_index": "i", "_id": "2" } ] }
        });

        let response = SearchResponse::from_value(&value).unwrap();
        assert_eq!(response.total(), 2);
    }
}
