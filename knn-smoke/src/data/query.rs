use lazy_static::lazy_static;
use serde::{Serialize, Serializer};
use serde_json::{json, Value};
use structopt::clap::arg_enum;

lazy_static! {
    static ref MATCH_ALL: Value = json!({
        "query": {
            "match_all": {}
        }
    });
}

/// Search body matching every document of the index
pub fn match_all() -> &'static Value {
    &MATCH_ALL
}

arg_enum! {
    /// Distance function the plugin uses to rank candidates in an exact query
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum Distance {
        Angular,
        L1,
        L2,
    }
}

impl AsRef<str> for Distance {
    fn as_ref(&self) -> &str {
        match self {
            Distance::Angular => "DISTANCE_ANGULAR",
            Distance::L1 => "DISTANCE_L1",
            Distance::L2 => "DISTANCE_L2",
        }
    }
}

impl Default for Distance {
    fn default() -> Self {
        Distance::Angular
    }
}

impl Serialize for Distance {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_ref())
    }
}

/// Body of an `elastiknn_knn` search
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KnnSearch {
    query: KnnQueryWrapper,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
struct KnnQueryWrapper {
    elastiknn_knn: KnnQuery,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KnnQuery {
    pub pipeline_id: String,
    pub processor_id: String,
    pub k: usize,
    pub exact: ExactQuery,
    pub given: Given,
}

/// Brute force mode, every stored vector is compared against the query vector
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ExactQuery {
    pub distance: Distance,
}

/// The vector the neighbors are searched for
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Given {
    pub vector: Vec<f64>,
}

impl KnnSearch {
    pub fn exact(
        pipeline_id: &str,
        processor_id: &str,
        k: usize,
        distance: Distance,
        vector: Vec<f64>,
    ) -> Self {
        KnnSearch {
            query: KnnQueryWrapper {
                elastiknn_knn: KnnQuery {
                    pipeline_id: pipeline_id.to_owned(),
                    processor_id: processor_id.to_owned(),
                    k,
                    exact: ExactQuery { distance },
                    given: Given { vector },
                },
            },
        }
    }
}
