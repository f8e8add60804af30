use std::str::FromStr;

use thiserror::Error;

use super::document::VectorDocument;
use super::pipeline::Pipeline;
use super::query::{Distance, KnnSearch};

#[derive(Debug, Error, PartialEq)]
pub enum FixtureError {
    #[error("Vector dimension must be at least 1")]
    ZeroDimension,

    #[error("k must be at least 1")]
    ZeroK,

    #[error("The {name} vector has {actual} components, expected {expected}")]
    DimensionMismatch {
        name: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("Could not parse vector component {0:?}")]
    VectorParseError(String),
}

/// A vector passed on the command line as comma separated components,
/// e.g. `0.0,0.11`
#[derive(Debug, Clone, PartialEq)]
pub struct VectorArg(pub Vec<f64>);

impl FromStr for VectorArg {
    type Err = FixtureError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.split(',')
            .map(str::trim)
            .map(|c| {
                c.parse::<f64>()
                    .map_err(|_| FixtureError::VectorParseError(c.to_owned()))
            })
            .collect::<Result<Vec<_>, _>>()
            .map(VectorArg)
    }
}

/// The resources one smoke test run creates and the vectors it sends.
///
/// [Fixture::default] reproduces the manual test this tool replaces: a two
/// dimensional exact pipeline, one document and an angular 2-NN query.
#[derive(Debug, Clone, PartialEq)]
pub struct Fixture {
    pub index: String,
    pub pipeline: String,
    pub processor: String,
    pub pipeline_description: String,
    pub field_raw: String,
    pub field_processed: String,
    pub dimension: usize,
    pub doc_vector: Vec<f64>,
    pub query_vector: Vec<f64>,
    pub k: usize,
    pub distance: Distance,
    /// Passed to the health endpoint as is, e.g. `60s`
    pub health_timeout: String,
}

impl Default for Fixture {
    fn default() -> Self {
        Fixture {
            index: "elastiknn-index-01".to_owned(),
            pipeline: "elastiknn-pipeline-01".to_owned(),
            processor: "elastiknn".to_owned(),
            pipeline_description: "elastiknn pipeline 1".to_owned(),
            field_raw: "vec_raw".to_owned(),
            field_processed: "vec_proc".to_owned(),
            dimension: 2,
            doc_vector: vec![0.0, 0.11],
            query_vector: vec![0.11, 0.22],
            k: 2,
            distance: Distance::Angular,
            health_timeout: "60s".to_owned(),
        }
    }
}

impl Fixture {
    pub fn validate(&self) -> Result<(), FixtureError> {
        if self.dimension == 0 {
            return Err(FixtureError::ZeroDimension);
        }
        if self.k == 0 {
            return Err(FixtureError::ZeroK);
        }
        for (name, vector) in [("document", &self.doc_vector), ("query", &self.query_vector)] {
            if vector.len() != self.dimension {
                return Err(FixtureError::DimensionMismatch {
                    name,
                    expected: self.dimension,
                    actual: vector.len(),
                });
            }
        }
        Ok(())
    }

    pub fn pipeline_definition(&self) -> Pipeline {
        Pipeline::exact(
            &self.pipeline_description,
            &self.processor,
            &self.field_raw,
            &self.field_processed,
            self.dimension,
        )
    }

    pub fn document(&self) -> VectorDocument {
        VectorDocument::new(&self.field_raw, self.doc_vector.clone())
    }

    pub fn knn_search(&self) -> KnnSearch {
        KnnSearch::exact(
            &self.pipeline,
            &self.processor,
            self.k,
            self.distance,
            self.query_vector.clone(),
        )
    }
}
