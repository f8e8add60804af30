mod document;
mod fixture;
mod pipeline;
mod query;
mod search;
mod vector;

pub use document::VectorDocument;
pub use fixture::{Fixture, FixtureError, VectorArg};
pub use pipeline::{Pipeline, Processor, ProcessorMode, ProcessorOptions};
pub use query::{match_all, Distance, ExactQuery, Given, KnnQuery, KnnSearch};
pub use search::{Hit, SearchResponse, Total};
pub use vector::{distance, expected_score};
