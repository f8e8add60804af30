use elasticsearch::http::StatusCode;
use log::info;
use serde::Serialize;
use thiserror::Error;

use super::smoke::SmokeReport;
use super::step::Step;
use crate::data::{distance, expected_score, Fixture, SearchResponse};

/// Scores travel as 32 bit floats
const SCORE_TOLERANCE: f64 = 1e-4;

#[derive(Debug, Error, PartialEq)]
pub enum VerifyError {
    #[error("{0} did not run")]
    MissingStep(Step),

    #[error("{step} returned {status}")]
    SearchFailed { step: Step, status: StatusCode },

    #[error("{step} returned a response that could not be read: {reason}")]
    UnreadableResponse { step: Step, reason: String },

    #[error("The index response carries no document id")]
    MissingDocumentId,

    #[error("Expected exactly one document in the index, found {0}")]
    DocumentCount(u64),

    #[error("{step} did not return document {id}")]
    DocumentMissing { step: Step, id: String },

    #[error("The stored document has no field {0:?}")]
    MissingField(String),

    #[error("The stored vector {actual:?} differs from the indexed vector {expected:?}")]
    VectorMismatch {
        expected: Vec<f64>,
        actual: Option<Vec<f64>>,
    },

    #[error("knn search scored the document {actual:?}, expected {expected} for its distance")]
    ScoreMismatch { expected: f64, actual: Option<f64> },
}

/// Facts established about a successful run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Verification {
    pub document_id: String,
    pub document_count: u64,
    pub knn_score: Option<f64>,
    /// Distance between document and query vector as computed locally
    pub reference_distance: Option<f64>,
}

fn search_response(report: &SmokeReport, step: Step) -> Result<SearchResponse, VerifyError> {
    let outcome = report.outcome(step).ok_or(VerifyError::MissingStep(step))?;
    if !outcome.status.is_success() {
        return Err(VerifyError::SearchFailed {
            step,
            status: outcome.status,
        });
    }

    let body = outcome
        .body
        .as_ref()
        .ok_or_else(|| VerifyError::UnreadableResponse {
            step,
            reason: "no JSON body".to_owned(),
        })?;

    SearchResponse::from_value(body).map_err(|e| VerifyError::UnreadableResponse {
        step,
        reason: e.to_string(),
    })
}

/// Checks that a run left the index in the expected state: exactly the one
/// ingested document, carrying both the raw and the processed vector, and
/// found by the k-NN search.
pub fn verify(report: &SmokeReport, fixture: &Fixture) -> Result<Verification, VerifyError> {
    let id = report
        .document_id()
        .ok_or(VerifyError::MissingDocumentId)?
        .to_owned();

    let all = search_response(report, Step::MatchAllSearch)?;
    let document_count = all.total();
    if document_count != 1 {
        return Err(VerifyError::DocumentCount(document_count));
    }

    let stored = all.find(&id).ok_or_else(|| VerifyError::DocumentMissing {
        step: Step::MatchAllSearch,
        id: id.clone(),
    })?;
    for field in [&fixture.field_raw, &fixture.field_processed] {
        if !stored.has_field(field) {
            return Err(VerifyError::MissingField(field.to_owned()));
        }
    }

    let stored_vector = stored.vector(&fixture.field_raw);
    if stored_vector.as_ref() != Some(&fixture.doc_vector) {
        return Err(VerifyError::VectorMismatch {
            expected: fixture.doc_vector.clone(),
            actual: stored_vector,
        });
    }

    let knn = search_response(report, Step::KnnSearch)?;
    let neighbor = knn.find(&id).ok_or_else(|| VerifyError::DocumentMissing {
        step: Step::KnnSearch,
        id: id.clone(),
    })?;

    let reference_distance = distance(fixture.distance, &fixture.doc_vector, &fixture.query_vector);
    info!(
        "Document {} found by knn search in {:?}ms, score {:?}, {} distance {:?}",
        id, knn.took, neighbor.score, fixture.distance, reference_distance
    );

    // undefined for zero vectors, nothing to compare then
    if let Some(expected) =
        expected_score(fixture.distance, &fixture.doc_vector, &fixture.query_vector)
    {
        let consistent = neighbor
            .score
            .map_or(false, |score| (score - expected).abs() <= SCORE_TOLERANCE);
        if !consistent {
            return Err(VerifyError::ScoreMismatch {
                expected,
                actual: neighbor.score,
            });
        }
    }

    Ok(Verification {
        knn_score: neighbor.score,
        document_id: id,
        document_count,
        reference_distance,
    })
}
