use elasticsearch::http::StatusCode;
use log::{info, warn};
use serde::Serialize;
use thiserror::Error;

use super::step::{Check, Step, StepOutcome};
use crate::data::{Fixture, FixtureError};
use crate::elastic::{Elasticsearch, ElasticsearchError, StepResponse};

#[derive(Debug, Error)]
pub enum SmokeError {
    #[error("Precondition not met: cluster did not become healthy (status {status})")]
    PreconditionNotMet { status: StatusCode },

    #[error("{step} returned {actual}, expected {expected}")]
    UnexpectedStatus {
        step: Step,
        expected: StatusCode,
        actual: StatusCode,
    },

    #[error("Invalid fixture: {0}")]
    FixtureError(#[from] FixtureError),

    #[error(transparent)]
    ElasticsearchError(#[from] ElasticsearchError),
}

/// Outcomes of one complete run, in step order
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SmokeReport {
    pub outcomes: Vec<StepOutcome>,
}

impl SmokeReport {
    pub fn outcome(&self, step: Step) -> Option<&StepOutcome> {
        self.outcomes.iter().find(|outcome| outcome.step == step)
    }

    /// Id the cluster assigned to the ingested document
    pub fn document_id(&self) -> Option<&str> {
        self.outcome(Step::IndexDocument)?
            .body
            .as_ref()?
            .get("_id")?
            .as_str()
    }

    fn record<F>(
        &mut self,
        step: Step,
        response: StepResponse,
        on_outcome: &mut F,
    ) -> Result<(), SmokeError>
    where
        F: FnMut(&StepOutcome),
    {
        let outcome = StepOutcome::new(step, response);
        on_outcome(&outcome);

        let status = outcome.status;
        let check = outcome.check;
        self.outcomes.push(outcome);

        match check {
            Check::Hard(expected) if expected != status => {
                if step == Step::Health {
                    Err(SmokeError::PreconditionNotMet { status })
                } else {
                    Err(SmokeError::UnexpectedStatus {
                        step,
                        expected,
                        actual: status,
                    })
                }
            }
            Check::Hard(_) => {
                info!("{}: {}", step, status);
                Ok(())
            }
            Check::Soft if status.is_success() => {
                info!("{}: {}", step, status);
                Ok(())
            }
            Check::Soft => {
                warn!("{}: {} (not checked)", step, status);
                Ok(())
            }
        }
    }
}

/// Runs the smoke test sequence once, stopping at the first hard check that
/// fails.
///
/// `on_outcome` sees every step's outcome before its check is evaluated, so a
/// failing response is still shown.
///
/// The pipeline and index are left in place afterwards. The next run replaces
/// both.
pub async fn run_smoke_test<F>(
    es: &Elasticsearch,
    fixture: &Fixture,
    mut on_outcome: F,
) -> Result<SmokeReport, SmokeError>
where
    F: FnMut(&StepOutcome),
{
    fixture.validate()?;

    let mut report = SmokeReport::default();
    let on_outcome = &mut on_outcome;

    let response = es.wait_for_health(&fixture.health_timeout).await?;
    report.record(Step::Health, response, on_outcome)?;

    let response = es.setup_plugin().await?;
    report.record(Step::Setup, response, on_outcome)?;

    let response = es
        .put_pipeline(&fixture.pipeline, &fixture.pipeline_definition())
        .await?;
    report.record(Step::PutPipeline, response, on_outcome)?;

    let response = es.delete_index(&fixture.index).await?;
    report.record(Step::DeleteIndex, response, on_outcome)?;

    let response = es.create_index(&fixture.index).await?;
    report.record(Step::CreateIndex, response, on_outcome)?;

    let response = es
        .index_document(&fixture.index, &fixture.pipeline, &fixture.document())
        .await?;
    report.record(Step::IndexDocument, response, on_outcome)?;

    // searches race the new document unless the index is refreshed first
    let response = es.refresh().await?;
    report.record(Step::Refresh, response, on_outcome)?;

    let response = es.search_match_all(&fixture.index).await?;
    report.record(Step::MatchAllSearch, response, on_outcome)?;

    let response = es.search_knn(&fixture.index, &fixture.knn_search()).await?;
    report.record(Step::KnnSearch, response, on_outcome)?;

    Ok(report)
}
