use log::info;
use serde::Serialize;
use thiserror::Error;

use super::smoke::{run_smoke_test, SmokeError, SmokeReport};
use super::step::StepOutcome;
use super::verify::{verify, Verification, VerifyError};
use crate::data::Fixture;
use crate::elastic::Elasticsearch;

#[derive(Debug, Error)]
pub enum RunError {
    #[error("Run {run} failed: {source}")]
    Smoke { run: usize, source: SmokeError },

    #[error("Run {run} failed verification: {source}")]
    Verify { run: usize, source: VerifyError },
}

/// One run of the sequence. For a failed run `report` holds the steps up to
/// and including the failing one.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunReport {
    pub run: usize,
    #[serde(flatten)]
    pub report: SmokeReport,
    pub verification: Option<Verification>,
}

/// Runs the sequence `runs` times back to back, verifying each run if asked
/// to. Stops at the first failure.
///
/// The reports of all runs started are returned next to the result, the last
/// one partial if a run failed.
pub async fn run_repeatedly<F>(
    es: &Elasticsearch,
    fixture: &Fixture,
    runs: usize,
    check_results: bool,
    mut on_outcome: F,
) -> (Vec<RunReport>, Result<(), RunError>)
where
    F: FnMut(&StepOutcome),
{
    let mut reports = Vec::with_capacity(runs);

    for run in 1..=runs {
        info!("Run {} of {}", run, runs);

        let mut outcomes = Vec::new();
        let result = run_smoke_test(es, fixture, |outcome| {
            on_outcome(outcome);
            outcomes.push(outcome.clone());
        })
        .await;

        let report = match result {
            Ok(report) => report,
            Err(source) => {
                reports.push(RunReport {
                    run,
                    report: SmokeReport { outcomes },
                    verification: None,
                });
                return (reports, Err(RunError::Smoke { run, source }));
            }
        };

        let verification = if check_results {
            match verify(&report, fixture) {
                Ok(verification) => Some(verification),
                Err(source) => {
                    reports.push(RunReport {
                        run,
                        report,
                        verification: None,
                    });
                    return (reports, Err(RunError::Verify { run, source }));
                }
            }
        } else {
            None
        };

        reports.push(RunReport {
            run,
            report,
            verification,
        });
    }

    (reports, Ok(()))
}

#[cfg(test)]
mod tests {
    use elasticsearch::http::StatusCode;
    use serde_json::json;

    use super::*;
    use crate::commands::smoke::tests::{healthy_cluster, override_step};
    use crate::commands::step::Step;

    #[tokio::test]
    async fn test_two_verified_runs() -> Result<(), Box<dyn std::error::Error>> {
        let server = healthy_cluster().await;
        let es = Elasticsearch::new(&server.uri())?;

        let (reports, result) = run_repeatedly(&es, &Fixture::default(), 2, true, |_| ()).await;

        assert!(result.is_ok());
        assert_eq!(reports.len(), 2);
        for (i, report) in reports.iter().enumerate() {
            assert_eq!(report.run, i + 1);
            assert_eq!(report.report.outcomes.len(), Step::ALL.len());
            assert_eq!(
                report.verification.as_ref().map(|v| v.document_count),
                Some(1)
            );
        }
        Ok(())
    }

    #[tokio::test]
    async fn test_failed_run_keeps_partial_report() -> Result<(), Box<dyn std::error::Error>> {
        let server = healthy_cluster().await;
        override_step(&server, "PUT", "/elastiknn-index-01", 400).await;
        let es = Elasticsearch::new(&server.uri())?;

        let mut seen = 0;
        let (reports, result) =
            run_repeatedly(&es, &Fixture::default(), 2, false, |_| seen += 1).await;

        assert!(matches!(
            result,
            Err(RunError::Smoke {
                run: 1,
                source: SmokeError::UnexpectedStatus {
                    step: Step::CreateIndex,
                    ..
                }
            })
        ));
        assert_eq!(seen, 5);
        assert_eq!(reports.len(), 1);

        let failed = reports[0]
            .report
            .outcome(Step::CreateIndex)
            .ok_or("create index outcome missing")?;
        assert_eq!(failed.status, StatusCode::BAD_REQUEST);
        assert_eq!(failed.body, Some(json!({ "status": 400 })));

        let printed = serde_json::to_value(&reports)?;
        assert_eq!(printed[0]["outcomes"][4]["step"], json!("create_index"));
        assert_eq!(printed[0]["outcomes"][4]["body"], json!({ "status": 400 }));
        assert_eq!(printed[0]["verification"], json!(null));
        Ok(())
    }

    #[tokio::test]
    async fn test_failed_verification_keeps_report() -> Result<(), Box<dyn std::error::Error>> {
        let server = healthy_cluster().await;
        override_step(&server, "GET", "/elastiknn-index-01/_search", 400).await;
        let es = Elasticsearch::new(&server.uri())?;

        let (reports, result) = run_repeatedly(&es, &Fixture::default(), 1, true, |_| ()).await;

        assert!(matches!(
            result,
            Err(RunError::Verify {
                run: 1,
                source: VerifyError::SearchFailed { .. }
            })
        ));
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].report.outcomes.len(), Step::ALL.len());
        Ok(())
    }
}
