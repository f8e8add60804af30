use std::fmt::{self, Display};

use elasticsearch::http::StatusCode;
use serde::{Serialize, Serializer};
use serde_json::Value;

use crate::elastic::StepResponse;

/// The calls of a smoke test run, in the order they are made
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    Health,
    Setup,
    PutPipeline,
    DeleteIndex,
    CreateIndex,
    IndexDocument,
    Refresh,
    MatchAllSearch,
    KnnSearch,
}

/// What a step's status code has to be for the run to go on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Check {
    /// The run aborts unless the status matches exactly
    Hard(StatusCode),
    /// The status is only reported
    Soft,
}

impl Step {
    pub const ALL: [Step; 9] = [
        Step::Health,
        Step::Setup,
        Step::PutPipeline,
        Step::DeleteIndex,
        Step::CreateIndex,
        Step::IndexDocument,
        Step::Refresh,
        Step::MatchAllSearch,
        Step::KnnSearch,
    ];

    pub fn check(&self) -> Check {
        match self {
            Step::Health | Step::Setup | Step::PutPipeline | Step::CreateIndex => {
                Check::Hard(StatusCode::OK)
            }
            Step::IndexDocument => Check::Hard(StatusCode::CREATED),
            Step::DeleteIndex | Step::Refresh | Step::MatchAllSearch | Step::KnnSearch => {
                Check::Soft
            }
        }
    }

    /// Whether the response is shown to the operator
    pub fn is_inspected(&self) -> bool {
        matches!(
            self,
            Step::PutPipeline
                | Step::CreateIndex
                | Step::IndexDocument
                | Step::MatchAllSearch
                | Step::KnnSearch
        )
    }
}

impl Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Step::Health => "cluster health",
            Step::Setup => "elastiknn setup",
            Step::PutPipeline => "put pipeline",
            Step::DeleteIndex => "delete index",
            Step::CreateIndex => "create index",
            Step::IndexDocument => "index document",
            Step::Refresh => "refresh",
            Step::MatchAllSearch => "match all search",
            Step::KnnSearch => "knn search",
        };
        write!(f, "{}", name)
    }
}

impl Check {
    pub fn accepts(&self, status: StatusCode) -> bool {
        match self {
            Check::Hard(expected) => *expected == status,
            Check::Soft => true,
        }
    }
}

impl Serialize for Check {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Check::Hard(expected) => {
                serializer.serialize_newtype_variant("Check", 0, "hard", &expected.as_u16())
            }
            Check::Soft => serializer.serialize_unit_variant("Check", 1, "soft"),
        }
    }
}

/// What happened in a single step
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StepOutcome {
    pub step: Step,
    pub check: Check,
    #[serde(serialize_with = "status_code")]
    pub status: StatusCode,
    pub body: Option<Value>,
}

impl StepOutcome {
    pub fn new(step: Step, response: StepResponse) -> Self {
        StepOutcome {
            step,
            check: step.check(),
            status: response.status,
            body: response.body,
        }
    }

    pub fn passed(&self) -> bool {
        self.check.accepts(self.status)
    }
}

fn status_code<S>(status: &StatusCode, s: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    s.serialize_u16(status.as_u16())
}
