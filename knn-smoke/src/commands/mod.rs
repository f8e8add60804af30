mod runs;
mod smoke;
mod step;
mod verify;
pub use runs::{run_repeatedly, RunError, RunReport};
pub use smoke::{run_smoke_test, SmokeError, SmokeReport};
pub use step::{Check, Step, StepOutcome};
pub use verify::{verify, Verification, VerifyError};
