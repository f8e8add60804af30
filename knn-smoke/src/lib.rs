pub mod commands;
pub mod data;
pub mod elastic;

pub use commands::{run_smoke_test, verify};
