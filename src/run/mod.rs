//! Run execution controller.
//!
//! A "run" is one bounded execution of a payload: the request describes what
//! to execute, the context owns the run's identity and file paths, the runner
//! spawns and supervises the interpreter, and the manifest module records the
//! outcome.

pub mod context;
pub mod manifest;
pub mod request;
pub mod runner;

pub use context::RunContext;
pub use manifest::{Manifest, OutputDescriptor};
pub use request::{ExecMode, PayloadSource, RunRequest};
pub use runner::{RunOutcome, RunStatus, execute};
