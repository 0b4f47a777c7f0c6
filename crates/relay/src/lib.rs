//! Job status relay for the Aureole backend.
//!
//! Accepts deduplicated batch submissions of repository ids, forwards them
//! to the task runner, polls each batch's backend jobs in the background,
//! and fans status changes out to push subscribers:
//!
//! - [`TaskRunner`] / [`HttpTaskRunner`] — the task submission and status
//!   endpoints of the analytics backend.
//! - [`JobRelay`] — the process-wide batch registry and entry point.
//! - [`UpdateBus`] — per-batch broadcast fan-out of [`BatchUpdate`]s.

pub mod bus;
pub(crate) mod poll;
pub mod relay;
pub mod runner;

pub use bus::{BatchUpdate, UpdateBus};
pub use relay::{JobRelay, Submission, SubmitError};
pub use runner::{HttpTaskRunner, TaskRunner, TaskRunnerError, STATUS_SUCCESS};
