//! Parse-job worker boundary
//!
//! Requests and results cross this boundary as owned values; large buffers
//! are moved into the result messages rather than copied.

pub mod job;
pub mod messages;

pub use job::{execute_job, run_job, spawn_job, JobTracker};
pub use messages::{GeometryInfo, JobRequest, ParsedData, Profile, WorkerMessage};
