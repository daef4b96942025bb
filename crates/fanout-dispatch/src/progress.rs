use crate::job::JobResult;

/// Receives one notification per job as it reaches a terminal state
///
/// Implementations must be safe to call from concurrently running jobs.
/// The engine never owns console or process-wide output state itself; the
/// embedding application decides how completions are surfaced.
pub trait ProgressSink: Send + Sync {
    fn job_completed(&self, result: &JobResult);
}

/// Sink that discards every notification
pub struct NullSink;

impl ProgressSink for NullSink {
    fn job_completed(&self, _result: &JobResult) {}
}
