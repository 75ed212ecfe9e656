use crate::error::JobError;
use crate::job_report::Phase;
use crate::worker::WorkFn;
use async_trait::async_trait;

/// Trait for executing every task of one phase.
///
/// Returning is the phase barrier: all tasks have finished and outputs are in
/// assignment order, whatever order they completed in.
#[async_trait]
pub trait PhaseExecutor: Send + Sync {
    async fn execute<A, O>(
        &self,
        phase: Phase,
        assignments: Vec<A>,
        work: WorkFn<A, O>,
    ) -> Result<Vec<O>, JobError>
    where
        A: Send + 'static,
        O: Send + 'static;
}

/// Runs tasks one at a time on the calling task
#[derive(Debug, Clone, Copy, Default)]
pub struct SequentialPhaseExecutor;

#[async_trait]
impl PhaseExecutor for SequentialPhaseExecutor {
    async fn execute<A, O>(
        &self,
        _phase: Phase,
        assignments: Vec<A>,
        work: WorkFn<A, O>,
    ) -> Result<Vec<O>, JobError>
    where
        A: Send + 'static,
        O: Send + 'static,
    {
        Ok(assignments.into_iter().map(|assignment| work(assignment)).collect())
    }
}
