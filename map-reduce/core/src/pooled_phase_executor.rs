use crate::completion_signaling::CompletionSignaling;
use crate::error::JobError;
use crate::job_report::Phase;
use crate::phase_executor::PhaseExecutor;
use crate::worker::{WorkFn, Worker};
use async_trait::async_trait;
use tracing::{debug, error};

/// Phase executor backed by a fixed-size worker pool.
///
/// A fresh pool is created for every phase: each worker gets an initial assignment,
/// then the next pending one whenever it reports completion. When all assignments
/// are done the pool is drained and every worker joined before returning.
#[derive(Debug, Clone, Copy)]
pub struct PooledPhaseExecutor {
    num_workers: usize,
}

impl PooledPhaseExecutor {
    pub fn new(num_workers: usize) -> Self {
        Self {
            num_workers: num_workers.max(1),
        }
    }

    pub fn num_workers(&self) -> usize {
        self.num_workers
    }
}

#[async_trait]
impl PhaseExecutor for PooledPhaseExecutor {
    async fn execute<A, O>(
        &self,
        phase: Phase,
        assignments: Vec<A>,
        work: WorkFn<A, O>,
    ) -> Result<Vec<O>, JobError>
    where
        A: Send + 'static,
        O: Send + 'static,
    {
        if assignments.is_empty() {
            return Ok(Vec::new());
        }

        let total = assignments.len();
        let pool_size = self.num_workers.min(total);
        debug!(%phase, workers = pool_size, tasks = total, "starting worker pool");

        let workers: Vec<Worker<A, O>> = (0..pool_size)
            .map(|worker_id| Worker::spawn(worker_id, work.clone()))
            .collect();
        let mut signaling = CompletionSignaling::setup(pool_size);

        let pool_error = |reason: String| JobError::WorkerPool { phase, reason };

        let mut results: Vec<Option<O>> = (0..total).map(|_| None).collect();
        let mut pending = assignments.into_iter().enumerate();
        let mut active_workers = 0;
        let mut first_error: Option<String> = None;

        // Distribute initial assignments
        for worker in &workers {
            let Some((task_id, assignment)) = pending.next() else {
                break;
            };
            if !worker.send_work(task_id, assignment, signaling.sender(worker.id())) {
                first_error = Some(format!("worker {} is not running", worker.id()));
                break;
            }
            active_workers += 1;
        }

        // Collect completions and hand out the remaining assignments
        while active_workers > 0 {
            let Some((worker_id, completion)) = signaling.wait_next().await else {
                break;
            };
            active_workers -= 1;

            match completion.result {
                Ok(output) => results[completion.task_id] = Some(output),
                Err(reason) => {
                    error!(%phase, task = completion.task_id, %reason, "task aborted");
                    first_error.get_or_insert(reason);
                }
            }

            // Stop handing out work once the phase has failed
            if first_error.is_some() {
                continue;
            }
            if let Some((task_id, assignment)) = pending.next() {
                if !workers[worker_id].send_work(task_id, assignment, signaling.sender(worker_id))
                {
                    first_error = Some(format!("worker {} is not running", worker_id));
                    continue;
                }
                active_workers += 1;
            }
        }

        // Drain the pool on every exit path before the next phase may start
        for worker in workers {
            let worker_id = worker.id();
            if let Err(e) = worker.wait().await {
                error!(%phase, worker = worker_id, error = %e, "worker shutdown failed");
                first_error.get_or_insert(format!("worker {} shutdown failed: {}", worker_id, e));
            }
        }
        debug!(%phase, "worker pool drained");

        if let Some(reason) = first_error {
            return Err(pool_error(reason));
        }

        results
            .into_iter()
            .enumerate()
            .map(|(task_id, output)| {
                output.ok_or_else(|| pool_error(format!("task {} produced no output", task_id)))
            })
            .collect()
    }
}
