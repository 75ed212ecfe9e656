use crate::completion_signaling::{Completion, CompletionSender};
use crate::worker_runtime::{TokioRuntime, WorkerRuntime};
use std::marker::PhantomData;
use std::sync::Arc;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::trace;

/// Work applied by a worker to each assignment it receives
pub type WorkFn<A, O> = Arc<dyn Fn(A) -> O + Send + Sync>;

type WorkMessage<A, O> = (usize, A, CompletionSender<O>);

/// Pool member that runs assignments one at a time.
///
/// The receive loop lives on the runtime `R`; the work itself runs on the blocking
/// thread pool so CPU-bound user logic never stalls the async executor.
pub struct Worker<A, O, R = TokioRuntime>
where
    R: WorkerRuntime,
{
    id: usize,
    work_tx: UnboundedSender<WorkMessage<A, O>>,
    task_handle: R::Handle,
    _phantom: PhantomData<R>,
}

impl<A, O, R> Worker<A, O, R>
where
    A: Send + 'static,
    O: Send + 'static,
    R: WorkerRuntime,
{
    pub fn spawn(id: usize, work: WorkFn<A, O>) -> Self {
        let (work_tx, work_rx) = mpsc::unbounded_channel();
        let task_handle = R::spawn(move || Self::run_task(id, work_rx, work));

        Self {
            id,
            work_tx,
            task_handle,
            _phantom: PhantomData,
        }
    }

    pub fn id(&self) -> usize {
        self.id
    }

    /// Hand a task to this worker. Returns false if the worker loop has exited.
    pub fn send_work(&self, task_id: usize, assignment: A, completion: CompletionSender<O>) -> bool {
        self.work_tx.send((task_id, assignment, completion)).is_ok()
    }

    /// Close the work channel and wait for the worker loop to exit
    pub async fn wait(self) -> Result<(), R::Error> {
        drop(self.work_tx);
        R::join(self.task_handle).await
    }

    async fn run_task(
        id: usize,
        mut work_rx: UnboundedReceiver<WorkMessage<A, O>>,
        work: WorkFn<A, O>,
    ) {
        while let Some((task_id, assignment, completion)) = work_rx.recv().await {
            let work = Arc::clone(&work);
            let result = tokio::task::spawn_blocking(move || work(assignment))
                .await
                .map_err(|e| e.to_string());

            trace!(worker = id, task = task_id, "worker finished task");
            if !completion.send(Completion { task_id, result }).await {
                break;
            }
        }
    }
}
