use crate::emission_context::EmissionContext;
use crate::job_report::{Phase, TaskFailure};
use crate::map_reduce_job::ReduceLogic;
use crate::shuffle::KeyGroup;
use crate::utils::panic_message;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::{Mutex, PoisonError};
use tracing::{debug, warn};

/// One key-group bound to the reduce phase
#[derive(Debug)]
pub struct ReduceTask<K, V> {
    pub id: usize,
    group: KeyGroup<K, V>,
}

/// What a reduce task leaves behind for the merge stage
#[derive(Debug)]
pub struct ReduceOutput<K, V> {
    pub task_id: usize,
    pub context: EmissionContext<K, V>,
    pub failure: Option<TaskFailure>,
}

impl<K, V> ReduceTask<K, V> {
    pub fn new(id: usize, group: KeyGroup<K, V>) -> Self {
        Self { id, group }
    }

    /// Invoke the reduce logic once with the key and its full value sequence.
    ///
    /// When `lock` is given the invocation holds it, which serializes stateful reduce
    /// logic across workers. Failures keep whatever was emitted before them.
    pub fn execute<OK, OV>(
        self,
        logic: &dyn ReduceLogic<K, V, OK, OV>,
        lock: Option<&Mutex<()>>,
    ) -> ReduceOutput<OK, OV> {
        let mut context = EmissionContext::new();

        let outcome = {
            let _guard = lock.map(|lock| lock.lock().unwrap_or_else(PoisonError::into_inner));
            let mut emitter = context.emitter();
            catch_unwind(AssertUnwindSafe(|| {
                logic.reduce(&self.group.key, &self.group.values, &mut emitter)
            }))
        };

        let failure = match outcome {
            Ok(Ok(())) => None,
            Ok(Err(e)) => Some(e.to_string()),
            Err(payload) => Some(format!("panicked: {}", panic_message(payload.as_ref()))),
        }
        .map(|reason| {
            warn!(task = self.id, %reason, "reduce logic failed");
            TaskFailure {
                phase: Phase::Reduce,
                task_id: self.id,
                record: None,
                reason,
            }
        });

        debug!(
            task = self.id,
            values = self.group.values.len(),
            emitted = context.len(),
            "reduce task finished"
        );

        ReduceOutput {
            task_id: self.id,
            context,
            failure,
        }
    }
}
