use crate::chunk_source::Chunk;
use crate::emission_context::EmissionContext;
use crate::job_report::{Phase, TaskFailure};
use crate::map_reduce_job::MapLogic;
use crate::utils::panic_message;
use std::panic::{catch_unwind, AssertUnwindSafe};
use tracing::{debug, warn};

/// One chunk bound to the map phase
#[derive(Debug)]
pub struct MapTask {
    pub id: usize,
    chunk: Chunk,
}

/// What a map task leaves behind for the shuffle stage
#[derive(Debug)]
pub struct MapOutput<K, V> {
    pub task_id: usize,
    pub context: EmissionContext<K, V>,
    pub failures: Vec<TaskFailure>,
}

impl<K, V> MapOutput<K, V> {
    pub fn failed(&self) -> bool {
        !self.failures.is_empty()
    }
}

impl MapTask {
    pub fn new(chunk: Chunk) -> Self {
        Self { id: chunk.id, chunk }
    }

    /// Feed every record, in order, to the map logic.
    ///
    /// A record whose logic returns an error or panics is logged and recorded as a
    /// failure; pairs emitted before the failure stay in the context and the
    /// remaining records are still processed.
    pub fn execute<K, V>(self, logic: &dyn MapLogic<K, V>) -> MapOutput<K, V> {
        let mut context = EmissionContext::new();
        let mut failures = Vec::new();

        for (index, record) in self.chunk.records.iter().enumerate() {
            let mut emitter = context.emitter();
            let outcome = catch_unwind(AssertUnwindSafe(|| logic.map(record, &mut emitter)));

            let reason = match outcome {
                Ok(Ok(())) => continue,
                Ok(Err(e)) => e.to_string(),
                Err(payload) => format!("panicked: {}", panic_message(payload.as_ref())),
            };
            warn!(task = self.id, record = index, %reason, "map logic failed");
            failures.push(TaskFailure {
                phase: Phase::Map,
                task_id: self.id,
                record: Some(index),
                reason,
            });
        }

        debug!(
            task = self.id,
            records = self.chunk.records.len(),
            emitted = context.len(),
            "map task finished"
        );

        MapOutput {
            task_id: self.id,
            context,
            failures,
        }
    }
}
