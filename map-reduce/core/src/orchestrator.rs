use crate::chunk_source::read_chunks;
use crate::config::JobConfig;
use crate::emission_context::Pair;
use crate::error::JobError;
use crate::job_definition::{JobDefinition, JobLogic};
use crate::job_report::{JobReport, Phase};
use crate::mapper::{MapOutput, MapTask};
use crate::merge::merge;
use crate::output_sink::write_pairs;
use crate::phase_executor::{PhaseExecutor, SequentialPhaseExecutor};
use crate::pooled_phase_executor::PooledPhaseExecutor;
use crate::reducer::{ReduceOutput, ReduceTask};
use crate::shuffle::shuffle;
use crate::utils::panic_message;
use crate::worker::WorkFn;
use std::any::Any;
use std::fmt::Display;
use std::hash::Hash;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info, info_span, Instrument};

/// Final pairs of a job together with its report
#[derive(Debug)]
pub struct JobResult<K, V> {
    pub pairs: Vec<Pair<K, V>>,
    pub report: JobReport,
}

/// Drives the phases of one job strictly in order, with a full barrier between
/// phases: input, map, shuffle/combine, reduce, merge and output.
pub struct Orchestrator<K, V, OK, OV> {
    config: JobConfig,
    logic: JobLogic<K, V, OK, OV>,
}

impl<K, V, OK, OV> Orchestrator<K, V, OK, OV>
where
    K: Hash + Eq + Clone + Send + 'static,
    V: Send + 'static,
    OK: Display + Send + 'static,
    OV: Display + Send + 'static,
{
    /// Validate the config and resolve the user logic. Fails before any phase runs.
    pub fn new(
        config: JobConfig,
        definition: JobDefinition<K, V, OK, OV>,
    ) -> Result<Self, JobError> {
        config.validate()?;
        let logic = definition.validate()?;
        Ok(Self { config, logic })
    }

    /// Run every phase including the output write
    pub async fn run(&self) -> Result<JobReport, JobError> {
        let span = info_span!("job", name = %self.config.job_name);
        async {
            let started = Instant::now();
            let JobResult { pairs, mut report } = self.compute().await?;

            let phase_started = Instant::now();
            info!(
                path = %self.config.output_path.display(),
                pairs = pairs.len(),
                "writing output"
            );
            write_pairs(&self.config.output_path, &pairs)
                .await
                .inspect_err(|e| error!(error = %e, "output phase failed"))?;
            report.record_phase(Phase::Output, phase_started.elapsed());

            report.elapsed = started.elapsed();
            info!(
                job = %self.config.job_name,
                output = %self.config.output_path.display(),
                elapsed_ms = report.elapsed.as_millis() as u64,
                failed_tasks = report.failures.len(),
                "completed job"
            );
            Ok(report)
        }
        .instrument(span)
        .await
    }

    /// Run input, map, shuffle, reduce and merge, returning the final pairs
    /// without writing them
    pub async fn compute(&self) -> Result<JobResult<OK, OV>, JobError> {
        self.config.log_summary();
        if self.config.multi_threaded {
            let executor = PooledPhaseExecutor::new(self.config.worker_count());
            self.compute_with(&executor).await
        } else {
            self.compute_with(&SequentialPhaseExecutor).await
        }
    }

    async fn compute_with<E>(&self, executor: &E) -> Result<JobResult<OK, OV>, JobError>
    where
        E: PhaseExecutor,
    {
        let started = Instant::now();
        let mut report = JobReport::new(self.config.job_name.clone());

        // INPUT
        let phase_started = Instant::now();
        let chunks = read_chunks(
            &self.config.input_paths,
            self.config.chunk_size,
            self.config.multi_threaded,
        )
        .instrument(info_span!("phase", phase = %Phase::Input))
        .await
        .inspect_err(|e| error!(error = %e, "input phase failed"))?;
        report.chunks = chunks.len();
        report.records = chunks.iter().map(|chunk| chunk.len()).sum();
        report.record_phase(Phase::Input, phase_started.elapsed());
        info!(chunks = report.chunks, records = report.records, "input read");

        // MAP
        let phase_started = Instant::now();
        let map_tasks: Vec<MapTask> = chunks.into_iter().map(MapTask::new).collect();
        report.map_tasks = map_tasks.len();
        info!(mappers = map_tasks.len(), "map phase started");

        let mapper = Arc::clone(&self.logic.mapper);
        let map_work: WorkFn<MapTask, MapOutput<K, V>> =
            Arc::new(move |task: MapTask| task.execute(mapper.as_ref()));
        let map_outputs = executor
            .execute(Phase::Map, map_tasks, map_work)
            .instrument(info_span!("phase", phase = %Phase::Map))
            .await?;

        let mut contexts = Vec::with_capacity(map_outputs.len());
        for output in map_outputs {
            report.intermediate_pairs += output.context.len();
            report.failures.extend(output.failures);
            contexts.push(output.context);
        }
        report.record_phase(Phase::Map, phase_started.elapsed());
        info!(
            pairs = report.intermediate_pairs,
            failed_tasks = report.failed_tasks(Phase::Map).len(),
            "map phase completed"
        );

        // SHUFFLE / COMBINE
        let phase_started = Instant::now();
        let groups = {
            let _span = info_span!("phase", phase = %Phase::Shuffle).entered();
            let combiner = self.logic.combiner.as_deref();
            catch_unwind(AssertUnwindSafe(|| shuffle(contexts, combiner)))
                .map_err(|payload| hook_failed(Phase::Shuffle, payload.as_ref()))?
        };
        report.key_groups = groups.len();
        report.record_phase(Phase::Shuffle, phase_started.elapsed());
        info!(
            key_groups = groups.len(),
            combined = self.logic.has_combiner(),
            "shuffle phase completed"
        );

        // REDUCE
        let phase_started = Instant::now();
        let reduce_tasks: Vec<ReduceTask<K, V>> = groups
            .into_iter()
            .enumerate()
            .map(|(id, group)| ReduceTask::new(id, group))
            .collect();
        report.reduce_tasks = reduce_tasks.len();
        info!(
            reducers = reduce_tasks.len(),
            serialized = self.logic.serializes_reduce(),
            "reduce phase started"
        );

        let reducer = Arc::clone(&self.logic.reducer);
        let reduce_lock = self.logic.reduce_lock.clone();
        let reduce_work: WorkFn<ReduceTask<K, V>, ReduceOutput<OK, OV>> =
            Arc::new(move |task: ReduceTask<K, V>| {
                task.execute(reducer.as_ref(), reduce_lock.as_deref())
            });
        let reduce_outputs = executor
            .execute(Phase::Reduce, reduce_tasks, reduce_work)
            .instrument(info_span!("phase", phase = %Phase::Reduce))
            .await?;

        let mut contexts = Vec::with_capacity(reduce_outputs.len());
        for output in reduce_outputs {
            report.failures.extend(output.failure);
            contexts.push(output.context);
        }
        report.record_phase(Phase::Reduce, phase_started.elapsed());
        info!(
            failed_tasks = report.failed_tasks(Phase::Reduce).len(),
            "reduce phase completed"
        );

        // MERGE / FINALIZE
        let phase_started = Instant::now();
        let pairs = {
            let _span = info_span!("phase", phase = %Phase::Merge).entered();
            let finalizer = self.logic.finalizer.as_deref();
            catch_unwind(AssertUnwindSafe(|| merge(contexts, finalizer)))
                .map_err(|payload| hook_failed(Phase::Merge, payload.as_ref()))?
        };
        report.output_pairs = pairs.len();
        report.record_phase(Phase::Merge, phase_started.elapsed());
        info!(
            pairs = pairs.len(),
            finalized = self.logic.has_finalizer(),
            "reduced set size"
        );

        report.elapsed = started.elapsed();
        Ok(JobResult { pairs, report })
    }
}

fn hook_failed(phase: Phase, payload: &(dyn Any + Send)) -> JobError {
    let error = JobError::Hook {
        phase,
        reason: format!("panicked: {}", panic_message(payload)),
    };
    error!(error = %error, "{} phase failed", phase);
    error
}

/// Validate and run a job end to end.
///
/// Configuration errors are logged and returned before any phase starts, so no
/// output file is written for them.
pub async fn run_job<K, V, OK, OV>(
    config: JobConfig,
    definition: JobDefinition<K, V, OK, OV>,
) -> Result<JobReport, JobError>
where
    K: Hash + Eq + Clone + Send + 'static,
    V: Send + 'static,
    OK: Display + Send + 'static,
    OV: Display + Send + 'static,
{
    let orchestrator = Orchestrator::new(config, definition)
        .inspect_err(|e| error!(error = %e, "job configuration error"))?;
    orchestrator.run().await
}
