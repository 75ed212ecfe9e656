use crate::error::JobError;
use crate::map_reduce_job::{CombineLogic, FinalizeLogic, MapLogic, ReduceLogic};
use std::sync::{Arc, Mutex};

pub type MapHandle<K, V> = Arc<dyn MapLogic<K, V>>;
pub type ReduceHandle<K, V, OK, OV> = Arc<dyn ReduceLogic<K, V, OK, OV>>;
pub type CombineHandle<K, V> = Arc<dyn CombineLogic<K, V>>;
pub type FinalizeHandle<K, V> = Arc<dyn FinalizeLogic<K, V>>;

/// Registration point for the user logic of a job.
///
/// Handles are optional while the definition is being assembled; [`JobDefinition::validate`]
/// resolves them into a [`JobLogic`] and fails fast when map or reduce logic is missing.
pub struct JobDefinition<K, V, OK, OV> {
    mapper: Option<MapHandle<K, V>>,
    reducer: Option<ReduceHandle<K, V, OK, OV>>,
    combiner: Option<CombineHandle<K, V>>,
    finalizer: Option<FinalizeHandle<OK, OV>>,
    stateful_reducer: bool,
}

impl<K, V, OK, OV> Default for JobDefinition<K, V, OK, OV> {
    fn default() -> Self {
        Self {
            mapper: None,
            reducer: None,
            combiner: None,
            finalizer: None,
            stateful_reducer: false,
        }
    }
}

impl<K, V, OK, OV> JobDefinition<K, V, OK, OV>
where
    K: 'static,
    V: 'static,
    OK: 'static,
    OV: 'static,
{
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_mapper(mut self, mapper: impl MapLogic<K, V> + 'static) -> Self {
        self.mapper = Some(Arc::new(mapper));
        self
    }

    pub fn with_reducer(mut self, reducer: impl ReduceLogic<K, V, OK, OV> + 'static) -> Self {
        self.reducer = Some(Arc::new(reducer));
        self
    }

    pub fn with_combiner(mut self, combiner: impl CombineLogic<K, V> + 'static) -> Self {
        self.combiner = Some(Arc::new(combiner));
        self
    }

    pub fn with_finalizer(mut self, finalizer: impl FinalizeLogic<OK, OV> + 'static) -> Self {
        self.finalizer = Some(Arc::new(finalizer));
        self
    }

    /// Declares that the reduce logic keeps state across invocations.
    /// Reduce invocations are then serialized by the engine.
    pub fn with_stateful_reducer(mut self, stateful: bool) -> Self {
        self.stateful_reducer = stateful;
        self
    }

    pub fn validate(self) -> Result<JobLogic<K, V, OK, OV>, JobError> {
        let mapper = self.mapper.ok_or(JobError::MissingMapper)?;
        let reducer = self.reducer.ok_or(JobError::MissingReducer)?;

        Ok(JobLogic {
            mapper,
            reducer,
            combiner: self.combiner,
            finalizer: self.finalizer,
            reduce_lock: self.stateful_reducer.then(|| Arc::new(Mutex::new(()))),
        })
    }
}

/// Validated, immutable user logic for one job
pub struct JobLogic<K, V, OK, OV> {
    pub(crate) mapper: MapHandle<K, V>,
    pub(crate) reducer: ReduceHandle<K, V, OK, OV>,
    pub(crate) combiner: Option<CombineHandle<K, V>>,
    pub(crate) finalizer: Option<FinalizeHandle<OK, OV>>,
    pub(crate) reduce_lock: Option<Arc<Mutex<()>>>,
}

impl<K, V, OK, OV> Clone for JobLogic<K, V, OK, OV> {
    fn clone(&self) -> Self {
        Self {
            mapper: Arc::clone(&self.mapper),
            reducer: Arc::clone(&self.reducer),
            combiner: self.combiner.clone(),
            finalizer: self.finalizer.clone(),
            reduce_lock: self.reduce_lock.clone(),
        }
    }
}

impl<K, V, OK, OV> JobLogic<K, V, OK, OV> {
    pub fn has_combiner(&self) -> bool {
        self.combiner.is_some()
    }

    pub fn has_finalizer(&self) -> bool {
        self.finalizer.is_some()
    }

    pub fn serializes_reduce(&self) -> bool {
        self.reduce_lock.is_some()
    }
}
