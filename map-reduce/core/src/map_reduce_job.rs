use crate::emission_context::{Emitter, Pair};
use crate::error::UserLogicError;

/// User map logic: given one record, emit zero or more intermediate pairs.
///
/// Implemented for any `Fn(&str, &mut Emitter<K, V>) -> Result<(), UserLogicError>`.
/// The engine does not assume the logic is idempotent.
pub trait MapLogic<K, V>: Send + Sync {
    fn map(&self, record: &str, emitter: &mut Emitter<'_, K, V>) -> Result<(), UserLogicError>;
}

impl<F, K, V> MapLogic<K, V> for F
where
    F: Fn(&str, &mut Emitter<'_, K, V>) -> Result<(), UserLogicError> + Send + Sync,
{
    fn map(&self, record: &str, emitter: &mut Emitter<'_, K, V>) -> Result<(), UserLogicError> {
        (self)(record, emitter)
    }
}

/// User reduce logic: given a key and all of its values in map order,
/// emit zero or more final pairs under the same key, a derived key, or several keys.
pub trait ReduceLogic<K, V, OK, OV>: Send + Sync {
    fn reduce(
        &self,
        key: &K,
        values: &[V],
        emitter: &mut Emitter<'_, OK, OV>,
    ) -> Result<(), UserLogicError>;
}

impl<F, K, V, OK, OV> ReduceLogic<K, V, OK, OV> for F
where
    F: Fn(&K, &[V], &mut Emitter<'_, OK, OV>) -> Result<(), UserLogicError> + Send + Sync,
{
    fn reduce(
        &self,
        key: &K,
        values: &[V],
        emitter: &mut Emitter<'_, OK, OV>,
    ) -> Result<(), UserLogicError> {
        (self)(key, values, emitter)
    }
}

/// Optional pre-aggregation of one map task's values for a key.
///
/// Must be associative and commutative with respect to the reduce logic:
/// it may only shrink the value list, never change the reduced result.
pub trait CombineLogic<K, V>: Send + Sync {
    fn combine(&self, key: &K, values: Vec<V>) -> Vec<V>;
}

impl<F, K, V> CombineLogic<K, V> for F
where
    F: Fn(&K, Vec<V>) -> Vec<V> + Send + Sync,
{
    fn combine(&self, key: &K, values: Vec<V>) -> Vec<V> {
        (self)(key, values)
    }
}

/// Optional post-processing of the merged output (dedupe, reformat, reorder)
pub trait FinalizeLogic<K, V>: Send + Sync {
    fn finalize(&self, pairs: Vec<Pair<K, V>>) -> Vec<Pair<K, V>>;
}

impl<F, K, V> FinalizeLogic<K, V> for F
where
    F: Fn(Vec<Pair<K, V>>) -> Vec<Pair<K, V>> + Send + Sync,
{
    fn finalize(&self, pairs: Vec<Pair<K, V>>) -> Vec<Pair<K, V>> {
        (self)(pairs)
    }
}
