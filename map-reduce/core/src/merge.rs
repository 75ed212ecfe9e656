use crate::emission_context::{EmissionContext, Pair};
use crate::map_reduce_job::FinalizeLogic;
use indexmap::IndexSet;
use std::hash::Hash;

/// Concatenate reduce contexts, in task order, into the final pair sequence and
/// apply the finalize hook if one is configured.
pub fn merge<K, V, I>(contexts: I, finalizer: Option<&dyn FinalizeLogic<K, V>>) -> Vec<Pair<K, V>>
where
    I: IntoIterator<Item = EmissionContext<K, V>>,
{
    let pairs: Vec<Pair<K, V>> = contexts
        .into_iter()
        .flat_map(EmissionContext::into_pairs)
        .collect();

    match finalizer {
        Some(finalizer) => finalizer.finalize(pairs),
        None => pairs,
    }
}

/// Finalize hook that drops repeated pairs, keeping the first occurrence
#[derive(Debug, Clone, Copy, Default)]
pub struct DedupPairs;

impl<K, V> FinalizeLogic<K, V> for DedupPairs
where
    K: Hash + Eq + Send + Sync,
    V: Hash + Eq + Send + Sync,
{
    fn finalize(&self, pairs: Vec<Pair<K, V>>) -> Vec<Pair<K, V>> {
        pairs
            .into_iter()
            .collect::<IndexSet<_>>()
            .into_iter()
            .collect()
    }
}
