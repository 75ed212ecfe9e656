use crate::emission_context::{EmissionContext, Pair};
use crate::map_reduce_job::CombineLogic;
use indexmap::IndexMap;
use std::hash::Hash;

/// A key with every value emitted for it, in map-task then record order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyGroup<K, V> {
    pub key: K,
    pub values: Vec<V>,
}

impl<K, V> KeyGroup<K, V> {
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Group the pairs of all map contexts by key.
///
/// Contexts must be passed in task-creation order. Groups come out in order of the
/// first occurrence of their key, and each group keeps its values in encounter
/// order, so the result never depends on which map task finished first.
pub fn group<K, V, I>(contexts: I) -> Vec<KeyGroup<K, V>>
where
    K: Hash + Eq,
    I: IntoIterator<Item = EmissionContext<K, V>>,
{
    let mut groups: IndexMap<K, Vec<V>> = IndexMap::new();
    for context in contexts {
        for Pair { key, value } in context.into_pairs() {
            groups.entry(key).or_default().push(value);
        }
    }

    groups
        .into_iter()
        .map(|(key, values)| KeyGroup { key, values })
        .collect()
}

/// Pre-aggregate one map task's output: its values are grouped per key, passed
/// through the combiner, and re-emitted with keys in first-occurrence order.
pub fn combine<K, V>(
    context: EmissionContext<K, V>,
    combiner: &dyn CombineLogic<K, V>,
) -> EmissionContext<K, V>
where
    K: Hash + Eq + Clone,
{
    let mut local: IndexMap<K, Vec<V>> = IndexMap::new();
    for Pair { key, value } in context.into_pairs() {
        local.entry(key).or_default().push(value);
    }

    let mut combined = EmissionContext::new();
    let mut emitter = combined.emitter();
    for (key, values) in local {
        for value in combiner.combine(&key, values) {
            emitter.emit(key.clone(), value);
        }
    }
    combined
}

/// The shuffle stage: optional per-task combine followed by global grouping
pub fn shuffle<K, V>(
    contexts: Vec<EmissionContext<K, V>>,
    combiner: Option<&dyn CombineLogic<K, V>>,
) -> Vec<KeyGroup<K, V>>
where
    K: Hash + Eq + Clone,
{
    match combiner {
        Some(combiner) => group(
            contexts
                .into_iter()
                .map(|context| combine(context, combiner)),
        ),
        None => group(contexts),
    }
}
