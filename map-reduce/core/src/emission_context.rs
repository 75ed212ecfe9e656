/// A (key, value) pair emitted by user logic
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Pair<K, V> {
    pub key: K,
    pub value: V,
}

impl<K, V> Pair<K, V> {
    pub fn new(key: K, value: V) -> Self {
        Self { key, value }
    }

    pub fn into_parts(self) -> (K, V) {
        (self.key, self.value)
    }
}

/// Ordered, append-only list of pairs owned by exactly one task.
///
/// A context is only written through an [`Emitter`] while its task runs and is
/// handed over read-only to the next phase afterwards, so emission needs no locking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmissionContext<K, V> {
    pairs: Vec<Pair<K, V>>,
}

impl<K, V> Default for EmissionContext<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> EmissionContext<K, V> {
    pub fn new() -> Self {
        Self { pairs: Vec::new() }
    }

    /// Write handle bound to this context
    pub fn emitter(&mut self) -> Emitter<'_, K, V> {
        Emitter { context: self }
    }

    pub fn pairs(&self) -> &[Pair<K, V>] {
        &self.pairs
    }

    pub fn into_pairs(self) -> Vec<Pair<K, V>> {
        self.pairs
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    fn push(&mut self, pair: Pair<K, V>) {
        self.pairs.push(pair);
    }
}

impl<K, V> FromIterator<Pair<K, V>> for EmissionContext<K, V> {
    fn from_iter<I: IntoIterator<Item = Pair<K, V>>>(iter: I) -> Self {
        Self {
            pairs: iter.into_iter().collect(),
        }
    }
}

/// Write handle given to user logic for one invocation
pub struct Emitter<'a, K, V> {
    context: &'a mut EmissionContext<K, V>,
}

impl<K, V> Emitter<'_, K, V> {
    pub fn emit(&mut self, key: K, value: V) {
        self.context.push(Pair::new(key, value));
    }
}
