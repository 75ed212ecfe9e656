use map_reduce_core::chunk_source::Chunk;
use map_reduce_core::mapper::MapTask;
use map_reduce_core::merge::{merge, DedupPairs};
use map_reduce_core::reducer::ReduceTask;
use map_reduce_core::shuffle::KeyGroup;
use map_reduce_core::{EmissionContext, Emitter, Pair, Phase, ReduceLogic, UserLogicError};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

fn chunk(id: usize, records: &[&str]) -> Chunk {
    Chunk {
        id,
        records: records.iter().map(|record| record.to_string()).collect(),
    }
}

fn split_words(record: &str, emitter: &mut Emitter<'_, String, u32>) -> Result<(), UserLogicError> {
    for word in record.split_whitespace() {
        emitter.emit(word.to_string(), 1);
    }
    Ok(())
}

fn fail_on_three(record: &str, emitter: &mut Emitter<'_, String, u32>) -> Result<(), UserLogicError> {
    emitter.emit(record.to_string(), 1);
    if record == "r3" {
        return Err(UserLogicError::failed("bad record"));
    }
    Ok(())
}

fn panic_on_three(record: &str, emitter: &mut Emitter<'_, String, u32>) -> Result<(), UserLogicError> {
    if record == "r3" {
        panic!("cannot parse {}", record);
    }
    emitter.emit(record.to_string(), 1);
    Ok(())
}

fn count(key: &String, values: &[u32], emitter: &mut Emitter<'_, String, u32>) -> Result<(), UserLogicError> {
    emitter.emit(key.clone(), values.iter().sum());
    Ok(())
}

fn explode(key: &String, values: &[u32], emitter: &mut Emitter<'_, String, u32>) -> Result<(), UserLogicError> {
    for (index, value) in values.iter().enumerate() {
        emitter.emit(format!("{}-{}", key, index), *value);
    }
    Ok(())
}

fn half(key: &String, _values: &[u32], emitter: &mut Emitter<'_, String, u32>) -> Result<(), UserLogicError> {
    emitter.emit(key.clone(), 1);
    Err(UserLogicError::failed("second half missing"))
}

/// Reduce logic that records how many invocations overlap
#[derive(Default)]
struct ConcurrencyTracker {
    active: Mutex<usize>,
    max_active: Mutex<usize>,
}

impl ReduceLogic<String, u32, String, u32> for ConcurrencyTracker {
    fn reduce(
        &self,
        key: &String,
        _values: &[u32],
        emitter: &mut Emitter<'_, String, u32>,
    ) -> Result<(), UserLogicError> {
        let now = {
            let mut active = self.active.lock().unwrap();
            *active += 1;
            *active
        };
        {
            let mut max_active = self.max_active.lock().unwrap();
            *max_active = (*max_active).max(now);
        }
        thread::sleep(Duration::from_millis(5));
        *self.active.lock().unwrap() -= 1;
        emitter.emit(key.clone(), 1);
        Ok(())
    }
}

#[test]
fn test_map_task_emits_in_record_order() {
    let task = MapTask::new(chunk(4, &["a b", "c", "a"]));

    let output = task.execute::<String, u32>(&split_words);

    assert_eq!(output.task_id, 4);
    assert!(!output.failed());
    let keys: Vec<&str> = output.context.pairs().iter().map(|p| p.key.as_str()).collect();
    assert_eq!(keys, vec!["a", "b", "c", "a"]);
}

#[test]
fn test_map_task_keeps_partial_output_on_error() {
    let task = MapTask::new(chunk(0, &["r1", "r2", "r3", "r4", "r5"]));

    let output = task.execute::<String, u32>(&fail_on_three);

    // Pairs emitted before the error and by later records are kept
    let keys: Vec<&str> = output.context.pairs().iter().map(|p| p.key.as_str()).collect();
    assert_eq!(keys, vec!["r1", "r2", "r3", "r4", "r5"]);
    assert_eq!(output.failures.len(), 1);
    assert_eq!(output.failures[0].phase, Phase::Map);
    assert_eq!(output.failures[0].record, Some(2));
    assert!(output.failures[0].reason.contains("bad record"));
}

#[test]
fn test_map_task_recovers_from_panic() {
    let task = MapTask::new(chunk(1, &["r1", "r2", "r3", "r4", "r5"]));

    let output = task.execute::<String, u32>(&panic_on_three);

    let keys: Vec<&str> = output.context.pairs().iter().map(|p| p.key.as_str()).collect();
    assert_eq!(keys, vec!["r1", "r2", "r4", "r5"]);
    assert!(output.failed());
    assert_eq!(output.failures[0].task_id, 1);
    assert!(output.failures[0].reason.contains("cannot parse r3"));
}

#[test]
fn test_reduce_task_sees_all_values() {
    let task = ReduceTask::new(
        2,
        KeyGroup {
            key: "a".to_string(),
            values: vec![1, 2, 3],
        },
    );

    let output = task.execute::<String, u32>(&count, None);

    assert_eq!(output.task_id, 2);
    assert!(output.failure.is_none());
    assert_eq!(output.context.into_pairs(), vec![Pair::new("a".to_string(), 6)]);
}

#[test]
fn test_reduce_task_may_emit_several_keys() {
    let task = ReduceTask::new(
        0,
        KeyGroup {
            key: "k".to_string(),
            values: vec![7, 8],
        },
    );

    let output = task.execute::<String, u32>(&explode, None);

    assert_eq!(
        output.context.into_pairs(),
        vec![Pair::new("k-0".to_string(), 7), Pair::new("k-1".to_string(), 8)]
    );
}

#[test]
fn test_reduce_task_failure_keeps_partial_output() {
    let task = ReduceTask::new(
        3,
        KeyGroup {
            key: "k".to_string(),
            values: vec![1],
        },
    );

    let output = task.execute::<String, u32>(&half, None);

    assert_eq!(output.context.len(), 1);
    let failure = output.failure.unwrap();
    assert_eq!(failure.phase, Phase::Reduce);
    assert_eq!(failure.task_id, 3);
    assert_eq!(failure.record, None);
}

#[test]
fn test_reduce_lock_serializes_invocations() {
    let tracker = Arc::new(ConcurrencyTracker::default());
    let lock = Arc::new(Mutex::new(()));

    let handles: Vec<_> = (0..8)
        .map(|id| {
            let tracker = Arc::clone(&tracker);
            let lock = Arc::clone(&lock);
            thread::spawn(move || {
                let task = ReduceTask::new(
                    id,
                    KeyGroup {
                        key: format!("k{}", id),
                        values: vec![1u32],
                    },
                );
                task.execute::<String, u32>(tracker.as_ref(), Some(lock.as_ref()))
            })
        })
        .collect();

    for handle in handles {
        let output = handle.join().unwrap();
        assert!(output.failure.is_none());
        assert_eq!(output.context.len(), 1);
    }
    assert_eq!(*tracker.max_active.lock().unwrap(), 1);
}

#[test]
fn test_merge_concatenates_in_task_order() {
    let contexts: Vec<EmissionContext<String, u32>> = vec![
        [Pair::new("b".to_string(), 1)].into_iter().collect(),
        EmissionContext::new(),
        [Pair::new("a".to_string(), 2), Pair::new("a".to_string(), 3)]
            .into_iter()
            .collect(),
    ];

    let pairs = merge(contexts, None);

    assert_eq!(
        pairs,
        vec![
            Pair::new("b".to_string(), 1),
            Pair::new("a".to_string(), 2),
            Pair::new("a".to_string(), 3),
        ]
    );
}

#[test]
fn test_merge_applies_finalizer() {
    let contexts: Vec<EmissionContext<String, u32>> = vec![
        [Pair::new("a".to_string(), 1), Pair::new("b".to_string(), 2)]
            .into_iter()
            .collect(),
        [Pair::new("a".to_string(), 1), Pair::new("c".to_string(), 3)]
            .into_iter()
            .collect(),
    ];

    let pairs = merge(contexts, Some(&DedupPairs));

    assert_eq!(
        pairs,
        vec![
            Pair::new("a".to_string(), 1),
            Pair::new("b".to_string(), 2),
            Pair::new("c".to_string(), 3),
        ]
    );
}
