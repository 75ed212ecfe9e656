use serde::Serialize;
use std::fmt;
use std::time::Duration;

/// Job phases, executed strictly in this order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Phase {
    Input,
    Map,
    Shuffle,
    Reduce,
    Merge,
    Output,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Input => "input",
            Phase::Map => "map",
            Phase::Shuffle => "shuffle",
            Phase::Reduce => "reduce",
            Phase::Merge => "merge",
            Phase::Output => "output",
        };
        f.write_str(name)
    }
}

/// A recovered user-logic failure inside one map or reduce task
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskFailure {
    pub phase: Phase,
    pub task_id: usize,
    /// Index of the failing record within the chunk (map tasks only)
    pub record: Option<usize>,
    pub reason: String,
}

impl fmt::Display for TaskFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.record {
            Some(record) => write!(
                f,
                "{} task {} failed on record {}: {}",
                self.phase, self.task_id, record, self.reason
            ),
            None => write!(
                f,
                "{} task {} failed: {}",
                self.phase, self.task_id, self.reason
            ),
        }
    }
}

/// Progress and timing summary of one job run
#[derive(Debug, Clone, Default, Serialize)]
pub struct JobReport {
    pub job_name: String,
    pub chunks: usize,
    pub records: usize,
    pub map_tasks: usize,
    pub intermediate_pairs: usize,
    pub key_groups: usize,
    pub reduce_tasks: usize,
    pub output_pairs: usize,
    pub failures: Vec<TaskFailure>,
    pub phase_durations: Vec<(Phase, Duration)>,
    pub elapsed: Duration,
}

impl JobReport {
    pub fn new(job_name: impl Into<String>) -> Self {
        Self {
            job_name: job_name.into(),
            ..Self::default()
        }
    }

    pub fn record_phase(&mut self, phase: Phase, duration: Duration) {
        self.phase_durations.push((phase, duration));
    }

    pub fn phase_duration(&self, phase: Phase) -> Option<Duration> {
        self.phase_durations
            .iter()
            .find(|(recorded, _)| *recorded == phase)
            .map(|(_, duration)| *duration)
    }

    pub fn failed_tasks(&self, phase: Phase) -> Vec<usize> {
        let mut tasks: Vec<usize> = self
            .failures
            .iter()
            .filter(|failure| failure.phase == phase)
            .map(|failure| failure.task_id)
            .collect();
        tasks.dedup();
        tasks
    }

    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }
}
