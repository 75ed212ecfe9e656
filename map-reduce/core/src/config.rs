use crate::error::JobError;
use crate::utils::default_worker_count;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

pub const DEFAULT_CHUNK_SIZE: usize = 128;

/// Immutable settings of one job run
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct JobConfig {
    #[serde(default = "default_job_name")]
    pub job_name: String,
    pub input_paths: Vec<PathBuf>,
    pub output_path: PathBuf,
    /// Number of non-blank records per map task
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
    /// Run tasks on a worker pool (true) or one at a time on the calling task (false)
    #[serde(default = "default_multi_threaded")]
    pub multi_threaded: bool,
    /// Worker pool size; defaults to the available hardware parallelism
    #[serde(default)]
    pub num_workers: Option<usize>,
}

fn default_job_name() -> String {
    "map-reduce".to_string()
}

fn default_chunk_size() -> usize {
    DEFAULT_CHUNK_SIZE
}

fn default_multi_threaded() -> bool {
    true
}

impl JobConfig {
    pub fn new(
        job_name: impl Into<String>,
        input_paths: Vec<PathBuf>,
        output_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            job_name: job_name.into(),
            input_paths,
            output_path: output_path.into(),
            chunk_size: DEFAULT_CHUNK_SIZE,
            multi_threaded: true,
            num_workers: None,
        }
    }

    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    pub fn with_multi_threaded(mut self, multi_threaded: bool) -> Self {
        self.multi_threaded = multi_threaded;
        self
    }

    pub fn with_num_workers(mut self, num_workers: usize) -> Self {
        self.num_workers = Some(num_workers);
        self
    }

    /// Load a job configuration from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, JobError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| JobError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&contents).map_err(|source| JobError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn validate(&self) -> Result<(), JobError> {
        if self.chunk_size == 0 {
            return Err(JobError::InvalidChunkSize);
        }
        if self.input_paths.is_empty() {
            return Err(JobError::NoInputPaths);
        }
        if self.num_workers == Some(0) {
            return Err(JobError::InvalidWorkerCount);
        }
        Ok(())
    }

    pub fn worker_count(&self) -> usize {
        self.num_workers.unwrap_or_else(default_worker_count)
    }

    pub fn log_summary(&self) {
        info!(
            job = %self.job_name,
            inputs = self.input_paths.len(),
            output = %self.output_path.display(),
            chunk_size = self.chunk_size,
            multi_threaded = self.multi_threaded,
            workers = if self.multi_threaded { self.worker_count() } else { 1 },
            "job configuration"
        );
    }
}
