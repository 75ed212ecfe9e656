// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

pub mod chunk_source;
pub mod completion_signaling;
pub mod config;
pub mod emission_context;
pub mod error;
pub mod job_definition;
pub mod job_report;
pub mod map_reduce_job;
pub mod mapper;
pub mod merge;
pub mod orchestrator;
pub mod output_sink;
pub mod phase_executor;
pub mod pooled_phase_executor;
pub mod reducer;
pub mod shuffle;
pub mod utils;
pub mod worker;
pub mod worker_runtime;

pub use config::JobConfig;
pub use emission_context::{EmissionContext, Emitter, Pair};
pub use error::{JobError, UserLogicError};
pub use job_definition::JobDefinition;
pub use job_report::{JobReport, Phase, TaskFailure};
pub use map_reduce_job::{CombineLogic, FinalizeLogic, MapLogic, ReduceLogic};
pub use orchestrator::{run_job, JobResult, Orchestrator};
