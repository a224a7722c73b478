//! Offline feature computation: jobs, task queue and backfill

pub mod backfill;
pub mod jobs;
pub mod queue;

pub use backfill::backfill;
pub use jobs::{FeaturePipeline, JobOutcome};
pub use queue::{LocalQueue, QueueStats, RetryPolicy, Task, TaskHandler, TaskQueue};
