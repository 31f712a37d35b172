//! Bounded worker pool for analysis jobs
//!
//! Explicitly constructed and explicitly shut down (on drop), owned by the
//! automation service instance rather than living as a process-wide
//! singleton, so tests can run isolated instances side by side.

use std::collections::BTreeMap;
use std::thread::JoinHandle;
use std::time::Instant;

use crossbeam_channel::{Receiver, Sender, bounded, unbounded};
use thiserror::Error;

use mx_core::{AnalysisMode, AnalysisSnapshot, TrackFeatures};

use crate::extract::extract_features;

/// Default worker count shared by one service instance.
pub const DEFAULT_ANALYSIS_WORKERS: usize = 2;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum JobError {
    #[error("analysis worker pool is shut down")]
    PoolShutDown,
}

struct AnalysisTask {
    analysis_id: String,
    mode: AnalysisMode,
    signals: BTreeMap<String, Vec<f64>>,
    result_tx: Sender<AnalysisSnapshot>,
}

/// Handle to one in-flight analysis job. `wait` blocks until that specific
/// job completes; jobs complete independently of each other.
pub struct AnalysisJob {
    result_rx: Receiver<AnalysisSnapshot>,
}

impl AnalysisJob {
    pub fn wait(self) -> Result<AnalysisSnapshot, JobError> {
        self.result_rx.recv().map_err(|_| JobError::PoolShutDown)
    }
}

/// Fixed-size analysis worker pool.
pub struct AnalysisPool {
    task_tx: Option<Sender<AnalysisTask>>,
    workers: Vec<JoinHandle<()>>,
}

impl AnalysisPool {
    pub fn new(worker_count: usize) -> Self {
        let worker_count = worker_count.max(1);
        let (task_tx, task_rx) = unbounded::<AnalysisTask>();

        let workers = (0..worker_count)
            .map(|index| {
                let rx = task_rx.clone();
                std::thread::Builder::new()
                    .name(format!("mix-analyze-{index}"))
                    .spawn(move || worker_loop(rx))
                    .expect("spawn analysis worker")
            })
            .collect();

        Self {
            task_tx: Some(task_tx),
            workers,
        }
    }

    /// Dispatch one analysis job. Non-blocking; the returned handle is the
    /// only way to observe completion.
    pub fn submit(
        &self,
        analysis_id: &str,
        mode: AnalysisMode,
        signals: BTreeMap<String, Vec<f64>>,
    ) -> Result<AnalysisJob, JobError> {
        let (result_tx, result_rx) = bounded(1);
        let task = AnalysisTask {
            analysis_id: analysis_id.to_string(),
            mode,
            signals,
            result_tx,
        };
        self.task_tx
            .as_ref()
            .ok_or(JobError::PoolShutDown)?
            .send(task)
            .map_err(|_| JobError::PoolShutDown)?;
        Ok(AnalysisJob { result_rx })
    }
}

impl Drop for AnalysisPool {
    fn drop(&mut self) {
        // Closing the task channel lets each worker drain and exit.
        self.task_tx.take();
        for worker in self.workers.drain(..) {
            let _ = worker.join();
        }
    }
}

fn worker_loop(rx: Receiver<AnalysisTask>) {
    while let Ok(task) = rx.recv() {
        let started = Instant::now();
        let track_features: BTreeMap<String, TrackFeatures> = task
            .signals
            .iter()
            .map(|(track_id, signal)| (track_id.clone(), extract_features(signal, task.mode)))
            .collect();
        let track_count = track_features.len();
        let snapshot = AnalysisSnapshot::new(task.analysis_id.clone(), task.mode, track_features);
        log::debug!(
            "analysis '{}' ({}) finished: {} tracks in {:?}",
            task.analysis_id,
            task.mode,
            track_count,
            started.elapsed()
        );
        // Receiver may be gone if the caller dropped the job handle.
        let _ = task.result_tx.send(snapshot);
    }
}
