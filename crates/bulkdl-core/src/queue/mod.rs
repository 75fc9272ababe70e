//! Admission-controlled scheduling of transfers.
//!
//! A single control loop drives the batch: poll every active supervisor,
//! release finished slots, park pending work when the rate-limit guard trips,
//! admit FIFO while slots are free, then sleep one tick. The loop only
//! sleeps when no more progress can be made on this tick; it never busy-spins
//! and never reorders jobs.

mod progress;
mod summary;

pub use progress::ProgressEvent;
pub use summary::BatchSummary;

use std::collections::VecDeque;

use anyhow::Result;
use tokio::sync::mpsc;

use crate::config::BatchOptions;
use crate::guard::RateLimitGuard;
use crate::job::{Job, JobStatus};
use crate::transfer::{TransferAgent, TransferOutcome, TransferSupervisor};

/// The scheduler for one batch. Holds pending jobs, admits up to the
/// concurrency ceiling, and reports aggregate progress.
pub struct AdmissionQueue<'a> {
    agent: &'a dyn TransferAgent,
    guard: RateLimitGuard,
    opts: BatchOptions,
    progress: Option<mpsc::Sender<ProgressEvent>>,
}

impl<'a> AdmissionQueue<'a> {
    pub fn new(agent: &'a dyn TransferAgent, guard: RateLimitGuard, opts: BatchOptions) -> Self {
        Self {
            agent,
            guard,
            opts,
            progress: None,
        }
    }

    /// Attaches a progress channel. Events are sent best-effort.
    pub fn with_progress(mut self, tx: mpsc::Sender<ProgressEvent>) -> Self {
        self.progress = Some(tx);
        self
    }

    /// Runs the batch to completion. Jobs are mutated in place; the returned
    /// summary accounts for every entry, including pre-skipped ones.
    pub async fn admit(&self, jobs: &mut [Job]) -> Result<BatchSummary> {
        self.opts.validate()?;

        let mut pending: VecDeque<usize> = jobs
            .iter()
            .enumerate()
            .filter(|(_, j)| j.status == JobStatus::Pending)
            .map(|(i, _)| i)
            .collect();
        let mut active: Vec<(usize, TransferSupervisor)> = Vec::new();

        tracing::info!(
            total = jobs.len(),
            pending = pending.len(),
            max_concurrent = self.opts.max_concurrent,
            "batch starting"
        );

        loop {
            self.poll_active(jobs, &mut active);

            // A tripped guard parks all pending work; running transfers are
            // left to resolve naturally.
            if self.guard.is_tripped() && !pending.is_empty() {
                while let Some(idx) = pending.pop_front() {
                    jobs[idx].status = JobStatus::Paused;
                    self.emit(&jobs[idx]);
                }
                tracing::warn!(
                    still_running = active.len(),
                    "admission halted; pending jobs paused"
                );
            }

            while !self.guard.is_tripped() && active.len() < self.opts.max_concurrent {
                let Some(idx) = pending.pop_front() else { break };
                self.admit_one(jobs, idx, &mut active);
            }

            if active.is_empty() && pending.is_empty() {
                break;
            }

            tokio::time::sleep(self.opts.poll_interval).await;
        }

        let summary = BatchSummary::from_jobs(jobs);
        tracing::info!(
            done = summary.done,
            failed = summary.failed,
            paused = summary.paused,
            skipped = summary.skipped,
            "batch finished"
        );
        Ok(summary)
    }

    /// One sweep over the active set; terminal supervisors release their slot.
    fn poll_active(&self, jobs: &mut [Job], active: &mut Vec<(usize, TransferSupervisor)>) {
        let mut i = 0;
        while i < active.len() {
            let (idx, supervisor) = &mut active[i];
            let idx = *idx;
            match supervisor.poll() {
                Ok(Some(outcome)) => {
                    self.conclude(&mut jobs[idx], outcome);
                    active.swap_remove(i);
                }
                Ok(None) => {
                    jobs[idx].bytes_observed = supervisor.bytes_observed();
                    self.emit(&jobs[idx]);
                    i += 1;
                }
                Err(e) => {
                    jobs[idx].fail(format!("{e:#}"));
                    self.emit(&jobs[idx]);
                    active.swap_remove(i);
                }
            }
        }
    }

    fn admit_one(&self, jobs: &mut [Job], idx: usize, active: &mut Vec<(usize, TransferSupervisor)>) {
        let job = &mut jobs[idx];
        match TransferSupervisor::start(
            self.agent,
            &job.source,
            &job.target_path,
            self.opts.stall_poll_limit,
        ) {
            Ok(supervisor) => {
                job.status = JobStatus::Running;
                tracing::info!(job = %job.id, "admitted");
                self.emit(job);
                active.push((idx, supervisor));
            }
            Err(e) => {
                job.fail(format!("could not start transfer agent: {e:#}"));
                tracing::warn!(job = %job.id, error = %e, "admission failed");
                self.emit(job);
            }
        }
    }

    fn conclude(&self, job: &mut Job, outcome: TransferOutcome) {
        match outcome {
            TransferOutcome::Done { bytes } => {
                job.status = JobStatus::Done;
                job.bytes_observed = bytes;
                tracing::info!(job = %job.id, bytes, "transfer complete");
            }
            TransferOutcome::Failed { reason } => {
                tracing::warn!(job = %job.id, %reason, "transfer failed");
                job.fail(reason);
            }
            TransferOutcome::RateLimited => {
                // Not a per-job failure: the job is parked and the guard
                // stops all further admission for this run.
                job.status = JobStatus::Paused;
                self.guard.observe();
                tracing::warn!(job = %job.id, "restricted-page redirect during transfer");
            }
        }
        self.emit(job);
    }

    fn emit(&self, job: &Job) {
        if let Some(tx) = &self.progress {
            let _ = tx.try_send(ProgressEvent {
                job_id: job.id.clone(),
                status: job.status,
                bytes_observed: job.bytes_observed,
                error: job.error.clone(),
            });
        }
    }
}
