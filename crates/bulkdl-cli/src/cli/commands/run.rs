//! `bulkdl run` – extract links, build the batch, drive it to completion.

use anyhow::Result;
use bulkdl_core::config::{self, BulkdlConfig};
use bulkdl_core::dedup::DedupFilter;
use bulkdl_core::guard::RateLimitGuard;
use bulkdl_core::job::{self, JobStatus};
use bulkdl_core::queue::{AdmissionQueue, ProgressEvent};
use bulkdl_core::transfer::{CurlAgent, TransferAgent};
use std::path::Path;

use super::{gather_candidates, parse_ext};

pub async fn run_batch(
    cfg: &BulkdlConfig,
    file: &Path,
    target: &Path,
    ext: &str,
    jobs_override: Option<usize>,
) -> Result<()> {
    let ext = parse_ext(ext)?;
    config::ensure_target_dir(target)?;
    let target = target.canonicalize()?;

    let mut candidates = gather_candidates(file, ext)?;
    if candidates.is_empty() {
        println!("No {ext} links found in {}.", file.display());
        return Ok(());
    }
    super::enrich_candidates(&mut candidates, ext);

    let mut jobs = job::build_jobs(&candidates, &target);
    let agent = CurlAgent::new();
    let filter = DedupFilter::snapshot(&target, agent.marker_suffix())?;
    let skipped = filter.apply(&mut jobs);
    println!(
        "{} file(s) to download, {} already present.",
        jobs.len() - skipped,
        skipped
    );

    let mut opts = cfg.batch_options();
    if let Some(n) = jobs_override {
        opts.max_concurrent = n;
    }

    let (progress_tx, mut progress_rx) = tokio::sync::mpsc::channel::<ProgressEvent>(64);
    let printer = tokio::spawn(async move {
        while let Some(ev) = progress_rx.recv().await {
            match ev.status {
                JobStatus::Running => {
                    let mib = ev.bytes_observed as f64 / 1_048_576.0;
                    println!("  {:<32} {:>8.1} MiB", ev.job_id, mib);
                }
                JobStatus::Failed => {
                    let reason = ev.error.as_deref().unwrap_or("unknown");
                    println!("  {:<32} failed: {reason}", ev.job_id);
                }
                status => println!("  {:<32} {status}", ev.job_id),
            }
        }
    });

    let queue =
        AdmissionQueue::new(&agent, RateLimitGuard::new(), opts).with_progress(progress_tx);
    let summary = queue.admit(&mut jobs).await?;
    // Queue holds the sender; drop it so the printer task sees the channel close.
    drop(queue);
    let _ = printer.await;

    print!("{summary}");
    Ok(())
}
