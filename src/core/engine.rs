use crate::core::archive::{self, ArchiveOptions, ArchiveSummary};
use crate::core::stage::{ExportStage, StageTracker};
use crate::core::{ExportJob, Layout, Pipeline};
use crate::utils::error::{ExportError, Result};
use std::io::Write;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};

/// Runs exports end to end and owns the error boundary: every failure is
/// logged here with its kind, and the export's temporary root is removed on
/// every exit path.
pub struct ExportEngine<P: Pipeline> {
    pipeline: P,
    archive_options: ArchiveOptions,
    next_export_id: AtomicU64,
}

impl<P: Pipeline> ExportEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self {
            pipeline,
            archive_options: ArchiveOptions::default(),
            next_export_id: AtomicU64::new(1),
        }
    }

    pub fn with_archive_options(mut self, archive_options: ArchiveOptions) -> Self {
        self.archive_options = archive_options;
        self
    }

    /// Render and materialize `layout`. The returned export owns its
    /// temporary root; streaming it (or dropping it) removes that root.
    pub async fn prepare(&self, layout: &Layout) -> Result<PreparedExport> {
        let export_id = self.next_export_id.fetch_add(1, Ordering::Relaxed);
        let mut tracker = StageTracker::new(export_id);

        tracing::info!(export_id, elements = layout.len(), "Starting export");

        let duplicates = layout.duplicate_ids();
        if !duplicates.is_empty() {
            tracing::warn!(
                export_id,
                "Layout has duplicate element ids {:?}; generated keys will collide",
                duplicates
            );
        }

        match self.render_and_materialize(layout, &mut tracker).await {
            Ok(job) => Ok(PreparedExport {
                job,
                tracker,
                archive_options: self.archive_options,
            }),
            Err(e) => {
                tracker.fail();
                log_failure(export_id, &e);
                Err(e)
            }
        }
    }

    async fn render_and_materialize(&self, layout: &Layout, tracker: &mut StageTracker) -> Result<ExportJob> {
        tracker.advance(ExportStage::Rendering)?;
        let project = self.pipeline.render(layout).await?;
        tracing::debug!(export_id = tracker.export_id(), "Rendered {} files", project.len());

        tracker.advance(ExportStage::Materializing)?;
        let job = self.pipeline.materialize(&project).await?;
        tracing::debug!(
            export_id = tracker.export_id(),
            "Materialized project at {}",
            job.root().display()
        );

        Ok(job)
    }

    /// Full export into `sink`, compressing on a blocking worker thread.
    pub async fn export_to<W>(&self, layout: &Layout, sink: W) -> Result<W>
    where
        W: Write + Send + 'static,
    {
        let prepared = self.prepare(layout).await?;
        tokio::task::spawn_blocking(move || prepared.stream_into(sink))
            .await
            .map_err(|e| ExportError::archive_io(std::io::Error::other(e)))?
    }
}

/// A materialized export waiting to be archived.
#[derive(Debug)]
pub struct PreparedExport {
    job: ExportJob,
    tracker: StageTracker,
    archive_options: ArchiveOptions,
}

impl PreparedExport {
    pub fn export_id(&self) -> u64 {
        self.tracker.export_id()
    }

    pub fn root(&self) -> &Path {
        self.job.root()
    }

    pub fn stage(&self) -> ExportStage {
        self.tracker.stage()
    }

    /// Archive the project into `sink`. Blocking; run it off the async runtime.
    /// The temporary root is gone when this returns, whatever the outcome.
    pub fn stream_into<W: Write>(self, mut sink: W) -> Result<W> {
        let PreparedExport {
            job,
            mut tracker,
            archive_options,
        } = self;

        let outcome = archive_job(job.root(), &mut sink, &archive_options, &mut tracker)
            .and_then(|summary| tracker.advance(ExportStage::Done).map(|_| summary));

        let export_id = tracker.export_id();
        match outcome {
            Ok(summary) => {
                job.cleanup();
                tracing::info!(
                    export_id,
                    files = summary.files,
                    bytes = summary.uncompressed_bytes,
                    "Export finished"
                );
                Ok(sink)
            }
            Err(e) => {
                tracker.fail();
                job.cleanup();
                log_failure(export_id, &e);
                Err(e)
            }
        }
    }
}

fn archive_job<W: Write>(
    root: &Path,
    sink: &mut W,
    options: &ArchiveOptions,
    tracker: &mut StageTracker,
) -> Result<ArchiveSummary> {
    tracker.advance(ExportStage::Archiving)?;
    let entries = archive::collect_entries(root)?;

    tracker.advance(ExportStage::Streaming)?;
    let summary = archive::write_entries(&entries, sink, options)?;
    sink.flush().map_err(ExportError::archive_io)?;

    Ok(summary)
}

fn log_failure(export_id: u64, err: &ExportError) {
    tracing::error!(export_id, kind = ?err.kind(), "Export failed: {}", err);
}
