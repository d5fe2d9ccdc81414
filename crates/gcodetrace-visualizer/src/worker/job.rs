//! Parse jobs
//!
//! A job interprets one program start to finish and reports through a
//! message callback: progress while running, then geometry and metadata.
//! Jobs never share state; a superseded job still runs to completion and
//! the host drops its messages by job id.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use gcodetrace_core::constants::DEFAULT_RAPID_RATE;
use gcodetrace_core::JobError;
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use super::messages::{GeometryInfo, JobRequest, ParsedData, Profile, WorkerMessage};
use crate::gcode::virtualizer::{Virtualizer, VirtualizerOptions};
use crate::geometry::rotary::{resolve_stock_radius, RotaryAxis, RotaryTransform};
use crate::handlers::{
    Fanout, GeometryBuffers, GeometryHandler, GeometryOptions, OutlineHandler, OutlineOptions,
};

/// Run a job on the current thread, reporting through `emit`
pub fn run_job<F>(request: JobRequest, mut emit: F)
where
    F: FnMut(WorkerMessage),
{
    let started_at = Utc::now();
    let timer = Instant::now();
    let JobRequest {
        content,
        is_laser,
        should_include_svg,
        collect_points,
        needs_visualization,
        accelerations,
        max_feedrates,
        default_rapid_rate,
        atc_enabled,
        rotary_diameter_offset_enabled,
        theme,
        job_id,
        legacy_messages,
    } = request;

    let total_lines = content.lines().count();
    debug!("Job {}: interpreting {} lines", job_id, total_lines);

    let stock_radius = resolve_stock_radius(&content, rotary_diameter_offset_enabled);
    let geometry = needs_visualization.then(|| {
        GeometryHandler::new(GeometryOptions {
            laser_mode: is_laser,
            theme: theme.unwrap_or_default(),
            rotary: RotaryTransform::new(RotaryAxis::X, stock_radius),
        })
    });
    let outline = OutlineHandler::new(OutlineOptions {
        collect_points,
        include_svg: should_include_svg,
    });
    let options = VirtualizerOptions {
        atc_enabled,
        accelerations,
        max_feedrates,
        default_rapid_rate: default_rapid_rate.unwrap_or(DEFAULT_RAPID_RATE),
        validate_checksums: true,
    };

    let mut virtualizer = Virtualizer::new(Fanout(geometry, outline), options);
    let mut last_progress = 0u8;
    for (index, line) in content.lines().enumerate() {
        virtualizer.virtualize(line);
        let progress = ((index + 1) * 100 / total_lines) as u8;
        if progress > last_progress {
            last_progress = progress;
            emit(WorkerMessage::Progress { progress, job_id });
        }
    }

    let (Fanout(geometry, outline), stats) = virtualizer.into_parts();
    let outline = outline.finish();
    let GeometryBuffers {
        vertices,
        colors,
        frames,
    } = geometry.map(GeometryHandler::into_buffers).unwrap_or_default();

    let elapsed = timer.elapsed();
    let parse_ms = elapsed.as_secs_f64() * 1000.0;
    let profile = Profile {
        started_at,
        parse_ms,
        lines_per_second: if elapsed.as_secs_f64() > 0.0 {
            total_lines as f64 / elapsed.as_secs_f64()
        } else {
            0.0
        },
    };
    debug!(
        "Job {}: {} events, {} vertices in {:.1} ms",
        job_id,
        stats.total_segments,
        vertices.len() / 3,
        parse_ms
    );

    let info = GeometryInfo {
        toolchanges: stats.tool_changes.clone(),
        total: stats.total_segments,
        invalid_lines: stats.invalid_lines.clone(),
        bounds: outline.bounds,
        svg: outline.svg,
        points: collect_points.then_some(outline.points),
    };
    let parsed_data = ParsedData {
        estimates: stats.estimates,
        invalid_lines: stats.invalid_lines.clone(),
        info: stats,
    };

    if legacy_messages {
        emit(WorkerMessage::Parsed {
            vertices,
            colors,
            frames,
            info,
            parsed_data,
            profile: Some(profile),
            job_id,
        });
    } else {
        emit(WorkerMessage::GeometryReady {
            vertices,
            colors,
            frames,
            info,
            needs_visualization,
            job_id,
        });
        emit(WorkerMessage::MetadataReady {
            parsed_data,
            profile: Some(profile),
            job_id,
        });
    }
}

/// Run a job on the blocking pool, sending its messages over `sender`.
///
/// Progress sends are fire-and-forget. The task fails with
/// [`JobError::ChannelClosed`] when the final message could not be delivered.
pub fn spawn_job(
    request: JobRequest,
    sender: UnboundedSender<WorkerMessage>,
) -> JoinHandle<Result<(), JobError>> {
    tokio::task::spawn_blocking(move || {
        let job_id = request.job_id;
        let mut delivered = true;
        run_job(request, |message| {
            let is_final = message.is_final();
            if sender.send(message).is_err() && is_final {
                delivered = false;
            }
        });
        if delivered {
            Ok(())
        } else {
            warn!("Job {}: receiver dropped before completion", job_id);
            Err(JobError::ChannelClosed { job_id })
        }
    })
}

/// Run a job to completion on the blocking pool
pub async fn execute_job(
    request: JobRequest,
    sender: UnboundedSender<WorkerMessage>,
) -> Result<(), JobError> {
    let job_id = request.job_id;
    spawn_job(request, sender)
        .await
        .map_err(|e| JobError::WorkerFailed {
            job_id,
            reason: e.to_string(),
        })?
}

/// Job id allocation and stale-message filtering
#[derive(Debug, Clone, Default)]
pub struct JobTracker {
    counter: Arc<AtomicU64>,
    active: Arc<AtomicU64>,
}

impl JobTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate the next job id and make it the active job
    pub fn begin(&self) -> u64 {
        let id = self.counter.fetch_add(1, Ordering::SeqCst) + 1;
        self.active.store(id, Ordering::SeqCst);
        id
    }

    /// Id of the active job, 0 before any job started
    pub fn active(&self) -> u64 {
        self.active.load(Ordering::SeqCst)
    }

    pub fn is_current(&self, job_id: u64) -> bool {
        job_id != 0 && job_id == self.active()
    }

    /// Whether `message` belongs to the active job
    pub fn accept(&self, message: &WorkerMessage) -> bool {
        let current = self.is_current(message.job_id());
        if !current {
            debug!(
                "Discarding message from stale job {} (active {})",
                message.job_id(),
                self.active()
            );
        }
        current
    }
}
