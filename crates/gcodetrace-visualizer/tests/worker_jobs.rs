//! Parse jobs driven through the async channel contract

use gcodetrace_core::JobError;
use gcodetrace_visualizer::{execute_job, spawn_job, JobRequest, JobTracker, WorkerMessage};
use tokio::sync::mpsc::unbounded_channel;

const PROGRAM: &str = "(Cylinder Dia: 20)\nG21 G90\nT1 M6\nG0 X0 Y0 Z5\nG1 Z-1 F300\nG2 X10 Y0 I5 J0\nG1 X10 A90\nM5\n";

#[tokio::test]
async fn test_job_streams_progress_then_results() {
    let (tx, mut rx) = unbounded_channel();
    execute_job(JobRequest::new(PROGRAM, 1), tx).await.unwrap();

    let mut messages = Vec::new();
    while let Some(message) = rx.recv().await {
        messages.push(message);
    }

    let (progress, results): (Vec<_>, Vec<_>) = messages
        .into_iter()
        .partition(|m| matches!(m, WorkerMessage::Progress { .. }));
    assert!(!progress.is_empty());
    assert_eq!(results.len(), 2);

    match &results[0] {
        WorkerMessage::GeometryReady {
            vertices,
            colors,
            frames,
            info,
            ..
        } => {
            assert_eq!(vertices.len() / 3, colors.len() / 4);
            assert_eq!(frames.len() as u64, info.total);
            assert_eq!(info.toolchanges.len(), 1);
            assert!(info.invalid_lines.is_empty());
        }
        other => panic!("expected geometry first, got {other:?}"),
    }
    match &results[1] {
        WorkerMessage::MetadataReady { parsed_data, .. } => {
            assert_eq!(parsed_data.info.counts.arc, 1);
            assert_eq!(parsed_data.info.counts.curve, 1);
            assert!(parsed_data.estimates.total_time > 0.0);
        }
        other => panic!("expected metadata last, got {other:?}"),
    }
}

#[tokio::test]
async fn test_dropped_receiver_reports_closed_channel() {
    let (tx, rx) = unbounded_channel();
    drop(rx);
    let err = execute_job(JobRequest::new(PROGRAM, 9), tx)
        .await
        .unwrap_err();
    assert!(matches!(err, JobError::ChannelClosed { job_id: 9 }));
}

#[tokio::test]
async fn test_superseded_job_messages_are_discarded() {
    let tracker = JobTracker::new();
    let (tx, mut rx) = unbounded_channel();

    let first = tracker.begin();
    let stale = spawn_job(JobRequest::new(PROGRAM, first), tx.clone());
    let second = tracker.begin();
    let current = spawn_job(JobRequest::new("G1 X1 F100\n", second), tx);

    stale.await.unwrap().unwrap();
    current.await.unwrap().unwrap();

    let mut accepted = Vec::new();
    while let Some(message) = rx.recv().await {
        if tracker.accept(&message) {
            accepted.push(message);
        }
    }
    assert!(!accepted.is_empty());
    assert!(accepted.iter().all(|m| m.job_id() == second));
    assert_eq!(accepted.iter().filter(|m| m.is_final()).count(), 1);
}
