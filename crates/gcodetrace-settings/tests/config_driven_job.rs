//! A parse job configured from a settings file on disk

use gcodetrace_settings::Config;
use gcodetrace_visualizer::{run_job, WorkerMessage};
use tempfile::TempDir;

const PROGRAM: &str = "G21 G90\nG0 X0 Y0\nM3 S1000\nG1 X20 F600\nM5\nG1 X40\n";

fn final_messages(config: &Config) -> Vec<WorkerMessage> {
    let mut messages = Vec::new();
    run_job(config.job_request(PROGRAM, 3), |m| {
        if !matches!(m, WorkerMessage::Progress { .. }) {
            messages.push(m);
        }
    });
    messages
}

#[test]
fn test_laser_mode_from_config_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(
        &path,
        "[visualizer]\nlaser_mode = true\ninclude_svg = true\n",
    )
    .unwrap();
    let config = Config::load_from_file(&path).unwrap();

    let messages = final_messages(&config);
    assert_eq!(messages.len(), 2);
    let WorkerMessage::GeometryReady { colors, info, .. } = &messages[0] else {
        panic!("expected geometry, got {:?}", messages[0]);
    };
    // rapid, beam-on cut, beam-off cut
    let alphas: Vec<f32> = colors.chunks(8).map(|pair| pair[3]).collect();
    assert_eq!(alphas, vec![0.5, 1.0, 0.5]);
    assert!(info.svg.as_deref().is_some_and(|svg| svg.starts_with("M ")));
}

#[test]
fn test_default_rapid_rate_drives_rapid_time() {
    let mut slow = Config::new();
    slow.machine.default_rapid_rate = 600.0;
    let fast = Config::new();

    let rapid_time = |config: &Config| {
        let mut time = 0.0;
        run_job(config.job_request("G0 X60\n", 1), |m| {
            if let WorkerMessage::MetadataReady { parsed_data, .. } = m {
                time = parsed_data.estimates.rapid_time;
            }
        });
        time
    };
    // 60 mm at 600 mm/min
    assert!((rapid_time(&slow) - 6.0).abs() < 1e-9);
    assert!(rapid_time(&fast) < rapid_time(&slow));
}
