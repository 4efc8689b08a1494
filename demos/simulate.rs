//! Drive the pose engine from a simulated tracker and print the tip pose.
//!
//! Usage: cargo run --example simulate

use std::sync::Arc;
use std::time::{Duration, Instant};
use tooltrack::{AcquisitionLoop, Pose, PoseSource, ToolRegistry, ToolUpdate};

/// Fake tracker: moves a pointer on a 50 mm circle at 100 Hz and drops
/// line of sight for a moment halfway through.
struct SimulatedTracker {
    tick: u64,
}

impl PoseSource for SimulatedTracker {
    fn poll(&mut self, _timeout: Duration) -> tooltrack::Result<Option<ToolUpdate>> {
        std::thread::sleep(Duration::from_millis(10));
        self.tick += 1;

        // Brief occlusion between ticks 200 and 220.
        if (200..220).contains(&self.tick) {
            return Ok(Some(ToolUpdate {
                tool: "pointer".to_owned(),
                pose: None,
                visible: false,
            }));
        }

        let angle = self.tick as f64 * 0.05;
        let pose = Pose::from_translation([50.0 * angle.cos(), 50.0 * angle.sin(), 0.0]);
        Ok(Some(ToolUpdate {
            tool: "pointer".to_owned(),
            pose: Some(pose),
            visible: true,
        }))
    }
}

fn main() {
    env_logger::init();

    let registry = Arc::new(ToolRegistry::new());
    let tool = match registry.register_with_serial("pointer", Some("SIM-0001")) {
        Ok(t) => t,
        Err(e) => {
            eprintln!("Failed to register tool: {}", e);
            std::process::exit(1);
        }
    };

    // 120 mm pointer shaft: the tip sits along the sensor's z axis.
    if let Err(e) = tool.set_tip_offset(Pose::from_translation([0.0, 0.0, 120.0])) {
        eprintln!("Failed to calibrate tool: {}", e);
        std::process::exit(1);
    }

    let acquisition = match AcquisitionLoop::start(SimulatedTracker { tick: 0 }, registry) {
        Ok(a) => a,
        Err(e) => {
            eprintln!("Failed to start acquisition: {}", e);
            std::process::exit(1);
        }
    };

    println!("Tracking '{}' for 4 seconds...", tool.name());

    let start = Instant::now();
    let mut events: u64 = 0;

    while start.elapsed() < Duration::from_secs(4) {
        match acquisition.recv_timeout(Duration::from_secs(1)) {
            Ok(event) => {
                events += 1;

                // Print every ~25th event to avoid flooding the terminal
                if events % 25 == 1 {
                    let tip = tool.effective_pose().translation;
                    println!(
                        "count={:<6} visible={:<5} tip=[{:+.2}, {:+.2}, {:+.2}]",
                        event.modification_count, event.visible, tip[0], tip[1], tip[2],
                    );
                }
            }
            Err(tooltrack::TrackingError::Timeout) => {
                eprintln!("Timeout waiting for tracking data");
                break;
            }
            Err(e) => {
                eprintln!("Error: {}", e);
                break;
            }
        }
    }

    acquisition.stop();
    println!(
        "\n{} events in {:.1}s, final modification count {}",
        events,
        start.elapsed().as_secs_f64(),
        tool.modification_count()
    );
}
