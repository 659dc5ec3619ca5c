//! Producer thread replaying a recorded vehicle message log

use std::io::BufRead;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use crate::{VehicleMessage, VehicleStateCache};

/// Longest uninterrupted sleep, so shutdown is noticed promptly
const MAX_SLEEP: Duration = Duration::from_millis(50);

/// Replays `sample_time_us;message_id;fields...` records into a cache
pub struct VehicleFeed {
    shutdown: Arc<AtomicBool>,
    thread: Option<JoinHandle<usize>>,
}

impl VehicleFeed {
    /// Replay records paced by their sample times
    pub fn spawn<R>(reader: R, cache: Arc<VehicleStateCache>) -> Self
    where
        R: BufRead + Send + 'static,
    {
        Self::start(reader, cache, true)
    }

    /// Replay records as fast as they can be read
    pub fn spawn_unpaced<R>(reader: R, cache: Arc<VehicleStateCache>) -> Self
    where
        R: BufRead + Send + 'static,
    {
        Self::start(reader, cache, false)
    }

    fn start<R>(reader: R, cache: Arc<VehicleStateCache>, paced: bool) -> Self
    where
        R: BufRead + Send + 'static,
    {
        let shutdown = Arc::new(AtomicBool::new(false));
        let shutdown_clone = shutdown.clone();

        let thread = std::thread::spawn(move || {
            let start = Instant::now();
            let mut first_sample: Option<i64> = None;
            let mut applied = 0usize;

            for (line_no, line) in reader.lines().enumerate() {
                if shutdown_clone.load(Ordering::SeqCst) {
                    break;
                }

                let line = match line {
                    Ok(line) => line,
                    Err(e) => {
                        warn!("Vehicle feed read error: {}", e);
                        break;
                    }
                };
                let trimmed = line.trim();
                if trimmed.is_empty() || trimmed.starts_with('#') {
                    continue;
                }

                let (sample_time_us, message) = match VehicleMessage::parse_record(trimmed) {
                    Ok(record) => record,
                    Err(e) => {
                        warn!("Skipping vehicle feed line {}: {}", line_no + 1, e);
                        continue;
                    }
                };

                if paced {
                    let origin = *first_sample.get_or_insert(sample_time_us);
                    let offset = Duration::from_micros((sample_time_us - origin).max(0) as u64);
                    if !sleep_until(start + offset, &shutdown_clone) {
                        break;
                    }
                }

                cache.apply(&message);
                applied += 1;
            }

            debug!("Vehicle feed finished after {} message(s)", applied);
            applied
        });

        info!("Vehicle feed started");
        Self {
            shutdown,
            thread: Some(thread),
        }
    }

    /// Wait for the feed to finish; returns the number of applied messages
    pub fn join(mut self) -> usize {
        self.thread
            .take()
            .and_then(|thread| thread.join().ok())
            .unwrap_or(0)
    }

    pub fn stop(&mut self) {
        self.shutdown.store(true, Ordering::SeqCst);
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                warn!("Vehicle feed thread panicked");
            }
        }
    }
}

impl Drop for VehicleFeed {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Returns false if shutdown was requested while sleeping
fn sleep_until(deadline: Instant, shutdown: &AtomicBool) -> bool {
    loop {
        if shutdown.load(Ordering::SeqCst) {
            return false;
        }
        let now = Instant::now();
        if now >= deadline {
            return true;
        }
        std::thread::sleep((deadline - now).min(MAX_SLEEP));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::VehicleState;
    use std::io::Cursor;

    #[test]
    fn test_unpaced_feed_applies_all_valid_records() {
        let log = "\
# sample_time_us;message_id;fields
0;1086;0.2
10;1044;0.0;0.0;-20.5

garbage line
20;1086;0.35
30;1090;-0.04
";
        let cache = Arc::new(VehicleStateCache::new());
        let feed = VehicleFeed::spawn_unpaced(Cursor::new(log), Arc::clone(&cache));

        assert_eq!(feed.join(), 4);
        assert_eq!(
            cache.snapshot(),
            VehicleState {
                pedal_position: 0.35,
                yaw_velocity: -20.5
            }
        );
        assert_eq!(cache.ground_steering(), Some(-0.04));
    }

    #[test]
    fn test_paced_feed_waits_for_sample_time() {
        let log = "1000000;1086;0.5\n1030000;1086;0.7\n";
        let cache = Arc::new(VehicleStateCache::new());
        let started = Instant::now();
        let feed = VehicleFeed::spawn(Cursor::new(log), Arc::clone(&cache));

        assert_eq!(feed.join(), 2);
        assert!(started.elapsed() >= Duration::from_millis(30));
        assert_eq!(cache.snapshot().pedal_position, 0.7);
    }

    #[test]
    fn test_stop_interrupts_paced_feed() {
        let log = "0;1086;0.5\n60000000;1086;0.9\n";
        let cache = Arc::new(VehicleStateCache::new());
        let mut feed = VehicleFeed::spawn(Cursor::new(log), Arc::clone(&cache));

        std::thread::sleep(Duration::from_millis(100));
        feed.stop();
        assert_eq!(cache.snapshot().pedal_position, 0.5);
    }
}
