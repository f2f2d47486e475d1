//! Frame pacing

use std::time::Duration;

/// Default frame cadence (~60 Hz)
pub const DEFAULT_FRAME_INTERVAL: Duration = Duration::from_millis(16);

/// Fixed-cadence render gate
///
/// Keeps a monotonically advancing deadline. A tick fires only once the clock
/// has passed the deadline, and each fired tick moves the deadline forward by
/// exactly one interval. Late frames are caught up one per call.
#[derive(Debug, Clone)]
pub struct FrameGate {
    deadline: Duration,
    interval: Duration,
}

impl FrameGate {
    /// Create a gate whose first tick is one interval after `now`
    pub fn new(now: Duration, interval: Duration) -> Self {
        Self {
            deadline: now + interval,
            interval,
        }
    }

    /// Returns true if a frame should be rendered at `now`
    pub fn tick(&mut self, now: Duration) -> bool {
        if now > self.deadline {
            self.deadline += self.interval;
            true
        } else {
            false
        }
    }

    /// Time at which the next tick becomes due
    pub fn deadline(&self) -> Duration {
        self.deadline
    }

    /// Length of one tick
    pub fn interval(&self) -> Duration {
        self.interval
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TICK: Duration = Duration::from_millis(16);

    #[test]
    fn test_no_tick_before_deadline() {
        let mut gate = FrameGate::new(Duration::ZERO, TICK);
        assert!(!gate.tick(Duration::from_millis(10)));
        // Deadline itself is not past the deadline
        assert!(!gate.tick(TICK));
    }

    #[test]
    fn test_small_steps_render_once_per_boundary() {
        let mut gate = FrameGate::new(Duration::ZERO, TICK);
        let mut rendered = 0;
        // 4 ms steps for 100 ms crosses the 16/32/48/64/80/96 boundaries
        for step in 1..=25 {
            if gate.tick(Duration::from_millis(step * 4)) {
                rendered += 1;
            }
        }
        assert_eq!(rendered, 6);
    }

    #[test]
    fn test_large_jump_catches_up_one_tick_per_call() {
        let mut gate = FrameGate::new(Duration::ZERO, TICK);
        // Jump past 5 deadlines (16, 32, 48, 64, 80)
        let now = Duration::from_millis(81);
        for expected_deadline in [32, 48, 64, 80, 96] {
            assert!(gate.tick(now));
            assert_eq!(gate.deadline(), Duration::from_millis(expected_deadline));
        }
        assert!(!gate.tick(now));
    }

    #[test]
    fn test_deadline_not_reset_to_now() {
        let mut gate = FrameGate::new(Duration::from_millis(100), TICK);
        assert!(gate.tick(Duration::from_millis(500)));
        assert_eq!(gate.deadline(), Duration::from_millis(132));
        assert_eq!(gate.interval(), TICK);
    }
}
