use std::time::{Duration, Instant};

/// Animation-frame scheduler. Once cancelled it never schedules again.
pub struct FrameLoop {
    target_frame_duration: Duration,
    next_frame_time: Instant,
    frames: u64,
    cancelled: bool,
}

impl FrameLoop {
    pub fn new(target_frame_duration: Duration, now: Instant) -> Self {
        Self {
            target_frame_duration,
            next_frame_time: now,
            frames: 0,
            cancelled: false,
        }
    }

    /// Follows the monitor refresh rate when it is known.
    pub fn set_refresh_rate_millihertz(&mut self, millihz: Option<u32>, now: Instant) {
        let mut target = Duration::from_millis(16);
        if let Some(millihz) = millihz {
            let hz = millihz as f32 / 1000.0;
            if hz > 1.0 {
                target = Duration::from_secs_f32(1.0 / hz);
            }
        }
        self.target_frame_duration = target;
        self.next_frame_time = now + target;
    }

    #[cfg(test)]
    pub fn target_frame_duration(&self) -> Duration {
        self.target_frame_duration
    }

    /// Whether a frame is due now, plus the next wake-up (`None` once cancelled).
    pub fn poll(&mut self, now: Instant) -> (bool, Option<Instant>) {
        if self.cancelled {
            return (false, None);
        }
        let due = now >= self.next_frame_time;
        if due {
            self.next_frame_time = now + self.target_frame_duration;
        }
        (due, Some(self.next_frame_time))
    }

    pub fn begin_frame(&mut self) {
        self.frames = self.frames.saturating_add(1);
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn cancel(&mut self) {
        self.cancelled = true;
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled
    }
}
