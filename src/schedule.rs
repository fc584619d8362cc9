use std::time::{Duration, Instant};

/// Turns wall-clock ticks into frame deltas.
#[derive(Debug, Default)]
pub struct FrameClock {
    last: Option<Instant>,
    suspended: bool,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seconds since the previous tick. The first tick after construction or
    /// `resume` yields 0; while suspended every tick yields 0.
    pub fn tick(&mut self, now: Instant) -> f32 {
        if self.suspended {
            return 0.0;
        }
        let dt = self
            .last
            .map_or(0.0, |last| now.saturating_duration_since(last).as_secs_f32());
        self.last = Some(now);
        dt
    }

    pub fn suspend(&mut self) {
        self.suspended = true;
    }

    pub fn resume(&mut self) {
        self.suspended = false;
        self.last = None;
    }

    pub fn is_suspended(&self) -> bool {
        self.suspended
    }
}

/// Coarse repeating timer polled from the frame loop.
#[derive(Debug)]
pub struct ResampleTimer {
    interval: Duration,
    next_due: Option<Instant>,
}

impl ResampleTimer {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval: interval.max(Duration::from_millis(1)),
            next_due: None,
        }
    }

    /// Arm the timer. Starting an armed timer keeps the existing schedule.
    pub fn start(&mut self, now: Instant) -> bool {
        if self.next_due.is_some() {
            return false;
        }
        self.next_due = Some(now + self.interval);
        true
    }

    pub fn cancel(&mut self) {
        self.next_due = None;
    }

    pub fn is_armed(&self) -> bool {
        self.next_due.is_some()
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Fires at most once per call. After a long stall the schedule restarts
    /// from `now` instead of replaying every missed tick.
    pub fn poll(&mut self, now: Instant) -> bool {
        let Some(due) = self.next_due else {
            return false;
        };
        if now < due {
            return false;
        }
        let next = due + self.interval;
        self.next_due = Some(if next <= now { now + self.interval } else { next });
        true
    }
}

pub struct FpsCounter {
    last: Instant,
    frames: u32,
    fps: f32,
}

impl FpsCounter {
    pub fn new(now: Instant) -> Self {
        Self {
            last: now,
            frames: 0,
            fps: 0.0,
        }
    }

    pub fn tick(&mut self, now: Instant) {
        self.frames += 1;
        let dt = now.saturating_duration_since(self.last).as_secs_f32();
        if dt >= 0.5 {
            self.fps = self.frames as f32 / dt;
            self.frames = 0;
            self.last = now;
        }
    }

    pub fn fps(&self) -> f32 {
        self.fps
    }
}
