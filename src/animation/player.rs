/// Playback clock selecting one action of a model.
///
/// Clip time is measured against an epoch: `time = now - epoch`. When it runs
/// past the clip period, it is reduced modulo the period and the epoch moves
/// so the clock stays continuous.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnimationPlayer {
    current: Option<usize>,
    running: bool,
    time: f32,
    epoch: f32,
    /// Replaces the clock while set.
    frame_override: Option<f32>,
}

impl AnimationPlayer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts action `index` from time zero at `now`.
    pub fn begin(&mut self, index: usize, now: f32) {
        self.current = Some(index);
        self.running = true;
        self.time = 0.0;
        self.epoch = now;
    }

    pub fn stop(&mut self) {
        self.current = None;
        self.running = false;
        self.time = 0.0;
    }

    pub fn pause(&mut self) {
        self.running = false;
    }

    /// Continues from the paused clip time.
    pub fn resume(&mut self, now: f32) {
        if self.current.is_some() {
            self.epoch = now - self.time;
            self.running = true;
        }
    }

    /// Pins the clip time to `time` (seconds), or releases the pin with `None`.
    pub fn set_frame_override(&mut self, time: Option<f32>) {
        self.frame_override = time;
    }

    #[must_use]
    pub fn frame_override(&self) -> Option<f32> {
        self.frame_override
    }

    #[must_use]
    pub fn current(&self) -> Option<usize> {
        self.current
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running && self.current.is_some()
    }

    /// Clip time of the last advance.
    #[must_use]
    pub fn time(&self) -> f32 {
        self.time
    }

    /// Moves the clock to `now` for a clip repeating every `period` seconds
    /// and returns the clip time.
    pub fn advance(&mut self, now: f32, period: f32) -> f32 {
        if let Some(pinned) = self.frame_override.as_mut() {
            if *pinned > period {
                *pinned = 0.0;
            }
            self.time = *pinned;
            return self.time;
        }

        self.time = now - self.epoch;
        if period > 0.0 && self.time > period {
            self.time = self.time.rem_euclid(period);
            self.epoch = now - self.time;
        }
        self.time
    }
}
