//! Countdown state machine: start/stop/reset, warning blink, per-second
//! cues, and the heart/heartbreak feedback pair.

use log::{debug, info, warn};

use crate::shake::ShakeSpec;
use crate::stage::{FxKind, Stage};

// ---------------------------------------------------------------------------
// Timer
// ---------------------------------------------------------------------------

/// Independent countdown driven by `tick`, controlled by the dialogue
/// machine through timer-control nodes and wrong answers. Expiry latches:
/// once the countdown hits zero it stays disabled until an external reset.
pub struct Timer {
    start_value: f32,
    remaining: f32,
    running: bool,
    blinking: bool,
    expired: bool,
    blink_elapsed: f32,
    blink_lit: bool,
}

impl Timer {
    /// Remaining time at which the warning blink and urgent cues begin.
    pub const WARNING_THRESHOLD: f32 = 10.0;
    /// Blink color toggle period while in the warning range.
    pub const BLINK_INTERVAL: f32 = 0.5;
    pub const CUE_PITCH: f32 = 1.0;
    pub const URGENT_CUE_PITCH: f32 = 0.8;

    pub fn new(start_value: f32) -> Self {
        Self {
            start_value,
            remaining: start_value,
            running: false,
            blinking: false,
            expired: false,
            blink_elapsed: 0.0,
            blink_lit: false,
        }
    }

    #[allow(dead_code)]
    pub fn remaining(&self) -> f32 {
        self.remaining
    }

    #[allow(dead_code)]
    pub fn is_running(&self) -> bool {
        self.running
    }

    #[allow(dead_code)]
    pub fn is_blinking(&self) -> bool {
        self.blinking
    }

    pub fn is_expired(&self) -> bool {
        self.expired
    }

    /// Enable the countdown and show the display. With `reset`, refill to
    /// the configured start value first (this also clears a latched expiry).
    /// A non-reset start on an expired timer stays disabled.
    pub fn start(&mut self, reset: bool, stage: &mut dyn Stage) {
        if reset {
            self.remaining = self.start_value;
            self.expired = false;
            self.clear_blink(stage);
        }
        if self.expired {
            debug!("Timer start ignored: already expired");
            return;
        }
        self.running = true;
        stage.timer_shown(true);
        self.push_display(stage);
        info!("Timer started (reset={reset}), {:.1} remaining", self.remaining);
    }

    /// Disable the countdown, keeping `remaining` where it is. Clears the
    /// blink sub-state and hides the display.
    pub fn stop(&mut self, stage: &mut dyn Stage) {
        self.running = false;
        self.clear_blink(stage);
        stage.timer_shown(false);
        info!("Timer stopped, {:.1} remaining", self.remaining);
    }

    /// Refill to the start value, then stop. Clears a latched expiry.
    pub fn reset(&mut self, stage: &mut dyn Stage) {
        self.remaining = self.start_value;
        self.expired = false;
        self.push_display(stage);
        self.stop(stage);
    }

    /// Advance the countdown. Emits display updates and audio cues on
    /// integer-second crossings, runs the warning blink, and surfaces the
    /// expiry event exactly once.
    pub fn tick(&mut self, delta: f32, stage: &mut dyn Stage) {
        if !self.running || self.expired {
            return;
        }

        let before = self.remaining;
        self.remaining = (self.remaining - delta).max(0.0);

        if before.ceil() != self.remaining.ceil() {
            let pitch = if self.remaining <= Self::WARNING_THRESHOLD {
                Self::URGENT_CUE_PITCH
            } else {
                Self::CUE_PITCH
            };
            stage.timer_cue(pitch);
            self.push_display(stage);
        }

        if self.remaining > 0.0
            && self.remaining <= Self::WARNING_THRESHOLD
            && !self.blinking
        {
            info!("Timer entering warning range");
            self.blinking = true;
            self.blink_elapsed = 0.0;
            self.blink_lit = true;
            stage.timer_blink(true);
        } else if self.blinking {
            self.blink_elapsed += delta;
            while self.blink_elapsed >= Self::BLINK_INTERVAL {
                self.blink_elapsed -= Self::BLINK_INTERVAL;
                self.blink_lit = !self.blink_lit;
                stage.timer_blink(self.blink_lit);
            }
        }

        if self.remaining <= 0.0 {
            self.running = false;
            self.expired = true;
            self.clear_blink(stage);
            stage.timer_display(0, 0);
            stage.timer_expired();
            warn!("Timer expired");
        }
    }

    fn clear_blink(&mut self, stage: &mut dyn Stage) {
        if self.blinking || self.blink_lit {
            stage.timer_blink(false);
        }
        self.blinking = false;
        self.blink_lit = false;
        self.blink_elapsed = 0.0;
    }

    fn push_display(&self, stage: &mut dyn Stage) {
        let total = self.remaining.max(0.0) as u32;
        stage.timer_display(total / 60, total % 60);
    }

    // -----------------------------------------------------------------------
    // Feedback FX
    // -----------------------------------------------------------------------

    /// Positive one-shot: stops the heartbreak particles, then plays hearts.
    pub fn play_heart_fx(&self, stage: &mut dyn Stage) {
        info!("Heart FX");
        stage.fx_stopped(FxKind::Heartbreak);
        stage.fx_started(FxKind::Heart);
    }

    /// Negative one-shot: stops the heart particles, plays the heartbreak
    /// clip, and jolts the screen.
    pub fn play_heartbreak_fx(&self, stage: &mut dyn Stage) {
        info!("Heartbreak FX");
        stage.fx_stopped(FxKind::Heart);
        stage.fx_started(FxKind::Heartbreak);
        stage.screen_shake(ShakeSpec::harsh());
    }
}
