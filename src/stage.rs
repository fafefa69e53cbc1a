use crate::shake::ShakeSpec;

// ---------------------------------------------------------------------------
// One-shot feedback effects
// ---------------------------------------------------------------------------

/// Particle/audio cues fired by the timer on choice outcomes. The two kinds
/// are mutually exclusive: starting one stops the other first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FxKind {
    Heart,
    Heartbreak,
}

// ---------------------------------------------------------------------------
// Collaborator boundary
// ---------------------------------------------------------------------------

/// Sink for every effect the engine fires: rendering, audio cues, FX.
///
/// All methods default to no-ops, so a collaborator implements only what it
/// can render and an unbound effect is skipped rather than failing the
/// transition. The engine never reads anything back through this trait.
pub trait Stage {
    /// A new node's speaker name is ready to display.
    fn speaker_changed(&mut self, _name: &str) {}

    /// Select the dialogue-box backdrop for this speaker. Unrecognized
    /// speakers are the collaborator's problem (it picks its fallback).
    fn backdrop_changed(&mut self, _speaker: &str) {}

    /// The node carried an expression tag for a recognized speaker.
    fn expression_changed(&mut self, _speaker: &str, _expression: &str) {}

    /// Reset the body line before a new reveal begins.
    fn line_cleared(&mut self) {}

    /// One more character of the current line is visible.
    fn char_revealed(&mut self, _ch: char) {}

    /// The reveal was force-completed: show the whole line in one step.
    fn line_snapped(&mut self, _full_text: &str) {}

    /// Typing blip, with the pitch to play it at.
    fn type_cue(&mut self, _pitch: f32) {}

    /// Render one control per choice, in order.
    fn choices_presented(&mut self, _texts: &[&str]) {}

    /// Tear down any rendered choice controls.
    fn choices_cleared(&mut self) {}

    /// Primary-click feedback blip.
    fn click_sounded(&mut self) {}

    /// Show or hide the countdown display.
    fn timer_shown(&mut self, _visible: bool) {}

    /// Countdown display text changed.
    fn timer_display(&mut self, _minutes: u32, _seconds: u32) {}

    /// Warning blink: alternate the display color while `highlighted`.
    fn timer_blink(&mut self, _highlighted: bool) {}

    /// Per-second countdown blip, urgent pitch when time is short.
    fn timer_cue(&mut self, _pitch: f32) {}

    /// The countdown ran out; offer the retry affordance.
    fn timer_expired(&mut self) {}

    fn fx_started(&mut self, _kind: FxKind) {}

    fn fx_stopped(&mut self, _kind: FxKind) {}

    /// Fire-and-forget screen shake; the collaborator samples the offsets.
    fn screen_shake(&mut self, _shake: ShakeSpec) {}

    /// Background music cut on a wrong answer.
    fn music_stopped(&mut self) {}

    /// A terminal node was reached; playback is over.
    fn dialogue_ended(&mut self, _node_id: &str) {}
}

// ---------------------------------------------------------------------------
// Recording stub for tests
// ---------------------------------------------------------------------------
