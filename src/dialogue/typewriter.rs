use log::debug;
use rand::Rng;

use crate::stage::Stage;

use super::PlaybackConfig;

// ---------------------------------------------------------------------------
// Typewriter
// ---------------------------------------------------------------------------

/// Cooperative character-by-character reveal, advanced by `tick`.
///
/// At most one session exists at a time: `start` always cancels the previous
/// one, so overlapping reveals are impossible by construction.
pub struct Typewriter {
    interval: f32,
    chars_per_cue: i32,
    min_pitch: f32,
    max_pitch: f32,
    session: Option<TypingSession>,
}

struct TypingSession {
    chars: Vec<char>,
    revealed: usize,
    elapsed: f32,
}

impl Typewriter {
    pub fn new(config: &PlaybackConfig) -> Self {
        Self {
            interval: config.typewriter_interval,
            chars_per_cue: config.chars_per_cue,
            min_pitch: config.min_pitch,
            max_pitch: config.max_pitch,
            session: None,
        }
    }

    /// Begin revealing `text`, cancelling any reveal still in flight.
    pub fn start(&mut self, text: &str) {
        self.cancel();
        self.session = Some(TypingSession {
            chars: text.chars().collect(),
            revealed: 0,
            elapsed: 0.0,
        });
    }

    /// Drop the in-flight session without completing. No-op when idle.
    pub fn cancel(&mut self) {
        self.session = None;
    }

    #[allow(dead_code)]
    pub fn is_typing(&self) -> bool {
        self.session.is_some()
    }

    /// Advance the reveal by `delta` time units. Reveals one character per
    /// elapsed interval, catching up across large deltas. Returns `true` on
    /// the tick the session completes; the session is gone afterwards, so
    /// completion is reported exactly once.
    pub fn tick(&mut self, delta: f32, stage: &mut dyn Stage) -> bool {
        let Some(session) = self.session.as_mut() else {
            return false;
        };

        session.elapsed += delta;
        while session.elapsed >= self.interval && session.revealed < session.chars.len() {
            session.elapsed -= self.interval;
            let index = session.revealed;
            session.revealed += 1;
            stage.char_revealed(session.chars[index]);
            if self.chars_per_cue > 0 && index as i32 % self.chars_per_cue == 0 {
                let pitch = cue_pitch(self.min_pitch, self.max_pitch);
                stage.type_cue(pitch);
            }
        }

        if session.revealed >= session.chars.len() {
            debug!("Reveal complete ({} chars)", session.chars.len());
            self.session = None;
            return true;
        }
        false
    }

    /// Cancel the timed reveal and show the whole text in one step. Returns
    /// `true` if a session was in flight (completion fires exactly as for a
    /// natural finish), `false` when idle.
    pub fn finish_instantly(&mut self, stage: &mut dyn Stage) -> bool {
        let Some(session) = self.session.take() else {
            return false;
        };
        let full: String = session.chars.iter().collect();
        debug!("Reveal skipped at {}/{} chars", session.revealed, session.chars.len());
        stage.line_snapped(&full);
        true
    }
}

/// Uniform pitch in the configured range; degenerate ranges collapse to the
/// lower bound instead of panicking.
fn cue_pitch(min: f32, max: f32) -> f32 {
    if max > min {
        rand::thread_rng().gen_range(min..max)
    } else {
        min
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stage::testing::{RecordingStage, StageEvent};

    fn typewriter(interval: f32, chars_per_cue: i32) -> Typewriter {
        Typewriter::new(&PlaybackConfig {
            typewriter_interval: interval,
            chars_per_cue,
            ..PlaybackConfig::default()
        })
    }

    #[test]
    fn test_reveals_one_char_per_interval() {
        let mut tw = typewriter(0.1, 0);
        let mut stage = RecordingStage::new();
        tw.start("abc");

        assert!(!tw.tick(0.05, &mut stage));
        assert_eq!(stage.revealed_text(), "");
        assert!(!tw.tick(0.05, &mut stage));
        assert_eq!(stage.revealed_text(), "a");
        assert!(!tw.tick(0.1, &mut stage));
        assert_eq!(stage.revealed_text(), "ab");
        assert!(tw.tick(0.1, &mut stage));
        assert_eq!(stage.revealed_text(), "abc");
        assert!(!tw.is_typing());
    }

    #[test]
    fn test_catches_up_on_large_delta() {
        let mut tw = typewriter(0.1, 0);
        let mut stage = RecordingStage::new();
        tw.start("hello");
        assert!(tw.tick(10.0, &mut stage));
        assert_eq!(stage.revealed_text(), "hello");
    }

    #[test]
    fn test_completion_reported_once() {
        let mut tw = typewriter(0.1, 0);
        let mut stage = RecordingStage::new();
        tw.start("ab");
        assert!(tw.tick(1.0, &mut stage));
        assert!(!tw.tick(1.0, &mut stage));
        assert!(!tw.tick(1.0, &mut stage));
    }

    #[test]
    fn test_cue_indices() {
        let mut tw = typewriter(0.1, 2);
        let mut stage = RecordingStage::new();
        tw.start("abcde");
        tw.tick(10.0, &mut stage);
        // Indices 0, 2, 4.
        assert_eq!(stage.count(|e| matches!(e, StageEvent::TypeCue(_))), 3);
    }

    #[test]
    fn test_no_cues_when_disabled() {
        for n in [0, -1] {
            let mut tw = typewriter(0.1, n);
            let mut stage = RecordingStage::new();
            tw.start("abcdef");
            tw.tick(10.0, &mut stage);
            assert_eq!(stage.count(|e| matches!(e, StageEvent::TypeCue(_))), 0);
        }
    }

    #[test]
    fn test_cue_pitch_in_range() {
        let mut tw = typewriter(0.1, 1);
        let mut stage = RecordingStage::new();
        tw.start("abcdefghij");
        tw.tick(10.0, &mut stage);
        for event in &stage.events {
            if let StageEvent::TypeCue(pitch) = event {
                assert!((0.9..=1.1).contains(pitch), "pitch {pitch} out of range");
            }
        }
    }

    #[test]
    fn test_finish_instantly_snaps_full_text() {
        let mut tw = typewriter(0.1, 0);
        let mut stage = RecordingStage::new();
        tw.start("hello there");
        tw.tick(0.3, &mut stage);
        assert!(tw.finish_instantly(&mut stage));
        assert_eq!(stage.revealed_text(), "hello there");
        assert!(!tw.is_typing());
        // Already idle: no second completion.
        assert!(!tw.finish_instantly(&mut stage));
        assert!(!tw.tick(1.0, &mut stage));
    }

    #[test]
    fn test_empty_text_completes_without_events() {
        let mut tw = typewriter(0.1, 2);
        let mut stage = RecordingStage::new();
        tw.start("");
        assert!(tw.tick(0.0, &mut stage));
        assert!(stage.events.is_empty());
    }

    #[test]
    fn test_start_cancels_prior_session() {
        let mut tw = typewriter(0.1, 0);
        let mut stage = RecordingStage::new();
        tw.start("aaaa");
        tw.tick(0.1, &mut stage);
        tw.start("b");
        assert!(tw.tick(0.1, &mut stage));
        assert_eq!(stage.revealed_text(), "ab");
        assert_eq!(stage.count(|e| matches!(e, StageEvent::Char('a'))), 1);
    }

    #[test]
    fn test_cancel_is_idempotent() {
        let mut tw = typewriter(0.1, 0);
        let mut stage = RecordingStage::new();
        tw.cancel();
        tw.start("abc");
        tw.cancel();
        assert!(!tw.is_typing());
        assert!(!tw.tick(1.0, &mut stage));
        assert!(stage.events.is_empty());
    }

    #[test]
    fn test_multibyte_text_reveals_whole_chars() {
        let mut tw = typewriter(0.1, 0);
        let mut stage = RecordingStage::new();
        tw.start("あい");
        tw.tick(0.1, &mut stage);
        assert_eq!(stage.revealed_text(), "あ");
        tw.tick(0.1, &mut stage);
        assert_eq!(stage.revealed_text(), "あい");
    }
}
