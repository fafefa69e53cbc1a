//! Terminal frontend: renders the stage to stdout and drives the machine
//! with wall-clock ticks and line-based input.

use std::io::{self, Write};
use std::thread;
use std::time::{Duration, Instant};

use anyhow::Result;
use log::{debug, info};

use crate::dialogue::graph::DialogueGraph;
use crate::dialogue::{DialogueMachine, Phase, PlaybackConfig};
use crate::shake::ShakeSpec;
use crate::stage::{FxKind, Stage};

/// Sleep granularity while the typewriter is animating.
const FRAME: Duration = Duration::from_millis(16);

// ---------------------------------------------------------------------------
// Console stage
// ---------------------------------------------------------------------------

/// Stage sink that prints to stdout. Audio cues become debug logs; FX and
/// shakes become short printed asides.
#[derive(Default)]
struct ConsoleStage {
    speaker: String,
    printed: usize,
    timer_visible: bool,
    timer_text: Option<String>,
    ended_at: Option<String>,
}

impl ConsoleStage {
    fn prompt_prefix(&self) -> String {
        match (&self.timer_text, self.timer_visible) {
            (Some(text), true) => format!("\n[{text}] > "),
            _ => "\n> ".to_string(),
        }
    }
}

impl Stage for ConsoleStage {
    fn speaker_changed(&mut self, name: &str) {
        self.speaker = name.to_string();
    }

    fn expression_changed(&mut self, speaker: &str, expression: &str) {
        debug!("{speaker} looks {expression}");
    }

    fn backdrop_changed(&mut self, speaker: &str) {
        debug!("Dialogue box styled for {speaker:?}");
    }

    fn line_cleared(&mut self) {
        self.printed = 0;
        print!("\n[{}] ", self.speaker);
        let _ = io::stdout().flush();
    }

    fn char_revealed(&mut self, ch: char) {
        self.printed += 1;
        print!("{ch}");
        let _ = io::stdout().flush();
    }

    fn line_snapped(&mut self, full_text: &str) {
        let tail: String = full_text.chars().skip(self.printed).collect();
        self.printed = full_text.chars().count();
        print!("{tail}");
        let _ = io::stdout().flush();
    }

    fn type_cue(&mut self, pitch: f32) {
        debug!("type blip at pitch {pitch:.2}");
    }

    fn choices_presented(&mut self, texts: &[&str]) {
        println!();
        for (i, text) in texts.iter().enumerate() {
            println!("  [{}] {text}", i + 1);
        }
    }

    fn click_sounded(&mut self) {
        debug!("click");
    }

    fn timer_shown(&mut self, visible: bool) {
        self.timer_visible = visible;
    }

    fn timer_display(&mut self, minutes: u32, seconds: u32) {
        self.timer_text = Some(format!("{minutes:02}:{seconds:02}"));
    }

    fn timer_blink(&mut self, highlighted: bool) {
        debug!("timer blink {highlighted}");
    }

    fn timer_cue(&mut self, pitch: f32) {
        debug!("timer blip at pitch {pitch:.2}");
    }

    fn timer_expired(&mut self) {
        println!("\n\n  *** TIME IS UP ***");
    }

    fn fx_started(&mut self, kind: FxKind) {
        match kind {
            FxKind::Heart => println!("\n  (hearts flutter across the screen)"),
            FxKind::Heartbreak => println!("\n  (a heart shatters)"),
        }
    }

    fn fx_stopped(&mut self, kind: FxKind) {
        debug!("fx stopped: {kind:?}");
    }

    fn screen_shake(&mut self, shake: ShakeSpec) {
        // Coarse one-line rendition of the damped wiggle.
        let steps = 24;
        let mut line = String::with_capacity(steps);
        for i in 0..steps {
            let t = shake.duration * i as f32 / steps as f32;
            let (x, y) = shake.offset_at(t);
            let v = x + y;
            line.push(if v > 0.05 {
                '/'
            } else if v < -0.05 {
                '\\'
            } else {
                '-'
            });
        }
        println!("  ({line})");
    }

    fn music_stopped(&mut self) {
        println!("  (the music stops)");
    }

    fn dialogue_ended(&mut self, node_id: &str) {
        self.ended_at = Some(node_id.to_string());
    }
}

// ---------------------------------------------------------------------------
// Session outcome
// ---------------------------------------------------------------------------

enum SessionOutcome {
    /// Playback reached a terminal node.
    Finished { node_id: String },
    /// The countdown ran out mid-scene.
    TimedOut,
    /// Player typed quit mid-scene.
    Quit,
}

fn show_session_over(outcome: &SessionOutcome) {
    println!("\n========================================");
    println!("              THE END");
    println!("========================================");

    match outcome {
        SessionOutcome::Finished { node_id } => {
            println!("  The story ended at {node_id:?}.");
        }
        SessionOutcome::TimedOut => {
            println!("  You ran out of time.");
        }
        SessionOutcome::Quit => {
            println!("  You closed the book.");
        }
    }

    println!("========================================\n");
    println!("  [r] Restart    [q] Quit\n");
}

/// Read the player's post-scene choice. Returns `true` to restart.
fn prompt_restart() -> Result<bool> {
    loop {
        print!("> ");
        io::stdout().flush()?;
        let mut input = String::new();
        io::stdin().read_line(&mut input)?;
        match input.trim().to_lowercase().as_str() {
            "r" => return Ok(true),
            "q" => return Ok(false),
            _ => println!("  Press [r] to restart or [q] to quit."),
        }
    }
}

// ---------------------------------------------------------------------------
// Session loop
// ---------------------------------------------------------------------------

fn is_quit(input: &str) -> bool {
    input.eq_ignore_ascii_case("q")
        || input.eq_ignore_ascii_case("quit")
        || input.eq_ignore_ascii_case("exit")
}

/// Prompt and read one line, returning it along with how long the player
/// took; the caller feeds that duration back into `tick` so the countdown
/// keeps running while we block on stdin.
fn read_player_line(stage: &ConsoleStage) -> Result<(String, f32)> {
    print!("{}", stage.prompt_prefix());
    io::stdout().flush()?;
    let started = Instant::now();
    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    Ok((input.trim().to_string(), started.elapsed().as_secs_f32()))
}

fn play_session(graph: DialogueGraph, config: PlaybackConfig) -> Result<SessionOutcome> {
    let mut stage = ConsoleStage::default();
    let mut machine = DialogueMachine::new(graph, config);
    machine.start(&mut stage);

    loop {
        // Animate until the machine wants input or stops.
        let mut last = Instant::now();
        while *machine.phase() == Phase::Typing && !machine.timer().is_expired() {
            thread::sleep(FRAME);
            let now = Instant::now();
            machine.tick((now - last).as_secs_f32(), &mut stage);
            last = now;
        }
        if machine.timer().is_expired() {
            return Ok(SessionOutcome::TimedOut);
        }

        match machine.phase().clone() {
            Phase::AwaitingClick { .. } => {
                let (input, blocked) = read_player_line(&stage)?;
                machine.tick(blocked, &mut stage);
                if machine.timer().is_expired() {
                    return Ok(SessionOutcome::TimedOut);
                }
                if is_quit(&input) {
                    return Ok(SessionOutcome::Quit);
                }
                machine.primary_click(&mut stage);
            }
            Phase::Choosing => {
                let (input, blocked) = read_player_line(&stage)?;
                machine.tick(blocked, &mut stage);
                if machine.timer().is_expired() {
                    return Ok(SessionOutcome::TimedOut);
                }
                if is_quit(&input) {
                    return Ok(SessionOutcome::Quit);
                }
                match input.parse::<usize>() {
                    Ok(n) if n >= 1 => machine.choose(n - 1, &mut stage),
                    _ => println!("  (pick a numbered option)"),
                }
            }
            Phase::Ended | Phase::Idle => {
                println!();
                let node_id = stage
                    .ended_at
                    .clone()
                    .or_else(|| machine.current_node_id().map(str::to_string))
                    .unwrap_or_default();
                return Ok(SessionOutcome::Finished { node_id });
            }
            Phase::Typing => {}
        }
    }
}

/// Run scenes in a loop until the player declines to restart.
pub fn run(graph: DialogueGraph, config: PlaybackConfig) -> Result<()> {
    println!("(Enter = continue, numbers = choices, q = quit)");

    loop {
        let outcome = play_session(graph.clone(), config.clone())?;
        show_session_over(&outcome);

        if !prompt_restart()? {
            println!("Thanks for playing!");
            break;
        }

        info!("Player chose to restart");
    }

    Ok(())
}
