//! The dialogue state machine: graph traversal, click-to-advance, choice
//! resolution, and side-effect dispatch to the stage.

pub mod graph;
pub mod typewriter;

use log::{debug, error, info, warn};

use crate::stage::Stage;
use crate::timer::Timer;

use self::graph::{DialogueGraph, DialogueNode};
use self::typewriter::Typewriter;

const TIMER_CONTROL_PREFIX: &str = "TimerControl";
const TIMER_CONTROL_STOP: &str = "TimerControl:Stop";
const TIMER_CONTROL_CONTINUE: &str = "TimerControl:Continue";

/// Bound on zero-duration timer-control pass-throughs in a row. A
/// well-formed graph stays far below this; a directive cycle hits it and
/// halts instead of spinning forever.
const CONTROL_HOP_LIMIT: usize = 64;

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct PlaybackConfig {
    /// Seconds per revealed character.
    pub typewriter_interval: f32,
    /// Play a typing cue every this many characters (<= 0 disables).
    pub chars_per_cue: i32,
    /// Typing cue pitch range.
    pub min_pitch: f32,
    pub max_pitch: f32,
    /// Countdown start value in seconds.
    pub timer_start: f32,
    /// Speakers whose nodes may carry expression tags.
    pub expression_speakers: Vec<String>,
    /// Whether a wrong answer refills the countdown instead of resuming it.
    pub wrong_choice_resets_timer: bool,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            typewriter_interval: 0.02,
            chars_per_cue: 2,
            min_pitch: 0.9,
            max_pitch: 1.1,
            timer_start: 60.0,
            expression_speakers: vec!["Aiko".into(), "Narrator".into(), "You".into()],
            wrong_choice_resets_timer: false,
        }
    }
}

// ---------------------------------------------------------------------------
// Machine state
// ---------------------------------------------------------------------------

/// Where playback currently stands. `AwaitingClick` carries the pending
/// target so there is no separate nullable field to keep in sync.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Typing,
    AwaitingClick { next: String },
    Choosing,
    Ended,
}

pub struct DialogueMachine {
    graph: DialogueGraph,
    config: PlaybackConfig,
    typewriter: Typewriter,
    timer: Timer,
    phase: Phase,
    current: Option<String>,
}

impl DialogueMachine {
    pub fn new(graph: DialogueGraph, config: PlaybackConfig) -> Self {
        let typewriter = Typewriter::new(&config);
        let timer = Timer::new(config.timer_start);
        Self {
            graph,
            config,
            typewriter,
            timer,
            phase: Phase::Idle,
            current: None,
        }
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    pub fn current_node_id(&self) -> Option<&str> {
        self.current.as_deref()
    }

    pub fn timer(&self) -> &Timer {
        &self.timer
    }

    #[allow(dead_code)]
    pub fn is_ended(&self) -> bool {
        self.phase == Phase::Ended
    }

    /// Begin playback at the graph's start node.
    pub fn start(&mut self, stage: &mut dyn Stage) {
        let start = self.graph.start_node_id().to_string();
        info!("Dialogue started at node {start:?}");
        self.enter(&start, stage);
    }

    /// Transition into a node: resolve timer-control pass-throughs, apply
    /// speaker effects, and kick off the reveal. Runs to completion before
    /// returning; an unknown id logs and halts traversal without panicking.
    pub fn enter(&mut self, node_id: &str, stage: &mut dyn Stage) {
        // Drop any pending click target and in-flight reveal first.
        self.phase = Phase::Idle;
        self.typewriter.cancel();

        let mut id = node_id.to_string();
        let mut hops = 0;
        let node = loop {
            let Some(found) = self.graph.lookup(&id) else {
                error!("No node with id {id:?}; halting traversal");
                self.phase = Phase::Ended;
                return;
            };
            let node = found.clone();
            if !node.speaker.starts_with(TIMER_CONTROL_PREFIX) {
                break node;
            }

            self.apply_timer_directive(&node, stage);
            match node.next_id() {
                Some(next) => {
                    hops += 1;
                    if hops > CONTROL_HOP_LIMIT {
                        error!(
                            "Timer-control chain exceeded {CONTROL_HOP_LIMIT} hops at {id:?}; halting"
                        );
                        self.phase = Phase::Ended;
                        return;
                    }
                    id = next.to_string();
                }
                None => {
                    warn!("Timer-control node {:?} has no next; halting", node.id);
                    self.phase = Phase::Ended;
                    return;
                }
            }
        };

        debug!("Entering node {:?}", node.id);
        self.current = Some(node.id.clone());

        if let Some(expression) = node.expression.as_deref() {
            if self.config.expression_speakers.iter().any(|s| s == &node.speaker) {
                stage.expression_changed(&node.speaker, expression);
            }
        }
        stage.speaker_changed(&node.speaker);
        stage.backdrop_changed(&node.speaker);
        stage.choices_cleared();
        stage.line_cleared();
        self.typewriter.start(&node.text);
        self.phase = Phase::Typing;
    }

    /// Advance both cooperative processes by `delta` time units.
    pub fn tick(&mut self, delta: f32, stage: &mut dyn Stage) {
        self.timer.tick(delta, stage);
        if self.phase == Phase::Typing && self.typewriter.tick(delta, stage) {
            self.reveal_complete(stage);
        }
    }

    /// One primary click: skip the reveal while typing, advance while
    /// waiting, otherwise nothing.
    pub fn primary_click(&mut self, stage: &mut dyn Stage) {
        stage.click_sounded();
        match std::mem::replace(&mut self.phase, Phase::Idle) {
            Phase::Typing => {
                self.phase = Phase::Typing;
                if self.typewriter.finish_instantly(stage) {
                    self.reveal_complete(stage);
                }
            }
            // The target is taken out of the phase before acting, so a
            // re-entrant click from the same input event finds nothing.
            Phase::AwaitingClick { next } => {
                debug!("Click-to-continue into {next:?}");
                self.enter(&next, stage);
            }
            other => {
                self.phase = other;
            }
        }
    }

    /// Resolve the player's pick from the presented choice list.
    pub fn choose(&mut self, index: usize, stage: &mut dyn Stage) {
        if self.phase != Phase::Choosing {
            warn!("Choice {index} selected outside a choice prompt; ignoring");
            return;
        }
        let Some(id) = self.current.clone() else {
            return;
        };
        let Some(node) = self.graph.lookup(&id) else {
            return;
        };
        let Some(choice) = node.choices.get(index).cloned() else {
            warn!("Choice index {index} out of range at node {id:?}");
            return;
        };

        info!(
            "Choice at {:?}: {:?} -> {:?} (correct={})",
            id, choice.text, choice.next, choice.is_correct
        );
        if !choice.is_correct {
            self.timer.start(self.config.wrong_choice_resets_timer, stage);
            self.timer.play_heartbreak_fx(stage);
            stage.music_stopped();
        }
        stage.choices_cleared();
        self.enter(&choice.next, stage);
    }

    fn reveal_complete(&mut self, stage: &mut dyn Stage) {
        let Some(id) = self.current.clone() else {
            return;
        };
        let Some(node) = self.graph.lookup(&id) else {
            return;
        };
        let node = node.clone();
        debug!(
            "Reveal complete at {:?} ({} choices)",
            node.id,
            node.choices.len()
        );

        if !node.choices.is_empty() {
            let texts: Vec<&str> = node.choices.iter().map(|c| c.text.as_str()).collect();
            stage.choices_presented(&texts);
            self.phase = Phase::Choosing;
        } else if let Some(next) = node.next_id() {
            self.phase = Phase::AwaitingClick {
                next: next.to_string(),
            };
        } else {
            info!("Dialogue ended at node {:?}", node.id);
            stage.dialogue_ended(&node.id);
            self.phase = Phase::Ended;
        }
    }

    fn apply_timer_directive(&mut self, node: &DialogueNode, stage: &mut dyn Stage) {
        match node.speaker.as_str() {
            TIMER_CONTROL_STOP => {
                info!("Timer-control stop at node {:?}", node.id);
                self.timer.reset(stage);
                self.timer.play_heart_fx(stage);
            }
            TIMER_CONTROL_CONTINUE => {
                info!("Timer-control continue at node {:?}", node.id);
                self.timer.start(false, stage);
            }
            other => {
                warn!("Unknown timer-control directive {other:?} at node {:?}", node.id);
            }
        }
    }
}
