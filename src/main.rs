mod console;
mod demo;
mod dialogue;
mod shake;
mod stage;
mod timer;

use anyhow::{Context, Result};

use dialogue::graph::DialogueGraph;
use dialogue::PlaybackConfig;

fn main() -> Result<()> {
    // Initialize logging. Control verbosity with RUST_LOG env var:
    //   RUST_LOG=info  cargo run -- scene.json   # node transitions + timer events
    //   RUST_LOG=debug cargo run -- scene.json   # + cue/click/blink diagnostics
    // The default stays at warnings so logs don't interleave with the
    // typewriter output.
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .format_timestamp_millis()
        .init();

    let args: Vec<String> = std::env::args().collect();

    let graph = match args.get(1) {
        Some(path) => DialogueGraph::load(path)
            .with_context(|| format!("failed to load dialogue scene {path:?}"))?,
        None => {
            println!("No scene file given; playing the built-in demo scene.");
            println!("Usage: aiko <path-to-scene.json> [seconds-per-char] [timer-seconds]\n");
            DialogueGraph::from_json(demo::DEMO_SCENE).context("built-in demo scene is invalid")?
        }
    };

    let defaults = PlaybackConfig::default();
    let config = PlaybackConfig {
        typewriter_interval: args
            .get(2)
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.typewriter_interval),
        timer_start: args
            .get(3)
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.timer_start),
        ..defaults
    };

    console::run(graph, config)
}
