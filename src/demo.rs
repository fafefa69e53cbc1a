//! Built-in scene used when no scene file is given on the command line.

/// A short after-class scene exercising every engine feature: linear
/// click-through, choices with a wrong-answer loop, timer-control
/// pass-throughs, and both endings.
pub const DEMO_SCENE: &str = r#"{
    "startNode": "intro",
    "nodes": [
        {
            "id": "intro",
            "speaker": "Narrator",
            "text": "After class, Aiko waits by the window, tapping the sill.",
            "next": "greeting"
        },
        {
            "id": "greeting",
            "speaker": "Aiko",
            "expression": "happy",
            "text": "Oh! You actually came.",
            "next": "ask"
        },
        {
            "id": "ask",
            "speaker": "Aiko",
            "expression": "neutral",
            "text": "So... do you remember what today is?",
            "choices": [
                { "text": "Of course. Happy birthday, Aiko.", "next": "right", "isCorrect": true },
                { "text": "Uh... Tuesday?", "next": "wrong", "isCorrect": false }
            ]
        },
        {
            "id": "wrong",
            "speaker": "Aiko",
            "expression": "sad",
            "text": "...Tuesday. Right. Of course.",
            "next": "plead"
        },
        {
            "id": "plead",
            "speaker": "You",
            "text": "Wait. That came out wrong. Ask me again.",
            "next": "keep_timer"
        },
        {
            "id": "keep_timer",
            "speaker": "TimerControl:Continue",
            "text": "",
            "next": "ask"
        },
        {
            "id": "right",
            "speaker": "Aiko",
            "expression": "happy",
            "text": "You remembered! Okay. You pass.",
            "next": "stop_timer"
        },
        {
            "id": "stop_timer",
            "speaker": "TimerControl:Stop",
            "text": "",
            "next": "good_end"
        },
        {
            "id": "good_end",
            "speaker": "Narrator",
            "text": "She smiles, and the afternoon stretches on."
        }
    ]
}"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialogue::graph::DialogueGraph;

    #[test]
    fn test_demo_scene_loads() {
        let graph = DialogueGraph::from_json(DEMO_SCENE).unwrap();
        assert_eq!(graph.start_node_id(), "intro");
        assert!(graph.lookup("good_end").is_some());
        // Every reference in the demo must resolve.
        for id in [
            "intro",
            "greeting",
            "ask",
            "wrong",
            "plead",
            "keep_timer",
            "right",
            "stop_timer",
            "good_end",
        ] {
            assert!(graph.lookup(id).is_some(), "missing node {id}");
        }
    }
}
