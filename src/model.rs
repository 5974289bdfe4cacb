use crate::layout::PanelLayout;
use serde::{Deserialize, Serialize};

/// Story premise invented by the first generation phase.
///
/// Owned by a single orchestration run and discarded once the chapter draft
/// is assembled; never persisted on its own.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoryConcept {
    pub title: String,
    pub genre: String,
    pub synopsis: String,
    pub characters: Vec<CharacterConcept>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CharacterConcept {
    pub name: String,
    pub description: String,
}

/// Panel-by-panel breakdown produced by the second generation phase.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PagePlan {
    pub panels: Vec<PanelPlan>,
}

/// One planned panel. `panel_number` is assigned by the generation service
/// and is neither assumed sorted nor contiguous.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PanelPlan {
    pub panel_number: u32,
    pub layout_suggestion: String,
    pub visual_prompt: String,
    pub dialogue: Vec<DialogueLine>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DialogueLine {
    pub character: String,
    pub text: String,
}

/// Panel-local coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpeechBubble {
    pub id: String,
    pub text: String,
    pub position: Position,
    pub width: f64,
    pub height: f64,
}

/// One illustrated cell of a manga page. `image_url` is a data URI once
/// generation has completed and `None` only before that.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Panel {
    pub id: String,
    pub layout: PanelLayout,
    pub prompt: String,
    pub image_url: Option<String>,
    pub speech_bubbles: Vec<SpeechBubble>,
}

/// Orchestrator output: a partial chapter. Identifier, chapter number,
/// description, status and timestamp are assigned at persistence time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChapterDraft {
    pub title: String,
    pub panels: Vec<Panel>,
}

/// Named prompt suffix applied when re-inking a single panel.
#[derive(Debug, Clone, Copy)]
pub struct StylePreset {
    pub name: &'static str,
    pub prompt_suffix: &'static str,
}

pub const STYLE_PRESETS: [StylePreset; 4] = [
    StylePreset {
        name: "Manhwa Action",
        prompt_suffix: "full color, dynamic action manhwa style, vibrant lighting, glowing effects, digital art, epic composition, webtoon, cinematic",
    },
    StylePreset {
        name: "Character Art",
        prompt_suffix: "full color character portrait, detailed face, expressive eyes, modern manhwa art style, sharp lines, webtoon aesthetic",
    },
    StylePreset {
        name: "Mystical Aura",
        prompt_suffix: "glowing magical aura, energy particles, vibrant neon colors, dark background, manhwa special effect, cinematic lighting",
    },
    StylePreset {
        name: "Classic Shonen",
        prompt_suffix: "black and white shonen manga style, sharp lines, high contrast, screentones, dramatic perspective, action lines",
    },
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_panel_plan_wire_form() {
        let json = r#"{
            "panelNumber": 2,
            "layoutSuggestion": "tall",
            "visualPrompt": "a ruined tower at dusk",
            "dialogue": [
                { "character": "Ava", "text": "It's here." }
            ]
        }"#;

        let plan: PanelPlan = serde_json::from_str(json).unwrap();
        assert_eq!(plan.panel_number, 2);
        assert_eq!(plan.layout_suggestion, "tall");
        assert_eq!(plan.dialogue[0].character, "Ava");
    }

    #[test]
    fn test_panel_serializes_camel_case() {
        let panel = Panel {
            id: "panel-1".to_string(),
            layout: crate::layout::SQUARE,
            prompt: "a quiet street".to_string(),
            image_url: None,
            speech_bubbles: vec![],
        };

        let value = serde_json::to_value(&panel).unwrap();
        assert!(value.get("imageUrl").is_some());
        assert!(value.get("speechBubbles").is_some());
    }
}
