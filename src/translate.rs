use crate::genai::{strip_code_blocks, GenerationClient};
use crate::model::Panel;
use anyhow::{Context, Result};
use log::warn;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
struct BubbleText {
    id: String,
    text: String,
}

/// Translates every speech bubble across `panels` into `target_language`
/// with a single text-generation call, matching replies back by bubble id.
///
/// Bubbles the reply does not cover keep their original text. Returns the
/// number of bubbles actually translated; zero bubbles means no call is made.
pub async fn translate_dialogue(
    client: &dyn GenerationClient,
    panels: &mut [Panel],
    target_language: &str,
) -> Result<usize> {
    let originals: Vec<BubbleText> = panels
        .iter()
        .flat_map(|panel| {
            panel.speech_bubbles.iter().map(|bubble| BubbleText {
                id: bubble.id.clone(),
                text: bubble.text.clone(),
            })
        })
        .collect();

    if originals.is_empty() {
        return Ok(0);
    }

    let prompt = format!(
        "Translate the following JSON array of dialogue into {}. Maintain the JSON structure and IDs, only translating the 'text' field. \n\n{}",
        target_language,
        serde_json::to_string(&originals)?
    );

    let reply = client.generate_text(&prompt, None).await?;
    let clean = strip_code_blocks(&reply);
    let translated: Vec<BubbleText> = serde_json::from_str(&clean)
        .with_context(|| format!("Failed to parse translation reply: {}", clean))?;

    let mut applied = 0;
    for panel in panels.iter_mut() {
        for bubble in panel.speech_bubbles.iter_mut() {
            if let Some(t) = translated.iter().find(|t| t.id == bubble.id) {
                bubble.text = t.text.clone();
                applied += 1;
            }
        }
    }

    if applied < originals.len() {
        warn!(
            "translation covered {}/{} bubbles; the rest keep their original text",
            applied,
            originals.len()
        );
    }

    Ok(applied)
}
