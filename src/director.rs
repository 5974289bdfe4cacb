use crate::genai::{generate_structured, GenerationClient, GenerationError};
use crate::layout::resolve_layout;
use crate::model::{
    ChapterDraft, DialogueLine, PagePlan, Panel, Position, SpeechBubble, StoryConcept, StylePreset,
};
use crate::schema::Schema;
use log::debug;
use uuid::Uuid;

const CONCEPT_PROMPT: &str = "Create an original concept for a short, self-contained one-shot chapter in the style of a modern action/fantasy webtoon like Solo Leveling. Provide a title, genre, synopsis, and 2-3 character descriptions with cool powers.";

const IMAGE_STYLE_SUFFIX: &str = "full color, dynamic action manhwa style, vibrant lighting, glowing effects, digital art, epic composition, webtoon, cinematic";

fn story_concept_schema() -> Schema {
    Schema::object(
        vec![
            (
                "title",
                Schema::string_described(
                    "A catchy title for a one-shot manga chapter, in the style of an action/fantasy webtoon.",
                ),
            ),
            (
                "genre",
                Schema::string_described("The genre, should be action, fantasy, or sci-fi."),
            ),
            (
                "synopsis",
                Schema::string_described(
                    "A brief, 2-3 sentence summary of the chapter's plot, focusing on action and cool powers.",
                ),
            ),
            (
                "characters",
                Schema::array(Schema::object(
                    vec![
                        ("name", Schema::string()),
                        (
                            "description",
                            Schema::string_described(
                                "A brief visual and personality description of a cool character, mentioning their powers or abilities.",
                            ),
                        ),
                    ],
                    &["name", "description"],
                )),
            ),
        ],
        &["title", "genre", "synopsis", "characters"],
    )
}

fn page_plan_schema() -> Schema {
    Schema::object(
        vec![(
            "panels",
            Schema::array_described(
                "An array of 4-6 panels that make up a single manga page.",
                Schema::object(
                    vec![
                        ("panelNumber", Schema::integer()),
                        (
                            "layoutSuggestion",
                            Schema::string_enum(&["full", "half", "tall", "square"]),
                        ),
                        (
                            "visualPrompt",
                            Schema::string_described(
                                "A detailed visual description for an AI image generator. Describe the scene, character actions, emotions, and composition for a modern, full-color webtoon.",
                            ),
                        ),
                        (
                            "dialogue",
                            Schema::array(Schema::object(
                                vec![
                                    (
                                        "character",
                                        Schema::string_described(
                                            "Name of the character speaking.",
                                        ),
                                    ),
                                    ("text", Schema::string_described("The dialogue text.")),
                                ],
                                &["character", "text"],
                            )),
                        ),
                    ],
                    &["panelNumber", "layoutSuggestion", "visualPrompt", "dialogue"],
                ),
            ),
        )],
        &["panels"],
    )
}

fn page_plan_prompt(concept: &StoryConcept) -> String {
    let characters = concept
        .characters
        .iter()
        .map(|c| format!("{}: {}", c.name, c.description))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "Based on this webtoon concept, create a detailed plan for a single page with 4-5 dynamic panels. For each panel, provide a detailed visual prompt for an image generator, a suggested layout, and any dialogue.\n\n\
        Concept:\n\
        Title: {}\n\
        Genre: {}\n\
        Synopsis: {}\n\
        Characters: {}\n",
        concept.title, concept.genre, concept.synopsis, characters
    )
}

fn as_data_uri(base64: &str) -> String {
    format!("data:image/png;base64,{}", base64)
}

/// One bubble per dialogue line, offset diagonally by index so stacked
/// bubbles stay individually grabbable in the editor.
fn derive_speech_bubbles(dialogue: &[DialogueLine]) -> Vec<SpeechBubble> {
    dialogue
        .iter()
        .enumerate()
        .map(|(i, line)| SpeechBubble {
            id: format!("bubble-{}", Uuid::new_v4()),
            text: line.text.clone(),
            position: Position {
                x: 20.0 + (i as f64) * 10.0,
                y: 20.0 + (i as f64) * 10.0,
            },
            width: 150.0,
            height: 80.0,
        })
        .collect()
}

/// Drives the four-phase autonomous chapter generation sequence.
///
/// Each run is independent: concept and page plan are owned by the run and
/// discarded once the chapter draft is returned. Phases run strictly in
/// sequence, one image call at a time, so reported progress always matches
/// actual completion.
pub struct AutonomousDirector {
    client: Box<dyn GenerationClient>,
}

impl AutonomousDirector {
    pub fn new(client: Box<dyn GenerationClient>) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &dyn GenerationClient {
        self.client.as_ref()
    }

    /// Runs concept, plan, panel and assembly phases and returns the
    /// finished chapter draft.
    ///
    /// `update_status` is invoked at every phase and panel boundary, in
    /// order, never after the run has completed or failed. Any generation
    /// failure aborts the whole run; no partial chapter is ever returned
    /// and a new run starts over from the concept phase.
    pub async fn generate_manga_series(
        &self,
        mut update_status: impl FnMut(&str),
    ) -> Result<ChapterDraft, GenerationError> {
        update_status("Generating story concept...");
        let concept: StoryConcept =
            generate_structured(self.client.as_ref(), CONCEPT_PROMPT, &story_concept_schema())
                .await?;
        debug!("concept: {} ({})", concept.title, concept.genre);

        update_status(&format!(
            "Creating page layout for \"{}\"...",
            concept.title
        ));
        let mut plan: PagePlan = generate_structured(
            self.client.as_ref(),
            &page_plan_prompt(&concept),
            &page_plan_schema(),
        )
        .await?;
        debug!("page plan with {} panels", plan.panels.len());

        // Panel numbers come from the planner and are neither sorted nor
        // guaranteed contiguous.
        plan.panels.sort_by_key(|p| p.panel_number);

        let total = plan.panels.len();
        let mut panels = Vec::with_capacity(total);

        for (i, planned) in plan.panels.iter().enumerate() {
            update_status(&format!(
                "Generating image for panel {}/{}...",
                i + 1,
                total
            ));

            let image_prompt = format!(
                "{}, {}, {}",
                planned.visual_prompt, concept.genre, IMAGE_STYLE_SUFFIX
            );
            let image = self.client.generate_image(&image_prompt).await?;

            panels.push(Panel {
                id: format!("panel-{}", Uuid::new_v4()),
                layout: resolve_layout(&planned.layout_suggestion),
                prompt: planned.visual_prompt.clone(),
                image_url: Some(as_data_uri(&image)),
                speech_bubbles: derive_speech_bubbles(&planned.dialogue),
            });
        }

        update_status("Assembling final project...");

        Ok(ChapterDraft {
            title: concept.title,
            panels,
        })
    }

    /// Re-inks a single panel: its prompt plus a style preset suffix, one
    /// image call, returned as a data URI.
    pub async fn generate_panel_image(
        &self,
        prompt: &str,
        style: &StylePreset,
    ) -> Result<String, GenerationError> {
        let full_prompt = format!("{}, {}", prompt, style.prompt_suffix);
        let image = self.client.generate_image(&full_prompt).await?;
        Ok(as_data_uri(&image))
    }
}
