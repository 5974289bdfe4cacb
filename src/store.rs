use crate::layout::PanelLayout;
use crate::model::{ChapterDraft, Panel, Position, SpeechBubble};
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChapterStatus {
    Draft,
    Inking,
    Complete,
    Planned,
}

/// Persisted chapter. `ChapterDraft` plus the fields the store assigns.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChapterRecord {
    pub id: String,
    pub chapter_number: u32,
    pub title: String,
    pub description: Option<String>,
    pub status: ChapterStatus,
    pub panels: Vec<Panel>,
    #[serde(rename = "lastModified")]
    pub last_modified: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CharacterRole {
    Protagonist,
    Antagonist,
    Supporting,
    #[serde(rename = "Side Character")]
    SideCharacter,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CharacterRecord {
    pub id: String,
    pub name: String,
    pub description: String,
    pub abilities: String,
    pub role: CharacterRole,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ArcStatus {
    Planned,
    #[serde(rename = "In Progress")]
    InProgress,
    Completed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoryArcRecord {
    pub id: String,
    pub title: String,
    pub summary: String,
    pub start_chapter: Option<u32>,
    pub end_chapter: Option<u32>,
    pub status: ArcStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PowerSystemRecord {
    pub id: String,
    pub name: String,
    pub description: String,
    pub rules: String,
    pub limitations: String,
    pub created_at: DateTime<Utc>,
}

const CHAPTERS_FILE: &str = "chapters.json";
const CHARACTERS_FILE: &str = "characters.json";
const ARCS_FILE: &str = "arcs.json";
const POWER_SYSTEMS_FILE: &str = "power_systems.json";

/// File-backed library of chapters and world-building records, one JSON
/// file per collection under the library folder.
pub struct Library {
    root: PathBuf,
}

impl Library {
    /// Opens (creating if needed) the library at `root`. A library with no
    /// chapters file is seeded with a starter chapter so the dashboard is
    /// never empty on first launch.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root)
            .with_context(|| format!("Failed to create library folder {:?}", root))?;

        let library = Self { root };
        if !library.root.join(CHAPTERS_FILE).exists() {
            library.save_all(CHAPTERS_FILE, &[default_chapter()])?;
        }
        Ok(library)
    }

    fn load_all<T: DeserializeOwned>(&self, file: &str) -> Result<Vec<T>> {
        let path = self.root.join(file);
        if !path.exists() {
            return Ok(Vec::new());
        }
        let content =
            fs::read_to_string(&path).with_context(|| format!("Failed to read {:?}", path))?;
        serde_json::from_str(&content).with_context(|| format!("Failed to parse {:?}", path))
    }

    fn save_all<T: Serialize>(&self, file: &str, items: &[T]) -> Result<()> {
        let path = self.root.join(file);
        let content = serde_json::to_string_pretty(items)?;
        fs::write(&path, content).with_context(|| format!("Failed to write {:?}", path))?;
        Ok(())
    }

    /// Stores a finished draft as a new chapter, assigning it the next
    /// chapter number, a fresh id and a timestamp.
    pub fn create_chapter(&self, draft: ChapterDraft) -> Result<ChapterRecord> {
        let mut chapters: Vec<ChapterRecord> = self.load_all(CHAPTERS_FILE)?;
        let next_number = chapters
            .iter()
            .map(|c| c.chapter_number)
            .max()
            .unwrap_or(0)
            + 1;

        let record = ChapterRecord {
            id: Uuid::new_v4().to_string(),
            chapter_number: next_number,
            title: draft.title,
            description: None,
            status: ChapterStatus::Draft,
            panels: draft.panels,
            last_modified: Utc::now(),
        };

        chapters.push(record.clone());
        self.save_all(CHAPTERS_FILE, &chapters)?;
        Ok(record)
    }

    /// All chapters, ordered by chapter number ascending.
    pub fn list_chapters(&self) -> Result<Vec<ChapterRecord>> {
        let mut chapters: Vec<ChapterRecord> = self.load_all(CHAPTERS_FILE)?;
        chapters.sort_by_key(|c| c.chapter_number);
        Ok(chapters)
    }

    pub fn get_chapter(&self, id: &str) -> Result<Option<ChapterRecord>> {
        let chapters: Vec<ChapterRecord> = self.load_all(CHAPTERS_FILE)?;
        Ok(chapters.into_iter().find(|c| c.id == id))
    }

    /// Replaces the stored chapter with the same id, refreshing its
    /// timestamp. Fails if the id is unknown.
    pub fn update_chapter(&self, mut record: ChapterRecord) -> Result<ChapterRecord> {
        let mut chapters: Vec<ChapterRecord> = self.load_all(CHAPTERS_FILE)?;
        let slot = chapters
            .iter_mut()
            .find(|c| c.id == record.id)
            .with_context(|| format!("No chapter with id {}", record.id))?;

        record.last_modified = Utc::now();
        *slot = record.clone();
        self.save_all(CHAPTERS_FILE, &chapters)?;
        Ok(record)
    }

    /// Removes the chapter with the given id. Returns whether it existed.
    pub fn delete_chapter(&self, id: &str) -> Result<bool> {
        let mut chapters: Vec<ChapterRecord> = self.load_all(CHAPTERS_FILE)?;
        let before = chapters.len();
        chapters.retain(|c| c.id != id);
        let removed = chapters.len() != before;
        if removed {
            self.save_all(CHAPTERS_FILE, &chapters)?;
        }
        Ok(removed)
    }

    pub fn create_character(
        &self,
        name: &str,
        description: &str,
        abilities: &str,
        role: CharacterRole,
    ) -> Result<CharacterRecord> {
        let record = CharacterRecord {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            description: description.to_string(),
            abilities: abilities.to_string(),
            role,
            created_at: Utc::now(),
        };
        let mut characters: Vec<CharacterRecord> = self.load_all(CHARACTERS_FILE)?;
        characters.push(record.clone());
        self.save_all(CHARACTERS_FILE, &characters)?;
        Ok(record)
    }

    pub fn list_characters(&self) -> Result<Vec<CharacterRecord>> {
        self.load_all(CHARACTERS_FILE)
    }

    pub fn delete_character(&self, id: &str) -> Result<bool> {
        let mut characters: Vec<CharacterRecord> = self.load_all(CHARACTERS_FILE)?;
        let before = characters.len();
        characters.retain(|c| c.id != id);
        let removed = characters.len() != before;
        if removed {
            self.save_all(CHARACTERS_FILE, &characters)?;
        }
        Ok(removed)
    }

    pub fn create_arc(
        &self,
        title: &str,
        summary: &str,
        start_chapter: Option<u32>,
        end_chapter: Option<u32>,
    ) -> Result<StoryArcRecord> {
        let record = StoryArcRecord {
            id: Uuid::new_v4().to_string(),
            title: title.to_string(),
            summary: summary.to_string(),
            start_chapter,
            end_chapter,
            status: ArcStatus::Planned,
            created_at: Utc::now(),
        };
        let mut arcs: Vec<StoryArcRecord> = self.load_all(ARCS_FILE)?;
        arcs.push(record.clone());
        self.save_all(ARCS_FILE, &arcs)?;
        Ok(record)
    }

    pub fn list_arcs(&self) -> Result<Vec<StoryArcRecord>> {
        self.load_all(ARCS_FILE)
    }

    pub fn delete_arc(&self, id: &str) -> Result<bool> {
        let mut arcs: Vec<StoryArcRecord> = self.load_all(ARCS_FILE)?;
        let before = arcs.len();
        arcs.retain(|a| a.id != id);
        let removed = arcs.len() != before;
        if removed {
            self.save_all(ARCS_FILE, &arcs)?;
        }
        Ok(removed)
    }

    pub fn create_power_system(
        &self,
        name: &str,
        description: &str,
        rules: &str,
        limitations: &str,
    ) -> Result<PowerSystemRecord> {
        let record = PowerSystemRecord {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            description: description.to_string(),
            rules: rules.to_string(),
            limitations: limitations.to_string(),
            created_at: Utc::now(),
        };
        let mut systems: Vec<PowerSystemRecord> = self.load_all(POWER_SYSTEMS_FILE)?;
        systems.push(record.clone());
        self.save_all(POWER_SYSTEMS_FILE, &systems)?;
        Ok(record)
    }

    pub fn list_power_systems(&self) -> Result<Vec<PowerSystemRecord>> {
        self.load_all(POWER_SYSTEMS_FILE)
    }

    pub fn delete_power_system(&self, id: &str) -> Result<bool> {
        let mut systems: Vec<PowerSystemRecord> = self.load_all(POWER_SYSTEMS_FILE)?;
        let before = systems.len();
        systems.retain(|s| s.id != id);
        let removed = systems.len() != before;
        if removed {
            self.save_all(POWER_SYSTEMS_FILE, &systems)?;
        }
        Ok(removed)
    }
}

/// Starter chapter seeded into an empty library.
fn default_chapter() -> ChapterRecord {
    ChapterRecord {
        id: Uuid::new_v4().to_string(),
        chapter_number: 1,
        title: "The Beginning".to_string(),
        description: Some("This is the very first chapter of a new adventure!".to_string()),
        status: ChapterStatus::Draft,
        panels: vec![
            Panel {
                id: "panel-1".to_string(),
                layout: PanelLayout {
                    column_start: 1,
                    column_end: 3,
                    row_start: 1,
                    row_end: 2,
                },
                prompt: "A close-up of a determined anime hero, sharp eyes, wind blowing through his spiky black hair, shonen manga style, high contrast".to_string(),
                image_url: Some("https://picsum.photos/seed/manga1/800/400".to_string()),
                speech_bubbles: vec![SpeechBubble {
                    id: "bubble-1".to_string(),
                    text: "I won't give up!".to_string(),
                    position: Position { x: 350.0, y: 50.0 },
                    width: 180.0,
                    height: 90.0,
                }],
            },
            Panel {
                id: "panel-2".to_string(),
                layout: PanelLayout {
                    column_start: 3,
                    column_end: 4,
                    row_start: 1,
                    row_end: 3,
                },
                prompt: "A magical girl casting a powerful spell, glowing energy swirling around her, shojo manga style, detailed background".to_string(),
                image_url: Some("https://picsum.photos/seed/manga2/400/800".to_string()),
                speech_bubbles: vec![SpeechBubble {
                    id: "bubble-2".to_string(),
                    text: "By the power of the stars!".to_string(),
                    position: Position { x: 30.0, y: 500.0 },
                    width: 220.0,
                    height: 100.0,
                }],
            },
        ],
        last_modified: Utc::now(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn empty_draft(title: &str) -> ChapterDraft {
        ChapterDraft {
            title: title.to_string(),
            panels: vec![],
        }
    }

    #[test]
    fn test_open_seeds_default_chapter() {
        let dir = tempfile::tempdir().unwrap();
        let library = Library::open(dir.path()).unwrap();

        let chapters = library.list_chapters().unwrap();
        assert_eq!(chapters.len(), 1);
        assert_eq!(chapters[0].title, "The Beginning");
        assert_eq!(chapters[0].chapter_number, 1);
        assert_eq!(chapters[0].status, ChapterStatus::Draft);
        assert_eq!(chapters[0].panels.len(), 2);
    }

    #[test]
    fn test_create_assigns_ascending_chapter_numbers() {
        let dir = tempfile::tempdir().unwrap();
        let library = Library::open(dir.path()).unwrap();

        let second = library.create_chapter(empty_draft("Second")).unwrap();
        let third = library.create_chapter(empty_draft("Third")).unwrap();

        assert_eq!(second.chapter_number, 2);
        assert_eq!(third.chapter_number, 3);
        assert_ne!(second.id, third.id);

        let titles: Vec<String> = library
            .list_chapters()
            .unwrap()
            .into_iter()
            .map(|c| c.title)
            .collect();
        assert_eq!(titles, vec!["The Beginning", "Second", "Third"]);
    }

    #[test]
    fn test_update_refreshes_timestamp_and_persists() {
        let dir = tempfile::tempdir().unwrap();
        let library = Library::open(dir.path()).unwrap();

        let mut record = library.create_chapter(empty_draft("Work in progress")).unwrap();
        let created_at = record.last_modified;

        record.status = ChapterStatus::Inking;
        record.description = Some("Inking underway.".to_string());
        let updated = library.update_chapter(record).unwrap();

        assert!(updated.last_modified >= created_at);

        let reloaded = library.get_chapter(&updated.id).unwrap().unwrap();
        assert_eq!(reloaded.status, ChapterStatus::Inking);
        assert_eq!(reloaded.description.as_deref(), Some("Inking underway."));
    }

    #[test]
    fn test_update_unknown_chapter_fails() {
        let dir = tempfile::tempdir().unwrap();
        let library = Library::open(dir.path()).unwrap();

        let mut record = library.create_chapter(empty_draft("Orphan")).unwrap();
        record.id = "no-such-id".to_string();
        assert!(library.update_chapter(record).is_err());
    }

    #[test]
    fn test_delete_chapter() {
        let dir = tempfile::tempdir().unwrap();
        let library = Library::open(dir.path()).unwrap();

        let record = library.create_chapter(empty_draft("Doomed")).unwrap();
        assert!(library.delete_chapter(&record.id).unwrap());
        assert!(!library.delete_chapter(&record.id).unwrap());
        assert!(library.get_chapter(&record.id).unwrap().is_none());
    }

    #[test]
    fn test_world_records_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let library = Library::open(dir.path()).unwrap();

        let character = library
            .create_character("Ava", "Calm and fierce", "Lightning fists", CharacterRole::Protagonist)
            .unwrap();
        let arc = library
            .create_arc("Awakening", "Ava discovers her power.", Some(1), None)
            .unwrap();
        let system = library
            .create_power_system("Stormweaving", "Channeling storms", "Costs stamina", "Fails when calm")
            .unwrap();

        assert_eq!(library.list_characters().unwrap()[0].name, "Ava");
        assert_eq!(library.list_arcs().unwrap()[0].status, ArcStatus::Planned);
        assert_eq!(library.list_power_systems().unwrap()[0].name, "Stormweaving");

        assert!(library.delete_character(&character.id).unwrap());
        assert!(library.delete_arc(&arc.id).unwrap());
        assert!(library.delete_power_system(&system.id).unwrap());
        assert!(library.list_characters().unwrap().is_empty());
    }

    #[test]
    fn test_status_serializes_like_dashboard_expects() {
        let value = serde_json::to_value(ChapterStatus::Inking).unwrap();
        assert_eq!(value, serde_json::json!("Inking"));

        let role = serde_json::to_value(CharacterRole::SideCharacter).unwrap();
        assert_eq!(role, serde_json::json!("Side Character"));

        let arc = serde_json::to_value(ArcStatus::InProgress).unwrap();
        assert_eq!(arc, serde_json::json!("In Progress"));
    }
}
