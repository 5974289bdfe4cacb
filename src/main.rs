use anyhow::Result;
use genmanga::config::Config;
use genmanga::director::AutonomousDirector;
use genmanga::genai;
use genmanga::model::STYLE_PRESETS;
use genmanga::store::{ChapterRecord, Library};
use genmanga::translate;
use indicatif::ProgressBar;
use std::time::Duration;

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let config = match Config::load() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Error loading config: {}", e);
            eprintln!("Please ensure 'config.yml' exists with a valid Gemini API key.");
            return Err(e);
        }
    };

    config.ensure_directories()?;

    let library = Library::open(&config.library_folder)?;
    let client = genai::create_client(&config)?;
    let director = AutonomousDirector::new(client);

    let spinner = ProgressBar::new_spinner();
    spinner.enable_steady_tick(Duration::from_millis(120));
    let mut draft = director
        .generate_manga_series(|status| spinner.set_message(status.to_string()))
        .await?;
    spinner.finish_and_clear();
    println!(
        "Chapter draft \"{}\" assembled ({} panels).",
        draft.title,
        draft.panels.len()
    );

    if let Some(language) = &config.translate_to {
        println!("Translating dialogue to {}...", language);
        let translated =
            translate::translate_dialogue(director.client(), &mut draft.panels, language).await?;
        println!("Translated {} speech bubbles.", translated);
    }

    if !config.unattended {
        let ans = inquire::Confirm::new(&format!("Save \"{}\" to the library?", draft.title))
            .with_default(true)
            .prompt();

        match ans {
            Ok(true) => {}
            Ok(false) => {
                println!("Discarding draft as requested.");
                return Ok(());
            }
            Err(_) => {
                println!("Error reading input, discarding draft.");
                return Ok(());
            }
        }
    }

    let record = library.create_chapter(draft)?;
    println!(
        "Saved chapter {} \"{}\" to {}.",
        record.chapter_number, record.title, config.library_folder
    );

    if !config.unattended {
        touch_up(&director, &library, record).await?;
    }

    Ok(())
}

/// Optional post-save pass: regenerate single panel images with a different
/// style preset until the user is happy.
async fn touch_up(
    director: &AutonomousDirector,
    library: &Library,
    mut record: ChapterRecord,
) -> Result<()> {
    loop {
        let ans = inquire::Confirm::new("Re-ink a panel with a different style?")
            .with_default(false)
            .prompt();

        if !matches!(ans, Ok(true)) {
            return Ok(());
        }

        let panel_labels: Vec<String> = record
            .panels
            .iter()
            .enumerate()
            .map(|(i, p)| format!("Panel {} - {}", i + 1, p.prompt))
            .collect();
        let Ok(panel_choice) = inquire::Select::new("Which panel?", panel_labels.clone()).prompt()
        else {
            return Ok(());
        };
        let panel_index = panel_labels
            .iter()
            .position(|l| l == &panel_choice)
            .unwrap_or(0);

        let style_names: Vec<String> = STYLE_PRESETS.iter().map(|s| s.name.to_string()).collect();
        let Ok(style_choice) = inquire::Select::new("Which style?", style_names).prompt() else {
            return Ok(());
        };
        let style = STYLE_PRESETS
            .iter()
            .find(|s| s.name == style_choice)
            .unwrap_or(&STYLE_PRESETS[0]);

        let spinner = ProgressBar::new_spinner();
        spinner.enable_steady_tick(Duration::from_millis(120));
        spinner.set_message(format!("Re-inking panel {}...", panel_index + 1));
        let prompt = record.panels[panel_index].prompt.clone();
        match director.generate_panel_image(&prompt, style).await {
            Ok(image_url) => {
                spinner.finish_and_clear();
                record.panels[panel_index].image_url = Some(image_url);
                record = library.update_chapter(record)?;
                println!("Panel {} updated.", panel_index + 1);
            }
            Err(e) => {
                spinner.finish_and_clear();
                eprintln!("Image generation failed: {}", e);
            }
        }
    }
}
