//! plant-narrator - command-line host for the narration pipeline
//!
//! Builds the configured backends once, then narrates a plant record or lists
//! what the active speech backend offers.

use anyhow::Context;
use clap::{Parser, Subcommand};
use plant_narrator::config_loader::Settings;
use plant_narrator::{Backends, Catalog, NarrationRequest, PlantRecord};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Narrates urban-garden plants as audio for visually impaired listeners
#[derive(Parser)]
#[command(name = "plant-narrator")]
#[command(version)]
#[command(about = "Turns a plant record and its photo into a spoken narration", long_about = None)]
struct Cli {
    /// Extra settings file layered over the defaults
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Narrate one plant and write the audio to a file
    Narrate {
        /// Plant name, e.g. "Tomate Cherry"
        #[arg(long)]
        title: String,
        /// Where the plant is, e.g. "Parcela 3, Fila 2"
        #[arg(long)]
        location: String,
        /// Path to the plant photo (JPEG or PNG)
        #[arg(long)]
        image: PathBuf,
        #[arg(long)]
        description: String,
        /// Pending tasks, e.g. "Riego diario"
        #[arg(long)]
        tasks: String,
        #[arg(long, default_value = "")]
        comments: String,
        /// Narration language (defaults to the configured one)
        #[arg(short, long)]
        language: Option<String>,
        /// Voice id (defaults to the configured one)
        #[arg(short, long)]
        voice: Option<String>,
        /// Where to write the audio clip
        #[arg(short, long, default_value = "narration.wav")]
        output: PathBuf,
    },

    /// List voices of the active speech backend
    Voices,

    /// List languages of the active speech backend
    Languages,
}

fn print_catalog(catalog: &Catalog) {
    for (id, name) in catalog.iter() {
        if id == name {
            println!("{}", id);
        } else {
            println!("{:<12} {}", id, name);
        }
    }
}

fn main() -> anyhow::Result<ExitCode> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let settings = Settings::load(cli.config.as_deref()).context("Failed to load settings")?;
    let backends = Backends::from_settings(&settings).context("Failed to set up backends")?;

    match cli.command {
        Commands::Voices => {
            print_catalog(backends.speech.list_voices());
            Ok(ExitCode::SUCCESS)
        }
        Commands::Languages => {
            print_catalog(backends.speech.list_languages());
            Ok(ExitCode::SUCCESS)
        }
        Commands::Narrate {
            title,
            location,
            image,
            description,
            tasks,
            comments,
            language,
            voice,
            output,
        } => {
            let language = language.unwrap_or(settings.default_language);
            let voice = voice.unwrap_or(settings.default_voice);
            let record =
                PlantRecord::new(title, location, image, description, tasks).with_comments(comments);
            let request = NarrationRequest::new(record, language, voice);

            let pipeline = backends.into_pipeline();
            match pipeline.run(&request) {
                Ok(narration) => {
                    std::fs::write(&output, &narration.audio)
                        .with_context(|| format!("Failed to write {}", output.display()))?;
                    println!("{}", narration.text);
                    eprintln!("Audio written to {}", output.display());
                    Ok(ExitCode::SUCCESS)
                }
                Err(failure) => {
                    eprintln!("{}", failure.user_message(&request.language));
                    if let Some(text) = failure.narration_text {
                        println!("{}", text);
                    }
                    Ok(ExitCode::FAILURE)
                }
            }
        }
    }
}
