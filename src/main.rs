mod borders;
mod camera;
mod catalog;
mod colors;
mod config;
mod content;
mod detail;
mod error;
mod explore;
mod globe;
mod help;
mod image_view;
mod logging;
mod panel;
mod settings;
mod terminal;
mod visibility;

use catalog::{Tier, LANDMARKS};
use clap::{Parser, Subcommand};
use config::ExploreConfig;
use content::{ContentBackend, GeminiClient};
use detail::DetailOrchestrator;
use settings::Settings;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "globetrek")]
#[command(version)]
#[command(about = "globetrek: explore the world's landmarks on a terminal globe", long_about = None)]
struct Cli {
    /// Settings file (default: <config dir>/globetrek/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Debug-level logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Spin the globe and explore landmarks (default)
    Explore {
        /// Starting camera altitude in globe radii (0.1-4.0)
        #[arg(short, long)]
        altitude: Option<f32>,

        /// Start with auto-rotation off
        #[arg(long)]
        no_rotate: bool,

        /// Color scheme (0=matrix, 1=fire, 2=ocean, 3=gold, 4=mono)
        #[arg(short = 'c', long)]
        scheme: Option<u8>,

        /// Seconds per frame
        #[arg(short, long, default_value = "0.03")]
        time: f32,

        /// Random seed for the starfield
        #[arg(short, long)]
        seed: Option<u64>,
    },

    /// Print the landmark catalog
    List {
        /// Only landmarks of this tier (1=icons, 2=regions, 3=attractions)
        #[arg(short, long)]
        tier: Option<u8>,
    },

    /// Fetch the travel guide and history for one landmark
    Info {
        /// Landmark id or (partial) name
        query: String,

        /// Save the generated image to this path
        #[arg(short, long)]
        image: Option<PathBuf>,
    },
}

fn main() -> io::Result<()> {
    let cli = Cli::parse();
    let _log_guard = logging::init(cli.verbose);

    let settings = match &cli.config {
        Some(path) => Settings::load_from(path),
        None => Settings::load(),
    };

    match cli.command.unwrap_or(Commands::Explore {
        altitude: None,
        no_rotate: false,
        scheme: None,
        time: 0.03,
        seed: None,
    }) {
        Commands::Explore { altitude, no_rotate, scheme, time, seed } => {
            let mut config = ExploreConfig::from_settings(&settings).with_time_step(time);
            if let Some(altitude) = altitude {
                config = config.with_altitude(altitude);
            }
            if let Some(scheme) = scheme {
                config.color_scheme = scheme;
            }
            config.auto_rotate = !no_rotate;
            config.seed = seed;

            explore::run(config, backend(&settings))?;
        }
        Commands::List { tier } => {
            let tier = match tier {
                Some(v) => Some(Tier::from_value(v).ok_or_else(|| {
                    io::Error::new(io::ErrorKind::InvalidInput, format!("tier must be 1, 2 or 3, got {v}"))
                })?),
                None => None,
            };
            print_catalog(tier);
        }
        Commands::Info { query, image } => {
            info(&settings, &query, image)?;
        }
    }

    Ok(())
}

fn backend(settings: &Settings) -> Arc<dyn ContentBackend> {
    let client = GeminiClient::new(&settings.gemini, settings.api_key());
    if !client.has_api_key() {
        tracing::warn!("no Gemini API key configured; landmark content will use fallbacks");
    }
    Arc::new(client)
}

fn print_catalog(tier: Option<Tier>) {
    println!("{:<4} {:<20} {:<24} {:<22} {}", "TIER", "ID", "NAME", "COUNTRY", "CATEGORY");
    for l in LANDMARKS.iter().filter(|l| tier.map_or(true, |t| l.tier == t)) {
        println!(
            "{:<4} {:<20} {:<24} {:<22} {}",
            l.tier.value(),
            l.id,
            l.name,
            l.country,
            l.category.label()
        );
    }
}

fn info(settings: &Settings, query: &str, image_path: Option<PathBuf>) -> io::Result<()> {
    let landmark = catalog::find(query).ok_or_else(|| {
        io::Error::new(io::ErrorKind::NotFound, format!("no landmark matches '{query}'; try `globetrek list`"))
    })?;

    let backend = backend(settings);
    if settings.api_key().is_none() {
        eprintln!("warning: no API key (set GEMINI_API_KEY); showing fallback content");
    }

    let mut orchestrator = DetailOrchestrator::new(backend);
    orchestrator.select(*landmark);
    // Each call is one attempt bounded by the client timeout; allow for the slowest
    let timeout = Duration::from_secs(settings.gemini.timeout_secs + 10);
    if !orchestrator.wait(timeout) {
        eprintln!("warning: timed out waiting for content");
    }

    println!("{} ({})", landmark.name, landmark.country);
    println!("{} · tier {}", landmark.category.label(), landmark.tier.value());
    println!();

    if let Some(details) = orchestrator.details() {
        for line in panel::wrap_text(&details.description, 78) {
            println!("{line}");
        }
        println!();
        println!("Best time to visit: {}", details.best_time_to_visit);
        println!("Things to do:");
        for item in &details.things_to_do {
            println!("  • {item}");
        }
        println!();
    }

    if !orchestrator.history().is_empty() {
        println!("Timeline:");
        for event in orchestrator.history() {
            println!("  {:>10}  {}", event.year, event.title);
            for line in panel::wrap_text(&event.description, 64) {
                println!("{:>14}{line}", "");
            }
        }
        println!();
    }

    println!("{}", panel::deep_link(&settings.globe.earth_viewer_url, landmark));

    if let Some(path) = image_path {
        match orchestrator.modern_image() {
            Some(image) => {
                std::fs::write(&path, &image.bytes)?;
                println!("Saved {} image to {}", image.mime_type, path.display());
            }
            None => eprintln!("Image unavailable; nothing written to {}", path.display()),
        }
    }

    Ok(())
}
