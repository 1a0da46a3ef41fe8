/// Lectern - player for chaptered audio books and lessons
use anyhow::{bail, ensure, Context};
use clap::{Parser, Subcommand};
use lectern_cli::{listen, report, LecternConfig, ListenOptions, Session};
use lectern_core::{PreferencesPatch, Track};
use lectern_playback::PlaybackRate;
use lectern_storage::{JsonFileBackend, PreferencesStore};
use std::{path::PathBuf, sync::Arc, time::Duration};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "lectern")]
#[command(about = "Player for chaptered audio catalogs", long_about = None)]
struct Cli {
    /// Configuration file path (defaults to ./lectern.toml if present)
    #[arg(short, long, global = true, env = "LECTERN_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a catalog and list its chapters and sections
    Inspect {
        /// Catalog JSON file
        catalog: PathBuf,
    },
    /// Show which chapter and section contain a timestamp
    Resolve {
        /// Catalog JSON file
        catalog: PathBuf,
        /// Position in seconds
        seconds: f64,
    },
    /// Play a catalog through the real driver for a while
    Play {
        /// Catalog JSON file
        catalog: PathBuf,
        /// Start position in seconds
        #[arg(long, default_value_t = 0.0)]
        from: f64,
        /// Playback rate (0.5, 0.75, 1, 1.25, 1.5, 1.75 or 2)
        #[arg(long)]
        rate: Option<f64>,
        /// Wall-clock seconds to play for
        #[arg(long = "for", value_name = "SECONDS", default_value_t = 10.0)]
        seconds: f64,
    },
    /// Show or change stored preferences
    Prefs {
        #[command(subcommand)]
        action: PrefsAction,
    },
    /// Print the effective configuration
    Config,
}

#[derive(Subcommand)]
enum PrefsAction {
    /// Print stored preferences
    Show,
    /// Update one or more preferences
    Set {
        /// Volume level (0.0-1.0)
        #[arg(long)]
        volume: Option<f32>,
        /// Mute state
        #[arg(long)]
        muted: Option<bool>,
        /// Player panel expansion
        #[arg(long)]
        expanded: Option<bool>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "lectern=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let config = LecternConfig::load(cli.config.as_deref())?;
    config.validate()?;

    match cli.command {
        Commands::Inspect { catalog } => {
            let track = load_catalog(&catalog)?;
            print!("{}", report::describe_track(&track));
        }
        Commands::Resolve { catalog, seconds } => {
            ensure!(seconds.is_finite(), "position must be a number of seconds");
            let track = load_catalog(&catalog)?;
            println!("{}", report::describe_location(&track, seconds));
        }
        Commands::Play {
            catalog,
            from,
            rate,
            seconds,
        } => {
            let options = ListenOptions {
                from,
                rate: rate.map(PlaybackRate::try_from).transpose()?,
                duration: Duration::try_from_secs_f64(seconds)
                    .context("--for must be a non-negative number of seconds")?,
            };
            play(&config, &catalog, options).await?;
        }
        Commands::Prefs { action } => {
            prefs(&config, action)?;
        }
        Commands::Config => {
            print!("{}", config.to_toml()?);
        }
    }

    Ok(())
}

fn load_catalog(path: &std::path::Path) -> anyhow::Result<Track> {
    let track = Track::load(path).with_context(|| format!("loading {}", path.display()))?;
    tracing::debug!(track_id = %track.id, chapters = track.chapter_count(), "Catalog loaded");
    Ok(track)
}

fn preferences_store(config: &LecternConfig) -> PreferencesStore<JsonFileBackend> {
    PreferencesStore::new(JsonFileBackend::new(&config.storage.preferences_path))
}

async fn play(
    config: &LecternConfig,
    catalog: &std::path::Path,
    options: ListenOptions,
) -> anyhow::Result<()> {
    let track = load_catalog(catalog)?;
    let session = Session::start(config, Arc::new(preferences_store(config)));

    let result = listen(session.player(), track, options).await;
    session.finish().await?;

    let snapshot = result?;
    println!("{}", report::describe_snapshot(&snapshot));
    Ok(())
}

fn prefs(config: &LecternConfig, action: PrefsAction) -> anyhow::Result<()> {
    let store = preferences_store(config);

    match action {
        PrefsAction::Show => {
            println!("{}", serde_json::to_string_pretty(&store.load())?);
        }
        PrefsAction::Set {
            volume,
            muted,
            expanded,
        } => {
            let patch = PreferencesPatch {
                volume,
                is_muted: muted,
                is_expanded: expanded,
            };
            if patch.is_empty() {
                bail!("nothing to set; pass --volume, --muted or --expanded");
            }
            if let Some(volume) = volume {
                ensure!(
                    (0.0..=1.0).contains(&volume),
                    "volume must be between 0.0 and 1.0"
                );
            }

            store.try_save(patch)?;
            tracing::info!(
                path = %config.storage.preferences_path.display(),
                "Preferences saved"
            );
        }
    }

    Ok(())
}
