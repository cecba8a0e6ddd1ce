use anyhow::Result;
use clap::{Parser, Subcommand};
use playlog_analytics::{compute_stats, export_file_name, ExportDocument, ReportGenerator};
use playlog_core::config::AppConfig;
use playlog_core::entry::{generate_session_id, EntryDraft, EntryKind};
use playlog_core::store::{ActivityLog, JsonFileStore};
use playlog_datasets::dictionary::{
    expand_word_lists, load_word_list, save_word_list, word_file_name, WORD_LENGTHS,
};
use playlog_datasets::sources::{default_datasets, DatasetSource};
use playlog_datasets::{DatasetFetcher, DefinitionFetcher, FetchProgress};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "playlog",
    about = "Activity log, per-game statistics, and dataset tooling for word and trivia games",
    version,
    author
)]
struct Cli {
    /// Path to config file (default: ~/.config/playlog/config.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Append an entry to the activity log
    Record {
        /// Entry kind (session_start, session_end, round_end, guess, action, ...)
        #[arg(short, long)]
        kind: String,
        /// Game variant name
        #[arg(short, long)]
        game: Option<String>,
        /// Session id (generated for session starts when omitted)
        #[arg(short, long)]
        session: Option<String>,
        /// Final score
        #[arg(long)]
        score: Option<i64>,
        /// Number of guesses taken
        #[arg(long)]
        guess_count: Option<i64>,
        /// Whether the session was won
        #[arg(long)]
        won: Option<bool>,
        /// Reaction time in milliseconds
        #[arg(long)]
        reaction_ms: Option<i64>,
    },

    /// Compute and print statistics over the activity log
    Stats {
        /// Render a markdown report instead of the text summary
        #[arg(long)]
        markdown: bool,
    },

    /// Write an export dump (stats + raw log) to a file
    Export {
        /// Output path (default: a date-stamped file in the export dir)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Remove the entire activity log
    Clear,

    /// Manage third-party datasets and word data
    Datasets {
        #[command(subcommand)]
        action: DatasetAction,
    },

    /// Show or manage configuration
    Config {
        #[command(subcommand)]
        action: Option<ConfigAction>,
    },
}

#[derive(Subcommand)]
enum DatasetAction {
    /// List the known datasets
    List,
    /// Download datasets (all, or one by name)
    Fetch {
        /// Dataset name
        name: Option<String>,
    },
    /// Expand the word dictionaries with derived word forms
    Expand,
    /// Fetch missing definitions from the dictionary API
    Definitions,
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Show current configuration
    Show,
    /// Initialize default configuration file
    Init,
    /// Print config file path
    Path,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up tracing.
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new(std::env::var("RUST_LOG").unwrap_or_else(|_| "playlog=info,warn".into()))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    // Load config.
    let config = match &cli.config {
        Some(path) => AppConfig::load_from(path)?,
        None => AppConfig::load()?,
    };

    match cli.command {
        Commands::Record {
            kind,
            game,
            session,
            score,
            guess_count,
            won,
            reaction_ms,
        } => {
            let log = open_log(&config);
            let kind = EntryKind::from(kind);

            let session =
                session.or_else(|| (kind == EntryKind::SessionStart).then(generate_session_id));

            let mut draft = EntryDraft::new(kind);
            draft.game = game;
            draft.session_id = session;
            draft.score = score;
            draft.guess_count = guess_count;
            draft.won = won;
            draft.reaction_time_ms = reaction_ms;

            let entry = log.append(draft);
            println!("{}", serde_json::to_string_pretty(&entry)?);
        }

        Commands::Stats { markdown } => {
            let entries = open_log(&config).entries();
            let stats = compute_stats(&entries);
            if markdown {
                println!("{}", ReportGenerator::markdown_report(&stats));
            } else {
                print!("{}", ReportGenerator::text_summary(&stats));
            }
        }

        Commands::Export { output } => {
            let export = ExportDocument::new(open_log(&config).entries());
            let path = output.unwrap_or_else(|| {
                config
                    .storage
                    .export_path()
                    .join(export_file_name(chrono::Utc::now().date_naive()))
            });
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(&path, export.to_json()?)?;
            println!(
                "Exported {} entries to {}",
                export.logs.len(),
                path.display()
            );
        }

        Commands::Clear => {
            open_log(&config).clear();
            println!("Activity log cleared");
        }

        Commands::Datasets { action } => {
            handle_datasets_command(action, &config).await?;
        }

        Commands::Config { action } => {
            handle_config_command(action, &config)?;
        }
    }

    Ok(())
}

fn open_log(config: &AppConfig) -> ActivityLog<JsonFileStore> {
    let path = config.storage.log_path();
    tracing::debug!("activity log at {:?}", path);
    ActivityLog::new(JsonFileStore::new(path))
}

async fn handle_datasets_command(action: DatasetAction, config: &AppConfig) -> Result<()> {
    let datasets = default_datasets(&config.datasets);

    match action {
        DatasetAction::List => {
            for dataset in &datasets {
                let source = match &dataset.source {
                    DatasetSource::Http { url } => format!("http {}", url),
                    DatasetSource::Archive { url } => format!("archive {}", url),
                    DatasetSource::Git { repo } => format!("git {}", repo),
                };
                println!("{:<20} {}", dataset.name, source);
            }
        }

        DatasetAction::Fetch { name } => {
            let selected: Vec<_> = match &name {
                Some(name) => datasets.iter().filter(|d| &d.name == name).collect(),
                None => datasets.iter().collect(),
            };
            if selected.is_empty() {
                anyhow::bail!("Unknown dataset: {}", name.unwrap_or_default());
            }

            let fetcher = DatasetFetcher::new(&config.datasets);
            let dest_dir = config.datasets.datasets_path();
            for dataset in selected {
                let path = fetcher.fetch(dataset, &dest_dir).await?;
                println!("Fetched {} to {}", dataset.name, path.display());
            }
        }

        DatasetAction::Expand => {
            let fetcher = DatasetFetcher::new(&config.datasets);
            let all_words = fetcher
                .download_word_list(&config.datasets.word_list_url)
                .await?;
            if all_words.is_empty() {
                anyhow::bail!("Word list download produced no words");
            }

            let outcomes = expand_word_lists(&config.datasets.word_data_path(), &all_words)?;
            for (length, outcome) in outcomes {
                println!(
                    "{}: {} added ({} derived with definitions, {} without)",
                    word_file_name(length),
                    outcome.added,
                    outcome.derived_with_definition,
                    outcome.derived_without_definition
                );
            }
        }

        DatasetAction::Definitions => {
            let word_data_dir = config.datasets.word_data_path();
            let progress_path = word_data_dir.join("fetch-progress.json");
            let mut progress = FetchProgress::load(&progress_path)?;
            let fetcher = DefinitionFetcher::new(&config.datasets);

            let mut fetched = 0;
            let mut failed = 0;
            for length in WORD_LENGTHS {
                let mut words = load_word_list(&word_data_dir, length)?;
                if words.is_empty() {
                    continue;
                }
                let file_key = word_file_name(length);
                let outcome = fetcher
                    .fill_missing(&mut words, &file_key, &mut progress, &progress_path)
                    .await?;
                save_word_list(&word_data_dir, length, &words)?;
                fetched += outcome.fetched;
                failed += outcome.failed;
            }
            println!("Definitions added: {}, failed lookups: {}", fetched, failed);
        }
    }

    Ok(())
}

fn handle_config_command(action: Option<ConfigAction>, config: &AppConfig) -> Result<()> {
    match action {
        Some(ConfigAction::Show) | None => {
            let toml_str = toml::to_string_pretty(config)?;
            println!("{}", toml_str);
        }
        Some(ConfigAction::Init) => {
            let path = AppConfig::default_path();
            if path.exists() {
                println!("Config already exists at: {}", path.display());
            } else {
                config.save()?;
                println!("Created default config at: {}", path.display());
            }
        }
        Some(ConfigAction::Path) => {
            println!("{}", AppConfig::default_path().display());
        }
    }
    Ok(())
}
