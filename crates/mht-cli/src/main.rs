use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use eyre::{Result, WrapErr};
use mht_cli::commands;
use mht_cli::config::{self, LoadedConfig, MhtConfig};
use mht_interactions::pairs::PairTable;
use mht_interactions::rules::InteractionStore;
use mht_rules::engine::DecisionEngine;
use mht_rules::store::RuleStore;
use serde_json::Value;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "mht")]
#[command(version)]
#[command(about = "Menopausal hormone therapy decision support and interaction checks", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file (defaults to the platform config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Directory with rule documents, overriding the config
    #[arg(long, global = true)]
    rules_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate a fact record and print the decision
    Evaluate {
        /// JSON file holding the fact record
        facts: PathBuf,

        /// Input is an assessment payload with camelCase keys
        #[arg(long)]
        assessment: bool,

        /// Print every contributing rule, not only the decision
        #[arg(long)]
        explain: bool,
    },

    /// Resolve medications against a primary group
    Interactions {
        /// Primary medication group, e.g. "Hormone Replacement Therapy (HRT)"
        #[arg(short, long)]
        primary: String,

        /// Medication as name or name=category; repeatable
        #[arg(short, long = "med", required = true)]
        meds: Vec<String>,
    },

    /// Look up pair severities for optional medicines against a main one
    Pair {
        #[arg(short, long)]
        main: String,

        optionals: Vec<String>,
    },

    /// Check a medicine selection pairwise and against patient history
    Selection {
        #[arg(required = true)]
        medicines: Vec<String>,

        /// JSON file holding patient history flags
        #[arg(long)]
        patient: Option<PathBuf>,
    },

    /// List primary groups and rule statistics
    Groups,

    /// Show or initialize the config file
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the effective config
    Show,
    /// Write the effective config back at the current version
    Init,
}

fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    let config_path = match &cli.config {
        Some(path) => path.clone(),
        None => config::default_config_path()?,
    };
    let loaded = config::load_config(&config_path)?;
    init_tracing(&loaded.config);
    report_config(&loaded, &config_path);
    let config = loaded.config;

    let output = run(cli.command, &config, &config_path, cli.rules_dir.as_deref())?;
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn init_tracing(config: &MhtConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_filter));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if config.log_json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn read_json(path: &Path) -> Result<Value> {
    let contents = std::fs::read_to_string(path)
        .map_err(|e| eyre::eyre!("failed to read {}: {e}", path.display()))?;
    serde_json::from_str(&contents)
        .wrap_err_with(|| format!("{} is not valid JSON", path.display()))
}

fn report_config(loaded: &LoadedConfig, path: &Path) {
    match loaded.on_disk_version {
        None => tracing::debug!(path = %path.display(), "no config file, using defaults"),
        Some(from) if loaded.was_migrated() => tracing::info!(
            path = %path.display(),
            from,
            to = config::CURRENT_VERSION,
            "migrated config"
        ),
        Some(version) => tracing::debug!(path = %path.display(), version, "config loaded"),
    }
}

fn run(
    command: Commands,
    config: &MhtConfig,
    config_path: &Path,
    rules_dir: Option<&Path>,
) -> Result<Value> {
    match command {
        Commands::Evaluate {
            facts,
            assessment,
            explain,
        } => {
            let store = RuleStore::new();
            let rules = store
                .load(&config.rule_source(rules_dir))
                .wrap_err("failed to load treatment rules")?;
            let engine = DecisionEngine::new(rules);

            let input = read_json(&facts)?;
            commands::evaluate(&engine, &input, assessment, explain)
        }
        Commands::Interactions { primary, meds } => {
            let store = InteractionStore::new();
            let index = store
                .load(&config.interaction_rules_source(rules_dir))
                .wrap_err("failed to load interaction rules")?;
            commands::interactions(&index, &primary, &meds)
        }
        Commands::Pair { main, optionals } => {
            let table = PairTable::from_source(&config.interaction_pairs_source(rules_dir))
                .wrap_err("failed to load interaction pairs")?;
            commands::pair(&table, &main, &optionals)
        }
        Commands::Selection { medicines, patient } => {
            let table = PairTable::from_source(&config.interaction_pairs_source(rules_dir))
                .wrap_err("failed to load interaction pairs")?;
            let patient = patient.map(|path| read_json(&path)).transpose()?;
            commands::selection(&table, &medicines, patient.as_ref())
        }
        Commands::Groups => {
            let store = InteractionStore::new();
            let index = store
                .load(&config.interaction_rules_source(rules_dir))
                .wrap_err("failed to load interaction rules")?;
            commands::groups(&index)
        }
        Commands::Config { action } => match action {
            ConfigAction::Show => Ok(serde_json::json!({
                "path": config_path,
                "config": config,
            })),
            ConfigAction::Init => {
                config::save_config(config_path, config)?;
                Ok(serde_json::json!({ "saved": config_path }))
            }
        },
    }
}
