use std::collections::BTreeSet;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use manacore::calculate::build_availability_map;
use manacore::config::AppConfig;
use manacore::models::{SeasonCalendar, SeasonId};
use manacore::pipeline::{self, calculate_statistics, LeagueData};
use manacore::storage::StorageConfig;

#[derive(Parser)]
#[command(name = "manacore")]
#[command(about = "Cube draft league standings and card statistics")]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(long, default_value = "./manacore.toml")]
    config: PathBuf,

    /// Data directory path (overrides the config file)
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error); overrides the config file
    #[arg(long)]
    log_level: Option<String>,

    /// Output logs as JSON
    #[arg(long)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute Swiss standings for every draft
    Standings,

    /// Compute card, archetype, deck type and player statistics
    Stats,

    /// Compute standings and statistics
    Run,

    /// Show the reconstructed cube contents per draft
    Availability {
        /// Only show this season
        #[arg(long)]
        season: Option<String>,

        /// Also write card_availability.csv
        #[arg(long)]
        write: bool,
    },

    /// List configured seasons
    Seasons,
}

fn init_tracing(log_level: &str, json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level));

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

fn load_calendar(config: &AppConfig) -> Result<SeasonCalendar> {
    pipeline::load_calendar(&config.seasons_file)
        .with_context(|| format!("Failed to load seasons from {:?}", config.seasons_file))
}

fn load_data(storage: &StorageConfig, calendar: &SeasonCalendar) -> Result<LeagueData> {
    let mut data = LeagueData::load(storage).context("Failed to load input tables")?;
    data.annotate_seasons(calendar);
    Ok(data)
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = AppConfig::load_or_default(&cli.config)
        .with_context(|| format!("Failed to load config from {:?}", cli.config))?;
    if let Some(data_dir) = cli.data_dir {
        config.data_dir = data_dir;
    }
    if let Some(log_level) = cli.log_level {
        config.log_level = log_level;
    }

    init_tracing(&config.log_level, cli.json_logs);
    tracing::info!("Starting manacore v{}", env!("CARGO_PKG_VERSION"));

    let storage = StorageConfig::new(config.data_dir.clone());
    let order = config.availability.same_timestamp_order;

    match cli.command {
        Commands::Standings => {
            let calendar = load_calendar(&config)?;
            let standings = pipeline::standings(&storage, &calendar)
                .context("Failed to compute standings")?;
            let drafts: BTreeSet<_> =
                standings.iter().map(|r| (&r.season_id, &r.draft_id)).collect();

            println!("\n=== Standings ===");
            println!("Drafts:           {}", drafts.len());
            println!("Standings rows:   {}", standings.len());
        }
        Commands::Stats => {
            let calendar = load_calendar(&config)?;
            let data = load_data(&storage, &calendar)?;
            let report = calculate_statistics(&data, order);
            let written = report.write_all(&storage)?;

            println!("\n=== Statistics ===");
            println!("Drafts:           {}", report.availability.len());
            println!("Cards:            {}", report.card_mainboard_rates.len());
            println!("Players:          {}", report.most_picked_cards.len());
            println!("Rows written:     {}", written);
        }
        Commands::Run => {
            let calendar = load_calendar(&config)?;
            let report = pipeline::run(&storage, &calendar, order)?;

            println!("\n=== Run Results ===");
            println!("Drafts:           {}", report.availability.len());
            println!("Cards:            {}", report.card_mainboard_rates.len());
            println!("Player seasons:   {}", report.player_win_rates.len());
            println!("Output directory: {:?}", storage.processed_dir());
        }
        Commands::Availability { season, write } => {
            let calendar = load_calendar(&config)?;
            let data = load_data(&storage, &calendar)?;
            let availability =
                build_availability_map(&data.changes, &data.drafts, &data.mainboard, order);

            let filter = season.map(SeasonId::from);
            println!("=== Card Availability ({:?}) ===\n", order);
            for season_id in availability.seasons() {
                if filter.as_ref().is_some_and(|f| f != season_id) {
                    continue;
                }
                println!("{}", season_id);
                if let Some(drafts) = availability.drafts(season_id) {
                    for (draft_id, cards) in drafts {
                        println!("  {:<12} {:>5} cards", draft_id, cards.len());
                    }
                }
            }

            if write {
                let written = pipeline::write_availability(&storage, &availability)?;
                println!("\nWrote {} availability rows", written);
            }
        }
        Commands::Seasons => {
            let calendar = load_calendar(&config)?;

            println!("=== Seasons ({}) ===\n", config.seasons_file.display());
            for season in calendar.all_seasons() {
                println!(
                    "{:<16} {} to {}  cube: {}",
                    season.id,
                    season.start_date,
                    season.end_date,
                    season.cube_id.as_deref().unwrap_or("-")
                );
            }
        }
    }

    Ok(())
}
