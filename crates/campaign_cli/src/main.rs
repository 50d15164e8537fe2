//! Dungeon Master command-line tool for the campaign ledger.
//!
//! # Responsibility
//! - Drive core use-cases against the configured SQLite store.
//! - Keep output line-oriented so it can be scripted.

use campaign_core::db::open_db;
use campaign_core::{
    core_version, init_logging_from_config, list_campaigns, open_for_caller, ping,
    resolve_for_caller, Caller, Campaign, CampaignId, LedgerConfig, PermissionLevel, RandomDraw,
    SqliteCampaignStore, UpdateCoordinator,
};
use clap::{Parser, Subcommand};
use log::info;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(name = "campaign", version, about = "Campaign ledger tools")]
struct Cli {
    /// JSON config file layered under CAMPAIGN_LEDGER_* variables.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Acting username.
    #[arg(long = "as", global = true, default_value = "dm")]
    user: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print a liveness probe.
    Ping,
    /// Create a campaign owned by the acting user.
    Init { name: String },
    /// List campaigns visible to the acting user.
    List,
    /// Print one campaign document as JSON.
    Show { id: CampaignId },
    /// Advance the clock and roll weather.
    Advance {
        id: CampaignId,
        #[arg(long, default_value_t = 1)]
        steps: u32,
    },
    /// Select the active weather region.
    Region { id: CampaignId, region_id: String },
    /// Add a player to the campaign.
    Invite { id: CampaignId, username: String },
    /// Set a player's level for one category.
    Grant {
        id: CampaignId,
        username: String,
        category: String,
        #[arg(value_parser = parse_level)]
        level: PermissionLevel,
    },
    /// Resolve the acting user's level for an item's categories.
    Resolve {
        id: CampaignId,
        #[arg(required = true)]
        categories: Vec<String>,
    },
}

fn parse_level(value: &str) -> Result<PermissionLevel, String> {
    PermissionLevel::parse(value).ok_or_else(|| format!("unknown level `{value}`"))
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    if let Command::Ping = cli.command {
        println!("campaign_core ping={}", ping());
        println!("campaign_core version={}", core_version());
        return Ok(());
    }

    let config = LedgerConfig::load(cli.config.as_deref())?;
    init_logging_from_config(&config)?;
    info!(
        "event=cli_start module=cli status=ok db_path={}",
        config.db_path.display()
    );

    let conn = open_db(&config.db_path)?;
    let store = SqliteCampaignStore::new(&conn);
    let caller = Caller::new(cli.user);

    match cli.command {
        Command::Ping => {}
        Command::Init { name } => {
            let coordinator = UpdateCoordinator::create(&store, caller.username(), name)?;
            println!("{}", coordinator.campaign_id());
        }
        Command::List => {
            for campaign in list_campaigns(&store, &caller)? {
                println!("{}\t{}\t{}", campaign.id, campaign.owner, campaign.name);
            }
        }
        Command::Show { id } => {
            let coordinator = open_for_caller(&store, &caller, id)?;
            println!("{}", serde_json::to_string_pretty(coordinator.snapshot())?);
        }
        Command::Advance { id, steps } => {
            let mut coordinator = open_for_caller(&store, &caller, id)?;
            let mut draw = RandomDraw::new(match config.rng_seed {
                Some(seed) => ChaCha8Rng::seed_from_u64(seed),
                None => ChaCha8Rng::from_os_rng(),
            });
            for _ in 0..steps {
                let report = coordinator.advance_time(&mut draw)?;
                for err in &report.weather_errors {
                    eprintln!("warning: {err}");
                }
            }
            print_tracking(coordinator.snapshot());
        }
        Command::Region { id, region_id } => {
            let mut coordinator = open_for_caller(&store, &caller, id)?;
            coordinator.select_region(&region_id)?;
            print_tracking(coordinator.snapshot());
        }
        Command::Invite { id, username } => {
            let mut coordinator = open_for_caller(&store, &caller, id)?;
            coordinator.add_player(&username)?;
            println!("revision={}", coordinator.snapshot().revision);
        }
        Command::Grant {
            id,
            username,
            category,
            level,
        } => {
            let mut coordinator = open_for_caller(&store, &caller, id)?;
            coordinator.set_permission(&username, &category, level)?;
            println!("{username} {category}={}", level.as_str());
        }
        Command::Resolve { id, categories } => {
            let coordinator = open_for_caller(&store, &caller, id)?;
            let level =
                resolve_for_caller(coordinator.snapshot(), &caller, categories.as_slice());
            println!("{}", level.as_str());
        }
    }
    Ok(())
}

fn print_tracking(campaign: &Campaign) {
    let tracking = &campaign.tracking;
    println!(
        "{} {} {} region={} weather={}",
        campaign.calendar_settings.year_name,
        tracking.current_date,
        tracking.current_time_of_day.as_str(),
        tracking.current_region_id.as_deref().unwrap_or("-"),
        tracking.current_weather.as_deref().unwrap_or("-"),
    );
}
