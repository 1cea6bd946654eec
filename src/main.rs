use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use hotel_sim::config::{Config, ConfigOverrides};
use hotel_sim::decision::{Decision, ScoreAverages, TimelinePoint};
use hotel_sim::game::{DecisionOutcome, GameSetup};
use hotel_sim::metrics::MetricVector;
use hotel_sim::output::csv::{averages_to_csv, history_to_csv, timeline_to_csv};
use hotel_sim::output::json::render_json;
use hotel_sim::output::table::{
    render_averages_table, render_baseline_table, render_game_table, render_history_table,
    render_outcome_table, render_report, render_scenarios_table, render_timeline_table,
};
use hotel_sim::report::{attach_analysis, LlmClient, PerformanceReport};
use hotel_sim::scenario::{Department, HotelType, Scenario, ScenarioDraft};
use hotel_sim::server::run_server;
use hotel_sim::service::{BaselineView, GameService, GameView};
use hotel_sim::session::{resolve_game_id, ActiveSession};
use hotel_sim::store::SqliteStore;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Deserialize;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
    Csv,
}

#[derive(Debug, Parser)]
#[command(name = "hotel-sim", about = "Hotel management decision simulator")]
struct Cli {
    #[arg(short, long)]
    config: Option<PathBuf>,
    #[arg(long)]
    db: Option<String>,
    #[arg(long)]
    session: Option<String>,
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
    output: OutputFormat,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Start a game and remember it as the active session.
    NewGame {
        #[arg(long)]
        player: String,
        #[arg(long)]
        hotel: HotelType,
        #[arg(long)]
        role: Department,
    },
    Status {
        #[arg(long)]
        game: Option<String>,
        /// Show the player's most recent game instead of the session's.
        #[arg(long)]
        player: Option<String>,
    },
    Decide {
        #[arg(long)]
        scenario: String,
        #[arg(long)]
        option: usize,
        #[arg(long)]
        game: Option<String>,
    },
    Refresh {
        #[arg(long)]
        game: Option<String>,
    },
    History {
        #[arg(long)]
        game: Option<String>,
    },
    Timeline {
        #[arg(long)]
        game: Option<String>,
    },
    Averages {
        #[arg(long)]
        game: Option<String>,
    },
    Report {
        #[arg(long)]
        game: Option<String>,
        #[arg(long)]
        no_llm: bool,
    },
    Scenario {
        #[command(subcommand)]
        action: ScenarioCommand,
    },
    Hotel {
        #[command(subcommand)]
        action: HotelCommand,
    },
    /// Forget the active session.
    Logout,
    Serve {
        #[arg(long)]
        host: Option<String>,
        #[arg(long)]
        port: Option<u16>,
    },
    Config {
        #[arg(long)]
        init: bool,
        #[arg(long)]
        show: bool,
    },
}

#[derive(Debug, Subcommand)]
enum ScenarioCommand {
    /// Import one scenario or an array of scenarios from a JSON file.
    Add {
        #[arg(long)]
        file: PathBuf,
    },
    List {
        #[arg(long)]
        role: Option<Department>,
    },
    Show {
        #[arg(long)]
        id: String,
    },
    Remove {
        #[arg(long)]
        id: String,
    },
}

#[derive(Debug, Subcommand)]
enum HotelCommand {
    Show {
        #[arg(long)]
        hotel: HotelType,
    },
    /// Update the baseline; omitted metrics keep their current value.
    Set {
        #[arg(long)]
        hotel: HotelType,
        #[arg(long)]
        revenue: Option<f64>,
        #[arg(long = "customer-satisfaction")]
        customer_satisfaction: Option<f64>,
        #[arg(long = "staff-satisfaction")]
        staff_satisfaction: Option<f64>,
        #[arg(long = "occupancy-rate")]
        occupancy_rate: Option<f64>,
        #[arg(long)]
        sustainability: Option<f64>,
    },
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ScenarioFile {
    Many(Vec<ScenarioDraft>),
    One(ScenarioDraft),
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();
    let cli = Cli::parse();

    let config_path = cli.config.clone().unwrap_or_else(Config::default_path);
    let mut config = Config::load(Some(&config_path))?;
    config.apply_overrides(ConfigOverrides {
        db_path: cli.db.clone(),
        session_path: cli.session.clone(),
        llm_enabled: None,
    });

    if matches!(cli.command, Commands::Config { .. }) {
        return handle_config_command(&cli.command, &config, &config_path);
    }
    if let Commands::Serve { host, port } = &cli.command {
        let addr = resolve_bind(&config, host.as_deref(), *port)?;
        return run_server(config, addr).await;
    }

    let session_path = config.resolved_session_path();
    let store = SqliteStore::open(&config.resolved_db_path())
        .with_context(|| format!("failed opening store: {}", config.storage.db_path))?;
    let service = GameService::new(store, config.rules());
    let mut rng = StdRng::from_entropy();

    match &cli.command {
        Commands::NewGame { player, hotel, role } => {
            let setup = GameSetup {
                hotel_type: *hotel,
                role: *role,
            };
            let view = service.new_game(player, setup, &mut rng)?;
            ActiveSession {
                game_id: view.game_id.clone(),
                player_id: view.player_id.clone(),
                hotel_type: *hotel,
                role: *role,
            }
            .save(&session_path)?;
            info!("active session set to {}", view.game_id);
            print_game(&view, cli.output)?;
        }
        Commands::Status { game, player } => {
            let view = match (game, player) {
                (None, Some(player)) => service.latest_game(player)?,
                _ => service.view(&resolve_game_id(game.clone(), &session_path)?)?,
            };
            print_game(&view, cli.output)?;
        }
        Commands::Decide {
            scenario,
            option,
            game,
        } => {
            let game_id = resolve_game_id(game.clone(), &session_path)?;
            let outcome = service.submit(&game_id, scenario, *option, &mut rng)?;
            print_outcome(&outcome, cli.output)?;
        }
        Commands::Refresh { game } => {
            let game_id = resolve_game_id(game.clone(), &session_path)?;
            print_game(&service.refresh(&game_id, &mut rng)?, cli.output)?;
        }
        Commands::History { game } => {
            let game_id = resolve_game_id(game.clone(), &session_path)?;
            print_history(&service.history(&game_id)?, cli.output)?;
        }
        Commands::Timeline { game } => {
            let game_id = resolve_game_id(game.clone(), &session_path)?;
            print_timeline(&service.timeline(&game_id)?, cli.output)?;
        }
        Commands::Averages { game } => {
            let game_id = resolve_game_id(game.clone(), &session_path)?;
            print_averages(&service.averages(&game_id)?, cli.output)?;
        }
        Commands::Report { game, no_llm } => {
            let game_id = resolve_game_id(game.clone(), &session_path)?;
            let mut report = service.report(&game_id)?;
            if !report.game_over {
                warn!("game {game_id} is still in progress; reporting partial results");
            }
            if config.llm.enabled && !*no_llm {
                match LlmClient::from_config(&config.llm) {
                    Ok(client) => attach_analysis(&mut report, &client).await,
                    Err(err) => {
                        warn!("language model unavailable: {err:#}");
                        report.analysis_error = Some(format!("{err:#}"));
                    }
                }
            }
            print_report(&report, cli.output)?;
        }
        Commands::Scenario { action } => handle_scenario_command(&service, action, cli.output)?,
        Commands::Hotel { action } => handle_hotel_command(&service, action, cli.output)?,
        Commands::Logout => {
            if ActiveSession::clear(&session_path)? {
                println!("Session cleared");
            } else {
                println!("No active session");
            }
        }
        Commands::Config { .. } => {}
        Commands::Serve { .. } => unreachable!("serve command handled before dispatch"),
    }

    Ok(())
}

fn handle_config_command(command: &Commands, config: &Config, config_path: &Path) -> Result<()> {
    let Commands::Config { init, show } = command else {
        return Ok(());
    };
    if *init {
        Config::write_template(config_path)?;
        println!("Wrote config template to {}", config_path.display());
    }
    if *show || !*init {
        println!("{}", render_json(config)?);
    }
    Ok(())
}

fn resolve_bind(config: &Config, host: Option<&str>, port: Option<u16>) -> Result<SocketAddr> {
    let configured: SocketAddr = config
        .server
        .bind
        .parse()
        .map_err(|e| anyhow!("invalid server.bind {}: {e}", config.server.bind))?;
    let bind = format!(
        "{}:{}",
        host.map(str::to_string)
            .unwrap_or_else(|| configured.ip().to_string()),
        port.unwrap_or(configured.port())
    );
    bind.parse()
        .map_err(|e| anyhow!("invalid bind address {bind}: {e}"))
}

fn handle_scenario_command(
    service: &GameService<SqliteStore>,
    action: &ScenarioCommand,
    format: OutputFormat,
) -> Result<()> {
    match action {
        ScenarioCommand::Add { file } => {
            let data = fs::read_to_string(file)
                .with_context(|| format!("failed reading scenario file: {}", file.display()))?;
            let drafts = match serde_json::from_str::<ScenarioFile>(&data)
                .with_context(|| format!("invalid scenario JSON: {}", file.display()))?
            {
                ScenarioFile::Many(drafts) => drafts,
                ScenarioFile::One(draft) => vec![draft],
            };
            let mut saved = Vec::with_capacity(drafts.len());
            for draft in drafts {
                saved.push(service.add_scenario(draft)?);
            }
            print_scenarios(&saved, format)?;
        }
        ScenarioCommand::List { role } => {
            print_scenarios(&service.list_scenarios(*role)?, format)?;
        }
        ScenarioCommand::Show { id } => {
            let scenario = service.get_scenario(id)?;
            match format {
                OutputFormat::Table => {
                    println!("{}", render_scenarios_table(std::slice::from_ref(&scenario)));
                    for (idx, option) in scenario.options.iter().enumerate() {
                        println!("  [{idx}] {}", option.text);
                    }
                }
                _ => println!("{}", render_json(&scenario)?),
            }
        }
        ScenarioCommand::Remove { id } => {
            service.remove_scenario(id)?;
            println!("Removed scenario {id}");
        }
    }
    Ok(())
}

fn handle_hotel_command(
    service: &GameService<SqliteStore>,
    action: &HotelCommand,
    format: OutputFormat,
) -> Result<()> {
    let view = match action {
        HotelCommand::Show { hotel } => service.baseline(*hotel)?,
        HotelCommand::Set {
            hotel,
            revenue,
            customer_satisfaction,
            staff_satisfaction,
            occupancy_rate,
            sustainability,
        } => {
            let current = service.baseline(*hotel)?.metrics;
            let metrics = MetricVector::new(
                revenue.unwrap_or(current.revenue),
                customer_satisfaction.unwrap_or(current.customer_satisfaction),
                staff_satisfaction.unwrap_or(current.staff_satisfaction),
                occupancy_rate.unwrap_or(current.occupancy_rate),
                sustainability.unwrap_or(current.sustainability),
            );
            service.set_baseline(*hotel, metrics)?
        }
    };
    print_baseline(&view, format)
}

fn print_game(view: &GameView, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Table => println!("{}", render_game_table(view)),
        OutputFormat::Json => println!("{}", render_json(view)?),
        OutputFormat::Csv => {
            warn!("CSV output for game status not implemented, using JSON");
            println!("{}", render_json(view)?);
        }
    }
    Ok(())
}

fn print_outcome(outcome: &DecisionOutcome, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Table => println!("{}", render_outcome_table(outcome)),
        OutputFormat::Json => println!("{}", render_json(outcome)?),
        OutputFormat::Csv => println!("{}", history_to_csv(std::slice::from_ref(&outcome.decision))?),
    }
    Ok(())
}

fn print_history(decisions: &[Decision], format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Table => println!("{}", render_history_table(decisions)),
        OutputFormat::Json => println!("{}", render_json(decisions)?),
        OutputFormat::Csv => println!("{}", history_to_csv(decisions)?),
    }
    Ok(())
}

fn print_timeline(points: &[TimelinePoint], format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Table => println!("{}", render_timeline_table(points)),
        OutputFormat::Json => println!("{}", render_json(points)?),
        OutputFormat::Csv => println!("{}", timeline_to_csv(points)?),
    }
    Ok(())
}

fn print_averages(averages: &ScoreAverages, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Table => println!("{}", render_averages_table(averages)),
        OutputFormat::Json => println!("{}", render_json(averages)?),
        OutputFormat::Csv => println!("{}", averages_to_csv(averages)?),
    }
    Ok(())
}

fn print_report(report: &PerformanceReport, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Table => println!("{}", render_report(report)),
        OutputFormat::Json => println!("{}", render_json(report)?),
        OutputFormat::Csv => {
            warn!("CSV output for report not implemented, using JSON");
            println!("{}", render_json(report)?);
        }
    }
    Ok(())
}

fn print_scenarios(scenarios: &[Scenario], format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Table => println!("{}", render_scenarios_table(scenarios)),
        OutputFormat::Json => println!("{}", render_json(scenarios)?),
        OutputFormat::Csv => {
            warn!("CSV output for scenarios not implemented, using JSON");
            println!("{}", render_json(scenarios)?);
        }
    }
    Ok(())
}

fn print_baseline(view: &BaselineView, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Table => println!("{}", render_baseline_table(view)),
        _ => println!("{}", render_json(view)?),
    }
    Ok(())
}
