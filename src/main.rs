use chrono::{Duration, Utc};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use sat_o_vis::config::Config;
use sat_o_vis::feed::{
    fetch_targets, load_feed, ElementFeed, FeedDocument, FeedFetcher, CELESTRAK_GP_URL,
};
use sat_o_vis::tracker::{display, Tracker};
use sat_o_vis::web::{api::passes::list_passes, run_server};

#[derive(Parser)]
#[command(name = "sat-o-vis")]
#[command(about = "Satellite visibility and ground-track engine")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the live engine behind the HTTP API
    Serve {
        #[arg(short, long)]
        config: String,
    },
    /// Print station cards for a mission on every tick
    Watch {
        #[arg(short, long)]
        config: String,
        #[arg(short, long)]
        mission: Option<String>,
    },
    /// List upcoming passes for a mission
    Passes {
        #[arg(short, long)]
        config: String,
        #[arg(short, long)]
        mission: String,
        #[arg(long, default_value_t = 24)]
        hours: i64,
        #[arg(long, default_value_t = 0.0)]
        min_elevation: f64,
    },
    /// Refresh the element-set feed document
    Fetch {
        #[arg(short, long)]
        config: String,
        #[arg(short, long)]
        output: PathBuf,
    },
    /// Validate a configuration file
    Validate {
        #[arg(short, long)]
        config: String,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { config } => serve(&config).await,
        Commands::Watch { config, mission } => watch(&config, mission.as_deref()).await,
        Commands::Passes {
            config,
            mission,
            hours,
            min_elevation,
        } => passes(&config, &mission, hours, min_elevation).await,
        Commands::Fetch { config, output } => fetch(&config, &output).await,
        Commands::Validate { config } => validate(&config),
    }
}

fn load_config(path: &str) -> Option<Config> {
    match Config::from_file(path) {
        Ok(c) => Some(c),
        Err(e) => {
            eprintln!("Error loading config: {}", e);
            None
        }
    }
}

async fn feed_for(config: &Config) -> ElementFeed {
    load_feed(
        config.feed.path.as_deref(),
        config.feed.url.as_deref(),
        config.feed.timeout,
    )
    .await
}

async fn build_tracker(config: &Config) -> Option<Tracker> {
    let feed = feed_for(config).await;
    match Tracker::from_config(config, &feed) {
        Ok(t) => Some(t),
        Err(e) => {
            eprintln!("Error starting tracker: {}", e);
            None
        }
    }
}

async fn serve(path: &str) -> ExitCode {
    let Some(config) = load_config(path) else {
        return ExitCode::FAILURE;
    };
    let Some(tracker) = build_tracker(&config).await else {
        return ExitCode::FAILURE;
    };

    match run_server(config, tracker).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("Server error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn watch(path: &str, mission: Option<&str>) -> ExitCode {
    let Some(config) = load_config(path) else {
        return ExitCode::FAILURE;
    };
    let Some(mut tracker) = build_tracker(&config).await else {
        return ExitCode::FAILURE;
    };
    if let Some(name) = mission {
        if let Err(e) = tracker.select(name, None) {
            eprintln!("{}", e);
            return ExitCode::FAILURE;
        }
    }

    let mut rx = tracker.subscribe();
    if let Err(e) = tracker.start() {
        eprintln!("{}", e);
        return ExitCode::FAILURE;
    }

    loop {
        tokio::select! {
            changed = rx.changed() => {
                if changed.is_err() {
                    break;
                }
                if let Some(snapshot) = rx.borrow_and_update().as_ref() {
                    println!("{}\n", display::render(snapshot));
                }
            }
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    tracker.stop().await;
    ExitCode::SUCCESS
}

async fn passes(path: &str, mission: &str, hours: i64, min_elevation: f64) -> ExitCode {
    let Some(config) = load_config(path) else {
        return ExitCode::FAILURE;
    };
    let Some(tracker) = build_tracker(&config).await else {
        return ExitCode::FAILURE;
    };
    let Some(mission) = tracker.catalog().get(mission) else {
        eprintln!("Unknown mission: {}", mission);
        return ExitCode::FAILURE;
    };

    let start = Utc::now();
    let end = start + Duration::hours(hours);
    for station in list_passes(mission, start, end, min_elevation) {
        println!("{} ({} passes)", station.station, station.passes.len());
        for pass in station.passes {
            println!(
                "  {}  AOS {}  LOS {}  max {:.1}°  {}s",
                pass.satellite,
                display::timestamp(Some(pass.aos)),
                display::timestamp(Some(pass.los)),
                pass.max_elevation_deg,
                pass.duration_seconds
            );
        }
    }
    ExitCode::SUCCESS
}

async fn fetch(path: &str, output: &Path) -> ExitCode {
    let Some(config) = load_config(path) else {
        return ExitCode::FAILURE;
    };
    let fetcher = match FeedFetcher::new(CELESTRAK_GP_URL, config.feed.timeout) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("Error creating fetcher: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let previous = if output.exists() {
        match FeedDocument::load(output) {
            Ok(doc) => Some(doc),
            Err(e) => {
                log::warn!("Ignoring unreadable previous feed: {}", e);
                None
            }
        }
    } else {
        None
    };

    let targets = fetch_targets(&config.missions);
    let document = fetcher
        .build_document(&targets, previous.as_ref(), Utc::now())
        .await;

    for entry in &document.fetch_log {
        println!("  {}: {:?}", entry.name, entry.status);
    }

    match document.save(output) {
        Ok(()) => {
            println!(
                "Wrote {} element set(s) to {}",
                document.satellites.len(),
                output.display()
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error writing feed: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn validate(path: &str) -> ExitCode {
    let Some(config) = load_config(path) else {
        return ExitCode::FAILURE;
    };
    println!("Config is valid ({} missions)", config.missions.len());
    for mission in &config.missions {
        let kind = if mission.is_formation() {
            "formation"
        } else {
            "single"
        };
        println!(
            "  {} ({}, {} stations)",
            mission.name,
            kind,
            mission.stations.len()
        );
    }
    ExitCode::SUCCESS
}
