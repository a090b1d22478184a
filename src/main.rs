use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand, arg};
use egui::Vec2;
use log::{error, info};

use f1analyst::{
    AnalysisKind, AnalysisRequest, AnalystError, AppConfig, Compound, FileCacheProvider,
    SessionKey, SessionKind,
    laps::{loader, segment_session_stints},
    ui::DashboardApp,
    writer,
};

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
struct Args {
    /// Lap cache directory, overrides the one in the config file
    #[arg(long, global = true)]
    cache_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Open the dashboard
    Dashboard,
    /// Run one analysis and print the result
    Report {
        #[arg(short, long)]
        year: i32,

        #[arg(short, long)]
        event: String,

        #[arg(short, long)]
        session: Option<SessionKind>,

        #[arg(short, long)]
        analysis: AnalysisKind,

        /// Compound filter: SOFT, MEDIUM or HARD
        #[arg(short, long, value_parser = Compound::parse_dry)]
        compound: Vec<Compound>,

        #[arg(short, long)]
        driver: Vec<String>,

        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Copy a CSV lap export into the lap cache
    Import {
        #[arg(short, long)]
        year: i32,

        #[arg(short, long)]
        event: String,

        #[arg(short, long)]
        session: SessionKind,

        #[arg(short, long)]
        input: PathBuf,

        /// Session start time (RFC 3339), adds the session to the season schedule
        #[arg(long)]
        start: Option<DateTime<Utc>>,
    },
}

fn load_config() -> AppConfig {
    match AppConfig::from_local_file() {
        Ok(Some(config)) => config,
        Ok(None) => AppConfig::default(),
        Err(e) => {
            error!("Could not read config file, using defaults: {}", e);
            AppConfig::default()
        }
    }
}

fn open_provider(cache_dir: Option<PathBuf>, config: &AppConfig) -> Result<FileCacheProvider, AnalystError> {
    let cache_dir = match cache_dir {
        Some(dir) => dir,
        None => config.resolved_cache_dir()?,
    };
    info!("Using lap cache at {:?}", cache_dir);
    FileCacheProvider::new(cache_dir)
}

fn dashboard(cache_dir: Option<PathBuf>) -> Result<(), AnalystError> {
    let mut app_config = load_config();
    let provider = open_provider(cache_dir, &app_config)?;
    app_config.cache_dir = Some(provider.cache_dir().to_path_buf());

    let mut native_options = eframe::NativeOptions::default();
    native_options.viewport = native_options
        .viewport
        .with_title("F1 Analyst")
        .with_inner_size(Vec2::new(1280., 800.));

    eframe::run_native(
        "F1 Analyst",
        native_options,
        Box::new(|cc| Ok(Box::new(DashboardApp::new(provider, app_config, cc)))),
    )
    .map_err(|e| AnalystError::DashboardError {
        message: e.to_string(),
    })
}

fn report(
    cache_dir: Option<PathBuf>,
    request: AnalysisRequest,
    output: Option<&Path>,
) -> Result<(), AnalystError> {
    let provider = open_provider(cache_dir, &load_config())?;
    let result = f1analyst::run(&provider, &request);

    if let Some(info) = &result.info {
        for line in info.lines() {
            println!("{}", line);
        }
        println!();
    }
    for line in result.chart.summary_lines() {
        println!("{}", line);
    }

    if let Some(output_file) = output {
        writer::write_json(output_file, &result)?;
        info!("Wrote analysis output to {:?}", output_file);
    }
    Ok(())
}

fn import(
    cache_dir: Option<PathBuf>,
    key: SessionKey,
    input: &Path,
    start: Option<DateTime<Utc>>,
) -> Result<(), AnalystError> {
    if !input.exists() {
        return Err(AnalystError::InvalidUserInput {
            field: "input".to_string(),
            reason: format!("{:?} does not exist", input),
        });
    }
    let provider = open_provider(cache_dir, &load_config())?;

    let laps = match loader::detect_lap_format(input) {
        Some(loader::LapFileFormat::JsonLines) => loader::load_laps_jsonl(input)?,
        _ => loader::load_laps_csv(input)?,
    };
    let path = provider.save_laps(&key, &laps)?;
    let stints = segment_session_stints(&laps);
    println!(
        "Imported {} laps ({} drivers, {} stints) into {:?}",
        laps.len(),
        laps.drivers().len(),
        stints.len(),
        path
    );

    if let Some(start) = start {
        provider.register_session(key.year, &key.event, key.session, start)?;
        println!("Scheduled {} at {}", key, start);
    }
    Ok(())
}

fn main() {
    #[cfg(debug_assertions)]
    colog::init();

    let cli = Args::parse();
    ctrlc::set_handler(move || {
        println!("Exiting...");
        std::process::exit(0);
    })
    .expect("Could not set Ctrl-C handler");

    let result = match cli.command {
        Commands::Dashboard => dashboard(cli.cache_dir),
        Commands::Report {
            year,
            event,
            session,
            analysis,
            compound,
            driver,
            output,
        } => report(
            cli.cache_dir,
            AnalysisRequest {
                triggered: true,
                year: Some(year),
                event: Some(event),
                session,
                analysis: analysis.id().to_string(),
                compounds: compound,
                drivers: driver,
            },
            output.as_deref(),
        ),
        Commands::Import {
            year,
            event,
            session,
            input,
            start,
        } => import(cli.cache_dir, SessionKey::new(year, event, session), &input, start),
    };

    if let Err(e) = result {
        error!("{}", e);
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
