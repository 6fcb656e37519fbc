//! Cognilock CLI - Command-line interface for Synheart Cognilock
//!
//! Commands:
//! - serve: Run the JSON HTTP service
//! - simulate: Run a session offline and print tick reports
//! - score: Score a single activity profile
//! - doctor: Diagnose configuration and classifier health

use clap::{Parser, Subcommand, ValueEnum};
use std::io::{self, Write};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use synheart_cognilock::analyzer::CognitiveAnalyzer;
use synheart_cognilock::classifier::TrainingSet;
use synheart_cognilock::server::{self, AppState};
use synheart_cognilock::types::{ActivitySignals, CognitiveState, LockState};
use synheart_cognilock::{
    EngineConfig, EngineError, Mode, RandomForest, SessionController, StressClassifier,
    TickReport, COGNILOCK_VERSION, PRODUCER_NAME,
};

/// Cognilock - Behavioral stress scoring engine
#[derive(Parser)]
#[command(name = "cognilock")]
#[command(author = "Synheart AI Inc")]
#[command(version = COGNILOCK_VERSION)]
#[command(about = "Simulate and score behavioral stress sessions", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the JSON HTTP service
    Serve {
        /// Listen address (overrides the config file)
        #[arg(long)]
        bind: Option<String>,

        /// Engine configuration file (JSON)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Simulator seed (overrides the config file)
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Run a session offline and print each tick
    Simulate {
        /// Session mode
        #[arg(long, default_value = "study")]
        mode: ModeArg,

        /// Number of ticks to run
        #[arg(long, default_value = "20")]
        ticks: usize,

        /// Simulator seed (overrides the config file)
        #[arg(long)]
        seed: Option<u64>,

        /// Engine configuration file (JSON)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Output format
        #[arg(long, default_value = "ndjson")]
        output_format: OutputFormat,
    },

    /// Score a single activity profile with the trained classifier
    Score {
        #[arg(long)]
        typing: f64,

        #[arg(long)]
        idle: f64,

        #[arg(long)]
        apps: f64,

        #[arg(long)]
        mouse: f64,

        /// Engine configuration file (JSON)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Diagnose configuration and classifier health
    Doctor {
        /// Check a configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum ModeArg {
    Study,
    Work,
    Creative,
}

impl From<ModeArg> for Mode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Study => Mode::Study,
            ModeArg::Work => Mode::Work,
            ModeArg::Creative => Mode::Creative,
        }
    }
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    /// Newline-delimited JSON (one tick report per line)
    Ndjson,
    /// JSON array of tick reports
    Json,
    /// Pretty-printed JSON
    JsonPretty,
}

fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!(
                "{}",
                serde_json::to_string(&CliError::from(e))
                    .unwrap_or_else(|_| "Unknown error".to_string())
            );
            ExitCode::FAILURE
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn run(cli: Cli) -> Result<(), CognilockCliError> {
    match cli.command {
        Commands::Serve { bind, config, seed } => cmd_serve(bind, config.as_deref(), seed),

        Commands::Simulate {
            mode,
            ticks,
            seed,
            config,
            output_format,
        } => cmd_simulate(mode.into(), ticks, seed, config.as_deref(), output_format),

        Commands::Score {
            typing,
            idle,
            apps,
            mouse,
            config,
            json,
        } => {
            let signals = ActivitySignals {
                typing,
                idle,
                apps,
                mouse,
            };
            cmd_score(signals, config.as_deref(), json)
        }

        Commands::Doctor { config, json } => cmd_doctor(config.as_deref(), json),
    }
}

fn load_config(path: Option<&Path>) -> Result<EngineConfig, CognilockCliError> {
    match path {
        Some(path) => Ok(EngineConfig::load(path)?),
        None => Ok(EngineConfig::default()),
    }
}

fn cmd_serve(
    bind: Option<String>,
    config_path: Option<&Path>,
    seed: Option<u64>,
) -> Result<(), CognilockCliError> {
    let mut config = load_config(config_path)?;
    if let Some(bind) = bind {
        config.bind = bind;
    }
    if seed.is_some() {
        config.rng_seed = seed;
    }

    let addr: SocketAddr = config
        .bind
        .parse()
        .map_err(|_| CognilockCliError::InvalidBind(config.bind.clone()))?;

    let controller = SessionController::from_config(&config)?;
    let state = AppState::new(controller);

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(server::serve(addr, state))?;
    Ok(())
}

fn cmd_simulate(
    mode: Mode,
    ticks: usize,
    seed: Option<u64>,
    config_path: Option<&Path>,
    output_format: OutputFormat,
) -> Result<(), CognilockCliError> {
    let mut config = load_config(config_path)?;
    if seed.is_some() {
        config.rng_seed = seed;
    }

    let mut controller = SessionController::from_config(&config)?;
    controller.start_mode(mode);

    let mut stdout = io::stdout();
    let mut reports: Vec<TickReport> = Vec::with_capacity(ticks);

    for _ in 0..ticks {
        let report = controller.tick()?;
        match output_format {
            OutputFormat::Ndjson => writeln!(stdout, "{}", serde_json::to_string(&report)?)?,
            OutputFormat::Json | OutputFormat::JsonPretty => reports.push(report),
        }
    }

    match output_format {
        OutputFormat::Ndjson => {}
        OutputFormat::Json => writeln!(stdout, "{}", serde_json::to_string(&reports)?)?,
        OutputFormat::JsonPretty => {
            writeln!(stdout, "{}", serde_json::to_string_pretty(&reports)?)?
        }
    }
    stdout.flush()?;
    Ok(())
}

fn cmd_score(
    signals: ActivitySignals,
    config_path: Option<&Path>,
    json: bool,
) -> Result<(), CognilockCliError> {
    let config = load_config(config_path)?;
    let forest = RandomForest::train(&TrainingSet::reference(), config.forest)?;

    let probability = forest.predict_proba(&signals.features())?;
    let raw_score = (probability * 100.0).floor() as u32;

    let report = ScoreReport {
        probability,
        raw_score,
        lock: CognitiveAnalyzer::lock_state(raw_score),
        cognitive_state: CognitiveAnalyzer::classify(raw_score, &signals),
        reasons: CognitiveAnalyzer::explain(&signals),
        in_simulator_range: signals.in_range(),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Probability:     {:.3}", report.probability);
        println!("Raw score:       {}", report.raw_score);
        println!("Lock:            {:?}", report.lock);
        println!("Cognitive state: {:?}", report.cognitive_state);
        if !report.in_simulator_range {
            println!("Note:            signals lie outside the simulator range");
        }
        println!("Reasons:");
        for reason in &report.reasons {
            println!("  - {}", reason);
        }
    }
    Ok(())
}

fn cmd_doctor(config_path: Option<&Path>, json: bool) -> Result<(), CognilockCliError> {
    let mut checks: Vec<DoctorCheck> = Vec::new();

    checks.push(DoctorCheck {
        name: "cognilock_version".to_string(),
        status: CheckStatus::Ok,
        message: format!("Cognilock version {}", COGNILOCK_VERSION),
    });

    let config = match config_path {
        None => {
            checks.push(DoctorCheck {
                name: "config".to_string(),
                status: CheckStatus::Ok,
                message: "No config file given, using defaults".to_string(),
            });
            Some(EngineConfig::default())
        }
        Some(path) if !path.exists() => {
            checks.push(DoctorCheck {
                name: "config".to_string(),
                status: CheckStatus::Warning,
                message: "Config file does not exist".to_string(),
            });
            None
        }
        Some(path) => match EngineConfig::load(path) {
            Ok(config) => {
                checks.push(DoctorCheck {
                    name: "config".to_string(),
                    status: CheckStatus::Ok,
                    message: format!("Config file valid (bind {})", config.bind),
                });
                Some(config)
            }
            Err(e) => {
                checks.push(DoctorCheck {
                    name: "config".to_string(),
                    status: CheckStatus::Error,
                    message: e.to_string(),
                });
                None
            }
        },
    };

    if let Some(config) = config {
        checks.push(classifier_check(&config));
    }

    let report = DoctorReport {
        producer: PRODUCER_NAME.to_string(),
        version: COGNILOCK_VERSION.to_string(),
        checks,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Cognilock Doctor Report");
        println!("=======================");
        println!("Producer: {}", report.producer);
        println!("Version:  {}", report.version);
        println!("\nChecks:");

        for check in &report.checks {
            let status_icon = match check.status {
                CheckStatus::Ok => "[OK]",
                CheckStatus::Warning => "[WARN]",
                CheckStatus::Error => "[ERR]",
            };
            println!("  {} {}: {}", status_icon, check.name, check.message);
        }
    }

    let has_errors = report
        .checks
        .iter()
        .any(|c| matches!(c.status, CheckStatus::Error));
    if has_errors {
        Err(CognilockCliError::DoctorFailed)
    } else {
        Ok(())
    }
}

/// Train the configured forest and check it still separates the reference profiles
fn classifier_check(config: &EngineConfig) -> DoctorCheck {
    let forest = match RandomForest::train(&TrainingSet::reference(), config.forest) {
        Ok(forest) => forest,
        Err(e) => {
            return DoctorCheck {
                name: "classifier".to_string(),
                status: CheckStatus::Error,
                message: e.to_string(),
            }
        }
    };

    let calm = forest.predict_proba(&ActivitySignals::default().features());
    let worn = forest.predict_proba(&[20.0, 30.0, 15.0, 20.0]);

    match (calm, worn) {
        (Ok(calm), Ok(worn)) if calm < 0.5 && worn > 0.5 => DoctorCheck {
            name: "classifier".to_string(),
            status: CheckStatus::Ok,
            message: format!(
                "{} trees (max depth {}), default profile {:.2}, exhausted profile {:.2}",
                forest.tree_count(),
                forest.max_depth(),
                calm,
                worn
            ),
        },
        (Ok(calm), Ok(worn)) => DoctorCheck {
            name: "classifier".to_string(),
            status: CheckStatus::Warning,
            message: format!(
                "Weak separation: default profile {:.2}, exhausted profile {:.2}",
                calm, worn
            ),
        },
        (Err(e), _) | (_, Err(e)) => DoctorCheck {
            name: "classifier".to_string(),
            status: CheckStatus::Error,
            message: e.to_string(),
        },
    }
}

#[derive(Debug)]
enum CognilockCliError {
    Io(io::Error),
    Engine(EngineError),
    Json(serde_json::Error),
    InvalidBind(String),
    DoctorFailed,
}

impl From<io::Error> for CognilockCliError {
    fn from(e: io::Error) -> Self {
        CognilockCliError::Io(e)
    }
}

impl From<EngineError> for CognilockCliError {
    fn from(e: EngineError) -> Self {
        CognilockCliError::Engine(e)
    }
}

impl From<serde_json::Error> for CognilockCliError {
    fn from(e: serde_json::Error) -> Self {
        CognilockCliError::Json(e)
    }
}

#[derive(serde::Serialize)]
struct CliError {
    code: String,
    message: String,
    hint: Option<String>,
}

impl From<CognilockCliError> for CliError {
    fn from(e: CognilockCliError) -> Self {
        match e {
            CognilockCliError::Io(e) => CliError {
                code: "IO_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check file paths, permissions and the listen address".to_string()),
            },
            CognilockCliError::Engine(e) => CliError {
                code: e.code().to_string(),
                message: e.to_string(),
                hint: Some("Run 'cognilock doctor' for details".to_string()),
            },
            CognilockCliError::Json(e) => CliError {
                code: "JSON_ERROR".to_string(),
                message: e.to_string(),
                hint: None,
            },
            CognilockCliError::InvalidBind(addr) => CliError {
                code: "INVALID_BIND".to_string(),
                message: format!("Cannot parse listen address '{}'", addr),
                hint: Some("Use host:port, e.g. 127.0.0.1:5000".to_string()),
            },
            CognilockCliError::DoctorFailed => CliError {
                code: "DOCTOR_FAILED".to_string(),
                message: "One or more health checks failed".to_string(),
                hint: Some("Review the doctor report for details".to_string()),
            },
        }
    }
}

// Report types

#[derive(serde::Serialize)]
struct ScoreReport {
    probability: f64,
    raw_score: u32,
    lock: LockState,
    cognitive_state: CognitiveState,
    reasons: Vec<String>,
    in_simulator_range: bool,
}

#[derive(serde::Serialize)]
struct DoctorReport {
    producer: String,
    version: String,
    checks: Vec<DoctorCheck>,
}

#[derive(serde::Serialize)]
struct DoctorCheck {
    name: String,
    status: CheckStatus,
    message: String,
}

#[derive(serde::Serialize)]
enum CheckStatus {
    Ok,
    Warning,
    Error,
}
