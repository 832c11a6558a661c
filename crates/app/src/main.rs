use std::fmt;

use buddy_core::model::ProblemId;
use buddy_core::time::format_total_time;
use services::{AppServices, PanelSignal, Request, Response};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_DB_URL: &str = "sqlite://codebuddy.sqlite3";

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    MissingCommand,
    UnknownArg(String),
    InvalidDbUrl { raw: String },
    InvalidProblemUrl { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::MissingCommand => write!(f, "missing command"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
            ArgsError::InvalidProblemUrl { raw } => write!(f, "not a problem URL: {raw}"),
        }
    }
}

impl std::error::Error for ArgsError {}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  app [--db <sqlite_url>] stats");
    eprintln!("  app [--db <sqlite_url>] set-key <key>");
    eprintln!("  app [--db <sqlite_url>] notes <problem_url>");
    eprintln!("  app [--db <sqlite_url>] delete-notes <problem_url>");
    eprintln!("  app [--db <sqlite_url>] clear");
    eprintln!();
    eprintln!("Defaults:");
    eprintln!("  --db {DEFAULT_DB_URL}");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  CODEBUDDY_DB_URL, CODEBUDDY_GEMINI_BASE_URL, CODEBUDDY_GEMINI_MODEL, RUST_LOG");
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Command {
    Stats,
    SetKey(String),
    Notes(ProblemId),
    DeleteNotes(ProblemId),
    Clear,
}

struct Args {
    db_url: String,
    command: Command,
}

impl Args {
    fn parse(args: &mut impl Iterator<Item = String>) -> Result<Option<Self>, ArgsError> {
        let mut db_url = std::env::var("CODEBUDDY_DB_URL")
            .ok()
            .map_or_else(|| DEFAULT_DB_URL.into(), normalize_sqlite_url);
        let mut command = None;

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => {
                    let value = require_value(args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    db_url = normalize_sqlite_url(value);
                }
                "--help" | "-h" => return Ok(None),
                _ if command.is_some() => return Err(ArgsError::UnknownArg(arg)),
                "stats" => command = Some(Command::Stats),
                "clear" => command = Some(Command::Clear),
                "set-key" => command = Some(Command::SetKey(require_value(args, "set-key")?)),
                "notes" => command = Some(Command::Notes(parse_problem(args, "notes")?)),
                "delete-notes" => {
                    command = Some(Command::DeleteNotes(parse_problem(args, "delete-notes")?));
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        let command = command.ok_or(ArgsError::MissingCommand)?;
        Ok(Some(Self { db_url, command }))
    }
}

fn parse_problem(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<ProblemId, ArgsError> {
    let raw = require_value(args, flag)?;
    raw.parse()
        .map_err(|_| ArgsError::InvalidProblemUrl { raw: raw.clone() })
}

fn normalize_sqlite_url(raw: String) -> String {
    if raw == "sqlite::memory:" || raw.starts_with("sqlite://") {
        return raw;
    }

    let trimmed = raw.trim();
    let path = std::path::Path::new(trimmed.strip_prefix("sqlite:").unwrap_or(trimmed));
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| std::path::PathBuf::from("."))
            .join(path)
    };
    format!("sqlite://{}", absolute.display())
}

fn prepare_sqlite_file(db_url: &str) -> Result<(), Box<dyn std::error::Error>> {
    if db_url == "sqlite::memory:" {
        return Ok(());
    }

    let path = db_url
        .strip_prefix("sqlite://")
        .ok_or_else(|| ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        })?;
    let path = path.split('?').next().unwrap_or(path);
    if path.is_empty() {
        return Err(ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        }
        .into());
    }

    let path = std::path::Path::new(path);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    if !path.exists() {
        std::fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(path)?;
    }
    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

async fn execute(services: &AppServices, command: Command) -> Result<(), Box<dyn std::error::Error>> {
    let dashboard = services.dashboard();
    match command {
        Command::Stats => {
            let overview = dashboard.overview().await?;
            let key_status = if overview.has_api_key { "set" } else { "not set" };
            println!("API key: {key_status}");
            println!("Problems: {}", overview.stats.total_problems);
            println!("Time: {}", format_total_time(overview.stats.total_time));
            println!("Hints: {}", overview.stats.total_hints);
            println!("Solutions: {}", overview.stats.total_solutions);
            if overview.recent.is_empty() {
                println!("No problems tracked yet.");
            }
            for (id, record) in overview.recent {
                println!(
                    "  {} [{}] {} | {} hints{}  {id}",
                    record.title,
                    record.platform,
                    format_total_time(record.time_spent),
                    record.hints_used,
                    if record.solution_viewed { " | solution" } else { "" },
                );
            }
        }
        Command::SetKey(key) => {
            dashboard.save_api_key(&key).await?;
            // No panel is attached to the CLI; the signal is only recorded.
            tracing::info!(signal = ?PanelSignal::ApiKeyUpdated, "credential changed");
            println!("API Key saved!");
        }
        Command::Notes(problem_id) => match dashboard.notes(&problem_id).await? {
            Some(notes) => println!("{notes}"),
            None => println!("No notes for {problem_id}."),
        },
        Command::DeleteNotes(problem_id) => {
            let request = Request::DeleteNotes { problem_id };
            match services.dispatcher().dispatch(request).await {
                Response::Ack(ack) if ack.success => println!("Notes deleted."),
                Response::Ack(ack) => {
                    return Err(ack.error.unwrap_or_else(|| "delete failed".into()).into());
                }
                other => return Err(format!("unexpected reply: {other:?}").into()),
            }
        }
        Command::Clear => {
            dashboard.clear_progress().await?;
            println!("Progress cleared.");
        }
    }
    Ok(())
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut argv = std::env::args().skip(1);
    let parsed = match Args::parse(&mut argv) {
        Ok(Some(parsed)) => parsed,
        Ok(None) => {
            print_usage();
            return Ok(());
        }
        Err(e) => {
            eprintln!("{e}");
            print_usage();
            std::process::exit(2);
        }
    };

    prepare_sqlite_file(&parsed.db_url)?;
    let services = AppServices::new_sqlite(&parsed.db_url).await?;
    tracing::debug!(db = %parsed.db_url, "storage ready");

    execute(&services, parsed.command).await
}

#[tokio::main]
async fn main() {
    init_tracing();
    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}
