use anyhow::{Context, Result};
use chrono::NaiveDateTime;
use clap::{Parser, Subcommand, ValueEnum};
use podio_tasks::podio::format_api_error;
use podio_tasks::resource::DATETIME_FORMAT;
use podio_tasks::{Config, PodioClient, RequestOptions, Task, TaskSummary};
use serde_json::{json, Map, Value};
use std::path::PathBuf;
use tracing::Level;
use tracing_subscriber::fmt::writer::MakeWriterExt;

/// Command-line client for Podio tasks
#[derive(Parser, Debug)]
#[command(name = "podio-tasks", version, about, long_about = None)]
struct Args {
    /// API endpoint (defaults to PODIO_API_URL, then config, then api.podio.com)
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// OAuth access token (defaults to PODIO_ACCESS_TOKEN, then config)
    #[arg(long, global = true)]
    token: Option<String>,

    /// Suppress notifications for write operations
    #[arg(long, global = true)]
    silent: bool,

    /// Log level for debugging
    #[arg(long, value_enum, default_value = "off", global = true)]
    log_level: LogLevel,

    /// Run in read-only mode (block all write operations)
    #[arg(long, global = true)]
    readonly: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show one task
    Get { task_id: i64 },
    /// List tasks matching filters (key=value, repeatable)
    List {
        #[arg(short, long = "filter", value_parser = parse_key_value)]
        filters: Vec<(String, String)>,
    },
    /// Create a task, optionally attached to a reference
    Create {
        #[arg(long)]
        text: String,
        #[arg(long)]
        description: Option<String>,
        /// Due date-time, "YYYY-MM-DD HH:MM:SS" (UTC)
        #[arg(long, value_parser = parse_datetime)]
        due_on: Option<NaiveDateTime>,
        #[arg(long)]
        responsible: Option<i64>,
        #[arg(long = "label")]
        labels: Vec<i64>,
        #[arg(long)]
        private: bool,
        #[arg(long, requires = "ref_id")]
        ref_type: Option<String>,
        #[arg(long, requires = "ref_type")]
        ref_id: Option<i64>,
    },
    /// Update fields of a task
    Update {
        task_id: i64,
        #[arg(long)]
        text: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long, value_parser = parse_datetime)]
        due_on: Option<NaiveDateTime>,
        #[arg(long)]
        private: Option<bool>,
    },
    /// Mark a task completed
    Complete { task_id: i64 },
    /// Reopen a completed task
    Incomplete { task_id: i64 },
    /// Delete a task
    Delete { task_id: i64 },
    /// Assign a task to a user
    Assign { task_id: i64, user_id: i64 },
    /// Overdue / today / other summary
    Summary {
        #[arg(long, conflicts_with_all = ["space", "personal", "ref_type"])]
        org: Option<i64>,
        #[arg(long, conflicts_with_all = ["personal", "ref_type"])]
        space: Option<i64>,
        #[arg(long)]
        personal: bool,
        #[arg(long, requires = "ref_id")]
        ref_type: Option<String>,
        #[arg(long, requires = "ref_type")]
        ref_id: Option<i64>,
    },
    /// Count tasks on a reference
    Count { ref_type: String, ref_id: i64 },
    /// Print a task as iCalendar
    Ical { task_id: i64 },
    /// Store endpoint and token in the config file
    Config {
        #[arg(long)]
        set_api_url: Option<String>,
        #[arg(long)]
        set_token: Option<String>,
    },
}

impl Command {
    fn is_write(&self) -> bool {
        matches!(
            self,
            Command::Create { .. }
                | Command::Update { .. }
                | Command::Complete { .. }
                | Command::Incomplete { .. }
                | Command::Delete { .. }
                | Command::Assign { .. }
        )
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    fn to_tracing_level(self) -> Option<Level> {
        match self {
            LogLevel::Off => None,
            LogLevel::Error => Some(Level::ERROR),
            LogLevel::Warn => Some(Level::WARN),
            LogLevel::Info => Some(Level::INFO),
            LogLevel::Debug => Some(Level::DEBUG),
            LogLevel::Trace => Some(Level::TRACE),
        }
    }
}

fn parse_key_value(raw: &str) -> Result<(String, String), String> {
    raw.split_once('=')
        .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
        .filter(|(k, _)| !k.is_empty())
        .ok_or_else(|| format!("expected key=value, got '{}'", raw))
}

fn parse_datetime(raw: &str) -> Result<NaiveDateTime, String> {
    NaiveDateTime::parse_from_str(raw, DATETIME_FORMAT).map_err(|e| format!("{} (expected YYYY-MM-DD HH:MM:SS)", e))
}

fn setup_logging(level: LogLevel) -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let tracing_level = level.to_tracing_level()?;

    let log_path = get_log_path();

    if let Some(parent) = log_path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }

    let file = match std::fs::OpenOptions::new().create(true).append(true).open(&log_path) {
        Ok(file) => file,
        Err(e) => {
            eprintln!("Failed to open log file {:?}: {}", log_path, e);
            return None;
        },
    };

    let (non_blocking, guard) = tracing_appender::non_blocking(file);

    tracing_subscriber::fmt()
        .with_max_level(tracing_level)
        .with_writer(non_blocking.with_max_level(tracing_level))
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(true)
        .with_line_number(true)
        .init();

    tracing::info!("podio-tasks started with log level: {:?}", level);
    tracing::info!("Log file: {:?}", log_path);

    Some(guard)
}

fn get_log_path() -> PathBuf {
    if let Some(config_dir) = dirs::config_dir() {
        return config_dir.join("podio-tasks").join("podio-tasks.log");
    }
    if let Some(home) = dirs::home_dir() {
        return home.join(".podio-tasks").join("podio-tasks.log");
    }
    PathBuf::from("podio-tasks.log")
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let _log_guard = setup_logging(args.log_level);

    if let Err(err) = run(args).await {
        match err.downcast_ref::<podio_tasks::Error>() {
            Some(podio_tasks::Error::Transport(inner)) => eprintln!("Error: {}", format_api_error(inner)),
            _ => eprintln!("Error: {err:#}"),
        }
        std::process::exit(1);
    }

    Ok(())
}

async fn run(args: Args) -> Result<()> {
    let mut config = Config::load();

    if args.readonly && args.command.is_write() {
        return Err(anyhow::anyhow!("Write operations are blocked in read-only mode"));
    }

    if let Command::Config { set_api_url, set_token } = &args.command {
        if let Some(url) = set_api_url {
            config.set_api_url(url)?;
        }
        if let Some(token) = set_token {
            config.set_access_token(token)?;
        }
        println!("{}", Config::config_path().map(|p| p.display().to_string()).unwrap_or_default());
        return Ok(());
    }

    let api_url = config.effective_api_url(args.api_url.as_deref());
    let token = config.effective_token(args.token.as_deref());
    if token.is_none() {
        tracing::warn!("No access token configured; requests will be anonymous");
    }
    tracing::info!("Using API endpoint: {}", api_url);

    let client = PodioClient::new(&api_url, token)?;
    let options = RequestOptions::new().silent(args.silent || config.silent);

    match args.command {
        Command::Get { task_id } => print_json(&Task::get(&client, task_id).await?.to_json()),
        Command::List { filters } => {
            let filters: Map<String, Value> = filters.into_iter().map(|(k, v)| (k, Value::String(v))).collect();
            let tasks = Task::get_all(&client, &Value::Object(filters)).await?;
            print_json(&Value::Array(tasks.iter().map(Task::to_json).collect()))
        },
        Command::Create {
            text,
            description,
            due_on,
            responsible,
            labels,
            private,
            ref_type,
            ref_id,
        } => {
            let mut task = Task::new();
            task.set_text(text);
            if let Some(description) = description {
                task.set_description(description);
            }
            if let Some(due_on) = due_on {
                task.set_due_on(due_on.and_utc());
            }
            if let Some(user_id) = responsible {
                task.set_responsible(user_id);
            }
            if !labels.is_empty() {
                task.set_label_ids(&labels);
            }
            if private {
                task.set_private(true);
            }

            let created = match (ref_type, ref_id) {
                (Some(ref_type), Some(ref_id)) => {
                    Task::create_for(&client, &ref_type, ref_id, &task.dehydrate(), &options).await?
                },
                _ => {
                    task.save_with(&client, &options).await?;
                    task
                },
            };
            print_json(&created.to_json())
        },
        Command::Update {
            task_id,
            text,
            description,
            due_on,
            private,
        } => {
            let mut changes = Task::new();
            if let Some(text) = text {
                changes.set_text(text);
            }
            if let Some(description) = description {
                changes.set_description(description);
            }
            if let Some(due_on) = due_on {
                changes.set_due_on(due_on.and_utc());
            }
            if let Some(private) = private {
                changes.set_private(private);
            }
            let updated = Task::update(&client, task_id, &changes.dehydrate(), &options).await?;
            print_json(&updated.to_json())
        },
        Command::Complete { task_id } => print_status(Task::complete(&client, task_id).await?.status),
        Command::Incomplete { task_id } => print_status(Task::incomplete(&client, task_id).await?.status),
        Command::Delete { task_id } => print_status(Task::delete(&client, task_id).await?.status),
        Command::Assign { task_id, user_id } => {
            let response = Task::assign(&client, task_id, &json!({ "responsible": user_id })).await?;
            print_status(response.status)
        },
        Command::Summary {
            org,
            space,
            personal,
            ref_type,
            ref_id,
        } => {
            let filters = Value::Null;
            let summary: TaskSummary = match (org, space, ref_type, ref_id) {
                (Some(org_id), _, _, _) => Task::get_summary_for_org(&client, org_id, &filters).await?,
                (_, Some(space_id), _, _) => Task::get_summary_for_space(&client, space_id, &filters).await?,
                (_, _, Some(ref_type), Some(ref_id)) => {
                    Task::get_summary_for(&client, &ref_type, ref_id, &filters).await?
                },
                _ if personal => Task::get_summary_personal(&client, &filters).await?,
                _ => Task::get_summary(&client, &filters).await?,
            };
            print_json(&summary.to_json())
        },
        Command::Count { ref_type, ref_id } => print_json(&Task::count(&client, &ref_type, ref_id).await?),
        Command::Ical { task_id } => {
            print!("{}", Task::ical(&client, task_id).await?);
            Ok(())
        },
        Command::Config { .. } => Ok(()),
    }
}

fn print_json(value: &Value) -> Result<()> {
    let text = serde_json::to_string_pretty(value).context("Failed to render JSON")?;
    println!("{}", text);
    Ok(())
}

fn print_status(status: u16) -> Result<()> {
    println!("ok ({})", status);
    Ok(())
}
