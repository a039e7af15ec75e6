use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use taskboard_core::{SortConfig, SortKey, SortState, StatusFilter, TaskDraft, TaskStore, ViewState};
use taskboard_sync::{FetchOutcome, HttpTaskApi, SharedStore, SubmitError, SyncController};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod config;
mod render;
mod shell;
mod state;

const VERSION: &str = concat!(env!("CARGO_PKG_VERSION"), " (", env!("TASKBOARD_BUILD_SHA"), ")");

#[derive(Parser, Debug)]
#[command(name = "taskboard", version = VERSION, about = "Task list client for a REST /tasks backend")]
struct Cli {
    /// Backend base URL (overrides config api.base_url)
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Config file (default: ~/.taskboard/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fetch and print tasks
    List {
        /// Sort key (only "date" is sortable)
        #[arg(long, value_enum)]
        sort: Option<SortArg>,

        /// Sort descending instead of ascending
        #[arg(long, default_value_t = false)]
        desc: bool,

        /// Status filter: all, "To Do", "In Progress" or "Completed"
        #[arg(long)]
        status: Option<StatusFilter>,
    },

    /// Create a task
    Add {
        #[arg(long)]
        title: String,

        #[arg(long)]
        description: Option<String>,

        #[arg(long, default_value = "To Do")]
        status: String,
    },

    /// Edit a task; omitted fields keep their current values
    Edit {
        id: String,

        #[arg(long)]
        title: Option<String>,

        #[arg(long)]
        description: Option<String>,

        #[arg(long)]
        status: Option<String>,
    },

    /// Delete a task
    Delete { id: String },

    /// Interactive list view with sort/filter and add/edit/delete
    Shell,

    /// Config file helpers
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum SortArg {
    Date,
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Write a default config file if none exists
    Init,
    /// Print the effective config
    Show,
    /// Print the config file location
    Path,
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "taskboard=info,taskboard_sync=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let config_path = cli.config.as_deref();

    if let Command::Config { command } = &cli.command {
        return match command {
            ConfigCommand::Init => config::init_config(config_path),
            ConfigCommand::Show => {
                let cfg = config::load_config(config_path)?;
                print!("{}", toml::to_string_pretty(&cfg).context("serialize config")?);
                Ok(())
            }
            ConfigCommand::Path => {
                let p = match config_path {
                    Some(p) => p.to_path_buf(),
                    None => config::default_config_path()?,
                };
                println!("{}", p.display());
                Ok(())
            }
        };
    }

    let cfg = config::load_config(config_path)?;
    let base_url = cli.base_url.clone().unwrap_or_else(|| cfg.api.base_url.clone());
    let api = HttpTaskApi::with_timeout(&base_url, cfg.timeout())
        .with_context(|| format!("backend at {base_url}"))?;
    let ctl = SyncController::new(api, SharedStore::new(TaskStore::new()));

    match cli.command {
        Command::List { sort, desc, status } => {
            let mut view = cfg.initial_view()?;
            if let Some(SortArg::Date) = sort {
                let by_date = if desc {
                    SortConfig::descending(SortKey::Date)
                } else {
                    SortConfig::ascending(SortKey::Date)
                };
                view.sort = SortState::with(by_date);
            }
            if let Some(filter) = status {
                view.filter = filter;
            }
            list(&ctl, &view).await?;
        }

        Command::Add { title, description, status } => {
            let mut draft = TaskDraft::new(title).with_status(status);
            draft.description = description;
            let task = ctl
                .create_task(&draft, |t| println!("Added {} ({})", t.id, t.title))
                .await
                .map_err(describe)?;
            tracing::debug!(id = %task.id, "created");
        }

        Command::Edit { id, title, description, status } => {
            load(&ctl).await?;
            let Some(current) = ctl.store().read(|s| s.get(&id).cloned()) else {
                bail!("no task with id '{id}'");
            };
            let mut draft = TaskDraft::from_task(&current);
            if let Some(t) = title {
                draft.title = t;
            }
            if let Some(d) = description {
                draft.description = Some(d);
            }
            if let Some(s) = status {
                draft.status = s;
            }
            ctl.edit_task(&id, &draft, |t| println!("Saved {} ({})", t.id, t.title))
                .await
                .map_err(describe)?;
        }

        Command::Delete { id } => {
            load(&ctl).await?;
            ctl.delete_task(&id, |t| println!("Deleted {} ({})", t.id, t.title))
                .await
                .map_err(describe)?;
        }

        Command::Shell => {
            shell::run_shell(&ctl, cfg.initial_view()?).await?;
        }

        Command::Config { .. } => unreachable!("handled above"),
    }

    Ok(())
}

async fn load(ctl: &SyncController<HttpTaskApi>) -> Result<()> {
    match ctl.fetch_tasks().await {
        FetchOutcome::Failed(msg) => bail!("could not load tasks: {msg}"),
        FetchOutcome::Loaded(_) | FetchOutcome::Superseded => Ok(()),
    }
}

async fn list(ctl: &SyncController<HttpTaskApi>, view: &ViewState) -> Result<()> {
    if let FetchOutcome::Failed(msg) = ctl.fetch_tasks().await {
        bail!("An error occurred: {msg}");
    }
    println!("{}", ctl.store().read(|s| render::render_list(s, view)));
    Ok(())
}

fn describe(err: SubmitError) -> anyhow::Error {
    match err.field_errors() {
        Some(fields) => anyhow::anyhow!("Fix the following:\n{}", render::render_field_errors(fields)),
        None => anyhow::Error::new(err),
    }
}
