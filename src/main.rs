use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};

use tick::api::{self, TaskService};
use tick::config::{self, Backend};
use tick::dashboard::clock::{Clock, SystemClock};
use tick::dashboard::day_key;
use tick::dashboard::quicklinks::normalize_url;
use tick::{logging, tui};

#[derive(Parser)]
#[command(
    name = "tick",
    version = env!("TICK_VERSION"),
    about = "Daily tasks, a pomodoro timer and bookmarks in your terminal"
)]
struct Cli {
    /// Talk to a tick server at this URL instead of the configured backend
    #[arg(long, global = true, conflicts_with = "local")]
    server: Option<String>,

    /// Use the local database regardless of config
    #[arg(long, global = true)]
    local: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Launch the TUI dashboard (default)
    Dashboard,
    /// Create the ~/.tick directory
    Init,
    /// Add a task
    Add {
        /// Task title
        title: String,
        /// Day the task belongs to (YYYY-MM-DD, default today)
        #[arg(short, long)]
        date: Option<NaiveDate>,
    },
    /// List the tasks for a day
    List {
        /// Day to list (YYYY-MM-DD, default today)
        #[arg(short, long)]
        date: Option<NaiveDate>,
    },
    /// List bookmarks
    Links,
    /// Add a bookmark
    AddLink {
        /// Display name
        name: String,
        /// Address; https:// is assumed when no scheme is given
        url: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    config::ensure_dirs()?;

    let mut config = config::load()?;
    if let Some(url) = cli.server {
        config.backend = Backend::Http;
        config.server_url = url;
    } else if cli.local {
        config.backend = Backend::Local;
    }

    if let Err(e) = logging::init(&config::log_path()?, &config.log_level) {
        eprintln!("warning: logging disabled: {e:#}");
    }

    match cli.command.unwrap_or(Commands::Dashboard) {
        Commands::Dashboard => tui::run(&config),
        Commands::Init => {
            println!("tick initialized at ~/.tick/");
            Ok(())
        }
        Commands::Add { title, date } => {
            let service = api::connect(&config)?;
            let day = day_key(date.unwrap_or_else(today));
            let task = service.create_task(&title, &day)?;
            println!("Added '{}' for {}", task.title, task.date);
            Ok(())
        }
        Commands::List { date } => {
            let service = api::connect(&config)?;
            list_tasks(service.as_ref(), date.unwrap_or_else(today))
        }
        Commands::Links => {
            let service = api::connect(&config)?;
            let links = service.list_quicklinks()?;
            if links.is_empty() {
                println!("No bookmarks. Use `tick add-link <name> <url>` to add one.");
            } else {
                for (i, link) in links.iter().enumerate() {
                    println!("  {} {} ({})", i + 1, link.name, link.url);
                }
            }
            Ok(())
        }
        Commands::AddLink { name, url } => {
            let (name, url) = (name.trim(), url.trim());
            if name.is_empty() || url.is_empty() {
                anyhow::bail!("name and url are required");
            }
            let service = api::connect(&config)?;
            let link = service.create_quicklink(name, &normalize_url(url))?;
            println!("Added bookmark '{}' ({})", link.name, link.url);
            Ok(())
        }
    }
}

fn today() -> NaiveDate {
    SystemClock.today()
}

fn list_tasks(service: &dyn TaskService, date: NaiveDate) -> Result<()> {
    let day = day_key(date);
    let tasks = service
        .list_tasks(&day)
        .with_context(|| format!("failed to list tasks for {day}"))?;
    if tasks.is_empty() {
        println!("No tasks for {day}. Use `tick add <title>` to add one.");
        return Ok(());
    }
    let done = tasks.iter().filter(|t| t.completed).count();
    println!("{day}  {done}/{} done", tasks.len());
    for t in &tasks {
        println!("  {} {}", t.symbol(), t.title);
    }
    Ok(())
}
