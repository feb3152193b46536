//! todo-assist
//!
//! Local todo list with an HTTP server for AI-assisted subtask suggestions and
//! priority labels.

use anyhow::{Result, bail};
use clap::Parser;
use std::fs::OpenOptions;
use std::sync::Arc;
use todo_assist::ai::{AiClient, GeminiGenerator, Generator};
use todo_assist::cli::{Cli, Command, PrioritiseArgs, ServeArgs, SuggestArgs};
use todo_assist::config::{API_KEY_ENV, CONFIG_PATH_ENV, Config, ConfigLoader, ConfigPaths};
use todo_assist::db::Database;
use todo_assist::format::{
    self, OutputFormat, format_prioritised, format_suggestion, format_task_line, format_view,
};
use todo_assist::server::{self, AppState};
use todo_assist::store::TodoStore;
use todo_assist::store::persist::Persistence;
use todo_assist::view::{Action, TodoView};
use tracing::{Level, debug, info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(&cli)?;

    // An explicit --config takes the place of TODO_ASSIST_CONFIG_PATH
    let explicit_config = cli.config.clone();
    let mut loader = ConfigLoader::load_with_env(ConfigPaths::discover(), |name| {
        if name == CONFIG_PATH_ENV && explicit_config.is_some() {
            return explicit_config.clone();
        }
        std::env::var(name).ok()
    })?;

    for (tier, path) in loader.sources() {
        debug!("Loaded {} config from {}", tier, path.display());
    }

    let config = loader.config_mut();
    if let Some(db_path) = &cli.database {
        config.storage.db_path = db_path.into();
    }
    let config = loader.into_config();

    match cli.command {
        Some(Command::Serve(args)) => run_server(config, args).await,
        None => run_server(config, ServeArgs::default()).await,
        Some(Command::Suggest(args)) => run_suggest(&config, args, cli.format).await,
        Some(Command::Prioritise(args)) => run_prioritise(&config, args, cli.format).await,
        Some(Command::List { filter }) => run_action(&config, Action::SetFilter(filter), cli.format),
        Some(Command::Add { title }) => run_action(&config, Action::Add(title), cli.format),
        Some(Command::Toggle { id }) => run_action(&config, Action::Toggle(id), cli.format),
        Some(Command::Rename { id, title }) => {
            run_action(&config, Action::Update(id, title), cli.format)
        }
        Some(Command::Delete { id }) => run_action(&config, Action::Delete(id), cli.format),
        Some(Command::ClearCompleted) => run_action(&config, Action::ClearCompleted, cli.format),
        Some(Command::Stats) => run_stats(&config, cli.format),
    }
}

/// Initialize logging based on the --log option.
fn init_logging(cli: &Cli) -> Result<()> {
    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    let filter = || {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.as_str()))
    };

    match cli.log.as_str() {
        "0" | "off" => {
            // No logging
        }
        "1" | "stdout" => {
            let subscriber = FmtSubscriber::builder()
                .with_env_filter(filter())
                .with_writer(std::io::stdout)
                .finish();
            tracing::subscriber::set_global_default(subscriber)?;
        }
        "2" | "stderr" => {
            let subscriber = FmtSubscriber::builder()
                .with_env_filter(filter())
                .with_writer(std::io::stderr)
                .finish();
            tracing::subscriber::set_global_default(subscriber)?;
        }
        filename => {
            // Log to file (append mode)
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(filename)?;
            let subscriber = FmtSubscriber::builder()
                .with_env_filter(filter())
                .with_writer(file)
                .with_ansi(false)
                .finish();
            tracing::subscriber::set_global_default(subscriber)?;
        }
    }
    Ok(())
}

fn open_store(config: &Config) -> Result<TodoStore> {
    config.ensure_db_dir()?;
    let db = Database::open(&config.storage.db_path)?;
    Ok(TodoStore::open(Persistence::new(
        db,
        config.storage.key.clone(),
    )))
}

/// Run the HTTP server until Ctrl-C.
async fn run_server(mut config: Config, args: ServeArgs) -> Result<()> {
    if let Some(host) = args.host {
        config.server.host = host;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }

    info!("Starting todo-assist v{}", env!("CARGO_PKG_VERSION"));
    info!("Database: {:?}", config.storage.db_path);

    let store = open_store(&config)?;

    let generator = if config.ai.is_enabled() {
        let generator = GeminiGenerator::from_config(&config.ai)?;
        info!("AI routes enabled (model: {})", generator.model());
        Some(Arc::new(generator) as Arc<dyn Generator>)
    } else {
        warn!(
            "{} is not set; AI routes will respond with 503",
            API_KEY_ENV
        );
        None
    };

    let state = AppState::new(store, generator);
    let handle = server::start_server(state, &config.server.bind_addr()).await?;
    println!("Listening on http://{}", handle.addr());

    tokio::signal::ctrl_c().await?;
    info!("Shutdown requested");
    handle.shutdown().await;

    Ok(())
}

/// Store commands: each maps to one view action followed by a refresh.
fn run_action(config: &Config, action: Action, format: OutputFormat) -> Result<()> {
    let mut view = TodoView::new(open_store(config)?);

    match action {
        Action::SetFilter(filter) => {
            view.dispatch(Action::SetFilter(filter));
            print!("{}", format_view(&view, format));
        }
        Action::Add(title) => {
            let created = view.dispatch(Action::Add(title));
            match created {
                Some(task) => print_task(&task, format),
                None => bail!(
                    "{}",
                    view.last_error().unwrap_or("failed to add todo")
                ),
            }
        }
        Action::Toggle(id) => {
            view.dispatch(Action::Toggle(id));
            report_after(&view, id, format)?;
        }
        Action::Update(id, title) => {
            view.dispatch(Action::Update(id, title));
            report_after(&view, id, format)?;
        }
        Action::Delete(id) => {
            let existed = view.items().iter().any(|t| t.id == id);
            view.dispatch(Action::Delete(id));
            if let Some(err) = view.last_error() {
                bail!("{}", err);
            }
            if existed {
                println!("Deleted #{}", id);
            } else {
                println!("No todo #{}", id);
            }
        }
        Action::ClearCompleted => {
            let before = view.stats().completed;
            view.dispatch(Action::ClearCompleted);
            if let Some(err) = view.last_error() {
                bail!("{}", err);
            }
            println!("Cleared {} completed todo(s)", before);
        }
    }

    Ok(())
}

fn run_stats(config: &Config, format: OutputFormat) -> Result<()> {
    let stats = open_store(config)?.get_stats();
    match format {
        OutputFormat::Json => println!("{}", format::to_json(&stats)),
        OutputFormat::Text => println!("{}", format::format_stats(&stats)),
    }
    Ok(())
}

fn print_task(task: &todo_assist::types::Task, format: OutputFormat) {
    match format {
        OutputFormat::Json => println!("{}", format::to_json(task)),
        OutputFormat::Text => println!("{}", format_task_line(task)),
    }
}

/// Print the task after a toggle/rename, or note that the id was unknown.
fn report_after(view: &TodoView, id: i64, format: OutputFormat) -> Result<()> {
    if let Some(err) = view.last_error() {
        bail!("{}", err);
    }
    match view.items().iter().find(|t| t.id == id) {
        Some(task) => print_task(task, format),
        None => println!("No todo #{}", id),
    }
    Ok(())
}

fn ai_client(config: &Config, server_url: Option<String>) -> Result<AiClient> {
    let mut client_config = config.client.clone();
    if let Some(url) = server_url {
        client_config.server_url = url;
    }
    AiClient::from_config(&client_config)
}

async fn run_suggest(config: &Config, args: SuggestArgs, format: OutputFormat) -> Result<()> {
    // A numeric target refers to a stored todo; anything else is used as the title
    let title = match args.target.trim().parse::<i64>() {
        Ok(id) => match open_store(config)?.get(id) {
            Some(task) => task.title,
            None => bail!("No todo #{}", id),
        },
        Err(_) => args.target,
    };

    let client = ai_client(config, args.server_url)?;
    let suggestion = client.suggest_subtasks(&title).await;
    print!("{}", format_suggestion(&suggestion, format));
    Ok(())
}

async fn run_prioritise(config: &Config, args: PrioritiseArgs, format: OutputFormat) -> Result<()> {
    let titles = if args.titles.is_empty() {
        open_store(config)?
            .get_all()
            .into_iter()
            .filter(|t| !t.completed)
            .map(|t| t.title)
            .collect()
    } else {
        args.titles
    };

    if titles.is_empty() {
        println!("Nothing to prioritise.");
        return Ok(());
    }

    let client = ai_client(config, args.server_url)?;
    let result = client.prioritise_todos(&titles).await;
    print!("{}", format_prioritised(&result, format));
    Ok(())
}
