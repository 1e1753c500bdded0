mod app;
mod cli;
mod config;
mod datasources;
mod error;
mod logic;
mod models;
mod ui;

use anyhow::Context;
use app::{App, RemoteEvent, RemoteRequest, Screen};
use clap::Parser;
use cli::{Cli, Commands, ListArgs};
use config::Config;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use datasources::BackendClient;
use logic::{fetch_remote_analysis, visible_parcels, DataSyncService};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io::{self, Stdout};
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::Duration;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};
use tracing_subscriber::EnvFilter;
use ui::screens::{
    AnalysisScreen, DashboardScreen, FilterField, FiltersScreen, MapScreen, NewParcelScreen,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Init) => {
            init_logging(cli.verbose, None)?;
            let (_, path) = Config::setup_interactive()?;
            println!("Configuration written to {}", path.display());
            Ok(())
        }
        Some(Commands::Check) => {
            init_logging(cli.verbose, None)?;
            run_check(cli.config).await
        }
        Some(Commands::List(ref args)) => {
            init_logging(cli.verbose, None)?;
            run_list(cli.config.clone(), args).await
        }
        None => {
            let log_path = Config::log_path(cli.data_dir.as_ref())?;
            init_logging(cli.verbose, Some(log_path))?;
            run_tui(cli.config).await
        }
    }
}

/// `RUST_LOG` wins; otherwise `-v` is debug and `-vv` trace. The TUI logs to a file.
fn init_logging(verbose: u8, log_file: Option<PathBuf>) -> anyhow::Result<()> {
    let level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    match log_file {
        Some(path) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(&path)
                .with_context(|| format!("Cannot open log file {}", path.display()))?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .init();
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(io::stderr)
                .init();
        }
    }
    Ok(())
}

async fn run_check(config_path: Option<PathBuf>) -> anyhow::Result<()> {
    let config = Config::load(config_path).context("Configuration error")?;
    println!("Configuration OK");

    let data_sync = DataSyncService::new(&config);
    let status = data_sync.check_connection().await;
    println!("{}", status.describe());
    println!("Data source: {}", status.source_kind());

    if status.backend_configured && !status.backend_reachable {
        println!("The TUI will fall back to demo data.");
    }
    Ok(())
}

async fn run_list(config_path: Option<PathBuf>, args: &ListArgs) -> anyhow::Result<()> {
    let config = Config::load_or_default(config_path)?;
    let filters = args.to_filters(config.scenario.rain_factor)?;

    let data_sync = DataSyncService::new(&config);
    let (repository, _) = data_sync.load_repository().await;
    let rows = logic::visible_rows(repository.parcels(), &filters);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }

    println!(
        "{} | {} | {} of {} parcels",
        repository.origin(),
        filters.scenario_label(),
        rows.len(),
        repository.len()
    );
    if rows.is_empty() {
        println!("No results");
        return Ok(());
    }

    println!(
        "{:<8} {:<24} {:<12} {:<14} {:<6} {}",
        "ID", "Parcel", "Province", "Stress", "Date", "Source"
    );
    for row in &rows {
        println!(
            "{:<8} {:<24} {:<12} {:<14} {:<6} {}",
            row.id,
            row.name,
            row.province,
            row.stress_text(),
            row.date_text(),
            row.source_label
        );
    }
    Ok(())
}

async fn run_tui(config_path: Option<PathBuf>) -> anyhow::Result<()> {
    let config = Config::load_or_default(config_path)?;

    let data_sync = DataSyncService::new(&config);
    let (repository, connection) = data_sync.load_repository().await;
    tracing::info!(
        "Loaded {} parcels from {}",
        repository.len(),
        repository.origin()
    );

    let status = if repository.is_empty() {
        format!("{} - no parcels", repository.origin())
    } else if repository.backend_available() {
        connection.describe()
    } else if connection.backend_configured {
        format!("{} - showing demo data", connection.describe())
    } else {
        "Showing demo data".to_string()
    };

    let backend = data_sync.backend().cloned();
    let mock = data_sync.mock().clone();
    let mut app = App::new(&config, repository, backend, mock);
    app.set_status(&status);

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, &mut app).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    app: &mut App,
) -> anyhow::Result<()> {
    let (tx, mut rx) = unbounded_channel();

    loop {
        terminal.draw(|f| draw(f, app))?;

        // Handle input with timeout so remote results keep flowing in
        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                handle_key(app, key.code, key.modifiers);
            }
        }

        dispatch_requests(app, &tx);
        drain_events(app, &mut rx);

        if app.should_quit {
            break;
        }
    }

    Ok(())
}

fn draw(f: &mut ratatui::Frame, app: &App) {
    let area = f.area();
    let status = app.status_message.as_deref();

    match app.screen {
        Screen::Dashboard => {
            let rows = app.visible_rows();
            let screen = DashboardScreen::new(&rows, &app.filters, app.repository.len())
                .with_selection(app.dashboard_state.selected_index)
                .with_source(app.repository.origin(), app.backend_available())
                .with_status(status);
            f.render_widget(screen, area);
        }
        Screen::Map => {
            let rows = app.visible_rows();
            let parcels = visible_parcels(app.repository.parcels(), &app.filters);
            let screen = MapScreen::new(parcels, &rows)
                .with_selection(app.filters.selected_parcel_id.as_deref());
            f.render_widget(screen, area);
        }
        Screen::Analysis => {
            let screen =
                AnalysisScreen::new(app.selected_parcel(), &app.filters, &app.analysis_state)
                    .with_backend(app.backend_available());
            f.render_widget(screen, area);
        }
        Screen::Filters => {
            let provinces = app.provinces();
            let screen = FiltersScreen::new(&app.filters, &provinces)
                .with_focus(app.filters_state.focused_field)
                .editing(app.filters_state.editing, &app.filters_state.edit_buffer)
                .with_status(status);
            f.render_widget(screen, area);
        }
        Screen::NewParcel => {
            let screen = NewParcelScreen::new(&app.new_parcel_state.input)
                .with_focus(app.new_parcel_state.focused_field);
            f.render_widget(screen, area);
        }
    }
}

fn handle_key(app: &mut App, code: KeyCode, modifiers: KeyModifiers) {
    if code == KeyCode::Char('c') && modifiers.contains(KeyModifiers::CONTROL) {
        app.quit();
        return;
    }

    if app.is_text_entry() {
        handle_screen_input(app, code);
        return;
    }

    // Global key handling
    match code {
        KeyCode::Char('q') => app.quit(),
        KeyCode::Esc => app.switch_screen(Screen::Dashboard),
        KeyCode::Char('[') => app.drier(),
        KeyCode::Char(']') => app.wetter(),
        KeyCode::Char(c) => match Screen::from_key(c) {
            Some(screen) => {
                app.clear_status();
                app.switch_screen(screen);
            }
            None => handle_screen_input(app, code),
        },
        _ => handle_screen_input(app, code),
    }
}

fn handle_screen_input(app: &mut App, code: KeyCode) {
    match app.screen {
        Screen::Dashboard => handle_dashboard_input(app, code),
        Screen::Map => handle_map_input(app, code),
        Screen::Analysis => handle_analysis_input(app, code),
        Screen::Filters => handle_filters_input(app, code),
        Screen::NewParcel => handle_new_parcel_input(app, code),
    }
}

fn handle_dashboard_input(app: &mut App, code: KeyCode) {
    match code {
        KeyCode::Up => app.select_prev(),
        KeyCode::Down => app.select_next(),
        KeyCode::Enter => app.switch_screen(Screen::Analysis),
        KeyCode::Char('r') => app.reset_filters(),
        _ => {}
    }
}

fn handle_map_input(app: &mut App, code: KeyCode) {
    match code {
        KeyCode::Up => app.select_prev(),
        KeyCode::Down => app.select_next(),
        KeyCode::Enter => app.switch_screen(Screen::Analysis),
        _ => {}
    }
}

fn handle_analysis_input(app: &mut App, code: KeyCode) {
    if app.analysis_state.chat_editing {
        match code {
            KeyCode::Esc => {
                app.analysis_state.chat_editing = false;
                app.analysis_state.chat_input.clear();
            }
            KeyCode::Enter => app.submit_chat(),
            KeyCode::Backspace => {
                app.analysis_state.chat_input.pop();
            }
            KeyCode::Char(c) => app.analysis_state.chat_input.push(c),
            _ => {}
        }
        return;
    }

    if let KeyCode::Char('c') = code {
        app.start_chat();
    }
}

fn handle_filters_input(app: &mut App, code: KeyCode) {
    if app.filters_state.editing {
        // Editing mode
        match code {
            KeyCode::Esc => app.filters_state.cancel_editing(),
            KeyCode::Enter => {
                let value = app.filters_state.finish_editing();
                let field = app.filters_state.focused_field;
                app.apply_filter_value(field, &value);
            }
            KeyCode::Backspace => {
                app.filters_state.edit_buffer.pop();
            }
            KeyCode::Char(c) => app.filters_state.edit_buffer.push(c),
            _ => {}
        }
        return;
    }

    // Navigation mode
    let field = app.filters_state.focused_field;
    match code {
        KeyCode::Up => app.filters_state.prev_field(),
        KeyCode::Down | KeyCode::Tab => app.filters_state.next_field(),
        KeyCode::Left | KeyCode::Right => {
            let forward = code == KeyCode::Right;
            match field {
                FilterField::Province => app.cycle_province(forward),
                FilterField::Source => app.cycle_source(forward),
                FilterField::Stress => app.cycle_bucket(),
                FilterField::RainFactor if forward => app.wetter(),
                FilterField::RainFactor => app.drier(),
                FilterField::From | FilterField::To => {}
            }
        }
        KeyCode::Enter => {
            let current = app.filter_value(field);
            app.filters_state.start_editing(&current);
        }
        KeyCode::Char('r') => app.reset_filters(),
        _ => {}
    }
}

fn handle_new_parcel_input(app: &mut App, code: KeyCode) {
    match code {
        KeyCode::Esc => {
            app.new_parcel_state.clear();
            app.switch_screen(Screen::Dashboard);
        }
        KeyCode::Tab | KeyCode::Up | KeyCode::Down => app.new_parcel_state.toggle_field(),
        KeyCode::Enter => app.add_parcel(),
        KeyCode::Backspace => {
            app.new_parcel_state.buffer_mut().pop();
        }
        KeyCode::Char(c) => app.new_parcel_state.buffer_mut().push(c),
        _ => {}
    }
}

/// Run queued backend calls off the UI loop. Results come back through `tx`.
fn dispatch_requests(app: &mut App, tx: &UnboundedSender<RemoteEvent>) {
    let requests = app.take_requests();
    if requests.is_empty() {
        return;
    }
    let Some(client) = app.backend().cloned() else {
        tracing::debug!("Dropping {} requests without a backend", requests.len());
        return;
    };

    for request in requests {
        let client: BackendClient = client.clone();
        let tx = tx.clone();
        tokio::spawn(async move {
            let event = match request {
                RemoteRequest::Analysis { tag, rain_factor } => {
                    let result = fetch_remote_analysis(&client, &tag.parcel_id, rain_factor)
                        .await
                        .map_err(|e| e.to_string());
                    RemoteEvent::Analysis { tag, result }
                }
                RemoteRequest::Chat {
                    tag,
                    index,
                    question,
                } => {
                    let result = client
                        .chat(&tag.parcel_id, &question)
                        .await
                        .map_err(|e| e.to_string());
                    RemoteEvent::Chat { tag, index, result }
                }
            };
            // The receiver is gone once the UI has quit.
            let _ = tx.send(event);
        });
    }
}

fn drain_events(app: &mut App, rx: &mut UnboundedReceiver<RemoteEvent>) {
    while let Ok(event) = rx.try_recv() {
        app.handle_event(event);
    }
}
