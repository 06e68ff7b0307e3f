// ============================================================================
// livecrypto - Tracker du top 50 des cryptomonnaies
// ============================================================================
// Programme TUI : le top 50 CoinMarketCap rafraîchi périodiquement,
// analysé, exporté en CSV et tracé en 7 graphiques
//
// CONCEPTS RUST CLÉS :
// 1. Terminal raw mode : contrôle total du terminal
// 2. Event loop : boucle qui gère événements et rendering
// 3. Async dans sync : un thread worker possède son runtime tokio
// 4. Channels : le worker envoie les résultats, l'UI envoie les contrôles
// ============================================================================

use std::io;
use std::path::Path;
use std::sync::mpsc;
use std::thread::JoinHandle;

use anyhow::{Context, Result};
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::{debug, error, info, warn};

use livecrypto::api::CoinMarketCapClient;
use livecrypto::app::App;
use livecrypto::config::Config;
use livecrypto::poller::{self, CycleOutcome, Poller, Schedule, ScheduleHandle};
use livecrypto::ui::events::{
    chart_index_from_event, is_decrease_interval_event, is_down_event, is_increase_interval_event,
    is_next_chart_event, is_page_down_event, is_page_up_event, is_previous_chart_event,
    is_quit_event, is_refresh_event, is_up_event, Event,
};
use livecrypto::ui::{render, EventHandler};

// ============================================================================
// Initialisation du logging
// ============================================================================
// CONCEPT : Logging dans une app TUI
// - Les println! ne fonctionnent pas une fois le TUI lancé
// - On log vers un fichier à la place, avec rotation quotidienne
// ============================================================================

/// Initialise le système de logging vers fichier
///
/// Les logs sont écrits dans `<log_dir>/livecrypto.log` :
/// - par défaut ~/.local/share/livecrypto/logs sur Linux
/// - LIVECRYPTO_LOG_DIR pour un autre répertoire
///
/// # Utilisation
/// ```bash
/// tail -f ~/.local/share/livecrypto/logs/livecrypto.log
/// RUST_LOG=livecrypto=trace cargo run
/// ```
fn init_logging(log_dir: &Path) -> Result<()> {
    use tracing_appender::rolling::{RollingFileAppender, Rotation};
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    std::fs::create_dir_all(log_dir).context("Échec de la création du répertoire de logs")?;

    let file_appender = RollingFileAppender::new(Rotation::DAILY, log_dir, "livecrypto.log");

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(file_appender)
                .with_ansi(false)
                .with_target(true)
                .with_thread_ids(true)
                .with_line_number(true),
        )
        .with(
            // Par défaut : debug pour livecrypto, info pour les dépendances
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "livecrypto=debug,info".into()),
        )
        .init();

    info!(?log_dir, "Logging initialisé");
    Ok(())
}

// ============================================================================
// Point d'entrée du programme
// ============================================================================

fn main() -> Result<()> {
    let config = Config::from_env().context("Configuration invalide")?;

    // Un échec du logging n'empêche pas l'application de tourner
    init_logging(&config.log_dir).unwrap_or_else(|e| {
        eprintln!("⚠️  Warning: Failed to initialize logging: {:#}", e);
        eprintln!("   Continuing without logging...");
    });

    info!(
        api_url = %config.api_url,
        output = %config.output_path.display(),
        refresh_secs = config.refresh.secs(),
        has_api_key = config.api_key.is_some(),
        "livecrypto starting up"
    );
    if config.api_key.is_none() {
        warn!("No API_KEY configured, requests will be unauthenticated");
    }

    let client = CoinMarketCapClient::new(&config).context("Impossible de créer le client HTTP")?;
    let poller = Poller::new(client, config.output_path.clone());

    let (schedule_handle, schedule) = ScheduleHandle::new(config.refresh);
    let (report_tx, report_rx) = mpsc::channel::<CycleOutcome>();

    debug!("Setting up terminal");
    let mut terminal = setup_terminal()?;

    info!("Spawning background worker thread");
    let worker = spawn_background_worker(poller, schedule, report_tx);

    let mut app = App::new(config.refresh);
    let events = EventHandler::default();

    let result = run(&mut terminal, &mut app, &events, &schedule_handle, &report_rx);

    // Arrêt du worker, puis restauration du terminal dans tous les cas
    schedule_handle.cancel();
    restore_terminal(&mut terminal)?;

    if worker.join().is_err() {
        error!("Worker thread panicked");
    }

    if let Err(e) = &result {
        error!(error = ?e, "Application error");
    }
    info!("livecrypto stopped");

    result
}

// ============================================================================
// Worker thread
// ============================================================================
// CONCEPT RUST : Async dans sync
// - main() est synchrone (boucle TUI)
// - le scheduler est async (reqwest, timers)
// - Solution : un thread dédié qui possède son propre runtime tokio
// ============================================================================

/// Lance le scheduler dans un thread dédié
fn spawn_background_worker(
    poller: Poller<CoinMarketCapClient>,
    schedule: Schedule,
    reports: mpsc::Sender<CycleOutcome>,
) -> JoinHandle<()> {
    std::thread::spawn(move || {
        let runtime = match tokio::runtime::Runtime::new() {
            Ok(runtime) => runtime,
            Err(e) => {
                // reports est droppé : l'UI verra le canal déconnecté
                error!(error = %e, "Failed to create tokio runtime");
                return;
            }
        };

        runtime.block_on(poller::run(&poller, schedule, reports));
        info!("Worker thread exiting");
    })
}

// ============================================================================
// Event loop
// ============================================================================

/// Boucle principale : résultats du worker -> render -> input
fn run(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    events: &EventHandler,
    schedule: &ScheduleHandle,
    reports: &mpsc::Receiver<CycleOutcome>,
) -> Result<()> {
    let mut worker_alive = true;

    while app.is_running() {
        // ========================================
        // 0. RÉSULTATS : non bloquant
        // ========================================
        loop {
            match reports.try_recv() {
                Ok(outcome) => app.apply_outcome(outcome),
                Err(mpsc::TryRecvError::Empty) => break,
                Err(mpsc::TryRecvError::Disconnected) => {
                    if worker_alive {
                        error!("Worker thread disconnected");
                        worker_alive = false;
                        app.is_loading = false;
                    }
                    break;
                }
            }
        }

        // ========================================
        // 1. RENDER
        // ========================================
        terminal
            .draw(|frame| render(frame, app))
            .context("Échec du rendu du terminal")?;

        // ========================================
        // 2. INPUT
        // ========================================
        match events.next() {
            Ok(event) => handle_event(app, event, schedule),
            Err(e) => error!(error = %e, "Failed to read terminal event"),
        }
    }

    Ok(())
}

/// Traite un événement et met à jour l'état de l'application
fn handle_event(app: &mut App, event: Event, schedule: &ScheduleHandle) {
    if let Event::Tick = event {
        return;
    }

    // Two-step quit : toute autre touche annule la confirmation
    if is_quit_event(&event) {
        if app.is_awaiting_quit_confirmation() {
            info!("User confirmed quit");
            app.quit();
        } else {
            app.request_quit();
        }
        return;
    }
    app.cancel_quit();

    if is_up_event(&event) {
        app.scroll_up();
    } else if is_down_event(&event) {
        app.scroll_down();
    } else if is_page_up_event(&event) {
        app.page_up();
    } else if is_page_down_event(&event) {
        app.page_down();
    } else if is_next_chart_event(&event) {
        app.next_chart();
    } else if is_previous_chart_event(&event) {
        app.previous_chart();
    } else if is_increase_interval_event(&event) {
        let interval = app.increase_interval();
        info!(secs = interval.secs(), "Refresh interval changed");
        schedule.set_interval(interval);
    } else if is_decrease_interval_event(&event) {
        let interval = app.decrease_interval();
        info!(secs = interval.secs(), "Refresh interval changed");
        schedule.set_interval(interval);
    } else if is_refresh_event(&event) {
        info!("Manual refresh requested");
        app.start_refresh();
        schedule.refresh_now();
    } else if let Some(index) = chart_index_from_event(&event) {
        app.select_chart(index);
    }
}

// ============================================================================
// Setup et restauration du terminal
// ============================================================================
// IMPORTANT : Toujours restaurer le terminal avant de quitter !
// ============================================================================

/// Configure le terminal en mode TUI
fn setup_terminal() -> Result<Terminal<CrosstermBackend<io::Stdout>>> {
    enable_raw_mode().context("Impossible d'activer le raw mode")?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;

    let backend = CrosstermBackend::new(stdout);
    Terminal::new(backend).context("Impossible de créer le terminal")
}

/// Restaure le terminal à son état normal
fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}
