// ============================================================================
// CoinBar - Widget ticker crypto pour le terminal
// ============================================================================
// Petit panneau flottant qui affiche en rotation les prix de trois paires
// crypto, avec badge de coin, glissade animée et position déplaçable à la
// souris. Les prix sont rafraîchis en tâche de fond, les réglages vivent
// dans un fichier JSON du home.
//
// CONCEPTS RUST CLÉS :
// 1. Terminal raw mode : contrôle total du terminal (+ capture souris)
// 2. Event loop : boucle infinie qui gère événements, timers et rendering
// 3. Async dans sync : tokio::runtime::Runtime dans le worker thread
// 4. Channels mpsc : commandes vers le worker, résultats vers l'UI
// ============================================================================

use std::io;
use std::sync::{mpsc, Arc, Mutex};

use anyhow::{Context, Result};
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture, MouseButton, MouseEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use crossterm::event::KeyCode;
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::{debug, error, info};

use coinbar::api;
use coinbar::app::{App, AppCommand, AppResult, FormField, Screen};
use coinbar::config::Config;
use coinbar::ui::events::{
    get_char_from_event, hit, is_down_event, is_enter_event, is_escape_event, is_quit_event,
    is_settings_event, is_up_event,
};
use coinbar::ui::{render, Event, EventHandler};

// ============================================================================
// Initialisation du logging
// ============================================================================
// CONCEPT : Logging dans une app TUI
// - Les println! ne fonctionnent pas une fois le TUI lancé
// - On log vers un fichier à la place
// - Tracing : framework moderne de logging structuré
// - Rotation quotidienne automatique des logs
// ============================================================================

/// Initialise le système de logging vers fichier
///
/// Les logs sont écrits dans :
/// - Linux/WSL : ~/.local/share/coinbar/logs/coinbar.log
/// - macOS : ~/Library/Application Support/coinbar/logs/coinbar.log
/// - Windows : C:\Users\<user>\AppData\Local\coinbar\logs\coinbar.log
///
/// # Utilisation
/// ```bash
/// # Voir les logs en temps réel
/// tail -f ~/.local/share/coinbar/logs/coinbar.log
///
/// # Contrôler le niveau de log
/// RUST_LOG=debug cargo run
/// RUST_LOG=coinbar=trace cargo run
/// ```
fn init_logging() -> Result<()> {
    use tracing_appender::rolling::{RollingFileAppender, Rotation};
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let log_dir = dirs::data_local_dir()
        .unwrap_or_else(|| std::path::PathBuf::from("."))
        .join("coinbar")
        .join("logs");

    std::fs::create_dir_all(&log_dir).context("Échec de la création du répertoire de logs")?;

    // Rotation quotidienne : coinbar.log.2024-01-15, etc.
    let file_appender = RollingFileAppender::new(Rotation::DAILY, log_dir.clone(), "coinbar.log");

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(file_appender) // Écrit dans le fichier
                .with_ansi(false) // Pas de codes couleur dans le fichier
                .with_target(true) // Inclut le module (ex: coinbar::api::binance)
                .with_thread_ids(true) // Inclut l'ID du thread (utile pour async)
                .with_line_number(true),
        )
        .with(
            // Filtre par niveau via RUST_LOG
            // Par défaut : debug pour coinbar, info pour les dépendances
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "coinbar=debug,info".into()),
        )
        .init();

    info!(?log_dir, "Logging initialisé");
    Ok(())
}

// ============================================================================
// Point d'entrée du programme
// ============================================================================

fn main() -> Result<()> {
    // Logging d'abord : si init échoue, on affiche l'erreur et on continue
    init_logging().unwrap_or_else(|e| {
        eprintln!("⚠️  Warning: Failed to initialize logging: {}", e);
        eprintln!("   Continuing without logging...");
    });

    info!("CoinBar starting up");

    // Frontière de chargement explicite : la Config est lue une fois ici,
    // puis possédée par App (pas d'état global)
    let config_path = Config::default_path();
    let config = Config::load(&config_path);
    info!(symbols = ?config.symbols(), "Settings loaded");

    // Setup du terminal en mode TUI (avec capture souris pour le drag)
    debug!("Setting up terminal");
    let mut terminal = setup_terminal()?;

    // CONCEPT RUST : Arc<Mutex<>> pour partage entre threads
    // - L'UI et les closures de rendu partagent App
    let app = Arc::new(Mutex::new(App::new(config, config_path)));

    // Channels de communication avec le worker
    // - command_tx/rx : commandes de fetch vers le worker
    // - result_tx/rx : résultats (prix, badges) vers l'UI
    let (command_tx, command_rx) = mpsc::channel::<AppCommand>();
    let (result_tx, result_rx) = mpsc::channel::<AppResult>();

    info!("Spawning background worker thread");
    spawn_background_worker(command_rx, result_tx);

    let events = EventHandler::new();

    info!("Starting event loop");
    let result = run(&mut terminal, app, &events, command_tx, result_rx);

    // Restaure le terminal (même en cas d'erreur)
    debug!("Restoring terminal");
    restore_terminal(&mut terminal)?;

    match &result {
        Ok(_) => info!("Application exited normally"),
        Err(e) => error!(error = ?e, "Application exited with error"),
    }

    result
}

// ============================================================================
// Background Worker Thread
// ============================================================================
// CONCEPT RUST : Background async worker avec channels
// - Thread séparé qui traite les commandes de fetch
// - Chaque symbole part dans sa propre tâche tokio : les fetchs d'un même
//   cycle sont concurrents et leurs résultats arrivent dans n'importe quel
//   ordre (l'application par symbole est idempotente côté UI)
// - Pas d'annulation : un fetch d'une génération périmée se termine et son
//   résultat est jeté à l'arrivée grâce au jeton de génération
// ============================================================================

/// Worker thread qui exécute les fetchs réseau en arrière-plan
fn spawn_background_worker(
    command_rx: mpsc::Receiver<AppCommand>,
    result_tx: mpsc::Sender<AppResult>,
) {
    std::thread::spawn(move || {
        // Runtime tokio propre à ce thread
        let runtime = tokio::runtime::Runtime::new().expect("Failed to create tokio runtime");

        loop {
            match command_rx.recv() {
                Ok(command) => {
                    debug!(?command, "Worker received command");

                    match command {
                        AppCommand::RefreshPrices {
                            symbols,
                            generation,
                        } => {
                            // Un fetch concurrent par symbole
                            for symbol in symbols {
                                let tx = result_tx.clone();
                                runtime.spawn(async move {
                                    let price = api::binance::fetch_price(&symbol).await;
                                    let _ = tx.send(AppResult::PriceFetched {
                                        symbol,
                                        price,
                                        generation,
                                    });
                                });
                            }
                        }

                        AppCommand::RefreshIcons {
                            symbols,
                            generation,
                        } => {
                            let cache_dir = api::icons::icon_cache_dir();
                            for symbol in symbols {
                                let tx = result_tx.clone();
                                let dir = cache_dir.clone();
                                runtime.spawn(async move {
                                    let icon = api::icons::resolve_icon(&dir, &symbol).await;
                                    let _ = tx.send(AppResult::IconResolved {
                                        symbol,
                                        icon,
                                        generation,
                                    });
                                });
                            }
                        }
                    }
                }
                Err(_) => {
                    // Channel fermé, on quitte
                    info!("Worker thread exiting (channel closed)");
                    break;
                }
            }
        }
    });
}

// ============================================================================
// Event Loop Principal
// ============================================================================
// CONCEPT : Event Loop Pattern
// - Loop infinie : while app.is_running()
// - À chaque itération :
//   1. Appliquer les résultats du worker (prix, badges)
//   2. Tick des timers (rotation, glissade, rafraîchissement)
//   3. Envoyer les commandes en attente au worker
//   4. Layout + rendu
//   5. Traiter l'input (clavier, souris)
// ============================================================================

/// Exécute la boucle principale de l'application
fn run(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: Arc<Mutex<App>>,
    events: &EventHandler,
    command_tx: mpsc::Sender<AppCommand>,
    result_rx: mpsc::Receiver<AppResult>,
) -> Result<()> {
    loop {
        {
            let app_lock = app.lock().unwrap();
            if !app_lock.is_running() {
                break;
            }
        }

        // ========================================
        // 1. RÉSULTATS : draine tout ce que le worker a produit
        // ========================================
        // CONCEPT : Non-blocking receive avec try_recv
        // - Les résultats arrivent dans n'importe quel ordre, chacun est
        //   appliqué indépendamment (et jeté s'il est d'une génération
        //   périmée ou d'un symbole qui n'est plus suivi)
        while let Ok(result) = result_rx.try_recv() {
            let mut app_lock = app.lock().unwrap();
            app_lock.handle_result(result);
        }

        // ========================================
        // 2. UPDATE : timers de rotation, glissade et rafraîchissement
        // ========================================
        {
            let mut app_lock = app.lock().unwrap();
            app_lock.tick();
        }

        // ========================================
        // 3. COMMANDES : file d'attente -> worker
        // ========================================
        {
            let mut app_lock = app.lock().unwrap();
            for command in app_lock.drain_commands() {
                if command_tx.send(command).is_err() {
                    error!("Worker thread disconnected!");
                }
            }
        }

        // ========================================
        // 4. LAYOUT + RENDER
        // ========================================
        {
            let area = terminal.size()?;
            let mut app_lock = app.lock().unwrap();
            app_lock.update_layout(area);
        }
        {
            let app_clone = app.clone();
            terminal.draw(|frame| {
                let app_lock = app_clone.lock().unwrap();
                render(frame, &app_lock);
            })?;
        }

        // ========================================
        // 5. INPUT : clavier et souris
        // ========================================
        match events.next() {
            Ok(event) => {
                let mut app_lock = app.lock().unwrap();
                handle_event(&mut app_lock, event);
            }
            Err(_) => {
                // Erreur lors de la lecture d'événement : ignorée
            }
        }
    }

    Ok(())
}

// ============================================================================
// Gestion des événements
// ============================================================================
// CONCEPT : Event Handler Pattern
// - Routage par écran (widget / menu / réglages), chaque écran a ses
//   touches et ses zones cliquables
// ============================================================================

/// Traite un événement et met à jour l'état de l'application
fn handle_event(app: &mut App, event: Event) {
    match app.screen {
        Screen::Widget => handle_widget_event(app, event),
        Screen::Menu => handle_menu_event(app, event),
        Screen::Settings => handle_settings_event(app, event),
    }
}

/// Écran normal : drag du panneau, menu au clic droit, raccourcis clavier
fn handle_widget_event(app: &mut App, event: Event) {
    match &event {
        Event::Key(_) if is_quit_event(&event) => {
            info!("User requested quit");
            app.quit();
        }

        Event::Key(_) if is_settings_event(&event) => {
            info!("User opened settings (keyboard)");
            app.open_settings();
        }

        Event::Mouse(mouse) => match mouse.kind {
            // Drag-to-move : saisie, déplacement, relâchement (persiste)
            MouseEventKind::Down(MouseButton::Left) => {
                app.begin_drag(mouse.column, mouse.row);
            }
            MouseEventKind::Drag(MouseButton::Left) => {
                app.drag_to(mouse.column, mouse.row);
            }
            MouseEventKind::Up(MouseButton::Left) => {
                app.end_drag();
            }

            // Clic droit sur le panneau : menu contextuel
            MouseEventKind::Down(MouseButton::Right) => {
                if hit(app.panel_rect(), mouse.column, mouse.row) {
                    debug!("Context menu opened");
                    app.open_menu((mouse.column, mouse.row));
                }
            }

            _ => {}
        },

        _ => {}
    }
}

/// Menu contextuel : navigation clavier ou clic sur une entrée
fn handle_menu_event(app: &mut App, event: Event) {
    match &event {
        Event::Key(_) if is_escape_event(&event) => app.close_menu(),
        Event::Key(_) if is_up_event(&event) => app.menu_up(),
        Event::Key(_) if is_down_event(&event) => app.menu_down(),
        Event::Key(_) if is_enter_event(&event) => {
            activate_menu_item(app, app.menu_selected);
        }

        Event::Mouse(mouse) => match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                match coinbar::ui::menu::item_at(app.menu_rect(), mouse.column, mouse.row) {
                    Some(index) => activate_menu_item(app, index),
                    None => app.close_menu(), // clic hors menu : fermeture
                }
            }
            MouseEventKind::Down(MouseButton::Right) => app.close_menu(),
            _ => {}
        },

        _ => {}
    }
}

/// Active une entrée du menu contextuel
fn activate_menu_item(app: &mut App, index: usize) {
    match index {
        0 => {
            info!("User opened settings (menu)");
            app.open_settings();
        }
        _ => {
            info!("User quit (menu)");
            app.quit();
        }
    }
}

/// Panneau de réglages : édition des champs et boutons d'action
///
/// Match direct sur KeyCode plutôt que sur les helpers is_*_event : les
/// champs symbole acceptent la saisie de lettres, 'k'/'j' inclus.
fn handle_settings_event(app: &mut App, event: Event) {
    let Event::Key(key) = &event else {
        return; // le modal est piloté au clavier
    };

    match key.code {
        KeyCode::Esc => {
            debug!("Settings cancelled");
            app.cancel_settings();
        }

        KeyCode::Enter => match app.form.focused() {
            FormField::ClearCache => {
                // La seule notification visible du widget : confirmation
                // du vidage de cache, suivie d'un re-fetch par symbole
                let removed = api::icons::clear_icon_cache(&api::icons::icon_cache_dir());
                app.request_icon_refresh();
                app.set_info(&format!(
                    "Cache vidé ({} fichiers), re-téléchargement...",
                    removed
                ));
                info!(removed, "Icon cache cleared by user");
            }
            FormField::Cancel => app.cancel_settings(),
            FormField::Save => {
                info!("Settings saved by user");
                app.save_settings();
            }
            // Entrée sur un champ : passe simplement au suivant
            _ => app.form.focus_next(),
        },

        KeyCode::Up => app.form.focus_previous(),
        KeyCode::Down | KeyCode::Tab => app.form.focus_next(),
        KeyCode::Left => app.form.adjust(-1),
        KeyCode::Right => app.form.adjust(1),
        KeyCode::Char(' ') => app.form.toggle(),
        KeyCode::Backspace => app.form.backspace(),

        KeyCode::Char(_) => {
            if let Some(c) = get_char_from_event(&event) {
                app.form.insert_char(c);
            }
        }

        _ => {}
    }
}

// ============================================================================
// Setup et restauration du terminal
// ============================================================================
// CONCEPT RUST : Terminal raw mode
// - Raw mode : on reçoit tous les caractères directement
// - Alternate screen : écran secondaire (ne pollue pas l'historique)
// - EnableMouseCapture : indispensable pour le drag du panneau
//
// IMPORTANT : Toujours restaurer le terminal avant de quitter !
// ============================================================================

/// Configure le terminal en mode TUI
fn setup_terminal() -> Result<Terminal<CrosstermBackend<io::Stdout>>> {
    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(
        stdout,
        EnterAlternateScreen,
        EnableMouseCapture // Capture souris : drag et menu contextuel
    )?;

    let backend = CrosstermBackend::new(stdout);
    Terminal::new(backend).map_err(|e| e.into())
}

/// Restaure le terminal à son état normal
///
/// Appelé dans main() même en cas d'erreur, pour ne pas laisser le
/// terminal en raw mode.
fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
    disable_raw_mode()?;

    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;

    terminal.show_cursor()?;

    Ok(())
}
