// ============================================================================
// Module : ui
// ============================================================================
// Gère toute l'interface utilisateur (Terminal User Interface)
// ============================================================================

pub mod events;   // Gestion des événements clavier et souris
pub mod menu;     // Menu contextuel (clic droit)
pub mod settings; // Panneau de réglages modal
pub mod widget;   // Rendu du panneau ticker

use ratatui::Frame;

use crate::app::{App, Screen};

// Re-exports pour simplifier les imports
pub use events::{Event, EventHandler};

/// Dessine l'interface complète
///
/// CONCEPT RUST : Routing avec match sur enum
/// - Le panneau ticker est toujours dessiné
/// - Le menu contextuel ou le modal de réglages se superposent selon l'écran
pub fn render(frame: &mut Frame, app: &App) {
    widget::render_panel(frame, app);

    match app.screen {
        Screen::Widget => {}
        Screen::Menu => menu::render_menu(frame, app),
        Screen::Settings => settings::render_settings(frame, app),
    }
}
