// ============================================================================
// Menu contextuel
// ============================================================================
// Petit popup ancré au clic droit sur le panneau : "Settings" et "Quit".
// Navigation au clavier (flèches + Entrée) ou au clic gauche.
// ============================================================================

use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    widgets::{Block, BorderType, Borders, Clear, List, ListItem},
    Frame,
};

use crate::app::App;

/// Entrées du menu, dans l'ordre d'affichage
pub const MENU_ITEMS: [&str; 2] = ["Settings", "Quit"];

/// Largeur du popup en colonnes
const MENU_WIDTH: u16 = 14;

/// Rectangle du menu ancré au point de clic, borné dans le terminal
pub fn menu_rect(anchor: (u16, u16), area: Rect) -> Rect {
    let height = MENU_ITEMS.len() as u16 + 2;
    let width = MENU_WIDTH.min(area.width);
    let x = anchor.0.min(area.width.saturating_sub(width));
    let y = anchor.1.min(area.height.saturating_sub(height));
    Rect::new(x, y, width, height.min(area.height))
}

/// Entrée du menu sous (col, row), si le point tombe sur une ligne d'item
pub fn item_at(menu: Rect, col: u16, row: u16) -> Option<usize> {
    if menu.width < 3 || menu.height < 3 {
        return None;
    }
    // Zone intérieure : hors bordures
    if col <= menu.x || col >= menu.x + menu.width - 1 {
        return None;
    }
    let first_row = menu.y + 1;
    if row < first_row || row >= first_row + MENU_ITEMS.len() as u16 {
        return None;
    }
    Some((row - first_row) as usize)
}

/// Dessine le menu contextuel
pub fn render_menu(frame: &mut Frame, app: &App) {
    let rect = app.menu_rect();
    if rect.width == 0 || rect.height == 0 {
        return;
    }

    frame.render_widget(Clear, rect);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(Color::Cyan));

    let items: Vec<ListItem> = MENU_ITEMS
        .iter()
        .enumerate()
        .map(|(index, label)| {
            let mut style = Style::default().fg(Color::White);
            if index == app.menu_selected {
                style = style
                    .add_modifier(Modifier::BOLD)
                    .add_modifier(Modifier::REVERSED);
            }
            ListItem::new(format!(" {}", label)).style(style)
        })
        .collect();

    frame.render_widget(List::new(items).block(block), rect);
}

// ============================================================================
// Tests
// ============================================================================
