// ============================================================================
// Panneau de réglages
// ============================================================================
// Modal centré exposant tous les champs de configuration : symboles et
// décimales, taille de texte, opacité du fond, intervalles, rotation, plus
// les actions Clear icon cache / Cancel / Save.
//
// Navigation : flèches haut/bas (ou Tab) pour changer de champ, gauche/
// droite pour ajuster une valeur, saisie directe dans les champs symbole,
// Entrée pour activer un bouton, Échap pour annuler.
// ============================================================================

use ratatui::{
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph},
    Frame,
};

use crate::app::{App, FormField, SettingsForm};

/// Rectangle du modal, centré dans le terminal
pub fn settings_rect(area: Rect) -> Rect {
    let width = 46.min(area.width);
    let height = 15.min(area.height);
    let x = (area.width.saturating_sub(width)) / 2;
    let y = (area.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width, height)
}

/// Dessine le panneau de réglages
pub fn render_settings(frame: &mut Frame, app: &App) {
    let rect = settings_rect(frame.size());
    if rect.width < 20 || rect.height < 10 {
        return; // terminal trop petit pour le modal
    }

    frame.render_widget(Clear, rect);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(Color::Cyan))
        .title(" Settings ")
        .title_alignment(Alignment::Center);

    let form = &app.form;
    let mut lines = Vec::new();

    // Trois lignes coin : symbole éditable + décimales ajustables
    for i in 0..3 {
        lines.push(coin_line(form, i));
    }

    lines.push(value_line(
        form,
        FormField::TextSize,
        "Text size",
        format!("{}px", form.text_size),
    ));
    lines.push(value_line(
        form,
        FormField::BgOpacity,
        "Background opacity",
        format!("{}%", form.bg_opacity_pct),
    ));
    lines.push(value_line(
        form,
        FormField::UpdateInterval,
        "Update interval",
        format!("{}s", form.update_interval),
    ));
    lines.push(value_line(
        form,
        FormField::CycleInterval,
        "Cycle interval",
        format!("{}s", form.cycle_interval),
    ));
    let rotation_state = if form.cycle_enabled {
        "[x] enabled"
    } else {
        "[ ] disabled"
    };
    lines.push(value_line(
        form,
        FormField::CycleEnabled,
        "Symbol rotation",
        rotation_state.to_string(),
    ));

    lines.push(Line::from(""));
    lines.push(buttons_line(form));
    lines.push(Line::from(""));

    // Message d'information (confirmation du vidage de cache) ou aide
    match app.info_message() {
        Some(message) => lines.push(Line::from(Span::styled(
            message.to_string(),
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        ))),
        None => lines.push(Line::from(vec![
            Span::styled("[↑↓]", Style::default().fg(Color::Yellow)),
            Span::raw(" Champ  "),
            Span::styled("[←→]", Style::default().fg(Color::Yellow)),
            Span::raw(" Ajuster  "),
            Span::styled("[Enter]", Style::default().fg(Color::Green)),
            Span::raw(" Valider  "),
            Span::styled("[ESC]", Style::default().fg(Color::Red)),
            Span::raw(" Annuler"),
        ])),
    }

    let paragraph = Paragraph::new(lines).block(block);
    frame.render_widget(paragraph, rect);
}

/// Ligne d'un slot coin : "Coin 1  BTCUSDT_  décimales: 2"
fn coin_line(form: &SettingsForm, i: usize) -> Line<'static> {
    let symbol_focused = form.focused() == FormField::Symbol(i);
    let decimals_focused = form.focused() == FormField::Decimals(i);

    // Curseur visible dans le champ symbole focalisé
    let symbol_text = if symbol_focused {
        format!("{}█", form.symbols[i])
    } else {
        form.symbols[i].clone()
    };

    Line::from(vec![
        Span::styled(
            format!(" Coin {}  ", i + 1),
            Style::default().fg(Color::Gray),
        ),
        focusable(symbol_focused, format!("{:<12}", symbol_text)),
        Span::styled("  decimals: ", Style::default().fg(Color::Gray)),
        focusable(decimals_focused, format!("{}", form.decimals[i])),
    ])
}

/// Ligne libellé + valeur ajustable
fn value_line(
    form: &SettingsForm,
    field: FormField,
    label: &str,
    value: String,
) -> Line<'static> {
    let focused = form.focused() == field;
    Line::from(vec![
        Span::styled(
            format!(" {:<20} ", label),
            Style::default().fg(Color::Gray),
        ),
        focusable(focused, value),
    ])
}

/// Ligne des boutons d'action
fn buttons_line(form: &SettingsForm) -> Line<'static> {
    Line::from(vec![
        Span::raw(" "),
        focusable(
            form.focused() == FormField::ClearCache,
            "[Clear icon cache]".to_string(),
        ),
        Span::raw("  "),
        focusable(form.focused() == FormField::Cancel, "[Cancel]".to_string()),
        Span::raw("  "),
        focusable(form.focused() == FormField::Save, "[Save]".to_string()),
    ])
}

/// Span stylé selon le focus (inversé + gras quand focalisé)
fn focusable(focused: bool, text: String) -> Span<'static> {
    let mut style = Style::default().fg(Color::White);
    if focused {
        style = style
            .add_modifier(Modifier::BOLD)
            .add_modifier(Modifier::REVERSED);
    }
    Span::styled(text, style)
}

// ============================================================================
// Tests
// ============================================================================
