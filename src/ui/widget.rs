// ============================================================================
// Widget - Rendu du panneau ticker
// ============================================================================
// Dessine le panneau flottant : fond arrondi à l'opacité configurée, badge
// du coin, libellé du symbole et prix formaté. Pendant une glissade, le
// slide sortant et le slide entrant se partagent la ligne avec un décalage
// horizontal en colonnes.
//
// CONCEPTS RATATUI :
// 1. Frame : surface de dessin
// 2. Block : bordures arrondies + style de fond
// 3. Span / Line : composition de texte stylé cellule par cellule
//
// La composition de la ligne visible est une fonction pure de
// (slide courant, slide sortant, décalage, largeur) : c'est elle qui porte
// la sémantique de la glissade, et elle se teste sans terminal.
// ============================================================================

use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph},
    Frame,
};

use crate::app::App;
use crate::config::Config;
use crate::models::TickerSlide;

/// Marge intérieure du panneau, en colonnes
pub const PADDING: u16 = 1;

/// Largeur du badge en colonnes, dérivée de la taille de texte configurée
///
/// Un terminal n'a pas de tailles de police : la taille de texte (8 à 64)
/// se traduit en largeur de badge (2 à 6 colonnes).
pub fn badge_width(text_size: u16) -> u16 {
    (text_size / 8).clamp(2, 6)
}

/// Formate un prix avec le nombre de décimales configuré
///
/// None ("indisponible") s'affiche comme le texte littéral "..." plutôt
/// qu'un zéro formaté qui ressemblerait à un vrai prix.
pub fn format_price(price: Option<f64>, decimals: u8) -> String {
    match price {
        Some(price) => format!("{:.*}", decimals as usize, price),
        None => "...".to_string(),
    }
}

/// Taille du panneau (largeur, hauteur) ajustée au contenu du slide
///
/// Recalculée quand le contenu affiché change ; pendant une glissade,
/// l'appelant gèle la valeur capturée au départ de l'animation.
pub fn panel_size(slide: &TickerSlide, decimals: u8, config: &Config) -> (u16, u16) {
    let icon_width = badge_width(config.text_size);
    let symbol_width = slide.display_symbol.chars().count() as u16;
    let price_width = format_price(slide.price, decimals).chars().count() as u16;

    // padding + badge + espace + symbole + espace + prix + padding
    let inner = PADDING + icon_width + 1 + symbol_width + 1 + price_width + PADDING;
    (inner + 2, 3) // +2 : bordures gauche/droite ; 3 lignes avec bordures
}

/// Couleur de fond du panneau selon l'opacité configurée
///
/// L'opacité (0.0 à 1.0) devient un niveau de gris ; en dessous de 5% le
/// fond n'est pas peint du tout (panneau "transparent").
pub fn panel_background(opacity: f64) -> Option<Color> {
    let opacity = opacity.clamp(0.0, 1.0);
    if opacity < 0.05 {
        return None;
    }
    let level = (opacity * 64.0).round() as u8;
    Some(Color::Rgb(level, level, level))
}

/// Rend le contenu d'un slide en cellules stylées (badge, symbole, prix)
///
/// `dimmed` : le slide sortant est légèrement atténué, comme l'original
/// qui le dessinait avec un alpha réduit.
pub fn slide_cells(
    slide: &TickerSlide,
    decimals: u8,
    config: &Config,
    dimmed: bool,
) -> Vec<(char, Style)> {
    let mut cells = Vec::new();

    // Badge : lettre centrée sur fond coloré
    let (r, g, b) = slide.icon.rgb;
    let icon_style = Style::default()
        .fg(Color::White)
        .bg(Color::Rgb(r, g, b))
        .add_modifier(Modifier::BOLD);
    let icon_width = badge_width(config.text_size) as usize;
    for i in 0..icon_width {
        let ch = if i == icon_width / 2 {
            slide.icon.letter
        } else {
            ' '
        };
        cells.push((ch, icon_style));
    }

    let text_fg = if dimmed {
        Color::Rgb(200, 200, 200)
    } else {
        Color::White
    };

    cells.push((' ', Style::default()));

    let symbol_style = Style::default().fg(text_fg).add_modifier(Modifier::BOLD);
    for c in slide.display_symbol.chars() {
        cells.push((c, symbol_style));
    }

    cells.push((' ', Style::default()));

    let price_style = Style::default().fg(text_fg);
    for c in format_price(slide.price, decimals).chars() {
        cells.push((c, price_style));
    }

    cells
}

/// Compose la ligne visible du panneau pendant (ou hors) glissade
///
/// Le slide courant démarre à `PADDING + offset` ; le slide sortant à
/// `PADDING + offset - width` (il sort par la gauche pendant que le
/// courant entre par la droite). Tout ce qui déborde est tronqué.
pub fn visible_row(
    current: &[(char, Style)],
    previous: Option<&[(char, Style)]>,
    offset: u16,
    width: u16,
) -> Vec<(char, Style)> {
    let width_i = i32::from(width);
    let mut row = vec![(' ', Style::default()); width as usize];

    fn blit(row: &mut [(char, Style)], cells: &[(char, Style)], start: i32) {
        for (i, &cell) in cells.iter().enumerate() {
            let x = start + i as i32;
            if x >= 0 && x < row.len() as i32 {
                row[x as usize] = cell;
            }
        }
    }

    let padding = i32::from(PADDING);
    if let Some(previous) = previous {
        blit(&mut row, previous, padding + i32::from(offset) - width_i);
    }
    blit(&mut row, current, padding + i32::from(offset));

    row
}

/// Dessine le panneau ticker dans son rectangle courant
pub fn render_panel(frame: &mut Frame, app: &App) {
    let rect = app.panel_rect();
    if rect.width < 3 || rect.height < 3 {
        return; // terminal trop petit pour le panneau
    }

    frame.render_widget(Clear, rect);

    let mut block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(Color::DarkGray));
    if let Some(bg) = panel_background(app.config.bg_opacity) {
        block = block.style(Style::default().bg(bg));
    }

    let inner = block.inner(rect);
    frame.render_widget(block, rect);

    let Some(current) = app.current_slide() else {
        return;
    };

    let current_cells = slide_cells(
        current,
        app.config.decimals_for(&current.symbol),
        &app.config,
        false,
    );
    let previous_cells = app.previous_slide().map(|previous| {
        slide_cells(
            previous,
            app.config.decimals_for(&previous.symbol),
            &app.config,
            true,
        )
    });

    let row = visible_row(
        &current_cells,
        previous_cells.as_deref(),
        app.engine.slide_offset(),
        inner.width,
    );

    let spans: Vec<Span> = row
        .into_iter()
        .map(|(ch, style)| Span::styled(ch.to_string(), style))
        .collect();

    // Ligne du milieu de la zone intérieure
    let line_area = Rect {
        x: inner.x,
        y: inner.y + inner.height / 2,
        width: inner.width,
        height: 1,
    };
    frame.render_widget(Paragraph::new(Line::from(spans)), line_area);
}

// ============================================================================
// Tests unitaires
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    /// Construit des cellules depuis une chaîne (style par défaut)
    fn cells(text: &str) -> Vec<(char, Style)> {
        text.chars().map(|c| (c, Style::default())).collect()
    }

    /// Extrait le texte d'une ligne composée
    fn text_of(row: &[(char, Style)]) -> String {
        row.iter().map(|(c, _)| *c).collect()
    }

    #[test]
    fn test_format_price_with_decimals() {
        assert_eq!(format_price(Some(65432.10), 2), "65432.10");
        assert_eq!(format_price(Some(65432.1), 4), "65432.1000");
        assert_eq!(format_price(Some(1.0), 0), "1");
    }

    #[test]
    fn test_format_price_unavailable() {
        assert_eq!(format_price(None, 2), "...");
        assert_eq!(format_price(None, 0), "...");
    }

    #[test]
    fn test_badge_width_follows_text_size() {
        assert_eq!(badge_width(8), 2); // minimum
        assert_eq!(badge_width(24), 3); // défaut
        assert_eq!(badge_width(64), 6); // maximum
    }

    #[test]
    fn test_panel_size_fits_content() {
        let config = Config::default();
        let mut slide = TickerSlide::new("BTCUSDT");

        let (without_price, height) = panel_size(&slide, 2, &config);
        assert_eq!(height, 3);

        slide.apply_price(Some(65432.10));
        let (with_price, _) = panel_size(&slide, 2, &config);

        // "65432.10" est plus large que "..."
        assert!(with_price > without_price);

        // badge(3) + "BTC" + "65432.10" + espaces(2) + padding(2) + bordures(2)
        assert_eq!(with_price, 3 + 3 + 8 + 2 + 2 + 2);
    }

    #[test]
    fn test_visible_row_idle_places_current_at_padding() {
        let row = visible_row(&cells("ABC"), None, 0, 8);
        assert_eq!(text_of(&row), " ABC    ");
    }

    #[test]
    fn test_visible_row_animation_start_shows_previous() {
        // Au départ de la glissade (offset == largeur), le slide sortant
        // occupe sa position normale et le courant est hors cadre à droite
        let row = visible_row(&cells("NEW"), Some(&cells("OLD")), 8, 8);
        assert_eq!(text_of(&row), " OLD    ");
    }

    #[test]
    fn test_visible_row_mid_animation_shows_both() {
        // En cours de glissade les deux slides sont visibles, décalés
        let row = visible_row(&cells("NEW"), Some(&cells("OLD")), 6, 8);
        // sortant : départ 1 + 6 - 8 = -1 -> "LD" visible en colonnes 0-1
        // entrant : départ 1 + 6 = 7 -> seul "N" entre par la droite
        assert_eq!(text_of(&row), "LD     N");
    }

    #[test]
    fn test_visible_row_end_of_animation() {
        let row = visible_row(&cells("NEW"), Some(&cells("OLD")), 0, 8);
        // sortant entièrement sorti par la gauche
        assert_eq!(text_of(&row), " NEW    ");
    }

    #[test]
    fn test_visible_row_truncates_overflow() {
        // Contenu plus large que le panneau : tronqué sans panique
        let row = visible_row(&cells("ABCDEFGHIJ"), None, 0, 6);
        assert_eq!(text_of(&row), " ABCDE");
    }

    #[test]
    fn test_panel_background_opacity() {
        assert_eq!(panel_background(0.0), None);
        assert_eq!(panel_background(0.04), None);
        assert_eq!(panel_background(0.7), Some(Color::Rgb(45, 45, 45)));
        assert_eq!(panel_background(1.0), Some(Color::Rgb(64, 64, 64)));
        // Hors plage : clampé
        assert_eq!(panel_background(2.0), Some(Color::Rgb(64, 64, 64)));
    }
}
