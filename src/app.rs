// ============================================================================
// Structure : App
// ============================================================================
// Gère l'état global du widget : configuration, slides par symbole, moteur
// de rotation, timers, drag souris et écrans (widget / menu / réglages)
//
// CONCEPTS RUST :
// 1. State Management : centraliser l'état dans une seule structure
// 2. Mutabilité contrôlée : &mut self pour modifier l'état
// 3. Command queue : l'App produit des AppCommand, la boucle principale les
//    envoie au worker ; les AppResult reviennent par le chemin inverse
//
// PATTERN : Cette structure suit le pattern "Application State"
// - Tous les composants de l'UI lisent depuis App
// - Toutes les modifications passent par les méthodes de App
// - Garantit la cohérence de l'état
// ============================================================================

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use ratatui::layout::Rect;
use tracing::{debug, info};

use crate::config::Config;
use crate::models::{Icon, RotationEngine, TickerSlide};
use crate::ui;

/// Cadence des pas de glissade
const SLIDE_TICK: Duration = Duration::from_millis(30);

/// Colonnes parcourues par pas de glissade
const SLIDE_STEP: u16 = 2;

/// Durée d'affichage du message d'information
const INFO_LIFETIME: Duration = Duration::from_secs(4);

// ============================================================================
// Enum : Screen
// ============================================================================
// CONCEPT RUST : Enums pour state machines
// - Représente les différents écrans de l'application
// - Pattern "State Machine" : un seul écran actif à la fois
// ============================================================================

/// Écrans de l'application
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    /// Le panneau ticker seul (écran normal)
    Widget,

    /// Menu contextuel ouvert au clic droit (Settings / Quit)
    Menu,

    /// Panneau de réglages modal
    Settings,
}

// ============================================================================
// AppCommand / AppResult : protocole avec le worker thread
// ============================================================================
// CONCEPT : Command pattern avec channels
// - L'App produit des commandes, le worker exécute les fetchs async
// - Chaque commande et chaque résultat portent un jeton de génération :
//   un résultat dont la génération ne correspond plus à celle de l'App
//   (les symboles suivis ont changé entre-temps) est jeté à l'arrivée.
//   Le "discard à l'arrivée" devient ainsi explicite et testable.
// ============================================================================

/// Commandes envoyées au worker thread
#[derive(Debug, Clone, PartialEq)]
pub enum AppCommand {
    /// Rafraîchir le prix de chaque symbole (un fetch par symbole)
    RefreshPrices { symbols: Vec<String>, generation: u64 },

    /// Résoudre le badge de chaque symbole (cache -> réseau -> repli)
    RefreshIcons { symbols: Vec<String>, generation: u64 },
}

/// Résultats renvoyés par le worker thread
#[derive(Debug, Clone)]
pub enum AppResult {
    /// Prix obtenu (None = indisponible, état affichable)
    PriceFetched {
        symbol: String,
        price: Option<f64>,
        generation: u64,
    },

    /// Badge résolu (toujours utilisable, au pire un repli gris)
    IconResolved {
        symbol: String,
        icon: Icon,
        generation: u64,
    },
}

// ============================================================================
// SettingsForm : état d'édition du panneau de réglages
// ============================================================================

/// Champs du formulaire de réglages, dans l'ordre de navigation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    /// Symbole du slot i (texte éditable)
    Symbol(usize),
    /// Décimales du slot i (0 à 8)
    Decimals(usize),
    TextSize,
    BgOpacity,
    UpdateInterval,
    CycleInterval,
    CycleEnabled,
    ClearCache,
    Cancel,
    Save,
}

/// Ordre de navigation du formulaire
pub const FORM_FIELDS: [FormField; 14] = [
    FormField::Symbol(0),
    FormField::Decimals(0),
    FormField::Symbol(1),
    FormField::Decimals(1),
    FormField::Symbol(2),
    FormField::Decimals(2),
    FormField::TextSize,
    FormField::BgOpacity,
    FormField::UpdateInterval,
    FormField::CycleInterval,
    FormField::CycleEnabled,
    FormField::ClearCache,
    FormField::Cancel,
    FormField::Save,
];

/// Brouillon d'édition des réglages
///
/// Copie de travail : rien n'est appliqué tant que l'utilisateur ne valide
/// pas Save. Cancel jette simplement le brouillon.
#[derive(Debug, Clone)]
pub struct SettingsForm {
    pub symbols: [String; 3],
    pub decimals: [u8; 3],
    pub text_size: u16,
    /// Opacité en pourcents (0 à 100), comme un slider
    pub bg_opacity_pct: u8,
    pub update_interval: u64,
    pub cycle_interval: u64,
    pub cycle_enabled: bool,
    /// Index du champ focalisé dans FORM_FIELDS
    pub focus: usize,
}

impl SettingsForm {
    /// Initialise le brouillon depuis la configuration courante
    pub fn from_config(config: &Config) -> Self {
        Self {
            symbols: [
                config.symbol1.clone(),
                config.symbol2.clone(),
                config.symbol3.clone(),
            ],
            decimals: [config.decimals1, config.decimals2, config.decimals3],
            text_size: config.text_size,
            bg_opacity_pct: (config.bg_opacity * 100.0).round() as u8,
            update_interval: config.update_interval,
            cycle_interval: config.cycle_interval,
            cycle_enabled: config.cycle_enabled,
            focus: 0,
        }
    }

    /// Produit la nouvelle configuration à partir du brouillon
    ///
    /// `base` fournit tout ce que le formulaire n'édite pas (position du
    /// panneau, clés inconnues préservées). Un champ symbole laissé vide
    /// retombe sur le défaut de son slot.
    pub fn to_config(&self, base: &Config) -> Config {
        let defaults = Config::default();
        let fallback = [&defaults.symbol1, &defaults.symbol2, &defaults.symbol3];

        let mut config = base.clone();
        let mut symbols = self.symbols.clone();
        for (i, symbol) in symbols.iter_mut().enumerate() {
            let cleaned = symbol.trim().to_uppercase();
            *symbol = if cleaned.is_empty() {
                fallback[i].clone()
            } else {
                cleaned
            };
        }

        config.symbol1 = symbols[0].clone();
        config.symbol2 = symbols[1].clone();
        config.symbol3 = symbols[2].clone();
        config.decimals1 = self.decimals[0];
        config.decimals2 = self.decimals[1];
        config.decimals3 = self.decimals[2];
        config.text_size = self.text_size;
        config.bg_opacity = f64::from(self.bg_opacity_pct) / 100.0;
        config.update_interval = self.update_interval;
        config.cycle_interval = self.cycle_interval;
        config.cycle_enabled = self.cycle_enabled;
        config.clamp_ranges();
        config
    }

    /// Champ actuellement focalisé
    pub fn focused(&self) -> FormField {
        FORM_FIELDS[self.focus]
    }

    /// Passe au champ suivant (boucle)
    pub fn focus_next(&mut self) {
        self.focus = (self.focus + 1) % FORM_FIELDS.len();
    }

    /// Passe au champ précédent (boucle)
    pub fn focus_previous(&mut self) {
        self.focus = (self.focus + FORM_FIELDS.len() - 1) % FORM_FIELDS.len();
    }

    /// Ajuste la valeur du champ focalisé (flèches gauche/droite)
    ///
    /// Chaque champ a sa plage documentée ; l'ajustement est borné, jamais
    /// d'overflow ni de valeur hors plage.
    pub fn adjust(&mut self, delta: i64) {
        match self.focused() {
            FormField::Decimals(i) => {
                self.decimals[i] = clamp_add(i64::from(self.decimals[i]), delta, 0, 8) as u8;
            }
            FormField::TextSize => {
                self.text_size = clamp_add(i64::from(self.text_size), delta, 8, 64) as u16;
            }
            FormField::BgOpacity => {
                self.bg_opacity_pct =
                    clamp_add(i64::from(self.bg_opacity_pct), delta * 5, 0, 100) as u8;
            }
            FormField::UpdateInterval => {
                self.update_interval =
                    clamp_add(self.update_interval as i64, delta * 5, 1, 300) as u64;
            }
            FormField::CycleInterval => {
                self.cycle_interval = clamp_add(self.cycle_interval as i64, delta, 1, 60) as u64;
            }
            FormField::CycleEnabled => {
                self.cycle_enabled = !self.cycle_enabled;
            }
            // Symboles (édités au clavier) et boutons : rien à ajuster
            _ => {}
        }
    }

    /// Bascule la case à cocher si elle est focalisée (touche espace)
    pub fn toggle(&mut self) {
        if self.focused() == FormField::CycleEnabled {
            self.cycle_enabled = !self.cycle_enabled;
        }
    }

    /// Ajoute un caractère au champ symbole focalisé
    pub fn insert_char(&mut self, c: char) {
        if let FormField::Symbol(i) = self.focused() {
            if c.is_ascii_alphanumeric() && self.symbols[i].len() < 16 {
                self.symbols[i].push(c.to_ascii_uppercase());
            }
        }
    }

    /// Supprime le dernier caractère du champ symbole focalisé
    pub fn backspace(&mut self) {
        if let FormField::Symbol(i) = self.focused() {
            self.symbols[i].pop();
        }
    }
}

/// Addition bornée sur i64 (évite les underflows d'unsigned)
fn clamp_add(value: i64, delta: i64, min: i64, max: i64) -> i64 {
    (value + delta).clamp(min, max)
}

// ============================================================================
// App : état principal
// ============================================================================

/// État principal de l'application
pub struct App {
    /// Indique si l'application doit continuer à tourner
    running: bool,

    /// Configuration courante (propriétaire unique ; frontière explicite
    /// load/save, aucun état global)
    pub config: Config,

    /// Chemin du fichier de réglages (injecté pour les tests)
    config_path: PathBuf,

    /// Moteur de rotation (propriétaire exclusif de l'état de glissade)
    pub engine: RotationEngine,

    /// Données d'affichage par symbole
    ///
    /// Map partagée logiquement entre les fetchers (écrivains, via les
    /// AppResult appliqués sur le thread UI) et le rendu (lecteur). Des
    /// symboles dupliqués dans la config s'effondrent sur une seule entrée
    /// (doublons non supportés, voir DESIGN.md).
    pub slides: HashMap<String, TickerSlide>,

    /// Jeton de génération : incrémenté à chaque remplacement de la liste
    /// suivie ; les résultats d'une génération périmée sont jetés
    generation: u64,

    /// Écran actuellement affiché
    pub screen: Screen,

    /// Position du panneau dans le terminal (colonne, ligne)
    pos: (u16, u16),

    /// Offset de saisie pendant un drag (position du clic dans le panneau)
    drag: Option<(u16, u16)>,

    /// Dernier rectangle du panneau (hit-testing souris)
    panel_rect: Rect,

    /// Dernier rectangle du menu contextuel
    menu_rect: Rect,

    /// Taille du panneau gelée pendant une glissade : les deux slides se
    /// dessinent dans le cadre capturé au départ de l'animation
    frozen_panel: Option<(u16, u16)>,

    /// Entrée sélectionnée du menu contextuel
    pub menu_selected: usize,

    /// Point d'ancrage du menu contextuel (position du clic droit)
    pub menu_anchor: (u16, u16),

    /// Brouillon du panneau de réglages
    pub form: SettingsForm,

    /// Message d'information éphémère (confirmation du vidage de cache)
    info_message: Option<(String, Instant)>,

    /// Timers pilotés par la boucle d'événements
    last_refresh: Instant,
    last_rotation: Instant,
    last_anim_step: Instant,

    /// Commandes en attente d'envoi au worker
    pending: Vec<AppCommand>,
}

impl App {
    /// Crée l'état de l'application depuis la configuration chargée
    ///
    /// Le démarrage déclenche immédiatement un rafraîchissement des prix et
    /// une résolution des badges pour tous les symboles suivis.
    pub fn new(config: Config, config_path: PathBuf) -> Self {
        let symbols = config.symbols();
        let slides = build_slides(&symbols);
        let pos = (config.pos_x, config.pos_y);
        let now = Instant::now();

        Self {
            running: true,
            engine: RotationEngine::new(symbols.clone()),
            slides,
            generation: 0,
            screen: Screen::Widget,
            pos,
            drag: None,
            panel_rect: Rect::default(),
            menu_rect: Rect::default(),
            frozen_panel: None,
            menu_selected: 0,
            menu_anchor: (0, 0),
            form: SettingsForm::from_config(&config),
            info_message: None,
            last_refresh: now,
            last_rotation: now,
            last_anim_step: now,
            pending: vec![
                AppCommand::RefreshPrices {
                    symbols: symbols.clone(),
                    generation: 0,
                },
                AppCommand::RefreshIcons {
                    symbols,
                    generation: 0,
                },
            ],
            config,
            config_path,
        }
    }

    /// Quitte l'application
    pub fn quit(&mut self) {
        self.running = false;
    }

    /// Vérifie si l'application doit continuer
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Génération courante du jeu de symboles suivi
    pub fn generation(&self) -> u64 {
        self.generation
    }

    // ========================================================================
    // Timers : rafraîchissement, rotation, glissade
    // ========================================================================

    /// Tick : appelé à chaque itération de la boucle d'événements
    ///
    /// CONCEPT : Event Loop Pattern
    /// - La boucle tourne à ~30 ms (cadence de la glissade)
    /// - Chaque timer compare son échéance à l'horloge monotone : les
    ///   cadences lentes (rotation, prix) ne dépendent pas du framerate
    pub fn tick(&mut self) {
        let now = Instant::now();

        // Rafraîchissement des prix (un fetch par symbole)
        let refresh_every = Duration::from_secs(self.config.effective_update_interval());
        if now.duration_since(self.last_refresh) >= refresh_every {
            self.last_refresh = now;
            self.request_price_refresh();
        }

        // Rotation : avance au symbole suivant et démarre la glissade.
        // Garde anti-chevauchement : un timer qui tombe pendant une
        // animation est ignoré (no-op, pas une erreur).
        let cycle_every = Duration::from_secs(self.config.effective_cycle_interval());
        if self.config.cycle_enabled
            && !self.engine.is_animating()
            && now.duration_since(self.last_rotation) >= cycle_every
        {
            self.last_rotation = now;
            let (width, height) = self.panel_size();
            // La glissade parcourt la largeur intérieure (hors bordures)
            if self.engine.advance(width.saturating_sub(2)) {
                self.frozen_panel = Some((width, height));
                self.last_anim_step = now;
            }
        }

        // Pas de glissade toutes les SLIDE_TICK pendant l'animation
        if self.engine.is_animating() && now.duration_since(self.last_anim_step) >= SLIDE_TICK {
            self.last_anim_step = now;
            self.engine.tick(SLIDE_STEP);
            if !self.engine.is_animating() {
                // Fin de glissade : le panneau peut se réajuster au contenu
                self.frozen_panel = None;
            }
        }

        // Expiration du message d'information
        if let Some((_, since)) = &self.info_message {
            if now.duration_since(*since) >= INFO_LIFETIME {
                self.info_message = None;
            }
        }
    }

    // ========================================================================
    // Commandes et résultats du worker
    // ========================================================================

    /// Met en file un rafraîchissement des prix de tous les symboles suivis
    pub fn request_price_refresh(&mut self) {
        self.pending.push(AppCommand::RefreshPrices {
            symbols: self.engine.symbols().to_vec(),
            generation: self.generation,
        });
    }

    /// Met en file une résolution des badges de tous les symboles suivis
    ///
    /// Appelé au démarrage, après un changement de symboles et après le
    /// vidage manuel du cache (un fetch par symbole suivi).
    pub fn request_icon_refresh(&mut self) {
        self.pending.push(AppCommand::RefreshIcons {
            symbols: self.engine.symbols().to_vec(),
            generation: self.generation,
        });
    }

    /// Récupère les commandes en attente (la file est vidée)
    pub fn drain_commands(&mut self) -> Vec<AppCommand> {
        std::mem::take(&mut self.pending)
    }

    /// Applique un résultat du worker
    ///
    /// Deux filtres, dans l'ordre :
    /// 1. jeton de génération : un résultat d'une génération périmée est
    ///    jeté (la liste suivie a changé pendant le fetch) ;
    /// 2. appartenance : un résultat pour un symbole qui n'est plus suivi
    ///    est jeté.
    /// L'application est idempotente par symbole : l'ordre d'arrivée entre
    /// symboles différents est indifférent.
    pub fn handle_result(&mut self, result: AppResult) {
        match result {
            AppResult::PriceFetched {
                symbol,
                price,
                generation,
            } => {
                if generation != self.generation {
                    debug!(symbol = %symbol, generation, "Stale price result discarded");
                    return;
                }
                match self.slides.get_mut(&symbol) {
                    Some(slide) => slide.apply_price(price),
                    None => debug!(symbol = %symbol, "Price result for untracked symbol discarded"),
                }
            }
            AppResult::IconResolved {
                symbol,
                icon,
                generation,
            } => {
                if generation != self.generation {
                    debug!(symbol = %symbol, generation, "Stale icon result discarded");
                    return;
                }
                match self.slides.get_mut(&symbol) {
                    Some(slide) => slide.apply_icon(icon),
                    None => debug!(symbol = %symbol, "Icon result for untracked symbol discarded"),
                }
            }
        }
    }

    // ========================================================================
    // Réglages
    // ========================================================================

    /// Applique une nouvelle configuration (bouton Save du panneau)
    ///
    /// Remplace la liste suivie en bloc : génération incrémentée, rotation
    /// remise à zéro, slides reconstruits, timers relancés, et re-fetch
    /// immédiat des prix et des badges.
    pub fn apply_settings(&mut self, new_config: Config) {
        self.config = new_config;
        self.config.save(&self.config_path);

        self.generation += 1;
        let symbols = self.config.symbols();
        self.engine.reset(symbols.clone());
        self.slides = build_slides(&symbols);
        self.frozen_panel = None;

        let now = Instant::now();
        self.last_refresh = now;
        self.last_rotation = now;
        self.last_anim_step = now;

        self.request_price_refresh();
        self.request_icon_refresh();
        self.screen = Screen::Widget;

        info!(generation = self.generation, symbols = ?symbols, "Settings applied");
    }

    /// Ouvre le panneau de réglages (brouillon depuis la config courante)
    pub fn open_settings(&mut self) {
        self.form = SettingsForm::from_config(&self.config);
        self.info_message = None;
        self.screen = Screen::Settings;
    }

    /// Ferme le panneau de réglages sans rien appliquer
    pub fn cancel_settings(&mut self) {
        self.screen = Screen::Widget;
    }

    /// Valide le panneau de réglages
    pub fn save_settings(&mut self) {
        let new_config = self.form.to_config(&self.config);
        self.apply_settings(new_config);
    }

    /// Affiche un message d'information éphémère
    pub fn set_info(&mut self, message: &str) {
        self.info_message = Some((message.to_string(), Instant::now()));
    }

    /// Message d'information courant, s'il n'est pas expiré
    pub fn info_message(&self) -> Option<&str> {
        self.info_message.as_ref().map(|(msg, _)| msg.as_str())
    }

    // ========================================================================
    // Menu contextuel
    // ========================================================================

    /// Ouvre le menu contextuel à la position du clic droit
    pub fn open_menu(&mut self, anchor: (u16, u16)) {
        self.menu_anchor = anchor;
        self.menu_selected = 0;
        self.screen = Screen::Menu;
    }

    /// Ferme le menu contextuel
    pub fn close_menu(&mut self) {
        self.screen = Screen::Widget;
    }

    pub fn menu_up(&mut self) {
        self.menu_selected = self.menu_selected.saturating_sub(1);
    }

    pub fn menu_down(&mut self) {
        let max_index = ui::menu::MENU_ITEMS.len().saturating_sub(1);
        self.menu_selected = (self.menu_selected + 1).min(max_index);
    }

    // ========================================================================
    // Drag souris
    // ========================================================================

    /// Démarre un drag si le clic tombe dans le panneau
    pub fn begin_drag(&mut self, col: u16, row: u16) {
        if ui::events::hit(self.panel_rect, col, row) {
            self.drag = Some((col - self.panel_rect.x, row - self.panel_rect.y));
        }
    }

    /// Déplace le panneau pendant un drag
    pub fn drag_to(&mut self, col: u16, row: u16) {
        if let Some((dx, dy)) = self.drag {
            self.pos = (col.saturating_sub(dx), row.saturating_sub(dy));
        }
    }

    /// Termine le drag et persiste la position (best-effort)
    pub fn end_drag(&mut self) {
        if self.drag.take().is_some() {
            self.config.pos_x = self.pos.0;
            self.config.pos_y = self.pos.1;
            self.config.save(&self.config_path);
            debug!(x = self.pos.0, y = self.pos.1, "Panel position saved");
        }
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    // ========================================================================
    // Géométrie et accès pour le rendu
    // ========================================================================

    /// Taille courante du panneau (gelée pendant une glissade)
    pub fn panel_size(&self) -> (u16, u16) {
        if let Some(frozen) = self.frozen_panel {
            return frozen;
        }
        match self.current_slide() {
            Some(slide) => {
                let decimals = self.config.decimals_for(&slide.symbol);
                ui::widget::panel_size(slide, decimals, &self.config)
            }
            None => (16, 3),
        }
    }

    /// Recalcule les rectangles affichés (appelé avant chaque rendu)
    ///
    /// La position du panneau est bornée dans la zone du terminal ; le menu
    /// contextuel suit son point d'ancrage.
    pub fn update_layout(&mut self, area: Rect) {
        let (width, height) = self.panel_size();
        let width = width.min(area.width);
        let height = height.min(area.height);
        let x = self.pos.0.min(area.width.saturating_sub(width));
        let y = self.pos.1.min(area.height.saturating_sub(height));
        self.panel_rect = Rect::new(x, y, width, height);

        self.menu_rect = if self.screen == Screen::Menu {
            ui::menu::menu_rect(self.menu_anchor, area)
        } else {
            Rect::default()
        };
    }

    pub fn panel_rect(&self) -> Rect {
        self.panel_rect
    }

    pub fn menu_rect(&self) -> Rect {
        self.menu_rect
    }

    /// Slide actuellement affiché
    pub fn current_slide(&self) -> Option<&TickerSlide> {
        self.engine
            .current_symbol()
            .and_then(|symbol| self.slides.get(symbol))
    }

    /// Slide sortant (uniquement pendant une glissade)
    pub fn previous_slide(&self) -> Option<&TickerSlide> {
        self.engine
            .previous_symbol()
            .and_then(|symbol| self.slides.get(symbol))
    }
}

/// Construit la map des slides depuis la liste des symboles
///
/// Map keyée par symbole : des doublons s'effondrent silencieusement sur
/// une seule entrée.
fn build_slides(symbols: &[String]) -> HashMap<String, TickerSlide> {
    symbols
        .iter()
        .map(|symbol| (symbol.clone(), TickerSlide::new(symbol)))
        .collect()
}

// ============================================================================
// Tests unitaires
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn app() -> App {
        let path = std::env::temp_dir().join("coinbar-test-settings.json");
        App::new(Config::default(), path)
    }

    #[test]
    fn test_startup_queues_initial_fetches() {
        let mut app = app();
        let commands = app.drain_commands();

        assert_eq!(commands.len(), 2);
        assert!(matches!(
            &commands[0],
            AppCommand::RefreshPrices { symbols, generation: 0 } if symbols.len() == 3
        ));
        assert!(matches!(
            &commands[1],
            AppCommand::RefreshIcons { symbols, generation: 0 } if symbols.len() == 3
        ));

        // La file est vidée par drain
        assert!(app.drain_commands().is_empty());
    }

    #[test]
    fn test_price_result_applied() {
        let mut app = app();
        app.handle_result(AppResult::PriceFetched {
            symbol: "BTCUSDT".to_string(),
            price: Some(65432.10),
            generation: 0,
        });

        assert_eq!(app.slides["BTCUSDT"].price, Some(65432.10));
    }

    #[test]
    fn test_stale_generation_result_discarded() {
        let mut app = app();
        app.handle_result(AppResult::PriceFetched {
            symbol: "BTCUSDT".to_string(),
            price: Some(65432.10),
            generation: 7, // génération périmée
        });

        assert_eq!(app.slides["BTCUSDT"].price, None);
    }

    #[test]
    fn test_untracked_symbol_result_discarded() {
        let mut app = app();
        app.handle_result(AppResult::PriceFetched {
            symbol: "DOGEUSDT".to_string(),
            price: Some(0.1),
            generation: 0,
        });

        // Aucun slide créé pour un symbole non suivi
        assert!(!app.slides.contains_key("DOGEUSDT"));
    }

    #[test]
    fn test_apply_settings_bumps_generation_and_resets() {
        let mut app = app();
        app.drain_commands();
        app.engine.advance(20);

        let mut new_config = Config::default();
        new_config.symbol1 = "DOGEUSDT".to_string();
        app.apply_settings(new_config);

        assert_eq!(app.generation(), 1);
        assert_eq!(app.engine.current_index(), 0);
        assert!(!app.engine.is_animating());
        assert!(app.slides.contains_key("DOGEUSDT"));
        assert!(!app.slides.contains_key("BTCUSDT"));

        // Re-fetch immédiat des prix et des badges, nouvelle génération
        let commands = app.drain_commands();
        assert_eq!(commands.len(), 2);
        for command in &commands {
            match command {
                AppCommand::RefreshPrices { generation, .. }
                | AppCommand::RefreshIcons { generation, .. } => assert_eq!(*generation, 1),
            }
        }
    }

    #[test]
    fn test_results_from_old_generation_after_settings_change() {
        let mut app = app();
        app.apply_settings(Config::default());
        assert_eq!(app.generation(), 1);

        // Résultat parti avant le changement : génération 0, jeté
        app.handle_result(AppResult::PriceFetched {
            symbol: "BTCUSDT".to_string(),
            price: Some(1.0),
            generation: 0,
        });
        assert_eq!(app.slides["BTCUSDT"].price, None);

        // Résultat de la génération courante : appliqué
        app.handle_result(AppResult::PriceFetched {
            symbol: "BTCUSDT".to_string(),
            price: Some(2.0),
            generation: 1,
        });
        assert_eq!(app.slides["BTCUSDT"].price, Some(2.0));
    }

    #[test]
    fn test_cache_clear_refetches_one_per_symbol() {
        let mut app = app();
        app.drain_commands();

        // Action "vider le cache" : une résolution par symbole suivi
        app.request_icon_refresh();
        let commands = app.drain_commands();

        assert_eq!(commands.len(), 1);
        match &commands[0] {
            AppCommand::RefreshIcons { symbols, .. } => {
                assert_eq!(symbols.len(), 3);
                assert_eq!(symbols[0], "BTCUSDT");
                assert_eq!(symbols[1], "ETHUSDT");
                assert_eq!(symbols[2], "SOLUSDT");
            }
            other => panic!("commande inattendue : {:?}", other),
        }
    }

    #[test]
    fn test_drag_moves_and_persists_position() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        let mut app = App::new(Config::default(), path.clone());
        app.update_layout(Rect::new(0, 0, 80, 24));

        let rect = app.panel_rect();
        app.begin_drag(rect.x + 2, rect.y + 1);
        assert!(app.is_dragging());

        app.drag_to(rect.x + 12, rect.y + 6);
        app.end_drag();
        assert!(!app.is_dragging());

        // Position persistée dans le fichier de réglages
        let saved = Config::load(&path);
        assert_eq!(saved.pos_x, rect.x + 10);
        assert_eq!(saved.pos_y, rect.y + 5);
    }

    #[test]
    fn test_drag_outside_panel_is_ignored() {
        let mut app = app();
        app.update_layout(Rect::new(0, 0, 80, 24));

        app.begin_drag(79, 23); // loin du panneau
        assert!(!app.is_dragging());
    }

    #[test]
    fn test_settings_form_round_trip() {
        let config = Config::default();
        let form = SettingsForm::from_config(&config);
        let rebuilt = form.to_config(&config);
        assert_eq!(rebuilt, config);
    }

    #[test]
    fn test_settings_form_empty_symbol_falls_back() {
        let config = Config::default();
        let mut form = SettingsForm::from_config(&config);
        form.symbols[1] = "   ".to_string();

        let rebuilt = form.to_config(&config);
        assert_eq!(rebuilt.symbol2, "ETHUSDT");
    }

    #[test]
    fn test_settings_form_adjust_clamps() {
        let config = Config::default();
        let mut form = SettingsForm::from_config(&config);

        // Décimales du slot 0 : focus sur FormField::Decimals(0)
        form.focus = 1;
        for _ in 0..20 {
            form.adjust(1);
        }
        assert_eq!(form.decimals[0], 8);
        for _ in 0..20 {
            form.adjust(-1);
        }
        assert_eq!(form.decimals[0], 0);
    }

    #[test]
    fn test_settings_form_symbol_editing() {
        let config = Config::default();
        let mut form = SettingsForm::from_config(&config);
        form.focus = 0; // FormField::Symbol(0)

        form.symbols[0].clear();
        form.insert_char('d');
        form.insert_char('o');
        form.insert_char('g');
        form.insert_char('-'); // rejeté : ni lettre ni chiffre
        form.backspace();
        assert_eq!(form.symbols[0], "DO");
    }

    #[test]
    fn test_screen_transitions() {
        let mut app = app();
        assert_eq!(app.screen, Screen::Widget);

        app.open_menu((10, 4));
        assert_eq!(app.screen, Screen::Menu);
        assert_eq!(app.menu_anchor, (10, 4));

        app.open_settings();
        assert_eq!(app.screen, Screen::Settings);

        app.cancel_settings();
        assert_eq!(app.screen, Screen::Widget);
    }
}
