// ============================================================================
// Structure : RotationEngine
// ============================================================================
// Machine à états de la rotation des symboles : quel symbole est affiché,
// lequel sort de l'écran, et où en est la glissade horizontale.
//
// CONCEPTS RUST :
// 1. State machine : un seul booléen d'animation, des transitions explicites
// 2. Encapsulation : champs privés, l'extérieur passe par les méthodes
// 3. Opérations infaillibles : advance/tick/reset ne retournent jamais
//    d'erreur, un appel hors-état est un no-op
//
// INVARIANTS :
// - animating == true  => previous_index est défini et
//   slide_offset est dans [0, largeur capturée à l'advance]
// - animating == false => slide_offset == 0 et previous_index == None
// ============================================================================

use tracing::debug;

/// Machine à états de la rotation et de la glissade
#[derive(Debug, Clone)]
pub struct RotationEngine {
    /// Symboles suivis, dans l'ordre de rotation
    symbols: Vec<String>,

    /// Index du symbole actuellement affiché
    current_index: usize,

    /// Index du symbole sortant (Some uniquement pendant une glissade)
    previous_index: Option<usize>,

    /// Décalage horizontal restant, en colonnes (0 = glissade terminée)
    slide_offset: u16,

    /// Une glissade est-elle en cours ?
    animating: bool,
}

impl RotationEngine {
    /// Crée un moteur de rotation sur une liste de symboles
    pub fn new(symbols: Vec<String>) -> Self {
        Self {
            symbols,
            current_index: 0,
            previous_index: None,
            slide_offset: 0,
            animating: false,
        }
    }

    /// Avance au symbole suivant et démarre la glissade
    ///
    /// Préconditions (sinon no-op, jamais une erreur) :
    /// - au moins un symbole suivi
    /// - pas de glissade déjà en cours (le timer de rotation peut tomber
    ///   pendant une animation, on l'ignore plutôt que d'empiler)
    ///
    /// `panel_width` : largeur du panneau au moment du départ ; la glissade
    /// part de cette valeur et redescend à 0 colonne par colonne.
    ///
    /// Retourne true si une glissade a effectivement démarré.
    pub fn advance(&mut self, panel_width: u16) -> bool {
        if self.symbols.is_empty() || self.animating {
            return false;
        }

        self.previous_index = Some(self.current_index);
        self.current_index = (self.current_index + 1) % self.symbols.len();
        self.slide_offset = panel_width;
        self.animating = true;

        debug!(
            from = self.previous_index.unwrap_or(0),
            to = self.current_index,
            offset = self.slide_offset,
            "Rotation advance"
        );
        true
    }

    /// Fait progresser la glissade d'un pas
    ///
    /// Décrémente le décalage de `step` colonnes (borné à 0). Arrivé à 0,
    /// l'animation se termine : previous_index est effacé. Un tick reçu
    /// hors animation est un no-op.
    pub fn tick(&mut self, step: u16) {
        if !self.animating {
            return;
        }

        self.slide_offset = self.slide_offset.saturating_sub(step.max(1));

        if self.slide_offset == 0 {
            self.animating = false;
            self.previous_index = None;
            debug!(index = self.current_index, "Rotation slide finished");
        }
    }

    /// Remplace la liste des symboles et remet la rotation à zéro
    ///
    /// Appelé à la sauvegarde des réglages : index courant à 0, toute
    /// animation en cours abandonnée.
    pub fn reset(&mut self, symbols: Vec<String>) {
        self.symbols = symbols;
        self.current_index = 0;
        self.previous_index = None;
        self.slide_offset = 0;
        self.animating = false;
    }

    /// Symbole actuellement affiché
    pub fn current_symbol(&self) -> Option<&str> {
        self.symbols.get(self.current_index).map(String::as_str)
    }

    /// Symbole sortant (uniquement pendant une glissade)
    pub fn previous_symbol(&self) -> Option<&str> {
        let index = self.previous_index?;
        self.symbols.get(index).map(String::as_str)
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn previous_index(&self) -> Option<usize> {
        self.previous_index
    }

    pub fn slide_offset(&self) -> u16 {
        self.slide_offset
    }

    pub fn is_animating(&self) -> bool {
        self.animating
    }

    pub fn symbols(&self) -> &[String] {
        &self.symbols
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }
}

// ============================================================================
// Tests unitaires
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn engine() -> RotationEngine {
        RotationEngine::new(vec![
            "BTCUSDT".to_string(),
            "ETHUSDT".to_string(),
            "SOLUSDT".to_string(),
        ])
    }

    #[test]
    fn test_advance_starts_animation() {
        let mut engine = engine();

        assert!(engine.advance(40));
        assert!(engine.is_animating());
        assert_eq!(engine.previous_index(), Some(0));
        assert_eq!(engine.current_index(), 1);
        assert_eq!(engine.slide_offset(), 40);
    }

    #[test]
    fn test_advance_while_animating_is_noop() {
        let mut engine = engine();

        assert!(engine.advance(40));
        // Deuxième advance pendant la glissade : ignoré
        assert!(!engine.advance(40));
        assert_eq!(engine.current_index(), 1);
        assert_eq!(engine.previous_index(), Some(0));
    }

    #[test]
    fn test_advance_on_empty_set_is_noop() {
        let mut engine = RotationEngine::new(Vec::new());
        assert!(!engine.advance(40));
        assert!(!engine.is_animating());
    }

    #[test]
    fn test_advance_single_symbol_wraps_to_itself() {
        let mut engine = RotationEngine::new(vec!["BTCUSDT".to_string()]);
        assert!(engine.advance(20));
        assert_eq!(engine.current_index(), 0);
        assert_eq!(engine.previous_index(), Some(0));
    }

    #[test]
    fn test_tick_decreases_to_exactly_zero() {
        let mut engine = engine();
        engine.advance(7);

        let mut offsets = Vec::new();
        while engine.is_animating() {
            engine.tick(2);
            offsets.push(engine.slide_offset());
        }

        // Décroissance stricte, clamp exact à 0
        assert_eq!(offsets, vec![5, 3, 1, 0]);
        assert!(!engine.is_animating());
        assert_eq!(engine.previous_index(), None);
    }

    #[test]
    fn test_tick_when_idle_is_noop() {
        let mut engine = engine();
        engine.tick(2);
        assert_eq!(engine.slide_offset(), 0);
        assert!(!engine.is_animating());

        // Idem après une glissade terminée
        engine.advance(2);
        engine.tick(2);
        assert!(!engine.is_animating());
        engine.tick(2);
        assert_eq!(engine.slide_offset(), 0);
    }

    #[test]
    fn test_three_advances_cycle_back_to_zero() {
        let mut engine = engine();

        for expected in [1, 2, 0] {
            engine.advance(10);
            assert_eq!(engine.current_index(), expected);
            // Termine la glissade avant l'advance suivant
            while engine.is_animating() {
                engine.tick(4);
            }
        }

        assert_eq!(engine.current_index(), 0);
    }

    #[test]
    fn test_reset_clears_animation_state() {
        let mut engine = engine();
        engine.advance(30);
        engine.tick(2);

        engine.reset(vec!["DOGEUSDT".to_string(), "XRPUSDT".to_string()]);

        assert_eq!(engine.current_index(), 0);
        assert_eq!(engine.previous_index(), None);
        assert_eq!(engine.slide_offset(), 0);
        assert!(!engine.is_animating());
        assert_eq!(engine.current_symbol(), Some("DOGEUSDT"));
    }

    #[test]
    fn test_current_and_previous_symbols() {
        let mut engine = engine();
        assert_eq!(engine.current_symbol(), Some("BTCUSDT"));
        assert_eq!(engine.previous_symbol(), None);

        engine.advance(10);
        assert_eq!(engine.current_symbol(), Some("ETHUSDT"));
        assert_eq!(engine.previous_symbol(), Some("BTCUSDT"));
    }
}
