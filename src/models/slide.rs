// ============================================================================
// Structure : TickerSlide
// ============================================================================
// Représente un symbole suivi avec ses données d'affichage : le badge, le
// libellé (symbole sans le suffixe de cotation) et le dernier prix connu.
//
// CONCEPTS RUST :
// 1. Composition : TickerSlide contient un Icon
// 2. Option : prix absent tant qu'aucun fetch n'a abouti
// 3. Mutation en place : les résultats de fetch mettent à jour le slide
// ============================================================================

use chrono::{DateTime, Utc};

use crate::models::Icon;

/// Suffixes de cotation reconnus, du plus long au plus court
///
/// "BTCUSDT" s'affiche "BTC", "ETHUSDC" s'affiche "ETH". Un symbole sans
/// suffixe reconnu est affiché tel quel.
const QUOTE_SUFFIXES: [&str; 4] = ["USDT", "USDC", "BUSD", "USD"];

/// Un symbole suivi et ses données d'affichage
#[derive(Debug, Clone)]
pub struct TickerSlide {
    /// Symbole complet de la paire (ex: "BTCUSDT")
    pub symbol: String,

    /// Libellé affiché : symbole sans le suffixe de cotation (ex: "BTC")
    pub display_symbol: String,

    /// Badge du coin (repli gris tant que l'artwork n'est pas résolu)
    pub icon: Icon,

    /// Dernier prix connu (None = indisponible, affiché "...")
    pub price: Option<f64>,

    /// Horodatage du dernier prix reçu
    pub fetched_at: Option<DateTime<Utc>>,
}

impl TickerSlide {
    /// Crée un slide pour un symbole, sans prix ni artwork
    pub fn new(symbol: &str) -> Self {
        let symbol = symbol.to_uppercase();
        let display_symbol = strip_quote_suffix(&symbol);
        let icon = Icon::placeholder(&display_symbol);
        Self {
            symbol,
            display_symbol,
            icon,
            price: None,
            fetched_at: None,
        }
    }

    /// Applique un résultat de fetch de prix
    ///
    /// None signifie "indisponible" : on efface le prix plutôt que de
    /// laisser une valeur périmée s'afficher comme fraîche.
    pub fn apply_price(&mut self, price: Option<f64>) {
        self.price = price;
        if price.is_some() {
            self.fetched_at = Some(Utc::now());
        }
    }

    /// Applique un badge résolu
    pub fn apply_icon(&mut self, icon: Icon) {
        self.icon = icon;
    }

    /// Vérifie si un prix est disponible
    pub fn has_price(&self) -> bool {
        self.price.is_some()
    }
}

/// Retire le suffixe de cotation d'un symbole (en majuscules)
///
/// Premier suffixe correspondant dans QUOTE_SUFFIXES ; "USDT" seul devient
/// une chaîne vide (le badge affiche alors '?'), comme tout symbole réduit
/// à son suffixe.
pub fn strip_quote_suffix(symbol: &str) -> String {
    let symbol = symbol.to_uppercase();
    for suffix in QUOTE_SUFFIXES {
        if let Some(base) = symbol.strip_suffix(suffix) {
            return base.to_string();
        }
    }
    symbol
}

// ============================================================================
// Tests unitaires
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_quote_suffix() {
        assert_eq!(strip_quote_suffix("BTCUSDT"), "BTC");
        assert_eq!(strip_quote_suffix("ETHUSDC"), "ETH");
        assert_eq!(strip_quote_suffix("SOLBUSD"), "SOL");
        assert_eq!(strip_quote_suffix("XBTUSD"), "XBT");
    }

    #[test]
    fn test_strip_quote_suffix_no_match() {
        assert_eq!(strip_quote_suffix("BTCEUR"), "BTCEUR");
        assert_eq!(strip_quote_suffix(""), "");
    }

    #[test]
    fn test_strip_quote_suffix_lowercase_input() {
        assert_eq!(strip_quote_suffix("btcusdt"), "BTC");
    }

    #[test]
    fn test_strip_quote_suffix_suffix_only() {
        // Symbole réduit à son suffixe : libellé vide, badge '?'
        assert_eq!(strip_quote_suffix("USDT"), "");
    }

    #[test]
    fn test_slide_new() {
        let slide = TickerSlide::new("btcusdt");
        assert_eq!(slide.symbol, "BTCUSDT");
        assert_eq!(slide.display_symbol, "BTC");
        assert_eq!(slide.icon.letter, 'B');
        assert!(slide.icon.placeholder);
        assert!(!slide.has_price());
    }

    #[test]
    fn test_apply_price() {
        let mut slide = TickerSlide::new("BTCUSDT");

        slide.apply_price(Some(65432.10));
        assert_eq!(slide.price, Some(65432.10));
        assert!(slide.fetched_at.is_some());

        // Un fetch raté efface le prix
        slide.apply_price(None);
        assert!(slide.price.is_none());
    }
}
