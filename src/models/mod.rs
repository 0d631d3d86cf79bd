// ============================================================================
// Module : models
// ============================================================================
// Ce module contient toutes les structures de données de l'application
//
// CONCEPT RUST : Modules et visibilité
// - "pub mod" : déclare un sous-module publique (accessible depuis l'extérieur)
// - Sans "pub", le module serait privé au crate
// ============================================================================

pub mod icon;     // Badge de coin (lettre + couleur dérivée de l'artwork)
pub mod rotation; // Machine à états de la rotation et de la glissade
pub mod slide;    // Données d'affichage d'un symbole suivi

// Re-export des structures principales pour simplifier les imports
// Au lieu de : use coinbar::models::icon::Icon;
// On peut faire : use coinbar::models::Icon;
pub use icon::Icon;
pub use rotation::RotationEngine;
pub use slide::{strip_quote_suffix, TickerSlide};
