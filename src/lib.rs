// ============================================================================
// CoinBar - Library
// ============================================================================
// Expose les modules publics pour le binaire et les tests
// ============================================================================

pub mod api;    // Clients réseau (prix Binance, logos)
pub mod app;    // État de l'application
pub mod config; // Fichier de réglages JSON
pub mod models; // Structures de données
pub mod ui;     // Interface utilisateur
