// ============================================================================
// Module : api
// ============================================================================
// Ce module contient les clients réseau : prix des paires (Binance) et
// résolution des logos de coins (cache disque + téléchargement)
// ============================================================================

pub mod binance; // Dernier prix d'une paire de trading
pub mod icons;   // Résolution des badges (cache -> réseau -> repli)

// Re-export des fonctions principales
pub use binance::fetch_price;
pub use icons::{clear_icon_cache, icon_cache_dir, resolve_icon};
