// ============================================================================
// Configuration : fichier de réglages JSON
// ============================================================================
// Charge et sauvegarde les réglages du widget depuis un fichier JSON plat
// situé dans le home de l'utilisateur (~/coinbar_settings.json)
//
// CONCEPTS RUST :
// 1. #[serde(default = "...")] : valeur par défaut par champ si la clé manque
// 2. #[serde(flatten)] : capture les clés inconnues sans les perdre
// 3. Frontière explicite load/save : pas d'état global mutable, la Config
//    est un objet passé par référence aux composants qui en ont besoin
//
// POLITIQUE D'ERREUR : les échecs de lecture/écriture sont loggés puis
// ignorés (on retombe sur les défauts). Un widget d'affichage best-effort
// ne doit jamais planter sur un fichier de réglages corrompu.
// ============================================================================

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Nom du fichier de réglages dans le home de l'utilisateur
pub const SETTINGS_FILE_NAME: &str = "coinbar_settings.json";

// Valeurs par défaut (utilisées champ par champ quand une clé manque)
fn default_symbol1() -> String {
    "BTCUSDT".to_string()
}
fn default_symbol2() -> String {
    "ETHUSDT".to_string()
}
fn default_symbol3() -> String {
    "SOLUSDT".to_string()
}
fn default_decimals() -> u8 {
    2
}
fn default_text_size() -> u16 {
    24
}
fn default_bg_opacity() -> f64 {
    0.7
}
fn default_update_interval() -> u64 {
    10
}
fn default_cycle_interval() -> u64 {
    3
}
fn default_cycle_enabled() -> bool {
    true
}
fn default_pos_x() -> u16 {
    4
}
fn default_pos_y() -> u16 {
    2
}

/// Réglages du widget, miroir exact du fichier JSON
///
/// CONCEPT RUST : Derive Serialize + Deserialize
/// - serde génère tout le code de conversion JSON <-> struct
/// - Les clés du JSON portent les mêmes noms que les champs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Symboles suivis (paires de trading, ex: "BTCUSDT")
    #[serde(default = "default_symbol1")]
    pub symbol1: String,
    #[serde(default = "default_symbol2")]
    pub symbol2: String,
    #[serde(default = "default_symbol3")]
    pub symbol3: String,

    /// Décimales affichées pour le prix de chaque symbole (0 à 8)
    #[serde(default = "default_decimals")]
    pub decimals1: u8,
    #[serde(default = "default_decimals")]
    pub decimals2: u8,
    #[serde(default = "default_decimals")]
    pub decimals3: u8,

    /// Taille de texte (8 à 64) ; pilote la largeur du badge dans le terminal
    #[serde(default = "default_text_size")]
    pub text_size: u16,

    /// Opacité du fond du panneau (0.0 à 1.0)
    #[serde(default = "default_bg_opacity")]
    pub bg_opacity: f64,

    /// Intervalle de rafraîchissement des prix, en secondes
    #[serde(default = "default_update_interval")]
    pub update_interval: u64,

    /// Intervalle de rotation des symboles, en secondes
    #[serde(default = "default_cycle_interval")]
    pub cycle_interval: u64,

    /// Rotation automatique activée ?
    #[serde(default = "default_cycle_enabled")]
    pub cycle_enabled: bool,

    /// Position du panneau dans le terminal (colonne, ligne)
    #[serde(default = "default_pos_x")]
    pub pos_x: u16,
    #[serde(default = "default_pos_y")]
    pub pos_y: u16,

    /// Clés inconnues du fichier : préservées telles quelles au save
    /// CONCEPT RUST : #[serde(flatten)]
    /// - Tout ce qui ne matche aucun champ ci-dessus atterrit ici
    /// - Réécrit à l'identique à la sauvegarde (jamais interprété)
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            symbol1: default_symbol1(),
            symbol2: default_symbol2(),
            symbol3: default_symbol3(),
            decimals1: default_decimals(),
            decimals2: default_decimals(),
            decimals3: default_decimals(),
            text_size: default_text_size(),
            bg_opacity: default_bg_opacity(),
            update_interval: default_update_interval(),
            cycle_interval: default_cycle_interval(),
            cycle_enabled: default_cycle_enabled(),
            pos_x: default_pos_x(),
            pos_y: default_pos_y(),
            extra: serde_json::Map::new(),
        }
    }
}

impl Config {
    /// Chemin par défaut du fichier de réglages (~/coinbar_settings.json)
    pub fn default_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(SETTINGS_FILE_NAME)
    }

    /// Charge la configuration depuis un fichier
    ///
    /// Tout échec (fichier absent, JSON invalide) retombe sur les défauts :
    /// le widget démarre toujours, avec ou sans fichier de réglages.
    pub fn load(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(contents) => match serde_json::from_str::<Config>(&contents) {
                Ok(mut config) => {
                    config.clamp_ranges();
                    debug!(path = %path.display(), "Settings loaded");
                    config
                }
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Invalid settings file, using defaults");
                    Config::default()
                }
            },
            Err(e) => {
                debug!(path = %path.display(), error = %e, "No settings file, using defaults");
                Config::default()
            }
        }
    }

    /// Sauvegarde la configuration (best-effort, échec loggé puis ignoré)
    pub fn save(&self, path: &Path) {
        let json = match serde_json::to_string_pretty(self) {
            Ok(json) => json,
            Err(e) => {
                warn!(error = %e, "Failed to serialize settings");
                return;
            }
        };

        if let Err(e) = std::fs::write(path, json) {
            warn!(path = %path.display(), error = %e, "Failed to write settings file");
        } else {
            debug!(path = %path.display(), "Settings saved");
        }
    }

    /// Ramène chaque champ dans sa plage documentée
    ///
    /// Appelé au chargement et avant la sauvegarde depuis le panneau de
    /// réglages : un fichier édité à la main ne doit pas casser l'affichage.
    pub fn clamp_ranges(&mut self) {
        self.decimals1 = self.decimals1.min(8);
        self.decimals2 = self.decimals2.min(8);
        self.decimals3 = self.decimals3.min(8);
        self.text_size = self.text_size.clamp(8, 64);
        self.bg_opacity = self.bg_opacity.clamp(0.0, 1.0);
        self.update_interval = self.update_interval.clamp(1, 300);
        self.cycle_interval = self.cycle_interval.clamp(1, 60);
    }

    /// Liste ordonnée des symboles suivis (en majuscules)
    pub fn symbols(&self) -> Vec<String> {
        vec![
            self.symbol1.to_uppercase(),
            self.symbol2.to_uppercase(),
            self.symbol3.to_uppercase(),
        ]
    }

    /// Décimales configurées pour un symbole donné
    ///
    /// Premier slot correspondant : des symboles dupliqués partagent donc
    /// les décimales de leur première position (doublons non supportés).
    pub fn decimals_for(&self, symbol: &str) -> u8 {
        let symbol = symbol.to_uppercase();
        if self.symbol1.to_uppercase() == symbol {
            self.decimals1
        } else if self.symbol2.to_uppercase() == symbol {
            self.decimals2
        } else if self.symbol3.to_uppercase() == symbol {
            self.decimals3
        } else {
            default_decimals()
        }
    }

    /// Intervalle de rafraîchissement effectif (minimum 5 s appliqué à l'usage)
    pub fn effective_update_interval(&self) -> u64 {
        self.update_interval.max(5)
    }

    /// Intervalle de rotation effectif (minimum 1 s appliqué à l'usage)
    pub fn effective_cycle_interval(&self) -> u64 {
        self.cycle_interval.max(1)
    }
}

// ============================================================================
// Tests unitaires
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_when_file_missing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.json");

        let config = Config::load(&path);
        assert_eq!(config, Config::default());
        assert_eq!(config.symbol1, "BTCUSDT");
        assert_eq!(config.update_interval, 10);
    }

    #[test]
    fn test_defaults_when_file_corrupt() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, "{ pas du json").unwrap();

        let config = Config::load(&path);
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_missing_keys_fall_back_per_field() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, r#"{"symbol1": "DOGEUSDT", "decimals1": 5}"#).unwrap();

        let config = Config::load(&path);
        assert_eq!(config.symbol1, "DOGEUSDT");
        assert_eq!(config.decimals1, 5);
        // Les clés absentes prennent leur défaut individuel
        assert_eq!(config.symbol2, "ETHUSDT");
        assert_eq!(config.cycle_interval, 3);
        assert!(config.cycle_enabled);
    }

    #[test]
    fn test_save_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");

        let mut config = Config::default();
        config.symbol1 = "XRPUSDT".to_string();
        config.decimals1 = 4;
        config.text_size = 32;
        config.bg_opacity = 0.25;
        config.update_interval = 30;
        config.cycle_interval = 7;
        config.cycle_enabled = false;
        config.pos_x = 12;
        config.pos_y = 5;

        config.save(&path);
        let reloaded = Config::load(&path);

        assert_eq!(reloaded, config);
    }

    #[test]
    fn test_unknown_keys_survive_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(
            &path,
            r#"{"symbol1": "BTCUSDT", "theme": "dark", "future_flag": 42}"#,
        )
        .unwrap();

        let config = Config::load(&path);
        assert_eq!(
            config.extra.get("theme").and_then(|v| v.as_str()),
            Some("dark")
        );

        config.save(&path);
        let reloaded = Config::load(&path);
        assert_eq!(
            reloaded.extra.get("theme").and_then(|v| v.as_str()),
            Some("dark")
        );
        assert_eq!(
            reloaded.extra.get("future_flag").and_then(|v| v.as_i64()),
            Some(42)
        );
    }

    #[test]
    fn test_clamp_ranges() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(
            &path,
            r#"{"decimals1": 99, "text_size": 500, "bg_opacity": 3.0, "cycle_interval": 0}"#,
        )
        .unwrap();

        let config = Config::load(&path);
        assert_eq!(config.decimals1, 8);
        assert_eq!(config.text_size, 64);
        assert_eq!(config.bg_opacity, 1.0);
        assert_eq!(config.cycle_interval, 1);
    }

    #[test]
    fn test_decimals_for_symbol() {
        let config = Config::default();
        assert_eq!(config.decimals_for("BTCUSDT"), 2);
        assert_eq!(config.decimals_for("btcusdt"), 2); // insensible à la casse
        assert_eq!(config.decimals_for("INCONNU"), 2); // défaut
    }

    #[test]
    fn test_effective_intervals() {
        let mut config = Config::default();
        config.update_interval = 1;
        config.cycle_interval = 1;
        assert_eq!(config.effective_update_interval(), 5); // minimum 5 s
        assert_eq!(config.effective_cycle_interval(), 1); // minimum 1 s

        config.update_interval = 60;
        assert_eq!(config.effective_update_interval(), 60);
    }
}
