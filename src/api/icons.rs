// ============================================================================
// Icon Resolver : cache disque -> téléchargement -> badge de repli
// ============================================================================
// Résout le badge d'un symbole suivant une chaîne de repli stricte :
//
//   1. Artwork en cache sur disque (s'il se valide) -> badge coloré
//   2. Sinon UN téléchargement depuis l'URL de logos Binance ;
//      succès -> octets persistés en cache (best-effort) + badge coloré
//   3. Sinon badge de repli gris (première lettre, '?' si vide)
//
// CHAQUE appel retourne un badge utilisable : seule la qualité se dégrade,
// aucun échec partiel n'est signalé à l'appelant.
//
// Le cache n'expire jamais et n'est pas borné : l'ensemble des symboles
// suivis est petit et contrôlé par l'utilisateur. Son invalidation passe
// par l'action explicite "vider le cache" du panneau de réglages.
// ============================================================================

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::{debug, info, warn};

use crate::models::{strip_quote_suffix, Icon};

/// Nom du répertoire de cache dans le home de l'utilisateur
pub const ICON_CACHE_DIR_NAME: &str = "coinbar_icons";

/// Timeout du téléchargement d'un logo
const ICON_TIMEOUT: Duration = Duration::from_secs(8);

/// User-Agent envoyé avec chaque requête
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

/// Signature des 8 premiers octets d'un fichier PNG
///
/// Notre "décodage" terminal se réduit à cette validation : un fichier de
/// cache tronqué ou remplacé par une page d'erreur HTML est rejeté et
/// déclenche un re-téléchargement.
const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

/// Répertoire de cache par défaut (~/coinbar_icons)
pub fn icon_cache_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(ICON_CACHE_DIR_NAME)
}

/// Chemin du fichier de cache d'un symbole
///
/// Clé : symbole sans suffixe de cotation, en majuscules (BTCUSDT -> BTC.png)
pub fn icon_cache_path(cache_dir: &Path, symbol: &str) -> PathBuf {
    cache_dir.join(format!("{}.png", strip_quote_suffix(symbol)))
}

/// Résout le badge d'un symbole (cache -> réseau -> repli)
///
/// Le répertoire de cache est passé explicitement : les tests utilisent un
/// répertoire temporaire, l'application passe icon_cache_dir().
pub async fn resolve_icon(cache_dir: &Path, symbol: &str) -> Icon {
    let base = strip_quote_suffix(symbol);
    let cache_file = icon_cache_path(cache_dir, symbol);

    // 1. Cache disque
    if let Ok(bytes) = std::fs::read(&cache_file) {
        if is_valid_artwork(&bytes) {
            debug!(symbol, path = %cache_file.display(), "Icon resolved from cache");
            return Icon::from_artwork(&base, &bytes);
        }
        debug!(symbol, path = %cache_file.display(), "Cached artwork invalid, refetching");
    }

    // 2. Téléchargement (un seul essai)
    match try_fetch_artwork(&base).await {
        Ok(bytes) => {
            // Persistance best-effort : un cache qui ne s'écrit pas n'est
            // pas une erreur, juste un re-téléchargement au prochain tour
            if let Err(e) = persist_artwork(&cache_file, &bytes) {
                debug!(symbol, error = ?e, "Icon cache write ignored");
            }
            info!(symbol, bytes = bytes.len(), "Icon fetched from network");
            Icon::from_artwork(&base, &bytes)
        }
        Err(e) => {
            // 3. Badge de repli
            warn!(symbol, error = ?e, "Icon fetch failed, using placeholder");
            Icon::placeholder(&base)
        }
    }
}

/// Télécharge les octets d'artwork d'un symbole de base
async fn try_fetch_artwork(base: &str) -> Result<Vec<u8>> {
    let url = format!(
        "https://bin.bnbstatic.com/static/assets/logos/{}.png",
        base.to_uppercase()
    );
    debug!(url = %url, "Built icon URL");

    let client = reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .timeout(ICON_TIMEOUT)
        .build()
        .context("Échec de la création du client HTTP")?;

    let response = client
        .get(&url)
        .send()
        .await
        .context("Échec de la requête HTTP du logo")?;

    let status = response.status();
    if !status.is_success() {
        anyhow::bail!("Le serveur de logos a retourné HTTP {}", status);
    }

    let bytes = response
        .bytes()
        .await
        .context("Échec de la lecture des octets du logo")?
        .to_vec();

    if !is_valid_artwork(&bytes) {
        anyhow::bail!("Réponse du serveur de logos sans signature PNG");
    }

    Ok(bytes)
}

/// Valide des octets d'artwork (signature PNG)
fn is_valid_artwork(bytes: &[u8]) -> bool {
    bytes.len() > PNG_SIGNATURE.len() && bytes[..PNG_SIGNATURE.len()] == PNG_SIGNATURE
}

/// Écrit les octets d'artwork dans le cache
fn persist_artwork(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).context("Échec de la création du répertoire de cache")?;
    }
    std::fs::write(path, bytes).context("Échec de l'écriture du fichier de cache")
}

/// Vide le cache d'icônes (best-effort, fichier par fichier)
///
/// Retourne le nombre de fichiers supprimés (informationnel). Les échecs
/// individuels sont loggés puis ignorés.
pub fn clear_icon_cache(cache_dir: &Path) -> usize {
    let entries = match std::fs::read_dir(cache_dir) {
        Ok(entries) => entries,
        Err(e) => {
            debug!(dir = %cache_dir.display(), error = %e, "Icon cache dir not readable");
            return 0;
        }
    };

    let mut removed = 0;
    for entry in entries.flatten() {
        match std::fs::remove_file(entry.path()) {
            Ok(()) => removed += 1,
            Err(e) => debug!(path = %entry.path().display(), error = %e, "Cache file removal ignored"),
        }
    }

    info!(dir = %cache_dir.display(), removed, "Icon cache cleared");
    removed
}

// ============================================================================
// Tests unitaires
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    /// Fabrique des octets avec une signature PNG valide
    fn fake_png() -> Vec<u8> {
        let mut bytes = PNG_SIGNATURE.to_vec();
        bytes.extend_from_slice(b"fake image payload");
        bytes
    }

    #[test]
    fn test_cache_path_strips_quote_suffix() {
        let dir = PathBuf::from("/tmp/cache");
        assert_eq!(
            icon_cache_path(&dir, "BTCUSDT"),
            PathBuf::from("/tmp/cache/BTC.png")
        );
        assert_eq!(
            icon_cache_path(&dir, "ethusdt"),
            PathBuf::from("/tmp/cache/ETH.png")
        );
    }

    #[test]
    fn test_is_valid_artwork() {
        assert!(is_valid_artwork(&fake_png()));
        assert!(!is_valid_artwork(b"<html>404</html>"));
        assert!(!is_valid_artwork(&[]));
        // Signature seule, sans payload : rejetée
        assert!(!is_valid_artwork(&PNG_SIGNATURE));
    }

    #[tokio::test]
    async fn test_resolve_from_cache_without_network() {
        let dir = tempfile::tempdir().unwrap();
        let path = icon_cache_path(dir.path(), "BTCUSDT");
        persist_artwork(&path, &fake_png()).unwrap();

        // Cache valide : résolu localement, aucun appel réseau
        let icon = resolve_icon(dir.path(), "BTCUSDT").await;
        assert!(!icon.placeholder);
        assert_eq!(icon.letter, 'B');
    }

    #[test]
    fn test_clear_icon_cache_counts_files() {
        let dir = tempfile::tempdir().unwrap();
        persist_artwork(&icon_cache_path(dir.path(), "BTCUSDT"), &fake_png()).unwrap();
        persist_artwork(&icon_cache_path(dir.path(), "ETHUSDT"), &fake_png()).unwrap();
        persist_artwork(&icon_cache_path(dir.path(), "SOLUSDT"), &fake_png()).unwrap();

        assert_eq!(clear_icon_cache(dir.path()), 3);
        assert_eq!(clear_icon_cache(dir.path()), 0); // déjà vide
    }

    #[test]
    fn test_clear_missing_dir_is_noop() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nexiste-pas");
        assert_eq!(clear_icon_cache(&missing), 0);
    }
}
