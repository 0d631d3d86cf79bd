// ============================================================================
// API Client : Binance
// ============================================================================
// Récupère le dernier prix d'une paire de trading depuis l'API publique
// de Binance (endpoint ticker/price, sans authentification)
//
// POLITIQUE D'ERREUR : un seul appel, timeout borné, et TOUT échec
// (réseau, statut HTTP, JSON malformé, prix non numérique) est dégradé en
// None ("indisponible"). L'appelant affiche un placeholder et le prochain
// cycle de rafraîchissement tiendra lieu de retry. Aucune erreur ne remonte.
// ============================================================================

use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::{debug, instrument, warn};

/// Endpoint public du dernier prix d'une paire
const PRICE_ENDPOINT: &str = "https://api.binance.com/api/v3/ticker/price";

/// Timeout de la requête de prix
const PRICE_TIMEOUT: Duration = Duration::from_secs(6);

/// User-Agent envoyé avec chaque requête
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

// ============================================================================
// Structures pour parser la réponse JSON de Binance
// ============================================================================
// Binance répond : {"symbol": "BTCUSDT", "price": "65432.10000000"}
// Le prix est une STRING décimale, pas un nombre JSON — on le parse nous-même
// ============================================================================

#[derive(Debug, Deserialize)]
struct PriceResponse {
    price: String,
}

/// Récupère le dernier prix d'un symbole, None si indisponible
///
/// CONCEPT RUST : #[instrument]
/// - Macro tracing qui ajoute automatiquement un span
/// - Tous les logs à l'intérieur auront le contexte du symbole
///
/// # Exemple
/// let price = fetch_price("BTCUSDT").await;  // Some(65432.10) ou None
#[instrument]
pub async fn fetch_price(symbol: &str) -> Option<f64> {
    match try_fetch_price(symbol).await {
        Ok(price) => {
            debug!(price, "Price fetched");
            Some(price)
        }
        Err(e) => {
            // Dégradé en "indisponible", jamais propagé
            warn!(error = ?e, "Price fetch failed, marking unavailable");
            None
        }
    }
}

/// Variante interne avec les erreurs détaillées (pour les logs)
async fn try_fetch_price(symbol: &str) -> Result<f64> {
    let url = format!("{}?symbol={}", PRICE_ENDPOINT, symbol.to_uppercase());
    debug!(url = %url, "Built Binance price URL");

    let client = reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .timeout(PRICE_TIMEOUT)
        .build()
        .context("Échec de la création du client HTTP")?;

    let response = client
        .get(&url)
        .send()
        .await
        .context("Échec de la requête HTTP vers Binance")?;

    let status = response.status();
    if !status.is_success() {
        anyhow::bail!("Binance a retourné une erreur : HTTP {}", status);
    }

    let body = response
        .text()
        .await
        .context("Échec de la lecture du corps de la réponse")?;

    decode_price_body(&body)
        .with_context(|| format!("Réponse Binance invalide : {}", body.chars().take(120).collect::<String>()))
}

/// Décode le corps JSON et parse le champ "price" (string décimale)
///
/// Fonction pure, séparée pour être testable sans réseau.
fn decode_price_body(body: &str) -> Result<f64> {
    let parsed: PriceResponse =
        serde_json::from_str(body).context("JSON inattendu (champ price manquant ?)")?;

    parsed
        .price
        .trim()
        .parse::<f64>()
        .context("Champ price non numérique")
}

// ============================================================================
// Tests unitaires
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_price_body() {
        let price = decode_price_body(r#"{"symbol":"BTCUSDT","price":"65432.10"}"#).unwrap();
        assert_eq!(price, 65432.10);
    }

    #[test]
    fn test_decode_price_body_extra_precision() {
        let price = decode_price_body(r#"{"price":"0.00001234"}"#).unwrap();
        assert_eq!(price, 0.00001234);
    }

    #[test]
    fn test_decode_price_body_non_numeric_field() {
        // Champ price présent mais pas un nombre : erreur, jamais de panic
        assert!(decode_price_body(r#"{"price":"n/a"}"#).is_err());
    }

    #[test]
    fn test_decode_price_body_missing_field() {
        assert!(decode_price_body(r#"{"symbol":"BTCUSDT"}"#).is_err());
    }

    #[test]
    fn test_decode_price_body_not_json() {
        assert!(decode_price_body("<html>maintenance</html>").is_err());
    }

    // Test async nécessite tokio test runtime
    // CONCEPT RUST : #[tokio::test]
    // - Macro qui setup un runtime tokio pour le test
    // - Permet d'utiliser .await dans les tests
    #[tokio::test]
    async fn test_fetch_price_never_errors() {
        // Avec ou sans connexion, l'appel retourne Some ou None — jamais
        // de panic ni d'erreur propagée (c'est le contrat de l'API)
        match fetch_price("BTCUSDT").await {
            Some(price) => assert!(price > 0.0),
            None => {} // Pas de connexion : indisponible, c'est valide
        }
    }
}
