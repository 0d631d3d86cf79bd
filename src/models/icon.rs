// ============================================================================
// Structure : Icon
// ============================================================================
// Badge de coin affiché dans le terminal : une lettre sur un fond coloré.
//
// Un terminal ne peut pas afficher le PNG d'un logo pixel par pixel : le
// badge en tient lieu. La couleur de fond est dérivée d'un checksum CRC32
// des octets d'artwork téléchargés, donc stable d'un lancement (et d'une
// machine) à l'autre pour un même logo. Sans artwork, le badge de repli
// est gris avec la première lettre du symbole ("?" si vide).
// ============================================================================

/// Couleur du badge de repli (gris neutre)
const PLACEHOLDER_RGB: (u8, u8, u8) = (60, 60, 60);

/// Badge d'un coin : lettre + couleur de fond
#[derive(Debug, Clone, PartialEq)]
pub struct Icon {
    /// Première lettre du symbole de base, en majuscule ('?' si vide)
    pub letter: char,

    /// Couleur de fond du badge
    pub rgb: (u8, u8, u8),

    /// true si aucun artwork n'a pu être obtenu (badge de repli)
    pub placeholder: bool,
}

impl Icon {
    /// Construit un badge depuis les octets d'artwork d'un logo
    ///
    /// CONCEPT : dérivation déterministe
    /// - crc32fast::hash(bytes) donne une empreinte stable des octets
    /// - L'empreinte est convertie en teinte : même logo => même couleur
    pub fn from_artwork(base_symbol: &str, bytes: &[u8]) -> Self {
        let checksum = crc32fast::hash(bytes);
        Self {
            letter: first_letter(base_symbol),
            rgb: color_from_checksum(checksum),
            placeholder: false,
        }
    }

    /// Construit le badge de repli (aucun artwork disponible)
    ///
    /// Valide pour n'importe quelle entrée, y compris la chaîne vide :
    /// la lettre devient alors '?'.
    pub fn placeholder(base_symbol: &str) -> Self {
        Self {
            letter: first_letter(base_symbol),
            rgb: PLACEHOLDER_RGB,
            placeholder: true,
        }
    }
}

/// Première lettre majuscule d'un symbole, '?' si la chaîne est vide
fn first_letter(symbol: &str) -> char {
    symbol
        .chars()
        .next()
        .map(|c| c.to_ascii_uppercase())
        .unwrap_or('?')
}

/// Convertit un checksum en couleur RGB saturée
///
/// Teinte issue du checksum, saturation et luminosité fixes : toutes les
/// couleurs produites restent lisibles sous une lettre blanche.
fn color_from_checksum(checksum: u32) -> (u8, u8, u8) {
    let hue = (checksum % 360) as f64;
    hsv_to_rgb(hue, 0.55, 0.80)
}

/// Conversion HSV -> RGB classique (h en degrés, s et v dans [0, 1])
fn hsv_to_rgb(h: f64, s: f64, v: f64) -> (u8, u8, u8) {
    let c = v * s;
    let x = c * (1.0 - ((h / 60.0) % 2.0 - 1.0).abs());
    let m = v - c;

    let (r, g, b) = match h as u32 {
        0..=59 => (c, x, 0.0),
        60..=119 => (x, c, 0.0),
        120..=179 => (0.0, c, x),
        180..=239 => (0.0, x, c),
        240..=299 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };

    (
        ((r + m) * 255.0).round() as u8,
        ((g + m) * 255.0).round() as u8,
        ((b + m) * 255.0).round() as u8,
    )
}

// ============================================================================
// Tests unitaires
// ============================================================================
