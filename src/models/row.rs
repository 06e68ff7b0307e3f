// ============================================================================
// Structure : Row
// ============================================================================
// Une ligne normalisée du tableau : un actif crypto et ses six champs
//
// CONCEPTS RUST :
// 1. #[serde(rename = "...")] : le même nom de colonne sert pour le CSV
//    (écriture ET relecture du fichier tableur)
// 2. Copy enums : Column est un petit enum copiable, utilisé comme "clé"
//    pour les fonctions d'analyse
// ============================================================================

use serde::{Deserialize, Serialize};

/// En-têtes des colonnes, dans l'ordre fixe du tableau et du fichier
pub const HEADERS: [&str; 6] = [
    "Name",
    "Symbol",
    "Price (USD)",
    "Market Cap",
    "24h Volume",
    "24h Change (%)",
];

/// Colonnes numériques utilisables comme clé (tri, moyenne, min/max)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    Price,
    MarketCap,
    Volume24h,
    Change24h,
}

impl Column {
    /// Libellé affiché (identique à l'en-tête du fichier)
    pub fn label(&self) -> &'static str {
        match self {
            Column::Price => HEADERS[2],
            Column::MarketCap => HEADERS[3],
            Column::Volume24h => HEADERS[4],
            Column::Change24h => HEADERS[5],
        }
    }
}

/// Un actif normalisé : prix et volumes arrondis à 2 décimales
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Row {
    #[serde(rename = "Name")]
    pub name: String,

    #[serde(rename = "Symbol")]
    pub symbol: String,

    #[serde(rename = "Price (USD)")]
    pub price: f64,

    #[serde(rename = "Market Cap")]
    pub market_cap: f64,

    #[serde(rename = "24h Volume")]
    pub volume_24h: f64,

    #[serde(rename = "24h Change (%)")]
    pub change_24h: f64,
}

impl Row {
    /// Constructeur : arrondit les quatre champs numériques
    ///
    /// CONCEPT RUST : Ownership
    /// - name et symbol sont "moved" dans la Row, pas de copie
    pub fn new(
        name: String,
        symbol: String,
        price: f64,
        market_cap: f64,
        volume_24h: f64,
        change_24h: f64,
    ) -> Self {
        Self {
            name,
            symbol,
            price: round2(price),
            market_cap: round2(market_cap),
            volume_24h: round2(volume_24h),
            change_24h: round2(change_24h),
        }
    }

    /// Valeur de la colonne demandée
    pub fn value(&self, column: Column) -> f64 {
        match column {
            Column::Price => self.price,
            Column::MarketCap => self.market_cap,
            Column::Volume24h => self.volume_24h,
            Column::Change24h => self.change_24h,
        }
    }
}

/// Arrondi à 2 décimales
///
/// Multiplie par 100, arrondit "half away from zero" (f64::round), divise.
/// 50000.005 -> 50000.01, 3000.004 -> 3000.00
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Formate un montant en notation compacte ($1.23T, $400.00B, $12.50M...)
pub fn format_compact(value: f64) -> String {
    let abs = value.abs();
    let (scaled, suffix) = if abs >= 1e12 {
        (value / 1e12, "T")
    } else if abs >= 1e9 {
        (value / 1e9, "B")
    } else if abs >= 1e6 {
        (value / 1e6, "M")
    } else if abs >= 1e3 {
        (value / 1e3, "K")
    } else {
        (value, "")
    };
    format!("{:.2}{}", scaled, suffix)
}

// ============================================================================
// Tests unitaires
// ============================================================================
