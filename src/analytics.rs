// ============================================================================
// Analytics : statistiques descriptives sur une Table
// ============================================================================
// Fonctions pures, recalculées à chaque cycle :
// - top N par colonne (tri stable, décroissant)
// - moyenne / max / min d'une colonne (None si la Table est vide)
// - séries dérivées pour les graphiques : histogramme, boîte à moustaches,
//   parts en pourcentage
// ============================================================================

use crate::models::{Column, Table};

/// Nombre de lignes du sous-tableau "top"
pub const TOP_N: usize = 5;

/// Les N lignes avec la plus grande valeur de `key`
///
/// CONCEPT RUST : sort_by est stable
/// - Deux lignes égales gardent leur ordre d'origine (rang API)
/// - total_cmp : ordre total sur f64, pas de unwrap sur partial_cmp
pub fn top_n(table: &Table, n: usize, key: Column) -> Table {
    let mut rows = table.rows().to_vec();
    rows.sort_by(|a, b| b.value(key).total_cmp(&a.value(key)));
    rows.truncate(n);
    Table::from_rows(rows)
}

/// Moyenne arithmétique de `key`
pub fn mean(table: &Table, key: Column) -> Option<f64> {
    if table.is_empty() {
        return None;
    }
    let sum: f64 = table.iter().map(|row| row.value(key)).sum();
    Some(sum / table.len() as f64)
}

/// Maximum de `key`
pub fn max(table: &Table, key: Column) -> Option<f64> {
    table.iter().map(|row| row.value(key)).reduce(f64::max)
}

/// Minimum de `key`
pub fn min(table: &Table, key: Column) -> Option<f64> {
    table.iter().map(|row| row.value(key)).reduce(f64::min)
}

// ============================================================================
// Summary : les quatre résumés affichés dans le bloc "Analysis"
// ============================================================================

/// Résumé d'un snapshot (lecture seule)
#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    /// Top 5 par capitalisation
    pub top5: Table,

    /// Prix moyen (USD)
    pub mean_price: Option<f64>,

    /// Plus forte variation 24h (%)
    pub highest_change: Option<f64>,

    /// Plus faible variation 24h (%)
    pub lowest_change: Option<f64>,
}

impl Summary {
    pub fn compute(table: &Table) -> Self {
        Self {
            top5: top_n(table, TOP_N, Column::MarketCap),
            mean_price: mean(table, Column::Price),
            highest_change: max(table, Column::Change24h),
            lowest_change: min(table, Column::Change24h),
        }
    }

    /// Les trois lignes de statistiques, au format d'affichage
    pub fn stat_lines(&self) -> [String; 3] {
        [
            format!(
                "Average Price of Top 50 Cryptocurrencies: {}",
                self.mean_price
                    .map(|v| format!("${:.2}", v))
                    .unwrap_or_else(|| "N/A".to_string())
            ),
            format!(
                "Highest 24h Percentage Change: {}",
                format_percent(self.highest_change)
            ),
            format!(
                "Lowest 24h Percentage Change: {}",
                format_percent(self.lowest_change)
            ),
        ]
    }
}

fn format_percent(value: Option<f64>) -> String {
    value
        .map(|v| format!("{:.2}%", v))
        .unwrap_or_else(|| "N/A".to_string())
}

// ============================================================================
// Séries pour les graphiques
// ============================================================================

/// Une classe d'histogramme [lower, upper)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bin {
    pub lower: f64,
    pub upper: f64,
    pub count: u64,
}

/// Histogramme à classes de largeur égale entre min et max
///
/// - la dernière classe est fermée à droite (le max y tombe)
/// - si toutes les valeurs sont égales, la plage est élargie de ±0.5
pub fn histogram(values: &[f64], bins: usize) -> Vec<Bin> {
    if values.is_empty() || bins == 0 {
        return Vec::new();
    }

    let (mut lo, mut hi) = values
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)));
    if lo == hi {
        lo -= 0.5;
        hi += 0.5;
    }

    let width = (hi - lo) / bins as f64;
    let mut result: Vec<Bin> = (0..bins)
        .map(|i| Bin {
            lower: lo + width * i as f64,
            upper: if i + 1 == bins { hi } else { lo + width * (i + 1) as f64 },
            count: 0,
        })
        .collect();

    for &v in values {
        let index = (((v - lo) / width) as usize).min(bins - 1);
        result[index].count += 1;
    }

    result
}

/// Statistiques d'une boîte à moustaches
#[derive(Debug, Clone, PartialEq)]
pub struct BoxStats {
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    /// Plus petite valeur >= q1 - 1.5 * IQR
    pub whisker_low: f64,
    /// Plus grande valeur <= q3 + 1.5 * IQR
    pub whisker_high: f64,
    pub outliers: Vec<f64>,
}

/// Quartiles (interpolation linéaire) et moustaches à 1.5 * IQR
pub fn box_stats(values: &[f64]) -> Option<BoxStats> {
    if values.is_empty() {
        return None;
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    let q1 = quantile(&sorted, 0.25);
    let median = quantile(&sorted, 0.5);
    let q3 = quantile(&sorted, 0.75);
    let iqr = q3 - q1;
    let low_fence = q1 - 1.5 * iqr;
    let high_fence = q3 + 1.5 * iqr;

    let inside: Vec<f64> = sorted
        .iter()
        .copied()
        .filter(|&v| v >= low_fence && v <= high_fence)
        .collect();
    let outliers: Vec<f64> = sorted
        .iter()
        .copied()
        .filter(|&v| v < low_fence || v > high_fence)
        .collect();

    Some(BoxStats {
        q1,
        median,
        q3,
        whisker_low: inside.first().copied().unwrap_or(q1),
        whisker_high: inside.last().copied().unwrap_or(q3),
        outliers,
    })
}

/// Quantile par interpolation linéaire sur une slice triée non vide
fn quantile(sorted: &[f64], q: f64) -> f64 {
    let position = q * (sorted.len() - 1) as f64;
    let lower = position.floor() as usize;
    let upper = position.ceil() as usize;
    let fraction = position - lower as f64;
    sorted[lower] + (sorted[upper] - sorted[lower]) * fraction
}

/// Part de chaque valeur dans le total, en pourcentage
pub fn shares(values: &[f64]) -> Vec<f64> {
    let total: f64 = values.iter().sum();
    if total <= 0.0 {
        return vec![0.0; values.len()];
    }
    values.iter().map(|v| v / total * 100.0).collect()
}

// ============================================================================
// Tests unitaires
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Row;

    fn row(symbol: &str, price: f64, market_cap: f64, change: f64) -> Row {
        Row::new(symbol.to_string(), symbol.to_string(), price, market_cap, 0.0, change)
    }

    fn sample() -> Table {
        Table::from_rows(vec![
            row("AAA", 1.0, 10.0, 5.0),
            row("BBB", 2.0, 30.0, -3.0),
            row("CCC", 3.0, 20.0, 1.0),
            row("DDD", 4.0, 30.0, 0.5),
            row("EEE", 5.0, 5.0, 2.0),
            row("FFF", 6.0, 50.0, -1.0),
        ])
    }

    fn symbols(table: &Table) -> Vec<&str> {
        table.iter().map(|r| r.symbol.as_str()).collect()
    }

    #[test]
    fn test_top_n_descending_and_stable() {
        let top = top_n(&sample(), 5, Column::MarketCap);

        // BBB et DDD ont la même capitalisation : l'ordre d'origine est conservé
        assert_eq!(symbols(&top), vec!["FFF", "BBB", "DDD", "CCC", "AAA"]);

        let caps = top.column(Column::MarketCap);
        assert!(caps.windows(2).all(|w| w[0] >= w[1]));
    }

    #[test]
    fn test_top_n_short_table() {
        let table = Table::from_rows(vec![row("X", 1.0, 1.0, 0.0), row("Y", 1.0, 1.0, 0.0)]);
        let top = top_n(&table, 5, Column::MarketCap);
        assert_eq!(symbols(&top), vec!["X", "Y"]);

        assert!(top_n(&Table::new(), 5, Column::MarketCap).is_empty());
    }

    #[test]
    fn test_mean_max_min() {
        let table = Table::from_rows(vec![
            row("A", 1.0, 1.0, -2.5),
            row("B", 2.0, 1.0, 4.0),
            row("C", 3.0, 1.0, 0.0),
        ]);

        assert_eq!(mean(&table, Column::Price), Some(2.0));
        assert_eq!(max(&table, Column::Change24h), Some(4.0));
        assert_eq!(min(&table, Column::Change24h), Some(-2.5));
    }

    #[test]
    fn test_empty_table_statistics() {
        let table = Table::new();
        assert_eq!(mean(&table, Column::Price), None);
        assert_eq!(max(&table, Column::Change24h), None);
        assert_eq!(min(&table, Column::Change24h), None);

        let summary = Summary::compute(&table);
        assert!(summary.top5.is_empty());
        assert_eq!(summary.stat_lines()[0], "Average Price of Top 50 Cryptocurrencies: N/A");
    }

    #[test]
    fn test_summary_stat_lines() {
        let summary = Summary::compute(&sample());

        assert_eq!(summary.top5.len(), 5);
        assert_eq!(
            summary.stat_lines(),
            [
                "Average Price of Top 50 Cryptocurrencies: $3.50".to_string(),
                "Highest 24h Percentage Change: 5.00%".to_string(),
                "Lowest 24h Percentage Change: -3.00%".to_string(),
            ]
        );
    }

    #[test]
    fn test_histogram() {
        let bins = histogram(&[0.0, 1.0, 2.0, 10.0], 10);

        assert_eq!(bins.len(), 10);
        assert_eq!(bins[0].lower, 0.0);
        assert_eq!(bins[9].upper, 10.0);
        assert_eq!(bins[0].count, 1);
        assert_eq!(bins[1].count, 1);
        assert_eq!(bins[2].count, 1);
        // Le maximum tombe dans la dernière classe
        assert_eq!(bins[9].count, 1);
        assert_eq!(bins.iter().map(|b| b.count).sum::<u64>(), 4);
    }

    #[test]
    fn test_histogram_constant_values() {
        let bins = histogram(&[2.0, 2.0], 10);
        assert_eq!(bins[0].lower, 1.5);
        assert_eq!(bins[9].upper, 2.5);
        assert_eq!(bins.iter().map(|b| b.count).sum::<u64>(), 2);
        assert!(histogram(&[], 10).is_empty());
    }

    #[test]
    fn test_box_stats() {
        let stats = box_stats(&[1.0, 2.0, 3.0, 4.0, 100.0]).unwrap();

        assert_eq!(stats.q1, 2.0);
        assert_eq!(stats.median, 3.0);
        assert_eq!(stats.q3, 4.0);
        assert_eq!(stats.whisker_low, 1.0);
        assert_eq!(stats.whisker_high, 4.0);
        assert_eq!(stats.outliers, vec![100.0]);

        assert_eq!(box_stats(&[]), None);
    }

    #[test]
    fn test_box_stats_interpolation() {
        let stats = box_stats(&[4.0, 1.0, 3.0, 2.0]).unwrap();
        assert_eq!(stats.q1, 1.75);
        assert_eq!(stats.median, 2.5);
        assert_eq!(stats.q3, 3.25);
        assert!(stats.outliers.is_empty());
    }

    #[test]
    fn test_shares() {
        assert_eq!(shares(&[1.0, 3.0]), vec![25.0, 75.0]);
        assert_eq!(shares(&[0.0, 0.0]), vec![0.0, 0.0]);
    }
}
