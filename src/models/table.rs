// ============================================================================
// Structure : Table
// ============================================================================
// Collection ordonnée de Rows pour un snapshot (un cycle de rafraîchissement)
//
// INVARIANTS :
// - l'ordre des lignes suit l'ordre de la réponse API (rang)
// - un symbole n'apparaît qu'une seule fois
// - une Table n'est jamais fusionnée avec celle du cycle précédent
// ============================================================================

use std::collections::HashSet;

use tracing::warn;

use super::row::Row;

/// Tableau ordonné d'actifs, unique par symbole
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    rows: Vec<Row>,
}

impl Table {
    /// Crée une Table vide
    pub fn new() -> Self {
        Self { rows: Vec::new() }
    }

    /// Construit une Table à partir de lignes déjà normalisées
    ///
    /// Si un symbole apparaît plusieurs fois, la première occurrence gagne
    /// et les suivantes sont ignorées (avec un warning).
    pub fn from_rows(rows: Vec<Row>) -> Self {
        let mut seen = HashSet::new();
        let mut kept = Vec::with_capacity(rows.len());

        for row in rows {
            if seen.insert(row.symbol.clone()) {
                kept.push(row);
            } else {
                warn!(symbol = %row.symbol, name = %row.name, "Duplicate symbol dropped from snapshot");
            }
        }

        Self { rows: kept }
    }

    /// Accès en lecture seule aux lignes
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Itérateur sur les lignes
    pub fn iter(&self) -> std::slice::Iter<'_, Row> {
        self.rows.iter()
    }

    /// Valeurs d'une colonne numérique, dans l'ordre des lignes
    pub fn column(&self, column: super::row::Column) -> Vec<f64> {
        self.rows.iter().map(|row| row.value(column)).collect()
    }
}

// CONCEPT RUST : IntoIterator pour &Table
// - Permet d'écrire `for row in &table { ... }`
impl<'a> IntoIterator for &'a Table {
    type Item = &'a Row;
    type IntoIter = std::slice::Iter<'a, Row>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Column;

    fn row(symbol: &str, price: f64) -> Row {
        Row::new(symbol.to_string(), symbol.to_string(), price, 1.0, 1.0, 0.0)
    }

    #[test]
    fn test_from_rows_keeps_order() {
        let table = Table::from_rows(vec![row("BTC", 3.0), row("ETH", 2.0), row("XRP", 1.0)]);

        let symbols: Vec<&str> = table.iter().map(|r| r.symbol.as_str()).collect();
        assert_eq!(symbols, vec!["BTC", "ETH", "XRP"]);
        assert_eq!(table.column(Column::Price), vec![3.0, 2.0, 1.0]);
    }

    #[test]
    fn test_from_rows_drops_duplicate_symbols() {
        let table = Table::from_rows(vec![row("BTC", 3.0), row("BTC", 9.0), row("ETH", 2.0)]);

        assert_eq!(table.len(), 2);
        assert_eq!(table.rows()[0].price, 3.0);
    }

    #[test]
    fn test_empty_table() {
        let table = Table::new();
        assert!(table.is_empty());
        assert_eq!(table, Table::default());
    }
}
