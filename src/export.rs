// ============================================================================
// Export tableur (CSV)
// ============================================================================
// Le tableau complet est écrit dans un fichier au nom fixe, écrasé à chaque
// cycle réussi (jamais ajouté en fin de fichier).
// Colonnes, dans l'ordre : Name, Symbol, Price (USD), Market Cap,
//                          24h Volume, 24h Change (%)
//
// CONCEPT RUST : Serde + csv
// - Row dérive Serialize/Deserialize avec les noms de colonnes
// - csv::Writer écrit l'en-tête automatiquement à partir des noms serde
// ============================================================================

use std::path::Path;

use anyhow::{bail, Context, Result};
use tracing::{debug, info};

use crate::models::{Row, Table, HEADERS};

/// Écrase `path` avec le contenu de la Table
pub fn write_table(path: &Path, table: &Table) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Échec de la création du répertoire {}", parent.display()))?;
    }

    // File::create tronque le fichier existant
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("Échec de l'ouverture de {}", path.display()))?;

    if table.is_empty() {
        // serialize() n'écrit l'en-tête qu'avec la première ligne
        writer.write_record(HEADERS)?;
    }

    for row in table {
        writer
            .serialize(row)
            .with_context(|| format!("Échec de l'écriture de {}", row.symbol))?;
    }

    writer.flush().context("Échec du flush du fichier tableur")?;

    info!(path = %path.display(), rows = table.len(), "Table exported");
    Ok(())
}

/// Relit un fichier écrit par `write_table`
///
/// Vérifie que l'en-tête est exactement celui attendu (même ordre).
pub fn read_table(path: &Path) -> Result<Table> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("Échec de l'ouverture de {}", path.display()))?;

    let headers = reader.headers().context("En-tête CSV illisible")?.clone();
    if headers.iter().ne(HEADERS.iter().copied()) {
        bail!("En-tête inattendu dans {} : {:?}", path.display(), headers);
    }

    let mut rows = Vec::new();
    for record in reader.deserialize::<Row>() {
        rows.push(record.context("Ligne CSV invalide")?);
    }

    debug!(path = %path.display(), rows = rows.len(), "Table read back");
    Ok(Table::from_rows(rows))
}

// ============================================================================
// Tests unitaires
// ============================================================================
