// ============================================================================
// Module : models
// ============================================================================
// Ce module contient toutes les structures de données de l'application
//
// CONCEPT RUST : Modules et visibilité
// - "pub mod" : déclare un sous-module publique (accessible depuis l'extérieur)
// - Sans "pub", le module serait privé au crate
// ============================================================================

pub mod row;   // Une ligne normalisée (un actif)
pub mod table; // Le tableau complet d'un snapshot

// Re-export des structures principales pour simplifier les imports
// Au lieu de : use livecrypto::models::row::Row;
// On peut faire : use livecrypto::models::Row;
pub use row::{format_compact, round2, Column, Row, HEADERS};
pub use table::Table;
