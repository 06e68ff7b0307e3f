// ============================================================================
// livecrypto - Library
// ============================================================================
// Expose les modules publics pour le binaire et les tests
// ============================================================================

pub mod analytics; // Top N, statistiques, histogramme, boîte à moustaches
pub mod api;       // API CoinMarketCap
pub mod app;       // État de l'application
pub mod charts;    // Les 7 graphiques (buffers ratatui)
pub mod config;    // Configuration (.env, variables d'environnement)
pub mod export;    // Export CSV
pub mod models;    // Structures de données
pub mod poller;    // Cycle de rafraîchissement + scheduler
pub mod ui;        // Interface utilisateur
