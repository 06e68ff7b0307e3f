// ============================================================================
// Module : api
// ============================================================================
// Clients API pour récupérer les données de marché
// ============================================================================

pub mod coinmarketcap; // Client API CoinMarketCap

use async_trait::async_trait;

use crate::models::Table;

pub use coinmarketcap::{parse_listings, CoinMarketCapClient, FetchError};

/// Source des listings : le vrai client, ou une source en mémoire (tests)
///
/// CONCEPT RUST : Trait comme point d'injection
/// - Le cycle de polling est générique sur la source
/// - Send + Sync : la source vit dans le thread worker
#[async_trait]
pub trait ListingsSource: Send + Sync {
    /// Un snapshot du top 50, ou une erreur typée
    async fn fetch_listings(&self) -> Result<Table, FetchError>;
}
