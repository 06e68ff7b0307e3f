// ============================================================================
// API Client : CoinMarketCap
// ============================================================================
// Récupère le top 50 des cryptomonnaies (endpoint "listings/latest")
//
// CONCEPTS RUST :
// 1. async/await : requête HTTP non-bloquante
// 2. thiserror : erreurs typées (transport / statut HTTP / JSON invalide)
// 3. Serde : désérialisation JSON automatique et stricte
//
// LIMITE CONNUE : aucun timeout n'est configuré sur la requête. Une requête
// bloquée bloque le cycle en cours (le scheduler reste annulable).
// ============================================================================

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, error, info, instrument};

use super::ListingsSource;
use crate::config::Config;
use crate::models::{Row, Table};

/// Paramètres fixes de la requête : rangs 1 à 50, prix en USD
const QUERY: [(&str, &str); 3] = [("start", "1"), ("limit", "50"), ("convert", "USD")];

/// Header portant la clé API
const API_KEY_HEADER: &str = "X-CMC_PRO_API_KEY";

// ============================================================================
// Erreurs
// ============================================================================

/// Échec d'un fetch : le cycle est sauté, le processus continue
#[derive(Debug, Error)]
pub enum FetchError {
    /// Connexion impossible, requête interrompue, corps illisible
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Statut HTTP hors 2xx
    #[error("HTTP {status}: {message}")]
    Status { status: StatusCode, message: String },

    /// Le JSON ne contient pas les champs attendus
    #[error("malformed response: {0}")]
    Malformed(#[from] serde_json::Error),
}

// ============================================================================
// Structures pour parser la réponse JSON
// ============================================================================
// Seuls les champs utilisés sont déclarés ; serde ignore le reste.
// Un champ manquant ou null fait échouer tout le parsing.
// ============================================================================

#[derive(Debug, Deserialize)]
struct ListingsResponse {
    data: Vec<RawRecord>,
}

/// Un actif tel que renvoyé par l'API
#[derive(Debug, Deserialize)]
struct RawRecord {
    name: String,
    symbol: String,
    quote: RawQuotes,
}

#[derive(Debug, Deserialize)]
struct RawQuotes {
    #[serde(rename = "USD")]
    usd: RawQuote,
}

#[derive(Debug, Deserialize)]
struct RawQuote {
    price: f64,
    market_cap: f64,
    volume_24h: f64,
    percent_change_24h: f64,
}

/// Enveloppe d'erreur de l'API ({"status": {"error_message": "..."}})
#[derive(Debug, Deserialize)]
struct StatusEnvelope {
    status: ApiStatus,
}

#[derive(Debug, Deserialize)]
struct ApiStatus {
    error_message: Option<String>,
}

impl From<RawRecord> for Row {
    fn from(raw: RawRecord) -> Self {
        Row::new(
            raw.name,
            raw.symbol,
            raw.quote.usd.price,
            raw.quote.usd.market_cap,
            raw.quote.usd.volume_24h,
            raw.quote.usd.percent_change_24h,
        )
    }
}

// ============================================================================
// Client
// ============================================================================

/// Client CoinMarketCap, construit une fois avec la configuration
pub struct CoinMarketCapClient {
    client: Client,
    api_url: String,
    api_key: Option<String>,
}

impl CoinMarketCapClient {
    /// Crée le client à partir de la configuration
    pub fn new(config: &Config) -> Result<Self, FetchError> {
        let client = Client::builder()
            .user_agent(concat!("livecrypto/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self::with_client(client, config))
    }

    /// Crée le client avec un reqwest::Client déjà configuré
    pub fn with_client(client: Client, config: &Config) -> Self {
        Self {
            client,
            api_url: config.api_url.clone(),
            api_key: config.api_key.clone(),
        }
    }

    /// Construit la requête GET (headers + paramètres fixes)
    fn build_request(&self) -> Result<reqwest::Request, FetchError> {
        let mut builder = self
            .client
            .get(&self.api_url)
            .header("Accepts", "application/json")
            .query(&QUERY);

        if let Some(key) = &self.api_key {
            builder = builder.header(API_KEY_HEADER, key);
        }

        Ok(builder.build()?)
    }

    /// Récupère et normalise le top 50
    #[instrument(skip(self), fields(url = %self.api_url))]
    pub async fn fetch(&self) -> Result<Table, FetchError> {
        let request = self.build_request()?;
        debug!(url = %request.url(), "Sending listings request");

        let response = self.client.execute(request).await.map_err(|e| {
            error!(error = %e, "Listings request failed");
            FetchError::from(e)
        })?;

        let status = response.status();
        debug!(status = %status, "Received HTTP response");

        let body = response.bytes().await?;

        if !status.is_success() {
            let message = error_message(&body)
                .unwrap_or_else(|| status.canonical_reason().unwrap_or("unknown error").to_string());
            error!(status = %status, message = %message, "CoinMarketCap returned error status");
            return Err(FetchError::Status { status, message });
        }

        let table = parse_listings(&body)?;
        info!(assets = table.len(), "Successfully fetched listings");
        Ok(table)
    }
}

#[async_trait]
impl ListingsSource for CoinMarketCapClient {
    async fn fetch_listings(&self) -> Result<Table, FetchError> {
        self.fetch().await
    }
}

/// Parse le corps JSON et normalise chaque enregistrement
///
/// CONCEPT RUST : Iterators
/// - into_iter() consomme le Vec de RawRecord
/// - map(Row::from) normalise chaque enregistrement
pub fn parse_listings(body: &[u8]) -> Result<Table, FetchError> {
    let response: ListingsResponse = serde_json::from_slice(body).map_err(|e| {
        error!(error = %e, "Malformed listings response");
        FetchError::from(e)
    })?;

    let rows: Vec<Row> = response.data.into_iter().map(Row::from).collect();
    Ok(Table::from_rows(rows))
}

/// Extrait status.error_message d'un corps d'erreur, si présent
fn error_message(body: &[u8]) -> Option<String> {
    serde_json::from_slice::<StatusEnvelope>(body)
        .ok()
        .and_then(|envelope| envelope.status.error_message)
}

// ============================================================================
// Tests unitaires
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RefreshInterval;
    use std::path::PathBuf;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    fn config(api_url: &str, api_key: Option<&str>) -> Config {
        Config {
            api_url: api_url.to_string(),
            api_key: api_key.map(str::to_string),
            output_path: PathBuf::from("unused.csv"),
            refresh: RefreshInterval::default(),
            log_dir: PathBuf::from("./logs"),
        }
    }

    fn record(name: &str, symbol: &str, price: f64, market_cap: f64) -> String {
        format!(
            r#"{{"id": 1, "name": "{}", "symbol": "{}", "cmc_rank": 1,
                "quote": {{"USD": {{"price": {}, "market_cap": {}, "volume_24h": 123.456,
                                    "percent_change_24h": -1.005, "percent_change_7d": 3.0}}}}}}"#,
            name, symbol, price, market_cap
        )
    }

    #[test]
    fn test_parse_listings() {
        let body = format!(
            r#"{{"status": {{"error_code": 0}}, "data": [{}, {}, {}]}}"#,
            record("Bitcoin", "BTC", 50000.005, 1e12),
            record("Ethereum", "ETH", 3000.004, 4e11),
            record("XRP", "XRP", 0.5, 3e10),
        );

        let table = parse_listings(body.as_bytes()).unwrap();

        assert_eq!(table.len(), 3);
        let prices: Vec<f64> = table.iter().map(|r| r.price).collect();
        assert_eq!(prices, vec![50000.01, 3000.0, 0.5]);

        // Toutes les valeurs numériques ont au plus 2 décimales
        for row in &table {
            for value in [row.price, row.market_cap, row.volume_24h, row.change_24h] {
                assert_eq!((value * 100.0).round() / 100.0, value);
            }
        }
    }

    #[test]
    fn test_parse_listings_missing_field() {
        let body = r#"{"data": [{"name": "Bitcoin", "symbol": "BTC",
                        "quote": {"USD": {"price": 1.0, "market_cap": 2.0, "volume_24h": 3.0}}}]}"#;
        let result = parse_listings(body.as_bytes());
        assert!(matches!(result, Err(FetchError::Malformed(_))));
    }

    #[test]
    fn test_parse_listings_null_is_malformed() {
        let body = r#"{"data": [{"name": "Bitcoin", "symbol": "BTC",
                        "quote": {"USD": {"price": null, "market_cap": 2.0,
                                          "volume_24h": 3.0, "percent_change_24h": 4.0}}}]}"#;
        assert!(matches!(parse_listings(body.as_bytes()), Err(FetchError::Malformed(_))));
    }

    #[test]
    fn test_parse_listings_empty_data() {
        let table = parse_listings(br#"{"data": []}"#).unwrap();
        assert!(table.is_empty());
    }

    #[test]
    fn test_error_message_from_body() {
        let body = br#"{"status": {"error_code": 1002, "error_message": "API key missing."}}"#;
        assert_eq!(error_message(body).as_deref(), Some("API key missing."));
        assert_eq!(error_message(b"<html>oops</html>"), None);
    }

    #[test]
    fn test_build_request() {
        let client = CoinMarketCapClient::new(&config(
            "https://pro-api.coinmarketcap.com/v1/cryptocurrency/listings/latest",
            Some("secret"),
        ))
        .unwrap();

        let request = client.build_request().unwrap();
        let url = request.url().as_str();
        assert!(url.contains("start=1"));
        assert!(url.contains("limit=50"));
        assert!(url.contains("convert=USD"));
        assert_eq!(request.headers()["Accepts"], "application/json");
        assert_eq!(request.headers()[API_KEY_HEADER], "secret");
    }

    #[test]
    fn test_build_request_without_key() {
        let client = CoinMarketCapClient::new(&config("http://localhost/listings", None)).unwrap();
        let request = client.build_request().unwrap();
        assert!(request.headers().get(API_KEY_HEADER).is_none());
    }

    /// Serveur HTTP local qui répond une seule fois, puis ferme
    async fn serve_once(status_line: &str, body: &str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}/listings", listener.local_addr().unwrap());
        let response = format!(
            "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            status_line,
            body.len(),
            body
        );

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = [0u8; 4096];
            let _ = socket.read(&mut request).await.unwrap();
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.unwrap();
        });

        url
    }

    fn local_client(url: &str, api_key: Option<&str>) -> CoinMarketCapClient {
        let http = Client::builder().no_proxy().build().unwrap();
        CoinMarketCapClient::with_client(http, &config(url, api_key))
    }

    #[tokio::test]
    async fn test_fetch_error_status_uses_api_message() {
        let url = serve_once(
            "401 Unauthorized",
            r#"{"status": {"error_code": 1002, "error_message": "API key missing."}}"#,
        )
        .await;

        match local_client(&url, None).fetch().await {
            Err(FetchError::Status { status, message }) => {
                assert_eq!(status, StatusCode::UNAUTHORIZED);
                assert_eq!(message, "API key missing.");
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_fetch_error_status_without_api_message() {
        let url = serve_once("500 Internal Server Error", "<html>oops</html>").await;

        match local_client(&url, None).fetch().await {
            Err(FetchError::Status { status, message }) => {
                assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
                assert_eq!(message, "Internal Server Error");
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_fetch_success_over_http() {
        let body = format!(r#"{{"data": [{}]}}"#, record("Bitcoin", "BTC", 50000.005, 1e12));
        let url = serve_once("200 OK", &body).await;

        let table = local_client(&url, Some("secret")).fetch().await.unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table.rows()[0].symbol, "BTC");
    }

    #[tokio::test]
    async fn test_fetch_transport_failure() {
        // Port 1 : rien n'écoute, connexion refusée
        // no_proxy : un proxy système répondrait à la place du serveur
        let http = Client::builder().no_proxy().build().unwrap();
        let client = CoinMarketCapClient::with_client(http, &config("http://127.0.0.1:1/listings", None));

        let result = client.fetch().await;
        assert!(matches!(result, Err(FetchError::Transport(_))));
    }
}
