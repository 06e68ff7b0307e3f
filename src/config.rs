// ============================================================================
// Configuration
// ============================================================================
// Créée une seule fois au démarrage, en lecture seule ensuite.
// Passée explicitement au client API (pas d'état global).
//
// Sources, dans l'ordre :
// 1. fichier .env (optionnel, chargé par dotenvy)
// 2. variables d'environnement
// 3. valeurs par défaut
// ============================================================================

use std::io;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};

/// Endpoint CoinMarketCap des listings
pub const DEFAULT_API_URL: &str =
    "https://pro-api.coinmarketcap.com/v1/cryptocurrency/listings/latest";

/// Fichier tableur écrasé à chaque cycle
pub const DEFAULT_OUTPUT_FILE: &str = "live_crypto_data.csv";

const API_KEY_ENV_VAR: &str = "API_KEY";
const API_URL_ENV_VAR: &str = "LIVECRYPTO_API_URL";
const OUTPUT_ENV_VAR: &str = "LIVECRYPTO_OUTPUT";
const REFRESH_ENV_VAR: &str = "LIVECRYPTO_REFRESH_SECS";
const LOG_DIR_ENV_VAR: &str = "LIVECRYPTO_LOG_DIR";

// ============================================================================
// RefreshInterval : le "slider" de l'intervalle de rafraîchissement
// ============================================================================

/// Intervalle de rafraîchissement borné (60 à 300 s, pas de 30 s)
///
/// CONCEPT RUST : Newtype pattern
/// - Un u64 enveloppé dans un type dédié
/// - Impossible de construire une valeur hors bornes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshInterval(u64);

impl RefreshInterval {
    pub const MIN_SECS: u64 = 60;
    pub const MAX_SECS: u64 = 300;
    pub const STEP_SECS: u64 = 30;
    pub const DEFAULT_SECS: u64 = 300;

    /// Borne la valeur puis l'aligne sur le pas le plus proche
    pub fn new(secs: u64) -> Self {
        let clamped = secs.clamp(Self::MIN_SECS, Self::MAX_SECS);
        let steps = (clamped - Self::MIN_SECS + Self::STEP_SECS / 2) / Self::STEP_SECS;
        let snapped = Self::MIN_SECS + steps * Self::STEP_SECS;
        Self(snapped.min(Self::MAX_SECS))
    }

    pub fn secs(&self) -> u64 {
        self.0
    }

    pub fn as_duration(&self) -> Duration {
        Duration::from_secs(self.0)
    }

    /// Un cran de plus (sature à MAX_SECS)
    pub fn increase(&self) -> Self {
        Self::new(self.0 + Self::STEP_SECS)
    }

    /// Un cran de moins (sature à MIN_SECS)
    pub fn decrease(&self) -> Self {
        Self::new(self.0.saturating_sub(Self::STEP_SECS))
    }

    /// Position dans la plage, entre 0.0 et 1.0 (pour la jauge)
    pub fn ratio(&self) -> f64 {
        (self.0 - Self::MIN_SECS) as f64 / (Self::MAX_SECS - Self::MIN_SECS) as f64
    }
}

impl Default for RefreshInterval {
    fn default() -> Self {
        Self(Self::DEFAULT_SECS)
    }
}

// ============================================================================
// Config
// ============================================================================

/// Configuration de l'application
#[derive(Debug, Clone)]
pub struct Config {
    /// URL de l'endpoint listings
    pub api_url: String,

    /// Clé API CoinMarketCap (None : requêtes non authentifiées)
    pub api_key: Option<String>,

    /// Chemin du fichier tableur
    pub output_path: PathBuf,

    /// Intervalle de rafraîchissement initial
    pub refresh: RefreshInterval,

    /// Répertoire des logs
    pub log_dir: PathBuf,
}

impl Config {
    /// Charge la configuration depuis .env et l'environnement
    pub fn from_env() -> Result<Self> {
        check_dotenv(dotenvy::dotenv())?;
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Construit la configuration depuis une fonction de lookup
    ///
    /// CONCEPT RUST : Generics avec trait bound Fn
    /// - Permet de tester sans toucher aux vraies variables d'environnement
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = lookup(API_KEY_ENV_VAR)
            .map(|key| key.trim().to_string())
            .filter(|key| !key.is_empty());

        let api_url = lookup(API_URL_ENV_VAR).unwrap_or_else(|| DEFAULT_API_URL.to_string());

        let output_path = lookup(OUTPUT_ENV_VAR)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_FILE));

        let refresh = match lookup(REFRESH_ENV_VAR) {
            Some(raw) => {
                let secs: u64 = raw
                    .trim()
                    .parse()
                    .with_context(|| format!("{} invalide : {:?}", REFRESH_ENV_VAR, raw))?;
                RefreshInterval::new(secs)
            }
            None => RefreshInterval::default(),
        };

        let log_dir = lookup(LOG_DIR_ENV_VAR)
            .map(PathBuf::from)
            .unwrap_or_else(default_log_dir);

        Ok(Self {
            api_url,
            api_key,
            output_path,
            refresh,
            log_dir,
        })
    }
}

/// Un .env absent n'est pas une erreur, un .env illisible ou mal formé si
fn check_dotenv<T>(result: Result<T, dotenvy::Error>) -> Result<()> {
    match result {
        Ok(_) => Ok(()),
        Err(dotenvy::Error::Io(e)) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e).context("Fichier .env invalide"),
    }
}

/// Répertoire de logs par défaut
///
/// - Linux/WSL : ~/.local/share/livecrypto/logs
/// - macOS : ~/Library/Application Support/livecrypto/logs
/// - Windows : C:\Users\<user>\AppData\Local\livecrypto\logs
/// - sinon : ./logs
fn default_log_dir() -> PathBuf {
    dirs::data_local_dir()
        .map(|dir| dir.join("livecrypto").join("logs"))
        .unwrap_or_else(|| PathBuf::from("./logs"))
}

// ============================================================================
// Tests unitaires
// ============================================================================
