// ============================================================================
// Poller : un cycle de rafraîchissement + le scheduler périodique
// ============================================================================
// Un cycle = fetch -> analyse -> export tableur -> graphiques.
// Tout est séquentiel à l'intérieur d'un cycle.
//
// Le scheduler enchaîne les cycles et attend entre deux :
// - l'intervalle est relu à chaque itération (watch channel)
// - "refresh now" réveille l'attente (Notify)
// - l'annulation (CancellationToken) arrête tout, même un fetch en cours
//
// CONCEPT RUST : Enum comme résultat tagué
// - CycleOutcome distingue "données", "aucune donnée" et "échec"
// - impossible de confondre une Table vide avec une erreur réseau
// ============================================================================

use std::path::PathBuf;
use std::sync::{mpsc, Arc};

use chrono::{DateTime, Local};
use tokio::sync::{watch, Notify};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::analytics::Summary;
use crate::api::{FetchError, ListingsSource};
use crate::charts::{self, ChartImage};
use crate::config::RefreshInterval;
use crate::export;
use crate::models::Table;

// ============================================================================
// Résultats d'un cycle
// ============================================================================

/// Résultat de l'écriture du fichier tableur
#[derive(Debug, Clone, PartialEq)]
pub enum ExportStatus {
    Saved(PathBuf),
    Failed(String),
}

/// Tout ce qu'un cycle réussi a produit
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub table: Table,
    pub summary: Summary,
    pub charts: Vec<ChartImage>,
    pub export: ExportStatus,
    pub fetched_at: DateTime<Local>,
}

/// Résultat d'un cycle
#[derive(Debug)]
pub enum CycleOutcome {
    /// Données reçues, analysées, exportées et tracées
    Updated(Box<Snapshot>),

    /// L'API a répondu avec zéro actif : rien à afficher
    NoData,

    /// Le fetch a échoué : rien n'est écrit ni tracé
    Failed(FetchError),
}

// ============================================================================
// Poller
// ============================================================================

/// Exécute un cycle complet sur une source de listings
pub struct Poller<S> {
    source: S,
    output_path: PathBuf,
}

impl<S: ListingsSource> Poller<S> {
    pub fn new(source: S, output_path: PathBuf) -> Self {
        Self { source, output_path }
    }

    /// Un cycle : fetch -> résumé -> export -> graphiques
    pub async fn run_cycle(&self) -> CycleOutcome {
        debug!("Starting refresh cycle");

        let table = match self.source.fetch_listings().await {
            Ok(table) => table,
            Err(e) => {
                error!(error = %e, "Fetch failed, skipping this cycle");
                return CycleOutcome::Failed(e);
            }
        };

        if table.is_empty() {
            warn!("API returned no assets, nothing to display this cycle");
            return CycleOutcome::NoData;
        }

        let summary = Summary::compute(&table);

        let export = match export::write_table(&self.output_path, &table) {
            Ok(()) => ExportStatus::Saved(self.output_path.clone()),
            Err(e) => {
                error!(error = ?e, path = %self.output_path.display(), "Export failed");
                ExportStatus::Failed(format!("{:#}", e))
            }
        };

        let charts = charts::render(&summary.top5);

        info!(assets = table.len(), charts = charts.len(), "Refresh cycle complete");

        CycleOutcome::Updated(Box::new(Snapshot {
            table,
            summary,
            charts,
            export,
            fetched_at: Local::now(),
        }))
    }
}

// ============================================================================
// Scheduler
// ============================================================================

/// Contrôles du scheduler, côté worker
pub struct Schedule {
    pub interval: watch::Receiver<RefreshInterval>,
    pub refresh_now: Arc<Notify>,
    pub cancel: CancellationToken,
}

/// Contrôles du scheduler, côté UI
pub struct ScheduleHandle {
    interval: watch::Sender<RefreshInterval>,
    refresh_now: Arc<Notify>,
    cancel: CancellationToken,
}

impl ScheduleHandle {
    /// Crée la paire (handle UI, schedule worker)
    pub fn new(initial: RefreshInterval) -> (Self, Schedule) {
        let (interval_tx, interval_rx) = watch::channel(initial);
        let refresh_now = Arc::new(Notify::new());
        let cancel = CancellationToken::new();

        let handle = Self {
            interval: interval_tx,
            refresh_now: refresh_now.clone(),
            cancel: cancel.clone(),
        };
        let schedule = Schedule {
            interval: interval_rx,
            refresh_now,
            cancel,
        };
        (handle, schedule)
    }

    /// Nouvel intervalle, pris en compte à la prochaine attente
    pub fn set_interval(&self, interval: RefreshInterval) {
        // send() n'échoue que si le worker est parti
        let _ = self.interval.send(interval);
    }

    /// Réveille le scheduler pour un cycle immédiat
    ///
    /// Sans effet pendant un cycle : notify_waiters ne réveille que
    /// l'attente en cours et ne laisse aucun permis derrière lui.
    pub fn refresh_now(&self) {
        self.refresh_now.notify_waiters();
    }

    /// Arrête le scheduler
    pub fn cancel(&self) {
        self.cancel.cancel();
    }
}

/// Boucle périodique : cycle, envoi du résultat, attente
///
/// S'arrête sur annulation ou quand le récepteur des résultats a disparu.
pub async fn run<S: ListingsSource>(
    poller: &Poller<S>,
    schedule: Schedule,
    reports: mpsc::Sender<CycleOutcome>,
) {
    let Schedule {
        mut interval,
        refresh_now,
        cancel,
    } = schedule;

    info!("Scheduler started");

    'cycles: loop {
        let outcome = tokio::select! {
            _ = cancel.cancelled() => break,
            outcome = poller.run_cycle() => outcome,
        };

        if reports.send(outcome).is_err() {
            info!("Report receiver dropped, stopping scheduler");
            break;
        }

        // L'échéance est recalculée si l'intervalle change pendant l'attente
        let wait_started = Instant::now();
        // Une seule inscription pour toute l'attente : un changement
        // d'intervalle ne fait pas perdre une demande de rafraîchissement
        let refresh = refresh_now.notified();
        tokio::pin!(refresh);
        refresh.as_mut().enable();
        loop {
            let wait = *interval.borrow_and_update();
            debug!(secs = wait.secs(), "Waiting for next cycle");

            tokio::select! {
                _ = cancel.cancelled() => break 'cycles,
                _ = tokio::time::sleep_until(wait_started + wait.as_duration()) => break,
                _ = &mut refresh => {
                    debug!("Refresh requested");
                    break;
                }
                // Err : l'UI est partie, la branche est simplement ignorée
                Ok(()) = interval.changed() => {}
            }
        }
    }

    info!("Scheduler stopped");
}

// ============================================================================
// Tests unitaires
// ============================================================================
