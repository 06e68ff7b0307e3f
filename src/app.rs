// ============================================================================
// Structure : App
// ============================================================================
// Gère l'état global de l'application TUI
//
// CONCEPTS RUST :
// 1. State Management : centraliser l'état dans une seule structure
// 2. Mutabilité contrôlée : &mut self pour modifier l'état
// 3. Option<T> : "pas encore de données" est un état explicite
//
// PATTERN : "Application State"
// - Le dashboard lit uniquement depuis App
// - Les résultats du worker passent par apply_outcome()
// - Les touches passent par les méthodes de navigation
// ============================================================================

use chrono::{DateTime, Duration, Local};
use tracing::debug;

use crate::charts::{ChartImage, CHART_COUNT};
use crate::config::RefreshInterval;
use crate::poller::{CycleOutcome, ExportStatus, Snapshot};

/// Nombre de lignes sautées par PgUp / PgDn
pub const PAGE_SIZE: usize = 10;

// ============================================================================
// Message de statut
// ============================================================================

/// Gravité d'un message de statut (couleur dans la barre de statut)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    Success,
    Warning,
    Error,
}

/// Message affiché dans la barre de statut
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusMessage {
    pub kind: StatusKind,
    pub text: String,
}

impl StatusMessage {
    fn new(kind: StatusKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
        }
    }
}

// ============================================================================
// App
// ============================================================================

/// État principal de l'application
pub struct App {
    /// Indique si l'application doit continuer à tourner
    pub running: bool,

    /// Two-step quit : première pression de 'q' -> confirmation,
    /// deuxième -> sortie, toute autre touche annule
    pub confirm_quit: bool,

    /// Dernier snapshot réussi (None avant le premier cycle ou après
    /// un cycle sans données)
    pub snapshot: Option<Snapshot>,

    /// Message de la barre de statut
    pub status: Option<StatusMessage>,

    /// Intervalle de rafraîchissement choisi par l'utilisateur
    pub refresh: RefreshInterval,

    /// Première ligne visible du tableau Top 50
    pub table_offset: usize,

    /// Graphique affiché (0..CHART_COUNT)
    pub chart_index: usize,

    /// Un cycle est en cours (démarrage ou refresh manuel)
    pub is_loading: bool,

    /// Heure de fin du dernier cycle, quel que soit son résultat
    pub last_cycle_at: Option<DateTime<Local>>,
}

impl App {
    /// Crée l'état initial : chargement du premier cycle en cours
    pub fn new(refresh: RefreshInterval) -> Self {
        Self {
            running: true,
            confirm_quit: false,
            snapshot: None,
            status: None,
            refresh,
            table_offset: 0,
            chart_index: 0,
            is_loading: true,
            last_cycle_at: None,
        }
    }

    /// Quitte l'application
    pub fn quit(&mut self) {
        self.running = false;
    }

    /// Vérifie si l'application doit continuer
    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn request_quit(&mut self) {
        self.confirm_quit = true;
    }

    pub fn cancel_quit(&mut self) {
        self.confirm_quit = false;
    }

    pub fn is_awaiting_quit_confirmation(&self) -> bool {
        self.confirm_quit
    }

    // ========================================================================
    // Résultats du worker
    // ========================================================================

    /// Intègre le résultat d'un cycle
    ///
    /// CONCEPT RUST : match exhaustif
    /// - chaque variante de CycleOutcome a son traitement
    /// - ajouter une variante casse la compilation ici, pas à l'exécution
    pub fn apply_outcome(&mut self, outcome: CycleOutcome) {
        self.is_loading = false;
        self.last_cycle_at = Some(Local::now());

        match outcome {
            CycleOutcome::Updated(snapshot) => {
                self.status = Some(match &snapshot.export {
                    ExportStatus::Saved(path) => {
                        let file = path
                            .file_name()
                            .map(|name| name.to_string_lossy().into_owned())
                            .unwrap_or_else(|| path.display().to_string());
                        StatusMessage::new(StatusKind::Success, format!("Data saved to `{}`", file))
                    }
                    ExportStatus::Failed(reason) => {
                        StatusMessage::new(StatusKind::Error, format!("Error saving data: {}", reason))
                    }
                });
                self.snapshot = Some(*snapshot);
                self.clamp_table_offset();
            }
            CycleOutcome::NoData => {
                self.snapshot = None;
                self.status = Some(StatusMessage::new(
                    StatusKind::Warning,
                    "No data received from the API",
                ));
            }
            CycleOutcome::Failed(e) => {
                self.snapshot = None;
                self.status = Some(StatusMessage::new(
                    StatusKind::Error,
                    format!("Error fetching data: {}", e),
                ));
            }
        }

        debug!(has_data = self.snapshot.is_some(), "Outcome applied");
    }

    /// Refresh manuel demandé : le worker va lancer un cycle
    pub fn start_refresh(&mut self) {
        self.is_loading = true;
    }

    /// Prochain cycle prévu : fin du dernier cycle + intervalle courant
    pub fn next_refresh_at(&self) -> Option<DateTime<Local>> {
        let last = self.last_cycle_at?;
        Some(last + Duration::seconds(self.refresh.secs() as i64))
    }

    /// Secondes restantes avant le prochain cycle (0 si dépassé)
    pub fn seconds_until_refresh(&self, now: DateTime<Local>) -> Option<u64> {
        let next = self.next_refresh_at()?;
        Some((next - now).num_seconds().max(0) as u64)
    }

    // ========================================================================
    // Intervalle de rafraîchissement
    // ========================================================================

    /// Un cran de plus ; retourne le nouvel intervalle
    pub fn increase_interval(&mut self) -> RefreshInterval {
        self.refresh = self.refresh.increase();
        self.refresh
    }

    /// Un cran de moins ; retourne le nouvel intervalle
    pub fn decrease_interval(&mut self) -> RefreshInterval {
        self.refresh = self.refresh.decrease();
        self.refresh
    }

    // ========================================================================
    // Tableau Top 50
    // ========================================================================

    fn row_count(&self) -> usize {
        self.snapshot.as_ref().map_or(0, |s| s.table.len())
    }

    fn clamp_table_offset(&mut self) {
        let max_offset = self.row_count().saturating_sub(1);
        self.table_offset = self.table_offset.min(max_offset);
    }

    pub fn scroll_up(&mut self) {
        self.table_offset = self.table_offset.saturating_sub(1);
    }

    pub fn scroll_down(&mut self) {
        self.table_offset += 1;
        self.clamp_table_offset();
    }

    pub fn page_up(&mut self) {
        self.table_offset = self.table_offset.saturating_sub(PAGE_SIZE);
    }

    pub fn page_down(&mut self) {
        self.table_offset += PAGE_SIZE;
        self.clamp_table_offset();
    }

    // ========================================================================
    // Graphiques
    // ========================================================================

    /// Graphique suivant (boucle de 7 vers 1)
    pub fn next_chart(&mut self) {
        self.chart_index = (self.chart_index + 1) % CHART_COUNT;
    }

    /// Graphique précédent (boucle de 1 vers 7)
    pub fn previous_chart(&mut self) {
        self.chart_index = (self.chart_index + CHART_COUNT - 1) % CHART_COUNT;
    }

    /// Sélection directe (index 0-based), ignorée hors plage
    pub fn select_chart(&mut self, index: usize) {
        if index < CHART_COUNT {
            self.chart_index = index;
        }
    }

    /// Image du graphique sélectionné, si un snapshot existe
    pub fn current_chart(&self) -> Option<&ChartImage> {
        self.snapshot.as_ref()?.charts.get(self.chart_index)
    }
}

impl Default for App {
    fn default() -> Self {
        Self::new(RefreshInterval::default())
    }
}

// ============================================================================
// Tests unitaires
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::Summary;
    use crate::api::FetchError;
    use crate::charts;
    use crate::models::{Row, Table};
    use std::path::PathBuf;

    fn snapshot(rows: usize) -> Snapshot {
        let table = Table::from_rows(
            (0..rows)
                .map(|i| {
                    Row::new(
                        format!("Coin {}", i),
                        format!("C{}", i),
                        1.0 + i as f64,
                        1e9 * (rows - i) as f64,
                        1e6,
                        0.5,
                    )
                })
                .collect(),
        );
        let summary = Summary::compute(&table);
        let charts = charts::render(&summary.top5);
        Snapshot {
            table,
            summary,
            charts,
            export: ExportStatus::Saved(PathBuf::from("out/live_crypto_data.csv")),
            fetched_at: Local::now(),
        }
    }

    fn failed() -> CycleOutcome {
        CycleOutcome::Failed(FetchError::Status {
            status: reqwest::StatusCode::UNAUTHORIZED,
            message: "API key missing.".to_string(),
        })
    }

    #[test]
    fn test_app_creation() {
        let app = App::default();
        assert!(app.is_running());
        assert!(app.is_loading);
        assert!(app.snapshot.is_none());
        assert_eq!(app.refresh.secs(), 300);
        assert_eq!(app.seconds_until_refresh(Local::now()), None);
    }

    #[test]
    fn test_two_step_quit() {
        let mut app = App::default();
        app.request_quit();
        assert!(app.is_awaiting_quit_confirmation());
        app.cancel_quit();
        assert!(!app.is_awaiting_quit_confirmation());
        app.quit();
        assert!(!app.is_running());
    }

    #[test]
    fn test_updated_outcome_sets_snapshot_and_status() {
        let mut app = App::default();
        app.apply_outcome(CycleOutcome::Updated(Box::new(snapshot(3))));

        assert!(!app.is_loading);
        assert_eq!(app.snapshot.as_ref().unwrap().table.len(), 3);
        let status = app.status.as_ref().unwrap();
        assert_eq!(status.kind, StatusKind::Success);
        assert_eq!(status.text, "Data saved to `live_crypto_data.csv`");
        assert!(app.current_chart().is_some());
    }

    #[test]
    fn test_export_failure_is_reported() {
        let mut app = App::default();
        let mut snap = snapshot(2);
        snap.export = ExportStatus::Failed("disk full".to_string());
        app.apply_outcome(CycleOutcome::Updated(Box::new(snap)));

        assert!(app.snapshot.is_some());
        let status = app.status.unwrap();
        assert_eq!(status.kind, StatusKind::Error);
        assert_eq!(status.text, "Error saving data: disk full");
    }

    #[test]
    fn test_failure_clears_snapshot() {
        let mut app = App::default();
        app.apply_outcome(CycleOutcome::Updated(Box::new(snapshot(3))));
        app.apply_outcome(failed());

        assert!(app.snapshot.is_none());
        assert!(app.current_chart().is_none());
        let status = app.status.unwrap();
        assert_eq!(status.kind, StatusKind::Error);
        assert_eq!(status.text, "Error fetching data: HTTP 401 Unauthorized: API key missing.");
    }

    #[test]
    fn test_no_data_clears_snapshot() {
        let mut app = App::default();
        app.apply_outcome(CycleOutcome::Updated(Box::new(snapshot(3))));
        app.apply_outcome(CycleOutcome::NoData);

        assert!(app.snapshot.is_none());
        assert_eq!(app.status.unwrap().kind, StatusKind::Warning);
    }

    #[test]
    fn test_countdown_follows_interval() {
        let mut app = App::new(RefreshInterval::new(120));
        app.apply_outcome(CycleOutcome::NoData);
        let last = app.last_cycle_at.unwrap();

        assert_eq!(app.seconds_until_refresh(last), Some(120));
        app.decrease_interval();
        assert_eq!(app.seconds_until_refresh(last), Some(90));
        assert_eq!(app.seconds_until_refresh(last + Duration::seconds(500)), Some(0));
    }

    #[test]
    fn test_interval_bounds() {
        let mut app = App::default();
        assert_eq!(app.increase_interval().secs(), 300);
        for _ in 0..20 {
            app.decrease_interval();
        }
        assert_eq!(app.refresh.secs(), 60);
        assert_eq!(app.increase_interval().secs(), 90);
    }

    #[test]
    fn test_table_scrolling() {
        let mut app = App::default();
        app.apply_outcome(CycleOutcome::Updated(Box::new(snapshot(25))));

        app.scroll_up();
        assert_eq!(app.table_offset, 0);

        app.page_down();
        app.page_down();
        assert_eq!(app.table_offset, 20);

        // Bornée à la dernière ligne
        app.page_down();
        assert_eq!(app.table_offset, 24);
        app.scroll_down();
        assert_eq!(app.table_offset, 24);

        app.page_up();
        app.scroll_up();
        assert_eq!(app.table_offset, 13);
    }

    #[test]
    fn test_offset_clamped_when_table_shrinks() {
        let mut app = App::default();
        app.apply_outcome(CycleOutcome::Updated(Box::new(snapshot(25))));
        app.page_down();
        app.page_down();
        app.apply_outcome(CycleOutcome::Updated(Box::new(snapshot(5))));
        assert_eq!(app.table_offset, 4);
    }

    #[test]
    fn test_chart_navigation_wraps() {
        let mut app = App::default();
        app.previous_chart();
        assert_eq!(app.chart_index, CHART_COUNT - 1);
        app.next_chart();
        assert_eq!(app.chart_index, 0);

        app.select_chart(4);
        assert_eq!(app.chart_index, 4);
        app.select_chart(CHART_COUNT);
        assert_eq!(app.chart_index, 4);
    }
}
