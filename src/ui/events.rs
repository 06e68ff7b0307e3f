// ============================================================================
// Gestion des événements
// ============================================================================
// Lit le clavier (crossterm) et traduit les touches en actions
//
// CONCEPTS RUST :
// 1. Enums avec variants : représenter différents types d'événements
// 2. Pattern matching : un prédicat par action
// 3. Error handling avec Result
// ============================================================================

use std::time::Duration;

use anyhow::Result;
use crossterm::event::{self, Event as CrosstermEvent, KeyCode, KeyEvent, KeyEventKind};

use crate::charts::CHART_COUNT;

/// Événements de l'application
#[derive(Debug, Clone)]
pub enum Event {
    /// Touche pressée
    Key(KeyEvent),

    /// Pas d'entrée : la boucle redessine (compte à rebours)
    Tick,
}

/// Gestionnaire d'événements
pub struct EventHandler {
    tick_rate: Duration,
}

impl EventHandler {
    pub fn new(tick_rate: Duration) -> Self {
        Self { tick_rate }
    }

    /// Lit le prochain événement (bloquant au plus tick_rate)
    ///
    /// CONCEPT : Non-blocking I/O avec timeout
    /// - Si pas d'événement, retourne Ok(Event::Tick)
    /// - Les résultats du worker sont lus entre deux appels
    pub fn next(&self) -> Result<Event> {
        if event::poll(self.tick_rate)? {
            match event::read()? {
                // Sur certains OS, on reçoit Press ET Release
                CrosstermEvent::Key(key) if key.kind == KeyEventKind::Press => Ok(Event::Key(key)),
                _ => Ok(Event::Tick),
            }
        } else {
            Ok(Event::Tick)
        }
    }
}

impl Default for EventHandler {
    fn default() -> Self {
        Self::new(Duration::from_millis(250))
    }
}

// ============================================================================
// Prédicats : une fonction par action
// ============================================================================

fn key_code(event: &Event) -> Option<KeyCode> {
    match event {
        Event::Key(key) => Some(key.code),
        Event::Tick => None,
    }
}

/// 'q' : quitter (deux pressions)
pub fn is_quit_event(event: &Event) -> bool {
    matches!(key_code(event), Some(KeyCode::Char('q') | KeyCode::Char('Q')))
}

/// Flèche haut ou 'k' (vim)
pub fn is_up_event(event: &Event) -> bool {
    matches!(key_code(event), Some(KeyCode::Up | KeyCode::Char('k') | KeyCode::Char('K')))
}

/// Flèche bas ou 'j' (vim)
pub fn is_down_event(event: &Event) -> bool {
    matches!(key_code(event), Some(KeyCode::Down | KeyCode::Char('j') | KeyCode::Char('J')))
}

pub fn is_page_up_event(event: &Event) -> bool {
    matches!(key_code(event), Some(KeyCode::PageUp))
}

pub fn is_page_down_event(event: &Event) -> bool {
    matches!(key_code(event), Some(KeyCode::PageDown))
}

/// '+' (ou '=' sans Shift) : intervalle plus long
pub fn is_increase_interval_event(event: &Event) -> bool {
    matches!(key_code(event), Some(KeyCode::Char('+') | KeyCode::Char('=')))
}

/// '-' : intervalle plus court
pub fn is_decrease_interval_event(event: &Event) -> bool {
    matches!(key_code(event), Some(KeyCode::Char('-') | KeyCode::Char('_')))
}

/// Tab : graphique suivant
pub fn is_next_chart_event(event: &Event) -> bool {
    matches!(key_code(event), Some(KeyCode::Tab))
}

/// Shift-Tab : graphique précédent
pub fn is_previous_chart_event(event: &Event) -> bool {
    matches!(key_code(event), Some(KeyCode::BackTab))
}

/// 'r' : rafraîchir maintenant
pub fn is_refresh_event(event: &Event) -> bool {
    matches!(key_code(event), Some(KeyCode::Char('r') | KeyCode::Char('R')))
}

/// '1' à '7' : index (0-based) du graphique demandé
pub fn chart_index_from_event(event: &Event) -> Option<usize> {
    match key_code(event)? {
        KeyCode::Char(c) => {
            let digit = c.to_digit(10)? as usize;
            (1..=CHART_COUNT).contains(&digit).then(|| digit - 1)
        }
        _ => None,
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;

    fn key(code: KeyCode) -> Event {
        Event::Key(KeyEvent::new(code, KeyModifiers::empty()))
    }

    #[test]
    fn test_is_quit_event() {
        assert!(is_quit_event(&key(KeyCode::Char('q'))));
        assert!(!is_quit_event(&key(KeyCode::Char('a'))));
        assert!(!is_quit_event(&Event::Tick));
    }

    #[test]
    fn test_navigation_keys() {
        assert!(is_up_event(&key(KeyCode::Up)));
        assert!(is_up_event(&key(KeyCode::Char('k'))));
        assert!(is_down_event(&key(KeyCode::Char('j'))));
        assert!(is_page_up_event(&key(KeyCode::PageUp)));
        assert!(is_page_down_event(&key(KeyCode::PageDown)));
        assert!(!is_down_event(&key(KeyCode::Up)));
    }

    #[test]
    fn test_interval_and_refresh_keys() {
        assert!(is_increase_interval_event(&key(KeyCode::Char('+'))));
        assert!(is_decrease_interval_event(&key(KeyCode::Char('-'))));
        assert!(is_refresh_event(&key(KeyCode::Char('r'))));
        assert!(!is_refresh_event(&Event::Tick));
    }

    #[test]
    fn test_chart_keys() {
        assert!(is_next_chart_event(&key(KeyCode::Tab)));
        assert!(is_previous_chart_event(&key(KeyCode::BackTab)));
        assert_eq!(chart_index_from_event(&key(KeyCode::Char('1'))), Some(0));
        assert_eq!(chart_index_from_event(&key(KeyCode::Char('7'))), Some(6));
        assert_eq!(chart_index_from_event(&key(KeyCode::Char('8'))), None);
        assert_eq!(chart_index_from_event(&key(KeyCode::Char('0'))), None);
        assert_eq!(chart_index_from_event(&key(KeyCode::Char('x'))), None);
    }
}
