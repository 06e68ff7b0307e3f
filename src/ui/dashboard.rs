// ============================================================================
// Dashboard - Rendu de l'interface principale
// ============================================================================
// Dessine l'interface TUI en utilisant les widgets de ratatui
//
// ┌ Live Cryptocurrency Tracker ─────────────────────────────────────────┐
// │ intro + dernière mise à jour + compte à rebours                      │
// ├ Settings ──────────┬ Charts n/7 ─────────────────────────────────────┤
// ├ Analysis ──────────┤                                                 │
// ├ Top 50 ────────────┤              image du graphique                 │
// │                    │                                                 │
// ├────────────────────┴─────────────────────────────────────────────────┤
// │ statut + raccourcis                                                  │
// └──────────────────────────────────────────────────────────────────────┘
//
// CONCEPTS RATATUI :
// 1. Frame : surface de dessin
// 2. Layout : découpage de l'espace en zones
// 3. Buffer : chaque graphique est redessiné à la taille de son panneau
// 4. Wrap : les lignes de statistiques passent à la ligne sans être coupées
// ============================================================================

use chrono::Local;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{
        Block, Borders, Cell, Gauge, Paragraph, Row as TableRow, Table as TableWidget, Wrap,
    },
    Frame,
};

use crate::app::{App, StatusKind};
use crate::charts::CHART_COUNT;
use crate::models::{format_compact, Row};

const ACCENT: Color = Color::Cyan;
const KEY_STYLE: Style = Style::new().fg(Color::Yellow).add_modifier(Modifier::BOLD);

/// En-têtes courts du tableau, même ordre que le fichier exporté
const TABLE_HEADERS: [&str; 6] = ["Name", "Symbol", "Price $", "Mkt Cap", "Vol 24h", "24h %"];

/// Dessine l'interface complète
pub fn render(frame: &mut Frame, app: &App) {
    let [header, body, footer] = split_vertical(
        frame.size(),
        [Constraint::Length(5), Constraint::Min(0), Constraint::Length(4)],
    );

    render_header(frame, app, header);

    let [left, right] = split_horizontal(
        body,
        [Constraint::Percentage(45), Constraint::Percentage(55)],
    );
    let [settings, analysis, data] = split_vertical(
        left,
        [Constraint::Length(4), Constraint::Length(14), Constraint::Min(0)],
    );

    render_settings(frame, app, settings);
    render_analysis(frame, app, analysis);
    render_data_table(frame, app, data);
    render_chart_panel(frame, app, right);
    render_footer(frame, app, footer);
}

// ============================================================================
// Layout
// ============================================================================

/// Découpe verticale en N zones
///
/// CONCEPT RUST : const generics
/// - [Rect; N] : le nombre de zones est connu à la compilation
/// - permet le destructuring `let [a, b, c] = ...`
fn split_vertical<const N: usize>(area: Rect, constraints: [Constraint; N]) -> [Rect; N] {
    split(Direction::Vertical, area, constraints)
}

fn split_horizontal<const N: usize>(area: Rect, constraints: [Constraint; N]) -> [Rect; N] {
    split(Direction::Horizontal, area, constraints)
}

fn split<const N: usize>(direction: Direction, area: Rect, constraints: [Constraint; N]) -> [Rect; N] {
    let chunks = Layout::default()
        .direction(direction)
        .constraints(constraints)
        .split(area);
    std::array::from_fn(|i| chunks[i])
}

fn panel(title: &str) -> Block<'static> {
    Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(ACCENT))
        .title(format!(" {} ", title))
}

/// Message centré dans un panneau vide
fn placeholder(frame: &mut Frame, block: Block, area: Rect, message: &str) {
    let paragraph = Paragraph::new(vec![
        Line::from(""),
        Line::from(Span::styled(message.to_string(), Style::default().fg(Color::Gray))),
    ])
    .block(block)
    .alignment(Alignment::Center);
    frame.render_widget(paragraph, area);
}

// ============================================================================
// Header
// ============================================================================

fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(ACCENT))
        .title(Span::styled(
            " Live Cryptocurrency Tracker ",
            Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
        ))
        .title_alignment(Alignment::Center);

    let timing = if app.is_loading {
        Line::from(Span::styled("Fetching data...", Style::default().fg(Color::Yellow)))
    } else {
        let updated = app
            .snapshot
            .as_ref()
            .map(|s| s.fetched_at.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_else(|| "never".to_string());
        let countdown = app
            .seconds_until_refresh(Local::now())
            .map(|secs| format!("{} s", secs))
            .unwrap_or_else(|| "-".to_string());

        Line::from(vec![
            Span::styled("Last update: ", Style::default().fg(Color::Gray)),
            Span::raw(updated),
            Span::styled("   Next refresh in: ", Style::default().fg(Color::Gray)),
            Span::raw(countdown),
        ])
    };

    let text = vec![
        Line::from(Span::styled(
            "Top 50 Cryptocurrencies: live cryptocurrency data updated automatically every few minutes.",
            Style::default().fg(Color::Green),
        )),
        Line::from(""),
        timing,
    ];

    frame.render_widget(Paragraph::new(text).block(block).alignment(Alignment::Center), area);
}

// ============================================================================
// Settings : intervalle de rafraîchissement
// ============================================================================

fn render_settings(frame: &mut Frame, app: &App, area: Rect) {
    let block = panel("Settings");
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let [label, gauge] = split_vertical(inner, [Constraint::Length(1), Constraint::Length(1)]);

    frame.render_widget(
        Paragraph::new(Line::from(vec![
            Span::raw("Auto Refresh Interval (seconds) "),
            Span::styled("[-/+]", KEY_STYLE),
        ])),
        label,
    );
    frame.render_widget(
        Gauge::default()
            .gauge_style(Style::default().fg(Color::Blue).bg(Color::DarkGray))
            .ratio(app.refresh.ratio())
            .label(app.refresh.secs().to_string()),
        gauge,
    );
}

// ============================================================================
// Analysis : top 5 + statistiques
// ============================================================================

fn render_analysis(frame: &mut Frame, app: &App, area: Rect) {
    let block = panel("Analysis");
    let Some(snapshot) = &app.snapshot else {
        placeholder(frame, block, area, "No data");
        return;
    };

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let [title, top, stats] = split_vertical(
        inner,
        [Constraint::Length(1), Constraint::Length(6), Constraint::Min(0)],
    );

    frame.render_widget(
        Paragraph::new(Span::styled(
            "Top 5 Cryptocurrencies by Market Cap",
            Style::default().add_modifier(Modifier::BOLD),
        )),
        title,
    );

    let rows = snapshot.summary.top5.iter().map(|row| {
        TableRow::new(vec![
            Cell::from(row.name.clone()),
            Cell::from(format!("${}", format_compact(row.market_cap))),
        ])
    });
    let table = TableWidget::new(rows, [Constraint::Percentage(60), Constraint::Percentage(40)])
        .header(TableRow::new(vec!["Name", "Market Cap"]).style(Style::default().fg(ACCENT)));
    frame.render_widget(table, top);

    let lines: Vec<Line> = snapshot
        .summary
        .stat_lines()
        .into_iter()
        .map(Line::from)
        .collect();
    frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: true }), stats);
}

// ============================================================================
// Top 50 : tableau défilant
// ============================================================================

fn render_data_table(frame: &mut Frame, app: &App, area: Rect) {
    let Some(snapshot) = &app.snapshot else {
        placeholder(frame, panel("Top 50 Cryptocurrency Data"), area, "No data");
        return;
    };

    let title = format!(
        "Top 50 Cryptocurrency Data ({}-{}/{})",
        app.table_offset + 1,
        snapshot.table.len().min(app.table_offset + area.height.saturating_sub(3) as usize),
        snapshot.table.len()
    );

    let rows = snapshot.table.iter().skip(app.table_offset).map(data_row);
    // Colonnes numériques à largeur fixe : seul Name rétrécit
    let widths = [
        Constraint::Min(0),
        Constraint::Length(6),
        Constraint::Length(8),
        Constraint::Length(8),
        Constraint::Length(8),
        Constraint::Length(7),
    ];

    let table = TableWidget::new(rows, widths)
        .header(
            TableRow::new(TABLE_HEADERS.to_vec())
                .style(Style::default().fg(ACCENT).add_modifier(Modifier::BOLD)),
        )
        .block(panel(&title));
    frame.render_widget(table, area);
}

fn data_row(row: &Row) -> TableRow<'static> {
    let change_color = if row.change_24h >= 0.0 { Color::Green } else { Color::Red };
    TableRow::new(vec![
        Cell::from(row.name.clone()),
        Cell::from(row.symbol.clone()),
        Cell::from(format_compact(row.price)),
        Cell::from(format_compact(row.market_cap)),
        Cell::from(format_compact(row.volume_24h)),
        Cell::from(Span::styled(
            format!("{:+.2}", row.change_24h),
            Style::default().fg(change_color),
        )),
    ])
}

// ============================================================================
// Graphiques
// ============================================================================

fn render_chart_panel(frame: &mut Frame, app: &App, area: Rect) {
    let Some(image) = app.current_chart() else {
        let message = if app.is_loading { "Loading..." } else { "No chart to display" };
        placeholder(frame, panel("Charts"), area, message);
        return;
    };

    let title = format!("Charts {}/{} : {}", app.chart_index + 1, CHART_COUNT, image.title());
    let block = panel(&title);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    image.render_into(inner, frame.buffer_mut());
}

// ============================================================================
// Footer : statut + raccourcis
// ============================================================================

fn render_footer(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(ACCENT));

    let status = match &app.status {
        Some(status) => {
            let color = match status.kind {
                StatusKind::Success => Color::Green,
                StatusKind::Warning => Color::Yellow,
                StatusKind::Error => Color::Red,
            };
            Line::from(Span::styled(status.text.clone(), Style::default().fg(color)))
        }
        None => Line::from(""),
    };

    let shortcuts = if app.is_awaiting_quit_confirmation() {
        Line::from(vec![
            Span::styled("⚠  Press ", Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)),
            Span::styled(
                "[q]",
                Style::default()
                    .fg(Color::Red)
                    .add_modifier(Modifier::BOLD)
                    .add_modifier(Modifier::SLOW_BLINK),
            ),
            Span::styled(
                " again to quit, any other key to cancel ⚠",
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            ),
        ])
    } else {
        Line::from(vec![
            Span::styled("[q]", KEY_STYLE),
            Span::raw(" Quit  "),
            Span::styled("[r]", KEY_STYLE),
            Span::raw(" Refresh  "),
            Span::styled("[↑↓ / j k / PgUp PgDn]", KEY_STYLE),
            Span::raw(" Scroll  "),
            Span::styled("[Tab / 1-7]", KEY_STYLE),
            Span::raw(" Chart  "),
            Span::styled("[-/+]", KEY_STYLE),
            Span::raw(" Interval"),
        ])
    };

    frame.render_widget(
        Paragraph::new(vec![status, shortcuts])
            .block(block)
            .alignment(Alignment::Center),
        area,
    );
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::Summary;
    use crate::charts;
    use crate::models::Table;
    use crate::poller::{CycleOutcome, ExportStatus, Snapshot};
    use ratatui::{backend::TestBackend, Terminal};
    use std::path::PathBuf;

    fn screen_lines(app: &App, width: u16, height: u16) -> Vec<String> {
        let mut terminal = Terminal::new(TestBackend::new(width, height)).unwrap();
        terminal.draw(|frame| render(frame, app)).unwrap();
        let buffer = terminal.backend().buffer();
        (0..buffer.area.height)
            .map(|y| {
                (0..buffer.area.width)
                    .map(|x| buffer.get(x, y).symbol())
                    .collect::<String>()
            })
            .collect()
    }

    fn screen(app: &App) -> String {
        screen_lines(app, 200, 60).join("\n")
    }

    /// Colonnes à partir de `from` (panneau des graphiques)
    fn right_of(lines: &[String], from: usize) -> String {
        lines
            .iter()
            .map(|line| line.chars().skip(from).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn left_of(lines: &[String], to: usize) -> String {
        lines
            .iter()
            .map(|line| line.chars().take(to).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn app_with_snapshot() -> App {
        let mut app = App::default();
        app.apply_outcome(CycleOutcome::Updated(Box::new(snapshot())));
        app
    }

    fn snapshot() -> Snapshot {
        let table = Table::from_rows(vec![
            Row::new("Bitcoin".into(), "BTC".into(), 50000.0, 1e12, 3e10, 1.5),
            Row::new("Ethereum".into(), "ETH".into(), 3000.0, 4e11, 1.5e10, -2.0),
        ]);
        let summary = Summary::compute(&table);
        let charts = charts::render(&summary.top5);
        Snapshot {
            table,
            summary,
            charts,
            export: ExportStatus::Saved(PathBuf::from("live_crypto_data.csv")),
            fetched_at: Local::now(),
        }
    }

    #[test]
    fn test_initial_screen() {
        let text = screen(&App::default());
        assert!(text.contains("Live Cryptocurrency Tracker"));
        assert!(text.contains("Auto Refresh Interval (seconds)"));
        assert!(text.contains("Fetching data..."));
    }

    #[test]
    fn test_screen_with_snapshot() {
        let text = screen(&app_with_snapshot());

        assert!(text.contains("Top 5 Cryptocurrencies by Market Cap"));
        assert!(text.contains("Average Price of Top 50 Cryptocurrencies: $26500.00"));
        assert!(text.contains("Highest 24h Percentage Change: 1.50%"));
        assert!(text.contains("Lowest 24h Percentage Change: -2.00%"));
        assert!(text.contains("Charts 1/7"));
        assert!(text.contains("Data saved to `live_crypto_data.csv`"));
    }

    #[test]
    fn test_chart_fits_a_120x40_terminal() {
        let lines = screen_lines(&app_with_snapshot(), 120, 40);
        // 45% de 120 : le panneau des graphiques commence à la colonne 54
        let charts = right_of(&lines, 54);

        assert!(charts.contains("Bitcoin"), "{}", charts);
        assert!(charts.contains("Ethereum"), "{}", charts);
        assert!(charts.contains("Cryptocurrency"), "{}", charts);
        assert!(charts.contains("Price (USD)"), "{}", charts);
        // Coin haut droit de la figure, puis bordure du panneau
        assert!(lines[6].ends_with("┐│"), "{}", lines[6]);
    }

    #[test]
    fn test_pie_fits_a_120x40_terminal() {
        let mut app = app_with_snapshot();
        app.select_chart(1);
        let charts = right_of(&screen_lines(&app, 120, 40), 54);

        assert!(charts.contains("Market Cap Distribution"), "{}", charts);
        assert!(charts.contains("71.4%"), "{}", charts);
        assert!(charts.contains("28.6%"), "{}", charts);
    }

    #[test]
    fn test_numbers_are_not_truncated_on_120x40() {
        let lines = screen_lines(&app_with_snapshot(), 120, 40);
        let left = left_of(&lines, 54);

        assert!(left.contains("$26500.00"), "{}", left);
        assert!(left.contains("Highest 24h Percentage Change: 1.50%"), "{}", left);
        assert!(left.contains("Lowest 24h Percentage Change: -2.00%"), "{}", left);
        // Tableau : prix compacts, suffixes conservés
        assert!(left.contains("50.00K"), "{}", left);
        assert!(left.contains("3.00K"), "{}", left);
        assert!(left.contains("400.00B"), "{}", left);
        assert!(left.contains("15.00B"), "{}", left);
        assert!(left.contains("-2.00"), "{}", left);
    }

    #[test]
    fn test_quit_confirmation_footer() {
        let mut app = App::default();
        app.request_quit();
        assert!(screen(&app).contains("again to quit"));
    }
}
