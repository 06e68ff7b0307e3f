// ============================================================================
// Graphiques X/Y (widget Chart de ratatui)
// ============================================================================
// 1. Line       : prix par cryptomonnaie
// 3. MarkerLine : variation 24h par cryptomonnaie, marqueurs + grille
// 4. LogScatter : prix vs capitalisation, capitalisation en échelle log10
//
// CONCEPT RATATUI : Dataset
// - un Dataset emprunte ses points (&[(f64, f64)])
// - les Vec de points doivent donc vivre jusqu'au render()
// ============================================================================

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    symbols::Marker,
    text::Span,
    widgets::{Axis, Chart, Dataset, GraphType, LegendPosition, Widget},
};

use super::{category_axis, figure_block, padded_bounds, value_labels, ChartKind};
use crate::models::{format_compact, Table};

const AXIS_STYLE: Style = Style::new().fg(Color::Gray);
const GRID_STYLE: Style = Style::new().fg(Color::DarkGray);

/// Line chart : Price (USD) par nom
pub(super) fn price_line(table: &Table, area: Rect, buf: &mut Buffer) {
    let names: Vec<String> = table.iter().map(|row| row.name.clone()).collect();
    let (x_bounds, x_labels) = category_axis(&names);

    let points: Vec<(f64, f64)> = table
        .iter()
        .enumerate()
        .map(|(i, row)| (i as f64, row.price))
        .collect();
    let prices: Vec<f64> = points.iter().map(|&(_, y)| y).collect();
    let y_bounds = padded_bounds(&prices);

    let dataset = Dataset::default()
        .name("Price (USD)")
        .marker(Marker::Braille)
        .graph_type(line_or_scatter(points.len()))
        .style(Style::default().fg(Color::Blue))
        .data(&points);

    Chart::new(vec![dataset])
        .block(figure_block(ChartKind::Line.title()))
        .legend_position(Some(LegendPosition::TopRight))
        .x_axis(
            Axis::default()
                .title("Cryptocurrency")
                .style(AXIS_STYLE)
                .bounds(x_bounds)
                .labels(x_labels),
        )
        .y_axis(
            Axis::default()
                .title("Price (USD)")
                .style(AXIS_STYLE)
                .bounds(y_bounds)
                .labels(value_labels(y_bounds, |v| format!("${:.2}", v))),
        )
        .render(area, buf);
}

/// Marker line chart : 24h Change (%) par nom, avec grille de valeurs
pub(super) fn change_markers(table: &Table, area: Rect, buf: &mut Buffer) {
    let names: Vec<String> = table.iter().map(|row| row.name.clone()).collect();
    let (x_bounds, x_labels) = category_axis(&names);

    let points: Vec<(f64, f64)> = table
        .iter()
        .enumerate()
        .map(|(i, row)| (i as f64, row.change_24h))
        .collect();
    let changes: Vec<f64> = points.iter().map(|&(_, y)| y).collect();
    let y_bounds = padded_bounds(&changes);

    // Grille : une ligne horizontale par label Y, une verticale par nom
    let [y_lo, y_hi] = y_bounds;
    let [x_lo, x_hi] = x_bounds;
    let mut grid: Vec<Vec<(f64, f64)>> = [y_lo, (y_lo + y_hi) / 2.0, y_hi]
        .iter()
        .map(|&y| vec![(x_lo, y), (x_hi, y)])
        .collect();
    grid.extend(points.iter().map(|&(x, _)| vec![(x, y_lo), (x, y_hi)]));

    // Les datasets sans nom n'apparaissent pas dans la légende
    let mut datasets: Vec<Dataset> = grid
        .iter()
        .map(|line| {
            Dataset::default()
                .marker(Marker::Braille)
                .graph_type(GraphType::Line)
                .style(GRID_STYLE)
                .data(line)
        })
        .collect();

    datasets.push(
        Dataset::default()
            .name("24h Change (%)")
            .marker(Marker::Braille)
            .graph_type(line_or_scatter(points.len()))
            .style(Style::default().fg(Color::Green))
            .data(&points),
    );
    datasets.push(
        Dataset::default()
            .marker(Marker::Dot)
            .graph_type(GraphType::Scatter)
            .style(Style::default().fg(Color::Green))
            .data(&points),
    );

    Chart::new(datasets)
        .block(figure_block(ChartKind::MarkerLine.title()))
        .legend_position(Some(LegendPosition::TopRight))
        .x_axis(
            Axis::default()
                .title("Cryptocurrency")
                .style(AXIS_STYLE)
                .bounds(x_bounds)
                .labels(x_labels),
        )
        .y_axis(
            Axis::default()
                .title("24h Change (%)")
                .style(AXIS_STYLE)
                .bounds(y_bounds)
                .labels(value_labels(y_bounds, |v| format!("{:.2}", v))),
        )
        .render(area, buf);
}

/// Scatter : Price (x) vs Market Cap (y, log10)
///
/// Les capitalisations <= 0 n'ont pas de logarithme : elles sont ignorées.
pub(super) fn price_vs_market_cap(table: &Table, area: Rect, buf: &mut Buffer) {
    let points: Vec<(f64, f64)> = table
        .iter()
        .filter(|row| row.market_cap > 0.0)
        .map(|row| (row.price, row.market_cap.log10()))
        .collect();

    let prices: Vec<f64> = points.iter().map(|&(x, _)| x).collect();
    let x_bounds = padded_bounds(&prices);
    let (y_bounds, y_labels) = log_axis(points.iter().map(|&(_, y)| y));

    let dataset = Dataset::default()
        .name("Market Cap")
        .marker(Marker::Dot)
        .graph_type(GraphType::Scatter)
        .style(Style::default().fg(Color::Blue))
        .data(&points);

    Chart::new(vec![dataset])
        .block(figure_block(ChartKind::LogScatter.title()))
        .legend_position(Some(LegendPosition::TopLeft))
        .x_axis(
            Axis::default()
                .title("Price (USD)")
                .style(AXIS_STYLE)
                .bounds(x_bounds)
                .labels(value_labels(x_bounds, |v| format!("${}", format_compact(v)))),
        )
        .y_axis(
            Axis::default()
                .title("Market Cap")
                .style(AXIS_STYLE)
                .bounds(y_bounds)
                .labels(y_labels),
        )
        .render(area, buf);
}

/// Axe logarithmique : bornes aux puissances de 10 englobantes,
/// un label par décade ($1.00T, $100.00B...)
fn log_axis(exponents: impl Iterator<Item = f64>) -> ([f64; 2], Vec<Span<'static>>) {
    let (lo, hi) = exponents.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), y| {
        (lo.min(y), hi.max(y))
    });

    if !lo.is_finite() || !hi.is_finite() {
        return ([0.0, 1.0], Vec::new());
    }

    let lo = lo.floor();
    let mut hi = hi.ceil();
    if hi <= lo {
        hi = lo + 1.0;
    }

    let labels = (lo as i32..=hi as i32)
        .map(|exp| Span::raw(format!("${}", format_compact(10f64.powi(exp)))))
        .collect();

    ([lo, hi], labels)
}

/// Une ligne a besoin d'au moins deux points ; sinon on affiche le point seul
fn line_or_scatter(points: usize) -> GraphType {
    if points < 2 {
        GraphType::Scatter
    } else {
        GraphType::Line
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_axis_decades() {
        let (bounds, labels) = log_axis([12.0, 11.6, 10.47].into_iter());
        assert_eq!(bounds, [10.0, 12.0]);
        let labels: Vec<String> = labels.iter().map(|s| s.content.to_string()).collect();
        assert_eq!(labels, vec!["$10.00B", "$100.00B", "$1.00T"]);
    }

    #[test]
    fn test_log_axis_single_decade() {
        let (bounds, labels) = log_axis([9.0].into_iter());
        assert_eq!(bounds, [9.0, 10.0]);
        assert_eq!(labels.len(), 2);
    }

    #[test]
    fn test_scatter_legend_and_axes() {
        let image = crate::charts::ChartImage::draw(ChartKind::LogScatter, &super::super::tests::top5());
        let text = image.to_text();
        assert!(text.contains("Market Cap"));
        assert!(text.contains("Price (USD)"));
    }

    #[test]
    fn test_price_line_labels() {
        let image = crate::charts::ChartImage::draw(ChartKind::Line, &super::super::tests::top5());
        let text = image.to_text();
        assert!(text.contains("Bitcoin"));
        assert!(text.contains("Cryptocurrency"));
    }
}
