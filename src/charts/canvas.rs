// ============================================================================
// Graphiques dessinés sur Canvas
// ============================================================================
// 2. Pie     : part de capitalisation, pourcentages à 1 décimale
// 6. Bar     : prix par nom, labels inclinés à 45°
// 7. BoxPlot : boîte à moustaches horizontale de la variation 24h
//
// CONCEPTS RATATUI :
// 1. Canvas : surface en coordonnées flottantes (x_bounds / y_bounds)
// 2. Marker::Braille : 2x4 points par cellule, bonne résolution
// 3. ctx.draw(&shape) : Points, Line, Rectangle
// 4. ctx.print(x, y, text) : texte posé par-dessus les formes
//
// CONCEPT RUST : Closure Fn
// - paint() prend une closure Fn(&mut Context)
// - les données sont préparées AVANT et capturées par référence
// - les textes sont clonés (ctx.print veut des valeurs possédées)
// ============================================================================

use std::f64::consts::PI;

use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Rect},
    style::{Color, Style},
    symbols::Marker,
    text::Span,
    widgets::{
        block::{Position, Title},
        canvas::{Canvas, Line as CanvasLine, Points, Rectangle},
        Widget,
    },
};

use super::{figure_block, short_name, ChartKind};
use crate::analytics::{box_stats, shares};
use crate::models::{format_compact, Column, Table};

/// Couleurs des parts du camembert (gold, lightblue, lightgreen, orange, pink)
const PIE_COLORS: [Color; 5] = [
    Color::Rgb(255, 215, 0),
    Color::Rgb(173, 216, 230),
    Color::Rgb(144, 238, 144),
    Color::Rgb(255, 165, 0),
    Color::Rgb(255, 192, 203),
];

const BAR_COLOR: Color = Color::Rgb(173, 216, 230); // lightblue
const BOX_FILL: Color = Color::Rgb(135, 206, 235); // skyblue
const BOX_EDGE: Color = Color::Blue;
const MEDIAN_COLOR: Color = Color::Rgb(255, 165, 0);

/// Longueur max des labels inclinés du bar chart
const SLANTED_LABEL_LEN: usize = 10;

/// Titre d'axe posé sur la bordure basse
fn bottom_title(text: &'static str) -> Title<'static> {
    Title::from(Span::styled(format!(" {} ", text), Style::default().fg(Color::Gray)))
        .position(Position::Bottom)
        .alignment(Alignment::Center)
}

/// Titre d'axe posé en haut à gauche
fn left_title(text: &'static str) -> Title<'static> {
    Title::from(Span::styled(format!(" {} ", text), Style::default().fg(Color::Gray)))
        .alignment(Alignment::Left)
}

// ============================================================================
// Pie chart
// ============================================================================

/// Une part du camembert, prête à dessiner
struct Slice {
    points: Vec<(f64, f64)>,
    color: Color,
    label: String,
    label_at: (f64, f64),
    percent: String,
    percent_at: (f64, f64),
}

/// Camembert des capitalisations
///
/// Départ à 90° (midi), sens anti-horaire. Chaque point Braille du disque
/// est affecté à la part qui couvre son angle.
pub(super) fn market_cap_pie(table: &Table, area: Rect, buf: &mut Buffer) {
    const RADIUS: f64 = 1.0;
    const BOUND: f64 = 1.6;

    let names: Vec<String> = table.iter().map(|row| row.name.clone()).collect();
    let percents = shares(&table.column(Column::MarketCap));

    // Angles cumulés en degrés, relatifs au départ à 90°
    let mut edges = Vec::with_capacity(percents.len() + 1);
    edges.push(0.0);
    for percent in &percents {
        let last = edges.last().copied().unwrap_or(0.0);
        edges.push(last + percent * 3.6);
    }

    // Pas d'échantillonnage : un point Braille (2 par colonne, 4 par ligne)
    let inner = Rect::new(0, 0, area.width.saturating_sub(2), area.height.saturating_sub(2));
    let cols = (inner.width as usize * 2).max(1);
    let rows = (inner.height as usize * 4).max(1);
    let cell_width = 2.0 * BOUND / inner.width.max(1) as f64;

    let mut slices: Vec<Slice> = names
        .iter()
        .enumerate()
        .map(|(i, name)| {
            let middle = 90.0 + (edges[i] + edges[i + 1]) / 2.0;
            let (sin, cos) = (middle * PI / 180.0).sin_cos();
            let label = short_name(name);
            let percent = format!("{:.1}%", percents[i]);
            Slice {
                points: Vec::new(),
                color: PIE_COLORS[i % PIE_COLORS.len()],
                label_at: centered(1.25 * RADIUS * cos, 1.25 * RADIUS * sin, &label, cell_width),
                percent_at: centered(0.6 * RADIUS * cos, 0.6 * RADIUS * sin, &percent, cell_width),
                label,
                percent,
            }
        })
        .collect();

    for ix in 0..=cols {
        for iy in 0..=rows {
            let x = -BOUND + 2.0 * BOUND * ix as f64 / cols as f64;
            let y = -BOUND + 2.0 * BOUND * iy as f64 / rows as f64;
            if x * x + y * y > RADIUS * RADIUS {
                continue;
            }
            let angle = (y.atan2(x) * 180.0 / PI - 90.0).rem_euclid(360.0);
            if let Some(i) = (0..slices.len()).find(|&i| angle >= edges[i] && angle < edges[i + 1]) {
                slices[i].points.push((x, y));
            }
        }
    }

    Canvas::default()
        .block(figure_block(ChartKind::Pie.title()))
        .marker(Marker::Braille)
        .x_bounds([-BOUND, BOUND])
        .y_bounds([-BOUND, BOUND])
        .paint(|ctx| {
            for slice in &slices {
                ctx.draw(&Points {
                    coords: &slice.points,
                    color: slice.color,
                });
            }
            for slice in &slices {
                ctx.print(
                    slice.label_at.0,
                    slice.label_at.1,
                    Span::styled(slice.label.clone(), Style::default().fg(Color::White)),
                );
                ctx.print(
                    slice.percent_at.0,
                    slice.percent_at.1,
                    Span::styled(slice.percent.clone(), Style::default().fg(Color::Black)),
                );
            }
        })
        .render(area, buf);
}

/// Décale x pour centrer un texte horizontalement sur (x, y)
fn centered(x: f64, y: f64, text: &str, cell_width: f64) -> (f64, f64) {
    (x - text.chars().count() as f64 * cell_width / 2.0, y)
}

// ============================================================================
// Bar chart
// ============================================================================

/// Barres des prix, labels inclinés à 45° sous l'axe
///
/// L'espace sous y = 0 est réservé aux labels : un caractère par rangée,
/// décalé d'une colonne à chaque rangée.
pub(super) fn price_bars(table: &Table, area: Rect, buf: &mut Buffer) {
    let inner_width = area.width.saturating_sub(2).max(1) as f64;
    let inner_height = area.height.saturating_sub(2).max(1) as f64;

    let count = table.len().max(1) as f64;
    let label_rows = table
        .iter()
        .map(|row| row.name.chars().count().min(SLANTED_LABEL_LEN))
        .max()
        .unwrap_or(0) as f64
        + 1.0;
    let plot_rows = (inner_height - label_rows).max(1.0);

    let max_price = table.iter().map(|row| row.price).fold(0.0, f64::max);
    let top = if max_price > 0.0 { max_price * 1.15 } else { 1.0 };
    let row_height = top / plot_rows;
    let bottom = -label_rows * row_height;

    // Place à droite pour le dernier label incliné
    let x_max = count + (SLANTED_LABEL_LEN as f64 + 1.0) * count / inner_width;
    let col_width = x_max / inner_width;

    // Remplissage : une ligne verticale par demi-colonne (résolution Braille)
    let fills: Vec<CanvasLine> = table
        .iter()
        .enumerate()
        .flat_map(|(i, row)| {
            let (left, right) = (i as f64 + 0.2, i as f64 + 0.8);
            let steps = (((right - left) / (col_width / 2.0)).ceil() as usize).max(1);
            (0..=steps).map(move |s| {
                let x = left + (right - left) * s as f64 / steps as f64;
                CanvasLine {
                    x1: x,
                    y1: 0.0,
                    x2: x,
                    y2: row.price.max(0.0),
                    color: BAR_COLOR,
                }
            })
        })
        .collect();

    struct BarText {
        value: String,
        value_at: (f64, f64),
        label: Vec<(f64, f64, String)>,
    }

    let texts: Vec<BarText> = table
        .iter()
        .enumerate()
        .map(|(i, row)| {
            let center = i as f64 + 0.5;
            let value = format!("${}", format_compact(row.price));
            let value_at = centered(center, row.price.max(0.0) + row_height, &value, col_width);
            let label = row
                .name
                .chars()
                .take(SLANTED_LABEL_LEN)
                .enumerate()
                .map(|(k, c)| {
                    (
                        center + k as f64 * col_width,
                        -(k as f64 + 1.0) * row_height,
                        c.to_string(),
                    )
                })
                .collect();
            BarText { value, value_at, label }
        })
        .collect();

    let block = figure_block(ChartKind::Bar.title())
        .title(left_title("Price (USD)"))
        .title(bottom_title("Cryptocurrency"));

    Canvas::default()
        .block(block)
        .marker(Marker::Braille)
        .x_bounds([0.0, x_max])
        .y_bounds([bottom, top])
        .paint(|ctx| {
            for fill in &fills {
                ctx.draw(fill);
            }
            ctx.draw(&CanvasLine {
                x1: 0.0,
                y1: 0.0,
                x2: count,
                y2: 0.0,
                color: Color::Gray,
            });
            for text in &texts {
                ctx.print(text.value_at.0, text.value_at.1, text.value.clone());
                for (x, y, c) in &text.label {
                    ctx.print(*x, *y, Span::styled(c.clone(), Style::default().fg(Color::Gray)));
                }
            }
        })
        .render(area, buf);
}

// ============================================================================
// Box plot
// ============================================================================

/// Boîte à moustaches horizontale de Change24h
pub(super) fn change_box_plot(table: &Table, area: Rect, buf: &mut Buffer) {
    let block = figure_block(ChartKind::BoxPlot.title()).title(bottom_title("24h Change (%)"));

    let stats = match box_stats(&table.column(Column::Change24h)) {
        Some(stats) => stats,
        None => {
            block.render(area, buf);
            return;
        }
    };

    let lo = stats
        .outliers
        .iter()
        .copied()
        .fold(stats.whisker_low, f64::min);
    let hi = stats
        .outliers
        .iter()
        .copied()
        .fold(stats.whisker_high, f64::max);
    let pad = if hi > lo { (hi - lo) * 0.1 } else { 1.0 };
    let (x_lo, x_hi) = (lo - pad, hi + pad);

    const BOX_BOTTOM: f64 = 0.7;
    const BOX_TOP: f64 = 1.3;
    const CAP: f64 = 0.15;

    let inner_width = area.width.saturating_sub(2).max(1) as f64;
    let col_width = (x_hi - x_lo) / inner_width;

    // Remplissage de la boîte
    let steps = (((stats.q3 - stats.q1) / (col_width / 2.0)).ceil() as usize).max(1);
    let fills: Vec<CanvasLine> = (0..=steps)
        .map(|s| {
            let x = stats.q1 + (stats.q3 - stats.q1) * s as f64 / steps as f64;
            CanvasLine {
                x1: x,
                y1: BOX_BOTTOM,
                x2: x,
                y2: BOX_TOP,
                color: BOX_FILL,
            }
        })
        .collect();

    let whiskers = [
        CanvasLine { x1: stats.whisker_low, y1: 1.0, x2: stats.q1, y2: 1.0, color: Color::White },
        CanvasLine { x1: stats.q3, y1: 1.0, x2: stats.whisker_high, y2: 1.0, color: Color::White },
        CanvasLine {
            x1: stats.whisker_low,
            y1: 1.0 - CAP,
            x2: stats.whisker_low,
            y2: 1.0 + CAP,
            color: Color::White,
        },
        CanvasLine {
            x1: stats.whisker_high,
            y1: 1.0 - CAP,
            x2: stats.whisker_high,
            y2: 1.0 + CAP,
            color: Color::White,
        },
    ];

    let outliers: Vec<(f64, f64)> = stats.outliers.iter().map(|&x| (x, 1.0)).collect();

    let ticks: Vec<(f64, String)> = [stats.whisker_low, stats.median, stats.whisker_high]
        .iter()
        .map(|&x| {
            let text = format!("{:.2}", x);
            (centered(x, 0.0, &text, col_width).0, text)
        })
        .collect();

    Canvas::default()
        .block(block)
        .marker(Marker::Braille)
        .x_bounds([x_lo, x_hi])
        .y_bounds([0.0, 2.0])
        .paint(|ctx| {
            for fill in &fills {
                ctx.draw(fill);
            }
            ctx.draw(&Rectangle {
                x: stats.q1,
                y: BOX_BOTTOM,
                width: stats.q3 - stats.q1,
                height: BOX_TOP - BOX_BOTTOM,
                color: BOX_EDGE,
            });
            ctx.draw(&CanvasLine {
                x1: stats.median,
                y1: BOX_BOTTOM,
                x2: stats.median,
                y2: BOX_TOP,
                color: MEDIAN_COLOR,
            });
            for whisker in &whiskers {
                ctx.draw(whisker);
            }
            ctx.draw(&Points {
                coords: &outliers,
                color: Color::White,
            });
            for (x, text) in &ticks {
                ctx.print(*x, 0.2, Span::styled(text.clone(), Style::default().fg(Color::Gray)));
            }
        })
        .render(area, buf);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::charts::ChartImage;
    use crate::models::Row;

    #[test]
    fn test_pie_shows_percentages() {
        let table = Table::from_rows(vec![
            Row::new("Bitcoin".into(), "BTC".into(), 1.0, 3e12, 1.0, 0.0),
            Row::new("Ethereum".into(), "ETH".into(), 1.0, 1e12, 1.0, 0.0),
        ]);

        let text = ChartImage::draw(ChartKind::Pie, &table).to_text();

        assert!(text.contains("75.0%"), "{}", text);
        assert!(text.contains("25.0%"), "{}", text);
        assert!(text.contains("Bitcoin"));
    }

    #[test]
    fn test_bar_chart_shows_prices() {
        let text = ChartImage::draw(ChartKind::Bar, &super::super::tests::top5()).to_text();

        assert!(text.contains("$50.00K"), "{}", text);
        assert!(text.contains("Price (USD)"));
        assert!(text.contains("Cryptocurrency"));
    }

    #[test]
    fn test_box_plot_ticks() {
        let text = ChartImage::draw(ChartKind::BoxPlot, &super::super::tests::top5()).to_text();

        // Médiane de [2.5, -1.2, 0.01, 4.8, -3.4]
        assert!(text.contains("0.01"), "{}", text);
        assert!(text.contains("24h Change (%)"));
    }

    #[test]
    fn test_box_plot_constant_values() {
        let table = Table::from_rows(vec![Row::new("Tether".into(), "USDT".into(), 1.0, 1e11, 1.0, 0.0)]);
        let text = ChartImage::draw(ChartKind::BoxPlot, &table).to_text();
        assert!(text.contains("0.00"));
    }
}
