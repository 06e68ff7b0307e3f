// ============================================================================
// Histogramme de la variation 24h (widget BarChart)
// ============================================================================
// 10 classes de largeur égale ; chaque barre est étiquetée par la borne
// inférieure de sa classe et affiche son effectif.
// ============================================================================

use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{
        block::{Position, Title},
        Bar, BarChart, BarGroup, Widget,
    },
};

use super::{figure_block, ChartKind};
use crate::analytics::histogram;
use crate::models::{Column, Table};

/// Nombre de classes
pub(super) const BINS: usize = 10;

const BAR_COLOR: Color = Color::Rgb(255, 165, 0); // orange

/// Histogramme de Change24h
pub(super) fn change_histogram(table: &Table, area: Rect, buf: &mut Buffer) {
    let bins = histogram(&table.column(Column::Change24h), BINS);

    let bars: Vec<Bar> = bins
        .iter()
        .map(|bin| {
            Bar::default()
                .value(bin.count)
                .text_value(bin.count.to_string())
                .label(Line::from(format!("{:.2}", bin.lower)))
        })
        .collect();

    // Largeur des barres : l'intérieur du cadre partagé entre les classes
    let inner_width = area.width.saturating_sub(2);
    let slot = (inner_width / BINS as u16).max(2);
    let bar_gap = 1;
    let bar_width = slot - bar_gap;

    let block = figure_block(ChartKind::Histogram.title())
        .title(
            Title::from(Span::styled(" Frequency ", Style::default().fg(Color::Gray)))
                .alignment(Alignment::Left),
        )
        .title(
            Title::from(Line::from(vec![
                Span::styled("■", Style::default().fg(BAR_COLOR)),
                Span::raw(" 24h Change (%) "),
            ]))
            .alignment(Alignment::Right),
        )
        .title(
            Title::from(Span::styled(" 24h Change (%) ", Style::default().fg(Color::Gray)))
                .position(Position::Bottom)
                .alignment(Alignment::Center),
        );

    BarChart::default()
        .block(block)
        .bar_width(bar_width)
        .bar_gap(bar_gap)
        .bar_style(Style::default().fg(BAR_COLOR))
        .value_style(Style::default().fg(Color::Black).bg(BAR_COLOR).add_modifier(Modifier::BOLD))
        .label_style(Style::default().fg(Color::Gray))
        .data(BarGroup::default().bars(&bars))
        .render(area, buf);
}
