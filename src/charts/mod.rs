// ============================================================================
// Module : charts
// ============================================================================
// Rendu des 7 graphiques du top 5 dans des buffers ratatui hors-écran.
// Chaque graphique est une "image" statique et indépendante : aucun
// graphique ne dépend d'un autre, aucun état n'est partagé.
//
// CONCEPTS RATATUI :
// 1. Buffer::empty(area) : surface de dessin hors-écran
// 2. Widget::render(area, buf) : tout widget peut dessiner dans un Buffer
// 3. Le dashboard redessine l'image à la taille de son panneau
//
// Ordre fixe :
// 1. Line         : Price par Name
// 2. Pie          : part de MarketCap par Name
// 3. MarkerLine   : Change24h par Name, marqueurs + grille
// 4. LogScatter   : Price (x) vs MarketCap (y, échelle log)
// 5. Histogram    : Change24h, 10 classes
// 6. Bar          : Price par Name, labels à 45°
// 7. BoxPlot      : distribution de Change24h (horizontale)
// ============================================================================

mod canvas;    // Pie, Bar, BoxPlot (dessin libre sur Canvas)
mod histogram; // Histogramme (BarChart)
mod xy;        // Line, MarkerLine, LogScatter (Chart)

use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::Span,
    widgets::{Block, Borders},
};
use tracing::debug;

use crate::models::Table;

/// Nombre de graphiques produits pour une Table non vide
pub const CHART_COUNT: usize = 7;

/// Les 7 types de graphiques, dans l'ordre d'affichage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartKind {
    Line,
    Pie,
    MarkerLine,
    LogScatter,
    Histogram,
    Bar,
    BoxPlot,
}

impl ChartKind {
    pub const ALL: [ChartKind; CHART_COUNT] = [
        ChartKind::Line,
        ChartKind::Pie,
        ChartKind::MarkerLine,
        ChartKind::LogScatter,
        ChartKind::Histogram,
        ChartKind::Bar,
        ChartKind::BoxPlot,
    ];

    /// Titre du graphique
    pub fn title(&self) -> &'static str {
        match self {
            ChartKind::Line => "Cryptocurrency Price Comparison (USD)",
            ChartKind::Pie => "Market Cap Distribution",
            ChartKind::MarkerLine => "24h Price Change Comparison (%)",
            ChartKind::LogScatter => "Price vs Market Cap of Cryptocurrencies",
            ChartKind::Histogram => "Distribution of 24h Percentage Change",
            ChartKind::Bar => "Cryptocurrency Price Comparison (USD)",
            ChartKind::BoxPlot => "24h Change Distribution",
        }
    }

    /// Taille de la "figure" en cellules (largeur, hauteur)
    ///
    /// Une cellule de terminal est environ deux fois plus haute que large :
    /// 64x32 donne un camembert à peu près rond.
    pub fn size(&self) -> (u16, u16) {
        match self {
            ChartKind::Pie => (64, 32),
            _ => (100, 30),
        }
    }

    /// Zone effectivement occupée dans `area`
    ///
    /// Le camembert garde un rapport 2:1 (cellules deux fois plus hautes
    /// que larges), centré ; les autres graphiques prennent toute la zone.
    pub fn fit(&self, area: Rect) -> Rect {
        match self {
            ChartKind::Pie => {
                let width = area.width.min(area.height.saturating_mul(2));
                let height = area.height.min(width / 2);
                Rect::new(
                    area.x + (area.width - width) / 2,
                    area.y + (area.height - height) / 2,
                    width,
                    height,
                )
            }
            _ => area,
        }
    }

    /// Dessine le graphique dans une zone d'un buffer existant
    fn draw_into(&self, table: &Table, area: Rect, buf: &mut Buffer) {
        match self {
            ChartKind::Line => xy::price_line(table, area, buf),
            ChartKind::Pie => canvas::market_cap_pie(table, area, buf),
            ChartKind::MarkerLine => xy::change_markers(table, area, buf),
            ChartKind::LogScatter => xy::price_vs_market_cap(table, area, buf),
            ChartKind::Histogram => histogram::change_histogram(table, area, buf),
            ChartKind::Bar => canvas::price_bars(table, area, buf),
            ChartKind::BoxPlot => canvas::change_box_plot(table, area, buf),
        }
    }
}

/// Taille minimale (largeur, hauteur) sous laquelle rien n'est dessiné
const MIN_DRAW_SIZE: (u16, u16) = (16, 6);

/// Une image de graphique : la figure à sa taille nominale, plus les
/// lignes qui ont servi à la dessiner
#[derive(Debug, Clone, PartialEq)]
pub struct ChartImage {
    pub kind: ChartKind,
    pub buffer: Buffer,
    rows: Table,
}

impl ChartImage {
    /// Dessine un graphique dans un nouveau buffer, à la taille nominale
    fn draw(kind: ChartKind, table: &Table) -> Self {
        let (width, height) = kind.size();
        let area = Rect::new(0, 0, width, height);
        let mut buffer = Buffer::empty(area);
        kind.draw_into(table, area, &mut buffer);

        Self {
            kind,
            buffer,
            rows: table.clone(),
        }
    }

    /// Redessine le graphique à la taille de `area`, dans `buf`
    ///
    /// Les axes, la légende et les titres sont recalculés pour la zone :
    /// rien n'est rogné. Une zone trop petite reste vide.
    pub fn render_into(&self, area: Rect, buf: &mut Buffer) {
        let area = self.kind.fit(area);
        if area.width < MIN_DRAW_SIZE.0 || area.height < MIN_DRAW_SIZE.1 {
            return;
        }
        self.kind.draw_into(&self.rows, area, buf);
    }

    pub fn title(&self) -> &'static str {
        self.kind.title()
    }

    /// Contenu texte du buffer, une ligne par rangée (sans les couleurs)
    pub fn to_text(&self) -> String {
        let area = self.buffer.area;
        (area.top()..area.bottom())
            .map(|y| {
                let line: String = (area.left()..area.right())
                    .map(|x| self.buffer.get(x, y).symbol())
                    .collect();
                line.trim_end().to_string()
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Rend les 7 graphiques à partir du top 5
///
/// Table vide : aucun graphique (Vec vide), le dashboard affiche un message.
/// Moins de 5 lignes : les graphiques utilisent les lignes disponibles.
pub fn render(top: &Table) -> Vec<ChartImage> {
    if top.is_empty() {
        debug!("No rows, skipping chart rendering");
        return Vec::new();
    }

    let images: Vec<ChartImage> = ChartKind::ALL
        .iter()
        .map(|&kind| ChartImage::draw(kind, top))
        .collect();

    debug!(charts = images.len(), rows = top.len(), "Charts rendered");
    images
}

// ============================================================================
// Helpers partagés par les graphiques
// ============================================================================

/// Cadre d'une figure : bordure + titre centré
fn figure_block(title: &'static str) -> Block<'static> {
    Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::White))
        .title(Span::styled(
            format!(" {} ", title),
            Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
        ))
        .title_alignment(Alignment::Center)
}

/// Axe catégoriel : une position entière par nom
///
/// Avec un seul nom, la plage est élargie pour centrer le point.
fn category_axis(names: &[String]) -> ([f64; 2], Vec<Span<'static>>) {
    match names.len() {
        0 => ([0.0, 1.0], Vec::new()),
        1 => (
            [-1.0, 1.0],
            vec![Span::raw(""), Span::raw(short_name(&names[0])), Span::raw("")],
        ),
        n => (
            [0.0, (n - 1) as f64],
            names.iter().map(|name| Span::raw(short_name(name))).collect(),
        ),
    }
}

/// Bornes [min, max] avec une marge de 5% (ou ±1 si la plage est nulle)
fn padded_bounds(values: &[f64]) -> [f64; 2] {
    let (lo, hi) = values
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)));

    if !lo.is_finite() || !hi.is_finite() {
        return [0.0, 1.0];
    }

    if lo == hi {
        let pad = (lo.abs() * 0.1).max(1.0);
        return [lo - pad, hi + pad];
    }

    let margin = (hi - lo) * 0.05;
    [lo - margin, hi + margin]
}

/// Trois labels (bas, milieu, haut) pour un axe de valeurs
fn value_labels(bounds: [f64; 2], format: fn(f64) -> String) -> Vec<Span<'static>> {
    let [lo, hi] = bounds;
    vec![
        Span::raw(format(lo)),
        Span::raw(format((lo + hi) / 2.0)),
        Span::raw(format(hi)),
    ]
}

/// Tronque les noms longs pour les labels d'axe
fn short_name(name: &str) -> String {
    const MAX_LABEL: usize = 12;
    if name.chars().count() > MAX_LABEL {
        let truncated: String = name.chars().take(MAX_LABEL - 1).collect();
        format!("{}…", truncated)
    } else {
        name.to_string()
    }
}

// ============================================================================
// Tests unitaires
// ============================================================================
