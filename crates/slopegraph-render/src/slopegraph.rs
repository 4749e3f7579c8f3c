//! Slopegraph layout: positions every visual element of the chart from the
//! comparison tables and the theme.

use crate::model::{
    SegmentData, SlopePoint, SlopeTrace, SlopegraphLayout, TextAnchor, TextLabel,
};
use crate::{Error, Result};
use indexmap::IndexMap;
use slopegraph_core::geom::{Point, point};
use slopegraph_core::{ChartTheme, CityPair, ComparisonRow, ItemObservation};

struct Scale {
    x_b: f64,
    x_a: f64,
    plot_top: f64,
    plot_height: f64,
    y_min: f64,
    y_span: f64,
}

impl Scale {
    fn new(theme: &ChartTheme) -> Self {
        let plot_left = theme.margin.left;
        let plot_width = theme.width - theme.margin.left - theme.margin.right;
        let y_span = theme.y_max - theme.y_min;
        Self {
            // Two band categories: centers at 1/4 and 3/4 of the plot width,
            // baseline city on the left.
            x_b: plot_left + plot_width * 0.25,
            x_a: plot_left + plot_width * 0.75,
            plot_top: theme.margin.top,
            plot_height: theme.height - theme.margin.top - theme.margin.bottom,
            y_min: theme.y_min,
            y_span: if y_span == 0.0 { 1.0 } else { y_span },
        }
    }

    fn y(&self, value: f64) -> f64 {
        self.plot_top + self.plot_height * (1.0 - (value - self.y_min) / self.y_span)
    }

    fn at(&self, x: f64, value: f64) -> Point {
        point(x, self.y(value))
    }
}

fn column_x(scale: &Scale, pair: &CityPair, city: &str) -> Result<f64> {
    if city == pair.city_a {
        Ok(scale.x_a)
    } else if city == pair.city_b {
        Ok(scale.x_b)
    } else {
        Err(Error::UnknownCity {
            city: city.to_string(),
        })
    }
}

fn label(text: String, at: Point, fill: &str, font_size: f64, anchor: TextAnchor) -> TextLabel {
    TextLabel {
        text,
        x: at.x,
        y: at.y,
        fill: fill.to_string(),
        font_size,
        anchor,
        bold: false,
    }
}

fn percent(variance: f64) -> String {
    format!("{:.0}%", variance * 100.0)
}

/// Builds the positioned layout. Trace order and annotation order both
/// follow the comparison-row order, which the pipeline pins to selection
/// order.
pub fn layout_slopegraph(
    observations: &[ItemObservation],
    rows: &[ComparisonRow],
    pair: &CityPair,
    theme: &ChartTheme,
) -> Result<SlopegraphLayout> {
    if rows.is_empty() {
        return Err(Error::EmptyComparison);
    }

    let scale = Scale::new(theme);
    let plot_left = theme.margin.left;
    let plot_width = theme.width - theme.margin.left - theme.margin.right;
    let plot_bottom = theme.height - theme.margin.bottom;

    // One trace per item, points in x order so paths run left to right.
    let mut grouped: IndexMap<&str, Vec<&ItemObservation>> = IndexMap::new();
    for obs in observations {
        grouped.entry(obs.item.as_str()).or_default().push(obs);
    }

    let mut traces = Vec::with_capacity(grouped.len());
    for (item, group) in grouped {
        let mut points = Vec::new();
        for obs in &group {
            let Some(price) = obs.price else { continue };
            let x = column_x(&scale, pair, &obs.city)?;
            let p = scale.at(x, price);
            points.push(SlopePoint { x: p.x, y: p.y });
        }
        points.sort_by(|a, b| a.x.total_cmp(&b.x));
        traces.push(SlopeTrace {
            item: item.to_string(),
            color: group[0].color.clone(),
            stroke_width: group[0].line_width,
            marker_radius: group[0].marker_size / 2.0,
            points,
        });
    }

    let mut value_labels = Vec::new();
    for row in rows {
        value_labels.push(label(
            format!("${:.2}  ", row.price_b),
            scale.at(scale.x_b, row.label_y),
            &row.color,
            theme.font_size,
            TextAnchor::End,
        ));
        if let (Some(price_a), Some(variance)) = (row.price_a, row.relative_variance) {
            value_labels.push(label(
                format!("  {}: ${:.2} ({})", row.item, price_a, percent(variance)),
                scale.at(scale.x_a, price_a),
                &row.color,
                theme.font_size,
                TextAnchor::Start,
            ));
        }
    }

    let tick_y = plot_bottom + theme.font_size * 1.5;
    let category_labels = vec![
        label(
            pair.city_b.clone(),
            point(scale.x_b, tick_y),
            &theme.font_color,
            theme.font_size,
            TextAnchor::Middle,
        ),
        label(
            pair.city_a.clone(),
            point(scale.x_a, tick_y),
            &theme.font_color,
            theme.font_size,
            TextAnchor::Middle,
        ),
    ];

    // The axis line is drawn manually so it only spans the two categories.
    let baseline_y = scale.y(theme.y_min + 0.1);
    let baseline = SegmentData {
        x1: scale.x_b,
        y1: baseline_y,
        x2: scale.x_a,
        y2: baseline_y,
        stroke_fill: theme.line_color.clone(),
        stroke_width: theme.line_width,
    };

    let title = label(
        theme.title.clone(),
        point(plot_left - plot_width * 0.005, theme.margin.top - 8.0),
        &theme.title_color,
        theme.title_size,
        TextAnchor::Start,
    );

    let notes = layout_notes(rows, pair, theme, &scale, plot_left, plot_width);

    let credit_size = theme.font_size - 4.0;
    let credit_line_height = credit_size * 1.3;
    let credit_x = plot_left - plot_width * 0.005;
    let credit = vec![
        label(
            format!("Created by: {}", theme.created_by),
            point(credit_x, theme.height - 10.0 - credit_line_height),
            &theme.font_color,
            credit_size,
            TextAnchor::Start,
        ),
        label(
            format!("Data source: {}", theme.data_source),
            point(credit_x, theme.height - 10.0),
            &theme.font_color,
            credit_size,
            TextAnchor::Start,
        ),
    ];

    Ok(SlopegraphLayout {
        width: theme.width,
        height: theme.height,
        background: theme.background_color.clone(),
        title,
        traces,
        value_labels,
        category_labels,
        baseline,
        notes,
        credit,
    })
}

/// Commentary callouts in the right margin: one for the biggest absolute
/// price gap, one for the biggest percentage gap (skipped when it names the
/// same item). The closing line of each callout carries the item's color.
fn layout_notes(
    rows: &[ComparisonRow],
    pair: &CityPair,
    theme: &ChartTheme,
    scale: &Scale,
    plot_left: f64,
    plot_width: f64,
) -> Vec<TextLabel> {
    let compared: Vec<&ComparisonRow> = rows
        .iter()
        .filter(|r| r.price_a.is_some() && r.relative_variance.is_some())
        .collect();

    let by_absolute = compared.iter().copied().max_by(|a, b| {
        let da = (a.price_a.unwrap() - a.price_b).abs();
        let db = (b.price_a.unwrap() - b.price_b).abs();
        da.total_cmp(&db)
    });
    let by_percent = compared.iter().copied().max_by(|a, b| {
        a.relative_variance
            .unwrap()
            .abs()
            .total_cmp(&b.relative_variance.unwrap().abs())
    });

    let note_x = plot_left + plot_width * 1.03;
    let line_height = theme.font_size * 1.25;
    let mut notes = Vec::new();

    let mut push_note = |row: &ComparisonRow, intro: [String; 2], detail: String| {
        let price_a = row.price_a.unwrap_or(row.price_b);
        let top = scale.y(price_a + 0.4) + theme.font_size;
        for (idx, text) in intro.into_iter().enumerate() {
            notes.push(TextLabel {
                text,
                x: note_x,
                y: top + line_height * idx as f64,
                fill: theme.font_color.clone(),
                font_size: theme.font_size,
                anchor: TextAnchor::Start,
                bold: false,
            });
        }
        notes.push(TextLabel {
            text: detail,
            x: note_x,
            y: top + line_height * 2.0,
            fill: row.color.clone(),
            font_size: theme.font_size,
            anchor: TextAnchor::Start,
            bold: true,
        });
    };

    if let Some(row) = by_absolute {
        let price_a = row.price_a.unwrap();
        let diff = (price_a - row.price_b).abs();
        let direction = if price_a < row.price_b {
            "cheaper"
        } else {
            "more expensive"
        };
        push_note(
            row,
            [
                "The biggest difference in absolute".to_string(),
                format!("price is {}.", row.item),
            ],
            format!(
                "{} is ${:.0} {} at ${:.0}.",
                pair.city_a, diff, direction, price_a
            ),
        );
    }

    if let (Some(row), Some(abs_row)) = (by_percent, by_absolute) {
        if row.item != abs_row.item {
            let price_a = row.price_a.unwrap();
            let pct = (row.relative_variance.unwrap() * 100.0).abs();
            let direction = if price_a < row.price_b {
                "cheaper"
            } else {
                "more expensive"
            };
            push_note(
                row,
                [
                    "The largest difference in price".to_string(),
                    format!("percentage is {}.", row.item),
                ],
                format!(
                    "{} is {:.0}% {} at ${:.0}.",
                    pair.city_a, pct, direction, price_a
                ),
            );
        }
    }

    notes
}
