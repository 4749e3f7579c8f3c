//! SVG emission from a positioned slopegraph layout.

use crate::model::{SegmentData, SlopegraphLayout, TextAnchor, TextLabel};
use std::fmt::Write as _;

const FONT_STACK: &str = "Arial, Helvetica, sans-serif";

fn fmt_num(v: f64) -> String {
    if !v.is_finite() {
        return "0".to_string();
    }
    let mut r = (v * 1000.0).round() / 1000.0;
    if r.abs() < 0.0005 {
        r = 0.0;
    }
    let mut s = format!("{r:.3}");
    if s.contains('.') {
        while s.ends_with('0') {
            s.pop();
        }
        if s.ends_with('.') {
            s.pop();
        }
    }
    if s == "-0" { "0".to_string() } else { s }
}

fn escape_xml(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(ch),
        }
    }
    out
}

fn anchor_attr(anchor: TextAnchor) -> &'static str {
    match anchor {
        TextAnchor::Start => "start",
        TextAnchor::Middle => "middle",
        TextAnchor::End => "end",
    }
}

fn render_text(out: &mut String, label: &TextLabel) {
    let weight = if label.bold { r#" font-weight="bold""# } else { "" };
    let _ = write!(
        out,
        r#"<text x="{}" y="{}" fill="{}" font-size="{}" text-anchor="{}"{}>{}</text>"#,
        fmt_num(label.x),
        fmt_num(label.y),
        escape_xml(&label.fill),
        fmt_num(label.font_size),
        anchor_attr(label.anchor),
        weight,
        escape_xml(&label.text)
    );
    out.push('\n');
}

fn render_segment(out: &mut String, segment: &SegmentData) {
    let _ = writeln!(
        out,
        r#"<line x1="{}" y1="{}" x2="{}" y2="{}" stroke="{}" stroke-width="{}" />"#,
        fmt_num(segment.x1),
        fmt_num(segment.y1),
        fmt_num(segment.x2),
        fmt_num(segment.y2),
        escape_xml(&segment.stroke_fill),
        fmt_num(segment.stroke_width)
    );
}

pub fn render_svg(layout: &SlopegraphLayout) -> String {
    let mut out = String::new();
    let _ = writeln!(
        &mut out,
        r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 {w} {h}" width="{w}" height="{h}" font-family="{font}">"#,
        w = fmt_num(layout.width),
        h = fmt_num(layout.height),
        font = FONT_STACK
    );

    let _ = writeln!(
        &mut out,
        r#"<rect class="background" x="0" y="0" width="{}" height="{}" fill="{}" />"#,
        fmt_num(layout.width),
        fmt_num(layout.height),
        escape_xml(&layout.background)
    );

    out.push_str(r#"<g class="slopes">"#);
    out.push('\n');
    for trace in &layout.traces {
        if trace.points.len() >= 2 {
            let mut d = String::new();
            for (idx, p) in trace.points.iter().enumerate() {
                let cmd = if idx == 0 { 'M' } else { 'L' };
                let _ = write!(&mut d, "{}{} {} ", cmd, fmt_num(p.x), fmt_num(p.y));
            }
            let _ = writeln!(
                &mut out,
                r#"<path d="{}" fill="none" stroke="{}" stroke-width="{}" stroke-linecap="round" />"#,
                d.trim_end(),
                escape_xml(&trace.color),
                fmt_num(trace.stroke_width)
            );
        }
        for p in &trace.points {
            let _ = writeln!(
                &mut out,
                r#"<circle cx="{}" cy="{}" r="{}" fill="{}" />"#,
                fmt_num(p.x),
                fmt_num(p.y),
                fmt_num(trace.marker_radius),
                escape_xml(&trace.color)
            );
        }
    }
    out.push_str("</g>\n");

    out.push_str(r#"<g class="axis">"#);
    out.push('\n');
    render_segment(&mut out, &layout.baseline);
    for label in &layout.category_labels {
        render_text(&mut out, label);
    }
    out.push_str("</g>\n");

    out.push_str(r#"<g class="annotations">"#);
    out.push('\n');
    for label in &layout.value_labels {
        render_text(&mut out, label);
    }
    out.push_str("</g>\n");

    out.push_str(r#"<g class="notes">"#);
    out.push('\n');
    for label in &layout.notes {
        render_text(&mut out, label);
    }
    out.push_str("</g>\n");

    out.push_str(r#"<g class="chrome">"#);
    out.push('\n');
    render_text(&mut out, &layout.title);
    for label in &layout.credit {
        render_text(&mut out, label);
    }
    out.push_str("</g>\n");

    out.push_str("</svg>\n");
    out
}
