use serde_json::json;
use slopegraph_core::{ChartTheme, CityPair, Dataset, ItemCatalog, ItemSelection, run_pipeline};
use slopegraph_render::{layout_slopegraph, svg::render_svg};
use std::path::PathBuf;

fn workspace_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..")
}

fn render_fixture(theme: &ChartTheme) -> String {
    let path = workspace_root().join("fixtures").join("cost_of_living.csv");
    let dataset = Dataset::from_path(&path).expect("fixture");
    let catalog = ItemCatalog::kaggle_2022();
    let selection = ItemSelection::restaurant_basket(&catalog).expect("selection");
    let pair = CityPair::london_new_york();
    let comparison = run_pipeline(&dataset, &pair, &selection, theme).expect("pipeline");
    let layout =
        layout_slopegraph(&comparison.observations, &comparison.rows, &pair, theme).unwrap();
    render_svg(&layout)
}

#[test]
fn svg_document_has_canvas_and_background() {
    let svg = render_fixture(&ChartTheme::default());
    assert!(svg.starts_with("<svg"));
    assert!(svg.contains(r#"viewBox="0 0 1280 720""#));
    assert!(svg.contains(r##"fill="#c9cdcf""##));
    assert!(svg.trim_end().ends_with("</svg>"));
}

#[test]
fn svg_contains_traces_and_annotations() {
    let theme = ChartTheme::default();
    let svg = render_fixture(&theme);

    // Emphasized slopes in their highlight colors.
    assert!(svg.contains(r##"stroke="#076b78""##));
    assert!(svg.contains(r##"stroke="#0cbdd4""##));
    // Annotation texts, including the variance callouts.
    assert!(svg.contains("Meal (Inexpensive Restaurant): $18.00 (-28%)"));
    assert!(svg.contains("Imported Beer: $6.00 (-40%)"));
    assert!(svg.contains("$25.00"));
    // Category labels and the manual baseline.
    assert!(svg.contains(">New York</text>"));
    assert!(svg.contains(">London</text>"));
    assert!(svg.contains("<line "));
    // Title and credit.
    assert!(svg.contains(&theme.title));
    assert!(svg.contains("Created by: Tom Price"));
}

#[test]
fn svg_notes_call_out_the_largest_gaps() {
    let svg = render_fixture(&ChartTheme::default());
    assert!(svg.contains("The biggest difference in absolute"));
    assert!(svg.contains("London is $7 cheaper at $18."));
    assert!(svg.contains("The largest difference in price"));
    assert!(svg.contains("London is 40% cheaper at $6."));
}

#[test]
fn svg_escapes_reserved_characters_in_text() {
    let theme = ChartTheme::default()
        .merged(&json!({ "title": "Fish & Chips <Index>" }))
        .unwrap();
    let svg = render_fixture(&theme);
    assert!(svg.contains("Fish &amp; Chips &lt;Index&gt;"));
    assert!(!svg.contains("Fish & Chips <Index>"));
}

#[test]
fn svg_is_deterministic() {
    let theme = ChartTheme::default();
    assert_eq!(render_fixture(&theme), render_fixture(&theme));
}
