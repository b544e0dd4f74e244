use std::{io::Write, path::Path};

use anyhow::{Result, anyhow};

use super::{
    proj::Projection,
    writer::{SvgStringWriter, SvgWriter, escape, write_svg_footer, write_svg_header, write_svg_styles},
};
use crate::{color::round2, config::FeatureStyle, view::ViewState};

const WIDTH: f64 = 960.0;
const MARGIN: f64 = 10.0;
const LEGEND_HEIGHT: f64 = 48.0;
const SWATCH: f64 = 18.0;

/// Render `layers` of the current view (colored for the current year and filters)
/// to an SVG file. An empty `layers` slice means the currently visible layers.
pub fn render_svg(state: &ViewState, layers: &[usize], path: &Path) -> Result<()> {
    let mut writer = SvgWriter::new(path)?;
    draw_map(&mut writer, state, layers)?;
    writer.flush()?;
    Ok(())
}

/// Render to an SVG string (for WASM/browser use).
pub fn render_svg_string(state: &ViewState, layers: &[usize]) -> Result<String> {
    let mut writer = SvgStringWriter::new();
    draw_map(&mut writer, state, layers)?;
    writer.into_string()
}

fn draw_map<W: Write>(writer: &mut W, state: &ViewState, layers: &[usize]) -> Result<()> {
    let layers: Vec<usize> = if layers.is_empty() {
        state.visibility().visible_layers().collect()
    } else {
        layers.to_vec()
    };
    let bounds = state.boundaries().bounds_of(layers.iter().copied())
        .ok_or_else(|| anyhow!("[io::svg] Layers {layers:?} have no bounds; nothing to draw."))?;

    let (proj, map_height) = Projection::fit(bounds, WIDTH, MARGIN);
    write_svg_header(writer, WIDTH, map_height + LEGEND_HEIGHT, proj.scale, &bounds)?;
    write_svg_styles(writer)?;

    for &index in &layers {
        let layer = state.boundaries().layer(index)
            .ok_or_else(|| anyhow!("[io::svg] No layer {index}"))?;
        writeln!(writer, r#"<g id="layer-{index}">"#)?;
        for feature in layer.features() {
            let selected = state.selection().is_selected(feature.handle);
            let style = if selected {
                layer.config.style_options.merged(&layer.config.style_options_selected)
            } else {
                layer.config.style_options.clone()
            };
            let value = state.value_of(feature.handle)
                .map_or_else(|| "no data".to_string(), |v| round2(v).to_string());
            writeln!(
                writer,
                r#"<path class="area" fill-rule="evenodd" data-geocode="{code}" style="{style}" d="{d}"><title>{name}: {value}</title></path>"#,
                code = escape(&feature.geo_code),
                style = css(&style, &state.color_of(feature.handle).to_string()),
                d = proj.multipolygon_to_path(&feature.geometry),
                name = escape(&feature.name),
            )?;
        }
        writeln!(writer, "</g>")?;
    }

    draw_legend(writer, state, map_height)?;
    write_svg_footer(writer)
}

/// Inline CSS for one feature, with the layer's stroke options and the class fill.
fn css(style: &FeatureStyle, fill: &str) -> String {
    let mut css = format!(
        "fill:{fill};fill-opacity:{};stroke:{};stroke-width:{};stroke-opacity:{}",
        style.fill_opacity.unwrap_or(0.85),
        escape(style.color.as_deref().unwrap_or("#111827")),
        style.weight.unwrap_or(0.5),
        style.opacity.unwrap_or(1.0),
    );
    if let Some(dash) = &style.dash_array {
        css.push_str(&format!(";stroke-dasharray:{}", escape(dash)));
    }
    css
}

/// Year label plus one swatch per legend row, laid out left to right under the map.
fn draw_legend<W: Write>(writer: &mut W, state: &ViewState, top: f64) -> Result<()> {
    let items = state.scale().legend_items();
    let step = ((WIDTH - 2.0 * MARGIN - 60.0) / items.len() as f64).min(140.0);

    writeln!(writer, r#"<g class="legend" transform="translate({MARGIN},{top})">"#)?;
    writeln!(writer, r#"<text class="year" x="0" y="{:.1}">{}</text>"#, SWATCH, state.current_year())?;
    for (i, item) in items.iter().enumerate() {
        let x = 60.0 + i as f64 * step;
        writeln!(writer, r#"<rect x="{x:.1}" y="4" width="{SWATCH}" height="{SWATCH}" fill="{}"/>"#, item.color)?;
        writeln!(writer, r#"<text x="{:.1}" y="{:.1}">{}</text>"#, x + SWATCH + 4.0, SWATCH, escape(&item.label))?;
    }
    writeln!(writer, "</g>")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{render_svg, render_svg_string};
    use crate::{
        boundary::fixtures::{collection, layer_config, square},
        config::MapConfig,
        data::Record,
        view::ViewState,
    };

    fn state() -> ViewState {
        let config = MapConfig {
            geo_layers: vec![layer_config(0.0, 6.0, None), layer_config(7.0, 20.0, None)],
            legend_items: 2,
            ..MapConfig::default()
        };
        let docs = vec![
            collection(vec![square("R1", "North & East", 0.0, 0.0), square("R2", "South", 0.0, -1.0)]),
            collection(vec![square("L1", "Town", 0.0, 0.0)]),
        ];
        let records = vec![Record::new("R1", 2015, Some(10.0)), Record::new("R2", 2015, Some(30.0))];
        ViewState::new(config, records, &docs).unwrap()
    }

    #[test]
    fn draws_requested_layers_and_legend() {
        let svg = render_svg_string(&state(), &[0]).unwrap();
        assert!(svg.starts_with("<?xml"));
        assert!(svg.trim_end().ends_with("</svg>"));
        assert_eq!(svg.matches(r#"class="area""#).count(), 2);
        assert!(svg.contains(r#"data-geocode="R1""#));
        assert!(!svg.contains(r#"data-geocode="L1""#));
        assert!(svg.contains("North &amp; East: 10"));
        // Three legend rows for two classes.
        assert_eq!(svg.matches("<rect x=").count(), 3);
        assert!(svg.contains(">2015</text>"));
    }

    #[test]
    fn no_visible_layers_is_an_error() {
        // Nothing is visible before the view has seen a zoom level.
        assert!(render_svg_string(&state(), &[]).is_err());
    }

    #[test]
    fn writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("map.svg");
        render_svg(&state(), &[0, 1], &path).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text.matches(r#"class="area""#).count(), 3);
    }
}
