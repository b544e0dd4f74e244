use anyhow::{Result, anyhow};

fn parse_point(text: &str) -> Result<(f64, f64)> {
    let (lon, lat) = text.split_once(',')
        .ok_or_else(|| anyhow!("Point {text:?} is not of the form lon,lat"))?;
    Ok((lon.trim().parse()?, lat.trim().parse()?))
}

pub async fn run(_cli: &crate::cli::Cli, args: &crate::cli::InspectArgs) -> Result<()> {
    let (view, _) = super::load_view(&args.view, 0.0).await?;
    let state = view.state();

    println!("years: {:?} (showing {})", view.years(), view.current_year());
    let range = state.scale().range();
    println!("values: {} to {}", range.min, range.max);
    if !view.filters().is_empty() {
        println!("filters: {}", serde_json::to_string(view.filters())?);
    }

    println!("legend:");
    for item in state.scale().legend_items() {
        println!("  {} {}", item.color, item.label);
    }

    for layer in state.boundaries().layers() {
        let with_data = layer.features().iter()
            .filter(|f| state.record_of(f.handle).is_some())
            .count();
        println!("layer {} (zoom {}-{}): {} features, {} with data in {}",
            layer.index, layer.config.min_zoom, layer.config.max_zoom, layer.len(), with_data, view.current_year());
    }

    if let Some(at) = &args.at {
        let (lon, lat) = parse_point(at)?;
        for layer in state.boundaries().layers() {
            let Some(feature) = layer.feature_at(lon, lat) else {
                println!("layer {}: nothing at {lon},{lat}", layer.index);
                continue;
            };
            let value = state.value_of(feature.handle)
                .map_or_else(|| "no data".to_string(), |v| v.to_string());
            println!("layer {}: {} {} = {} ({})",
                layer.index, feature.geo_code, feature.name, value, state.color_of(feature.handle));
            if let Some(record) = state.record_of(feature.handle) {
                for (field, value) in &record.fields {
                    println!("    {field}: {value}");
                }
            }
        }
    }
    Ok(())
}
