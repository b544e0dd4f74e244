pub mod inspect;
pub mod link;
pub mod render;
pub mod table;

use std::path::Path;

use anyhow::{Context, Result, anyhow, bail};
use sdgmap::{
    CommandBuffer, Fetch, FieldSelection, FileFetcher, FilterSelection, HttpFetcher, MapConfig, MapView,
    Record, UiEvent, read_records_csv, read_records_json,
};

use crate::cli::ViewArgs;

/// Local paths go through the filesystem, `http(s)://` URLs over the network.
struct CliFetcher {
    files: FileFetcher,
    http: HttpFetcher,
}

impl Fetch for CliFetcher {
    async fn fetch(&self, url: &str) -> Result<String> {
        if url.starts_with("http://") || url.starts_with("https://") {
            self.http.fetch(url).await
        } else {
            self.files.fetch(url).await
        }
    }
}

fn read_records(path: &Path) -> Result<Vec<Record>> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("json") => read_records_json(path),
        _ => read_records_csv(path),
    }
}

/// Group `field=value` arguments by field, keeping first-seen order.
pub(crate) fn parse_filters(args: &[String]) -> Result<FilterSelection> {
    let mut fields: Vec<FieldSelection> = Vec::new();
    for arg in args {
        let (field, value) = arg.split_once('=')
            .ok_or_else(|| anyhow!("Filter {arg:?} is not of the form field=value"))?;
        match fields.iter_mut().find(|f| f.field == field) {
            Some(existing) => existing.values.push(value.to_string()),
            None => fields.push(FieldSelection::new(field, [value])),
        }
    }
    Ok(FilterSelection(fields))
}

/// Load config, records and boundaries, attach to a command buffer at `zoom`,
/// then apply the requested year and filters.
pub(crate) async fn load_view(args: &ViewArgs, zoom: f64) -> Result<(MapView, CommandBuffer)> {
    let config = MapConfig::from_file(&args.config)?;
    let records = read_records(&args.data)?;
    tracing::info!("Read {} records from {}", records.len(), args.data.display());

    let root = match &args.root {
        Some(root) => root.clone(),
        None => args.config.parent().map(Path::to_path_buf).unwrap_or_default(),
    };
    let fetcher = CliFetcher { files: FileFetcher::with_root(root), http: HttpFetcher::new()? };

    let mut view = MapView::load(config, records, &fetcher).await
        .with_context(|| format!("Failed to build map from {}", args.config.display()))?;
    let mut surface = CommandBuffer::new(zoom);
    view.attach(&mut surface)?;

    if let Some(year) = args.year {
        let Some(index) = view.years().iter().position(|&y| y == year) else {
            bail!("No data for year {year} (years: {:?})", view.years());
        };
        view.dispatch(UiEvent::YearInput(index), &mut surface)?;
    }
    if !args.filters.is_empty() {
        view.dispatch(UiEvent::UpdateFilters(parse_filters(&args.filters)?), &mut surface)?;
    }
    Ok((view, surface))
}

#[cfg(test)]
mod tests {
    use super::parse_filters;

    #[test]
    fn filters_group_by_field() {
        let filters = parse_filters(&["Sex=Female".to_string(), "Age=16-24".to_string(), "Sex=Male".to_string()]).unwrap();
        assert_eq!(filters.0.len(), 2);
        assert_eq!(filters.0[0].values, vec!["Female", "Male"]);
        assert!(parse_filters(&["Sex".to_string()]).is_err());
    }
}
