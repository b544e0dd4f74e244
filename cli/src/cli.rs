use std::path::PathBuf;

/// Choropleth map tooling (argument schema only)
#[derive(clap::Parser, Debug)]
#[command(name = "sdgmap", version, about, propagate_version = true)]
pub struct Cli {
    /// Increase output verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(clap::Subcommand, Debug)]
pub enum Commands {
    /// Render the map as it would appear at a zoom level to an SVG file
    Render(RenderArgs),

    /// Summarize a configuration and dataset: years, value range, legend and coverage
    Inspect(InspectArgs),

    /// Write one CSV row per feature with its current value and color
    Table(TableArgs),

    /// Link child boundaries to their parents through a lookup document
    Link(LinkArgs),
}

/// Inputs shared by every command that builds a map view.
#[derive(clap::Args, Debug)]
pub struct ViewArgs {
    /// Map configuration (JSON)
    #[arg(value_hint = clap::ValueHint::FilePath)]
    pub config: PathBuf,

    /// Indicator records (.csv or .json)
    #[arg(value_hint = clap::ValueHint::FilePath)]
    pub data: PathBuf,

    /// Directory that local serviceUrl paths resolve against, defaults to the config's directory
    #[arg(long, value_hint = clap::ValueHint::DirPath)]
    pub root: Option<PathBuf>,

    /// Year to show, defaults to the configured initial year
    #[arg(short, long)]
    pub year: Option<i32>,

    /// Disaggregation filter as field=value; repeat to allow several values
    #[arg(short, long = "filter", value_name = "FIELD=VALUE")]
    pub filters: Vec<String>,
}

#[derive(clap::Args, Debug)]
pub struct RenderArgs {
    #[command(flatten)]
    pub view: ViewArgs,

    /// Output SVG file, defaults to "./map.svg"
    #[arg(short, long, value_hint = clap::ValueHint::FilePath)]
    pub output: Option<PathBuf>,

    /// Zoom level deciding which layers are drawn
    #[arg(short, long, default_value_t = 0.0)]
    pub zoom: f64,
}

#[derive(clap::Args, Debug)]
pub struct InspectArgs {
    #[command(flatten)]
    pub view: ViewArgs,

    /// Pick the feature at this point (lon,lat) in each layer and print its record
    #[arg(long, value_name = "LON,LAT")]
    pub at: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct TableArgs {
    #[command(flatten)]
    pub view: ViewArgs,

    /// Output CSV file, defaults to "./features.csv"
    #[arg(short, long, value_hint = clap::ValueHint::FilePath)]
    pub output: Option<PathBuf>,

    /// Only include these layers (repeatable), defaults to all
    #[arg(short, long)]
    pub layer: Vec<usize>,
}

#[derive(clap::Args, Debug)]
pub struct LinkArgs {
    /// Parent boundaries (GeoJSON FeatureCollection)
    #[arg(long, value_hint = clap::ValueHint::FilePath)]
    pub parents: PathBuf,

    /// Child boundaries (GeoJSON FeatureCollection)
    #[arg(long, value_hint = clap::ValueHint::FilePath)]
    pub children: PathBuf,

    /// Child -> parent lookup (GeoJSON FeatureCollection)
    #[arg(long, value_hint = clap::ValueHint::FilePath)]
    pub lookup: PathBuf,

    /// Output directory for parents.geo.json and children.geo.json, defaults to "."
    #[arg(short, long, value_hint = clap::ValueHint::DirPath)]
    pub output: Option<PathBuf>,

    #[arg(long, default_value = "RGN16CD")]
    pub lookup_parent: String,

    #[arg(long, default_value = "LAD16CD")]
    pub lookup_child: String,

    #[arg(long, default_value = "rgn17cd")]
    pub parent_id: String,

    #[arg(long, default_value = "lad16cd")]
    pub child_id: String,
}
