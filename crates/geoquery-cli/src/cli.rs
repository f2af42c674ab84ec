use clap::{Parser, Subcommand};
use std::path::PathBuf;

use geoquery_core::models::MatchOp;

/// GeoQuery - spatial and attribute queries over layered map data
#[derive(Parser, Debug)]
#[command(name = "geoquery")]
#[command(about = "Spatial and attribute queries over GeoJSON layers", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Output results in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Engine configuration file (TOML)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List the layers loaded from the given GeoJSON files
    Layers(LayersArgs),

    /// Run a query against one layer
    Query(QueryArgs),
}

#[derive(Parser, Debug)]
pub struct LayersArgs {
    /// GeoJSON files to load; each file becomes a layer named after its stem
    #[arg(required = true, value_name = "FILE")]
    pub data: Vec<PathBuf>,
}

#[derive(Parser, Debug)]
pub struct QueryArgs {
    /// GeoJSON files to load
    #[arg(long, required = true, value_name = "FILE")]
    pub data: Vec<PathBuf>,

    /// Target layer name
    #[arg(long)]
    pub layer: String,

    #[command(subcommand)]
    pub kind: QueryCommand,
}

#[derive(Subcommand, Debug)]
pub enum QueryCommand {
    /// Features within a radius of a point (centroid distance)
    Buffer {
        /// Center longitude
        #[arg(long)]
        lng: f64,

        /// Center latitude
        #[arg(long)]
        lat: f64,

        /// Radius in meters (defaults to the configured buffer radius)
        #[arg(long)]
        radius: Option<f64>,
    },

    /// The k features closest to a point
    Nearest {
        /// Center longitude
        #[arg(long)]
        lng: f64,

        /// Center latitude
        #[arg(long)]
        lat: f64,

        /// Number of results (defaults to the configured count)
        #[arg(long, short = 'k')]
        count: Option<usize>,
    },

    /// Features whose bounding box overlaps a source geometry's
    Intersect {
        /// Source geometry: inline GeoJSON or a path to a GeoJSON file
        #[arg(long, value_name = "GEOMETRY")]
        source: String,
    },

    /// Features with a property matching a search value
    Attribute {
        /// Field to search (every property is scanned when omitted)
        #[arg(long)]
        field: Option<String>,

        /// Match operator (equals, contains, starts-with)
        #[arg(long, default_value = "contains", value_parser = parse_match_op)]
        op: MatchOp,

        /// Search value
        #[arg(long)]
        value: String,
    },
}

fn parse_match_op(raw: &str) -> Result<MatchOp, String> {
    raw.parse::<MatchOp>().map_err(|e| e.to_string())
}
