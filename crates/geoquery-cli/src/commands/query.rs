use crate::cli::{QueryArgs, QueryCommand};
use crate::loader;
use crate::output::OutputWriter;
use anyhow::{anyhow, Result};
use geo::Point;
use serde::Serialize;
use tabled::Tabled;

use geoquery_core::config::EngineConfig;
use geoquery_core::models::{FieldSelector, QuerySpec};
use geoquery_core::ports::LayerResolver;
use geoquery_engine::{evaluator, presenter};

#[derive(Tabled, Serialize)]
struct ResultRow {
    #[tabled(rename = "#")]
    index: usize,
    #[tabled(rename = "Name")]
    label: String,
    #[tabled(rename = "Detail")]
    detail: String,
}

pub fn execute(args: QueryArgs, output: &OutputWriter, config: &EngineConfig) -> Result<()> {
    let layers = loader::load_layers(&args.data)?;
    let spec = build_spec(&args, config)?;

    if !output.is_json() {
        print_plan(&spec, output);
    }

    let features = layers
        .features(&args.layer)
        .ok_or_else(|| anyhow!("unknown layer '{}'", args.layer))?;

    let result =
        evaluator::evaluate_with_aliases(&spec, &features, Some(&config.field_aliases.value))?;
    let entries = presenter::present(&result, &config.name_fields.value);

    if entries.is_empty() {
        output.info("no features matched");
        return Ok(());
    }

    if output.is_json() {
        output.result(entries)
    } else {
        let rows: Vec<ResultRow> = entries
            .into_iter()
            .enumerate()
            .map(|(index, entry)| ResultRow {
                index: index + 1,
                label: entry.label,
                detail: entry.secondary.unwrap_or_default(),
            })
            .collect();
        output.table(rows)
    }
}

fn build_spec(args: &QueryArgs, config: &EngineConfig) -> Result<QuerySpec> {
    let spec = match &args.kind {
        QueryCommand::Buffer { lng, lat, radius } => QuerySpec::Buffer {
            layer: args.layer.clone(),
            center: Point::new(*lng, *lat),
            radius_m: radius.unwrap_or(config.buffer_radius_m.value),
        },
        QueryCommand::Nearest { lng, lat, count } => QuerySpec::Nearest {
            layer: args.layer.clone(),
            center: Point::new(*lng, *lat),
            k: count.unwrap_or(config.nearest_count.value),
        },
        QueryCommand::Intersect { source } => QuerySpec::IntersectBounds {
            layer: args.layer.clone(),
            source: loader::parse_source_geometry(source)?,
        },
        QueryCommand::Attribute { field, op, value } => QuerySpec::Attribute {
            layer: args.layer.clone(),
            field: field
                .as_ref()
                .map(FieldSelector::named)
                .unwrap_or(FieldSelector::Any),
            op: *op,
            value: value.clone(),
        },
    };
    Ok(spec)
}

fn print_plan(spec: &QuerySpec, output: &OutputWriter) {
    output.section("Query Plan");
    output.kv("Layer", spec.layer());
    match spec {
        QuerySpec::Buffer { center, radius_m, .. } => {
            output.kv("Query", "buffer");
            output.kv("Center", format!("[{}, {}]", center.x(), center.y()));
            output.kv("Radius", presenter::format_distance(*radius_m));
        }
        QuerySpec::Nearest { center, k, .. } => {
            output.kv("Query", "nearest");
            output.kv("Center", format!("[{}, {}]", center.x(), center.y()));
            output.kv("Count", k);
        }
        QuerySpec::IntersectBounds { source, .. } => {
            output.kv("Query", "intersect");
            output.kv("Source", format!("{:?}", source.kind()));
        }
        QuerySpec::Attribute { field, op, value, .. } => {
            output.kv("Query", "attribute");
            let field = match field {
                FieldSelector::Any => "*".to_string(),
                FieldSelector::Named(name) => name.clone(),
            };
            output.kv("Field", field);
            output.kv("Match", format!("{:?} '{}'", op, value));
        }
    }
    output.section("Results");
}
