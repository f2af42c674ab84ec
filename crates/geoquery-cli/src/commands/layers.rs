use crate::cli::LayersArgs;
use crate::loader;
use crate::output::OutputWriter;
use anyhow::Result;
use serde::Serialize;
use tabled::Tabled;

#[derive(Tabled, Serialize)]
struct LayerRow {
    #[tabled(rename = "Layer")]
    name: String,
    #[tabled(rename = "Kind")]
    kind: String,
    #[tabled(rename = "Features")]
    features: usize,
}

pub fn execute(args: LayersArgs, output: &OutputWriter) -> Result<()> {
    let layers = loader::load_layers(&args.data)?;

    let rows: Vec<LayerRow> = layers
        .names()
        .filter_map(|name| layers.get(name))
        .map(|layer| LayerRow {
            name: layer.name.clone(),
            kind: format!("{:?}", layer.kind),
            features: layer.len(),
        })
        .collect();

    output.table(rows)
}
