use std::path::{Path, PathBuf};

use anyhow::Context;
use partgen_core::Unit;
use partgen_export::generate_part;
use partgen_layout::{AliasMap, Board, Bus, Reconciliation};
use partgen_parser::PartDefinition;
use serde::Serialize;
use tracing::{debug, info};

use crate::error::CliError;

pub struct RenderOptions {
    pub input: PathBuf,
    pub output: PathBuf,
    pub clean: bool,
    pub bundle: bool,
    pub debug: bool,
}

pub fn run_render(opts: RenderOptions) -> Result<(), CliError> {
    let raw = std::fs::read_to_string(&opts.input).map_err(|e| {
        CliError::input(format!(
            "Could not read config {}: {e}",
            opts.input.display()
        ))
    })?;
    let part = PartDefinition::from_yaml_str(&raw)?;
    info!(board = part.board.name(), "parsed board definition");

    // Everything is generated in memory before the output folder is touched.
    let generated = generate_part(&part.board, &part.metadata)?;

    if opts.clean && opts.output.exists() {
        debug!(dir = %opts.output.display(), "cleaning output folder");
        std::fs::remove_dir_all(&opts.output).map_err(|e| CliError::processing(e.to_string()))?;
    }
    std::fs::create_dir_all(&opts.output).map_err(|e| CliError::processing(e.to_string()))?;

    generated.package.write(&opts.output)?;
    if opts.bundle {
        let bundle = opts.output.join(generated.package.bundle_file_name());
        generated.package.write_bundle(&bundle)?;
    }
    if opts.debug {
        write_pin_dump(&opts.output, &part.board, &generated.reconciliation)
            .map_err(|e| CliError::processing(format!("{e:#}")))?;
    }

    info!(dir = %opts.output.display(), "done");
    Ok(())
}

#[derive(Debug, Serialize)]
struct PinDump<'a> {
    board: &'a str,
    unit: Unit,
    rows: Vec<RowDump<'a>>,
    aliases: &'a AliasMap,
    buses: &'a [Bus],
}

#[derive(Debug, Serialize)]
struct RowDump<'a> {
    name: &'a str,
    pins: Vec<PinEntry<'a>>,
}

#[derive(Debug, Serialize)]
struct PinEntry<'a> {
    name: Option<&'a str>,
    x: f64,
    y: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    schematic: Option<String>,
}

fn write_pin_dump(output: &Path, board: &Board, rec: &Reconciliation) -> anyhow::Result<()> {
    let dir = output.join("debug");
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("Could not create {}", dir.display()))?;

    let rows = board
        .catalog()
        .rows()
        .map(|row| RowDump {
            name: &row.name,
            pins: row
                .pins
                .iter()
                .map(|pin| PinEntry {
                    name: pin.name(),
                    x: pin.x(),
                    y: pin.y(),
                    schematic: pin.schematic.as_ref().map(ToString::to_string),
                })
                .collect(),
        })
        .collect();
    let dump = PinDump {
        board: board.name(),
        unit: board.config().unit,
        rows,
        aliases: &rec.aliases,
        buses: &rec.buses,
    };

    let path = dir.join("pins.yaml");
    std::fs::write(&path, serialize_yaml_no_doc(&dump)?)
        .with_context(|| format!("Could not write {}", path.display()))?;
    debug!(path = %path.display(), "wrote pin dump");
    Ok(())
}

fn serialize_yaml_no_doc<T: Serialize>(value: &T) -> anyhow::Result<String> {
    let s = serde_yaml::to_string(value).context("Could not serialize pin dump")?;
    Ok(s.strip_prefix("---\n").map(str::to_string).unwrap_or(s))
}
