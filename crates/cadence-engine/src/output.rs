//! Building history schemas and records from component state.

use std::path::Path;

use cadence_core::{FieldCatalog, FieldSet};
use cadence_grid::{Axis, Grid};
use cadence_history::{AxisSchema, Record, Schema, VariableSchema, SECONDS_PER_DAY};

use crate::params::ParameterStore;
use crate::state::State;

/// Declare axes, parameters and the written fields.
pub fn build_schema(
    component: &str,
    catalog: &FieldCatalog,
    grid: &Grid,
    params: &ParameterStore,
    fields: &FieldSet,
    restart: Option<&Path>,
) -> Schema {
    let mut attributes = vec![
        ("Conventions".to_string(), "cadence-history".to_string()),
        ("source".to_string(), component.to_string()),
        (
            "cadence_version".to_string(),
            env!("CARGO_PKG_VERSION").to_string(),
        ),
    ];
    if let Some(path) = restart {
        attributes.push(("restart_from".to_string(), path.display().to_string()));
    }
    let axes = Axis::ALL
        .iter()
        .map(|&axis| AxisSchema {
            name: axis.name().to_string(),
            long_name: axis.long_name().to_string(),
            units: axis.units().to_string(),
            values: grid.axis(axis).to_vec(),
        })
        .collect();
    let variables = fields
        .iter()
        .filter_map(|id| catalog.def(id))
        .map(|def| VariableSchema {
            name: def.name.clone(),
            long_name: def.long_name.clone(),
            units: def.units.clone(),
            rank: def.rank,
        })
        .collect();
    Schema {
        attributes,
        params: params.as_map().clone(),
        axes,
        variables,
    }
}

/// Snapshot the written fields at the current time.
pub fn build_record(state: &State, fields: &FieldSet, calday: f64) -> Record {
    let mut record = Record::new(state.elapsed_time() / SECONDS_PER_DAY, calday);
    for id in fields.iter() {
        if let (Some(name), Some(value)) = (state.catalog().name(id), state.now(id)) {
            record.push_field(name, value);
        }
    }
    record
}
