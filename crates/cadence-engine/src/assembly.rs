//! Kernel input assembly per stepping scheme.
//!
//! The kernel sees the union of the current state, the grid and the
//! parameters (later sources shadow earlier ones) plus the recompute
//! frequency. The stepping scheme then decides which time level fields
//! are drawn from:
//!
//! - explicit: the current level only;
//! - implicit: any field with a previous level is taken from it;
//! - semi-implicit: current level, plus `<field>old` for every
//!   prognostic field.

use cadence_core::{FieldCatalog, LookupError, Value, ValueSource};
use cadence_grid::Grid;
use cadence_kernel::{old_key, KernelPlan, SteppingScheme, UPDATE_FREQ_KEY};

use crate::params::ParameterStore;
use crate::state::State;

/// Everything input assembly reads from.
#[derive(Clone, Copy)]
pub struct InputSources<'a> {
    /// Field catalog the state is keyed by.
    pub catalog: &'a FieldCatalog,
    /// Two-level state.
    pub state: &'a State,
    /// Axis coordinates.
    pub grid: &'a Grid,
    /// Run parameters.
    pub params: &'a ParameterStore,
    /// Recompute frequency, exposed as `UpdateFreq`.
    pub update_frequency: f64,
}

/// Build the positional kernel inputs in declaration order.
pub fn assemble_inputs(
    plan: &KernelPlan,
    sources: InputSources<'_>,
) -> Result<Vec<Value>, LookupError> {
    plan.inputs()
        .iter()
        .map(|name| resolve_input(plan, &sources, name))
        .collect()
}

fn resolve_input(
    plan: &KernelPlan,
    src: &InputSources<'_>,
    name: &str,
) -> Result<Value, LookupError> {
    match plan.scheme() {
        SteppingScheme::Implicit => {
            if let Some(old) = src.catalog.id(name).and_then(|id| src.state.old(id)) {
                return Ok(old.clone());
            }
        }
        SteppingScheme::SemiImplicit => {
            let old = plan.prognostic().iter().find_map(|id| {
                let field = src.catalog.name(id)?;
                (old_key(field) == name).then(|| src.state.old(id))?
            });
            if let Some(old) = old {
                return Ok(old.clone());
            }
        }
        SteppingScheme::Explicit => {}
    }
    if name == UPDATE_FREQ_KEY {
        return Ok(Value::Scalar(src.update_frequency));
    }
    src.params
        .value(name)
        .or_else(|| src.grid.value(name))
        .or_else(|| src.state.value(name))
        .cloned()
        .ok_or_else(|| LookupError::new(name))
}
