//! Component configuration, its resolution pipeline, and error types.
//!
//! [`ComponentConfig`] is the builder-input for constructing a
//! [`Component`](crate::Component). [`resolve()`](ComponentConfig::resolve)
//! turns it into an immutable [`ResolvedConfig`] through an ordered
//! sequence of stages, each a plain function over the values gathered so
//! far:
//!
//! 1. restart overlay ([`overlay_restart`]),
//! 2. explicit overrides into the parameter store ([`apply_parameters`]),
//! 3. axis resolution against kernel-enforced lengths,
//! 4. validation of timestep, frequencies and field subsets,
//! 5. the unused-key report ([`unused_keys`]).

use std::error::Error;
use std::fmt;
use std::path::PathBuf;

use cadence_core::{FieldCatalog, FieldSet, Value, ValueError, ValueSource};
use cadence_grid::{resolve_dims, Axis, Grid, GridDims, GridError};
use cadence_history::{HistoryFile, OutputSink, RestartData, RestartSource};
use cadence_kernel::{DeclarationError, Kernel, KernelPlan, UPDATE_FREQ_KEY};
use indexmap::IndexMap;
use tracing::warn;

use crate::error::ComponentError;
use crate::monitor::Monitor;
use crate::params::ParameterStore;

/// Default output frequency: once per simulated day.
pub const DEFAULT_OUTPUT_FREQUENCY: f64 = 86400.0;

// ── ConfigError ────────────────────────────────────────────────────

/// Errors detected while resolving a [`ComponentConfig`] or applying
/// kernel output.
#[derive(Debug, PartialEq)]
pub enum ConfigError {
    /// The kernel declaration is inconsistent.
    Declaration(DeclarationError),
    /// Axis resolution or assignment failed.
    Grid(GridError),
    /// A supplied value cannot take the shape of its field.
    InvalidValue {
        /// Field name.
        name: String,
        /// Underlying shape error.
        source: ValueError,
    },
    /// A parameter was assigned a value of the wrong kind.
    InvalidParameter {
        /// Parameter name.
        name: String,
        /// What was wrong.
        reason: String,
    },
    /// `dt` is NaN, infinite, zero, or negative.
    InvalidTimestep {
        /// The invalid value.
        value: f64,
    },
    /// A frequency is NaN, infinite, zero, or negative.
    InvalidFrequency {
        /// Which frequency.
        name: &'static str,
        /// The invalid value.
        value: f64,
    },
    /// A Fixed field is not one of the kernel's prognostic fields.
    FixedNotPrognostic {
        /// The offending field name.
        field: String,
    },
    /// An output or monitor field is not held in the state.
    UnknownOutputField {
        /// The offending field name.
        field: String,
    },
    /// A kernel input is provided by none of grid, parameters or state.
    UnresolvedInput {
        /// Kernel name.
        kernel: String,
        /// The input name.
        name: String,
    },
    /// Kernel output lacks the increment of a prognostic field.
    MissingIncrement {
        /// Kernel name.
        kernel: String,
        /// The prognostic field.
        field: String,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Declaration(e) => write!(f, "declaration: {e}"),
            Self::Grid(e) => write!(f, "grid: {e}"),
            Self::InvalidValue { name, source } => write!(f, "field '{name}': {source}"),
            Self::InvalidParameter { name, reason } => {
                write!(f, "parameter '{name}': {reason}")
            }
            Self::InvalidTimestep { value } => {
                write!(f, "dt must be finite and positive, got {value}")
            }
            Self::InvalidFrequency { name, value } => {
                write!(f, "{name} must be finite and positive, got {value}")
            }
            Self::FixedNotPrognostic { field } => {
                write!(f, "fixed field '{field}' is not prognostic")
            }
            Self::UnknownOutputField { field } => {
                write!(f, "output field '{field}' not recognized")
            }
            Self::UnresolvedInput { kernel, name } => write!(
                f,
                "kernel '{kernel}' input '{name}' is not a grid entry, parameter or state field"
            ),
            Self::MissingIncrement { kernel, field } => write!(
                f,
                "kernel '{kernel}' output has no increment for prognostic field '{field}'"
            ),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Declaration(e) => Some(e),
            Self::Grid(e) => Some(e),
            Self::InvalidValue { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<DeclarationError> for ConfigError {
    fn from(e: DeclarationError) -> Self {
        Self::Declaration(e)
    }
}

impl From<GridError> for ConfigError {
    fn from(e: GridError) -> Self {
        Self::Grid(e)
    }
}

// ── OutputConfig / MonitorConfig ───────────────────────────────────

/// Where and how often state is written.
pub struct OutputConfig {
    /// Destination for history records.
    pub sink: Box<dyn OutputSink>,
    /// Seconds between records. Default: 86400.
    pub frequency: Option<f64>,
    /// Fields to write. Default: every state field.
    pub fields: Option<Vec<String>>,
}

impl OutputConfig {
    /// Output to an arbitrary sink with default frequency and fields.
    pub fn new(sink: impl OutputSink + 'static) -> Self {
        Self {
            sink: Box::new(sink),
            frequency: None,
            fields: None,
        }
    }

    /// Output to a history file.
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self::new(HistoryFile::new(path))
    }
}

/// Which fields a monitor sees and how often.
pub struct MonitorConfig {
    /// The monitor to refresh.
    pub monitor: Box<dyn Monitor>,
    /// Seconds between refreshes. Default: `dt`.
    pub frequency: Option<f64>,
    /// Fields passed to the monitor. Default: every state field.
    pub fields: Option<Vec<String>>,
}

impl MonitorConfig {
    /// Refresh `monitor` every step with every state field.
    pub fn new(monitor: impl Monitor + 'static) -> Self {
        Self {
            monitor: Box::new(monitor),
            frequency: None,
            fields: None,
        }
    }
}

// ── ComponentConfig ────────────────────────────────────────────────

/// Complete configuration for constructing a component.
#[derive(Default)]
pub struct ComponentConfig {
    /// Known fields. Default: [`FieldCatalog::standard()`].
    pub catalog: Option<FieldCatalog>,
    /// Prognostic fields excluded from time-marching for this run.
    pub fixed: Vec<String>,
    /// Seconds between kernel recomputes. Default: `dt`.
    pub update_frequency: Option<f64>,
    /// Elapsed simulated time at start. Default: from restart, else 0.
    pub elapsed_time: Option<f64>,
    /// Source of initial values from a previous run.
    pub restart: Option<Box<dyn RestartSource>>,
    /// Periodic history output.
    pub output: Option<OutputConfig>,
    /// Periodic monitor refresh.
    pub monitor: Option<MonitorConfig>,
    /// Initial values of fields, axes and parameters, by name.
    pub values: IndexMap<String, Value>,
}

impl ComponentConfig {
    /// An empty configuration: every setting at its default.
    pub fn new() -> Self {
        Self::default()
    }

    /// Supply an initial value for a field, axis or parameter.
    pub fn with_value(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.values.insert(name.into(), value.into());
        self
    }

    /// Mark prognostic fields as Fixed.
    pub fn with_fixed<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fixed.extend(fields.into_iter().map(Into::into));
        self
    }

    /// Set the recompute frequency.
    pub fn with_update_frequency(mut self, seconds: f64) -> Self {
        self.update_frequency = Some(seconds);
        self
    }

    /// Start from a previous run.
    pub fn with_restart(mut self, source: impl RestartSource + 'static) -> Self {
        self.restart = Some(Box::new(source));
        self
    }

    /// Write periodic output.
    pub fn with_output(mut self, output: OutputConfig) -> Self {
        self.output = Some(output);
        self
    }

    /// Refresh a monitor periodically.
    pub fn with_monitor(mut self, monitor: MonitorConfig) -> Self {
        self.monitor = Some(monitor);
        self
    }

    /// Run the resolution pipeline for `kernel`, whose declaration has
    /// already been validated into `plan`.
    pub fn resolve(
        self,
        kernel: &dyn Kernel,
        plan: &KernelPlan,
    ) -> Result<(ResolvedConfig, Collaborators), ComponentError> {
        let catalog = self.catalog.unwrap_or_else(FieldCatalog::standard);
        let mut values = self.values;
        let mut elapsed_time = self.elapsed_time;
        let mut params = ParameterStore::standard();
        let state_fields = plan.state_fields();

        // 1. Restart overlay
        let mut existing_records = 0;
        let restart_location = match self.restart {
            Some(mut source) => {
                let data = source.load()?;
                let field_names: Vec<String> = state_fields
                    .iter()
                    .filter_map(|id| catalog.name(id).map(str::to_string))
                    .collect();
                overlay_restart(
                    &mut values,
                    &mut elapsed_time,
                    &data,
                    &field_names,
                    &params.names(),
                );
                existing_records = data.record_count;
                source.location().map(PathBuf::from)
            }
            None => None,
        };

        // 2. Explicit overrides
        apply_parameters(&values, &mut params)?;
        let dt = params.dt();
        if !dt.is_finite() || dt <= 0.0 {
            return Err(ConfigError::InvalidTimestep { value: dt }.into());
        }

        // 3. Axes
        let dims = resolve_dims(&values, &catalog, |a: Axis| kernel.axis_length(a), GridDims::default())
            .map_err(ConfigError::from)?;
        let grid = Grid::from_supplied(dims, &values).map_err(ConfigError::from)?;

        // 4. Validation
        let update_frequency = positive("update frequency", self.update_frequency.unwrap_or(dt))?;
        for name in plan.external_inputs() {
            let provided = name == UPDATE_FREQ_KEY || params.contains(name) || grid.get(name).is_some();
            if !provided {
                return Err(ConfigError::UnresolvedInput {
                    kernel: plan.name().to_string(),
                    name: name.clone(),
                }
                .into());
            }
        }
        let mut fixed = FieldSet::empty();
        for name in &self.fixed {
            match catalog.id(name) {
                Some(id) if plan.prognostic().contains(id) => {
                    fixed.insert(id);
                }
                _ => return Err(ConfigError::FixedNotPrognostic { field: name.clone() }.into()),
            }
        }
        let marching = plan.prognostic().difference(&fixed);

        let (output, output_frequency, output_fields) = match self.output {
            Some(o) => {
                let frequency = positive("output frequency", o.frequency.unwrap_or(DEFAULT_OUTPUT_FREQUENCY))?;
                let fields = field_subset(&catalog, &state_fields, o.fields.as_deref())?;
                (Some(o.sink), frequency, fields)
            }
            None => (None, DEFAULT_OUTPUT_FREQUENCY, state_fields.clone()),
        };
        let (monitor, monitor_frequency, monitor_fields) = match self.monitor {
            Some(m) => {
                let frequency = positive("monitor frequency", m.frequency.unwrap_or(dt))?;
                let fields = field_subset(&catalog, &state_fields, m.fields.as_deref())?;
                (Some(m.monitor), frequency, fields)
            }
            None => (None, dt, state_fields.clone()),
        };
        let appending = match (&output, &restart_location) {
            (Some(sink), Some(restart)) => sink.location() == Some(restart.as_path()),
            _ => false,
        };

        // 5. Unused keys
        let unused = unused_keys(&values, &params, &grid, &catalog);

        let resolved = ResolvedConfig {
            catalog,
            fixed,
            marching,
            update_frequency,
            elapsed_time: elapsed_time.unwrap_or(0.0),
            params,
            grid,
            initial: values,
            output_frequency,
            output_fields,
            monitor_frequency,
            monitor_fields,
            appending,
            existing_records: if appending { existing_records } else { 0 },
            unused,
        };
        let collaborators = Collaborators {
            output,
            monitor,
            restart_location,
        };
        Ok((resolved, collaborators))
    }
}

impl fmt::Debug for ComponentConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentConfig")
            .field("catalog_fields", &self.catalog.as_ref().map(FieldCatalog::len))
            .field("fixed", &self.fixed)
            .field("update_frequency", &self.update_frequency)
            .field("elapsed_time", &self.elapsed_time)
            .field("restart", &self.restart.as_ref().map(|r| r.location().map(PathBuf::from)))
            .field("output", &self.output.is_some())
            .field("monitor", &self.monitor.is_some())
            .field("values", &self.values.keys().collect::<Vec<_>>())
            .finish()
    }
}

// ── Resolved record ────────────────────────────────────────────────

/// The immutable outcome of [`ComponentConfig::resolve()`].
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    /// Known fields.
    pub catalog: FieldCatalog,
    /// Prognostic fields excluded from time-marching.
    pub fixed: FieldSet,
    /// Prognostic fields that are time-marched.
    pub marching: FieldSet,
    /// Seconds between kernel recomputes.
    pub update_frequency: f64,
    /// Elapsed simulated time at start.
    pub elapsed_time: f64,
    /// Parameters with overrides applied.
    pub params: ParameterStore,
    /// Resolved grid.
    pub grid: Grid,
    /// Every supplied or restart-derived value, by name.
    pub initial: IndexMap<String, Value>,
    /// Seconds between output records.
    pub output_frequency: f64,
    /// Fields written to output.
    pub output_fields: FieldSet,
    /// Seconds between monitor refreshes.
    pub monitor_frequency: f64,
    /// Fields passed to the monitor.
    pub monitor_fields: FieldSet,
    /// Output goes to the restart source: skip schema creation and the
    /// initial write.
    pub appending: bool,
    /// Records already present when appending.
    pub existing_records: u64,
    /// Supplied names that matched no parameter, axis or field.
    pub unused: Vec<String>,
}

/// Collaborators moved out of the configuration.
pub struct Collaborators {
    /// Output destination, if any.
    pub output: Option<Box<dyn OutputSink>>,
    /// Monitor, if any.
    pub monitor: Option<Box<dyn Monitor>>,
    /// Location of the restart source, if file-backed.
    pub restart_location: Option<PathBuf>,
}

// ── Stages ─────────────────────────────────────────────────────────

/// Fill every name the caller did not supply from restart data.
///
/// Elapsed time, parameters, axes and fields are taken from `data` only
/// where absent from `values`. Parameters and fields missing from the
/// restart data are reported and left to their defaults.
pub fn overlay_restart(
    values: &mut IndexMap<String, Value>,
    elapsed_time: &mut Option<f64>,
    data: &RestartData,
    field_names: &[String],
    param_names: &[String],
) {
    if elapsed_time.is_none() {
        *elapsed_time = data.elapsed_time;
    }
    for name in param_names {
        if values.contains_key(name) {
            continue;
        }
        match data.params.get(name) {
            Some(v) => {
                values.insert(name.clone(), v.clone());
            }
            None => warn!(
                parameter = %name,
                "parameter not found in restart source, using default or supplied value"
            ),
        }
    }
    for axis in Axis::ALL {
        let name = axis.name();
        if values.contains_key(name) {
            continue;
        }
        if let Some(v) = data.axes.get(name) {
            values.insert(name.to_string(), v.clone());
        }
    }
    for name in field_names {
        if values.contains_key(name) {
            continue;
        }
        match data.fields.get(name) {
            Some(v) => {
                values.insert(name.clone(), v.clone());
            }
            None => warn!(
                field = %name,
                "field not found in restart source, using default or supplied value"
            ),
        }
    }
}

/// Apply every supplied value that names a parameter.
pub fn apply_parameters(
    values: &IndexMap<String, Value>,
    params: &mut ParameterStore,
) -> Result<(), ConfigError> {
    for (name, value) in values {
        params.set(name, value)?;
    }
    Ok(())
}

/// Supplied names that are neither a parameter, a grid entry nor a
/// catalog field.
pub fn unused_keys(
    values: &IndexMap<String, Value>,
    params: &ParameterStore,
    grid: &Grid,
    catalog: &FieldCatalog,
) -> Vec<String> {
    values
        .keys()
        .filter(|k| !params.contains(k) && grid.get(k).is_none() && !catalog.contains(k))
        .cloned()
        .collect()
}

/// Log one warning naming every unused input.
pub(crate) fn report_unused(component: &str, unused: &[String]) {
    if unused.is_empty() {
        return;
    }
    let noun = if unused.len() == 1 {
        "quantity"
    } else {
        "quantities"
    };
    warn!(
        component,
        unused = ?unused,
        "input {noun} {unused:?} not used"
    );
}

fn positive(name: &'static str, value: f64) -> Result<f64, ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(ConfigError::InvalidFrequency { name, value })
    }
}

fn field_subset(
    catalog: &FieldCatalog,
    state_fields: &FieldSet,
    names: Option<&[String]>,
) -> Result<FieldSet, ConfigError> {
    let Some(names) = names else {
        return Ok(state_fields.clone());
    };
    names
        .iter()
        .map(|name| {
            catalog
                .id(name)
                .filter(|&id| state_fields.contains(id))
                .ok_or_else(|| ConfigError::UnknownOutputField { field: name.clone() })
        })
        .collect()
}
