//! The [`Component`]: one kernel coupled to its state, grid and parameters.
//!
//! A component owns a [`State`], a [`ParameterStore`], a [`Grid`] and its
//! accumulated [`Increments`]. Each step it merges external increments,
//! advances the state, recomputes through the kernel when the recompute
//! gate is open, advances the calendar, and triggers output and monitor
//! refreshes at their own cadences.

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Instant;

use cadence_core::{
    FieldCatalog, FieldClass, FieldId, FieldSet, LookupError, Value, ValueError, ValueSource,
};
use cadence_grid::Grid;
use cadence_history::{HistoryFile, OutputSink, Schema, SECONDS_PER_DAY};
use cadence_kernel::{validate_kernel, Kernel, KernelPlan};
use indexmap::IndexMap;
use tracing::{debug, info, warn};

use crate::assembly::{assemble_inputs, InputSources};
use crate::calendar::advance_calday;
use crate::config::{report_unused, ComponentConfig, ConfigError, ResolvedConfig};
use crate::error::ComponentError;
use crate::gating::Cadence;
use crate::increments::Increments;
use crate::metrics::RunMetrics;
use crate::monitor::Monitor;
use crate::output::{build_record, build_schema};
use crate::params::ParameterStore;
use crate::state::State;

// ── RunLength ──────────────────────────────────────────────────────

/// How long [`Component::step()`] runs.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum RunLength {
    /// A number of timesteps.
    Steps(u64),
    /// A simulated duration in seconds, truncated to whole timesteps.
    Duration(f64),
}

impl RunLength {
    /// Number of timesteps of length `dt`.
    pub fn steps(self, dt: f64) -> u64 {
        match self {
            Self::Steps(n) => n,
            Self::Duration(d) => {
                let n = (d / dt).trunc();
                if n.is_finite() && n > 0.0 {
                    n as u64
                } else {
                    0
                }
            }
        }
    }
}

impl From<u32> for RunLength {
    fn from(n: u32) -> Self {
        Self::Steps(u64::from(n))
    }
}

impl From<u64> for RunLength {
    fn from(n: u64) -> Self {
        Self::Steps(n)
    }
}

impl From<usize> for RunLength {
    fn from(n: usize) -> Self {
        Self::Steps(n as u64)
    }
}

impl From<f64> for RunLength {
    fn from(seconds: f64) -> Self {
        Self::Duration(seconds)
    }
}

// ── Component ──────────────────────────────────────────────────────

/// A compute kernel coupled to a two-level state.
pub struct Component {
    kernel: Box<dyn Kernel>,
    plan: KernelPlan,
    catalog: FieldCatalog,
    params: ParameterStore,
    grid: Grid,
    state: State,
    inc: Increments,
    fixed: FieldSet,
    marching: FieldSet,
    update: Cadence,
    output: Option<Box<dyn OutputSink>>,
    output_cadence: Cadence,
    output_fields: FieldSet,
    output_index: u64,
    monitor: Option<Box<dyn Monitor>>,
    monitor_cadence: Cadence,
    monitor_fields: FieldSet,
    restart_location: Option<PathBuf>,
    metrics: RunMetrics,
}

impl Component {
    /// Construct a component around `kernel`.
    ///
    /// Validates the kernel declaration, resolves the configuration, builds
    /// the state, seeds diagnostics and increments with a forced compute,
    /// and (unless appending to the restart source) declares the output
    /// schema and writes the initial record.
    pub fn new(kernel: impl Kernel, mut config: ComponentConfig) -> Result<Self, ComponentError> {
        let catalog = config
            .catalog
            .get_or_insert_with(FieldCatalog::standard)
            .clone();
        let plan = validate_kernel(&kernel, &catalog).map_err(ConfigError::from)?;
        let (resolved, collaborators) = config.resolve(&kernel, &plan)?;
        let state = build_state(&plan, &resolved)?;

        let mut component = Self {
            kernel: Box::new(kernel),
            catalog,
            params: resolved.params,
            grid: resolved.grid,
            state,
            inc: Increments::new(),
            fixed: resolved.fixed,
            marching: resolved.marching,
            update: Cadence::every(resolved.update_frequency),
            output: collaborators.output,
            output_cadence: Cadence::every(resolved.output_frequency),
            output_fields: resolved.output_fields,
            output_index: resolved.existing_records,
            monitor: collaborators.monitor,
            monitor_cadence: Cadence::every(resolved.monitor_frequency),
            monitor_fields: resolved.monitor_fields,
            restart_location: collaborators.restart_location,
            metrics: RunMetrics::default(),
            plan,
        };

        component.compute(true)?;
        if component.output.is_some() && !resolved.appending {
            let schema = component.schema();
            if let Some(sink) = component.output.as_mut() {
                sink.create(&schema)?;
            }
            component.write()?;
        }
        report_unused(component.name(), &resolved.unused);
        info!(
            component = component.name(),
            fields = component.state.len(),
            nlev = component.grid.nlev(),
            nlat = component.grid.nlat(),
            nlon = component.grid.nlon(),
            appending = resolved.appending,
            "component constructed"
        );
        Ok(component)
    }

    // ── Stepping ───────────────────────────────────────────────────

    /// Run the kernel if the recompute gate is open or `force` is set.
    ///
    /// Returns whether the kernel ran. When it does, increments of
    /// marching fields are replaced, Fixed outputs are discarded, and every
    /// other output is stored as the current value of its field.
    pub fn compute(&mut self, force: bool) -> Result<bool, ComponentError> {
        let t = self.state.elapsed_time();
        let dt = self.params.dt();
        if !force && !self.update.is_due(t, dt) {
            self.metrics.gated_skips += 1;
            debug!(component = self.name(), t, "recompute gate closed");
            return Ok(false);
        }

        let inputs = assemble_inputs(&self.plan, self.sources())?;
        let start = Instant::now();
        let output = self
            .kernel
            .invoke(&inputs)
            .and_then(|out| out.into_named(self.plan.outputs()))
            .map_err(|reason| ComponentError::KernelFailed {
                kernel: self.plan.name().to_string(),
                reason,
            })?;
        let kernel_us = start.elapsed().as_micros() as u64;

        self.apply_output(output)?;
        self.metrics.kernel_invocations += 1;
        self.metrics.last_kernel_us = kernel_us;
        debug!(component = self.name(), t, kernel_us, "kernel invoked");
        Ok(true)
    }

    fn apply_output(&mut self, mut output: IndexMap<String, Value>) -> Result<(), ComponentError> {
        let mut increments = Vec::new();
        let mut discarded = Vec::new();
        for (id, key) in self.plan.increments() {
            let field = self.catalog.name(id).unwrap_or(key);
            let Some(value) = output.shift_remove(key) else {
                return Err(ConfigError::MissingIncrement {
                    kernel: self.plan.name().to_string(),
                    field: field.to_string(),
                }
                .into());
            };
            if self.fixed.contains(id) {
                discarded.push(id);
                output.shift_remove(field);
                continue;
            }
            let value = self.conform(id, &value)?;
            increments.push((id, value));
        }

        let mut diagnostics = Vec::with_capacity(output.len());
        for (name, value) in &output {
            let Some(id) = self.catalog.id(name) else {
                continue;
            };
            let value = self.conform(id, value)?;
            diagnostics.push((id, value));
        }

        for id in discarded {
            self.inc.remove(id);
        }
        for (id, value) in increments {
            self.inc.insert(id, value);
        }
        for (id, value) in diagnostics {
            if let Some(slot) = self.state.now_mut(id) {
                *slot = value;
            }
        }
        Ok(())
    }

    /// Advance `run` timesteps, adding `external` increments every step.
    ///
    /// External increments are summed into the component's own increments
    /// for marching fields; increments for other fields are skipped.
    pub fn step(
        &mut self,
        run: impl Into<RunLength>,
        external: &Increments,
    ) -> Result<(), ComponentError> {
        let dt = self.params.dt();
        let steps = run.into().steps(dt);
        for _ in 0..steps {
            let start = Instant::now();
            self.merge_external(external)?;
            self.state
                .advance(&self.inc, &self.marching, dt)
                .map_err(|source| ConfigError::InvalidValue {
                    name: "increments".to_string(),
                    source,
                })?;
            self.compute(false)?;

            let calday = advance_calday(
                self.params.scalar("calday").unwrap_or(0.0),
                dt,
                self.params.scalar("lod").unwrap_or(SECONDS_PER_DAY),
                self.params.scalar("daysperyear").unwrap_or(365.0),
            );
            self.params.set_scalar("calday", calday);

            let t = self.state.elapsed_time();
            if self.output.is_some() && self.output_cadence.is_due(t, dt) {
                self.write()?;
            }
            if self.monitor.is_some() && self.monitor_cadence.is_due(t, dt) {
                self.refresh_monitor();
            }
            self.metrics.steps += 1;
            self.metrics.last_step_us = start.elapsed().as_micros() as u64;
        }
        Ok(())
    }

    fn merge_external(&mut self, external: &Increments) -> Result<(), ComponentError> {
        for (id, value) in external.iter() {
            if !self.marching.contains(id) {
                let field = self.catalog.name(id).unwrap_or("<unknown>");
                if self.fixed.contains(id) {
                    warn!(component = self.name(), field, "increment for fixed field ignored");
                } else {
                    debug!(component = self.name(), field, "increment for unmarched field skipped");
                }
                continue;
            }
            let value = self.conform(id, value)?;
            if let Err(source) = self.inc.accumulate(id, &value) {
                return Err(self.invalid_value(id, source));
            }
        }
        Ok(())
    }

    fn refresh_monitor(&mut self) {
        if let Some(mut monitor) = self.monitor.take() {
            monitor.refresh(self, &self.monitor_fields);
            self.monitor = Some(monitor);
            self.metrics.monitor_refreshes += 1;
        }
    }

    // ── Output ─────────────────────────────────────────────────────

    /// Append one output record now.
    ///
    /// Does nothing when no output is configured.
    pub fn write(&mut self) -> Result<(), ComponentError> {
        let calday = self.params.scalar("calday").unwrap_or(0.0);
        let record = build_record(&self.state, &self.output_fields, calday);
        let Some(sink) = self.output.as_mut() else {
            return Ok(());
        };
        sink.append(&record)?;
        self.output_index += 1;
        self.metrics.records_written += 1;
        info!(
            component = self.plan.name(),
            days = record.time_days,
            index = self.output_index,
            "output written"
        );
        Ok(())
    }

    /// Redirect output to a history file at `path`.
    ///
    /// No-op if output already goes to `path`. Otherwise the file is
    /// created with the current schema and the record index restarts.
    pub fn open(&mut self, path: impl Into<PathBuf>) -> Result<(), ComponentError> {
        let path = path.into();
        if self
            .output
            .as_ref()
            .and_then(|sink| sink.location())
            .is_some_and(|current| current == path.as_path())
        {
            info!(component = self.name(), path = %path.display(), "output already open");
            return Ok(());
        }
        let mut sink = HistoryFile::new(path.clone());
        sink.create(&self.schema())?;
        self.output = Some(Box::new(sink));
        self.output_index = 0;
        info!(component = self.name(), path = %path.display(), "output opened");
        Ok(())
    }

    /// The schema output is declared with.
    pub fn schema(&self) -> Schema {
        build_schema(
            self.plan.name(),
            &self.catalog,
            &self.grid,
            &self.params,
            &self.output_fields,
            self.restart_location.as_deref(),
        )
    }

    // ── Reconfiguration ────────────────────────────────────────────

    /// Rebuild parameters, grid and state from a new configuration, then
    /// run the gated compute.
    ///
    /// Output and monitor collaborators are replaced only if `config`
    /// supplies them. Increments from the last kernel call are kept until
    /// the gate next opens.
    pub fn reinitialize(&mut self, mut config: ComponentConfig) -> Result<(), ComponentError> {
        config.catalog = Some(self.catalog.clone());
        let (resolved, collaborators) = config.resolve(self.kernel.as_ref(), &self.plan)?;
        let state = build_state(&self.plan, &resolved)?;

        self.params = resolved.params;
        self.grid = resolved.grid;
        self.state = state;
        self.fixed = resolved.fixed;
        self.marching = resolved.marching;
        self.update = Cadence::every(resolved.update_frequency);
        if let Some(sink) = collaborators.output {
            self.output = Some(sink);
            self.output_cadence = Cadence::every(resolved.output_frequency);
            self.output_fields = resolved.output_fields;
            self.output_index = resolved.existing_records;
        }
        if let Some(monitor) = collaborators.monitor {
            self.monitor = Some(monitor);
            self.monitor_cadence = Cadence::every(resolved.monitor_frequency);
            self.monitor_fields = resolved.monitor_fields;
        }
        if collaborators.restart_location.is_some() {
            self.restart_location = collaborators.restart_location;
        }
        report_unused(self.plan.name(), &resolved.unused);
        self.compute(false)?;
        Ok(())
    }

    // ── Accessor ───────────────────────────────────────────────────

    /// Look up `name` in parameters, then grid, then state.
    ///
    /// Numeric values come back with length-1 dimensions squeezed out.
    pub fn get(&self, name: &str) -> Result<Value, LookupError> {
        let value = self
            .params
            .value(name)
            .or_else(|| self.grid.value(name))
            .or_else(|| self.state.value(name))
            .ok_or_else(|| LookupError::new(name))?;
        Ok(if value.is_text() {
            value.clone()
        } else {
            value.squeeze()
        })
    }

    /// Assign `name` in parameters, grid or state.
    ///
    /// State fields are reshaped to their declared shape and set at both
    /// time levels.
    pub fn set(&mut self, name: &str, value: impl Into<Value>) -> Result<(), ComponentError> {
        let value = value.into();
        if self.params.set(name, &value)? {
            return Ok(());
        }
        if self.grid.set(name, &value).map_err(ConfigError::from)? {
            return Ok(());
        }
        if let Some(id) = self.catalog.id(name).filter(|&id| self.state.contains(id)) {
            if let Err(source) = self.state.assign(id, &value) {
                return Err(self.invalid_value(id, source));
            }
            return Ok(());
        }
        Err(LookupError::new(name).into())
    }

    // ── Introspection ──────────────────────────────────────────────

    /// Kernel name.
    pub fn name(&self) -> &str {
        self.plan.name()
    }

    /// Validated kernel declaration.
    pub fn plan(&self) -> &KernelPlan {
        &self.plan
    }

    /// Field catalog.
    pub fn catalog(&self) -> &FieldCatalog {
        &self.catalog
    }

    /// Two-level state.
    pub fn state(&self) -> &State {
        &self.state
    }

    /// Increments accumulated for the next advance.
    pub fn increments(&self) -> &Increments {
        &self.inc
    }

    /// Parameters.
    pub fn params(&self) -> &ParameterStore {
        &self.params
    }

    /// Grid.
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Run metrics.
    pub fn metrics(&self) -> &RunMetrics {
        &self.metrics
    }

    /// Fixed fields.
    pub fn fixed(&self) -> &FieldSet {
        &self.fixed
    }

    /// Recompute frequency in seconds.
    pub fn update_frequency(&self) -> f64 {
        self.update.frequency()
    }

    /// Records written to the current output, including any present
    /// before an appending run.
    pub fn output_index(&self) -> u64 {
        self.output_index
    }

    /// Location of the current output, if file-backed.
    pub fn output_location(&self) -> Option<&Path> {
        self.output.as_ref().and_then(|sink| sink.location())
    }

    /// Classification of a state field in this component.
    pub fn classify(&self, name: &str) -> Option<FieldClass> {
        let id = self.catalog.id(name).filter(|&id| self.state.contains(id))?;
        Some(if self.fixed.contains(id) {
            FieldClass::Fixed
        } else if self.plan.prognostic().contains(id) {
            FieldClass::Prognostic
        } else {
            FieldClass::Diagnostic
        })
    }

    /// Human-readable listing of the component and its fields.
    pub fn report(&self) -> String {
        self.to_string()
    }

    // ── Helpers ────────────────────────────────────────────────────

    fn sources(&self) -> InputSources<'_> {
        InputSources {
            catalog: &self.catalog,
            state: &self.state,
            grid: &self.grid,
            params: &self.params,
            update_frequency: self.update.frequency(),
        }
    }

    fn conform(&self, id: FieldId, value: &Value) -> Result<Value, ComponentError> {
        match self.state.shape(id) {
            Some(shape) => value
                .conform(shape)
                .map_err(|source| self.invalid_value(id, source)),
            None => Ok(value.clone()),
        }
    }

    fn invalid_value(&self, id: FieldId, source: ValueError) -> ComponentError {
        ConfigError::InvalidValue {
            name: self.catalog.name(id).unwrap_or("<unknown>").to_string(),
            source,
        }
        .into()
    }
}

fn build_state(plan: &KernelPlan, resolved: &ResolvedConfig) -> Result<State, ComponentError> {
    Ok(State::new(
        &resolved.catalog,
        &resolved.grid,
        &plan.state_fields(),
        plan.prognostic(),
        &resolved.initial,
        resolved.elapsed_time,
    )?)
}

impl fmt::Display for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.name())?;
        for id in self.state.fields() {
            let Some(name) = self.catalog.name(id) else {
                continue;
            };
            if let Some(class) = self.classify(name) {
                writeln!(f, "    {name} {}", class.tag())?;
            }
        }
        Ok(())
    }
}

impl fmt::Debug for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Component")
            .field("name", &self.name())
            .field("elapsed_time", &self.state.elapsed_time())
            .field("fields", &self.state.len())
            .field("update_frequency", &self.update.frequency())
            .field("output", &self.output_location())
            .field("metrics", &self.metrics)
            .finish()
    }
}
