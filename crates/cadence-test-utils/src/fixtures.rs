//! Reusable kernel test fixtures.
//!
//! - [`RecordingKernel`]: records every input list it is invoked with.
//! - [`ConstIncrementKernel`]: returns a constant increment for one field.
//! - [`FailingKernel`]: fails deterministically after N calls.
//! - [`MissingIncrementKernel`]: declares a prognostic field without its
//!   increment output.
//! - [`WrongArityKernel`]: returns fewer outputs than it declares.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use cadence_core::{KernelError, Value};
use cadence_grid::Axis;
use cadence_kernel::{increment_key, Kernel, KernelOutput, SteppingScheme};

// ── CallLog ────────────────────────────────────────────────────────

/// Shared log of kernel invocations; clones observe the same log.
#[derive(Clone, Debug, Default)]
pub struct CallLog {
    calls: Arc<Mutex<Vec<Vec<Value>>>>,
}

impl CallLog {
    fn push(&self, inputs: &[Value]) -> usize {
        let mut calls = self.calls.lock().unwrap();
        calls.push(inputs.to_vec());
        calls.len()
    }

    /// Number of recorded invocations.
    pub fn len(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Inputs of every invocation, oldest first.
    pub fn calls(&self) -> Vec<Vec<Value>> {
        self.calls.lock().unwrap().clone()
    }

    /// Inputs of the most recent invocation.
    pub fn last(&self) -> Option<Vec<Value>> {
        self.calls.lock().unwrap().last().cloned()
    }
}

// ── RecordingKernel ────────────────────────────────────────────────

/// Records its inputs and returns configurable outputs.
///
/// Outputs are the diagnostics (in declaration order), each set to the
/// 1-based invocation count, followed by one increment per prognostic
/// field, each set to `increment`.
pub struct RecordingKernel {
    pub name: String,
    pub scheme: SteppingScheme,
    pub inputs: Vec<String>,
    pub prognostic: Vec<String>,
    pub diagnostic: Vec<String>,
    pub increment: f64,
    pub levels: Option<usize>,
    log: CallLog,
}

impl RecordingKernel {
    pub fn new(name: impl Into<String>, inputs: &[&str], prognostic: &[&str]) -> Self {
        Self {
            name: name.into(),
            scheme: SteppingScheme::Explicit,
            inputs: inputs.iter().map(|s| s.to_string()).collect(),
            prognostic: prognostic.iter().map(|s| s.to_string()).collect(),
            diagnostic: Vec::new(),
            increment: 0.0,
            levels: None,
            log: CallLog::default(),
        }
    }

    pub fn with_scheme(mut self, scheme: SteppingScheme) -> Self {
        self.scheme = scheme;
        self
    }

    pub fn with_diagnostic(mut self, diagnostic: &[&str]) -> Self {
        self.diagnostic = diagnostic.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn with_increment(mut self, increment: f64) -> Self {
        self.increment = increment;
        self
    }

    /// Require `nlev` vertical levels.
    pub fn with_levels(mut self, nlev: usize) -> Self {
        self.levels = Some(nlev);
        self
    }

    /// Handle on the invocation log, valid after the kernel is moved.
    pub fn log(&self) -> CallLog {
        self.log.clone()
    }
}

impl Kernel for RecordingKernel {
    fn name(&self) -> &str {
        &self.name
    }

    fn scheme(&self) -> SteppingScheme {
        self.scheme
    }

    fn inputs(&self) -> Vec<String> {
        self.inputs.clone()
    }

    fn outputs(&self) -> Vec<String> {
        self.diagnostic
            .iter()
            .cloned()
            .chain(self.prognostic.iter().map(|p| increment_key(p)))
            .collect()
    }

    fn prognostic(&self) -> Vec<String> {
        self.prognostic.clone()
    }

    fn diagnostic(&self) -> Vec<String> {
        self.diagnostic.clone()
    }

    fn axis_length(&self, axis: Axis) -> Option<usize> {
        match axis {
            Axis::Lev => self.levels,
            _ => None,
        }
    }

    fn invoke(&self, inputs: &[Value]) -> Result<KernelOutput, KernelError> {
        let call = self.log.push(inputs) as f64;
        let mut out: Vec<Value> = self.diagnostic.iter().map(|_| Value::Scalar(call)).collect();
        out.extend(self.prognostic.iter().map(|_| Value::Scalar(self.increment)));
        Ok(if out.len() == 1 {
            KernelOutput::Single(out.remove(0))
        } else {
            KernelOutput::Many(out)
        })
    }
}

// ── ConstIncrementKernel ───────────────────────────────────────────

/// Reads one prognostic field and returns a constant increment for it.
pub struct ConstIncrementKernel {
    pub name: String,
    pub field: String,
    pub increment: f64,
}

impl ConstIncrementKernel {
    pub fn new(name: impl Into<String>, field: impl Into<String>, increment: f64) -> Self {
        Self {
            name: name.into(),
            field: field.into(),
            increment,
        }
    }
}

impl Kernel for ConstIncrementKernel {
    fn name(&self) -> &str {
        &self.name
    }

    fn inputs(&self) -> Vec<String> {
        vec![self.field.clone()]
    }

    fn outputs(&self) -> Vec<String> {
        vec![increment_key(&self.field)]
    }

    fn prognostic(&self) -> Vec<String> {
        vec![self.field.clone()]
    }

    fn invoke(&self, _inputs: &[Value]) -> Result<KernelOutput, KernelError> {
        Ok(KernelOutput::Single(Value::Scalar(self.increment)))
    }
}

// ── FailingKernel ──────────────────────────────────────────────────

/// Fails deterministically after `succeed_count` successful calls.
///
/// Successful calls return a zero increment for `field`.
pub struct FailingKernel {
    pub name: String,
    pub field: String,
    pub succeed_count: usize,
    calls: AtomicUsize,
}

impl FailingKernel {
    pub fn new(name: impl Into<String>, field: impl Into<String>, succeed_count: usize) -> Self {
        Self {
            name: name.into(),
            field: field.into(),
            succeed_count,
            calls: AtomicUsize::new(0),
        }
    }
}

impl Kernel for FailingKernel {
    fn name(&self) -> &str {
        &self.name
    }

    fn inputs(&self) -> Vec<String> {
        vec![self.field.clone()]
    }

    fn outputs(&self) -> Vec<String> {
        vec![increment_key(&self.field)]
    }

    fn prognostic(&self) -> Vec<String> {
        vec![self.field.clone()]
    }

    fn invoke(&self, _inputs: &[Value]) -> Result<KernelOutput, KernelError> {
        let n = self.calls.fetch_add(1, Ordering::Relaxed);
        if n >= self.succeed_count {
            Err(KernelError::ExecutionFailed {
                reason: format!("deliberate failure at call {n}"),
            })
        } else {
            Ok(KernelOutput::Single(Value::Scalar(0.0)))
        }
    }
}

// ── MissingIncrementKernel ─────────────────────────────────────────

/// Declares `T` prognostic but outputs only a diagnostic.
pub struct MissingIncrementKernel;

impl Kernel for MissingIncrementKernel {
    fn name(&self) -> &str {
        "missing_increment"
    }

    fn inputs(&self) -> Vec<String> {
        vec!["T".into()]
    }

    fn outputs(&self) -> Vec<String> {
        vec!["TdotRad".into()]
    }

    fn prognostic(&self) -> Vec<String> {
        vec!["T".into()]
    }

    fn diagnostic(&self) -> Vec<String> {
        vec!["TdotRad".into()]
    }

    fn invoke(&self, _inputs: &[Value]) -> Result<KernelOutput, KernelError> {
        Ok(KernelOutput::Single(Value::Scalar(0.0)))
    }
}

// ── WrongArityKernel ───────────────────────────────────────────────

/// Declares a diagnostic and an increment but returns a single value.
pub struct WrongArityKernel;

impl Kernel for WrongArityKernel {
    fn name(&self) -> &str {
        "wrong_arity"
    }

    fn inputs(&self) -> Vec<String> {
        vec!["T".into()]
    }

    fn outputs(&self) -> Vec<String> {
        vec!["TdotRad".into(), "Tinc".into()]
    }

    fn prognostic(&self) -> Vec<String> {
        vec!["T".into()]
    }

    fn diagnostic(&self) -> Vec<String> {
        vec!["TdotRad".into()]
    }

    fn invoke(&self, _inputs: &[Value]) -> Result<KernelOutput, KernelError> {
        Ok(KernelOutput::Single(Value::Scalar(0.0)))
    }
}
