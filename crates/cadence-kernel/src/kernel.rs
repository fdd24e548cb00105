//! The [`Kernel`] trait, [`SteppingScheme`] and [`KernelOutput`].
//!
//! Kernels are opaque, stateless compute functions. They declare their
//! positional inputs and outputs once; the engine assembles the inputs,
//! calls [`invoke`](Kernel::invoke), and maps the outputs back to names.

use cadence_core::{KernelError, Value};
use cadence_grid::Axis;
use indexmap::IndexMap;

/// Which time level(s) of the state a kernel sees.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum SteppingScheme {
    /// The kernel sees only the current time level.
    #[default]
    Explicit,
    /// Every input that has a previous time level is replaced by it
    /// (lagged evaluation).
    Implicit,
    /// The kernel sees the current level plus a `<name>old` copy of each
    /// prognostic field's previous level.
    SemiImplicit,
}

impl SteppingScheme {
    /// Conventional name (`"explicit"`, `"implicit"`, `"semi-implicit"`).
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Explicit => "explicit",
            Self::Implicit => "implicit",
            Self::SemiImplicit => "semi-implicit",
        }
    }
}

/// The result of a kernel invocation.
#[derive(Clone, Debug, PartialEq)]
pub enum KernelOutput {
    /// A single value, for kernels with exactly one declared output.
    Single(Value),
    /// One value per declared output, in declaration order.
    Many(Vec<Value>),
}

impl KernelOutput {
    /// Pair the output values with their declared names.
    ///
    /// Fails with [`KernelError::ArityMismatch`] if the number of values
    /// does not match the declaration.
    pub fn into_named(self, names: &[String]) -> Result<IndexMap<String, Value>, KernelError> {
        let values = match self {
            Self::Single(v) => vec![v],
            Self::Many(vs) => vs,
        };
        if values.len() != names.len() {
            return Err(KernelError::ArityMismatch {
                expected: names.len(),
                found: values.len(),
            });
        }
        Ok(names.iter().cloned().zip(values).collect())
    }
}

/// A compute kernel for one physical process.
///
/// # Contract
///
/// - `invoke()` MUST be deterministic and free of side effects: it has no
///   notion of time beyond the inputs it is given.
/// - `&self`: kernels are stateless; everything that evolves lives in the
///   component's state.
/// - The declaration methods are called once at component construction,
///   not per step.
/// - For every prognostic field `X` the outputs MUST include `Xinc`, the
///   per-timestep increment of `X`.
///
/// # Examples
///
/// A kernel that relaxes surface temperature towards 288 K:
///
/// ```
/// use cadence_core::{KernelError, Value};
/// use cadence_kernel::{Kernel, KernelOutput};
///
/// struct SurfaceRelax;
///
/// impl Kernel for SurfaceRelax {
///     fn name(&self) -> &str { "surface_relax" }
///     fn inputs(&self) -> Vec<String> { vec!["Ts".into(), "dt".into()] }
///     fn outputs(&self) -> Vec<String> { vec!["Tsinc".into()] }
///     fn prognostic(&self) -> Vec<String> { vec!["Ts".into()] }
///
///     fn invoke(&self, inputs: &[Value]) -> Result<KernelOutput, KernelError> {
///         let dt = inputs[1].as_scalar().unwrap_or(0.0);
///         let ts = inputs[0].to_dyn().ok_or(KernelError::InvalidArgument {
///             name: "Ts".into(),
///             reason: "not numeric".into(),
///         })?;
///         let inc = ts.mapv(|t| (288.0 - t) * dt / 86400.0);
///         let inc = Value::from_dyn(inc).map_err(|e| KernelError::ExecutionFailed {
///             reason: e.to_string(),
///         })?;
///         Ok(KernelOutput::Single(inc))
///     }
/// }
///
/// let out = SurfaceRelax.invoke(&[Value::Scalar(287.0), Value::Scalar(86400.0)]).unwrap();
/// assert_eq!(out, KernelOutput::Single(Value::Scalar(1.0)));
/// ```
pub trait Kernel: Send + 'static {
    /// Human-readable name for reports, logs and error messages.
    fn name(&self) -> &str;

    /// Which time levels the kernel sees. Default: explicit.
    fn scheme(&self) -> SteppingScheme {
        SteppingScheme::Explicit
    }

    /// Ordered names of the positional inputs.
    ///
    /// Names may refer to state fields, grid entries, parameters, the
    /// recompute frequency (`UpdateFreq`), or `<field>old` under the
    /// semi-implicit scheme.
    fn inputs(&self) -> Vec<String>;

    /// Ordered names of the outputs: diagnostics and `<field>inc` entries.
    fn outputs(&self) -> Vec<String>;

    /// Fields this kernel time-marches.
    fn prognostic(&self) -> Vec<String>;

    /// Fields this kernel recomputes. Default: none.
    fn diagnostic(&self) -> Vec<String> {
        Vec::new()
    }

    /// Length the kernel requires along `axis`, if it enforces one.
    fn axis_length(&self, axis: Axis) -> Option<usize> {
        let _ = axis;
        None
    }

    /// Run the computation on positionally ordered inputs.
    fn invoke(&self, inputs: &[Value]) -> Result<KernelOutput, KernelError>;
}
