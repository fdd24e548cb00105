//! Kernel declaration validation and the resulting [`KernelPlan`].
//!
//! [`validate_kernel`] runs once at component construction. It checks the
//! kernel's declaration against the field catalog and caches everything
//! the engine needs per step: positional input/output order, the field
//! classification, and the increment key of each prognostic field.

use indexmap::IndexMap;

use cadence_core::{FieldCatalog, FieldId, FieldSet};

use crate::kernel::{Kernel, SteppingScheme};
use crate::naming::{increment_key, old_key};

use std::error::Error;
use std::fmt;

// ── Plan ───────────────────────────────────────────────────────────

/// A validated kernel declaration.
///
/// Built once by [`validate_kernel`]; immutable afterwards.
#[derive(Debug, Clone)]
#[must_use]
pub struct KernelPlan {
    name: String,
    scheme: SteppingScheme,
    inputs: Vec<String>,
    outputs: Vec<String>,
    prognostic: FieldSet,
    diagnostic: FieldSet,
    input_fields: FieldSet,
    output_fields: FieldSet,
    increments: IndexMap<FieldId, String>,
    external_inputs: Vec<String>,
}

impl KernelPlan {
    /// Name of the kernel.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Stepping scheme the kernel was declared with.
    pub fn scheme(&self) -> SteppingScheme {
        self.scheme
    }

    /// Positional input names, in declaration order.
    pub fn inputs(&self) -> &[String] {
        &self.inputs
    }

    /// Output names, in declaration order.
    pub fn outputs(&self) -> &[String] {
        &self.outputs
    }

    /// Fields the kernel time-marches.
    pub fn prognostic(&self) -> &FieldSet {
        &self.prognostic
    }

    /// Fields the kernel recomputes.
    pub fn diagnostic(&self) -> &FieldSet {
        &self.diagnostic
    }

    /// Inputs that name catalog fields.
    pub fn input_fields(&self) -> &FieldSet {
        &self.input_fields
    }

    /// Outputs that name catalog fields (diagnostics, or prognostic values).
    pub fn output_fields(&self) -> &FieldSet {
        &self.output_fields
    }

    /// Every field the component must hold in its state: inputs,
    /// prognostic, diagnostic and directly output fields.
    pub fn state_fields(&self) -> FieldSet {
        self.input_fields
            .union(&self.prognostic)
            .union(&self.diagnostic)
            .union(&self.output_fields)
    }

    /// Output key carrying the increment of a prognostic field.
    pub fn increment_key(&self, field: FieldId) -> Option<&str> {
        self.increments.get(&field).map(String::as_str)
    }

    /// `(field, increment key)` for every prognostic field.
    pub fn increments(&self) -> impl Iterator<Item = (FieldId, &str)> {
        self.increments.iter().map(|(&id, key)| (id, key.as_str()))
    }

    /// Inputs that are neither state fields nor `<field>old` keys.
    ///
    /// These must be supplied by the grid, the parameters, or be the
    /// recompute frequency; the engine checks them once it has built
    /// those stores.
    pub fn external_inputs(&self) -> &[String] {
        &self.external_inputs
    }
}

// ── Errors ─────────────────────────────────────────────────────────

/// Errors from kernel declaration validation (construction-time).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeclarationError {
    /// The kernel declares no outputs.
    EmptyOutputs {
        /// Which kernel.
        kernel: String,
    },
    /// A name appears twice in the inputs or twice in the outputs.
    DuplicateName {
        /// Which kernel.
        kernel: String,
        /// The repeated name.
        name: String,
    },
    /// A prognostic or diagnostic name is not a known field.
    UnknownField {
        /// Which kernel.
        kernel: String,
        /// The unresolved name.
        name: String,
    },
    /// A field is declared both prognostic and diagnostic.
    ClassConflict {
        /// Which kernel.
        kernel: String,
        /// The doubly-declared field.
        field: String,
    },
    /// A prognostic field has no `<field>inc` output.
    MissingIncrement {
        /// Which kernel.
        kernel: String,
        /// The prognostic field.
        field: String,
    },
    /// An output is neither a known field nor a prognostic increment.
    UnknownOutput {
        /// Which kernel.
        kernel: String,
        /// The offending output name.
        name: String,
    },
    /// A `<field>old` input was declared outside the semi-implicit scheme.
    OldInputNotSemiImplicit {
        /// Which kernel.
        kernel: String,
        /// The offending input name.
        name: String,
        /// The scheme the kernel declared.
        scheme: SteppingScheme,
    },
}

impl fmt::Display for DeclarationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyOutputs { kernel } => write!(f, "kernel '{kernel}' declares no outputs"),
            Self::DuplicateName { kernel, name } => {
                write!(f, "kernel '{kernel}' declares '{name}' more than once")
            }
            Self::UnknownField { kernel, name } => {
                write!(f, "kernel '{kernel}' declares unknown field '{name}'")
            }
            Self::ClassConflict { kernel, field } => write!(
                f,
                "kernel '{kernel}' declares '{field}' both prognostic and diagnostic"
            ),
            Self::MissingIncrement { kernel, field } => write!(
                f,
                "kernel '{kernel}' does not output an increment '{}' for prognostic field '{field}'",
                increment_key(field)
            ),
            Self::UnknownOutput { kernel, name } => write!(
                f,
                "kernel '{kernel}' output '{name}' is neither a field nor a prognostic increment"
            ),
            Self::OldInputNotSemiImplicit {
                kernel,
                name,
                scheme,
            } => write!(
                f,
                "kernel '{kernel}' input '{name}' requires the semi-implicit scheme, not {}",
                scheme.as_str()
            ),
        }
    }
}

impl Error for DeclarationError {}

// ── Validation ─────────────────────────────────────────────────────

/// Validate a kernel declaration and build its [`KernelPlan`].
///
/// Checks, in order:
/// 1. At least one output is declared.
/// 2. No name repeats within the inputs or within the outputs.
/// 3. Every prognostic and diagnostic name is a catalog field.
/// 4. No field is both prognostic and diagnostic.
/// 5. Every prognostic field has a `<field>inc` output.
/// 6. Every output is a catalog field or a prognostic increment.
/// 7. `<field>old` inputs only appear under the semi-implicit scheme.
pub fn validate_kernel(
    kernel: &dyn Kernel,
    catalog: &FieldCatalog,
) -> Result<KernelPlan, DeclarationError> {
    let name = kernel.name().to_string();
    let scheme = kernel.scheme();
    let inputs = kernel.inputs();
    let outputs = kernel.outputs();

    // 1. Outputs
    if outputs.is_empty() {
        return Err(DeclarationError::EmptyOutputs { kernel: name });
    }

    // 2. Duplicates
    for list in [&inputs, &outputs] {
        let mut seen = indexmap::IndexSet::with_capacity(list.len());
        for n in list {
            if !seen.insert(n.as_str()) {
                return Err(DeclarationError::DuplicateName {
                    kernel: name,
                    name: n.clone(),
                });
            }
        }
    }

    // 3. Classification names
    let resolve = |names: Vec<String>| -> Result<FieldSet, DeclarationError> {
        names
            .into_iter()
            .map(|n| {
                catalog.id(&n).ok_or_else(|| DeclarationError::UnknownField {
                    kernel: name.clone(),
                    name: n,
                })
            })
            .collect()
    };
    let prognostic = resolve(kernel.prognostic())?;
    let diagnostic = resolve(kernel.diagnostic())?;

    // 4. Disjoint
    if let Some(id) = prognostic.intersection(&diagnostic).iter().next() {
        return Err(DeclarationError::ClassConflict {
            kernel: name,
            field: field_name(catalog, id),
        });
    }

    // 5. Increments
    let mut increments = IndexMap::with_capacity(prognostic.len());
    for id in prognostic.iter() {
        let field = field_name(catalog, id);
        let key = increment_key(&field);
        if !outputs.contains(&key) {
            return Err(DeclarationError::MissingIncrement {
                kernel: name,
                field,
            });
        }
        increments.insert(id, key);
    }

    // 6. Outputs resolve
    let mut output_fields = FieldSet::empty();
    for out in &outputs {
        if let Some(id) = catalog.id(out) {
            output_fields.insert(id);
        } else if !increments.values().any(|k| k == out) {
            return Err(DeclarationError::UnknownOutput {
                kernel: name,
                name: out.clone(),
            });
        }
    }

    // 7. Inputs
    let mut input_fields = FieldSet::empty();
    let mut external_inputs = Vec::new();
    for input in &inputs {
        if let Some(id) = catalog.id(input) {
            input_fields.insert(id);
            continue;
        }
        let is_old = prognostic
            .iter()
            .any(|id| old_key(&field_name(catalog, id)) == *input);
        if is_old {
            if scheme != SteppingScheme::SemiImplicit {
                return Err(DeclarationError::OldInputNotSemiImplicit {
                    kernel: name,
                    name: input.clone(),
                    scheme,
                });
            }
            continue;
        }
        external_inputs.push(input.clone());
    }

    Ok(KernelPlan {
        name,
        scheme,
        inputs,
        outputs,
        prognostic,
        diagnostic,
        input_fields,
        output_fields,
        increments,
        external_inputs,
    })
}

fn field_name(catalog: &FieldCatalog, id: FieldId) -> String {
    catalog
        .name(id)
        .map_or_else(|| id.to_string(), str::to_string)
}
