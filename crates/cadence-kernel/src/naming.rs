//! Derived key names exchanged with kernels.

/// Input key under which the component's recompute frequency is exposed.
pub const UPDATE_FREQ_KEY: &str = "UpdateFreq";

/// Output key carrying the per-step increment of a prognostic field.
///
/// ```
/// assert_eq!(cadence_kernel::increment_key("T"), "Tinc");
/// ```
pub fn increment_key(field: &str) -> String {
    format!("{field}inc")
}

/// Input key carrying the previous time level of a prognostic field
/// under the semi-implicit scheme.
///
/// ```
/// assert_eq!(cadence_kernel::old_key("q"), "qold");
/// ```
pub fn old_key(field: &str) -> String {
    format!("{field}old")
}
