//! Core abstraction traits for name-based value lookup.

use crate::value::Value;

/// Read-only, name-keyed access to stored values.
///
/// Implemented by the parameter store, the grid and the state so the
/// field-indexed accessor can consult them in priority order without
/// knowing their concrete types.
pub trait ValueSource {
    /// Look up a value by name. Returns `None` if the name is unknown here.
    fn value(&self, name: &str) -> Option<&Value>;

    /// Whether this source holds `name`.
    fn contains(&self, name: &str) -> bool {
        self.value(name).is_some()
    }

    /// Names of every value held, in a stable order.
    fn names(&self) -> Vec<String>;
}
