//! Per-field increments: a component's own forcing and the external
//! forcing supplied to `step`.

use cadence_core::{FieldCatalog, FieldId, LookupError, Value, ValueError};
use indexmap::IndexMap;

/// Per-timestep increments keyed by field.
///
/// Used both as a component's own increment map and as the external
/// increments passed to [`Component::step`](crate::Component::step).
/// Components built from the same catalog share field ids, so the
/// increments of one component can be handed directly to another.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Increments {
    values: IndexMap<FieldId, Value>,
}

impl Increments {
    /// No increments.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build increments from `(name, value)` pairs, resolving names in
    /// `catalog`.
    pub fn from_named<'a, I>(catalog: &FieldCatalog, entries: I) -> Result<Self, LookupError>
    where
        I: IntoIterator<Item = (&'a str, Value)>,
    {
        let mut inc = Self::new();
        for (name, value) in entries {
            let id = catalog.id(name).ok_or_else(|| LookupError::new(name))?;
            inc.insert(id, value);
        }
        Ok(inc)
    }

    /// Set the increment of a field, replacing any previous value.
    pub fn insert(&mut self, field: FieldId, value: Value) -> Option<Value> {
        self.values.insert(field, value)
    }

    /// Add to the increment of a field, creating it if absent.
    pub fn accumulate(&mut self, field: FieldId, value: &Value) -> Result<(), ValueError> {
        match self.values.get_mut(&field) {
            Some(existing) => existing.accumulate(value),
            None => {
                self.values.insert(field, value.clone());
                Ok(())
            }
        }
    }

    /// The increment of a field.
    pub fn get(&self, field: FieldId) -> Option<&Value> {
        self.values.get(&field)
    }

    /// Remove the increment of a field.
    pub fn remove(&mut self, field: FieldId) -> Option<Value> {
        self.values.shift_remove(&field)
    }

    /// Whether a field has an increment.
    pub fn contains(&self, field: FieldId) -> bool {
        self.values.contains_key(&field)
    }

    /// Number of fields with an increment.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether no field has an increment.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Drop every increment.
    pub fn clear(&mut self) {
        self.values.clear();
    }

    /// Iterate over `(field, increment)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (FieldId, &Value)> {
        self.values.iter().map(|(&id, v)| (id, v))
    }
}

impl FromIterator<(FieldId, Value)> for Increments {
    fn from_iter<I: IntoIterator<Item = (FieldId, Value)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}
