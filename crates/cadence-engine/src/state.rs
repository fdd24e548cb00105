//! The two-level [`State`] and its advancement rule.

use cadence_core::{FieldCatalog, FieldId, FieldSet, Shape, Value, ValueError, ValueSource};
use cadence_grid::Grid;
use indexmap::IndexMap;

use crate::config::ConfigError;
use crate::increments::Increments;

/// Field values at two time levels plus the elapsed simulated time.
///
/// `now` holds every field of the component; `old` holds the previous
/// time level of the prognostic fields only. Every stored value has the
/// declared shape of its field on the component's grid.
#[derive(Clone, Debug, PartialEq)]
pub struct State {
    catalog: FieldCatalog,
    shapes: IndexMap<FieldId, Shape>,
    now: IndexMap<FieldId, Value>,
    old: IndexMap<FieldId, Value>,
    elapsed_time: f64,
}

impl State {
    /// Create a state holding `fields`.
    ///
    /// Each field takes its value from `initial` (broadcast or reshaped to
    /// the declared shape) or, failing that, its catalog default. `old`
    /// starts equal to `now` for every field in `prognostic`.
    pub fn new(
        catalog: &FieldCatalog,
        grid: &Grid,
        fields: &FieldSet,
        prognostic: &FieldSet,
        initial: &IndexMap<String, Value>,
        elapsed_time: f64,
    ) -> Result<Self, ConfigError> {
        let mut shapes = IndexMap::with_capacity(fields.len());
        let mut now = IndexMap::with_capacity(fields.len());
        for id in fields.iter() {
            let Some(def) = catalog.def(id) else {
                continue;
            };
            let shape = grid.field_shape(def.rank);
            let source = initial
                .get(&def.name)
                .cloned()
                .unwrap_or(Value::Scalar(def.default));
            let value = source
                .conform(&shape)
                .map_err(|source| ConfigError::InvalidValue {
                    name: def.name.clone(),
                    source,
                })?;
            shapes.insert(id, shape);
            now.insert(id, value);
        }
        let old = prognostic
            .iter()
            .filter_map(|id| now.get(&id).map(|v| (id, v.clone())))
            .collect();
        Ok(Self {
            catalog: catalog.clone(),
            shapes,
            now,
            old,
            elapsed_time,
        })
    }

    /// Elapsed simulated time in seconds.
    pub fn elapsed_time(&self) -> f64 {
        self.elapsed_time
    }

    /// Current value of a field.
    pub fn now(&self, field: FieldId) -> Option<&Value> {
        self.now.get(&field)
    }

    /// Previous value of a prognostic field.
    pub fn old(&self, field: FieldId) -> Option<&Value> {
        self.old.get(&field)
    }

    /// Declared shape of a field.
    pub fn shape(&self, field: FieldId) -> Option<&Shape> {
        self.shapes.get(&field)
    }

    /// Whether the state holds `field`.
    pub fn contains(&self, field: FieldId) -> bool {
        self.now.contains_key(&field)
    }

    /// Fields held, in declaration order.
    pub fn fields(&self) -> impl Iterator<Item = FieldId> + '_ {
        self.now.keys().copied()
    }

    /// Number of fields held.
    pub fn len(&self) -> usize {
        self.now.len()
    }

    /// Whether the state holds no fields.
    pub fn is_empty(&self) -> bool {
        self.now.is_empty()
    }

    /// The catalog the state's field ids refer to.
    pub fn catalog(&self) -> &FieldCatalog {
        &self.catalog
    }

    fn conformed(&self, field: FieldId, value: &Value) -> Result<Option<Value>, ValueError> {
        match self.shapes.get(&field) {
            Some(shape) => value.conform(shape).map(Some),
            None => Ok(None),
        }
    }

    /// Replace the current value of a field.
    ///
    /// Returns `Ok(false)` if the state does not hold `field`.
    pub fn set_now(&mut self, field: FieldId, value: &Value) -> Result<bool, ValueError> {
        let Some(v) = self.conformed(field, value)? else {
            return Ok(false);
        };
        self.now.insert(field, v);
        Ok(true)
    }

    /// Assign a field at both time levels.
    ///
    /// Used for external assignment, so a prognostic field does not carry
    /// a stale previous level into the next step.
    pub fn assign(&mut self, field: FieldId, value: &Value) -> Result<bool, ValueError> {
        let Some(v) = self.conformed(field, value)? else {
            return Ok(false);
        };
        if let Some(old) = self.old.get_mut(&field) {
            *old = v.clone();
        }
        self.now.insert(field, v);
        Ok(true)
    }

    /// Advance one timestep.
    ///
    /// For every field in `marching`: the current level becomes the
    /// previous level and the accumulated increment is added to it
    /// (forward Euler). Elapsed time grows by `dt`.
    pub fn advance(
        &mut self,
        inc: &Increments,
        marching: &FieldSet,
        dt: f64,
    ) -> Result<(), ValueError> {
        let mut next = Vec::with_capacity(marching.len());
        for id in marching.iter() {
            let Some(current) = self.now.get(&id) else {
                continue;
            };
            let updated = match inc.get(id) {
                Some(delta) => current.add(delta)?,
                None => current.clone(),
            };
            next.push((id, updated));
        }
        // Apply only once every field has advanced without error.
        for (id, updated) in next {
            if let Some(previous) = self.now.insert(id, updated) {
                self.old.insert(id, previous);
            }
        }
        self.elapsed_time += dt;
        Ok(())
    }

    /// Mutable current value of a field, already of the declared shape.
    pub(crate) fn now_mut(&mut self, field: FieldId) -> Option<&mut Value> {
        self.now.get_mut(&field)
    }
}

impl ValueSource for State {
    fn value(&self, name: &str) -> Option<&Value> {
        self.catalog.id(name).and_then(|id| self.now.get(&id))
    }

    fn names(&self) -> Vec<String> {
        self.now
            .keys()
            .filter_map(|&id| self.catalog.name(id).map(str::to_string))
            .collect()
    }
}
