//! Schema and record types for the history format.

use cadence_core::{FieldRank, Value};
use indexmap::IndexMap;

/// One coordinate axis as declared in a history file.
#[derive(Clone, Debug, PartialEq)]
pub struct AxisSchema {
    /// Axis name (`"lev"`, `"lat"` or `"lon"`).
    pub name: String,
    /// Descriptive name.
    pub long_name: String,
    /// Unit annotation.
    pub units: String,
    /// Coordinate values.
    pub values: Vec<f64>,
}

/// One output variable as declared in a history file.
#[derive(Clone, Debug, PartialEq)]
pub struct VariableSchema {
    /// Field name.
    pub name: String,
    /// Descriptive name.
    pub long_name: String,
    /// Unit annotation.
    pub units: String,
    /// Surface (2D) or column (3D).
    pub rank: FieldRank,
}

/// Everything declared once when a history file is created.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Schema {
    /// Free-form global attributes (conventions, version, restart origin).
    pub attributes: Vec<(String, String)>,
    /// Parameter values at creation. Only [`Value::Scalar`] and
    /// [`Value::Text`] are stored.
    pub params: IndexMap<String, Value>,
    /// Coordinate axes, in `lev`, `lat`, `lon` order.
    pub axes: Vec<AxisSchema>,
    /// Every variable a record may carry.
    pub variables: Vec<VariableSchema>,
}

impl Schema {
    /// Look up an axis by name.
    pub fn axis(&self, name: &str) -> Option<&AxisSchema> {
        self.axes.iter().find(|a| a.name == name)
    }

    /// Look up a variable by name.
    pub fn variable(&self, name: &str) -> Option<&VariableSchema> {
        self.variables.iter().find(|v| v.name == name)
    }

    /// Length of an axis, or 1 if it is not declared.
    pub fn axis_len(&self, name: &str) -> usize {
        self.axis(name).map_or(1, |a| a.values.len())
    }

    /// Array shape of a variable of the given rank.
    pub fn shape_of(&self, rank: FieldRank) -> Vec<usize> {
        rank.shape(self.axis_len("lev"), self.axis_len("lat"), self.axis_len("lon"))
            .to_vec()
    }
}

/// One time record.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Record {
    /// Simulated elapsed time in days.
    pub time_days: f64,
    /// Calendar day at the time of writing.
    pub calday: f64,
    /// Field values, flattened row-major and narrowed to `f32`.
    pub fields: IndexMap<String, Vec<f32>>,
}

impl Record {
    /// Start a record at the given time.
    pub fn new(time_days: f64, calday: f64) -> Self {
        Self {
            time_days,
            calday,
            fields: IndexMap::new(),
        }
    }

    /// Add a field, narrowing its elements to `f32`.
    pub fn push_field(&mut self, name: impl Into<String>, value: &Value) {
        let data = value.to_vec().into_iter().map(|v| v as f32).collect();
        self.fields.insert(name.into(), data);
    }
}
