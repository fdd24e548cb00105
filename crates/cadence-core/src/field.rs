//! Field definitions, the [`FieldCatalog`], and the [`FieldSet`] used for
//! prognostic / diagnostic / fixed classification.

use indexmap::{IndexMap, IndexSet};

use crate::id::{FieldId, Shape};

/// Spatial rank of a field.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FieldRank {
    /// A surface field of shape `(nlat, nlon)`.
    Surface,
    /// A column field of shape `(nlev, nlat, nlon)`.
    Column,
}

impl FieldRank {
    /// Short label used in history files and reports (`"2D"` / `"3D"`).
    pub fn label(&self) -> &'static str {
        match self {
            Self::Surface => "2D",
            Self::Column => "3D",
        }
    }

    /// Parse a label produced by [`label()`](Self::label).
    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "2D" => Some(Self::Surface),
            "3D" => Some(Self::Column),
            _ => None,
        }
    }

    /// Field shape for the given grid dimensions.
    pub fn shape(&self, nlev: usize, nlat: usize, nlon: usize) -> Shape {
        match self {
            Self::Surface => Shape::from_slice(&[nlat, nlon]),
            Self::Column => Shape::from_slice(&[nlev, nlat, nlon]),
        }
    }
}

/// How a component treats a field it declares.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FieldClass {
    /// Time-marched from accumulated increments.
    Prognostic,
    /// Recomputed by the kernel, never time-marched.
    Diagnostic,
    /// Prognostic, but excluded from time-marching for this run.
    Fixed,
}

impl FieldClass {
    /// Tag used by component reports.
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Prognostic => "(prognostic)",
            Self::Diagnostic => "(diagnostic)",
            Self::Fixed => "(fixed)",
        }
    }
}

/// Static metadata for a known field.
#[derive(Clone, Debug, PartialEq)]
pub struct FieldDef {
    /// Short name used as the lookup key (e.g. `"T"`).
    pub name: String,
    /// Descriptive name written to history files.
    pub long_name: String,
    /// Unit annotation (e.g. `"K"`).
    pub units: String,
    /// Surface or column field.
    pub rank: FieldRank,
    /// Value used to fill the field when no initial value is supplied.
    pub default: f64,
}

impl FieldDef {
    /// Convenience constructor.
    pub fn new(
        name: impl Into<String>,
        long_name: impl Into<String>,
        units: impl Into<String>,
        rank: FieldRank,
        default: f64,
    ) -> Self {
        Self {
            name: name.into(),
            long_name: long_name.into(),
            units: units.into(),
            rank,
            default,
        }
    }

    /// Check structural invariants.
    ///
    /// Names must be non-empty and free of whitespace, and must not end in
    /// the reserved `inc` / `old` suffixes used for derived kernel keys.
    pub fn validate(&self) -> Result<(), String> {
        if self.name.is_empty() {
            return Err("field name is empty".to_string());
        }
        if self.name.chars().any(char::is_whitespace) {
            return Err(format!("field name '{}' contains whitespace", self.name));
        }
        for suffix in ["inc", "old"] {
            if self.name.len() > suffix.len() && self.name.ends_with(suffix) {
                return Err(format!(
                    "field name '{}' ends with reserved suffix '{suffix}'",
                    self.name
                ));
            }
        }
        if !self.default.is_finite() {
            return Err(format!(
                "field '{}' default {} is not finite",
                self.name, self.default
            ));
        }
        Ok(())
    }
}

/// The closed set of field names a component may refer to.
///
/// `FieldId(n)` is the n-th registered definition. Names are validated on
/// registration, so every id handed out refers to a well-formed field.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FieldCatalog {
    defs: IndexMap<String, FieldDef>,
}

impl FieldCatalog {
    /// Create an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// The standard atmospheric field set.
    pub fn standard() -> Self {
        use FieldRank::{Column, Surface};
        let defs = [
            FieldDef::new("T", "air temperature", "K", Column, 283.15),
            FieldDef::new("q", "specific humidity", "g/kg", Column, 1.0e-5),
            FieldDef::new("U", "zonal wind", "m/s", Column, 0.0),
            FieldDef::new("V", "meridional wind", "m/s", Column, 0.0),
            FieldDef::new("o3", "ozone mass mixing ratio", "kg/kg", Column, 0.0),
            FieldDef::new("cldf", "cloud fraction", "0-1", Column, 0.0),
            FieldDef::new("clwp", "cloud liquid water path", "g/m2", Column, 0.0),
            FieldDef::new("theta", "potential temperature", "K", Column, 283.15),
            FieldDef::new("TdotRad", "radiative heating rate", "K/day", Column, 0.0),
            FieldDef::new("TdotConv", "convective heating rate", "K/day", Column, 0.0),
            FieldDef::new("ps", "surface pressure", "mb", Surface, 1000.0),
            FieldDef::new("Ts", "surface temperature", "K", Surface, 283.15),
            FieldDef::new("SrfRadFlx", "net surface radiative flux", "W/m2", Surface, 0.0),
            FieldDef::new("SrfSenHtFlx", "surface sensible heat flux", "W/m2", Surface, 0.0),
            FieldDef::new("SrfLatHtFlx", "surface latent heat flux", "W/m2", Surface, 0.0),
            FieldDef::new("SwToa", "top-of-atmosphere shortwave flux", "W/m2", Surface, 0.0),
            FieldDef::new("LwToa", "top-of-atmosphere longwave flux", "W/m2", Surface, 0.0),
            FieldDef::new("precc", "convective precipitation rate", "mm/day", Surface, 0.0),
        ];
        let mut catalog = Self::new();
        for def in defs {
            catalog.defs.insert(def.name.clone(), def);
        }
        catalog
    }

    /// Register a new field definition, returning its id.
    pub fn register(&mut self, def: FieldDef) -> Result<FieldId, String> {
        def.validate()?;
        if self.defs.contains_key(&def.name) {
            return Err(format!("field '{}' is already registered", def.name));
        }
        let id = FieldId(u32::try_from(self.defs.len()).map_err(|_| "catalog is full".to_string())?);
        self.defs.insert(def.name.clone(), def);
        Ok(id)
    }

    /// Resolve a field name to its id.
    pub fn id(&self, name: &str) -> Option<FieldId> {
        self.defs
            .get_index_of(name)
            .and_then(|i| u32::try_from(i).ok())
            .map(FieldId)
    }

    /// Look up a definition by id.
    pub fn def(&self, id: FieldId) -> Option<&FieldDef> {
        self.defs.get_index(id.0 as usize).map(|(_, d)| d)
    }

    /// Look up a definition by name.
    pub fn get(&self, name: &str) -> Option<&FieldDef> {
        self.defs.get(name)
    }

    /// Name of the field with the given id.
    pub fn name(&self, id: FieldId) -> Option<&str> {
        self.defs.get_index(id.0 as usize).map(|(n, _)| n.as_str())
    }

    /// Whether `name` is a known field.
    pub fn contains(&self, name: &str) -> bool {
        self.defs.contains_key(name)
    }

    /// Number of registered fields.
    pub fn len(&self) -> usize {
        self.defs.len()
    }

    /// Whether the catalog is empty.
    pub fn is_empty(&self) -> bool {
        self.defs.is_empty()
    }

    /// Iterate over `(id, definition)` pairs in registration order.
    pub fn iter(&self) -> impl Iterator<Item = (FieldId, &FieldDef)> {
        self.defs
            .values()
            .enumerate()
            .map(|(i, d)| (FieldId(i as u32), d))
    }
}

/// An insertion-ordered set of field ids.
///
/// Order is preserved so reports and history schemas list fields in the
/// order a kernel declared them.
#[derive(Clone, Debug, Default)]
pub struct FieldSet {
    ids: IndexSet<FieldId>,
}

impl FieldSet {
    /// Create an empty field set.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Insert a field id. Returns `false` if it was already present.
    pub fn insert(&mut self, field: FieldId) -> bool {
        self.ids.insert(field)
    }

    /// Remove a field id. Returns `true` if it was present.
    pub fn remove(&mut self, field: FieldId) -> bool {
        self.ids.shift_remove(&field)
    }

    /// Check whether the set contains a field id.
    pub fn contains(&self, field: FieldId) -> bool {
        self.ids.contains(&field)
    }

    /// Union, keeping `self`'s order followed by new members of `other`.
    pub fn union(&self, other: &Self) -> Self {
        let mut ids = self.ids.clone();
        ids.extend(other.ids.iter().copied());
        Self { ids }
    }

    /// Members of `self` that are also in `other`.
    pub fn intersection(&self, other: &Self) -> Self {
        self.iter().filter(|id| other.contains(*id)).collect()
    }

    /// Members of `self` that are not in `other`.
    pub fn difference(&self, other: &Self) -> Self {
        self.iter().filter(|id| !other.contains(*id)).collect()
    }

    /// Whether every member of `self` is in `other`.
    pub fn is_subset(&self, other: &Self) -> bool {
        self.iter().all(|id| other.contains(id))
    }

    /// Returns `true` if the set contains no fields.
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Returns the number of fields in the set.
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Iterate over the field ids in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = FieldId> + '_ {
        self.ids.iter().copied()
    }
}

impl PartialEq for FieldSet {
    /// Set equality, ignoring order.
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.is_subset(other)
    }
}

impl Eq for FieldSet {}

impl FromIterator<FieldId> for FieldSet {
    fn from_iter<I: IntoIterator<Item = FieldId>>(iter: I) -> Self {
        Self {
            ids: iter.into_iter().collect(),
        }
    }
}
