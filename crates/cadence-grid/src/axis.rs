//! The three grid axes and their default coordinate values.

use ndarray::Array1;

/// One of the three grid axes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Axis {
    /// Vertical level (pressure, mb). Index 0 is the top of the column.
    Lev,
    /// Latitude (degrees north).
    Lat,
    /// Longitude (degrees east).
    Lon,
}

impl Axis {
    /// All axes in storage order `(lev, lat, lon)`.
    pub const ALL: [Axis; 3] = [Axis::Lev, Axis::Lat, Axis::Lon];

    /// Name of the coordinate variable (`"lev"`, `"lat"`, `"lon"`).
    pub fn name(&self) -> &'static str {
        match self {
            Self::Lev => "lev",
            Self::Lat => "lat",
            Self::Lon => "lon",
        }
    }

    /// Name of the derived length entry (`"nlev"`, `"nlat"`, `"nlon"`).
    pub fn length_name(&self) -> &'static str {
        match self {
            Self::Lev => "nlev",
            Self::Lat => "nlat",
            Self::Lon => "nlon",
        }
    }

    /// Descriptive name written to history files.
    pub fn long_name(&self) -> &'static str {
        match self {
            Self::Lev => "level",
            Self::Lat => "latitude",
            Self::Lon => "longitude",
        }
    }

    /// Unit annotation written to history files.
    pub fn units(&self) -> &'static str {
        match self {
            Self::Lev => "mb",
            Self::Lat => "degrees_north",
            Self::Lon => "degrees_east",
        }
    }

    /// Parse a coordinate variable name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|a| a.name() == name)
    }

    /// Parse a derived length name.
    pub fn from_length_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|a| a.length_name() == name)
    }

    /// Evenly spaced default coordinates for an axis of length `n`.
    ///
    /// Levels are mid-layer pressures of `n` equal-mass layers spanning
    /// 0..1000 mb; latitudes are cell centres between the poles; longitudes
    /// start at the prime meridian.
    pub fn default_coordinates(&self, n: usize) -> Array1<f64> {
        let nf = n as f64;
        match self {
            Self::Lev => Array1::from_shape_fn(n, |i| (i as f64 + 0.5) * 1000.0 / nf),
            Self::Lat if n == 1 => Array1::from_elem(1, 0.0),
            Self::Lat => Array1::from_shape_fn(n, |j| -90.0 + (j as f64 + 0.5) * 180.0 / nf),
            Self::Lon => Array1::from_shape_fn(n, |i| i as f64 * 360.0 / nf),
        }
    }
}

/// Resolved axis lengths for a component.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GridDims {
    /// Number of vertical levels.
    pub nlev: usize,
    /// Number of latitudes.
    pub nlat: usize,
    /// Number of longitudes.
    pub nlon: usize,
}

impl GridDims {
    /// Construct from explicit lengths.
    pub fn new(nlev: usize, nlat: usize, nlon: usize) -> Self {
        Self { nlev, nlat, nlon }
    }

    /// Length along `axis`.
    pub fn get(&self, axis: Axis) -> usize {
        match axis {
            Axis::Lev => self.nlev,
            Axis::Lat => self.nlat,
            Axis::Lon => self.nlon,
        }
    }

    /// Set the length along `axis`.
    pub fn set(&mut self, axis: Axis, n: usize) {
        match axis {
            Axis::Lev => self.nlev = n,
            Axis::Lat => self.nlat = n,
            Axis::Lon => self.nlon = n,
        }
    }
}

impl Default for GridDims {
    /// A single column of ten levels.
    fn default() -> Self {
        Self::new(10, 1, 1)
    }
}
