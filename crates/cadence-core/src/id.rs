//! Strongly-typed identifiers and the [`Shape`] type alias.

use smallvec::SmallVec;
use std::fmt;

/// Identifies a field within a [`FieldCatalog`](crate::FieldCatalog).
///
/// Fields are registered in the catalog in order and assigned sequential
/// IDs. `FieldId(n)` corresponds to the n-th entry of the catalog.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FieldId(pub u32);

impl fmt::Display for FieldId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for FieldId {
    fn from(v: u32) -> Self {
        Self(v)
    }
}

/// Array shape, row-major, at most three axes without spilling.
///
/// Surface fields use `[nlat, nlon]`, column fields `[nlev, nlat, nlon]`.
pub type Shape = SmallVec<[usize; 3]>;
