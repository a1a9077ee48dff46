//! Ground sample distance values.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{StacError, StacResult};

/// Ground sample distance in CRS units (meters for GeoCubes).
///
/// Whole values serialize as JSON integers so that collection summaries
/// written earlier as `[1, 2, 5, 10]` compare equal to new observations.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Gsd(f64);

impl Gsd {
    /// Wrap an already-derived GSD value.
    pub fn new(value: f64) -> StacResult<Self> {
        if value.is_finite() && value > 0.0 {
            Ok(Self(value))
        } else {
            Err(StacError::InvalidGsd(value))
        }
    }

    /// Derive the GSD from a raster's horizontal pixel resolution.
    ///
    /// Resolutions of one unit or more are truncated to whole units, as the
    /// published catalog records them. Sub-unit resolutions are kept as-is
    /// because truncation would yield zero.
    pub fn from_resolution(resolution: f64) -> StacResult<Self> {
        let res = resolution.abs();
        if res >= 1.0 {
            Self::new(res.trunc())
        } else {
            Self::new(res)
        }
    }

    pub fn value(&self) -> f64 {
        self.0
    }

    /// Smaller of two values.
    pub fn min(self, other: Gsd) -> Gsd {
        if other.0 < self.0 {
            other
        } else {
            self
        }
    }

    fn is_whole(&self) -> bool {
        self.0.fract() == 0.0 && self.0 <= i64::MAX as f64
    }
}

impl fmt::Display for Gsd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_whole() {
            write!(f, "{}", self.0 as i64)
        } else {
            write!(f, "{}", self.0)
        }
    }
}

impl Serialize for Gsd {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if self.is_whole() {
            serializer.serialize_i64(self.0 as i64)
        } else {
            serializer.serialize_f64(self.0)
        }
    }
}

impl<'de> Deserialize<'de> for Gsd {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = f64::deserialize(deserializer)?;
        Gsd::new(value).map_err(serde::de::Error::custom)
    }
}
