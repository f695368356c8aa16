//! Per-flap-setting glide polars.
//!
//! Each of the [`FLAP_SLOTS`] flap settings owns a map from airspeed bucket
//! to an exponentially smoothed sink rate. Buckets are
//! `floor(airspeed_ms / precision)`; stored sink rates are negative down.

mod persistence;
mod store;
mod summary;

use std::collections::BTreeMap;

pub use persistence::{flap_file_name, parse_flap_file_name, save_store, JsonPolarFiles, Persistence};
pub use store::{CaptureOutcome, PolarStore, RejectReason, DEFAULT_SMOOTHING_ALPHA};
pub use summary::PolarSummary;

use crate::error::{Result, SimPolarsError};

/// Number of flap settings tracked.
pub const FLAP_SLOTS: usize = 24;

/// Airspeed bucket → smoothed sink rate (m/s).
pub type PolarMap = BTreeMap<u32, f64>;

/// A validated flap setting index in `0..FLAP_SLOTS`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct FlapIndex(u8);

impl FlapIndex {
    /// Validate a raw index. Out of range is a data or programming defect.
    pub fn new(index: usize) -> Result<Self> {
        if index < FLAP_SLOTS {
            Ok(Self(index as u8))
        } else {
            Err(SimPolarsError::FlapIndexOutOfRange(index))
        }
    }

    pub fn get(&self) -> usize {
        self.0 as usize
    }

    /// Every flap slot in order.
    pub fn all() -> impl Iterator<Item = FlapIndex> {
        (0..FLAP_SLOTS as u8).map(FlapIndex)
    }
}

impl std::fmt::Display for FlapIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Airspeed (m/s) at the lower edge of `bucket`.
pub fn bucket_airspeed_ms(bucket: u32, precision: f64) -> f64 {
    bucket as f64 * precision
}
