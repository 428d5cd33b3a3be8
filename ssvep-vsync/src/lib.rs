//! Optical trigger encoding for the photodiode patch.
//!
//! Two protocols exist. [`BinaryPatch`] shows the low four bits of the code
//! as a static quadrant pattern. [`PulsePatch`] flashes the whole patch twice
//! and encodes the code in the start-to-start gap between the flashes.

pub mod binary;
pub mod config;
pub mod error;
pub mod patch;
pub mod pulse;
pub mod record;

pub use binary::{BinaryPatch, decode_quadrants};
pub use config::{PulseTiming, SyncConfig, SyncProtocol};
pub use error::SyncError;
pub use patch::{PatchGeometry, SyncPatch, SyncPatchEncoder};
pub use pulse::{PulseIndex, PulsePatch, PulseState, decode_interval, decode_light_trace};
pub use record::TriggerRecord;
