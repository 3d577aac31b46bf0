//! Chain data models
//!
//! This module contains the core data types for binding operations:
//! - `types` - Type aliases for source names and parameters
//! - `descriptor` - Source descriptors and their modes
//! - `raw` - Tagged raw values delivered by a source (RawValue, RawScalar)
//! - `bound` - Normalized values held by a session (BoundValue)
//! - `preferences` - Validator preference records

mod bound;
mod descriptor;
mod preferences;
mod raw;
mod types;

pub use bound::BoundValue;
pub use descriptor::{SourceDescriptor, SourceMode, SourceOptions};
pub use preferences::ValidatorPrefs;
pub use raw::{RawScalar, RawValue};
pub use types::{Param, SourceName};
