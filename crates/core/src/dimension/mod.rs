//! Accounting dimensions that must balance independently.

pub mod offsetting;
pub mod registry;

pub use offsetting::{OffsettingDimension, dimension_value, make_offsetting_entries};
pub use registry::DimensionRegistry;
