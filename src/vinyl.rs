//! Vinyl pressing: pack an album's tracks onto record sides.
//!
//! `partition` greedily fills sides up to a duration budget and pads the
//! result to an even count so every disc has an A and a B side.
//! `pair_into_discs` and the side-letter helpers turn that flat list into the
//! disc/side addressing used by the rest of the app.

mod error;
mod model;
mod partition;

pub use error::PartitionError;
pub use model::*;
pub use partition::{DEFAULT_SIDE_BUDGET_SECS, check_budget, partition};

#[cfg(test)]
mod tests;
