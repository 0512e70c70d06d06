//! Slide layout arithmetic.
//!
//! No real text shaping happens here. Heights come from a deterministic
//! character-count heuristic and lists are split across slides with a fixed
//! per-item height estimate.

pub mod estimate;
pub mod paginate;

pub use estimate::Estimator;
pub use paginate::PaginationPlan;
