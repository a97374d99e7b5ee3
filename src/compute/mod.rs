//! Pure computations behind the HTTP surface.

mod error;
mod math;
mod split;

pub use error::ComputeError;
pub use math::{add, divide, multiply, subtract};
pub use split::{split_by_items, split_custom, split_equally, split_with_tip};
