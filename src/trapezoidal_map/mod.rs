//! The trapezoidal map and its search structure.

pub(crate) mod dag;

mod builder;
mod trap_map;

pub use dag::Trapezoid;
pub use trap_map::TrapMap;
