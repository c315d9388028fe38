//! Mathematical utilities: small dense linear solves for the normal equations.

pub mod linsys;

pub use linsys::*;
