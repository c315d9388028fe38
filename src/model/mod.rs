//! The logistic surge model and its closed-form derivatives.

pub mod logistic;

pub use logistic::*;
