//! Game implementations.

pub mod equation;
