//! Core traits and types for the Cinder DAE integration framework.
//!
//! This crate defines the shared abstractions that integration adapters and
//! physical models build on:
//!
//! - [`DaeProblem`] — a differential-algebraic system exposing residual,
//!   Jacobian, and quadrature evaluation
//! - [`EvalOutcome`] — the three-valued result of a model evaluation
//! - [`Constraint`] — per-component inequality tags on the unknowns
//! - [`VariableKind`] — differential vs. purely algebraic classification
//! - [`JacobianMatrix`] — a column-major view over solver-owned storage

mod constraint;
mod jacobian;
mod outcome;
mod problem;

pub use constraint::{Constraint, InvalidConstraintFlag};
pub use jacobian::JacobianMatrix;
pub use outcome::EvalOutcome;
pub use problem::{DaeProblem, VariableKind};
