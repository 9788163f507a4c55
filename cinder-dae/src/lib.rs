//! Stiff DAE integration for the Cinder framework.
//!
//! This crate adapts an opaque stiff DAE solving engine around a
//! [`DaeProblem`](cinder_core::DaeProblem): it owns the solver
//! configuration and every parallel vector family (state, derivative,
//! per-parameter sensitivities, quadratures), exposes residual, Jacobian,
//! and quadrature evaluation to the engine through a fixed callback
//! bridge, corrects inconsistent initial conditions, and drives time
//! advancement in single-step or advance-to-target mode.
//!
//! - [`DaeIntegrator`] — the integration adapter
//! - [`engine`] — the engine capability trait and its status types
//! - [`test_utils`] — a scripted mock engine and small reference problems

pub mod engine;
pub mod integrator;
pub mod test_utils;

pub use engine::{
    EngineCallbacks, EngineContext, EngineError, IcPolicy, StepMode, StepReturn, StepStatus,
    StiffEngine, WorkspaceMetric, WorkspaceSize,
};
pub use integrator::{
    DaeIntegrator, Error, JacobianMode, LinearSolver, Options, SensitivityTolerances, SolveStatus,
    Tolerances,
};
