//! The stiff DAE solving engine capability consumed by the integrator.
//!
//! The engine is opaque: it owns its internal Newton corrector, step-size
//! and order control, and error-test machinery. The integrator interacts
//! with it only through this trait, handing it a set of callbacks (the
//! [`EngineCallbacks`] bridge) that the engine invokes re-entrantly while
//! advancing. Those re-entrant calls happen on the caller's thread,
//! strictly nested inside [`advance`](StiffEngine::advance) or
//! [`correct_initial`](StiffEngine::correct_initial), never concurrently.
//!
//! Status convention: methods return `Ok` for success and the small set of
//! named non-fatal conditions in [`StepStatus`]; unrecoverable failures are
//! [`EngineError`] values carrying the engine's negative numeric code.

use cinder_core::{Constraint, JacobianMatrix, VariableKind};
use thiserror::Error;

use crate::integrator::{JacobianMode, LinearSolver};

/// Numeric failure code reported by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("engine failure (code {code})")]
pub struct EngineError {
    pub code: i32,
}

/// Result alias for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

/// How far one call to [`StiffEngine::advance`] should go.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepMode {
    /// Take exactly one internal step toward the target.
    OneStep,
    /// Advance to the target, taking as many internal steps as needed.
    Normal,
}

/// Non-fatal condition reported by a successful advance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepStatus {
    /// Normal advancement.
    Success,
    /// The configured stop time cut the advance short.
    StopTimeReached,
    /// A registered root function changed sign.
    RootFound,
    /// The engine reported a recoverable warning.
    Warning,
}

/// The time reached and condition reported by one advance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepReturn {
    pub time: f64,
    pub status: StepStatus,
}

/// Policy for consistent-initial-condition correction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IcPolicy {
    /// Correct the differential components of the state, holding the
    /// derivative fixed.
    StateGivenDerivative,
    /// Correct the algebraic components of the state and the full
    /// derivative, holding the differential state components fixed.
    AlgebraicGivenDifferential,
}

/// Engine workspace allocation, reported for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WorkspaceSize {
    pub real_len: usize,
    pub integer_len: usize,
}

/// Selects which workspace figure to report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkspaceMetric {
    Real,
    Integer,
}

/// Read-only view of engine internals available during a callback.
pub trait EngineContext {
    /// The engine's current internal step size.
    fn current_step_size(&self) -> f64;
}

/// The fixed callback shape an engine invokes re-entrantly while stepping
/// or correcting initial conditions.
///
/// Return contract, fixed by the engine: `0` means success, a positive
/// value asks the engine to retry with a reduced step, and a negative
/// value aborts the integration.
pub trait EngineCallbacks {
    /// Evaluates the residual at `(t, y, ydot)` into `resid`.
    fn residual(
        &mut self,
        t: f64,
        ctx: &dyn EngineContext,
        y: &[f64],
        ydot: &[f64],
        resid: &mut [f64],
    ) -> i32;

    /// Evaluates the quadrature integrands at `(t, y, ydot)` into `qdot`.
    fn quadrature_rhs(
        &mut self,
        t: f64,
        ctx: &dyn EngineContext,
        y: &[f64],
        ydot: &[f64],
        qdot: &mut [f64],
    ) -> i32;

    /// Writes the analytic Jacobian into engine-native storage.
    ///
    /// Only invoked when an analytic Jacobian was registered.
    fn jacobian(
        &mut self,
        t: f64,
        ctx: &dyn EngineContext,
        c_j: f64,
        y: &[f64],
        ydot: &[f64],
        jac: &mut JacobianMatrix<'_>,
    ) -> i32;
}

/// A stiff DAE solving engine.
///
/// Implementations own an opaque solver instance. `initialize` (re)creates
/// that instance; any prior instance is discarded, and final release
/// happens exactly once via the implementor's `Drop`.
pub trait StiffEngine {
    /// (Re)creates the engine instance for a system of `y.len()` unknowns
    /// starting from `(t0, y, ydot)`.
    fn initialize(&mut self, t0: f64, y: &[f64], ydot: &[f64]) -> EngineResult<()>;

    /// Applies one relative and one absolute tolerance uniformly.
    fn set_scalar_tolerances(&mut self, rtol: f64, atol: f64) -> EngineResult<()>;

    /// Applies one relative tolerance and per-component absolute tolerances.
    fn set_vector_tolerances(&mut self, rtol: f64, atol: &[f64]) -> EngineResult<()>;

    /// Registers the linear solver and Jacobian-supply mode.
    fn install_linear_solver(
        &mut self,
        solver: &LinearSolver,
        jacobian: JacobianMode,
    ) -> EngineResult<()>;

    /// Declares each unknown differential or algebraic.
    fn set_variable_kinds(&mut self, kinds: &[VariableKind]) -> EngineResult<()>;

    /// Applies per-component inequality constraints.
    fn set_constraints(&mut self, constraints: &[Constraint]) -> EngineResult<()>;

    fn set_max_order(&mut self, n: usize) -> EngineResult<()>;
    fn set_max_steps(&mut self, n: usize) -> EngineResult<()>;
    fn set_initial_step(&mut self, h0: f64) -> EngineResult<()>;
    fn set_stop_time(&mut self, tstop: f64) -> EngineResult<()>;
    fn set_max_err_test_fails(&mut self, n: usize) -> EngineResult<()>;
    fn set_max_nonlin_iters(&mut self, n: usize) -> EngineResult<()>;
    fn set_max_nonlin_conv_fails(&mut self, n: usize) -> EngineResult<()>;

    /// Excludes algebraic components from the local error test when `true`.
    fn set_suppress_alg(&mut self, suppress: bool) -> EngineResult<()>;

    /// Corrects the tentative initial pair under the given policy,
    /// evaluating toward `target`.
    fn correct_initial(
        &mut self,
        callbacks: &mut dyn EngineCallbacks,
        policy: IcPolicy,
        target: f64,
    ) -> EngineResult<()>;

    /// Reads back the consistent pair produced by the last correction.
    fn consistent_initial(&mut self, y: &mut [f64], ydot: &mut [f64]) -> EngineResult<()>;

    /// Advances toward `target`, writing the reached state into `y`/`ydot`.
    fn advance(
        &mut self,
        callbacks: &mut dyn EngineCallbacks,
        target: f64,
        mode: StepMode,
        y: &mut [f64],
        ydot: &mut [f64],
    ) -> EngineResult<StepReturn>;

    /// Registers quadrature accumulation starting from `yq`.
    fn init_quadrature(&mut self, yq: &[f64]) -> EngineResult<()>;

    /// Fetches the current quadrature values; returns the time they
    /// correspond to.
    fn quadrature(&mut self, yq: &mut [f64]) -> EngineResult<f64>;

    /// Registers forward sensitivity analysis (staggered corrector) for
    /// the given parameters and scale factors.
    fn init_sensitivity(&mut self, params: &[f64], scales: &[f64]) -> EngineResult<()>;

    /// Applies sensitivity tolerances: one relative, one absolute per
    /// parameter.
    fn set_sensitivity_tolerances(&mut self, rtol: f64, atol: &[f64]) -> EngineResult<()>;

    /// Fetches the post-step sensitivity states; returns the time they
    /// correspond to.
    fn sensitivities(&mut self, ys: &mut [Vec<f64>]) -> EngineResult<f64>;

    /// Fetches the sensitivity states consistent with the corrected
    /// initial condition.
    fn consistent_sensitivities(
        &mut self,
        ys: &mut [Vec<f64>],
        ysdot: &mut [Vec<f64>],
    ) -> EngineResult<()>;

    /// The engine's current internal step size.
    fn current_step_size(&self) -> f64;

    /// The engine's workspace allocation.
    fn workspace_size(&self) -> WorkspaceSize;
}
