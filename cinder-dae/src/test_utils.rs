//! Reusable fixtures for exercising the integrator without a real engine.
//!
//! [`ScriptedEngine`] is a deterministic mock of the [`StiffEngine`]
//! capability: it records every applied option, advances time in fixed
//! internal micro-steps, and drives the callback bridge exactly the way a
//! real engine would, including the retry-on-recoverable contract.
//! [`ExponentialDecayProblem`] is a small linear system with an analytic
//! Jacobian, optional quadrature, sensitivity parameters, and constraints.

use std::collections::VecDeque;

use cinder_core::{Constraint, DaeProblem, EvalOutcome, VariableKind};

use crate::engine::{
    EngineCallbacks, EngineContext, EngineError, EngineResult, IcPolicy, StepMode, StepReturn,
    StepStatus, StiffEngine, WorkspaceSize,
};
use crate::integrator::{JacobianMode, LinearSolver};

/// Engine code reported when a residual evaluation fails unrecoverably.
pub const RESIDUAL_FAILURE_CODE: i32 = -8;

/// Engine code reported by the strict-fetch mode when sensitivities are
/// fetched twice without an intervening advance.
pub const REDUNDANT_SENS_FETCH_CODE: i32 = -99;

/// Record of one option application, for assertions on setter plumbing.
#[derive(Debug, Clone, PartialEq)]
pub enum Applied {
    Initialized(f64),
    ScalarTolerances { rtol: f64, atol: f64 },
    VectorTolerances { rtol: f64, atol: Vec<f64> },
    LinearSolver(LinearSolver, JacobianMode),
    VariableKinds(Vec<VariableKind>),
    Constraints(Vec<Constraint>),
    MaxOrder(usize),
    MaxSteps(usize),
    InitialStep(f64),
    StopTime(f64),
    MaxErrTestFails(usize),
    MaxNonlinIters(usize),
    MaxNonlinConvFails(usize),
    SuppressAlg(bool),
    QuadratureInit(usize),
    SensitivityInit { n_params: usize },
    SensitivityTolerances { rtol: f64, atol: Vec<f64> },
    InitialCorrection { policy: IcPolicy, target: f64 },
}

struct StepContext {
    step: f64,
}

impl EngineContext for StepContext {
    fn current_step_size(&self) -> f64 {
        self.step
    }
}

/// A deterministic mock stiff engine.
///
/// `advance` moves time forward in `internal_step` increments (one per
/// call in one-step mode), evaluating the residual through the callback
/// bridge before each accepted micro-step and retrying once at half step
/// on a recoverable flag. When quadrature is initialized, each accepted
/// micro-step also evaluates the quadrature right-hand side through the
/// bridge and accumulates it with an explicit Euler update. The state
/// update freezes the derivative over each micro-step, which is adequate
/// for contract tests.
pub struct ScriptedEngine {
    /// Internal micro-step used by `advance`.
    pub internal_step: f64,
    /// Every option application, in order.
    pub applied: Vec<Applied>,
    /// Statuses to report from upcoming advances, ahead of the defaults.
    pub scripted_statuses: VecDeque<StepStatus>,
    /// Fail the next advance with this code.
    pub fail_advance_with: Option<i32>,
    /// Fail the next initial-condition correction with this code.
    pub fail_correction_with: Option<i32>,
    /// Fail redundant sensitivity fetches with
    /// [`REDUNDANT_SENS_FETCH_CODE`].
    pub strict_sensitivity_fetch: bool,
    /// Number of advance calls.
    pub advances: usize,
    /// Number of sensitivity fetches (post-step and consistent-IC).
    pub sens_fetches: usize,
    stop_time: Option<f64>,
    time: f64,
    h_cur: f64,
    neq: usize,
    ic_y: Vec<f64>,
    ic_ydot: Vec<f64>,
    quad: Option<Vec<f64>>,
    fetched_since_advance: bool,
}

impl Default for ScriptedEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptedEngine {
    pub fn new() -> Self {
        Self {
            internal_step: 1e-6,
            applied: Vec::new(),
            scripted_statuses: VecDeque::new(),
            fail_advance_with: None,
            fail_correction_with: None,
            strict_sensitivity_fetch: false,
            advances: 0,
            sens_fetches: 0,
            stop_time: None,
            time: 0.0,
            h_cur: 0.0,
            neq: 0,
            ic_y: Vec::new(),
            ic_ydot: Vec::new(),
            quad: None,
            fetched_since_advance: false,
        }
    }

    pub fn with_internal_step(step: f64) -> Self {
        Self {
            internal_step: step,
            ..Self::new()
        }
    }

    /// The deterministic post-step sensitivity value for `(param, eq)`.
    pub fn post_step_sensitivity(&self, param: usize) -> f64 {
        (param + 1) as f64 + self.time
    }

    /// The deterministic consistent-IC sensitivity value for `param`.
    pub fn consistent_sensitivity(param: usize) -> f64 {
        0.5 * (param + 1) as f64
    }
}

impl StiffEngine for ScriptedEngine {
    fn initialize(&mut self, t0: f64, y: &[f64], ydot: &[f64]) -> EngineResult<()> {
        self.time = t0;
        self.neq = y.len();
        self.ic_y = y.to_vec();
        self.ic_ydot = ydot.to_vec();
        self.h_cur = 0.0;
        self.stop_time = None;
        self.quad = None;
        self.fetched_since_advance = false;
        self.applied.push(Applied::Initialized(t0));
        Ok(())
    }

    fn set_scalar_tolerances(&mut self, rtol: f64, atol: f64) -> EngineResult<()> {
        self.applied.push(Applied::ScalarTolerances { rtol, atol });
        Ok(())
    }

    fn set_vector_tolerances(&mut self, rtol: f64, atol: &[f64]) -> EngineResult<()> {
        self.applied.push(Applied::VectorTolerances {
            rtol,
            atol: atol.to_vec(),
        });
        Ok(())
    }

    fn install_linear_solver(
        &mut self,
        solver: &LinearSolver,
        jacobian: JacobianMode,
    ) -> EngineResult<()> {
        self.applied.push(Applied::LinearSolver(*solver, jacobian));
        Ok(())
    }

    fn set_variable_kinds(&mut self, kinds: &[VariableKind]) -> EngineResult<()> {
        self.applied.push(Applied::VariableKinds(kinds.to_vec()));
        Ok(())
    }

    fn set_constraints(&mut self, constraints: &[Constraint]) -> EngineResult<()> {
        self.applied
            .push(Applied::Constraints(constraints.to_vec()));
        Ok(())
    }

    fn set_max_order(&mut self, n: usize) -> EngineResult<()> {
        self.applied.push(Applied::MaxOrder(n));
        Ok(())
    }

    fn set_max_steps(&mut self, n: usize) -> EngineResult<()> {
        self.applied.push(Applied::MaxSteps(n));
        Ok(())
    }

    fn set_initial_step(&mut self, h0: f64) -> EngineResult<()> {
        self.applied.push(Applied::InitialStep(h0));
        Ok(())
    }

    fn set_stop_time(&mut self, tstop: f64) -> EngineResult<()> {
        self.stop_time = Some(tstop);
        self.applied.push(Applied::StopTime(tstop));
        Ok(())
    }

    fn set_max_err_test_fails(&mut self, n: usize) -> EngineResult<()> {
        self.applied.push(Applied::MaxErrTestFails(n));
        Ok(())
    }

    fn set_max_nonlin_iters(&mut self, n: usize) -> EngineResult<()> {
        self.applied.push(Applied::MaxNonlinIters(n));
        Ok(())
    }

    fn set_max_nonlin_conv_fails(&mut self, n: usize) -> EngineResult<()> {
        self.applied.push(Applied::MaxNonlinConvFails(n));
        Ok(())
    }

    fn set_suppress_alg(&mut self, suppress: bool) -> EngineResult<()> {
        self.applied.push(Applied::SuppressAlg(suppress));
        Ok(())
    }

    fn correct_initial(
        &mut self,
        callbacks: &mut dyn EngineCallbacks,
        policy: IcPolicy,
        target: f64,
    ) -> EngineResult<()> {
        if let Some(code) = self.fail_correction_with.take() {
            return Err(EngineError { code });
        }
        self.h_cur = target - self.time;
        let ctx = StepContext { step: self.h_cur };
        let mut resid = vec![0.0; self.neq];
        let flag = callbacks.residual(target, &ctx, &self.ic_y, &self.ic_ydot, &mut resid);
        if flag < 0 {
            return Err(EngineError {
                code: RESIDUAL_FAILURE_CODE,
            });
        }
        self.applied
            .push(Applied::InitialCorrection { policy, target });
        Ok(())
    }

    fn consistent_initial(&mut self, y: &mut [f64], ydot: &mut [f64]) -> EngineResult<()> {
        y.copy_from_slice(&self.ic_y);
        ydot.copy_from_slice(&self.ic_ydot);
        Ok(())
    }

    fn advance(
        &mut self,
        callbacks: &mut dyn EngineCallbacks,
        target: f64,
        mode: StepMode,
        y: &mut [f64],
        ydot: &mut [f64],
    ) -> EngineResult<StepReturn> {
        self.advances += 1;
        if let Some(code) = self.fail_advance_with.take() {
            return Err(EngineError { code });
        }

        let stop = self.stop_time.unwrap_or(f64::INFINITY);
        let goal = target.min(stop);
        let mut resid = vec![0.0; y.len()];
        let mut t = self.time;

        while t < goal {
            let mut h = self.internal_step.min(goal - t);
            self.h_cur = h;
            let ctx = StepContext { step: h };
            let mut flag = callbacks.residual(t + h, &ctx, y, ydot, &mut resid);
            if flag > 0 {
                h *= 0.5;
                self.h_cur = h;
                let ctx = StepContext { step: h };
                flag = callbacks.residual(t + h, &ctx, y, ydot, &mut resid);
            }
            if flag != 0 {
                return Err(EngineError {
                    code: RESIDUAL_FAILURE_CODE,
                });
            }
            for (yi, ydoti) in y.iter_mut().zip(ydot.iter()) {
                *yi += h * *ydoti;
            }
            t += h;

            // Explicit-Euler quadrature accumulation through the same
            // callback seam a real engine would use.
            if let Some(accum) = self.quad.as_mut() {
                let mut qdot = vec![0.0; accum.len()];
                let ctx = StepContext { step: h };
                let flag = callbacks.quadrature_rhs(t, &ctx, y, ydot, &mut qdot);
                if flag != 0 {
                    return Err(EngineError {
                        code: RESIDUAL_FAILURE_CODE,
                    });
                }
                for (qi, qdoti) in accum.iter_mut().zip(qdot.iter()) {
                    *qi += h * *qdoti;
                }
            }

            if mode == StepMode::OneStep {
                break;
            }
        }

        self.time = t;
        self.fetched_since_advance = false;
        let status = self.scripted_statuses.pop_front().unwrap_or_else(|| {
            if stop.is_finite() && t >= stop {
                StepStatus::StopTimeReached
            } else {
                StepStatus::Success
            }
        });
        Ok(StepReturn { time: t, status })
    }

    fn init_quadrature(&mut self, yq: &[f64]) -> EngineResult<()> {
        self.quad = Some(yq.to_vec());
        self.applied.push(Applied::QuadratureInit(yq.len()));
        Ok(())
    }

    fn quadrature(&mut self, yq: &mut [f64]) -> EngineResult<f64> {
        if let Some(accum) = &self.quad {
            yq.copy_from_slice(accum);
        }
        Ok(self.time)
    }

    fn init_sensitivity(&mut self, params: &[f64], scales: &[f64]) -> EngineResult<()> {
        debug_assert_eq!(params.len(), scales.len());
        self.applied.push(Applied::SensitivityInit {
            n_params: params.len(),
        });
        Ok(())
    }

    fn set_sensitivity_tolerances(&mut self, rtol: f64, atol: &[f64]) -> EngineResult<()> {
        self.applied.push(Applied::SensitivityTolerances {
            rtol,
            atol: atol.to_vec(),
        });
        Ok(())
    }

    fn sensitivities(&mut self, ys: &mut [Vec<f64>]) -> EngineResult<f64> {
        if self.strict_sensitivity_fetch && self.fetched_since_advance {
            return Err(EngineError {
                code: REDUNDANT_SENS_FETCH_CODE,
            });
        }
        for (param, column) in ys.iter_mut().enumerate() {
            let value = self.post_step_sensitivity(param);
            column.fill(value);
        }
        self.sens_fetches += 1;
        self.fetched_since_advance = true;
        Ok(self.time)
    }

    fn consistent_sensitivities(
        &mut self,
        ys: &mut [Vec<f64>],
        ysdot: &mut [Vec<f64>],
    ) -> EngineResult<()> {
        if self.strict_sensitivity_fetch && self.fetched_since_advance {
            return Err(EngineError {
                code: REDUNDANT_SENS_FETCH_CODE,
            });
        }
        for (param, column) in ys.iter_mut().enumerate() {
            column.fill(Self::consistent_sensitivity(param));
        }
        for column in ysdot.iter_mut() {
            column.fill(0.0);
        }
        self.sens_fetches += 1;
        self.fetched_since_advance = true;
        Ok(())
    }

    fn current_step_size(&self) -> f64 {
        self.h_cur
    }

    fn workspace_size(&self) -> WorkspaceSize {
        WorkspaceSize {
            real_len: 50 + 20 * self.neq,
            integer_len: 20 + self.neq,
        }
    }
}

/// A linear decay system `y_i' + k_i * y_i = 0` with `y_i(t0) = 1`.
///
/// Optional extras: a single quadrature accumulating `y_0`, forward
/// sensitivity with respect to the decay rates, and per-component
/// constraints. Residual outcomes can be scripted to exercise the
/// recoverable/unrecoverable callback contract.
pub struct ExponentialDecayProblem {
    pub rates: Vec<f64>,
    pub with_quadrature: bool,
    pub sensitivity_scales: Vec<f64>,
    pub constraints: Vec<Constraint>,
    /// Outcomes popped by successive residual calls; `Success` once empty.
    pub scripted_residuals: VecDeque<EvalOutcome>,
    /// Step size seen by the most recent residual evaluation.
    pub last_step_seen: Option<f64>,
    /// Number of residual evaluations.
    pub residual_calls: usize,
    /// Number of quadrature right-hand-side evaluations.
    pub quadrature_calls: usize,
}

impl ExponentialDecayProblem {
    pub fn new(rates: &[f64]) -> Self {
        Self {
            rates: rates.to_vec(),
            with_quadrature: false,
            sensitivity_scales: Vec::new(),
            constraints: Vec::new(),
            scripted_residuals: VecDeque::new(),
            last_step_seen: None,
            residual_calls: 0,
            quadrature_calls: 0,
        }
    }

    pub fn with_quadrature(mut self) -> Self {
        self.with_quadrature = true;
        self
    }

    /// Tracks one sensitivity parameter per scale factor, using the decay
    /// rates as parameter values.
    pub fn with_sensitivities(mut self, scales: &[f64]) -> Self {
        assert!(scales.len() <= self.rates.len());
        self.sensitivity_scales = scales.to_vec();
        self
    }

    pub fn with_constraints(mut self, constraints: &[Constraint]) -> Self {
        assert_eq!(constraints.len(), self.rates.len());
        self.constraints = constraints.to_vec();
        self
    }
}

impl DaeProblem for ExponentialDecayProblem {
    fn n_equations(&self) -> usize {
        self.rates.len()
    }

    fn initial_conditions(&mut self, _t0: f64, y: &mut [f64], ydot: &mut [f64]) {
        y.fill(1.0);
        for (ydoti, &rate) in ydot.iter_mut().zip(self.rates.iter()) {
            *ydoti = -rate;
        }
    }

    fn residual(
        &mut self,
        _t: f64,
        step_size: f64,
        y: &[f64],
        ydot: &[f64],
        resid: &mut [f64],
    ) -> EvalOutcome {
        self.residual_calls += 1;
        self.last_step_seen = Some(step_size);
        if let Some(outcome) = self.scripted_residuals.pop_front() {
            return outcome;
        }
        for (index, value) in resid.iter_mut().enumerate() {
            *value = ydot[index] + self.rates[index] * y[index];
        }
        EvalOutcome::Success
    }

    fn quadrature_rhs(
        &mut self,
        _t: f64,
        y: &[f64],
        _ydot: &[f64],
        qdot: &mut [f64],
    ) -> EvalOutcome {
        self.quadrature_calls += 1;
        qdot[0] = y[0];
        EvalOutcome::Success
    }

    fn jacobian(
        &mut self,
        _t: f64,
        _step_size: f64,
        c_j: f64,
        _y: &[f64],
        _ydot: &[f64],
        jac: &mut cinder_core::JacobianMatrix<'_>,
    ) {
        for (index, &rate) in self.rates.iter().enumerate() {
            jac.set(index, index, rate + c_j);
        }
    }

    fn n_quadratures(&self) -> usize {
        usize::from(self.with_quadrature)
    }

    fn n_sensitivity_params(&self) -> usize {
        self.sensitivity_scales.len()
    }

    fn sensitivity_params(&self) -> Vec<f64> {
        self.rates[..self.sensitivity_scales.len()].to_vec()
    }

    fn param_scales(&self) -> Vec<f64> {
        self.sensitivity_scales.clone()
    }

    fn n_constraints(&self) -> usize {
        self.constraints.iter().filter(|c| c.is_active()).count()
    }

    fn constraint(&self, index: usize) -> Constraint {
        self.constraints.get(index).copied().unwrap_or_default()
    }
}
