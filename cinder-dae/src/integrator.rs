//! The DAE integration adapter.
//!
//! [`DaeIntegrator`] wraps an opaque stiff solving engine around a
//! [`DaeProblem`], owning every parallel vector family (state, derivative,
//! sensitivity, quadrature), the solver configuration, and the time
//! bookkeeping. It translates the engine's numeric status codes into the
//! typed [`Error`] model and keeps all families consistent across
//! re-initialization.
//!
//! The integrator is synchronous and not safe for concurrent use: the
//! engine's re-entrant callback invocations happen on the calling thread,
//! strictly nested inside `step`/`solve`. Independent integrator instances
//! may run on separate threads.

mod bridge;
mod config;
mod error;
mod status;
mod vectors;

pub use config::{JacobianMode, LinearSolver, Options, SensitivityTolerances, Tolerances};
pub use error::Error;
pub use status::SolveStatus;

use cinder_core::{Constraint, DaeProblem};
use log::warn;

use crate::engine::{IcPolicy, StepMode, StepStatus, StiffEngine, WorkspaceMetric};

use bridge::Bridge;
use vectors::VectorFamilies;

/// Fallback step used to pick a consistency-correction target time when no
/// initial step size is configured.
const DEFAULT_IC_STEP: f64 = 1e-5;

/// Adapter driving a stiff DAE engine over a [`DaeProblem`].
///
/// Setters called before [`init`](Self::init) record values that are
/// applied in batch during initialization; most setters called afterwards
/// additionally push the new value into the live engine immediately. The
/// linear-solver and Jacobian-supply configuration is the exception: it
/// takes effect on the next `init`.
pub struct DaeIntegrator<P, E> {
    problem: P,
    engine: E,
    vectors: VectorFamilies,
    tolerances: Tolerances,
    sens_tolerances: SensitivityTolerances,
    linear_solver: LinearSolver,
    jacobian_mode: JacobianMode,
    options: Options,
    constraints: Option<Vec<Constraint>>,
    neq: usize,
    n_sens: usize,
    n_quad: usize,
    t0: f64,
    told_old: f64,
    told: f64,
    tcurrent: f64,
    last_step: f64,
    initialized: bool,
    at_initial_condition: bool,
    sens_current: bool,
}

impl<P: DaeProblem, E: StiffEngine> DaeIntegrator<P, E> {
    /// Creates an adapter over a problem and an engine, with default
    /// configuration. No vectors are allocated until [`init`](Self::init).
    pub fn new(problem: P, engine: E) -> Self {
        Self {
            problem,
            engine,
            vectors: VectorFamilies::default(),
            tolerances: Tolerances::default(),
            sens_tolerances: SensitivityTolerances::default(),
            linear_solver: LinearSolver::default(),
            jacobian_mode: JacobianMode::default(),
            options: Options::default(),
            constraints: None,
            neq: 0,
            n_sens: 0,
            n_quad: 0,
            t0: 0.0,
            told_old: 0.0,
            told: 0.0,
            tcurrent: 0.0,
            last_step: 0.0,
            initialized: false,
            at_initial_condition: false,
            sens_current: false,
        }
    }

    // --- Configuration & tolerances ---

    /// Applies one scalar relative and one scalar absolute tolerance
    /// uniformly, replacing any per-component configuration.
    ///
    /// # Errors
    ///
    /// Returns a configuration error for non-positive tolerances, or an
    /// engine error if a live engine rejects the values.
    pub fn set_tolerances(&mut self, rtol: f64, atol: f64) -> Result<(), Error> {
        let tolerances = Tolerances::Scalar { rtol, atol };
        tolerances
            .validate()
            .map_err(|reason| Error::config("tolerances", reason))?;
        self.tolerances = tolerances;
        if self.initialized {
            self.engine
                .set_scalar_tolerances(rtol, atol)
                .map_err(|e| Error::engine("scalar tolerances", e))?;
        }
        Ok(())
    }

    /// Applies one scalar relative tolerance and a per-component absolute
    /// tolerance vector, replacing any scalar configuration.
    ///
    /// # Errors
    ///
    /// Returns a configuration error for non-positive tolerances or a
    /// wrong-length vector, or an engine error if a live engine rejects
    /// the values.
    pub fn set_component_tolerances(&mut self, rtol: f64, atol: &[f64]) -> Result<(), Error> {
        if atol.len() != self.problem.n_equations() {
            return Err(Error::config(
                "tolerances",
                format!(
                    "absolute tolerance vector has length {}, expected {}",
                    atol.len(),
                    self.problem.n_equations()
                ),
            ));
        }
        let tolerances = Tolerances::PerComponent {
            rtol,
            atol: atol.to_vec(),
        };
        tolerances
            .validate()
            .map_err(|reason| Error::config("tolerances", reason))?;
        self.tolerances = tolerances;
        if self.initialized {
            self.engine
                .set_vector_tolerances(rtol, atol)
                .map_err(|e| Error::engine("vector tolerances", e))?;
        }
        Ok(())
    }

    /// Sets the tolerances used when sensitivity analysis is initialized.
    ///
    /// # Errors
    ///
    /// Returns a configuration error for non-positive tolerances.
    pub fn set_sensitivity_tolerances(&mut self, rtol: f64, atol: f64) -> Result<(), Error> {
        let tolerances = SensitivityTolerances { rtol, atol };
        tolerances
            .validate()
            .map_err(|reason| Error::config("sensitivity tolerances", reason))?;
        self.sens_tolerances = tolerances;
        Ok(())
    }

    /// Selects the dense direct linear solver. Takes effect on the next
    /// [`init`](Self::init).
    pub fn set_dense_linear_solver(&mut self) {
        self.linear_solver = LinearSolver::Dense;
    }

    /// Selects the banded direct linear solver with explicit bandwidths.
    /// Takes effect on the next [`init`](Self::init).
    ///
    /// # Errors
    ///
    /// Returns a configuration error if either bandwidth is not smaller
    /// than the system size.
    pub fn set_banded_linear_solver(&mut self, upper: usize, lower: usize) -> Result<(), Error> {
        let n = self.problem.n_equations();
        if upper >= n || lower >= n {
            return Err(Error::config(
                "banded bandwidths",
                format!("bandwidths ({upper}, {lower}) must be smaller than the system size {n}"),
            ));
        }
        self.linear_solver = LinearSolver::Banded { upper, lower };
        Ok(())
    }

    /// Selects how the engine obtains Jacobian entries. Takes effect on
    /// the next [`init`](Self::init).
    pub fn set_jacobian_mode(&mut self, mode: JacobianMode) {
        self.jacobian_mode = mode;
    }

    /// Caps the integration order.
    ///
    /// # Errors
    ///
    /// Returns an engine error if a live engine rejects the value.
    pub fn set_max_order(&mut self, n: usize) -> Result<(), Error> {
        self.options.max_order = Some(n);
        self.push_option(|engine| engine.set_max_order(n), "max order")
    }

    /// Caps the number of internal steps per `solve` target.
    ///
    /// # Errors
    ///
    /// Returns an engine error if a live engine rejects the value.
    pub fn set_max_num_steps(&mut self, n: usize) -> Result<(), Error> {
        self.options.max_steps = Some(n);
        self.push_option(|engine| engine.set_max_steps(n), "max steps")
    }

    /// Suggests the first internal step size.
    ///
    /// # Errors
    ///
    /// Returns a configuration error unless the step is finite and
    /// positive, or an engine error if a live engine rejects it.
    pub fn set_initial_step_size(&mut self, h0: f64) -> Result<(), Error> {
        if !h0.is_finite() || h0 <= 0.0 {
            return Err(Error::config(
                "initial step size",
                "must be finite and positive",
            ));
        }
        self.options.initial_step = Some(h0);
        self.push_option(|engine| engine.set_initial_step(h0), "initial step size")
    }

    /// Sets a hard stop time the engine will not integrate past.
    ///
    /// # Errors
    ///
    /// Returns a configuration error for a non-finite value, or an engine
    /// error if a live engine rejects it.
    pub fn set_stop_time(&mut self, tstop: f64) -> Result<(), Error> {
        if !tstop.is_finite() {
            return Err(Error::config("stop time", "must be finite"));
        }
        self.options.stop_time = Some(tstop);
        self.push_option(|engine| engine.set_stop_time(tstop), "stop time")
    }

    /// Caps error-test failures per step attempt.
    ///
    /// # Errors
    ///
    /// Returns an engine error if a live engine rejects the value.
    pub fn set_max_err_test_failures(&mut self, n: usize) -> Result<(), Error> {
        self.options.max_err_test_fails = Some(n);
        self.push_option(
            |engine| engine.set_max_err_test_fails(n),
            "max error test failures",
        )
    }

    /// Caps nonlinear corrector iterations per step attempt.
    ///
    /// # Errors
    ///
    /// Returns an engine error if a live engine rejects the value.
    pub fn set_max_nonlin_iterations(&mut self, n: usize) -> Result<(), Error> {
        self.options.max_nonlin_iters = Some(n);
        self.push_option(
            |engine| engine.set_max_nonlin_iters(n),
            "max nonlinear iterations",
        )
    }

    /// Caps nonlinear convergence failures per step attempt.
    ///
    /// # Errors
    ///
    /// Returns an engine error if a live engine rejects the value.
    pub fn set_max_nonlin_conv_failures(&mut self, n: usize) -> Result<(), Error> {
        self.options.max_nonlin_conv_fails = Some(n);
        self.push_option(
            |engine| engine.set_max_nonlin_conv_fails(n),
            "max nonlinear convergence failures",
        )
    }

    /// Includes or excludes algebraic components from the local error
    /// test.
    ///
    /// # Errors
    ///
    /// Returns an engine error if a live engine rejects the setting.
    pub fn include_algebraic_in_error_test(&mut self, include: bool) -> Result<(), Error> {
        self.options.include_algebraic_in_error_test = include;
        self.push_option(
            |engine| engine.set_suppress_alg(!include),
            "algebraic error test suppression",
        )
    }

    /// Sets the constraint tag for one component.
    ///
    /// # Errors
    ///
    /// Returns an out-of-range error for a bad index, or an engine error
    /// if a live engine rejects the constraint vector.
    pub fn set_constraint(&mut self, index: usize, constraint: Constraint) -> Result<(), Error> {
        let n = self.problem.n_equations();
        if index >= n {
            return Err(Error::IndexOutOfRange {
                what: "constraint component",
                index,
                limit: n,
            });
        }
        let recorded = self
            .constraints
            .get_or_insert_with(|| vec![Constraint::Unconstrained; n]);
        if recorded.len() != n {
            recorded.resize(n, Constraint::Unconstrained);
        }
        recorded[index] = constraint;
        self.push_constraints()
    }

    /// Replaces the whole constraint vector.
    ///
    /// # Errors
    ///
    /// Returns a configuration error for a wrong-length vector, or an
    /// engine error if a live engine rejects it.
    pub fn set_constraints(&mut self, constraints: &[Constraint]) -> Result<(), Error> {
        let n = self.problem.n_equations();
        if constraints.len() != n {
            return Err(Error::config(
                "constraints",
                format!(
                    "constraint vector has length {}, expected {}",
                    constraints.len(),
                    n
                ),
            ));
        }
        self.constraints = Some(constraints.to_vec());
        self.push_constraints()
    }

    /// Replaces the whole constraint vector from raw engine flags.
    ///
    /// Every flag is validated before any is applied; an invalid flag
    /// leaves both the recorded configuration and the engine untouched.
    ///
    /// # Errors
    ///
    /// Returns a configuration error naming the first invalid flag.
    pub fn set_constraint_flags(&mut self, flags: &[i32]) -> Result<(), Error> {
        let parsed = flags
            .iter()
            .enumerate()
            .map(|(i, &flag)| {
                Constraint::from_flag(flag).map_err(|e| {
                    Error::config("constraints", format!("{e} at component {i}"))
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        self.set_constraints(&parsed)
    }

    // --- Initialization ---

    /// (Re)initializes the integration at `t0`.
    ///
    /// All vector families are destroyed and recreated at the problem's
    /// current sizes, zeroed, and filled from the problem's initial
    /// conditions; the engine instance is recreated and every recorded
    /// configuration value is applied to it in batch. Constraints recorded
    /// before `init` are re-applied automatically; absent those, the
    /// problem's own constraint tags are used.
    ///
    /// # Errors
    ///
    /// Returns a configuration error for recorded values that no longer
    /// match the problem sizes, or an engine error naming the setup call
    /// the engine rejected.
    pub fn init(&mut self, t0: f64) -> Result<(), Error> {
        self.neq = self.problem.n_equations();
        self.n_sens = self.problem.n_sensitivity_params();
        self.n_quad = self.problem.n_quadratures();
        self.t0 = t0;
        self.told_old = t0;
        self.told = t0;
        self.tcurrent = t0;
        self.last_step = 0.0;
        self.initialized = false;

        self.vectors.allocate(self.neq, self.n_sens, self.n_quad);
        self.problem
            .initial_conditions(t0, &mut self.vectors.y, &mut self.vectors.ydot);
        for (index, kind) in self.vectors.kinds.iter_mut().enumerate() {
            *kind = self.problem.variable_kind(index);
        }

        self.engine
            .initialize(t0, &self.vectors.y, &self.vectors.ydot)
            .map_err(|e| Error::engine("initialization", e))?;

        self.apply_tolerances()?;
        self.engine
            .install_linear_solver(&self.linear_solver, self.jacobian_mode)
            .map_err(|e| Error::engine("linear solver installation", e))?;
        self.engine
            .set_variable_kinds(&self.vectors.kinds)
            .map_err(|e| Error::engine("variable kinds", e))?;

        if self.n_sens > 0 {
            self.init_sensitivity()?;
        }

        self.apply_options()?;
        self.apply_initial_constraints()?;

        if self.n_quad > 0 {
            self.engine
                .init_quadrature(&self.vectors.yq)
                .map_err(|e| Error::engine("quadrature initialization", e))?;
        }

        self.initialized = true;
        self.at_initial_condition = true;
        self.sens_current = false;
        Ok(())
    }

    fn apply_tolerances(&mut self) -> Result<(), Error> {
        match &self.tolerances {
            Tolerances::Scalar { rtol, atol } => self
                .engine
                .set_scalar_tolerances(*rtol, *atol)
                .map_err(|e| Error::engine("scalar tolerances", e)),
            Tolerances::PerComponent { rtol, atol } => {
                if atol.len() != self.neq {
                    return Err(Error::config(
                        "tolerances",
                        format!(
                            "absolute tolerance vector has length {}, expected {}",
                            atol.len(),
                            self.neq
                        ),
                    ));
                }
                self.engine
                    .set_vector_tolerances(*rtol, atol)
                    .map_err(|e| Error::engine("vector tolerances", e))
            }
        }
    }

    fn init_sensitivity(&mut self) -> Result<(), Error> {
        self.sens_current = false;
        let params = self.problem.sensitivity_params();
        let scales = self.problem.param_scales();
        if params.len() != self.n_sens || scales.len() != self.n_sens {
            return Err(Error::config(
                "sensitivity parameters",
                format!(
                    "problem reports {} parameters but supplies {} values and {} scales",
                    self.n_sens,
                    params.len(),
                    scales.len()
                ),
            ));
        }
        if scales.iter().any(|s| !s.is_finite() || *s == 0.0) {
            return Err(Error::config(
                "sensitivity parameters",
                "parameter scale factors must be finite and non-zero",
            ));
        }
        self.engine
            .init_sensitivity(&params, &scales)
            .map_err(|e| Error::engine("sensitivity initialization", e))?;

        // Scaled so that parameters with very different physical
        // magnitudes can share one absolute tolerance.
        let atol: Vec<f64> = scales
            .iter()
            .map(|scale| self.sens_tolerances.atol / scale)
            .collect();
        self.engine
            .set_sensitivity_tolerances(self.sens_tolerances.rtol, &atol)
            .map_err(|e| Error::engine("sensitivity tolerances", e))
    }

    fn apply_options(&mut self) -> Result<(), Error> {
        if let Some(n) = self.options.max_order {
            self.engine
                .set_max_order(n)
                .map_err(|e| Error::engine("max order", e))?;
        }
        if let Some(n) = self.options.max_steps {
            self.engine
                .set_max_steps(n)
                .map_err(|e| Error::engine("max steps", e))?;
        }
        if let Some(h0) = self.options.initial_step {
            self.engine
                .set_initial_step(h0)
                .map_err(|e| Error::engine("initial step size", e))?;
        }
        if let Some(tstop) = self.options.stop_time {
            self.engine
                .set_stop_time(tstop)
                .map_err(|e| Error::engine("stop time", e))?;
        }
        if let Some(n) = self.options.max_err_test_fails {
            self.engine
                .set_max_err_test_fails(n)
                .map_err(|e| Error::engine("max error test failures", e))?;
        }
        if let Some(n) = self.options.max_nonlin_iters {
            self.engine
                .set_max_nonlin_iters(n)
                .map_err(|e| Error::engine("max nonlinear iterations", e))?;
        }
        if let Some(n) = self.options.max_nonlin_conv_fails {
            self.engine
                .set_max_nonlin_conv_fails(n)
                .map_err(|e| Error::engine("max nonlinear convergence failures", e))?;
        }
        if !self.options.include_algebraic_in_error_test {
            self.engine
                .set_suppress_alg(true)
                .map_err(|e| Error::engine("algebraic error test suppression", e))?;
        }
        Ok(())
    }

    fn apply_initial_constraints(&mut self) -> Result<(), Error> {
        if let Some(recorded) = &self.constraints {
            if recorded.len() != self.neq {
                return Err(Error::config(
                    "constraints",
                    format!(
                        "constraint vector has length {}, expected {}",
                        recorded.len(),
                        self.neq
                    ),
                ));
            }
            self.vectors.constraints.copy_from_slice(recorded);
        } else if self.problem.n_constraints() > 0 {
            for (index, tag) in self.vectors.constraints.iter_mut().enumerate() {
                *tag = self.problem.constraint(index);
            }
        }
        if self.vectors.constraints.iter().any(|c| c.is_active()) {
            self.engine
                .set_constraints(&self.vectors.constraints)
                .map_err(|e| Error::engine("constraints", e))?;
        }
        Ok(())
    }

    fn push_constraints(&mut self) -> Result<(), Error> {
        if !self.initialized {
            return Ok(());
        }
        let Some(recorded) = &self.constraints else {
            return Ok(());
        };
        self.vectors.constraints.copy_from_slice(recorded);
        self.engine
            .set_constraints(&self.vectors.constraints)
            .map_err(|e| Error::engine("constraints", e))
    }

    fn push_option(
        &mut self,
        apply: impl FnOnce(&mut E) -> crate::engine::EngineResult<()>,
        operation: &'static str,
    ) -> Result<(), Error> {
        if self.initialized {
            apply(&mut self.engine).map_err(|e| Error::engine(operation, e))?;
        }
        Ok(())
    }

    // --- Consistent initial conditions ---

    /// Corrects the differential components of the state to satisfy the
    /// residual, holding the derivative fixed. The correction is evaluated
    /// toward `target`, defaulting to the start time plus the configured
    /// (or a fallback) initial step.
    ///
    /// # Errors
    ///
    /// Fails fatally if the engine cannot produce a consistent pair,
    /// surfacing the engine's numeric code.
    pub fn correct_initial_given_derivative(
        &mut self,
        target: Option<f64>,
    ) -> Result<(&[f64], &[f64]), Error> {
        self.correct_initial(IcPolicy::StateGivenDerivative, target)
    }

    /// Corrects the algebraic components of the state and the full
    /// derivative, holding the differential state components fixed. Uses
    /// the same target-time default rule as
    /// [`correct_initial_given_derivative`](Self::correct_initial_given_derivative).
    ///
    /// # Errors
    ///
    /// Fails fatally if the engine cannot produce a consistent pair,
    /// surfacing the engine's numeric code.
    pub fn correct_initial_algebraic_given_differential(
        &mut self,
        target: Option<f64>,
    ) -> Result<(&[f64], &[f64]), Error> {
        self.correct_initial(IcPolicy::AlgebraicGivenDifferential, target)
    }

    fn correct_initial(
        &mut self,
        policy: IcPolicy,
        target: Option<f64>,
    ) -> Result<(&[f64], &[f64]), Error> {
        self.require_init("consistency correction")?;
        let target = target.unwrap_or_else(|| {
            let h0 = self
                .options
                .initial_step
                .filter(|h| *h > 0.0)
                .unwrap_or(DEFAULT_IC_STEP);
            self.t0 + h0
        });

        let mut bridge = Bridge {
            problem: &mut self.problem,
        };
        self.engine
            .correct_initial(&mut bridge, policy, target)
            .map_err(|e| Error::InconsistentInitialConditions {
                policy,
                code: e.code,
            })?;
        self.engine
            .consistent_initial(&mut self.vectors.y, &mut self.vectors.ydot)
            .map_err(|e| Error::engine("consistent initial condition fetch", e))?;
        Ok((&self.vectors.y, &self.vectors.ydot))
    }

    // --- Stepping ---

    /// Advances exactly one internal engine step toward `target` and
    /// returns the time reached.
    ///
    /// # Errors
    ///
    /// Returns a precondition violation unless `target` is strictly ahead
    /// of the current time, and a step failure for a fatal engine code.
    pub fn step(&mut self, target: f64) -> Result<f64, Error> {
        self.require_init("step")?;
        if target <= self.tcurrent {
            return Err(Error::TargetNotAhead {
                target,
                current: self.tcurrent,
            });
        }
        self.told_old = self.told;
        self.told = self.tcurrent;

        let current = self.tcurrent;
        let mut bridge = Bridge {
            problem: &mut self.problem,
        };
        let ret = self
            .engine
            .advance(
                &mut bridge,
                target,
                StepMode::OneStep,
                &mut self.vectors.y,
                &mut self.vectors.ydot,
            )
            .map_err(|e| Error::StepFailed {
                time: current,
                code: e.code,
            })?;

        if ret.status == StepStatus::Warning {
            warn!("engine warning during step at t = {}", ret.time);
        }
        self.tcurrent = ret.time;
        self.last_step = self.tcurrent - self.told;
        self.mark_advanced();
        Ok(ret.time)
    }

    /// Advances in normal mode until the reached time meets `target`.
    ///
    /// The engine's stop time is set to `target` first, so a stop-time
    /// return is a successful exit. Warnings are logged and advancement
    /// continues; root-found outcomes are accepted and advancement
    /// continues. Calling with a target at or behind the current time is a
    /// clean no-op.
    ///
    /// # Errors
    ///
    /// Returns a step failure for a fatal engine code, leaving the state
    /// at the last successfully reached point.
    pub fn solve(&mut self, target: f64) -> Result<SolveStatus, Error> {
        self.require_init("solve")?;
        if target <= self.tcurrent {
            return Ok(SolveStatus::AlreadyReached);
        }
        self.engine
            .set_stop_time(target)
            .map_err(|e| Error::engine("stop time", e))?;

        let mut status = SolveStatus::Complete;
        while self.tcurrent < target {
            self.told_old = self.told;
            self.told = self.tcurrent;

            let current = self.tcurrent;
            let mut bridge = Bridge {
                problem: &mut self.problem,
            };
            let ret = self
                .engine
                .advance(
                    &mut bridge,
                    target,
                    StepMode::Normal,
                    &mut self.vectors.y,
                    &mut self.vectors.ydot,
                )
                .map_err(|e| Error::StepFailed {
                    time: current,
                    code: e.code,
                })?;

            self.tcurrent = ret.time;
            self.last_step = self.tcurrent - self.told;

            match ret.status {
                StepStatus::StopTimeReached => {
                    status = SolveStatus::ReachedStopTime;
                    break;
                }
                StepStatus::Warning => {
                    warn!("engine warning during solve at t = {}", ret.time);
                }
                StepStatus::RootFound | StepStatus::Success => {}
            }
        }
        self.mark_advanced();
        Ok(status)
    }

    fn mark_advanced(&mut self) {
        self.sens_current = false;
        self.at_initial_condition = false;
    }

    // --- Accessors ---

    /// One component of the current solution.
    ///
    /// # Errors
    ///
    /// Returns an out-of-range error for a bad index.
    pub fn solution(&self, index: usize) -> Result<f64, Error> {
        self.check_index("solution", index, self.neq)?;
        Ok(self.vectors.y[index])
    }

    /// The current solution vector.
    pub fn solution_vector(&self) -> &[f64] {
        &self.vectors.y
    }

    /// One component of the current derivative.
    ///
    /// # Errors
    ///
    /// Returns an out-of-range error for a bad index.
    pub fn derivative(&self, index: usize) -> Result<f64, Error> {
        self.check_index("derivative", index, self.neq)?;
        Ok(self.vectors.ydot[index])
    }

    /// The current derivative vector.
    pub fn derivative_vector(&self) -> &[f64] {
        &self.vectors.ydot
    }

    /// The accumulated quadrature values, fetched fresh from the engine.
    /// `None` when the problem has no quadrature equations.
    ///
    /// # Errors
    ///
    /// Returns an engine error if the fetch fails.
    pub fn quadrature_vector(&mut self) -> Result<Option<&[f64]>, Error> {
        if self.n_quad == 0 {
            return Ok(None);
        }
        self.engine
            .quadrature(&mut self.vectors.yq)
            .map_err(|e| Error::engine("quadrature fetch", e))?;
        Ok(Some(&self.vectors.yq))
    }

    /// The sensitivity of solution component `equation` with respect to
    /// parameter `param`.
    ///
    /// Values are fetched lazily: the first call after `init` or after a
    /// state-advancing operation pulls fresh values from the engine (the
    /// consistent-initial-condition variant while still at the start
    /// point), then caches them until the next advance.
    ///
    /// # Errors
    ///
    /// Returns an out-of-range error naming the offending index, or an
    /// engine error if the fetch fails.
    pub fn sensitivity(&mut self, equation: usize, param: usize) -> Result<f64, Error> {
        self.check_index("equation", equation, self.neq)?;
        self.check_index("parameter", param, self.n_sens)?;
        if !self.sens_current {
            if self.at_initial_condition {
                self.engine
                    .consistent_sensitivities(&mut self.vectors.ys, &mut self.vectors.ysdot)
                    .map_err(|e| Error::engine("consistent sensitivity fetch", e))?;
            } else {
                self.engine
                    .sensitivities(&mut self.vectors.ys)
                    .map_err(|e| Error::engine("sensitivity fetch", e))?;
            }
            self.sens_current = true;
        }
        Ok(self.vectors.ys[param][equation])
    }

    /// The current integration time.
    pub fn current_time(&self) -> f64 {
        self.tcurrent
    }

    /// The size of the last accepted step.
    pub fn last_step_size(&self) -> f64 {
        self.last_step
    }

    /// The engine's workspace allocation for the requested metric.
    pub fn workspace_size(&self, metric: WorkspaceMetric) -> usize {
        let size = self.engine.workspace_size();
        match metric {
            WorkspaceMetric::Real => size.real_len,
            WorkspaceMetric::Integer => size.integer_len,
        }
    }

    /// Shared access to the underlying problem.
    pub fn problem(&self) -> &P {
        &self.problem
    }

    /// Shared access to the underlying engine.
    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Exclusive access to the underlying engine.
    pub fn engine_mut(&mut self) -> &mut E {
        &mut self.engine
    }

    fn require_init(&self, operation: &'static str) -> Result<(), Error> {
        if self.initialized {
            Ok(())
        } else {
            Err(Error::NotInitialized { operation })
        }
    }

    fn check_index(&self, what: &'static str, index: usize, limit: usize) -> Result<(), Error> {
        if index < limit {
            Ok(())
        } else {
            Err(Error::IndexOutOfRange { what, index, limit })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;
    use cinder_core::EvalOutcome;

    use crate::test_utils::{
        Applied, ExponentialDecayProblem, ScriptedEngine, REDUNDANT_SENS_FETCH_CODE,
        RESIDUAL_FAILURE_CODE,
    };

    fn integrator(rates: &[f64]) -> DaeIntegrator<ExponentialDecayProblem, ScriptedEngine> {
        DaeIntegrator::new(ExponentialDecayProblem::new(rates), ScriptedEngine::new())
    }

    // --- Initialization ---

    #[test]
    fn init_reports_provider_initial_conditions() {
        let mut dae = integrator(&[2.0, 3.0]);
        dae.init(0.0).expect("should initialize");

        assert_eq!(dae.solution_vector(), &[1.0, 1.0]);
        assert_eq!(dae.derivative_vector(), &[-2.0, -3.0]);
        assert_eq!(dae.current_time(), 0.0);
        assert_eq!(dae.last_step_size(), 0.0);
    }

    #[test]
    fn reinitialization_resets_time_and_state() {
        let mut dae = integrator(&[1.0]);
        dae.init(0.0).expect("should initialize");
        dae.solve(1e-4).expect("should solve");
        assert!(dae.current_time() > 0.0);

        dae.init(0.0).expect("should reinitialize");
        assert_eq!(dae.current_time(), 0.0);
        assert_eq!(dae.solution_vector(), &[1.0]);

        let initializations = dae
            .engine()
            .applied
            .iter()
            .filter(|a| matches!(a, Applied::Initialized(_)))
            .count();
        assert_eq!(initializations, 2);
    }

    #[test]
    fn operations_before_init_fail() {
        let mut dae = integrator(&[1.0]);
        assert!(matches!(
            dae.step(1.0),
            Err(Error::NotInitialized { operation: "step" })
        ));
        assert!(matches!(dae.solve(1.0), Err(Error::NotInitialized { .. })));
        assert!(matches!(
            dae.correct_initial_given_derivative(None),
            Err(Error::NotInitialized { .. })
        ));
    }

    // --- Tolerances ---

    #[test]
    fn tolerance_modes_are_exclusive() {
        let mut dae = integrator(&[1.0, 2.0]);
        dae.set_component_tolerances(1e-6, &[1e-8, 1e-9])
            .expect("vector mode should apply");
        dae.set_tolerances(1e-8, 1e-10).expect("scalar mode should apply");
        dae.init(0.0).expect("should initialize");

        let applied = &dae.engine().applied;
        assert!(applied
            .iter()
            .any(|a| matches!(a, Applied::ScalarTolerances { rtol, atol }
                if *rtol == 1e-8 && *atol == 1e-10)));
        assert!(!applied
            .iter()
            .any(|a| matches!(a, Applied::VectorTolerances { .. })));
    }

    #[test]
    fn vector_mode_replaces_scalar_mode() {
        let mut dae = integrator(&[1.0, 2.0]);
        dae.set_tolerances(1e-8, 1e-10).expect("scalar mode should apply");
        dae.set_component_tolerances(1e-6, &[1e-8, 1e-9])
            .expect("vector mode should apply");
        dae.init(0.0).expect("should initialize");

        let applied = &dae.engine().applied;
        assert!(applied
            .iter()
            .any(|a| matches!(a, Applied::VectorTolerances { .. })));
        assert!(!applied
            .iter()
            .any(|a| matches!(a, Applied::ScalarTolerances { .. })));
    }

    #[test]
    fn non_positive_tolerances_are_configuration_errors() {
        let mut dae = integrator(&[1.0]);
        assert!(matches!(
            dae.set_tolerances(0.0, 1e-10),
            Err(Error::InvalidConfig { option: "tolerances", .. })
        ));
        assert!(matches!(
            dae.set_tolerances(1e-8, -1.0),
            Err(Error::InvalidConfig { .. })
        ));
        assert!(matches!(
            dae.set_component_tolerances(1e-8, &[f64::NAN]),
            Err(Error::InvalidConfig { .. })
        ));
        assert!(matches!(
            dae.set_sensitivity_tolerances(1e-5, 0.0),
            Err(Error::InvalidConfig { .. })
        ));
    }

    #[test]
    fn wrong_length_tolerance_vector_is_rejected() {
        let mut dae = integrator(&[1.0, 2.0]);
        assert!(matches!(
            dae.set_component_tolerances(1e-8, &[1e-10]),
            Err(Error::InvalidConfig { .. })
        ));
    }

    #[test]
    fn post_init_tolerance_setter_pushes_immediately() {
        let mut dae = integrator(&[1.0]);
        dae.init(0.0).expect("should initialize");
        dae.engine_mut().applied.clear();

        dae.set_tolerances(1e-7, 1e-9).expect("should push");
        assert_eq!(
            dae.engine().applied,
            vec![Applied::ScalarTolerances {
                rtol: 1e-7,
                atol: 1e-9
            }]
        );
    }

    // --- Options ---

    #[test]
    fn recorded_options_are_applied_in_batch_during_init() {
        let mut dae = integrator(&[1.0]);
        dae.set_max_order(5).expect("should record");
        dae.set_initial_step_size(1e-4).expect("should record");
        dae.set_max_err_test_failures(7).expect("should record");
        dae.include_algebraic_in_error_test(false).expect("should record");
        dae.init(0.0).expect("should initialize");

        let applied = &dae.engine().applied;
        assert!(applied.contains(&Applied::MaxOrder(5)));
        assert!(applied.contains(&Applied::InitialStep(1e-4)));
        assert!(applied.contains(&Applied::MaxErrTestFails(7)));
        assert!(applied.contains(&Applied::SuppressAlg(true)));
        // The default step cap always reaches the engine.
        assert!(applied.contains(&Applied::MaxSteps(20_000)));
    }

    #[test]
    fn post_init_option_setter_pushes_immediately() {
        let mut dae = integrator(&[1.0]);
        dae.init(0.0).expect("should initialize");
        dae.engine_mut().applied.clear();

        dae.set_max_num_steps(500).expect("should push");
        assert_eq!(dae.engine().applied, vec![Applied::MaxSteps(500)]);
    }

    #[test]
    fn invalid_initial_step_is_rejected() {
        let mut dae = integrator(&[1.0]);
        assert!(matches!(
            dae.set_initial_step_size(0.0),
            Err(Error::InvalidConfig { .. })
        ));
        assert!(matches!(
            dae.set_initial_step_size(f64::INFINITY),
            Err(Error::InvalidConfig { .. })
        ));
    }

    #[test]
    fn banded_bandwidths_are_validated_against_system_size() {
        let mut dae = integrator(&[1.0, 2.0]);
        dae.set_banded_linear_solver(1, 1).expect("should accept");
        assert!(matches!(
            dae.set_banded_linear_solver(2, 0),
            Err(Error::InvalidConfig { .. })
        ));

        dae.init(0.0).expect("should initialize");
        assert!(dae.engine().applied.contains(&Applied::LinearSolver(
            LinearSolver::Banded { upper: 1, lower: 1 },
            JacobianMode::FiniteDifference,
        )));
    }

    #[test]
    fn analytic_jacobian_mode_is_registered_with_the_linear_solver() {
        let mut dae = integrator(&[1.0]);
        dae.set_jacobian_mode(JacobianMode::Analytic);
        dae.init(0.0).expect("should initialize");
        assert!(dae.engine().applied.contains(&Applied::LinearSolver(
            LinearSolver::Dense,
            JacobianMode::Analytic,
        )));
    }

    // --- Constraints ---

    #[test]
    fn constraints_recorded_before_init_are_applied_during_init() {
        let mut dae = integrator(&[1.0, 2.0]);
        dae.set_constraints(&[Constraint::NonNegative, Constraint::Unconstrained])
            .expect("should record");
        dae.init(0.0).expect("should initialize");

        assert!(dae.engine().applied.contains(&Applied::Constraints(vec![
            Constraint::NonNegative,
            Constraint::Unconstrained,
        ])));
    }

    #[test]
    fn provider_constraints_are_used_when_none_are_recorded() {
        let problem = ExponentialDecayProblem::new(&[1.0, 2.0])
            .with_constraints(&[Constraint::StrictlyPositive, Constraint::Unconstrained]);
        let mut dae = DaeIntegrator::new(problem, ScriptedEngine::new());
        dae.init(0.0).expect("should initialize");

        assert!(dae.engine().applied.contains(&Applied::Constraints(vec![
            Constraint::StrictlyPositive,
            Constraint::Unconstrained,
        ])));
    }

    #[test]
    fn invalid_constraint_flag_fails_atomically() {
        let mut dae = integrator(&[1.0, 2.0]);
        dae.set_constraints(&[Constraint::NonNegative, Constraint::NonNegative])
            .expect("should record");
        dae.init(0.0).expect("should initialize");
        dae.engine_mut().applied.clear();

        let err = dae.set_constraint_flags(&[1, 99]).unwrap_err();
        assert!(matches!(err, Error::InvalidConfig { option: "constraints", .. }));
        assert!(err.to_string().contains("99"));
        // The engine saw nothing.
        assert!(dae.engine().applied.is_empty());
    }

    #[test]
    fn valid_constraint_flags_replace_the_whole_vector() {
        let mut dae = integrator(&[1.0, 2.0]);
        dae.init(0.0).expect("should initialize");
        dae.engine_mut().applied.clear();

        dae.set_constraint_flags(&[1, 0]).expect("should apply");
        assert_eq!(
            dae.engine().applied,
            vec![Applied::Constraints(vec![
                Constraint::NonNegative,
                Constraint::Unconstrained,
            ])]
        );
    }

    #[test]
    fn single_constraint_setter_pushes_the_full_vector_after_init() {
        let mut dae = integrator(&[1.0, 2.0]);
        dae.init(0.0).expect("should initialize");
        dae.engine_mut().applied.clear();

        dae.set_constraint(1, Constraint::NonPositive).expect("should push");
        assert_eq!(
            dae.engine().applied,
            vec![Applied::Constraints(vec![
                Constraint::Unconstrained,
                Constraint::NonPositive,
            ])]
        );
    }

    #[test]
    fn constraint_index_is_bounds_checked() {
        let mut dae = integrator(&[1.0]);
        assert!(matches!(
            dae.set_constraint(1, Constraint::NonNegative),
            Err(Error::IndexOutOfRange {
                what: "constraint component",
                index: 1,
                limit: 1,
            })
        ));
    }

    // --- Stepping ---

    #[test]
    fn step_advances_within_the_target() {
        let problem = ExponentialDecayProblem::new(&[1.0, 1.0]);
        let engine = ScriptedEngine::with_internal_step(4e-6);
        let mut dae = DaeIntegrator::new(problem, engine);
        dae.init(0.0).expect("should initialize");

        let t = dae.step(1e-5).expect("should step");
        assert!(t > 0.0 && t <= 1e-5);
        assert_relative_eq!(t, 4e-6);
        assert_relative_eq!(dae.current_time(), t);
        assert_relative_eq!(dae.last_step_size(), t);
    }

    #[test]
    fn step_target_not_ahead_is_a_precondition_violation() {
        let mut dae = integrator(&[1.0]);
        dae.init(0.0).expect("should initialize");

        assert!(matches!(
            dae.step(0.0),
            Err(Error::TargetNotAhead { target, current })
                if target == 0.0 && current == 0.0
        ));
        assert!(matches!(dae.step(-1.0), Err(Error::TargetNotAhead { .. })));
    }

    #[test]
    fn solve_reaches_the_target() {
        let mut dae = integrator(&[1.0]);
        dae.init(0.0).expect("should initialize");

        let status = dae.solve(1e-3).expect("should solve");
        assert_eq!(status, SolveStatus::ReachedStopTime);
        assert_relative_eq!(dae.current_time(), 1e-3);
        // The stop time was pushed before advancing.
        assert!(dae.engine().applied.contains(&Applied::StopTime(1e-3)));
    }

    #[test]
    fn solve_at_a_reached_target_performs_no_engine_work() {
        let mut dae = integrator(&[1.0]);
        dae.init(0.0).expect("should initialize");
        dae.solve(1e-3).expect("should solve");
        let advances = dae.engine().advances;

        let status = dae.solve(1e-3).expect("should be a clean no-op");
        assert_eq!(status, SolveStatus::AlreadyReached);
        assert_eq!(dae.engine().advances, advances);
    }

    #[test]
    fn warnings_are_non_fatal_during_solve() {
        let mut dae = integrator(&[1.0]);
        dae.init(0.0).expect("should initialize");
        dae.engine_mut().scripted_statuses.push_back(StepStatus::Warning);

        let status = dae.solve(1e-4).expect("warning should not abort");
        assert_eq!(status, SolveStatus::Complete);
        assert_relative_eq!(dae.current_time(), 1e-4);
    }

    #[test]
    fn root_found_is_accepted_and_advancement_continues() {
        let mut dae = integrator(&[1.0]);
        dae.init(0.0).expect("should initialize");
        dae.engine_mut().scripted_statuses.push_back(StepStatus::RootFound);

        let status = dae.solve(1e-4).expect("root should not abort");
        assert_eq!(status, SolveStatus::Complete);
        assert_relative_eq!(dae.current_time(), 1e-4);
    }

    #[test]
    fn fatal_engine_code_aborts_and_preserves_state() {
        let mut dae = integrator(&[1.0]);
        dae.init(0.0).expect("should initialize");
        dae.engine_mut().fail_advance_with = Some(-3);

        let err = dae.solve(1e-3).unwrap_err();
        assert!(matches!(err, Error::StepFailed { code: -3, .. }));
        assert_eq!(dae.current_time(), 0.0);
        assert_eq!(dae.solution_vector(), &[1.0]);
    }

    #[test]
    fn recoverable_residual_is_retried_with_a_reduced_step() {
        let mut problem = ExponentialDecayProblem::new(&[1.0]);
        problem.scripted_residuals.push_back(EvalOutcome::Recoverable);
        let mut dae = DaeIntegrator::new(problem, ScriptedEngine::new());
        dae.init(0.0).expect("should initialize");

        let t = dae.step(1e-5).expect("retry should succeed");
        assert_relative_eq!(t, 5e-7);
        assert_eq!(dae.problem().residual_calls, 2);
        assert_eq!(dae.problem().last_step_seen, Some(5e-7));
    }

    #[test]
    fn unrecoverable_residual_aborts_the_step() {
        let mut problem = ExponentialDecayProblem::new(&[1.0]);
        problem
            .scripted_residuals
            .push_back(EvalOutcome::Unrecoverable);
        let mut dae = DaeIntegrator::new(problem, ScriptedEngine::new());
        dae.init(0.0).expect("should initialize");

        let err = dae.step(1e-5).unwrap_err();
        assert!(matches!(
            err,
            Error::StepFailed {
                code: RESIDUAL_FAILURE_CODE,
                ..
            }
        ));
    }

    // --- Accessors ---

    #[test]
    fn indexed_accessors_are_bounds_checked() {
        let mut dae = integrator(&[1.0, 2.0]);
        dae.init(0.0).expect("should initialize");

        assert_eq!(dae.solution(1).expect("in range"), 1.0);
        assert_eq!(dae.derivative(1).expect("in range"), -2.0);
        assert!(matches!(
            dae.solution(2),
            Err(Error::IndexOutOfRange {
                what: "solution",
                index: 2,
                limit: 2,
            })
        ));
        assert!(matches!(
            dae.derivative(5),
            Err(Error::IndexOutOfRange { what: "derivative", .. })
        ));
    }

    #[test]
    fn quadrature_vector_is_none_without_quadratures() {
        let mut dae = integrator(&[1.0]);
        dae.init(0.0).expect("should initialize");
        assert!(dae.quadrature_vector().expect("should query").is_none());
    }

    #[test]
    fn quadrature_is_accumulated_through_the_provider() {
        let problem = ExponentialDecayProblem::new(&[1.0]).with_quadrature();
        let mut dae = DaeIntegrator::new(problem, ScriptedEngine::new());
        dae.init(0.0).expect("should initialize");
        assert!(dae.engine().applied.contains(&Applied::QuadratureInit(1)));

        dae.solve(1e-4).expect("should solve");
        let quadrature = dae
            .quadrature_vector()
            .expect("should fetch")
            .expect("one quadrature equation");
        // The integral of y = 1 - t over [0, 1e-4], to Euler accuracy.
        assert_relative_eq!(quadrature[0], 1e-4 - 0.5e-8, max_relative = 1e-4);
        assert!(dae.problem().quadrature_calls > 0);
    }

    #[test]
    fn workspace_size_reports_engine_figures() {
        let mut dae = integrator(&[1.0, 2.0]);
        dae.init(0.0).expect("should initialize");
        assert_eq!(dae.workspace_size(WorkspaceMetric::Real), 90);
        assert_eq!(dae.workspace_size(WorkspaceMetric::Integer), 22);
    }

    // --- Consistent initial conditions ---

    #[test]
    fn correction_defaults_to_a_fallback_target() {
        let mut dae = integrator(&[1.0]);
        dae.init(0.0).expect("should initialize");
        dae.correct_initial_given_derivative(None).expect("should correct");

        assert!(dae.engine().applied.contains(&Applied::InitialCorrection {
            policy: IcPolicy::StateGivenDerivative,
            target: 1e-5,
        }));
    }

    #[test]
    fn correction_target_uses_the_configured_initial_step() {
        let mut dae = integrator(&[1.0]);
        dae.set_initial_step_size(1e-3).expect("should record");
        dae.init(0.0).expect("should initialize");
        dae.correct_initial_algebraic_given_differential(None)
            .expect("should correct");

        assert!(dae.engine().applied.contains(&Applied::InitialCorrection {
            policy: IcPolicy::AlgebraicGivenDifferential,
            target: 1e-3,
        }));
    }

    #[test]
    fn correction_honors_an_explicit_target() {
        let mut dae = integrator(&[1.0]);
        dae.init(0.0).expect("should initialize");
        let (y, ydot) = dae
            .correct_initial_given_derivative(Some(0.5))
            .expect("should correct");
        assert_eq!(y, &[1.0]);
        assert_eq!(ydot, &[-1.0]);

        assert!(dae.engine().applied.contains(&Applied::InitialCorrection {
            policy: IcPolicy::StateGivenDerivative,
            target: 0.5,
        }));
    }

    #[test]
    fn correction_failure_names_the_policy_and_engine_code() {
        let mut dae = integrator(&[1.0]);
        dae.init(0.0).expect("should initialize");
        dae.engine_mut().fail_correction_with = Some(-12);

        let err = dae.correct_initial_given_derivative(None).unwrap_err();
        assert!(matches!(
            err,
            Error::InconsistentInitialConditions {
                policy: IcPolicy::StateGivenDerivative,
                code: -12,
            }
        ));

        dae.engine_mut().fail_correction_with = Some(-12);
        let err = dae
            .correct_initial_algebraic_given_differential(None)
            .unwrap_err();
        assert!(matches!(
            err,
            Error::InconsistentInitialConditions {
                policy: IcPolicy::AlgebraicGivenDifferential,
                ..
            }
        ));
    }

    // --- Sensitivity ---

    fn sensitivity_integrator() -> DaeIntegrator<ExponentialDecayProblem, ScriptedEngine> {
        let problem = ExponentialDecayProblem::new(&[1.0, 2.0]).with_sensitivities(&[2.0, 4.0]);
        let mut engine = ScriptedEngine::new();
        engine.strict_sensitivity_fetch = true;
        DaeIntegrator::new(problem, engine)
    }

    #[test]
    fn init_derives_scaled_sensitivity_tolerances() {
        let mut dae = sensitivity_integrator();
        dae.init(0.0).expect("should initialize");

        let applied = &dae.engine().applied;
        assert!(applied.contains(&Applied::SensitivityInit { n_params: 2 }));
        assert!(applied.iter().any(|a| matches!(
            a,
            Applied::SensitivityTolerances { rtol, atol }
                if *rtol == 1e-5 && atol == &vec![1e-7 / 2.0, 1e-7 / 4.0]
        )));
    }

    #[test]
    fn sensitivity_uses_the_consistent_fetch_at_the_initial_condition() {
        let mut dae = sensitivity_integrator();
        dae.init(0.0).expect("should initialize");

        let value = dae.sensitivity(0, 1).expect("should fetch");
        assert_relative_eq!(value, ScriptedEngine::consistent_sensitivity(1));
        assert_eq!(dae.engine().sens_fetches, 1);
    }

    #[test]
    fn sensitivity_is_cached_until_the_next_advance() {
        let mut dae = sensitivity_integrator();
        dae.init(0.0).expect("should initialize");

        dae.sensitivity(0, 0).expect("first fetch");
        // A second read without an intervening step must hit the cache;
        // the strict engine would fail a redundant fetch.
        dae.sensitivity(1, 0).expect("cached read");
        dae.sensitivity(0, 1).expect("cached read");
        assert_eq!(dae.engine().sens_fetches, 1);

        dae.step(1e-5).expect("should step");
        let refreshed = dae.sensitivity(0, 0).expect("should refetch");
        assert_eq!(dae.engine().sens_fetches, 2);
        assert_relative_eq!(refreshed, 1.0 + dae.current_time());
    }

    #[test]
    fn solve_invalidates_the_sensitivity_cache() {
        let mut dae = sensitivity_integrator();
        dae.init(0.0).expect("should initialize");
        dae.sensitivity(0, 0).expect("first fetch");

        dae.solve(1e-4).expect("should solve");
        dae.sensitivity(0, 0).expect("should refetch");
        assert_eq!(dae.engine().sens_fetches, 2);
    }

    #[test]
    fn redundant_engine_fetch_would_fail() {
        // Confirms the strict mock actually enforces what the cache tests
        // rely on.
        let mut dae = sensitivity_integrator();
        dae.init(0.0).expect("should initialize");
        dae.sensitivity(0, 0).expect("first fetch");

        let err = dae
            .engine_mut()
            .sensitivities(&mut [vec![0.0; 2], vec![0.0; 2]])
            .unwrap_err();
        assert_eq!(err.code, REDUNDANT_SENS_FETCH_CODE);
    }

    #[test]
    fn sensitivity_indices_are_bounds_checked() {
        let mut dae = sensitivity_integrator();
        dae.init(0.0).expect("should initialize");

        assert!(matches!(
            dae.sensitivity(2, 0),
            Err(Error::IndexOutOfRange {
                what: "equation",
                index: 2,
                limit: 2,
            })
        ));
        assert!(matches!(
            dae.sensitivity(0, 2),
            Err(Error::IndexOutOfRange {
                what: "parameter",
                index: 2,
                limit: 2,
            })
        ));
    }

    #[test]
    fn sensitivity_without_parameters_reports_parameter_out_of_range() {
        let mut dae = integrator(&[1.0]);
        dae.init(0.0).expect("should initialize");
        assert!(matches!(
            dae.sensitivity(0, 0),
            Err(Error::IndexOutOfRange {
                what: "parameter",
                limit: 0,
                ..
            })
        ));
    }
}
