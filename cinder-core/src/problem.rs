use crate::{Constraint, EvalOutcome, JacobianMatrix};

/// Marks one unknown as derivative-constrained or purely algebraic.
///
/// Engines use this classification when correcting the algebraic subset of
/// an initial condition and when excluding algebraic components from the
/// local error test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VariableKind {
    /// The unknown appears differentiated in the residual.
    #[default]
    Differential,
    /// The unknown is purely algebraic.
    Algebraic,
}

impl VariableKind {
    /// The engine-native encoding: 1.0 for differential, 0.0 for algebraic.
    pub fn engine_id(self) -> f64 {
        match self {
            Self::Differential => 1.0,
            Self::Algebraic => 0.0,
        }
    }
}

/// A differential-algebraic system `F(t, y, y') = 0`.
///
/// This is the residual/Jacobian provider consumed by an integration
/// adapter. The adapter owns the vectors; evaluation methods write into
/// caller-supplied slices sized to [`n_equations`](Self::n_equations) (or
/// [`n_quadratures`](Self::n_quadratures) for quadrature output).
///
/// Only [`n_equations`](Self::n_equations), `initial_conditions`, and
/// `residual` are required. The remaining methods default to a system with
/// no quadratures, no sensitivity parameters, no constraints, and all
/// differential unknowns.
pub trait DaeProblem {
    /// Number of differential/algebraic unknowns.
    fn n_equations(&self) -> usize;

    /// Writes the initial state and derivative at the start time.
    fn initial_conditions(&mut self, t0: f64, y: &mut [f64], ydot: &mut [f64]);

    /// Evaluates the residual `F(t, y, y')` into `resid`.
    ///
    /// `step_size` is the engine's current internal step, made available
    /// for models that scale internal source terms by it.
    fn residual(
        &mut self,
        t: f64,
        step_size: f64,
        y: &[f64],
        ydot: &[f64],
        resid: &mut [f64],
    ) -> EvalOutcome;

    /// Evaluates the quadrature integrands into `qdot`.
    fn quadrature_rhs(
        &mut self,
        _t: f64,
        _y: &[f64],
        _ydot: &[f64],
        _qdot: &mut [f64],
    ) -> EvalOutcome {
        EvalOutcome::Success
    }

    /// Writes the analytic Jacobian `dF/dy + c_j * dF/dy'` in place.
    ///
    /// Only invoked when the adapter is configured for a user-supplied
    /// Jacobian.
    fn jacobian(
        &mut self,
        _t: f64,
        _step_size: f64,
        _c_j: f64,
        _y: &[f64],
        _ydot: &[f64],
        _jac: &mut JacobianMatrix<'_>,
    ) {
    }

    /// Classifies one unknown as differential or algebraic.
    fn variable_kind(&self, _index: usize) -> VariableKind {
        VariableKind::Differential
    }

    /// Number of quadrature equations accumulated alongside the solution.
    fn n_quadratures(&self) -> usize {
        0
    }

    /// Number of parameters tracked by forward sensitivity analysis.
    fn n_sensitivity_params(&self) -> usize {
        0
    }

    /// Current values of the sensitivity parameters.
    fn sensitivity_params(&self) -> Vec<f64> {
        Vec::new()
    }

    /// Per-parameter scale factors used to normalize sensitivity
    /// tolerances across parameters with different physical units.
    fn param_scales(&self) -> Vec<f64> {
        vec![1.0; self.n_sensitivity_params()]
    }

    /// Number of components carrying an active inequality constraint.
    fn n_constraints(&self) -> usize {
        0
    }

    /// The constraint tag for one component.
    fn constraint(&self, _index: usize) -> Constraint {
        Constraint::Unconstrained
    }
}
