use cinder_core::{DaeProblem, JacobianMatrix};

use crate::engine::{EngineCallbacks, EngineContext};

/// Marshals the engine's fixed callback shape onto a [`DaeProblem`].
///
/// The bridge is the only code aware of the engine's native call
/// convention: it queries the engine's current internal step size from the
/// callback context before delegating, and maps the model's
/// [`EvalOutcome`](cinder_core::EvalOutcome) onto the engine's integer
/// return contract. It holds no state and no business logic of its own.
pub(crate) struct Bridge<'a, P> {
    pub problem: &'a mut P,
}

impl<P: DaeProblem> EngineCallbacks for Bridge<'_, P> {
    fn residual(
        &mut self,
        t: f64,
        ctx: &dyn EngineContext,
        y: &[f64],
        ydot: &[f64],
        resid: &mut [f64],
    ) -> i32 {
        let step = ctx.current_step_size();
        self.problem.residual(t, step, y, ydot, resid).engine_flag()
    }

    fn quadrature_rhs(
        &mut self,
        t: f64,
        _ctx: &dyn EngineContext,
        y: &[f64],
        ydot: &[f64],
        qdot: &mut [f64],
    ) -> i32 {
        self.problem.quadrature_rhs(t, y, ydot, qdot).engine_flag()
    }

    fn jacobian(
        &mut self,
        t: f64,
        ctx: &dyn EngineContext,
        c_j: f64,
        y: &[f64],
        ydot: &[f64],
        jac: &mut JacobianMatrix<'_>,
    ) -> i32 {
        let step = ctx.current_step_size();
        self.problem.jacobian(t, step, c_j, y, ydot, jac);
        0
    }
}
