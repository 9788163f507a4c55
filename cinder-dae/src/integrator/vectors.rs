use cinder_core::{Constraint, VariableKind};

/// Owns every parallel vector family tracked by the integrator: primary
/// state and derivative, variable-kind and constraint tags, per-parameter
/// sensitivity pairs, and quadrature state.
///
/// No two families share storage; the integrator is the single owner.
#[derive(Debug, Default)]
pub(crate) struct VectorFamilies {
    pub y: Vec<f64>,
    pub ydot: Vec<f64>,
    pub kinds: Vec<VariableKind>,
    pub constraints: Vec<Constraint>,
    pub ys: Vec<Vec<f64>>,
    pub ysdot: Vec<Vec<f64>>,
    pub yq: Vec<f64>,
}

impl VectorFamilies {
    /// Rebuilds every family at the requested sizes, zero-initialized.
    ///
    /// Any previously allocated family is dropped first, so re-allocation
    /// is idempotent and safe from any state.
    pub fn allocate(&mut self, neq: usize, n_sens: usize, n_quad: usize) {
        self.release();
        self.y = vec![0.0; neq];
        self.ydot = vec![0.0; neq];
        self.kinds = vec![VariableKind::Differential; neq];
        self.constraints = vec![Constraint::Unconstrained; neq];
        self.ys = vec![vec![0.0; neq]; n_sens];
        self.ysdot = vec![vec![0.0; neq]; n_sens];
        self.yq = vec![0.0; n_quad];
    }

    /// Drops every family. Safe to call when nothing is allocated.
    pub fn release(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allocate_sizes_every_family() {
        let mut vectors = VectorFamilies::default();
        vectors.allocate(3, 2, 1);

        assert_eq!(vectors.y.len(), 3);
        assert_eq!(vectors.ydot.len(), 3);
        assert_eq!(vectors.kinds.len(), 3);
        assert_eq!(vectors.constraints.len(), 3);
        assert_eq!(vectors.ys.len(), 2);
        assert_eq!(vectors.ysdot.len(), 2);
        assert!(vectors.ys.iter().all(|s| s.len() == 3));
        assert_eq!(vectors.yq.len(), 1);
    }

    #[test]
    fn reallocation_discards_old_contents() {
        let mut vectors = VectorFamilies::default();
        vectors.allocate(2, 0, 0);
        vectors.y[0] = 42.0;
        vectors.constraints[1] = Constraint::NonNegative;

        vectors.allocate(4, 1, 2);
        assert_eq!(vectors.y, vec![0.0; 4]);
        assert!(vectors.constraints.iter().all(|c| !c.is_active()));
        assert_eq!(vectors.ys, vec![vec![0.0; 4]]);
    }

    #[test]
    fn release_is_safe_when_nothing_is_allocated() {
        let mut vectors = VectorFamilies::default();
        vectors.release();
        vectors.release();
        assert!(vectors.y.is_empty());
    }
}
