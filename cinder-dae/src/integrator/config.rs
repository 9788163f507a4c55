/// Tolerance configuration for the primary solution.
///
/// The two modes are exclusive: applying one replaces the other entirely.
#[derive(Debug, Clone, PartialEq)]
pub enum Tolerances {
    /// One relative and one absolute tolerance applied uniformly.
    Scalar { rtol: f64, atol: f64 },
    /// One relative tolerance and a per-component absolute tolerance.
    PerComponent { rtol: f64, atol: Vec<f64> },
}

impl Default for Tolerances {
    fn default() -> Self {
        Self::Scalar {
            rtol: 1e-8,
            atol: 1e-10,
        }
    }
}

impl Tolerances {
    /// Validates that every tolerance is finite and strictly positive.
    ///
    /// # Errors
    ///
    /// Returns a description of the first violated condition.
    pub fn validate(&self) -> Result<(), &'static str> {
        match self {
            Self::Scalar { rtol, atol } => {
                check_positive(*rtol, "relative tolerance must be finite and positive")?;
                check_positive(*atol, "absolute tolerance must be finite and positive")?;
            }
            Self::PerComponent { rtol, atol } => {
                check_positive(*rtol, "relative tolerance must be finite and positive")?;
                if atol.is_empty() {
                    return Err("absolute tolerance vector must not be empty");
                }
                for value in atol {
                    check_positive(
                        *value,
                        "absolute tolerance entries must be finite and positive",
                    )?;
                }
            }
        }
        Ok(())
    }
}

/// Tolerances applied to the forward sensitivity equations.
///
/// The absolute tolerance is divided by each parameter's scale factor when
/// sensitivity analysis is initialized, so parameters with very different
/// physical magnitudes can share one setting.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SensitivityTolerances {
    pub rtol: f64,
    pub atol: f64,
}

impl Default for SensitivityTolerances {
    fn default() -> Self {
        Self {
            rtol: 1e-5,
            atol: 1e-7,
        }
    }
}

impl SensitivityTolerances {
    /// Validates that both tolerances are finite and strictly positive.
    ///
    /// # Errors
    ///
    /// Returns a description of the first violated condition.
    pub fn validate(&self) -> Result<(), &'static str> {
        check_positive(
            self.rtol,
            "sensitivity relative tolerance must be finite and positive",
        )?;
        check_positive(
            self.atol,
            "sensitivity absolute tolerance must be finite and positive",
        )
    }
}

/// Linear solver registered with the engine.
///
/// Changing this after `init` takes effect only on the next `init`; the
/// engine's linear solver is not hot-swappable mid-integration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LinearSolver {
    /// Dense direct solver.
    #[default]
    Dense,
    /// Banded direct solver with explicit bandwidths.
    Banded { upper: usize, lower: usize },
}

/// How the engine obtains Jacobian entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JacobianMode {
    /// The engine approximates the Jacobian by finite differences.
    #[default]
    FiniteDifference,
    /// The model supplies an analytic Jacobian through the callback
    /// bridge.
    Analytic,
}

/// Tunable engine options recorded by the adapter and applied in batch
/// during `init`. Options left `None` keep the engine's own defaults.
#[derive(Debug, Clone, PartialEq)]
pub struct Options {
    pub max_order: Option<usize>,
    pub max_steps: Option<usize>,
    pub initial_step: Option<f64>,
    pub stop_time: Option<f64>,
    pub max_err_test_fails: Option<usize>,
    pub max_nonlin_iters: Option<usize>,
    pub max_nonlin_conv_fails: Option<usize>,
    pub include_algebraic_in_error_test: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            max_order: None,
            max_steps: Some(20_000),
            initial_step: None,
            stop_time: None,
            max_err_test_fails: None,
            max_nonlin_iters: None,
            max_nonlin_conv_fails: None,
            include_algebraic_in_error_test: true,
        }
    }
}

fn check_positive(value: f64, message: &'static str) -> Result<(), &'static str> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_tolerances_are_valid() {
        assert!(Tolerances::default().validate().is_ok());
        assert!(SensitivityTolerances::default().validate().is_ok());
    }

    #[test]
    fn rejects_non_positive_tolerances() {
        let zero_rtol = Tolerances::Scalar {
            rtol: 0.0,
            atol: 1e-10,
        };
        assert!(zero_rtol.validate().is_err());

        let negative_atol = Tolerances::Scalar {
            rtol: 1e-8,
            atol: -1e-10,
        };
        assert!(negative_atol.validate().is_err());

        let nan_entry = Tolerances::PerComponent {
            rtol: 1e-8,
            atol: vec![1e-10, f64::NAN],
        };
        assert!(nan_entry.validate().is_err());

        let infinite = SensitivityTolerances {
            rtol: f64::INFINITY,
            atol: 1e-7,
        };
        assert!(infinite.validate().is_err());
    }

    #[test]
    fn rejects_empty_tolerance_vector() {
        let empty = Tolerances::PerComponent {
            rtol: 1e-8,
            atol: Vec::new(),
        };
        assert!(empty.validate().is_err());
    }

    #[test]
    fn default_options_cap_step_count_only() {
        let options = Options::default();
        assert_eq!(options.max_steps, Some(20_000));
        assert_eq!(options.max_order, None);
        assert!(options.include_algebraic_in_error_test);
    }
}
