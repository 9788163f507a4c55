use thiserror::Error;

/// Inequality constraint applied to one component of the solution.
///
/// Constraints are optional; an engine only enforces them when at least one
/// component carries an active tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Constraint {
    /// No constraint on this component.
    #[default]
    Unconstrained,
    /// Component must stay greater than or equal to zero.
    NonNegative,
    /// Component must stay strictly greater than zero.
    StrictlyPositive,
    /// Component must stay less than or equal to zero.
    NonPositive,
    /// Component must stay strictly less than zero.
    StrictlyNegative,
}

/// An error returned when an integer constraint flag has no matching tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("invalid constraint flag: {flag}")]
pub struct InvalidConstraintFlag {
    pub flag: i32,
}

impl Constraint {
    /// Parses the engine's integer encoding of a constraint tag.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidConstraintFlag`] for any value outside the five
    /// recognized tags.
    pub fn from_flag(flag: i32) -> Result<Self, InvalidConstraintFlag> {
        match flag {
            0 => Ok(Self::Unconstrained),
            1 => Ok(Self::NonNegative),
            2 => Ok(Self::StrictlyPositive),
            -1 => Ok(Self::NonPositive),
            -2 => Ok(Self::StrictlyNegative),
            _ => Err(InvalidConstraintFlag { flag }),
        }
    }

    /// The engine's integer encoding of this tag.
    pub fn flag(self) -> i32 {
        match self {
            Self::Unconstrained => 0,
            Self::NonNegative => 1,
            Self::StrictlyPositive => 2,
            Self::NonPositive => -1,
            Self::StrictlyNegative => -2,
        }
    }

    /// Whether this tag actually constrains the component.
    pub fn is_active(self) -> bool {
        !matches!(self, Self::Unconstrained)
    }

    /// Whether `value` satisfies the constraint.
    pub fn allows(self, value: f64) -> bool {
        match self {
            Self::Unconstrained => true,
            Self::NonNegative => value >= 0.0,
            Self::StrictlyPositive => value > 0.0,
            Self::NonPositive => value <= 0.0,
            Self::StrictlyNegative => value < 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flag_round_trips_for_every_tag() {
        for tag in [
            Constraint::Unconstrained,
            Constraint::NonNegative,
            Constraint::StrictlyPositive,
            Constraint::NonPositive,
            Constraint::StrictlyNegative,
        ] {
            assert_eq!(Constraint::from_flag(tag.flag()), Ok(tag));
        }
    }

    #[test]
    fn rejects_unknown_flags() {
        for flag in [99, 3, -3, i32::MAX] {
            assert_eq!(Constraint::from_flag(flag), Err(InvalidConstraintFlag { flag }));
        }
    }

    #[test]
    fn only_the_default_tag_is_inactive() {
        assert!(!Constraint::Unconstrained.is_active());
        assert!(Constraint::NonNegative.is_active());
        assert!(Constraint::StrictlyNegative.is_active());
    }

    #[test]
    fn allows_checks_the_sign_condition() {
        assert!(Constraint::NonNegative.allows(0.0));
        assert!(!Constraint::StrictlyPositive.allows(0.0));
        assert!(Constraint::NonPositive.allows(-1.0));
        assert!(!Constraint::StrictlyNegative.allows(0.5));
        assert!(Constraint::Unconstrained.allows(f64::NEG_INFINITY));
    }
}
