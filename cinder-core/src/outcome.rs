/// Result of a model evaluation, as reported back to the solving engine.
///
/// The engine's callback contract is fixed: zero means success, a positive
/// value asks the engine to retry with a reduced internal step, and a
/// negative value aborts the integration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvalOutcome {
    /// Evaluation succeeded.
    Success,
    /// Evaluation failed in a way the engine may recover from by retrying
    /// with a reduced step.
    Recoverable,
    /// Evaluation failed and the integration must abort.
    Unrecoverable,
}

impl EvalOutcome {
    /// The engine-native return flag for this outcome.
    pub fn engine_flag(self) -> i32 {
        match self {
            Self::Success => 0,
            Self::Recoverable => 1,
            Self::Unrecoverable => -1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn engine_flags_follow_the_callback_contract() {
        assert_eq!(EvalOutcome::Success.engine_flag(), 0);
        assert!(EvalOutcome::Recoverable.engine_flag() > 0);
        assert!(EvalOutcome::Unrecoverable.engine_flag() < 0);
    }
}
