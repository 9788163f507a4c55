/// Outcome of a completed [`solve`](crate::DaeIntegrator::solve) call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolveStatus {
    /// The target time was reached by normal advancement.
    Complete,
    /// Advancement ended on the engine's stop-time signal at the target.
    ReachedStopTime,
    /// The target was already at or behind the current time; no engine
    /// work was performed.
    AlreadyReached,
}
