//! Construction errors.
//!
//! Scheduling itself is total: registration, dispatch and clearing cannot
//! fail. The only fallible step is assembling a scheduler from its parts.

/// Error returned by [`SchedulerBuilder::build`](crate::SchedulerBuilder::build).
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum BuildError {
    #[error("scheduler `{0}` has no time source")]
    MissingTimeSource(&'static str),
    #[error("scheduler `{0}` has no delay primitive")]
    MissingDelay(&'static str),
}
