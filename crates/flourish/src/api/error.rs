//! Error taxonomy shared by every engine operation.

use thiserror::Error;

/// Outcome type shared by every fallible engine operation.
pub type FxResult<T = ()> = Result<T, FxError>;

/// Errors surfaced by the tween scheduler and the particle system.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FxError {
    /// An awaitable operation was aborted before it finished.
    /// Expected during scene teardown; callers should not treat it as a failure.
    #[error("operation cancelled")]
    Cancelled,
    /// A caller passed an argument the engine refuses to clamp.
    #[error("invalid parameter `{name}`: {reason}")]
    InvalidParameter { name: &'static str, reason: String },
    /// The host renderer or frame clock went away. Fatal for the engine instance.
    #[error("resource unavailable: {0}")]
    ResourceUnavailable(&'static str),
}

impl FxError {
    pub fn invalid(name: &'static str, reason: impl Into<String>) -> Self {
        FxError::InvalidParameter { name, reason: reason.into() }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, FxError::Cancelled)
    }
}

/// Fail fast unless `value` is a finite number.
pub(crate) fn ensure_finite(name: &'static str, value: f32) -> FxResult {
    if value.is_finite() {
        Ok(())
    } else {
        Err(FxError::invalid(name, format!("expected a finite number, got {value}")))
    }
}

/// Fail fast unless `value` is finite and not negative.
pub(crate) fn ensure_non_negative(name: &'static str, value: f32) -> FxResult {
    ensure_finite(name, value)?;
    if value < 0.0 {
        return Err(FxError::invalid(name, format!("must not be negative, got {value}")));
    }
    Ok(())
}

/// Fail fast unless `value` is finite and strictly positive.
pub(crate) fn ensure_positive(name: &'static str, value: f32) -> FxResult {
    ensure_finite(name, value)?;
    if value <= 0.0 {
        return Err(FxError::invalid(name, format!("must be greater than zero, got {value}")));
    }
    Ok(())
}
