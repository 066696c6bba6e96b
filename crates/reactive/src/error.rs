//! Error notifications for the reactive engine.

use alloc::string::String;
use core::fmt;

/// An error raised inside an operator chain.
///
/// Operator errors travel downstream as a distinguished notification on the
/// error channel until intercepted by `retry` or `catch_error`. A terminal
/// subscriber without an error handler logs the error instead of dropping it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OperatorError {
    message: String,
}

impl OperatorError {
    /// Creates an operator error with the given message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Returns the error message.
    #[inline]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for OperatorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "operator error: {}", self.message)
    }
}

/// A failure reported by a guarded subscriber callback.
///
/// Subscriber failures are isolated per subscriber: a failing callback is
/// logged and never prevents the remaining subscribers in the same
/// notification round from running.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SubscriptionError {
    message: String,
}

impl SubscriptionError {
    /// Creates a subscription error with the given message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Returns the error message.
    #[inline]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for SubscriptionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "subscriber error: {}", self.message)
    }
}
