use jiff::{SignedDuration, civil::DateTime};

use crate::{
    error::{ConfigError, NodeError},
    init::InitValues,
};

/// Initialization parameter holding the node's reference instant.
pub const START_DATE_KEY: &str = "start_date";

/// Tracks simulated time for a single node.
///
/// The orchestrator reports time as elapsed seconds since the start of the run.
/// A `TimeSource` combines that offset with the node-local reference instant
/// to produce the absolute simulated timestamp.
///
/// Offsets are non-decreasing within a run: advancing to an offset behind the
/// current one fails with [`NodeError::TimeOrdering`].
#[derive(Debug, Clone, PartialEq)]
pub struct TimeSource {
    origin: DateTime,
    elapsed: f64,
    now: DateTime,
}

impl TimeSource {
    /// Creates a time source positioned at `origin`.
    #[must_use]
    pub fn new(origin: DateTime) -> Self {
        Self {
            origin,
            elapsed: 0.0,
            now: origin,
        }
    }

    /// Creates a time source from the required `start_date` parameter.
    ///
    /// The timestamp is an ISO 8601 civil date-time such as
    /// `2019-01-01T00:00:00` or `2019-01-01 00:00:00`.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the parameter is missing or unparseable.
    pub fn from_init(init: &InitValues) -> Result<Self, ConfigError> {
        let text = init.require_text(START_DATE_KEY)?;
        let origin = text
            .trim()
            .parse::<DateTime>()
            .map_err(|err| ConfigError::InvalidParameter {
                key: START_DATE_KEY.to_owned(),
                reason: err.to_string(),
            })?;
        Ok(Self::new(origin))
    }

    /// The reference instant of this node.
    #[must_use]
    pub fn origin(&self) -> DateTime {
        self.origin
    }

    /// Elapsed seconds since the reference instant.
    #[must_use]
    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    /// The current absolute simulated timestamp.
    #[must_use]
    pub fn now(&self) -> DateTime {
        self.now
    }

    /// Moves the time pointer to `elapsed_seconds` after the reference instant.
    ///
    /// Repeating the current offset is allowed.
    ///
    /// # Errors
    ///
    /// Returns [`NodeError::TimeOrdering`] if the offset is behind the current
    /// one, or [`NodeError::InvalidTime`] if it is not finite or the resulting
    /// timestamp is out of range. The time source is unchanged on error.
    pub fn advance_to(&mut self, elapsed_seconds: f64) -> Result<DateTime, NodeError> {
        if !elapsed_seconds.is_finite() {
            return Err(NodeError::InvalidTime {
                reason: format!("elapsed offset {elapsed_seconds} is not finite"),
            });
        }
        if elapsed_seconds < self.elapsed {
            return Err(NodeError::TimeOrdering {
                requested: elapsed_seconds,
                current: self.elapsed,
            });
        }

        let offset = SignedDuration::try_from_secs_f64(elapsed_seconds).map_err(|err| {
            NodeError::InvalidTime {
                reason: err.to_string(),
            }
        })?;
        let now = self
            .origin
            .checked_add(offset)
            .map_err(|err| NodeError::InvalidTime {
                reason: err.to_string(),
            })?;

        self.elapsed = elapsed_seconds;
        self.now = now;
        Ok(now)
    }
}
