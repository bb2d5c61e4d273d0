//! Error types for stint

use thiserror::Error;

/// Core error type for stint operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StintError {
    #[error("Invalid grid: {sessions} sessions x {groups} groups yields no runs")]
    InvalidGrid { sessions: u32, groups: u32 },

    #[error("Grid out of range: {sessions} sessions (1-{max_sessions}), {groups} groups (1-{max_groups})")]
    GridOutOfRange {
        sessions: u32,
        groups: u32,
        max_sessions: u32,
        max_groups: u32,
    },

    #[error("Lead minutes out of range: {0}")]
    InvalidLeadMinutes(u32),

    #[error("Invalid time window: {0}")]
    InvalidWindow(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

}

impl StintError {
    pub fn window(msg: impl Into<String>) -> Self {
        Self::InvalidWindow(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, StintError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_grid_message_names_both_dimensions() {
        let err = StintError::InvalidGrid {
            sessions: 0,
            groups: 3,
        };
        let msg = err.to_string();
        assert!(msg.contains("0 sessions"));
        assert!(msg.contains("3 groups"));
    }

    #[test]
    fn helper_constructors() {
        assert!(matches!(StintError::config("bad"), StintError::ConfigError(m) if m == "bad"));
        assert!(matches!(StintError::window("x"), StintError::InvalidWindow(_)));
    }
}
