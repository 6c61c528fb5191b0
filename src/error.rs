//! Error handling utilities for degrade points

/// Extension trait for logging a recoverable error and carrying on without the value
pub trait LogErr<T> {
    /// Log error with context at WARN and return `None`
    fn log_none(self, context: &str) -> Option<T>;

    /// Log error with context at WARN and return `default`
    fn log_or(self, context: &str, default: T) -> T;
}

impl<T, E: std::fmt::Display> LogErr<T> for Result<T, E> {
    fn log_none(self, context: &str) -> Option<T> {
        match self {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(error = %e, "{}", context);
                None
            }
        }
    }

    fn log_or(self, context: &str, default: T) -> T {
        self.log_none(context).unwrap_or(default)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_none() {
        let ok: Result<u8, String> = Ok(3);
        assert_eq!(ok.log_none("ctx"), Some(3));
        let err: Result<u8, String> = Err("boom".into());
        assert_eq!(err.log_none("ctx"), None);
    }

    #[test]
    fn test_log_or() {
        let err: Result<&str, String> = Err("boom".into());
        assert_eq!(err.log_or("ctx", "none"), "none");
    }
}
