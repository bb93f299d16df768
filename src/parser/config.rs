//! Configuration for document parsing

/// What to do when a single path's data cannot be decoded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PathErrorPolicy {
    /// Abort the whole parse on the first bad path
    #[default]
    Abort,
    /// Drop the bad path and record it in `Document::diagnostics`
    Skip,
}

/// Configuration options for [`parse_with_config`](crate::parse_with_config)
#[derive(Debug, Clone, Default)]
pub struct ParseConfig {
    pub path_errors: PathErrorPolicy,
}

impl ParseConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the policy for undecodable paths
    pub fn with_path_errors(mut self, policy: PathErrorPolicy) -> Self {
        self.path_errors = policy;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_aborts() {
        assert_eq!(ParseConfig::default().path_errors, PathErrorPolicy::Abort);
    }

    #[test]
    fn test_builder_pattern() {
        let config = ParseConfig::new().with_path_errors(PathErrorPolicy::Skip);
        assert_eq!(config.path_errors, PathErrorPolicy::Skip);
    }
}
