//! Registry configuration

/// What `register` does when a declaration with the same identifier is
/// already stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DuplicatePolicy {
    /// Replace the stored declaration (last write wins)
    #[default]
    Overwrite,
    /// Refuse the registration with a `Duplicate` error
    Reject,
}

/// Configuration for a `Registry`.
#[derive(Debug, Clone)]
pub struct RegistryConfig {
    /// Behaviour on re-registration of an existing identifier
    pub duplicate_policy: DuplicatePolicy,
    /// Whether lifecycle events are written to the structured log
    pub logging: bool,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            duplicate_policy: DuplicatePolicy::Overwrite,
            logging: true,
        }
    }
}

impl RegistryConfig {
    /// Config that refuses to overwrite stored declarations.
    pub fn reject_duplicates() -> Self {
        Self {
            duplicate_policy: DuplicatePolicy::Reject,
            ..Self::default()
        }
    }

    /// Config with logging turned off.
    pub fn silent() -> Self {
        Self {
            logging: false,
            ..Self::default()
        }
    }

    pub fn with_duplicate_policy(mut self, policy: DuplicatePolicy) -> Self {
        self.duplicate_policy = policy;
        self
    }

    pub fn with_logging(mut self, logging: bool) -> Self {
        self.logging = logging;
        self
    }
}
