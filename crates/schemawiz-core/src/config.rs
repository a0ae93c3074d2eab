//! Resolver configuration.

/// Default root namespace for entity classes.
pub const DEFAULT_NAMESPACE: &str = "App\\Models";

/// Configuration for a resolution run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolverConfig {
    /// Namespace every entity class is placed under.
    pub base_namespace: String,

    /// Whether quick entities get timestamps unless they opt out.
    /// Custom entities only get them when declared.
    pub default_timestamps: bool,

    /// Whether entities get a seeder unless they opt out.
    pub default_seeder: bool,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            base_namespace: DEFAULT_NAMESPACE.to_string(),
            default_timestamps: true,
            default_seeder: true,
        }
    }
}

impl ResolverConfig {
    /// Create a configuration with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the base namespace. Surrounding separators are trimmed.
    pub fn base_namespace(mut self, namespace: impl Into<String>) -> Self {
        let namespace = namespace.into().replace('/', "\\");
        self.base_namespace = namespace.trim_matches('\\').to_string();
        self
    }

    /// Set whether quick entities get timestamps by default.
    pub fn default_timestamps(mut self, enabled: bool) -> Self {
        self.default_timestamps = enabled;
        self
    }

    /// Set whether entities get a seeder by default.
    pub fn default_seeder(mut self, enabled: bool) -> Self {
        self.default_seeder = enabled;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ResolverConfig::default();
        assert_eq!(config.base_namespace, "App\\Models");
        assert!(config.default_timestamps);
        assert!(config.default_seeder);
    }

    #[test]
    fn test_namespace_is_normalized() {
        let config = ResolverConfig::new().base_namespace("/Domain/Entities/");
        assert_eq!(config.base_namespace, "Domain\\Entities");
    }
}
