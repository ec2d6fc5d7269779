//! Configuration validation.
//!
//! Serde handles syntax; this module checks value ranges, addresses and
//! the registration list. All problems are reported, not just the first.

use std::collections::HashSet;
use std::fmt;
use std::net::SocketAddr;

use crate::config::schema::{ResolverConfig, StoreBackend};

/// One day between attempts.
pub const MAX_BACKOFF_SECS: u64 = 86_400;
/// One hour of caller wait.
pub const MAX_BUDGET_SECS: u64 = 3_600;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted path of the offending field.
    pub field: String,
    pub message: String,
}

impl ValidationError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

pub fn validate_config(config: &ResolverConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    let resolution = &config.resolution;
    if resolution.budget_secs == 0 {
        errors.push(ValidationError::new("resolution.budget_secs", "must be greater than 0"));
    } else if resolution.budget_secs > MAX_BUDGET_SECS {
        errors.push(ValidationError::new(
            "resolution.budget_secs",
            format!("must be at most {}", MAX_BUDGET_SECS),
        ));
    }
    if resolution.backoff_secs == 0 {
        errors.push(ValidationError::new("resolution.backoff_secs", "must be greater than 0"));
    } else if resolution.backoff_secs > MAX_BACKOFF_SECS {
        errors.push(ValidationError::new(
            "resolution.backoff_secs",
            format!("must be at most {}", MAX_BACKOFF_SECS),
        ));
    }
    if !(0.0..1.0).contains(&resolution.jitter_ratio) {
        errors.push(ValidationError::new("resolution.jitter_ratio", "must be in [0, 1)"));
    }

    if config.store.backend == StoreBackend::File && config.store.path.as_os_str().is_empty() {
        errors.push(ValidationError::new("store.path", "required for the file backend"));
    }

    if config.admin.enabled {
        if config.admin.bind_address.parse::<SocketAddr>().is_err() {
            errors.push(ValidationError::new("admin.bind_address", "not a socket address"));
        }
        if config.admin.api_key.is_empty() {
            errors.push(ValidationError::new("admin.api_key", "must not be empty"));
        }
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::new("observability.metrics_address", "not a socket address"));
    }

    let mut seen = HashSet::new();
    for (i, spec) in config.registration.iter().enumerate() {
        if spec.key.trim().is_empty() {
            errors.push(ValidationError::new(format!("registration[{}].key", i), "must not be empty"));
        } else if !seen.insert(spec.key.as_str()) {
            errors.push(ValidationError::new(
                format!("registration[{}].key", i),
                format!("duplicate key '{}'", spec.key),
            ));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::KeySpec;

    #[test]
    fn test_default_is_valid() {
        assert_eq!(validate_config(&ResolverConfig::default()), Ok(()));
    }

    #[test]
    fn test_collects_all_errors() {
        let mut config = ResolverConfig::default();
        config.resolution.budget_secs = 0;
        config.resolution.backoff_secs = 0;
        config.resolution.jitter_ratio = 1.5;
        config.admin.bind_address = "localhost".into();

        let errors = validate_config(&config).unwrap_err();
        let fields: Vec<_> = errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(
            fields,
            vec![
                "resolution.budget_secs",
                "resolution.backoff_secs",
                "resolution.jitter_ratio",
                "admin.bind_address",
            ]
        );
    }

    #[test]
    fn test_interval_ceilings() {
        let mut config = ResolverConfig::default();
        config.resolution.budget_secs = MAX_BUDGET_SECS;
        config.resolution.backoff_secs = MAX_BACKOFF_SECS;
        assert!(validate_config(&config).is_ok());

        config.resolution.budget_secs = MAX_BUDGET_SECS + 1;
        config.resolution.backoff_secs = u64::MAX / 1000 + 1;
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 2);
        assert_eq!(errors[0].field, "resolution.budget_secs");
        assert_eq!(errors[1].field, "resolution.backoff_secs");
        assert!(errors[1].message.contains("86400"));
    }

    #[test]
    fn test_disabled_admin_not_checked() {
        let mut config = ResolverConfig::default();
        config.admin.enabled = false;
        config.admin.bind_address = String::new();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_registration_keys() {
        let mut config = ResolverConfig::default();
        config.registration = vec![
            KeySpec::new("bot.token", ""),
            KeySpec::new(" ", ""),
            KeySpec::new("bot.token", "again"),
        ];

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 2);
        assert_eq!(errors[0].field, "registration[1].key");
        assert!(errors[1].message.contains("duplicate"));
    }
}
