//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate addresses, origin URL and timeout ranges
//! - Check the default-host suffix is usable as a hostname suffix
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: EdgeConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use thiserror::Error;
use url::Url;

use crate::config::schema::EdgeConfig;

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field}: invalid socket address {value:?}")]
    InvalidAddress { field: &'static str, value: String },

    #[error("origin.base_url: {0}")]
    InvalidOrigin(String),

    #[error("rewrite.default_host_suffix: {0}")]
    InvalidSuffix(String),

    #[error("{0} must be greater than zero")]
    ZeroTimeout(&'static str),
}

/// Validate a parsed configuration.
pub fn validate_config(config: &EdgeConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    check_address(
        "listener.bind_address",
        &config.listener.bind_address,
        &mut errors,
    );
    if config.admin.enabled {
        check_address("admin.bind_address", &config.admin.bind_address, &mut errors);
    }
    if config.observability.metrics_enabled {
        check_address(
            "observability.metrics_address",
            &config.observability.metrics_address,
            &mut errors,
        );
    }

    match Url::parse(&config.origin.base_url) {
        Ok(url) => {
            if url.scheme() != "http" {
                errors.push(ValidationError::InvalidOrigin(format!(
                    "unsupported scheme {:?}",
                    url.scheme()
                )));
            }
            if url.host_str().is_none() {
                errors.push(ValidationError::InvalidOrigin("missing host".into()));
            }
            if url.query().is_some() {
                errors.push(ValidationError::InvalidOrigin(
                    "query string not allowed".into(),
                ));
            }
        }
        Err(e) => errors.push(ValidationError::InvalidOrigin(e.to_string())),
    }

    let suffix = &config.rewrite.default_host_suffix;
    if suffix.is_empty() {
        errors.push(ValidationError::InvalidSuffix("must not be empty".into()));
    } else if !suffix.starts_with('.') {
        errors.push(ValidationError::InvalidSuffix(format!(
            "{suffix:?} must start with '.'"
        )));
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::ZeroTimeout("timeouts.request_secs"));
    }
    if config.timeouts.connect_secs == 0 {
        errors.push(ValidationError::ZeroTimeout("timeouts.connect_secs"));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_address(field: &'static str, value: &str, errors: &mut Vec<ValidationError>) {
    if value.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidAddress {
            field,
            value: value.to_string(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(validate_config(&EdgeConfig::default()).is_ok());
    }

    #[test]
    fn test_collects_every_error() {
        let mut config = EdgeConfig::default();
        config.listener.bind_address = "not-an-address".into();
        config.origin.base_url = "ftp://storage".into();
        config.rewrite.default_host_suffix = "cloudfront.net".into();
        config.timeouts.request_secs = 0;

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 4);
        assert!(errors.contains(&ValidationError::ZeroTimeout("timeouts.request_secs")));
        assert!(matches!(
            errors[0],
            ValidationError::InvalidAddress { field: "listener.bind_address", .. }
        ));
    }

    #[test]
    fn test_empty_suffix_rejected() {
        let mut config = EdgeConfig::default();
        config.rewrite.default_host_suffix = String::new();
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(
            errors,
            vec![ValidationError::InvalidSuffix("must not be empty".into())]
        );
    }

    #[test]
    fn test_disabled_admin_address_not_checked() {
        let mut config = EdgeConfig::default();
        config.admin.enabled = false;
        config.admin.bind_address = "garbage".into();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_metrics_address_checked_when_enabled() {
        let mut config = EdgeConfig::default();
        config.observability.metrics_enabled = true;
        config.observability.metrics_address = "nope".into();
        assert_eq!(validate_config(&config).unwrap_err().len(), 1);
    }
}
