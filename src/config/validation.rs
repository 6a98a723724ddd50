//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Every endpoint present, parseable, http(s), with a host
//! - Bind address parses as a socket address
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Pure function: DispatcherConfig → Result<(), Vec<ValidationError>>
//! - Runs before the config is accepted into the system

use std::net::SocketAddr;

use url::Url;

use crate::config::schema::DispatcherConfig;
use crate::routing::ServiceKind;

/// One semantic problem with the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    InvalidBindAddress(String),
    MissingEndpoint(ServiceKind),
    InvalidEndpoint { service: ServiceKind, url: String, reason: String },
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::InvalidBindAddress(addr) => {
                write!(f, "invalid bind address {addr:?}")
            }
            ValidationError::MissingEndpoint(service) => {
                write!(f, "no base URL configured for the {service} backend")
            }
            ValidationError::InvalidEndpoint { service, url, reason } => {
                write!(f, "invalid {service} base URL {url:?}: {reason}")
            }
        }
    }
}

/// Validate a configuration, collecting every problem found.
pub fn validate_config(config: &DispatcherConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidBindAddress(
            config.listener.bind_address.clone(),
        ));
    }

    for (service, url) in config.endpoints.iter() {
        if url.is_empty() {
            errors.push(ValidationError::MissingEndpoint(service));
            continue;
        }
        match Url::parse(url) {
            Err(e) => errors.push(ValidationError::InvalidEndpoint {
                service,
                url: url.to_string(),
                reason: e.to_string(),
            }),
            Ok(parsed) => {
                if !matches!(parsed.scheme(), "http" | "https") {
                    errors.push(ValidationError::InvalidEndpoint {
                        service,
                        url: url.to_string(),
                        reason: format!("unsupported scheme {:?}", parsed.scheme()),
                    });
                } else if parsed.host_str().is_none() {
                    errors.push(ValidationError::InvalidEndpoint {
                        service,
                        url: url.to_string(),
                        reason: "no host".to_string(),
                    });
                }
            }
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
    use crate::config::schema::EndpointsConfig;

    fn valid_config() -> DispatcherConfig {
        DispatcherConfig {
            endpoints: EndpointsConfig {
                compute: "http://127.0.0.1:8774".into(),
                networking: "http://127.0.0.1:9696".into(),
                load_balancer: "http://127.0.0.1:9876".into(),
                block_storage: "http://127.0.0.1:8776".into(),
                dns: "http://127.0.0.1:9001".into(),
                image: "http://127.0.0.1:9292".into(),
            },
            ..Default::default()
        }
    }

    #[test]
    fn test_valid_config_passes() {
        assert!(validate_config(&valid_config()).is_ok());
    }

    #[test]
    fn test_default_config_reports_every_missing_endpoint() {
        let errors = validate_config(&DispatcherConfig::default()).unwrap_err();
        assert_eq!(errors.len(), ServiceKind::ALL.len());
        assert!(errors
            .iter()
            .all(|e| matches!(e, ValidationError::MissingEndpoint(_))));
    }

    #[test]
    fn test_all_errors_are_collected() {
        let mut config = valid_config();
        config.listener.bind_address = "nonsense".into();
        config.endpoints.dns = "ftp://127.0.0.1:21".into();
        config.endpoints.image = String::new();
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 3);
        assert!(errors
            .iter()
            .any(|e| matches!(e, ValidationError::InvalidBindAddress(_))));
        assert!(errors
            .iter()
            .any(|e| matches!(e, ValidationError::MissingEndpoint(ServiceKind::Image))));
        assert!(errors.iter().any(|e| matches!(
            e,
            ValidationError::InvalidEndpoint { service: ServiceKind::Dns, .. }
        )));
    }
}
