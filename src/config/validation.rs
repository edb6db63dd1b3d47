//! Settings validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check that the trust mode has the certificate paths it needs
//! - Validate value ranges (non-empty namespace, sane backoff bounds)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: Settings → Result<(), Vec<ValidationError>>
//! - An unrecognized trust mode is not an error; it is warned about when read

use thiserror::Error;

use crate::authentication::TrustMode;
use crate::config::schema::Settings;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("watcher.namespace must not be empty")]
    EmptyNamespace,

    #[error("watcher.retry.rate_limiter_base_ms must be greater than zero")]
    ZeroRateLimiterBase,

    #[error("watcher.retry.rate_limiter_base_ms ({base_ms}) exceeds rate_limiter_max_ms ({max_ms})")]
    RateLimiterBaseExceedsMax { base_ms: u64, max_ms: u64 },

    #[error("tls.mode `{0}` requires tls.ca_cert_path")]
    MissingCaPath(TrustMode),

    #[error("tls.mode `{0}` requires tls.client_cert_path and tls.client_key_path")]
    MissingClientIdentityPaths(TrustMode),

    #[error("observability.log_format `{0}` is not one of: pretty, json")]
    UnknownLogFormat(String),
}

/// Check `settings` and collect every problem found.
pub fn validate_settings(settings: &Settings) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if settings.watcher.namespace.is_empty() {
        errors.push(ValidationError::EmptyNamespace);
    }

    let retry = &settings.watcher.retry;
    if retry.rate_limiter_base_ms == 0 {
        errors.push(ValidationError::ZeroRateLimiterBase);
    }
    if retry.rate_limiter_base_ms > retry.rate_limiter_max_ms {
        errors.push(ValidationError::RateLimiterBaseExceedsMax {
            base_ms: retry.rate_limiter_base_ms,
            max_ms: retry.rate_limiter_max_ms,
        });
    }

    let tls = &settings.tls;
    if let Ok(mode) = tls.mode.parse::<TrustMode>() {
        if mode.requires_ca() && tls.ca_cert_path.is_none() {
            errors.push(ValidationError::MissingCaPath(mode));
        }
        if mode.requires_client_identity()
            && (tls.client_cert_path.is_none() || tls.client_key_path.is_none())
        {
            errors.push(ValidationError::MissingClientIdentityPaths(mode));
        }
    }

    let format = settings.observability.log_format.as_str();
    if format != "pretty" && format != "json" {
        errors.push(ValidationError::UnknownLogFormat(format.to_string()));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
