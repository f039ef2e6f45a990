//! Configuration validation.

use crate::schema::{Config, GatewayConfig};

/// Validation result.
#[derive(Debug, Default)]
pub struct ValidationResult {
    pub errors: Vec<ValidationIssue>,
    pub warnings: Vec<ValidationIssue>,
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    fn error(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ValidationIssue::new(path, message));
    }

    fn warning(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ValidationIssue::new(path, message));
    }
}

/// A single validation finding.
#[derive(Debug)]
pub struct ValidationIssue {
    pub path: String,
    pub message: String,
}

impl ValidationIssue {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}

/// Configuration validator.
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate the configuration.
    pub fn validate(config: &Config) -> ValidationResult {
        let mut result = ValidationResult::default();

        Self::validate_queue(config, &mut result);
        Self::validate_dispatcher(config, &mut result);
        Self::validate_channels(config, &mut result);

        if config.scheduler.lead_time_hours == 0 {
            result.warning(
                "scheduler.lead_time_hours",
                "lead time of zero fires reminders at the due moment",
            );
        }

        result
    }

    fn validate_queue(config: &Config, result: &mut ValidationResult) {
        if config.queue.visibility_timeout_secs == 0 {
            result.error(
                "queue.visibility_timeout_secs",
                "must be at least 1 second",
            );
        }
    }

    fn validate_dispatcher(config: &Config, result: &mut ValidationResult) {
        let d = &config.dispatcher;
        if d.max_attempts == 0 {
            result.error("dispatcher.max_attempts", "must be at least 1");
        }
        if d.max_in_flight == 0 {
            result.error("dispatcher.max_in_flight", "must be at least 1");
        }
        if d.send_timeout_secs == 0 {
            result.error("dispatcher.send_timeout_secs", "must be at least 1 second");
        }
        if d.retry_base_secs > d.retry_max_secs {
            result.error(
                "dispatcher.retry_base_secs",
                "base retry delay exceeds the retry cap",
            );
        }
    }

    fn validate_channels(config: &Config, result: &mut ValidationResult) {
        let mut any_enabled = false;
        if let Some(sms) = &config.channels.sms {
            any_enabled |= sms.enabled;
            Self::validate_gateway("channels.sms", sms, result);
        }
        if let Some(email) = &config.channels.email {
            any_enabled |= email.enabled;
            Self::validate_gateway("channels.email", email, result);
        }
        if !any_enabled {
            result.warning(
                "channels",
                "no notification gateway enabled; reminders cannot be delivered",
            );
        }
    }

    fn validate_gateway(path: &str, gateway: &GatewayConfig, result: &mut ValidationResult) {
        if !gateway.enabled {
            return;
        }
        if gateway.api_url.is_empty() {
            result.error(format!("{}.api_url", path), "must not be empty");
        }
        if gateway.api_token.is_empty() {
            result.error(format!("{}.api_token", path), "must not be empty");
        }
        if gateway.sender.is_empty() {
            result.error(format!("{}.sender", path), "must not be empty");
        }
    }
}
