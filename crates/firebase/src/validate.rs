//! Shape checks applied to a configuration before any handle is produced.

use autologist_domain::ServiceConfiguration;

use crate::error::InitializationError;

const PROJECT_ID_MIN: usize = 6;
const PROJECT_ID_MAX: usize = 30;
const APP_PLATFORMS: [&str; 3] = ["web", "android", "ios"];

/// Rejects configurations the backend would refuse. Empty fields are reported
/// first, in declaration order, so the message names the earliest gap.
pub fn validate_configuration(config: &ServiceConfiguration) -> Result<(), InitializationError> {
    for (field, value) in config.fields() {
        if value.trim().is_empty() {
            return Err(InitializationError::rejected(field, "must not be empty"));
        }
    }

    validate_project_id(config.project_id())?;
    validate_sender_id(config.messaging_sender_id())?;
    validate_app_id(config.app_id(), config.messaging_sender_id())?;
    validate_host("auth_domain", config.auth_domain())?;
    validate_host("storage_bucket", config.storage_bucket())?;
    if config.api_key().chars().any(char::is_whitespace) {
        return Err(InitializationError::rejected(
            "api_key",
            "must not contain whitespace",
        ));
    }

    Ok(())
}

fn validate_project_id(project_id: &str) -> Result<(), InitializationError> {
    let len = project_id.len();
    if !(PROJECT_ID_MIN..=PROJECT_ID_MAX).contains(&len) {
        return Err(InitializationError::rejected(
            "project_id",
            format!("must be {PROJECT_ID_MIN}-{PROJECT_ID_MAX} characters"),
        ));
    }
    if !project_id.starts_with(|c: char| c.is_ascii_lowercase()) {
        return Err(InitializationError::rejected(
            "project_id",
            "must start with a lowercase letter",
        ));
    }
    if project_id.ends_with('-') {
        return Err(InitializationError::rejected(
            "project_id",
            "must not end with a hyphen",
        ));
    }
    if !project_id
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
    {
        return Err(InitializationError::rejected(
            "project_id",
            "may only contain lowercase letters, digits and hyphens",
        ));
    }
    Ok(())
}

fn validate_sender_id(sender_id: &str) -> Result<(), InitializationError> {
    if !sender_id.chars().all(|c| c.is_ascii_digit()) {
        return Err(InitializationError::rejected(
            "messaging_sender_id",
            "must be numeric",
        ));
    }
    Ok(())
}

// Expected shape: `1:<sender id>:<platform>:<hex suffix>`.
fn validate_app_id(app_id: &str, sender_id: &str) -> Result<(), InitializationError> {
    let parts: Vec<&str> = app_id.split(':').collect();
    let [version, sender, platform, suffix] = parts.as_slice() else {
        return Err(InitializationError::rejected(
            "app_id",
            "must have the form 1:<sender>:<platform>:<id>",
        ));
    };
    if *version != "1" {
        return Err(InitializationError::rejected(
            "app_id",
            format!("unsupported version `{version}`"),
        ));
    }
    if *sender != sender_id {
        return Err(InitializationError::rejected(
            "app_id",
            "does not belong to the configured messaging sender",
        ));
    }
    if !APP_PLATFORMS.contains(platform) {
        return Err(InitializationError::rejected(
            "app_id",
            format!("unknown platform `{platform}`"),
        ));
    }
    if suffix.is_empty() || !suffix.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(InitializationError::rejected(
            "app_id",
            "must end with a hex identifier",
        ));
    }
    Ok(())
}

fn validate_host(field: &'static str, value: &str) -> Result<(), InitializationError> {
    if value.contains("://") {
        return Err(InitializationError::rejected(field, "must not include a scheme"));
    }
    if value.contains('/') || value.chars().any(char::is_whitespace) {
        return Err(InitializationError::rejected(
            field,
            "must be a bare host name",
        ));
    }
    Ok(())
}
