//! Settings validation with helpful error messages

use std::path::Path;

use super::Settings;
use crate::error::ConvertError;

/// Validate parsed settings
pub fn validate_settings(settings: &Settings) -> Result<(), ConvertError> {
    if settings.tools.timeout_secs == 0 {
        return Err(ConvertError::config_error_with_hint(
            "tools.timeout_secs must be greater than 0",
            None,
            "Use a generous value such as 300; signing tools can be slow on large bundles",
        ));
    }

    if settings.signing.lock_timeout_secs == 0 {
        return Err(ConvertError::config_error_with_hint(
            "signing.lock_timeout_secs must be greater than 0",
            None,
            "Use at least the time keytool needs to generate a key, e.g. 120",
        ));
    }

    if let Some(ref root) = settings.workspace.root {
        validate_dir("workspace.root", root)?;
    }

    if let Some(ref java_home) = settings.tools.java_home {
        validate_dir("tools.java_home", java_home)?;
    }

    Ok(())
}

fn validate_dir(key: &str, path: &Path) -> Result<(), ConvertError> {
    if !path.is_dir() {
        return Err(ConvertError::config_error_with_hint(
            format!("{} is not a directory: {}", key, path.display()),
            None,
            "Create the directory or remove the setting to use the default",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_timeout_rejected() {
        let mut settings = Settings::default();
        settings.tools.timeout_secs = 0;
        assert!(validate_settings(&settings).is_err());
    }

    #[test]
    fn test_missing_workspace_root_rejected() {
        let mut settings = Settings::default();
        settings.workspace.root = Some("/no/such/workspace/root".into());
        let err = validate_settings(&settings).unwrap_err();
        assert!(err.to_string().contains("workspace.root"));
    }

    #[test]
    fn test_defaults_valid() {
        assert!(validate_settings(&Settings::default()).is_ok());
    }
}
