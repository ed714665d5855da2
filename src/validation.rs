use crate::api::auth::fetch_access_token;
use crate::api::ApiClient;
use crate::config::{AuthType, Config, PortalConfig};
use crate::logger::Logger;

/// Decides whether the selected portal can be used for remote calls.
///
/// Implementations report their own failures through `logger`.
pub trait PortalValidator {
    fn validate(&self, config: &Config, selection: Option<&str>, logger: &Logger) -> bool;
}

/// Checks the portal locally, then confirms personal access keys with the
/// remote service.
pub struct RemotePortalValidator;

impl PortalValidator for RemotePortalValidator {
    fn validate(&self, config: &Config, selection: Option<&str>, logger: &Logger) -> bool {
        let Some(portal) = check_portal(config, selection, logger) else {
            return false;
        };

        match (portal.auth_type, portal.personal_access_key.as_deref()) {
            (AuthType::PersonalAccessKey, Some(key)) => {
                let result = ApiClient::new(config, portal.env)
                    .and_then(|client| fetch_access_token(&client, key));
                match result {
                    Ok(_) => true,
                    Err(err) => {
                        tracing::debug!(portal_id = portal.id(), error = ?err, "credential check failed");
                        logger.error(format!(
                            "Could not authenticate portal \"{}\": {err:#}",
                            portal.label()
                        ));
                        false
                    }
                }
            }
            _ => true,
        }
    }
}

/// Resolve the selected portal and make sure it carries the credential its
/// auth type needs.
pub fn check_portal<'a>(
    config: &'a Config,
    selection: Option<&str>,
    logger: &Logger,
) -> Option<&'a PortalConfig> {
    let Some(portal) = config.selected_portal(selection) else {
        match selection.or(config.default_portal.as_deref()) {
            Some(name_or_id) => logger.error(format!(
                "The portal \"{name_or_id}\" could not be found in the config"
            )),
            None => logger.error(
                "A portal needs to be supplied either via \"--portal\" or through setting \"default_portal\" in the config",
            ),
        }
        return None;
    };

    let missing = match portal.auth_type {
        AuthType::ApiKey if portal.api_key.is_none() => Some("api_key"),
        AuthType::PersonalAccessKey if portal.personal_access_key.is_none() => {
            Some("personal_access_key")
        }
        _ => None,
    };
    if let Some(field) = missing {
        logger.error(format!(
            "The portal \"{}\" is missing \"{field}\"",
            portal.label()
        ));
        return None;
    }

    Some(portal)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logger::LogLevel;
    use crate::test_helpers::helpers::captured_logger;

    fn config(toml_str: &str) -> Config {
        toml::from_str(toml_str).unwrap()
    }

    #[test]
    fn test_api_key_portal_is_valid_without_network() {
        let config = config(
            r#"
default_portal = "prod"

[[portals]]
name = "prod"
portal_id = 123
api_key = "secret"
"#,
        );
        let (logger, capture) = captured_logger(LogLevel::Log);
        assert!(RemotePortalValidator.validate(&config, None, &logger));
        assert_eq!(capture.stderr(), "");
    }

    #[test]
    fn test_no_portal_selected() {
        let config = config(
            r#"
[[portals]]
portal_id = 123
api_key = "secret"
"#,
        );
        let (logger, capture) = captured_logger(LogLevel::Log);
        assert!(check_portal(&config, None, &logger).is_none());
        assert!(capture
            .stderr()
            .contains("A portal needs to be supplied either via \"--portal\""));
    }

    #[test]
    fn test_unknown_portal_selected() {
        let config = config(
            r#"
[[portals]]
portal_id = 123
api_key = "secret"
"#,
        );
        let (logger, capture) = captured_logger(LogLevel::Log);
        assert!(!RemotePortalValidator.validate(&config, Some("staging"), &logger));
        assert!(capture
            .stderr()
            .contains("The portal \"staging\" could not be found in the config"));
    }

    #[test]
    fn test_missing_credentials() {
        let config = config(
            r#"
[[portals]]
name = "a"
portal_id = 1

[[portals]]
name = "b"
portal_id = 2
auth_type = "personal_access_key"
"#,
        );
        let (logger, capture) = captured_logger(LogLevel::Log);
        assert!(check_portal(&config, Some("a"), &logger).is_none());
        assert!(check_portal(&config, Some("2"), &logger).is_none());
        let err = capture.stderr();
        assert!(err.contains("The portal \"a\" is missing \"api_key\""));
        assert!(err.contains("The portal \"b\" is missing \"personal_access_key\""));
    }

    #[test]
    fn test_personal_access_key_rejected_when_service_unreachable() {
        let config = config(
            r#"
api_base_url = "http://127.0.0.1:1"
http_timeout = 2000

[[portals]]
name = "dev"
portal_id = 9
auth_type = "personal_access_key"
personal_access_key = "pak"
"#,
        );
        let (logger, capture) = captured_logger(LogLevel::Log);
        assert!(!RemotePortalValidator.validate(&config, Some("dev"), &logger));
        assert!(capture
            .stderr()
            .contains("Could not authenticate portal \"dev\""));
    }
}
