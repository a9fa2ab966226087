//! CLI flag overrides on top of `pidns_config` profiles.
//!
//! Core never sees these types. It receives a pre-built `SessionConfig`.

use std::time::Duration;

use pidns_api::{Credentials, TlsMode};
use pidns_config::{Config, parse_url, profile_to_session_config};
use pidns_core::SessionConfig;
use secrecy::SecretString;

use crate::cli::GlobalOpts;
use crate::error::CliError;

pub use pidns_config::{config_path, load_config_or_default, save_config};

/// Resolve the active profile name from CLI flags and config.
pub fn active_profile_name(global: &GlobalOpts, config: &Config) -> String {
    config.active_profile_name(global.profile.as_deref())
}

fn available_profiles(config: &Config) -> String {
    let mut names: Vec<_> = config.profiles.keys().cloned().collect();
    if names.is_empty() {
        return "(none)".into();
    }
    names.sort();
    names.join(", ")
}

/// Build a `SessionConfig` from the config file, profile, and CLI overrides.
pub fn build_session_config(global: &GlobalOpts) -> Result<SessionConfig, CliError> {
    let cfg = pidns_config::load_config()?;
    let profile_name = active_profile_name(global, &cfg);

    let mut session = if let Some(profile) = cfg.profiles.get(&profile_name) {
        profile_to_session_config(profile, &profile_name, &cfg.defaults)?
    } else {
        // No profile: the URL has to come from flags / env.
        let Some(url) = global.url.as_deref() else {
            if global.profile.is_some() {
                return Err(CliError::ProfileNotFound {
                    name: profile_name,
                    available: available_profiles(&cfg),
                });
            }
            return Err(CliError::NoConfig {
                path: config_path().display().to_string(),
            });
        };
        let mut session = SessionConfig::new(parse_url("url", url)?);
        session.timeout = Duration::from_secs(cfg.defaults.timeout);
        session.refresh_interval = Duration::from_secs(cfg.defaults.refresh_interval.max(1));
        if cfg.defaults.insecure {
            session.tls = TlsMode::DangerAcceptInvalid;
        }
        session
    };

    apply_overrides(&mut session, global)?;
    tracing::debug!(profile = %profile_name, url = %session.url, "session configured");
    Ok(session)
}

/// Layer global flags over whatever the profile produced.
pub fn apply_overrides(session: &mut SessionConfig, global: &GlobalOpts) -> Result<(), CliError> {
    if let Some(ref url) = global.url {
        session.url = parse_url("url", url)?;
    }
    if let Some(ref url) = global.dashboard_url {
        session.dashboard_url = Some(parse_url("dashboard_url", url)?);
    }
    if global.insecure {
        session.tls = TlsMode::DangerAcceptInvalid;
    }
    if let Some(secs) = global.timeout {
        session.timeout = Duration::from_secs(secs);
    }

    let username = global
        .username
        .clone()
        .or_else(|| session.credentials.as_ref().map(|c| c.username().to_owned()));
    let password = global
        .password
        .clone()
        .map(SecretString::from)
        .or_else(|| session.credentials.as_ref().map(|c| c.password().clone()));
    if let (Some(username), Some(password)) = (username, password) {
        session.credentials = Some(Credentials::new(username, password));
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use clap::Parser;
    use secrecy::ExposeSecret;

    use super::*;
    use crate::cli::Cli;

    fn global(args: &[&str]) -> GlobalOpts {
        let mut argv = vec!["pidns"];
        argv.extend_from_slice(args);
        argv.push("devices");
        Cli::try_parse_from(argv).unwrap().global
    }

    #[test]
    fn flags_override_profile_values() {
        let mut session = SessionConfig::new("http://pi.local:8080".parse().unwrap());
        session.credentials = Some(Credentials::new("admin", SecretString::from("old")));

        let opts = global(&[
            "--url",
            "http://10.0.0.2:8080",
            "--timeout",
            "5",
            "--insecure",
            "--password",
            "new",
        ]);
        apply_overrides(&mut session, &opts).unwrap();

        assert_eq!(session.url.as_str(), "http://10.0.0.2:8080/");
        assert_eq!(session.timeout, Duration::from_secs(5));
        assert!(matches!(session.tls, TlsMode::DangerAcceptInvalid));
        let creds = session.credentials.unwrap();
        assert_eq!(creds.username(), "admin");
        assert_eq!(creds.password().expose_secret(), "new");
    }

    #[test]
    fn password_without_username_leaves_credentials_unset() {
        let mut session = SessionConfig::new("http://pi.local:8080".parse().unwrap());
        let opts = global(&["--password", "pw"]);
        apply_overrides(&mut session, &opts).unwrap();
        assert!(session.credentials.is_none());
    }

    #[test]
    fn bad_url_flag_is_a_usage_error() {
        let mut session = SessionConfig::new("http://pi.local:8080".parse().unwrap());
        let opts = global(&["--url", "not a url"]);
        let err = apply_overrides(&mut session, &opts).unwrap_err();
        assert_eq!(err.exit_code(), crate::error::exit_code::USAGE);
    }
}
