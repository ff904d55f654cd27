//! Shared helpers for turning arguments into a monitor.

use std::path::Path;

use winmon_core::config::load_or_default;
use winmon_core::models::{DEFAULT_WINRM_HTTPS_PORT, DEFAULT_WINRM_PORT};
use winmon_core::{MonitorRequest, MonitorSettings, Scheme, SessionOptions};

use crate::cli::TargetArgs;
use crate::error::CliError;

/// Loads settings from `--config`, the default location, or built-in defaults
pub fn load_settings(config_path: Option<&Path>) -> Result<MonitorSettings, CliError> {
    Ok(load_or_default(config_path)?)
}

/// Session options from settings, with command-line flags taking precedence
pub fn session_options(settings: &MonitorSettings, args: &TargetArgs) -> SessionOptions {
    let mut options = settings.to_options();
    if args.https {
        options.scheme = Scheme::Https;
    }
    if args.validate_cert {
        options.validate_server_cert = true;
    }
    options
}

/// Builds the request, prompting for the password when none was given
pub fn build_request(args: &TargetArgs, scheme: Scheme) -> Result<MonitorRequest, CliError> {
    let password = match &args.password {
        Some(password) => password.clone(),
        None => rpassword::prompt_password(format!(
            "Password for {}@{}: ",
            args.username, args.server
        ))?,
    };

    let mut request = MonitorRequest::new(args.server.trim(), args.username.as_str(), password);
    request.port = args.port.unwrap_or(match scheme {
        Scheme::Http => DEFAULT_WINRM_PORT,
        Scheme::Https => DEFAULT_WINRM_HTTPS_PORT,
    });
    request.transport.clone_from(&args.transport);
    Ok(request)
}
