use crate::config;
use crate::context::AppContext;
use crate::format;
use libnexus::Config;
use libnexus::auth::{Credentials, RegistryKey};
use std::io::{self, BufRead, Write};
use std::path::Path;
use url::Url;

/// Values collected by `nexus configure`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigureAnswers {
    /// Registry host, with or without scheme
    pub host: String,
    /// Nexus repository name; empty for a plain registry
    pub repository: String,
    /// Username; empty for anonymous access
    pub username: String,
    /// Password for `username`
    pub password: String,
}

/// Handle `nexus configure`: prompt, then write config and credentials.
pub fn handle_configure(ctx: &AppContext) {
    let answers = match prompt_answers(&ctx.config) {
        Ok(answers) => answers,
        Err(e) => {
            format::error(ctx, &e);
            std::process::exit(1);
        }
    };

    match write_configuration(&ctx.config, &answers, &ctx.config_path, &ctx.credentials_path) {
        Ok(_) => {
            format::success(
                ctx,
                &format!("Configuration written to {}", ctx.config_path.display()),
            );
            if !answers.username.is_empty() {
                format::success(
                    ctx,
                    &format!(
                        "Credentials for {} stored in {}",
                        RegistryKey::new(&answers.host, Some(answers.repository.as_str())),
                        ctx.credentials_path.display()
                    ),
                );
            }
        }
        Err(e) => {
            format::error(ctx, &e);
            std::process::exit(1);
        }
    }
}

/// Applies `answers` on top of `base` and persists the result.
///
/// Credentials are keyed by host and repository, so reconfiguring another
/// registry keeps the credentials of the previous one. An empty username
/// switches the configured registry to anonymous access and drops the login
/// stored for it.
pub(crate) fn write_configuration(
    base: &Config,
    answers: &ConfigureAnswers,
    config_path: &Path,
    credentials_path: &Path,
) -> Result<Config, String> {
    let host = answers.host.trim();
    if host.is_empty() {
        return Err("Nexus host must not be empty".to_string());
    }

    let with_scheme = if host.contains("://") {
        host.to_string()
    } else {
        format!("http://{}", host)
    };
    Url::parse(&with_scheme).map_err(|e| format!("Invalid Nexus host '{}': {}", host, e))?;

    let mut config = base.clone();
    config.registry.host = host.to_string();
    let repository = answers.repository.trim();
    config.registry.repository = (!repository.is_empty()).then(|| repository.to_string());

    // Fail before touching disk if the result is not usable
    config.base_url().map_err(|e| e.to_string())?;

    let key = RegistryKey::new(host, config.registry.repository.as_deref());
    let username = answers.username.trim();
    if username.is_empty() {
        if credentials_path.exists() && config::forget_credentials(credentials_path, &key)? {
            tracing::info!(registry = %key, "removed stored credentials");
        }
    } else {
        let credentials = Credentials::try_basic(username, &answers.password)
            .map_err(|e| format!("Invalid credentials: {}", e))?;
        config::save_credentials(credentials_path, &key, &credentials)?;
    }

    config::save_config(&config, config_path)?;
    Ok(config)
}

fn prompt_answers(current: &Config) -> Result<ConfigureAnswers, String> {
    let stdin = io::stdin();
    let mut input = stdin.lock();

    let host = prompt_line(&mut input, "Enter Nexus Host", Some(&current.registry.host))?;
    let repository = prompt_line(
        &mut input,
        "Enter Nexus Repository Name",
        current.registry.repository.as_deref(),
    )?;
    let username = prompt_line(&mut input, "Enter Nexus Username", None)?;
    let password = if username.is_empty() {
        String::new()
    } else {
        rpassword::prompt_password("Enter Nexus Password: ")
            .map_err(|e| format!("Failed to read password: {}", e))?
    };

    Ok(ConfigureAnswers {
        host,
        repository,
        username,
        password,
    })
}

/// Prompts for one line; an empty answer keeps `current`.
pub(crate) fn prompt_line<R: BufRead>(
    input: &mut R,
    label: &str,
    current: Option<&str>,
) -> Result<String, String> {
    match current.filter(|c| !c.is_empty()) {
        Some(current) => print!("{} [{}]: ", label, current),
        None => print!("{}: ", label),
    }
    io::stdout()
        .flush()
        .map_err(|e| format!("Failed to flush stdout: {}", e))?;

    let mut line = String::new();
    input
        .read_line(&mut line)
        .map_err(|e| format!("Failed to read input: {}", e))?;

    let answer = line.trim();
    if answer.is_empty() {
        Ok(current.unwrap_or_default().to_string())
    } else {
        Ok(answer.to_string())
    }
}

#[cfg(test)]
#[path = "configure_tests.rs"]
mod tests;
