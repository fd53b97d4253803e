//! `nexus image` subcommands.
//!
//! Handlers print and exit; the `pub(crate)` functions they call take any
//! [`RegistryApi`](libnexus::RegistryApi) and return data, so they can be
//! tested against a mock registry.

use crate::context::{AppContext, VerbosityLevel};
use crate::format;
use libnexus::retention::{IMPLICIT_EXCLUDE, SortStrategy};
use libnexus::{Registry, RegistryBuilder};

/// `nexus image delete`
pub mod delete;
/// `nexus image info`
pub mod info;
/// `nexus image ls`
pub mod list;
/// `nexus image tags`
pub mod tags;


/// Builds a registry from the context's configuration and stored credentials.
pub(crate) fn connect(ctx: &AppContext) -> Result<Registry, String> {
    let mut builder = RegistryBuilder::new().with_config(ctx.config.clone());
    if let Some(credentials) = ctx.credentials() {
        builder = builder.with_credentials(credentials);
    }

    let registry = builder
        .build()
        .map_err(|e| format!("Failed to connect to registry: {}", e))?;

    format::print(
        ctx,
        VerbosityLevel::VeryVerbose,
        &format!("Connecting to registry: {}", registry.url()),
    );
    Ok(registry)
}

/// Sort strategy from `--sort`, falling back to the configured one.
pub(crate) fn resolve_strategy(ctx: &AppContext, flag: Option<&str>) -> SortStrategy {
    flag.map(SortStrategy::from)
        .unwrap_or(ctx.config.retention.sort)
}

/// Excluded tag names from `--exclude`, falling back to the configured list.
pub(crate) fn resolve_excludes(ctx: &AppContext, flag: &[String]) -> Vec<String> {
    let source = if flag.is_empty() {
        &ctx.config.retention.exclude
    } else {
        flag
    };

    source
        .iter()
        .map(|name| name.trim())
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect()
}

/// `names` plus the implicit `latest`.
pub(crate) fn with_implicit_exclude(mut names: Vec<String>) -> Vec<String> {
    if !names.iter().any(|n| n == IMPLICIT_EXCLUDE) {
        names.push(IMPLICIT_EXCLUDE.to_string());
    }
    names
}

/// Prints `message` as an error and exits with status 1.
pub(crate) fn fail(ctx: &AppContext, message: &str) -> ! {
    format::error(ctx, message);
    std::process::exit(1);
}

/// Prints rendered output, or fails if rendering did.
pub(crate) fn emit(ctx: &AppContext, rendered: Result<String, String>) {
    match rendered {
        Ok(text) => println!("{}", text.trim_end()),
        Err(e) => fail(ctx, &e),
    }
}
