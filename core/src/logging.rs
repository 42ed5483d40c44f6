//! Logging setup for test suites and tools built on this crate.

use tracing_subscriber::EnvFilter;

/// Environment variable read before falling back to the default directive.
pub const LOG_ENV: &str = "APIPROBE_LOG";

/// Transport crates are capped at `warn` unless a directive names them.
const QUIET_TRANSPORT: [&str; 2] = ["ureq=warn", "hyper=warn"];

/// Build the filter `init` installs.
pub fn env_filter(default_directive: &str) -> EnvFilter {
    if let Ok(filter) = EnvFilter::try_from_env(LOG_ENV) {
        return filter;
    }
    let mut directives = vec![default_directive.to_string()];
    for quiet in QUIET_TRANSPORT {
        let target = quiet.split('=').next().unwrap_or_default();
        if !default_directive.contains(target) {
            directives.push(quiet.to_string());
        }
    }
    EnvFilter::new(directives.join(","))
}

/// Install a global fmt subscriber. Returns `false` if one was already set.
pub fn init(default_directive: &str) -> bool {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter(default_directive))
        .try_init()
        .is_ok()
}
