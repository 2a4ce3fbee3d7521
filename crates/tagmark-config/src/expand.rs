//! `${VAR}` expansion in configuration strings.

use crate::ConfigError;

/// Expand environment variable references in `value`.
///
/// - `${VAR}` expands to the value of VAR, errors if unset
/// - `${VAR:-default}` falls back to `default` when VAR is unset
///
/// Any other `$`, such as a bare `$VAR`, is kept literally.
pub(crate) fn expand_env(value: &str, field: &str) -> Result<String, ConfigError> {
    if !value.contains("${") {
        return Ok(value.to_owned());
    }

    shellexpand::env_with_context(&escape_bare_dollars(value), |var| {
        std::env::var(var)
            .map(Some)
            .map_err(|_| UnsetVar(var.to_owned()))
    })
    .map(std::borrow::Cow::into_owned)
    .map_err(|e| ConfigError::EnvVar {
        field: field.to_owned(),
        message: format!("${{{}}} not set", e.cause.0),
    })
}

/// Double every `$` not followed by `{`; shellexpand reads `$$` as `$`.
fn escape_bare_dollars(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars().peekable();
    while let Some(c) = chars.next() {
        out.push(c);
        if c == '$' && chars.peek() != Some(&'{') {
            out.push('$');
        }
    }
    out
}

/// Lookup failure for a variable with no default.
struct UnsetVar(String);
