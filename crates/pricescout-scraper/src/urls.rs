//! URL helpers: absolutizing listing URLs, origins and hosts.

use reqwest::Url;

/// Whether `raw` already carries a scheme (`https:`, `http:`, `data:`, ...).
#[must_use]
pub fn has_scheme(raw: &str) -> bool {
    let Some((scheme, _)) = raw.split_once(':') else {
        return false;
    };
    let mut chars = scheme.chars();
    chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
}

/// Resolves `raw` against `base` unless it is already absolute.
///
/// Protocol-relative URLs (`//cdn.example.com/a.png`) take the base's scheme.
/// Empty input yields `None`, as does a relative URL that cannot be joined
/// onto an unparseable base. Anything that does not end up with a host
/// (`data:`, `javascript:`, `mailto:`) is dropped. Absolute input is
/// returned unchanged, so resolving an already-resolved URL is a no-op.
#[must_use]
pub fn resolve_url(raw: &str, base: &str) -> Option<String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if has_scheme(raw) {
        return Url::parse(raw)
            .ok()
            .filter(Url::has_host)
            .map(|_| raw.to_string());
    }

    let base_url = Url::parse(base).ok()?;
    let resolved = match raw.strip_prefix("//") {
        Some(rest) => Url::parse(&format!("{}://{rest}", base_url.scheme())).ok()?,
        None => base_url.join(raw).ok()?,
    };
    resolved.has_host().then(|| resolved.into())
}

/// `scheme://host[:port]` of an absolute URL, or `None` for anything that
/// does not parse or has no host.
#[must_use]
pub fn origin_of(raw: &str) -> Option<String> {
    let url = Url::parse(raw).ok()?;
    url.has_host().then(|| url.origin().ascii_serialization())
}

/// Host name of `raw` for error messages; the input itself if it has none.
pub(crate) fn host_or_raw(raw: &str) -> String {
    Url::parse(raw)
        .ok()
        .and_then(|u| u.host_str().map(str::to_owned))
        .unwrap_or_else(|| raw.to_owned())
}
