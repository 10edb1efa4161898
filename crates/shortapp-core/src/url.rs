// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Manifest URL normalization.
//
// Dev servers hand out `exp://` / `exps://` links, but the native launcher
// fetches manifests with a plain HTTP client. This module rewrites those
// custom schemes into http/https and upgrades the hosted-update domains to
// TLS.

use ::url::Url;
use tracing::debug;

use crate::config::DEFAULT_HTTPS_HOSTS;
use crate::error::{Result, ShortAppError};

/// Prefix rewrites, checked in order. Longer `scheme://` forms come before
/// their bare-colon counterparts.
const SCHEME_REWRITES: &[(&str, &str)] = &[
    ("exp://", "http://"),
    ("expo://", "http://"),
    ("exps://", "https://"),
    ("exp:", "http://"),
    ("expo:", "http://"),
    ("exps:", "https://"),
];

/// Normalize a manifest or bundle URL against the default trusted hosts.
pub fn normalize_exp_url(raw: &str) -> Result<String> {
    normalize_exp_url_with(raw, DEFAULT_HTTPS_HOSTS)
}

/// Normalize a manifest or bundle URL into an http/https URL.
///
/// - `exp://`, `expo://`, `exp:`, `expo:` become `http://`
/// - `exps://`, `exps:` become `https://`
/// - input without any `scheme://` defaults to `http://`
/// - hosts ending in one of `trusted_hosts` are forced to `https`
///
/// If the rewritten string still fails to parse as a URL it is returned as-is.
pub fn normalize_exp_url_with<S: AsRef<str>>(raw: &str, trusted_hosts: &[S]) -> Result<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ShortAppError::MissingParameter("bundleUrl"));
    }

    let mut rewritten = rewrite_scheme(trimmed);
    if !has_scheme(&rewritten) {
        rewritten = format!("http://{rewritten}");
    }

    let mut parsed = match Url::parse(&rewritten) {
        Ok(u) => u,
        Err(e) => {
            debug!(url = %rewritten, error = %e, "URL did not parse, returning unparsed");
            return Ok(rewritten);
        }
    };

    // Match on host[:port]; an explicit non-default port keeps the scheme.
    let host = match (parsed.host_str(), parsed.port()) {
        (Some(host), Some(port)) => Some(format!("{host}:{port}")),
        (Some(host), None) => Some(host.to_string()),
        (None, _) => None,
    };
    let trusted =
        host.is_some_and(|host| trusted_hosts.iter().any(|h| host.ends_with(h.as_ref())));
    if trusted && parsed.scheme() != "https" && parsed.set_scheme("https").is_err() {
        debug!(url = %parsed, "could not upgrade scheme to https");
    }

    Ok(parsed.into())
}

fn rewrite_scheme(input: &str) -> String {
    for (from, to) in SCHEME_REWRITES {
        let matches = input
            .get(..from.len())
            .is_some_and(|head| head.eq_ignore_ascii_case(from));
        if matches {
            return format!("{to}{}", &input[from.len()..]);
        }
    }
    input.to_string()
}

/// `[A-Za-z][A-Za-z0-9+.-]*://` at the start of the string.
fn has_scheme(input: &str) -> bool {
    let Some(end) = input.find("://") else {
        return false;
    };
    let scheme = &input[..end];
    let mut chars = scheme.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '.' | '-'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exp_scheme_becomes_http() {
        let out = normalize_exp_url("exp://192.168.1.5:8081/manifest.json").unwrap();
        assert_eq!(out, "http://192.168.1.5:8081/manifest.json");
    }

    #[test]
    fn scheme_mapping_is_case_insensitive() {
        assert_eq!(
            normalize_exp_url("EXPO://10.0.0.2:8081/index").unwrap(),
            "http://10.0.0.2:8081/index"
        );
        assert_eq!(
            normalize_exp_url("Exps://example.com/m.json").unwrap(),
            "https://example.com/m.json"
        );
    }

    #[test]
    fn bare_colon_forms_are_rewritten() {
        assert_eq!(
            normalize_exp_url("exp:dev.local/m").unwrap(),
            "http://dev.local/m"
        );
        assert_eq!(
            normalize_exp_url("expo:dev.local/m").unwrap(),
            "http://dev.local/m"
        );
        assert_eq!(
            normalize_exp_url("exps:dev.local/m").unwrap(),
            "https://dev.local/m"
        );
    }

    #[test]
    fn missing_scheme_on_trusted_host_is_https() {
        assert_eq!(
            normalize_exp_url("u.expo.dev/abc").unwrap(),
            "https://u.expo.dev/abc"
        );
    }

    #[test]
    fn missing_scheme_defaults_to_http() {
        assert_eq!(
            normalize_exp_url("example.com/app/manifest").unwrap(),
            "http://example.com/app/manifest"
        );
    }

    #[test]
    fn trusted_hosts_always_get_https() {
        for input in [
            "http://exp.host/@me/app",
            "exp://exp.host/@me/app",
            "expo://u.expo.dev/update",
            "http://abc.exp.direct/index",
            "https://expo.dev/x",
        ] {
            let out = normalize_exp_url(input).unwrap();
            assert!(out.starts_with("https://"), "{input} -> {out}");
        }
    }

    #[test]
    fn trusted_host_on_custom_port_keeps_http() {
        assert_eq!(
            normalize_exp_url("exp://u.expo.dev:8080/abc").unwrap(),
            "http://u.expo.dev:8080/abc"
        );
        assert_eq!(
            normalize_exp_url("u.expo.dev:19000/abc").unwrap(),
            "http://u.expo.dev:19000/abc"
        );
        // Default ports are dropped by the parser, so the host still matches.
        assert_eq!(
            normalize_exp_url("exp://u.expo.dev:80/abc").unwrap(),
            "https://u.expo.dev/abc"
        );
    }

    #[test]
    fn untrusted_http_is_left_alone() {
        let out = normalize_exp_url("http://example.com/manifest").unwrap();
        assert_eq!(out, "http://example.com/manifest");
    }

    #[test]
    fn trusted_https_is_idempotent() {
        let once = normalize_exp_url("https://u.expo.dev/abc?platform=ios").unwrap();
        let twice = normalize_exp_url(&once).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn surrounding_whitespace_is_trimmed() {
        assert_eq!(
            normalize_exp_url("  exp://10.0.0.2:8081/m  ").unwrap(),
            "http://10.0.0.2:8081/m"
        );
    }

    #[test]
    fn empty_input_is_rejected() {
        assert!(matches!(
            normalize_exp_url(""),
            Err(ShortAppError::MissingParameter(_))
        ));
        assert!(normalize_exp_url("   ").is_err());
    }

    #[test]
    fn unparseable_url_is_returned_unchanged() {
        let out = normalize_exp_url("exp://exa mple.com/m").unwrap();
        assert_eq!(out, "http://exa mple.com/m");
    }

    #[test]
    fn custom_trusted_hosts() {
        let out = normalize_exp_url_with("http://cdn.example.org/m", &["example.org"]).unwrap();
        assert_eq!(out, "https://cdn.example.org/m");
    }

    #[test]
    fn scheme_detection() {
        assert!(has_scheme("http://x"));
        assert!(has_scheme("git+ssh://x"));
        assert!(!has_scheme("1abc://x"));
        assert!(!has_scheme("example.com/path?next=http://x"));
        assert!(!has_scheme("example.com"));
    }
}
