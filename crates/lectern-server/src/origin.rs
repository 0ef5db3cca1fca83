//! Request origin validation for playlist and segment endpoints.
//!
//! The playlist/segment routes are unauthenticated at the HTTP layer (the
//! stream token is the credential), so they additionally check the request
//! origin against a configured allow-list. Every rejection branch is
//! reported to the client with the same generic message so the check cannot
//! be used as a probing oracle.

/// Does the request pass the origin allow-list?
///
/// A literal `"*"` entry disables the check. Otherwise the candidate origin
/// is taken from the `Origin` header, falling back to the origin part of
/// `Referer`; no derivable origin means rejection.
pub fn validate_origin(allowed: &[String], origin: Option<&str>, referer: Option<&str>) -> bool {
    if allowed.iter().any(|entry| entry == "*") {
        return true;
    }

    let Some(candidate) = derive_origin(origin, referer) else {
        return false;
    };

    let candidate = normalize(&candidate);
    allowed.iter().any(|entry| normalize(entry) == candidate)
}

/// Candidate origin for a request: the `Origin` header when present,
/// otherwise scheme + host (+ non-default port) parsed out of `Referer`.
pub fn derive_origin(origin: Option<&str>, referer: Option<&str>) -> Option<String> {
    if let Some(o) = origin {
        let o = o.trim();
        if !o.is_empty() {
            return Some(o.to_string());
        }
    }
    referer.and_then(origin_from_referer)
}

/// Comparison form: trailing slashes stripped, lowercased.
fn normalize(origin: &str) -> String {
    origin.trim().trim_end_matches('/').to_ascii_lowercase()
}

/// Extract `scheme://host[:port]` from a referer URL, dropping the port
/// when it is the scheme default.
fn origin_from_referer(referer: &str) -> Option<String> {
    let (scheme, rest) = referer.trim().split_once("://")?;
    let authority = rest.split(['/', '?', '#']).next()?;
    if authority.is_empty() {
        return None;
    }

    let authority = match (scheme, authority.rsplit_once(':')) {
        ("http", Some((host, "80"))) => host,
        ("https", Some((host, "443"))) => host,
        _ => authority,
    };

    Some(format!("{scheme}://{authority}"))
}
