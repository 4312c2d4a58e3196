/// Checks if a host is covered by an allowed-domain entry
///
/// An entry covers the domain itself and every subdomain of it. A leading
/// `*.` is accepted and means the same thing. Entries may carry a port
/// (`127.0.0.1:8080`), in which case the candidate must be a network
/// location with that exact port.
///
/// # Arguments
///
/// * `pattern` - The allowed-domain entry, optionally starting with "*."
/// * `candidate` - The lowercase host (or `host:port`) to check
///
/// # Examples
///
/// ```
/// use webharvest::url::matches_allowed_domain;
///
/// assert!(matches_allowed_domain("example.com", "example.com"));
/// assert!(matches_allowed_domain("example.com", "blog.example.com"));
/// assert!(matches_allowed_domain("*.example.com", "api.v2.example.com"));
/// assert!(!matches_allowed_domain("example.com", "myexample.com"));
/// ```
pub fn matches_allowed_domain(pattern: &str, candidate: &str) -> bool {
    let base = pattern.strip_prefix("*.").unwrap_or(pattern);
    if base.is_empty() {
        return false;
    }
    candidate == base || candidate.ends_with(&format!(".{}", base))
}
