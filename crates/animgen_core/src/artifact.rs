use url::Url;

/// Resolves an artifact locator reported by the service against the API origin.
///
/// Absolute `http`/`https` locators are returned verbatim. Scheme-relative
/// locators (`//host/path`) take the origin's scheme. Anything else is treated
/// as a path under the origin and appended to it.
pub fn resolve_artifact_url(origin: &Url, locator: &str) -> String {
    let locator = locator.trim();
    if is_absolute_network_locator(locator) {
        return locator.to_string();
    }
    if locator.starts_with("//") {
        return format!("{}:{}", origin.scheme(), locator);
    }

    let base = origin.as_str().trim_end_matches('/');
    if locator.starts_with('/') {
        format!("{base}{locator}")
    } else {
        format!("{base}/{locator}")
    }
}

fn is_absolute_network_locator(locator: &str) -> bool {
    match Url::parse(locator) {
        Ok(url) => matches!(url.scheme(), "http" | "https") && url.has_host(),
        Err(_) => false,
    }
}
