use url::Url;

/// Render a connection string for logs with any password masked.
///
/// Strings that do not parse as URLs are returned unchanged; they cannot carry userinfo.
pub fn redact_url(raw: &str) -> String {
    let Ok(mut url) = Url::parse(raw) else {
        return raw.to_string();
    };
    if url.password().is_some() && url.set_password(Some("***")).is_err() {
        return "<unprintable url>".to_string();
    }
    url.to_string()
}
