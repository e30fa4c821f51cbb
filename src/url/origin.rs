use url::Url;

/// Returns the origin (`scheme://host[:port]`) of a URL
///
/// The origin scopes the robots.txt cache and per-origin pacing. Default
/// ports are omitted, so `https://a.com` and `https://a.com:443` share one.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use netr::url::origin_of;
///
/// let url = Url::parse("https://EXAMPLE.com/path?q=1").unwrap();
/// assert_eq!(origin_of(&url), "https://example.com");
///
/// let url = Url::parse("http://127.0.0.1:8080/a").unwrap();
/// assert_eq!(origin_of(&url), "http://127.0.0.1:8080");
/// ```
pub fn origin_of(url: &Url) -> String {
    url.origin().ascii_serialization()
}

/// Returns the robots.txt location for a URL's origin
pub fn robots_url(url: &Url) -> Option<Url> {
    url.join("/robots.txt").ok()
}
