use gamescout_config::{CONSOLE_PLACEHOLDER, QUERY_PLACEHOLDER};
use gamescout_http::HttpError;
use url::Url;

/// Fill the natural-language query template with the console name.
///
/// ```
/// use gamescout_web::query::build_query;
///
/// let q = build_query("most popular video game for {console}", "Game Boy");
/// assert_eq!(q, "most popular video game for Game Boy");
/// ```
pub fn build_query(template: &str, console: &str) -> String {
    template.replace(CONSOLE_PLACEHOLDER, console)
}

/// Percent-encode `query` and splice it into `url_template`.
///
/// Spaces become `%20`; only RFC 3986 unreserved characters pass through.
pub fn build_search_url(url_template: &str, query: &str) -> Result<Url, HttpError> {
    let encoded = urlencoding::encode(query);
    let raw = url_template.replace(QUERY_PLACEHOLDER, &encoded);
    Url::parse(&raw).map_err(|e| HttpError::Url(format!("{e}: {raw}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    const GOOGLE: &str = "https://www.google.com/search?q={query}";

    #[test]
    fn spaces_are_percent_encoded() {
        let url = build_search_url(GOOGLE, "most popular video game for PS5").unwrap();
        assert_eq!(
            url.as_str(),
            "https://www.google.com/search?q=most%20popular%20video%20game%20for%20PS5"
        );
    }

    #[test]
    fn reserved_characters_do_not_leak_into_the_query_string() {
        let url = build_search_url(GOOGLE, "a&b=c/d?e#f").unwrap();
        assert_eq!(url.query(), Some("q=a%26b%3Dc%2Fd%3Fe%23f"));
        assert!(url.fragment().is_none());

        let pairs: Vec<_> = url.query_pairs().collect();
        assert_eq!(pairs.len(), 1);
        assert_eq!(pairs[0].1, "a&b=c/d?e#f");
    }

    #[test]
    fn non_ascii_console_names_round_trip_through_the_url() {
        let url = build_search_url(GOOGLE, "ファミコン").unwrap();
        let (_, value) = url.query_pairs().next().unwrap();
        assert_eq!(value, "ファミコン");
    }

    #[test]
    fn console_name_is_not_sanitized() {
        let q = build_query("most popular video game for {console}", "  Sega   Saturn ");
        assert_eq!(q, "most popular video game for   Sega   Saturn ");
    }

    #[test]
    fn unparsable_template_is_a_url_error() {
        let err = build_search_url("not a url {query}", "snes").unwrap_err();
        assert!(matches!(err, HttpError::Url(_)));
    }
}
