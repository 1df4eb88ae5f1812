use super::symbol::{AUTHORITY_PREFIX, FRAGMENT_SEPARATOR, PATH_SEPARATOR, QUERY_SEPARATOR, SCHEME_SEPARATOR};
use super::value::Uri;

/// Assembles a [`Uri`] into its canonical string
///
/// Absolute URIs emit the path unsanitized since the authority already
/// disambiguates it; relative ones collapse leading separators so the path
/// cannot be read as a protocol-relative authority.
pub fn compose(uri: &Uri) -> String {
    let mut composed = String::new();

    if uri.is_absolute() {
        add_scheme(&mut composed, uri);
        add_authority(&mut composed, uri);
        add_path_for_absolute_uri(&mut composed, uri);
    } else {
        composed.push_str(&uri.path());
    }

    add_query(&mut composed, uri);
    add_fragment(&mut composed, uri);
    composed
}

fn add_scheme(buffer: &mut String, uri: &Uri) {
    let scheme = uri.scheme();
    if !scheme.is_empty() {
        buffer.push_str(scheme);
        buffer.push(SCHEME_SEPARATOR);
    }
}

fn add_authority(buffer: &mut String, uri: &Uri) {
    let authority = uri.authority();
    if !authority.is_empty() {
        buffer.push_str(AUTHORITY_PREFIX);
        buffer.push_str(&authority);
    }
}

fn add_path_for_absolute_uri(buffer: &mut String, uri: &Uri) {
    let path = uri.path_unsanitized();
    if path.is_empty() {
        return;
    }
    if !path.starts_with(PATH_SEPARATOR) {
        buffer.push(PATH_SEPARATOR);
    }
    buffer.push_str(&path);
}

fn add_query(buffer: &mut String, uri: &Uri) {
    let query = uri.query();
    if !query.is_empty() {
        buffer.push(QUERY_SEPARATOR);
        buffer.push_str(&query);
    }
}

fn add_fragment(buffer: &mut String, uri: &Uri) {
    let fragment = uri.fragment();
    if !fragment.is_empty() {
        buffer.push(FRAGMENT_SEPARATOR);
        buffer.push_str(fragment);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absolute_uri_with_relative_path() {
        let uri = Uri::parse("https://www.example.com").unwrap().with_path("foo");
        assert_eq!(compose(&uri), "https://www.example.com/foo");
    }

    #[test]
    fn test_relative_uri_with_absolute_path() {
        assert_eq!(compose(&Uri::parse("/foo").unwrap()), "/foo");
    }

    #[test]
    fn test_relative_uri_collapses_leading_separators() {
        let uri = Uri::new().with_path("//evil.example.com/login");
        assert_eq!(compose(&uri), "/evil.example.com/login");
    }

    #[test]
    fn test_absolute_uri_keeps_empty_segments() {
        let uri = Uri::parse("http://example.com//double//slash").unwrap();
        assert_eq!(compose(&uri), "http://example.com//double//slash");
    }

    #[test]
    fn test_default_port_is_elided() {
        let uri = Uri::parse("https://www.example.com:443/foo/").unwrap();
        assert_eq!(compose(&uri), "https://www.example.com/foo/");
        assert_eq!(uri.original_uri(), Some("https://www.example.com:443/foo/"));
    }

    #[test]
    fn test_query_and_fragment_only() {
        let uri = Uri::new().with_query("a=1").with_fragment("frag");
        assert_eq!(compose(&uri), "?a=1#frag");
    }

    #[test]
    fn test_empty_uri() {
        assert_eq!(compose(&Uri::new()), "");
    }
}
