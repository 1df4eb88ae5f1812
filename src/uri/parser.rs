use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, instrument, trace};

use super::path::Path;
use super::query::Query;
use super::symbol::{AUTHORITY_PREFIX, PASSWORD_SEPARATOR, PORT_SEPARATOR, USER_INFO_SEPARATOR};
use super::value::{Uri, SCHEME_REGEX};
use crate::error::UriError;

/// Generic URI grammar from RFC 3986, Appendix B
static URI_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)^(?:(?P<scheme>[^:/?#]+):)?(?://(?P<authority>[^/?#]*))?(?P<path>[^?#]*)(?:\?(?P<query>[^#]*))?(?:#(?P<fragment>.*))?$")
        .unwrap()
});

/// Scheme-less `host:port[/path]` references, read as an authority
static HOST_PORT_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)^[^:/?#@\[\]]+:\d+(?:[/?#].*)?$").unwrap()
});

const INVALID_URI: &str = "Cannot create Uri instance, given URL is invalid";

/// Authority split into its parts
#[derive(Debug, Default, PartialEq, Eq)]
struct Authority {
    user: Option<String>,
    password: Option<String>,
    host: Option<String>,
    port: Option<u16>,
}

/// Parses a raw URI string into a [`Uri`]
///
/// Host and scheme are lowercased, path and query are parsed into their
/// structured forms, everything else is kept verbatim.
#[instrument(level = "debug", skip_all, fields(uri = %raw))]
pub fn parse(raw: &str) -> Result<Uri, UriError> {
    trace!("Starting URI parsing");

    let prefixed;
    let input = if HOST_PORT_REGEX.is_match(raw) {
        debug!("Reading scheme-less reference as host and port");
        prefixed = format!("{}{}", AUTHORITY_PREFIX, raw);
        prefixed.as_str()
    } else {
        raw
    };

    let captures = URI_REGEX
        .captures(input)
        .ok_or_else(|| invalid(raw, "does not follow the generic URI syntax"))?;

    let scheme = match captures.name("scheme") {
        Some(scheme) => Some(parse_scheme(scheme.as_str()).ok_or_else(|| {
            invalid(raw, &format!("scheme `{}` is not valid", scheme.as_str()))
        })?),
        None => None,
    };

    let authority = match captures.name("authority") {
        Some(authority) => parse_authority(authority.as_str()).map_err(|reason| invalid(raw, &reason))?,
        None => Authority::default(),
    };

    let path = captures
        .name("path")
        .map(|path| Path::parse(path.as_str()))
        .unwrap_or_default();

    let query = captures
        .name("query")
        .map(|query| query.as_str())
        .filter(|query| !query.is_empty())
        .map(Query::parse);

    let fragment = captures
        .name("fragment")
        .map(|fragment| fragment.as_str())
        .filter(|fragment| !fragment.is_empty())
        .map(str::to_string);

    debug!(
        "Parsed URI: scheme={:?}, host={:?}, port={:?}",
        scheme, authority.host, authority.port
    );

    Ok(Uri {
        scheme,
        user: authority.user,
        password: authority.password,
        host: authority.host,
        port: authority.port,
        path,
        query,
        fragment,
        original_uri: Some(raw.to_string()),
    })
}

/// Normalizes a host name
pub fn parse_host(host: &str) -> String {
    host.to_lowercase()
}

fn parse_scheme(scheme: &str) -> Option<String> {
    let scheme = scheme.to_lowercase();
    SCHEME_REGEX.is_match(&scheme).then_some(scheme)
}

fn parse_authority(authority: &str) -> Result<Authority, String> {
    let (user_info, host_port) = match authority.rsplit_once(USER_INFO_SEPARATOR) {
        Some((user_info, host_port)) => (Some(user_info), host_port),
        None => (None, authority),
    };

    let (host, port) = split_host_port(host_port);

    let port = match port {
        None | Some("") => None,
        Some(port) => Some(
            port.parse::<u16>()
                .map_err(|_| format!("port `{}` is not valid", port))?,
        ),
    };

    if host.is_empty() && (user_info.is_some() || port.is_some()) {
        return Err("user info or port given without a host".to_string());
    }

    let (user, password) = match user_info {
        Some(user_info) => match user_info.split_once(PASSWORD_SEPARATOR) {
            Some((user, password)) => (Some(user.to_string()), Some(password.to_string())),
            None => (Some(user_info.to_string()), None),
        },
        None => (None, None),
    };

    Ok(Authority {
        user,
        password,
        host: (!host.is_empty()).then(|| parse_host(host)),
        port,
    })
}

/// Splits `host[:port]`, keeping bracketed IPv6 literals intact
fn split_host_port(host_port: &str) -> (&str, Option<&str>) {
    if host_port.starts_with('[') {
        if let Some(end) = host_port.find(']') {
            let (host, rest) = host_port.split_at(end + 1);
            return (host, rest.strip_prefix(PORT_SEPARATOR));
        }
    }

    match host_port.rsplit_once(PORT_SEPARATOR) {
        Some((host, port)) => (host, Some(port)),
        None => (host_port, None),
    }
}

fn invalid(raw: &str, reason: &str) -> UriError {
    debug!("Rejecting URI '{}': {}", raw, reason);
    UriError::new(format!("{}: {}", INVALID_URI, reason), raw)
}
