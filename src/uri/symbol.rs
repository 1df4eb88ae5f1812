// Separators used when splitting and joining URI components
pub const SCHEME_SEPARATOR: char = ':';
pub const AUTHORITY_PREFIX: &str = "//";
pub const USER_INFO_SEPARATOR: char = '@';
pub const PASSWORD_SEPARATOR: char = ':';
pub const PORT_SEPARATOR: char = ':';

pub const PATH_SEPARATOR: char = '/';

pub const QUERY_SEPARATOR: char = '?';
pub const QUERY_PAIR_SEPARATOR: char = '&';
pub const QUERY_KEYVALUE_SEPARATOR: char = '=';
pub const QUERY_ARRAY_SUFFIX: &str = "[]";

pub const FRAGMENT_SEPARATOR: char = '#';

/// Registered default ports, as (scheme, port) pairs
pub const DEFAULT_SCHEME_PORTS: [(&str, u16); 4] = [
    ("http", 80),
    ("https", 443),
    ("ftp", 21),
    ("ssh", 22),
];

/// Looks up the registered default port of a scheme
pub fn default_port_for_scheme(scheme: &str) -> Option<u16> {
    DEFAULT_SCHEME_PORTS
        .iter()
        .find(|(name, _)| *name == scheme)
        .map(|(_, port)| *port)
}

/// Looks up the scheme a port is registered as default for
pub fn scheme_for_default_port(port: u16) -> Option<&'static str> {
    DEFAULT_SCHEME_PORTS
        .iter()
        .find(|(_, default)| *default == port)
        .map(|(name, _)| *name)
}
