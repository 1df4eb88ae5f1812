use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use tracing::debug;

use super::composer;
use super::encoding::normalize_user_info;
use super::parser;
use super::path::Path;
use super::query::Query;
use super::stringable::Stringable;
use super::symbol::{default_port_for_scheme, PASSWORD_SEPARATOR, PORT_SEPARATOR, USER_INFO_SEPARATOR};
use crate::error::{InvalidArgumentError, UriError};

/// Scheme grammar enforced on every stored scheme (after lowercasing)
pub(crate) static SCHEME_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-z][a-z0-9+.\-]+$").unwrap()
});

/// An immutable URI value
///
/// Every `with_*` method returns a new, independently owned value; the source
/// is never altered after construction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Uri {
    pub(crate) scheme: Option<String>,
    pub(crate) user: Option<String>,
    pub(crate) password: Option<String>,
    pub(crate) host: Option<String>,
    pub(crate) port: Option<u16>,
    pub(crate) path: Path,
    pub(crate) query: Option<Query>,
    pub(crate) fragment: Option<String>,
    pub(crate) original_uri: Option<String>,
}

/// Snapshot of every accessor, for serialization
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct UriComponents {
    pub scheme: String,
    pub user_info: String,
    pub authority: String,
    pub host: String,
    pub port: Option<u16>,
    pub path: String,
    pub file_extension: String,
    pub query: String,
    pub fragment: String,
    pub original_uri: Option<String>,
    pub is_absolute: bool,
    pub composed: String,
}

impl Uri {
    /// An URI with every component empty
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a raw URI string; the input is kept as the original URI
    pub fn parse(raw: &str) -> Result<Self, UriError> {
        parser::parse(raw)
    }

    /// Parses the text rendered by a [`Stringable`] value
    pub fn from_stringable(value: &dyn Stringable) -> Result<Self, UriError> {
        parser::parse(&value.render())
    }

    pub fn scheme(&self) -> &str {
        self.scheme.as_deref().unwrap_or("")
    }

    /// `user[:password]`, empty when there is no user
    pub fn user_info(&self) -> String {
        match (&self.user, &self.password) {
            (None, _) => String::new(),
            (Some(user), None) => user.clone(),
            (Some(user), Some(password)) => format!("{}{}{}", user, PASSWORD_SEPARATOR, password),
        }
    }

    /// `[user_info@]host[:port]`, with a default port left out
    pub fn authority(&self) -> String {
        let mut authority = String::new();
        if self.user.is_some() {
            authority.push_str(&self.user_info());
            authority.push(USER_INFO_SEPARATOR);
        }
        authority.push_str(self.host());
        if let Some(port) = self.port() {
            authority.push(PORT_SEPARATOR);
            authority.push_str(&port.to_string());
        }
        authority
    }

    pub fn host(&self) -> &str {
        self.host.as_deref().unwrap_or("")
    }

    /// The port, unless it is the registered default of the current scheme
    pub fn port(&self) -> Option<u16> {
        if self.is_default_port_for_scheme() {
            return None;
        }
        self.port
    }

    /// The encoded path with leading separators collapsed
    pub fn path(&self) -> String {
        self.path.compose()
    }

    /// The encoded path as stored. Only safe behind an authority.
    pub fn path_unsanitized(&self) -> String {
        self.path.compose_unsanitized()
    }

    pub fn path_value(&self) -> &Path {
        &self.path
    }

    pub fn query(&self) -> String {
        self.query.as_ref().map(Query::compose).unwrap_or_default()
    }

    /// The structured query; empty when the URI has none
    pub fn query_value(&self) -> Query {
        self.query.clone().unwrap_or_default()
    }

    pub fn fragment(&self) -> &str {
        self.fragment.as_deref().unwrap_or("")
    }

    /// The string this value was parsed from, if any
    pub fn original_uri(&self) -> Option<&str> {
        self.original_uri.as_deref()
    }

    pub fn is_absolute(&self) -> bool {
        !self.scheme().is_empty() || !self.authority().is_empty()
    }

    pub fn compose(&self) -> String {
        composer::compose(self)
    }

    pub fn components(&self) -> UriComponents {
        UriComponents {
            scheme: self.scheme().to_string(),
            user_info: self.user_info(),
            authority: self.authority(),
            host: self.host().to_string(),
            port: self.port(),
            path: self.path(),
            file_extension: self.path.file_extension().to_string(),
            query: self.query(),
            fragment: self.fragment().to_string(),
            original_uri: self.original_uri.clone(),
            is_absolute: self.is_absolute(),
            composed: self.compose(),
        }
    }

    /// Returns a copy with the scheme replaced; an empty scheme clears it
    pub fn with_scheme(&self, scheme: &str) -> Result<Self, InvalidArgumentError> {
        let mut instance = self.clone();
        if scheme.is_empty() {
            instance.scheme = None;
            return Ok(instance);
        }

        let scheme = scheme.to_lowercase();
        if !SCHEME_REGEX.is_match(&scheme) {
            debug!("Rejecting scheme: {}", scheme);
            return Err(InvalidArgumentError::InvalidScheme { scheme });
        }

        instance.scheme = Some(scheme);
        Ok(instance)
    }

    /// Returns a copy with the host replaced; an empty host clears it
    pub fn with_host(&self, host: &str) -> Self {
        let mut instance = self.clone();
        instance.host = (!host.is_empty()).then(|| parser::parse_host(host));
        instance
    }

    pub fn with_path(&self, path: &str) -> Self {
        self.with_path_value(Path::parse(path))
    }

    pub fn with_path_value(&self, path: Path) -> Self {
        let mut instance = self.clone();
        instance.path = path;
        instance
    }

    /// Returns a copy with the query replaced; an empty query clears it
    pub fn with_query(&self, query: &str) -> Self {
        let mut instance = self.clone();
        instance.query = (!query.is_empty()).then(|| Query::parse(query));
        instance
    }

    pub fn with_query_value(&self, query: Query) -> Self {
        let mut instance = self.clone();
        instance.query = Some(query);
        instance
    }

    /// Returns a copy with the user info replaced
    ///
    /// An empty user or password clears it. Characters that cannot appear raw
    /// in an authority are percent-encoded.
    pub fn with_user_info(&self, user: &str, password: Option<&str>) -> Self {
        let mut instance = self.clone();
        instance.user = (!user.is_empty()).then(|| normalize_user_info(user));
        instance.password = password
            .filter(|password| !password.is_empty())
            .map(normalize_user_info);
        instance
    }

    /// Returns a copy with the port replaced; `None` clears it
    pub fn with_port(&self, port: Option<i32>) -> Result<Self, InvalidArgumentError> {
        let port = match port {
            None => None,
            Some(port) => Some(u16::try_from(port).map_err(|_| {
                InvalidArgumentError::InvalidPort {
                    port: i64::from(port),
                }
            })?),
        };

        let mut instance = self.clone();
        instance.port = port;
        Ok(instance)
    }

    /// Returns a copy with the fragment replaced; an empty fragment clears it
    pub fn with_fragment(&self, fragment: &str) -> Self {
        let mut instance = self.clone();
        instance.fragment = (!fragment.is_empty()).then(|| fragment.to_string());
        instance
    }

    fn is_default_port_for_scheme(&self) -> bool {
        match self.port {
            Some(port) => default_port_for_scheme(self.scheme()) == Some(port),
            None => false,
        }
    }
}

impl fmt::Display for Uri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.compose())
    }
}

impl Stringable for Uri {
    fn render(&self) -> String {
        self.compose()
    }
}

impl FromStr for Uri {
    type Err = UriError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        parser::parse(raw)
    }
}

impl TryFrom<&str> for Uri {
    type Error = UriError;

    fn try_from(raw: &str) -> Result<Self, Self::Error> {
        parser::parse(raw)
    }
}

impl TryFrom<&url::Url> for Uri {
    type Error = UriError;

    fn try_from(url: &url::Url) -> Result<Self, Self::Error> {
        parser::parse(url.as_str())
    }
}
