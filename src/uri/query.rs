use serde_json::Value;
use std::fmt;
use tracing::trace;

use super::encoding::decode;
use super::query_parameter::QueryParameter;
use super::stringable::Stringable;
use super::symbol::{QUERY_ARRAY_SUFFIX, QUERY_KEYVALUE_SEPARATOR, QUERY_PAIR_SEPARATOR};
use crate::error::InvalidArgumentError;

/// The query component of a URI: unique keys in order of first appearance
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    parameters: Vec<QueryParameter>,
}

impl Query {
    pub fn new(parameters: Vec<QueryParameter>) -> Self {
        let mut query = Self::default();
        for parameter in parameters {
            query.bind(parameter);
        }
        query
    }

    /// Parses a raw query string (without the leading `?`)
    ///
    /// Keys ending in `[]` are collected into array parameters. A plain key
    /// seen again overwrites the earlier value in place.
    pub fn parse(query: &str) -> Self {
        trace!("Parsing query: {}", query);
        let mut parsed = Self::default();

        for pair in query.split(QUERY_PAIR_SEPARATOR) {
            if pair.is_empty() {
                continue;
            }

            let (raw_key, raw_value) = match pair.split_once(QUERY_KEYVALUE_SEPARATOR) {
                Some((key, value)) => (key, Some(value)),
                None => (pair, None),
            };
            let key = decode(raw_key);
            let value = raw_value.map(decode);

            match key.strip_suffix(QUERY_ARRAY_SUFFIX.as_bytes()) {
                Some(array_key) => parsed.append_to_array(array_key, value),
                None => parsed.bind(QueryParameter::from_decoded(key, vec![value], false)),
            }
        }

        parsed
    }

    pub fn has_parameter(&self, key: &str) -> bool {
        self.parameter(key).is_some()
    }

    pub fn parameter(&self, key: &str) -> Option<&QueryParameter> {
        self.parameters.iter().find(|parameter| parameter.key() == key)
    }

    pub fn parameters(&self) -> &[QueryParameter] {
        &self.parameters
    }

    pub fn len(&self) -> usize {
        self.parameters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parameters.is_empty()
    }

    /// Returns a copy with the parameter added, replacing one with the same key
    pub fn with_parameter(&self, parameter: QueryParameter) -> Self {
        let mut query = self.clone();
        query.bind(parameter);
        query
    }

    /// Returns a copy with `key` bound to a value of the matching variant
    pub fn with_parameter_key_and_value(
        &self,
        key: &str,
        value: impl Into<Value>,
    ) -> Result<Self, InvalidArgumentError> {
        let parameter = QueryParameter::create(key, value.into())?;
        Ok(self.with_parameter(parameter))
    }

    /// Returns a copy without `key`
    pub fn with_parameter_key_removed(&self, key: &str) -> Self {
        let mut query = self.clone();
        query.parameters.retain(|parameter| parameter.key() != key);
        query
    }

    pub fn compose(&self) -> String {
        self.parameters
            .iter()
            .map(QueryParameter::compose)
            .filter(|fragment| !fragment.is_empty())
            .collect::<Vec<_>>()
            .join(QUERY_PAIR_SEPARATOR.to_string().as_str())
    }

    fn position(&self, key: &str) -> Option<usize> {
        self.parameters.iter().position(|parameter| parameter.key() == key)
    }

    fn bind(&mut self, parameter: QueryParameter) {
        match self.position(parameter.key()) {
            Some(index) => self.parameters[index] = parameter,
            None => self.parameters.push(parameter),
        }
    }

    fn append_to_array(&mut self, key: &[u8], value: Option<Vec<u8>>) {
        let Some(index) = self.position(&String::from_utf8_lossy(key)) else {
            self.parameters
                .push(QueryParameter::from_decoded(key.to_vec(), vec![value], true));
            return;
        };

        // A scalar binding for the same key is folded into the array
        let existing = &self.parameters[index];
        let key = existing.key_bytes();
        let mut values = existing.value_bytes();
        values.push(value);
        self.parameters[index] = QueryParameter::from_decoded(key, values, true);
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.compose())
    }
}

impl Stringable for Query {
    fn render(&self) -> String {
        self.compose()
    }
}
