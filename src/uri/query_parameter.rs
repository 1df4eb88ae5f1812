use serde_json::Value;
use std::fmt;

use super::encoding::encode_query_component;
use super::stringable::Stringable;
use super::symbol::{QUERY_ARRAY_SUFFIX, QUERY_KEYVALUE_SEPARATOR, QUERY_PAIR_SEPARATOR};
use crate::error::InvalidArgumentError;

/// Typed value of a single query parameter
///
/// The variant is chosen once, from the shape of the input, and never changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryParameterValue {
    /// `key=value`, or a bare `key` when the value is absent
    String(Option<String>),
    Boolean(bool),
    /// Collected from `key[]=...` pairs
    Array(Vec<Option<String>>),
}

impl QueryParameterValue {
    pub fn as_bool(&self) -> bool {
        match self {
            Self::Boolean(value) => *value,
            Self::String(Some(value)) => !value.is_empty() && value != "0",
            Self::String(None) => false,
            Self::Array(values) => !values.is_empty(),
        }
    }

    pub fn as_int(&self) -> i64 {
        match self {
            Self::Boolean(value) => i64::from(*value),
            Self::String(Some(value)) => leading_integer(value),
            Self::String(None) => 0,
            Self::Array(values) => i64::from(!values.is_empty()),
        }
    }

    pub fn as_string(&self) -> String {
        match self {
            Self::Boolean(true) => "1".to_string(),
            Self::Boolean(false) => String::new(),
            Self::String(value) => value.clone().unwrap_or_default(),
            Self::Array(_) => self.as_int().to_string(),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::String(None))
    }
}

/// Reads the numeric prefix of a string the way a lenient integer cast does:
/// leading ASCII whitespace and a sign are accepted, a fraction or exponent
/// is applied before truncating, and anything after the number is ignored.
fn leading_integer(value: &str) -> i64 {
    let trimmed = value.trim_start_matches([' ', '\t', '\n', '\r', '\x0b', '\x0c']);
    let bytes = trimmed.as_bytes();

    let sign_len = usize::from(matches!(bytes.first(), Some(b'-' | b'+')));
    let integer_end = sign_len + digits_at(bytes, sign_len);
    let mut end = integer_end;

    let mut fraction_digits = 0;
    if bytes.get(end) == Some(&b'.') {
        fraction_digits = digits_at(bytes, end + 1);
        end += 1 + fraction_digits;
    }
    if integer_end == sign_len && fraction_digits == 0 {
        return 0;
    }

    let mut has_exponent = false;
    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let exponent_start = end + 1 + usize::from(matches!(bytes.get(end + 1), Some(b'-' | b'+')));
        let exponent_digits = digits_at(bytes, exponent_start);
        if exponent_digits > 0 {
            end = exponent_start + exponent_digits;
            has_exponent = true;
        }
    }

    if has_exponent || fraction_digits > 0 {
        // `as` saturates at the i64 bounds
        return trimmed[..end].parse::<f64>().map_or(0, |number| number as i64);
    }

    let saturated = if sign_len == 1 && bytes[0] == b'-' {
        i64::MIN
    } else {
        i64::MAX
    };
    trimmed[..integer_end].parse::<i64>().unwrap_or(saturated)
}

fn digits_at(bytes: &[u8], start: usize) -> usize {
    bytes
        .get(start..)
        .map_or(0, |rest| rest.iter().take_while(|byte| byte.is_ascii_digit()).count())
}

/// A query key together with its typed value
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryParameter {
    key: String,
    value: QueryParameterValue,
    /// Decoded bytes as parsed, only kept when they are not valid UTF-8
    raw: Option<RawParameter>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct RawParameter {
    key: Vec<u8>,
    values: Vec<Option<Vec<u8>>>,
}

impl QueryParameter {
    pub fn new(key: impl Into<String>, value: QueryParameterValue) -> Self {
        Self {
            key: key.into(),
            value,
            raw: None,
        }
    }

    /// Builds a `String` (or, for `array`, an `Array`) parameter from decoded bytes
    ///
    /// The text accessors see invalid UTF-8 as U+FFFD, while composing
    /// reproduces the original bytes.
    pub(crate) fn from_decoded(key: Vec<u8>, values: Vec<Option<Vec<u8>>>, array: bool) -> Self {
        let is_text = std::str::from_utf8(&key).is_ok()
            && values
                .iter()
                .flatten()
                .all(|value| std::str::from_utf8(value).is_ok());

        let mut texts: Vec<Option<String>> = values
            .iter()
            .map(|value| value.as_deref().map(|v| String::from_utf8_lossy(v).into_owned()))
            .collect();
        let value = if array {
            QueryParameterValue::Array(texts)
        } else {
            QueryParameterValue::String(texts.pop().flatten())
        };

        Self {
            key: String::from_utf8_lossy(&key).into_owned(),
            value,
            raw: (!is_text).then_some(RawParameter { key, values }),
        }
    }

    /// Builds a parameter from a dynamically shaped value
    ///
    /// Booleans become [`QueryParameterValue::Boolean`], arrays of strings or
    /// nulls become [`QueryParameterValue::Array`], strings and null become
    /// [`QueryParameterValue::String`]. Numbers and objects are rejected.
    pub fn create(key: impl Into<String>, value: Value) -> Result<Self, InvalidArgumentError> {
        let key = key.into();
        let value = match value {
            Value::Bool(flag) => QueryParameterValue::Boolean(flag),
            Value::Null => QueryParameterValue::String(None),
            Value::String(text) => QueryParameterValue::String(Some(text)),
            Value::Array(elements) => {
                let mut values = Vec::with_capacity(elements.len());
                for element in elements {
                    match element {
                        Value::String(text) => values.push(Some(text)),
                        Value::Null => values.push(None),
                        other => {
                            return Err(InvalidArgumentError::InvalidArrayElement {
                                kind: kind_of(&other),
                                key,
                            })
                        }
                    }
                }
                QueryParameterValue::Array(values)
            }
            other => {
                return Err(InvalidArgumentError::UnsupportedParameterType {
                    kind: kind_of(&other),
                    key,
                })
            }
        };
        Ok(Self::new(key, value))
    }

    /// Builds a string parameter from anything that can render itself as text
    pub fn create_from_stringable(key: impl Into<String>, value: &dyn Stringable) -> Self {
        Self::new(key, QueryParameterValue::String(Some(value.render())))
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn value(&self) -> &QueryParameterValue {
        &self.value
    }

    pub fn value_as_bool(&self) -> bool {
        self.value.as_bool()
    }

    pub fn value_as_int(&self) -> i64 {
        self.value.as_int()
    }

    pub fn value_as_string(&self) -> String {
        self.value.as_string()
    }

    /// Key bytes as they will be encoded
    pub(crate) fn key_bytes(&self) -> Vec<u8> {
        match &self.raw {
            Some(raw) => raw.key.clone(),
            None => self.key.as_bytes().to_vec(),
        }
    }

    /// One entry per rendered pair, `None` for a bare key
    pub(crate) fn value_bytes(&self) -> Vec<Option<Vec<u8>>> {
        if let Some(raw) = &self.raw {
            return raw.values.clone();
        }
        match &self.value {
            QueryParameterValue::Array(values) => values
                .iter()
                .map(|value| value.as_ref().map(|v| v.as_bytes().to_vec()))
                .collect(),
            QueryParameterValue::String(value) => {
                vec![value.as_ref().map(|v| v.as_bytes().to_vec())]
            }
            QueryParameterValue::Boolean(_) => vec![Some(self.value.as_string().into_bytes())],
        }
    }

    /// Renders the `key=value` fragment; arrays render one pair per element
    pub fn compose(&self) -> String {
        let mut key = self.key_bytes();
        if matches!(self.value, QueryParameterValue::Array(_)) {
            key.extend_from_slice(QUERY_ARRAY_SUFFIX.as_bytes());
        }
        let key = encode_query_component(&key);

        self.value_bytes()
            .iter()
            .map(|value| render_pair(&key, value.as_deref()))
            .collect::<Vec<_>>()
            .join(QUERY_PAIR_SEPARATOR.to_string().as_str())
    }
}

fn render_pair(encoded_key: &str, value: Option<&[u8]>) -> String {
    match value {
        Some(value) => format!(
            "{}{}{}",
            encoded_key,
            QUERY_KEYVALUE_SEPARATOR,
            encode_query_component(value)
        ),
        None => encoded_key.to_string(),
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(number) if number.is_f64() => "double",
        Value::Number(_) => "integer",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

impl fmt::Display for QueryParameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.compose())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parameter_casting() {
        // (value, is_null, as_bool, as_string, as_int)
        let cases = [
            (json!("foo"), false, true, "foo", 0),
            (json!("true"), false, true, "true", 0),
            (json!("false"), false, true, "false", 0),
            (json!("1"), false, true, "1", 1),
            (json!("0"), false, false, "0", 0),
            (json!(null), true, false, "", 0),
            (json!(true), false, true, "1", 1),
            (json!(false), false, false, "", 0),
        ];
        for (value, is_null, as_bool, as_string, as_int) in cases {
            let label = value.to_string();
            let parameter = QueryParameter::create("test", value).unwrap();
            assert_eq!(parameter.value().is_null(), is_null, "is_null of {}", label);
            assert_eq!(parameter.value_as_bool(), as_bool, "bool of {}", label);
            assert_eq!(parameter.value_as_string(), as_string, "string of {}", label);
            assert_eq!(parameter.value_as_int(), as_int, "int of {}", label);
        }
    }

    #[test]
    fn test_numeric_prefix() {
        assert_eq!(leading_integer("12abc"), 12);
        assert_eq!(leading_integer("  -7 apples"), -7);
        assert_eq!(leading_integer("+3"), 3);
        assert_eq!(leading_integer("abc"), 0);
        assert_eq!(leading_integer("99999999999999999999"), i64::MAX);
        assert_eq!(leading_integer("-99999999999999999999"), i64::MIN);
    }

    #[test]
    fn test_numeric_prefix_with_fraction_and_exponent() {
        assert_eq!(leading_integer("1e3"), 1000);
        assert_eq!(leading_integer("2.5E2px"), 250);
        assert_eq!(leading_integer("1.9"), 1);
        assert_eq!(leading_integer("-1.9"), -1);
        assert_eq!(leading_integer(".5e1"), 5);
        assert_eq!(leading_integer("5e"), 5);
        assert_eq!(leading_integer("7e-1"), 0);
        assert_eq!(leading_integer("1e400"), i64::MAX);
        assert_eq!(leading_integer("."), 0);
        assert_eq!(leading_integer("\u{a0}12"), 0);
        assert_eq!(leading_integer("\t\n12"), 12);
    }

    #[test]
    fn test_array_coercion() {
        let empty = QueryParameterValue::Array(Vec::new());
        assert!(!empty.as_bool());
        assert_eq!(empty.as_string(), "0");

        let filled = QueryParameterValue::Array(vec![None]);
        assert!(filled.as_bool());
        assert_eq!(filled.as_int(), 1);
    }

    #[test]
    fn test_variant_selected_from_shape() {
        let array = QueryParameter::create("ids", json!(["a", null])).unwrap();
        assert_eq!(
            array.value(),
            &QueryParameterValue::Array(vec![Some("a".to_string()), None])
        );

        let flag = QueryParameter::create("debug", json!(true)).unwrap();
        assert_eq!(flag.value(), &QueryParameterValue::Boolean(true));
    }

    #[test]
    fn test_unsupported_kinds_are_rejected() {
        let err = QueryParameter::create("page", json!(3)).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Unsupported query parameter of type `integer` for key `page`"
        );

        let err = QueryParameter::create("ratio", json!(0.5)).unwrap_err();
        assert!(err.to_string().contains("`double`"));

        let err = QueryParameter::create("ids", json!(["a", 1])).unwrap_err();
        assert_eq!(
            err,
            InvalidArgumentError::InvalidArrayElement {
                kind: "integer",
                key: "ids".to_string()
            }
        );
    }

    #[test]
    fn test_create_from_stringable() {
        let parameter = QueryParameter::create_from_stringable("name", &"value".to_string());
        assert_eq!(parameter.compose(), "name=value");
    }

    #[test]
    fn test_compose() {
        let bare = QueryParameter::new("blubb", QueryParameterValue::String(None));
        assert_eq!(bare.compose(), "blubb");

        let empty = QueryParameter::new("blah", QueryParameterValue::String(Some(String::new())));
        assert_eq!(empty.compose(), "blah=");

        let flag = QueryParameter::new("on", QueryParameterValue::Boolean(true));
        assert_eq!(flag.compose(), "on=1");

        let list = QueryParameter::new(
            "foo",
            QueryParameterValue::Array(vec![Some("bar".to_string()), None]),
        );
        assert_eq!(list.compose(), "foo%5B%5D=bar&foo%5B%5D");
    }

    #[test]
    fn test_decoded_bytes_are_composed_verbatim() {
        let latin1 =
            QueryParameter::from_decoded(b"name".to_vec(), vec![Some(b"caf\xe9".to_vec())], false);
        assert_eq!(latin1.compose(), "name=caf%E9");
        assert_eq!(latin1.value_as_string(), "caf\u{fffd}");

        let utf8 = QueryParameter::from_decoded(b"name".to_vec(), vec![Some("café".into())], false);
        assert_eq!(utf8, QueryParameter::new("name", QueryParameterValue::String(Some("café".into()))));
    }
}
