use percent_encoding::{percent_encode, percent_encode_byte, AsciiSet, NON_ALPHANUMERIC};

/// Bytes left raw in path segments: RFC 3986 unreserved plus sub-delims
const PATH_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~')
    .remove(b'!')
    .remove(b'$')
    .remove(b'&')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')')
    .remove(b'*')
    .remove(b'+')
    .remove(b',')
    .remove(b';')
    .remove(b'=');

/// Percent-decodes a component to bytes. `+` is not treated as a space and
/// malformed triplets are kept as they are. The result need not be UTF-8.
pub fn decode(input: &str) -> Vec<u8> {
    urlencoding::decode_binary(input.as_bytes()).into_owned()
}

/// Encodes a decoded path segment, emitting lowercase hex digits
pub fn encode_path_segment(segment: &[u8]) -> String {
    let encoded = percent_encode(segment, PATH_SEGMENT).to_string();
    lowercase_percent_triplets(&encoded)
}

/// Raw URL encoding for query keys and values: everything but unreserved
/// characters is encoded with uppercase hex digits
pub fn encode_query_component(component: &[u8]) -> String {
    urlencoding::encode_binary(component).into_owned()
}

/// Encodes user-info characters that may not appear raw in an authority while
/// keeping existing valid percent-encoded triplets untouched
pub fn normalize_user_info(user_info: &str) -> String {
    let bytes = user_info.as_bytes();
    let mut normalized = String::with_capacity(bytes.len());
    let mut index = 0;

    while let Some(&byte) = bytes.get(index) {
        if byte == b'%' && is_hex_at(bytes, index + 1) && is_hex_at(bytes, index + 2) {
            normalized.push_str(&user_info[index..index + 3]);
            index += 3;
            continue;
        }

        if is_unreserved(byte) || is_sub_delim(byte) {
            normalized.push(byte as char);
        } else {
            normalized.push_str(percent_encode_byte(byte));
        }
        index += 1;
    }

    normalized
}

fn lowercase_percent_triplets(encoded: &str) -> String {
    let mut output = String::with_capacity(encoded.len());
    let mut remaining = 0;
    for ch in encoded.chars() {
        if ch == '%' {
            remaining = 2;
            output.push(ch);
        } else if remaining > 0 {
            remaining -= 1;
            output.push(ch.to_ascii_lowercase());
        } else {
            output.push(ch);
        }
    }
    output
}

fn is_hex_at(bytes: &[u8], index: usize) -> bool {
    bytes.get(index).is_some_and(|b| b.is_ascii_hexdigit())
}

fn is_unreserved(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || matches!(byte, b'-' | b'.' | b'_' | b'~')
}

fn is_sub_delim(byte: u8) -> bool {
    matches!(
        byte,
        b'!' | b'$' | b'&' | b'\'' | b'(' | b')' | b'*' | b'+' | b',' | b';' | b'='
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_keeps_plus_and_malformed_triplets() {
        assert_eq!(decode("foo%20bar"), b"foo bar");
        assert_eq!(decode("a+b"), b"a+b");
        assert_eq!(decode("100%"), b"100%");
        assert_eq!(decode("%zz"), b"%zz");
    }

    #[test]
    fn test_non_utf8_escapes_survive_decoding() {
        assert_eq!(decode("caf%e9"), b"caf\xe9");
        assert_eq!(encode_path_segment(&decode("caf%E9")), "caf%e9");
        assert_eq!(encode_query_component(&decode("caf%e9")), "caf%E9");
    }

    #[test]
    fn test_path_segment_hex_is_lowercase() {
        assert_eq!(encode_path_segment("bür".as_bytes()), "b%c3%bcr");
        assert_eq!(encode_path_segment(b"foo/bar"), "foo%2fbar");
        assert_eq!(encode_path_segment(b"a+b$c"), "a+b$c");
        assert_eq!(encode_path_segment(b"100%"), "100%25");
    }

    #[test]
    fn test_query_component_hex_is_uppercase() {
        assert_eq!(encode_query_component("schildkröte".as_bytes()), "schildkr%C3%B6te");
        assert_eq!(encode_query_component(b"fu/bar"), "fu%2Fbar");
        assert_eq!(encode_query_component(b"i exist"), "i%20exist");
    }

    #[test]
    fn test_user_info_normalization() {
        assert_eq!(normalize_user_info("iGoR"), "iGoR");
        assert_eq!(normalize_user_info("a b"), "a%20b");
        assert_eq!(normalize_user_info("we%20ll"), "we%20ll");
        assert_eq!(normalize_user_info("50%"), "50%25");
        assert_eq!(normalize_user_info("us@r:x"), "us%40r%3Ax");
    }
}
