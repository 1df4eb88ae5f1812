use std::borrow::Cow;
use std::fmt;
use tracing::trace;

use super::encoding::{decode, encode_path_segment};
use super::stringable::Stringable;
use super::symbol::PATH_SEPARATOR;

/// The path component of a URI
///
/// Segments are stored as decoded bytes so that re-composing an already
/// encoded path never encodes it twice, and escapes that do not form UTF-8
/// come back out unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Path {
    absolute: bool,
    has_trailing_separator: bool,
    segments: Vec<Vec<u8>>,
    file_extension: String,
}

impl Path {
    /// Builds a path directly from its flags and decoded segments
    pub fn new(absolute: bool, has_trailing_separator: bool, segments: Vec<String>) -> Self {
        Self::from_decoded(
            absolute,
            has_trailing_separator,
            segments.into_iter().map(String::into_bytes).collect(),
        )
    }

    fn from_decoded(absolute: bool, has_trailing_separator: bool, segments: Vec<Vec<u8>>) -> Self {
        let file_extension = extension_of(segments.last().map(Vec::as_slice));
        Self {
            absolute,
            has_trailing_separator,
            segments,
            file_extension,
        }
    }

    /// Parses a raw path string
    ///
    /// The leading and trailing separators are stripped exactly once, so
    /// consecutive separators survive as empty segments.
    pub fn parse(path: &str) -> Self {
        trace!("Parsing path: {}", path);

        let absolute = path.starts_with(PATH_SEPARATOR);
        // A bare separator cannot carry a trailing flag
        let has_trailing_separator = path.len() > 1 && path.ends_with(PATH_SEPARATOR);

        let mut interior = path;
        if absolute {
            interior = &interior[PATH_SEPARATOR.len_utf8()..];
        }
        if has_trailing_separator {
            interior = &interior[..interior.len() - PATH_SEPARATOR.len_utf8()];
        }

        let segments: Vec<Vec<u8>> = if path.len() <= 1 && interior.is_empty() {
            Vec::new()
        } else {
            interior.split(PATH_SEPARATOR).map(decode).collect()
        };

        let file_extension = if path.len() <= 1 {
            String::new()
        } else {
            extension_of(segments.last().map(Vec::as_slice))
        };

        Self {
            absolute,
            has_trailing_separator,
            segments,
            file_extension,
        }
    }

    pub fn is_absolute(&self) -> bool {
        self.absolute
    }

    pub fn has_trailing_separator(&self) -> bool {
        self.has_trailing_separator
    }

    /// Decoded segments, in order. Bytes that are not UTF-8 show up as U+FFFD
    /// here but are kept intact for composing.
    pub fn segments(&self) -> Vec<Cow<'_, str>> {
        self.segments
            .iter()
            .map(|segment| String::from_utf8_lossy(segment))
            .collect()
    }

    /// Text after the last `.` of the final segment, empty if there is none
    pub fn file_extension(&self) -> &str {
        &self.file_extension
    }

    pub fn is_empty(&self) -> bool {
        !self.absolute && self.segments.is_empty()
    }

    /// Composes the encoded path without collapsing leading separators.
    ///
    /// Only safe to emit behind an authority: a relative reference starting
    /// with `//` would be read as protocol-relative.
    pub fn compose_unsanitized(&self) -> String {
        let mut composed = String::new();
        if self.absolute {
            composed.push(PATH_SEPARATOR);
        }

        let encoded: Vec<String> = self
            .segments
            .iter()
            .map(|segment| encode_path_segment(segment))
            .collect();
        composed.push_str(&encoded.join(PATH_SEPARATOR.to_string().as_str()));

        if self.has_trailing_separator {
            composed.push(PATH_SEPARATOR);
        }
        composed
    }

    /// Composes the encoded path with any leading run of separators collapsed to one
    pub fn compose(&self) -> String {
        let unsanitized = self.compose_unsanitized();
        let stripped = unsanitized.trim_start_matches(PATH_SEPARATOR);
        if stripped.len() == unsanitized.len() {
            return unsanitized;
        }
        format!("{}{}", PATH_SEPARATOR, stripped)
    }

    /// Returns a copy with `.extension` removed from the final segment
    pub fn with_file_extension_removed(&self) -> Self {
        if self.file_extension.is_empty() {
            return self.clone();
        }

        let mut segments = self.segments.clone();
        if let Some(last) = segments.last_mut() {
            if let Some(dot) = last.iter().rposition(|&byte| byte == b'.') {
                last.truncate(dot);
            }
        }
        Self::from_decoded(self.absolute, self.has_trailing_separator, segments)
    }
}

fn extension_of(segment: Option<&[u8]>) -> String {
    segment
        .and_then(|s| {
            s.iter()
                .rposition(|&byte| byte == b'.')
                .map(|dot| String::from_utf8_lossy(&s[dot + 1..]).into_owned())
        })
        .unwrap_or_default()
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.compose())
    }
}

impl Stringable for Path {
    fn render(&self) -> String {
        self.compose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_is_input() {
        let cases = [
            ("/foo/bar", true, false),
            ("foo/bar", false, false),
            ("/foo", true, false),
            ("foo", false, false),
            ("/foo/bar/baz/", true, true),
            ("foo/bar/baz/", false, true),
        ];
        for (raw, absolute, trailing) in cases {
            let path = Path::parse(raw);
            assert_eq!(path.is_absolute(), absolute, "absolute flag for {}", raw);
            assert_eq!(path.has_trailing_separator(), trailing, "trailing flag for {}", raw);
            assert_eq!(path.compose_unsanitized(), raw);
        }
    }

    #[test]
    fn test_paths_are_encoded() {
        let cases = [
            ("/foo bar/", "/foo%20bar/"),
            ("/FOO+bar/BA$/bür/", "/FOO+bar/BA$/b%c3%bcr/"),
            ("/foo%20bar/", "/foo%20bar/"),
            ("/foo%2fbar/baz/", "/foo%2fbar/baz/"),
            ("/foo%2Fbar/baz/", "/foo%2fbar/baz/"),
            ("/b%C3%BCr/", "/b%c3%bcr/"),
            ("/caf%e9/", "/caf%e9/"),
            ("/CAF%E9/%FF%FE.txt", "/CAF%e9/%ff%fe.txt"),
        ];
        for (raw, expected) in cases {
            assert_eq!(Path::parse(raw).compose_unsanitized(), expected, "encoding of {}", raw);
        }
    }

    #[test]
    fn test_bare_separator_and_empty_path() {
        let root = Path::parse("/");
        assert!(root.is_absolute());
        assert!(!root.has_trailing_separator());
        assert!(root.segments().is_empty());
        assert_eq!(root.compose(), "/");

        let empty = Path::parse("");
        assert!(!empty.is_absolute());
        assert!(empty.is_empty());
        assert_eq!(empty.compose(), "");
    }

    #[test]
    fn test_consecutive_separators_keep_empty_segments() {
        let path = Path::parse("/a//b/");
        assert_eq!(path.segments(), vec!["a", "", "b"]);
        assert_eq!(path.compose_unsanitized(), "/a//b/");
    }

    #[test]
    fn test_compose_collapses_leading_separators() {
        let path = Path::parse("//evil.example.com/x");
        assert_eq!(path.compose_unsanitized(), "//evil.example.com/x");
        assert_eq!(path.compose(), "/evil.example.com/x");

        let built = Path::new(true, false, vec![String::new(), String::new(), "x".to_string()]);
        assert_eq!(built.compose(), "/x");
    }

    #[test]
    fn test_file_extension() {
        assert_eq!(Path::parse("/dir/archive.tar.gz").file_extension(), "gz");
        assert_eq!(Path::parse("/dir/readme").file_extension(), "");
        assert_eq!(Path::parse("/").file_extension(), "");
        assert_eq!(Path::parse("foo.php").file_extension(), "php");
    }

    #[test]
    fn test_file_extension_removed() {
        let path = Path::parse("/dir/archive.tar.gz");
        let stripped = path.with_file_extension_removed();
        assert_eq!(stripped.compose(), "/dir/archive.tar");
        assert_eq!(stripped.file_extension(), "tar");
        // source untouched
        assert_eq!(path.compose(), "/dir/archive.tar.gz");

        let plain = Path::parse("/dir/readme");
        assert_eq!(plain.with_file_extension_removed(), plain);
    }

    #[test]
    fn test_non_utf8_segments_are_kept() {
        let path = Path::parse("/caf%e9/");
        assert_eq!(path.compose_unsanitized(), "/caf%e9/");
        assert_eq!(path.segments(), vec!["caf\u{fffd}"]);
        assert_eq!(Path::parse(&path.compose()), path);

        let stripped = Path::parse("/%e9t%e9.b%e9").with_file_extension_removed();
        assert_eq!(stripped.compose(), "/%e9t%e9");
    }
}
