use std::fmt;

use super::MediaTypeError;

const WILDCARD: &str = "*";

/// A single entry of an `Accept` header, or a concrete media type parsed with
/// the same grammar.
///
/// Type, subtype and parameter keys are stored lowercase. Parameter values
/// keep their case and are unquoted.
#[derive(Debug, Clone, PartialEq)]
pub struct MediaRange {
    pub type_: String,
    pub subtype: String,
    pub params: Vec<(String, String)>,
}

impl MediaRange {
    /// Look up a parameter. Later duplicates shadow earlier ones.
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params
            .iter()
            .rev()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Quality value of the range. Only meaningful after
    /// [`parse_media_range`] normalized it.
    pub fn quality(&self) -> f64 {
        self.param("q")
            .and_then(|q| q.parse::<f64>().ok())
            .unwrap_or(1.0)
    }

    pub fn is_wildcard_type(&self) -> bool {
        self.type_ == WILDCARD
    }

    pub fn is_wildcard_subtype(&self) -> bool {
        self.subtype == WILDCARD
    }

    /// `type/subtype` without parameters.
    pub fn essence(&self) -> String {
        format!("{}/{}", self.type_, self.subtype)
    }

    fn set_param(&mut self, key: &str, value: &str) {
        self.params.retain(|(k, _)| k != key);
        self.params.push((key.to_string(), value.to_string()));
    }
}

impl fmt::Display for MediaRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.type_, self.subtype)?;
        for (key, value) in &self.params {
            write!(f, "; {}={}", key, value)?;
        }
        Ok(())
    }
}

/// Parsed `Accept` header, ranges kept in header order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AcceptHeader {
    pub ranges: Vec<MediaRange>,
}

impl AcceptHeader {
    pub fn parse(header: &str) -> Result<Self, MediaTypeError> {
        parse_accept_header(header)
    }

    /// `*/*` with the default quality.
    pub fn any() -> Self {
        Self {
            ranges: vec![MediaRange {
                type_: WILDCARD.to_string(),
                subtype: WILDCARD.to_string(),
                params: vec![("q".to_string(), "1".to_string())],
            }],
        }
    }

    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }
}

/// Split a media type into type, subtype and parameters.
///
/// A bare `*` (sent by some Java clients) is read as `*/*`.
pub fn parse_media_type(s: &str) -> Result<MediaRange, MediaTypeError> {
    let mut parts = s.split(';');
    let full_type = parts.next().unwrap_or_default().trim();
    let full_type = if full_type == WILDCARD { "*/*" } else { full_type };

    let (type_, subtype) = full_type
        .split_once('/')
        .map(|(t, st)| (t.trim(), st.trim()))
        .filter(|(t, st)| !t.is_empty() && !st.is_empty())
        .ok_or_else(|| MediaTypeError::Malformed(s.trim().to_string()))?;

    let params = parts
        .map(str::trim)
        .filter(|param| !param.is_empty())
        .map(|param| match param.split_once('=') {
            Some((key, value)) => (
                key.trim().to_ascii_lowercase(),
                unquote(value.trim()).to_string(),
            ),
            None => (param.to_ascii_lowercase(), String::new()),
        })
        .collect();

    Ok(MediaRange {
        type_: type_.to_ascii_lowercase(),
        subtype: subtype.to_ascii_lowercase(),
        params,
    })
}

/// Parse a media range and guarantee a usable `q` parameter.
///
/// A missing, unparsable or out of range `q` is replaced by `1` rather than
/// clamped to the nearest bound.
pub fn parse_media_range(s: &str) -> Result<MediaRange, MediaTypeError> {
    let mut range = parse_media_type(s)?;

    let valid_q = range
        .param("q")
        .and_then(|q| q.parse::<f64>().ok())
        .filter(|q| q.is_finite() && (0.0..=1.0).contains(q))
        .is_some();

    if !valid_q {
        range.set_param("q", "1");
    }

    Ok(range)
}

/// Parse a full `Accept` header value.
///
/// Blank list elements are skipped; any other malformed element fails the
/// whole header.
pub fn parse_accept_header(header: &str) -> Result<AcceptHeader, MediaTypeError> {
    let ranges = split_top_level(header)
        .into_iter()
        .filter(|segment| !segment.trim().is_empty())
        .map(parse_media_range)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(AcceptHeader { ranges })
}

/// Split on commas that are not inside a quoted parameter value.
fn split_top_level(header: &str) -> Vec<&str> {
    let mut segments = Vec::new();
    let mut in_quotes = false;
    let mut escaped = false;
    let mut start = 0;

    for (idx, ch) in header.char_indices() {
        match ch {
            _ if escaped => escaped = false,
            '\\' if in_quotes => escaped = true,
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => {
                segments.push(&header[start..idx]);
                start = idx + 1;
            }
            _ => {}
        }
    }
    segments.push(&header[start..]);

    segments
}

fn unquote(value: &str) -> &str {
    value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .unwrap_or(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_media_range_with_quality() {
        let range = parse_media_range("application/xhtml;q=0.5").unwrap();
        assert_eq!(range.type_, "application");
        assert_eq!(range.subtype, "xhtml");
        assert_eq!(range.params, vec![("q".to_string(), "0.5".to_string())]);
    }

    #[test]
    fn test_out_of_range_quality_resets_to_one() {
        let range = parse_media_range("text/html;q=2.0").unwrap();
        assert_eq!(range.param("q"), Some("1"));

        let range = parse_media_range("text/html;q=-0.1").unwrap();
        assert_eq!(range.param("q"), Some("1"));
    }

    #[test]
    fn test_missing_or_garbage_quality_defaults() {
        assert_eq!(parse_media_range("text/html").unwrap().param("q"), Some("1"));
        assert_eq!(
            parse_media_range("text/html;q=high").unwrap().param("q"),
            Some("1")
        );
        assert_eq!(parse_media_range("text/html;q=").unwrap().param("q"), Some("1"));
        assert_eq!(
            parse_media_range("text/html;q=NaN").unwrap().param("q"),
            Some("1")
        );
    }

    #[test]
    fn test_zero_quality_is_kept() {
        let range = parse_media_range("text/html;q=0").unwrap();
        assert_eq!(range.quality(), 0.0);
    }

    #[test]
    fn test_bare_wildcard() {
        let range = parse_media_range("*").unwrap();
        assert!(range.is_wildcard_type());
        assert!(range.is_wildcard_subtype());
    }

    #[test]
    fn test_params_are_trimmed() {
        let range = parse_media_type(" text/html ; level = 1 ;charset=\"utf-8\"").unwrap();
        assert_eq!(range.essence(), "text/html");
        assert_eq!(range.param("level"), Some("1"));
        assert_eq!(range.param("charset"), Some("utf-8"));
    }

    #[test]
    fn test_missing_slash_is_malformed() {
        assert!(matches!(
            parse_media_type("texthtml"),
            Err(MediaTypeError::Malformed(_))
        ));
        assert!(parse_media_type("text/").is_err());
        assert!(parse_media_type("").is_err());
    }

    #[test]
    fn test_accept_header_keeps_order() {
        let header = parse_accept_header(
            "text/html; q=1.0, text/*; q=0.8, image/gif; q=0.6, */*; q=0.1",
        )
        .unwrap();

        let essences: Vec<_> = header.ranges.iter().map(MediaRange::essence).collect();
        assert_eq!(essences, vec!["text/html", "text/*", "image/gif", "*/*"]);
        assert_eq!(header.ranges[3].quality(), 0.1);
    }

    #[test]
    fn test_accept_header_fails_fast() {
        assert!(parse_accept_header("text/html, garbage, */*").is_err());
    }

    #[test]
    fn test_accept_header_quoted_comma() {
        let header = parse_accept_header("text/plain; note=\"a,b\", text/html").unwrap();
        assert_eq!(header.ranges.len(), 2);
        assert_eq!(header.ranges[0].param("note"), Some("a,b"));
    }

    #[test]
    fn test_accept_header_skips_blank_elements() {
        let header = parse_accept_header("text/html,, application/json,").unwrap();
        assert_eq!(header.ranges.len(), 2);
    }

    #[test]
    fn test_case_insensitive_type() {
        let range = parse_media_type("Text/HTML; Level=1").unwrap();
        assert_eq!(range.essence(), "text/html");
        assert_eq!(range.param("level"), Some("1"));
    }
}
