//! Value extraction from portal pages.
//!
//! The portal has no API for the login token or the meter id; both are
//! scraped from page markup. Callers go through [`Extractor`] so the matcher
//! can be replaced without touching the login or client code.

use regex::Regex;

use crate::error::ClientError;

/// Finds the first capture of a pattern in a text.
pub trait Extractor: std::fmt::Debug + Send + Sync {
    /// First capture group of `pattern` in `text`, or `None` if it does not match.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Configuration` if the pattern itself is invalid.
    fn find(&self, pattern: &str, text: &str) -> Result<Option<String>, ClientError>;

    /// Like [`Extractor::find`], but a missing match is an error naming `page`.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Extraction` if the pattern does not match.
    fn extract(&self, pattern: &str, text: &str, page: &str) -> Result<String, ClientError> {
        self.find(pattern, text)?
            .ok_or_else(|| ClientError::Extraction {
                pattern: pattern.to_string(),
                page: page.to_string(),
            })
    }
}

/// [`Extractor`] backed by the `regex` crate.
#[derive(Debug, Default, Clone, Copy)]
pub struct RegexExtractor;

impl Extractor for RegexExtractor {
    fn find(&self, pattern: &str, text: &str) -> Result<Option<String>, ClientError> {
        let re = Regex::new(pattern)
            .map_err(|e| ClientError::Configuration(format!("invalid pattern {pattern}: {e}")))?;
        Ok(re
            .captures(text)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string()))
    }
}

/// Decode the JSON string escapes (`\uXXXX`, `\n`, `\\`, ...) of a captured
/// string-literal fragment.
///
/// # Errors
///
/// Returns `ClientError::Serialization` if `input` is not the body of a
/// valid JSON string.
pub fn unicode_unescape(input: &str) -> Result<String, ClientError> {
    Ok(serde_json::from_str(&format!("\"{input}\""))?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::portal::{CSRF_TOKEN_PATTERN, METER_ID_PATTERN};

    #[test]
    fn finds_csrf_token_in_escaped_markup() {
        let page = r#"<script>var data = "{\u0022csrfToken\u0022\u003A\u0022ab\u002Dcd_12\u0022,\u0022other\u0022\u003A1}";</script>"#;
        let token = RegexExtractor
            .extract(CSRF_TOKEN_PATTERN, page, "je-me-connecte")
            .unwrap();
        assert_eq!(token, r"ab\u002Dcd_12");
        assert_eq!(unicode_unescape(&token).unwrap(), "ab-cd_12");
    }

    #[test]
    fn finds_meter_id() {
        let page = r#"<a href="/mon-compte-en-ligne/statMData/month/123456789">"#;
        let id = RegexExtractor.extract(METER_ID_PATTERN, page, "page").unwrap();
        assert_eq!(id, "123456789");
    }

    #[test]
    fn missing_pattern_is_extraction_error() {
        let err = RegexExtractor
            .extract(METER_ID_PATTERN, "<html></html>", "historique")
            .unwrap_err();
        assert!(matches!(err, ClientError::Extraction { ref page, .. } if page == "historique"));
    }

    #[test]
    fn invalid_pattern_is_configuration_error() {
        assert!(matches!(
            RegexExtractor.find("(", "text"),
            Err(ClientError::Configuration(_))
        ));
    }

    #[test]
    fn unescape_decodes_json_escapes() {
        assert_eq!(unicode_unescape(r"a\u0022b").unwrap(), "a\"b");
        assert_eq!(unicode_unescape(r"caf\u00e9").unwrap(), "café");
        assert_eq!(unicode_unescape(r"\n\t\\").unwrap(), "\n\t\\");
        assert_eq!(unicode_unescape(r"a\/b").unwrap(), "a/b");
        assert_eq!(unicode_unescape(r"\uD83D\uDE00").unwrap(), "😀");
        assert_eq!(unicode_unescape("plain").unwrap(), "plain");
    }

    #[test]
    fn unescape_rejects_malformed_escapes() {
        for input in [r"\q", r"\u12", "end\\", r"\x41"] {
            assert!(
                matches!(unicode_unescape(input), Err(ClientError::Serialization(_))),
                "{input}"
            );
        }
    }
}
