use chardetng::EncodingDetector;
use encoding_rs::Encoding;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedBody {
    pub text: String,
    pub encoding_label: String,
    /// Malformed sequences were replaced with U+FFFD.
    pub lossy: bool,
}

/// Decode a response body into UTF-8 using: BOM -> Content-Type charset -> chardetng guess.
///
/// Never fails: malformed input is decoded with replacement characters and
/// reported through `lossy`.
pub fn decode_body(bytes: &[u8], content_type: Option<&str>) -> DecodedBody {
    if let Some((encoding, _)) = Encoding::for_bom(bytes) {
        return decode_with(bytes, encoding);
    }

    if let Some(label) = content_type.and_then(extract_charset) {
        if let Some(enc) = Encoding::for_label(label.as_bytes()) {
            return decode_with(bytes, enc);
        }
    }

    let mut detector = EncodingDetector::new();
    detector.feed(bytes, true);
    let enc = detector.guess(None, true);
    decode_with(bytes, enc)
}

fn extract_charset(content_type: &str) -> Option<String> {
    content_type.split(';').find_map(|part| {
        let (key, value) = part.split_once('=')?;
        key.trim()
            .eq_ignore_ascii_case("charset")
            .then(|| {
                value
                    .trim()
                    .trim_matches(|c: char| c == '"' || c == '\'')
                    .to_string()
            })
    })
}

fn decode_with(bytes: &[u8], enc: &'static Encoding) -> DecodedBody {
    let (text, used, had_errors) = enc.decode(bytes);
    DecodedBody {
        text: text.into_owned(),
        encoding_label: used.name().to_string(),
        lossy: had_errors,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn charset_header_is_case_insensitive() {
        assert_eq!(
            extract_charset("text/html; Charset=\"UTF-8\"").as_deref(),
            Some("UTF-8")
        );
        assert_eq!(extract_charset("text/html"), None);
    }

    #[test]
    fn latin1_header_decodes_accents() {
        let decoded = decode_body(b"caf\xe9", Some("text/html; charset=ISO-8859-1"));
        assert_eq!(decoded.text, "café");
        assert!(!decoded.lossy);
    }

    #[test]
    fn utf8_bom_wins_over_header() {
        let decoded = decode_body(b"\xEF\xBB\xBFhello", Some("text/html; charset=windows-1252"));
        assert_eq!(decoded.text, "hello");
        assert_eq!(decoded.encoding_label, "UTF-8");
    }

    #[test]
    fn malformed_utf8_is_flagged_not_rejected() {
        let decoded = decode_body(b"ok \xff\xfe end", Some("text/html; charset=utf-8"));
        assert!(decoded.lossy);
        assert!(decoded.text.starts_with("ok "));
        assert!(decoded.text.ends_with(" end"));
    }
}
