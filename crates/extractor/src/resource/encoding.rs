// ABOUTME: Charset detection and transcoding of fetched bodies to UTF-8.
// ABOUTME: Unsupported or undecodable charsets degrade to the original bytes plus a warning.

use std::borrow::Cow;

use encoding_rs::{Encoding, ISO_8859_5, KOI8_R, UTF_16BE, UTF_16LE, UTF_8, WINDOWS_1251, WINDOWS_1252};

/// Legacy encodings that are transcoded to UTF-8.
pub const SUPPORTED_ENCODINGS: &[&Encoding] = &[WINDOWS_1251, WINDOWS_1252, ISO_8859_5, KOI8_R];

/// How many leading bytes are scanned for a `<meta>` charset declaration.
const META_PRESCAN_LIMIT: usize = 1024;

/// Why a body was passed through untranscoded.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EncodingWarning {
    #[error("unsupported encoding {0}, keeping original bytes")]
    Unsupported(&'static str),
    #[error("body is not valid {0}, keeping original bytes")]
    Malformed(&'static str),
}

/// Outcome of [`normalize`].
#[derive(Debug)]
pub struct Normalized<'a> {
    /// UTF-8 bytes, or the untouched input when `warning` is set.
    pub body: Cow<'a, [u8]>,
    /// The detected source encoding.
    pub encoding: &'static Encoding,
    pub warning: Option<EncodingWarning>,
}

/// Detects the encoding of `body` and transcodes it to UTF-8.
///
/// Detection order: byte-order mark, `charset` of the Content-Type header,
/// `<meta>` declaration, then content sniffing. UTF-8 when nothing applies.
pub fn normalize<'a>(body: &'a [u8], content_type: Option<&str>) -> Normalized<'a> {
    let encoding = detect(body, content_type);

    if encoding == UTF_8 {
        return Normalized {
            body: Cow::Borrowed(body),
            encoding,
            warning: None,
        };
    }

    if !SUPPORTED_ENCODINGS.contains(&encoding) {
        return Normalized {
            body: Cow::Borrowed(body),
            encoding,
            warning: Some(EncodingWarning::Unsupported(encoding.name())),
        };
    }

    match encoding.decode_without_bom_handling_and_without_replacement(body) {
        Some(text) => Normalized {
            body: Cow::Owned(text.into_owned().into_bytes()),
            encoding,
            warning: None,
        },
        None => Normalized {
            body: Cow::Borrowed(body),
            encoding,
            warning: Some(EncodingWarning::Malformed(encoding.name())),
        },
    }
}

/// Determines the source encoding of `body`.
pub fn detect(body: &[u8], content_type: Option<&str>) -> &'static Encoding {
    if let Some((encoding, _)) = Encoding::for_bom(body) {
        return encoding;
    }

    if let Some(encoding) = content_type
        .and_then(extract_charset)
        .and_then(|label| Encoding::for_label(label.as_bytes()))
    {
        return encoding;
    }

    if let Some(encoding) = meta_charset(body) {
        return encoding;
    }

    sniff(body)
}

/// Extract charset value from Content-Type header.
fn extract_charset(content_type: &str) -> Option<String> {
    let lower = content_type.to_lowercase();
    for part in lower.split(';') {
        let trimmed = part.trim();
        if let Some(charset) = trimmed.strip_prefix("charset=") {
            let charset = charset.trim_matches('"').trim_matches('\'');
            return Some(charset.to_string());
        }
    }
    None
}

/// Finds `<meta charset=…>` or an http-equiv content charset near the top of the document.
fn meta_charset(body: &[u8]) -> Option<&'static Encoding> {
    let head = &body[..body.len().min(META_PRESCAN_LIMIT)];
    let lower = String::from_utf8_lossy(head).to_ascii_lowercase();
    let mut rest = lower.as_str();

    while let Some(pos) = rest.find("<meta") {
        let tag = &rest[pos..];
        let tag = &tag[..tag.find('>').unwrap_or(tag.len())];
        if let Some(idx) = tag.find("charset=") {
            let value = tag[idx + "charset=".len()..].trim_start_matches(['"', '\'', ' ']);
            let label: String = value
                .chars()
                .take_while(|c| !matches!(c, '"' | '\'' | ' ' | ';' | '/' | '>'))
                .collect();
            if let Some(encoding) = Encoding::for_label(label.as_bytes()) {
                // A meta declaration can't describe UTF-16 bytes it was read from.
                if encoding == UTF_16LE || encoding == UTF_16BE {
                    return Some(UTF_8);
                }
                return Some(encoding);
            }
        }
        rest = &rest[pos + "<meta".len()..];
    }
    None
}

/// Valid UTF-8 is taken as UTF-8; anything else goes to chardetng.
fn sniff(body: &[u8]) -> &'static Encoding {
    if std::str::from_utf8(body).is_ok() {
        return UTF_8;
    }
    let mut detector = chardetng::EncodingDetector::new();
    detector.feed(body, true);
    detector.guess(None, true)
}
