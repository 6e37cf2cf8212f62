//! MIME helpers: RFC 2047 header decoding and plain-text body extraction.

use mail_parser::{Message, MessageParser, MessagePart, MimeHeaders, PartType};

/// Decode a raw header value (possibly RFC 2047 encoded-words) to a display
/// string. The embedded charset is respected; undecodable input falls back to
/// lossy UTF-8. Empty input yields an empty string, never an error.
pub fn decode_header_value(raw: &[u8]) -> String {
    if raw.is_empty() {
        return String::new();
    }
    // mail-parser decodes encoded-words while parsing a message, so wrap the
    // value in a minimal Subject header.
    let mut buf = Vec::with_capacity(raw.len() + 13);
    buf.extend_from_slice(b"Subject: ");
    buf.extend_from_slice(raw);
    buf.extend_from_slice(b"\r\n\r\n");
    match MessageParser::default()
        .parse(&buf)
        .and_then(|m| m.subject().map(|s| s.to_string()))
    {
        Some(decoded) => decoded,
        None => String::from_utf8_lossy(raw).trim().to_string(),
    }
}

/// First text/plain, non-attachment part of the message, in document order.
/// Single-part messages qualify only when they are plain text themselves.
/// No candidate part (e.g. HTML-only) yields an empty string, not an error.
pub fn extract_plain_text(message: &Message) -> String {
    for part in &message.parts {
        if let PartType::Text(text) = &part.body {
            if is_attachment(part) || !is_plain_text(part) {
                continue;
            }
            return text.as_ref().to_string();
        }
    }
    String::new()
}

fn is_attachment(part: &MessagePart) -> bool {
    part.content_disposition()
        .map_or(false, |cd| cd.ctype().eq_ignore_ascii_case("attachment"))
}

fn is_plain_text(part: &MessagePart) -> bool {
    match part.content_type() {
        Some(ct) => {
            ct.ctype().eq_ignore_ascii_case("text")
                && ct.subtype().map_or(true, |s| s.eq_ignore_ascii_case("plain"))
        }
        // No Content-Type header defaults to text/plain.
        None => true,
    }
}

/// Optional char cap for summary use cases.
pub fn preview(text: String, max_chars: Option<usize>) -> String {
    match max_chars {
        Some(max) if text.chars().count() > max => text.chars().take(max).collect(),
        _ => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_ascii_is_unchanged() {
        assert_eq!(decode_header_value(b"Hello world"), "Hello world");
    }

    #[test]
    fn empty_header_is_empty_string() {
        assert_eq!(decode_header_value(b""), "");
    }

    #[test]
    fn utf8_encoded_word_is_decoded() {
        assert_eq!(
            decode_header_value(b"=?UTF-8?B?SGVsbG8gV8O2cmxk?="),
            "Hello W\u{f6}rld"
        );
    }

    #[test]
    fn latin1_q_encoding_is_decoded() {
        assert_eq!(decode_header_value(b"=?ISO-8859-1?Q?caf=E9?="), "caf\u{e9}");
    }

    #[test]
    fn decoding_is_idempotent_on_decoded_output() {
        let once = decode_header_value(b"=?UTF-8?B?SGVsbG8gV8O2cmxk?=");
        assert_eq!(decode_header_value(once.as_bytes()), once);
    }

    fn parse(raw: &str) -> Message<'_> {
        MessageParser::default()
            .parse(raw.as_bytes())
            .expect("fixture should parse")
    }

    #[test]
    fn single_part_plain_body() {
        let raw = "From: a@b.com\r\n\
                   Subject: hi\r\n\
                   Content-Type: text/plain\r\n\
                   \r\n\
                   just some text\r\n";
        let msg = parse(raw);
        assert_eq!(extract_plain_text(&msg).trim(), "just some text");
    }

    #[test]
    fn html_only_message_yields_empty_body() {
        let raw = "From: a@b.com\r\n\
                   Subject: hi\r\n\
                   Content-Type: text/html\r\n\
                   \r\n\
                   <p>hello</p>\r\n";
        let msg = parse(raw);
        assert_eq!(extract_plain_text(&msg), "");
    }

    #[test]
    fn multipart_picks_first_plain_part() {
        let raw = "From: a@b.com\r\n\
                   Subject: hi\r\n\
                   Content-Type: multipart/alternative; boundary=\"b1\"\r\n\
                   \r\n\
                   --b1\r\n\
                   Content-Type: text/html\r\n\
                   \r\n\
                   <p>fancy</p>\r\n\
                   --b1\r\n\
                   Content-Type: text/plain\r\n\
                   \r\n\
                   plain version\r\n\
                   --b1--\r\n";
        let msg = parse(raw);
        assert_eq!(extract_plain_text(&msg).trim(), "plain version");
    }

    #[test]
    fn attachment_disposed_text_part_is_skipped() {
        let raw = "From: a@b.com\r\n\
                   Subject: hi\r\n\
                   Content-Type: multipart/mixed; boundary=\"b1\"\r\n\
                   \r\n\
                   --b1\r\n\
                   Content-Type: text/plain\r\n\
                   Content-Disposition: attachment; filename=\"notes.txt\"\r\n\
                   \r\n\
                   attached notes\r\n\
                   --b1\r\n\
                   Content-Type: text/plain\r\n\
                   \r\n\
                   inline body\r\n\
                   --b1--\r\n";
        let msg = parse(raw);
        assert_eq!(extract_plain_text(&msg).trim(), "inline body");
    }

    #[test]
    fn preview_caps_by_chars() {
        assert_eq!(preview("abcdef".into(), Some(3)), "abc");
        assert_eq!(preview("abc".into(), Some(10)), "abc");
        assert_eq!(preview("abc".into(), None), "abc");
        // char boundary, not byte boundary
        assert_eq!(preview("\u{e9}\u{e9}\u{e9}".into(), Some(2)), "\u{e9}\u{e9}");
    }
}
