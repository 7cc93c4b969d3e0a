//! Opaque offset cursors.

use base64::Engine;

const PREFIX: &str = "offset:";

/// Encodes an edge offset as an opaque cursor string.
pub(crate) fn encode(offset: usize) -> String {
    base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(format!("{PREFIX}{offset}"))
}

/// Decodes a cursor produced by [`encode`].
pub(crate) fn decode(cursor: &str) -> Option<usize> {
    let bytes = base64::engine::general_purpose::URL_SAFE_NO_PAD
        .decode(cursor)
        .ok()?;
    let text = String::from_utf8(bytes).ok()?;
    text.strip_prefix(PREFIX)?.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cursor_encode_decode() {
        assert_eq!(decode(&encode(0)), Some(0));
        assert_eq!(decode(&encode(42)), Some(42));
    }

    #[test]
    fn test_cursor_decode_invalid() {
        assert!(decode("not-valid-base64!!!").is_none());
        assert!(decode("").is_none());
        // valid base64, wrong payload
        assert!(decode("aGVsbG8").is_none());
    }
}
