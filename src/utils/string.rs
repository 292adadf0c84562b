/// Find the largest valid UTF-8 boundary at or before the given byte index.
#[inline]
fn safe_byte_boundary(s: &str, max_bytes: usize) -> usize {
    if max_bytes >= s.len() {
        return s.len();
    }
    s.char_indices()
        .map(|(i, _)| i)
        .take_while(|&i| i <= max_bytes)
        .last()
        .unwrap_or(0)
}

/// Truncate a string to at most `max_len` bytes, returning a borrowed slice.
///
/// Never splits a multi-byte character.
#[inline]
pub fn truncate_str(s: &str, max_len: usize) -> &str {
    if s.len() <= max_len {
        s
    } else {
        &s[..safe_byte_boundary(s, max_len)]
    }
}

/// First `max_chars` characters of `s` (UTF-8 safe, no suffix).
#[inline]
pub fn take_chars(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((end, _)) => &s[..end],
        None => s,
    }
}

/// File name stem for a caller-supplied id.
///
/// ASCII letters, digits, `-` and `_` pass through; every other byte becomes
/// `%XX`. Distinct ids always map to distinct stems and no stem contains a
/// path separator or `.`.
pub fn file_stem(id: &str) -> String {
    let mut stem = String::with_capacity(id.len());
    for byte in id.bytes() {
        if byte.is_ascii_alphanumeric() || byte == b'-' || byte == b'_' {
            stem.push(char::from(byte));
        } else {
            stem.push_str(&format!("%{:02X}", byte));
        }
    }
    stem
}

/// Pluralize a countable noun: `1 alert`, `3 alerts`.
pub fn count_noun(count: usize, noun: &str) -> String {
    if count == 1 {
        format!("{} {}", count, noun)
    } else {
        format!("{} {}s", count, noun)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_stem_passes_safe_ids() {
        assert_eq!(file_stem("proj-jaipur_1"), "proj-jaipur_1");
    }

    #[test]
    fn test_file_stem_encodes_separators() {
        assert_eq!(file_stem("../etc/passwd"), "%2E%2E%2Fetc%2Fpasswd");
        assert_eq!(file_stem("a\\b"), "a%5Cb");
    }

    #[test]
    fn test_file_stem_keeps_ids_apart() {
        assert_eq!(file_stem("site a"), "site%20a");
        assert_ne!(file_stem("site a"), file_stem("site_a"));
        assert_ne!(file_stem("site%20a"), file_stem("site a"));
        assert_eq!(file_stem("sité"), "sit%C3%A9");
    }

    #[test]
    fn test_truncate_str_short() {
        assert_eq!(truncate_str("hello", 10), "hello");
    }

    #[test]
    fn test_truncate_str_long() {
        assert_eq!(truncate_str("hello world", 5), "hello");
    }

    #[test]
    fn test_truncate_str_unicode() {
        // Each Devanagari letter here is 3 bytes
        let hindi = "नमस्ते";
        assert_eq!(truncate_str(hindi, 7), "नम");
    }

    #[test]
    fn test_take_chars() {
        assert_eq!(take_chars("hello", 10), "hello");
        assert_eq!(take_chars("hello world", 5), "hello");
        assert_eq!(take_chars("", 3), "");
        assert_eq!(take_chars("abc", 0), "");
    }

    #[test]
    fn test_take_chars_multibyte() {
        let mixed = "सीमेंट cement";
        let taken = take_chars(mixed, 3);
        assert_eq!(taken.chars().count(), 3);
        assert!(mixed.starts_with(taken));
    }

    #[test]
    fn test_count_noun() {
        assert_eq!(count_noun(0, "alert"), "0 alerts");
        assert_eq!(count_noun(1, "alert"), "1 alert");
        assert_eq!(count_noun(2, "alert"), "2 alerts");
    }
}
