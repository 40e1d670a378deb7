//! Helpers for putting player-written text (names, blackboard posts,
//! graffiti) into log lines without breaking them across lines.

const MAX_PREVIEW: usize = 120;

/// Escape `s` for a single log line and cap it at [`MAX_PREVIEW`] chars.
///
/// Backslash, `\n`, `\r` and `\t` are escaped; any other control character
/// becomes `\xNN`.
pub fn escape_log(s: &str) -> String {
    let mut out = String::with_capacity(s.len().min(MAX_PREVIEW) + 8);
    for (count, ch) in s.chars().enumerate() {
        if count >= MAX_PREVIEW {
            out.push('…');
            break;
        }
        match ch {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c.is_control() => {
                use std::fmt::Write;
                let _ = write!(&mut out, "\\x{:02X}", c as u32);
            }
            c => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::escape_log;

    #[test]
    fn graffiti_stays_on_one_line() {
        assert_eq!(escape_log("down with\nhomework\t!"), "down with\\nhomework\\t!");
        assert_eq!(escape_log("bell\u{7}"), "bell\\x07");
    }

    #[test]
    fn long_text_is_truncated() {
        let esc = escape_log(&"z".repeat(500));
        assert_eq!(esc.chars().count(), 121);
        assert!(esc.ends_with('…'));
    }
}
