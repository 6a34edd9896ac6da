//! Quote-aware line splitting.
//!
//! A delimiter occurrence separates cells only when the rest of the line
//! after it holds an even number of `"` characters. This keeps delimiters
//! inside a quoted span, but it is not RFC 4180 quoting: quotes are never
//! stripped and escaped quotes are not interpreted.

/// Split `line` on `delimiter`, honoring double-quoted spans.
///
/// An empty line yields no segments. Otherwise trailing empty segments are
/// kept, so `"a,,"` yields `["a", "", ""]`. An empty delimiter never splits.
pub fn split_line<'a>(line: &'a str, delimiter: &str) -> Vec<&'a str> {
    if line.is_empty() {
        return Vec::new();
    }
    if delimiter.is_empty() {
        return vec![line];
    }

    let bytes = line.as_bytes();
    let delim = delimiter.as_bytes();
    let total_quotes = bytes.iter().filter(|&&b| b == b'"').count();

    let mut segments = Vec::new();
    let mut start = 0;
    let mut quotes_before = 0;
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i..].starts_with(delim) {
            let end = i + delim.len();
            let quotes_in_delim = delim.iter().filter(|&&b| b == b'"').count();
            let quotes_after = total_quotes - quotes_before - quotes_in_delim;
            if quotes_after % 2 == 0 {
                segments.push(&line[start..i]);
                quotes_before += quotes_in_delim;
                i = end;
                start = end;
                continue;
            }
        }
        if bytes[i] == b'"' {
            quotes_before += 1;
        }
        i += 1;
    }
    segments.push(&line[start..]);
    segments
}

/// Break decoded text into lines ended by `\n`, `\r\n` or a lone `\r`.
///
/// A terminator at the very end does not open a further empty line.
pub fn split_lines(text: &str) -> Vec<&str> {
    let bytes = text.as_bytes();
    let mut lines = Vec::new();
    let mut start = 0;
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'\n' => {
                lines.push(&text[start..i]);
                i += 1;
                start = i;
            }
            b'\r' => {
                lines.push(&text[start..i]);
                i += if bytes.get(i + 1) == Some(&b'\n') { 2 } else { 1 };
                start = i;
            }
            _ => i += 1,
        }
    }
    if start < bytes.len() {
        lines.push(&text[start..]);
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_split() {
        assert_eq!(split_line("a,b,c", ","), vec!["a", "b", "c"]);
        assert_eq!(split_line("a;b", ";"), vec!["a", "b"]);
        assert_eq!(split_line("single", ","), vec!["single"]);
    }

    #[test]
    fn test_empty_line_has_no_segments() {
        assert!(split_line("", ",").is_empty());
    }

    #[test]
    fn test_trailing_and_inner_empty_cells_kept() {
        assert_eq!(split_line("a,,", ","), vec!["a", "", ""]);
        assert_eq!(split_line(",", ","), vec!["", ""]);
        assert_eq!(split_line("1,,3", ","), vec!["1", "", "3"]);
    }

    #[test]
    fn test_delimiter_inside_quotes_preserved() {
        assert_eq!(
            split_line(r#"duke,"Hello, World",42"#, ","),
            vec!["duke", r#""Hello, World""#, "42"]
        );
    }

    #[test]
    fn test_quotes_are_not_stripped() {
        assert_eq!(split_line(r#""a","b""#, ","), vec![r#""a""#, r#""b""#]);
    }

    #[test]
    fn test_unbalanced_quote_suppresses_earlier_splits() {
        // Odd quote count after the first two commas keeps them inside a cell.
        assert_eq!(split_line(r#"a,b,"c"#, ","), vec![r#"a,b,"c"#]);
    }

    #[test]
    fn test_multi_char_delimiter() {
        assert_eq!(split_line("a||b||c", "||"), vec!["a", "b", "c"]);
        assert_eq!(split_line(r#"x::"y::z"::w"#, "::"), vec!["x", r#""y::z""#, "w"]);
    }

    #[test]
    fn test_multibyte_text_and_delimiter() {
        assert_eq!(split_line("é¦ü¦ß", "¦"), vec!["é", "ü", "ß"]);
    }

    #[test]
    fn test_split_rejoin_round_trip() {
        for line in ["name,age", "duke,42,,", "a", ",,,", "x y,z\tw"] {
            assert_eq!(split_line(line, ",").join(","), line);
        }
    }

    #[test]
    fn test_lines_on_every_terminator() {
        assert_eq!(split_lines("a\nb\r\nc\rd"), vec!["a", "b", "c", "d"]);
        assert_eq!(split_lines("a,b\r1,2\r"), vec!["a,b", "1,2"]);
        assert_eq!(split_lines("x\r\r\ny"), vec!["x", "", "y"]);
        assert_eq!(split_lines("\n\nz"), vec!["", "", "z"]);
        assert!(split_lines("").is_empty());
    }
}
