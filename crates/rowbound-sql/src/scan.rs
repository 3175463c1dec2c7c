//! Splits SQL text into regions that may hold placeholders and regions that
//! must be copied verbatim.

/// A region of SQL text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Segment<'a> {
    /// Plain SQL; placeholders are recognized here
    Code(&'a str),

    /// A string literal, quoted identifier or comment
    Verbatim(&'a str),
}

pub(crate) fn segments(sql: &str) -> Vec<Segment<'_>> {
    let bytes = sql.as_bytes();
    let mut ret = vec![];
    let mut start = 0;
    let mut i = 0;

    while i < bytes.len() {
        let end = match bytes[i] {
            quote @ (b'\'' | b'"') => Some(quoted_end(bytes, i, quote)),
            b'-' if bytes.get(i + 1) == Some(&b'-') => Some(line_end(bytes, i)),
            b'/' if bytes.get(i + 1) == Some(&b'*') => Some(block_end(bytes, i)),
            _ => None,
        };

        match end {
            Some(end) => {
                if start < i {
                    ret.push(Segment::Code(&sql[start..i]));
                }
                ret.push(Segment::Verbatim(&sql[i..end]));
                i = end;
                start = end;
            }
            None => i += 1,
        }
    }

    if start < bytes.len() {
        ret.push(Segment::Code(&sql[start..]));
    }

    ret
}

/// Counts `?` markers outside literals and comments.
pub(crate) fn count_markers(sql: &str) -> usize {
    segments(sql)
        .iter()
        .map(|segment| match segment {
            Segment::Code(code) => code.matches('?').count(),
            Segment::Verbatim(_) => 0,
        })
        .sum()
}

// A doubled quote inside a literal is an escaped quote.
fn quoted_end(bytes: &[u8], open: usize, quote: u8) -> usize {
    let mut i = open + 1;
    while i < bytes.len() {
        if bytes[i] == quote {
            if bytes.get(i + 1) == Some(&quote) {
                i += 2;
                continue;
            }
            return i + 1;
        }
        i += 1;
    }
    bytes.len()
}

fn line_end(bytes: &[u8], start: usize) -> usize {
    bytes[start..]
        .iter()
        .position(|b| *b == b'\n')
        .map(|offset| start + offset)
        .unwrap_or(bytes.len())
}

fn block_end(bytes: &[u8], start: usize) -> usize {
    bytes[start + 2..]
        .windows(2)
        .position(|w| w == b"*/")
        .map(|offset| start + 2 + offset + 2)
        .unwrap_or(bytes.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_literals_and_comments() {
        let sql = "select '?' as q, \"a?b\" from t -- why?\nwhere x = ? /* ? */";

        assert_eq!(
            segments(sql),
            vec![
                Segment::Code("select "),
                Segment::Verbatim("'?'"),
                Segment::Code(" as q, "),
                Segment::Verbatim("\"a?b\""),
                Segment::Code(" from t "),
                Segment::Verbatim("-- why?"),
                Segment::Code("\nwhere x = ? "),
                Segment::Verbatim("/* ? */"),
            ]
        );
        assert_eq!(count_markers(sql), 1);
    }

    #[test]
    fn escaped_quote_stays_inside_literal() {
        assert_eq!(count_markers("select 'it''s ?' from t where a = ?"), 1);
    }

    #[test]
    fn unterminated_literal_runs_to_end() {
        assert_eq!(segments("a = 'x?"), vec![Segment::Code("a = "), Segment::Verbatim("'x?")]);
    }
}
