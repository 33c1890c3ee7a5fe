//! RFC-style ASCII packet diagrams.
//!
//! ```text
//!  0                   1                   2                   3
//!  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! | control_char  |   msg_type    |            credits            |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! ```
//!
//! Each bit takes two columns. A field that crosses a row boundary shows up
//! as a same-named fragment in every row it touches.

use crate::schema::SchemaHeader;

pub const DEFAULT_WIDTH_BITS: usize = 32;

/// A contiguous run of one field's bits inside a single row
#[derive(Debug, Clone, Copy)]
struct Run<'a> {
    name: &'a str,
    start_bit: usize,
    bits: usize,
}

/// Renders the field layout of a header
pub struct PacketDiagram<'a> {
    header: &'a SchemaHeader,
    width: usize,
}

impl<'a> PacketDiagram<'a> {
    pub fn new(header: &'a SchemaHeader) -> Self {
        Self::with_width(header, DEFAULT_WIDTH_BITS)
    }

    /// A zero width is treated as one bit per row
    pub fn with_width(header: &'a SchemaHeader, width: usize) -> Self {
        Self {
            header,
            width: width.max(1),
        }
    }

    pub fn render(&self) -> String {
        let mut lines = vec![
            self.byte_ruler(),
            self.bit_ruler(),
            self.separator(),
        ];

        let width = self.width as u64;
        let mut cursor: u64 = 0;
        let mut row: Vec<Run<'_>> = Vec::new();

        for field in &self.header.fields {
            let mut remaining = field.size_bits;

            while remaining > 0 {
                let row_pos = cursor % width;
                let take = remaining.min(width - row_pos);

                row.push(Run {
                    name: &field.name,
                    start_bit: row_pos as usize,
                    bits: take as usize,
                });
                cursor += take;
                remaining -= take;

                if cursor % width == 0 {
                    lines.push(self.field_row(&row));
                    lines.push(self.separator());
                    row.clear();
                }
            }
        }

        if !row.is_empty() {
            lines.push(self.field_row(&row));
            lines.push(self.separator());
        }

        lines.join("\n")
    }

    fn byte_ruler(&self) -> String {
        let mut chars = vec![' '; self.width * 2];
        for bit in (0..self.width).step_by(10) {
            chars[bit * 2 + 1] = char::from(b'0' + ((bit / 10) % 10) as u8);
        }
        chars.into_iter().collect::<String>().trim_end().to_string()
    }

    fn bit_ruler(&self) -> String {
        let digits: Vec<String> = (0..self.width).map(|i| (i % 10).to_string()).collect();
        format!(" {}", digits.join(" "))
    }

    fn separator(&self) -> String {
        format!("+{}", "-+".repeat(self.width))
    }

    fn field_row(&self, runs: &[Run<'_>]) -> String {
        let row_end = runs
            .iter()
            .map(|r| r.start_bit + r.bits)
            .max()
            .unwrap_or(0);
        let mut chars = vec![' '; row_end * 2 + 1];

        for run in runs {
            let start = run.start_bit * 2;
            let available = run.bits * 2 - 1;

            let name: Vec<char> = run.name.chars().take(available).collect();
            let left_pad = (available - name.len()) / 2;

            chars[start] = '|';
            for (i, c) in name.into_iter().enumerate() {
                chars[start + 1 + left_pad + i] = c;
            }
            chars[start + run.bits * 2] = '|';
        }

        chars.into_iter().collect()
    }
}

/// Render `header` with `width_bits` bits per row
pub fn render(header: &SchemaHeader, width_bits: usize) -> String {
    PacketDiagram::with_width(header, width_bits).render()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::parse;

    fn header(seq: &str) -> SchemaHeader {
        parse(&format!("meta:\n  id: t\nseq:\n{}", seq)).unwrap()
    }

    #[test]
    fn test_rulers_and_separator() {
        let h = header("  - id: a\n    type: u4\n");
        let text = render(&h, 32);
        let lines: Vec<_> = text.lines().collect();

        assert_eq!(lines[0], " 0                   1                   2                   3");
        assert_eq!(lines[1], " 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1");
        assert_eq!(lines[2], format!("+{}", "-+".repeat(32)));
    }

    #[test]
    fn test_single_row_field() {
        let h = header("  - id: a\n    type: u4\n");
        let text = render(&h, 32);
        let lines: Vec<_> = text.lines().collect();

        assert_eq!(lines.len(), 5);
        assert_eq!(lines.iter().filter(|l| l.starts_with('|')).count(), 1);
        assert_eq!(lines.iter().filter(|l| l.starts_with('+')).count(), 2);

        let row = lines[3];
        assert_eq!(row.len(), 65);
        assert_eq!(row.find('a'), Some(32));
        assert!(row.ends_with('|'));
    }

    #[test]
    fn test_names_are_centered_and_truncated() {
        let h = header("  - id: flag\n    type: b1\n  - id: ab\n    type: b2\n  - id: rest\n    type: b29\n");
        let text = render(&h, 32);
        let row = text.lines().nth(3).unwrap();

        // one bit leaves a single column for the name
        assert!(row.starts_with("|f|"));
        // two bits leave three columns; "ab" gets no left padding
        assert_eq!(&row[2..7], "|ab |");
    }

    #[test]
    fn test_field_crossing_rows_repeats_name() {
        let h = header("  - id: head\n    type: u2\n  - id: body\n    type: u4\n");
        let text = render(&h, 32);
        let rows: Vec<_> = text.lines().filter(|l| l.starts_with('|')).collect();

        assert_eq!(rows.len(), 2);
        assert!(rows[0].contains("head") && rows[0].contains("body"));
        assert!(rows[1].contains("body"));
        // partial last row closes after its 16 bits
        assert_eq!(rows[1].len(), 33);
        assert!(text.ends_with(&format!("+{}", "-+".repeat(32))));
    }

    #[test]
    fn test_custom_width_and_determinism() {
        let h = header("  - id: a\n    type: u1\n  - id: b\n    type: u1\n");
        let first = render(&h, 8);
        assert_eq!(first, render(&h, 8));

        let lines: Vec<_> = first.lines().collect();
        assert_eq!(lines[0], " 0");
        assert_eq!(lines[1], " 0 1 2 3 4 5 6 7");
        assert_eq!(lines.iter().filter(|l| l.starts_with('|')).count(), 2);
    }

    #[test]
    fn test_zero_sized_fields_do_not_render() {
        let h = header("  - id: blob\n    type: str\n");
        let text = render(&h, 32);
        assert_eq!(text.lines().count(), 3);
    }
}
