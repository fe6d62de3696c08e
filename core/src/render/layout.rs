//! Console-style column layout for display mode

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Align {
    Left,
    Right,
}

fn width_of(text: &str) -> usize {
    text.chars().count()
}

fn pad(out: &mut String, text: &str, width: usize, align: Align) {
    let fill = width.saturating_sub(width_of(text));
    if align == Align::Right {
        out.extend(std::iter::repeat_n(' ', fill));
    }
    out.push_str(text);
    if align == Align::Left {
        out.extend(std::iter::repeat_n(' ', fill));
    }
}

fn trim_line_ends(text: String) -> String {
    text.lines()
        .map(str::trim_end)
        .collect::<Vec<_>>()
        .join("\n")
}

/// `[1] a b c` rows, each prefixed with the index of its first item
pub(super) fn indexed(items: &[String], width: usize, align: Align) -> String {
    let label_width = width_of(&format!("[{}]", items.len()));
    let item_width = items.iter().map(|item| width_of(item)).max().unwrap_or(0);
    let per_line = (width.saturating_sub(label_width) / (item_width + 1)).max(1);

    let mut out = String::new();
    for (row, chunk) in items.chunks(per_line).enumerate() {
        if row > 0 {
            out.push('\n');
        }
        pad(&mut out, &format!("[{}]", row * per_line + 1), label_width, Align::Right);
        for item in chunk {
            out.push(' ');
            pad(&mut out, item, item_width, align);
        }
    }
    trim_line_ends(out)
}

/// A row of names over a row of values, right-aligned in shared columns
pub(super) fn named(names: &[String], items: &[String], width: usize) -> String {
    let column = names
        .iter()
        .chain(items)
        .map(|text| width_of(text))
        .max()
        .unwrap_or(0);
    let per_line = (width / (column + 1)).max(1);

    let mut out = String::new();
    for (row, (names, items)) in names.chunks(per_line).zip(items.chunks(per_line)).enumerate() {
        if row > 0 {
            out.push('\n');
        }
        for (i, name) in names.iter().enumerate() {
            if i > 0 {
                out.push(' ');
            }
            pad(&mut out, name, column, Align::Right);
        }
        out.push('\n');
        for (i, item) in items.iter().enumerate() {
            if i > 0 {
                out.push(' ');
            }
            pad(&mut out, item, column, Align::Right);
        }
    }
    trim_line_ends(out)
}

/// Footer for entries cut by `max_elements`
pub(super) fn omitted(out: &mut String, omitted: usize) {
    if omitted > 0 {
        out.push_str(&format!(
            "\n [ reached max_elements -- omitted {omitted} entries ]"
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_indexed_single_line() {
        let items = strings(&["\"a\"", "\"b\"", "\"c\""]);
        assert_eq!(indexed(&items, 80, Align::Left), "[1] \"a\" \"b\" \"c\"");
    }

    #[test]
    fn test_indexed_wraps_with_aligned_labels() {
        let items: Vec<String> = (1..=12).map(|i| i.to_string()).collect();
        // label "[12]" is 4 wide, items 2 wide: (20 - 4) / 3 = 5 per line
        assert_eq!(
            indexed(&items, 20, Align::Right),
            " [1]  1  2  3  4  5\n [6]  6  7  8  9 10\n[11] 11 12"
        );
    }

    #[test]
    fn test_indexed_left_aligned_strings() {
        let items = strings(&["\"a\"", "\"bbb\""]);
        assert_eq!(indexed(&items, 80, Align::Left), "[1] \"a\"   \"bbb\"");
    }

    #[test]
    fn test_named_rows() {
        let names = strings(&["a", "long"]);
        let items = strings(&["1", "2"]);
        assert_eq!(named(&names, &items, 80), "   a long\n   1    2");
    }

    #[test]
    fn test_named_wraps() {
        let names = strings(&["a", "b", "c"]);
        let items = strings(&["1", "2", "3"]);
        assert_eq!(named(&names, &items, 4), "a b\n1 2\nc\n3");
    }

    #[test]
    fn test_omitted_footer() {
        let mut out = String::from("[1] 1");
        omitted(&mut out, 0);
        assert_eq!(out, "[1] 1");
        omitted(&mut out, 3);
        assert_eq!(out, "[1] 1\n [ reached max_elements -- omitted 3 entries ]");
    }
}
