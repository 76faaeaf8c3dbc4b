//! Comma-separated field handling for the dictionary and loot log files.
//!
//! Fields are split on commas. A field starting with `"` runs until the
//! matching closing quote, with `""` standing for a literal quote.

/// Splits one line into its fields.
pub fn split_fields(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes => {
                if chars.peek() == Some(&'"') {
                    current.push('"');
                    chars.next();
                } else {
                    in_quotes = false;
                }
            }
            '"' if current.is_empty() => in_quotes = true,
            ',' if !in_quotes => fields.push(std::mem::take(&mut current)),
            _ => current.push(c),
        }
    }
    fields.push(current);
    fields
}

/// Escapes one field for writing.
///
/// Line breaks are flattened to spaces since rows are read back line by line.
pub fn escape_field(value: &str) -> String {
    let flat = value.replace(['\r', '\n'], " ");
    if flat.contains(',') || flat.contains('"') {
        format!("\"{}\"", flat.replace('"', "\"\""))
    } else {
        flat
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_plain() {
        assert_eq!(split_fields("a,b,,c"), vec!["a", "b", "", "c"]);
        assert_eq!(split_fields(""), vec![""]);
    }

    #[test]
    fn test_split_quoted() {
        assert_eq!(
            split_fields(r#"1,"Adds 1 to 2, Fire","say ""hi""",x"#),
            vec!["1", "Adds 1 to 2, Fire", r#"say "hi""#, "x"]
        );
    }

    #[test]
    fn test_escape_field() {
        assert_eq!(escape_field("Chaos Orb"), "Chaos Orb");
        assert_eq!(escape_field("a, b"), "\"a, b\"");
        assert_eq!(escape_field("say \"hi\""), "\"say \"\"hi\"\"\"");
        assert_eq!(escape_field("two\nlines"), "two lines");
    }

    #[test]
    fn test_escape_then_split() {
        let values = ["plain", "with, comma", "with \"quote\"", ""];
        let line = values
            .iter()
            .map(|v| escape_field(v))
            .collect::<Vec<_>>()
            .join(",");
        assert_eq!(split_fields(&line), values);
    }
}
