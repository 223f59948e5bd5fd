/*
 * Delimited text encoding of scanned rows.
 *
 * One record per row: composite key, primary key values, then field values,
 * separated by the 0x01 control byte. Records are newline-delimited by the
 * writer, so newlines inside values are stripped rather than escaped.
 */

/// Separator byte between values inside one record.
pub const FIELD_SEPARATOR: char = '\u{0001}';

/// Sentinel substituted for SQL NULL and the literal string "null".
pub const NULL_SENTINEL: &str = "\\N";

/// Flattens one row's values into a delimited record.
pub fn encode_record(values: &[Option<String>]) -> String {
    let mut record = String::new();
    for (i, value) in values.iter().enumerate() {
        if i > 0 {
            record.push(FIELD_SEPARATOR);
        }
        encode_value(&mut record, value.as_deref());
    }
    record
}

/// Appends one value, applying the null sentinel and newline stripping.
pub fn encode_value(record: &mut String, value: Option<&str>) {
    match value {
        None => record.push_str(NULL_SENTINEL),
        Some(text) if text.eq_ignore_ascii_case("null") => record.push_str(NULL_SENTINEL),
        Some(text) => record.extend(text.chars().filter(|c| *c != '\r' && *c != '\n')),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn some(s: &str) -> Option<String> {
        Some(s.to_string())
    }

    #[test]
    fn test_values_join_on_control_byte() {
        let record = encode_record(&[some("1_2"), some("1"), some("2"), some("paid")]);
        assert_eq!(record, "1_2\u{0001}1\u{0001}2\u{0001}paid");
    }

    #[test]
    fn test_null_and_literal_null_share_a_sentinel() {
        let record = encode_record(&[None, some("null"), some("NULL"), some("Null")]);
        assert_eq!(record, "\\N\u{0001}\\N\u{0001}\\N\u{0001}\\N");
    }

    #[test]
    fn test_newlines_are_stripped_not_escaped() {
        let record = encode_record(&[some("line1\nline2"), some("a\r\nb")]);
        assert_eq!(record, "line1line2\u{0001}ab");
    }

    #[test]
    fn test_null_check_runs_before_stripping() {
        // "nu\nll" is not the literal "null"; it strips to "null" but keeps
        // its value form
        let record = encode_record(&[some("nu\nll")]);
        assert_eq!(record, "null");
    }

    #[test]
    fn test_empty_value_stays_empty() {
        let record = encode_record(&[some(""), some("x")]);
        assert_eq!(record, "\u{0001}x");
    }
}
