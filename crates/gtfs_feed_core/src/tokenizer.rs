const BYTE_ORDER_MARK: char = '\u{FEFF}';

/// Splits one raw CSV line into fields.
///
/// Double quotes toggle quoting and never appear in the output. Leading
/// spaces of a field are skipped, trailing spaces are trimmed, and carriage
/// returns and tabs are dropped wherever they occur. An unterminated quote is
/// closed at the end of the line. A byte order mark is only stripped from the
/// header line.
pub fn split_record(line: &str, is_header: bool) -> Vec<String> {
    let line = if is_header {
        line.strip_prefix(BYTE_ORDER_MARK).unwrap_or(line)
    } else {
        line
    };

    let mut fields = Vec::new();
    let mut token = String::new();
    let mut inside_quotes = false;
    let mut at_field_start = true;

    for ch in line.chars() {
        match ch {
            '"' => {
                inside_quotes = !inside_quotes;
                at_field_start = false;
            }
            ' ' if at_field_start => {}
            ',' if !inside_quotes => {
                push_field(&mut fields, &mut token);
                at_field_start = true;
            }
            '\r' | '\t' => at_field_start = false,
            _ => {
                token.push(ch);
                at_field_start = false;
            }
        }
    }
    push_field(&mut fields, &mut token);

    fields
}

fn push_field(fields: &mut Vec<String>, token: &mut String) {
    let trimmed_len = token.trim_end_matches(' ').len();
    token.truncate(trimmed_len);
    fields.push(std::mem::take(token));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_empty_fields() {
        assert_eq!(split_record(",, ,", false), vec!["", "", "", ""]);
    }

    #[test]
    fn empty_line_yields_one_field() {
        assert_eq!(split_record("", false), vec![""]);
    }

    #[test]
    fn strips_byte_order_mark_from_header_only() {
        assert_eq!(
            split_record("\u{FEFF}route_id, agency_id", true),
            vec!["route_id", "agency_id"]
        );
        let row = split_record("\u{FEFF}R1,A1", false);
        assert_eq!(row[0], "\u{FEFF}R1");
    }

    #[test]
    fn keeps_commas_inside_quotes() {
        let fields = split_record("27681 ,,\"Sisters, OR\",,\"44.29124\",1", false);
        assert_eq!(fields.len(), 6);
        assert_eq!(fields[0], "27681");
        assert_eq!(fields[1], "");
        assert_eq!(fields[2], "Sisters, OR");
        assert_eq!(fields[3], "");
        assert_eq!(fields[4], "44.29124");
        assert_eq!(fields[5], "1");
    }

    #[test]
    fn keeps_inner_spaces_and_trims_outer_ones() {
        assert_eq!(
            split_record("  Main St  ,  Depot", false),
            vec!["Main St", "Depot"]
        );
        assert_eq!(split_record("\" quoted \"", false), vec![" quoted"]);
    }

    #[test]
    fn drops_carriage_returns_and_tabs() {
        assert_eq!(split_record("a\t1,b\r", false), vec!["a1", "b"]);
    }

    #[test]
    fn closes_unterminated_quote_at_end_of_line() {
        assert_eq!(split_record("x,\"open, field", false), vec!["x", "open, field"]);
    }
}
