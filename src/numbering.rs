//! Human-readable purchase-order numbers (`PO1`, `PO2`, ...).

pub const PO_PREFIX: &str = "PO";

/// Sequence value of an existing order number.
///
/// The first `"PO"` is removed and the leading integer of what remains is
/// read. Anything unreadable, negative, or too large counts as zero so it
/// never wins the maximum.
pub fn sequence_of(po_no: &str) -> u64 {
    let rest = po_no.replacen(PO_PREFIX, "", 1);
    let rest = rest.trim_start();

    let (negative, digits) = match rest.as_bytes().first() {
        Some(b'-') => (true, &rest[1..]),
        Some(b'+') => (false, &rest[1..]),
        _ => (false, rest),
    };
    let end = digits
        .bytes()
        .position(|b| !b.is_ascii_digit())
        .unwrap_or(digits.len());
    if negative || end == 0 {
        return 0;
    }
    digits[..end].parse::<u64>().unwrap_or(0)
}

/// Next free number given every number currently in use.
pub fn next_po_number<I, S>(existing: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let max = existing
        .into_iter()
        .map(|po_no| sequence_of(po_no.as_ref()))
        .max()
        .unwrap_or(0);
    format!("{}{}", PO_PREFIX, max.saturating_add(1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("PO7", 7)]
    #[case("PO012", 12)]
    #[case("PO12-A", 12)]
    #[case("X-PO5", 0)]
    #[case("XPO5", 0)]
    #[case("5", 5)]
    #[case("PO", 0)]
    #[case("POabc", 0)]
    #[case("PO-3", 0)]
    #[case("PO99999999999999999999999", 0)]
    fn reads_sequence_values(#[case] po_no: &str, #[case] expected: u64) {
        assert_eq!(sequence_of(po_no), expected);
    }

    #[test]
    fn next_number_follows_the_maximum() {
        assert_eq!(next_po_number(["PO1", "PO3", "PO7"]), "PO8");
        assert_eq!(next_po_number(["PO7", "PO3", "PO1"]), "PO8");
    }

    #[test]
    fn first_number_is_po1() {
        assert_eq!(next_po_number(Vec::<String>::new()), "PO1");
        assert_eq!(next_po_number(["draft", "POx"]), "PO1");
    }

    #[test]
    fn non_numeric_numbers_are_ignored() {
        assert_eq!(next_po_number(["PO2", "legacy-17", "POfoo"]), "PO3");
    }
}
