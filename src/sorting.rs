//! Natural ordering for specimen identifiers
//!
//! Identifiers are split at ASCII digit boundaries. Digit runs compare by
//! numeric value, everything else compares case-insensitively, and at any given
//! position a number sorts before text. So `cell_2` < `cell_10` and mixed
//! fragments never fail to compare.

use std::cmp::Ordering;

/// Numeric fragment compared by value without overflow.
///
/// Leading zeros are stripped, so a longer digit string is a larger number.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct NumericRun {
    len: usize,
    digits: String,
}

impl NumericRun {
    fn new(run: &str) -> Self {
        let digits = run.trim_start_matches('0').to_string();
        Self { len: digits.len(), digits }
    }
}

/// One fragment of a natural key. Variant order is the comparison order.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum Fragment {
    /// Digit run
    Number(NumericRun),
    /// Non-digit run, lowercased
    Text(String),
}

/// Comparison key for one identifier.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct NaturalKey(Vec<Fragment>);

impl NaturalKey {
    /// Build the key for `text`
    #[must_use]
    pub fn new(text: &str) -> Self {
        let mut fragments = Vec::new();
        let mut start = 0;
        let mut in_digits = None;

        for (index, ch) in text.char_indices() {
            let is_digit = ch.is_ascii_digit();
            match in_digits {
                Some(previous) if previous != is_digit => {
                    fragments.push(Self::fragment(&text[start..index], previous));
                    start = index;
                }
                _ => {}
            }
            in_digits = Some(is_digit);
        }
        if let Some(is_digit) = in_digits {
            fragments.push(Self::fragment(&text[start..], is_digit));
        }

        Self(fragments)
    }

    fn fragment(run: &str, is_digit: bool) -> Fragment {
        if is_digit {
            Fragment::Number(NumericRun::new(run))
        } else {
            Fragment::Text(run.to_lowercase())
        }
    }

    /// Fragments in order
    #[must_use]
    pub fn fragments(&self) -> &[Fragment] {
        &self.0
    }
}

/// Compare two identifiers in natural order
#[must_use]
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    NaturalKey::new(a).cmp(&NaturalKey::new(b))
}

/// Sort identifiers in natural order (stable)
pub fn sort_natural<S: AsRef<str>>(items: &mut [S]) {
    items.sort_by_cached_key(|item| NaturalKey::new(item.as_ref()));
}

/// Sorted copy of `items` in natural order
#[must_use]
pub fn sorted_natural<I, S>(items: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut sorted: Vec<String> = items.into_iter().map(Into::into).collect();
    sort_natural(&mut sorted);
    sorted
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_runs_sort_by_value() {
        let sorted = sorted_natural(["control_10", "control_2", "control_1"]);
        assert_eq!(sorted, vec!["control_1", "control_2", "control_10"]);
    }

    #[test]
    fn test_spaces_and_leading_numbers() {
        let sorted = sorted_natural(["1h LPS 10", "1h LPS 2", "1h LPS 1"]);
        assert_eq!(sorted, vec!["1h LPS 1", "1h LPS 2", "1h LPS 10"]);

        let sorted = sorted_natural(["IgE 1", "2h LPS 1", "1h LPS 1"]);
        assert_eq!(sorted, vec!["1h LPS 1", "2h LPS 1", "IgE 1"]);
    }

    #[test]
    fn test_numbers_before_text_at_same_position() {
        assert_eq!(natural_cmp("1abc", "abc"), Ordering::Less);
        assert_eq!(natural_cmp("x_1", "x_a"), Ordering::Less);
    }

    #[test]
    fn test_case_insensitive_text() {
        assert_eq!(natural_cmp("Cell_3", "cell_3"), Ordering::Equal);
        assert_eq!(natural_cmp("B1", "a2"), Ordering::Greater);
    }

    #[test]
    fn test_huge_digit_runs_do_not_overflow() {
        let big = "s_123456789012345678901234567890";
        let small = "s_99999999999999999999";
        assert_eq!(natural_cmp(small, big), Ordering::Less);
    }

    #[test]
    fn test_leading_zeros_equal_value() {
        assert_eq!(natural_cmp("a007", "a7"), Ordering::Equal);
        assert_eq!(natural_cmp("a000", "a0"), Ordering::Equal);
    }

    #[test]
    fn test_empty_string_sorts_first() {
        let sorted = sorted_natural(["b", "", "a"]);
        assert_eq!(sorted, vec!["", "a", "b"]);
    }

    #[test]
    fn test_fragments() {
        let key = NaturalKey::new("ab12c");
        assert_eq!(key.fragments().len(), 3);
        assert!(matches!(key.fragments()[1], Fragment::Number(_)));
    }
}
