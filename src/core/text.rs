// src/core/text.rs

/// Separator used inside multi-word vocabulary entries ("ice_cream").
pub const WORD_JOINER: char = '_';

/// Lowercases ASCII letters and joins words with a single `_`.
pub fn normalize(word: &str) -> String {
    let mut out = String::with_capacity(word.len());
    let mut in_gap = false;
    for c in word.chars() {
        if c.is_whitespace() {
            if !in_gap {
                out.push(WORD_JOINER);
                in_gap = true;
            }
            continue;
        }
        in_gap = false;
        out.push(c.to_ascii_lowercase());
    }
    out
}

/// Turns a vocabulary entry back into display text.
pub fn denormalize(word: &str) -> String {
    word.replace(WORD_JOINER, " ")
}

/// True if either normalized word contains the other.
pub fn super_or_substring(a: &str, b: &str) -> bool {
    let a = normalize(a);
    let b = normalize(b);
    a.contains(&b) || b.contains(&a)
}

/// English ordinal suffix: "st" for 1, "nd" for 22, "th" for 11.
pub fn order_suffix(n: usize) -> &'static str {
    match (n % 10, n % 100) {
        (1, r) if r != 11 => "st",
        (2, r) if r != 12 => "nd",
        (3, r) if r != 13 => "rd",
        _ => "th",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn normalize_lowercases_and_joins() {
        assert_eq!(normalize("Ice Cream"), "ice_cream");
        assert_eq!(normalize("NEW_YORK"), "new_york");
        assert_eq!(normalize("ice  \tcream"), "ice_cream");
        assert_eq!(denormalize("ice_cream"), "ice cream");
    }

    #[test]
    fn substring_check_runs_both_ways() {
        assert!(super_or_substring("apple pie", "APPLE"));
        assert!(super_or_substring("pie", "apple_pie"));
        assert!(!super_or_substring("apple pie", "banana"));
    }

    #[test]
    fn ordinal_suffixes() {
        let cases = [(1, "st"), (2, "nd"), (3, "rd"), (4, "th"), (11, "th"), (12, "th"),
            (13, "th"), (21, "st"), (102, "nd"), (111, "th")];
        for (n, suffix) in cases {
            assert_eq!(order_suffix(n), suffix, "n = {}", n);
        }
    }

    proptest! {
        #[test]
        fn normalize_is_idempotent(s in "[A-Za-z _]{0,16}") {
            let once = normalize(&s);
            prop_assert_eq!(normalize(&once), once);
        }

        #[test]
        fn substring_check_is_symmetric(a in "[A-Za-z ]{1,8}", b in "[A-Za-z ]{1,8}") {
            prop_assert_eq!(super_or_substring(&a, &b), super_or_substring(&b, &a));
        }

        #[test]
        fn substring_check_ignores_case(a in "[a-z ]{1,8}", b in "[a-z ]{1,8}") {
            prop_assert_eq!(
                super_or_substring(&a.to_uppercase(), &b),
                super_or_substring(&a, &b)
            );
        }
    }
}
