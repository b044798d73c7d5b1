//! Answer checking

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Correct { expected: String },
    Incorrect { heard: String, expected: String },
}

impl Verdict {
    pub fn is_correct(&self) -> bool {
        matches!(self, Verdict::Correct { .. })
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Correct { expected } => {
                write!(f, "✅ Correct! You said \"{}\"", expected)
            }
            Verdict::Incorrect { heard, expected } => {
                write!(f, "❌ Not quite. You said '{}', expected \"{}\"", heard, expected)
            }
        }
    }
}

/// Surrounding whitespace and letter case are ignored; nothing else is.
pub fn check_answer(heard: &str, expected: &str) -> Verdict {
    if heard.trim().to_lowercase() == expected.to_lowercase() {
        Verdict::Correct {
            expected: expected.to_string(),
        }
    } else {
        Verdict::Incorrect {
            heard: heard.to_string(),
            expected: expected.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_exact_match() {
        assert!(check_answer("hello", "hello").is_correct());
    }

    #[test]
    fn test_case_and_whitespace_ignored() {
        assert!(check_answer("  Hello\n", "hello").is_correct());
        assert!(check_answer("YACHT", "yacht").is_correct());
    }

    #[test]
    fn test_wrong_word() {
        let verdict = check_answer("world", "hello");
        assert_eq!(
            verdict,
            Verdict::Incorrect {
                heard: "world".to_string(),
                expected: "hello".to_string()
            }
        );
        assert!(verdict.to_string().contains("'world'"));
    }

    #[test]
    fn test_inner_whitespace_matters() {
        assert!(!check_answer("hel lo", "hello").is_correct());
    }

    proptest! {
        #[test]
        fn prop_padding_and_case_never_change_verdict(
            word in "[a-z]{1,12}",
            left in "[ \t]{0,3}",
            right in "[ \t\n]{0,3}",
        ) {
            let heard = format!("{}{}{}", left, word.to_uppercase(), right);
            prop_assert!(check_answer(&heard, &word).is_correct());
        }

        #[test]
        fn prop_different_words_are_incorrect(a in "[a-z]{1,8}", b in "[a-z]{1,8}") {
            prop_assume!(a != b);
            prop_assert!(!check_answer(&a, &b).is_correct());
        }
    }
}
