use std::fmt;

/// Substring matching on purpose, not word boundaries: recall beats
/// precision for flagging mail that needs attention.
const HIGH_PRIORITY_KEYWORDS: [&str; 10] = [
    "urgent", "asap", "important", "deadline", "invoice", "payment", "money", "billing", "due",
    "critical",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Priority {
    High,
    Normal,
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Priority::High => write!(f, "high"),
            Priority::Normal => write!(f, "normal"),
        }
    }
}

/// Case-insensitive keyword scan over subject, sender and body together.
pub fn classify(subject: &str, from: &str, body: &str) -> Priority {
    let haystack = format!("{subject} {from} {body}").to_lowercase();

    if HIGH_PRIORITY_KEYWORDS.iter().any(|kw| haystack.contains(kw)) {
        Priority::High
    } else {
        Priority::Normal
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn urgent_subject_is_high() {
        assert_eq!(classify("URGENT: invoice due", "a@b.c", "see attached"), Priority::High);
    }

    #[test]
    fn unrelated_mail_is_normal() {
        assert_eq!(
            classify("lunch plans", "friend@example.com", "tacos on friday?"),
            Priority::Normal
        );
    }

    #[test]
    fn keyword_in_sender_counts() {
        assert_eq!(classify("hello", "billing@corp.example", ""), Priority::High);
    }

    #[test]
    fn keyword_in_body_counts() {
        assert_eq!(
            classify("fyi", "a@b.c", "the DEADLINE moved to monday"),
            Priority::High
        );
    }

    #[test]
    fn substring_matches_inside_words() {
        // "due" inside "overdue" — by design.
        assert_eq!(classify("overdue notice", "a@b.c", ""), Priority::High);
    }

    #[test]
    fn renders_lowercase() {
        assert_eq!(Priority::High.to_string(), "high");
        assert_eq!(Priority::Normal.to_string(), "normal");
    }
}
