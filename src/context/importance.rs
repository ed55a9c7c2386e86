//! Importance heuristic for early conversation messages

use super::models::Message;

/// Messages before this index always count as important
pub const POSITIONAL_IMPORTANCE_CUTOFF: usize = 3;

/// Lowercase phrases that mark a message as carrying lasting context
pub const IMPORTANT_KEYWORDS: [&str; 12] = [
    "remember",
    "important",
    "context",
    "background",
    "my name is",
    "i am",
    "project",
    "working on",
    "objective",
    "goal",
    "requirement",
    "specification",
];

/// Whether `message` likely carries context later messages depend on.
///
/// True for the first three messages of the history, or when the lowercased
/// content contains any of [`IMPORTANT_KEYWORDS`]. `_total` is accepted for
/// callers that classify relative to history length; the heuristic ignores it.
pub fn is_important(message: &Message, index: usize, _total: usize) -> bool {
    if index < POSITIONAL_IMPORTANCE_CUTOFF {
        return true;
    }
    contains_keyword(&message.content)
}

fn contains_keyword(content: &str) -> bool {
    let lowered = content.to_lowercase();
    IMPORTANT_KEYWORDS
        .iter()
        .any(|keyword| lowered.contains(keyword))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_three_always_important() {
        let message = Message::user("");
        for index in 0..3 {
            assert!(is_important(&message, index, 10));
        }
        assert!(!is_important(&message, 3, 10));
    }

    #[test]
    fn test_every_keyword_triggers() {
        for keyword in IMPORTANT_KEYWORDS {
            let message = Message::user(format!("well, {} here", keyword));
            assert!(is_important(&message, 7, 10), "keyword {:?}", keyword);
        }
    }

    #[test]
    fn test_keyword_match_is_case_insensitive() {
        let message = Message::assistant("My Name Is Ferris");
        assert!(is_important(&message, 5, 6));
        let message = Message::user("This is IMPORTANT");
        assert!(is_important(&message, 5, 6));
    }

    #[test]
    fn test_plain_message_not_important() {
        let message = Message::user("what does this error mean?");
        assert!(!is_important(&message, 4, 6));
    }

    #[test]
    fn test_substring_match() {
        // "goal" inside "goalkeeper" still counts; the heuristic is substring based
        let message = Message::user("the goalkeeper saved it");
        assert!(is_important(&message, 9, 10));
    }

    #[test]
    fn test_index_beyond_total() {
        let message = Message::user("nothing special");
        assert!(!is_important(&message, 100, 3));
    }
}
