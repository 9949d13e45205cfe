//! Mention resolution — pure text scanning, no side effects.
//!
//! A mention token is `@` followed by one or more word characters
//! (`[A-Za-z0-9_]`). Tokens are matched case-insensitively against the
//! current roster; unmatched tokens stay literal text (a display concern,
//! not ours). Resolution order follows first occurrence, duplicates
//! collapse to one entry per participant.

use crate::state::Participant;

fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Scan `text` for `@name` tokens and resolve them against `roster`.
#[must_use]
pub fn resolve_mentions<'a>(text: &str, roster: &'a [Participant]) -> Vec<&'a Participant> {
    let mut resolved: Vec<&Participant> = Vec::new();

    let mut chars = text.char_indices().peekable();
    while let Some((_, c)) = chars.next() {
        if c != '@' {
            continue;
        }
        let mut token = String::new();
        while let Some(&(_, next)) = chars.peek() {
            if !is_word_char(next) {
                break;
            }
            token.push(next);
            chars.next();
        }
        if token.is_empty() {
            continue;
        }
        let Some(participant) = roster
            .iter()
            .find(|p| p.name.eq_ignore_ascii_case(&token))
        else {
            continue;
        };
        if !resolved.iter().any(|p| p.id == participant.id) {
            resolved.push(participant);
        }
    }

    resolved
}

#[cfg(test)]
#[path = "mention_test.rs"]
mod tests;
