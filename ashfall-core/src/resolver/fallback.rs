//! Deterministic lexical matching of player text against choices.
//!
//! This is the zero-dependency tier of choice resolution: no network, no
//! randomness. The same (input, candidates) pair always picks the same
//! choice. Scoring works on characters, not bytes, so short Korean inputs
//! match partial verb stems ("도망갈게" hits "도망간다" on "도망").

use crate::encounter::Choice;

/// Score one candidate's text against the player input.
///
/// - +2 per whitespace token of length >= 2 found in the candidate text,
///   +1 for shorter tokens that still appear.
/// - +1 per input offset whose 2-character (or, failing that, 3-character)
///   substring appears in the candidate text. Only the first matching
///   length counts at each offset.
pub fn score(input: &str, candidate_text: &str) -> u32 {
    let input = input.to_lowercase();
    let text = candidate_text.to_lowercase();
    let mut total = 0;

    for token in input.split_whitespace() {
        if text.contains(token) {
            total += if token.chars().count() >= 2 { 2 } else { 1 };
        }
    }

    let chars: Vec<char> = input.chars().collect();
    for start in 0..chars.len() {
        for len in [2, 3] {
            let Some(window) = chars.get(start..start + len) else {
                continue;
            };
            let gram: String = window.iter().collect();
            if text.contains(&gram) {
                total += 1;
                break;
            }
        }
    }

    total
}

/// Pick the best-scoring candidate.
///
/// Ties keep the earlier candidate; a later one must score strictly higher
/// to win. When everything scores zero the first candidate is returned, so
/// the result is None only for an empty list.
pub fn pick<'a>(input: &str, choices: &'a [Choice]) -> Option<&'a Choice> {
    let mut best: Option<(&'a Choice, u32)> = None;

    for choice in choices {
        let score = score(input, choice.match_text());
        match best {
            Some((_, best_score)) if score <= best_score => {}
            _ => best = Some((choice, score)),
        }
    }

    best.map(|(choice, _)| choice)
}
