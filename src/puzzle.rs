//! Puzzle bank
//!
//! Small fixed set of unlock puzzles shown once the session lock opens.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// A puzzle with its expected answer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Puzzle {
    pub question: &'static str,
    pub hint: &'static str,
    pub answer: &'static str,
}

/// Puzzle as exposed to clients, without the answer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PuzzlePrompt {
    pub question: String,
    pub hint: String,
}

impl From<&Puzzle> for PuzzlePrompt {
    fn from(puzzle: &Puzzle) -> Self {
        Self {
            question: puzzle.question.to_string(),
            hint: puzzle.hint.to_string(),
        }
    }
}

const PUZZLES: [Puzzle; 3] = [
    Puzzle {
        question: "What is 5 squared?",
        hint: "Multiply the number by itself.",
        answer: "25",
    },
    Puzzle {
        question: "What comes next: 2, 4, 8, 16, ...?",
        hint: "Each term doubles the previous one.",
        answer: "32",
    },
    Puzzle {
        question: "I speak without a mouth and hear without ears. What am I?",
        hint: "Shout into a canyon.",
        answer: "echo",
    },
];

/// Read-only collection of puzzles
#[derive(Debug, Clone)]
pub struct PuzzleBank {
    puzzles: &'static [Puzzle],
}

impl Default for PuzzleBank {
    fn default() -> Self {
        Self { puzzles: &PUZZLES }
    }
}

impl PuzzleBank {
    /// Pick a puzzle uniformly at random
    pub fn pick<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<&Puzzle> {
        self.puzzles.choose(rng)
    }

    /// Whether the trimmed answer matches any stored answer exactly
    pub fn validate(&self, answer: &str) -> bool {
        let answer = answer.trim();
        self.puzzles.iter().any(|p| p.answer == answer)
    }

    pub fn len(&self) -> usize {
        self.puzzles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.puzzles.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_validate_trims_whitespace() {
        let bank = PuzzleBank::default();
        assert!(bank.validate(" 25 "));
        assert!(bank.validate("32\n"));
        assert!(bank.validate("echo"));
    }

    #[test]
    fn test_validate_rejects_wrong_answers() {
        let bank = PuzzleBank::default();
        assert!(!bank.validate(""));
        assert!(!bank.validate("26"));
        assert!(!bank.validate("Echo"));
    }

    #[test]
    fn test_pick_covers_bank() {
        let bank = PuzzleBank::default();
        let mut rng = StdRng::seed_from_u64(1);
        let mut seen = std::collections::HashSet::new();
        for _ in 0..200 {
            seen.insert(bank.pick(&mut rng).unwrap().question);
        }
        assert_eq!(seen.len(), bank.len());
    }

    #[test]
    fn test_prompt_hides_answer() {
        let bank = PuzzleBank::default();
        let mut rng = StdRng::seed_from_u64(2);
        let prompt = PuzzlePrompt::from(bank.pick(&mut rng).unwrap());
        let json = serde_json::to_value(&prompt).unwrap();
        assert!(json.get("answer").is_none());
        assert!(json["question"].is_string());
        assert!(json["hint"].is_string());
    }
}
