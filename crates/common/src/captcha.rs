//! Arithmetic captcha challenge shown before login

use rand::Rng;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

const MIN_OPERAND: u32 = 1;
const MAX_OPERAND: u32 = 10;

/// A single `a + b` question
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Challenge {
    pub id: String,
    pub left: u32,
    pub right: u32,
}

/// What the client sees: the id and the question, never the operands' sum
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChallengeView {
    pub id: String,
    pub question: String,
}

impl Challenge {
    pub fn generate<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            left: rng.gen_range(MIN_OPERAND..=MAX_OPERAND),
            right: rng.gen_range(MIN_OPERAND..=MAX_OPERAND),
        }
    }

    pub fn random() -> Self {
        Self::generate(&mut rand::thread_rng())
    }

    pub fn question(&self) -> String {
        format!("What is {} + {}?", self.left, self.right)
    }

    pub fn view(&self) -> ChallengeView {
        ChallengeView {
            id: self.id.clone(),
            question: self.question(),
        }
    }

    /// Whitespace around the answer is ignored; anything that is not an
    /// integer is wrong.
    pub fn verify(&self, answer: &str) -> bool {
        answer
            .trim()
            .parse::<i64>()
            .map(|n| n == i64::from(self.left) + i64::from(self.right))
            .unwrap_or(false)
    }
}

/// The verify button is enabled only once something has been typed.
pub fn can_submit(answer: &str) -> bool {
    !answer.trim().is_empty()
}
