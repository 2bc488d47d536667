use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Options beyond this cannot be picked with a single digit key.
pub const MAX_OPTIONS: usize = 9;

/// An immutable trivia item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    pub prompt: String,
    pub category: String,
    pub options: Vec<String>,
    /// Index into `options` of the correct answer.
    pub answer: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
}

impl Question {
    /// Why a question cannot be served, if anything.
    pub fn defect(&self) -> Option<&'static str> {
        if self.prompt.trim().is_empty() {
            Some("empty prompt")
        } else if self.options.len() < 2 {
            Some("fewer than two options")
        } else if self.options.len() > MAX_OPTIONS {
            Some("more than nine options")
        } else if self.answer >= self.options.len() {
            Some("correct answer index out of range")
        } else {
            None
        }
    }

    pub fn is_valid(&self) -> bool {
        self.defect().is_none()
    }

    pub fn correct_text(&self) -> &str {
        self.options
            .get(self.answer)
            .map(String::as_str)
            .unwrap_or("N/A")
    }
}

/// One attempt at a question: its options in presentation order.
#[derive(Debug, Clone, PartialEq)]
pub struct Round {
    pub question: Question,
    pub options: Vec<String>,
    pub correct_index: usize,
}

impl Round {
    /// Shuffle the question's options uniformly and track where the correct one lands.
    pub fn shuffled<R: Rng + ?Sized>(question: &Question, rng: &mut R) -> Self {
        let mut order: Vec<usize> = (0..question.options.len()).collect();
        order.shuffle(rng);

        let options = order
            .iter()
            .map(|&i| question.options[i].clone())
            .collect::<Vec<String>>();
        let correct_index = order
            .iter()
            .position(|&i| i == question.answer)
            .unwrap_or(0);

        Self {
            question: question.clone(),
            options,
            correct_index,
        }
    }

    pub fn is_correct(&self, index: usize) -> bool {
        index == self.correct_index
    }

    pub fn correct_text(&self) -> &str {
        self.options
            .get(self.correct_index)
            .map(String::as_str)
            .unwrap_or("N/A")
    }
}

/// Uniformly shuffle a copy of `items`.
pub fn shuffled<T: Clone, R: Rng + ?Sized>(items: &[T], rng: &mut R) -> Vec<T> {
    let mut out = items.to_vec();
    out.shuffle(rng);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashMap;

    fn sample() -> Question {
        Question {
            prompt: "Red planet?".to_string(),
            category: "Astronomy".to_string(),
            options: vec![
                "Venus".to_string(),
                "Mars".to_string(),
                "Jupiter".to_string(),
                "Saturn".to_string(),
            ],
            answer: 1,
            hint: Some("Fourth from the Sun.".to_string()),
            explanation: None,
        }
    }

    #[test]
    fn test_shuffled_round_keeps_correct_text() {
        let q = sample();
        for seed in 0..64 {
            let mut rng = StdRng::seed_from_u64(seed);
            let round = Round::shuffled(&q, &mut rng);
            assert_eq!(round.options.len(), q.options.len());
            assert_eq!(round.correct_text(), q.correct_text());
            assert!(round.is_correct(round.correct_index));
        }
    }

    #[test]
    fn test_shuffled_round_is_a_permutation() {
        let q = sample();
        let mut rng = StdRng::seed_from_u64(7);
        let round = Round::shuffled(&q, &mut rng);
        let mut sorted = round.options.clone();
        sorted.sort();
        let mut expected = q.options.clone();
        expected.sort();
        assert_eq!(sorted, expected);
    }

    #[test]
    fn test_shuffle_spreads_correct_answer_over_all_slots() {
        let q = sample();
        let mut rng = StdRng::seed_from_u64(42);
        let mut seen: HashMap<usize, u32> = HashMap::new();
        for _ in 0..4000 {
            *seen.entry(Round::shuffled(&q, &mut rng).correct_index).or_insert(0) += 1;
        }
        assert_eq!(seen.len(), 4);
        for count in seen.values() {
            // 1000 expected per slot
            assert!(*count > 850 && *count < 1150, "skewed shuffle: {seen:?}");
        }
    }

    #[test]
    fn test_defects() {
        let mut q = sample();
        assert!(q.is_valid());

        q.answer = 4;
        assert_eq!(q.defect(), Some("correct answer index out of range"));

        q.answer = 0;
        q.options.truncate(1);
        assert_eq!(q.defect(), Some("fewer than two options"));

        let mut q = sample();
        q.options = (0..=MAX_OPTIONS).map(|i| i.to_string()).collect();
        assert_eq!(q.defect(), Some("more than nine options"));

        let mut q = sample();
        q.prompt = "  ".to_string();
        assert_eq!(q.defect(), Some("empty prompt"));
    }

    #[test]
    fn test_question_deserialization_optional_fields() {
        let json = r#"{ "prompt": "2+2", "category": "Math", "options": ["3", "4"], "answer": 1 }"#;
        let q: Question = serde_json::from_str(json).unwrap();
        assert_eq!(q.correct_text(), "4");
        assert_eq!(q.hint, None);
        assert_eq!(q.explanation, None);
    }
}
