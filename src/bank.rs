use include_dir::{include_dir, Dir};
use std::fs;
use std::path::Path;
use tracing::{debug, warn};

use crate::error::BankError;
use crate::question::Question;

pub(crate) static QUESTIONS_DIR: Dir = include_dir!("$CARGO_MANIFEST_DIR/src/questions");

/// Validated, read-only set of arena questions.
#[derive(Debug, Clone)]
pub struct QuestionBank {
    questions: Vec<Question>,
}

impl QuestionBank {
    /// The bank compiled into the binary.
    pub fn embedded() -> Result<Self, BankError> {
        Self::from_json_str(embedded_str("arena.json")?)
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, BankError> {
        let path = path.as_ref();
        debug!(path = %path.display(), "loading question bank");
        let data = fs::read_to_string(path)?;
        Self::from_json_str(&data)
    }

    /// Parse a JSON array of questions, dropping the ones that cannot be served.
    /// Only a document that is not a JSON array fails as a whole.
    pub fn from_json_str(data: &str) -> Result<Self, BankError> {
        let entries: Vec<serde_json::Value> = serde_json::from_str(data)?;
        let raw = entries
            .into_iter()
            .enumerate()
            .filter_map(|(idx, value)| match serde_json::from_value::<Question>(value) {
                Ok(q) => Some(q),
                Err(e) => {
                    warn!(index = idx, error = %e, "excluding unreadable question");
                    None
                }
            })
            .collect::<Vec<Question>>();
        Self::from_questions(raw)
    }

    pub fn from_questions(raw: Vec<Question>) -> Result<Self, BankError> {
        let total = raw.len();
        let questions = raw
            .into_iter()
            .enumerate()
            .filter_map(|(idx, q)| match q.defect() {
                None => Some(q),
                Some(reason) => {
                    warn!(index = idx, prompt = %q.prompt, reason, "excluding malformed question");
                    None
                }
            })
            .collect::<Vec<Question>>();

        if questions.is_empty() {
            return Err(BankError::Empty);
        }
        debug!(kept = questions.len(), total, "question bank ready");
        Ok(Self { questions })
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }
}

pub(crate) fn embedded_str(file_name: &str) -> Result<&'static str, BankError> {
    QUESTIONS_DIR
        .get_file(file_name)
        .and_then(|file| file.contents_utf8())
        .ok_or_else(|| BankError::NotFound(file_name.to_string()))
}
