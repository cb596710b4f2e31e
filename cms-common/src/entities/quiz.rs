//! Quizzes
//!
//! Answer rules depend on the quiz type:
//! - `single-select`: exactly one answer is correct; marking one correct
//!   clears the others
//! - `multi-select`: at least one answer is correct
//! - `pair`: answers carry a `match` string instead of a correctness flag;
//!   the flag is never exposed for this type

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Entity, EntityKind};
use crate::store::{ContentStore, EntityStore};
use crate::validation::ValidationErrors;
use crate::{ContentStatus, EntityId, Error, Result};

const MIN_ANSWERS: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum QuizType {
    SingleSelect,
    MultiSelect,
    Pair,
}

impl QuizType {
    /// Whether answers of this type show an "is correct" toggle
    pub fn exposes_correct_toggle(self) -> bool {
        !matches!(self, QuizType::Pair)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizAnswer {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_correct_answer: Option<bool>,
    #[serde(default, rename = "match", skip_serializing_if = "Option::is_none")]
    pub match_text: Option<String>,
}

impl QuizAnswer {
    pub fn is_correct(&self) -> bool {
        self.is_correct_answer.unwrap_or(false)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quiz {
    #[serde(default)]
    pub id: EntityId,
    pub question: String,
    pub quiz_type: QuizType,
    #[serde(default)]
    pub answers: Vec<QuizAnswer>,
    #[serde(default)]
    pub explanation: Option<String>,
    #[serde(default)]
    pub status: ContentStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Quiz {
    pub fn new(question: impl Into<String>, quiz_type: QuizType) -> Self {
        Self {
            id: EntityId::NEW,
            question: question.into(),
            quiz_type,
            answers: Vec::new(),
            explanation: None,
            status: ContentStatus::Draft,
            created_at: None,
            updated_at: None,
        }
    }

    /// Append an answer shaped for the current quiz type; returns its index
    pub fn add_answer(&mut self, text: impl Into<String>) -> usize {
        let (is_correct_answer, match_text) = match self.quiz_type {
            QuizType::Pair => (None, Some(String::new())),
            _ => (Some(false), None),
        };
        self.answers.push(QuizAnswer {
            text: text.into(),
            is_correct_answer,
            match_text,
        });
        self.answers.len() - 1
    }

    pub fn remove_answer(&mut self, index: usize) -> Result<QuizAnswer> {
        self.check_index(index)?;
        Ok(self.answers.remove(index))
    }

    /// Set the correctness of one answer
    ///
    /// For single-select quizzes, marking an answer correct clears every
    /// other answer. Pair quizzes reject the call.
    pub fn set_correct(&mut self, index: usize, correct: bool) -> Result<()> {
        if !self.quiz_type.exposes_correct_toggle() {
            return Err(Error::InvalidInput(
                "Pair quizzes have no correct answer toggle".to_string(),
            ));
        }
        self.check_index(index)?;
        if correct && self.quiz_type == QuizType::SingleSelect {
            for answer in &mut self.answers {
                answer.is_correct_answer = Some(false);
            }
        }
        self.answers[index].is_correct_answer = Some(correct);
        Ok(())
    }

    /// Flip the correctness of one answer; returns the new value
    pub fn toggle_correct(&mut self, index: usize) -> Result<bool> {
        self.check_index(index)?;
        let next = !self.answers[index].is_correct();
        self.set_correct(index, next)?;
        Ok(next)
    }

    /// Set the matching half of a pair answer
    pub fn set_match(&mut self, index: usize, text: impl Into<String>) -> Result<()> {
        if self.quiz_type != QuizType::Pair {
            return Err(Error::InvalidInput(
                "Only pair quizzes have matches".to_string(),
            ));
        }
        self.check_index(index)?;
        self.answers[index].match_text = Some(text.into());
        Ok(())
    }

    /// Switch quiz type, reshaping the answers
    pub fn change_type(&mut self, quiz_type: QuizType) {
        self.quiz_type = quiz_type;
        self.normalize();
    }

    pub fn correct_count(&self) -> usize {
        self.answers.iter().filter(|a| a.is_correct()).count()
    }

    fn check_index(&self, index: usize) -> Result<()> {
        if index >= self.answers.len() {
            return Err(Error::InvalidInput(format!(
                "Answer index {} out of range ({} answers)",
                index,
                self.answers.len()
            )));
        }
        Ok(())
    }
}

impl Entity for Quiz {
    const KIND: EntityKind = EntityKind::Quiz;

    fn id(&self) -> EntityId {
        self.id
    }

    fn set_id(&mut self, id: EntityId) {
        self.id = id;
    }

    fn label(&self) -> &str {
        &self.question
    }

    fn status(&self) -> Option<ContentStatus> {
        Some(self.status)
    }

    fn set_status(&mut self, status: ContentStatus) {
        self.status = status;
    }

    fn created_at(&self) -> Option<DateTime<Utc>> {
        self.created_at
    }

    fn normalize(&mut self) {
        match self.quiz_type {
            QuizType::Pair => {
                for answer in &mut self.answers {
                    answer.is_correct_answer = None;
                    answer.match_text.get_or_insert_with(String::new);
                }
            }
            QuizType::SingleSelect | QuizType::MultiSelect => {
                for answer in &mut self.answers {
                    answer.match_text = None;
                    answer.is_correct_answer = Some(answer.is_correct());
                }
                // single-select keeps only the first answer marked correct
                if self.quiz_type == QuizType::SingleSelect {
                    let mut seen = false;
                    for answer in &mut self.answers {
                        if answer.is_correct() {
                            answer.is_correct_answer = Some(!seen);
                            seen = true;
                        }
                    }
                }
            }
        }
    }

    fn validate(&self) -> std::result::Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.require_text("question", &self.question);
        if self.answers.len() < MIN_ANSWERS {
            errors.push("answers", format!("At least {} answers", MIN_ANSWERS));
        }
        for (i, answer) in self.answers.iter().enumerate() {
            errors.require_text(format!("answers.{}.text", i), &answer.text);
            if self.quiz_type == QuizType::Pair {
                errors.require_text(
                    format!("answers.{}.match", i),
                    answer.match_text.as_deref().unwrap_or(""),
                );
                if answer.is_correct_answer.is_some() {
                    errors.push(
                        format!("answers.{}.is_correct_answer", i),
                        "Not used by pair quizzes",
                    );
                }
            }
        }
        match self.quiz_type {
            QuizType::SingleSelect if self.correct_count() != 1 => {
                errors.push("answers", "Exactly one answer must be correct");
            }
            QuizType::MultiSelect if self.correct_count() == 0 => {
                errors.push("answers", "At least one answer must be correct");
            }
            _ => {}
        }
        errors.into_result()
    }

    fn select(store: &ContentStore) -> &EntityStore<Self> {
        &store.quizzes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_select_toggle_is_mutually_exclusive() {
        let mut quiz = Quiz::new("Pick one", QuizType::SingleSelect);
        let a = quiz.add_answer("A");
        let b = quiz.add_answer("B");

        quiz.set_correct(b, true).unwrap();
        assert!(quiz.toggle_correct(a).unwrap());

        assert_eq!(quiz.correct_count(), 1);
        assert!(quiz.answers[a].is_correct());
        assert!(!quiz.answers[b].is_correct());
        assert!(quiz.validate().is_ok());
    }

    #[test]
    fn test_multi_select_allows_several() {
        let mut quiz = Quiz::new("Pick many", QuizType::MultiSelect);
        quiz.add_answer("A");
        quiz.add_answer("B");
        quiz.set_correct(0, true).unwrap();
        quiz.set_correct(1, true).unwrap();
        assert_eq!(quiz.correct_count(), 2);
        assert!(quiz.validate().is_ok());
    }

    #[test]
    fn test_pair_hides_toggle_and_requires_match() {
        let mut quiz = Quiz::new("Match them", QuizType::Pair);
        assert!(!quiz.quiz_type.exposes_correct_toggle());
        quiz.add_answer("Cat");
        quiz.add_answer("Dog");
        assert!(quiz.set_correct(0, true).is_err());
        assert!(quiz.answers.iter().all(|a| a.is_correct_answer.is_none()));

        let errors = quiz.validate().unwrap_err();
        assert!(errors.has("answers.0.match"));
        assert!(errors.has("answers.1.match"));

        quiz.set_match(0, "Meow").unwrap();
        quiz.set_match(1, "Woof").unwrap();
        assert!(quiz.validate().is_ok());

        let json = serde_json::to_value(&quiz.answers[0]).unwrap();
        assert!(json.get("is_correct_answer").is_none());
        assert_eq!(json["match"], "Meow");
    }

    #[test]
    fn test_change_type_reshapes_answers() {
        let mut quiz = Quiz::new("q", QuizType::MultiSelect);
        quiz.add_answer("A");
        quiz.add_answer("B");
        quiz.set_correct(0, true).unwrap();
        quiz.set_correct(1, true).unwrap();

        quiz.change_type(QuizType::SingleSelect);
        assert_eq!(quiz.correct_count(), 1);
        assert!(quiz.answers[0].is_correct());

        quiz.change_type(QuizType::Pair);
        assert!(quiz.answers.iter().all(|a| a.is_correct_answer.is_none()));
        assert!(quiz.answers.iter().all(|a| a.match_text.is_some()));
    }

    #[test]
    fn test_single_select_without_correct_answer_fails() {
        let mut quiz = Quiz::new("q", QuizType::SingleSelect);
        quiz.add_answer("A");
        quiz.add_answer("B");
        assert!(quiz.validate().unwrap_err().has("answers"));
    }

    #[test]
    fn test_out_of_range_index() {
        let mut quiz = Quiz::new("q", QuizType::SingleSelect);
        assert!(quiz.toggle_correct(0).is_err());
        assert!(quiz.remove_answer(3).is_err());
    }

    #[test]
    fn test_quiz_type_serde() {
        let json = serde_json::to_string(&QuizType::SingleSelect).unwrap();
        assert_eq!(json, "\"single-select\"");
    }
}
