//! Read-only view over a graded submission.
//!
//! Correctness of a question is whatever the server graded; options are only
//! classified for highlighting.

use std::fmt;

use chrono::{DateTime, Utc};

use crate::api::{GradedAnswer, GradedSubmission};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionDisplay {
    CorrectAndChosen,
    CorrectNotChosen,
    IncorrectChosen,
    Neutral,
}

impl OptionDisplay {
    pub fn is_correct(self) -> bool {
        matches!(self, Self::CorrectAndChosen | Self::CorrectNotChosen)
    }

    fn marker(self) -> &'static str {
        match self {
            Self::CorrectAndChosen => "[*]",
            Self::CorrectNotChosen => "[+]",
            Self::IncorrectChosen => "[x]",
            Self::Neutral => "[ ]",
        }
    }
}

fn contains(answers: &[String], option: &str) -> bool {
    answers.iter().any(|a| a.trim() == option.trim())
}

pub fn render_option(option: &str, user_answer: &[String], correct_answer: &[String]) -> OptionDisplay {
    match (contains(correct_answer, option), contains(user_answer, option)) {
        (true, true) => OptionDisplay::CorrectAndChosen,
        (true, false) => OptionDisplay::CorrectNotChosen,
        (false, true) => OptionDisplay::IncorrectChosen,
        (false, false) => OptionDisplay::Neutral,
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct OptionReview {
    pub text: String,
    pub display: OptionDisplay,
}

#[derive(Debug, Clone, PartialEq)]
pub struct QuestionReview {
    /// 1-based.
    pub position: usize,
    pub text: String,
    pub is_correct: bool,
    pub options: Vec<OptionReview>,
    pub explanation: Option<String>,
}

impl QuestionReview {
    fn new(position: usize, answer: &GradedAnswer) -> Self {
        let question = &answer.question;

        let mut texts: Vec<String> = question
            .options
            .iter()
            .map(|o| o.text().to_string())
            .collect();
        // free-form questions: show what was expected and what was given
        if texts.is_empty() {
            for text in question.correct_answer.iter().chain(&answer.user_answer) {
                if !contains(&texts, text) {
                    texts.push(text.clone());
                }
            }
        }

        let options = texts
            .into_iter()
            .map(|text| {
                let display = render_option(&text, &answer.user_answer, &question.correct_answer);
                OptionReview { text, display }
            })
            .collect();

        Self {
            position,
            text: question.text.clone(),
            is_correct: answer.is_correct,
            options,
            explanation: question
                .explanation
                .as_deref()
                .map(str::trim)
                .filter(|e| !e.is_empty())
                .map(str::to_string),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SubmissionReview {
    pub quiz_title: Option<String>,
    pub score: f64,
    pub completed_at: Option<DateTime<Utc>>,
    pub questions: Vec<QuestionReview>,
}

impl SubmissionReview {
    pub fn from_submission(submission: &GradedSubmission) -> Self {
        Self {
            quiz_title: submission.quiz_title().map(str::to_string),
            score: submission.score,
            completed_at: submission.completed_at,
            questions: submission
                .answers
                .iter()
                .enumerate()
                .map(|(index, answer)| QuestionReview::new(index + 1, answer))
                .collect(),
        }
    }

    pub fn correct_count(&self) -> usize {
        self.questions.iter().filter(|q| q.is_correct).count()
    }
}

impl fmt::Display for SubmissionReview {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.quiz_title.as_deref().unwrap_or("Quiz"))?;
        write!(
            f,
            ": {}% ({}/{} correct)",
            self.score,
            self.correct_count(),
            self.questions.len()
        )?;
        if let Some(completed_at) = self.completed_at {
            write!(f, ", completed {}", completed_at.format("%Y-%m-%d %H:%M"))?;
        }
        writeln!(f)?;

        for question in &self.questions {
            let verdict = if question.is_correct { "correct" } else { "incorrect" };
            writeln!(f, "\n{}. {} ({verdict})", question.position, question.text)?;
            for option in &question.options {
                writeln!(f, "   {} {}", option.display.marker(), option.text)?;
            }
            if let Some(explanation) = &question.explanation {
                writeln!(f, "   > {explanation}")?;
            }
        }
        Ok(())
    }
}
