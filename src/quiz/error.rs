use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QuestionError {
    #[error("Question text is required")]
    EmptyText,
    #[error("At least one option is required")]
    NoOptions,
    #[error("At least {min} options are required")]
    TooFewOptions { min: usize },
    #[error("True/false questions must have exactly the options \"True\" and \"False\"")]
    TrueFalseOptions,
    #[error("Option {position} has no text")]
    EmptyOption { position: usize },
    #[error("Points must be greater than 0")]
    InvalidPoints,
    #[error("Select at least one correct option")]
    NoCorrectOption,
    #[error("Only one option can be correct for this question type")]
    MultipleCorrect,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CanonicalError {
    #[error("Question {position} has no correct answer that matches its options")]
    NoCorrectAnswer { position: usize },
}
