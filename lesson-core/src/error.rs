//! Error taxonomy for lesson generation, quiz grading and playback

use crate::models::Track;

#[derive(Debug, thiserror::Error)]
pub enum WeaveError {
    /// Rejected before any request was made.
    #[error("{0}")]
    Input(String),

    #[error("API Error: {status} - {body}")]
    Upstream { status: u16, body: String },

    #[error("API request failed: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("Model response was not valid lesson JSON: {0}")]
    MalformedResponse(String),

    #[error("A lesson is already being generated")]
    Busy,

    #[error(transparent)]
    Quiz(#[from] QuizError),

    #[error(transparent)]
    Playback(#[from] PlaybackError),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QuizError {
    #[error("Quiz has not been rendered")]
    NotRendered,

    #[error("Quiz has already been submitted")]
    AlreadySubmitted,

    #[error("Quiz has no question {0}")]
    UnknownQuestion(usize),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PlaybackError {
    #[error("Nothing to read aloud in the {0} text")]
    NothingToRead(Track),

    #[error("Speech engine error: {0}")]
    Engine(String),
}
