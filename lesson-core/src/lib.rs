//! Lesson generation, rendering, quiz grading and read-aloud control for
//! the Context Weaver desktop app. The Tauri shell only forwards commands
//! into [`session::Session`] and relays the resulting render batches.

pub mod client;
pub mod commands;
pub mod config;
pub mod error;
pub mod highlight;
pub mod levels;
pub mod models;
pub mod playback;
pub mod prompts;
pub mod quiz;
pub mod render;
pub mod session;

pub use client::{CompletionService, GenerationClient};
pub use commands::{RenderBatch, RenderCommand, UiEvent};
pub use config::{Settings, SettingsView};
pub use error::{PlaybackError, QuizError, WeaveError};
pub use levels::{level_options, CefrLevel, LevelOption};
pub use models::{LengthMode, LessonForm, Track};
pub use session::{generate_lesson, Session};
