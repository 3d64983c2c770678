//! Data models and structures used throughout the lesson pipeline

use crate::config::Settings;
use crate::error::WeaveError;
use crate::levels::CefrLevel;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Theme used when the learner leaves the theme blank
pub const DEFAULT_THEME: &str = "Daily Life";

/// The two text variants of a lesson. Each has its own text, translation,
/// quiz and read-aloud control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Track {
    Simple,
    Complex,
}

impl Track {
    pub const ALL: [Track; 2] = [Track::Simple, Track::Complex];

    pub fn as_str(self) -> &'static str {
        match self {
            Track::Simple => "simple",
            Track::Complex => "complex",
        }
    }

    /// Position of the track in per-track arrays
    pub fn index(self) -> usize {
        match self {
            Track::Simple => 0,
            Track::Complex => 1,
        }
    }
}

impl fmt::Display for Track {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LengthMode {
    #[default]
    Short,
    Long,
}

impl LengthMode {
    pub fn label(self) -> &'static str {
        match self {
            LengthMode::Short => "SHORT",
            LengthMode::Long => "LONG",
        }
    }

    /// Target word count for the story text
    pub fn simple_range(self) -> &'static str {
        match self {
            LengthMode::Short => "100-150",
            LengthMode::Long => "250-350",
        }
    }

    /// Target word count for the formal text
    pub fn complex_range(self) -> &'static str {
        match self {
            LengthMode::Short => "80-120",
            LengthMode::Long => "200-300",
        }
    }
}

/// Raw values from the generation form
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LessonForm {
    pub words: String,
    #[serde(default)]
    pub theme: String,
    pub level: CefrLevel,
    #[serde(default)]
    pub length: LengthMode,
}

/// Everything needed for one generation round trip
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub words: Vec<String>,
    pub theme: String,
    pub level: CefrLevel,
    pub length: LengthMode,
    pub model: String,
    pub credential: String,
}

impl GenerationRequest {
    /// Validates the form against the current settings. Fails before any
    /// network activity when the word list is empty or the endpoint
    /// credentials are missing.
    pub fn new(form: &LessonForm, settings: &Settings) -> Result<Self, WeaveError> {
        let words = parse_word_list(&form.words);
        if words.is_empty() {
            return Err(WeaveError::Input("Please enter some words!".to_string()));
        }

        let model = settings.model.trim();
        if model.is_empty() {
            return Err(WeaveError::Input("Model ID not configured".to_string()));
        }

        let credential = settings
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .ok_or_else(|| WeaveError::Input("API key not configured".to_string()))?;

        let theme = match form.theme.trim() {
            "" => DEFAULT_THEME.to_string(),
            theme => theme.to_string(),
        };

        Ok(Self {
            words,
            theme,
            level: form.level,
            length: form.length,
            model: model.to_string(),
            credential: credential.to_string(),
        })
    }
}

/// Splits the comma-separated word field into trimmed, non-empty tokens
pub fn parse_word_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|w| !w.is_empty())
        .map(str::to_string)
        .collect()
}

/// Option letter of a multiple-choice question
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String")]
pub enum OptionLabel {
    A,
    B,
    C,
    D,
}

impl OptionLabel {
    pub const ALL: [OptionLabel; 4] = [OptionLabel::A, OptionLabel::B, OptionLabel::C, OptionLabel::D];

    pub fn as_str(self) -> &'static str {
        match self {
            OptionLabel::A => "A",
            OptionLabel::B => "B",
            OptionLabel::C => "C",
            OptionLabel::D => "D",
        }
    }

    /// Reads the first letter of `raw`, so "b", "B." and "B) Paris" all give `B`
    pub fn parse_lenient(raw: &str) -> Option<Self> {
        match raw.trim().chars().next()?.to_ascii_uppercase() {
            'A' => Some(OptionLabel::A),
            'B' => Some(OptionLabel::B),
            'C' => Some(OptionLabel::C),
            'D' => Some(OptionLabel::D),
            _ => None,
        }
    }
}

impl TryFrom<String> for OptionLabel {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        OptionLabel::parse_lenient(&value).ok_or_else(|| format!("invalid answer label: {:?}", value))
    }
}

impl fmt::Display for OptionLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuizQuestion {
    pub question: String,
    pub options: Vec<String>,
    pub correct_answer: OptionLabel,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VocabEntry {
    pub word: String,
    #[serde(default)]
    pub definition_cn: String,
    #[serde(default)]
    pub pronunciation_guide: String,
    #[serde(default)]
    pub sentence_example: String,
}

/// Parsed model output. Both texts are required; translations, quizzes and
/// vocabulary may be absent or null and then render as empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LessonPayload {
    pub simple_text: String,
    #[serde(default)]
    pub simple_text_cn: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub simple_quiz: Vec<QuizQuestion>,
    pub complex_text: String,
    #[serde(default)]
    pub complex_text_cn: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub complex_quiz: Vec<QuizQuestion>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub vocabulary_data: Vec<VocabEntry>,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl LessonPayload {
    pub fn text(&self, track: Track) -> &str {
        match track {
            Track::Simple => &self.simple_text,
            Track::Complex => &self.complex_text,
        }
    }

    /// Translation for `track`, only when present and non-blank
    pub fn translation(&self, track: Track) -> Option<&str> {
        let raw = match track {
            Track::Simple => self.simple_text_cn.as_deref(),
            Track::Complex => self.complex_text_cn.as_deref(),
        };
        raw.filter(|t| !t.trim().is_empty())
    }

    pub fn quiz(&self, track: Track) -> &[QuizQuestion] {
        match track {
            Track::Simple => &self.simple_quiz,
            Track::Complex => &self.complex_quiz,
        }
    }
}

/// The single live lesson held by the session
#[derive(Debug, Clone)]
pub struct Lesson {
    pub payload: LessonPayload,
    pub words: Vec<String>,
    pub theme: String,
    pub level: CefrLevel,
    pub generated_at: DateTime<Utc>,
}
