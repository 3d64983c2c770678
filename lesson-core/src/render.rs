//! Builds the display model of a lesson

use crate::highlight::{plain_text, Highlighter, Segment};
use crate::models::{Lesson, Track, VocabEntry};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TranslationPanel {
    pub text: String,
    pub collapsed: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TextPanel {
    pub track: Track,
    pub segments: Vec<Segment>,
    /// `None` hides the translation panel
    pub translation: Option<TranslationPanel>,
}

impl TextPanel {
    /// The displayed text without markup, as read aloud
    pub fn plain_text(&self) -> String {
        plain_text(&self.segments)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VocabCard {
    pub word: String,
    pub speak: String,
    pub pronunciation: String,
    pub definition: String,
    pub example: String,
}

impl From<&VocabEntry> for VocabCard {
    fn from(entry: &VocabEntry) -> Self {
        let guide = entry.pronunciation_guide.trim().trim_matches('/');
        Self {
            word: entry.word.clone(),
            speak: entry.word.trim().to_string(),
            pronunciation: if guide.is_empty() {
                String::new()
            } else {
                format!("/{}/", guide)
            },
            definition: entry.definition_cn.clone(),
            example: if entry.sentence_example.is_empty() {
                String::new()
            } else {
                format!("\"{}\"", entry.sentence_example)
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LessonView {
    pub level: String,
    pub theme: String,
    /// `YYYY-MM-DD HH:MM UTC`
    pub generated_at: String,
    pub simple: TextPanel,
    pub complex: TextPanel,
    pub vocabulary: Vec<VocabCard>,
}

impl LessonView {
    pub fn panel(&self, track: Track) -> &TextPanel {
        match track {
            Track::Simple => &self.simple,
            Track::Complex => &self.complex,
        }
    }

    pub fn panel_mut(&mut self, track: Track) -> &mut TextPanel {
        match track {
            Track::Simple => &mut self.simple,
            Track::Complex => &mut self.complex,
        }
    }
}

/// Renders texts with highlighted target words, translation panels
/// (collapsed, and only when a translation exists) and vocabulary cards in
/// payload order. Quizzes are rendered separately by the quiz engine.
pub fn render_lesson(lesson: &Lesson) -> LessonView {
    let highlighter = Highlighter::new(&lesson.words);
    let panel = |track: Track| TextPanel {
        track,
        segments: highlighter.segments(lesson.payload.text(track)),
        translation: lesson.payload.translation(track).map(|text| TranslationPanel {
            text: text.to_string(),
            collapsed: true,
        }),
    };

    LessonView {
        level: format!("{} - {}", lesson.level, lesson.level.name()),
        theme: lesson.theme.clone(),
        generated_at: lesson.generated_at.format("%Y-%m-%d %H:%M UTC").to_string(),
        simple: panel(Track::Simple),
        complex: panel(Track::Complex),
        vocabulary: lesson.payload.vocabulary_data.iter().map(VocabCard::from).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::levels::CefrLevel;
    use crate::models::LessonPayload;
    use chrono::{TimeZone, Utc};

    fn lesson(payload: LessonPayload) -> Lesson {
        Lesson {
            payload,
            words: vec!["harbor".to_string(), "lantern".to_string()],
            theme: "Mystery".to_string(),
            level: CefrLevel::B1,
            generated_at: Utc::now(),
        }
    }

    fn payload() -> LessonPayload {
        serde_json::from_str(
            r#"{
                "simple_text": "The lantern glowed by the Harbor.",
                "simple_text_cn": "灯笼在港口旁发光。",
                "complex_text": "Harbor authorities lit a lantern.",
                "complex_text_cn": "",
                "vocabulary_data": [
                    {"word": "lantern", "definition_cn": "灯笼", "pronunciation_guide": "ˈlæntərn", "sentence_example": "She held a lantern."},
                    {"word": "harbor", "definition_cn": "港口", "pronunciation_guide": "/ˈhɑːrbər/", "sentence_example": "Boats rest in the harbor."}
                ]
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_texts_are_highlighted() {
        let view = render_lesson(&lesson(payload()));
        let targets: Vec<&str> = view
            .simple
            .segments
            .iter()
            .filter_map(|s| match s {
                Segment::Target { text } => Some(text.as_str()),
                Segment::Plain { .. } => None,
            })
            .collect();
        assert_eq!(targets, vec!["lantern", "Harbor"]);
        assert_eq!(view.simple.plain_text(), "The lantern glowed by the Harbor.");
    }

    #[test]
    fn test_translation_shown_only_when_present() {
        let view = render_lesson(&lesson(payload()));
        let simple = view.simple.translation.as_ref().unwrap();
        assert_eq!(simple.text, "灯笼在港口旁发光。");
        assert!(simple.collapsed);
        assert!(view.complex.translation.is_none());
    }

    #[test]
    fn test_vocab_cards_follow_payload_order() {
        let view = render_lesson(&lesson(payload()));
        let words: Vec<&str> = view.vocabulary.iter().map(|c| c.word.as_str()).collect();
        assert_eq!(words, vec!["lantern", "harbor"]);
        assert_eq!(view.vocabulary[0].pronunciation, "/ˈlæntərn/");
        assert_eq!(view.vocabulary[1].pronunciation, "/ˈhɑːrbər/");
        assert_eq!(view.vocabulary[0].example, "\"She held a lantern.\"");
        assert_eq!(view.vocabulary[0].speak, "lantern");
    }

    #[test]
    fn test_header_names_level_and_theme() {
        let view = render_lesson(&lesson(payload()));
        assert_eq!(view.level, "B1 - Intermediate (中级)");
        assert_eq!(view.theme, "Mystery");
    }

    #[test]
    fn test_header_carries_generation_time() {
        let mut lesson = lesson(payload());
        lesson.generated_at = Utc.with_ymd_and_hms(2026, 3, 14, 9, 5, 0).unwrap();
        let view = render_lesson(&lesson);
        assert_eq!(view.generated_at, "2026-03-14 09:05 UTC");
    }
}
