//! Prompt templates for lesson generation

use crate::models::GenerationRequest;

/// Closing instruction of the system prompt
pub const JSON_ONLY_INSTRUCTION: &str = "IMPORTANT: Return ONLY valid JSON. No extra text before or after.";

/// System and user instructions for one chat completion
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub system: String,
    pub user: String,
}

/// Builds the lesson prompt. Deterministic: the same request always gives the same text.
pub fn build_prompt(request: &GenerationRequest) -> Prompt {
    Prompt {
        system: build_system_prompt(request),
        user: format!("Words: {}", request.words.join(", ")),
    }
}

fn build_system_prompt(request: &GenerationRequest) -> String {
    let level = request.level;
    let profile = level.profile();
    let length = request.length;
    let theme = &request.theme;

    format!(
        r#"You are an expert English teacher specializing in CEFR-aligned content creation.
The learner's current level is: **{level} - {name}**.
Article length preference: **{length_label}**

IMPORTANT LANGUAGE GUIDELINES for {level}:
{guidelines}

Your task is to take a list of words and a theme, then generate the following in JSON format:
1. 'simple_text': An engaging short story using ALL the input words naturally. The story MUST follow the theme: "{theme}". Strictly adhere to the {level} language guidelines above. The story should be approximately {simple_range} words.
2. 'simple_text_cn': The Chinese translation of 'simple_text'. Should be natural and fluent Chinese.
3. 'simple_quiz': An array of exactly 3 multiple-choice questions about the simple_text story. Each question object must have:
   - 'question': The question in English (suitable for {level} level).
   - 'options': An array of exactly 4 options (A, B, C, D).
   - 'correct_answer': The correct option letter (A, B, C, or D).
4. 'complex_text': A slightly more formal text (news snippet, diary entry, or informational paragraph) using the words. Still respects the {level} level but feels more "real-world". Approximately {complex_range} words.
5. 'complex_text_cn': The Chinese translation of 'complex_text'.
6. 'complex_quiz': An array of exactly 3 multiple-choice questions about the complex_text. Same format as simple_quiz.
7. 'vocabulary_data': An array of objects for each input word. Each object must have:
   - 'word': The word itself.
   - 'definition_cn': A concise Chinese definition.
   - 'pronunciation_guide': IPA or phonetic spelling.
   - 'sentence_example': A separate example sentence (not from the story), suitable for {level} level.

{json_only}"#,
        name = profile.name,
        length_label = length.label(),
        guidelines = profile.guidelines,
        simple_range = length.simple_range(),
        complex_range = length.complex_range(),
        json_only = JSON_ONLY_INSTRUCTION,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::levels::CefrLevel;
    use crate::models::LengthMode;

    fn request(level: CefrLevel, length: LengthMode) -> GenerationRequest {
        GenerationRequest {
            words: vec!["harbor".to_string(), "lantern".to_string()],
            theme: "Mystery".to_string(),
            level,
            length,
            model: "m".to_string(),
            credential: "k".to_string(),
        }
    }

    #[test]
    fn test_system_prompt_embeds_level_and_length_for_all_combinations() {
        for level in CefrLevel::ALL {
            for (length, simple, complex) in [
                (LengthMode::Short, "100-150", "80-120"),
                (LengthMode::Long, "250-350", "200-300"),
            ] {
                let prompt = build_prompt(&request(level, length));
                assert!(prompt.system.contains(level.profile().guidelines));
                assert!(prompt.system.contains(level.profile().name));
                assert!(prompt.system.contains(&format!("approximately {} words", simple)));
                assert!(prompt.system.contains(&format!("Approximately {} words", complex)));
                assert!(prompt.system.contains(length.label()));
            }
        }
    }

    #[test]
    fn test_system_prompt_names_every_field() {
        let prompt = build_prompt(&request(CefrLevel::B1, LengthMode::Short));
        for field in [
            "simple_text",
            "simple_text_cn",
            "simple_quiz",
            "complex_text",
            "complex_text_cn",
            "complex_quiz",
            "vocabulary_data",
            "correct_answer",
            "definition_cn",
            "pronunciation_guide",
            "sentence_example",
        ] {
            assert!(prompt.system.contains(&format!("'{}'", field)), "missing {}", field);
        }
        assert!(prompt.system.contains("exactly 3 multiple-choice questions"));
        assert!(prompt.system.contains("exactly 4 options"));
        assert!(prompt.system.ends_with(JSON_ONLY_INSTRUCTION));
        assert!(prompt.system.contains("\"Mystery\""));
    }

    #[test]
    fn test_user_prompt_carries_words() {
        let prompt = build_prompt(&request(CefrLevel::A1, LengthMode::Long));
        assert_eq!(prompt.user, "Words: harbor, lantern");
    }

    #[test]
    fn test_prompt_is_deterministic() {
        let a = build_prompt(&request(CefrLevel::C2, LengthMode::Long));
        let b = build_prompt(&request(CefrLevel::C2, LengthMode::Long));
        assert_eq!(a, b);
    }
}
