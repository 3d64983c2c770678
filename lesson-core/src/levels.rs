//! CEFR level catalog used to calibrate generated text difficulty

use crate::error::WeaveError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CefrLevel {
    A1,
    A2,
    B1,
    B2,
    C1,
    C2,
}

/// Display name plus the free-form guideline block embedded in the system prompt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelProfile {
    pub name: &'static str,
    pub guidelines: &'static str,
}

/// Entry for the difficulty selector
#[derive(Debug, Clone, Serialize)]
pub struct LevelOption {
    pub tag: CefrLevel,
    pub name: &'static str,
}

const A1_PROFILE: LevelProfile = LevelProfile {
    name: "Beginner (入门级)",
    guidelines: r#"
- Use only the most basic vocabulary (high-frequency words like: is, have, go, come, like, want)
- Very short, simple sentences (5-8 words max)
- Present tense only
- No idioms, no phrasal verbs
- Repetition of key structures is encouraged
- Story length: approx 80 words
- Complex text: approx 50 words, still simple but slightly more formal"#,
};

const A2_PROFILE: LevelProfile = LevelProfile {
    name: "Elementary (基础级)",
    guidelines: r#"
- Common everyday vocabulary
- Simple and compound sentences (use "and", "but", "because")
- Past simple and present continuous allowed
- Basic phrasal verbs (look at, get up)
- Story length: approx 100 words
- Complex text: approx 70 words"#,
};

const B1_PROFILE: LevelProfile = LevelProfile {
    name: "Intermediate (中级)",
    guidelines: r#"
- Wider range of vocabulary including some less common words
- Complex sentences with dependent clauses (when, if, although)
- All basic tenses including present perfect
- Common idioms and phrasal verbs allowed
- Story length: approx 150 words
- Complex text: approx 100 words"#,
};

const B2_PROFILE: LevelProfile = LevelProfile {
    name: "Upper-Intermediate (中高级)",
    guidelines: r#"
- Rich vocabulary including abstract and topic-specific words
- Complex sentence structures, passive voice, conditionals
- All tenses including past perfect
- Idiomatic expressions and varied phrasal verbs
- Story length: approx 180 words
- Complex text: approx 120 words, more formal and nuanced"#,
};

const C1_PROFILE: LevelProfile = LevelProfile {
    name: "Advanced (高级)",
    guidelines: r#"
- Sophisticated and nuanced vocabulary
- Complex grammatical structures, advanced conditionals, subjunctive
- Idiomatic and colloquial expressions freely used
- Subtle shades of meaning, irony, and rhetorical devices
- Story length: approx 200+ words
- Complex text: approx 150 words, academic or journalistic style"#,
};

const C2_PROFILE: LevelProfile = LevelProfile {
    name: "Mastery (精通级)",
    guidelines: r#"
- Near-native proficiency, full command of sophisticated vocabulary
- Effortless use of complex grammatical structures, nuanced expressions
- Literary devices, abstract reasoning, and cultural references
- Ability to appreciate subtle differences in meaning and register
- Story length: approx 250+ words
- Complex text: approx 200 words, publishable quality, elegant prose"#,
};

impl CefrLevel {
    pub const ALL: [CefrLevel; 6] = [
        CefrLevel::A1,
        CefrLevel::A2,
        CefrLevel::B1,
        CefrLevel::B2,
        CefrLevel::C1,
        CefrLevel::C2,
    ];

    pub fn tag(self) -> &'static str {
        match self {
            CefrLevel::A1 => "A1",
            CefrLevel::A2 => "A2",
            CefrLevel::B1 => "B1",
            CefrLevel::B2 => "B2",
            CefrLevel::C1 => "C1",
            CefrLevel::C2 => "C2",
        }
    }

    pub fn profile(self) -> &'static LevelProfile {
        match self {
            CefrLevel::A1 => &A1_PROFILE,
            CefrLevel::A2 => &A2_PROFILE,
            CefrLevel::B1 => &B1_PROFILE,
            CefrLevel::B2 => &B2_PROFILE,
            CefrLevel::C1 => &C1_PROFILE,
            CefrLevel::C2 => &C2_PROFILE,
        }
    }

    pub fn name(self) -> &'static str {
        self.profile().name
    }
}

impl fmt::Display for CefrLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for CefrLevel {
    type Err = WeaveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        CefrLevel::ALL
            .into_iter()
            .find(|level| level.tag().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| WeaveError::Input(format!("Unknown CEFR level: {}", s)))
    }
}

/// Options for the difficulty selector, lowest level first
pub fn level_options() -> Vec<LevelOption> {
    CefrLevel::ALL
        .into_iter()
        .map(|tag| LevelOption {
            tag,
            name: tag.name(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_level_is_case_insensitive() {
        assert_eq!("b2".parse::<CefrLevel>().unwrap(), CefrLevel::B2);
        assert_eq!(" C1 ".parse::<CefrLevel>().unwrap(), CefrLevel::C1);
    }

    #[test]
    fn test_parse_unknown_level_is_input_error() {
        let err = "D1".parse::<CefrLevel>().unwrap_err();
        assert!(matches!(err, WeaveError::Input(_)));
    }

    #[test]
    fn test_level_options_in_catalog_order() {
        let options = level_options();
        let tags: Vec<&str> = options.iter().map(|o| o.tag.tag()).collect();
        assert_eq!(tags, ["A1", "A2", "B1", "B2", "C1", "C2"]);
        assert_eq!(options[0].name, "Beginner (入门级)");
    }

    #[test]
    fn test_every_level_has_distinct_guidelines() {
        for (i, a) in CefrLevel::ALL.iter().enumerate() {
            for b in &CefrLevel::ALL[i + 1..] {
                assert_ne!(a.profile().guidelines, b.profile().guidelines);
            }
        }
    }
}
