//! Derived research metrics over a canonical (possibly scoped) document.
//!
//! Every function here is a pure read of the document: no network, no
//! mutation, cheap enough to recompute per export.

use serde::{Deserialize, Serialize};

use crate::models::{Author, BlockType, ConversationDocument};

const REASONING_KEYWORDS: &[&str] = &[
    "because", "therefore", "however", "consider", "implies", "consequently", "thus", "since",
];
const QUESTIONING_KEYWORDS: &[&str] = &[
    "what if", "why", "how might", "could we", "should we", "wonder",
];
const CORRECTION_KEYWORDS: &[&str] = &[
    "actually", "wait", "correction", "i was wrong", "let me reconsider", "mistake",
];
const EXPLORATION_KEYWORDS: &[&str] = &[
    "alternatively", "another approach", "let me try", "explore", "option", "instead",
];

const MATH_MARKERS: &[&str] = &["\\frac", "\\sum", "\\int", "$$", "\\begin{equation}", "√", "∑"];
const ARTIFACT_MARKERS: &[&str] = &["artifact", "canvas", "preview"];

/// Keyword-tally over thinking-block and assistant-message text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThinkingPatterns {
    pub reasoning: usize,
    pub questioning: usize,
    pub correction: usize,
    pub exploration: usize,
}

/// Turn-taking shape of the conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationFlow {
    pub turn_count: usize,
    /// `user` or `assistant`, from the first message.
    pub initiated_by: String,
    pub user_turns: usize,
    pub assistant_turns: usize,
    /// Mean assistant response length in words, 0.0 when no assistant turns.
    pub mean_assistant_words: f64,
}

/// Unique/total ratio over words longer than three characters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VocabularyRichness {
    pub unique_words: usize,
    pub total_words: usize,
    pub ratio: f64,
}

/// Presence flags and their 0-4 sum.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StructuralComplexity {
    pub has_code: bool,
    pub has_math: bool,
    pub has_artifacts: bool,
    pub has_thinking: bool,
    pub score: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsReport {
    pub thinking_patterns: ThinkingPatterns,
    pub flow: ConversationFlow,
    pub vocabulary: VocabularyRichness,
    pub complexity: StructuralComplexity,
}

/// Compute the full metrics report for a document.
pub fn analyze(doc: &ConversationDocument) -> AnalyticsReport {
    AnalyticsReport {
        thinking_patterns: thinking_patterns(doc),
        flow: conversation_flow(doc),
        vocabulary: vocabulary_richness(doc),
        complexity: structural_complexity(doc),
    }
}

pub fn thinking_patterns(doc: &ConversationDocument) -> ThinkingPatterns {
    let mut corpus = String::new();
    for block in &doc.thinking_blocks {
        corpus.push_str(&block.content.to_lowercase());
        corpus.push('\n');
    }
    for message in doc.messages.iter().filter(|m| m.author == Author::Assistant) {
        corpus.push_str(&message.content.to_lowercase());
        corpus.push('\n');
    }

    let tally = |keywords: &[&str]| keywords.iter().map(|k| corpus.matches(k).count()).sum();
    ThinkingPatterns {
        reasoning: tally(REASONING_KEYWORDS),
        questioning: tally(QUESTIONING_KEYWORDS),
        correction: tally(CORRECTION_KEYWORDS),
        exploration: tally(EXPLORATION_KEYWORDS),
    }
}

pub fn conversation_flow(doc: &ConversationDocument) -> ConversationFlow {
    let user_turns = doc.messages.iter().filter(|m| m.author == Author::User).count();
    let assistant_turns = doc.messages.len() - user_turns;
    let assistant_words: usize = doc
        .messages
        .iter()
        .filter(|m| m.author == Author::Assistant)
        .map(|m| m.word_count)
        .sum();

    ConversationFlow {
        turn_count: doc.messages.len(),
        initiated_by: doc
            .messages
            .first()
            .map(|m| m.author.as_str().to_string())
            .unwrap_or_else(|| "user".to_string()),
        user_turns,
        assistant_turns,
        mean_assistant_words: if assistant_turns == 0 {
            0.0
        } else {
            assistant_words as f64 / assistant_turns as f64
        },
    }
}

pub fn vocabulary_richness(doc: &ConversationDocument) -> VocabularyRichness {
    let mut total = 0usize;
    let mut unique = std::collections::HashSet::new();
    for message in &doc.messages {
        for word in message.content.split_whitespace() {
            let word: String = word
                .chars()
                .filter(|c| c.is_alphanumeric())
                .collect::<String>()
                .to_lowercase();
            if word.chars().count() > 3 {
                total += 1;
                unique.insert(word);
            }
        }
    }
    VocabularyRichness {
        unique_words: unique.len(),
        total_words: total,
        ratio: if total == 0 { 0.0 } else { unique.len() as f64 / total as f64 },
    }
}

pub fn structural_complexity(doc: &ConversationDocument) -> StructuralComplexity {
    let has_code = doc.messages.iter().any(|m| m.content.contains("```"))
        || doc
            .thinking_blocks
            .iter()
            .any(|b| matches!(b.block_type, BlockType::Code | BlockType::FileEdit));
    let has_math = doc
        .messages
        .iter()
        .any(|m| MATH_MARKERS.iter().any(|marker| m.content.contains(marker)));
    let has_artifacts = doc.messages.iter().any(|m| {
        let lower = m.content.to_lowercase();
        ARTIFACT_MARKERS.iter().any(|marker| lower.contains(marker))
    }) || !doc.metadata.uploaded_documents.is_empty();
    let has_thinking = !doc.thinking_blocks.is_empty();

    let score = [has_code, has_math, has_artifacts, has_thinking]
        .iter()
        .filter(|flag| **flag)
        .count() as u8;

    StructuralComplexity { has_code, has_math, has_artifacts, has_thinking, score }
}
