//! Utterances, transcripts, and the content-provider seam.
//!
//! RULE: The conversation engine decides WHAT kind of line is spoken.
//! An UtteranceSelector decides only the words. Swapping the selector
//! changes tone or locale, never outcomes.

use crate::{
    rng::CallRng,
    types::{FrustrationTier, IssueCategory, Persona, SkillTier, Speaker},
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Utterance {
    pub speaker: Speaker,
    pub text:    String,
}

impl Utterance {
    pub fn word_count(&self) -> usize {
        self.text.split_whitespace().count()
    }
}

/// Ordered, append-only record of a call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Transcript {
    utterances: Vec<Utterance>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, speaker: Speaker, text: String) {
        self.utterances.push(Utterance { speaker, text });
    }

    pub fn len(&self) -> usize {
        self.utterances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.utterances.is_empty()
    }

    pub fn utterances(&self) -> &[Utterance] {
        &self.utterances
    }

    /// Whitespace-token count for one speaker.
    pub fn word_count(&self, speaker: Speaker) -> usize {
        self.utterances
            .iter()
            .filter(|u| u.speaker == speaker)
            .map(Utterance::word_count)
            .sum()
    }

    /// All utterance texts joined by single spaces.
    pub fn clean_text(&self) -> String {
        self.utterances
            .iter()
            .map(|u| u.text.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// The kind of line the engine needs rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum UtteranceKind {
    /// Customer states the problem before the agent speaks.
    Opening,
    Greeting,
    /// Agent moved the issue forward.
    Progress { tier: SkillTier },
    /// Agent made no headway this turn.
    Stall { tier: SkillTier },
    Reaction { tier: FrustrationTier },
    /// Customer hangs up.
    Farewell,
}

impl UtteranceKind {
    pub fn speaker(&self) -> Speaker {
        match self {
            Self::Greeting | Self::Progress { .. } | Self::Stall { .. } => Speaker::Agent,
            Self::Opening | Self::Reaction { .. } | Self::Farewell => Speaker::Customer,
        }
    }
}

/// Everything a content provider may key on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UtteranceCue {
    pub kind:    UtteranceKind,
    pub persona: Persona,
    pub issue:   IssueCategory,
}

impl UtteranceCue {
    pub fn speaker(&self) -> Speaker {
        self.kind.speaker()
    }
}

/// Injected content provider. Implementations must be deterministic
/// given the RNG handle, and shareable across worker threads.
pub trait UtteranceSelector: Send + Sync {
    fn select(&self, cue: &UtteranceCue, rng: &mut CallRng) -> String;
}
