//! Default English phrase library.
//!
//! Curated line lists keyed by (speaker, persona, issue, tier).
//! All selection is deterministic (same RNG stream = same lines).

use crate::{
    rng::CallRng,
    types::{FrustrationTier, IssueCategory, Persona, SkillTier},
    utterance::{UtteranceCue, UtteranceKind, UtteranceSelector},
};

/// Deterministic line picker over static phrase tables
#[derive(Debug, Clone, Copy, Default)]
pub struct PhraseLibrary;

impl UtteranceSelector for PhraseLibrary {
    fn select(&self, cue: &UtteranceCue, rng: &mut CallRng) -> String {
        match cue.kind {
            UtteranceKind::Opening => Self::opening(cue.persona, cue.issue).to_string(),
            UtteranceKind::Greeting => {
                let name = rng.pick(Self::agent_names());
                format!("Thank you for calling. This is {name}. How can I assist you today?")
            }
            UtteranceKind::Progress { tier } => {
                rng.pick(Self::progress_lines(tier, cue.issue)).to_string()
            }
            UtteranceKind::Stall { tier } => rng.pick(Self::stall_lines(tier)).to_string(),
            UtteranceKind::Reaction { tier } => {
                rng.pick(Self::reaction_lines(tier, cue.persona)).to_string()
            }
            UtteranceKind::Farewell => "I'm done with this. Goodbye.".to_string(),
        }
    }
}

impl PhraseLibrary {
    fn agent_names() -> &'static [&'static str] {
        &["Sarah", "Mike", "Jennifer", "David", "Alex", "Taylor"]
    }

    /// The customer's problem statement. One fixed line per persona × issue.
    fn opening(persona: Persona, issue: IssueCategory) -> &'static str {
        use IssueCategory as I;
        use Persona as P;
        match (issue, persona) {
            (I::Billing, P::Angry)     => "My bill is completely wrong and I demand you fix it RIGHT NOW!",
            (I::Billing, P::Loyal)     => "I noticed some unusual charges on my bill and wanted to check them.",
            (I::Billing, P::Elderly)   => "I don't understand these charges on my bill, dear.",
            (I::Billing, P::Business)  => "There are unauthorized charges on my corporate account that need immediate attention.",
            (I::Billing, P::TechSavvy) => "I've identified billing discrepancies that require correction.",
            (I::Billing, P::ChurnRisk) => "This is exactly why I'm cancelling - your billing is a mess!",

            (I::Internet, P::Angry)     => "My internet has been down for HOURS! I pay for reliable service!",
            (I::Internet, P::Loyal)     => "My connection has been spotty lately. Any idea what's happening?",
            (I::Internet, P::Elderly)   => "The internet isn't working properly. I can't get my emails.",
            (I::Internet, P::Business)  => "Internet is down and it's affecting my business operations. Need immediate fix.",
            (I::Internet, P::TechSavvy) => "I'm seeing significant packet loss and high latency. Check your infrastructure.",
            (I::Internet, P::ChurnRisk) => "This is why I'm leaving - your service is unreliable!",

            (I::Device, P::Angry)     => "Your device doesn't work and your instructions are garbage!",
            (I::Device, P::Loyal)     => "I'm having trouble setting up my new device. Can you help?",
            (I::Device, P::Elderly)   => "I can't figure out how to use this new phone. It's too complicated.",
            (I::Device, P::Business)  => "New device isn't working properly. Need it fixed for tomorrow's presentation.",
            (I::Device, P::TechSavvy) => "I'm experiencing firmware configuration issues.",
            (I::Device, P::ChurnRisk) => "Your equipment is junk. This is why I'm switching!",

            (I::Cancellation, P::Angry)     => "I'm cancelling IMMEDIATELY! Your service is absolutely terrible!",
            (I::Cancellation, P::Loyal)     => "I need to cancel my service. Circumstances have changed.",
            (I::Cancellation, P::Elderly)   => "I think I need to cancel some services. I don't use them all.",
            (I::Cancellation, P::Business)  => "I'm switching providers. Your service doesn't meet our business needs.",
            (I::Cancellation, P::TechSavvy) => "I'm cancelling due to consistent service quality issues.",
            (I::Cancellation, P::ChurnRisk) => "I'm cancelling. I already found a better provider!",

            (I::Upgrade, P::Angry)     => "I want to upgrade but your process is so frustrating!",
            (I::Upgrade, P::Loyal)     => "I'd like to upgrade my plan. What options do you have?",
            (I::Upgrade, P::Elderly)   => "I was told I could upgrade. Can you help me with that?",
            (I::Upgrade, P::Business)  => "I need to upgrade for business expansion. What's available?",
            (I::Upgrade, P::TechSavvy) => "I want to upgrade to the highest speed plan.",
            (I::Upgrade, P::ChurnRisk) => "I'll consider upgrading if you can fix these issues.",
        }
    }

    fn progress_lines(tier: SkillTier, issue: IssueCategory) -> &'static [&'static str] {
        use IssueCategory as I;
        match (tier, issue) {
            (SkillTier::High, I::Billing) => &[
                "I can see the issue with your bill. Let me correct those charges immediately.",
                "I've located the error in your billing. I'll process a credit for you now.",
                "I understand your concern. Let me review your account and fix this.",
            ],
            (SkillTier::High, I::Internet) => &[
                "I can see there's an outage in your area. We expect service to be restored soon.",
                "I'm checking your connection status and seeing some network issues.",
                "I can reset your connection remotely to resolve this issue.",
            ],
            (SkillTier::High, I::Device) => &[
                "Let me guide you through the proper setup steps for your device.",
                "I see the configuration issue. Let me help you fix it.",
                "I can send a technician if we can't resolve this remotely.",
            ],
            (SkillTier::High, I::Cancellation) => &[
                "Before you go, let me see what I can do to address your concerns.",
                "I'd like to offer you a special promotion to retain your business.",
                "Let me review your account to see if we can improve your service.",
            ],
            (SkillTier::High, I::Upgrade) => &[
                "I can process that upgrade for you right away.",
                "I'll move you to our premium plan with enhanced features.",
                "Let me upgrade your service with the latest options.",
            ],
            // Low-tier agents never make progress; fall back to the medium lines.
            (_, I::Billing) => &[
                "I see the issue in your account. Let me look into this for you.",
                "I can help with billing questions. Let me pull up your information.",
                "I need to check your account details to address this.",
            ],
            (_, I::Internet) => &[
                "Let me check the status in your area regarding service.",
                "I can see your connection history and recent issues.",
                "I'm reviewing your service status to identify the problem.",
            ],
            (_, I::Device) => &[
                "Let me walk you through some troubleshooting steps.",
                "I can help you with device setup. What model do you have?",
                "Let me check if there are known issues with your device.",
            ],
            (_, I::Cancellation) => &[
                "I understand you're considering cancellation. Can you tell me more?",
                "I'd like to understand your concerns before you make that decision.",
                "Before you cancel, let me see what options we have.",
            ],
            (_, I::Upgrade) => &[
                "I can help you upgrade your service. What features are you looking for?",
                "Let me check what upgrade options are available for you.",
                "I can process an upgrade if that's what you're interested in.",
            ],
        }
    }

    fn stall_lines(tier: SkillTier) -> &'static [&'static str] {
        match tier {
            SkillTier::High => &[
                "Let me transfer you to a specialist who can better assist.",
                "I need to escalate this to our technical team for review.",
                "I'm consulting with our experts to find the best solution.",
            ],
            SkillTier::Medium => &[
                "I'm still looking into this for you.",
                "Let me continue checking on this issue.",
                "I need more time to resolve your concern.",
            ],
            SkillTier::Low => &[
                "Let me pull up your account...",
                "I'll need to check on that for you.",
                "Can you repeat your account number?",
                "Let me see what I can find here.",
                "I have to look this up in our system.",
            ],
        }
    }

    fn reaction_lines(tier: FrustrationTier, persona: Persona) -> &'static [&'static str] {
        match (tier, persona) {
            (FrustrationTier::Distressed, Persona::Angry) => &[
                "This is taking forever! Fix it NOW!",
                "I don't have time for this! Just solve the problem!",
                "You people are incompetent! This is ridiculous!",
            ],
            (FrustrationTier::Distressed, Persona::Business) => &[
                "I need this resolved immediately. This affects my business.",
                "This is wasting my time. I have deadlines to meet.",
                "I expect better service from a professional provider.",
            ],
            (FrustrationTier::Distressed, _) => &[
                "I'm getting frustrated with this process.",
                "This is taking too long to resolve.",
                "I'm not happy with how this is progressing.",
            ],
            (FrustrationTier::Impatient, Persona::Angry) => &[
                "This is not acceptable!",
                "Why is this so difficult?",
                "I'm losing patience here!",
            ],
            (FrustrationTier::Impatient, _) => &[
                "This is taking longer than expected.",
                "I hope this gets resolved soon.",
                "I'm getting concerned about this.",
            ],
            (FrustrationTier::Calm, Persona::Loyal) => &[
                "Thank you for your help. I appreciate it.",
                "I understand these things happen sometimes.",
                "I'm glad you're working on this for me.",
            ],
            (FrustrationTier::Calm, Persona::TechSavvy) => &[
                "Can you provide more technical details about the fix?",
                "What's the root cause of this issue?",
                "Will this prevent future occurrences?",
            ],
            (FrustrationTier::Calm, _) => &[
                "Okay, thank you for checking on that.",
                "I appreciate you looking into this.",
                "That's helpful information, thanks.",
            ],
        }
    }
}
