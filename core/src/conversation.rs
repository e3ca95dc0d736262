//! The conversation engine: turn-based state machine for one call.
//!
//! TURN ORDER (fixed, never reordered):
//!   1. Time pressure: frustration += frustration_per_turn
//!   2. Agent acts per its skill tier (AgentTierRule table)
//!   3. Agent line, then customer line, are appended
//!   4. Terminal rules are evaluated in table order, first match wins:
//!        escalation → resolution → abandonment
//!   5. Turn budget spent with no transition → EXHAUSTED
//!
//! RULES:
//!   - resolution_progress never decreases.
//!   - The loop runs at most max_turns iterations.
//!   - Exactly one terminal state is reached.
//!   - Text comes from the injected UtteranceSelector and never feeds back
//!     into state.

use crate::{
    config::{ConversationConfig, TierDynamics},
    event::CallEvent,
    hidden_state::HiddenState,
    rng::CallRng,
    types::{FrustrationTier, Persona, SkillTier, TerminalState},
    utterance::{Transcript, UtteranceCue, UtteranceKind, UtteranceSelector},
};
use std::sync::Arc;

/// Per-call parameters fixed before the first turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallSetup {
    pub max_turns: u64,
    /// Whether the issue is solvable at all for this skill/issue pairing.
    pub resolution_achieved: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SimulationState {
    pub frustration:         f64,
    pub resolution_progress: f64,
    pub turn:                u64,
    pub max_turns:           u64,
    pub terminal_state:      TerminalState,
}

impl SimulationState {
    fn new(hidden: &HiddenState, setup: CallSetup) -> Self {
        Self {
            frustration:         hidden.initial_frustration,
            resolution_progress: 0.0,
            turn:                0,
            max_turns:           setup.max_turns,
            terminal_state:      TerminalState::Active,
        }
    }
}

/// Read-only facts a terminal rule may test besides the mutable state.
#[derive(Debug, Clone, Copy)]
pub struct CallContext {
    pub persona:             Persona,
    pub resolution_achieved: bool,
}

// ── Agent tier table ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AgentTierRule {
    pub tier:     SkillTier,
    pub dynamics: TierDynamics,
}

impl AgentTierRule {
    /// Whether this turn moves the issue forward. Rolls only when the
    /// outcome is actually uncertain.
    fn attempt_progress(
        &self,
        state: &SimulationState,
        resolution_achieved: bool,
        rng: &mut CallRng,
    ) -> bool {
        let d = &self.dynamics;
        if !resolution_achieved || state.resolution_progress >= d.progress_ceiling {
            return false;
        }
        roll(d.progress_chance, rng)
    }
}

// ── Terminal rule table ──────────────────────────────────────────────────────

/// One row of the ordered terminal-transition table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TerminalRule {
    pub outcome: TerminalState,
    /// Guard: frustration strictly above this.
    pub frustration_above: Option<f64>,
    /// Guard: resolution_progress strictly above this.
    pub progress_above: Option<f64>,
    pub requires_escalating_persona: bool,
    pub requires_resolution_achieved: bool,
    /// Chance the transition fires once the guard holds.
    pub chance: f64,
    /// Customer says goodbye before the call ends.
    pub farewell: bool,
}

impl TerminalRule {
    pub fn guard(&self, state: &SimulationState, ctx: &CallContext) -> bool {
        self.frustration_above.map_or(true, |t| state.frustration > t)
            && self.progress_above.map_or(true, |t| state.resolution_progress > t)
            && (!self.requires_escalating_persona || ctx.persona.can_escalate())
            && (!self.requires_resolution_achieved || ctx.resolution_achieved)
    }
}

// ── Outcome ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct ConversationOutcome {
    pub transcript:          Transcript,
    pub terminal_state:      TerminalState,
    pub resolution_progress: f64,
    pub final_frustration:   f64,
    pub max_turns:           u64,
    pub turns_taken:         u64,
    pub resolution_achieved: bool,
    pub trace:               Vec<CallEvent>,
}

impl ConversationOutcome {
    pub fn resolved(&self) -> bool {
        self.terminal_state == TerminalState::Resolved
    }

    pub fn escalated(&self) -> bool {
        self.terminal_state == TerminalState::Escalated
    }
}

// ── Engine ───────────────────────────────────────────────────────────────────

pub struct ConversationEngine {
    config:         ConversationConfig,
    tiers:          [AgentTierRule; 3],
    terminal_rules: [TerminalRule; 3],
    selector:       Arc<dyn UtteranceSelector>,
}

impl ConversationEngine {
    pub fn new(config: ConversationConfig, selector: Arc<dyn UtteranceSelector>) -> Self {
        let tiers = [
            AgentTierRule { tier: SkillTier::High,   dynamics: config.high },
            AgentTierRule { tier: SkillTier::Medium, dynamics: config.medium },
            AgentTierRule { tier: SkillTier::Low,    dynamics: config.low },
        ];
        // Evaluation order IS the tie-break policy. Do not reorder.
        let terminal_rules = [
            TerminalRule {
                outcome: TerminalState::Escalated,
                frustration_above: Some(config.escalation_frustration),
                progress_above: None,
                requires_escalating_persona: true,
                requires_resolution_achieved: false,
                chance: config.escalation_chance,
                farewell: false,
            },
            TerminalRule {
                outcome: TerminalState::Resolved,
                frustration_above: None,
                progress_above: Some(config.resolution_threshold),
                requires_escalating_persona: false,
                requires_resolution_achieved: true,
                chance: 1.0,
                farewell: false,
            },
            TerminalRule {
                outcome: TerminalState::Abandoned,
                frustration_above: Some(config.abandonment_frustration),
                progress_above: None,
                requires_escalating_persona: false,
                requires_resolution_achieved: false,
                chance: config.abandonment_chance,
                farewell: true,
            },
        ];
        Self { config, tiers, terminal_rules, selector }
    }

    pub fn skill_tier(&self, agent_skill: f64) -> SkillTier {
        if agent_skill > self.config.high_skill_threshold {
            SkillTier::High
        } else if agent_skill > self.config.medium_skill_threshold {
            SkillTier::Medium
        } else {
            SkillTier::Low
        }
    }

    pub fn frustration_tier(&self, frustration: f64) -> FrustrationTier {
        if frustration > self.config.distressed_threshold {
            FrustrationTier::Distressed
        } else if frustration > self.config.impatient_threshold {
            FrustrationTier::Impatient
        } else {
            FrustrationTier::Calm
        }
    }

    /// Terminal outcomes whose guards hold for this state, in table order.
    /// Ignores the chance roll; used to audit the tie-break policy.
    pub fn eligible_outcomes(
        &self,
        state: &SimulationState,
        ctx: &CallContext,
    ) -> Vec<TerminalState> {
        self.terminal_rules
            .iter()
            .filter(|r| r.guard(state, ctx))
            .map(|r| r.outcome)
            .collect()
    }

    /// Draw the per-call setup: turn budget, then solvability.
    pub fn draw_setup(&self, hidden: &HiddenState, rng: &mut CallRng) -> CallSetup {
        let max_turns = rng.range_inclusive(self.config.min_turns, self.config.max_turns);
        let resolution_achieved = rng.chance(hidden.resolution_probability);
        CallSetup { max_turns, resolution_achieved }
    }

    pub fn run(&self, hidden: &HiddenState, rng: &mut CallRng) -> ConversationOutcome {
        let setup = self.draw_setup(hidden, rng);
        self.run_with_setup(hidden, setup, rng)
    }

    /// Play out a call from an explicit setup.
    pub fn run_with_setup(
        &self,
        hidden: &HiddenState,
        setup: CallSetup,
        rng: &mut CallRng,
    ) -> ConversationOutcome {
        let ctx = CallContext {
            persona:             hidden.persona,
            resolution_achieved: setup.resolution_achieved,
        };
        let mut state = SimulationState::new(hidden, setup);
        let mut transcript = Transcript::new();
        let mut trace = vec![CallEvent::CallStarted {
            max_turns:           setup.max_turns,
            resolution_achieved: setup.resolution_achieved,
            frustration:         state.frustration,
        }];

        self.say(&mut transcript, UtteranceKind::Opening, hidden, rng);
        self.say(&mut transcript, UtteranceKind::Greeting, hidden, rng);

        let rule = self.tier_rule(hidden.agent_skill);

        while !state.terminal_state.is_terminal() && state.turn < state.max_turns {
            state.turn += 1;
            state.frustration += self.config.frustration_per_turn;

            let made_progress = rule.attempt_progress(&state, setup.resolution_achieved, rng);
            let agent_kind = if made_progress {
                state.resolution_progress =
                    (state.resolution_progress + rule.dynamics.progress_gain).min(1.0);
                state.frustration -= rule.dynamics.frustration_relief;
                UtteranceKind::Progress { tier: rule.tier }
            } else {
                state.frustration += rule.dynamics.stall_penalty;
                UtteranceKind::Stall { tier: rule.tier }
            };

            self.say(&mut transcript, agent_kind, hidden, rng);
            let mood = self.frustration_tier(state.frustration);
            self.say(&mut transcript, UtteranceKind::Reaction { tier: mood }, hidden, rng);

            trace.push(CallEvent::TurnCompleted {
                turn:                state.turn,
                tier:                rule.tier,
                made_progress,
                frustration:         state.frustration,
                resolution_progress: state.resolution_progress,
            });

            if let Some(fired) = self.first_firing_rule(&state, &ctx, rng) {
                if fired.farewell {
                    self.say(&mut transcript, UtteranceKind::Farewell, hidden, rng);
                }
                state.terminal_state = fired.outcome;
            }

            log::trace!(
                "call={} turn={} tier={:?} frustration={:.3} progress={:.3}",
                rng.call_index, state.turn, rule.tier, state.frustration, state.resolution_progress,
            );
        }

        if !state.terminal_state.is_terminal() {
            state.terminal_state = TerminalState::Exhausted;
        }
        trace.push(CallEvent::CallTerminated {
            turn:  state.turn,
            state: state.terminal_state,
        });

        ConversationOutcome {
            transcript,
            terminal_state:      state.terminal_state,
            resolution_progress: state.resolution_progress,
            final_frustration:   state.frustration,
            max_turns:           setup.max_turns,
            turns_taken:         state.turn,
            resolution_achieved: setup.resolution_achieved,
            trace,
        }
    }

    fn tier_rule(&self, agent_skill: f64) -> AgentTierRule {
        let tier = self.skill_tier(agent_skill);
        self.tiers
            .iter()
            .copied()
            .find(|r| r.tier == tier)
            .unwrap_or(self.tiers[2])
    }

    fn first_firing_rule(
        &self,
        state: &SimulationState,
        ctx: &CallContext,
        rng: &mut CallRng,
    ) -> Option<TerminalRule> {
        self.terminal_rules
            .iter()
            .copied()
            .find(|r| r.guard(state, ctx) && roll(r.chance, rng))
    }

    fn say(
        &self,
        transcript: &mut Transcript,
        kind: UtteranceKind,
        hidden: &HiddenState,
        rng: &mut CallRng,
    ) {
        let cue = UtteranceCue { kind, persona: hidden.persona, issue: hidden.issue };
        let text = self.selector.select(&cue, rng);
        transcript.push(cue.speaker(), text);
    }
}

/// Certain outcomes consume no randomness; only genuine coin flips roll.
fn roll(p: f64, rng: &mut CallRng) -> bool {
    if p >= 1.0 {
        true
    } else if p <= 0.0 {
        false
    } else {
        rng.chance(p)
    }
}
