pub mod clock;
pub mod config;
pub mod conversation;
pub mod error;
pub mod event;
pub mod hidden_state;
pub mod metrics;
pub mod orchestrator;
pub mod phrase_library;
pub mod record;
pub mod rng;
pub mod sink;
pub mod store;
pub mod types;
pub mod utterance;
