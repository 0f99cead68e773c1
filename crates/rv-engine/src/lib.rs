pub mod config;
pub mod engine;
pub mod variant;

pub use config::EngineConfig;
pub use engine::{EffectiveNode, Engine};
pub use variant::{TransitionOutcome, VariantRecord, VariantStateMachine};
