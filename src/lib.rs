//! examset · Smart random question selection for practice simulations.
//!
//! Given a target size, a subject-allocation preset, a difficulty mix, and
//! quality-of-selection preferences, the engine draws a balanced, shuffled,
//! duplicate-free question set from a read-only question repository and
//! reports the achieved distribution next to what was asked for.
//!
//! - Allocation presets: proportional, balanced, single-subject, custom
//! - Ratio-based Easy/Medium/Hard sub-targets with exact reconciliation
//! - CSPRNG shuffling, topic round-robin, graceful shortfall recovery
//!
//! The engine is pure with respect to its inputs: one `select` call reads
//! the repository and the random source, and persists nothing — the caller
//! stores the result as the simulation's question set.
//!
//! Environment variables honored by the ambient pieces:
//!   ENGINE_CONFIG_PATH : TOML tuning (over-fetch factor, mix presets)
//!   LOG_LEVEL          : tracing filter, e.g. "debug" or full directives
//!   LOG_FORMAT         : "pretty" (default) or "json"

pub mod config;
pub mod domain;
pub mod memory;
pub mod mix;
pub mod plan;
pub mod protocol;
pub mod repo;
pub mod report;
pub mod select;
pub mod shuffle;
pub mod telemetry;

pub use config::{load_engine_config_from_env, EngineConfig};
pub use protocol::{SelectionRequest, SelectionResult};
pub use repo::{QuestionRepository, RepoError};
pub use select::{SelectError, SelectionEngine};
