//! Mint probe against a deployed `Archetype` collection.
//!
//! # Data Flow
//! ```text
//! MintScenario (contract, auth, quantity, value, expected balance)
//!     → scenario.rs (balanceOf → mint → await receipt → balanceOf)
//!     → MintTarget
//!         ├─ archetype.rs (sol! bindings over a signing NetworkClient)
//!         └─ test doubles
//! allowlist.rs builds the {key, proof} auth for non-public tiers.
//! ```

pub mod allowlist;
pub mod archetype;
pub mod scenario;

pub use allowlist::{AllowList, AllowListAuth, AllowListParseError};
pub use archetype::ArchetypeContract;
pub use scenario::{run_scenario, MintScenario, MintTarget, ScenarioError, ScenarioReport};
