//! `slotsync-recon`: player identity reconciliation and position enrichment.
//!
//! Pure engine crate: receives pre-loaded source records and target tables,
//! returns rewritten tables plus statistics. No CLI or IO dependencies.

pub mod config;
pub mod engine;
pub mod error;
pub mod index;
pub mod matcher;
pub mod model;
pub mod normalize;
pub mod slots;
pub mod summary;

pub use config::ReconConfig;
pub use engine::{reconcile, Reconciled};
pub use error::ReconError;
pub use index::EligibilityIndex;
pub use matcher::{MatchMethod, Matcher, PlayerMatch};
pub use model::{DatasetStats, Role, SourceRecord, Table};
pub use summary::{merge_two_way, RunSummary};
