//! Thread grouping and filtering for a household communications inbox.
//!
//! Messages arrive as a snapshot from the backend `Communication` collection,
//! newest first. [`group_messages`] filters the snapshot and groups the
//! survivors into conversation threads for a two-pane inbox view.

pub mod config;
pub mod error;
pub mod filter;
pub mod models;
pub mod snapshot;
pub mod summary;
pub mod thread;
pub mod views;

pub use config::HubConfig;
pub use error::{HubError, Result};
pub use filter::{MessageFilters, Selector};
pub use models::{CommunicationType, EntityKind, LinkedEntity, Message, MessageStatus, Priority};
pub use snapshot::{load_snapshot, parse_snapshot};
pub use summary::{summarize, Breakdown, ThreadSummary};
pub use thread::{group_messages, GroupedMessages, Thread, ThreadMap};
pub use views::{JsonFileViewStore, MemoryViewStore, SavedView, ViewStore};
