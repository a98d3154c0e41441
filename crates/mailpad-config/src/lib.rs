pub mod config;
pub mod drafts;
pub mod schema;

pub use config::AppConfig;
pub use drafts::{DraftStore, STORAGE_KEY};
pub use schema::{DraftKey, DraftRecord, DraftsV2, LegacyDraft, StoredSchema, STORAGE_VERSION};
