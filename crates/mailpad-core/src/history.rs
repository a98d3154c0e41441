// Re-exports from mailpad-mod-history and the mapping between draft keys
// and history document IDs.
pub use mailpad_mod_history::config::doc_id_for_template;
pub use mailpad_mod_history::{
    EditorHistory, EditorSnapshot, HistoryBuffer, HistoryInfo, PersistenceLayer, StateDiff,
};

use mailpad_config::DraftKey;

/// History document ID for the session a draft key belongs to.
pub fn doc_id_for_key(key: DraftKey) -> String {
    match key {
        DraftKey::Default => doc_id_for_template(None),
        DraftKey::Template(id) => doc_id_for_template(Some(id)),
    }
}
