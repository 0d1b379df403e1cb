//! Per-chat session store.
//!
//! Holds the most recently submitted source text for each chat, awaiting a
//! language choice. A new text or transcription overwrites any prior entry
//! for that chat (last write wins), and entries live until the process exits.

use std::collections::HashMap;
use std::sync::Mutex;

/// Map from chat id to the pending source text.
pub struct SessionStore {
    inner: Mutex<HashMap<i64, String>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(HashMap::new()),
        }
    }

    /// Store the pending text for a chat, overwriting any previous entry.
    pub fn put(&self, chat_id: i64, text: &str) {
        self.inner
            .lock()
            .expect("session lock poisoned")
            .insert(chat_id, text.to_string());
    }

    /// The pending text for a chat, if any.
    pub fn get(&self, chat_id: i64) -> Option<String> {
        self.inner
            .lock()
            .expect("session lock poisoned")
            .get(&chat_id)
            .cloned()
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_store() {
        let store = SessionStore::new();
        assert_eq!(store.get(1), None);
    }

    #[test]
    fn test_put_and_get() {
        let store = SessionStore::new();
        store.put(1, "hello");
        assert_eq!(store.get(1).as_deref(), Some("hello"));
        assert_eq!(store.get(2), None);
    }

    #[test]
    fn test_put_overwrites() {
        let store = SessionStore::new();
        store.put(1, "first");
        store.put(1, "second");
        assert_eq!(store.get(1).as_deref(), Some("second"));
    }

    #[test]
    fn test_get_does_not_consume() {
        let store = SessionStore::new();
        store.put(1, "hello");
        assert_eq!(store.get(1).as_deref(), Some("hello"));
        assert_eq!(store.get(1).as_deref(), Some("hello"));
    }

    #[test]
    fn test_chats_are_independent() {
        let store = SessionStore::new();
        store.put(1, "one");
        store.put(2, "two");
        assert_eq!(store.get(1).as_deref(), Some("one"));
        assert_eq!(store.get(2).as_deref(), Some("two"));
    }
}
