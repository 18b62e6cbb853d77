use thiserror::Error as ThisError;
use tokio::time::{Duration, Instant};
use tracing::debug;

use crate::frame::Frame;

#[derive(Debug, ThisError, PartialEq)]
pub enum Error {
    #[error("invalid expire time {0:?}")]
    InvalidExpiry(String),
}

/// The Store keeps every key/value pair ever set on a connection, in insertion order.
///
/// Nothing is ever removed or updated in place: a lookup returns the first entry whose key
/// matches, and whether its value is still present is decided at read time from the entry's
/// liveness window. Each connection owns its own store, so it is never shared across tasks.
#[derive(Debug, Default)]
pub struct Store {
    entries: Vec<Entry>,
}

#[derive(Debug)]
pub struct Entry {
    key: Frame,
    value: Frame,
    created_at: Instant,
    expiry: Duration,
}

impl Entry {
    fn new(key: Frame, value: Frame) -> Entry {
        Entry {
            key,
            value,
            created_at: Instant::now(),
            expiry: Duration::ZERO,
        }
    }

    /// An entry is live while less time than its window has passed since it was created. The
    /// window starts empty, so an entry is expired right away unless it is given one.
    pub fn is_live(&self) -> bool {
        self.created_at.elapsed() < self.expiry
    }

    pub fn key(&self) -> &Frame {
        &self.key
    }

    /// The stored value, or the null sentinel once the entry expired.
    pub fn value(&self) -> Frame {
        if self.is_live() {
            self.value.clone()
        } else {
            Frame::null_bulk()
        }
    }
}

impl Store {
    pub fn new() -> Store {
        Store {
            entries: Vec::new(),
        }
    }

    pub fn set(&mut self, key: Frame, value: Frame) {
        self.entries.push(Entry::new(key, value));
    }

    /// Looks up the first entry set with an equal key. Later entries with the same key are
    /// shadowed by it.
    pub fn get(&self, key: &Frame) -> Frame {
        self.entries
            .iter()
            .find(|entry| entry.key() == key)
            .map_or_else(Frame::null_bulk, Entry::value)
    }

    /// Sets the liveness window of the most recently added entry, whatever its key.
    ///
    /// `millis` is read as a bulk string holding a number of milliseconds, any other frame is
    /// ignored. Negative windows leave the entry expired.
    pub fn set_expiry(&mut self, millis: &Frame) -> Result<(), Error> {
        let Frame::Bulk(bytes) = millis else {
            debug!("Ignoring expire time that is not a bulk string: {}", millis);
            return Ok(());
        };

        let text = String::from_utf8_lossy(bytes);
        let millis = text
            .parse::<i64>()
            .map_err(|_| Error::InvalidExpiry(text.to_string()))?;

        let Some(entry) = self.entries.last_mut() else {
            debug!("Ignoring expire time, no key has been set yet");
            return Ok(());
        };

        entry.expiry = Duration::from_millis(millis.max(0).unsigned_abs());

        Ok(())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[cfg(test)]
    fn iter(&self) -> impl Iterator<Item = &Entry> {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;
    use tokio::time;

    use super::*;
    use crate::frame::NullKind;

    fn bulk(s: &'static str) -> Frame {
        Frame::Bulk(Bytes::from(s))
    }

    #[tokio::test]
    async fn missing_key() {
        let store = Store::new();

        assert_eq!(store.get(&bulk("key1")), Frame::null_bulk());
        assert_eq!(store.get(&bulk("key1")).serialize(), b"$-1\r\n");
    }

    #[tokio::test]
    async fn expired_without_expiry() {
        time::pause();

        let mut store = Store::new();
        store.set(bulk("key1"), bulk("value1"));

        // Entries start with an empty liveness window, so they are never visible without an
        // explicit expire time, not even immediately.
        assert_eq!(store.get(&bulk("key1")).serialize(), b"$-1\r\n");
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn ttl() {
        time::pause();

        let mut store = Store::new();
        store.set(bulk("key1"), bulk("value1"));
        store.set_expiry(&bulk("1000")).unwrap();

        assert_eq!(store.get(&bulk("key1")), bulk("value1"));

        time::advance(Duration::from_millis(999)).await;
        assert_eq!(store.get(&bulk("key1")), bulk("value1"));

        time::advance(Duration::from_millis(1)).await;
        assert_eq!(store.get(&bulk("key1")), Frame::null_bulk());

        // Expired entries stay in the store.
        assert_eq!(store.len(), 1);
        assert!(!store.iter().any(Entry::is_live));
    }

    #[tokio::test]
    async fn expiry_applies_to_last_entry() {
        time::pause();

        let mut store = Store::new();
        store.set(bulk("key1"), bulk("value1"));
        store.set(bulk("key2"), bulk("value2"));
        store.set_expiry(&bulk("1000")).unwrap();

        assert_eq!(store.get(&bulk("key1")), Frame::null_bulk());
        assert_eq!(store.get(&bulk("key2")), bulk("value2"));
    }

    #[tokio::test]
    async fn first_entry_shadows_later_ones() {
        time::pause();

        let mut store = Store::new();
        store.set(bulk("key1"), bulk("value1"));
        store.set_expiry(&bulk("1000")).unwrap();
        store.set(bulk("key1"), bulk("value2"));
        store.set_expiry(&bulk("1000")).unwrap();

        assert_eq!(store.get(&bulk("key1")), bulk("value1"));

        // Once the first entry expires it still shadows the second one.
        store.set(bulk("key2"), bulk("value1"));
        store.set(bulk("key2"), bulk("value2"));
        store.set_expiry(&bulk("1000")).unwrap();

        assert_eq!(store.get(&bulk("key2")), Frame::null_bulk());
    }

    #[tokio::test]
    async fn keys_of_any_kind() {
        time::pause();

        let mut store = Store::new();
        store.set(Frame::Integer(1), bulk("integer"));
        store.set_expiry(&bulk("1000")).unwrap();
        store.set(Frame::Simple("1".to_string()), bulk("simple"));
        store.set_expiry(&bulk("1000")).unwrap();
        store.set(Frame::Null(NullKind::Plain), bulk("null"));
        store.set_expiry(&bulk("1000")).unwrap();

        assert_eq!(store.get(&Frame::Integer(1)), bulk("integer"));
        assert_eq!(store.get(&Frame::Simple("1".to_string())), bulk("simple"));
        assert_eq!(store.get(&bulk("1")), Frame::null_bulk());
        assert_eq!(store.get(&Frame::BigNumber(1)), Frame::null_bulk());
        // Every null matches a null key.
        assert_eq!(store.get(&Frame::Null(NullKind::Array)), bulk("null"));
    }

    #[tokio::test]
    async fn expiry_edge_cases() {
        time::pause();

        let mut store = Store::new();

        // Nothing to apply it to yet.
        assert_eq!(store.set_expiry(&bulk("1000")), Ok(()));
        assert!(store.is_empty());

        store.set(bulk("key1"), bulk("value1"));

        // Only bulk strings carry an expire time.
        store.set_expiry(&Frame::Integer(1000)).unwrap();
        assert_eq!(store.get(&bulk("key1")), Frame::null_bulk());

        assert_eq!(
            store.set_expiry(&bulk("soon")),
            Err(Error::InvalidExpiry("soon".to_string()))
        );

        store.set_expiry(&bulk("-5")).unwrap();
        assert_eq!(store.get(&bulk("key1")), Frame::null_bulk());
    }
}
