//! Key-value persistence seam for the flight log.
use std::collections::BTreeMap;
use std::convert::Infallible;

/// Ordered set of writes applied together by [`KeyValueStore::commit`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WriteBatch {
    writes: Vec<(String, Option<String>)>,
}

impl WriteBatch {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, key: &str, value: impl Into<String>) {
        self.writes.push((key.to_string(), Some(value.into())));
    }

    pub fn remove(&mut self, key: &str) {
        self.writes.push((key.to_string(), None));
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.writes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.writes.is_empty()
    }

    /// Writes in insertion order; `None` removes the key.
    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&str>)> {
        self.writes
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_deref()))
    }

    /// Apply every write to an in-memory map.
    pub fn apply_to(&self, entries: &mut BTreeMap<String, String>) {
        for (key, value) in self.iter() {
            match value {
                Some(value) => {
                    entries.insert(key.to_string(), value.to_string());
                }
                None => {
                    entries.remove(key);
                }
            }
        }
    }
}

/// String-keyed store owned by the caller (browser storage, a file, a row in
/// a database). Writers take `&mut self`: one exclusive writer per update.
pub trait KeyValueStore {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Read a value.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, Self::Error>;

    /// Apply a whole batch or none of it. A reader never sees part of a
    /// committed batch.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store cannot be written; the store
    /// then still holds its previous contents.
    fn commit(&mut self, batch: WriteBatch) -> Result<(), Self::Error>;

    /// Write a single value.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store cannot be written.
    fn set(&mut self, key: &str, value: &str) -> Result<(), Self::Error> {
        let mut batch = WriteBatch::new();
        batch.set(key, value);
        self.commit(batch)
    }

    /// Delete a value; deleting a missing key is not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store cannot be written.
    fn remove(&mut self, key: &str) -> Result<(), Self::Error> {
        let mut batch = WriteBatch::new();
        batch.remove(key);
        self.commit(batch)
    }
}

/// In-process store, handy for tests and single-session callers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryStore {
    entries: BTreeMap<String, String>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    type Error = Infallible;

    fn get(&self, key: &str) -> Result<Option<String>, Self::Error> {
        Ok(self.entries.get(key).cloned())
    }

    fn commit(&mut self, batch: WriteBatch) -> Result<(), Self::Error> {
        batch.apply_to(&mut self.entries);
        Ok(())
    }
}
