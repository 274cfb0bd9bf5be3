use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::io;

use log::*;
use serde::{de::DeserializeOwned, Serialize};

use super::{decode, encode, Storage, StorageError};
use crate::documents::Entity;

/// Keeps serialized collections in memory. Writes to a collection can be
/// made to fail on demand.
#[derive(Debug, Default)]
pub struct MemoryStore {
    collections: RefCell<HashMap<&'static str, Vec<u8>>>,
    failing: RefCell<HashSet<&'static str>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// The bytes last written for `collection`, if any.
    pub fn raw(&self, collection: &str) -> Option<Vec<u8>> {
        self.collections.borrow().get(collection).cloned()
    }

    pub fn put_raw<B: Into<Vec<u8>>>(&self, collection: &'static str, bytes: B) {
        self.collections
            .borrow_mut()
            .insert(collection, bytes.into());
    }

    pub fn fail_writes_to(&self, collection: &'static str) {
        self.failing.borrow_mut().insert(collection);
    }

    pub fn heal(&self) {
        self.failing.borrow_mut().clear();
    }
}

impl Storage for MemoryStore {
    fn load<R: Entity + DeserializeOwned>(&self) -> Result<Vec<R>, StorageError> {
        match self.collections.borrow().get(R::COLLECTION) {
            Some(bytes) => decode(bytes),
            None => Ok(Vec::new()),
        }
    }

    fn save<R: Entity + Serialize>(&self, records: &[R]) -> Result<(), StorageError> {
        if self.failing.borrow().contains(R::COLLECTION) {
            warn!("Refusing write to {}", R::COLLECTION);
            return Err(StorageError::Io {
                collection: R::COLLECTION,
                source: io::Error::new(io::ErrorKind::Other, "write refused"),
            });
        }
        let bytes = encode(records)?;
        self.put_raw(R::COLLECTION, bytes);
        Ok(())
    }
}
