use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use err_derive::Error;
use log::*;
use serde::{de::DeserializeOwned, Serialize};

use crate::documents::Entity;

#[cfg(any(test, feature = "testing"))]
mod memory;

#[cfg(any(test, feature = "testing"))]
pub use self::memory::MemoryStore;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error(display = "i/o error on collection {:?}", collection)]
    Io {
        collection: &'static str,
        #[error(source)]
        source: io::Error,
    },
    #[error(display = "malformed data in collection {:?}", collection)]
    Decode {
        collection: &'static str,
        #[error(source)]
        source: serde_json::Error,
    },
    #[error(display = "could not serialize collection {:?}", collection)]
    Encode {
        collection: &'static str,
        #[error(source)]
        source: serde_json::Error,
    },
    #[error(
        display = "record {} of collection {:?} is invalid: {}",
        index,
        collection,
        reason
    )]
    Invalid {
        collection: &'static str,
        index: usize,
        reason: String,
    },
}

/// Whole-collection load and save. Every `load` goes back to the medium;
/// every `save` replaces the collection wholesale.
pub trait Storage {
    fn load<R: Entity + DeserializeOwned>(&self) -> Result<Vec<R>, StorageError>;
    fn save<R: Entity + Serialize>(&self, records: &[R]) -> Result<(), StorageError>;

    /// Makes sure the collection exists, leaving any current content alone.
    fn ensure<R: Entity + Serialize + DeserializeOwned>(&self) -> Result<usize, StorageError> {
        let records = self.load::<R>()?;
        self.save(&records)?;
        Ok(records.len())
    }
}

/// One `<collection>.json` file per collection inside a data directory.
#[derive(Debug, Clone)]
pub struct JsonFiles {
    dir: PathBuf,
}

fn encode<R: Entity + Serialize>(records: &[R]) -> Result<Vec<u8>, StorageError> {
    let mut buf = Vec::new();
    let fmt = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, fmt);
    records
        .serialize(&mut ser)
        .map_err(|source| StorageError::Encode {
            collection: R::COLLECTION,
            source,
        })?;
    buf.push(b'\n');
    Ok(buf)
}

fn decode<R: Entity + DeserializeOwned>(bytes: &[u8]) -> Result<Vec<R>, StorageError> {
    let records: Vec<R> =
        serde_json::from_slice(bytes).map_err(|source| StorageError::Decode {
            collection: R::COLLECTION,
            source,
        })?;
    for (index, record) in records.iter().enumerate() {
        record
            .validate()
            .map_err(|reason| StorageError::Invalid {
                collection: R::COLLECTION,
                index,
                reason,
            })?;
    }
    Ok(records)
}

impl JsonFiles {
    pub fn new<P: Into<PathBuf>>(dir: P) -> Self {
        let dir = dir.into();
        JsonFiles { dir }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_of(&self, collection: &str) -> PathBuf {
        self.dir.join(format!("{}.json", collection))
    }

    fn write_atomically(&self, collection: &'static str, bytes: &[u8]) -> io::Result<()> {
        fs::create_dir_all(&self.dir)?;
        let target = self.path_of(collection);
        let staging = self.dir.join(format!(".{}.json.tmp", collection));
        {
            let mut f = fs::File::create(&staging)?;
            f.write_all(bytes)?;
            f.sync_all()?;
        }
        fs::rename(&staging, &target)
    }
}

impl Storage for JsonFiles {
    fn load<R: Entity + DeserializeOwned>(&self) -> Result<Vec<R>, StorageError> {
        let path = self.path_of(R::COLLECTION);
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!("No file at {:?}; {} is empty", path, R::COLLECTION);
                return Ok(Vec::new());
            }
            Err(source) => {
                return Err(StorageError::Io {
                    collection: R::COLLECTION,
                    source,
                })
            }
        };
        let records = decode(&bytes)?;
        debug!("Loaded {} records from {:?}", records.len(), path);
        Ok(records)
    }

    fn save<R: Entity + Serialize>(&self, records: &[R]) -> Result<(), StorageError> {
        let bytes = encode(records)?;
        self.write_atomically(R::COLLECTION, &bytes)
            .map_err(|source| StorageError::Io {
                collection: R::COLLECTION,
                source,
            })?;
        debug!(
            "Saved {} records to {:?}",
            records.len(),
            self.path_of(R::COLLECTION)
        );
        Ok(())
    }
}
