/// A record type that lives in a named collection.
pub trait Entity {
    const COLLECTION: &'static str;

    /// Checked for every record as it comes out of storage. The reason is
    /// reported back in `StorageError::Invalid`.
    fn validate(&self) -> Result<(), String> {
        Ok(())
    }
}
