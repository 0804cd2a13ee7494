//! Capability traits shared by `Buffer` and `SingleSlot`.

/// Reads a payload by key.
pub trait Reader<T> {
    /// Returns the payload if the key is present and still valid.
    /// A successful read counts as one access.
    fn read(&self, key: i64) -> Option<T>;
}

/// Stores a payload under a freshly assigned key.
pub trait Writer<T> {
    fn write(&self, payload: T) -> i64;
}

/// Probes a key without counting an access.
pub trait ExistenceCheck {
    fn exist(&self, key: i64) -> bool;
}

/// Read and write access together.
pub trait ReaderWriter<T>: Reader<T> + Writer<T> {}

impl<T, B> ReaderWriter<T> for B where B: Reader<T> + Writer<T> + ?Sized {}
