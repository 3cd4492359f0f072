//! Storage backend traits.

mod collection;

pub use collection::CollectionStore;
