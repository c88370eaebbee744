//! In-memory adapters.
//!
//! `InMemoryStore` implements every storage port against process memory.

mod store;

pub use store::InMemoryStore;
