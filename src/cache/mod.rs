//! Cache storage plumbing.
//!
//! Three independent pieces:
//!
//! - [`backend::CacheBackend`] — the byte store behind the results cache.
//!   Eviction, TTL, and replication are its responsibility, not ours; the
//!   bundled [`backend::InMemoryBackend`] covers embedded use and tests,
//!   while production deployments implement the trait over an external
//!   store (memcached, redis).
//!
//! - [`codec::EntryCodec`] — serializes a [`CachedEntry`](crate::types::CachedEntry)
//!   to the opaque byte payload the backend stores, with an optional
//!   snappy compression pass.
//!
//! - [`key::CacheKeyGenerator`] — maps (tenant, request) to the entry key
//!   via time bucketing. Decorated by wrapping, not by registry mutation:
//!   [`key::ScopedKeyGenerator`] composes over any base generator.

pub mod backend;
pub mod codec;
pub mod key;

pub use backend::{CacheBackend, InMemoryBackend};
pub use codec::{Compression, EntryCodec};
pub use key::{CacheKeyGenerator, IntervalKeyGenerator, ScopedKeyGenerator};
