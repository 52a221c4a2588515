//! Cache store implementations.

#[cfg(test)]
mod mock;
mod moka_store;

#[cfg(test)]
pub use mock::MockCacheStore;
pub use moka_store::MokaStore;
