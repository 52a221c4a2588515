//! Search index implementations.

mod elastic;
#[cfg(test)]
mod mock;

pub use elastic::ElasticIndex;
#[cfg(test)]
pub use mock::MockSearchIndex;
