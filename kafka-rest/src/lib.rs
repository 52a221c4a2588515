mod client;
mod consumer;
mod models;
mod proxy_url;

pub(crate) use proxy_url::*;

pub use client::*;
pub use consumer::*;
pub use models::*;
