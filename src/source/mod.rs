//! Stats source abstraction layer.
//!
//! This module defines the [`StatsSource`] trait, the [`Payload`] every fetch
//! resolves to, and the models those payloads carry.  The concrete REST
//! implementation lives in [`rest`].
//!
//! ## For contributors: adding a new section
//!
//! 1. Add a variant to [`SectionId`](crate::section::SectionId).
//! 2. Teach [`RestSource::fetch`] which endpoint serves it and how to decode
//!    the body into a [`Payload`].
//! 3. Decide which consumer on the event bus should react to it.

mod latest_post;
mod rest;

pub use latest_post::{LatestPost, LatestPostModel};
pub use rest::RestSource;

use async_trait::async_trait;

use crate::error::StatsError;
use crate::section::SectionId;

/// A structured object returned by a section fetch.
#[derive(Debug, Clone, PartialEq)]
pub enum RemoteData {
    LatestPost(LatestPostModel),
    /// Any other JSON document, passed through undecoded.
    Other(serde_json::Value),
}

/// The result of one section fetch, as delivered on the event bus.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Integer(i64),
    Data(RemoteData),
    Error(StatsError),
    /// Nothing usable came back.
    Null,
}

/// Trait that every stats backend must implement.
///
/// The fetch service calls [`fetch()`](StatsSource::fetch) from its worker
/// runtime, possibly for several sections at once, so implementations must
/// be [`Send`] + [`Sync`].
#[async_trait]
pub trait StatsSource: Send + Sync {
    /// Human-readable label used in logs.
    fn name(&self) -> &str;

    /// Fetch one section, optionally scoped to a single post.
    ///
    /// Transport and server failures come back as `Err`; the service turns
    /// them into [`Payload::Error`].
    async fn fetch(&self, section: SectionId, post_id: Option<u64>) -> Result<Payload, StatsError>;
}
