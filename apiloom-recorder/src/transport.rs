//! Transport seams supplied by the caller
//!
//! The recorder never issues HTTP itself. A [`CassetteFactory`] opens a
//! record/replay transport per cassette, the [`Cassette`] hands out an HTTP
//! client bound to it, and a client builder turns that HTTP client plus the
//! opaque [`Session`] into the domain client the handlers expect.

use async_trait::async_trait;
use bytes::Bytes;
use std::sync::Arc;

/// Opens a record/replay transport for a named cassette
#[async_trait]
pub trait CassetteFactory: Send + Sync {
    /// HTTP client type bound to an open cassette
    type Http: Send;

    type Cassette: Cassette<Http = Self::Http>;

    async fn open(&self, cassette: &str) -> anyhow::Result<Self::Cassette>;
}

/// An open cassette
#[async_trait]
pub trait Cassette: Send {
    type Http: Send;

    /// An HTTP client whose traffic is captured by this cassette
    fn http_client(&self) -> Self::Http;

    /// Flush and close the cassette
    async fn close(&mut self) -> anyhow::Result<()>;
}

/// Builds the domain client from a cassette's HTTP client and the session
pub type ClientBuilder<H, C> = Arc<dyn Fn(H, &Session) -> anyhow::Result<C> + Send + Sync>;

/// Opaque authentication session blob
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session(Bytes);

impl Session {
    pub fn new(bytes: impl Into<Bytes>) -> Self {
        Self(bytes.into())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
