//! # Apiloom Recorder
//!
//! Replays every recordable endpoint of a [`apiloom::Registry`] against a
//! record/replay transport so the traffic lands in per-cassette fixtures.
//!
//! Endpoints are grouped by cassette label. Within a cassette they run in
//! dependency order with synthesized arguments; a dependent's arg provider
//! turns its upstream's result into the identifiers it needs. One failing
//! endpoint never stops the rest of its cassette.

pub mod defaults;
pub mod error;
pub mod order;
pub mod recorder;
pub mod transport;

pub use defaults::{default_args, DEFAULT_LIMIT, LIMIT_PARAM, RANGE_LOOKBACK_DAYS};
pub use error::{RecorderError, RecorderResult};
pub use order::order_by_dependency;
pub use recorder::{RecordReport, Recorder};
pub use transport::{Cassette, CassetteFactory, ClientBuilder, Session};
