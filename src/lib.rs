//! # Digest Viewer
//!
//! Browse a monthly CSV digest selected through a manifest. Records are
//! parsed, indexed by platform and topic tags, filtered by a free-text query
//! plus chip selections, and rendered as cards in the terminal, as JSON, or
//! as an HTML page served over HTTP.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐   ┌───────────────────────────┐   ┌──────────────┐
//! │ DataSource   │──▶│  digest-viewer-core       │──▶│  Renderer    │
//! │ dir / HTTP   │   │ tokenize → normalize →    │   │ text / HTML  │
//! └──────────────┘   │ tags + filter (Viewer)    │   └──────┬───────┘
//!                    └───────────────────────────┘          │
//!                                           ┌───────────────┼──────────┐
//!                                           ▼               ▼          ▼
//!                                      dv search       dv browse   dv serve
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`source`] | Manifest and dataset fetching (directory or HTTP) |
//! | [`session`] | Fetch-then-load helpers and filter parameters |
//! | [`text`] | Terminal renderer |
//! | [`search`] | One-shot filtering commands |
//! | [`browse`] | Interactive session |
//! | [`server`] | HTTP viewer and JSON API |
//! | [`digest_viewer_core`] | Re-export of the runtime-free pipeline |

pub mod browse;
pub mod config;
pub mod logging;
pub mod months;
pub mod search;
pub mod server;
pub mod session;
pub mod source;
pub mod text;

pub use digest_viewer_core;
