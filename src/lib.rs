//! # imgix Source Provider
//!
//! Infrastructure-as-code provider for imgix image sources.
//!
//! The host runtime hands typed desired-state records to [`resource::SourceResource`],
//! which turns them into calls against the imgix management API through
//! [`client::ImgixClient`] and translates the answers back into state.
//!
//! ## Layers
//!
//! - [`client`]: rate-limited authenticated transport and the source endpoints
//! - [`resource`]: create/read/update/delete/import, enabled-state transitions,
//!   upsert by name, plan modifiers, data source
//! - [`config`] and [`diagnostics`]: provider settings and the findings
//!   reported back to the operator
//! - [`observability`]: Prometheus metrics for API calls and rate-limit waits

pub mod client;
pub mod config;
pub mod constants;
pub mod diagnostics;
pub mod observability;
pub mod resource;
