//! Keygate is a header-augmenting reverse proxy gateway.
//!
//! Every request under the gateway prefix is tagged with a correlation
//! identifier, stripped of caller authorization, given the upstream API
//! key, and forwarded to the upstream whose route prefix matches most
//! specifically. The upstream reply is relayed byte for byte, and the
//! correlation identifier is attached to whatever response the caller
//! receives, including gateway-level errors.
//!
//! # Architecture
//!
//! - [`cli`] -- Command-line argument parsing with clap derive macros.
//! - [`cmd`] -- Subcommand dispatch and execution (run, validate, health, backend).
//! - [`config`] -- Configuration loading and validation via the
//!   [`ConfigSource`](config::ConfigSource) trait.
//! - [`error`] -- Unified error types using `thiserror`.
//! - [`health`] -- `GET /health` endpoint handler returning runtime diagnostics.
//! - [`logging`] -- Structured tracing setup with JSON and pretty-print output.
//! - [`middleware`] -- Pipeline stages: correlation id and credential injection.
//! - [`proxy`] -- Dispatcher: route matching, path rewrite, and forwarding.
//! - [`server`] -- Axum server setup, shared application state, HTTP client, and
//!   graceful shutdown.
//! - [`backend`] -- Sample movie upstream for local end-to-end runs.
//!
//! # Feature Flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `yaml` | YAML config file support _(enabled by default)_ |
//! | `json` | JSON config file support |
//! | `toml` | TOML config file support |
//! | `file-backends` | All file format backends |
//! | `full` | All features |

// Public functions are consumed by the binary and integration tests only.
#![allow(clippy::missing_errors_doc)]

pub mod backend;
pub mod cli;
pub mod cmd;
pub mod config;
pub mod error;
pub mod health;
pub mod logging;
pub mod middleware;
pub mod proxy;
pub mod server;
