//! # Admin Surface
//!
//! HTTP endpoints for toggling inspector nodes and serving the live viewer.
//!
//! ## Routes
//!
//! | Method | Path | Effect |
//! |---|---|---|
//! | `POST` | `/debug/{state}` | toggles every node listed in the body `{"nodes": [ids]}` |
//! | `POST` | `/debug/{id}/{state}` | toggles one node |
//! | `GET` | `/debug/view/view.html` | viewer page with theme stylesheets injected |
//! | `GET` | `/debug/view/{path}` | static viewer asset |
//!
//! `state` is `enable` or `disable`; anything else is 404. A bulk body without
//! a `nodes` array is 400 and unknown ids in it are skipped. An unknown id on
//! the single-node route is 404. Success is 200, or 201 for `disable` when
//! [`AdminConfig::legacy_disable_status`] is set.
//!
//! ## Core Components
//!
//! - **[`AdminConfig`]**: bind address and viewer settings
//! - **[`AdminService`]**: request routing, usable without a socket
//! - **[`AdminServer`]**: hyper HTTP/1 server around the service
//! - **[`ViewAssets`]**: cached viewer page and asset lookup
//!
//! ## Example
//!
//! ```rust,no_run
//! use streamweave_inspector::admin::{AdminConfig, AdminServer};
//! use streamweave_inspector::registry::InspectorRegistry;
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn run() -> Result<(), streamweave_inspector::error::AdminError> {
//! let config = AdminConfig::default()
//!   .with_bind_address("127.0.0.1:1880")
//!   .with_asset_dir("./viewer");
//! let server = AdminServer::bind(config, InspectorRegistry::new()).await?;
//! server.run(CancellationToken::new()).await?;
//! # Ok(())
//! # }
//! ```

pub mod handler;
pub mod server;
pub mod view;


pub use handler::*;
pub use server::*;
pub use view::*;

use std::path::PathBuf;

/// Configuration for the admin surface.
#[derive(Debug, Clone)]
pub struct AdminConfig {
  /// Address to bind to (default: `127.0.0.1:1880`).
  pub bind_address: String,
  /// Directory holding `view.html` and the viewer assets (default: `./viewer`).
  pub asset_dir: PathBuf,
  /// Theme stylesheets linked into the viewer page.
  pub theme_css: Vec<String>,
  /// Answer a successful `disable` with 201 instead of 200 (default: false).
  pub legacy_disable_status: bool,
}

impl Default for AdminConfig {
  fn default() -> Self {
    Self {
      bind_address: "127.0.0.1:1880".to_string(),
      asset_dir: PathBuf::from("viewer"),
      theme_css: Vec::new(),
      legacy_disable_status: false,
    }
  }
}

impl AdminConfig {
  /// Sets the bind address.
  #[must_use]
  pub fn with_bind_address(mut self, address: impl Into<String>) -> Self {
    self.bind_address = address.into();
    self
  }

  /// Sets the viewer asset directory.
  #[must_use]
  pub fn with_asset_dir(mut self, dir: impl Into<PathBuf>) -> Self {
    self.asset_dir = dir.into();
    self
  }

  /// Sets the theme stylesheets.
  #[must_use]
  pub fn with_theme_css<I, S>(mut self, stylesheets: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    self.theme_css = stylesheets.into_iter().map(Into::into).collect();
    self
  }

  /// Sets whether `disable` answers 201.
  #[must_use]
  pub fn with_legacy_disable_status(mut self, legacy: bool) -> Self {
    self.legacy_disable_status = legacy;
    self
  }
}
