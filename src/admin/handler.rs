//! # Admin Request Handler
//!
//! Routes admin requests to the node registry and the viewer assets. The
//! handler is transport-agnostic: it takes any [`hyper::body::Body`] and always
//! produces a response, mapping every failure to a status code.

use crate::admin::AdminConfig;
use crate::admin::view::{VIEW_PAGE, ViewAssets};
use crate::registry::InspectorRegistry;
use bytes::Bytes;
use http::header::CONTENT_TYPE;
use http::{HeaderValue, Method, Request, Response, StatusCode};
use http_body_util::{BodyExt, Full};
use serde::Deserialize;
use serde_json::Value;
use std::fmt::Display;
use tracing::{debug, warn};

/// Route prefix shared by every admin endpoint.
const PREFIX: &str = "debug";

/// Segment under which the viewer is served.
const VIEW: &str = "view";

/// Requested node state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeState {
  /// Publish to the observer channel.
  Enable,
  /// Stop publishing to the observer channel.
  Disable,
}

impl NodeState {
  /// Parses a path segment.
  pub fn parse(segment: &str) -> Option<Self> {
    match segment {
      "enable" => Some(NodeState::Enable),
      "disable" => Some(NodeState::Disable),
      _ => None,
    }
  }

  /// Whether the state enables publishing.
  pub fn is_enabled(self) -> bool {
    self == NodeState::Enable
  }
}

#[derive(Debug, Deserialize)]
struct BulkToggle {
  nodes: Value,
}

/// The admin request handler.
#[derive(Debug)]
pub struct AdminService {
  registry: InspectorRegistry,
  assets: ViewAssets,
  legacy_disable_status: bool,
}

impl AdminService {
  /// Creates the handler.
  pub fn new(config: &AdminConfig, registry: InspectorRegistry) -> Self {
    Self {
      registry,
      assets: ViewAssets::new(config.asset_dir.clone(), config.theme_css.clone()),
      legacy_disable_status: config.legacy_disable_status,
    }
  }

  /// The viewer assets.
  pub fn assets(&self) -> &ViewAssets {
    &self.assets
  }

  /// Handles one request.
  pub async fn handle<B>(&self, request: Request<B>) -> Response<Full<Bytes>>
  where
    B: hyper::body::Body,
    B::Error: Display,
  {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let segments: Vec<&str> = path.trim_start_matches('/').split('/').collect();
    debug!(method = %method, path = %path, "admin request");

    match (&method, segments.as_slice()) {
      (&Method::POST, [PREFIX, state]) => match NodeState::parse(state) {
        Some(state) => self.toggle_listed(state, request.into_body()).await,
        None => status_only(StatusCode::NOT_FOUND),
      },
      (&Method::POST, [PREFIX, id, state]) => match NodeState::parse(state) {
        Some(state) => self.toggle_one(id, state).await,
        None => status_only(StatusCode::NOT_FOUND),
      },
      (&Method::GET, [PREFIX, VIEW, page]) if *page == VIEW_PAGE => self.page().await,
      (&Method::GET, [PREFIX, VIEW, rest @ ..]) if !rest.is_empty() => {
        self.asset(&rest.join("/")).await
      }
      _ => status_only(StatusCode::NOT_FOUND),
    }
  }

  async fn toggle_listed<B>(&self, state: NodeState, body: B) -> Response<Full<Bytes>>
  where
    B: hyper::body::Body,
    B::Error: Display,
  {
    let bytes = match body.collect().await {
      Ok(collected) => collected.to_bytes(),
      Err(e) => {
        warn!(error = %e, "failed to read admin request body");
        return status_only(StatusCode::BAD_REQUEST);
      }
    };
    let ids = match serde_json::from_slice::<BulkToggle>(&bytes) {
      Ok(BulkToggle {
        nodes: Value::Array(ids),
      }) => ids,
      _ => return status_only(StatusCode::BAD_REQUEST),
    };

    for id in ids.iter().filter_map(Value::as_str) {
      if let Some(handle) = self.registry.get(id).await
        && let Err(e) = handle.set_active(state.is_enabled()).await
      {
        debug!(node = %id, error = %e, "skipping closed node");
      }
    }
    status_only(self.success(state))
  }

  async fn toggle_one(&self, id: &str, state: NodeState) -> Response<Full<Bytes>> {
    let Some(handle) = self.registry.get(id).await else {
      return status_only(StatusCode::NOT_FOUND);
    };
    match handle.set_active(state.is_enabled()).await {
      Ok(()) => status_only(self.success(state)),
      Err(e) => {
        debug!(node = %id, error = %e, "toggle of closed node");
        status_only(StatusCode::NOT_FOUND)
      }
    }
  }

  fn success(&self, state: NodeState) -> StatusCode {
    match state {
      NodeState::Disable if self.legacy_disable_status => StatusCode::CREATED,
      _ => StatusCode::OK,
    }
  }

  async fn page(&self) -> Response<Full<Bytes>> {
    match self.assets.page().await {
      Ok(page) => with_body(page, mime::TEXT_HTML_UTF_8.as_ref()),
      Err(e) => {
        warn!(error = %e, "viewer page unavailable");
        status_only(StatusCode::NOT_FOUND)
      }
    }
  }

  async fn asset(&self, relative: &str) -> Response<Full<Bytes>> {
    match self.assets.asset(relative).await {
      Some(asset) => with_body(asset.body, asset.content_type.as_ref()),
      None => status_only(StatusCode::NOT_FOUND),
    }
  }
}

/// A response whose body is the status code's reason phrase.
fn status_only(status: StatusCode) -> Response<Full<Bytes>> {
  let reason = status.canonical_reason().unwrap_or_default();
  let mut response = Response::new(Full::new(Bytes::from(reason)));
  *response.status_mut() = status;
  response.headers_mut().insert(
    CONTENT_TYPE,
    HeaderValue::from_static("text/plain; charset=utf-8"),
  );
  response
}

fn with_body(body: Bytes, content_type: &str) -> Response<Full<Bytes>> {
  let mut response = Response::new(Full::new(body));
  if let Ok(value) = HeaderValue::from_str(content_type) {
    response.headers_mut().insert(CONTENT_TYPE, value);
  }
  response
}
