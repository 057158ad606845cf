//! # Admin Server
//!
//! HTTP/1 server for the admin surface, built on `hyper` and `hyper-util`.
//! Each accepted connection is served on its own task; the accept loop stops
//! when its cancellation token fires.

use crate::admin::AdminConfig;
use crate::admin::handler::AdminService;
use crate::error::AdminError;
use crate::registry::InspectorRegistry;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// A bound admin server.
#[derive(Debug)]
pub struct AdminServer {
  listener: TcpListener,
  service: Arc<AdminService>,
}

impl AdminServer {
  /// Binds the configured address.
  ///
  /// # Errors
  ///
  /// Returns [`AdminError::Bind`] if the address cannot be bound.
  pub async fn bind(config: AdminConfig, registry: InspectorRegistry) -> Result<Self, AdminError> {
    let listener = TcpListener::bind(config.bind_address.as_str())
      .await
      .map_err(|source| AdminError::Bind {
        address: config.bind_address.clone(),
        source,
      })?;
    Ok(Self {
      service: Arc::new(AdminService::new(&config, registry)),
      listener,
    })
  }

  /// The address actually bound.
  ///
  /// # Errors
  ///
  /// Returns the socket's I/O error.
  pub fn local_addr(&self) -> Result<SocketAddr, AdminError> {
    Ok(self.listener.local_addr()?)
  }

  /// The request handler.
  pub fn service(&self) -> Arc<AdminService> {
    Arc::clone(&self.service)
  }

  /// Accepts connections until `shutdown` is cancelled.
  ///
  /// # Errors
  ///
  /// Returns [`AdminError::Io`] if the bound address cannot be read.
  pub async fn run(self, shutdown: CancellationToken) -> Result<(), AdminError> {
    info!(address = %self.local_addr()?, "admin server listening");

    loop {
      tokio::select! {
        _ = shutdown.cancelled() => {
          info!("admin server stopping");
          return Ok(());
        }
        accepted = self.listener.accept() => match accepted {
          Ok((stream, peer)) => {
            debug!(peer = %peer, "accepted admin connection");
            let service = Arc::clone(&self.service);
            tokio::spawn(async move {
              let handler = service_fn(move |request| {
                let service = Arc::clone(&service);
                async move { Ok::<_, Infallible>(service.handle(request).await) }
              });
              if let Err(e) = http1::Builder::new()
                .serve_connection(TokioIo::new(stream), handler)
                .await
              {
                error!(peer = %peer, error = %e, "error serving admin connection");
              }
            });
          }
          Err(e) => warn!(error = %e, "error accepting admin connection"),
        },
      }
    }
  }
}
