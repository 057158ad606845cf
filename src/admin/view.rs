//! # Viewer Assets
//!
//! Serves the live viewer: an HTML page with the host theme's stylesheets
//! linked in, and the static files next to it.
//!
//! The page is read and rewritten once, on the first successful request, and
//! served from memory afterwards. A failed read is not cached.

use bytes::Bytes;
use mime::Mime;
use std::io;
use std::path::{Component, Path, PathBuf};
use tokio::sync::OnceCell;
use tracing::debug;

/// File name of the viewer page inside the asset directory.
pub const VIEW_PAGE: &str = "view.html";

/// Placeholder in the viewer page replaced by the theme stylesheet links.
pub const THEME_PLACEHOLDER: &str = "<!-- INSERT-THEME-CSS -->";

/// A static file ready to be served.
#[derive(Debug, Clone, PartialEq)]
pub struct Asset {
  /// File contents.
  pub body: Bytes,
  /// Content type derived from the file extension.
  pub content_type: Mime,
}

/// The viewer page cache and asset directory.
#[derive(Debug)]
pub struct ViewAssets {
  root: PathBuf,
  theme_css: Vec<String>,
  page: OnceCell<Bytes>,
}

impl ViewAssets {
  /// Creates the asset store for `root`.
  pub fn new(root: impl Into<PathBuf>, theme_css: Vec<String>) -> Self {
    Self {
      root: root.into(),
      theme_css,
      page: OnceCell::new(),
    }
  }

  /// The asset directory.
  pub fn root(&self) -> &Path {
    &self.root
  }

  /// Returns the viewer page with theme links injected.
  ///
  /// # Errors
  ///
  /// Returns the I/O error if the page cannot be read. The next call retries.
  pub async fn page(&self) -> io::Result<Bytes> {
    self
      .page
      .get_or_try_init(|| async {
        let raw = tokio::fs::read_to_string(self.root.join(VIEW_PAGE)).await?;
        debug!(root = %self.root.display(), "viewer page cached");
        Ok::<_, io::Error>(Bytes::from(inject_theme(&raw, &self.theme_css)))
      })
      .await
      .cloned()
  }

  /// Reads a static asset by its path relative to the asset directory.
  ///
  /// Returns `None` for paths that leave the directory or touch a dot-file,
  /// and for anything that cannot be read as a file.
  pub async fn asset(&self, relative: &str) -> Option<Asset> {
    let path = self.resolve(relative)?;
    let body = tokio::fs::read(&path).await.ok()?;
    Some(Asset {
      body: Bytes::from(body),
      content_type: content_type(&path),
    })
  }

  /// Maps a request path onto the asset directory.
  pub fn resolve(&self, relative: &str) -> Option<PathBuf> {
    let relative = Path::new(relative);
    let mut resolved = self.root.clone();
    let mut segments = 0;
    for component in relative.components() {
      match component {
        Component::Normal(segment) => {
          if segment.to_string_lossy().starts_with('.') {
            return None;
          }
          resolved.push(segment);
          segments += 1;
        }
        Component::CurDir => {}
        _ => return None,
      }
    }
    (segments > 0).then_some(resolved)
  }
}

/// Replaces the theme placeholder with one stylesheet link per entry.
pub fn inject_theme(page: &str, theme_css: &[String]) -> String {
  let links: String = theme_css
    .iter()
    .map(|css| format!("<link rel=\"stylesheet\" href=\"../../{css}\">\n"))
    .collect();
  page.replacen(THEME_PLACEHOLDER, &links, 1)
}

/// Content type of a file, by extension.
pub fn content_type(path: &Path) -> Mime {
  let extension = path
    .extension()
    .map(|ext| ext.to_string_lossy().to_ascii_lowercase());
  match extension.as_deref() {
    Some("html" | "htm") => mime::TEXT_HTML_UTF_8,
    Some("js" | "mjs") => mime::APPLICATION_JAVASCRIPT_UTF_8,
    Some("css") => mime::TEXT_CSS_UTF_8,
    Some("json") => mime::APPLICATION_JSON,
    Some("svg") => mime::IMAGE_SVG,
    Some("png") => mime::IMAGE_PNG,
    Some("jpg" | "jpeg") => mime::IMAGE_JPEG,
    Some("gif") => mime::IMAGE_GIF,
    Some("woff") => mime::FONT_WOFF,
    Some("woff2") => mime::FONT_WOFF2,
    Some("txt") => mime::TEXT_PLAIN_UTF_8,
    _ => mime::APPLICATION_OCTET_STREAM,
  }
}
