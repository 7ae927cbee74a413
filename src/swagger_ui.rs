//! Exports a static Swagger UI page that renders the generated document.
//!
//! The export directory receives an HTML page and an `assets/` directory with
//! the Swagger UI stylesheet and bundle. Files that already exist are left
//! untouched, so repeated exports never hit the network twice.

use crate::error::ExportError;
use log::{debug, info};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

pub const CSS_FILE_NAME: &str = "swagger-ui.css";
pub const JS_FILE_NAME: &str = "swagger-ui-bundle.js";
pub const DEFAULT_HTML_FILE_NAME: &str = "index.html";

const ASSETS_DIRECTORY: &str = "assets";
const CSS_URL: &str = "https://unpkg.com/swagger-ui-dist@5/swagger-ui.css";
const JS_URL: &str = "https://unpkg.com/swagger-ui-dist@5/swagger-ui-bundle.js";

/// Where and how the viewer is exported.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SwaggerUiConfig {
    /// Directory the page and assets are written to.
    pub export_path: PathBuf,
    /// Page file name; empty means `index.html`.
    pub html_file_name: String,
    pub title: String,
    /// URI prefix the export directory is served under.
    pub serve_uri: String,
}

impl SwaggerUiConfig {
    pub fn new(export_path: impl Into<PathBuf>) -> Self {
        Self {
            export_path: export_path.into(),
            ..Self::default()
        }
    }

    fn html_file_name(&self) -> &str {
        if self.html_file_name.is_empty() {
            DEFAULT_HTML_FILE_NAME
        } else {
            &self.html_file_name
        }
    }
}

/// Links the page embeds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageLinks {
    pub openapi_file: String,
    pub css: String,
    pub js: String,
}

impl PageLinks {
    pub fn new(serve_uri: &str, openapi_file_name: &str) -> Self {
        Self {
            openapi_file: join_uri(&[serve_uri, openapi_file_name]),
            css: join_uri(&[serve_uri, ASSETS_DIRECTORY, CSS_FILE_NAME]),
            js: join_uri(&[serve_uri, ASSETS_DIRECTORY, JS_FILE_NAME]),
        }
    }
}

/// Joins URI segments with single slashes, keeping a leading slash of the
/// first segment.
fn join_uri(segments: &[&str]) -> String {
    let leading = segments.first().is_some_and(|first| first.starts_with('/'));
    let joined = segments
        .iter()
        .map(|segment| segment.trim_matches('/'))
        .filter(|segment| !segment.is_empty())
        .collect::<Vec<_>>()
        .join("/");
    if leading {
        format!("/{}", joined)
    } else {
        joined
    }
}

/// Renders the viewer page.
pub fn html_page(title: &str, links: &PageLinks) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
  <head>
    <meta charset="utf-8" />
    <meta name="viewport" content="width=device-width, initial-scale=1" />
    <meta name="description" content="SwaggerUI" />
    <title>{title}</title>
    <link rel="stylesheet" href="{css}" />
  </head>
  <body>
    <div id="swagger-ui"></div>
    <script src="{js}" crossorigin></script>
    <script>
      window.onload = () => {{
        window.ui = SwaggerUIBundle({{
          url: '{url}',
          dom_id: '#swagger-ui',
          presets: [
            SwaggerUIBundle.presets.apis,
          ],
        }});
      }};
    </script>
  </body>
</html>
"#,
        title = title,
        css = links.css,
        js = links.js,
        url = links.openapi_file,
    )
}

/// Writes the viewer page and its assets for `openapi_file_name`.
pub fn export(config: &SwaggerUiConfig, openapi_file_name: &str) -> Result<(), ExportError> {
    let assets = config.export_path.join(ASSETS_DIRECTORY);
    fs::create_dir_all(&assets).map_err(|source| ExportError::Directory {
        path: assets.clone(),
        source,
    })?;

    write_asset(&assets.join(CSS_FILE_NAME), CSS_URL)?;
    write_asset(&assets.join(JS_FILE_NAME), JS_URL)?;

    let page = config.export_path.join(config.html_file_name());
    if page.exists() {
        debug!("Keeping existing page {}", page.display());
    } else {
        let links = PageLinks::new(&config.serve_uri, openapi_file_name);
        write_file(&page, html_page(&config.title, &links).as_bytes())?;
    }

    info!("Swagger UI exported to {}", config.export_path.display());
    Ok(())
}

fn write_asset(path: &Path, url: &str) -> Result<(), ExportError> {
    if path.exists() {
        debug!("Keeping existing asset {}", path.display());
        return Ok(());
    }

    info!("Downloading {}", url);
    let fetch_error = |source| ExportError::Fetch {
        url: url.to_string(),
        source,
    };
    let mut response = ureq::get(url).call().map_err(fetch_error)?;
    let body = response.body_mut().read_to_vec().map_err(fetch_error)?;
    write_file(path, &body)
}

fn write_file(path: &Path, content: &[u8]) -> Result<(), ExportError> {
    fs::write(path, content).map_err(|source| ExportError::Write {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn seed_assets(export_path: &Path) {
        let assets = export_path.join(ASSETS_DIRECTORY);
        fs::create_dir_all(&assets).unwrap();
        fs::write(assets.join(CSS_FILE_NAME), "css").unwrap();
        fs::write(assets.join(JS_FILE_NAME), "js").unwrap();
    }

    #[test]
    fn test_page_links() {
        let links = PageLinks::new("/docs/", "openapi.yaml");

        assert_eq!(links.openapi_file, "/docs/openapi.yaml");
        assert_eq!(links.css, "/docs/assets/swagger-ui.css");
        assert_eq!(links.js, "/docs/assets/swagger-ui-bundle.js");
    }

    #[test]
    fn test_page_links_without_serve_uri() {
        let links = PageLinks::new("", "openapi.json");

        assert_eq!(links.openapi_file, "openapi.json");
        assert_eq!(links.css, "assets/swagger-ui.css");
    }

    #[test]
    fn test_html_page_contents() {
        let html = html_page("Pets", &PageLinks::new("/docs", "openapi.yaml"));

        assert!(html.contains("<title>Pets</title>"));
        assert!(html.contains(r#"<link rel="stylesheet" href="/docs/assets/swagger-ui.css" />"#));
        assert!(html.contains(r#"<script src="/docs/assets/swagger-ui-bundle.js" crossorigin>"#));
        assert!(html.contains("url: '/docs/openapi.yaml'"));
        assert!(html.contains("dom_id: '#swagger-ui'"));
        assert!(html.contains("SwaggerUIBundle.presets.apis"));
    }

    #[test]
    fn test_export_writes_page_and_keeps_assets() {
        let temp_dir = TempDir::new().unwrap();
        seed_assets(temp_dir.path());

        let mut config = SwaggerUiConfig::new(temp_dir.path());
        config.title = "Pets".to_string();
        config.serve_uri = "/docs".to_string();
        export(&config, "openapi.yaml").unwrap();

        let page = fs::read_to_string(temp_dir.path().join(DEFAULT_HTML_FILE_NAME)).unwrap();
        assert!(page.contains("url: '/docs/openapi.yaml'"));
        let css = fs::read_to_string(temp_dir.path().join("assets/swagger-ui.css")).unwrap();
        assert_eq!(css, "css");
    }

    #[test]
    fn test_export_keeps_existing_page() {
        let temp_dir = TempDir::new().unwrap();
        seed_assets(temp_dir.path());
        fs::write(temp_dir.path().join("viewer.html"), "custom").unwrap();

        let mut config = SwaggerUiConfig::new(temp_dir.path());
        config.html_file_name = "viewer.html".to_string();
        export(&config, "openapi.yaml").unwrap();

        let page = fs::read_to_string(temp_dir.path().join("viewer.html")).unwrap();
        assert_eq!(page, "custom");
        assert!(!temp_dir.path().join(DEFAULT_HTML_FILE_NAME).exists());
    }
}
