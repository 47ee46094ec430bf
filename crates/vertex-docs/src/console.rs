//! The interactive documentation console.
//!
//! The server hosts one console page at `/console`; each API redirects its
//! `{root}/console` there with the URL of its own Swagger document in the
//! `url` query parameter, which the page loads on start.

use bytes::Bytes;

use crate::error::DocsResult;

/// Path of the shared console page.
pub const CONSOLE_PATH: &str = "/console";

/// Redirect target for an API whose document is served at `swagger_path`.
///
/// ```
/// assert_eq!(
///     vertex_docs::console_location("/myapi/1.0/swagger").unwrap(),
///     "/console?url=%2Fmyapi%2F1.0%2Fswagger"
/// );
/// ```
pub fn console_location(swagger_path: &str) -> DocsResult<String> {
    let query = serde_urlencoded::to_string([("url", swagger_path)])?;
    Ok(format!("{CONSOLE_PATH}?{query}"))
}

/// Console page configuration and HTML generation.
///
/// The page loads Swagger UI from a CDN and points it at the document named
/// by the `url` query parameter.
#[derive(Debug, Clone)]
pub struct SwaggerConsole {
    title: String,
    swagger_version: String,
    deep_linking: bool,
}

impl Default for SwaggerConsole {
    fn default() -> Self {
        Self::new()
    }
}

impl SwaggerConsole {
    /// Creates the console with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self {
            title: "API Console".to_string(),
            swagger_version: "5.18.2".to_string(),
            deep_linking: true,
        }
    }

    /// Sets the page title.
    #[must_use]
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Sets the Swagger UI version loaded from the CDN.
    #[must_use]
    pub fn swagger_version(mut self, version: impl Into<String>) -> Self {
        self.swagger_version = version.into();
        self
    }

    /// Enables or disables deep linking.
    #[must_use]
    pub fn deep_linking(mut self, enabled: bool) -> Self {
        self.deep_linking = enabled;
        self
    }

    /// The page path.
    #[must_use]
    pub fn path(&self) -> &'static str {
        CONSOLE_PATH
    }

    /// The complete HTML page.
    #[must_use]
    pub fn html(&self) -> String {
        format!(
            r##"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title}</title>
    <link rel="stylesheet" href="https://unpkg.com/swagger-ui-dist@{version}/swagger-ui.css" />
    <style>
        body {{
            margin: 0;
            background: #fafafa;
        }}
    </style>
</head>
<body>
    <div id="swagger-ui"></div>
    <script src="https://unpkg.com/swagger-ui-dist@{version}/swagger-ui-bundle.js"></script>
    <script src="https://unpkg.com/swagger-ui-dist@{version}/swagger-ui-standalone-preset.js"></script>
    <script>
        window.onload = function() {{
            const url = new URLSearchParams(window.location.search).get('url');
            window.ui = SwaggerUIBundle({{
                url: url,
                dom_id: '#swagger-ui',
                deepLinking: {deep_linking},
                presets: [
                    SwaggerUIBundle.presets.apis,
                    SwaggerUIStandalonePreset
                ],
                layout: "StandaloneLayout"
            }});
        }};
    </script>
</body>
</html>"##,
            title = html_escape(&self.title),
            version = html_escape(&self.swagger_version),
            deep_linking = self.deep_linking,
        )
    }

    /// The HTML as bytes for use in HTTP responses.
    #[must_use]
    pub fn html_bytes(&self) -> Bytes {
        Bytes::from(self.html())
    }
}

fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}
