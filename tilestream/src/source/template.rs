//! URL construction from tile templates.

use thiserror::Error;

use crate::coord::TileId;

const X_TOKEN: &str = "{x}";
const Y_TOKEN: &str = "{y}";
const Z_TOKEN: &str = "{z}";

/// Errors produced while building a tile URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TemplateError {
    /// The template is missing a required coordinate token.
    #[error("URL template is missing required token {token}")]
    MissingToken {
        /// The absent token, e.g. `{x}`.
        token: &'static str,
    },
}

/// URL template with `{x}`, `{y}` and `{z}` coordinate tokens.
///
/// Building a URL replaces each token with the decimal representation of
/// the corresponding coordinate and leaves every other character intact.
/// Each token is expected exactly once.
///
/// # Example
///
/// ```
/// use tilestream::coord::TileId;
/// use tilestream::source::UrlTemplate;
///
/// let template = UrlTemplate::new("http://x/{z}/{x}/{y}.png");
/// let url = template.url_for(&TileId::new(3, 5, 2)).unwrap();
/// assert_eq!(url, "http://x/2/3/5.png");
/// ```
#[derive(Debug, Clone)]
pub struct UrlTemplate {
    template: String,
}

impl UrlTemplate {
    /// Create a template from its string form.
    ///
    /// Tokens are checked when a URL is built, not here, so a malformed
    /// template surfaces as a per-fetch failure rather than a constructor
    /// error.
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
        }
    }

    /// The raw template string.
    pub fn as_str(&self) -> &str {
        &self.template
    }

    /// Build the concrete resource URL for `tile`.
    ///
    /// All three tokens are verified present before any substitution is
    /// attempted; a missing one fails the whole build.
    pub fn url_for(&self, tile: &TileId) -> Result<String, TemplateError> {
        for token in [X_TOKEN, Y_TOKEN, Z_TOKEN] {
            if !self.template.contains(token) {
                return Err(TemplateError::MissingToken { token });
            }
        }

        let url = self
            .template
            .replacen(X_TOKEN, &tile.x.to_string(), 1)
            .replacen(Y_TOKEN, &tile.y.to_string(), 1)
            .replacen(Z_TOKEN, &tile.z.to_string(), 1);

        Ok(url)
    }
}
