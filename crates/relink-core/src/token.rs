use std::{fmt, sync::LazyLock};

use regex::Regex;

use crate::error::{CoreError, CoreResult};

static VERSION_SEGMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^/v(\d+)/").expect("static version segment regex"));

/// Opaque version token the CDN embeds in object paths as `/v<token>/`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VersionToken(String);

impl VersionToken {
    /// Accepts a bare token (`1712345678`) or its path form (`v1712345678`).
    ///
    /// # Errors
    ///
    /// [`CoreError::InvalidToken`] if the token is empty or contains anything
    /// other than ASCII letters and digits.
    pub fn new(raw: impl AsRef<str>) -> CoreResult<Self> {
        let raw = raw.as_ref().trim();
        let token = match raw.strip_prefix('v') {
            Some("") => return Err(CoreError::InvalidToken(raw.to_string())),
            Some(digits) if digits.bytes().all(|b| b.is_ascii_digit()) => digits,
            _ => raw,
        };

        if token.is_empty() || !token.bytes().all(|b| b.is_ascii_alphanumeric()) {
            return Err(CoreError::InvalidToken(raw.to_string()));
        }

        Ok(Self(token.to_string()))
    }

    /// Token of a leading `/v<digits>/` segment, e.g. the part of a CDN URL
    /// that follows its base.
    pub fn leading(path: &str) -> Option<Self> {
        VERSION_SEGMENT
            .captures(path)
            .and_then(|caps| caps.get(1))
            .map(|m| Self(m.as_str().to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Path segment form, `v<token>`.
    pub fn segment(&self) -> String {
        format!("v{}", self.0)
    }
}

impl fmt::Display for VersionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for VersionToken {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
