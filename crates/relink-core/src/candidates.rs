//! Candidate CDN URL enumeration for legacy image references.
//!
//! Everything here is pure: no I/O and no mutation of shared state, so the
//! same reference and token snapshot always produce the same list.

use std::collections::HashSet;

use tracing::trace;
use url::Url;

use crate::{
    error::{CoreError, CoreResult},
    token::VersionToken,
};

/// Extensions (lower-case) that mark a reference as an image worth resolving.
pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp"];

/// Historical subfolders the CDN preserves as a path segment.
pub const DEFAULT_CONTENT_KINDS: &[&str] = &["editor", "imagens"];

/// Drop any `?query` and `#fragment` suffix.
pub fn strip_query(reference: &str) -> &str {
    let end = reference.find(['?', '#']).unwrap_or(reference.len());
    &reference[..end]
}

/// Case-insensitive check against [`IMAGE_EXTENSIONS`], ignoring the query.
pub fn is_image_reference(reference: &str) -> bool {
    let path = strip_query(reference.trim());
    let Some((_, ext)) = path.rsplit_once('.') else {
        return false;
    };
    IMAGE_EXTENSIONS
        .iter()
        .any(|known| ext.eq_ignore_ascii_case(known))
}

/// Final path segment of a legacy reference. Both `/` and `\` separate.
pub fn file_name(reference: &str) -> Option<&str> {
    strip_query(reference.trim())
        .rsplit(['/', '\\'])
        .find(|segment| !segment.is_empty())
}

/// Turns legacy references into ordered, de-duplicated candidate URLs.
#[derive(Clone, Debug)]
pub struct CandidateBuilder {
    /// Base without trailing slash, e.g. `https://res.cdn.com/acct/image/upload`.
    base: String,
    host: String,
    content_kinds: Vec<String>,
}

impl CandidateBuilder {
    /// # Errors
    ///
    /// - [`CoreError::UnsupportedBaseUrl`] unless the base is an http(s) URL
    ///   with a host.
    /// - [`CoreError::NoContentKinds`] / [`CoreError::InvalidContentKind`]
    ///   for an empty list or a kind that is blank after trimming slashes.
    pub fn new<I, S>(cdn_base_url: &Url, content_kinds: I) -> CoreResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let host = match (cdn_base_url.scheme(), cdn_base_url.host_str()) {
            ("http" | "https", Some(host)) if !cdn_base_url.cannot_be_a_base() => {
                host.to_ascii_lowercase()
            }
            _ => return Err(CoreError::UnsupportedBaseUrl(cdn_base_url.to_string())),
        };

        let mut base_url = cdn_base_url.clone();
        base_url.set_query(None);
        base_url.set_fragment(None);
        let base = base_url.as_str().trim_end_matches('/').to_string();

        let content_kinds = content_kinds
            .into_iter()
            .map(|kind| {
                let kind = kind.as_ref().trim().trim_matches('/');
                if kind.is_empty() {
                    Err(CoreError::InvalidContentKind(kind.to_string()))
                } else {
                    Ok(kind.to_string())
                }
            })
            .collect::<CoreResult<Vec<_>>>()?;
        if content_kinds.is_empty() {
            return Err(CoreError::NoContentKinds);
        }

        Ok(Self {
            base,
            host,
            content_kinds,
        })
    }

    /// Parse `cdn_base_url` and build.
    ///
    /// # Errors
    ///
    /// [`CoreError::InvalidBaseUrl`] if the string is not a URL, otherwise as
    /// [`CandidateBuilder::new`].
    pub fn parse<I, S>(cdn_base_url: &str, content_kinds: I) -> CoreResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let url = Url::parse(cdn_base_url.trim())
            .map_err(|e| CoreError::InvalidBaseUrl(format!("{cdn_base_url}: {e}")))?;
        Self::new(&url, content_kinds)
    }

    pub fn cdn_base(&self) -> &str {
        &self.base
    }

    pub fn content_kinds(&self) -> &[String] {
        &self.content_kinds
    }

    /// Candidate URLs for `reference`, most likely first.
    ///
    /// `tokens` is a ledger snapshot, oldest first; newer tokens are tried
    /// first. Order: every version-qualified URL (newest token first, content
    /// kinds in configured order), then the versionless URLs. Empty when the
    /// reference is not an image. A reference already on the CDN host comes
    /// back as the single candidate.
    pub fn build(&self, reference: &str, tokens: &[VersionToken]) -> Vec<Url> {
        let reference = reference.trim();
        if !is_image_reference(reference) {
            return Vec::new();
        }

        if let Some(url) = self.already_on_cdn(reference) {
            return vec![url];
        }

        let Some(file) = file_name(reference) else {
            return Vec::new();
        };

        let versioned = tokens.iter().rev().flat_map(|token| {
            self.content_kinds
                .iter()
                .map(move |kind| format!("{}/{}/{kind}/{file}", self.base, token.segment()))
        });
        let versionless = self
            .content_kinds
            .iter()
            .map(|kind| format!("{}/{kind}/{file}", self.base));

        let mut seen = HashSet::new();
        let mut out = Vec::with_capacity((tokens.len() + 1) * self.content_kinds.len());
        for raw in versioned.chain(versionless) {
            match Url::parse(&raw) {
                Ok(url) => {
                    if seen.insert(url.as_str().to_string()) {
                        out.push(url);
                    }
                }
                Err(e) => trace!(candidate = %raw, error = %e, "skipping unparsable candidate"),
            }
        }
        out
    }

    /// Version token of a URL under this CDN base.
    ///
    /// Only the segment directly after the base counts, so a base that itself
    /// contains `/v<digits>/` never yields a token.
    pub fn version_of(&self, url: &Url) -> Option<VersionToken> {
        let rest = url.as_str().strip_prefix(self.base.as_str())?;
        VersionToken::leading(rest)
    }

    fn already_on_cdn(&self, reference: &str) -> Option<Url> {
        let url = if reference.starts_with("//") {
            Url::parse(&format!("https:{reference}")).ok()?
        } else {
            Url::parse(reference).ok()?
        };

        let on_cdn = matches!(url.scheme(), "http" | "https")
            && url
                .host_str()
                .is_some_and(|host| host.eq_ignore_ascii_case(&self.host));
        on_cdn.then_some(url)
    }
}
