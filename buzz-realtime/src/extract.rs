//! Pulls the JSON payload a server-rendered page embeds in a `<script>` tag.
//!
//! Pages on the realtime search site ship their whole state inside
//! `<script id="__NEXT_DATA__" type="application/json">…</script>`. The
//! [`PayloadExtractor`] seam keeps the matching strategy apart from the
//! pagination logic so either can be swapped or tested alone.
use std::sync::LazyLock;

use regex::Regex;

use crate::error::{RealtimeError, Result};

/// Script id used by the search pages.
pub const NEXT_DATA_ID: &str = "__NEXT_DATA__";

static NEXT_DATA_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    script_pattern(NEXT_DATA_ID).expect("static __NEXT_DATA__ pattern compiles")
});

fn script_pattern(id: &str) -> std::result::Result<Regex, regex::Error> {
    Regex::new(&format!(
        r#"(?s)<script id="{}" type="application/json">(.+?)</script>"#,
        regex::escape(id)
    ))
}

/// Finds the embedded JSON text inside an HTML document.
pub trait PayloadExtractor: Send + Sync {
    /// Return the raw JSON text of the first match, or
    /// [`RealtimeError::Extraction`] when the page has none.
    fn extract<'a>(&self, html: &'a str) -> Result<&'a str>;
}

/// Regex-backed extractor for `<script id="…" type="application/json">` tags.
#[derive(Debug, Clone)]
pub struct ScriptTagExtractor {
    id: String,
    pattern: Regex,
}

impl ScriptTagExtractor {
    /// Extractor for a custom script id. An id that could never appear in a
    /// `id="…"` attribute is [`RealtimeError::InvalidInput`].
    ///
    /// ```
    /// use buzz_realtime::extract::{PayloadExtractor, ScriptTagExtractor};
    ///
    /// let ex = ScriptTagExtractor::new("state").unwrap();
    /// let html = r#"<script id="state" type="application/json">{"a":1}</script>"#;
    /// assert_eq!(ex.extract(html).unwrap(), r#"{"a":1}"#);
    /// ```
    pub fn new(id: &str) -> Result<Self> {
        if id.is_empty() || id.contains(['"', '<', '>']) {
            return Err(RealtimeError::InvalidInput(format!("script id {id:?}")));
        }
        let pattern = script_pattern(id)
            .map_err(|e| RealtimeError::InvalidInput(format!("script id {id:?}: {e}")))?;
        Ok(Self {
            id: id.to_string(),
            pattern,
        })
    }

    /// Extractor for the `__NEXT_DATA__` payload.
    pub fn next_data() -> Self {
        Self {
            id: NEXT_DATA_ID.to_string(),
            pattern: NEXT_DATA_PATTERN.clone(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }
}

impl Default for ScriptTagExtractor {
    fn default() -> Self {
        Self::next_data()
    }
}

impl PayloadExtractor for ScriptTagExtractor {
    fn extract<'a>(&self, html: &'a str) -> Result<&'a str> {
        self.pattern
            .captures(html)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str())
            .ok_or_else(|| {
                tracing::warn!(marker = %self.id, page_len = html.len(), "realtime.extract.missing");
                RealtimeError::Extraction {
                    marker: self.id.clone(),
                    page_len: html.len(),
                }
            })
    }
}
