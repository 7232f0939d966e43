use anyhow::{Context, Result};
use time::{
    Date, OffsetDateTime, UtcOffset, format_description::well_known::Rfc3339,
    macros::format_description,
};
use url::Url;

pub trait UrlExt {
    fn with_path(&self, path: &str) -> Url;
    fn resolve(&self, reference: &str) -> Result<Url>;
}

impl UrlExt for Url {
    #[inline]
    fn with_path(&self, path: &str) -> Url {
        let mut out = self.clone();
        out.set_path(path);
        out.set_query(None);
        out
    }

    /// Resolve an absolute or root-relative URL (as returned for uploads) against this one.
    #[inline]
    fn resolve(&self, reference: &str) -> Result<Url> {
        self.join(reference).with_context(|| format!("Invalid URL reference {reference:?}"))
    }
}

/// Returns the first candidate that is present and non-empty.
pub fn first_present<I, S>(candidates: I) -> Option<S>
where
    I: IntoIterator<Item = Option<S>>,
    S: AsRef<str>,
{
    candidates.into_iter().flatten().find(|s| !s.as_ref().is_empty())
}

/// Format a post date as `MMM D, YYYY`.
/// Timestamps are normalized to UTC first; bare dates are taken as-is.
pub fn format_post_date(value: &str) -> Result<String> {
    let date = match OffsetDateTime::parse(value, &Rfc3339) {
        Ok(datetime) => datetime.to_offset(UtcOffset::UTC).date(),
        Err(_) => Date::parse(value, format_description!("[year]-[month]-[day]"))
            .with_context(|| format!("Invalid post date {value:?}"))?,
    };
    Ok(date.format(format_description!("[month repr:short] [day padding:none], [year]"))?)
}
