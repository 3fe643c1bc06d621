use crate::error::Error;
use crate::query::QueryParams;

use url::Url;

/// Builder for an absolute URL from a base, path, query and fragment.
///
/// The path is resolved against the base with standard URL-resolution
/// rules: an absolute path replaces the base's path, a relative path is
/// joined. A provided query *replaces* the base's query string, and a
/// provided fragment replaces the fragment.
#[derive(Debug, Clone)]
pub struct UrlInit {
    base_url: String,
    pathname: Option<String>,
    query: Option<QueryParams>,
    fragment: Option<String>,
}

impl UrlInit {
    pub fn new(base_url: impl Into<String>) -> UrlInit {
        UrlInit {
            base_url: base_url.into(),
            pathname: None,
            query: None,
            fragment: None,
        }
    }

    pub fn pathname(mut self, pathname: impl Into<String>) -> UrlInit {
        self.pathname = Some(pathname.into());
        self
    }

    pub fn query(mut self, query: impl Into<QueryParams>) -> UrlInit {
        self.query = Some(query.into());
        self
    }

    pub fn fragment(mut self, fragment: impl Into<String>) -> UrlInit {
        self.fragment = Some(fragment.into());
        self
    }

    /// Resolve into an absolute URL.
    ///
    /// Fails with [`Error::InvalidUrl`] when the base is not a valid
    /// absolute URL.
    pub fn build(self) -> Result<Url, Error> {
        create_url(self)
    }
}

impl From<Url> for UrlInit {
    fn from(url: Url) -> UrlInit {
        UrlInit::new(url)
    }
}

impl From<&Url> for UrlInit {
    fn from(url: &Url) -> UrlInit {
        UrlInit::new(url.as_str())
    }
}

/// Create an absolute URL from the given parts.
pub fn create_url(init: UrlInit) -> Result<Url, Error> {
    let base = Url::parse(&init.base_url)?;

    let mut url = match init.pathname {
        Some(ref pathname) => base.join(pathname)?,
        None => base,
    };

    if let Some(ref query) = init.query {
        if query.is_empty() {
            url.set_query(None);
        } else {
            url.set_query(Some(&query.to_string()));
        }
    }

    if let Some(ref fragment) = init.fragment {
        let fragment = fragment.strip_prefix('#').unwrap_or(fragment);

        if fragment.is_empty() {
            url.set_fragment(None);
        } else {
            url.set_fragment(Some(fragment));
        }
    }

    Ok(url)
}
