use url::Url;

/// Site shown when the location carries no `site` parameter.
pub const DEFAULT_SITE: &str = "discover.wordpress.com";

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Route {
    /// Nothing resolved yet.
    #[default]
    Boot,
    /// `site=` was given with an empty value.
    NoSiteGiven,
    /// The feed for this site is being shown.
    Site(String),
    /// The location could not be understood.
    SiteNotFound,
}

impl Route {
    pub fn site(&self) -> Option<&str> {
        match self {
            Route::Site(site) => Some(site.as_str()),
            Route::Boot | Route::NoSiteGiven | Route::SiteNotFound => None,
        }
    }
}

/// Resolves a hash fragment such as `#?site=example.wordpress.com`.
///
/// Only the root path is routable: `#`, `#?...`, `#/` and `#/?...` are
/// accepted, anything else (for example `#/photos`) is `SiteNotFound`.
pub fn resolve_hash(hash: &str, default_site: &str) -> Route {
    let fragment = hash.trim();
    let fragment = fragment.strip_prefix('#').unwrap_or(fragment);
    let fragment = fragment.strip_prefix('/').unwrap_or(fragment);

    let query = if fragment.is_empty() {
        ""
    } else if let Some(query) = fragment.strip_prefix('?') {
        query
    } else {
        return Route::SiteNotFound;
    };

    let site = url::form_urlencoded::parse(query.as_bytes())
        .find(|(key, _)| key == "site")
        .map(|(_, value)| value.into_owned());

    match site {
        None => Route::Site(default_site.to_string()),
        Some(site) if site.is_empty() => Route::NoSiteGiven,
        Some(site) => Route::Site(site),
    }
}

/// Resolves either a full page URL or a bare hash fragment.
pub fn resolve_location(location: &str, default_site: &str) -> Route {
    match Url::parse(location.trim()) {
        Ok(url) => resolve_hash(url.fragment().unwrap_or(""), default_site),
        Err(_) => resolve_hash(location, default_site),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_url_uses_its_fragment() {
        assert_eq!(
            resolve_location("https://photos.example/#?site=foo.example.com", DEFAULT_SITE),
            Route::Site("foo.example.com".to_string())
        );
        assert_eq!(
            resolve_location("https://photos.example/", DEFAULT_SITE),
            Route::Site(DEFAULT_SITE.to_string())
        );
    }

    #[test]
    fn percent_encoded_site_is_decoded() {
        assert_eq!(
            resolve_hash("#?site=my%2Eblog.example", DEFAULT_SITE),
            Route::Site("my.blog.example".to_string())
        );
    }

    #[test]
    fn first_site_parameter_wins() {
        assert_eq!(
            resolve_hash("#?site=a.example&site=b.example", DEFAULT_SITE),
            Route::Site("a.example".to_string())
        );
    }

    #[test]
    fn only_site_routes_carry_a_site() {
        assert_eq!(Route::NoSiteGiven.site(), None);
        assert_eq!(Route::SiteNotFound.site(), None);
        assert_eq!(Route::Boot.site(), None);
        assert_eq!(Route::Site("x".into()).site(), Some("x"));
    }
}
