/// Opaque identifier assigned by the remote API.
pub type PostId = u64;

/// Path suffixes accepted as displayable images. Matching is case-sensitive.
pub const IMAGE_EXTENSIONS: [&str; 5] = [".jpg", ".png", ".gif", ".svg", ".webp"];

/// A decoded entry as returned by one page of the posts listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostEntry {
    pub id: PostId,
    pub created_at: String,
    pub title: String,
    /// HTML excerpt.
    pub content: String,
    pub url: String,
    /// URL of the first attachment, if the entry has any.
    pub image_url: Option<String>,
}

/// An entry that passed the image filter and can be shown in the feed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Post {
    pub id: PostId,
    pub created_at: String,
    pub title: String,
    pub content: String,
    pub url: String,
    pub image_url: String,
}

impl Post {
    /// Keeps the entry only when its image URL points at a known image type.
    pub fn from_entry(entry: PostEntry) -> Option<Self> {
        let image_url = entry.image_url.filter(|url| is_displayable_image(url))?;
        Some(Self {
            id: entry.id,
            created_at: entry.created_at,
            title: entry.title,
            content: entry.content,
            url: entry.url,
            image_url,
        })
    }
}

/// True when `url`, ignoring everything from the first `?`, ends in one of
/// [`IMAGE_EXTENSIONS`].
pub fn is_displayable_image(url: &str) -> bool {
    let path = url.split_once('?').map_or(url, |(path, _query)| path);
    IMAGE_EXTENSIONS.iter().any(|ext| path.ends_with(ext))
}
