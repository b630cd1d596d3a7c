use chrono::DateTime;
use photofeed_core::{FeedViewModel, Post, Route};

const EXCERPT_CHARS: usize = 160;

pub fn render_status(view: &FeedViewModel) -> String {
    let mut status = format!(
        "[{}] posts: {} | pages: {}",
        route_label(&view.route),
        view.post_count,
        view.pages_loaded
    );
    if view.is_loading {
        status.push_str(" | loading...");
    } else if view.has_more {
        status.push_str(" | more available");
    } else if view.route.site().is_some() {
        status.push_str(" | end of feed");
    }
    if view.stale_discarded > 0 {
        status.push_str(&format!(" | stale responses dropped: {}", view.stale_discarded));
    }
    if let Some(reason) = &view.last_failure {
        status.push_str(&format!(" | last fetch failed: {reason}"));
    }
    status
}

/// Full listing: prompt or posts, then the status line.
pub fn render_frame(view: &FeedViewModel) -> String {
    let mut out = String::new();
    match &view.route {
        Route::Boot => out.push_str("Starting...\n"),
        Route::NoSiteGiven => {
            out.push_str("No site given. Type `site <name>` or `#?site=<name>` to pick one.\n")
        }
        Route::SiteNotFound => {
            out.push_str("Site not found. Use a location like `#?site=example.wordpress.com`.\n")
        }
        Route::Site(_) => {
            for post in &view.posts {
                out.push_str(&format_post(post));
                out.push('\n');
            }
        }
    }
    out.push_str(&render_status(view));
    out.push('\n');
    out
}

fn route_label(route: &Route) -> &str {
    match route {
        Route::Boot => "boot",
        Route::NoSiteGiven => "no site",
        Route::Site(site) => site.as_str(),
        Route::SiteNotFound => "not found",
    }
}

fn format_post(post: &Post) -> String {
    let title = if post.title.trim().is_empty() {
        "(untitled)"
    } else {
        post.title.trim()
    };
    let mut block = format!(
        "{title}  ({created})\n  image: {image}\n  link:  {link}\n",
        created = format_created_at(&post.created_at),
        image = post.image_url,
        link = post.url,
    );
    let excerpt = excerpt_text(&post.content);
    if !excerpt.is_empty() {
        block.push_str(&format!("  {excerpt}\n"));
    }
    block
}

/// Formats RFC 3339 timestamps; other tokens are shown as-is.
fn format_created_at(raw: &str) -> String {
    DateTime::parse_from_rfc3339(raw)
        .map(|date| date.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|_| raw.to_string())
}

fn excerpt_text(html: &str) -> String {
    let text = html2md::parse_html(html);
    let line = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if line.chars().count() <= EXCERPT_CHARS {
        return line;
    }
    let mut cut: String = line.chars().take(EXCERPT_CHARS).collect();
    cut.push_str("...");
    cut
}
