//! RSS 2.0 feed of posts, written to `feed.xml`.
//!
//! Items follow collection order. Links are absolute, built from
//! `site.base_url`; bodies are rendered to HTML for `<description>`.

use crate::collection::Collection;
use crate::config::SiteConfig;
use crate::content::ContentItem;
use crate::filters::format_rfc2822;
use crate::render::markdown_to_html;
use rss::{CategoryBuilder, ChannelBuilder, GuidBuilder, ItemBuilder};
use std::path::Path;
use thiserror::Error;

pub const FEED_FILENAME: &str = "feed.xml";

#[derive(Error, Debug)]
pub enum FeedError {
    #[error("failed to write feed: {0}")]
    Io(#[from] std::io::Error),
}

/// Absolute URL of a path under the site root.
pub fn absolute_url(base_url: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

fn post_to_item(post: &ContentItem, config: &SiteConfig) -> rss::Item {
    let link = absolute_url(&config.site.base_url, &format!("posts/{}/", post.slug));
    let categories = post
        .tags
        .iter()
        .map(|tag| CategoryBuilder::default().name(tag.as_str()).build())
        .collect::<Vec<_>>();

    ItemBuilder::default()
        .title(Some(post.title.clone()))
        .link(Some(link.clone()))
        .guid(Some(GuidBuilder::default().permalink(true).value(link).build()))
        .pub_date(Some(format_rfc2822(&post.date)))
        .description(Some(markdown_to_html(&post.body)))
        .categories(categories)
        .build()
}

/// Serialize the posts feed.
pub fn feed_xml(config: &SiteConfig, posts: &Collection) -> String {
    let site = &config.site;
    let items = posts
        .iter()
        .map(|post| post_to_item(post, config))
        .collect::<Vec<_>>();

    let last_build_date = posts.iter().map(|p| p.date).max().map(|d| format_rfc2822(&d));

    ChannelBuilder::default()
        .title(site.title.as_str())
        .link(absolute_url(&site.base_url, ""))
        .description(site.description.as_str())
        .language(Some(site.language.clone()))
        .generator(Some(format!("folio {}", env!("CARGO_PKG_VERSION"))))
        .last_build_date(last_build_date)
        .items(items)
        .build()
        .to_string()
}

/// Write `feed.xml` into the output root.
pub fn write_feed(output_root: &Path, config: &SiteConfig, posts: &Collection) -> Result<(), FeedError> {
    std::fs::create_dir_all(output_root)?;
    std::fs::write(output_root.join(FEED_FILENAME), feed_xml(config, posts))?;
    Ok(())
}
