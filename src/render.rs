//! HTML page rendering.
//!
//! Pages are built with [maud](https://maud.lambda.xyz/) from the two
//! collections, the processed [`ImageSet`] and the presentation filters.
//! Rendering is pure: it returns [`Page`]s and leaves writing to the caller.
//!
//! ## Generated pages
//!
//! ```text
//! index.html                  # Site intro, random featured photo, recent posts
//! posts/index.html            # Every post, collection order
//! posts/<slug>/index.html     # One post
//! photos/index.html           # Photo grid, tiles classed by aspect
//! photos/<slug>/index.html    # One photo with its camera metadata
//! tags/<tag>/index.html       # Posts and photos carrying <tag>
//! ```
//!
//! The base stylesheet (`static/style.css`) is embedded at compile time and
//! inlined into every page after the color custom properties generated from
//! `[colors]`.

use crate::collection::Collection;
use crate::config::{self, SiteConfig};
use crate::content::ContentItem;
use crate::filters::{format_date, pick_random_with};
use crate::naming::slugify;
use crate::process::ImageSet;
use crate::shortcode::{self, ShortcodeError};
use maud::{DOCTYPE, Markup, PreEscaped, html};
use pulldown_cmark::{Options, Parser, html as md_html};
use rand::Rng;
use rayon::prelude::*;
use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;
use thiserror::Error;

const CSS_STATIC: &str = include_str!("../static/style.css");

/// Output directories holding one `<slug>/index.html` per item.
pub const ITEM_SECTIONS: [&str; 3] = ["posts", "photos", "tags"];

#[derive(Error, Debug)]
pub enum RenderError {
    #[error(transparent)]
    Shortcode(#[from] ShortcodeError),
    #[error(
        "duplicate {collection} slug `{slug}`: {} and {} would write the same page",
        .first.display(),
        .second.display()
    )]
    DuplicateSlug {
        collection: &'static str,
        slug: String,
        first: PathBuf,
        second: PathBuf,
    },
    #[error("tag `{0}` has no characters usable in a URL")]
    InvalidTag(String),
}

/// A rendered page and its path relative to the output root.
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    pub path: PathBuf,
    pub html: String,
}

impl Page {
    fn new(path: impl Into<PathBuf>, markup: Markup) -> Self {
        Self {
            path: path.into(),
            html: markup.into_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Home,
    Posts,
    Photos,
    Tags,
}

/// Items grouped under one tag slug.
struct TagGroup<'a> {
    /// Spelling of the tag as first seen.
    name: &'a str,
    posts: Vec<&'a ContentItem>,
    photos: Vec<&'a ContentItem>,
}

/// Renders every page of the site from already-built inputs.
pub struct Renderer<'a> {
    config: &'a SiteConfig,
    posts: &'a Collection,
    photos: &'a Collection,
    images: &'a ImageSet,
    css: String,
}

impl<'a> Renderer<'a> {
    pub fn new(
        config: &'a SiteConfig,
        posts: &'a Collection,
        photos: &'a Collection,
        images: &'a ImageSet,
    ) -> Self {
        let css = format!(
            "{}\n\n{}",
            config::generate_color_css(&config.colors),
            CSS_STATIC
        );
        Self {
            config,
            posts,
            photos,
            images,
            css,
        }
    }

    /// Render all pages. `rng` picks the featured photo on the home page.
    pub fn render_all<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<Vec<Page>, RenderError> {
        check_unique_slugs("posts", self.posts)?;
        check_unique_slugs("photos", self.photos)?;
        let tags = self.tag_index()?;

        // Empty photos collection: no featured photo.
        let featured = pick_random_with(self.photos.items(), rng).ok();

        let mut pages = vec![
            Page::new("index.html", self.home(featured)?),
            Page::new("posts/index.html", self.posts_list()),
            Page::new("photos/index.html", self.photos_grid()?),
        ];

        let posts = self
            .posts
            .items()
            .par_iter()
            .map(|post| Ok(Page::new(page_path("posts", &post.slug), self.post_page(post)?)))
            .collect::<Result<Vec<_>, RenderError>>()?;
        let photos = self
            .photos
            .items()
            .par_iter()
            .map(|photo| Ok(Page::new(page_path("photos", &photo.slug), self.photo_page(photo)?)))
            .collect::<Result<Vec<_>, RenderError>>()?;
        pages.extend(posts);
        pages.extend(photos);

        for (slug, group) in &tags {
            pages.push(Page::new(page_path("tags", slug), self.tag_page(group)));
        }

        Ok(pages)
    }

    fn tag_index(&self) -> Result<BTreeMap<String, TagGroup<'a>>, RenderError> {
        let mut index: BTreeMap<String, TagGroup<'a>> = BTreeMap::new();
        let tagged = self
            .posts
            .iter()
            .map(|item| (item, true))
            .chain(self.photos.iter().map(|item| (item, false)));

        for (item, is_post) in tagged {
            for tag in &item.tags {
                let slug = slugify(tag);
                if slug.is_empty() {
                    return Err(RenderError::InvalidTag(tag.clone()));
                }
                let group = index.entry(slug).or_insert_with(|| TagGroup {
                    name: tag,
                    posts: Vec::new(),
                    photos: Vec::new(),
                });
                if is_post {
                    group.posts.push(item);
                } else {
                    group.photos.push(item);
                }
            }
        }
        Ok(index)
    }

    // ========================================================================
    // Page chrome
    // ========================================================================

    fn base_document(
        &self,
        title: Option<&str>,
        section: Section,
        body_class: &str,
        content: Markup,
    ) -> Markup {
        let site = &self.config.site;
        let full_title = match title {
            Some(title) => format!("{title} · {}", site.title),
            None => site.title.clone(),
        };
        html! {
            (DOCTYPE)
            html lang=(site.language) {
                head {
                    meta charset="UTF-8";
                    meta name="viewport" content="width=device-width, initial-scale=1.0";
                    title { (full_title) }
                    @if !site.description.is_empty() {
                        meta name="description" content=(site.description);
                    }
                    link rel="alternate" type="application/rss+xml" title=(site.title) href="/feed.xml";
                    style { (PreEscaped(&self.css)) }
                }
                body class=(body_class) {
                    (self.site_header(section))
                    main { (content) }
                    footer.site-footer {
                        @if !site.author.is_empty() {
                            "© " (site.author)
                        }
                    }
                }
            }
        }
    }

    fn site_header(&self, current: Section) -> Markup {
        let links = [
            (Section::Posts, "/posts/", "Posts"),
            (Section::Photos, "/photos/", "Photos"),
        ];
        html! {
            header.site-header {
                a.site-title href="/" { (self.config.site.title) }
                nav.site-nav {
                    ul {
                        @for (section, href, label) in links {
                            li class=[(section == current).then_some("current")] {
                                a href=(href) { (label) }
                            }
                        }
                        li { a href="/feed.xml" { "Feed" } }
                    }
                }
            }
        }
    }

    /// `<picture>` for an item's `image`, if it has one.
    fn picture(&self, item: &ContentItem) -> Result<Option<Markup>, RenderError> {
        let Some(src) = item.image.as_deref() else {
            return Ok(None);
        };
        let markup = shortcode::image(self.images, src, &item.title, &self.config.images.sizes)?;
        Ok(Some(markup))
    }

    // ========================================================================
    // Pages
    // ========================================================================

    fn home(&self, featured: Option<&ContentItem>) -> Result<Markup, RenderError> {
        let site = &self.config.site;
        let featured = featured.map(|photo| self.featured_photo(photo)).transpose()?;
        let recent = self.posts.iter().take(site.recent_posts);

        let content = html! {
            section.intro {
                h1 { (site.title) }
                @if !site.description.is_empty() {
                    p { (site.description) }
                }
            }
            @if let Some(featured) = featured {
                (featured)
            }
            @if !self.posts.is_empty() {
                section.recent {
                    h2 { "Recent posts" }
                    (post_list(recent))
                    p { a href="/posts/" { "All posts →" } }
                }
            }
        };
        Ok(self.base_document(None, Section::Home, "home", content))
    }

    fn featured_photo(&self, photo: &ContentItem) -> Result<Markup, RenderError> {
        let href = item_url("photos", &photo.slug);
        let picture = self.picture(photo)?;
        Ok(html! {
            figure.featured {
                @if let Some(picture) = picture {
                    a href=(href) { (picture) }
                }
                figcaption {
                    a href=(href) { (photo.title) }
                    " · "
                    (date_tag(photo))
                }
            }
        })
    }

    fn posts_list(&self) -> Markup {
        let content = html! {
            h1 { "Posts" }
            @if self.posts.is_empty() {
                p { "Nothing here yet." }
            } @else {
                (post_list(self.posts))
            }
        };
        self.base_document(Some("Posts"), Section::Posts, "posts", content)
    }

    fn post_page(&self, post: &ContentItem) -> Result<Markup, RenderError> {
        let cover = self.picture(post)?;
        let content = html! {
            article.post {
                h1 { (post.title) }
                (date_tag(post))
                (tag_list(&post.tags))
                @if let Some(cover) = cover {
                    div.cover { (cover) }
                }
                div.body { (PreEscaped(markdown_to_html(&post.body))) }
            }
        };
        Ok(self.base_document(Some(&post.title), Section::Posts, "post", content))
    }

    fn photos_grid(&self) -> Result<Markup, RenderError> {
        let tiles = self
            .photos
            .iter()
            .map(|photo| self.photo_tile(photo))
            .collect::<Result<Vec<_>, _>>()?;
        let content = html! {
            h1 { "Photos" }
            div.photo-grid {
                @for tile in tiles {
                    (tile)
                }
            }
        };
        Ok(self.base_document(Some("Photos"), Section::Photos, "photos", content))
    }

    fn photo_tile(&self, photo: &ContentItem) -> Result<Markup, RenderError> {
        let aspect = photo
            .image
            .as_deref()
            .and_then(|src| self.images.get(src))
            .map(|image| image.aspect)
            .unwrap_or_default();
        let picture = self.picture(photo)?;
        Ok(html! {
            a class={ "photo-tile " (aspect.as_str()) } href=(item_url("photos", &photo.slug)) {
                @if let Some(picture) = picture {
                    (picture)
                }
                span.tile-title { (photo.title) }
            }
        })
    }

    fn photo_page(&self, photo: &ContentItem) -> Result<Markup, RenderError> {
        let picture = self.picture(photo)?;
        let meta = [
            ("Location", photo.location.as_deref()),
            ("Camera", photo.camera.as_deref()),
            ("Lens", photo.lens.as_deref()),
            ("Settings", photo.settings.as_deref()),
        ];
        let content = html! {
            article.photo {
                @if let Some(picture) = picture {
                    figure { (picture) }
                }
                h1 { (photo.title) }
                dl.photo-meta {
                    dt { "Date" }
                    dd { (date_tag(photo)) }
                    @for (label, value) in meta {
                        @if let Some(value) = value {
                            dt { (label) }
                            dd { (value) }
                        }
                    }
                }
                (tag_list(&photo.tags))
                div.body { (PreEscaped(markdown_to_html(&photo.body))) }
            }
        };
        Ok(self.base_document(Some(&photo.title), Section::Photos, "photo", content))
    }

    fn tag_page(&self, group: &TagGroup) -> Markup {
        let title = format!("Tagged “{}”", group.name);
        let content = html! {
            h1 { (title) }
            @if !group.posts.is_empty() {
                section {
                    h2 { "Posts" }
                    (post_list(group.posts.iter().copied()))
                }
            }
            @if !group.photos.is_empty() {
                section {
                    h2 { "Photos" }
                    ul.post-list {
                        @for photo in &group.photos {
                            li {
                                (date_tag(photo))
                                a href=(item_url("photos", &photo.slug)) { (photo.title) }
                            }
                        }
                    }
                }
            }
        };
        self.base_document(Some(&title), Section::Tags, "tag", content)
    }
}

// ============================================================================
// Components
// ============================================================================

fn post_list<'i>(items: impl IntoIterator<Item = &'i ContentItem>) -> Markup {
    html! {
        ul.post-list {
            @for item in items {
                li {
                    (date_tag(item))
                    a href=(item_url("posts", &item.slug)) { (item.title) }
                }
            }
        }
    }
}

fn date_tag(item: &ContentItem) -> Markup {
    html! {
        time datetime=(item.date.to_rfc3339()) { (format_date(&item.date)) }
    }
}

fn tag_list(tags: &BTreeSet<String>) -> Markup {
    html! {
        @if !tags.is_empty() {
            ul.tags {
                @for tag in tags {
                    li { a href=(tag_url(tag)) { (tag) } }
                }
            }
        }
    }
}

fn item_url(section: &str, slug: &str) -> String {
    format!("/{section}/{slug}/")
}

fn tag_url(tag: &str) -> String {
    item_url("tags", &slugify(tag))
}

fn page_path(section: &str, slug: &str) -> PathBuf {
    PathBuf::from(section).join(slug).join("index.html")
}

/// Markdown to HTML with tables, footnotes and strikethrough enabled.
pub fn markdown_to_html(source: &str) -> String {
    let options = Options::ENABLE_TABLES | Options::ENABLE_FOOTNOTES | Options::ENABLE_STRIKETHROUGH;
    let mut out = String::with_capacity(source.len() * 3 / 2);
    md_html::push_html(&mut out, Parser::new_ext(source, options));
    out
}

/// Fail if two items of one collection would write the same page.
pub fn check_unique_slugs(collection: &'static str, items: &Collection) -> Result<(), RenderError> {
    let Some(dup) = items.duplicate_slug() else {
        return Ok(());
    };
    let first = items
        .iter()
        .find(|item| item.slug == dup.slug)
        .map(|item| item.source_path.clone())
        .unwrap_or_default();
    Err(RenderError::DuplicateSlug {
        collection,
        slug: dup.slug.clone(),
        first,
        second: dup.source_path.clone(),
    })
}
