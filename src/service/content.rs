//! Content policy
//!
//! Applies the ActivityPub options to a post: which object type it is
//! published as, how its body is built, which hashtags become native
//! tags, and which HTML survives.

use std::collections::{BTreeSet, HashSet};

use serde::{Deserialize, Serialize};

use super::SettingsService;
use crate::error::AppError;
use crate::settings::{OptionValue, option_names};

const EXCERPT_WORDS: usize = 55;
const TITLE_TEMPLATE: &str = "<p><strong>%title%</strong></p>\n\n<p>%link%</p>";
const EXCERPT_TEMPLATE: &str = "%excerpt%\n\n<p>%link%</p>";

/// How much of a post goes into the activity body
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentType {
    /// Title and link only
    Title,
    /// Excerpt and link
    Excerpt,
    /// Full content through the custom template
    Content,
}

/// Configured ActivityStreams object type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectType {
    Note,
    Article,
    /// Derived from the post format of each post
    PostFormat,
}

/// A post handed over by the host for publishing
#[derive(Debug, Clone, Deserialize)]
pub struct PostContent {
    pub title: String,
    #[serde(default)]
    pub excerpt: Option<String>,
    pub content: String,
    pub permalink: String,
    #[serde(default)]
    pub shortlink: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default = "default_post_type")]
    pub post_type: String,
    #[serde(default)]
    pub post_format: Option<String>,
}

fn default_post_type() -> String {
    "post".to_string()
}

/// Publishable object produced from a post
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderedObject {
    #[serde(rename = "type")]
    pub object_type: String,
    pub content: String,
    pub tags: Vec<String>,
}

/// Snapshot of the publishing options
#[derive(Debug, Clone)]
pub struct ContentPolicy {
    pub content_type: ContentType,
    pub custom_template: String,
    pub object_type: ObjectType,
    pub use_hashtags: bool,
    pub add_tags_as_hashtags: bool,
    pub use_shortlink: bool,
    pub support_post_types: Vec<String>,
    pub allowed_tags: BTreeSet<String>,
    site_url: String,
}

impl ContentPolicy {
    /// Read the current option values
    pub async fn load(settings: &SettingsService, site_url: &str) -> Result<Self, AppError> {
        let text = |value: OptionValue| value.as_str().unwrap_or_default().to_string();
        let flag = |value: OptionValue| value.as_bool().unwrap_or(false);

        let content_type = match text(settings.read_option(option_names::POST_CONTENT_TYPE).await?)
            .as_str()
        {
            "title" => ContentType::Title,
            "excerpt" => ContentType::Excerpt,
            _ => ContentType::Content,
        };
        let object_type = match text(settings.read_option(option_names::OBJECT_TYPE).await?)
            .as_str()
        {
            "article" => ObjectType::Article,
            "wordpress-post-format" => ObjectType::PostFormat,
            _ => ObjectType::Note,
        };
        let support_post_types = settings
            .read_option(option_names::SUPPORT_POST_TYPES)
            .await?
            .as_array()
            .map(<[String]>::to_vec)
            .unwrap_or_default();

        Ok(Self {
            content_type,
            custom_template: text(settings.read_option(option_names::CUSTOM_POST_CONTENT).await?),
            object_type,
            use_hashtags: flag(settings.read_option(option_names::USE_HASHTAGS).await?),
            add_tags_as_hashtags: flag(
                settings
                    .read_option(option_names::ADD_TAGS_AS_HASHTAGS)
                    .await?,
            ),
            use_shortlink: flag(settings.read_option(option_names::USE_SHORTLINK).await?),
            support_post_types,
            allowed_tags: parse_allowed_html(&text(
                settings.read_option(option_names::ALLOWED_HTML).await?,
            )),
            site_url: site_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn supports_post_type(&self, post_type: &str) -> bool {
        self.support_post_types.iter().any(|t| t == post_type)
    }

    /// ActivityStreams type for a post with the given format
    pub fn object_type_for(&self, post_format: Option<&str>) -> &'static str {
        match self.object_type {
            ObjectType::Note => "Note",
            ObjectType::Article => "Article",
            ObjectType::PostFormat => match post_format.unwrap_or("standard") {
                "aside" | "status" | "quote" | "note" | "link" => "Note",
                "gallery" | "image" => "Image",
                "video" => "Video",
                "audio" => "Audio",
                _ => "Article",
            },
        }
    }

    /// Build the publishable object for a post
    ///
    /// # Errors
    /// `Validation` if the post type is not enabled
    pub fn render(&self, post: &PostContent) -> Result<RenderedObject, AppError> {
        if !self.supports_post_type(&post.post_type) {
            return Err(AppError::Validation(format!(
                "post type {} is not enabled for ActivityPub",
                post.post_type
            )));
        }

        let mut tags: Vec<String> = Vec::new();

        let content = if self.use_hashtags {
            let (linked, found) = link_hashtags(&post.content, &self.site_url);
            push_unique_tags(&mut tags, found);
            linked
        } else {
            post.content.clone()
        };

        let hashtags = if self.add_tags_as_hashtags {
            push_unique_tags(&mut tags, post.tags.iter().map(|t| hashtag_name(t)));
            post.tags
                .iter()
                .map(|tag| self.hashtag_link(&hashtag_name(tag)))
                .collect::<Vec<_>>()
                .join(" ")
        } else {
            String::new()
        };

        let link = match (&post.shortlink, self.use_shortlink) {
            (Some(shortlink), true) => shortlink.as_str(),
            _ => post.permalink.as_str(),
        };

        let excerpt = match &post.excerpt {
            Some(excerpt) if !excerpt.trim().is_empty() => excerpt.clone(),
            _ => trim_excerpt(&post.content),
        };

        let template = match self.content_type {
            ContentType::Title => TITLE_TEMPLATE,
            ContentType::Excerpt => EXCERPT_TEMPLATE,
            ContentType::Content => self.custom_template.as_str(),
        };

        let title = html_escape::encode_text(&post.title);
        let body = fill_template(template, |placeholder| {
            let value = match placeholder {
                "title" => title.to_string(),
                "excerpt" => excerpt.clone(),
                "content" => content.clone(),
                "link" => anchor(link),
                "permalink" => anchor(&post.permalink),
                "shortlink" => anchor(post.shortlink.as_deref().unwrap_or(&post.permalink)),
                "hashtags" => hashtags.clone(),
                _ => return None,
            };
            Some(value)
        })
        .replace("<p></p>", "");

        Ok(RenderedObject {
            object_type: self.object_type_for(post.post_format.as_deref()).to_string(),
            content: self.sanitize(body.trim()),
            tags,
        })
    }

    /// Strip everything outside the allowed HTML list
    pub fn sanitize(&self, html: &str) -> String {
        let tags: HashSet<&str> = self.allowed_tags.iter().map(String::as_str).collect();
        let cleaned = ammonia::Builder::default()
            .tags(tags)
            .add_tag_attributes("a", &["class"])
            .clean(html)
            .to_string();
        cleaned
    }

    fn hashtag_link(&self, name: &str) -> String {
        format!(
            "<a href=\"{}/tag/{}\" class=\"hashtag\">#{}</a>",
            self.site_url,
            html_escape::encode_double_quoted_attribute(&name.to_lowercase()),
            html_escape::encode_text(name)
        )
    }
}

/// Parse an allow-list like `<strong><a><p>` into tag names
///
/// `script` and `style` are never allowed.
pub fn parse_allowed_html(list: &str) -> BTreeSet<String> {
    list.split(['<', '>', ',', ' '])
        .map(|name| name.trim().trim_start_matches('/').to_ascii_lowercase())
        .filter(|name| !name.is_empty() && name.chars().all(|c| c.is_ascii_alphanumeric()))
        .filter(|name| name != "script" && name != "style")
        .collect()
}

fn anchor(url: &str) -> String {
    format!(
        "<a href=\"{}\">{}</a>",
        html_escape::encode_double_quoted_attribute(url),
        html_escape::encode_text(url)
    )
}

fn hashtag_name(tag: &str) -> String {
    tag.chars().filter(|c| !c.is_whitespace()).collect()
}

fn push_unique_tags(tags: &mut Vec<String>, found: impl IntoIterator<Item = String>) {
    for tag in found {
        if !tag.is_empty() && !tags.iter().any(|t| t.eq_ignore_ascii_case(&tag)) {
            tags.push(tag);
        }
    }
}

fn trim_excerpt(content: &str) -> String {
    let text = ammonia::Builder::empty().clean(content).to_string();
    let words: Vec<&str> = text.split_whitespace().collect();
    if words.len() > EXCERPT_WORDS {
        format!("{} […]", words[..EXCERPT_WORDS].join(" "))
    } else {
        words.join(" ")
    }
}

/// Substitute `%name%` placeholders in a template
///
/// Only the template is scanned; inserted values are copied verbatim,
/// so placeholder text inside a post survives. Unknown placeholders and
/// stray `%` signs are kept as written.
fn fill_template(template: &str, lookup: impl Fn(&str) -> Option<String>) -> String {
    let mut output = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find('%') {
        output.push_str(&rest[..start]);
        let after = &rest[start + 1..];

        let Some(end) = after.find('%') else {
            output.push_str(&rest[start..]);
            return output;
        };

        let name = &after[..end];
        let value = if !name.is_empty() && name.chars().all(|c| c.is_ascii_lowercase()) {
            lookup(name)
        } else {
            None
        };

        match value {
            Some(value) => {
                output.push_str(&value);
                rest = &after[end + 1..];
            }
            None => {
                output.push('%');
                rest = after;
            }
        }
    }

    output.push_str(rest);
    output
}

/// Elements whose text is never scanned for hashtags
const NO_HASHTAG_ELEMENTS: [&str; 3] = ["a", "code", "pre"];

/// Replace `#tag` in text (outside markup) with tag links
///
/// A hashtag starts after whitespace, `>` or the beginning of the
/// content, and runs over alphanumerics and `_`. Text inside links,
/// `code` and `pre` is left alone.
fn link_hashtags(content: &str, site_url: &str) -> (String, Vec<String>) {
    let mut output = String::with_capacity(content.len());
    let mut found = Vec::new();
    let mut in_tag = false;
    let mut markup = String::new();
    let mut skip_depth = 0usize;
    let mut previous: Option<char> = None;
    let mut chars = content.char_indices().peekable();

    while let Some((start, c)) = chars.next() {
        match c {
            '<' => {
                in_tag = true;
                markup.clear();
            }
            '>' if in_tag => {
                in_tag = false;
                let (closing, name) = element_name(&markup);
                if NO_HASHTAG_ELEMENTS.contains(&name.as_str()) {
                    if closing {
                        skip_depth = skip_depth.saturating_sub(1);
                    } else if !markup.trim_end().ends_with('/') {
                        skip_depth += 1;
                    }
                }
            }
            '#' if !in_tag
                && skip_depth == 0
                && previous.is_none_or(|p| p.is_whitespace() || p == '>') =>
            {
                let mut end = start + c.len_utf8();
                while let Some(&(index, next)) = chars.peek() {
                    if next.is_alphanumeric() || next == '_' {
                        end = index + next.len_utf8();
                        chars.next();
                    } else {
                        break;
                    }
                }

                let name = &content[start + 1..end];
                if !name.is_empty() {
                    output.push_str(&format!(
                        "<a href=\"{}/tag/{}\" class=\"hashtag\">#{}</a>",
                        site_url,
                        name.to_lowercase(),
                        name
                    ));
                    found.push(name.to_string());
                    previous = name.chars().last();
                    continue;
                }
            }
            _ if in_tag => markup.push(c),
            _ => {}
        }
        output.push(c);
        previous = Some(c);
    }

    (output, found)
}

/// Element name of a tag body such as `a href="x"` or `/code`
fn element_name(markup: &str) -> (bool, String) {
    let markup = markup.trim_start();
    let (closing, body) = match markup.strip_prefix('/') {
        Some(body) => (true, body),
        None => (false, markup),
    };
    let name = body
        .chars()
        .take_while(|c| c.is_ascii_alphanumeric())
        .collect::<String>()
        .to_ascii_lowercase();
    (closing, name)
}
