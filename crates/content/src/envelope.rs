//! Response envelopes of the content API.
//!
//! Every collection response looks like `{ "data": [{ "id": 1, "attributes": {..} }] }`,
//! and populated relations nest the same shape: `{ "data": {..} | [..] | null }`.

use anyhow::{Result, anyhow};
use og_card_core::{
    models::{Author, Comment, Post},
    util::UrlExt,
};
use serde::Deserialize;
use url::Url;

#[derive(Debug, Deserialize)]
pub struct Envelope<T> {
    #[serde(default = "Option::default")]
    pub data: Option<Vec<Entity<T>>>,
}

impl<T> Envelope<T> {
    /// A missing or null `data` is treated as an empty collection.
    pub fn into_entities(self) -> Vec<Entity<T>> { self.data.unwrap_or_default() }
}

#[derive(Debug, Deserialize)]
pub struct Entity<T> {
    #[serde(default)]
    pub id: Option<EntityId>,
    pub attributes: T,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum EntityId {
    Number(u64),
    String(String),
}

impl std::fmt::Display for EntityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Number(id) => write!(f, "{id}"),
            Self::String(id) => f.write_str(id),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct Relation<T> {
    #[serde(default = "Option::default")]
    pub data: Option<T>,
}

impl<T> Default for Relation<T> {
    fn default() -> Self { Self { data: None } }
}

#[derive(Debug, Deserialize)]
pub struct Labeled {
    pub label: String,
}

#[derive(Debug, Deserialize)]
pub struct Media {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub formats: Option<MediaFormats>,
}

#[derive(Debug, Deserialize)]
pub struct MediaFormats {
    #[serde(default)]
    pub small: Option<MediaFormat>,
}

#[derive(Debug, Deserialize)]
pub struct MediaFormat {
    pub url: String,
}

#[derive(Debug, Deserialize)]
pub struct PostAttributes {
    pub title: String,
    #[serde(default)]
    pub excerpt: Option<String>,
    pub date: String,
    #[serde(default)]
    pub post_category: Relation<Entity<Labeled>>,
    #[serde(default)]
    pub post_tags: Relation<Vec<Entity<Labeled>>>,
    #[serde(default)]
    pub authors: Relation<Vec<Entity<AuthorAttributes>>>,
}

#[derive(Debug, Deserialize)]
pub struct AuthorAttributes {
    #[serde(default)]
    pub avatar: Relation<Entity<Media>>,
}

#[derive(Debug, Deserialize)]
pub struct QuestionAttributes {
    #[serde(default)]
    pub profile: Relation<Entity<ProfileAttributes>>,
}

#[derive(Debug, Deserialize)]
pub struct ProfileAttributes {
    #[serde(default)]
    pub avatar: Relation<Entity<Media>>,
    #[serde(default, rename = "gravatarURL")]
    pub gravatar_url: Option<String>,
}

fn resolve_url(base: &Url, url: Option<String>) -> Result<Option<String>> {
    match url {
        Some(url) if !url.is_empty() => Ok(Some(base.resolve(&url)?.into())),
        _ => Ok(None),
    }
}

impl PostAttributes {
    pub fn into_post(self, base: &Url) -> Result<Post> {
        let category = self
            .post_category
            .data
            .map(|c| c.attributes.label)
            .ok_or_else(|| anyhow!("Post {:?} has no category", self.title))?;
        let tag = self
            .post_tags
            .data
            .and_then(|tags| tags.into_iter().next())
            .map(|tag| tag.attributes.label);
        let authors = self
            .authors
            .data
            .unwrap_or_default()
            .into_iter()
            .map(|author| {
                let avatar_url = author.attributes.avatar.data.and_then(|m| m.attributes.url);
                Ok(Author {
                    id: author.id.map(|id| id.to_string()).unwrap_or_default(),
                    avatar_url: resolve_url(base, avatar_url)?,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Post {
            title: self.title,
            excerpt: self.excerpt.unwrap_or_default(),
            date: self.date,
            category,
            tag,
            authors,
        })
    }
}

impl QuestionAttributes {
    pub fn into_comment(self, base: &Url) -> Result<Comment> {
        let Some(profile) = self.profile.data else {
            return Ok(Comment::default());
        };
        let profile = profile.attributes;
        let avatar_url = profile
            .avatar
            .data
            .and_then(|m| m.attributes.formats)
            .and_then(|f| f.small)
            .map(|s| s.url);
        Ok(Comment {
            avatar_url: resolve_url(base, avatar_url)?,
            gravatar_url: profile.gravatar_url.filter(|url| !url.is_empty()),
        })
    }
}
