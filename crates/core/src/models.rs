use bytes::Bytes;

use crate::util::first_present;

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Post {
    pub title: String,
    pub excerpt: String,
    /// ISO 8601 date or timestamp, as stored upstream.
    pub date: String,
    pub category: String,
    pub tag: Option<String>,
    pub authors: Vec<Author>,
}

impl Post {
    /// Only the first author is shown on the card.
    pub fn lead_author(&self) -> Option<&Author> { self.authors.first() }
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Author {
    pub id: String,
    pub avatar_url: Option<String>,
}

#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct Comment {
    /// Small format of the commenter's uploaded avatar.
    pub avatar_url: Option<String>,
    pub gravatar_url: Option<String>,
}

impl Comment {
    pub fn avatar(&self) -> AvatarSource {
        match first_present([self.avatar_url.as_deref(), self.gravatar_url.as_deref()]) {
            Some(url) => AvatarSource::Image(url.to_string()),
            None => AvatarSource::Placeholder,
        }
    }
}

#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub enum AvatarSource {
    Image(String),
    Placeholder,
}

impl AvatarSource {
    pub fn url(&self) -> Option<&str> {
        match self {
            Self::Image(url) => Some(url),
            Self::Placeholder => None,
        }
    }
}

/// Raw image bytes and their media type, as fetched.
#[derive(Debug, Clone)]
pub struct ImageData {
    pub mime: String,
    pub data: Bytes,
}
