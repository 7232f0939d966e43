use anyhow::Result;
use og_card_core::{
    models::{AvatarSource, Comment, Post},
    util::format_post_date,
};

/// Declarative description of a post card, independent of how it is drawn.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct CardLayout {
    pub category: String,
    /// Shown after a separator, only when the post has a tag.
    pub tag: Option<String>,
    /// Already formatted as `MMM D, YYYY`.
    pub date: String,
    pub title: String,
    pub excerpt: String,
    /// The lead author's avatar. No placeholder is drawn when it is missing.
    pub lead_avatar: Option<String>,
    /// One slot per comment, in upstream order.
    pub comment_avatars: Vec<AvatarSource>,
}

impl CardLayout {
    pub fn build(post: &Post, comments: &[Comment]) -> Result<Self> {
        Ok(Self {
            category: post.category.clone(),
            tag: post.tag.clone().filter(|tag| !tag.is_empty()),
            date: format_post_date(&post.date)?,
            title: post.title.clone(),
            excerpt: post.excerpt.clone(),
            lead_avatar: post
                .lead_author()
                .and_then(|author| author.avatar_url.clone())
                .filter(|url| !url.is_empty()),
            comment_avatars: comments.iter().map(Comment::avatar).collect(),
        })
    }

    pub fn comment_count(&self) -> usize { self.comment_avatars.len() }

    pub fn has_comments(&self) -> bool { !self.comment_avatars.is_empty() }

    pub fn comment_label(&self) -> Option<String> {
        self.has_comments().then(|| format!("{} comments", self.comment_count()))
    }

    /// Every remote image the card embeds.
    pub fn image_urls(&self) -> impl Iterator<Item = &str> {
        self.lead_avatar
            .as_deref()
            .into_iter()
            .chain(self.comment_avatars.iter().filter_map(AvatarSource::url))
    }
}

#[cfg(test)]
mod tests {
    use og_card_core::models::Author;

    use super::*;

    fn post() -> Post {
        Post {
            title: "Shipping a Rust service".to_string(),
            excerpt: "What we learned.".to_string(),
            date: "2023-05-04T12:00:00.000Z".to_string(),
            category: "Engineering".to_string(),
            tag: None,
            authors: vec![Author {
                id: "1".to_string(),
                avatar_url: Some("https://cdn.example.com/jane.png".to_string()),
            }],
        }
    }

    #[test]
    fn test_build_without_tag_or_comments() {
        let layout = CardLayout::build(&post(), &[]).unwrap();
        assert_eq!(layout.tag, None);
        assert_eq!(layout.date, "May 4, 2023");
        assert!(!layout.has_comments());
        assert_eq!(layout.comment_label(), None);
        assert_eq!(layout.image_urls().collect::<Vec<_>>(), ["https://cdn.example.com/jane.png"]);
    }

    #[test]
    fn test_build_with_comments() {
        let mut post = post();
        post.tag = Some("Rust".to_string());
        let comments = [
            Comment { avatar_url: Some("https://a/1.png".to_string()), gravatar_url: None },
            Comment { avatar_url: None, gravatar_url: Some("https://g/2".to_string()) },
            Comment::default(),
        ];
        let layout = CardLayout::build(&post, &comments).unwrap();
        assert_eq!(layout.tag.as_deref(), Some("Rust"));
        assert_eq!(layout.comment_count(), 3);
        assert_eq!(layout.comment_label().as_deref(), Some("3 comments"));
        assert_eq!(layout.comment_avatars[2], AvatarSource::Placeholder);
        assert_eq!(
            layout.image_urls().collect::<Vec<_>>(),
            ["https://cdn.example.com/jane.png", "https://a/1.png", "https://g/2"]
        );
    }

    #[test]
    fn test_build_lead_author_without_avatar() {
        let mut post = post();
        post.authors[0].avatar_url = None;
        post.authors.push(Author {
            id: "2".to_string(),
            avatar_url: Some("https://cdn.example.com/second.png".to_string()),
        });
        let layout = CardLayout::build(&post, &[Comment::default()]).unwrap();
        assert_eq!(layout.lead_avatar, None);
        assert_eq!(layout.image_urls().count(), 0);
    }

    #[test]
    fn test_build_no_authors() {
        let mut post = post();
        post.authors.clear();
        assert_eq!(CardLayout::build(&post, &[]).unwrap().lead_avatar, None);
    }

    #[test]
    fn test_build_invalid_date() {
        let mut post = post();
        post.date = "not a date".to_string();
        assert!(CardLayout::build(&post, &[]).is_err());
    }
}
