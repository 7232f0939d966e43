pub mod envelope;
pub mod query;

use std::{collections::HashMap, path::PathBuf};

use anyhow::{Context, Result, anyhow};
use bytes::Bytes;
use futures_util::future::try_join_all;
use og_card_core::{
    config::{AssetsConfig, ContentConfig, FontConfig},
    models::{Comment, ImageData, Post},
    util::UrlExt,
};
use reqwest::header::{self, HeaderMap, HeaderValue};
use serde::de::DeserializeOwned;
use url::Url;

use crate::envelope::{Envelope, PostAttributes, QuestionAttributes};

/// Client for the posts and questions APIs, plus the static assets a card needs.
#[derive(Clone)]
pub struct Content {
    pub client: reqwest::Client,
    pub base_url: Url,
    pub header_path: PathBuf,
    pub font: FontConfig,
}

impl Content {
    pub fn new(content: &ContentConfig, assets: &AssetsConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self {
            client,
            base_url: content.url.clone(),
            header_path: assets.header_path.clone(),
            font: assets.font.clone(),
        })
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str, query: &str) -> Result<Envelope<T>> {
        let mut url = self.base_url.with_path(path);
        url.set_query(Some(query));
        tracing::debug!("Fetching {}", url);
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .with_context(|| format!("Request to {url} failed"))?
            .error_for_status()?;
        response.json().await.with_context(|| format!("Malformed response from {url}"))
    }

    /// Fetch the post with the given slug, including its tags, category and author avatars.
    pub async fn fetch_post(&self, slug: &str) -> Result<Option<Post>> {
        let envelope: Envelope<PostAttributes> =
            self.get_json("/api/posts", &query::post_query(slug)).await?;
        let Some(entity) = envelope.into_entities().into_iter().next() else {
            return Ok(None);
        };
        entity.attributes.into_post(&self.base_url).map(Some)
    }

    /// Fetch the questions attached to the given slug.
    pub async fn fetch_comments(&self, slug: &str) -> Result<Vec<Comment>> {
        let envelope: Envelope<QuestionAttributes> =
            self.get_json("/api/questions", &query::question_query(slug)).await?;
        envelope
            .into_entities()
            .into_iter()
            .map(|entity| entity.attributes.into_comment(&self.base_url))
            .collect()
    }

    pub async fn load_header(&self) -> Result<ImageData> {
        let data = tokio::fs::read(&self.header_path)
            .await
            .with_context(|| format!("Failed to read {}", self.header_path.display()))?;
        let format = image::guess_format(&data).context("Unrecognized header image format")?;
        Ok(ImageData { mime: format.to_mime_type().to_string(), data: data.into() })
    }

    pub async fn fetch_font(&self) -> Result<Bytes> {
        let mut headers = HeaderMap::new();
        if let Some(origin) = &self.font.origin {
            headers.insert(header::ORIGIN, HeaderValue::from_str(origin)?);
        }
        if let Some(referer) = &self.font.referer {
            headers.insert(header::REFERER, HeaderValue::from_str(referer)?);
        }
        let response = self
            .client
            .get(self.font.url.clone())
            .headers(headers)
            .send()
            .await
            .with_context(|| format!("Request to {} failed", self.font.url))?
            .error_for_status()?;
        Ok(response.bytes().await?)
    }

    pub async fn fetch_image(&self, url: &str) -> Result<ImageData> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .with_context(|| format!("Request to {url} failed"))?
            .error_for_status()?;
        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(';').next())
            .map(|v| v.trim().to_ascii_lowercase())
            .filter(|v| v.starts_with("image/"));
        let data = response.bytes().await?;
        let mime = match content_type {
            Some(mime) => mime,
            None => image::guess_format(&data)
                .map(|format| format.to_mime_type().to_string())
                .map_err(|_| anyhow!("Unrecognized image format at {url}"))?,
        };
        Ok(ImageData { mime, data })
    }

    /// Fetch every distinct URL concurrently. Any single failure fails the batch.
    pub async fn fetch_images<'a>(
        &self,
        urls: impl IntoIterator<Item = &'a str>,
    ) -> Result<HashMap<String, ImageData>> {
        let mut unique = urls.into_iter().collect::<Vec<_>>();
        unique.sort_unstable();
        unique.dedup();
        let images = try_join_all(unique.iter().map(|url| self.fetch_image(url))).await?;
        Ok(unique.into_iter().map(str::to_string).zip(images).collect())
    }
}
