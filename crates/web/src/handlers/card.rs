use std::time::Instant;

use axum::{
    extract::{RawQuery, State},
    http::header,
    response::{IntoResponse, Response},
};
use og_card_core::CardError;
use og_card_images::{CardAssets, layout::CardLayout};
use url::form_urlencoded;

use crate::AppState;

/// First `slug` parameter of the query string, if any.
fn slug_param(query: &str) -> Option<String> {
    form_urlencoded::parse(query.as_bytes())
        .find(|(key, _)| key == "slug")
        .map(|(_, value)| value.into_owned())
}

pub async fn get_post_card(
    RawQuery(query): RawQuery,
    State(state): State<AppState>,
) -> Result<Response, CardError> {
    // Absent slugs are passed along as-is and simply match nothing upstream.
    let slug = query.as_deref().and_then(slug_param).unwrap_or_default();
    let start = Instant::now();
    let data = generate(&state, &slug).await?;
    tracing::info!("Generated card for {:?} in {:?}", slug, start.elapsed());
    Ok(([(header::CONTENT_TYPE, mime::IMAGE_PNG.as_ref())], data).into_response())
}

async fn generate(state: &AppState, slug: &str) -> Result<Vec<u8>, CardError> {
    let content = &state.content;
    let (post, comments, header, font) = tokio::try_join!(
        content.fetch_post(slug),
        content.fetch_comments(slug),
        content.load_header(),
        content.fetch_font(),
    )
    .map_err(CardError::Upstream)?;
    let post = post.ok_or_else(|| CardError::NotFound(slug.to_string()))?;

    let layout = CardLayout::build(&post, &comments).map_err(CardError::Render)?;
    let avatars = content.fetch_images(layout.image_urls()).await.map_err(CardError::Upstream)?;
    let family = content.font.family.clone();
    let assets = CardAssets { header, font, family, avatars };

    let renderer = state.renderer.clone();
    tokio::task::spawn_blocking(move || renderer.render(&layout, &assets))
        .await
        .map_err(|e| CardError::Render(e.into()))?
        .map_err(CardError::Render)
}
