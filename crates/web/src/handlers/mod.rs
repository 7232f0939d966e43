use axum::{Router, routing::get};

use crate::AppState;

mod card;

pub fn build_router() -> Router<AppState> {
    Router::new().route("/post", get(card::get_post_card))
}
