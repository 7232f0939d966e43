use std::collections::HashMap;

use anyhow::{Result, anyhow};
use base64::{Engine, engine::general_purpose::STANDARD};
use maud::{Markup, PreEscaped, html};
use og_card_core::models::{AvatarSource, ImageData};

use crate::{
    layout::CardLayout,
    text::{TextMeasure, truncate, wrap},
};

pub const WIDTH: u32 = 1200;
pub const HEIGHT: u32 = 630;

const BACKGROUND: &str = "#EEEFE9";
const BORDER: &str = "#D0D1C9";

const META_PADDING: f32 = 32.0;
const META_SIZE: f32 = 30.0;
const META_LINE: f32 = 36.0;
const META_GAP: f32 = 16.0;

const CONTENT_MARGIN_TOP: f32 = 32.0;
const CONTENT_PADDING_X: f32 = 48.0;
const AVATAR_SIZE: f32 = 70.0;
const AVATAR_GAP: f32 = 32.0;
const TEXT_X: f32 = CONTENT_PADDING_X + AVATAR_SIZE + AVATAR_GAP;
const TEXT_WIDTH: f32 = 980.0;

const TITLE_SIZE: f32 = 48.0;
const TITLE_LINE: f32 = TITLE_SIZE * 1.4;
const EXCERPT_GAP: f32 = 12.0;
const EXCERPT_SIZE: f32 = 36.0;
const EXCERPT_LINE: f32 = EXCERPT_SIZE * 1.5;
const EXCERPT_MAX_HEIGHT: f32 = 250.0;

const COMMENT_AVATAR_SIZE: f32 = 50.0;
const COMMENT_AVATAR_OVERLAP: f32 = 16.0;
const COMMENT_LABEL_GAP: f32 = 32.0;
const COMMENT_LABEL_SIZE: f32 = 24.0;

const CONNECTOR_RADIUS: f32 = 6.0;

/// Inputs that the layout refers to by URL, resolved to bytes.
pub struct CardImages<'a> {
    pub header: &'a ImageData,
    pub header_size: (u32, u32),
    pub avatars: &'a HashMap<String, ImageData>,
}

fn data_uri(image: &ImageData) -> String {
    format!("data:{};base64,{}", image.mime, STANDARD.encode(&image.data))
}

/// Baseline for a single line of text vertically centered in its line box.
fn baseline(top: f32, size: f32, line: f32) -> f32 { top + (line - size) / 2.0 + size * 0.8 }

fn avatar(images: &CardImages, url: &str) -> Result<String> {
    images
        .avatars
        .get(url)
        .map(data_uri)
        .ok_or_else(|| anyhow!("Avatar {url} was not fetched"))
}

fn circle_image(id: &str, href: &str, x: f32, y: f32, size: f32) -> Markup {
    let r = size / 2.0;
    html! {
        clipPath id=(id) {
            circle cx=(x + r) cy=(y + r) r=(r) {}
        }
        image href=(href) x=(x) y=(y) width=(size) height=(size)
            preserveAspectRatio="xMidYMid slice" clip-path=(format!("url(#{id})")) {}
    }
}

/// Generic person icon used for commenters without any avatar.
fn placeholder(id: &str, x: f32, y: f32) -> Markup {
    html! {
        svg x=(x) y=(y) width="50" height="50" viewBox="0 0 50 50" fill="none" {
            defs {
                clipPath id=(id) {
                    rect width="50" height="50" rx="25" fill="white" {}
                }
            }
            g clip-path=(format!("url(#{id})")) {
                path d="M0 25C0 11.1929 11.1929 0 25 0C38.8071 0 50 11.1929 50 25C50 38.8071 38.8071 50 25 50C11.1929 50 0 38.8071 0 25Z" fill="#E5E7E0" {}
                path fill-rule="evenodd" clip-rule="evenodd" fill="white"
                    d="M26.4875 8.21248C19.7575 7.34248 14.065 13.075 14.075 21.1412C14.0913 21.2662 14.1075 21.4275 14.1275 21.6137C14.1838 22.1675 14.265 22.9475 14.455 23.7012C15.5588 28.0075 17.9313 31.2975 22.3363 32.6162C26.2325 33.7887 29.6613 32.6662 32.5113 29.8137C36.2713 26.0437 37.2675 19.765 34.875 14.755C33.175 11.2 30.52 8.72998 26.4875 8.21248ZM3.12503 50C2.32503 47.685 4.52378 41.9325 6.80878 40.4875C9.90878 38.5337 13.1538 36.81 16.3975 35.0875C16.9975 34.7687 17.5975 34.45 18.195 34.13C18.5863 33.925 19.3188 34.14 19.8075 34.365C23.3413 35.9175 26.8375 35.9275 30.3925 34.4025C31.0075 34.14 31.945 34.1012 32.5113 34.3837C35.8713 36.0925 39.2013 37.8512 42.4625 39.735C45.4025 41.435 47.9 47.305 46.875 50H3.12503Z" {}
            }
        }
    }
}

pub fn render_svg(
    layout: &CardLayout,
    images: &CardImages,
    family: &str,
    metrics: &impl TextMeasure,
) -> Result<String> {
    let (header_w, header_h) = images.header_size;
    let header_scale = if header_w > WIDTH { WIDTH as f32 / header_w as f32 } else { 1.0 };
    let header_w = header_w as f32 * header_scale;
    let header_h = header_h as f32 * header_scale;

    // Meta row
    let meta_top = header_h + META_PADDING;
    let meta_baseline = baseline(meta_top, META_SIZE, META_LINE);
    let separator_x = META_PADDING + metrics.advance(&layout.category, META_SIZE) + META_GAP;
    let tag_x = separator_x + metrics.advance("/", META_SIZE) + META_GAP;
    let border_y = meta_top + META_LINE + META_PADDING + 0.5;

    // Content row
    let content_top = border_y + 0.5 + CONTENT_MARGIN_TOP;
    let title = truncate(&layout.title, TEXT_WIDTH, TITLE_SIZE, metrics);
    let excerpt_top = content_top + TITLE_LINE + EXCERPT_GAP;
    let excerpt_lines = wrap(&layout.excerpt, TEXT_WIDTH, EXCERPT_SIZE, metrics)
        .into_iter()
        .enumerate()
        .take_while(|(i, _)| (*i as f32) * EXCERPT_LINE < EXCERPT_MAX_HEIGHT)
        .map(|(_, line)| line)
        .collect::<Vec<_>>();
    let excerpt_height = (excerpt_lines.len() as f32 * EXCERPT_LINE).min(EXCERPT_MAX_HEIGHT);

    // The comment strip is shifted down by half its height, centering it on the
    // bottom edge of the connector.
    let comments_top = excerpt_top + excerpt_height + COMMENT_AVATAR_SIZE / 2.0;
    let connector_x = CONTENT_PADDING_X + AVATAR_SIZE / 2.0;
    let connector_top = content_top + AVATAR_SIZE - 5.0;
    let connector_bottom = comments_top + COMMENT_AVATAR_SIZE / 2.0;
    let connector = format!(
        "M{x} {top}V{v}Q{x} {bottom} {qx} {bottom}H{end}",
        x = connector_x,
        top = connector_top,
        v = connector_bottom - CONNECTOR_RADIUS,
        bottom = connector_bottom,
        qx = connector_x + CONNECTOR_RADIUS,
        end = connector_x + AVATAR_SIZE,
    );
    let comment_step = COMMENT_AVATAR_SIZE - COMMENT_AVATAR_OVERLAP;
    let label_x = TEXT_X + layout.comment_count() as f32 * comment_step + COMMENT_LABEL_GAP;
    let label_baseline = baseline(comments_top, COMMENT_LABEL_SIZE, COMMENT_AVATAR_SIZE);

    let lead_avatar = layout.lead_avatar.as_deref().map(|url| avatar(images, url)).transpose()?;
    let comment_avatars = layout
        .comment_avatars
        .iter()
        .map(|source| match source {
            AvatarSource::Image(url) => avatar(images, url).map(Some),
            AvatarSource::Placeholder => Ok(None),
        })
        .collect::<Result<Vec<_>>>()?;

    let markup = html! {
        (PreEscaped("<?xml version=\"1.0\" encoding=\"utf-8\"?>"))
        svg xmlns="http://www.w3.org/2000/svg" version="1.1"
            viewBox=(format!("0 0 {WIDTH} {HEIGHT}")) width=(WIDTH) height=(HEIGHT)
            font-family=(family) fill="black" {
            rect width=(WIDTH) height=(HEIGHT) fill=(BACKGROUND) {}
            image href=(data_uri(images.header)) x="0" y="0" width=(header_w) height=(header_h)
                preserveAspectRatio="none" {}

            text.category x=(META_PADDING) y=(meta_baseline) font-size=(META_SIZE) { (layout.category) }
            text.separator x=(separator_x) y=(meta_baseline) font-size=(META_SIZE) opacity="0.5" { "/" }
            @if let Some(tag) = &layout.tag {
                text.tag x=(tag_x) y=(meta_baseline) font-size=(META_SIZE) opacity="0.8" { (tag) }
            }
            text.date x=(WIDTH as f32 - META_PADDING) y=(meta_baseline) font-size=(META_SIZE)
                opacity="0.8" text-anchor="end" { (layout.date) }
            line x1="0" y1=(border_y) x2=(WIDTH) y2=(border_y) stroke=(BORDER) stroke-width="1" {}

            @if layout.has_comments() {
                path.connector d=(connector) fill="none" stroke=(BORDER) stroke-width="1" {}
            }
            @if let Some(href) = &lead_avatar {
                g.author {
                    (circle_image("author-avatar", href, CONTENT_PADDING_X, content_top, AVATAR_SIZE))
                    circle cx=(CONTENT_PADDING_X + AVATAR_SIZE / 2.0) cy=(content_top + AVATAR_SIZE / 2.0)
                        r=(AVATAR_SIZE / 2.0 - 0.5) fill="none" stroke=(BORDER) stroke-width="1" {}
                }
            }

            text.title x=(TEXT_X) y=(baseline(content_top, TITLE_SIZE, TITLE_LINE)) font-size=(TITLE_SIZE) {
                (&*title)
            }
            clipPath id="excerpt-clip" {
                rect x=(TEXT_X) y=(excerpt_top) width=(TEXT_WIDTH) height=(EXCERPT_MAX_HEIGHT) {}
            }
            g.excerpt clip-path="url(#excerpt-clip)" opacity="0.7" font-size=(EXCERPT_SIZE) {
                @for (i, line) in excerpt_lines.iter().enumerate() {
                    text x=(TEXT_X) y=(baseline(excerpt_top + i as f32 * EXCERPT_LINE, EXCERPT_SIZE, EXCERPT_LINE)) {
                        (line)
                    }
                }
            }

            @if let Some(label) = layout.comment_label() {
                g.comments {
                    @for (i, href) in comment_avatars.iter().enumerate() {
                        @let x = TEXT_X + i as f32 * comment_step;
                        @match href {
                            Some(href) => {
                                (circle_image(&format!("comment-avatar-{i}"), href, x, comments_top, COMMENT_AVATAR_SIZE))
                            }
                            None => {
                                (placeholder(&format!("comment-placeholder-{i}"), x, comments_top))
                            }
                        }
                    }
                    text.count x=(label_x) y=(label_baseline) font-size=(COMMENT_LABEL_SIZE) opacity="0.7" {
                        (label)
                    }
                }
            }
        }
    };
    Ok(markup.into_string())
}
