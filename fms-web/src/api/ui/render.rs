//! HTML rendering of the controller state
//!
//! Pure functions of [`ControllerState`]; no business logic lives here.
//! Every string that came from the user or the model goes through
//! [`escape_html`].

use std::fmt::Write as _;

use crate::controller::{ControllerState, OverlayPhase, OverlayState, PrimaryPhase};
use crate::models::{AnalysisResult, FollowUpInfo, MatchResult};

/// Raster types offered by the file picker
pub const ACCEPTED_TYPES: &str = "image/png, image/jpeg, image/webp";

pub const LOADING_TEXT: &str = "Analyzing your spot...";
pub const INFO_LOADING_TEXT: &str = "Fetching more information...";

/// Escape text for use in element content and quoted attribute values
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Inner HTML of `<main id="view">`: primary phase plus the overlay
pub fn render_view(state: &ControllerState) -> String {
    let mut html = render_main(state);
    if state.overlay.is_open() {
        html.push_str(&render_overlay(&state.overlay));
    }
    html
}

/// Primary phase only
pub fn render_main(state: &ControllerState) -> String {
    match state.phase {
        PrimaryPhase::Idle => render_upload(false),
        PrimaryPhase::Loading => render_loading(),
        PrimaryPhase::Error => render_error(state.error.as_deref().unwrap_or_default()),
        PrimaryPhase::Results => match &state.result {
            Some(result) => render_results(state, result),
            // RESULTS always carries a result; fall back to the upload surface
            None => render_upload(false),
        },
    }
}

/// Upload surface: file picker plus drop zone
///
/// `disabled` is set while a request is in flight.
pub fn render_upload(disabled: bool) -> String {
    let disabled_attr = if disabled { " disabled" } else { "" };
    format!(
        r#"<section class="upload" id="drop-zone" data-disabled="{disabled}">
    <label class="upload-label" for="file-input">
        <span class="upload-title">Drop a photo here, or click to choose one</span>
        <span class="upload-hint">PNG, JPEG or WebP</span>
    </label>
    <input type="file" id="file-input" accept="{accept}"{disabled_attr}>
</section>
"#,
        disabled = disabled,
        accept = ACCEPTED_TYPES,
        disabled_attr = disabled_attr,
    )
}

pub fn render_loading() -> String {
    format!(
        r#"<section class="loading" aria-busy="true">
    <div class="spinner"></div>
    <p>{}</p>
</section>
"#,
        LOADING_TEXT
    )
}

/// Error message with a retry control that returns to the upload surface
pub fn render_error(message: &str) -> String {
    format!(
        r#"<section class="error" role="alert">
    <p class="error-message">{}</p>
    <button type="button" class="button" data-action="reset">Try Again</button>
</section>
"#,
        escape_html(message)
    )
}

/// Source image, AI summary and the ranked match cards
pub fn render_results(state: &ControllerState, result: &AnalysisResult) -> String {
    let image_src = match state.analysis_id {
        Some(id) => format!("/ui/image?v={}", id),
        None => "/ui/image".to_string(),
    };

    let mut cards = String::new();
    for (index, location) in result.matches.iter().enumerate() {
        cards.push_str(&render_match_card(index, location));
    }

    format!(
        r#"<section class="results">
    <div class="results-toolbar">
        <button type="button" class="button" data-action="reset">Analyze Another Spot</button>
    </div>
    <div class="results-overview">
        <figure class="source-image">
            <h2>Your Image</h2>
            <img src="{image_src}" alt="Uploaded photo">
        </figure>
        <div class="summary">
            <h2>AI Summary</h2>
            <p>{summary}</p>
        </div>
    </div>
    <ol class="matches">
{cards}    </ol>
</section>
"#,
        image_src = image_src,
        summary = escape_html(&result.summary),
        cards = cards,
    )
}

/// Confidence bar width in percent, clamped to 0..=100
pub fn confidence_bar_width(similarity_score: f64) -> f64 {
    let width = similarity_score * 100.0;
    if width.is_nan() {
        return 0.0;
    }
    width.clamp(0.0, 100.0)
}

/// One match card; index 0 carries the top-match badge regardless of score
pub fn render_match_card(index: usize, location: &MatchResult) -> String {
    let badge = if index == 0 {
        r#"<span class="badge top-match">Top Match</span>"#
    } else {
        ""
    };
    let class = if index == 0 { "match top" } else { "match" };

    format!(
        r#"        <li class="{class}" data-index="{index}">
            <img class="satellite" src="{image}" alt="Satellite view of {name}">
            <div class="match-body">
                <h3>{name}, {country} {badge}</h3>
                <p class="coords">{lat:.4}, {lon:.4}</p>
                <p class="description">{description}</p>
                <div class="confidence">
                    <span class="confidence-label">Confidence</span>
                    <span class="confidence-value">{percent:.1}%</span>
                    <div class="confidence-bar"><div class="confidence-fill" style="width: {width:.1}%"></div></div>
                </div>
                <button type="button" class="button secondary" data-action="more-info" data-index="{index}">Learn More</button>
            </div>
        </li>
"#,
        class = class,
        index = index,
        image = escape_html(&location.satellite_image_url),
        name = escape_html(&location.region_name),
        country = escape_html(&location.country),
        badge = badge,
        lat = location.latitude,
        lon = location.longitude,
        description = escape_html(&location.description),
        percent = location.similarity_score * 100.0,
        width = confidence_bar_width(location.similarity_score),
    )
}

/// Follow-up overlay: loading indicator, then text and citations
pub fn render_overlay(overlay: &OverlayState) -> String {
    let body = match (overlay.phase, &overlay.content) {
        (OverlayPhase::ShowingInfo, Some(info)) => render_follow_up(info),
        _ => format!(
            r#"<div class="loading" aria-busy="true"><div class="spinner"></div><p>{}</p></div>"#,
            INFO_LOADING_TEXT
        ),
    };

    format!(
        r#"<div class="overlay" role="dialog" aria-modal="true" aria-labelledby="overlay-title">
    <div class="overlay-panel">
        <header class="overlay-header">
            <h2 id="overlay-title">{title}</h2>
            <button type="button" class="close" data-action="close-overlay" aria-label="Close">&times;</button>
        </header>
        <div class="overlay-body">
            {body}
        </div>
    </div>
</div>
"#,
        title = escape_html(&overlay.title),
        body = body,
    )
}

/// Text paragraphs plus the citation list (omitted when nothing is linkable)
pub fn render_follow_up(info: &FollowUpInfo) -> String {
    let mut html = String::new();
    for paragraph in info.text.split("\n\n").map(str::trim).filter(|p| !p.is_empty()) {
        let _ = write!(
            html,
            "<p>{}</p>",
            escape_html(paragraph).replace('\n', "<br>")
        );
    }

    let links: Vec<(&str, &str)> = info.sources.iter().filter_map(|s| s.link()).collect();
    if !links.is_empty() {
        html.push_str(r#"<div class="sources"><h4>Sources:</h4><ul>"#);
        for (href, text) in links {
            let _ = write!(
                html,
                r#"<li><a href="{}" target="_blank" rel="noopener noreferrer">{}</a></li>"#,
                escape_html(href),
                escape_html(text)
            );
        }
        html.push_str("</ul></div>");
    }

    html
}
