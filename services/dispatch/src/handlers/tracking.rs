use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use serde::Deserialize;
use uuid::Uuid;

use mailwave_domain::tracking::{TrackingEventKind, UtmParams};

use crate::domain::repository::{
    CampaignStore, ContactDirectory, DispatchScheduler, MailTransport, TrackingStore,
};
use crate::domain::types::{NewTrackingEvent, RequestMeta};
use crate::error::DispatchServiceError;
use crate::state::AppState;
use crate::usecase::track::RecordTrackingEventUseCase;

/// 43-byte transparent 1x1 GIF.
const PIXEL_GIF: [u8; 43] = [
    0x47, 0x49, 0x46, 0x38, 0x39, 0x61, 0x01, 0x00, 0x01, 0x00, 0x80, 0x00, 0x00, 0x00, 0x00,
    0x00, 0xFF, 0xFF, 0xFF, 0x21, 0xF9, 0x04, 0x01, 0x00, 0x00, 0x00, 0x00, 0x2C, 0x00, 0x00,
    0x00, 0x00, 0x01, 0x00, 0x01, 0x00, 0x00, 0x02, 0x02, 0x44, 0x01, 0x00, 0x3B,
];

/// Tracking-hit query parameters. Every field is an optional string so that
/// malformed links from mangled emails still extract; validation happens
/// leniently afterwards.
#[derive(Debug, Default, Deserialize)]
pub struct TrackingQuery {
    pub meid: Option<String>,
    pub cid: Option<String>,
    /// Legacy alias for `utm_campaign`, kept for links already in the wild.
    pub campaign: Option<String>,
    pub utm_source: Option<String>,
    pub utm_medium: Option<String>,
    pub utm_campaign: Option<String>,
    pub utm_term: Option<String>,
    pub utm_content: Option<String>,
    pub url: Option<String>,
}

impl TrackingQuery {
    fn ids(&self) -> Option<(Uuid, Uuid)> {
        let campaign_id = self.meid.as_deref()?.parse().ok()?;
        let contact_id = self.cid.as_deref()?.parse().ok()?;
        Some((campaign_id, contact_id))
    }

    fn utm(&self) -> UtmParams {
        UtmParams {
            source: self.utm_source.clone(),
            medium: self.utm_medium.clone(),
            campaign: self.utm_campaign.clone().or_else(|| self.campaign.clone()),
            term: self.utm_term.clone(),
            content: self.utm_content.clone(),
        }
    }
}

// ── GET /marketing-email/tracking/open ───────────────────────────────────────

/// Serves the pixel unconditionally. A broken recorder must never break
/// image rendering in the recipient's mail client.
pub async fn track_open<S, D, T, K, Q>(
    State(state): State<AppState<S, D, T, K, Q>>,
    Query(query): Query<TrackingQuery>,
    headers: HeaderMap,
) -> Response
where
    S: CampaignStore + Clone,
    D: ContactDirectory + Clone,
    T: MailTransport + Clone,
    K: TrackingStore + Clone,
    Q: DispatchScheduler + Clone,
{
    match query.ids() {
        Some((campaign_id, contact_id)) => {
            let usecase = RecordTrackingEventUseCase {
                store: state.tracking.clone(),
            };
            let event = NewTrackingEvent {
                kind: TrackingEventKind::Open,
                campaign_id,
                contact_id,
                message_id: None,
                url: None,
                utm: query.utm(),
                meta: request_meta(&headers),
            };
            if let Err(e) = usecase.execute(event).await {
                tracing::warn!(error = %e, campaign = %campaign_id, "failed to record open");
            }
        }
        None => {
            tracing::warn!(meid = ?query.meid, cid = ?query.cid, "open hit with unusable ids");
        }
    }

    (
        [
            (header::CONTENT_TYPE, "image/gif"),
            (
                header::CACHE_CONTROL,
                "no-store, no-cache, must-revalidate, private",
            ),
        ],
        PIXEL_GIF.to_vec(),
    )
        .into_response()
}

// ── GET /marketing-email/tracking/click ──────────────────────────────────────

/// Redirects immediately; the CLICK write runs as a detached task so the
/// recipient's browser never waits on the database.
pub async fn track_click<S, D, T, K, Q>(
    State(state): State<AppState<S, D, T, K, Q>>,
    Query(query): Query<TrackingQuery>,
    headers: HeaderMap,
) -> Result<Response, DispatchServiceError>
where
    S: CampaignStore + Clone,
    D: ContactDirectory + Clone,
    T: MailTransport + Clone,
    K: TrackingStore + Clone + 'static,
    Q: DispatchScheduler + Clone,
{
    let target = match query.url.as_deref() {
        Some(url) if !url.is_empty() => url.to_owned(),
        _ => return Err(DispatchServiceError::MissingRedirectUrl),
    };

    match query.ids() {
        Some((campaign_id, contact_id)) => {
            let event = NewTrackingEvent {
                kind: TrackingEventKind::Click,
                campaign_id,
                contact_id,
                message_id: None,
                url: Some(target.clone()),
                utm: query.utm(),
                meta: request_meta(&headers),
            };
            let store = state.tracking.clone();
            state.drain.spawn(async move {
                let usecase = RecordTrackingEventUseCase { store };
                if let Err(e) = usecase.execute(event).await {
                    tracing::warn!(error = %e, campaign = %campaign_id, "failed to record click");
                }
            });
        }
        None => {
            tracing::warn!(meid = ?query.meid, cid = ?query.cid, "click hit with unusable ids");
        }
    }

    Ok((StatusCode::FOUND, [(header::LOCATION, target)]).into_response())
}

// ── Request metadata ─────────────────────────────────────────────────────────

fn request_meta(headers: &HeaderMap) -> RequestMeta {
    let ip = headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(|v| v.trim().to_owned());
    let user_agent = headers
        .get(header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned);
    let referrer = headers
        .get(header::REFERER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned);

    let (browser, os, device_type) = match user_agent.as_deref() {
        Some(ua) => sniff_user_agent(ua),
        None => (None, None, None),
    };

    RequestMeta {
        ip,
        user_agent,
        browser,
        os,
        device_type,
        referrer,
    }
}

/// Coarse user-agent classification, enough for engagement dashboards.
/// Order matters: branded Chromium agents also contain "Chrome", Safari is
/// claimed by nearly everyone, and iPads report "Mac OS".
fn sniff_user_agent(ua: &str) -> (Option<String>, Option<String>, Option<String>) {
    let browser = if ua.contains("Edg/") {
        "Edge"
    } else if ua.contains("OPR/") || ua.contains("Opera") {
        "Opera"
    } else if ua.contains("Firefox/") {
        "Firefox"
    } else if ua.contains("Chrome/") {
        "Chrome"
    } else if ua.contains("Safari/") {
        "Safari"
    } else {
        "Other"
    };

    let os = if ua.contains("iPhone") || ua.contains("iPad") {
        "iOS"
    } else if ua.contains("Android") {
        "Android"
    } else if ua.contains("Windows") {
        "Windows"
    } else if ua.contains("Mac OS") {
        "macOS"
    } else if ua.contains("Linux") {
        "Linux"
    } else {
        "Other"
    };

    let device_type = if ua.contains("Mobi") {
        "mobile"
    } else if ua.contains("iPad") || ua.contains("Tablet") {
        "tablet"
    } else {
        "desktop"
    };

    (
        Some(browser.to_owned()),
        Some(os.to_owned()),
        Some(device_type.to_owned()),
    )
}
