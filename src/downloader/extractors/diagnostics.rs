// Blocking diagnostics - identifies why yt-dlp could not read a URL
//
// Only used to enrich messages; the error category is decided by the caller.

use serde::{Deserialize, Serialize};

/// Why yt-dlp could not read or fetch a URL, as far as stderr tells
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockingReason {
    Http403Forbidden,
    AgeRestricted,
    GeoBlocked,
    /// Often a soft IP block rather than a real network problem
    NetworkTimeout,
    RateLimited,
    BotDetection,
    /// Private video, or a playlist the account cannot see
    PrivateVideo,
    /// Deleted, taken down, or blocked on copyright grounds
    VideoUnavailable,
    DrmProtected,
    MembersOnly,
    UnsupportedUrl,
    Unknown,
}

impl BlockingReason {
    pub fn cookies_might_help(&self) -> bool {
        matches!(
            self,
            Self::Http403Forbidden
                | Self::AgeRestricted
                | Self::BotDetection
                | Self::PrivateVideo
                | Self::MembersOnly
        )
    }

    pub fn proxy_might_help(&self) -> bool {
        matches!(
            self,
            Self::Http403Forbidden
                | Self::GeoBlocked
                | Self::NetworkTimeout
                | Self::RateLimited
                | Self::BotDetection
        )
    }

    /// No workaround exists
    pub fn is_permanent(&self) -> bool {
        matches!(
            self,
            Self::DrmProtected | Self::VideoUnavailable | Self::UnsupportedUrl
        )
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::Http403Forbidden => "HTTP 403 from YouTube",
            Self::AgeRestricted => "Age-restricted content",
            Self::GeoBlocked => "Not available in this region",
            Self::NetworkTimeout => "Network timeout, possibly throttled",
            Self::RateLimited => "Too many requests",
            Self::BotDetection => "YouTube asked for a bot check",
            Self::PrivateVideo => "Private video",
            Self::VideoUnavailable => "Video unavailable",
            Self::DrmProtected => "DRM-protected content",
            Self::MembersOnly => "Members-only content",
            Self::UnsupportedUrl => "Unsupported URL",
            Self::Unknown => "yt-dlp error",
        }
    }

    /// Short hint shown under the error message
    pub fn suggestion(&self) -> Option<String> {
        if self.is_permanent() {
            return match self {
                Self::UnsupportedUrl => Some("Check that the link is a YouTube video, playlist or channel URL.".to_string()),
                _ => None,
            };
        }

        let mut hints = Vec::new();
        if self.cookies_might_help() {
            hints.push("use cookies from a logged-in browser (YTMP3_COOKIES_BROWSER=chrome)");
        }
        if self.proxy_might_help() {
            hints.push("try a proxy or VPN (YTMP3_PROXY)");
        }
        if matches!(self, Self::RateLimited | Self::NetworkTimeout | Self::Unknown) {
            hints.push("wait a few minutes and try again");
        }

        if hints.is_empty() {
            None
        } else {
            Some(format!("What to try: {}.", hints.join("; ")))
        }
    }
}

/// stderr fragments per reason, most specific first. Matched lowercase.
const SIGNATURES: &[(BlockingReason, &[&str])] = &[
    (
        BlockingReason::DrmProtected,
        &["drm", "widevine", "requires purchase", "this video requires payment"],
    ),
    (
        BlockingReason::MembersOnly,
        &["members only", "members-only", "join this channel", "available to members"],
    ),
    (BlockingReason::UnsupportedUrl, &["unsupported url", "is not a valid url"]),
    (
        BlockingReason::AgeRestricted,
        &["age-restricted", "sign in to confirm your age", "age_verification"],
    ),
    (
        BlockingReason::PrivateVideo,
        &[
            "private video",
            "video is private",
            "playlist does not exist",
            "sign in if you've been granted access",
        ],
    ),
    (
        BlockingReason::VideoUnavailable,
        &[
            "video unavailable",
            "video is unavailable",
            "video has been removed",
            "no longer available",
            "copyright",
        ],
    ),
    (
        BlockingReason::GeoBlocked,
        &["not available in your country", "blocked in your country", "geo restrict", "geographic restriction"],
    ),
    (BlockingReason::RateLimited, &["429", "rate limit", "too many requests"]),
    (
        BlockingReason::BotDetection,
        &["confirm you're not a bot", "captcha", "unusual traffic"],
    ),
    (BlockingReason::Http403Forbidden, &["403", "forbidden"]),
    (
        BlockingReason::NetworkTimeout,
        &["timeout", "timed out", "connection refused", "network unreachable"],
    ),
];

/// Map yt-dlp stderr to a blocking reason. Blank input gives `None`,
/// anything unrecognised gives `Unknown`.
pub fn diagnose_error(stderr: &str) -> Option<BlockingReason> {
    if stderr.trim().is_empty() {
        return None;
    }

    let lower = stderr.to_lowercase();
    let reason = SIGNATURES
        .iter()
        .find(|(_, needles)| needles.iter().any(|n| lower.contains(n)))
        .map(|(reason, _)| *reason)
        .unwrap_or(BlockingReason::Unknown);
    Some(reason)
}
