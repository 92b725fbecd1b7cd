use percent_encoding::percent_decode_str;
use serde::{Deserialize, Serialize};
use url::Url;

/// Recognized playable video extensions. Anything else renders as an image.
const VIDEO_EXTENSIONS: [&str; 4] = [".mp4", ".mov", ".webm", ".ogg"];

/// Media bucket a gallery asset belongs to.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum MediaKind {
    /// Displayable still image.
    Image,
    /// Playable video with a known container type.
    Video,
}

/// A single validated gallery asset.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MediaAsset {
    /// Display/playback URL. Percent-decoded for video assets.
    pub url: String,
    /// Which gallery bucket the asset belongs to.
    pub kind: MediaKind,
    /// Playback MIME hint; `Some` exactly when `kind` is `Video`.
    pub mime_type: Option<String>,
}

/// Wrap a raw image URL as a displayable asset.
///
/// Image URLs get no extension validation: any URL the endpoint lists under
/// `media.images` is treated as displayable and left untouched.
pub fn image_asset(url: impl Into<String>) -> MediaAsset {
    MediaAsset {
        url: url.into(),
        kind: MediaKind::Image,
        mime_type: None,
    }
}

/// Validate a raw video URL and classify its container type.
///
/// The input is percent-decoded once, parsed as a URL, and matched against
/// the recognized video extensions. Any failure rejects the asset (`None`);
/// rejection is a permanent classification outcome, never an error.
pub fn classify_video(raw: &str) -> Option<MediaAsset> {
    if raw.is_empty() {
        return None;
    }

    let decoded = percent_decode_str(raw).decode_utf8().ok()?.into_owned();
    Url::parse(&decoded).ok()?;

    let lowered = decoded.to_lowercase();
    if !VIDEO_EXTENSIONS.iter().any(|ext| lowered.ends_with(ext)) {
        return None;
    }

    Some(MediaAsset {
        mime_type: Some(video_mime_type(&lowered).to_owned()),
        // Players want the decoded form, not the wire encoding.
        url: decoded,
        kind: MediaKind::Video,
    })
}

/// Fixed extension-to-MIME table.
///
/// Unknown suffixes fall back to `video/mp4` to preserve lenient playback
/// attempts downstream.
fn video_mime_type(lowered_url: &str) -> &'static str {
    if lowered_url.ends_with(".webm") {
        "video/webm"
    } else if lowered_url.ends_with(".ogg") {
        "video/ogg"
    } else if lowered_url.ends_with(".mov") {
        "video/quicktime"
    } else {
        "video/mp4"
    }
}
