use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::media::{MediaAsset, classify_video, image_asset};

/// Untyped payload as returned by the apartment endpoint.
///
/// Held only long enough to normalize; never retained afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawRecord(pub Value);

/// Display-ready apartment record.
///
/// Media buckets are created once per fetch cycle and replaced wholesale by
/// the next cycle; there is no incremental mutation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NormalizedRecord {
    pub apartment_name: String,
    pub description: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub guests: u64,
    pub beds: u64,
    pub bedrooms: u64,
    pub bathrooms: u64,
    /// Parsed amenity list (see [`parse_amenities`]).
    pub amenities: Vec<String>,
    /// All listed image URLs, kept verbatim.
    pub images: Vec<MediaAsset>,
    /// Video URLs that survived classification.
    pub videos: Vec<MediaAsset>,
    /// Agent object passed through verbatim for the presentation layer.
    pub agent: Option<Value>,
    /// Optional-fee object passed through verbatim.
    pub optional_fees: Option<Value>,
}

impl NormalizedRecord {
    /// Whether any video survived classification.
    pub fn has_videos(&self) -> bool {
        !self.videos.is_empty()
    }

    /// `"<address>, <city>, <state>"` with empty components dropped.
    pub fn location_line(&self) -> String {
        [&self.address, &self.city, &self.state]
            .into_iter()
            .filter(|part| !part.is_empty())
            .cloned()
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Reshape the raw payload into a display-ready record.
///
/// Pure and infallible: missing or oddly-typed fields degrade to defaults,
/// and a JSON body with no recognizable fields normalizes to an empty-media
/// record rather than an error.
pub fn normalize(raw: RawRecord) -> NormalizedRecord {
    let value = raw.0;
    let media = value.get("media");

    let images = string_list(media.and_then(|m| m.get("images")))
        .into_iter()
        .map(image_asset)
        .collect();
    let videos = string_list(media.and_then(|m| m.get("videos")))
        .iter()
        .filter_map(|url| classify_video(url))
        .collect();

    NormalizedRecord {
        apartment_name: text_field(&value, "apartmentName"),
        description: text_field(&value, "description"),
        address: text_field(&value, "address"),
        city: text_field(&value, "city"),
        state: text_field(&value, "state"),
        guests: count_field(&value, "guests"),
        beds: count_field(&value, "beds"),
        bedrooms: count_field(&value, "bedrooms"),
        bathrooms: count_field(&value, "bathrooms"),
        amenities: parse_amenities(string_list(value.get("amenities"))),
        images,
        videos,
        agent: value.get("agentId").cloned(),
        optional_fees: value.get("optionalFees").cloned(),
    }
}

/// Resolve the endpoint's two amenity shapes.
///
/// Amenities arrive either as a flat list of strings or as a single
/// JSON-encoded string (`["[\"WiFi\",\"Pool\"]"]`). The latter is detected by
/// its leading `[` and strictly parsed; any parse failure degrades to the raw
/// list unmodified.
pub fn parse_amenities(raw: Vec<String>) -> Vec<String> {
    let Some(first) = raw.first() else {
        return raw;
    };
    if !first.starts_with('[') {
        return raw;
    }
    match serde_json::from_str::<Vec<String>>(first) {
        Ok(parsed) => parsed,
        Err(_) => raw,
    }
}

fn text_field(value: &Value, key: &str) -> String {
    value
        .get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_owned()
}

// Counts arrive as JSON numbers or numeric strings depending on endpoint
// version; anything else reads as zero.
fn count_field(value: &Value, key: &str) -> u64 {
    match value.get(key) {
        Some(Value::Number(n)) => n.as_u64().unwrap_or(0),
        Some(Value::String(s)) => s.trim().parse().unwrap_or(0),
        _ => 0,
    }
}

fn string_list(value: Option<&Value>) -> Vec<String> {
    value
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_owned)
                .collect()
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::media::MediaKind;

    fn record(value: Value) -> NormalizedRecord {
        normalize(RawRecord(value))
    }

    #[test]
    fn keeps_all_images_and_filters_videos() {
        let normalized = record(json!({
            "media": {
                "images": ["https://cdn.example.com/a.jpg", "front-door"],
                "videos": [
                    "https://cdn.example.com/tour.mp4",
                    "https://cdn.example.com/flyer.pdf",
                    "not a url.mov"
                ]
            }
        }));

        assert_eq!(normalized.images.len(), 2);
        assert!(normalized.images.iter().all(|a| a.kind == MediaKind::Image));
        assert_eq!(normalized.videos.len(), 1);
        assert_eq!(normalized.videos[0].url, "https://cdn.example.com/tour.mp4");
        assert_eq!(normalized.videos[0].mime_type.as_deref(), Some("video/mp4"));
    }

    #[test]
    fn parses_json_encoded_amenities() {
        let normalized = record(json!({ "amenities": ["[\"WiFi\",\"Pool\"]"] }));
        assert_eq!(normalized.amenities, vec!["WiFi", "Pool"]);
    }

    #[test]
    fn passes_flat_amenities_through() {
        let normalized = record(json!({ "amenities": ["WiFi", "Pool"] }));
        assert_eq!(normalized.amenities, vec!["WiFi", "Pool"]);
    }

    #[test]
    fn falls_back_on_malformed_amenity_json() {
        let normalized = record(json!({ "amenities": ["[invalid"] }));
        assert_eq!(normalized.amenities, vec!["[invalid"]);
    }

    #[test]
    fn reads_counts_from_numbers_or_numeric_strings() {
        let normalized = record(json!({
            "guests": 4,
            "beds": "2",
            "bedrooms": "two",
            "bathrooms": null
        }));
        assert_eq!(normalized.guests, 4);
        assert_eq!(normalized.beds, 2);
        assert_eq!(normalized.bedrooms, 0);
        assert_eq!(normalized.bathrooms, 0);
    }

    #[test]
    fn empty_json_normalizes_to_empty_record() {
        let normalized = record(json!({}));
        assert_eq!(normalized, NormalizedRecord::default());
        assert!(!normalized.has_videos());
    }

    #[test]
    fn keeps_agent_and_fees_verbatim() {
        let normalized = record(json!({
            "agentId": { "firstName": "Ada", "lastName": "Obi" },
            "optionalFees": { "partyFee": 50000 }
        }));
        assert_eq!(
            normalized.agent,
            Some(json!({ "firstName": "Ada", "lastName": "Obi" }))
        );
        assert_eq!(normalized.optional_fees, Some(json!({ "partyFee": 50000 })));
    }

    #[test]
    fn builds_location_line_without_empty_parts() {
        let normalized = record(json!({ "city": "Lagos", "state": "Lagos State" }));
        assert_eq!(normalized.location_line(), "Lagos, Lagos State");
    }
}
