//! Core viewer contract shared between transport and presentation consumers.
//!
//! This crate defines the fetch error taxonomy, media URL classification,
//! raw-record normalization, the gallery navigation state machine, the
//! primary/fallback retry combinator, and the event fan-out abstraction.

/// Broadcast event fan-out consumed by presentation subscribers.
pub mod channel;
/// Stable fetch error taxonomy and transience classification.
pub mod error;
/// Primary/fallback retry combinator used by resilient fetch cycles.
pub mod fallback;
/// Gallery navigation, fullscreen, and playback state machine.
pub mod gallery;
/// Media URL validation and video container classification.
pub mod media;
/// Raw payload normalization into display-ready records.
pub mod record;

pub use channel::{EventStream, ViewerChannels, ViewerEvent};
pub use error::FetchError;
pub use fallback::attempt_with_fallback;
pub use gallery::{GalleryInput, GalleryState, GalleryStateMachine};
pub use media::{MediaAsset, MediaKind, classify_video, image_asset};
pub use record::{NormalizedRecord, RawRecord, normalize};
