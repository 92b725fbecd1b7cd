use serde::{Deserialize, Serialize};

use crate::media::{MediaAsset, MediaKind};
use crate::record::NormalizedRecord;

/// Keyboard/pointer inputs forwarded by the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GalleryInput {
    /// Escape key; exits fullscreen when active.
    Escape,
    /// Left arrow; retreats the active image.
    Left,
    /// Right arrow; advances the active image.
    Right,
}

/// Snapshot of gallery selection, fullscreen, and playback flags.
///
/// `active_media_index` is only meaningful while the selected bucket is
/// non-empty; callers must not dereference it against an empty bucket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GalleryState {
    pub active_media_index: usize,
    pub media_type: MediaKind,
    pub is_fullscreen: bool,
    pub fullscreen_target: Option<MediaAsset>,
    pub is_playing: bool,
}

/// Canonical gallery state machine.
///
/// Owns the normalized record it navigates over; created immediately after
/// normalization and discarded when the identifier changes. All transitions
/// are synchronous, and invalid requests (wrong mode, out-of-range index)
/// are silent no-ops rather than errors.
#[derive(Debug, Clone)]
pub struct GalleryStateMachine {
    record: NormalizedRecord,
    state: GalleryState,
}

impl GalleryStateMachine {
    /// Build the initial state for a freshly normalized record.
    ///
    /// Starts on the video bucket when any video survived classification,
    /// matching endpoint precedence; otherwise on images.
    pub fn new(record: NormalizedRecord) -> Self {
        let media_type = if record.has_videos() {
            MediaKind::Video
        } else {
            MediaKind::Image
        };
        Self {
            record,
            state: GalleryState {
                active_media_index: 0,
                media_type,
                is_fullscreen: false,
                fullscreen_target: None,
                is_playing: false,
            },
        }
    }

    /// Current state snapshot.
    pub fn state(&self) -> &GalleryState {
        &self.state
    }

    /// The record this gallery navigates over.
    pub fn record(&self) -> &NormalizedRecord {
        &self.record
    }

    /// The active image, when image mode is selected and in range.
    pub fn active_image(&self) -> Option<&MediaAsset> {
        if self.state.media_type != MediaKind::Image {
            return None;
        }
        self.record.images.get(self.state.active_media_index)
    }

    /// Switch the selected media bucket.
    ///
    /// Switching to images clamps a stale out-of-range index back to 0.
    pub fn select_media_type(&mut self, kind: MediaKind) {
        self.state.media_type = kind;
        if kind == MediaKind::Image && self.state.active_media_index >= self.record.images.len() {
            self.state.active_media_index = 0;
        }
    }

    /// Jump to a specific image. No-op outside image mode or out of range.
    pub fn select_index(&mut self, index: usize) {
        if self.state.media_type != MediaKind::Image || index >= self.record.images.len() {
            return;
        }
        self.state.active_media_index = index;
    }

    /// Advance the active image, wrapping past the last index to 0.
    pub fn next(&mut self) {
        self.step(true);
    }

    /// Retreat the active image, wrapping past 0 to the last index.
    pub fn previous(&mut self) {
        self.step(false);
    }

    fn step(&mut self, forward: bool) {
        if self.state.media_type != MediaKind::Image {
            return;
        }
        let len = self.record.images.len();
        if len < 2 {
            return;
        }

        let current = self.state.active_media_index;
        let next = if forward {
            (current + 1) % len
        } else {
            (current + len - 1) % len
        };
        self.state.active_media_index = next;

        // Background gallery and fullscreen view must never diverge on
        // which image is active.
        if self.state.is_fullscreen
            && self
                .state
                .fullscreen_target
                .as_ref()
                .is_some_and(|target| target.kind == MediaKind::Image)
        {
            self.state.fullscreen_target = self.record.images.get(next).cloned();
        }
    }

    /// Open the fullscreen overlay on the given asset.
    pub fn enter_fullscreen(&mut self, asset: MediaAsset) {
        self.state.is_fullscreen = true;
        self.state.fullscreen_target = Some(asset);
    }

    /// Close the fullscreen overlay. Any active video is implicitly paused.
    pub fn exit_fullscreen(&mut self) {
        self.state.is_fullscreen = false;
        self.state.fullscreen_target = None;
        self.state.is_playing = false;
    }

    /// Flip the playback flag. No-op outside video mode.
    ///
    /// The machine holds no decoding resources; the flag signals the
    /// presentation layer to start or stop actual playback.
    pub fn toggle_video_playback(&mut self) {
        if self.state.media_type != MediaKind::Video {
            return;
        }
        self.state.is_playing = !self.state.is_playing;
    }

    /// Apply one keyboard input per the presentation contract.
    pub fn handle_input(&mut self, input: GalleryInput) {
        match input {
            GalleryInput::Escape => {
                if self.state.is_fullscreen {
                    self.exit_fullscreen();
                }
            }
            GalleryInput::Left => self.previous(),
            GalleryInput::Right => self.next(),
        }
    }
}
