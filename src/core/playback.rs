//! Playback state derived from the media element.
//!
//! Nothing here is stored between frames: the media element is the source of
//! truth and `PlaybackState::derive` reads it fresh, so the app can never
//! disagree with what the element is actually doing.

use crate::core::constants::{AUTO_ROTATE_ACTIVE, AUTO_ROTATE_IDLE};
use crate::core::track::{TrackId, TrackLibrary};

/// `HTMLMediaElement.HAVE_FUTURE_DATA`
pub const HAVE_FUTURE_DATA: u16 = 3;

/// The fields of the media element the core reads each frame.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MediaSnapshot {
    pub src: String,
    pub paused: bool,
    pub ended: bool,
    pub current_time: f64,
    pub ready_state: u16,
    pub has_error: bool,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct PlaybackState {
    pub current_track: Option<TrackId>,
    pub is_playing: bool,
    pub is_loading: bool,
}

impl PlaybackState {
    pub fn derive(media: &MediaSnapshot, library: &TrackLibrary) -> Self {
        let current_track = library.track_for_src(&media.src).map(|t| t.id.clone());
        let has_track = current_track.is_some();
        Self {
            is_playing: has_track && !media.paused && !media.ended,
            is_loading: has_track && !media.has_error && media.ready_state < HAVE_FUTURE_DATA,
            current_track,
        }
    }

    pub fn is_idle(&self) -> bool {
        !self.is_playing && !self.is_loading
    }

    /// Globe auto-rotation speed for this state.
    pub fn auto_rotate_speed(&self) -> f32 {
        if self.is_idle() {
            AUTO_ROTATE_IDLE
        } else {
            AUTO_ROTATE_ACTIVE
        }
    }
}
