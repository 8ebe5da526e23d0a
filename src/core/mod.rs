//! Target-independent core: playback sequencing, spectrum/visualizer math,
//! marker state, consent gating and scene data. Nothing in here touches
//! `web_sys`, so it builds and tests on the host.

pub mod api;
pub mod atmosphere;
pub mod config;
pub mod consent;
pub mod constants;
pub mod geometry;
pub mod marker;
pub mod orbit;
pub mod phone;
pub mod picking;
pub mod playback;
pub mod sequencer;
pub mod session;
pub mod spectrum;
pub mod track;
pub mod visualizer;

pub use config::{SceneConfig, VisualPreset};
pub use marker::{classify, MarkerVisualState};
pub use sequencer::{Command, LoadAttempt, PlaybackError, Sequencer, SequencerState};
pub use track::{MarkerId, Track, TrackId, TrackLibrary};

// Shaders bundled as string constants
pub static GLOBE_WGSL: &str = include_str!("../../shaders/globe.wgsl");
