//! Track load/play sequencer.
//!
//! ```text
//!   Idle ──select──▶ Loading ──canplay──▶ Ready ──play ok──▶ Playing
//!                       │                   │                   │
//!                     error            play rejected          ended
//!                       ▼                   ▼                   ▼
//!                     Failed              Failed               Idle
//! ```
//!
//! Any state goes back to `Loading` on a new selection. Every selection gets
//! a fresh [`LoadAttempt`]; media callbacks are tagged with the attempt they
//! were registered for and are dropped once that attempt is superseded, so a
//! late `canplay` from an old load can never start the wrong track.
//!
//! The sequencer performs no I/O. Each transition returns the [`Command`]s the
//! front-end has to execute, in order.

use crate::core::track::{Track, TrackId};
use thiserror::Error;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LoadAttempt(u64);

impl LoadAttempt {
    pub fn id(self) -> u64 {
        self.0
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum PlaybackError {
    #[error("consent required before playback")]
    ConsentRequired,
    #[error("track {0} has no audio source")]
    NoSource(TrackId),
    #[error("failed to load audio for {0}")]
    LoadFailed(TrackId),
    #[error("playback of {track} rejected: {reason}")]
    PlayRejected { track: TrackId, reason: String },
    #[error("superseded by a newer selection")]
    Superseded,
}

#[derive(Clone, Debug, PartialEq)]
pub enum SequencerState {
    Idle,
    Loading { attempt: LoadAttempt, track: Track },
    Ready { attempt: LoadAttempt, track: Track },
    Playing { attempt: LoadAttempt, track: Track },
    Failed { track: Track, error: PlaybackError },
}

impl SequencerState {
    pub fn name(&self) -> &'static str {
        match self {
            SequencerState::Idle => "idle",
            SequencerState::Loading { .. } => "loading",
            SequencerState::Ready { .. } => "ready",
            SequencerState::Playing { .. } => "playing",
            SequencerState::Failed { .. } => "failed",
        }
    }

    /// Track of the state, if any.
    pub fn track(&self) -> Option<&Track> {
        match self {
            SequencerState::Idle => None,
            SequencerState::Loading { track, .. }
            | SequencerState::Ready { track, .. }
            | SequencerState::Playing { track, .. }
            | SequencerState::Failed { track, .. } => Some(track),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    ShowConsentDialog,
    ShowLoading,
    HideLoading,
    /// Register one-shot `canplay`/`error` listeners tagged with the attempt.
    ArmListeners(LoadAttempt),
    /// Drop the attempt's listeners if still registered.
    DisarmListeners(LoadAttempt),
    SetSource { attempt: LoadAttempt, url: String },
    /// Build the audio graph if it does not exist yet.
    EnsureGraph,
    /// Call `play()` on the media element and report back with the attempt.
    Play(LoadAttempt),
    ShowNowPlaying { title: String, location: String },
    /// Settle the caller's pending selection successfully.
    Resolve(LoadAttempt),
    /// Settle the caller's pending selection with an error.
    Reject(LoadAttempt, PlaybackError),
}

#[derive(Debug)]
pub struct Sequencer {
    state: SequencerState,
    next_attempt: u64,
    consent_granted: bool,
}

impl Sequencer {
    pub fn new(consent_granted: bool) -> Self {
        Self {
            state: SequencerState::Idle,
            next_attempt: 1,
            consent_granted,
        }
    }

    pub fn state(&self) -> &SequencerState {
        &self.state
    }

    pub fn set_consent_granted(&mut self, granted: bool) {
        self.consent_granted = granted;
    }

    /// Attempt whose load/play is in flight, if any.
    pub fn armed_attempt(&self) -> Option<LoadAttempt> {
        match self.state {
            SequencerState::Loading { attempt, .. } | SequencerState::Ready { attempt, .. } => {
                Some(attempt)
            }
            _ => None,
        }
    }

    /// User picked a marker. Supersedes any in-flight attempt; never queues.
    pub fn select(&mut self, track: &Track) -> Vec<Command> {
        if !self.consent_granted {
            log::info!("[sequencer] consent missing, blocking {}", track.id);
            return vec![Command::ShowConsentDialog];
        }
        let mut cmds = Vec::new();
        if let Some(old) = self.armed_attempt() {
            log::info!("[sequencer] attempt {} superseded", old.0);
            cmds.push(Command::DisarmListeners(old));
            cmds.push(Command::Reject(old, PlaybackError::Superseded));
        }
        let attempt = LoadAttempt(self.next_attempt);
        self.next_attempt += 1;
        if track.url.is_empty() {
            let error = PlaybackError::NoSource(track.id.clone());
            self.state = SequencerState::Failed {
                track: track.clone(),
                error: error.clone(),
            };
            cmds.push(Command::HideLoading);
            cmds.push(Command::Reject(attempt, error));
            return cmds;
        }
        log::info!("[sequencer] attempt {} loading {}", attempt.0, track.id);
        self.state = SequencerState::Loading {
            attempt,
            track: track.clone(),
        };
        cmds.push(Command::ArmListeners(attempt));
        cmds.push(Command::ShowLoading);
        cmds.push(Command::SetSource {
            attempt,
            url: track.url.clone(),
        });
        cmds
    }

    /// Media element signalled `canplay` for `attempt`.
    pub fn on_can_play(&mut self, attempt: LoadAttempt) -> Vec<Command> {
        let track = match &self.state {
            SequencerState::Loading { attempt: a, track } if *a == attempt => track.clone(),
            _ => return self.stale("canplay", attempt),
        };
        self.state = SequencerState::Ready { attempt, track };
        vec![
            Command::DisarmListeners(attempt),
            Command::HideLoading,
            Command::EnsureGraph,
            Command::Play(attempt),
        ]
    }

    /// Media element signalled `error` while loading `attempt`.
    pub fn on_load_error(&mut self, attempt: LoadAttempt) -> Vec<Command> {
        let track = match &self.state {
            SequencerState::Loading { attempt: a, track } if *a == attempt => track.clone(),
            _ => return self.stale("error", attempt),
        };
        let error = PlaybackError::LoadFailed(track.id.clone());
        log::warn!("[sequencer] {}", error);
        self.state = SequencerState::Failed {
            track,
            error: error.clone(),
        };
        vec![
            Command::DisarmListeners(attempt),
            Command::HideLoading,
            Command::Reject(attempt, error),
        ]
    }

    /// The `play()` promise for `attempt` resolved.
    pub fn on_play_resolved(&mut self, attempt: LoadAttempt) -> Vec<Command> {
        let track = match &self.state {
            SequencerState::Ready { attempt: a, track } if *a == attempt => track.clone(),
            _ => return self.stale("play resolved", attempt),
        };
        log::info!("[sequencer] attempt {} playing {}", attempt.0, track.id);
        let cmds = vec![
            Command::ShowNowPlaying {
                title: track.title.clone(),
                location: track.location.clone(),
            },
            Command::Resolve(attempt),
        ];
        self.state = SequencerState::Playing { attempt, track };
        cmds
    }

    /// The `play()` promise for `attempt` rejected (autoplay policy, decode).
    pub fn on_play_rejected(&mut self, attempt: LoadAttempt, reason: &str) -> Vec<Command> {
        let track = match &self.state {
            SequencerState::Ready { attempt: a, track } if *a == attempt => track.clone(),
            _ => return self.stale("play rejected", attempt),
        };
        let error = PlaybackError::PlayRejected {
            track: track.id.clone(),
            reason: reason.to_string(),
        };
        log::warn!("[sequencer] {}", error);
        self.state = SequencerState::Failed {
            track,
            error: error.clone(),
        };
        vec![Command::HideLoading, Command::Reject(attempt, error)]
    }

    /// Natural end of the current track.
    pub fn on_ended(&mut self) -> Vec<Command> {
        if let SequencerState::Playing { track, .. } = &self.state {
            log::info!("[sequencer] {} ended", track.id);
            self.state = SequencerState::Idle;
        }
        Vec::new()
    }

    fn stale(&self, what: &str, attempt: LoadAttempt) -> Vec<Command> {
        log::debug!(
            "[sequencer] ignoring {} for attempt {} in state {}",
            what,
            attempt.0,
            self.state.name()
        );
        Vec::new()
    }
}
