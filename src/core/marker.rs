//! Marker highlight state.
//!
//! `classify` decides which visual state a marker is in for the current
//! frame; `MarkerAnimator` eases the marker's appearance toward that state's
//! material values.

use crate::core::config::{ConfigError, MaterialStateTable};
use crate::core::constants::{MARKER_PULSE_DEPTH_MAX, MARKER_PULSE_PERIOD_SEC, MARKER_TRANSITION_SEC};
use crate::core::track::Track;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum MarkerVisualState {
    #[default]
    Default,
    Hover,
    Active,
}

/// Configured appearance for one visual state.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MaterialState {
    /// `#rrggbb`
    pub color: String,
    pub opacity: f32,
    pub scale: f32,
}

impl MaterialState {
    pub fn new(color: &str, opacity: f32, scale: f32) -> Self {
        Self {
            color: color.to_string(),
            opacity,
            scale,
        }
    }

    /// Linear RGB in 0..=1 parsed from the hex color.
    pub fn rgb(&self) -> Result<[f32; 3], ConfigError> {
        parse_hex_color(&self.color).ok_or_else(|| ConfigError::InvalidColor(self.color.clone()))
    }
}

pub fn parse_hex_color(s: &str) -> Option<[f32; 3]> {
    let hex = s.strip_prefix('#')?;
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    Some([
        channel(0)? as f32 / 255.0,
        channel(2)? as f32 / 255.0,
        channel(4)? as f32 / 255.0,
    ])
}

/// Visual state of `marker` this frame.
///
/// Active iff the media element's current source is exactly the marker's
/// track URL and playback is not paused. Hover iff the marker is the nearest
/// pointer hit and not active.
#[inline]
pub fn classify(
    marker: &Track,
    current_src: &str,
    is_paused: bool,
    pointer_hit: bool,
) -> MarkerVisualState {
    let is_current = !current_src.is_empty() && marker.url == current_src;
    if is_current && !is_paused {
        MarkerVisualState::Active
    } else if pointer_hit {
        MarkerVisualState::Hover
    } else {
        MarkerVisualState::Default
    }
}

/// Resolved appearance of a marker for the renderer.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MarkerAppearance {
    pub color: [f32; 3],
    pub opacity: f32,
    pub scale: f32,
}

#[derive(Clone, Copy, Debug)]
struct Tween {
    from: f32,
    to: f32,
    elapsed: f32,
}

impl Tween {
    fn settled(v: f32) -> Self {
        Self {
            from: v,
            to: v,
            elapsed: MARKER_TRANSITION_SEC,
        }
    }

    fn value(&self) -> f32 {
        let t = (self.elapsed / MARKER_TRANSITION_SEC).clamp(0.0, 1.0);
        // power1.out
        let eased = 1.0 - (1.0 - t) * (1.0 - t);
        self.from + (self.to - self.from) * eased
    }

    fn retarget(&mut self, to: f32) {
        self.from = self.value();
        self.to = to;
        self.elapsed = 0.0;
    }

    fn is_running(&self) -> bool {
        self.elapsed < MARKER_TRANSITION_SEC
    }
}

/// Eases one marker toward the material values of its current target state.
/// Color snaps; opacity and scale tween over `MARKER_TRANSITION_SEC`.
#[derive(Clone, Debug)]
pub struct MarkerAnimator {
    target: MarkerVisualState,
    color: [f32; 3],
    opacity: Tween,
    scale: Tween,
    transitions: u32,
}

impl MarkerAnimator {
    pub fn new(table: &MaterialStateTable) -> Self {
        let initial = table.get(MarkerVisualState::Default);
        Self {
            target: MarkerVisualState::Default,
            color: initial.rgb().unwrap_or([1.0, 1.0, 1.0]),
            opacity: Tween::settled(initial.opacity),
            scale: Tween::settled(initial.scale),
            transitions: 0,
        }
    }

    pub fn target(&self) -> MarkerVisualState {
        self.target
    }

    /// Number of transitions started so far.
    pub fn transitions(&self) -> u32 {
        self.transitions
    }

    pub fn is_animating(&self) -> bool {
        self.opacity.is_running() || self.scale.is_running()
    }

    /// Start a transition toward `state`. Re-entering the current target is a
    /// no-op and returns `false`.
    pub fn set_target(&mut self, state: MarkerVisualState, table: &MaterialStateTable) -> bool {
        if state == self.target {
            return false;
        }
        let m = table.get(state);
        self.target = state;
        if let Ok(rgb) = m.rgb() {
            self.color = rgb;
        }
        self.opacity.retarget(m.opacity);
        self.scale.retarget(m.scale);
        self.transitions += 1;
        true
    }

    pub fn advance(&mut self, dt_sec: f32) {
        for tw in [&mut self.opacity, &mut self.scale] {
            tw.elapsed = (tw.elapsed + dt_sec.max(0.0)).min(MARKER_TRANSITION_SEC);
        }
    }

    pub fn appearance(&self) -> MarkerAppearance {
        MarkerAppearance {
            color: self.color,
            opacity: self.opacity.value(),
            scale: self.scale.value(),
        }
    }
}

/// Idle depth pulse: linear yoyo between 1.0 and `MARKER_PULSE_DEPTH_MAX`,
/// one leg per `MARKER_PULSE_PERIOD_SEC`, starting after `delay_sec`.
pub fn pulse_depth(time_sec: f32, delay_sec: f32) -> f32 {
    let t = time_sec - delay_sec;
    if t <= 0.0 {
        return 1.0;
    }
    let leg = MARKER_PULSE_PERIOD_SEC;
    let phase = t % (2.0 * leg);
    let u = if phase < leg {
        phase / leg
    } else {
        2.0 - phase / leg
    };
    1.0 + (MARKER_PULSE_DEPTH_MAX - 1.0) * u
}
