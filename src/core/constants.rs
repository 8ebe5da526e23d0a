// Shared audio/visual tuning constants used by the core and the web frontend.

// Analyser
pub const FFT_SIZE: u32 = 256;
pub const FREQUENCY_BIN_COUNT: usize = (FFT_SIZE / 2) as usize;
/// Mean bin magnitude that maps to a full atmosphere mix.
pub const LOUDNESS_NORMALIZER: f32 = 128.0;

// Visualizer presets
pub const SUBTLE_GAIN: f32 = 2.5;
pub const ENERGETIC_GAIN: f32 = 5.0;
pub const CANVAS_CLEAR_COLOR: &str = "#000";

// Marker transitions
pub const MARKER_TRANSITION_SEC: f32 = 0.3;
pub const MARKER_PULSE_PERIOD_SEC: f32 = 2.0;
pub const MARKER_PULSE_DEPTH_MAX: f32 = 1.4;
pub const MARKER_BOX_SIZE: [f32; 3] = [0.4, 0.4, 1.0];
pub const MARKER_BOX_OFFSET: f32 = 0.4; // box centre above the surface
pub const MARKER_PICK_RADIUS: f32 = 0.45;

// Globe
pub const GLOBE_RADIUS: f32 = 5.0;
pub const ATMOSPHERE_RADIUS: f32 = 6.0;
pub const ATMOSPHERE_SCALE: f32 = 1.1;
pub const SPHERE_SEGMENTS: u32 = 50;
pub const ATMOSPHERE_COLOR_A: [f32; 3] = [0.2, 0.533, 1.0]; // #3388ff
pub const ATMOSPHERE_COLOR_B: [f32; 3] = [1.0, 0.2, 0.533]; // #ff3388

// Starfield
pub const STARFIELD_COUNT: usize = 10_000;
pub const STARFIELD_SPREAD: f32 = 2000.0;
pub const STARFIELD_DEPTH: f32 = 3000.0;
pub const STARFIELD_SEED: u64 = 0x5EED_57A2;

// Camera
pub const CAMERA_Z: f32 = 15.0;
pub const CAMERA_FOVY_DEG: f32 = 100.0;
pub const CAMERA_ZNEAR: f32 = 0.1;
pub const CAMERA_ZFAR: f32 = 2000.0;

// Orbit controls
pub const AUTO_ROTATE_IDLE: f32 = 0.5;
pub const AUTO_ROTATE_ACTIVE: f32 = 0.2; // loading or playing
/// One full orbit per 60s at speed 1.0.
pub const AUTO_ROTATE_RAD_PER_SEC: f32 = std::f32::consts::TAU / 60.0;
pub const DRAG_RAD_PER_PX: f32 = 0.005;
pub const DRAG_EASE_SEC: f32 = 2.0;
pub const POLAR_MIN: f32 = std::f32::consts::PI * 0.2;
pub const POLAR_MAX: f32 = std::f32::consts::PI * 0.8;
/// Pointer travel below which a press/release counts as a click, not a drag.
pub const CLICK_SLOP_PX: f32 = 5.0;

// Consent / remote service
pub const CONSENT_STORAGE_KEY: &str = "globe-player.consent";
pub const API_CHECK_PATH: &str = "/api/user/check";
pub const API_LOGIN_PATH: &str = "/api/user/login";
pub const DEFAULT_TRIAL_ALLOWANCE: u32 = 3;
pub const PHONE_DIGITS: usize = 10;
