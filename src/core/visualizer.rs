//! Frequency bar visualizer.
//!
//! The renderer owns the spectrum buffer, pulls one sample per frame, draws a
//! bar per bin onto a 2D surface and returns the normalized loudness that
//! drives the atmosphere glow.

use crate::core::config::VisualPreset;
use crate::core::constants::{CANVAS_CLEAR_COLOR, LOUDNESS_NORMALIZER};
use crate::core::spectrum::{FrequencySource, SpectrumFrame};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    /// Clamp each channel into 0..=255. NaN maps to 0.
    pub fn from_unclamped(r: f32, g: f32, b: f32) -> Self {
        let c = |v: f32| if v.is_nan() { 0 } else { v.clamp(0.0, 255.0) as u8 };
        Self {
            r: c(r),
            g: c(g),
            b: c(b),
        }
    }

    pub fn css(&self) -> String {
        format!("rgb({},{},{})", self.r, self.g, self.b)
    }
}

/// Minimal 2D drawing surface the bars are drawn onto.
pub trait BarSurface {
    fn size(&self) -> (f32, f32);
    fn clear(&mut self, css_color: &str);
    fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32, color: Rgb);
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bar {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub color: Rgb,
}

/// Fill color for a bar of `bar_height` at relative position `t = i / N`.
pub fn bar_color(preset: VisualPreset, bar_height: f32, t: f32) -> Rgb {
    match preset {
        VisualPreset::Subtle => Rgb::from_unclamped(bar_height, 120.0 * t, 86.0),
        VisualPreset::Energetic => {
            Rgb::from_unclamped(bar_height + 25.0 * t, 200.0 * t, 200.0 + 105.0 * t)
        }
    }
}

/// Mean bin magnitude divided by `LOUDNESS_NORMALIZER`, clamped to 0..=1.
pub fn normalized_loudness(bins: &[u8]) -> f32 {
    if bins.is_empty() {
        return 0.0;
    }
    let sum: u32 = bins.iter().map(|&b| b as u32).sum();
    let avg = sum as f32 / bins.len() as f32;
    (avg / LOUDNESS_NORMALIZER).clamp(0.0, 1.0)
}

/// Bars for `bins` on a `width` x `height` surface, bottom-anchored.
pub fn layout_bars(
    bins: &[u8],
    width: f32,
    height: f32,
    preset: VisualPreset,
) -> impl Iterator<Item = Bar> + '_ {
    let n = bins.len().max(1) as f32;
    let bar_width = width / n;
    let gain = preset.gain();
    bins.iter().enumerate().map(move |(i, &mag)| {
        let bar_height = mag as f32 * gain;
        Bar {
            x: i as f32 * bar_width,
            y: height - bar_height,
            width: bar_width,
            height: bar_height,
            color: bar_color(preset, bar_height, i as f32 / n),
        }
    })
}

/// Clear `surface`, draw one bar per bin and return the loudness scalar.
pub fn draw_bars<S: BarSurface + ?Sized>(surface: &mut S, bins: &[u8], preset: VisualPreset) -> f32 {
    let (w, h) = surface.size();
    surface.clear(CANVAS_CLEAR_COLOR);
    for bar in layout_bars(bins, w, h, preset) {
        surface.fill_rect(bar.x, bar.y, bar.width, bar.height, bar.color);
    }
    normalized_loudness(bins)
}

pub struct VisualizerRenderer {
    preset: VisualPreset,
    frame: SpectrumFrame,
    frame_index: u64,
}

impl VisualizerRenderer {
    pub fn new(preset: VisualPreset, bins: usize) -> Self {
        Self {
            preset,
            frame: SpectrumFrame::with_bins(bins),
            frame_index: 0,
        }
    }

    pub fn spectrum(&self) -> &SpectrumFrame {
        &self.frame
    }

    /// Sample once and draw one frame. With no analyser (graph not built yet,
    /// or unavailable) an empty spectrum is drawn and 0.0 returned.
    pub fn render_frame<S: BarSurface + ?Sized>(
        &mut self,
        surface: &mut S,
        source: Option<&dyn FrequencySource>,
    ) -> f32 {
        self.frame_index += 1;
        self.frame.sample(source, self.frame_index);
        draw_bars(surface, self.frame.bins(), self.preset)
    }
}
