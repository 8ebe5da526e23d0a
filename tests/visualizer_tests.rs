// Host-side tests for spectrum sampling, bar layout and the atmosphere link.

use globe_player::core::atmosphere::{self, AtmosphereUniforms};
use globe_player::core::spectrum::{FrequencySource, SpectrumFrame};
use globe_player::core::visualizer::{
    bar_color, layout_bars, normalized_loudness, BarSurface, Rgb, VisualizerRenderer,
};
use globe_player::core::VisualPreset;
use std::cell::Cell;

struct FixedSource {
    bins: Vec<u8>,
    reads: Cell<u32>,
}

impl FixedSource {
    fn new(bins: Vec<u8>) -> Self {
        Self {
            bins,
            reads: Cell::new(0),
        }
    }
}

impl FrequencySource for FixedSource {
    fn frequency_bin_count(&self) -> usize {
        self.bins.len()
    }

    fn byte_frequency_data(&self, out: &mut [u8]) {
        self.reads.set(self.reads.get() + 1);
        let n = out.len().min(self.bins.len());
        out[..n].copy_from_slice(&self.bins[..n]);
    }
}

#[derive(Default)]
struct RecordingSurface {
    w: f32,
    h: f32,
    clears: Vec<String>,
    rects: Vec<(f32, f32, f32, f32, Rgb)>,
}

impl BarSurface for RecordingSurface {
    fn size(&self) -> (f32, f32) {
        (self.w, self.h)
    }

    fn clear(&mut self, css_color: &str) {
        self.clears.push(css_color.to_string());
        self.rects.clear();
    }

    fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32, color: Rgb) {
        self.rects.push((x, y, w, h, color));
    }
}

fn surface(w: f32, h: f32) -> RecordingSurface {
    RecordingSurface {
        w,
        h,
        ..Default::default()
    }
}

#[test]
fn rgb_clamps_each_channel() {
    assert_eq!(
        Rgb::from_unclamped(300.0, -4.0, f32::NAN),
        Rgb { r: 255, g: 0, b: 0 }
    );
    assert_eq!(Rgb::from_unclamped(12.7, 0.0, 86.0).css(), "rgb(12,0,86)");
}

fn channel(v: f32) -> u8 {
    v.clamp(0.0, 255.0) as u8
}

#[test]
fn bar_colors_stay_in_range_for_every_bin() {
    // Heights past 255 and Energetic blue (200 + 105 * t) must saturate.
    let n = 128;
    for preset in [VisualPreset::Subtle, VisualPreset::Energetic] {
        for gain in [0.0f32, 1.0, preset.gain(), 2.5, 5.0, 50.0, 1e6] {
            for mag in 0u8..=255 {
                let height = mag as f32 * gain;
                for i in 0..n {
                    let t = i as f32 / n as f32;
                    let c = bar_color(preset, height, t);
                    let want = match preset {
                        VisualPreset::Subtle => Rgb {
                            r: channel(height),
                            g: channel(120.0 * t),
                            b: 86,
                        },
                        VisualPreset::Energetic => Rgb {
                            r: channel(height + 25.0 * t),
                            g: channel(200.0 * t),
                            b: channel(200.0 + 105.0 * t),
                        },
                    };
                    assert_eq!(c, want, "{preset:?} gain={gain} mag={mag} i={i}");
                    if height >= 255.0 {
                        assert_eq!(c.r, 255);
                    }
                }
            }
        }
        // Top bin of the energetic palette overflows 255 before clamping.
        if preset == VisualPreset::Energetic {
            assert_eq!(bar_color(preset, 0.0, (n - 1) as f32 / n as f32).b, 255);
        }
    }
}

#[test]
fn subtle_palette_matches_formula() {
    let c = bar_color(VisualPreset::Subtle, 50.0, 0.5);
    assert_eq!(c, Rgb { r: 50, g: 60, b: 86 });
}

#[test]
fn bars_are_bottom_anchored_and_tile_the_width() {
    let bins = [0u8, 10, 20, 40];
    let bars: Vec<_> = layout_bars(&bins, 400.0, 300.0, VisualPreset::Subtle).collect();
    assert_eq!(bars.len(), 4);
    for (i, bar) in bars.iter().enumerate() {
        assert_eq!(bar.width, 100.0);
        assert_eq!(bar.x, i as f32 * 100.0);
        assert!((bar.y + bar.height - 300.0).abs() < 1e-4);
        assert_eq!(bar.height, bins[i] as f32 * VisualPreset::Subtle.gain());
    }

    // Energetic doubles the height for the same magnitude.
    let loud: Vec<_> = layout_bars(&bins, 400.0, 300.0, VisualPreset::Energetic).collect();
    assert_eq!(loud[3].height, bars[3].height * 2.0);
}

#[test]
fn loudness_is_mean_over_normalizer_clamped() {
    assert_eq!(normalized_loudness(&[]), 0.0);
    assert_eq!(normalized_loudness(&[0; 8]), 0.0);
    assert!((normalized_loudness(&[64; 8]) - 0.5).abs() < 1e-6);
    assert_eq!(normalized_loudness(&[255; 8]), 1.0);
}

#[test]
fn render_without_source_draws_empty_spectrum() {
    let mut viz = VisualizerRenderer::new(VisualPreset::Subtle, 16);
    let mut s = surface(160.0, 90.0);
    let loudness = viz.render_frame(&mut s, None);
    assert_eq!(loudness, 0.0);
    assert_eq!(s.clears, vec!["#000".to_string()]);
    assert_eq!(s.rects.len(), 16);
    assert!(s.rects.iter().all(|r| r.3 == 0.0));
    assert!(viz.spectrum().bins().iter().all(|&b| b == 0));
}

#[test]
fn render_with_source_samples_once_per_frame() {
    let src = FixedSource::new(vec![128; 16]);
    let mut viz = VisualizerRenderer::new(VisualPreset::Energetic, 16);
    let mut s = surface(160.0, 90.0);

    let loudness = viz.render_frame(&mut s, Some(&src));
    assert_eq!(loudness, 1.0);
    assert_eq!(src.reads.get(), 1);
    viz.render_frame(&mut s, Some(&src));
    assert_eq!(src.reads.get(), 2);
}

#[test]
fn losing_the_source_zeroes_the_buffer() {
    let src = FixedSource::new(vec![90; 8]);
    let mut viz = VisualizerRenderer::new(VisualPreset::Subtle, 8);
    let mut s = surface(80.0, 40.0);
    viz.render_frame(&mut s, Some(&src));
    assert!(viz.spectrum().bins().iter().all(|&b| b == 90));
    viz.render_frame(&mut s, None);
    assert!(viz.spectrum().bins().iter().all(|&b| b == 0));
}

#[test]
fn spectrum_frame_ignores_repeat_sample_in_same_frame() {
    let src = FixedSource::new(vec![7; 4]);
    let mut frame = SpectrumFrame::with_bins(4);
    assert!(frame.sample(Some(&src), 1));
    assert!(!frame.sample(None, 1));
    // Second call in the same frame left the data alone.
    assert_eq!(frame.bins(), &[7, 7, 7, 7]);
    assert_eq!(src.reads.get(), 1);
}

#[test]
fn short_source_zero_fills_remaining_bins() {
    let src = FixedSource::new(vec![200; 3]);
    let mut frame = SpectrumFrame::with_bins(6);
    frame.sample(Some(&src), 1);
    assert_eq!(frame.bins(), &[200, 200, 200, 0, 0, 0]);
}

#[test]
fn atmosphere_mix_is_clamped() {
    let mut u = AtmosphereUniforms::default();
    atmosphere::apply(&mut u, 0.42);
    assert_eq!(u.mix_ratio, 0.42);
    atmosphere::apply(&mut u, 3.0);
    assert_eq!(u.mix_ratio, 1.0);
    atmosphere::apply(&mut u, -1.0);
    assert_eq!(u.mix_ratio, 0.0);
    atmosphere::apply(&mut u, 0.7);
    atmosphere::apply(&mut u, f32::NAN);
    assert_eq!(u.mix_ratio, 0.0);
}

#[test]
fn silence_leaves_atmosphere_at_base_color() {
    let mut viz = VisualizerRenderer::new(VisualPreset::Subtle, 8);
    let mut s = surface(80.0, 40.0);
    let mut u = AtmosphereUniforms::default();
    atmosphere::apply(&mut u, viz.render_frame(&mut s, None));
    assert_eq!(u.mix_ratio, 0.0);
    assert_eq!(u.color_a, [0.2, 0.533, 1.0]);
}
