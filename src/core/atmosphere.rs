use crate::core::constants::{ATMOSPHERE_COLOR_A, ATMOSPHERE_COLOR_B};

/// Anything holding the atmosphere shader's mix-ratio uniform.
pub trait AtmosphereUniform {
    fn set_mix_ratio(&mut self, value: f32);
}

/// Atmosphere uniform block, laid out to match `atmosphere` in `globe.wgsl`.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct AtmosphereUniforms {
    pub color_a: [f32; 3],
    pub mix_ratio: f32,
    pub color_b: [f32; 3],
    pub _pad: f32,
}

impl Default for AtmosphereUniforms {
    fn default() -> Self {
        Self {
            color_a: ATMOSPHERE_COLOR_A,
            mix_ratio: 0.0,
            color_b: ATMOSPHERE_COLOR_B,
            _pad: 0.0,
        }
    }
}

impl AtmosphereUniform for AtmosphereUniforms {
    fn set_mix_ratio(&mut self, value: f32) {
        self.mix_ratio = value;
    }
}

/// Write the loudness scalar straight into the uniform. The analyser already
/// smooths over time, so no interpolation happens here.
#[inline]
pub fn apply<U: AtmosphereUniform + ?Sized>(uniform: &mut U, scalar: f32) {
    let v = if scalar.is_finite() {
        scalar.clamp(0.0, 1.0)
    } else {
        0.0
    };
    uniform.set_mix_ratio(v);
}
