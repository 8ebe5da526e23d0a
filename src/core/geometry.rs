//! Scene geometry: globe and atmosphere spheres, marker boxes, starfields.

use crate::core::constants::{
    MARKER_BOX_OFFSET, MARKER_BOX_SIZE, STARFIELD_COUNT, STARFIELD_DEPTH, STARFIELD_SPREAD,
};
use glam::{Mat4, Quat, Vec3};
use rand::prelude::*;

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct MeshVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
}

#[derive(Clone, Debug, Default)]
pub struct Mesh {
    pub vertices: Vec<MeshVertex>,
    pub indices: Vec<u32>,
}

/// Position on a sphere of `radius` for a latitude/longitude in degrees.
/// Longitude 0 faces +Z, north is +Y.
#[inline]
pub fn lat_lng_to_position(lat_deg: f32, lng_deg: f32, radius: f32) -> Vec3 {
    let lat = lat_deg.to_radians();
    let lng = lng_deg.to_radians();
    Vec3::new(
        radius * lat.cos() * lng.sin(),
        radius * lat.sin(),
        radius * lat.cos() * lng.cos(),
    )
}

/// UV sphere with `width_segments` x `height_segments` quads.
pub fn uv_sphere(radius: f32, width_segments: u32, height_segments: u32) -> Mesh {
    let ws = width_segments.max(3);
    let hs = height_segments.max(2);
    let mut vertices = Vec::with_capacity(((ws + 1) * (hs + 1)) as usize);
    for y in 0..=hs {
        let v = y as f32 / hs as f32;
        let theta = v * std::f32::consts::PI;
        for x in 0..=ws {
            let u = x as f32 / ws as f32;
            let phi = u * std::f32::consts::TAU;
            let n = Vec3::new(
                -phi.cos() * theta.sin(),
                theta.cos(),
                phi.sin() * theta.sin(),
            );
            vertices.push(MeshVertex {
                position: (n * radius).to_array(),
                normal: n.to_array(),
            });
        }
    }
    let row = ws + 1;
    let mut indices = Vec::with_capacity((ws * hs * 6) as usize);
    for y in 0..hs {
        for x in 0..ws {
            let a = y * row + x + 1;
            let b = y * row + x;
            let c = (y + 1) * row + x;
            let d = (y + 1) * row + x + 1;
            if y != 0 {
                indices.extend_from_slice(&[a, b, d]);
            }
            if y != hs - 1 {
                indices.extend_from_slice(&[b, c, d]);
            }
        }
    }
    Mesh { vertices, indices }
}

/// Axis-aligned box centred on the origin.
pub fn cuboid(size: [f32; 3]) -> Mesh {
    let h = Vec3::from(size) * 0.5;
    // (normal, up, side) with side x up == normal so each face winds CCW
    let faces: [(Vec3, Vec3, Vec3); 6] = [
        (Vec3::X, Vec3::Y, Vec3::NEG_Z),
        (Vec3::NEG_X, Vec3::Y, Vec3::Z),
        (Vec3::Y, Vec3::X, Vec3::Z),
        (Vec3::NEG_Y, Vec3::Z, Vec3::X),
        (Vec3::Z, Vec3::Y, Vec3::X),
        (Vec3::NEG_Z, Vec3::Y, Vec3::NEG_X),
    ];
    let mut mesh = Mesh::default();
    for (n, up, side) in faces {
        let base = mesh.vertices.len() as u32;
        for (su, sv) in [(-1.0, -1.0), (1.0, -1.0), (1.0, 1.0), (-1.0, 1.0)] {
            let p = (n + side * su + up * sv) * h;
            mesh.vertices.push(MeshVertex {
                position: p.to_array(),
                normal: n.to_array(),
            });
        }
        mesh.indices
            .extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    }
    mesh
}

pub fn marker_box() -> Mesh {
    cuboid(MARKER_BOX_SIZE)
}

/// Model matrix for a marker box anchored at `anchor` on the globe: local +Z
/// faces the globe centre, the box is pushed outward by `MARKER_BOX_OFFSET`,
/// then scaled (`scale` on all axes, `depth` extra on Z).
pub fn marker_model(anchor: Vec3, scale: f32, depth: f32) -> Mat4 {
    let inward = (-anchor).normalize_or_zero();
    let rot = if inward == Vec3::ZERO {
        Quat::IDENTITY
    } else {
        Quat::from_rotation_arc(Vec3::Z, inward)
    };
    Mat4::from_translation(anchor)
        * Mat4::from_quat(rot)
        * Mat4::from_scale(Vec3::new(scale, scale, scale * depth))
        * Mat4::from_translation(Vec3::new(0.0, 0.0, -MARKER_BOX_OFFSET))
}

/// `STARFIELD_COUNT` points spread over a slab behind (`mirror = false`) or in
/// front of (`mirror = true`) the camera. Deterministic for a given seed.
pub fn starfield(seed: u64, mirror: bool) -> Vec<[f32; 3]> {
    let mut rng = StdRng::seed_from_u64(seed);
    let sign = if mirror { -1.0 } else { 1.0 };
    (0..STARFIELD_COUNT)
        .map(|_| {
            let x = (rng.gen::<f32>() - 0.5) * STARFIELD_SPREAD * sign;
            let y = (rng.gen::<f32>() - 0.5) * STARFIELD_SPREAD * sign;
            let z = -rng.gen::<f32>() * STARFIELD_DEPTH * sign;
            [x, y, z]
        })
        .collect()
}
