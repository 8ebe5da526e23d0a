use crate::core::constants::{GLOBE_RADIUS, MARKER_BOX_OFFSET, MARKER_PICK_RADIUS};
use crate::core::orbit::Camera;
use glam::{Quat, Vec2, Vec3, Vec4};

#[inline]
pub fn ray_sphere(ray_origin: Vec3, ray_dir: Vec3, center: Vec3, radius: f32) -> Option<f32> {
    let oc = ray_origin - center;
    let b = oc.dot(ray_dir);
    let c = oc.dot(oc) - radius * radius;
    let disc = b * b - c;
    if disc < 0.0 {
        return None;
    }
    let t = -b - disc.sqrt();
    (t >= 0.0).then_some(t)
}

/// Normalized device coordinates for a point in a `width` x `height` area.
#[inline]
pub fn to_ndc(x: f32, y: f32, width: f32, height: f32) -> Vec2 {
    Vec2::new(
        (x / width.max(1.0)) * 2.0 - 1.0,
        -(y / height.max(1.0)) * 2.0 + 1.0,
    )
}

/// World-space ray through `ndc`. Returns `(origin, direction)`.
pub fn camera_ray(camera: &Camera, ndc: Vec2) -> (Vec3, Vec3) {
    let inv = camera.view_proj().inverse();
    let p_far = inv * Vec4::new(ndc.x, ndc.y, 1.0, 1.0);
    let p1: Vec3 = p_far.truncate() / p_far.w;
    let ro = camera.eye;
    let rd = (p1 - ro).normalize_or_zero();
    (ro, rd)
}

/// Index of the nearest marker hit by the ray. Markers behind the globe
/// (`occluder` centre and radius) are not pickable.
pub fn nearest_hit(
    ray_origin: Vec3,
    ray_dir: Vec3,
    centers: impl IntoIterator<Item = Vec3>,
    pick_radius: f32,
    occluder: Option<(Vec3, f32)>,
) -> Option<usize> {
    let occluded_at = occluder.and_then(|(c, r)| ray_sphere(ray_origin, ray_dir, c, r));
    let mut best = None::<(usize, f32)>;
    for (i, center) in centers.into_iter().enumerate() {
        if let Some(t) = ray_sphere(ray_origin, ray_dir, center, pick_radius) {
            if occluded_at.is_some_and(|ot| ot < t) {
                continue;
            }
            match best {
                Some((_, bt)) if t >= bt => {}
                _ => best = Some((i, t)),
            }
        }
    }
    best.map(|(i, _)| i)
}

/// Pick centre of the marker box anchored at `anchor`, after the globe
/// group rotation.
#[inline]
pub fn marker_center(anchor: Vec3, group: Quat) -> Vec3 {
    group * (anchor * (1.0 + MARKER_BOX_OFFSET / GLOBE_RADIUS))
}

/// Marker under `ndc`, with the globe occluding markers on its far side.
pub fn pick_marker(camera: &Camera, group: Quat, anchors: &[Vec3], ndc: Vec2) -> Option<usize> {
    let (ro, rd) = camera_ray(camera, ndc);
    nearest_hit(
        ro,
        rd,
        anchors.iter().map(|a| marker_center(*a, group)),
        MARKER_PICK_RADIUS,
        Some((Vec3::ZERO, GLOBE_RADIUS)),
    )
}
