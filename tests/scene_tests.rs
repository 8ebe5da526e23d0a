// Host-side tests for scene data: configuration, the track library, derived
// playback state, the audio session, geometry, picking and orbit controls.

use glam::{Quat, Vec2, Vec3};
use globe_player::core::config::ConfigError;
use globe_player::core::constants::{GLOBE_RADIUS, POLAR_MIN, STARFIELD_COUNT};
use globe_player::core::geometry::{
    cuboid, lat_lng_to_position, marker_model, starfield, uv_sphere,
};
use globe_player::core::orbit::OrbitState;
use globe_player::core::picking::{marker_center, pick_marker, ray_sphere, to_ndc};
use globe_player::core::playback::{MediaSnapshot, PlaybackState};
use globe_player::core::session::AudioSession;
use globe_player::core::track::resolve_url;
use globe_player::core::{
    classify, MarkerVisualState, SceneConfig, TrackId, TrackLibrary, VisualPreset,
};

const PAGE: &str = "https://example.com/index.html";

fn close(a: Vec3, b: Vec3) -> bool {
    (a - b).length() < 1e-4
}

// ---- config ----

#[test]
fn default_scene_is_valid() {
    let cfg = SceneConfig::default();
    cfg.validate().unwrap();
    let keys: Vec<_> = cfg.markers.iter().map(|m| m.location.as_str()).collect();
    assert_eq!(
        keys,
        ["paris", "london", "lisbon", "bushwick", "oakland", "sydney"]
    );
    assert_eq!(cfg.preset, VisualPreset::Subtle);
    assert_eq!(cfg.api.trial_allowance, 3);
}

#[test]
fn partial_json_keeps_defaults() {
    let cfg = SceneConfig::from_json(r#"{"preset":"energetic","api":{"offline":true}}"#).unwrap();
    assert_eq!(cfg.preset, VisualPreset::Energetic);
    assert!(cfg.api.offline);
    assert_eq!(cfg.api.base_url, "");
    assert_eq!(cfg.markers.len(), 6);
}

#[test]
fn invalid_configs_are_rejected() {
    assert!(matches!(
        SceneConfig::from_json(r#"{"markers":[]}"#),
        Err(ConfigError::NoMarkers)
    ));

    let dup = r#"{"markers":[
        {"lat":0,"lng":0,"title":"a","location":"x","audio":"/a.mp3"},
        {"lat":1,"lng":1,"title":"b","location":"x","audio":"/b.mp3"}
    ]}"#;
    assert!(matches!(
        SceneConfig::from_json(dup),
        Err(ConfigError::DuplicateLocation(k)) if k == "x"
    ));

    let color = r##"{"materialStates":{
        "default":{"color":"#FF4B6C","opacity":0.8,"scale":1.0},
        "hover":{"color":"white","opacity":1.0,"scale":1.5},
        "active":{"color":"#FFD700","opacity":1.0,"scale":1.8}
    }}"##;
    assert!(matches!(
        SceneConfig::from_json(color),
        Err(ConfigError::InvalidColor(c)) if c == "white"
    ));

    assert!(matches!(
        SceneConfig::from_json("not json"),
        Err(ConfigError::Json(_))
    ));
}

// ---- tracks ----

#[test]
fn urls_resolve_like_a_browser() {
    assert_eq!(
        resolve_url(PAGE, "/paris.mp3"),
        "https://example.com/paris.mp3"
    );
    assert_eq!(
        resolve_url("https://example.com/app/index.html?x=1#top", "audio/a.mp3"),
        "https://example.com/app/audio/a.mp3"
    );
    assert_eq!(
        resolve_url("https://example.com/app/", "./a.mp3"),
        "https://example.com/app/a.mp3"
    );
    assert_eq!(
        resolve_url(PAGE, "//cdn.example.net/a.mp3"),
        "https://cdn.example.net/a.mp3"
    );
    assert_eq!(resolve_url("https://example.com", "a.mp3"), "https://example.com/a.mp3");
    assert_eq!(
        resolve_url(PAGE, "https://other.org/x.mp3"),
        "https://other.org/x.mp3"
    );
}

#[test]
fn urls_drop_dot_segments_and_percent_encode() {
    let app = "https://example.com/app/index.html";
    assert_eq!(resolve_url(app, "../paris.mp3"), "https://example.com/paris.mp3");
    assert_eq!(
        resolve_url(app, "audio/../mixes/./a.mp3"),
        "https://example.com/app/mixes/a.mp3"
    );
    // More ".." than segments stops at the root.
    assert_eq!(resolve_url(app, "../../../a.mp3"), "https://example.com/a.mp3");
    assert_eq!(
        resolve_url(app, "audio/summer in lisbon.mp3"),
        "https://example.com/app/audio/summer%20in%20lisbon.mp3"
    );
    assert_eq!(
        resolve_url(app, "/café.mp3"),
        "https://example.com/caf%C3%A9.mp3"
    );
    // Already-escaped input is left alone.
    assert_eq!(
        resolve_url(app, "/summer%20in%20lisbon.mp3"),
        "https://example.com/summer%20in%20lisbon.mp3"
    );
    assert_eq!(
        resolve_url(app, "a b.mp3?v=1 2#t=1 2"),
        "https://example.com/app/a%20b.mp3?v=1%202#t=1%202"
    );
    assert_eq!(
        resolve_url(PAGE, "https://other.org/x/../y.mp3"),
        "https://other.org/y.mp3"
    );
    assert_eq!(resolve_url(PAGE, "  "), "");
}

#[test]
fn rewritten_src_still_lights_its_marker() {
    let json = r#"{"markers":[
        {"lat":38.7,"lng":-9.1,"title":"summer in lisbon","location":"lisbon","audio":"audio/summer in lisbon.mp3"},
        {"lat":48.8,"lng":2.3,"title":"6am in Paris","location":"paris","audio":"../paris.mp3"}
    ]}"#;
    let cfg = SceneConfig::from_json(json).unwrap();
    let lib = TrackLibrary::from_markers(&cfg.markers, "https://example.com/app/index.html");

    // What the media element reports after `src` is set.
    let lisbon_src = "https://example.com/app/audio/summer%20in%20lisbon.mp3";
    let paris_src = "https://example.com/paris.mp3";

    let lisbon = lib.track_for_src(lisbon_src).unwrap();
    assert_eq!(lisbon.id, TrackId::new("lisbon"));
    assert_eq!(
        classify(lisbon, lisbon_src, false, false),
        MarkerVisualState::Active
    );
    assert_eq!(
        lib.track_for_src(paris_src).unwrap().id,
        TrackId::new("paris")
    );

    let media = MediaSnapshot {
        src: lisbon_src.into(),
        ready_state: 4,
        ..Default::default()
    };
    let state = PlaybackState::derive(&media, &lib);
    assert_eq!(state.current_track, Some(TrackId::new("lisbon")));
    assert_eq!(state.auto_rotate_speed(), 0.2);
}

#[test]
fn custom_resolver_sets_track_urls() {
    let lib = TrackLibrary::from_markers_with(&SceneConfig::default().markers, |audio| {
        format!("https://cdn.example.net{}", audio)
    });
    assert_eq!(
        lib.by_marker(globe_player::core::MarkerId(0)).unwrap().url,
        "https://cdn.example.net/paris.mp3"
    );
}

#[test]
fn library_matches_src_exactly() {
    let lib = TrackLibrary::from_markers(&SceneConfig::default().markers, PAGE);
    assert_eq!(lib.len(), 6);
    assert!(lib.track_for_src("").is_none());
    assert!(lib.track_for_src("https://example.com/paris.mp").is_none());
    let t = lib.track_for_src("https://example.com/memorylane.mp3").unwrap();
    assert_eq!(t.id, TrackId::new("london"));
    assert_eq!(lib.get(&TrackId::new("sydney")).unwrap().title, "skyclub");
    assert!((t.anchor(GLOBE_RADIUS).length() - GLOBE_RADIUS).abs() < 1e-4);
}

// ---- playback state ----

#[test]
fn playback_state_follows_media_element() {
    let lib = TrackLibrary::from_markers(&SceneConfig::default().markers, PAGE);

    let idle = PlaybackState::derive(&MediaSnapshot::default(), &lib);
    assert!(idle.is_idle());
    assert_eq!(idle.current_track, None);
    assert_eq!(idle.auto_rotate_speed(), 0.5);

    let mut media = MediaSnapshot {
        src: "https://example.com/paris.mp3".into(),
        paused: true,
        ready_state: 1,
        ..Default::default()
    };
    let loading = PlaybackState::derive(&media, &lib);
    assert!(loading.is_loading && !loading.is_playing);
    assert_eq!(loading.auto_rotate_speed(), 0.2);

    media.paused = false;
    media.ready_state = 4;
    let playing = PlaybackState::derive(&media, &lib);
    assert!(playing.is_playing && !playing.is_loading);
    assert_eq!(playing.current_track, Some(TrackId::new("paris")));

    // Paused after loading is idle again.
    media.paused = true;
    assert!(PlaybackState::derive(&media, &lib).is_idle());

    media.paused = false;
    media.ended = true;
    assert!(!PlaybackState::derive(&media, &lib).is_playing);

    // A failed load does not spin as "loading" forever.
    let failed = MediaSnapshot {
        src: "https://example.com/paris.mp3".into(),
        paused: true,
        has_error: true,
        ..Default::default()
    };
    assert!(PlaybackState::derive(&failed, &lib).is_idle());

    // Sources outside the library are ignored.
    let foreign = MediaSnapshot {
        src: "https://example.com/other.mp3".into(),
        ..Default::default()
    };
    assert!(PlaybackState::derive(&foreign, &lib).is_idle());
}

// ---- audio session ----

#[test]
fn graph_is_built_once() {
    let mut session: AudioSession<u32> = AudioSession::new();
    assert!(session.graph().is_none());
    let mut builds = 0;
    for _ in 0..3 {
        let g = session.ensure_graph(|| {
            builds += 1;
            Ok::<_, String>(7)
        });
        assert_eq!(g, Some(&7));
    }
    assert_eq!(builds, 1);
    assert!(session.is_built());
}

#[test]
fn failed_graph_is_never_retried() {
    let mut session: AudioSession<u32> = AudioSession::default();
    let mut builds = 0;
    assert!(session
        .ensure_graph(|| {
            builds += 1;
            Err::<u32, _>("no audio context")
        })
        .is_none());
    assert!(session.is_unavailable());
    assert!(session
        .ensure_graph(|| {
            builds += 1;
            Ok::<_, String>(1)
        })
        .is_none());
    assert_eq!(builds, 1);
}

// ---- geometry ----

#[test]
fn lat_lng_maps_to_sphere_axes() {
    assert!(close(lat_lng_to_position(0.0, 0.0, 5.0), Vec3::new(0.0, 0.0, 5.0)));
    assert!(close(lat_lng_to_position(90.0, 0.0, 5.0), Vec3::new(0.0, 5.0, 0.0)));
    assert!(close(lat_lng_to_position(0.0, 90.0, 5.0), Vec3::new(5.0, 0.0, 0.0)));
    let paris = lat_lng_to_position(48.8566, 2.3522, 5.0);
    assert!((paris.length() - 5.0).abs() < 1e-4);
    assert!(paris.y > 0.0);
}

#[test]
fn sphere_mesh_counts() {
    let m = uv_sphere(5.0, 50, 50);
    assert_eq!(m.vertices.len(), 51 * 51);
    // Pole rows drop their degenerate triangle.
    assert_eq!(m.indices.len(), 50 * 50 * 6 - 2 * 50 * 3);
    assert!(m.indices.iter().all(|&i| (i as usize) < m.vertices.len()));
    for v in &m.vertices {
        assert!((Vec3::from(v.position).length() - 5.0).abs() < 1e-4);
    }
}

#[test]
fn cuboid_has_six_faces() {
    let m = cuboid([0.4, 0.4, 1.0]);
    assert_eq!(m.vertices.len(), 24);
    assert_eq!(m.indices.len(), 36);
    for v in &m.vertices {
        let p = Vec3::from(v.position).abs();
        assert!(p.x <= 0.2 + 1e-6 && p.y <= 0.2 + 1e-6 && p.z <= 0.5 + 1e-6);
    }
}

#[test]
fn marker_box_sits_where_it_is_picked() {
    for (lat, lng) in [(48.8566, 2.3522), (-33.8688, 151.2093), (0.0, 0.0)] {
        let anchor = lat_lng_to_position(lat, lng, GLOBE_RADIUS);
        let centre = marker_model(anchor, 1.0, 1.0).transform_point3(Vec3::ZERO);
        assert!(close(centre, marker_center(anchor, Quat::IDENTITY)));
        assert!(centre.length() > GLOBE_RADIUS);
    }
}

#[test]
fn starfield_is_seeded_and_mirrored() {
    let a = starfield(42, false);
    assert_eq!(a.len(), STARFIELD_COUNT);
    assert_eq!(a, starfield(42, false));
    assert!(a.iter().all(|p| p[2] <= 0.0));
    let b = starfield(42, true);
    assert_eq!(b[0], [-a[0][0], -a[0][1], -a[0][2]]);
}

// ---- picking ----

#[test]
fn ray_sphere_hits_and_misses() {
    let hit = ray_sphere(Vec3::ZERO, Vec3::Z, Vec3::new(0.0, 0.0, 5.0), 2.0);
    assert!((hit.unwrap() - 3.0).abs() < 1e-5);
    assert!(ray_sphere(Vec3::ZERO, Vec3::X, Vec3::new(0.0, 0.0, 5.0), 2.0).is_none());
    // Sphere behind the origin.
    assert!(ray_sphere(Vec3::ZERO, Vec3::Z, Vec3::new(0.0, 0.0, -5.0), 2.0).is_none());
}

#[test]
fn ndc_covers_the_canvas() {
    assert_eq!(to_ndc(0.0, 0.0, 200.0, 100.0), Vec2::new(-1.0, 1.0));
    assert_eq!(to_ndc(100.0, 50.0, 200.0, 100.0), Vec2::new(0.0, 0.0));
    assert_eq!(to_ndc(200.0, 100.0, 200.0, 100.0), Vec2::new(1.0, -1.0));
}

#[test]
fn front_marker_is_picked_and_far_side_is_occluded() {
    let camera = OrbitState::default().camera(1.0);
    let front = lat_lng_to_position(0.0, 0.0, GLOBE_RADIUS);
    let back = lat_lng_to_position(0.0, 180.0, GLOBE_RADIUS);
    let centre = Vec2::ZERO;

    assert_eq!(pick_marker(&camera, Quat::IDENTITY, &[back, front], centre), Some(1));
    assert_eq!(pick_marker(&camera, Quat::IDENTITY, &[back], centre), None);
    assert_eq!(
        pick_marker(&camera, Quat::IDENTITY, &[front], Vec2::new(0.9, 0.9)),
        None
    );

    // Spinning the globe half a turn brings the far marker round.
    let half = Quat::from_rotation_y(std::f32::consts::PI);
    assert_eq!(pick_marker(&camera, half, &[back], centre), Some(0));
}

// ---- orbit ----

#[test]
fn auto_rotation_speed_scales_with_factor() {
    let mut orbit = OrbitState::default();
    assert!(close(orbit.eye(), Vec3::new(0.0, 0.0, 15.0)));
    // Speed 1.0 is one orbit per minute, so 15 s is a quarter turn.
    orbit.update(15.0, 1.0);
    assert!(close(orbit.eye(), Vec3::new(15.0, 0.0, 0.0)));

    let mut slow = OrbitState::default();
    slow.update(15.0, 0.2);
    assert!((slow.azimuth - std::f32::consts::FRAC_PI_2 * 0.2).abs() < 1e-5);
}

#[test]
fn drag_eases_group_rotation() {
    let mut orbit = OrbitState::default();
    orbit.drag_to(50.0, 0.0);
    assert_eq!(orbit.group_rotation(), Quat::IDENTITY);

    orbit.begin_drag(0.0, 0.0);
    assert!(orbit.is_dragging());
    orbit.drag_to(100.0, 0.0);
    orbit.end_drag();
    assert!(!orbit.is_dragging());

    orbit.update(0.1, 0.0);
    let early = orbit.group_rotation().to_euler(glam::EulerRot::YXZ).0;
    assert!(early > 0.0 && early < 0.5);
    for _ in 0..100 {
        orbit.update(0.1, 0.0);
    }
    let settled = orbit.group_rotation().to_euler(glam::EulerRot::YXZ).0;
    assert!((settled - 0.5).abs() < 1e-3);
}

#[test]
fn drag_tilt_is_clamped() {
    let mut orbit = OrbitState::default();
    orbit.begin_drag(0.0, 0.0);
    orbit.drag_to(0.0, 10_000.0);
    orbit.end_drag();
    for _ in 0..200 {
        orbit.update(0.1, 0.0);
    }
    let pitch = orbit.group_rotation().to_euler(glam::EulerRot::YXZ).1;
    assert!((pitch - std::f32::consts::PI * 0.3).abs() < 1e-3);
}

#[test]
fn polar_angle_is_clamped() {
    let mut orbit = OrbitState::default();
    orbit.polar = 0.0;
    orbit.update(0.0, 0.0);
    assert_eq!(orbit.polar, POLAR_MIN);
}
