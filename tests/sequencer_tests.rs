// Host-side tests for the track load/play sequencer.

use globe_player::core::playback::{MediaSnapshot, PlaybackState};
use globe_player::core::{
    classify, Command, MarkerId, MarkerVisualState, PlaybackError, SceneConfig, Sequencer,
    SequencerState, Track, TrackLibrary,
};

const PAGE: &str = "https://example.com/index.html";

fn library() -> TrackLibrary {
    TrackLibrary::from_markers(&SceneConfig::default().markers, PAGE)
}

fn track(lib: &TrackLibrary, key: &str) -> Track {
    lib.iter()
        .find(|t| t.id.as_str() == key)
        .cloned()
        .unwrap()
}

fn attempt_of(cmds: &[Command]) -> globe_player::core::LoadAttempt {
    cmds.iter()
        .find_map(|c| match c {
            Command::ArmListeners(a) => Some(*a),
            _ => None,
        })
        .unwrap()
}

#[test]
fn select_without_consent_only_shows_dialog() {
    let lib = library();
    let mut seq = Sequencer::new(false);
    let cmds = seq.select(&track(&lib, "paris"));
    assert_eq!(cmds, vec![Command::ShowConsentDialog]);
    assert_eq!(*seq.state(), SequencerState::Idle);
    assert!(!cmds.iter().any(|c| matches!(c, Command::SetSource { .. })));
    assert!(!cmds.iter().any(|c| matches!(c, Command::Play(_))));
}

#[test]
fn granting_consent_unblocks_selection() {
    let lib = library();
    let mut seq = Sequencer::new(false);
    seq.select(&track(&lib, "paris"));
    seq.set_consent_granted(true);
    let cmds = seq.select(&track(&lib, "paris"));
    assert!(cmds.contains(&Command::ShowLoading));
    assert_eq!(seq.state().name(), "loading");
}

#[test]
fn select_arms_listeners_before_setting_source() {
    let lib = library();
    let mut seq = Sequencer::new(true);
    let paris = track(&lib, "paris");
    let cmds = seq.select(&paris);
    let a = attempt_of(&cmds);
    assert_eq!(
        cmds,
        vec![
            Command::ArmListeners(a),
            Command::ShowLoading,
            Command::SetSource {
                attempt: a,
                url: "https://example.com/paris.mp3".to_string(),
            },
        ]
    );
}

#[test]
fn paris_click_reaches_playing_and_marker_goes_active() {
    let lib = library();
    let mut seq = Sequencer::new(true);
    let paris = track(&lib, "paris");

    let cmds = seq.select(&paris);
    let a = attempt_of(&cmds);
    let src = cmds
        .iter()
        .find_map(|c| match c {
            Command::SetSource { url, .. } => Some(url.clone()),
            _ => None,
        })
        .unwrap();

    let cmds = seq.on_can_play(a);
    assert_eq!(
        cmds,
        vec![
            Command::DisarmListeners(a),
            Command::HideLoading,
            Command::EnsureGraph,
            Command::Play(a),
        ]
    );
    assert!(matches!(seq.state(), SequencerState::Ready { .. }));

    // Media element now has the source and is playing.
    let media = MediaSnapshot {
        src,
        paused: false,
        ready_state: 4,
        ..Default::default()
    };
    assert_eq!(media.src, paris.url);

    let cmds = seq.on_play_resolved(a);
    assert_eq!(
        cmds,
        vec![
            Command::ShowNowPlaying {
                title: "6am in Paris".to_string(),
                location: "paris".to_string(),
            },
            Command::Resolve(a),
        ]
    );
    assert!(matches!(seq.state(), SequencerState::Playing { .. }));

    let state = PlaybackState::derive(&media, &lib);
    assert_eq!(state.current_track.as_ref(), Some(&paris.id));
    assert!(state.is_playing);

    for t in lib.iter() {
        let visual = classify(t, &media.src, media.paused, false);
        if t.id == paris.id {
            assert_eq!(visual, MarkerVisualState::Active);
        } else {
            assert_eq!(visual, MarkerVisualState::Default);
        }
    }
}

#[test]
fn newer_selection_supersedes_in_flight_load() {
    let lib = library();
    let mut seq = Sequencer::new(true);

    let first = seq.select(&track(&lib, "paris"));
    let a = attempt_of(&first);
    let second = seq.select(&track(&lib, "london"));
    let b = attempt_of(&second);
    assert_ne!(a, b);
    assert_eq!(second[0], Command::DisarmListeners(a));
    assert_eq!(second[1], Command::Reject(a, PlaybackError::Superseded));

    // Late canplay from the first load is ignored.
    assert!(seq.on_can_play(a).is_empty());
    assert_eq!(seq.state().track().unwrap().id.as_str(), "london");

    seq.on_can_play(b);
    let cmds = seq.on_play_resolved(b);
    assert!(cmds.contains(&Command::ShowNowPlaying {
        title: "memory lane".to_string(),
        location: "london".to_string(),
    }));
}

#[test]
fn superseded_play_resolution_does_not_show_old_track() {
    let lib = library();
    let mut seq = Sequencer::new(true);

    let a = attempt_of(&seq.select(&track(&lib, "paris")));
    seq.on_can_play(a);
    // Play promise for paris is pending when lisbon is clicked.
    let b = attempt_of(&seq.select(&track(&lib, "lisbon")));

    let late = seq.on_play_resolved(a);
    assert!(late.is_empty());
    assert!(matches!(seq.state(), SequencerState::Loading { attempt, .. } if *attempt == b));
}

#[test]
fn load_error_fails_and_rejects() {
    let lib = library();
    let mut seq = Sequencer::new(true);
    let oakland = track(&lib, "oakland");
    let a = attempt_of(&seq.select(&oakland));

    let cmds = seq.on_load_error(a);
    let err = PlaybackError::LoadFailed(oakland.id.clone());
    assert_eq!(
        cmds,
        vec![
            Command::DisarmListeners(a),
            Command::HideLoading,
            Command::Reject(a, err.clone()),
        ]
    );
    assert_eq!(
        *seq.state(),
        SequencerState::Failed {
            track: oakland,
            error: err,
        }
    );
    assert_eq!(seq.armed_attempt(), None);
}

#[test]
fn play_rejection_fails_with_reason() {
    let lib = library();
    let mut seq = Sequencer::new(true);
    let a = attempt_of(&seq.select(&track(&lib, "sydney")));
    seq.on_can_play(a);

    let cmds = seq.on_play_rejected(a, "NotAllowedError");
    assert_eq!(cmds[0], Command::HideLoading);
    match &cmds[1] {
        Command::Reject(r, PlaybackError::PlayRejected { track, reason }) => {
            assert_eq!(*r, a);
            assert_eq!(track.as_str(), "sydney");
            assert_eq!(reason, "NotAllowedError");
        }
        other => panic!("unexpected {:?}", other),
    }
    assert_eq!(seq.state().name(), "failed");
}

#[test]
fn failed_track_can_be_selected_again() {
    let lib = library();
    let mut seq = Sequencer::new(true);
    let a = attempt_of(&seq.select(&track(&lib, "paris")));
    seq.on_load_error(a);

    let cmds = seq.select(&track(&lib, "paris"));
    // Nothing in flight, so nothing to supersede.
    assert!(!cmds
        .iter()
        .any(|c| matches!(c, Command::Reject(_, PlaybackError::Superseded))));
    assert_eq!(seq.state().name(), "loading");
}

#[test]
fn track_without_source_fails_immediately() {
    let mut seq = Sequencer::new(true);
    let mut silent = track(&library(), "bushwick");
    silent.url.clear();

    let cmds = seq.select(&silent);
    assert_eq!(cmds.len(), 2);
    assert_eq!(cmds[0], Command::HideLoading);
    assert!(matches!(
        &cmds[1],
        Command::Reject(_, PlaybackError::NoSource(id)) if id.as_str() == "bushwick"
    ));
    assert!(!cmds.iter().any(|c| matches!(c, Command::SetSource { .. })));
}

#[test]
fn ended_returns_to_idle() {
    let lib = library();
    let mut seq = Sequencer::new(true);
    let a = attempt_of(&seq.select(&track(&lib, "paris")));
    seq.on_can_play(a);
    seq.on_play_resolved(a);

    assert!(seq.on_ended().is_empty());
    assert_eq!(*seq.state(), SequencerState::Idle);

    // Ended outside Playing changes nothing.
    let b = attempt_of(&seq.select(&track(&lib, "london")));
    seq.on_ended();
    assert_eq!(seq.armed_attempt(), Some(b));
}

#[test]
fn marker_ids_follow_library_order() {
    let lib = library();
    assert_eq!(lib.by_marker(MarkerId(0)).unwrap().id.as_str(), "paris");
    assert_eq!(lib.by_marker(MarkerId(5)).unwrap().id.as_str(), "sydney");
    assert!(lib.by_marker(MarkerId(6)).is_none());
}
