//! Executes sequencer commands against the page: the `<audio>` element, the
//! audio graph, the loading/now-playing overlays and the JS promise handed
//! back to whoever asked for a track.

use crate::audio::{self, WebGraph};
use crate::core::playback::MediaSnapshot;
use crate::core::session::AudioSession;
use crate::core::{Command, LoadAttempt, MarkerId, PlaybackError, Sequencer, TrackLibrary};
use crate::media::{AttemptListeners, Media};
use crate::overlay;
use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::rc::{Rc, Weak};
use wasm_bindgen::JsValue;
use wasm_bindgen_futures::{spawn_local, JsFuture};
use web_sys as web;

pub type SharedPlayer = Rc<RefCell<Player>>;

struct Settle {
    resolve: js_sys::Function,
    reject: js_sys::Function,
}

pub struct Player {
    document: web::Document,
    media: Media,
    library: Rc<TrackLibrary>,
    sequencer: Sequencer,
    session: AudioSession<WebGraph>,
    listeners: HashMap<LoadAttempt, AttemptListeners>,
    pending: HashMap<LoadAttempt, Settle>,
}

impl Player {
    pub fn new(
        document: web::Document,
        media: Media,
        library: Rc<TrackLibrary>,
        consent_granted: bool,
    ) -> Self {
        Self {
            document,
            media,
            library,
            sequencer: Sequencer::new(consent_granted),
            session: AudioSession::new(),
            listeners: HashMap::new(),
            pending: HashMap::new(),
        }
    }

    pub fn library(&self) -> &Rc<TrackLibrary> {
        &self.library
    }

    pub fn snapshot(&self) -> MediaSnapshot {
        self.media.snapshot()
    }

    pub fn graph(&self) -> Option<&WebGraph> {
        self.session.graph()
    }

    pub fn set_consent_granted(&mut self, granted: bool) {
        self.sequencer.set_consent_granted(granted);
    }
}

/// Wire the persistent media listeners. Call once after construction.
pub fn wire_media_events(player: &SharedPlayer) {
    let media = player.borrow().media.clone();

    let p = Rc::downgrade(player);
    media.on("ended", move || {
        if let Some(p) = p.upgrade() {
            let cmds = p.borrow_mut().sequencer.on_ended();
            run(&p, cmds);
        }
    });

    let p = Rc::downgrade(player);
    media.on("progress", move || {
        if let Some(p) = p.upgrade() {
            let pl = p.borrow();
            if pl.sequencer.state().name() == "loading" {
                if let Some(pct) = pl.media.buffered_percent() {
                    overlay::set_loading_progress(&pl.document, pct);
                }
            }
        }
    });

    media.on("play", || log::debug!("[media] play"));
    media.on("pause", || log::debug!("[media] pause"));
}

/// Start playing the track bound to `marker`. Returns the promise for this
/// selection, or `None` when nothing was started (unknown marker, consent
/// gate shown).
pub fn select_marker(player: &SharedPlayer, marker: MarkerId) -> Option<js_sys::Promise> {
    let cmds = {
        let mut p = player.borrow_mut();
        let track = match p.library.by_marker(marker) {
            Some(t) => t.clone(),
            None => {
                log::warn!("[player] no track for marker {}", marker.0);
                return None;
            }
        };
        // Still inside the user gesture: a suspended context may resume now.
        if let Some(g) = p.session.graph() {
            g.resume();
        }
        p.sequencer.select(&track)
    };
    run(player, cmds)
}

fn run(player: &SharedPlayer, cmds: Vec<Command>) -> Option<js_sys::Promise> {
    let mut queue: VecDeque<Command> = cmds.into();
    let mut promise = None;
    while let Some(cmd) = queue.pop_front() {
        match cmd {
            Command::ShowConsentDialog => overlay::show_consent(&player.borrow().document),
            Command::ShowLoading => {
                let p = player.borrow();
                overlay::set_loading_progress(&p.document, 0.0);
                overlay::show_loading(&p.document);
            }
            Command::HideLoading => overlay::hide_loading(&player.borrow().document),
            Command::ArmListeners(attempt) => {
                let listeners = arm(player, attempt);
                let mut settle = None;
                let pr = js_sys::Promise::new(&mut |resolve, reject| {
                    settle = Some(Settle { resolve, reject });
                });
                let mut p = player.borrow_mut();
                p.listeners.insert(attempt, listeners);
                if let Some(s) = settle {
                    p.pending.insert(attempt, s);
                }
                promise = Some(pr);
            }
            Command::DisarmListeners(attempt) => {
                let removed = player.borrow_mut().listeners.remove(&attempt);
                if let Some(l) = removed {
                    l.disarm();
                }
            }
            Command::SetSource { attempt, url } => {
                log::info!("[player] attempt {} src={}", attempt.id(), url);
                player.borrow().media.set_src(&url);
            }
            Command::EnsureGraph => {
                let mut p = player.borrow_mut();
                let el = p.media.element().clone();
                if let Some(g) = p.session.ensure_graph(|| audio::build_graph(&el)) {
                    g.resume();
                }
            }
            Command::Play(attempt) => {
                let started = player.borrow().media.play();
                match started {
                    Ok(pr) => {
                        let weak = Rc::downgrade(player);
                        spawn_local(async move {
                            let outcome = JsFuture::from(pr).await;
                            settle_play(weak, attempt, outcome);
                        });
                    }
                    Err(e) => {
                        let more = player
                            .borrow_mut()
                            .sequencer
                            .on_play_rejected(attempt, &format!("{:?}", e));
                        queue.extend(more);
                    }
                }
            }
            Command::ShowNowPlaying { title, location } => {
                overlay::show_now_playing(&player.borrow().document, &title, &location)
            }
            Command::Resolve(attempt) => {
                let settle = player.borrow_mut().pending.remove(&attempt);
                if let Some(s) = settle {
                    _ = s.resolve.call0(&JsValue::NULL);
                }
            }
            Command::Reject(attempt, err) => {
                let settle = player.borrow_mut().pending.remove(&attempt);
                match settle {
                    Some(s) => {
                        _ = s
                            .reject
                            .call1(&JsValue::NULL, &JsValue::from_str(&err.to_string()));
                    }
                    // Rejected before a promise existed (no source): report here.
                    None => log::error!("[player] {}", err),
                }
            }
        }
    }
    promise
}

fn arm(player: &SharedPlayer, attempt: LoadAttempt) -> AttemptListeners {
    let media = player.borrow().media.clone();
    let on_ready = Rc::downgrade(player);
    let on_error = Rc::downgrade(player);
    AttemptListeners::arm(
        &media,
        move || {
            if let Some(p) = on_ready.upgrade() {
                let cmds = p.borrow_mut().sequencer.on_can_play(attempt);
                run(&p, cmds);
            }
        },
        move || {
            if let Some(p) = on_error.upgrade() {
                let cmds = p.borrow_mut().sequencer.on_load_error(attempt);
                run(&p, cmds);
            }
        },
    )
}

fn settle_play(weak: Weak<RefCell<Player>>, attempt: LoadAttempt, outcome: Result<JsValue, JsValue>) {
    let Some(p) = weak.upgrade() else {
        return;
    };
    let cmds = match outcome {
        Ok(_) => p.borrow_mut().sequencer.on_play_resolved(attempt),
        Err(e) => {
            let reason = e.as_string().unwrap_or_else(|| format!("{:?}", e));
            p.borrow_mut().sequencer.on_play_rejected(attempt, &reason)
        }
    };
    run(&p, cmds);
}

/// Await a selection promise and report its outcome the way the page does:
/// superseded selections are expected, anything else is an error.
pub async fn report_selection(promise: js_sys::Promise) {
    if let Err(e) = JsFuture::from(promise).await {
        let msg = e.as_string().unwrap_or_else(|| format!("{:?}", e));
        if msg == PlaybackError::Superseded.to_string() {
            log::debug!("[player] {}", msg);
        } else {
            log::error!("Error loading audio: {}", msg);
            if let Some(doc) = crate::dom::window_document() {
                overlay::hide_loading(&doc);
            }
        }
    }
}
