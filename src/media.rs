use crate::core::playback::MediaSnapshot;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use wasm_bindgen::JsValue;
use wasm_bindgen_futures::spawn_local;
use web_sys as web;

/// The page's single persistent `<audio>` element.
#[derive(Clone)]
pub struct Media {
    el: web::HtmlMediaElement,
}

impl Media {
    pub fn from_document(document: &web::Document, id: &str) -> anyhow::Result<Self> {
        let el = document
            .get_element_by_id(id)
            .ok_or_else(|| anyhow::anyhow!("missing #{}", id))?
            .dyn_into::<web::HtmlMediaElement>()
            .map_err(|e| anyhow::anyhow!("#{} is not a media element: {:?}", id, e))?;
        Ok(Self { el })
    }

    pub fn element(&self) -> &web::HtmlMediaElement {
        &self.el
    }

    pub fn snapshot(&self) -> MediaSnapshot {
        MediaSnapshot {
            src: self.el.src(),
            paused: self.el.paused(),
            ended: self.el.ended(),
            current_time: self.el.current_time(),
            ready_state: self.el.ready_state(),
            has_error: self.el.error().is_some(),
        }
    }

    pub fn set_src(&self, url: &str) {
        self.el.set_src(url);
    }

    pub fn play(&self) -> Result<js_sys::Promise, JsValue> {
        self.el.play()
    }

    /// Buffered fraction of the current source in percent, if known.
    pub fn buffered_percent(&self) -> Option<f64> {
        let duration = self.el.duration();
        if !duration.is_finite() || duration <= 0.0 {
            return None;
        }
        let ranges = self.el.buffered();
        let n = ranges.length();
        if n == 0 {
            return Some(0.0);
        }
        let end = ranges.end(n - 1).ok()?;
        Some((end / duration * 100.0).clamp(0.0, 100.0))
    }

    /// Persistent listener for the page lifetime.
    pub fn on(&self, event: &str, handler: impl FnMut() + 'static) {
        let closure = Closure::wrap(Box::new(handler) as Box<dyn FnMut()>);
        _ = self
            .el
            .add_event_listener_with_callback(event, closure.as_ref().unchecked_ref());
        closure.forget();
    }
}

/// One-shot `canplay`/`error` listeners registered for a single load attempt.
pub struct AttemptListeners {
    target: web::HtmlMediaElement,
    can_play: Closure<dyn FnMut()>,
    error: Closure<dyn FnMut()>,
}

impl AttemptListeners {
    pub fn arm(
        media: &Media,
        on_can_play: impl FnMut() + 'static,
        on_error: impl FnMut() + 'static,
    ) -> Self {
        let can_play = Closure::wrap(Box::new(on_can_play) as Box<dyn FnMut()>);
        let error = Closure::wrap(Box::new(on_error) as Box<dyn FnMut()>);
        let opts = web::AddEventListenerOptions::new();
        opts.set_once(true);
        let target = media.el.clone();
        _ = target.add_event_listener_with_callback_and_add_event_listener_options(
            "canplay",
            can_play.as_ref().unchecked_ref(),
            &opts,
        );
        _ = target.add_event_listener_with_callback_and_add_event_listener_options(
            "error",
            error.as_ref().unchecked_ref(),
            &opts,
        );
        Self {
            target,
            can_play,
            error,
        }
    }

    /// Unregister both listeners. The closures may be the ones currently
    /// executing, so they are released on a later microtask.
    pub fn disarm(self) {
        _ = self
            .target
            .remove_event_listener_with_callback("canplay", self.can_play.as_ref().unchecked_ref());
        _ = self
            .target
            .remove_event_listener_with_callback("error", self.error.as_ref().unchecked_ref());
        spawn_local(async move {
            drop(self);
        });
    }
}
