//! Interactive globe player: location markers on a rotating WebGPU globe,
//! each bound to an audio track, with a spectrum visualizer and an
//! audio-reactive atmosphere. `core` is target-independent; everything else
//! is the browser front-end.

pub mod core;

#[cfg(target_arch = "wasm32")]
mod api_client;
#[cfg(target_arch = "wasm32")]
mod audio;
#[cfg(target_arch = "wasm32")]
mod canvas;
#[cfg(target_arch = "wasm32")]
mod dom;
#[cfg(target_arch = "wasm32")]
mod events;
#[cfg(target_arch = "wasm32")]
mod frame;
#[cfg(target_arch = "wasm32")]
mod input;
#[cfg(target_arch = "wasm32")]
mod media;
#[cfg(target_arch = "wasm32")]
mod overlay;
#[cfg(target_arch = "wasm32")]
mod player;
#[cfg(target_arch = "wasm32")]
mod render;
#[cfg(target_arch = "wasm32")]
mod storage;

#[cfg(target_arch = "wasm32")]
pub use web_app::start;

#[cfg(target_arch = "wasm32")]
mod web_app {
    use crate::api_client::Backend;
    use crate::canvas::CanvasBars;
    use crate::core::consent::ConsentFlow;
    use crate::core::constants::{FREQUENCY_BIN_COUNT, GLOBE_RADIUS};
    use crate::core::visualizer::VisualizerRenderer;
    use crate::core::{SceneConfig, TrackLibrary};
    use crate::media::Media;
    use crate::player::Player;
    use crate::storage::LocalStore;
    use crate::{dom, events, frame, input, overlay, player};
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use wasm_bindgen::JsCast;
    use wasm_bindgen_futures::spawn_local;
    use web_sys as web;

    fn wire_canvas_resize(gl_canvas: &web::HtmlCanvasElement, bars_canvas: &web::HtmlCanvasElement) {
        dom::sync_canvas_backing_size(gl_canvas);
        dom::sync_canvas_to_viewport(bars_canvas);
        let gl = gl_canvas.clone();
        let bars = bars_canvas.clone();
        let resize_closure = Closure::wrap(Box::new(move || {
            dom::sync_canvas_backing_size(&gl);
            dom::sync_canvas_to_viewport(&bars);
        }) as Box<dyn FnMut()>);
        if let Some(window) = web::window() {
            _ = window
                .add_event_listener_with_callback("resize", resize_closure.as_ref().unchecked_ref());
        }
        resize_closure.forget();
    }

    /// Defaults, overridden by `<script id="scene-config" type="application/json">`.
    fn load_config(document: &web::Document) -> SceneConfig {
        let Some(text) = document
            .get_element_by_id("scene-config")
            .and_then(|el| el.text_content())
        else {
            return SceneConfig::default();
        };
        match SceneConfig::from_json(&text) {
            Ok(cfg) => {
                log::info!("[config] page override, {} markers", cfg.markers.len());
                cfg
            }
            Err(e) => {
                log::warn!("[config] invalid scene-config ({}), using defaults", e);
                SceneConfig::default()
            }
        }
    }

    fn canvas_by_id(document: &web::Document, id: &str) -> anyhow::Result<web::HtmlCanvasElement> {
        document
            .get_element_by_id(id)
            .ok_or_else(|| anyhow::anyhow!("missing #{}", id))?
            .dyn_into::<web::HtmlCanvasElement>()
            .map_err(|e| anyhow::anyhow!("{:?}", e))
    }

    #[wasm_bindgen(start)]
    pub fn start() -> Result<(), JsValue> {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).ok();
        log::info!("globe-player starting");

        spawn_local(async move {
            if let Err(e) = init().await {
                log::error!("init error: {:?}", e);
            }
        });
        Ok(())
    }

    async fn init() -> anyhow::Result<()> {
        let window = web::window().ok_or_else(|| anyhow::anyhow!("no window"))?;
        let document = window
            .document()
            .ok_or_else(|| anyhow::anyhow!("no document"))?;

        let config = load_config(&document);
        let page = dom::page_url();
        let library = Rc::new(TrackLibrary::from_markers_with(&config.markers, |audio| {
            dom::resolve_media_url(&page, audio)
        }));
        log::info!("[init] {} tracks", library.len());

        let flow = Rc::new(ConsentFlow::new(
            Backend::from_config(&config.api),
            LocalStore::open(),
        ));
        let granted = flow.is_granted();
        overlay::set_consent_form_visible(&document, !granted);
        overlay::hide_loading(&document);

        let media = Media::from_document(&document, "song")?;
        let player = Rc::new(RefCell::new(Player::new(
            document.clone(),
            media,
            library.clone(),
            granted,
        )));
        player::wire_media_events(&player);
        events::wire_consent_form(&document, flow, player.clone());

        let gl_canvas = canvas_by_id(&document, "globe")?;
        let bars_canvas = canvas_by_id(&document, "canvas")?;
        wire_canvas_resize(&gl_canvas, &bars_canvas);

        let anchors = Rc::new(
            library
                .iter()
                .map(|t| t.anchor(GLOBE_RADIUS))
                .collect::<Vec<_>>(),
        );
        let interaction = Rc::new(RefCell::new(input::Interaction::default()));
        events::wire_input_handlers(events::InputWiring {
            canvas: gl_canvas.clone(),
            interaction: interaction.clone(),
            player: player.clone(),
            anchors: anchors.clone(),
        });

        let gpu = frame::init_gpu(&gl_canvas, library.len()).await;
        let frame_ctx = Rc::new(RefCell::new(frame::FrameContext::new(
            player,
            interaction,
            gl_canvas,
            CanvasBars::new(bars_canvas)?,
            VisualizerRenderer::new(config.preset, FREQUENCY_BIN_COUNT),
            gpu,
            config.material_states.clone(),
            anchors,
        )));
        frame::start_loop(frame_ctx);
        Ok(())
    }
}
