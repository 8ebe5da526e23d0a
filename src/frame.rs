use crate::canvas::CanvasBars;
use crate::core::atmosphere;
use crate::core::classify;
use crate::core::config::MaterialStateTable;
use crate::core::geometry;
use crate::core::marker::{pulse_depth, MarkerAnimator};
use crate::core::picking;
use crate::core::playback::PlaybackState;
use crate::core::spectrum::FrequencySource;
use crate::core::visualizer::VisualizerRenderer;
use crate::input::{self, Interaction};
use crate::player::SharedPlayer;
use crate::render::{self, MarkerInstance};
use glam::{Mat4, Vec3};
use instant::Instant;
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys as web;

/// Seconds between neighbouring markers' pulse phases.
const PULSE_STAGGER_SEC: f32 = 0.2;

pub struct FrameContext<'a> {
    pub player: SharedPlayer,
    pub interaction: Rc<RefCell<Interaction>>,
    pub gl_canvas: web::HtmlCanvasElement,
    pub bars: CanvasBars,
    pub visualizer: VisualizerRenderer,
    pub gpu: Option<render::GpuState<'a>>,
    pub table: MaterialStateTable,
    pub anchors: Rc<Vec<Vec3>>,
    pub animators: Vec<MarkerAnimator>,
    pub last_instant: Instant,
    pub elapsed: f32,
    pub hover_cursor: bool,
}

impl<'a> FrameContext<'a> {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        player: SharedPlayer,
        interaction: Rc<RefCell<Interaction>>,
        gl_canvas: web::HtmlCanvasElement,
        bars: CanvasBars,
        visualizer: VisualizerRenderer,
        gpu: Option<render::GpuState<'a>>,
        table: MaterialStateTable,
        anchors: Rc<Vec<Vec3>>,
    ) -> Self {
        let animators = anchors.iter().map(|_| MarkerAnimator::new(&table)).collect();
        Self {
            player,
            interaction,
            gl_canvas,
            bars,
            visualizer,
            gpu,
            table,
            anchors,
            animators,
            last_instant: Instant::now(),
            elapsed: 0.0,
            hover_cursor: false,
        }
    }

    pub fn frame(&mut self) {
        let now = Instant::now();
        let dt_sec = (now - self.last_instant).as_secs_f32();
        self.last_instant = now;
        self.elapsed += dt_sec;

        // Spectrum: one analyser read per frame feeds bars and atmosphere.
        let (snapshot, library, loudness) = {
            let p = self.player.borrow();
            let source = p.graph().map(|g| g as &dyn FrequencySource);
            let loudness = self.visualizer.render_frame(&mut self.bars, source);
            (p.snapshot(), p.library().clone(), loudness)
        };
        if let Some(g) = &mut self.gpu {
            atmosphere::apply(g, loudness);
        }

        let playback = PlaybackState::derive(&snapshot, &library);

        let size = input::canvas_css_size(&self.gl_canvas);
        let aspect = size.x / size.y.max(1.0);
        let (camera, group, hover) = {
            let mut ia = self.interaction.borrow_mut();
            ia.orbit.update(dt_sec, playback.auto_rotate_speed());
            let camera = ia.orbit.camera(aspect);
            let group = ia.orbit.group_rotation();
            let hover = if ia.mouse.inside && !ia.orbit.is_dragging() {
                let ndc = picking::to_ndc(ia.mouse.x, ia.mouse.y, size.x, size.y);
                picking::pick_marker(&camera, group, &self.anchors, ndc)
            } else {
                None
            };
            (camera, group, hover)
        };
        self.set_cursor(hover.is_some());

        let mut instances = Vec::with_capacity(self.animators.len());
        for (i, (track, anim)) in library.iter().zip(self.animators.iter_mut()).enumerate() {
            let state = classify(track, &snapshot.src, snapshot.paused, hover == Some(i));
            anim.set_target(state, &self.table);
            anim.advance(dt_sec);
            let look = anim.appearance();
            let depth = pulse_depth(self.elapsed, i as f32 * PULSE_STAGGER_SEC);
            let model = geometry::marker_model(self.anchors[i], look.scale, depth);
            instances.push(MarkerInstance::new(model, look.color, look.opacity));
        }

        if let Some(g) = &mut self.gpu {
            g.set_camera(&camera);
            g.set_group(Mat4::from_quat(group));
            g.set_markers(&instances);
            g.resize_if_needed(self.gl_canvas.width(), self.gl_canvas.height());
            if let Err(e) = g.render() {
                log::error!("[render] {:?}", e);
            }
        }
    }

    fn set_cursor(&mut self, pointer: bool) {
        if pointer != self.hover_cursor {
            self.hover_cursor = pointer;
            _ = self
                .gl_canvas
                .style()
                .set_property("cursor", if pointer { "pointer" } else { "" });
        }
    }
}

pub async fn init_gpu(
    canvas: &web::HtmlCanvasElement,
    marker_count: usize,
) -> Option<render::GpuState<'static>> {
    // leak a canvas clone to satisfy 'static lifetime for surface
    let leaked_canvas = Box::leak(Box::new(canvas.clone()));
    match render::GpuState::new(leaked_canvas, marker_count).await {
        Ok(g) => Some(g),
        Err(e) => {
            log::error!("WebGPU init error: {:?}", e);
            None
        }
    }
}

pub fn start_loop(frame_ctx: Rc<RefCell<FrameContext<'static>>>) {
    let tick: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
    let tick_clone = tick.clone();
    let frame_ctx_tick = frame_ctx.clone();
    *tick.borrow_mut() = Some(Closure::wrap(Box::new(move || {
        frame_ctx_tick.borrow_mut().frame();
        if let Some(w) = web::window() {
            if let Some(cb) = tick_clone.borrow().as_ref() {
                _ = w.request_animation_frame(cb.as_ref().unchecked_ref());
            }
        }
    }) as Box<dyn FnMut()>));
    if let Some(w) = web::window() {
        if let Some(cb) = tick.borrow().as_ref() {
            _ = w.request_animation_frame(cb.as_ref().unchecked_ref());
        }
    }
}
