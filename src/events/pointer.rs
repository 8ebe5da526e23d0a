use crate::core::picking;
use crate::core::MarkerId;
use crate::input::{self, Interaction};
use crate::player::{self, SharedPlayer};
use glam::Vec3;
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::spawn_local;
use web_sys as web;

#[derive(Clone)]
pub struct InputWiring {
    pub canvas: web::HtmlCanvasElement,
    pub interaction: Rc<RefCell<Interaction>>,
    pub player: SharedPlayer,
    /// Marker anchors on the unrotated globe, indexed like the library.
    pub anchors: Rc<Vec<Vec3>>,
}

pub fn wire_input_handlers(w: InputWiring) {
    wire_pointermove(&w);
    wire_pointerdown(&w);
    wire_pointerup(&w);
    wire_pointerleave(&w);
}

fn listen(
    canvas: &web::HtmlCanvasElement,
    event: &str,
    handler: impl FnMut(web::PointerEvent) + 'static,
) {
    let closure = Closure::wrap(Box::new(handler) as Box<dyn FnMut(_)>);
    _ = canvas.add_event_listener_with_callback(event, closure.as_ref().unchecked_ref());
    closure.forget();
}

fn wire_pointermove(w: &InputWiring) {
    let w2 = w.clone();
    listen(&w.canvas, "pointermove", move |ev| {
        let pos = input::pointer_canvas_css(&ev, &w2.canvas);
        w2.interaction.borrow_mut().moved(pos);
    });
}

fn wire_pointerdown(w: &InputWiring) {
    let w2 = w.clone();
    listen(&w.canvas, "pointerdown", move |ev| {
        let pos = input::pointer_canvas_css(&ev, &w2.canvas);
        w2.interaction.borrow_mut().press(pos);
        _ = w2.canvas.set_pointer_capture(ev.pointer_id());
        ev.prevent_default();
    });
}

fn wire_pointerup(w: &InputWiring) {
    let w2 = w.clone();
    listen(&w.canvas, "pointerup", move |ev| {
        let pos = input::pointer_canvas_css(&ev, &w2.canvas);
        let hit = {
            let mut ia = w2.interaction.borrow_mut();
            if !ia.release(pos) {
                return;
            }
            let size = input::canvas_css_size(&w2.canvas);
            let camera = ia.orbit.camera(size.x / size.y.max(1.0));
            let ndc = picking::to_ndc(pos.x, pos.y, size.x, size.y);
            picking::pick_marker(&camera, ia.orbit.group_rotation(), &w2.anchors, ndc)
        };
        if let Some(i) = hit {
            log::info!("[click] marker {}", i);
            if let Some(promise) = player::select_marker(&w2.player, MarkerId(i)) {
                spawn_local(player::report_selection(promise));
            }
        }
    });
}

fn wire_pointerleave(w: &InputWiring) {
    let w2 = w.clone();
    listen(&w.canvas, "pointerleave", move |_ev| {
        w2.interaction.borrow_mut().left();
    });
}
