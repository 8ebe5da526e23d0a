use crate::core::constants::CLICK_SLOP_PX;
use crate::core::orbit::OrbitState;
use glam::Vec2;
use web_sys as web;

#[derive(Default, Clone, Copy)]
pub struct MouseState {
    pub x: f32,
    pub y: f32,
    pub inside: bool,
}

/// Pointer and orbit state shared by the event handlers and the frame loop.
#[derive(Default)]
pub struct Interaction {
    pub mouse: MouseState,
    pub orbit: OrbitState,
    press: Option<Vec2>,
}

impl Interaction {
    pub fn press(&mut self, pos: Vec2) {
        self.press = Some(pos);
        self.orbit.begin_drag(pos.x, pos.y);
    }

    pub fn moved(&mut self, pos: Vec2) {
        self.mouse.x = pos.x;
        self.mouse.y = pos.y;
        self.mouse.inside = true;
        self.orbit.drag_to(pos.x, pos.y);
    }

    /// Release at `pos`. Returns true when the gesture was a click.
    pub fn release(&mut self, pos: Vec2) -> bool {
        self.orbit.end_drag();
        self.press
            .take()
            .is_some_and(|p| p.distance(pos) <= CLICK_SLOP_PX)
    }

    pub fn left(&mut self) {
        self.mouse.inside = false;
    }
}

/// Pointer position in CSS pixels relative to the canvas.
#[inline]
pub fn pointer_canvas_css(ev: &web::MouseEvent, canvas: &web::HtmlCanvasElement) -> Vec2 {
    let rect = canvas.get_bounding_client_rect();
    Vec2::new(
        ev.client_x() as f32 - rect.left() as f32,
        ev.client_y() as f32 - rect.top() as f32,
    )
}

/// CSS size of the canvas.
#[inline]
pub fn canvas_css_size(canvas: &web::HtmlCanvasElement) -> Vec2 {
    let rect = canvas.get_bounding_client_rect();
    Vec2::new(rect.width() as f32, rect.height() as f32)
}
