use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys as web;

#[inline]
pub fn window_document() -> Option<web::Document> {
    web::window().and_then(|w| w.document())
}

/// Element by id, cast to `T`. `None` if missing or of another type.
pub fn by_id<T: JsCast>(document: &web::Document, id: &str) -> Option<T> {
    document
        .get_element_by_id(id)
        .and_then(|el| el.dyn_into::<T>().ok())
}

#[inline]
pub fn add_click_listener(
    document: &web::Document,
    element_id: &str,
    mut handler: impl FnMut() + 'static,
) {
    if let Some(el) = document.get_element_by_id(element_id) {
        let closure = Closure::wrap(Box::new(move |ev: web::Event| {
            ev.prevent_default();
            handler()
        }) as Box<dyn FnMut(_)>);
        _ = el.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
        closure.forget();
    }
}

pub fn set_class(el: &web::Element, class: &str, on: bool) {
    let cl = el.class_list();
    _ = if on { cl.add_1(class) } else { cl.remove_1(class) };
}

pub fn set_display(el: &web::Element, visible: bool) {
    if let Some(h) = el.dyn_ref::<web::HtmlElement>() {
        _ = h
            .style()
            .set_property("display", if visible { "" } else { "none" });
    }
}

/// Absolute URL of the current page.
pub fn page_url() -> String {
    web::window()
        .and_then(|w| w.location().href().ok())
        .unwrap_or_default()
}

/// Absolute form of `url` as the browser's URL parser produces it, which is
/// what `HTMLMediaElement.src` reports back.
pub fn resolve_media_url(base: &str, url: &str) -> String {
    // An empty src would otherwise resolve to the page itself.
    if url.trim().is_empty() {
        return String::new();
    }
    match web::Url::new_with_base(url, base) {
        Ok(u) => u.href(),
        Err(e) => {
            log::warn!("[dom] cannot parse audio url {:?}: {:?}", url, e);
            crate::core::track::resolve_url(base, url)
        }
    }
}

/// Match the canvas backing store to its CSS size times `devicePixelRatio`.
pub fn sync_canvas_backing_size(canvas: &web::HtmlCanvasElement) {
    if let Some(w) = web::window() {
        let dpr = w.device_pixel_ratio();
        let rect = canvas.get_bounding_client_rect();
        let w_px = (rect.width() * dpr) as u32;
        let h_px = (rect.height() * dpr) as u32;
        canvas.set_width(w_px.max(1));
        canvas.set_height(h_px.max(1));
    }
}

/// Size the canvas to the viewport in CSS pixels.
pub fn sync_canvas_to_viewport(canvas: &web::HtmlCanvasElement) {
    if let Some(w) = web::window() {
        let width = w.inner_width().ok().and_then(|v| v.as_f64()).unwrap_or(1.0);
        let height = w.inner_height().ok().and_then(|v| v.as_f64()).unwrap_or(1.0);
        canvas.set_width((width as u32).max(1));
        canvas.set_height((height as u32).max(1));
    }
}
