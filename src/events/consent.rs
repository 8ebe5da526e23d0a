//! Phone form and subscribe dialog wiring.

use crate::api_client::Backend;
use crate::core::consent::ConsentFlow;
use crate::core::phone;
use crate::dom;
use crate::overlay;
use crate::player::SharedPlayer;
use crate::storage::LocalStore;
use chrono::Utc;
use std::rc::Rc;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::spawn_local;
use web_sys as web;

pub type SharedFlow = Rc<ConsentFlow<Backend, LocalStore>>;

pub fn wire_consent_form(document: &web::Document, flow: SharedFlow, player: SharedPlayer) {
    overlay::set_submit_enabled(document, false);
    wire_phone_input(document);
    wire_submit(document, flow.clone());
    wire_answer(document, "acceptSubscription", true, flow.clone(), player.clone());
    wire_answer(document, "declineSubscription", false, flow, player);
}

fn wire_phone_input(document: &web::Document) {
    let Some(input) = dom::by_id::<web::HtmlInputElement>(document, "phoneNumber") else {
        log::warn!("[consent] missing #phoneNumber");
        return;
    };
    let doc = document.clone();
    let field = input.clone();
    let closure = Closure::wrap(Box::new(move || {
        overlay::set_submit_enabled(&doc, phone::is_submittable(&field.value()));
    }) as Box<dyn FnMut()>);
    _ = input.add_event_listener_with_callback("input", closure.as_ref().unchecked_ref());
    closure.forget();
}

fn wire_submit(document: &web::Document, flow: SharedFlow) {
    let doc = document.clone();
    dom::add_click_listener(document, "submitButton", move || {
        let value = dom::by_id::<web::HtmlInputElement>(&doc, "phoneNumber")
            .map(|i| i.value())
            .unwrap_or_default();
        let doc = doc.clone();
        let flow = flow.clone();
        overlay::set_submit_busy(&doc, true);
        spawn_local(async move {
            match flow.submit_phone(value.trim()).await {
                Ok(check) => {
                    log::info!("[consent] number known={}", check.exists);
                    overlay::set_form_message(&doc, "Thank you!", false);
                    overlay::show_subscribe_dialog(&doc);
                }
                Err(e) => {
                    log::warn!("[consent] submit failed: {}", e);
                    overlay::set_form_message(&doc, &e.user_message(), true);
                }
            }
            overlay::set_submit_busy(&doc, false);
        });
    });
}

fn wire_answer(
    document: &web::Document,
    button_id: &str,
    subscribe: bool,
    flow: SharedFlow,
    player: SharedPlayer,
) {
    let doc = document.clone();
    dom::add_click_listener(document, button_id, move || {
        let doc = doc.clone();
        let flow = flow.clone();
        let player = player.clone();
        spawn_local(async move {
            let result = flow.answer(subscribe, Utc::now()).await;
            overlay::hide_subscribe_dialog(&doc);
            match result {
                Ok(record) => {
                    overlay::set_consent_form_visible(&doc, false);
                    player.borrow_mut().set_consent_granted(record.granted);
                }
                Err(e) => {
                    log::warn!("[consent] login failed: {}", e);
                    overlay::set_form_message(&doc, &e.user_message(), true);
                    player.borrow_mut().set_consent_granted(false);
                }
            }
        });
    });
}
