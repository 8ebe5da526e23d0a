//! DOM overlays: loading indicator, now-playing caption and the phone
//! consent form with its subscribe dialog.

use crate::dom;
use web_sys as web;

const LOADING_ID: &str = "loading-indicator";
const LOADING_HIDDEN: &str = "loading-hidden";
const DIALOG_ID: &str = "subscriptionDialog";
const DIALOG_HIDDEN: &str = "dialog-hidden";
const FORM_ID: &str = "myForm";
const MESSAGE_ID: &str = "formMessage";
const SUBMIT_ID: &str = "submitButton";

const COLOR_OK: &str = "#4CAF50";
const COLOR_ERROR: &str = "#f44336";

#[inline]
pub fn show_loading(document: &web::Document) {
    if let Some(el) = document.get_element_by_id(LOADING_ID) {
        dom::set_class(&el, LOADING_HIDDEN, false);
    }
}

#[inline]
pub fn hide_loading(document: &web::Document) {
    if let Some(el) = document.get_element_by_id(LOADING_ID) {
        dom::set_class(&el, LOADING_HIDDEN, true);
    }
}

pub fn set_loading_progress(document: &web::Document, percent: f64) {
    if let Some(el) = document.get_element_by_id(LOADING_ID) {
        if let Ok(Some(text)) = el.query_selector(".loading-text") {
            text.set_text_content(Some(&format!(
                "Loading track... {}%",
                percent.clamp(0.0, 100.0).round()
            )));
        }
    }
}

pub fn show_now_playing(document: &web::Document, title: &str, location: &str) {
    if let Some(el) = document.get_element_by_id("songTitle") {
        el.set_text_content(Some(title));
    }
    if let Some(el) = document.get_element_by_id("songLocation") {
        el.set_text_content(Some(location));
    }
}

/// Phone form and backdrop; shown until consent is granted.
pub fn set_consent_form_visible(document: &web::Document, visible: bool) {
    if let Some(form) = document.get_element_by_id(FORM_ID) {
        dom::set_display(&form, visible);
    }
    if let Ok(Some(backdrop)) = document.query_selector(".backdrop") {
        dom::set_display(&backdrop, visible);
    }
}

pub fn show_subscribe_dialog(document: &web::Document) {
    if let Some(el) = document.get_element_by_id(DIALOG_ID) {
        dom::set_class(&el, DIALOG_HIDDEN, false);
    }
}

pub fn hide_subscribe_dialog(document: &web::Document) {
    if let Some(el) = document.get_element_by_id(DIALOG_ID) {
        dom::set_class(&el, DIALOG_HIDDEN, true);
    }
}

/// Gate surfaced when playback is attempted without consent.
pub fn show_consent(document: &web::Document) {
    set_consent_form_visible(document, true);
    if let Some(input) = dom::by_id::<web::HtmlInputElement>(document, "phoneNumber") {
        _ = input.focus();
    }
}

pub fn set_form_message(document: &web::Document, text: &str, is_error: bool) {
    if let Some(el) = dom::by_id::<web::HtmlElement>(document, MESSAGE_ID) {
        el.set_text_content(Some(text));
        _ = el
            .style()
            .set_property("color", if is_error { COLOR_ERROR } else { COLOR_OK });
    }
}

pub fn set_submit_enabled(document: &web::Document, enabled: bool) {
    if let Some(btn) = dom::by_id::<web::HtmlButtonElement>(document, SUBMIT_ID) {
        btn.set_disabled(!enabled);
        let style = btn.style();
        _ = style.set_property("background-color", if enabled { "#1a365d" } else { "#555" });
        _ = style.set_property("cursor", if enabled { "pointer" } else { "not-allowed" });
    }
}

/// Swap the submit label for the spinner while a request is in flight.
pub fn set_submit_busy(document: &web::Document, busy: bool) {
    if let Some(btn) = document.get_element_by_id(SUBMIT_ID) {
        if let Ok(Some(text)) = btn.query_selector(".button-text") {
            dom::set_class(&text, "hidden", busy);
        }
        if let Ok(Some(loader)) = btn.query_selector(".button-loader") {
            dom::set_class(&loader, "hidden", !busy);
        }
    }
}
