pub mod consent;
pub mod pointer;

pub use consent::{wire_consent_form, SharedFlow};
pub use pointer::{wire_input_handlers, InputWiring};
