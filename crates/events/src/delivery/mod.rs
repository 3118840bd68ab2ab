//! External delivery channels for template events.

pub mod webhook;
