//! tests/mod.rs
//! Pruebas del servicio. Correr con `cargo test`.

mod email_tests;
mod support;
