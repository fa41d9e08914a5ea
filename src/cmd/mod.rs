pub mod demo;
pub mod keycodes;
pub mod show;
pub mod validate;
