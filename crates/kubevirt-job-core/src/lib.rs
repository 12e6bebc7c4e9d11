pub mod api;
pub mod config;
pub mod env;
pub mod error;
pub mod event;
pub mod selector;
pub mod updater;
pub mod vm;

#[cfg(test)]
mod fake;
