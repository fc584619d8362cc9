pub mod app;
pub mod capability;
pub mod color;
pub mod config;
pub mod input;
pub mod paint;
pub mod prefs;
pub mod render;
pub mod schedule;
pub mod signals;
pub mod sim;
pub mod terminal;
