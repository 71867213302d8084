pub mod calendar;
pub mod engine;
pub mod error;
pub mod index;
pub mod loader;
pub mod models;
pub mod output;
pub mod window;
