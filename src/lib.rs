pub mod args;
pub mod camera;
pub mod config;
pub mod detector;
pub mod dispatch;
pub mod error;
pub mod font;
pub mod gesture;
pub mod inference;
pub mod logging;
pub mod output;
pub mod overlay;
pub mod pipeline;
pub mod pointer;
pub mod session;
pub mod stats;
pub mod ttf;
pub mod types;
