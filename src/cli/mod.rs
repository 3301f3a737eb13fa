//! Command-line front end: argument definitions, the command dispatcher and
//! terminal presentation. The library modules never print; this one does.
mod app;
mod args;
mod render;

pub use app::*;
pub use args::*;
pub use render::*;
