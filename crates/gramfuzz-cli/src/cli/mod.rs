mod args;
mod color;

pub use args::Cli;
pub use color::ColorChoice;
