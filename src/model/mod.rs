pub mod node;
pub mod board;
pub mod config;

pub use node::*;
pub use board::*;
pub use config::*;
