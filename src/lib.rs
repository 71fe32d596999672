//! mindtree: layered left-to-right layout and reachability filtering for a
//! mind-map style task tree.

pub mod cli;
pub mod io;
pub mod logging;
pub mod model;
pub mod ops;
pub mod util;
