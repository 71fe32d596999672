pub mod check;
pub mod filter;
pub mod forest;
pub mod height;
pub mod layout;
pub mod pipeline;
