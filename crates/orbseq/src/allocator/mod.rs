mod block;
mod cache;

pub use block::*;
pub use cache::*;
