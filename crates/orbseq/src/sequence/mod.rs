mod atomic;
mod block;
mod interface;
mod scrambled;

pub use atomic::*;
pub use block::*;
pub use interface::*;
pub use scrambled::*;
