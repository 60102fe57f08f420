mod engine;
mod partitions;
#[cfg(test)]
mod tests;

pub use engine::*;
pub use partitions::*;
