mod memory;
mod random;
mod smart;

pub use memory::MemoryStrategy;
pub use random::RandomStrategy;
pub use smart::SmartStrategy;
