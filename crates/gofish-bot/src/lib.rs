pub mod kind;
pub mod strategies;

pub use kind::StrategyKind;
pub use strategies::{MemoryStrategy, RandomStrategy, SmartStrategy};
