//! The six finance agents

pub mod executor;
pub mod interface;
pub mod knowledge;
pub mod monitor;
pub mod notifier;
pub mod planner;

pub use executor::Executor;
pub use interface::Interface;
pub use knowledge::KnowledgeBase;
pub use monitor::Monitor;
pub use notifier::Notifier;
pub use planner::Planner;
