//! The six finance agents and their assembly
//!
//! This crate implements the agent layer of the personal-finance system.
//! Each agent routes the message kinds it understands and answers every
//! other kind with a structured `unknown_message_type` record:
//!
//! - `Planner` (`Planificador`): decomposes an objective into subtasks and
//!   drives their execution over ANP
//! - `Executor` (`Ejecutor`): balances, budget verification, and expense
//!   analysis over ACP, raising A2A alerts past the budget threshold
//! - `Notifier` (`Notificador`): builds alerts and notifications and
//!   forwards them to the interface over AGUI
//! - `KnowledgeBase`: answers data queries with validated MCP messages
//! - `Interface` (`Interfaz`): formats alerts, analyses, and dashboards
//!   for presentation
//! - `Monitor`: tracks distributions and agent status, answers health
//!   checks
//!
//! [`FinanceSystem`] builds all six on one runtime and registers them on
//! its bus.
//!
//! # Example
//!
//! ```rust,ignore
//! use finagent_agents::{AgentModels, FinanceConfig, FinanceSystem};
//! use finagent_runtime::FinanceRuntime;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let runtime = Arc::new(
//!         FinanceRuntime::builder()
//!             .generator(/* your generator */)
//!             .build()?,
//!     );
//!     let system = FinanceSystem::new(
//!         runtime,
//!         FinanceConfig::default(),
//!         AgentModels::from_env(),
//!     )?;
//!
//!     let analysis = system.analyze(1).await?;
//!     println!("{analysis:#}");
//!     Ok(())
//! }
//! ```

pub mod agents;
pub mod config;
pub mod prompts;
pub mod system;
pub mod task;

#[cfg(test)]
pub(crate) mod testing;

pub use agents::{Executor, Interface, KnowledgeBase, Monitor, Notifier, Planner};
pub use config::{AgentModels, FinanceConfig};
pub use system::{FinanceSystem, SYSTEM_SENDER};
pub use task::{Plan, Task};
