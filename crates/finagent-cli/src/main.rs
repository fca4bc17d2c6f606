//! Command-line interface for finagent-rs
//!
//! Wires the six agents onto one runtime and exposes the system's entry
//! points as subcommands. Without Gemini credentials the binary still
//! runs: agents fall back to their deterministic defaults.

use std::sync::Arc;

use async_trait::async_trait;
use clap::{Parser, Subcommand};
use comfy_table::Table;
use serde_json::Value;
use tracing::{info, warn};

use finagent_agents::{AgentModels, FinanceConfig, FinanceSystem};
use finagent_llm::providers::GeminiGenerator;
use finagent_llm::{GenerationRequest, GeneratorError, TextGenerator};
use finagent_protocol::Protocol;
use finagent_runtime::FinanceRuntime;

#[derive(Parser)]
#[command(name = "finagent")]
#[command(about = "Multi-agent personal finance analysis system", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full financial analysis for a user
    Analyze {
        /// User id to analyze
        #[arg(short, long, default_value_t = 1)]
        usuario: i64,
    },
    /// List the communication protocols and what each is for
    Protocols,
    /// Show system health, traffic metrics, and per-agent status
    Health,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    finagent_utils::init_tracing();

    let cli = Cli::parse();

    match cli.command {
        Commands::Analyze { usuario } => {
            let system = build_system()?;
            info!(usuario, "running full financial analysis");
            let result = system.analyze(usuario).await?;
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        Commands::Protocols => {
            println!("{}", protocols_table());
        }
        Commands::Health => {
            let system = build_system()?;
            let overview = system.overview();
            println!(
                "{} v{} - {}",
                overview["app"].as_str().unwrap_or("finagent"),
                overview["version"].as_str().unwrap_or("0"),
                overview["status"].as_str().unwrap_or("unknown"),
            );
            println!("{}", agents_table(&system.agent_status()));

            let status = system.monitor_status().await;
            println!("{}", serde_json::to_string_pretty(&status)?);
        }
    }

    Ok(())
}

/// Assemble the six agents on a fresh runtime.
///
/// Model ids come from the environment (`FINAGENT_*_MODEL`); the
/// generator from `GOOGLE_API_KEY` / `GEMINI_API_KEY`, degrading to an
/// offline stand-in when neither is set.
fn build_system() -> anyhow::Result<FinanceSystem> {
    let generator: Arc<dyn TextGenerator> = match GeminiGenerator::from_env() {
        Ok(gemini) => Arc::new(gemini),
        Err(error) => {
            warn!(
                %error,
                "GOOGLE_API_KEY no configurada. Los agentes funcionarán en modo limitado."
            );
            Arc::new(OfflineGenerator)
        }
    };

    let runtime = FinanceRuntime::builder().generator(generator).build()?;
    let system = FinanceSystem::new(
        Arc::new(runtime),
        FinanceConfig::default(),
        AgentModels::from_env(),
    )?;
    Ok(system)
}

/// Stand-in generator used when no Gemini credentials are configured.
///
/// Every call fails with a configuration error, which agent contexts
/// surface as an `Error: ...` reply; the routers then fall back to
/// their deterministic defaults.
struct OfflineGenerator;

#[async_trait]
impl TextGenerator for OfflineGenerator {
    async fn generate(&self, _request: GenerationRequest) -> finagent_llm::Result<String> {
        Err(GeneratorError::ConfigurationError(
            "GOOGLE_API_KEY no configurada".to_string(),
        ))
    }

    fn name(&self) -> &'static str {
        "offline"
    }
}

fn protocol_summary(protocol: Protocol) -> (&'static str, &'static str) {
    match protocol {
        Protocol::A2a => ("Agent-to-Agent", "Comunicación general entre agentes"),
        Protocol::Acp => (
            "Agent Communication Protocol",
            "Intercambio estructurado de mensajes",
        ),
        Protocol::Anp => (
            "Agent Negotiation Protocol",
            "Resolución de conflictos y distribución de tareas",
        ),
        Protocol::Agui => (
            "Agent-to-User Interface",
            "Comunicación con la interfaz de usuario",
        ),
        Protocol::Mcp => (
            "Message Content Protocol",
            "Semántica del contenido del mensaje",
        ),
    }
}

fn protocols_table() -> Table {
    let mut table = Table::new();
    table.set_header(vec!["Protocolo", "Nombre", "Descripción"]);
    for protocol in Protocol::ALL {
        let (nombre, descripcion) = protocol_summary(protocol);
        table.add_row(vec![protocol.as_str(), nombre, descripcion]);
    }
    table
}

fn agents_table(status: &Value) -> Table {
    let mut table = Table::new();
    table.set_header(vec!["Agente", "Activo", "Historial"]);
    if let Some(agentes) = status["agentes"].as_object() {
        for (nombre, entry) in agentes {
            table.add_row(vec![
                nombre.clone(),
                entry["activo"].to_string(),
                entry["historial"].to_string(),
            ]);
        }
    }
    table
}
