//! `delve tools` and `delve run`.

use crate::config::DelveConfig;
use crate::error::Result;
use crate::script::{ScriptRunner, parse_script};
use delve_graph::{InMemoryGraphStorage, KnowledgeGraphService};
use delve_mcp::ToolRegistry;
use delve_mcp_graph::GraphTools;
use std::path::Path;
use std::sync::Arc;

/// Builds graph tools over a fresh in-memory service.
pub fn build_tools(config: &DelveConfig) -> GraphTools {
    let service = KnowledgeGraphService::with_config(
        Arc::new(InMemoryGraphStorage::new()),
        config.engine_config(),
    );
    GraphTools::new(Arc::new(service))
}

/// Tool names and descriptions, one per line.
pub fn tool_listing(tools: &GraphTools) -> Vec<String> {
    tools
        .tools()
        .iter()
        .map(|tool| {
            let description = tool.description.as_deref().unwrap_or_default();
            format!("{:<24} {description}", tool.name)
        })
        .collect()
}

/// Print every available tool.
pub fn cmd_tools(config: &DelveConfig) -> Result<()> {
    for line in tool_listing(&build_tools(config)) {
        println!("{line}");
    }
    Ok(())
}

/// Execute a script and print each result as pretty JSON.
pub async fn cmd_run(config: &DelveConfig, script: &Path) -> Result<()> {
    let content =
        std::fs::read_to_string(script).map_err(|e| delve_core::Error::io_with_path(e, script))?;
    let calls = parse_script(&script.display().to_string(), &content)?;
    log::info!("Running {} call(s) from {}", calls.len(), script.display());

    let runner = ScriptRunner::new(build_tools(config), config.graph.default_max_depth);
    runner
        .run_with(&calls, |index, call, value| {
            println!("# [{index}] {}", call.tool);
            match serde_json::to_string_pretty(value) {
                Ok(text) => println!("{text}"),
                Err(e) => log::warn!("Could not render result {index}: {e}"),
            }
        })
        .await?;
    Ok(())
}
