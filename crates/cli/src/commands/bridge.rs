//! BTP bridge setup command.

use anyhow::Result;
use common::ChainPair;
use orchestrator::BridgeOrchestrator;
use serde::Serialize;

use crate::commands::Outcome;
use crate::output::OutputFormatter;

#[derive(Serialize)]
struct SetupReport<'a> {
    chain_a: &'a str,
    chain_b: &'a str,
    status: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    output: Option<serde_json::Value>,
}

/// Set up a BTP bridge between two chains
pub async fn setup_btp(
    orchestrator: &BridgeOrchestrator,
    formatter: &OutputFormatter,
    pair: ChainPair,
) -> Result<Outcome> {
    if !formatter.json_mode {
        formatter.info(&format!(
            "Setting up BTP bridge between {} and {}",
            formatter.format_chain(pair.chain_a().as_str()),
            formatter.format_chain(pair.chain_b().as_str())
        ));
    }

    let spinner = formatter.spinner("Running BTP setup");
    let result = orchestrator.setup_bridge(&pair).await;
    spinner.finish_and_clear();

    match result {
        Ok(output) => {
            report_completed(formatter, &pair, &output)?;
            Ok(Outcome::Done)
        }
        Err(err) if err.is_already_running() => {
            report_already_running(formatter, &pair)?;
            Ok(Outcome::AlreadyRunning)
        }
        Err(err) => Err(err.into()),
    }
}

fn report_completed(formatter: &OutputFormatter, pair: &ChainPair, output: &str) -> Result<()> {
    // The workflow output is JSON; keep anything else verbatim.
    let value = serde_json::from_str(output)
        .unwrap_or_else(|_| serde_json::Value::String(output.to_string()));

    if formatter.json_mode {
        return formatter.json(&SetupReport {
            chain_a: pair.chain_a().as_str(),
            chain_b: pair.chain_b().as_str(),
            status: "completed",
            output: Some(value),
        });
    }

    formatter.success("BTP setup completed");
    formatter.header("Bridge Setup Output");
    match value {
        serde_json::Value::Object(fields) => {
            for (key, value) in fields {
                let value = match value {
                    serde_json::Value::String(s) => s,
                    other => other.to_string(),
                };
                formatter.kv(&key, &value);
            }
        }
        other => println!("{}", other),
    }

    Ok(())
}

fn report_already_running(formatter: &OutputFormatter, pair: &ChainPair) -> Result<()> {
    if formatter.json_mode {
        return formatter.json(&SetupReport {
            chain_a: pair.chain_a().as_str(),
            chain_b: pair.chain_b().as_str(),
            status: "already_running",
            output: None,
        });
    }

    formatter.warning(&format!(
        "BTP bridge between {} and {} is Already Running",
        pair.chain_a(),
        pair.chain_b()
    ));
    Ok(())
}
