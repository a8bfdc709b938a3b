use colored::Colorize;
use stackflow_cloud::{Summary, SummaryStore};
use stackflow_cloud_aws::AwsProvisioner;
use stackflow_core::Environment;
use stackflow_engine::{GraphExecutor, NodeAction, PollConfig};
use std::sync::Arc;

pub async fn handle(env: Environment) -> anyhow::Result<u8> {
    println!(
        "{}",
        format!("Applying the {env} topology...").bold()
    );

    let graph = match stackflow_core::topology(env) {
        Ok(graph) => graph,
        Err(err) => {
            eprintln!("{}", err.to_string().red());
            return Ok(2);
        }
    };

    println!();
    println!("{}", format!("Stacks ({}):", graph.len()).bold());
    for spec in graph.apply_order() {
        println!("  • {}", spec.stack_name.cyan());
    }
    println!();

    let client = Arc::new(AwsProvisioner::from_env().await);
    let mut executor = GraphExecutor::new(client, graph, PollConfig::default());
    let outcome = executor.apply_all().await;

    for result in &outcome.completed {
        let verb = match result.action {
            NodeAction::Created => "created",
            NodeAction::Updated => "updated",
            NodeAction::Unchanged => "unchanged",
            // Destroy-only actions never show up in an apply walk.
            NodeAction::Destroyed | NodeAction::AlreadyAbsent => "destroyed",
        };
        println!("  ✓ {} {}", result.stack_name.cyan(), verb.green());
    }

    if let Some(halted) = &outcome.halted {
        eprintln!(
            "{}",
            format!("  ✗ {}: {}", halted.unit, halted.error).red()
        );
        return Ok(super::walk_exit_code(&outcome, halted));
    }

    // Key/value artifact for the downstream workload-deployment step.
    let mut summary = Summary::new(env.as_str());
    for result in &outcome.completed {
        if let Some(outputs) = executor.outputs_of(&result.unit) {
            for (key, value) in outputs {
                summary.insert(&result.unit, key, value);
            }
        }
    }
    let store = SummaryStore::new(std::env::current_dir()?);
    store.save(&summary).await?;

    println!();
    println!("{}", "✓ Topology applied".green().bold());
    println!(
        "{}",
        format!("  summary written to {}", store.path().display()).dimmed()
    );
    Ok(0)
}
