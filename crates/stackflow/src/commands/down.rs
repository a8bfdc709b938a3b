use colored::Colorize;
use stackflow_cloud_aws::AwsProvisioner;
use stackflow_core::Environment;
use stackflow_engine::{ConfirmationGate, GraphExecutor, NodeAction, PollConfig};
use std::io::Write;
use std::sync::Arc;

pub async fn handle(env: Environment) -> anyhow::Result<u8> {
    let graph = match stackflow_core::topology(env) {
        Ok(graph) => graph,
        Err(err) => {
            eprintln!("{}", err.to_string().red());
            return Ok(2);
        }
    };

    println!(
        "{}",
        format!("The following {env} stacks will be DESTROYED:")
            .red()
            .bold()
    );
    for spec in graph.destroy_order() {
        print!("  • {}", spec.stack_name.cyan());
        if spec.owns_storage() {
            let keys: Vec<&str> = spec
                .storage_units
                .iter()
                .map(|u| u.output_key.as_str())
                .collect();
            print!(
                "{}",
                format!("  (buckets purged first: {})", keys.join(", ")).yellow()
            );
        }
        println!();
    }
    if env.is_protected() {
        println!(
            "{}",
            format!("  {env} is a protected environment; two confirmations are required.")
                .yellow()
        );
    }
    println!();

    // Confirmation must come before the provisioning client even exists;
    // an aborted teardown has no side effects at all.
    let state = ConfirmationGate::new(env).run(|expected| {
        print!("Type '{}' to continue: ", expected.yellow());
        std::io::stdout().flush()?;
        let mut input = String::new();
        std::io::stdin().read_line(&mut input)?;
        Ok(input)
    })?;

    if state != stackflow_engine::GateState::Confirmed {
        println!();
        println!("{}", "Aborted, nothing was destroyed".yellow());
        return Ok(1);
    }

    println!();
    let client = Arc::new(AwsProvisioner::from_env().await);
    let mut executor = GraphExecutor::new(client, graph, PollConfig::default());
    let outcome = executor.destroy_all().await;

    for result in &outcome.completed {
        match result.action {
            NodeAction::Destroyed => {
                if result.purged_objects > 0 {
                    println!(
                        "  ✓ {} destroyed ({} objects purged)",
                        result.stack_name.cyan(),
                        result.purged_objects
                    );
                } else {
                    println!("  ✓ {} destroyed", result.stack_name.cyan());
                }
            }
            NodeAction::AlreadyAbsent => {
                println!("  ℹ {} already absent", result.stack_name.dimmed());
            }
            _ => {}
        }
    }

    if let Some(halted) = &outcome.halted {
        eprintln!(
            "{}",
            format!("  ✗ {}: {}", halted.unit, halted.error).red()
        );
        return Ok(super::walk_exit_code(&outcome, halted));
    }

    println!();
    println!("{}", "✓ Topology destroyed".green().bold());
    Ok(0)
}
