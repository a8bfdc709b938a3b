use colored::Colorize;
use stackflow_cloud::ProvisioningClient;
use stackflow_cloud_aws::AwsProvisioner;
use stackflow_core::Environment;

pub async fn handle(env: Environment) -> anyhow::Result<u8> {
    let graph = match stackflow_core::topology(env) {
        Ok(graph) => graph,
        Err(err) => {
            eprintln!("{}", err.to_string().red());
            return Ok(2);
        }
    };

    let client = AwsProvisioner::from_env().await;

    println!("{}", format!("Stack status ({env}):").bold());
    let mut failed = false;
    for spec in graph.apply_order() {
        match client.describe(&spec.stack_name).await {
            Ok(Some(status)) => {
                let rendered = if status.is_failure() {
                    status.to_string().red()
                } else if status.is_terminal() {
                    status.to_string().green()
                } else {
                    status.to_string().yellow()
                };
                println!("  {}  {}", spec.stack_name.cyan(), rendered);
            }
            Ok(None) => {
                println!("  {}  {}", spec.stack_name.cyan(), "absent".dimmed());
            }
            Err(err) => {
                eprintln!("  {}  {}", spec.stack_name.cyan(), err.to_string().red());
                failed = true;
            }
        }
    }

    Ok(if failed { 1 } else { 0 })
}
