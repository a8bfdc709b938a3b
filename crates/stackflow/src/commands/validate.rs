use colored::Colorize;
use stackflow_core::Environment;

/// Offline check of the selected topology: cycle detection and reference
/// validation happen in the graph builder, so a successful build is the
/// whole proof. Prints the apply order the walk would use.
pub fn handle(env: Environment) -> anyhow::Result<u8> {
    match stackflow_core::topology(env) {
        Ok(graph) => {
            println!("{}", format!("✓ {env} topology is valid").green().bold());
            println!();
            println!("{}", "Apply order:".bold());
            for (position, spec) in graph.apply_order().enumerate() {
                print!("  {}. {}", position + 1, spec.stack_name.cyan());
                if !spec.depends_on.is_empty() {
                    print!(
                        "{}",
                        format!("  (after: {})", spec.depends_on.join(", ")).dimmed()
                    );
                }
                println!();
            }
            Ok(0)
        }
        Err(err) => {
            eprintln!("{}", err.to_string().red());
            Ok(2)
        }
    }
}
