//! Init command implementation.

use anyhow::{bail, Result};
use std::path::Path;

const DEFAULT_CONFIG: &str = r#"# namelint configuration

# Maximum identifier lengths per declaration kind.
# Omitted kinds fall back to the built-in defaults shown here.
[limits]
type = 3
method = 4
property = 5
field = 6
variable = 7

[analyzer]
# Root directory to analyze (default: current directory)
# root = "./src"

# Glob patterns to exclude from analysis
exclude = [
    "**/target/**",
    "**/vendor/**",
]

# Worker threads for the parallel file pass (default: rayon's choice)
# parallelism = 4
"#;

/// Runs the init command.
pub fn run(force: bool) -> Result<()> {
    let config_path = Path::new("namelint.toml");

    if config_path.exists() && !force {
        bail!(
            "Configuration file already exists at {}. Use --force to overwrite.",
            config_path.display()
        );
    }

    std::fs::write(config_path, DEFAULT_CONFIG)?;

    println!("Created namelint.toml");
    println!("\nNext steps:");
    println!("  1. Edit namelint.toml to adjust the limits");
    println!("  2. Run: namelint check");
    println!("  3. Optionally: namelint check --apply-fixes");

    Ok(())
}
