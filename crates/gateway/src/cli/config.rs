use dc_domain::config::{Config, ConfigSeverity};
use dc_providers::auth::resolve_api_key;

/// Validate the config and check that an API key can be found.
///
/// Returns `false` when any error-level issue is present.  A missing key is
/// reported as a warning: the server still runs, but every turn fails.
pub fn validate(config: &Config, config_path: &str) -> bool {
    let issues = config.validate();
    let error_count = issues
        .iter()
        .filter(|e| e.severity == ConfigSeverity::Error)
        .count();
    let mut lines: Vec<String> = issues.iter().map(ToString::to_string).collect();

    if let Err(e) = resolve_api_key(&config.llm.auth) {
        lines.push(format!("[WARN] llm.auth: {e}"));
    }

    if !config.assistant.knowledge_path.exists() {
        lines.push(format!(
            "[WARN] assistant.knowledge_path: {} not found, prompts will carry no knowledge",
            config.assistant.knowledge_path.display()
        ));
    }

    if lines.is_empty() {
        println!("Config OK ({config_path})");
        return true;
    }

    for line in &lines {
        println!("{line}");
    }
    println!(
        "\n{} error(s), {} warning(s) in {config_path}",
        error_count,
        lines.len() - error_count,
    );

    error_count == 0
}

/// Print the resolved config (defaults and `PORT` override applied) as
/// TOML, prefixed with the file it came from.
pub fn show(config: &Config, config_path: &str) -> anyhow::Result<()> {
    let output = toml::to_string_pretty(config)
        .map_err(|e| anyhow::anyhow!("serializing config: {e}"))?;
    println!("# resolved from {config_path}");
    print!("{output}");
    Ok(())
}
