//! The `examprep list-models` command.

use std::path::PathBuf;

use anyhow::Result;

use examprep_providers::config::load_config_from;
use examprep_providers::create_provider;

pub fn execute(provider_filter: Option<String>, config_path: Option<PathBuf>) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;

    let mut names: Vec<&str> = config.providers.keys().map(String::as_str).collect();
    if !names.contains(&config.default_provider.as_str()) {
        names.push(&config.default_provider);
    }
    names.sort_unstable();

    let mut found_any = false;

    for name in names {
        if let Some(filter) = &provider_filter {
            if name != filter.as_str() {
                continue;
            }
        }

        let provider = create_provider(&config.provider_config(name)?);
        let models = provider.available_models();

        if !models.is_empty() {
            found_any = true;
            let default = if name == config.default_provider {
                " (default)"
            } else {
                ""
            };
            println!("Provider: {name}{default}");
            for model in &models {
                println!(
                    "  {}: {} ({}K context)",
                    model.id,
                    model.name,
                    model.max_context / 1000,
                );
            }
            println!();
        }
    }

    if !found_any {
        println!("No matching providers. Run `examprep init` to create a config file.");
    }

    Ok(())
}
