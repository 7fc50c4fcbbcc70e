//! `draftpress providers` — List supported LLM providers.

use draftpress_config::{AppConfig, PROVIDER_VAR, ProviderKind};
use std::process::ExitCode;

pub fn run(config: &AppConfig) -> ExitCode {
    print!("{}", render(config, |key| std::env::var(key).ok()));
    ExitCode::SUCCESS
}

/// The provider table, resolved against `lookup` instead of the process environment.
fn render<F>(config: &AppConfig, lookup: F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    let active = config.resolve_provider_with(None, &lookup);
    let active_kind = active.as_ref().ok().map(|p| p.kind);

    let mut out = String::new();
    out.push_str("Supported LLM providers (in selection order)\n\n");
    out.push_str(&format!(
        "  {:<12} {:<20} {:<18} {:<36} {}\n",
        "PROVIDER", "KEY VARIABLE", "MODEL VARIABLE", "MODEL", "KEY"
    ));

    for status in config.provider_statuses(&lookup) {
        let marker = if Some(status.kind) == active_kind { "*" } else { " " };
        out.push_str(&format!(
            "{marker} {:<12} {:<20} {:<18} {:<36} {}\n",
            status.kind.name(),
            status.kind.key_var(),
            status.kind.model_var(),
            status.model,
            if status.has_credential { "set" } else { "-" },
        ));
    }

    out.push('\n');
    match active {
        Ok(provider) => out.push_str(&format!(
            "Active: {} ({})\n",
            provider.kind, provider.model
        )),
        Err(e) => out.push_str(&format!("Active: none ({e})\n")),
    }

    let names: Vec<&str> = ProviderKind::PRECEDENCE.iter().map(|k| k.name()).collect();
    out.push_str(&format!(
        "\nSet {PROVIDER_VAR}={} or pass --provider to choose explicitly.\n",
        names.join("|")
    ));
    out
}
