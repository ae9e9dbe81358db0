use std::collections::HashSet;
use std::path::Path;

use error_stack::{Report, ResultExt};

use crate::config::SymbolsConfig;
use crate::error::ConfigError;

/// Parse a symbol file: comma separated, line breaks and double quotes are
/// ignored, e.g. `"RELIANCE","SBIN",\n"TCS"`.
pub fn parse_list(content: &str) -> Vec<String> {
    content
        .replace(['\n', '\r', '"'], "")
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
        .collect()
}

/// Collect the configured symbols (inline list first, then the file),
/// dropping repeats while keeping first-seen order.
pub fn resolve(config: &SymbolsConfig, base_dir: &Path) -> Result<Vec<String>, Report<ConfigError>> {
    let mut symbols = config.list.clone();

    if let Some(file) = &config.file {
        let path = base_dir.join(file);
        let content = std::fs::read_to_string(&path)
            .change_context(ConfigError::SymbolList)
            .attach_with(|| format!("path: {}", path.display()))?;
        symbols.extend(parse_list(&content));
    }

    let mut seen = HashSet::new();
    symbols.retain(|s| seen.insert(s.clone()));

    if symbols.is_empty() {
        return Err(Report::new(ConfigError::Validation {
            field: "symbols: no symbols configured (set symbols.list or symbols.file)".into(),
        }));
    }

    Ok(symbols)
}
