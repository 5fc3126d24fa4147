//! `dtnctl prefs`: show every preference with its effective value.

use anyhow::{Context, Result};
use colored::Colorize;
use tabled::{settings::Style, Table, Tabled};

use dtn_core::{preferences, PreferenceError, PreferenceSet};

use crate::HostArgs;

#[derive(Tabled)]
struct PrefRow {
    #[tabled(rename = "key")]
    key: String,
    #[tabled(rename = "value")]
    value: String,
    #[tabled(rename = "source")]
    source: String,
}

pub fn run(host: &HostArgs) -> Result<()> {
    let path = host.prefs_path()?;
    let stored = match preferences::load_at(&path) {
        Ok(set) => set,
        Err(PreferenceError::NotFound { .. }) => PreferenceSet::new(),
        Err(err) => {
            return Err(err)
                .with_context(|| format!("failed to load preferences from '{}'", path.display()))
        }
    };

    let defaults = PreferenceSet::with_defaults();
    let mut rows: Vec<PrefRow> = defaults
        .iter()
        .filter(|(key, _)| stored.get(key).is_none())
        .map(|(key, value)| PrefRow {
            key: key.clone(),
            value: value.to_string(),
            source: "default".dimmed().to_string(),
        })
        .chain(stored.iter().map(|(key, value)| PrefRow {
            key: key.clone(),
            value: value.to_string(),
            source: "stored".green().to_string(),
        }))
        .collect();
    rows.sort_by(|a, b| a.key.cmp(&b.key));

    let mut table = Table::new(rows);
    table.with(Style::rounded());
    println!("{table}");
    println!("  Store: {}", path.display());
    Ok(())
}
