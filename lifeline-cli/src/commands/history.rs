//! Show a user's recent diagnoses

use anyhow::Result;
use clap::Args;
use comfy_table::{Cell, Color, ContentArrangement, Table, presets::UTF8_FULL_CONDENSED};
use lifeline_core::HistoryEntry;

use crate::components::build_history;
use crate::config::ConfigLoader;

#[derive(Debug, Args)]
pub struct HistoryArgs {
    /// User whose history to show
    #[arg(short, long, default_value = "local")]
    pub user: String,

    /// Number of entries (defaults to history.recent_limit)
    #[arg(short = 'n', long)]
    pub limit: Option<usize>,
}

pub async fn run(args: HistoryArgs) -> Result<()> {
    let config = ConfigLoader::load()?;
    let history = build_history(&config.history)?;
    let limit = args.limit.unwrap_or(config.history.recent_limit);

    let entries = history.list_recent(&args.user, limit).await?;
    if entries.is_empty() {
        println!("No history for {}", args.user);
        return Ok(());
    }

    println!("{}", history_table(&entries));
    Ok(())
}

fn history_table(entries: &[HistoryEntry]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("When").fg(Color::Cyan),
            Cell::new("Diagnosis").fg(Color::Cyan),
            Cell::new("Symptoms").fg(Color::Cyan),
        ]);

    for entry in entries {
        let symptoms: Vec<_> = entry.symptoms.iter().map(|s| s.label()).collect();
        table.add_row(vec![
            Cell::new(entry.timestamp.format("%Y-%m-%d %H:%M").to_string()),
            Cell::new(&entry.diagnosis),
            Cell::new(symptoms.join(", ")),
        ]);
    }

    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use lifeline_core::SymptomSet;

    #[test]
    fn test_history_table_rows() {
        let symptoms: SymptomSet = ["high_fever", "cough"].into_iter().collect();
        let entries = vec![
            HistoryEntry::now("Influenza", symptoms.clone()),
            HistoryEntry::now("Common Cold", symptoms),
        ];

        let table = history_table(&entries);
        assert_eq!(table.row_iter().count(), 2);

        let rendered = table.to_string();
        assert!(rendered.contains("Influenza"));
        assert!(rendered.contains("high fever, cough"));
    }

    #[test]
    fn test_history_table_empty() {
        let table = history_table(&[]);
        assert_eq!(table.row_iter().count(), 0);
        assert!(table.to_string().contains("Diagnosis"));
    }
}
