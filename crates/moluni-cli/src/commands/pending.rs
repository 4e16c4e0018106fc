use moluni_core::{JsonFileLedger, Ledger};
use moluni_domain::LedgerEntry;

use crate::cli::PendingArgs;
use crate::config::AppConfig;
use crate::error::Result;

/// Sólo lectura: el ledger nunca se reescribe desde aquí.
pub fn run(args: PendingArgs, app: &AppConfig) -> Result<()> {
    let entries = JsonFileLedger::new(&app.ledger_path).load()?;
    if args.json {
        println!("{}", serde_json::to_string_pretty(&entries).unwrap_or_default());
    } else {
        print!("{}", render_table(&entries));
    }
    Ok(())
}

pub fn render_table(entries: &[LedgerEntry]) -> String {
    if entries.is_empty() {
        return "no pending jobs\n".to_string();
    }
    let width = entries.iter().map(|e| e.id.len()).max().unwrap_or(0).max(2);
    let mut out = format!("{:<width$}  {:<4}  {:<9}  {}\n", "ID", "TYPE", "STATUS", "SUBMITTED");
    for e in entries {
        out.push_str(&format!("{:<width$}  {:<4}  {:<9}  {}\n",
                              e.id,
                              e.calculation_type.as_str(),
                              e.status.as_str(),
                              e.submission_time.to_rfc3339()));
    }
    out
}
