//! `researchflow seed`: directories and the default knowledge database.

use anyhow::{Context, Result};
use researchflow_core::knowledge::{self, KnowledgeRecord};
use researchflow_env::{ensure_layout, BootstrapPlan};

pub fn cmd_seed(show: bool) -> Result<i32> {
    let plan = BootstrapPlan::from_env();
    ensure_layout(&plan)?;

    if show {
        let Some(ref seed) = plan.seed else {
            return Ok(0);
        };
        let records = knowledge::load_knowledge_db(&seed.path)
            .with_context(|| format!("Failed to read {}", seed.path.display()))?;
        eprintln!();
        eprintln!("📚 {} record(s) in {}", records.len(), seed.path.display());
        for line in records.iter().map(describe) {
            println!("{}", line);
        }
    }
    Ok(0)
}

fn describe(record: &KnowledgeRecord) -> String {
    let mut line = format!("{:>4}  {}", record.id, record.kind);
    if !record.tags.is_empty() {
        line.push_str(&format!("  [{}]", record.tags.join(", ")));
    }
    if record.embedding.is_some() {
        line.push_str("  (embedded)");
    }
    line
}
