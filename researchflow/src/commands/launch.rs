//! `researchflow launch`: bootstrap the environment and run the agent.

use anyhow::Result;
use researchflow_env::{prepare_and_launch, BootstrapPlan, SystemRunner, WhichLocator};

/// Returns the agent's exit status.
pub fn cmd_launch() -> Result<i32> {
    super::banner();
    let plan = BootstrapPlan::from_env();
    tracing::debug!("Bootstrap plan: {:?}", plan);
    let report = prepare_and_launch(&plan, &SystemRunner, &WhichLocator)?;
    Ok(report.exit_code)
}
