//! `researchflow check`: environment doctor.

use anyhow::{Context, Result};
use researchflow_env::api_probe::HttpApiProbe;
use researchflow_env::doctor::{run_doctor, DoctorOptions};
use researchflow_env::{SystemRunner, WhichLocator};

pub fn cmd_check(json: bool, skip_api: bool) -> Result<i32> {
    let opts = DoctorOptions::from_env(!skip_api);
    let report = run_doctor(&opts, &SystemRunner, &WhichLocator, &HttpApiProbe);

    if json {
        let out = serde_json::to_string_pretty(&report).context("Failed to serialize report")?;
        println!("{}", out);
    } else {
        report.print();
    }
    Ok(if report.passed() { 0 } else { 1 })
}
