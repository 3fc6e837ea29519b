// src/bin/analyze_file.rs
use std::env;
use std::fs;
use anyhow::{Context, Result};
use log::info;
use serde::Deserialize;
use property_analyzer::models::{FinancialAssumptions, PropertyInput};
use property_analyzer::services::analyzer::calculate_property_analysis;
use property_analyzer::services::report::generate_analysis_report;

#[derive(Deserialize)]
struct AnalysisFile {
    property: PropertyInput,
    #[serde(default)]
    assumptions: FinancialAssumptions,
}

/// Runs an analysis from a JSON file shaped like the /api/analyze body and
/// prints the analysis and report.
fn main() -> Result<()> {
    env_logger::init();

    let path = env::args().nth(1).context("usage: analyze_file <path.json>")?;
    let contents = fs::read_to_string(&path).with_context(|| format!("reading {}", path))?;
    let file: AnalysisFile = serde_json::from_str(&contents).context("parsing analysis file")?;

    let property = file.property.validate()?;
    file.assumptions.validate()?;
    info!("Analyzing {}", property.address);

    let analysis = calculate_property_analysis(&property, &file.assumptions);
    let report = generate_analysis_report(&analysis);

    println!("{}", serde_json::to_string_pretty(&serde_json::json!({
        "analysis": analysis,
        "report": report,
    }))?);
    Ok(())
}
