//! Text and CSV renderings of an [`ExecutionSummary`].

use std::io::{self, Write};

use comorbid_core::{DiseaseId, ScoredClique};

use super::commands::ExecutionSummary;

/// Renders `summary` to `writer` in a human-readable text format.
///
/// Each ranked clique is printed as `score\tsupport\tmembers`.
///
/// # Errors
/// Returns [`io::Error`] if writing to the supplied writer fails.
pub fn render_summary(summary: &ExecutionSummary, mut writer: impl Write) -> io::Result<()> {
    let report = &summary.report;
    writeln!(writer, "data source: {}", summary.data_source)?;
    writeln!(
        writer,
        "patients: {} ({} with outcome)",
        summary.patients, summary.outcomes
    )?;
    writeln!(writer, "graph: {} nodes, {} edges", summary.nodes, summary.edges)?;
    writeln!(
        writer,
        "size bound: {}, min support: {}, capacity: {}",
        summary.size_bound, summary.min_support, summary.capacity
    )?;
    if !summary.fixed.is_empty() {
        writeln!(writer, "fixed: {}", join(&summary.fixed))?;
    }
    writeln!(writer, "recursive calls: {}", report.calls())?;
    writeln!(writer, "termination: {}", report.termination())?;
    writeln!(
        writer,
        "preparation time: {:.3}s, solving time: {:.3}s",
        summary.preparation.as_secs_f64(),
        summary.solving.as_secs_f64()
    )?;
    writeln!(writer, "cliques: {}", report.cliques().len())?;
    for clique in report.cliques() {
        writeln!(
            writer,
            "{:.6}\t{}\t{}",
            clique.score().value(),
            clique.support(),
            join(clique.members())
        )?;
    }
    Ok(())
}

/// Writes the parameter header, a blank row and one `Clique,Mu` row per
/// ranked clique.
///
/// Searches seeded with fixed diseases also record them and the number of
/// free slots (`delta`).
///
/// # Errors
/// Returns [`io::Error`] if writing to the supplied writer fails.
pub fn write_csv(summary: &ExecutionSummary, mut writer: impl Write) -> io::Result<()> {
    if !summary.fixed.is_empty() {
        write_row(&mut writer, &["Fixed Vertices", &join(&summary.fixed)])?;
        let delta = summary.size_bound.saturating_sub(summary.fixed.len());
        write_row(&mut writer, &["delta", &delta.to_string()])?;
    }
    write_row(&mut writer, &["b", &summary.size_bound.to_string()])?;
    write_row(
        &mut writer,
        &[
            "Preparation Time",
            &summary.preparation.as_secs_f64().to_string(),
        ],
    )?;
    write_row(
        &mut writer,
        &["Solving Time", &summary.solving.as_secs_f64().to_string()],
    )?;
    write_row(
        &mut writer,
        &["#Recursive Calls", &summary.report.calls().to_string()],
    )?;
    writeln!(writer)?;
    write_row(&mut writer, &["Clique", "Mu"])?;
    for clique in summary.report.cliques() {
        write_clique(&mut writer, clique)?;
    }
    Ok(())
}

fn write_clique(writer: &mut impl Write, clique: &ScoredClique) -> io::Result<()> {
    write_row(
        writer,
        &[&join(clique.members()), &clique.score().value().to_string()],
    )
}

fn write_row(writer: &mut impl Write, fields: &[&str]) -> io::Result<()> {
    let row: Vec<String> = fields.iter().map(|field| quote(field)).collect();
    writeln!(writer, "{}", row.join(","))
}

fn quote(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_owned()
    }
}

fn join(members: &[DiseaseId]) -> String {
    members
        .iter()
        .map(DiseaseId::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}
