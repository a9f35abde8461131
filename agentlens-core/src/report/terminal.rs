//! Console report with a numbered top-N list per question.

use crate::analysis::AnalysisReport;
use crate::config::OutputConfig;
use crate::ranking::{CapabilityRank, GroupKey, MedianRank, ScoreField};

const RULE_WIDTH: usize = 50;

/// Render the analysis as plain text for stdout.
pub fn render_terminal(report: &AnalysisReport, output: &OutputConfig) -> String {
    let mut out = String::new();

    out.push_str(&format!(
        "Successfully processed {} records\n",
        report.overview.total_rows
    ));
    out.push_str("Analysis Results:\n");
    out.push_str(&"=".repeat(RULE_WIDTH));
    out.push('\n');

    push_capability_section(
        &mut out,
        1,
        GroupKey::AgentType,
        &report.agent_type_multimodal,
        output.percent_precision,
    );
    out.push('\n');
    push_capability_section(
        &mut out,
        2,
        GroupKey::ModelArchitecture,
        &report.model_architecture_multimodal,
        output.percent_precision,
    );
    out.push('\n');
    push_median_section(
        &mut out,
        3,
        GroupKey::TaskCategory,
        ScoreField::BiasDetectionScore,
        &report.task_category_bias,
        output.median_precision,
    );

    out
}

fn push_capability_section(
    out: &mut String,
    question: usize,
    key: GroupKey,
    ranks: &[CapabilityRank],
    precision: u32,
) {
    out.push_str(&format!(
        "Question {question} - Top {} {} by Multimodal Support:\n",
        ranks.len(),
        key.label()
    ));
    if ranks.is_empty() {
        out.push_str("   (no data)\n");
        return;
    }
    for (i, rank) in ranks.iter().enumerate() {
        out.push_str(&format!(
            "{}. {}: {:.prec$}% ({}/{})\n",
            i + 1,
            rank.key,
            rank.percent(precision),
            rank.positive_count,
            rank.total_count,
            prec = precision as usize
        ));
    }
}

fn push_median_section(
    out: &mut String,
    question: usize,
    key: GroupKey,
    score: ScoreField,
    ranks: &[MedianRank],
    precision: u32,
) {
    out.push_str(&format!(
        "Question {question} - Top {} {} by {}:\n",
        ranks.len(),
        key.label(),
        score.label()
    ));
    if ranks.is_empty() {
        out.push_str("   (no data)\n");
        return;
    }
    for (i, rank) in ranks.iter().enumerate() {
        out.push_str(&format!(
            "{}. {}: {:.prec$}\n",
            i + 1,
            rank.key,
            rank.median,
            prec = precision as usize
        ));
    }
}
