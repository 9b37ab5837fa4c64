use anyhow::Result;
use redundancy_protocol::{OutputFormat, RunOutcome, RunSuccess};

pub fn render(outcome: &RunOutcome, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(outcome)?),
        OutputFormat::Yaml => Ok(serde_yaml::to_string(outcome)?),
        OutputFormat::Markdown => Ok(render_markdown(outcome)),
        OutputFormat::Html => Ok(render_html(outcome)),
    }
}

fn render_markdown(outcome: &RunOutcome) -> String {
    let mut md = String::new();
    match outcome {
        RunOutcome::Failure(failure) => {
            md.push_str("# Redundancy analysis failed\n\n");
            for error in &failure.errors {
                md.push_str(&format!("- {error}\n"));
            }
            md.push_str(&format!(
                "\nElapsed: `{:.2}s`\n",
                failure.execution_time_sec
            ));
        }
        RunOutcome::Success(success) => {
            md.push_str("# Redundancy analysis report\n\n");
            push_metrics_markdown(&mut md, success);
            if success.findings.is_empty() {
                md.push_str("No redundancy findings.\n");
                return md;
            }

            md.push_str("## Findings\n\n");
            md.push_str(
                "| cluster | priority | score | representative | redundant | time saved (s) |\n",
            );
            md.push_str("|---:|---|---:|---|---:|---:|\n");
            for finding in &success.findings {
                md.push_str(&format!(
                    "| `{}` | {} | `{:.3}` | `{}` | `{}` | `{:.2}` |\n",
                    finding.cluster_id,
                    finding.priority.as_str(),
                    finding.redundancy_score,
                    finding.representative_test_id,
                    finding.redundant_test_ids.len(),
                    finding.analysis.execution_time_saved_sec,
                ));
            }
            md.push('\n');

            for finding in &success.findings {
                md.push_str(&format!("### Cluster {}\n\n", finding.cluster_id));
                md.push_str(&format!("{}\n\n", finding.recommendation_text));
                md.push_str(&format!(
                    "Keep `{}`; candidates for removal:\n\n",
                    finding.representative_test_id
                ));
                for test_id in &finding.redundant_test_ids {
                    md.push_str(&format!("- `{test_id}`\n"));
                }
                if let Some(recommendation) = &finding.recommendation {
                    md.push_str(&format!(
                        "\nAction: **{}** (priority score `{:.1}`)\n",
                        recommendation.action.as_str(),
                        recommendation.priority_score
                    ));
                    for line in &recommendation.rationale {
                        md.push_str(&format!("- {line}\n"));
                    }
                }
                md.push('\n');
            }
        }
    }
    md
}

fn push_metrics_markdown(md: &mut String, success: &RunSuccess) {
    let metrics = &success.metrics;
    md.push_str(&format!("- Tests analyzed: `{}`\n", metrics.total_tests));
    md.push_str(&format!("- Clusters found: `{}`\n", metrics.clusters_found));
    md.push_str(&format!(
        "- Findings: `{}` covering `{}` redundant tests\n",
        metrics.redundancy_findings, metrics.redundant_tests
    ));
    md.push_str(&format!(
        "- Potential suite reduction: `{:.2}%`\n",
        metrics.reduction_percentage
    ));
    md.push_str(&format!(
        "- Elapsed: `{:.2}s`\n\n",
        success.execution_time_sec
    ));
}

fn render_html(outcome: &RunOutcome) -> String {
    let mut html = String::from(
        "<!DOCTYPE html>\n<html>\n<head><meta charset=\"utf-8\">\
         <title>Redundancy analysis</title></head>\n<body>\n",
    );
    match outcome {
        RunOutcome::Failure(failure) => {
            html.push_str("<h1>Redundancy analysis failed</h1>\n<ul>\n");
            for error in &failure.errors {
                html.push_str(&format!("<li>{}</li>\n", escape_html(error)));
            }
            html.push_str("</ul>\n");
        }
        RunOutcome::Success(success) => {
            let metrics = &success.metrics;
            html.push_str("<h1>Redundancy analysis report</h1>\n");
            html.push_str(&format!(
                "<p>{} tests, {} clusters, {} findings, {:.2}% potential reduction</p>\n",
                metrics.total_tests,
                metrics.clusters_found,
                metrics.redundancy_findings,
                metrics.reduction_percentage
            ));
            html.push_str(
                "<table border=\"1\">\n<tr><th>Cluster</th><th>Priority</th>\
                 <th>Score</th><th>Representative</th><th>Redundant tests</th></tr>\n",
            );
            for finding in &success.findings {
                html.push_str(&format!(
                    "<tr><td>{}</td><td>{}</td><td>{:.3}</td><td>{}</td><td>{}</td></tr>\n",
                    finding.cluster_id,
                    finding.priority.as_str(),
                    finding.redundancy_score,
                    escape_html(&finding.representative_test_id),
                    escape_html(&finding.redundant_test_ids.join(", ")),
                ));
            }
            html.push_str("</table>\n");
        }
    }
    html.push_str("</body>\n</html>\n");
    html
}

fn escape_html(raw: &str) -> String {
    raw.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}
