use std::fmt::Write;
use std::path::Path;

use anyhow::Context;

use crate::attainment::RatingScale;
use crate::config::ResolverConfig;
use crate::models::{EmploymentStatus, ItemSummary, RatingDistribution, RawResponse};
use crate::placement;
use crate::ratings;
use crate::salary::{self, SalaryBucket};

const TOP_LIMIT: usize = 10;

fn write_distribution(output: &mut String, distribution: &RatingDistribution) {
    if distribution.total == 0 {
        let _ = writeln!(output, "No ratings recorded.");
        return;
    }

    let _ = writeln!(
        output,
        "{} ratings, overall average {:.2}",
        distribution.total,
        distribution.average()
    );
    for (value, count) in distribution.counts.iter().rev() {
        let pct = distribution.percentages.get(value).copied().unwrap_or(0.0);
        let _ = writeln!(output, "- {}: {} ({:.1}%)", value, count, pct);
    }
}

fn write_items(output: &mut String, items: &[ItemSummary], scale: RatingScale) {
    if items.is_empty() {
        return;
    }

    let values: Vec<u8> = scale.values().collect();
    let _ = write!(output, "\n| Item | Average | Level |");
    for value in &values {
        let _ = write!(output, " {} |", value);
    }
    let _ = write!(output, "\n|---|---|---|");
    for _ in &values {
        let _ = write!(output, "---|");
    }
    let _ = writeln!(output);

    for item in items {
        let _ = write!(
            output,
            "| {} | {:.2} | {} |",
            item.item, item.average, item.level
        );
        for value in &values {
            let pct = item.percentages.get(value).copied().unwrap_or(0.0);
            let _ = write!(output, " {:.1}% |", pct);
        }
        let _ = writeln!(output);
    }
}

fn write_ranking(output: &mut String, ranking: &[(String, usize)], empty: &str) {
    if ranking.is_empty() {
        let _ = writeln!(output, "{empty}");
    } else {
        for (name, count) in ranking {
            let _ = writeln!(output, "- {}: {}", name, count);
        }
    }
}

pub fn build_report(
    scope: Option<&str>,
    responses: &[RawResponse],
    fields: &[&str],
    scale: RatingScale,
    config: &ResolverConfig,
) -> String {
    let mut output = String::new();
    let scope_label = scope.unwrap_or("all surveys");

    let _ = writeln!(output, "# Survey Insights Report");
    let _ = writeln!(
        output,
        "Generated for {} ({} responses)",
        scope_label,
        responses.len()
    );

    let breakdown = placement::status_breakdown(responses);
    let _ = writeln!(output);
    let _ = writeln!(output, "## Outcome Mix");
    if breakdown.total == 0 {
        let _ = writeln!(output, "No responses recorded for this scope.");
    } else {
        for status in EmploymentStatus::ordered() {
            let count = breakdown.counts.get(&status).copied().unwrap_or(0);
            let _ = writeln!(
                output,
                "- {}: {} ({:.1}%)",
                status.label(),
                count,
                ratings::round_to(count as f64 / breakdown.total as f64 * 100.0, 1)
            );
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Top Recruiters");
    write_ranking(
        &mut output,
        &placement::top_recruiters(responses, config, TOP_LIMIT),
        "No employers reported.",
    );

    let _ = writeln!(output);
    let _ = writeln!(output, "## Higher Studies Destinations");
    write_ranking(
        &mut output,
        &placement::top_institutions(responses, config, TOP_LIMIT),
        "No institutions reported.",
    );

    let stats = salary::salary_stats(responses);
    let _ = writeln!(output);
    let _ = writeln!(output, "## Salary Packages");
    if stats.employed_count == 0 {
        let _ = writeln!(output, "No packages reported.");
    } else {
        let _ = writeln!(
            output,
            "Average package {:.2} LPA across {} respondents",
            stats.mean, stats.employed_count
        );
        for bucket in SalaryBucket::ordered() {
            let count = stats.buckets.get(&bucket).copied().unwrap_or(0);
            let _ = writeln!(output, "- {}: {}", bucket.label(), count);
        }

        let _ = writeln!(output);
        let _ = writeln!(output, "### Average Package by Company");
        for package in placement::average_package_by_company(responses, config)
            .iter()
            .take(TOP_LIMIT)
        {
            let _ = writeln!(
                output,
                "- {}: {:.2} LPA ({} respondents)",
                package.company, package.average_salary, package.respondents
            );
        }
    }

    for field in fields {
        let distribution = ratings::aggregate_flat(responses, field, scale);
        let items = ratings::summarize_items(
            &ratings::aggregate_per_item(responses, field, scale),
            scale,
        );

        let _ = writeln!(output);
        let _ = writeln!(output, "## Ratings: {}", field.to_uppercase());
        write_distribution(&mut output, &distribution);
        write_items(&mut output, &items, scale);
    }

    output
}

/// Writes per-item summaries as CSV: `field,item,average,level,total,pct_<v>...`.
pub fn write_item_csv(
    path: &Path,
    field: &str,
    items: &[ItemSummary],
    scale: RatingScale,
) -> anyhow::Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("failed to create {}", path.display()))?;

    let mut header = vec![
        "field".to_string(),
        "item".to_string(),
        "average".to_string(),
        "level".to_string(),
        "total".to_string(),
    ];
    header.extend(scale.values().map(|value| format!("pct_{value}")));
    writer.write_record(&header)?;

    for item in items {
        let mut record = vec![
            field.to_string(),
            item.item.to_string(),
            format!("{:.2}", item.average),
            item.level.label().to_string(),
            item.total.to_string(),
        ];
        record.extend(scale.values().map(|value| {
            format!("{:.1}", item.percentages.get(&value).copied().unwrap_or(0.0))
        }));
        writer.write_record(&record)?;
    }

    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Vec<RawResponse> {
        vec![
            RawResponse::new(EmploymentStatus::Employed)
                .with_employer("Tata Consultancy Services")
                .with_salary(3.6)
                .with_ratings("po", r#"{"1":5,"2":4}"#),
            RawResponse::new(EmploymentStatus::Employed)
                .with_employer("TCS")
                .with_salary(4.4)
                .with_ratings("po", r#"{"1":3,"2":4}"#),
            RawResponse::new(EmploymentStatus::HigherStudies)
                .with_institution("Anna University"),
        ]
    }

    #[test]
    fn report_includes_every_section() {
        let report = build_report(
            Some("alumni"),
            &sample(),
            &["po"],
            RatingScale::FivePoint,
            &ResolverConfig::default(),
        );

        assert!(report.contains("Generated for alumni (3 responses)"));
        assert!(report.contains("- Employed: 2 (66.7%)"));
        assert!(report.contains("- Tata Consultancy Services: 2"));
        assert!(report.contains("- Anna University: 1"));
        assert!(report.contains("Average package 4.00 LPA across 2 respondents"));
        assert!(report.contains("## Ratings: PO"));
        assert!(report.contains("- 4: 2 (50.0%)"));
        assert!(report.contains("| 1 | 4.00 | Very Good |"));
    }

    #[test]
    fn empty_scope_renders_placeholders() {
        let report = build_report(
            None,
            &[],
            &["course"],
            RatingScale::FivePoint,
            &ResolverConfig::default(),
        );
        assert!(report.contains("Generated for all surveys (0 responses)"));
        assert!(report.contains("No responses recorded for this scope."));
        assert!(report.contains("No employers reported."));
        assert!(report.contains("No packages reported."));
        assert!(report.contains("No ratings recorded."));
    }

    #[test]
    fn csv_export_has_one_row_per_item() {
        let responses = sample();
        let items = ratings::summarize_items(
            &ratings::aggregate_per_item(&responses, "po", RatingScale::FivePoint),
            RatingScale::FivePoint,
        );
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("po.csv");
        write_item_csv(&path, "po", &items, RatingScale::FivePoint).expect("csv written");

        let contents = std::fs::read_to_string(&path).expect("csv readable");
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(
            lines[0],
            "field,item,average,level,total,pct_1,pct_2,pct_3,pct_4,pct_5"
        );
        assert_eq!(lines[1], "po,1,4.00,Very Good,2,0.0,0.0,50.0,0.0,50.0");
        assert_eq!(lines[2], "po,2,4.00,Very Good,2,0.0,0.0,0.0,100.0,0.0");
    }
}
