use std::collections::{BTreeMap, HashMap};

use anyhow::Context;
use chrono::NaiveDate;
use sqlx::{PgPool, Row};
use tracing::{info, warn};
use uuid::Uuid;

use crate::models::{EmploymentStatus, RawResponse};

/// Rating columns accepted by the CSV importer.
pub const RATING_FIELDS: [&str; 4] = ["po", "peo", "pso", "course"];

pub async fn init_db(pool: &PgPool) -> anyhow::Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}

struct NewResponse<'a> {
    source_key: String,
    survey: &'a str,
    batch: &'a str,
    employer_name: Option<&'a str>,
    institution_name: Option<&'a str>,
    status: EmploymentStatus,
    salary: Option<f64>,
    submitted_at: NaiveDate,
    ratings: Vec<(&'a str, &'a str)>,
}

/// Returns false when `source_key` was already imported.
async fn insert_response(pool: &PgPool, response: &NewResponse<'_>) -> anyhow::Result<bool> {
    let mut tx = pool.begin().await?;
    let id = Uuid::new_v4();

    let result = sqlx::query(
        r#"
        INSERT INTO survey_insights.responses
        (id, survey, batch, employer_name, institution_name, status, salary, submitted_at, source_key)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        ON CONFLICT (source_key) DO NOTHING
        "#,
    )
    .bind(id)
    .bind(response.survey)
    .bind(response.batch)
    .bind(response.employer_name)
    .bind(response.institution_name)
    .bind(response.status.as_str())
    .bind(response.salary)
    .bind(response.submitted_at)
    .bind(&response.source_key)
    .execute(&mut *tx)
    .await?;

    if result.rows_affected() == 0 {
        tx.rollback().await?;
        return Ok(false);
    }

    for (field, payload) in &response.ratings {
        sqlx::query(
            r#"
            INSERT INTO survey_insights.response_ratings (response_id, field, payload)
            VALUES ($1, $2, $3)
            "#,
        )
        .bind(id)
        .bind(*field)
        .bind(*payload)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;
    Ok(true)
}

pub async fn seed(pool: &PgPool) -> anyhow::Result<usize> {
    let rows = vec![
        (
            "seed-001",
            EmploymentStatus::Employed,
            Some("Tata Consultancy Services"),
            None,
            Some(3.6),
            r#"{"1":5,"2":4,"3":4}"#,
            r#"{"curriculum":4,"labs":5,"placement_support":4}"#,
        ),
        (
            "seed-002",
            EmploymentStatus::Employed,
            Some("TCS"),
            None,
            Some(4.0),
            r#"{"1":3,"2":4,"3":5}"#,
            r#"{"curriculum":3,"labs":4,"placement_support":5}"#,
        ),
        (
            "seed-003",
            EmploymentStatus::Employed,
            Some("Infosys Limited, Bangalore"),
            None,
            Some(3.6),
            r#"{"1":4,"2":4,"3":3}"#,
            r#"{"curriculum":4,"labs":4,"placement_support":3}"#,
        ),
        (
            "seed-004",
            EmploymentStatus::Employed,
            Some("infosys ltd"),
            None,
            Some(6.5),
            r#"{"1":5,"2":5,"3":4}"#,
            r#"{"curriculum":5,"labs":4,"placement_support":4}"#,
        ),
        (
            "seed-005",
            EmploymentStatus::HigherStudies,
            None,
            Some("Anna University"),
            None,
            r#"{"1":4,"2":3,"3":4}"#,
            r#"{"curriculum":4,"labs":3,"placement_support":2}"#,
        ),
        (
            "seed-006",
            EmploymentStatus::Employed,
            Some("Zoho Corporation"),
            None,
            Some(11.0),
            r#"{"1":5,"2":5,"3":5}"#,
            r#"{"curriculum":5,"labs":5,"placement_support":5}"#,
        ),
        (
            "seed-007",
            EmploymentStatus::NotEmployed,
            None,
            None,
            None,
            r#"{"1":2,"2":3,"3":"n/a"}"#,
            r#"{"curriculum":2,"labs":3}"#,
        ),
    ];

    let mut inserted = 0usize;
    for (index, (source_key, status, employer, institution, salary, po, course)) in
        rows.into_iter().enumerate()
    {
        let submitted_at = NaiveDate::from_ymd_opt(2026, 4, 1 + index as u32)
            .context("invalid date")?;
        let response = NewResponse {
            source_key: source_key.to_string(),
            survey: "alumni",
            batch: "2022-2026",
            employer_name: employer,
            institution_name: institution,
            status,
            salary,
            submitted_at,
            ratings: vec![("po", po), ("course", course)],
        };
        if insert_response(pool, &response).await? {
            inserted += 1;
        }
    }

    info!(inserted, "seed rows written");
    Ok(inserted)
}

/// Responses for the given scope in a stable order (`submitted_at`, then
/// `source_key`). Entity resolution depends on this order.
pub async fn fetch_responses(
    pool: &PgPool,
    survey: Option<&str>,
    batch: Option<&str>,
) -> anyhow::Result<Vec<RawResponse>> {
    let rows = sqlx::query(
        "SELECT id, employer_name, institution_name, status, salary, submitted_at \
         FROM survey_insights.responses \
         WHERE ($1::text IS NULL OR survey = $1) \
         AND ($2::text IS NULL OR batch = $2) \
         ORDER BY submitted_at, source_key",
    )
    .bind(survey)
    .bind(batch)
    .fetch_all(pool)
    .await
    .context("failed to fetch responses")?;

    let mut responses = Vec::with_capacity(rows.len());
    let mut positions: HashMap<Uuid, usize> = HashMap::new();

    for row in rows {
        let id: Uuid = row.get("id");
        let raw_status: String = row.get("status");
        let status = EmploymentStatus::parse(&raw_status).unwrap_or_else(|| {
            warn!(response = %id, status = %raw_status, "unknown status, treating as not employed");
            EmploymentStatus::NotEmployed
        });

        positions.insert(id, responses.len());
        responses.push(RawResponse {
            id,
            submitted_at: row.get("submitted_at"),
            employer_name: row.get("employer_name"),
            institution_name: row.get("institution_name"),
            status,
            salary: row.get("salary"),
            ratings: BTreeMap::new(),
        });
    }

    if responses.is_empty() {
        return Ok(responses);
    }

    let ids: Vec<Uuid> = positions.keys().copied().collect();
    let rating_rows = sqlx::query(
        "SELECT response_id, field, payload FROM survey_insights.response_ratings \
         WHERE response_id = ANY($1)",
    )
    .bind(&ids[..])
    .fetch_all(pool)
    .await
    .context("failed to fetch rating payloads")?;

    for row in rating_rows {
        let response_id: Uuid = row.get("response_id");
        if let Some(position) = positions.get(&response_id) {
            responses[*position]
                .ratings
                .insert(row.get("field"), row.get("payload"));
        }
    }

    info!(responses = responses.len(), "responses loaded");
    Ok(responses)
}

pub async fn import_csv(pool: &PgPool, csv_path: &std::path::Path) -> anyhow::Result<usize> {
    #[derive(serde::Deserialize)]
    struct CsvRow {
        survey: String,
        batch: String,
        employer_name: Option<String>,
        institution_name: Option<String>,
        status: String,
        salary: Option<f64>,
        submitted_at: NaiveDate,
        source_key: Option<String>,
        po: Option<String>,
        peo: Option<String>,
        pso: Option<String>,
        course: Option<String>,
    }

    let mut reader = csv::Reader::from_path(csv_path)
        .with_context(|| format!("failed to open {}", csv_path.display()))?;
    let mut inserted = 0usize;

    for (line, result) in reader.deserialize::<CsvRow>().enumerate() {
        let row = result.with_context(|| format!("invalid CSV record {}", line + 1))?;
        let status = EmploymentStatus::parse(&row.status).with_context(|| {
            format!("record {}: unknown status '{}'", line + 1, row.status)
        })?;

        let ratings: Vec<(&str, &str)> = RATING_FIELDS
            .iter()
            .zip([&row.po, &row.peo, &row.pso, &row.course])
            .filter_map(|(field, payload)| {
                payload
                    .as_deref()
                    .filter(|value| !value.trim().is_empty())
                    .map(|value| (*field, value))
            })
            .collect();

        let response = NewResponse {
            source_key: row
                .source_key
                .clone()
                .unwrap_or_else(|| format!("import-{}", Uuid::new_v4())),
            survey: &row.survey,
            batch: &row.batch,
            employer_name: row.employer_name.as_deref(),
            institution_name: row.institution_name.as_deref(),
            status,
            salary: row.salary,
            submitted_at: row.submitted_at,
            ratings,
        };

        if insert_response(pool, &response).await? {
            inserted += 1;
        }
    }

    Ok(inserted)
}
