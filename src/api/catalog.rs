//! ModelCatalog - read-only queries over the loaded model table
//!
//! Each query returns its rows as ordered column/value mappings so callers can
//! render or serialize them without knowing the result shape up front.

use crate::error::{InsightsError, Result};
use rusqlite::types::ValueRef;
use rusqlite::{Connection, OpenFlags, Params, params};
use serde_json::{Map, Number, Value};
use std::path::Path;

pub const DEFAULT_YEAR_LIMIT: usize = 10;
pub const DEFAULT_LARGEST_LIMIT: usize = 10;
pub const DEFAULT_ORGANIZATION_LIMIT: usize = 10;
pub const DEFAULT_FRONTIER_LIMIT: usize = 20;
pub const DEFAULT_DOMAIN_LIMIT: usize = 10;
pub const DEFAULT_DOMAIN_DISTRIBUTION_LIMIT: usize = 15;
pub const DEFAULT_COST_LIMIT: usize = 20;
pub const DEFAULT_RECENT_DAYS: u32 = 365;
pub const DEFAULT_RECENT_LIMIT: usize = 15;
pub const DEFAULT_SEARCH_LIMIT: usize = 50;

/// One result row: column names paired with their values, in select order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultRow {
    fields: Vec<(String, Value)>,
}

impl ResultRow {
    /// Value of a column, if the row has it
    pub fn get(&self, column: &str) -> Option<&Value> {
        self.fields
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value)
    }

    pub fn get_str(&self, column: &str) -> Option<&str> {
        self.get(column).and_then(Value::as_str)
    }

    pub fn get_i64(&self, column: &str) -> Option<i64> {
        self.get(column).and_then(Value::as_i64)
    }

    pub fn get_f64(&self, column: &str) -> Option<f64> {
        self.get(column).and_then(Value::as_f64)
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(name, _)| name.as_str())
    }

    /// The row as a JSON object
    pub fn to_json(&self) -> Value {
        let map: Map<String, Value> = self
            .fields
            .iter()
            .map(|(name, value)| (name.clone(), value.clone()))
            .collect();
        Value::Object(map)
    }
}

impl FromIterator<(String, Value)> for ResultRow {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().collect(),
        }
    }
}

fn json_value(value: ValueRef<'_>) -> Value {
    match value {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(i) => Value::Number(i.into()),
        ValueRef::Real(f) => Number::from_f64(f).map(Value::Number).unwrap_or(Value::Null),
        ValueRef::Text(bytes) | ValueRef::Blob(bytes) => {
            Value::String(String::from_utf8_lossy(bytes).into_owned())
        }
    }
}

/// Read-only query catalog over the `ai_models` table
pub struct ModelCatalog {
    conn: Connection,
}

impl ModelCatalog {
    /// Open an existing database read-only
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(InsightsError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("Database file not found: {}", path.display()),
            )));
        }

        let conn = Connection::open_with_flags(path, OpenFlags::SQLITE_OPEN_READ_ONLY)
            .map_err(|e| InsightsError::Storage(format!("Failed to open database: {}", e)))?;

        log::info!("ModelCatalog opened {}", path.display());
        Ok(Self { conn })
    }

    /// Query over an already open connection
    pub fn from_connection(conn: Connection) -> Self {
        Self { conn }
    }

    /// Run a query and collect every row
    pub fn execute_query<P: Params>(&self, sql: &str, params: P) -> Result<Vec<ResultRow>> {
        let mut stmt = self
            .conn
            .prepare(sql)
            .map_err(|e| InsightsError::Query(format!("Failed to prepare query: {}", e)))?;

        let columns: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();

        let rows = stmt
            .query_map(params, |row| {
                columns
                    .iter()
                    .enumerate()
                    .map(|(i, name)| -> rusqlite::Result<(String, Value)> {
                        Ok((name.clone(), json_value(row.get_ref(i)?)))
                    })
                    .collect::<rusqlite::Result<ResultRow>>()
            })
            .map_err(|e| InsightsError::Query(format!("Failed to run query: {}", e)))?;

        rows.collect::<rusqlite::Result<Vec<_>>>()
            .map_err(|e| InsightsError::Query(format!("Failed to read row: {}", e)))
    }

    /// Model counts per publication year, newest first
    pub fn models_by_year(&self, limit: Option<usize>) -> Result<Vec<ResultRow>> {
        self.execute_query(
            "SELECT strftime('%Y', publication_date) AS year, COUNT(*) AS model_count
             FROM ai_models
             WHERE publication_date IS NOT NULL
             GROUP BY strftime('%Y', publication_date)
             ORDER BY year DESC
             LIMIT ?1",
            params![limit_param(limit, DEFAULT_YEAR_LIMIT)],
        )
    }

    /// Largest models by parameter count
    pub fn largest_models(&self, limit: Option<usize>) -> Result<Vec<ResultRow>> {
        self.execute_query(
            "SELECT model, organization, parameters, publication_date, domain
             FROM ai_models
             WHERE parameters IS NOT NULL
             ORDER BY parameters DESC
             LIMIT ?1",
            params![limit_param(limit, DEFAULT_LARGEST_LIMIT)],
        )
    }

    /// Model counts per organization
    pub fn models_by_organization(&self, limit: Option<usize>) -> Result<Vec<ResultRow>> {
        self.execute_query(
            "SELECT organization, COUNT(*) AS model_count
             FROM ai_models
             WHERE organization IS NOT NULL
             GROUP BY organization
             ORDER BY model_count DESC, organization
             LIMIT ?1",
            params![limit_param(limit, DEFAULT_ORGANIZATION_LIMIT)],
        )
    }

    /// Frontier models, newest first
    pub fn frontier_models(&self, limit: Option<usize>) -> Result<Vec<ResultRow>> {
        self.execute_query(
            "SELECT model, organization, publication_date, parameters, domain, notability_criteria
             FROM ai_models
             WHERE frontier_model = 1
             ORDER BY publication_date DESC
             LIMIT ?1",
            params![limit_param(limit, DEFAULT_FRONTIER_LIMIT)],
        )
    }

    /// Models whose domain contains `domain`, or the domain distribution when
    /// no domain is given
    pub fn models_by_domain(
        &self,
        domain: Option<&str>,
        limit: Option<usize>,
    ) -> Result<Vec<ResultRow>> {
        match domain {
            Some(domain) => self.execute_query(
                "SELECT model, organization, publication_date, parameters, domain, task
                 FROM ai_models
                 WHERE domain LIKE ?1
                 ORDER BY publication_date DESC
                 LIMIT ?2",
                params![
                    format!("%{}%", domain),
                    limit_param(limit, DEFAULT_DOMAIN_LIMIT)
                ],
            ),
            None => self.execute_query(
                "SELECT domain, COUNT(*) AS model_count
                 FROM ai_models
                 WHERE domain IS NOT NULL
                 GROUP BY domain
                 ORDER BY model_count DESC, domain
                 LIMIT ?1",
                params![limit_param(limit, DEFAULT_DOMAIN_DISTRIBUTION_LIMIT)],
            ),
        }
    }

    /// Most expensive models to train
    pub fn training_cost_analysis(&self, limit: Option<usize>) -> Result<Vec<ResultRow>> {
        self.execute_query(
            "SELECT model, organization, publication_date, parameters, training_compute_flop,
                    training_compute_cost_usd, training_time_hours, training_hardware
             FROM ai_models
             WHERE training_compute_cost_usd IS NOT NULL
             ORDER BY training_compute_cost_usd DESC
             LIMIT ?1",
            params![limit_param(limit, DEFAULT_COST_LIMIT)],
        )
    }

    /// Models published within the last `days` days
    pub fn recent_models(
        &self,
        days: Option<u32>,
        limit: Option<usize>,
    ) -> Result<Vec<ResultRow>> {
        let offset = format!("-{} days", days.unwrap_or(DEFAULT_RECENT_DAYS));
        self.execute_query(
            "SELECT model, organization, publication_date, parameters, domain, notability_criteria
             FROM ai_models
             WHERE publication_date >= date('now', ?1)
             ORDER BY publication_date DESC
             LIMIT ?2",
            params![offset, limit_param(limit, DEFAULT_RECENT_LIMIT)],
        )
    }

    /// Substring search across model name, organization and abstract
    pub fn search_models(&self, term: &str, limit: Option<usize>) -> Result<Vec<ResultRow>> {
        let pattern = format!("%{}%", term);
        self.execute_query(
            "SELECT model, organization, publication_date, parameters, domain, abstract
             FROM ai_models
             WHERE model LIKE ?1
                OR organization LIKE ?1
                OR abstract LIKE ?1
             ORDER BY publication_date DESC
             LIMIT ?2",
            params![pattern, limit_param(limit, DEFAULT_SEARCH_LIMIT)],
        )
    }
}

fn limit_param(limit: Option<usize>, default: usize) -> i64 {
    i64::try_from(limit.unwrap_or(default)).unwrap_or(i64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::Database;

    fn catalog() -> ModelCatalog {
        let db = Database::memory().unwrap();
        db.create_schema().unwrap();
        db.connection()
            .execute_batch(
                "INSERT INTO ai_models (model, organization, publication_date, domain, parameters,
                                        training_compute_cost_usd, frontier_model, abstract)
                 VALUES ('GPT-3', 'OpenAI', '2020-05-28', 'Language', 175000000000, 4300000.5, TRUE, 'few-shot'),
                        ('BERT', 'Google', '2018-10-11', 'Language', 340000000, NULL, FALSE, 'bidirectional'),
                        ('ResNet', 'Microsoft', '2015-12-10', 'Vision', 60000000, NULL, NULL, 'residual'),
                        ('PaLM', 'Google', '2022-04-04', 'Language', 540000000000, 12000000, TRUE, 'GPT-style decoder');",
            )
            .unwrap();

        ModelCatalog::from_connection(db.into_connection())
    }

    #[test]
    fn test_result_row_access() {
        let row: ResultRow = vec![
            ("model".to_string(), Value::from("GPT-3")),
            ("parameters".to_string(), Value::from(175_i64)),
        ]
        .into_iter()
        .collect();

        assert_eq!(row.get_str("model"), Some("GPT-3"));
        assert_eq!(row.get_i64("parameters"), Some(175));
        assert_eq!(row.columns().collect::<Vec<_>>(), vec!["model", "parameters"]);
        assert_eq!(row.to_json()["model"], "GPT-3");
        assert!(row.get("missing").is_none());
    }

    #[test]
    fn test_largest_models() {
        let rows = catalog().largest_models(Some(2)).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].get_str("model"), Some("PaLM"));
        assert_eq!(rows[1].get_i64("parameters"), Some(175_000_000_000));
        assert_eq!(
            rows[0].columns().collect::<Vec<_>>(),
            vec!["model", "organization", "parameters", "publication_date", "domain"]
        );
    }

    #[test]
    fn test_models_by_year_and_organization() {
        let catalog = catalog();
        let years = catalog.models_by_year(None).unwrap();
        assert_eq!(years[0].get_str("year"), Some("2022"));
        assert_eq!(years.len(), 4);

        let orgs = catalog.models_by_organization(Some(1)).unwrap();
        assert_eq!(orgs[0].get_str("organization"), Some("Google"));
        assert_eq!(orgs[0].get_i64("model_count"), Some(2));
    }

    #[test]
    fn test_frontier_models() {
        let rows = catalog().frontier_models(None).unwrap();
        let names: Vec<_> = rows.iter().filter_map(|r| r.get_str("model")).collect();
        assert_eq!(names, vec!["PaLM", "GPT-3"]);
    }

    #[test]
    fn test_search_matches_any_text_column() {
        let catalog = catalog();
        let rows = catalog.search_models("GPT", None).unwrap();
        let names: Vec<_> = rows.iter().filter_map(|r| r.get_str("model")).collect();
        assert_eq!(names, vec!["PaLM", "GPT-3"]);

        let rows = catalog.search_models("google", None).unwrap();
        assert_eq!(rows.len(), 2);

        assert!(catalog.search_models("nothing-like-this", None).unwrap().is_empty());
    }

    #[test]
    fn test_models_by_domain() {
        let catalog = catalog();
        let distribution = catalog.models_by_domain(None, None).unwrap();
        assert_eq!(distribution[0].get_str("domain"), Some("Language"));
        assert_eq!(distribution[0].get_i64("model_count"), Some(3));

        let vision = catalog.models_by_domain(Some("Vis"), None).unwrap();
        assert_eq!(vision.len(), 1);
        assert_eq!(vision[0].get_str("task"), None);
    }

    #[test]
    fn test_training_cost_analysis() {
        let rows = catalog().training_cost_analysis(None).unwrap();
        assert_eq!(rows.len(), 2);
        let cost = rows[1].get_f64("training_compute_cost_usd").unwrap();
        approx::assert_relative_eq!(cost, 4300000.5);
    }

    #[test]
    fn test_recent_models_window() {
        let catalog = catalog();
        assert!(catalog.recent_models(Some(30), None).unwrap().is_empty());
        assert_eq!(catalog.recent_models(Some(365 * 100), None).unwrap().len(), 4);
    }

    #[test]
    fn test_open_missing_database() {
        assert!(ModelCatalog::open("/nonexistent/ai_insights.db").is_err());
    }
}
