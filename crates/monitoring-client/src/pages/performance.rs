use chrono::{Datelike, NaiveDate};
use tracing::debug;

use monitoring_api::performance::Performance;
use monitoring_api::ApiClient;

use super::require_session;
use crate::error::{ClientError, Result};

/// Sums over every division in the report.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PerformanceTotals {
    pub plan: u64,
    pub fact: u64,
    pub percentage: f64,
}

impl PerformanceTotals {
    pub fn of(rows: &[Performance]) -> Self {
        let plan: u64 = rows.iter().map(|r| r.plan_count).sum();
        let fact: u64 = rows.iter().map(|r| r.fact_count).sum();
        let percentage = if plan == 0 {
            0.0
        } else {
            fact as f64 / plan as f64 * 100.0
        };
        Self {
            plan,
            fact,
            percentage,
        }
    }
}

/// From the first day of `today`'s month to `today`.
pub fn default_range(today: NaiveDate) -> (NaiveDate, NaiveDate) {
    (today.with_day(1).unwrap_or(today), today)
}

pub struct PerformancePage {
    api: ApiClient,
    start_date: NaiveDate,
    end_date: NaiveDate,
    rows: Vec<Performance>,
}

impl PerformancePage {
    pub fn new(api: ApiClient, today: NaiveDate) -> Self {
        let (start_date, end_date) = default_range(today);
        Self {
            api,
            start_date,
            end_date,
            rows: Vec::new(),
        }
    }

    pub fn range(&self) -> (NaiveDate, NaiveDate) {
        (self.start_date, self.end_date)
    }

    pub fn rows(&self) -> &[Performance] {
        &self.rows
    }

    pub fn totals(&self) -> PerformanceTotals {
        PerformanceTotals::of(&self.rows)
    }

    pub async fn mount(&mut self) -> Result<()> {
        self.reload().await
    }

    pub async fn set_range(&mut self, start_date: NaiveDate, end_date: NaiveDate) -> Result<()> {
        if start_date > end_date {
            return Err(ClientError::Validation(
                "Start date is after end date".into(),
            ));
        }
        self.start_date = start_date;
        self.end_date = end_date;
        self.reload().await
    }

    pub async fn reload(&mut self) -> Result<()> {
        require_session(&self.api)?;
        self.rows = self
            .api
            .get_performance_data(Some(self.start_date), Some(self.end_date))
            .await?;
        debug!(
            from = %self.start_date,
            to = %self.end_date,
            divisions = self.rows.len(),
            "Performance loaded"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::backend;
    use axum::extract::Query;
    use axum::routing::get;
    use axum::{Json, Router};
    use serde_json::json;
    use std::collections::HashMap;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn row(plan_count: u64, fact_count: u64) -> Performance {
        Performance {
            division_id: 1,
            division_name: "ОТК".into(),
            plan_count,
            fact_count,
            percentage: 0.0,
        }
    }

    #[test]
    fn test_default_range() {
        assert_eq!(
            default_range(date(2025, 3, 14)),
            (date(2025, 3, 1), date(2025, 3, 14))
        );
        assert_eq!(
            default_range(date(2025, 3, 1)),
            (date(2025, 3, 1), date(2025, 3, 1))
        );
    }

    #[test]
    fn test_totals() {
        let totals = PerformanceTotals::of(&[row(10, 4), row(30, 26)]);
        assert_eq!(totals.plan, 40);
        assert_eq!(totals.fact, 30);
        assert!((totals.percentage - 75.0).abs() < f64::EPSILON);

        assert_eq!(PerformanceTotals::of(&[row(0, 3)]).percentage, 0.0);
        assert_eq!(PerformanceTotals::of(&[]).plan, 0);
    }

    #[tokio::test]
    async fn test_reload_sends_range() {
        let router = Router::new().route(
            "/api/Performance",
            get(|Query(q): Query<HashMap<String, String>>| async move {
                Json(json!([{
                    "divisionId": 3,
                    "divisionName": format!("{}..{}", q["startDate"], q["endDate"]),
                    "planCount": 8,
                    "factCount": 2,
                    "percentage": 25.0
                }]))
            }),
        );
        let mut page = PerformancePage::new(backend(router).await, date(2025, 3, 14));
        page.mount().await.unwrap();
        assert_eq!(page.rows()[0].division_name, "2025-03-01..2025-03-14");
        assert_eq!(page.totals().plan, 8);

        assert!(matches!(
            page.set_range(date(2025, 4, 1), date(2025, 3, 1)).await,
            Err(ClientError::Validation(_))
        ));
        page.set_range(date(2025, 1, 1), date(2025, 1, 31)).await.unwrap();
        assert_eq!(page.rows()[0].division_name, "2025-01-01..2025-01-31");
    }
}
