use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::client::ApiClient;
use crate::dates;
use crate::error::Result;

/// Plan/fact counts for one division over a period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Performance {
    pub division_id: i32,
    #[serde(default)]
    pub division_name: String,
    pub plan_count: u64,
    pub fact_count: u64,
    /// Share of plan done, 0 to 1.
    #[serde(default)]
    pub percentage: f64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PeriodQuery {
    #[serde(skip_serializing_if = "Option::is_none", with = "dates::optional")]
    start_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none", with = "dates::optional")]
    end_date: Option<NaiveDate>,
}

impl ApiClient {
    pub async fn get_performance_data(
        &self,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
    ) -> Result<Vec<Performance>> {
        self.get_json(
            "/api/Performance",
            &PeriodQuery {
                start_date,
                end_date,
            },
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_server::{client_for, serve};
    use crate::session::Session;
    use axum::extract::Query;
    use axum::routing::get;
    use axum::{Json, Router};
    use serde_json::json;
    use std::collections::HashMap;

    #[tokio::test]
    async fn test_period_is_sent_as_plain_dates() {
        let router = Router::new().route(
            "/api/Performance",
            get(|Query(q): Query<HashMap<String, String>>| async move {
                Json(json!([{
                    "divisionId": 3,
                    "divisionName": format!("{}..{}", q["startDate"], q["endDate"]),
                    "planCount": 10,
                    "factCount": 7,
                    "percentage": 0.7
                }]))
            }),
        );
        let base = serve(router).await;
        let client = client_for(&base, Session::in_memory());

        let rows = client
            .get_performance_data(
                NaiveDate::from_ymd_opt(2025, 3, 1),
                NaiveDate::from_ymd_opt(2025, 3, 17),
            )
            .await
            .unwrap();
        assert_eq!(rows[0].division_name, "2025-03-01..2025-03-17");
        assert_eq!(rows[0].fact_count, 7);
    }
}
