use crate::{
    entities::{supplies, usage_history},
    errors::ServiceError,
    services::analytics::{latest_unit_cost, round2, OPTIMAL_STOCK_MULTIPLIER},
};
use chrono::{Datelike, NaiveDate, Utc};
use sea_orm::{DatabaseConnection, EntityTrait};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tracing::instrument;
use utoipa::ToSchema;

pub const REPORT_STATUS_NO_HISTORY: &str = "no_history";
pub const REPORT_STATUS_MINIMAL: &str = "minimal";
pub const REPORT_STATUS_OK: &str = "ok";

pub const VARIABILITY_HIGH: &str = "High";
pub const VARIABILITY_MODERATE: &str = "Moderate";
pub const VARIABILITY_LOW: &str = "Low";

/// Per-supply usage statistics
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SupplyUsageReport {
    pub supply_id: i32,
    pub name: String,
    /// "no_history", "minimal" or "ok"
    pub status: String,
    pub events_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mean: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub std_dev: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variability: Option<String>,
}

/// Usage totals per calendar day, chronologically sorted
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DailyUsageSeries {
    pub dates: Vec<String>,
    pub values: Vec<i64>,
}

/// Estimated savings per calendar month, chronologically sorted
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct MonthlySavingsSeries {
    pub months: Vec<String>,
    pub values: Vec<f64>,
}

/// Service for usage statistics and time-bucketed series
#[derive(Clone)]
pub struct ReportService {
    db_pool: Arc<DatabaseConnection>,
}

impl ReportService {
    pub fn new(db_pool: Arc<DatabaseConnection>) -> Self {
        Self { db_pool }
    }

    /// Per-supply usage statistics over the full history. Supplies with
    /// fewer than three events get a reduced record instead of statistics
    /// computed from too few samples.
    #[instrument(skip(self))]
    pub async fn usage_statistics(&self) -> Result<Vec<SupplyUsageReport>, ServiceError> {
        let supplies = supplies::Entity::find().all(self.db_pool.as_ref()).await?;
        let events = usage_history::Entity::find()
            .all(self.db_pool.as_ref())
            .await?;

        let mut by_supply: HashMap<i32, Vec<i32>> = HashMap::new();
        for event in events {
            by_supply
                .entry(event.supply_id)
                .or_default()
                .push(event.quantity_used);
        }

        Ok(supplies
            .into_iter()
            .map(|supply| {
                let quantities = by_supply.remove(&supply.id).unwrap_or_default();
                supply_report(supply.id, supply.name, &quantities)
            })
            .collect())
    }

    /// Usage totals grouped by calendar day, as parallel date/value arrays.
    #[instrument(skip(self))]
    pub async fn daily_usage_series(&self) -> Result<DailyUsageSeries, ServiceError> {
        let events = usage_history::Entity::find()
            .all(self.db_pool.as_ref())
            .await?;

        // ISO dates sort lexicographically in chronological order
        let mut by_date: BTreeMap<String, i64> = BTreeMap::new();
        for event in events {
            let date = event.timestamp.format("%Y-%m-%d").to_string();
            *by_date.entry(date).or_insert(0) += event.quantity_used as i64;
        }

        let (dates, values) = by_date.into_iter().unzip();
        Ok(DailyUsageSeries { dates, values })
    }

    /// Estimated savings per calendar month: for each month x supply pair
    /// the optimal-stock formula is applied to that month's usage total,
    /// then the per-supply savings are summed per month.
    #[instrument(skip(self))]
    pub async fn monthly_savings_series(&self) -> Result<MonthlySavingsSeries, ServiceError> {
        let supplies = supplies::Entity::find().all(self.db_pool.as_ref()).await?;
        let events = usage_history::Entity::find()
            .all(self.db_pool.as_ref())
            .await?;

        let supplies_by_id: HashMap<i32, &supplies::Model> =
            supplies.iter().map(|s| (s.id, s)).collect();

        let mut usage_by_month_supply: HashMap<(i32, u32, i32), i64> = HashMap::new();
        for event in &events {
            let key = (
                event.timestamp.year(),
                event.timestamp.month(),
                event.supply_id,
            );
            *usage_by_month_supply.entry(key).or_insert(0) += event.quantity_used as i64;
        }

        // Keyed by (year, month) so iteration comes out chronological
        let mut savings_by_month: BTreeMap<(i32, u32), f64> = BTreeMap::new();
        for ((year, month, supply_id), total_used) in usage_by_month_supply {
            let supply = match supplies_by_id.get(&supply_id) {
                Some(supply) => supply,
                None => continue,
            };

            let optimal_stock = OPTIMAL_STOCK_MULTIPLIER * total_used as f64;
            let overstock = supply.quantity as f64 - optimal_stock;
            let cost = latest_unit_cost(self.db_pool.as_ref(), supply_id).await?;
            let estimated = overstock.max(0.0) * cost;

            *savings_by_month.entry((year, month)).or_insert(0.0) += estimated;
        }

        let mut months = Vec::with_capacity(savings_by_month.len());
        let mut values = Vec::with_capacity(savings_by_month.len());
        for ((year, month), total) in savings_by_month {
            months.push(month_label(year, month));
            values.push(round2(total));
        }

        Ok(MonthlySavingsSeries { months, values })
    }
}

fn month_label(year: i32, month: u32) -> String {
    // Format matches the front end's expectation, e.g. "Aug 2026"
    NaiveDate::from_ymd_opt(year, month, 1)
        .map(|d| d.format("%b %Y").to_string())
        .unwrap_or_else(|| format!("{:02}/{}", month, year))
}

fn supply_report(supply_id: i32, name: String, quantities: &[i32]) -> SupplyUsageReport {
    match quantities.len() {
        0 => SupplyUsageReport {
            supply_id,
            name,
            status: REPORT_STATUS_NO_HISTORY.to_string(),
            events_count: 0,
            mean: None,
            min: None,
            max: None,
            std_dev: None,
            variability: None,
        },
        1 | 2 => SupplyUsageReport {
            supply_id,
            name,
            status: REPORT_STATUS_MINIMAL.to_string(),
            events_count: quantities.len(),
            mean: None,
            min: None,
            max: None,
            std_dev: None,
            variability: None,
        },
        _ => {
            let mean = mean(quantities);
            let std_dev = sample_std_dev(quantities, mean);
            SupplyUsageReport {
                supply_id,
                name,
                status: REPORT_STATUS_OK.to_string(),
                events_count: quantities.len(),
                mean: Some(round2(mean)),
                min: quantities.iter().copied().min(),
                max: quantities.iter().copied().max(),
                std_dev: Some(round2(std_dev)),
                variability: Some(variability_label(mean, std_dev).to_string()),
            }
        }
    }
}

fn mean(quantities: &[i32]) -> f64 {
    quantities.iter().map(|q| *q as f64).sum::<f64>() / quantities.len() as f64
}

/// Sample standard deviation (n - 1 denominator); a single sample has no
/// spread and yields 0.
fn sample_std_dev(quantities: &[i32], mean: f64) -> f64 {
    if quantities.len() < 2 {
        return 0.0;
    }
    let variance = quantities
        .iter()
        .map(|q| {
            let diff = *q as f64 - mean;
            diff * diff
        })
        .sum::<f64>()
        / (quantities.len() - 1) as f64;
    variance.sqrt()
}

fn variability_label(mean: f64, std_dev: f64) -> &'static str {
    if std_dev > mean {
        VARIABILITY_HIGH
    } else if std_dev > 0.5 * mean {
        VARIABILITY_MODERATE
    } else {
        VARIABILITY_LOW
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn two_events_give_a_minimal_record() {
        let report = supply_report(1, "Paper".to_string(), &[5, 7]);
        assert_eq!(report.status, REPORT_STATUS_MINIMAL);
        assert_eq!(report.events_count, 2);
        assert!(report.mean.is_none());
        assert!(report.std_dev.is_none());
    }

    #[test]
    fn zero_events_give_no_history() {
        let report = supply_report(1, "Paper".to_string(), &[]);
        assert_eq!(report.status, REPORT_STATUS_NO_HISTORY);
        assert_eq!(report.events_count, 0);
    }

    #[test]
    fn five_events_give_full_statistics() {
        let report = supply_report(1, "Paper".to_string(), &[2, 4, 4, 4, 6]);
        assert_eq!(report.status, REPORT_STATUS_OK);
        assert_eq!(report.events_count, 5);
        assert_eq!(report.mean, Some(4.0));
        assert_eq!(report.min, Some(2));
        assert_eq!(report.max, Some(6));
        // variance = (4 + 0 + 0 + 0 + 4) / 4 = 2
        assert_eq!(report.std_dev, Some(round2(2.0_f64.sqrt())));
        assert_eq!(report.variability, Some(VARIABILITY_LOW.to_string()));
    }

    #[rstest]
    #[case(10.0, 11.0, VARIABILITY_HIGH)]
    #[case(10.0, 6.0, VARIABILITY_MODERATE)]
    #[case(10.0, 5.0, VARIABILITY_LOW)]
    #[case(10.0, 0.0, VARIABILITY_LOW)]
    fn variability_tiers(#[case] mean: f64, #[case] std_dev: f64, #[case] expected: &str) {
        assert_eq!(variability_label(mean, std_dev), expected);
    }

    #[test]
    fn single_sample_has_zero_std_dev() {
        assert_eq!(sample_std_dev(&[9], 9.0), 0.0);
    }

    #[test]
    fn month_labels_are_short_month_and_year() {
        assert_eq!(month_label(2026, 8), "Aug 2026");
        assert_eq!(month_label(2025, 12), "Dec 2025");
    }
}
