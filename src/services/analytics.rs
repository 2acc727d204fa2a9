use crate::{
    entities::{supplies, usage_history},
    errors::ServiceError,
};
use chrono::{DateTime, Duration, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QuerySelect};
use serde::Serialize;
use std::sync::Arc;
use tracing::instrument;
use utoipa::ToSchema;

// Analytics thresholds. Fixed constants, not runtime configuration.
pub const OVERSTOCK_THRESHOLD: i32 = 100;
pub const EXPIRATION_LOOKAHEAD_DAYS: i64 = 7;
pub const SPIKE_MULTIPLIER: f64 = 3.0;
pub const REORDER_TARGET_WEEKS: f64 = 2.0;
pub const OPTIMAL_STOCK_MULTIPLIER: f64 = 1.5;
pub const SLOW_USAGE_RATIO: f64 = 0.3;
pub const MIN_TREND_SAMPLES: usize = 3;
pub const ALTERNATIVES_CAP: u64 = 5;
pub const UNAVAILABLE_SUPPLIER_SENTINEL: &str = "OutOfStock";
pub const DEFAULT_COST_PER_UNIT: f64 = 10.0;

pub const ALERT_OVERSTOCKING: &str = "Overstocking";
pub const ALERT_LOW_STOCK: &str = "Low stock";
pub const ALERT_NEARING_EXPIRATION: &str = "Nearing expiration with slow usage";

pub const STATUS_OK: &str = "ok";
pub const STATUS_INSUFFICIENT_DATA: &str = "insufficient_data";
pub const STATUS_OVERSTOCKED: &str = "overstocked";
pub const STATUS_NO_EXCESS: &str = "no_excess";

/// Reorder suggestion for one supply
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct OrderRecommendation {
    pub supply_id: i32,
    pub name: String,
    /// "ok" or "insufficient_data"
    pub status: String,
    pub current_stock: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub average_weekly_usage: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recommended_order_quantity: Option<i64>,
    pub supplier: String,
    pub supplier_available: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub alternatives: Vec<AlternativeSupply>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub alerts: Vec<WasteAlert>,
}

/// Substitute product offered when the primary supplier is unavailable
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AlternativeSupply {
    pub id: i32,
    pub name: String,
    pub supplier: String,
    pub quantity: i32,
}

/// A single waste condition detected on a supply
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct WasteAlert {
    pub supply_id: i32,
    pub name: String,
    pub alert: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantity: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiration_date: Option<DateTime<Utc>>,
}

/// Estimated holding-cost savings for one supply
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SavingsEstimate {
    pub supply_id: i32,
    pub name: String,
    /// "overstocked" or "no_excess"
    pub status: String,
    pub overstock_quantity: f64,
    pub estimated_savings: f64,
}

/// Read-only analytics over the supplies and usage tables
#[derive(Clone)]
pub struct AnalyticsService {
    db_pool: Arc<DatabaseConnection>,
}

impl AnalyticsService {
    pub fn new(db_pool: Arc<DatabaseConnection>) -> Self {
        Self { db_pool }
    }

    /// Computes a reorder recommendation per supply from the trailing 30
    /// days of usage.
    #[instrument(skip(self))]
    pub async fn order_recommendations(&self) -> Result<Vec<OrderRecommendation>, ServiceError> {
        let now = Utc::now();
        let supplies = supplies::Entity::find().all(self.db_pool.as_ref()).await?;

        let mut recommendations = Vec::with_capacity(supplies.len());
        for supply in supplies {
            recommendations.push(self.recommend_for(&supply, now).await?);
        }

        Ok(recommendations)
    }

    async fn recommend_for(
        &self,
        supply: &supplies::Model,
        now: DateTime<Utc>,
    ) -> Result<OrderRecommendation, ServiceError> {
        let events = self
            .usage_events_since(supply.id, now - Duration::days(30))
            .await?;

        let supplier_available = supplier_is_available(&supply.primary_supplier);
        let (alternatives, alerts) = if supplier_available {
            (Vec::new(), Vec::new())
        } else {
            (
                self.alternative_supplies(supply).await?,
                self.alerts_for_supply(supply, now).await?,
            )
        };

        if events.len() < MIN_TREND_SAMPLES {
            return Ok(OrderRecommendation {
                supply_id: supply.id,
                name: supply.name.clone(),
                status: STATUS_INSUFFICIENT_DATA.to_string(),
                current_stock: supply.quantity,
                average_weekly_usage: None,
                recommended_order_quantity: None,
                supplier: supply.primary_supplier.clone(),
                supplier_available,
                alternatives,
                alerts,
            });
        }

        let weeks = weekly_totals(&events, now);
        let avg_weekly = average_weekly_usage(&weeks);
        let target_stock = REORDER_TARGET_WEEKS * avg_weekly;

        // Both branches currently order the full target; preserved as
        // observed behavior.
        // TODO(product): decide whether current stock should offset the
        // recommended quantity when it already covers the target.
        let recommended = if target_stock > supply.quantity as f64 {
            target_stock.ceil() as i64
        } else {
            target_stock.ceil() as i64
        };

        Ok(OrderRecommendation {
            supply_id: supply.id,
            name: supply.name.clone(),
            status: STATUS_OK.to_string(),
            current_stock: supply.quantity,
            average_weekly_usage: Some(round2(avg_weekly)),
            recommended_order_quantity: Some(recommended),
            supplier: supply.primary_supplier.clone(),
            supplier_available,
            alternatives,
            alerts,
        })
    }

    /// Scans every supply for overstock, low-stock and slow-expiration
    /// conditions. A supply may carry several alerts at once.
    #[instrument(skip(self))]
    pub async fn waste_alerts(&self) -> Result<Vec<WasteAlert>, ServiceError> {
        let now = Utc::now();
        let supplies = supplies::Entity::find().all(self.db_pool.as_ref()).await?;

        let mut alerts = Vec::new();
        for supply in &supplies {
            alerts.extend(self.alerts_for_supply(supply, now).await?);
        }

        Ok(alerts)
    }

    pub(crate) async fn alerts_for_supply(
        &self,
        supply: &supplies::Model,
        now: DateTime<Utc>,
    ) -> Result<Vec<WasteAlert>, ServiceError> {
        let mut alerts = Vec::new();

        if let Some(alert) = stock_level_alert(supply.quantity) {
            alerts.push(WasteAlert {
                supply_id: supply.id,
                name: supply.name.clone(),
                alert: alert.to_string(),
                quantity: Some(supply.quantity),
                expiration_date: None,
            });
        }

        if let Some(expiration) = supply.expiration_date {
            if expires_soon(expiration, now) {
                let weekly_usage = self
                    .usage_total_since(supply.id, now - Duration::days(7))
                    .await?;
                if usage_is_slow(weekly_usage, supply.quantity) {
                    alerts.push(WasteAlert {
                        supply_id: supply.id,
                        name: supply.name.clone(),
                        alert: ALERT_NEARING_EXPIRATION.to_string(),
                        quantity: None,
                        expiration_date: Some(expiration),
                    });
                }
            }
        }

        Ok(alerts)
    }

    /// Estimates holding-cost savings per supply against an optimal stock
    /// of 1.5x the trailing 30-day usage.
    #[instrument(skip(self))]
    pub async fn cost_savings(&self) -> Result<Vec<SavingsEstimate>, ServiceError> {
        let now = Utc::now();
        let supplies = supplies::Entity::find().all(self.db_pool.as_ref()).await?;

        let mut estimates = Vec::with_capacity(supplies.len());
        for supply in &supplies {
            let monthly_usage = self
                .usage_total_since(supply.id, now - Duration::days(30))
                .await?;
            let optimal_stock = OPTIMAL_STOCK_MULTIPLIER * monthly_usage as f64;
            let overstock = supply.quantity as f64 - optimal_stock;
            let cost = latest_unit_cost(self.db_pool.as_ref(), supply.id).await?;
            let savings = overstock * cost;

            estimates.push(if savings > 0.0 {
                SavingsEstimate {
                    supply_id: supply.id,
                    name: supply.name.clone(),
                    status: STATUS_OVERSTOCKED.to_string(),
                    overstock_quantity: round2(overstock),
                    estimated_savings: round2(savings),
                }
            } else {
                SavingsEstimate {
                    supply_id: supply.id,
                    name: supply.name.clone(),
                    status: STATUS_NO_EXCESS.to_string(),
                    overstock_quantity: 0.0,
                    estimated_savings: 0.0,
                }
            });
        }

        Ok(estimates)
    }

    async fn alternative_supplies(
        &self,
        supply: &supplies::Model,
    ) -> Result<Vec<AlternativeSupply>, ServiceError> {
        let alternatives = supplies::Entity::find()
            .filter(supplies::Column::Category.eq(supply.category.clone()))
            .filter(supplies::Column::Id.ne(supply.id))
            .filter(supplies::Column::Quantity.gt(0))
            .limit(ALTERNATIVES_CAP)
            .all(self.db_pool.as_ref())
            .await?;

        Ok(alternatives
            .into_iter()
            .map(|alt| AlternativeSupply {
                id: alt.id,
                name: alt.name,
                supplier: alt.primary_supplier,
                quantity: alt.quantity,
            })
            .collect())
    }

    async fn usage_events_since(
        &self,
        supply_id: i32,
        since: DateTime<Utc>,
    ) -> Result<Vec<usage_history::Model>, ServiceError> {
        Ok(usage_history::Entity::find()
            .filter(usage_history::Column::SupplyId.eq(supply_id))
            .filter(usage_history::Column::Timestamp.gte(since))
            .all(self.db_pool.as_ref())
            .await?)
    }

    async fn usage_total_since(
        &self,
        supply_id: i32,
        since: DateTime<Utc>,
    ) -> Result<i64, ServiceError> {
        let events = self.usage_events_since(supply_id, since).await?;
        Ok(events.iter().map(|e| e.quantity_used as i64).sum())
    }
}

/// Fetches the per-unit cost straight from the store so the estimate
/// reflects the latest persisted price, not a stale in-memory model.
pub async fn latest_unit_cost(
    db: &DatabaseConnection,
    supply_id: i32,
) -> Result<f64, ServiceError> {
    let cost: Option<Option<Decimal>> = supplies::Entity::find()
        .select_only()
        .column(supplies::Column::CostPerUnit)
        .filter(supplies::Column::Id.eq(supply_id))
        .into_tuple()
        .one(db)
        .await?;

    Ok(cost
        .flatten()
        .and_then(|d| d.to_f64())
        .unwrap_or(DEFAULT_COST_PER_UNIT))
}

pub(crate) fn supplier_is_available(supplier: &str) -> bool {
    !supplier.contains(UNAVAILABLE_SUPPLIER_SENTINEL)
}

/// Buckets events into four trailing 7-day windows; index 0 is the most
/// recent week. Events older than 28 days are ignored.
fn weekly_totals(events: &[usage_history::Model], now: DateTime<Utc>) -> [i64; 4] {
    let mut weeks = [0i64; 4];
    for event in events {
        let days = (now - event.timestamp).num_days();
        if (0..28).contains(&days) {
            weeks[(days / 7) as usize] += event.quantity_used as i64;
        }
    }
    weeks
}

/// Median of the non-zero weekly totals, then weeks exceeding 3x that
/// median are discarded as spikes before averaging the rest.
fn average_weekly_usage(weeks: &[i64; 4]) -> f64 {
    let mut nonzero: Vec<i64> = weeks.iter().copied().filter(|w| *w > 0).collect();
    if nonzero.is_empty() {
        return 0.0;
    }
    nonzero.sort_unstable();

    let mid = nonzero.len() / 2;
    let median = if nonzero.len() % 2 == 0 {
        (nonzero[mid - 1] + nonzero[mid]) as f64 / 2.0
    } else {
        nonzero[mid] as f64
    };

    let retained: Vec<i64> = weeks
        .iter()
        .copied()
        .filter(|w| *w as f64 <= SPIKE_MULTIPLIER * median)
        .collect();
    if retained.is_empty() {
        return 0.0;
    }

    retained.iter().sum::<i64>() as f64 / retained.len() as f64
}

/// Overstock and low-stock are mutually exclusive; a quantity exactly at
/// the threshold triggers neither.
fn stock_level_alert(quantity: i32) -> Option<&'static str> {
    if quantity > OVERSTOCK_THRESHOLD {
        Some(ALERT_OVERSTOCKING)
    } else if quantity < OVERSTOCK_THRESHOLD {
        Some(ALERT_LOW_STOCK)
    } else {
        None
    }
}

fn expires_soon(expiration: DateTime<Utc>, now: DateTime<Utc>) -> bool {
    expiration <= now + Duration::days(EXPIRATION_LOOKAHEAD_DAYS)
}

/// Fast-moving near-expiry stock is not waste; only flag when the last
/// week consumed under 30% of what is currently on the shelf.
fn usage_is_slow(weekly_usage: i64, quantity: i32) -> bool {
    (weekly_usage as f64) < SLOW_USAGE_RATIO * quantity as f64
}

pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
