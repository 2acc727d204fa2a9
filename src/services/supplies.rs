use crate::{
    entities::{supplies, usage_history},
    errors::ServiceError,
    events::{Event, EventSender},
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{instrument, warn};
use utoipa::ToSchema;

/// Fields for creating a supply record
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct NewSupply {
    pub name: String,
    pub category: String,
    pub quantity: i32,
    pub unit: String,
    pub expiration_date: Option<DateTime<Utc>>,
    pub primary_supplier: String,
    pub cost_per_unit: Option<Decimal>,
}

/// Partial update for a supply; unset fields are left unchanged
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct SupplyPatch {
    pub name: Option<String>,
    pub category: Option<String>,
    pub quantity: Option<i32>,
    pub unit: Option<String>,
    pub expiration_date: Option<DateTime<Utc>>,
    pub primary_supplier: Option<String>,
    pub cost_per_unit: Option<Decimal>,
}

/// Service for managing supplies and their usage history
#[derive(Clone)]
pub struct SupplyService {
    db_pool: Arc<DatabaseConnection>,
    event_sender: EventSender,
}

impl SupplyService {
    pub fn new(db_pool: Arc<DatabaseConnection>, event_sender: EventSender) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    /// Lists supplies, optionally filtered by category, with pagination.
    /// Returns the page of records plus the total matching count.
    #[instrument(skip(self))]
    pub async fn list_supplies(
        &self,
        category: Option<String>,
        page: u64,
        per_page: u64,
    ) -> Result<(Vec<supplies::Model>, u64), ServiceError> {
        let mut query = supplies::Entity::find().order_by_asc(supplies::Column::Id);
        if let Some(category) = category {
            query = query.filter(supplies::Column::Category.eq(category));
        }

        let paginator = query.paginate(self.db_pool.as_ref(), per_page);
        let total = paginator.num_items().await?;
        let items = paginator.fetch_page(page.saturating_sub(1)).await?;

        Ok((items, total))
    }

    #[instrument(skip(self))]
    pub async fn get_supply(&self, id: i32) -> Result<supplies::Model, ServiceError> {
        supplies::Entity::find_by_id(id)
            .one(self.db_pool.as_ref())
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Supply with id {} not found", id)))
    }

    #[instrument(skip(self, new_supply))]
    pub async fn create_supply(
        &self,
        new_supply: NewSupply,
    ) -> Result<supplies::Model, ServiceError> {
        if new_supply.quantity < 0 {
            return Err(ServiceError::ValidationError(
                "quantity must not be negative".to_string(),
            ));
        }
        if matches!(new_supply.cost_per_unit, Some(cost) if cost < Decimal::ZERO) {
            return Err(ServiceError::ValidationError(
                "cost_per_unit must not be negative".to_string(),
            ));
        }

        let now = Utc::now();
        let supply = supplies::ActiveModel {
            name: Set(new_supply.name),
            category: Set(new_supply.category),
            quantity: Set(new_supply.quantity),
            unit: Set(new_supply.unit),
            expiration_date: Set(new_supply.expiration_date),
            primary_supplier: Set(new_supply.primary_supplier),
            cost_per_unit: Set(new_supply.cost_per_unit),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let supply = supply.insert(self.db_pool.as_ref()).await?;
        self.emit(Event::SupplyCreated(supply.id)).await;

        Ok(supply)
    }

    #[instrument(skip(self, patch))]
    pub async fn update_supply(
        &self,
        id: i32,
        patch: SupplyPatch,
    ) -> Result<supplies::Model, ServiceError> {
        if matches!(patch.quantity, Some(q) if q < 0) {
            return Err(ServiceError::ValidationError(
                "quantity must not be negative".to_string(),
            ));
        }
        if matches!(patch.cost_per_unit, Some(cost) if cost < Decimal::ZERO) {
            return Err(ServiceError::ValidationError(
                "cost_per_unit must not be negative".to_string(),
            ));
        }

        let existing = self.get_supply(id).await?;
        let mut supply: supplies::ActiveModel = existing.into();

        if let Some(name) = patch.name {
            supply.name = Set(name);
        }
        if let Some(category) = patch.category {
            supply.category = Set(category);
        }
        if let Some(quantity) = patch.quantity {
            supply.quantity = Set(quantity);
        }
        if let Some(unit) = patch.unit {
            supply.unit = Set(unit);
        }
        if let Some(expiration_date) = patch.expiration_date {
            supply.expiration_date = Set(Some(expiration_date));
        }
        if let Some(primary_supplier) = patch.primary_supplier {
            supply.primary_supplier = Set(primary_supplier);
        }
        if let Some(cost_per_unit) = patch.cost_per_unit {
            supply.cost_per_unit = Set(Some(cost_per_unit));
        }
        supply.updated_at = Set(Utc::now());

        let supply = supply.update(self.db_pool.as_ref()).await?;
        self.emit(Event::SupplyUpdated(supply.id)).await;

        Ok(supply)
    }

    /// Deletes a supply; usage history rows cascade at the database level.
    #[instrument(skip(self))]
    pub async fn delete_supply(&self, id: i32) -> Result<(), ServiceError> {
        let result = supplies::Entity::delete_by_id(id)
            .exec(self.db_pool.as_ref())
            .await?;

        if result.rows_affected == 0 {
            return Err(ServiceError::NotFound(format!(
                "Supply with id {} not found",
                id
            )));
        }

        self.emit(Event::SupplyDeleted(id)).await;
        Ok(())
    }

    /// Records consumption against a supply: decrements the stock level and
    /// appends a usage row in one transaction.
    ///
    /// The decrement is a single conditional UPDATE filtered on
    /// `quantity >= used`, so two concurrent requests can never jointly
    /// overdraw the stock; the loser of the race sees zero affected rows.
    #[instrument(skip(self))]
    pub async fn record_usage(
        &self,
        supply_id: i32,
        quantity_used: i32,
    ) -> Result<(usage_history::Model, i32), ServiceError> {
        if quantity_used < 1 {
            return Err(ServiceError::ValidationError(
                "quantity_used must be at least 1".to_string(),
            ));
        }

        let now = Utc::now();
        let txn = self.db_pool.begin().await?;

        let update = supplies::Entity::update_many()
            .col_expr(
                supplies::Column::Quantity,
                Expr::col(supplies::Column::Quantity).sub(quantity_used),
            )
            .col_expr(supplies::Column::UpdatedAt, Expr::value(now))
            .filter(supplies::Column::Id.eq(supply_id))
            .filter(supplies::Column::Quantity.gte(quantity_used))
            .exec(&txn)
            .await?;

        if update.rows_affected == 0 {
            // Either the supply does not exist or stock is insufficient
            let exists = supplies::Entity::find_by_id(supply_id).one(&txn).await?;
            txn.rollback().await?;

            return Err(match exists {
                None => ServiceError::NotFound(format!("Supply with id {} not found", supply_id)),
                Some(supply) => ServiceError::InsufficientQuantity(format!(
                    "supply {} has {} units, requested {}",
                    supply_id, supply.quantity, quantity_used
                )),
            });
        }

        let usage = usage_history::ActiveModel {
            supply_id: Set(supply_id),
            quantity_used: Set(quantity_used),
            timestamp: Set(now),
            ..Default::default()
        };
        let usage = usage.insert(&txn).await?;

        let remaining = supplies::Entity::find_by_id(supply_id)
            .one(&txn)
            .await?
            .map(|s| s.quantity)
            .ok_or_else(|| {
                ServiceError::InternalError("supply vanished mid-transaction".to_string())
            })?;

        txn.commit().await?;

        self.emit(Event::UsageRecorded {
            supply_id,
            quantity_used,
            remaining,
        })
        .await;

        Ok((usage, remaining))
    }

    /// Lists usage events, optionally restricted to one supply and/or a
    /// starting timestamp. An unknown supply filter is a not-found error.
    #[instrument(skip(self))]
    pub async fn list_usage(
        &self,
        supply_id: Option<i32>,
        since: Option<DateTime<Utc>>,
    ) -> Result<Vec<usage_history::Model>, ServiceError> {
        if let Some(id) = supply_id {
            // Distinguish "no events" from "no such supply"
            self.get_supply(id).await?;
        }

        let mut query =
            usage_history::Entity::find().order_by_asc(usage_history::Column::Timestamp);
        if let Some(id) = supply_id {
            query = query.filter(usage_history::Column::SupplyId.eq(id));
        }
        if let Some(since) = since {
            query = query.filter(usage_history::Column::Timestamp.gte(since));
        }

        Ok(query.all(self.db_pool.as_ref()).await?)
    }

    /// Event delivery is best-effort; a full or closed channel never fails
    /// the request that triggered it.
    async fn emit(&self, event: Event) {
        if let Err(e) = self.event_sender.send(event).await {
            warn!("Failed to emit event: {}", e);
        }
    }
}
