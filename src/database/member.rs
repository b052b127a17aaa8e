use chrono::{DateTime, Utc};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set,
};

use super::OrganizationDatabase;
use crate::entity::department_member;
use crate::error::{AppError, AppResult, OptionExt};

/// Partial update of a membership row.
///
/// `termination_time: Some(None)` clears the column.
#[derive(Debug, Clone, Default)]
pub struct MemberUpdate {
    pub position: Option<String>,
    pub station: Option<String>,
    pub order: Option<i32>,
    pub entry_time: Option<DateTime<Utc>>,
    pub termination_time: Option<Option<DateTime<Utc>>>,
}

impl MemberUpdate {
    pub fn is_empty(&self) -> bool {
        self.position.is_none()
            && self.station.is_none()
            && self.order.is_none()
            && self.entry_time.is_none()
            && self.termination_time.is_none()
    }

    fn into_active_model(self) -> department_member::ActiveModel {
        let mut model = <department_member::ActiveModel as Default>::default();
        if let Some(position) = self.position {
            model.position = Set(position);
        }
        if let Some(station) = self.station {
            model.station = Set(station);
        }
        if let Some(order) = self.order {
            model.order = Set(order);
        }
        if let Some(entry_time) = self.entry_time {
            model.entry_time = Set(entry_time);
        }
        if let Some(termination_time) = self.termination_time {
            model.termination_time = Set(termination_time);
        }
        model
    }
}

impl OrganizationDatabase {
    pub async fn find_member(
        &self,
        user_id: &str,
        department_id: &str,
    ) -> AppResult<Option<department_member::Model>> {
        Ok(department_member::Entity::find_by_id((user_id.to_string(), department_id.to_string()))
            .one(&self.db)
            .await?)
    }

    pub async fn get_member(&self, user_id: &str, department_id: &str) -> AppResult<department_member::Model> {
        self.find_member(user_id, department_id).await?.ok_or_not_found(format!(
            "user {} is not a member of department {}",
            user_id, department_id
        ))
    }

    /// Direct members of one department, in sibling order
    pub async fn members_of_department(&self, department_id: &str) -> AppResult<Vec<department_member::Model>> {
        Ok(department_member::Entity::find()
            .filter(department_member::Column::DepartmentId.eq(department_id))
            .order_by_asc(department_member::Column::Order)
            .order_by_asc(department_member::Column::CreateTime)
            .all(&self.db)
            .await?)
    }

    pub async fn members_by_department_ids(
        &self,
        department_ids: &[String],
    ) -> AppResult<Vec<department_member::Model>> {
        if department_ids.is_empty() {
            return Ok(Vec::new());
        }
        Ok(department_member::Entity::find()
            .filter(department_member::Column::DepartmentId.is_in(department_ids.iter().cloned()))
            .all(&self.db)
            .await?)
    }

    pub async fn members_by_user_ids(&self, user_ids: &[String]) -> AppResult<Vec<department_member::Model>> {
        if user_ids.is_empty() {
            return Ok(Vec::new());
        }
        Ok(department_member::Entity::find()
            .filter(department_member::Column::UserId.is_in(user_ids.iter().cloned()))
            .order_by_asc(department_member::Column::Order)
            .order_by_asc(department_member::Column::CreateTime)
            .all(&self.db)
            .await?)
    }

    pub async fn create_member(&self, model: department_member::Model) -> AppResult<()> {
        let active: department_member::ActiveModel = model.into();
        active.insert(&self.db).await?;
        Ok(())
    }

    /// Insert several membership rows in one statement
    pub async fn create_members(&self, models: Vec<department_member::Model>) -> AppResult<()> {
        if models.is_empty() {
            return Ok(());
        }
        department_member::Entity::insert_many(
            models.into_iter().map(department_member::ActiveModel::from),
        )
        .exec(&self.db)
        .await?;
        Ok(())
    }

    /// Remove one membership row; a missing row is not an error
    pub async fn delete_member(&self, user_id: &str, department_id: &str) -> AppResult<()> {
        department_member::Entity::delete_many()
            .filter(department_member::Column::UserId.eq(user_id))
            .filter(department_member::Column::DepartmentId.eq(department_id))
            .exec(&self.db)
            .await?;
        Ok(())
    }

    pub async fn update_member(&self, user_id: &str, department_id: &str, update: MemberUpdate) -> AppResult<()> {
        if update.is_empty() {
            return Err(AppError::args("no member field to update"));
        }
        department_member::Entity::update_many()
            .set(update.into_active_model())
            .filter(department_member::Column::UserId.eq(user_id))
            .filter(department_member::Column::DepartmentId.eq(department_id))
            .exec(&self.db)
            .await?;
        Ok(())
    }

    /// Highest member order inside `department_id`, 0 when it has no members
    pub async fn max_member_order(&self, department_id: &str) -> AppResult<i32> {
        let max: Option<Option<i32>> = department_member::Entity::find()
            .select_only()
            .column_as(department_member::Column::Order.max(), "max_order")
            .filter(department_member::Column::DepartmentId.eq(department_id))
            .into_tuple()
            .one(&self.db)
            .await?;
        Ok(max.flatten().unwrap_or(0))
    }

    pub async fn incr_member_order(&self, department_id: &str, order: i32) -> AppResult<()> {
        department_member::Entity::update_many()
            .col_expr(
                department_member::Column::Order,
                Expr::col(department_member::Column::Order).add(1),
            )
            .filter(department_member::Column::DepartmentId.eq(department_id))
            .filter(department_member::Column::Order.gte(order))
            .exec(&self.db)
            .await?;
        Ok(())
    }

    /// Distinct user IDs whose position or station contains `keyword`, or who
    /// belong to one of `department_ids`
    pub async fn search_member(&self, keyword: &str, department_ids: &[String]) -> AppResult<Vec<String>> {
        let mut cond = Condition::any();
        if !keyword.is_empty() {
            cond = cond
                .add(department_member::Column::Position.contains(keyword))
                .add(department_member::Column::Station.contains(keyword));
        }
        if !department_ids.is_empty() {
            cond = cond.add(department_member::Column::DepartmentId.is_in(department_ids.iter().cloned()));
        }
        if cond.is_empty() {
            return Ok(Vec::new());
        }
        Ok(department_member::Entity::find()
            .select_only()
            .column(department_member::Column::UserId)
            .distinct()
            .filter(cond)
            .into_tuple()
            .all(&self.db)
            .await?)
    }

    /// Number of distinct users with a membership in `department_ids`, or in
    /// any department when `None`
    pub async fn member_count(&self, department_ids: Option<&[String]>) -> AppResult<u64> {
        let mut query = department_member::Entity::find()
            .select_only()
            .column(department_member::Column::UserId)
            .distinct();
        if let Some(ids) = department_ids {
            if ids.is_empty() {
                return Ok(0);
            }
            query = query.filter(department_member::Column::DepartmentId.is_in(ids.iter().cloned()));
        }
        Ok(query.count(&self.db).await?)
    }
}
