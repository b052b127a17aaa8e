use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DbErr, EntityTrait, QueryFilter, QueryOrder, QuerySelect, Set,
    TransactionTrait,
};

use super::OrganizationDatabase;
use crate::entity::{department, department_member};
use crate::error::{AppError, AppResult, OptionExt};

/// Partial update of a department; `None` leaves the column untouched
#[derive(Debug, Clone, Default)]
pub struct DepartmentUpdate {
    pub name: Option<String>,
    pub face_url: Option<String>,
    pub parent_department_id: Option<String>,
    pub order: Option<i32>,
}

impl DepartmentUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.face_url.is_none()
            && self.parent_department_id.is_none()
            && self.order.is_none()
    }

    fn into_active_model(self) -> department::ActiveModel {
        let mut model = <department::ActiveModel as Default>::default();
        if let Some(name) = self.name {
            model.name = Set(name);
        }
        if let Some(face_url) = self.face_url {
            model.face_url = Set(face_url);
        }
        if let Some(parent) = self.parent_department_id {
            model.parent_department_id = Set(parent);
        }
        if let Some(order) = self.order {
            model.order = Set(order);
        }
        model
    }
}

impl OrganizationDatabase {
    pub async fn find_department(&self, department_id: &str) -> AppResult<Option<department::Model>> {
        Ok(department::Entity::find_by_id(department_id.to_string())
            .one(&self.db)
            .await?)
    }

    pub async fn get_department(&self, department_id: &str) -> AppResult<department::Model> {
        self.find_department(department_id)
            .await?
            .ok_or_not_found(format!("department {} not found", department_id))
    }

    /// Every department, in sibling order
    pub async fn all_departments(&self) -> AppResult<Vec<department::Model>> {
        Ok(department::Entity::find()
            .order_by_asc(department::Column::Order)
            .order_by_asc(department::Column::CreateTime)
            .all(&self.db)
            .await?)
    }

    /// Existing departments among `ids`; unknown IDs are skipped
    pub async fn departments_by_ids(&self, ids: &[String]) -> AppResult<Vec<department::Model>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        Ok(department::Entity::find()
            .filter(department::Column::DepartmentId.is_in(ids.iter().cloned()))
            .all(&self.db)
            .await?)
    }

    /// Direct children of `parent_id` (top-level departments when empty), in sibling order
    pub async fn child_departments(&self, parent_id: &str) -> AppResult<Vec<department::Model>> {
        Ok(department::Entity::find()
            .filter(department::Column::ParentDepartmentId.eq(parent_id))
            .order_by_asc(department::Column::Order)
            .order_by_asc(department::Column::CreateTime)
            .all(&self.db)
            .await?)
    }

    pub async fn department_by_name(
        &self,
        name: &str,
        parent_id: &str,
    ) -> AppResult<Option<department::Model>> {
        Ok(department::Entity::find()
            .filter(department::Column::Name.eq(name))
            .filter(department::Column::ParentDepartmentId.eq(parent_id))
            .order_by_asc(department::Column::Order)
            .order_by_asc(department::Column::CreateTime)
            .one(&self.db)
            .await?)
    }

    pub async fn create_department(&self, model: department::Model) -> AppResult<()> {
        let active: department::ActiveModel = model.into();
        active.insert(&self.db).await?;
        Ok(())
    }

    pub async fn update_department(&self, department_id: &str, update: DepartmentUpdate) -> AppResult<()> {
        if update.is_empty() {
            return Err(AppError::args("no department field to update"));
        }
        department::Entity::update_many()
            .set(update.into_active_model())
            .filter(department::Column::DepartmentId.eq(department_id))
            .exec(&self.db)
            .await?;
        Ok(())
    }

    /// Highest sibling order under `parent_id`, 0 when there are no siblings
    pub async fn max_department_order(&self, parent_id: &str) -> AppResult<i32> {
        let max: Option<Option<i32>> = department::Entity::find()
            .select_only()
            .column_as(department::Column::Order.max(), "max_order")
            .filter(department::Column::ParentDepartmentId.eq(parent_id))
            .into_tuple()
            .one(&self.db)
            .await?;
        Ok(max.flatten().unwrap_or(0))
    }

    /// Shift every sibling at or after `order` one slot down
    pub async fn incr_department_order(&self, parent_id: &str, order: i32) -> AppResult<()> {
        department::Entity::update_many()
            .col_expr(
                department::Column::Order,
                Expr::col(department::Column::Order).add(1),
            )
            .filter(department::Column::ParentDepartmentId.eq(parent_id))
            .filter(department::Column::Order.gte(order))
            .exec(&self.db)
            .await?;
        Ok(())
    }

    /// IDs of departments whose name contains `keyword`
    pub async fn search_department(&self, keyword: &str) -> AppResult<Vec<String>> {
        if keyword.is_empty() {
            return Ok(Vec::new());
        }
        Ok(department::Entity::find()
            .select_only()
            .column(department::Column::DepartmentId)
            .filter(department::Column::Name.contains(keyword))
            .into_tuple()
            .all(&self.db)
            .await?)
    }

    /// Splice departments out of the tree and drop them with their memberships.
    ///
    /// `reparent` maps each deleted department ID to the ID its children must
    /// point at afterwards. Children are moved first, then membership rows, then
    /// the department rows, all in one transaction.
    pub async fn delete_departments(
        &self,
        reparent: Vec<(String, String)>,
        department_ids: Vec<String>,
    ) -> AppResult<()> {
        self.db
            .transaction::<_, (), DbErr>(|txn| {
                Box::pin(async move {
                    for (old_parent, new_parent) in reparent {
                        department::Entity::update_many()
                            .col_expr(
                                department::Column::ParentDepartmentId,
                                Expr::value(new_parent),
                            )
                            .filter(department::Column::ParentDepartmentId.eq(old_parent))
                            .exec(txn)
                            .await?;
                    }

                    department_member::Entity::delete_many()
                        .filter(department_member::Column::DepartmentId.is_in(department_ids.clone()))
                        .exec(txn)
                        .await?;

                    department::Entity::delete_many()
                        .filter(department::Column::DepartmentId.is_in(department_ids))
                        .exec(txn)
                        .await?;

                    Ok(())
                })
            })
            .await
            .map_err(|e| match e {
                sea_orm::TransactionError::Connection(err) => AppError::Database(err),
                sea_orm::TransactionError::Transaction(err) => AppError::Database(err),
            })
    }
}
