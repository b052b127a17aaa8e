use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set};
use tracing::info;

use super::OrganizationDatabase;
use crate::entity::{department, organization};
use crate::error::{AppError, AppResult, OptionExt};

/// Partial update of the organization profile
#[derive(Debug, Clone, Default)]
pub struct OrganizationUpdate {
    pub logo_url: Option<String>,
    pub name: Option<String>,
    pub homepage: Option<String>,
    pub introduction: Option<String>,
}

impl OrganizationUpdate {
    pub fn is_empty(&self) -> bool {
        self.logo_url.is_none() && self.name.is_none() && self.homepage.is_none() && self.introduction.is_none()
    }
}

impl OrganizationDatabase {
    pub async fn get_organization(&self) -> AppResult<organization::Model> {
        organization::Entity::find_by_id(organization::ORGANIZATION_ROW_ID)
            .one(&self.db)
            .await?
            .ok_or_not_found("organization not found")
    }

    pub async fn set_organization(&self, update: OrganizationUpdate) -> AppResult<()> {
        if update.is_empty() {
            return Err(AppError::args("no organization field to update"));
        }
        let mut model = <organization::ActiveModel as Default>::default();
        if let Some(logo_url) = update.logo_url {
            model.logo_url = Set(logo_url);
        }
        if let Some(name) = update.name {
            model.name = Set(name);
        }
        if let Some(homepage) = update.homepage {
            model.homepage = Set(homepage);
        }
        if let Some(introduction) = update.introduction {
            model.introduction = Set(introduction);
        }
        organization::Entity::update_many()
            .set(model)
            .filter(organization::Column::Id.eq(organization::ORGANIZATION_ROW_ID))
            .exec(&self.db)
            .await?;
        Ok(())
    }

    /// Create the organization row on first start
    pub async fn init_organization(&self) -> AppResult<()> {
        let existing = organization::Entity::find_by_id(organization::ORGANIZATION_ROW_ID)
            .one(&self.db)
            .await?;
        if existing.is_none() {
            organization::ActiveModel {
                id: Set(organization::ORGANIZATION_ROW_ID),
                logo_url: Set(String::new()),
                name: Set(String::new()),
                homepage: Set(String::new()),
                introduction: Set(String::new()),
                create_time: Set(Utc::now()),
            }
            .insert(&self.db)
            .await?;
            info!("Organization record created");
        }
        Ok(())
    }

    /// Make sure the reserved ungrouped department exists under `name`
    pub async fn init_ungrouped(&self, name: &str) -> AppResult<()> {
        match self.find_department(department::UNGROUPED_ID).await? {
            None => {
                department::ActiveModel {
                    department_id: Set(department::UNGROUPED_ID.to_string()),
                    name: Set(name.to_string()),
                    face_url: Set(String::new()),
                    order: Set(0),
                    parent_department_id: Set(String::new()),
                    create_time: Set(Utc::now()),
                }
                .insert(&self.db)
                .await?;
                info!("Ungrouped department created as {:?}", name);
            }
            Some(existing) if existing.name != name => {
                department::ActiveModel {
                    department_id: Set(existing.department_id),
                    name: Set(name.to_string()),
                    ..Default::default()
                }
                .update(&self.db)
                .await?;
                info!("Ungrouped department renamed to {:?}", name);
            }
            Some(_) => {}
        }
        Ok(())
    }
}
