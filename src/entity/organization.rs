//! Organization entity - 组织信息表
//!
//! 表名: org_organization
//! 单行表, 表示公司本身, 在概念上是部门树的根 (部门ID为空)

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// 单行表的固定主键
pub const ORGANIZATION_ROW_ID: i32 = 1;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "org_organization")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: i32,

    /// 公司 Logo
    #[sea_orm(column_type = "String(Some(512))")]
    pub logo_url: String,

    /// 公司名称
    #[sea_orm(column_type = "String(Some(256))")]
    pub name: String,

    /// 公司主页
    #[sea_orm(column_type = "String(Some(512))")]
    pub homepage: String,

    /// 公司简介
    #[sea_orm(column_type = "Text")]
    pub introduction: String,

    pub create_time: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
