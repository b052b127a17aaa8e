//! DepartmentMember entity - 部门成员表
//!
//! 表名: org_department_member
//! 主键为 (user_id, department_id), 一个用户可以属于多个部门

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "org_department_member")]
pub struct Model {
    /// 用户ID
    #[sea_orm(primary_key, auto_increment = false, column_type = "String(Some(64))")]
    pub user_id: String,

    /// 部门ID
    #[sea_orm(primary_key, auto_increment = false, column_type = "String(Some(64))")]
    pub department_id: String,

    /// 职位
    #[sea_orm(column_type = "String(Some(256))")]
    pub position: String,

    /// 工位
    #[sea_orm(column_type = "String(Some(256))")]
    pub station: String,

    /// 部门内排序值
    pub order: i32,

    /// 入职时间
    pub entry_time: DateTimeUtc,

    /// 离职时间 (晚于入职时间时才有值)
    #[sea_orm(nullable)]
    pub termination_time: Option<DateTimeUtc>,

    pub create_time: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

// 用户信息由外部用户服务提供, 这里只保存关系

impl ActiveModelBehavior for ActiveModel {}
