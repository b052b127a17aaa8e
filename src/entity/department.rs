//! Department entity - 部门表
//!
//! 表名: org_department
//! 部门通过 parent_department_id 自引用构成树, 空字符串表示顶级部门

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// 保留的"未分组"部门ID, 启动时自动创建, 不可删除
pub const UNGROUPED_ID: &str = "ungrouped";

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "org_department")]
pub struct Model {
    /// 部门ID (随机 128 位十六进制串, 或调用方指定)
    #[sea_orm(primary_key, auto_increment = false, column_type = "String(Some(64))")]
    pub department_id: String,

    /// 部门名称
    #[sea_orm(column_type = "String(Some(256))")]
    pub name: String,

    /// 部门头像
    #[sea_orm(column_type = "String(Some(512))")]
    pub face_url: String,

    /// 同级排序值
    pub order: i32,

    /// 父部门ID (空字符串表示顶级部门)
    #[sea_orm(column_type = "String(Some(64))", indexed)]
    pub parent_department_id: String,

    pub create_time: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

// 自引用关系通过手动遍历处理, 不使用 ORM 关联加载

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn is_root(&self) -> bool {
        self.parent_department_id.is_empty()
    }
}
