//! Entity module - SeaORM 实体定义
//!
//! 包含组织架构相关的数据库表实体模型

pub mod department;
pub mod department_member;
pub mod organization;
