//! Request handlers module

pub mod department;
pub mod member;
pub mod organization;
