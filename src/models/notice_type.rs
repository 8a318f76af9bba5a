use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Category of notice, e.g. `comment_posted`.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "notice_types")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique, column_type = "String(StringLen::N(40))")]
    pub label: String,
    #[sea_orm(column_type = "String(StringLen::N(50))")]
    pub display: String,
    #[sea_orm(column_type = "String(StringLen::N(100))")]
    pub description: String,
    /// Sensitivity; a medium delivers by default when its own level is not above this.
    pub default_level: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::notice::Entity")]
    Notice,
    #[sea_orm(has_many = "super::notice_setting::Entity")]
    NoticeSetting,
}

impl Related<super::notice::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Notice.def()
    }
}

impl Related<super::notice_setting::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::NoticeSetting.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
