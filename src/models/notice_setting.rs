use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// A user's delivery preference for one notice type on one medium.
///
/// Unique per `(user_id, notice_type_id, medium)`.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "notice_settings")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub user_id: i32,
    pub notice_type_id: i32,
    #[sea_orm(column_type = "String(StringLen::N(16))")]
    pub medium: String,
    pub send: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id"
    )]
    User,
    #[sea_orm(
        belongs_to = "super::notice_type::Entity",
        from = "Column::NoticeTypeId",
        to = "super::notice_type::Column::Id"
    )]
    NoticeType,
}

impl Related<super::notice_type::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::NoticeType.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
