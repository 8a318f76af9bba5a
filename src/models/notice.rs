use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "notices")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub user_id: i32,
    pub notice_type_id: i32,
    #[sea_orm(column_type = "Text")]
    pub message: String,
    pub added: DateTime,
    pub unseen: bool,
    pub archived: bool,
    pub on_site: bool,
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

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<super::notice_type::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::NoticeType.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
