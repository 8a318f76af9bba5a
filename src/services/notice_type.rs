use crate::{
    error::{AppError, AppResult},
    models::{notice_type, NoticeType, NoticeTypeModel},
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder,
};

pub struct NoticeTypeService {
    db: DatabaseConnection,
}

impl NoticeTypeService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn list(&self) -> AppResult<Vec<NoticeTypeModel>> {
        let types = NoticeType::find()
            .order_by_asc(notice_type::Column::Id)
            .all(&self.db)
            .await?;
        Ok(types)
    }

    pub async fn find_by_label(&self, label: &str) -> AppResult<NoticeTypeModel> {
        NoticeType::find()
            .filter(notice_type::Column::Label.eq(label))
            .one(&self.db)
            .await?
            .ok_or(AppError::NotFound)
    }

    pub async fn create(
        &self,
        label: &str,
        display: &str,
        description: &str,
        default_level: i32,
    ) -> AppResult<NoticeTypeModel> {
        let existing = NoticeType::find()
            .filter(notice_type::Column::Label.eq(label))
            .count(&self.db)
            .await?;
        if existing > 0 {
            return Err(AppError::Conflict(format!(
                "Notice type '{label}' already exists"
            )));
        }

        let model = notice_type::ActiveModel {
            label: sea_orm::ActiveValue::Set(label.to_string()),
            display: sea_orm::ActiveValue::Set(display.to_string()),
            description: sea_orm::ActiveValue::Set(description.to_string()),
            default_level: sea_orm::ActiveValue::Set(default_level),
            ..Default::default()
        };

        let saved = model.insert(&self.db).await?;
        tracing::info!(notice_type = %saved.label, "created notice type");
        Ok(saved)
    }
}
