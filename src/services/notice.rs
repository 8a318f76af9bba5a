use crate::{
    error::{AppError, AppResult},
    middleware::AuthUser,
    models::{
        notice, user, Medium, Notice, NoticeModel, NoticeType, NoticeTypeModel, User,
        NOTICE_MEDIA,
    },
    services::{notice_setting::NoticeSettingService, notice_type::NoticeTypeService},
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Select,
};
use std::collections::HashSet;

/// Filters for listing a user's notices.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoticeFilter {
    pub archived: bool,
    pub unseen: Option<bool>,
    pub on_site: Option<bool>,
}

/// Result of an archive or delete attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeMutation {
    Missing,
    Denied,
    Applied,
}

/// A notice created by [`NoticeService::dispatch`] and the media it should go out on.
#[derive(Debug, Clone)]
pub struct Dispatched {
    pub user_id: i32,
    pub notice_id: i32,
    pub media: Vec<Medium>,
}

pub type NoticeWithType = (NoticeModel, Option<NoticeTypeModel>);

pub struct NoticeService {
    db: DatabaseConnection,
}

impl NoticeService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    fn notices_for(user_id: i32, filter: NoticeFilter) -> Select<Notice> {
        let mut query = Notice::find()
            .filter(notice::Column::UserId.eq(user_id))
            .filter(notice::Column::Archived.eq(filter.archived));
        if let Some(unseen) = filter.unseen {
            query = query.filter(notice::Column::Unseen.eq(unseen));
        }
        if let Some(on_site) = filter.on_site {
            query = query.filter(notice::Column::OnSite.eq(on_site));
        }
        query.order_by_desc(notice::Column::Added)
    }

    pub async fn list_for_user(
        &self,
        user_id: i32,
        filter: NoticeFilter,
        page: u64,
        per_page: u64,
    ) -> AppResult<(Vec<NoticeWithType>, u64)> {
        let paginator = Self::notices_for(user_id, filter)
            .order_by_desc(notice::Column::Id)
            .find_also_related(NoticeType)
            .paginate(&self.db, per_page);

        let total = paginator.num_items().await?;
        let items = paginator.fetch_page(page.saturating_sub(1)).await?;
        Ok((items, total))
    }

    pub async fn unseen_count(&self, user_id: i32) -> AppResult<u64> {
        let filter = NoticeFilter {
            unseen: Some(true),
            ..Default::default()
        };
        let count = Self::notices_for(user_id, filter).count(&self.db).await?;
        Ok(count)
    }

    /// Fetch one notice for its owner. Other users' notices are reported as missing.
    pub async fn get_for_user(&self, id: i32, user_id: i32) -> AppResult<NoticeWithType> {
        let (notice, notice_type) = Notice::find_by_id(id)
            .find_also_related(NoticeType)
            .one(&self.db)
            .await?
            .ok_or(AppError::NotFound)?;

        if notice.user_id != user_id {
            return Err(AppError::NotFound);
        }

        Ok((notice, notice_type))
    }

    /// Most recent unarchived notices, newest first, for the feed.
    pub async fn recent_for_feed(
        &self,
        user_id: i32,
        limit: u64,
    ) -> AppResult<Vec<NoticeWithType>> {
        let items = Self::notices_for(user_id, NoticeFilter::default())
            .order_by_desc(notice::Column::Id)
            .limit(limit)
            .find_also_related(NoticeType)
            .all(&self.db)
            .await?;
        Ok(items)
    }

    pub async fn archive(&self, id: i32, actor: &AuthUser) -> AppResult<NoticeMutation> {
        let Some(existing) = Notice::find_by_id(id).one(&self.db).await? else {
            return Ok(NoticeMutation::Missing);
        };

        if !actor.may_manage(existing.user_id) {
            return Ok(NoticeMutation::Denied);
        }

        let mut active: notice::ActiveModel = existing.into();
        active.archived = sea_orm::ActiveValue::Set(true);
        active.update(&self.db).await?;
        Ok(NoticeMutation::Applied)
    }

    pub async fn delete(&self, id: i32, actor: &AuthUser) -> AppResult<NoticeMutation> {
        let Some(existing) = Notice::find_by_id(id).one(&self.db).await? else {
            return Ok(NoticeMutation::Missing);
        };

        if !actor.may_manage(existing.user_id) {
            return Ok(NoticeMutation::Denied);
        }

        Notice::delete_by_id(existing.id).exec(&self.db).await?;
        Ok(NoticeMutation::Applied)
    }

    /// Flag every unseen notice of `user_id` as seen, one row at a time.
    pub async fn mark_all_seen(&self, user_id: i32) -> AppResult<u64> {
        let unseen = Notice::find()
            .filter(notice::Column::UserId.eq(user_id))
            .filter(notice::Column::Unseen.eq(true))
            .all(&self.db)
            .await?;

        let mut marked = 0;
        for existing in unseen {
            let mut active: notice::ActiveModel = existing.into();
            active.unseen = sea_orm::ActiveValue::Set(false);
            active.update(&self.db).await?;
            marked += 1;
        }
        Ok(marked)
    }

    /// Create a notice of type `label` for each user and work out, per user,
    /// which media their preferences ask to deliver it on.
    pub async fn dispatch(
        &self,
        user_ids: &[i32],
        label: &str,
        message: &str,
        on_site: bool,
    ) -> AppResult<Vec<Dispatched>> {
        let notice_type = NoticeTypeService::new(self.db.clone())
            .find_by_label(label)
            .await?;

        let mut seen = HashSet::new();
        let recipients: Vec<i32> = user_ids
            .iter()
            .copied()
            .filter(|id| seen.insert(*id))
            .collect();

        let found: HashSet<i32> = User::find()
            .filter(user::Column::Id.is_in(recipients.clone()))
            .all(&self.db)
            .await?
            .into_iter()
            .map(|u| u.id)
            .collect();
        let missing: Vec<String> = recipients
            .iter()
            .filter(|id| !found.contains(*id))
            .map(|id| id.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(AppError::Validation(format!(
                "Unknown users: {}",
                missing.join(", ")
            )));
        }

        let settings = NoticeSettingService::new(self.db.clone());
        let now = chrono::Utc::now().naive_utc();
        let mut dispatched = Vec::with_capacity(recipients.len());

        for user_id in recipients {
            let model = notice::ActiveModel {
                user_id: sea_orm::ActiveValue::Set(user_id),
                notice_type_id: sea_orm::ActiveValue::Set(notice_type.id),
                message: sea_orm::ActiveValue::Set(message.to_string()),
                added: sea_orm::ActiveValue::Set(now),
                unseen: sea_orm::ActiveValue::Set(true),
                archived: sea_orm::ActiveValue::Set(false),
                on_site: sea_orm::ActiveValue::Set(on_site),
                ..Default::default()
            };
            let saved = model.insert(&self.db).await?;

            let mut media = Vec::new();
            for medium in NOTICE_MEDIA {
                if settings.should_send(user_id, &notice_type, *medium).await? {
                    media.push(*medium);
                }
            }

            tracing::info!(
                user_id,
                notice_id = saved.id,
                notice_type = %notice_type.label,
                ?media,
                "dispatched notice"
            );
            dispatched.push(Dispatched {
                user_id,
                notice_id: saved.id,
                media,
            });
        }

        Ok(dispatched)
    }
}
