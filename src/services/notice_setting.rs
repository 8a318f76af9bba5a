use crate::{
    error::{AppError, AppResult},
    models::{
        notice_setting, Medium, NoticeSetting, NoticeSettingModel, NoticeType, NoticeTypeModel,
        NOTICE_MEDIA,
    },
};
use sea_orm::{
    sea_query::OnConflict, ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait,
    QueryFilter, QueryOrder,
};
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap, HashSet};
use utoipa::ToSchema;

/// One submitted row of the settings form.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct SettingsRowInput {
    /// Notice type id
    pub notice_type: i32,
    /// Checked media keyed by medium (`"email"`); absent means unchecked
    #[serde(default)]
    pub media: BTreeMap<String, bool>,
}

/// A validated row: every medium has an explicit choice.
#[derive(Debug, Clone, PartialEq)]
pub struct CleanRow {
    pub notice_type_id: i32,
    pub choices: Vec<(Medium, bool)>,
}

/// What a reconciliation pass wrote.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileOutcome {
    pub created: u64,
    pub updated: u64,
    pub unchanged: u64,
}

impl ReconcileOutcome {
    pub fn writes(&self) -> u64 {
        self.created + self.updated
    }
}

/// Validate a whole submission before anything is written.
///
/// Collects every problem rather than stopping at the first.
pub fn clean_submission(
    rows: &[SettingsRowInput],
    notice_types: &[NoticeTypeModel],
) -> Result<Vec<CleanRow>, Vec<String>> {
    let known: HashSet<i32> = notice_types.iter().map(|t| t.id).collect();
    let mut errors = Vec::new();

    if rows.len() > notice_types.len() {
        errors.push(format!(
            "too many rows: got {}, at most {} allowed",
            rows.len(),
            notice_types.len()
        ));
    }

    let mut seen = HashSet::new();
    let mut cleaned = Vec::with_capacity(rows.len());

    for (index, row) in rows.iter().enumerate() {
        if !known.contains(&row.notice_type) {
            errors.push(format!(
                "row {index}: unknown notice type {}",
                row.notice_type
            ));
            continue;
        }
        if !seen.insert(row.notice_type) {
            errors.push(format!(
                "row {index}: notice type {} submitted more than once",
                row.notice_type
            ));
            continue;
        }

        let mut submitted: HashMap<Medium, bool> = HashMap::new();
        for (key, value) in &row.media {
            match key.parse::<Medium>() {
                Ok(medium) => {
                    submitted.insert(medium, *value);
                }
                Err(e) => errors.push(format!("row {index}: {e}")),
            }
        }

        let choices = NOTICE_MEDIA
            .iter()
            .map(|medium| (*medium, submitted.get(medium).copied().unwrap_or(false)))
            .collect();

        cleaned.push(CleanRow {
            notice_type_id: row.notice_type,
            choices,
        });
    }

    if errors.is_empty() {
        Ok(cleaned)
    } else {
        Err(errors)
    }
}

pub struct NoticeSettingService {
    db: DatabaseConnection,
}

impl NoticeSettingService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Current preferences, one entry per notice type.
    ///
    /// Media without a stored setting show as unchecked.
    pub async fn settings_page(
        &self,
        user_id: i32,
    ) -> AppResult<Vec<(NoticeTypeModel, Vec<(Medium, bool)>)>> {
        let notice_types = NoticeType::find()
            .order_by_asc(crate::models::notice_type::Column::Id)
            .all(&self.db)
            .await?;

        let stored: HashMap<(i32, String), bool> = NoticeSetting::find()
            .filter(notice_setting::Column::UserId.eq(user_id))
            .all(&self.db)
            .await?
            .into_iter()
            .map(|s| ((s.notice_type_id, s.medium), s.send))
            .collect();

        let page = notice_types
            .into_iter()
            .map(|notice_type| {
                let choices = NOTICE_MEDIA
                    .iter()
                    .map(|medium| {
                        let key = (notice_type.id, medium.as_str().to_string());
                        (*medium, stored.get(&key).copied().unwrap_or(false))
                    })
                    .collect();
                (notice_type, choices)
            })
            .collect();

        Ok(page)
    }

    /// Apply a settings submission for `user_id`.
    ///
    /// Invalid submissions are rejected as a whole with no writes. Otherwise a
    /// setting is inserted when absent and updated only when its value changes.
    pub async fn reconcile(
        &self,
        user_id: i32,
        rows: &[SettingsRowInput],
    ) -> AppResult<ReconcileOutcome> {
        let notice_types = NoticeType::find().all(&self.db).await?;
        let cleaned = clean_submission(rows, &notice_types).map_err(AppError::InvalidForm)?;

        let mut outcome = ReconcileOutcome::default();
        for row in cleaned {
            for (medium, send) in row.choices {
                match self.find(user_id, row.notice_type_id, medium).await? {
                    None => {
                        if self.insert(user_id, row.notice_type_id, medium, send).await? {
                            outcome.created += 1;
                            continue;
                        }
                        // A concurrent submission stored the row first
                        match self.find(user_id, row.notice_type_id, medium).await? {
                            Some(setting) if setting.send != send => {
                                self.update(setting, send).await?;
                                outcome.updated += 1;
                            }
                            _ => outcome.unchanged += 1,
                        }
                    }
                    Some(setting) if setting.send != send => {
                        self.update(setting, send).await?;
                        outcome.updated += 1;
                    }
                    Some(_) => outcome.unchanged += 1,
                }
            }
        }

        tracing::debug!(
            user_id,
            created = outcome.created,
            updated = outcome.updated,
            unchanged = outcome.unchanged,
            "reconciled notice settings"
        );
        Ok(outcome)
    }

    /// Whether `medium` should carry notices of `notice_type` to `user_id`.
    ///
    /// A stored preference wins; otherwise the medium's default level decides.
    /// Never creates a setting.
    pub async fn should_send(
        &self,
        user_id: i32,
        notice_type: &NoticeTypeModel,
        medium: Medium,
    ) -> AppResult<bool> {
        let stored = self.find(user_id, notice_type.id, medium).await?;
        Ok(delivery_decision(stored.map(|s| s.send), notice_type, medium))
    }

    /// Insert a setting unless one already exists; returns whether a row was written.
    async fn insert(
        &self,
        user_id: i32,
        notice_type_id: i32,
        medium: Medium,
        send: bool,
    ) -> AppResult<bool> {
        let model = notice_setting::ActiveModel {
            user_id: sea_orm::ActiveValue::Set(user_id),
            notice_type_id: sea_orm::ActiveValue::Set(notice_type_id),
            medium: sea_orm::ActiveValue::Set(medium.as_str().to_string()),
            send: sea_orm::ActiveValue::Set(send),
            ..Default::default()
        };

        let inserted = NoticeSetting::insert(model)
            .on_conflict(
                OnConflict::columns([
                    notice_setting::Column::UserId,
                    notice_setting::Column::NoticeTypeId,
                    notice_setting::Column::Medium,
                ])
                .do_nothing()
                .to_owned(),
            )
            .exec_without_returning(&self.db)
            .await?;
        Ok(inserted > 0)
    }

    async fn update(&self, setting: NoticeSettingModel, send: bool) -> AppResult<()> {
        let mut active: notice_setting::ActiveModel = setting.into();
        active.send = sea_orm::ActiveValue::Set(send);
        active.update(&self.db).await?;
        Ok(())
    }

    async fn find(
        &self,
        user_id: i32,
        notice_type_id: i32,
        medium: Medium,
    ) -> AppResult<Option<NoticeSettingModel>> {
        let setting = NoticeSetting::find()
            .filter(notice_setting::Column::UserId.eq(user_id))
            .filter(notice_setting::Column::NoticeTypeId.eq(notice_type_id))
            .filter(notice_setting::Column::Medium.eq(medium.as_str()))
            .one(&self.db)
            .await?;
        Ok(setting)
    }
}

pub fn delivery_decision(
    stored: Option<bool>,
    notice_type: &NoticeTypeModel,
    medium: Medium,
) -> bool {
    stored.unwrap_or_else(|| medium.enabled_by_default(notice_type.default_level))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn notice_type(id: i32, default_level: i32) -> NoticeTypeModel {
        NoticeTypeModel {
            id,
            label: format!("type_{id}"),
            display: format!("Type {id}"),
            description: String::new(),
            default_level,
        }
    }

    fn row(notice_type: i32, media: &[(&str, bool)]) -> SettingsRowInput {
        SettingsRowInput {
            notice_type,
            media: media
                .iter()
                .map(|(k, v)| (k.to_string(), *v))
                .collect(),
        }
    }

    #[test]
    fn absent_media_default_to_unchecked() {
        let types = vec![notice_type(1, 2), notice_type(2, 2)];
        let cleaned = clean_submission(&[row(1, &[("email", true)]), row(2, &[])], &types).unwrap();
        assert_eq!(
            cleaned,
            vec![
                CleanRow {
                    notice_type_id: 1,
                    choices: vec![(Medium::Email, true)],
                },
                CleanRow {
                    notice_type_id: 2,
                    choices: vec![(Medium::Email, false)],
                },
            ]
        );
    }

    #[test]
    fn empty_submission_is_valid() {
        let types = vec![notice_type(1, 2)];
        assert_eq!(clean_submission(&[], &types), Ok(vec![]));
    }

    #[test]
    fn unknown_notice_type_rejected() {
        let types = vec![notice_type(1, 2)];
        let errors = clean_submission(&[row(9, &[("email", true)])], &types).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("unknown notice type 9"));
    }

    #[test]
    fn duplicate_rows_rejected() {
        let types = vec![notice_type(1, 2), notice_type(2, 2)];
        let errors = clean_submission(&[row(1, &[]), row(1, &[("email", true)])], &types)
            .unwrap_err();
        assert!(errors[0].contains("more than once"));
    }

    #[test]
    fn more_rows_than_types_rejected() {
        let types = vec![notice_type(1, 2)];
        let errors = clean_submission(&[row(1, &[]), row(1, &[])], &types).unwrap_err();
        assert!(errors.iter().any(|e| e.contains("too many rows")));
    }

    #[test]
    fn unknown_medium_rejected() {
        let types = vec![notice_type(1, 2)];
        let errors = clean_submission(&[row(1, &[("pigeon", true)])], &types).unwrap_err();
        assert!(errors[0].contains("unknown medium 'pigeon'"));
    }

    #[test]
    fn stored_preference_wins_over_default() {
        let chatty = notice_type(1, 3);
        assert!(!delivery_decision(Some(false), &chatty, Medium::Email));

        let quiet = notice_type(2, 1);
        assert!(delivery_decision(Some(true), &quiet, Medium::Email));
    }

    #[test]
    fn missing_preference_uses_type_level() {
        assert!(delivery_decision(None, &notice_type(1, 2), Medium::Email));
        assert!(!delivery_decision(None, &notice_type(2, 1), Medium::Email));
    }

    #[test]
    fn outcome_counts_writes() {
        let outcome = ReconcileOutcome {
            created: 2,
            updated: 1,
            unchanged: 5,
        };
        assert_eq!(outcome.writes(), 3);
    }
}
