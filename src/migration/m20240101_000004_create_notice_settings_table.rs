use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(DeriveIden)]
enum NoticeSettings {
    Table,
    Id,
    UserId,
    NoticeTypeId,
    Medium,
    Send,
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
}

#[derive(DeriveIden)]
enum NoticeTypes {
    Table,
    Id,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(NoticeSettings::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(NoticeSettings::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(NoticeSettings::UserId).integer().not_null())
                    .col(
                        ColumnDef::new(NoticeSettings::NoticeTypeId)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(NoticeSettings::Medium)
                            .string_len(16)
                            .not_null(),
                    )
                    .col(ColumnDef::new(NoticeSettings::Send).boolean().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_notice_settings_user_id")
                            .from(NoticeSettings::Table, NoticeSettings::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_notice_settings_notice_type_id")
                            .from(NoticeSettings::Table, NoticeSettings::NoticeTypeId)
                            .to(NoticeTypes::Table, NoticeTypes::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("uq_notice_settings_user_type_medium")
                    .table(NoticeSettings::Table)
                    .col(NoticeSettings::UserId)
                    .col(NoticeSettings::NoticeTypeId)
                    .col(NoticeSettings::Medium)
                    .unique()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(NoticeSettings::Table).to_owned())
            .await
    }
}
