use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(DeriveIden)]
enum NoticeTypes {
    Table,
    Id,
    Label,
    Display,
    Description,
    DefaultLevel,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(NoticeTypes::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(NoticeTypes::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(NoticeTypes::Label)
                            .string_len(40)
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(NoticeTypes::Display)
                            .string_len(50)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(NoticeTypes::Description)
                            .string_len(100)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(NoticeTypes::DefaultLevel)
                            .integer()
                            .not_null()
                            .default(2),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(NoticeTypes::Table).to_owned())
            .await
    }
}
