use sea_orm_migration::prelude::*;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240101_000001_create_users_table::Migration),
            Box::new(m20240101_000002_create_purchase_orders_table::Migration),
            Box::new(m20240101_000003_create_purchase_order_details_table::Migration),
        ]
    }
}

mod m20240101_000001_create_users_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000001_create_users_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Users::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Users::Id)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(Users::Name).string().not_null())
                        .col(
                            ColumnDef::new(Users::Email)
                                .string()
                                .not_null()
                                .unique_key(),
                        )
                        .col(ColumnDef::new(Users::PasswordHash).string().not_null())
                        .col(
                            ColumnDef::new(Users::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Users::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum Users {
        Table,
        Id,
        Name,
        Email,
        PasswordHash,
        CreatedAt,
    }
}

mod m20240101_000002_create_purchase_orders_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000002_create_purchase_orders_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            // po_id is a soft self-reference: no FK, children are orphaned explicitly on delete.
            manager
                .create_table(
                    Table::create()
                        .table(PurchaseOrders::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(PurchaseOrders::Id)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(
                            ColumnDef::new(PurchaseOrders::PoNo)
                                .string_len(32)
                                .not_null()
                                .unique_key(),
                        )
                        .col(ColumnDef::new(PurchaseOrders::PoId).integer().null())
                        .col(ColumnDef::new(PurchaseOrders::PoDate).date().null())
                        .col(ColumnDef::new(PurchaseOrders::PoType).string().null())
                        .col(ColumnDef::new(PurchaseOrders::PayMode).string().null())
                        .col(ColumnDef::new(PurchaseOrders::Currency).string().null())
                        .col(ColumnDef::new(PurchaseOrders::Subject).string().null())
                        .col(ColumnDef::new(PurchaseOrders::Remarks).text().null())
                        .col(ColumnDef::new(PurchaseOrders::CompanyCode).string().null())
                        .col(ColumnDef::new(PurchaseOrders::VendorId).integer().null())
                        .col(ColumnDef::new(PurchaseOrders::StoreId).integer().null())
                        .col(money(PurchaseOrders::Discount))
                        .col(money(PurchaseOrders::SubTotal))
                        .col(money(PurchaseOrders::GrandTotal))
                        .col(money(PurchaseOrders::VdsTotal))
                        .col(money(PurchaseOrders::TdsTotal))
                        .col(ColumnDef::new(PurchaseOrders::CreatedBy).string().null())
                        .col(ColumnDef::new(PurchaseOrders::ModifiedBy).string().null())
                        .col(
                            ColumnDef::new(PurchaseOrders::Created)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(PurchaseOrders::Modified)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_purchase_orders_po_id")
                        .table(PurchaseOrders::Table)
                        .col(PurchaseOrders::PoId)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_purchase_orders_created")
                        .table(PurchaseOrders::Table)
                        .col(PurchaseOrders::Created)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(PurchaseOrders::Table).to_owned())
                .await
        }
    }

    fn money(column: PurchaseOrders) -> ColumnDef {
        ColumnDef::new(column)
            .decimal_len(18, 2)
            .not_null()
            .default(0)
            .to_owned()
    }

    #[derive(DeriveIden)]
    pub(super) enum PurchaseOrders {
        Table,
        Id,
        PoNo,
        PoId,
        PoDate,
        PoType,
        PayMode,
        Currency,
        Subject,
        Remarks,
        CompanyCode,
        VendorId,
        StoreId,
        Discount,
        SubTotal,
        GrandTotal,
        VdsTotal,
        TdsTotal,
        CreatedBy,
        ModifiedBy,
        Created,
        Modified,
    }
}

mod m20240101_000003_create_purchase_order_details_table {
    use super::m20240101_000002_create_purchase_orders_table::PurchaseOrders;
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000003_create_purchase_order_details_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            // No ON DELETE CASCADE: order deletion removes its details explicitly.
            manager
                .create_table(
                    Table::create()
                        .table(PurchaseOrderDetails::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(PurchaseOrderDetails::Id)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(
                            ColumnDef::new(PurchaseOrderDetails::PoId)
                                .integer()
                                .not_null(),
                        )
                        .col(ColumnDef::new(PurchaseOrderDetails::LineNo).integer().null())
                        .col(
                            ColumnDef::new(PurchaseOrderDetails::InvProductId)
                                .integer()
                                .null(),
                        )
                        .col(amount(PurchaseOrderDetails::Quantity))
                        .col(amount(PurchaseOrderDetails::UnitPrice))
                        .col(amount(PurchaseOrderDetails::Discount))
                        .col(amount(PurchaseOrderDetails::DiscountPct))
                        .col(amount(PurchaseOrderDetails::TotalPrice))
                        .col(amount(PurchaseOrderDetails::VdsPct))
                        .col(amount(PurchaseOrderDetails::Vds))
                        .col(amount(PurchaseOrderDetails::TdsPct))
                        .col(amount(PurchaseOrderDetails::Tds))
                        .col(
                            ColumnDef::new(PurchaseOrderDetails::Created)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(PurchaseOrderDetails::Modified)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_purchase_order_details_po_id")
                                .from(PurchaseOrderDetails::Table, PurchaseOrderDetails::PoId)
                                .to(PurchaseOrders::Table, PurchaseOrders::Id)
                                .on_delete(ForeignKeyAction::Restrict),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_purchase_order_details_po_id")
                        .table(PurchaseOrderDetails::Table)
                        .col(PurchaseOrderDetails::PoId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(PurchaseOrderDetails::Table).to_owned())
                .await
        }
    }

    fn amount(column: PurchaseOrderDetails) -> ColumnDef {
        ColumnDef::new(column)
            .decimal_len(18, crate::pricing::amount::LINE_SCALE)
            .not_null()
            .default(0)
            .to_owned()
    }

    #[derive(DeriveIden)]
    enum PurchaseOrderDetails {
        Table,
        Id,
        PoId,
        LineNo,
        InvProductId,
        Quantity,
        UnitPrice,
        Discount,
        DiscountPct,
        TotalPrice,
        VdsPct,
        Vds,
        TdsPct,
        Tds,
        Created,
        Modified,
    }
}
