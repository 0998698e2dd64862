use sea_orm_migration::prelude::*;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250301_000001_create_customers_table::Migration),
            Box::new(m20250301_000002_create_quotes_table::Migration),
            Box::new(m20250301_000003_create_invoices_table::Migration),
            Box::new(m20250301_000004_create_invoice_items_table::Migration),
        ]
    }
}

// Migration implementations

mod m20250301_000001_create_customers_table {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250301_000001_create_customers_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Customers::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Customers::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Customers::CompanyName).string().not_null())
                        .col(ColumnDef::new(Customers::ContactPerson).string().null())
                        .col(ColumnDef::new(Customers::Email).string().null())
                        .col(ColumnDef::new(Customers::Phone).string().null())
                        .col(ColumnDef::new(Customers::CreatedAt).timestamp().not_null())
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Customers::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub enum Customers {
        Table,
        Id,
        CompanyName,
        ContactPerson,
        Email,
        Phone,
        CreatedAt,
    }
}

mod m20250301_000002_create_quotes_table {

    use sea_orm_migration::prelude::*;

    use super::m20250301_000001_create_customers_table::Customers;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250301_000002_create_quotes_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Quotes::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Quotes::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(Quotes::QuoteNumber).string().not_null())
                        .col(ColumnDef::new(Quotes::CustomerId).uuid().not_null())
                        .col(
                            ColumnDef::new(Quotes::TotalAmount)
                                .decimal_len(12, 2)
                                .not_null()
                                .default(0),
                        )
                        .col(ColumnDef::new(Quotes::CreatedAt).timestamp().not_null())
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_quotes_customer_id")
                                .from(Quotes::Table, Quotes::CustomerId)
                                .to(Customers::Table, Customers::Id),
                        )
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Quotes::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub enum Quotes {
        Table,
        Id,
        QuoteNumber,
        CustomerId,
        TotalAmount,
        CreatedAt,
    }
}

mod m20250301_000003_create_invoices_table {

    use sea_orm_migration::prelude::*;

    use super::m20250301_000001_create_customers_table::Customers;
    use super::m20250301_000002_create_quotes_table::Quotes;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250301_000003_create_invoices_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Invoices::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Invoices::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(Invoices::InvoiceNumber).string().not_null())
                        .col(ColumnDef::new(Invoices::CustomerId).uuid().not_null())
                        .col(ColumnDef::new(Invoices::QuoteId).uuid().null())
                        .col(ColumnDef::new(Invoices::Status).string().not_null())
                        .col(ColumnDef::new(Invoices::IssueDate).date().not_null())
                        .col(ColumnDef::new(Invoices::DueDate).date().not_null())
                        .col(
                            ColumnDef::new(Invoices::Subtotal)
                                .decimal_len(12, 2)
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(Invoices::TaxRate)
                                .decimal_len(5, 2)
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(Invoices::TaxAmount)
                                .decimal_len(12, 2)
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(Invoices::DiscountAmount)
                                .decimal_len(12, 2)
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(Invoices::TotalAmount)
                                .decimal_len(12, 2)
                                .not_null()
                                .default(0),
                        )
                        .col(ColumnDef::new(Invoices::PaymentTerms).string().null())
                        .col(ColumnDef::new(Invoices::Notes).string().null())
                        .col(ColumnDef::new(Invoices::PaymentDetails).string().null())
                        .col(ColumnDef::new(Invoices::CreatedAt).timestamp().not_null())
                        .col(ColumnDef::new(Invoices::UpdatedAt).timestamp().null())
                        .col(ColumnDef::new(Invoices::SentAt).timestamp().null())
                        .col(ColumnDef::new(Invoices::PaidAt).timestamp().null())
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_invoices_customer_id")
                                .from(Invoices::Table, Invoices::CustomerId)
                                .to(Customers::Table, Customers::Id),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_invoices_quote_id")
                                .from(Invoices::Table, Invoices::QuoteId)
                                .to(Quotes::Table, Quotes::Id),
                        )
                        .to_owned(),
                )
                .await?;

            // Number uniqueness backs the retry-on-conflict assignment.
            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_invoices_invoice_number")
                        .table(Invoices::Table)
                        .col(Invoices::InvoiceNumber)
                        .unique()
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_invoices_customer_id")
                        .table(Invoices::Table)
                        .col(Invoices::CustomerId)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_invoices_status")
                        .table(Invoices::Table)
                        .col(Invoices::Status)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Invoices::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub enum Invoices {
        Table,
        Id,
        InvoiceNumber,
        CustomerId,
        QuoteId,
        Status,
        IssueDate,
        DueDate,
        Subtotal,
        TaxRate,
        TaxAmount,
        DiscountAmount,
        TotalAmount,
        PaymentTerms,
        Notes,
        PaymentDetails,
        CreatedAt,
        UpdatedAt,
        SentAt,
        PaidAt,
    }
}

mod m20250301_000004_create_invoice_items_table {

    use sea_orm_migration::prelude::*;

    use super::m20250301_000003_create_invoices_table::Invoices;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250301_000004_create_invoice_items_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(InvoiceItems::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(InvoiceItems::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(InvoiceItems::InvoiceId).uuid().not_null())
                        .col(ColumnDef::new(InvoiceItems::Name).string().not_null())
                        .col(ColumnDef::new(InvoiceItems::Description).string().null())
                        .col(
                            ColumnDef::new(InvoiceItems::Quantity)
                                .integer()
                                .not_null()
                                .default(1),
                        )
                        .col(ColumnDef::new(InvoiceItems::Unit).string().not_null())
                        .col(
                            ColumnDef::new(InvoiceItems::UnitPrice)
                                .decimal_len(12, 2)
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(InvoiceItems::Total)
                                .decimal_len(12, 2)
                                .not_null()
                                .default(0),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_invoice_items_invoice_id")
                                .from(InvoiceItems::Table, InvoiceItems::InvoiceId)
                                .to(Invoices::Table, Invoices::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_invoice_items_invoice_id")
                        .table(InvoiceItems::Table)
                        .col(InvoiceItems::InvoiceId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(InvoiceItems::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub enum InvoiceItems {
        Table,
        Id,
        InvoiceId,
        Name,
        Description,
        Quantity,
        Unit,
        UnitPrice,
        Total,
    }
}
