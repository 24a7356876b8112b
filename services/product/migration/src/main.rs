use sea_orm_migration::prelude::*;

use shop_product_migration::Migrator;

#[tokio::main]
async fn main() {
    cli::run_cli(Migrator).await;
}
