use crate::seed::{Seeder, run_seeder};
use crate::seeds::{jemaat::JemaatSeeder, kehadiran_session::KehadiranSessionSeeder};
use colored::*;
use migration::Migrator;
use sea_orm_migration::MigratorTrait;

mod seed;
mod seeds;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let db = match db::connect().await {
        Ok(db) => db,
        Err(e) => {
            eprintln!("{} {e}", "Database connection failed:".red());
            std::process::exit(1);
        }
    };

    if let Err(e) = Migrator::up(&db, None).await {
        eprintln!("{} {e}", "Migrations failed:".red());
        std::process::exit(1);
    }

    for (seeder, name) in [
        (Box::new(JemaatSeeder) as Box<dyn Seeder + Send + Sync>, "Jemaat"),
        (Box::new(KehadiranSessionSeeder), "KehadiranSession"),
    ] {
        run_seeder(&*seeder, name, &db).await;
    }
}
