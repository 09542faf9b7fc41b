use crate::seed::{Seeder, ignore_duplicate};
use db::models::jemaat::Model;
use fake::{Fake, faker::name::en::Name};
use sea_orm::{DatabaseConnection, DbErr};

pub struct JemaatSeeder;

#[async_trait::async_trait]
impl Seeder for JemaatSeeder {
    async fn seed(&self, db: &DatabaseConnection) -> Result<(), DbErr> {
        // Fixed jemaat used in demos
        ignore_duplicate(Model::create(db, "Andi Pratama", "GM-001", None).await)?;
        ignore_duplicate(Model::create(db, "Budi Santoso", "GM-002", None).await)?;

        // Random jemaat
        for i in 3..=30 {
            let nama: String = Name().fake();
            let foto_url = fastrand::bool()
                .then(|| format!("https://picsum.photos/seed/gm{i:03}/200"));
            ignore_duplicate(
                Model::create(db, &nama, &format!("GM-{i:03}"), foto_url.as_deref()).await,
            )?;
        }

        Ok(())
    }
}
