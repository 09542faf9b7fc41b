use crate::seed::{Seeder, ignore_duplicate};
use chrono::{Duration, Utc};
use db::models::attendance_session::{Model, NewSession};
use sea_orm::{DatabaseConnection, DbErr};

pub struct KehadiranSessionSeeder;

#[async_trait::async_trait]
impl Seeder for KehadiranSessionSeeder {
    async fn seed(&self, db: &DatabaseConnection) -> Result<(), DbErr> {
        let now = Utc::now();

        // Open right now, with a memorable code for manual testing
        ignore_duplicate(
            Model::create(
                db,
                NewSession {
                    nama_kegiatan: "Ibadah Minggu".into(),
                    jenis_kegiatan: "Ibadah".into(),
                    tanggal: now.date_naive(),
                    waktu_mulai: now - Duration::minutes(30),
                    waktu_selesai: now + Duration::hours(2),
                    status_aktif: true,
                    kode_qr: Some("SESSION-42-ABC".into()),
                },
            )
            .await,
        )?;

        let yesterday = now - Duration::days(1);
        Model::create(
            db,
            NewSession {
                nama_kegiatan: "Persekutuan Doa".into(),
                jenis_kegiatan: "Doa".into(),
                tanggal: yesterday.date_naive(),
                waktu_mulai: yesterday,
                waktu_selesai: yesterday + Duration::hours(1),
                status_aktif: true,
                kode_qr: None,
            },
        )
        .await?;

        let next_week = now + Duration::days(7);
        Model::create(
            db,
            NewSession {
                nama_kegiatan: "Latihan Paduan Suara".into(),
                jenis_kegiatan: "Pelayanan".into(),
                tanggal: next_week.date_naive(),
                waktu_mulai: next_week,
                waktu_selesai: next_week + Duration::hours(2),
                status_aktif: false,
                kode_qr: None,
            },
        )
        .await?;

        Ok(())
    }
}
