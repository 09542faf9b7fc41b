use chrono::{DateTime, NaiveDate, Utc};
use rand::RngCore;
use sea_orm::entity::prelude::*;
use sea_orm::sea_query::{Expr, Func};
use sea_orm::{ActiveModelTrait, FromQueryResult, PaginatorTrait, QueryFilter, QuerySelect, Set};
use std::collections::HashMap;
use uuid::Uuid;

use super::attendance_record;

/// A time-boxed attendance-taking window tied to one activity ("QR session").
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, serde::Serialize)]
#[sea_orm(table_name = "attendance_sessions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub nama_kegiatan: String,
    pub jenis_kegiatan: String,
    pub tanggal: NaiveDate,
    pub waktu_mulai: DateTime<Utc>,
    pub waktu_selesai: DateTime<Utc>,
    pub status_aktif: bool,
    /// Payload encoded into the QR image.
    #[sea_orm(unique)]
    pub kode_qr: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::attendance_record::Entity")]
    Records,
}

impl Related<super::attendance_record::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Records.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Where a point in time falls relative to a session's validity window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowState {
    Open,
    Inactive,
    NotStarted,
    Ended,
}

#[derive(Debug, Clone)]
pub struct NewSession {
    pub nama_kegiatan: String,
    pub jenis_kegiatan: String,
    pub tanggal: NaiveDate,
    pub waktu_mulai: DateTime<Utc>,
    pub waktu_selesai: DateTime<Utc>,
    pub status_aktif: bool,
    /// Use a fixed code instead of a random one (seeding, tests).
    pub kode_qr: Option<String>,
}

/// Partial update; `None` leaves the column untouched.
#[derive(Debug, Clone, Default)]
pub struct SessionChanges {
    pub nama_kegiatan: Option<String>,
    pub jenis_kegiatan: Option<String>,
    pub tanggal: Option<NaiveDate>,
    pub waktu_mulai: Option<DateTime<Utc>>,
    pub waktu_selesai: Option<DateTime<Utc>>,
    pub status_aktif: Option<bool>,
}

fn random_code() -> String {
    let mut buf = [0u8; 32];
    rand::rngs::OsRng.fill_bytes(&mut buf);
    hex::encode(buf)
}

fn ensure_window(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<(), DbErr> {
    if end <= start {
        return Err(DbErr::Custom(
            "Waktu selesai harus setelah waktu mulai".into(),
        ));
    }
    Ok(())
}

impl Model {
    pub async fn create<C>(db: &C, new: NewSession) -> Result<Model, DbErr>
    where
        C: ConnectionTrait,
    {
        ensure_window(new.waktu_mulai, new.waktu_selesai)?;

        let kode_qr = match new.kode_qr {
            Some(k) if !k.trim().is_empty() => k.trim().to_owned(),
            _ => random_code(),
        };
        let now = Utc::now();

        ActiveModel {
            id: Set(Uuid::new_v4().to_string()),
            nama_kegiatan: Set(new.nama_kegiatan),
            jenis_kegiatan: Set(new.jenis_kegiatan),
            tanggal: Set(new.tanggal),
            waktu_mulai: Set(new.waktu_mulai),
            waktu_selesai: Set(new.waktu_selesai),
            status_aktif: Set(new.status_aktif),
            kode_qr: Set(kode_qr),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(db)
        .await
    }

    /// Applies `changes` to session `id`.
    ///
    /// The resulting window is checked as a whole, so moving only one bound
    /// past the other is rejected too.
    pub async fn edit<C>(db: &C, id: &str, changes: SessionChanges) -> Result<Model, DbErr>
    where
        C: ConnectionTrait,
    {
        let Some(current) = Entity::find_by_id(id.to_owned()).one(db).await? else {
            return Err(DbErr::RecordNotFound(format!(
                "Attendance session {id} not found"
            )));
        };

        ensure_window(
            changes.waktu_mulai.unwrap_or(current.waktu_mulai),
            changes.waktu_selesai.unwrap_or(current.waktu_selesai),
        )?;

        let mut active: ActiveModel = current.into();
        if let Some(v) = changes.nama_kegiatan {
            active.nama_kegiatan = Set(v);
        }
        if let Some(v) = changes.jenis_kegiatan {
            active.jenis_kegiatan = Set(v);
        }
        if let Some(v) = changes.tanggal {
            active.tanggal = Set(v);
        }
        if let Some(v) = changes.waktu_mulai {
            active.waktu_mulai = Set(v);
        }
        if let Some(v) = changes.waktu_selesai {
            active.waktu_selesai = Set(v);
        }
        if let Some(v) = changes.status_aktif {
            active.status_aktif = Set(v);
        }
        active.updated_at = Set(Utc::now());

        active.update(db).await
    }

    pub async fn find<C>(db: &C, id: &str) -> Result<Option<Model>, DbErr>
    where
        C: ConnectionTrait,
    {
        Entity::find_by_id(id.to_owned()).one(db).await
    }

    /// Resolves a decoded QR payload to its session.
    pub async fn find_by_kode<C>(db: &C, kode: &str) -> Result<Option<Model>, DbErr>
    where
        C: ConnectionTrait,
    {
        let kode = kode.trim();
        if kode.is_empty() {
            return Ok(None);
        }
        Entity::find()
            .filter(Column::KodeQr.eq(kode))
            .one(db)
            .await
    }

    /// Both window bounds are inclusive.
    pub fn window_state(&self, now: DateTime<Utc>) -> WindowState {
        if !self.status_aktif {
            WindowState::Inactive
        } else if now < self.waktu_mulai {
            WindowState::NotStarted
        } else if now > self.waktu_selesai {
            WindowState::Ended
        } else {
            WindowState::Open
        }
    }

    #[inline]
    pub fn is_open_at(&self, now: DateTime<Utc>) -> bool {
        self.window_state(now) == WindowState::Open
    }

    pub async fn attended_count<C>(db: &C, session_id: &str) -> Result<u64, DbErr>
    where
        C: ConnectionTrait,
    {
        attendance_record::Entity::find()
            .filter(attendance_record::Column::SessionId.eq(session_id))
            .count(db)
            .await
    }

    /// Attendance counts for a page of sessions in one query.
    ///
    /// Sessions with no records are absent from the map.
    pub async fn attended_counts_for<C>(
        db: &C,
        session_ids: &[String],
    ) -> Result<HashMap<String, i64>, DbErr>
    where
        C: ConnectionTrait,
    {
        if session_ids.is_empty() {
            return Ok(HashMap::new());
        }

        #[derive(FromQueryResult)]
        struct Row {
            session_id: String,
            cnt: i64,
        }

        let rows: Vec<Row> = attendance_record::Entity::find()
            .select_only()
            .column(attendance_record::Column::SessionId)
            .column_as(
                Expr::expr(Func::count(Expr::col(attendance_record::Column::JemaatId))),
                "cnt",
            )
            .filter(attendance_record::Column::SessionId.is_in(session_ids.iter().cloned()))
            .group_by(attendance_record::Column::SessionId)
            .into_model::<Row>()
            .all(db)
            .await?;

        Ok(rows.into_iter().map(|r| (r.session_id, r.cnt)).collect())
    }
}
