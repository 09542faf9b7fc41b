use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::sea_query::{Expr, Func};
use sea_orm::{ActiveModelTrait, Condition, PaginatorTrait, QueryFilter, QueryOrder, Set, SqlErr};

use super::attendance_session::{self, WindowState};
use super::jemaat;

/// One jemaat's attendance at one session.
///
/// The composite primary key guarantees at most one record per
/// (session, jemaat) pair.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, serde::Serialize)]
#[sea_orm(table_name = "attendance_records")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub session_id: String,
    #[sea_orm(primary_key, auto_increment = false)]
    pub jemaat_id: String,

    pub waktu_hadir: DateTime<Utc>,
    pub ip_address: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::attendance_session::Entity",
        from = "Column::SessionId",
        to = "super::attendance_session::Column::Id"
    )]
    Session,
    #[sea_orm(
        belongs_to = "super::jemaat::Entity",
        from = "Column::JemaatId",
        to = "super::jemaat::Column::Id"
    )]
    Jemaat,
}

impl Related<super::attendance_session::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Session.def()
    }
}

impl Related<super::jemaat::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Jemaat.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Why a scan was not recorded.
///
/// The display strings are shown to the operator as-is.
#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    #[error("QR Code tidak valid atau sudah kedaluwarsa")]
    UnknownCode,
    #[error("Jemaat tidak ditemukan")]
    UnknownJemaat,
    #[error("Sesi kehadiran tidak aktif")]
    Inactive,
    #[error("Sesi kehadiran belum dimulai")]
    NotStarted,
    #[error("Sesi kehadiran sudah berakhir")]
    Ended,
    #[error("Kehadiran sudah tercatat untuk sesi ini")]
    AlreadyRecorded,
    #[error("Database error: {0}")]
    Db(#[from] DbErr),
}

/// Filter, sort and page for [`Model::list_for_session`].
#[derive(Debug, Clone)]
pub struct RecordQuery {
    /// Matches jemaat name, membership number or IP address.
    pub q: Option<String>,
    /// `waktu_hadir` | `nama`, `-` prefix for descending. Default `-waktu_hadir`.
    pub sort: Option<String>,
    /// 1-based.
    pub page: u64,
    pub per_page: u64,
}

impl Default for RecordQuery {
    fn default() -> Self {
        Self {
            q: None,
            sort: None,
            page: 1,
            per_page: 20,
        }
    }
}

/// A record together with the jemaat it belongs to.
#[derive(Debug, Clone)]
pub struct RecordWithJemaat {
    pub record: Model,
    /// `None` only if the jemaat row vanished underneath the record.
    pub jemaat: Option<jemaat::Model>,
}

impl Model {
    /// Records attendance for `jemaat_id` at the session whose QR payload is `kode_qr`.
    ///
    /// Checks, in order: the code resolves to a session, the jemaat exists, the
    /// session is active and `now` lies inside its window, and the pair has not
    /// been recorded yet. A concurrent insert of the same pair loses on the
    /// primary key and is reported as [`ScanError::AlreadyRecorded`].
    pub async fn record_scan<C>(
        db: &C,
        kode_qr: &str,
        jemaat_id: &str,
        now: DateTime<Utc>,
        client_ip: Option<&str>,
    ) -> Result<Model, ScanError>
    where
        C: ConnectionTrait,
    {
        let Some(session) = attendance_session::Model::find_by_kode(db, kode_qr).await? else {
            return Err(ScanError::UnknownCode);
        };

        if jemaat::Model::find(db, jemaat_id).await?.is_none() {
            return Err(ScanError::UnknownJemaat);
        }

        match session.window_state(now) {
            WindowState::Open => {}
            WindowState::Inactive => return Err(ScanError::Inactive),
            WindowState::NotStarted => return Err(ScanError::NotStarted),
            WindowState::Ended => return Err(ScanError::Ended),
        }

        if Self::exists(db, &session.id, jemaat_id).await? {
            return Err(ScanError::AlreadyRecorded);
        }

        let record = Self::insert_once(db, &session.id, jemaat_id, now, client_ip).await?;
        tracing::info!(session_id = %session.id, jemaat_id, "attendance recorded");
        Ok(record)
    }

    /// Inserts the record, mapping a primary key clash to
    /// [`ScanError::AlreadyRecorded`].
    async fn insert_once<C>(
        db: &C,
        session_id: &str,
        jemaat_id: &str,
        now: DateTime<Utc>,
        client_ip: Option<&str>,
    ) -> Result<Model, ScanError>
    where
        C: ConnectionTrait,
    {
        let inserted = ActiveModel {
            session_id: Set(session_id.to_owned()),
            jemaat_id: Set(jemaat_id.to_owned()),
            waktu_hadir: Set(now),
            ip_address: Set(client_ip.map(|s| s.to_owned())),
        }
        .insert(db)
        .await;

        match inserted {
            Ok(record) => Ok(record),
            Err(e) if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
                Err(ScanError::AlreadyRecorded)
            }
            Err(e) => Err(ScanError::Db(e)),
        }
    }

    pub async fn exists<C>(db: &C, session_id: &str, jemaat_id: &str) -> Result<bool, DbErr>
    where
        C: ConnectionTrait,
    {
        Ok(Entity::find()
            .filter(Column::SessionId.eq(session_id))
            .filter(Column::JemaatId.eq(jemaat_id))
            .one(db)
            .await?
            .is_some())
    }

    /// One page of a session's records, joined with their jemaat.
    ///
    /// Returns the page and the total number of matching records.
    pub async fn list_for_session<C>(
        db: &C,
        session_id: &str,
        query: &RecordQuery,
    ) -> Result<(Vec<RecordWithJemaat>, u64), DbErr>
    where
        C: ConnectionTrait,
    {
        let mut sel = Entity::find()
            .find_also_related(jemaat::Entity)
            .filter(Column::SessionId.eq(session_id));

        if let Some(raw) = query.q.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            let pattern = super::contains_pattern(raw);
            sel = sel.filter(
                Condition::any()
                    .add(
                        Expr::expr(Func::lower(Expr::col((jemaat::Entity, jemaat::Column::Nama))))
                            .like(pattern.clone()),
                    )
                    .add(
                        Expr::expr(Func::lower(Expr::col((
                            jemaat::Entity,
                            jemaat::Column::NomorInduk,
                        ))))
                        .like(pattern.clone()),
                    )
                    .add(
                        Expr::expr(Func::lower(Expr::col((Entity, Column::IpAddress))))
                            .like(pattern),
                    ),
            );
        }

        sel = match query.sort.as_deref() {
            Some(sort) if sort.starts_with('-') => match &sort[1..] {
                "nama" => sel.order_by_desc(jemaat::Column::Nama),
                _ => sel.order_by_desc(Column::WaktuHadir),
            },
            Some("waktu_hadir") => sel.order_by_asc(Column::WaktuHadir),
            Some("nama") => sel.order_by_asc(jemaat::Column::Nama),
            _ => sel.order_by_desc(Column::WaktuHadir),
        };

        let paginator = sel.paginate(db, query.per_page.max(1));
        let total = paginator.num_items().await?;
        let rows = paginator.fetch_page(query.page.max(1) - 1).await?;

        Ok((
            rows.into_iter()
                .map(|(record, jemaat)| RecordWithJemaat { record, jemaat })
                .collect(),
            total,
        ))
    }

    /// Every record of a session, oldest first.
    pub async fn all_for_session<C>(
        db: &C,
        session_id: &str,
    ) -> Result<Vec<RecordWithJemaat>, DbErr>
    where
        C: ConnectionTrait,
    {
        let rows = Entity::find()
            .find_also_related(jemaat::Entity)
            .filter(Column::SessionId.eq(session_id))
            .order_by_asc(Column::WaktuHadir)
            .all(db)
            .await?;

        Ok(rows
            .into_iter()
            .map(|(record, jemaat)| RecordWithJemaat { record, jemaat })
            .collect())
    }
}
