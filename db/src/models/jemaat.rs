use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::sea_query::{Expr, Func};
use sea_orm::{Condition, QueryOrder, QuerySelect, Set};
use uuid::Uuid;

/// Shortest search string that is allowed to reach the directory.
pub const MIN_SEARCH_LEN: usize = 3;

/// A congregant ("jemaat") in the `jemaat` table.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, serde::Serialize)]
#[sea_orm(table_name = "jemaat")]
pub struct Model {
    /// UUID v4, stored as text.
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub nama: String,
    /// Membership number, unique across the congregation.
    pub nomor_induk: String,
    pub foto_url: Option<String>,
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

impl Model {
    pub async fn create<C>(
        db: &C,
        nama: &str,
        nomor_induk: &str,
        foto_url: Option<&str>,
    ) -> Result<Model, DbErr>
    where
        C: ConnectionTrait,
    {
        let now = Utc::now();
        ActiveModel {
            id: Set(Uuid::new_v4().to_string()),
            nama: Set(nama.trim().to_owned()),
            nomor_induk: Set(nomor_induk.trim().to_owned()),
            foto_url: Set(foto_url.map(|s| s.to_owned())),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(db)
        .await
    }

    pub async fn find<C>(db: &C, id: &str) -> Result<Option<Model>, DbErr>
    where
        C: ConnectionTrait,
    {
        Entity::find_by_id(id.to_owned()).one(db).await
    }

    /// Directory lookup by name or membership number.
    ///
    /// Matching is a case-insensitive substring match. Queries shorter than
    /// [`MIN_SEARCH_LEN`] characters (after trimming) return nothing and do not
    /// touch the database.
    pub async fn search<C>(db: &C, query: &str, limit: u64) -> Result<Vec<Model>, DbErr>
    where
        C: ConnectionTrait,
    {
        let needle = query.trim();
        if needle.chars().count() < MIN_SEARCH_LEN {
            return Ok(Vec::new());
        }

        let pattern = super::contains_pattern(needle);
        Entity::find()
            .filter(
                Condition::any()
                    .add(Expr::expr(Func::lower(Expr::col(Column::Nama))).like(pattern.clone()))
                    .add(Expr::expr(Func::lower(Expr::col(Column::NomorInduk))).like(pattern)),
            )
            .order_by_asc(Column::Nama)
            .limit(limit)
            .all(db)
            .await
    }
}
