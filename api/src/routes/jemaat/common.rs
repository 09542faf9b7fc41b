use serde::{Deserialize, Serialize};
use validator::Validate;

/// Directory projection of a jemaat, as consumed by the scan client.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JemaatResponse {
    pub id: String,
    pub nama: String,
    pub nomor_induk: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub foto_url: Option<String>,
}

impl From<db::models::jemaat::Model> for JemaatResponse {
    fn from(m: db::models::jemaat::Model) -> Self {
        Self {
            id: m.id,
            nama: m.nama,
            nomor_induk: m.nomor_induk,
            foto_url: m.foto_url,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub search: Option<String>,
    pub limit: Option<u64>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateJemaatRequest {
    #[validate(length(min = 1, max = 255, message = "Nama wajib diisi (maksimal 255 karakter)"))]
    pub nama: String,

    #[validate(length(min = 1, max = 64, message = "Nomor induk wajib diisi (maksimal 64 karakter)"))]
    pub nomor_induk: String,

    #[validate(url(message = "Foto URL tidak valid"))]
    pub foto_url: Option<String>,
}
