pub mod jemaat;
pub mod kehadiran_session;
