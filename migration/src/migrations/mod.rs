pub mod m202510170001_create_jemaat;
pub mod m202510170002_create_attendance;
