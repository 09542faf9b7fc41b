mod health_test;
mod jemaat_test;
mod kehadiran;
