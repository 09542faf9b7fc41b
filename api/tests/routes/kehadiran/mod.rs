mod scan_test;
mod sessions_test;
