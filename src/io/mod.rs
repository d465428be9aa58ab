pub mod csv_read;
pub mod csv_write;
pub mod mail;
