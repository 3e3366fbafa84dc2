pub mod gauge;
pub mod init;
pub mod predict;
pub mod show;
