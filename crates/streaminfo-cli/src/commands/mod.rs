pub mod init;
pub mod replay;
