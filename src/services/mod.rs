pub mod dispatcher;
pub mod init;
