pub mod dispatch;
pub mod init;
pub mod locations;
pub mod reset;
pub mod schema;
pub mod shared;
pub mod status;
pub mod sync;
pub mod viewport;
pub mod watch;
