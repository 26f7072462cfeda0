pub mod add;
pub mod completions;
pub mod edit;
pub mod init;
pub mod list;
pub mod move_cmd;
pub mod rm;
pub mod show;
