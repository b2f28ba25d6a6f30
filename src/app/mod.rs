mod app_helper;
pub(crate) use app_helper::AppHelper;

mod cli_manager;

mod command;
pub(crate) use command::Command;

pub(crate) mod common;

mod encode_command;
pub(crate) use encode_command::EncodeCommand;

mod writable_string;
