//! CLI command handlers for the snipx application.

mod get;
mod invoke;
mod roots;

pub(crate) use get::handle_get_command;
pub(crate) use invoke::handle_invoke_command;
pub(crate) use roots::handle_roots_command;
