mod handler;

pub use handler::handle_import_command;
