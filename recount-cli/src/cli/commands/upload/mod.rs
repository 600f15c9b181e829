mod handler;

pub use handler::handle_upload_command;
