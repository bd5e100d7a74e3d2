pub mod app_error;
pub mod backend;
pub mod command_line;
pub mod context;
pub mod logging;
pub mod shader_paths;
pub mod shell;
pub mod vertex;
