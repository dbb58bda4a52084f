pub mod environment;
pub mod terminal;

pub use environment::{config_path, data_dir, format_path_with_tilde};
pub use terminal::{sanitize_for_terminal, sanitize_single_line};
