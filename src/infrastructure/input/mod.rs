//! Input Sources - 文本来源（交互式输入、文件读取）

mod file_reader;
mod prompt;

pub use file_reader::{read_text_file, InputError, SUPPORTED_EXTENSIONS};
pub use prompt::TextPrompt;
