//! 交互式文本输入
//!
//! 读写对象可注入，测试时用内存缓冲代替终端

use std::io::{self, BufRead, Write};

use super::file_reader::read_text_file;

pub struct TextPrompt<R, W> {
    reader: R,
    writer: W,
}

impl TextPrompt<io::StdinLock<'static>, io::Stdout> {
    /// 绑定到进程的标准输入输出
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> TextPrompt<R, W> {
    pub fn new(reader: R, writer: W) -> Self {
        Self { reader, writer }
    }

    /// 询问输入方式并返回待朗读的文本
    ///
    /// 粘贴为空或输入结束（EOF）时返回 `None`；文件读取失败时重新询问。
    pub fn read_text(&mut self) -> io::Result<Option<String>> {
        loop {
            let Some(choice) =
                self.ask("\nChoose input method:\n1. Paste text\n2. Provide file path\n> ")?
            else {
                return Ok(None);
            };

            match choice.as_str() {
                "1" => {
                    let text = self.ask("\nPaste your text here:\n> ")?;
                    return Ok(text.filter(|t| !t.is_empty()));
                }
                "2" => {
                    let Some(path) = self.ask("\nEnter the file path:\n> ")? else {
                        return Ok(None);
                    };
                    match read_text_file(&path) {
                        Ok(text) => return Ok(Some(text)),
                        Err(e) => {
                            tracing::debug!(path = %path, error = %e, "File input rejected");
                            writeln!(self.writer, "\n{}", e)?;
                        }
                    }
                }
                _ => {
                    writeln!(self.writer, "\nInvalid choice. Please enter '1' or '2'.")?;
                }
            }
        }
    }

    /// 输出提示并读取一行（已 trim），EOF 返回 `None`
    fn ask(&mut self, prompt: &str) -> io::Result<Option<String>> {
        write!(self.writer, "{}", prompt)?;
        self.writer.flush()?;

        let mut line = String::new();
        if self.reader.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }
}
