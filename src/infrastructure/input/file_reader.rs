//! 文本文件读取
//!
//! 支持 `.txt`、`.md`（UTF-8）与 `.docx`（Office Open XML 段落文本）

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// 支持的扩展名（小写，不含点）
pub const SUPPORTED_EXTENSIONS: [&str; 3] = ["txt", "md", "docx"];

/// docx 正文所在的 zip 条目
const DOCX_DOCUMENT_ENTRY: &str = "word/document.xml";

static DOCX_TEXT_RUN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<w:t(?:\s[^>]*)?>([^<]*)</w:t>").expect("valid regex"));

/// 制表符；`<w:tabs>` 中带属性的制表位定义不匹配
static DOCX_TAB: Lazy<Regex> = Lazy::new(|| Regex::new(r"<w:tab\s*/>").expect("valid regex"));

static DOCX_BREAK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<w:(?:br|cr)(?:\s[^>]*)?/>").expect("valid regex"));

/// 自闭合的空段落 `<w:p/>`
static DOCX_EMPTY_PARAGRAPH: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<w:p(?:\s[^>]*)?/>").expect("valid regex"));

static XML_NUMERIC_REF: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"&#(?:x([0-9A-Fa-f]+)|([0-9]+));").expect("valid regex"));

#[derive(Debug, Error)]
pub enum InputError {
    #[error("File not found: {0}")]
    NotFound(PathBuf),

    #[error("Unsupported file format '{extension}'. Use one of: {}", supported_list())]
    UnsupportedFormat { extension: String },

    #[error("File is empty")]
    Empty,

    #[error("Error reading file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid .docx document: {0}")]
    Docx(String),
}

/// 读取文件中的文本（首尾空白已去除）
pub fn read_text_file(path: impl AsRef<Path>) -> Result<String, InputError> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(InputError::NotFound(path.to_path_buf()));
    }

    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();

    if !SUPPORTED_EXTENSIONS.contains(&extension.as_str()) {
        return Err(InputError::UnsupportedFormat {
            extension: if extension.is_empty() {
                "(none)".to_string()
            } else {
                format!(".{}", extension)
            },
        });
    }

    let content = if extension == "docx" {
        read_docx(path)?
    } else {
        std::fs::read_to_string(path)?
    };

    let content = content.trim();
    if content.is_empty() {
        return Err(InputError::Empty);
    }

    tracing::debug!(
        path = %path.display(),
        chars = content.chars().count(),
        "Text file loaded"
    );

    Ok(content.to_string())
}

fn supported_list() -> String {
    SUPPORTED_EXTENSIONS
        .iter()
        .map(|e| format!(".{}", e))
        .collect::<Vec<_>>()
        .join(", ")
}

fn read_docx(path: &Path) -> Result<String, InputError> {
    let file = File::open(path)?;
    let mut archive = zip::ZipArchive::new(file).map_err(|e| InputError::Docx(e.to_string()))?;

    let mut xml = String::new();
    archive
        .by_name(DOCX_DOCUMENT_ENTRY)
        .map_err(|e| InputError::Docx(format!("{}: {}", DOCX_DOCUMENT_ENTRY, e)))?
        .read_to_string(&mut xml)?;

    Ok(extract_paragraphs(&xml).join("\n"))
}

/// 按 `</w:p>` 划分段落，拼接每段内的文本 run
///
/// 制表符和换行先改写成文本 run，空段落保留为空行
fn extract_paragraphs(xml: &str) -> Vec<String> {
    let xml = DOCX_EMPTY_PARAGRAPH.replace_all(xml, "<w:p></w:p>");
    let xml = DOCX_TAB.replace_all(&xml, "<w:t>\t</w:t>");
    let xml = DOCX_BREAK.replace_all(&xml, "<w:t>\n</w:t>");

    let mut paragraphs: Vec<String> = xml
        .split("</w:p>")
        .map(|paragraph| {
            DOCX_TEXT_RUN
                .captures_iter(paragraph)
                .filter_map(|cap| cap.get(1))
                .map(|m| unescape_xml(m.as_str()))
                .collect::<String>()
        })
        .collect();

    // 最后一个 `</w:p>` 之后是文档尾部，不是段落
    paragraphs.pop();
    paragraphs
}

/// 数字字符引用先于 `&amp;` 解码，`&amp;#38;` 因此保持为字面量 `&#38;`
fn unescape_xml(text: &str) -> String {
    let decoded = XML_NUMERIC_REF.replace_all(text, |caps: &Captures| {
        let code = match (caps.get(1), caps.get(2)) {
            (Some(hex), _) => u32::from_str_radix(hex.as_str(), 16).ok(),
            (_, Some(dec)) => dec.as_str().parse::<u32>().ok(),
            _ => None,
        };
        code.and_then(char::from_u32)
            .map(String::from)
            .unwrap_or_else(|| caps[0].to_string())
    });

    decoded
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::tempdir;
    use zip::write::SimpleFileOptions;

    fn write_docx(path: &Path, paragraphs: &[&str]) {
        let body: String = paragraphs
            .iter()
            .map(|p| format!("<w:p><w:r><w:t xml:space=\"preserve\">{}</w:t></w:r></w:p>", p))
            .collect();
        let xml = format!(
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?><w:document><w:body>{}<w:sectPr/></w:body></w:document>",
            body
        );

        let file = File::create(path).unwrap();
        let mut writer = zip::ZipWriter::new(file);
        writer
            .start_file(DOCX_DOCUMENT_ENTRY, SimpleFileOptions::default())
            .unwrap();
        writer.write_all(xml.as_bytes()).unwrap();
        writer.finish().unwrap();
    }

    #[test]
    fn test_read_txt_trims() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("note.txt");
        std::fs::write(&path, "\n  Hello there.  \n").unwrap();

        assert_eq!(read_text_file(&path).unwrap(), "Hello there.");
    }

    #[test]
    fn test_read_markdown_uppercase_extension() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("README.MD");
        std::fs::write(&path, "# Title").unwrap();

        assert_eq!(read_text_file(&path).unwrap(), "# Title");
    }

    #[test]
    fn test_missing_file() {
        let dir = tempdir().unwrap();
        let result = read_text_file(dir.path().join("nope.txt"));
        assert!(matches!(result, Err(InputError::NotFound(_))));
    }

    #[test]
    fn test_unsupported_extension() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("data.pdf");
        std::fs::write(&path, "x").unwrap();

        match read_text_file(&path) {
            Err(InputError::UnsupportedFormat { extension }) => assert_eq!(extension, ".pdf"),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_blank_file_is_empty() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("blank.txt");
        std::fs::write(&path, "   \n\n").unwrap();

        assert!(matches!(read_text_file(&path), Err(InputError::Empty)));
    }

    #[test]
    fn test_read_docx_paragraphs() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("doc.docx");
        write_docx(&path, &["First paragraph.", "Tom &amp; Jerry.", ""]);

        assert_eq!(
            read_text_file(&path).unwrap(),
            "First paragraph.\nTom & Jerry."
        );
    }

    #[test]
    fn test_empty_docx() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("empty.docx");
        write_docx(&path, &[]);

        assert!(matches!(read_text_file(&path), Err(InputError::Empty)));
    }

    #[test]
    fn test_corrupt_docx() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("broken.docx");
        std::fs::write(&path, "not a zip").unwrap();

        assert!(matches!(read_text_file(&path), Err(InputError::Docx(_))));
    }

    #[test]
    fn test_unsupported_extension_message_lists_formats() {
        let err = InputError::UnsupportedFormat {
            extension: ".rtf".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Unsupported file format '.rtf'. Use one of: .txt, .md, .docx"
        );
    }

    #[test]
    fn test_extract_paragraphs_keeps_breaks_and_empty_paragraphs() {
        let xml = "<w:p><w:r><w:t>line one</w:t><w:br/><w:t>line two</w:t></w:r></w:p>\
                   <w:p/>\
                   <w:p w:rsidR=\"00A1\"/>\
                   <w:p><w:pPr><w:tabs><w:tab w:val=\"left\" w:pos=\"720\"/></w:tabs></w:pPr>\
                   <w:r><w:t>after</w:t><w:br w:type=\"page\"/></w:r></w:p><w:sectPr/>";
        assert_eq!(
            extract_paragraphs(xml),
            vec!["line one\nline two", "", "", "after\n"]
        );
    }

    #[test]
    fn test_numeric_character_references_decoded() {
        assert_eq!(unescape_xml("it&#8217;s"), "it\u{2019}s");
        assert_eq!(unescape_xml("&#x2014;dash"), "\u{2014}dash");
        assert_eq!(unescape_xml("&amp;#38; stays"), "&#38; stays");
        assert_eq!(unescape_xml("&#xFFFFFFFF;"), "&#xFFFFFFFF;");
    }

    #[test]
    fn test_read_docx_with_breaks_and_references() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("quotes.docx");
        write_docx(&path, &["Don&#8217;t stop", "", "Last"]);

        assert_eq!(
            read_text_file(&path).unwrap(),
            "Don\u{2019}t stop\n\nLast"
        );
    }

    #[test]
    fn test_extract_paragraphs_joins_runs() {
        let xml = "<w:p><w:r><w:t>Hel</w:t></w:r><w:r><w:t>lo</w:t></w:r></w:p>\
                   <w:p><w:r><w:t>a</w:t><w:tab/><w:t>b</w:t></w:r></w:p><w:sectPr/>";
        assert_eq!(extract_paragraphs(xml), vec!["Hello", "a\tb"]);
    }
}
