//! 文本规范化
//!
//! 把 URL、域名和容易被读错的符号改写为适合朗读的短语。
//! 一次 URL 正则扫描 + 一次固定替换表扫描，耗时与文本长度成线性关系。

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use std::borrow::Cow;

/// URL 匹配到第一个空白或括号为止，即使前面没有空白边界
static URL_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)https?://[^\s\[\]()<>]+").expect("valid URL pattern"));

/// 替换表：按从长到短、从具体到一般排列
///
/// 正则交替是 leftmost-first，所以同一位置上排在前面的模式优先。
const REPLACEMENTS: &[(&str, &str)] = &[
    ("https://", ""),
    ("http://", ""),
    ("www.", "www dot "),
    (".com", " dot com"),
    (".org", " dot org"),
    (".net", " dot net"),
    (".edu", " dot edu"),
    (".gov", " dot gov"),
    (".dev", " dot dev"),
    (".io", " dot io"),
    ("/", " slash "),
    ("@", " at "),
    ("_", " underscore "),
];

static SYMBOL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    let alternation = REPLACEMENTS
        .iter()
        .map(|(pattern, _)| regex::escape(pattern))
        .collect::<Vec<_>>()
        .join("|");
    Regex::new(&alternation).expect("valid replacement table")
});

static REPEATED_BLANKS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[ \t]{2,}").expect("valid blank pattern"));

/// 句末标点不属于 URL
const TRAILING_PUNCTUATION: &[char] = &['.', ',', ';', ':', '!', '?', '\'', '"'];

/// 规范化文本
///
/// URL 被改写为整段短语，短语内部不会再被替换表处理，
/// 因此 `github.com` 这样的域名在短语里保持原样。
pub fn normalize(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + text.len() / 4);
    let mut last = 0;

    for m in URL_PATTERN.find_iter(text) {
        let url = m.as_str().trim_end_matches(TRAILING_PUNCTUATION);
        let url_end = m.start() + url.len();

        out.push_str(&replace_symbols(&text[last..m.start()]));
        match describe_url(url) {
            Some(phrase) => out.push_str(&phrase),
            None => out.push_str(&replace_symbols(url)),
        }
        last = url_end;
    }
    out.push_str(&replace_symbols(&text[last..]));

    REPEATED_BLANKS.replace_all(&out, " ").into_owned()
}

fn replace_symbols(text: &str) -> Cow<'_, str> {
    SYMBOL_PATTERN.replace_all(text, |caps: &Captures| {
        let matched = &caps[0];
        REPLACEMENTS
            .iter()
            .find(|(pattern, _)| *pattern == matched)
            .map(|(_, replacement)| *replacement)
            .unwrap_or(matched)
            .to_string()
    })
}

/// 把单个 URL 描述为一句话
///
/// 已知平台按域名子串匹配；其余使用 `website <domain> at path <path>`。
/// 查询串和锚点不朗读。
fn describe_url(url: &str) -> Option<String> {
    let (_, rest) = url.split_once("://")?;
    let rest = match rest.get(..4) {
        Some(prefix) if prefix.eq_ignore_ascii_case("www.") => &rest[4..],
        _ => rest,
    };
    let rest = rest.split(['?', '#']).next().unwrap_or_default();

    let (host, path) = match rest.find('/') {
        Some(i) => (&rest[..i], &rest[i..]),
        None => (rest, ""),
    };
    if host.is_empty() {
        return None;
    }

    let domain = host.to_lowercase();
    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    let spoken_path = segments.join(" slash ");

    let phrase = if domain.contains("github.com") {
        if segments.is_empty() {
            format!("GitHub at {}", domain)
        } else {
            format!("GitHub at {} slash {}", domain, spoken_path)
        }
    } else if domain.contains("youtube.com") || domain.contains("youtu.be") {
        if segments.is_empty() {
            "YouTube".to_string()
        } else {
            "a YouTube video".to_string()
        }
    } else if domain.contains("linkedin.com") {
        match segments.first() {
            Some(&"in") => "a LinkedIn profile".to_string(),
            Some(&"company") => "a LinkedIn company page".to_string(),
            Some(&"posts") | Some(&"feed") => "a LinkedIn post".to_string(),
            _ => "LinkedIn".to_string(),
        }
    } else if domain.contains("twitter.com") || domain == "x.com" || domain.ends_with(".x.com") {
        match segments.as_slice() {
            [user, "status", ..] => format!("a post on X by {}", user),
            [user, ..] => format!("the X profile {}", user),
            [] => "X".to_string(),
        }
    } else if segments.is_empty() {
        format!("website {}", domain)
    } else {
        format!("website {} at path {}", domain, spoken_path)
    };

    Some(phrase)
}
