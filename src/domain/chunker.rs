//! 文本分块
//!
//! 把规范化后的文本切成有长度上限的 chunk，不在句子中间切分。

use super::normalizer::normalize;

/// 每个 chunk 的默认最大字符数（TTS 服务单次请求上限）
pub const MAX_CHARS_PER_CHUNK: usize = 4000;

/// 句子分隔符，切分后以 `". "` 还原
const SENTENCE_DELIMITER: char = '.';

/// 分块配置
#[derive(Debug, Clone)]
pub struct ChunkConfig {
    /// 单个 chunk 的最大字符数
    pub max_chars: usize,
}

impl Default for ChunkConfig {
    fn default() -> Self {
        Self {
            max_chars: MAX_CHARS_PER_CHUNK,
        }
    }
}

/// 分块结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    /// 从 1 开始的序号
    pub index: usize,
    pub text: String,
}

impl Chunk {
    pub fn char_count(&self) -> usize {
        self.text.chars().count()
    }
}

/// 对文本进行分块
///
/// 分块策略：
/// 1. 先规范化（URL 展开后的长度才是真正发送的长度）
/// 2. 换行折叠为空格，按 `.` 切分句子，丢弃空句
/// 3. 每个句子补回 `". "`
/// 4. 贪心累积；加入下一句会超限且当前 chunk 非空时，先封闭当前 chunk
///
/// 单个超长句子不会再被切分，而是独占一个超限的 chunk。
/// 空白输入返回空列表。
pub fn split_into_chunks(text: &str, config: &ChunkConfig) -> Vec<Chunk> {
    let normalized = normalize(text);
    let flattened = normalized.replace("\r\n", " ").replace(['\n', '\r'], " ");

    let sentences = flattened
        .split(SENTENCE_DELIMITER)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| format!("{}{} ", s, SENTENCE_DELIMITER));

    let mut texts: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut current_chars = 0;

    for sentence in sentences {
        let sentence_chars = sentence.chars().count();

        if current_chars + sentence_chars > config.max_chars && !current.is_empty() {
            texts.push(std::mem::take(&mut current));
            current_chars = 0;
        }

        current.push_str(&sentence);
        current_chars += sentence_chars;
    }

    if !current.is_empty() {
        texts.push(current);
    }

    texts
        .into_iter()
        .enumerate()
        .map(|(i, text)| Chunk {
            index: i + 1,
            text: text.trim_end().to_string(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn squash(text: &str) -> String {
        text.chars()
            .filter(|c| !c.is_whitespace() && *c != SENTENCE_DELIMITER)
            .collect()
    }

    #[test]
    fn test_single_sentence_without_period() {
        let chunks = split_into_chunks("Hello world", &ChunkConfig::default());

        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].index, 1);
        assert_eq!(chunks[0].text, "Hello world.");
    }

    #[test]
    fn test_existing_trailing_period_not_doubled() {
        let chunks = split_into_chunks("Hello world.", &ChunkConfig::default());
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].text, "Hello world.");
    }

    #[test]
    fn test_empty_and_blank_input() {
        let config = ChunkConfig::default();
        assert!(split_into_chunks("", &config).is_empty());
        assert!(split_into_chunks("   \n\t ", &config).is_empty());
        assert!(split_into_chunks(". . .", &config).is_empty());
    }

    #[test]
    fn test_newlines_collapsed() {
        let chunks = split_into_chunks("First line\nsecond line. Third", &ChunkConfig::default());
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].text, "First line second line. Third.");
    }

    #[test]
    fn test_greedy_accumulation() {
        let config = ChunkConfig { max_chars: 20 };
        // 每句补回 ". " 后长度为 9
        let chunks = split_into_chunks("aaaaaaa. bbbbbbb. ccccccc", &config);

        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].text, "aaaaaaa. bbbbbbb.");
        assert_eq!(chunks[1].text, "ccccccc.");
        assert_eq!(chunks[1].index, 2);
    }

    #[test]
    fn test_oversized_sentence_kept_whole() {
        let config = ChunkConfig { max_chars: 10 };
        let long = "x".repeat(25);
        let text = format!("short. {}. tail", long);
        let chunks = split_into_chunks(&text, &config);

        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0].text, "short.");
        assert_eq!(chunks[1].text, format!("{}.", long));
        assert_eq!(chunks[2].text, "tail.");
    }

    #[test]
    fn test_chunks_respect_limit() {
        let config = ChunkConfig::default();
        let sentence = "This sentence is a reasonably ordinary sentence of text";
        let text = vec![sentence; 400].join(". ");
        let chunks = split_into_chunks(&text, &config);

        assert!(chunks.len() > 1);
        for chunk in &chunks {
            assert!(chunk.char_count() <= MAX_CHARS_PER_CHUNK);
        }
        let indices: Vec<usize> = chunks.iter().map(|c| c.index).collect();
        assert_eq!(indices, (1..=chunks.len()).collect::<Vec<_>>());
    }

    #[test]
    fn test_concatenation_reconstructs_normalized_text() {
        let config = ChunkConfig { max_chars: 60 };
        let text = "Intro line.\nVisit https://github.com/foo/bar for code. \
                    Then email a_b@example.com. Finally, rest";
        let chunks = split_into_chunks(text, &config);
        let joined: String = chunks.iter().map(|c| c.text.as_str()).collect();

        assert!(chunks.len() > 1);
        assert_eq!(squash(&joined), squash(&normalize(text)));
    }

    #[test]
    fn test_limit_counts_characters_not_bytes() {
        let config = ChunkConfig { max_chars: 12 };
        // 每句 5 个汉字 + ". " = 7 个字符
        let chunks = split_into_chunks("一二三四五. 六七八九十", &config);

        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].text, "一二三四五.");
        assert_eq!(chunks[1].text, "六七八九十.");
    }

    #[test]
    fn test_normalization_counts_toward_limit() {
        let config = ChunkConfig { max_chars: 30 };
        // 原文不足 30 字符，但 URL 展开后超过
        let chunks = split_into_chunks("Go http://a.io/b/c/d. Done", &config);

        assert_eq!(chunks.len(), 3);
        assert!(chunks.iter().any(|c| c.text.contains("slash")));
    }
}
