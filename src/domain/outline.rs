//! 章节大纲解析
//!
//! 从模型输出的大纲文本中提取 `## 第X章 标题` 形式的章节标题行

use serde::Serialize;

use super::numerals::{chinese_numeral_to_u32, is_chinese_numeral};

/// 解析出的章节条目（不单独持久化）
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutlineEntry {
    pub chapter_number: u32,
    /// 可能为空
    pub title: String,
}

/// 逐行解析大纲，按出现顺序返回章节条目
///
/// 章节号为 0 的条目直接跳过。
pub fn parse_outline(text: &str) -> Vec<OutlineEntry> {
    text.lines()
        .filter_map(parse_heading)
        .filter(|entry| entry.chapter_number > 0)
        .collect()
}

/// 匹配单行标题：`##` + 可选空白 + `第` + 编号 + `章` + 可选空白 + 标题
fn parse_heading(line: &str) -> Option<OutlineEntry> {
    let rest = line.strip_prefix("##")?;
    let rest = rest.trim_start().strip_prefix('第')?;

    let token_len: usize = if rest.starts_with(|c: char| c.is_ascii_digit()) {
        rest.chars()
            .take_while(|c| c.is_ascii_digit())
            .map(char::len_utf8)
            .sum()
    } else {
        rest.chars()
            .take_while(|c| is_chinese_numeral(*c))
            .map(char::len_utf8)
            .sum()
    };
    if token_len == 0 {
        return None;
    }

    let (token, rest) = rest.split_at(token_len);
    let rest = rest.strip_prefix('章')?;

    let chapter_number = if token.starts_with(|c: char| c.is_ascii_digit()) {
        // 溢出的数字串视为无效标题行
        token.parse::<u32>().ok()?
    } else {
        chinese_numeral_to_u32(token)
    };

    Some(OutlineEntry {
        chapter_number,
        title: clean_title(rest),
    })
}

/// 去掉首尾各至多一个括号（半角 `[]` 或全角 `【】`，不要求成对），再去空白
fn clean_title(raw: &str) -> String {
    let trimmed = raw.trim();
    let trimmed = trimmed
        .strip_prefix(|c: char| c == '[' || c == '【')
        .unwrap_or(trimmed);
    let trimmed = trimmed
        .strip_suffix(|c: char| c == ']' || c == '】')
        .unwrap_or(trimmed);
    trimmed.trim().to_string()
}
