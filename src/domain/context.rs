//! 生成上下文的纯函数部分
//!
//! 前文摘要序列、向量检索查询文本

/// 前文摘要
///
/// 只保留章节号严格小于 `target` 的章节，按章节号升序，丢弃空摘要。
pub fn previous_summaries<'a, I>(chapters: I, target: u32) -> Vec<String>
where
    I: IntoIterator<Item = (u32, Option<&'a str>)>,
{
    let mut earlier: Vec<(u32, &str)> = chapters
        .into_iter()
        .filter(|(number, _)| *number < target)
        .filter_map(|(number, summary)| summary.map(|s| (number, s)))
        .filter(|(_, summary)| !summary.is_empty())
        .collect();
    earlier.sort_by_key(|(number, _)| *number);
    earlier.into_iter().map(|(_, s)| s.to_string()).collect()
}

/// 检索查询文本，每个存在的字段一行
///
/// 全部缺省时返回 `None`，调用方据此跳过检索。
pub fn build_retrieval_query(
    title: Option<&str>,
    summary: Option<&str>,
    setting: Option<&str>,
) -> Option<String> {
    let lines: Vec<String> = [
        ("章节标题：", title),
        ("章节摘要：", summary),
        ("世界观设定：", setting),
    ]
    .into_iter()
    .filter_map(|(label, value)| {
        value
            .filter(|v| !v.trim().is_empty())
            .map(|v| format!("{}{}", label, v))
    })
    .collect();

    if lines.is_empty() {
        None
    } else {
        Some(lines.join("\n"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_previous_summaries_order_and_filter() {
        let chapters = vec![(3, Some("C")), (1, Some("A")), (2, Some(""))];
        assert_eq!(previous_summaries(chapters, 4), vec!["A", "C"]);
    }

    #[test]
    fn test_previous_summaries_excludes_target_and_later() {
        let chapters = vec![(1, Some("A")), (2, None), (3, Some("C")), (4, Some("D"))];
        assert_eq!(previous_summaries(chapters.clone(), 3), vec!["A"]);
        assert!(previous_summaries(chapters, 1).is_empty());
    }

    #[test]
    fn test_retrieval_query_skips_missing_fields() {
        let query = build_retrieval_query(Some("夜雨"), None, Some("江湖")).unwrap();
        assert_eq!(query, "章节标题：夜雨\n世界观设定：江湖");
    }

    #[test]
    fn test_retrieval_query_empty() {
        assert!(build_retrieval_query(None, Some("  "), None).is_none());
    }
}
