//! 中文数字转换
//!
//! 仅覆盖章节编号常见的写法：个位数字 + 十/百/千/万 位值字符

/// 单个中文数字字符对应的数值，未知字符视为 0
#[inline]
fn char_value(ch: char) -> u32 {
    match ch {
        '一' => 1,
        '二' => 2,
        '三' => 3,
        '四' => 4,
        '五' => 5,
        '六' => 6,
        '七' => 7,
        '八' => 8,
        '九' => 9,
        '十' => 10,
        '百' => 100,
        '千' => 1_000,
        '万' => 10_000,
        _ => 0,
    }
}

/// 判断字符是否属于章节编号可用的中文数字
#[inline]
pub fn is_chinese_numeral(ch: char) -> bool {
    matches!(
        ch,
        '一' | '二' | '三' | '四' | '五' | '六' | '七' | '八' | '九' | '十' | '百' | '千' | '万'
    )
}

/// 中文数字转整数
///
/// 从左到右扫描：
/// - 位值字符（十/百/千/万）：`temp` 为 0 时按 1 处理（"十二" 省略了前导的"一"），
///   `result += temp * 位值`，然后清零 `temp`
/// - 个位数字：`temp = temp * 10 + digit`
///
/// 扫描结束后把剩余的 `temp` 累加到结果。
pub fn chinese_numeral_to_u32(text: &str) -> u32 {
    let mut result: u32 = 0;
    let mut temp: u32 = 0;

    for ch in text.chars() {
        let value = char_value(ch);
        if value >= 10 {
            if temp == 0 {
                temp = 1;
            }
            result = result.saturating_add(temp.saturating_mul(value));
            temp = 0;
        } else {
            temp = temp.saturating_mul(10).saturating_add(value);
        }
    }

    result.saturating_add(temp)
}
