//! 生成提示词
//!
//! 小说结构、章节大纲、章节内容、章节摘要四类模型调用的提示词模板

/// 小说基本信息
#[derive(Debug, Clone, Copy)]
pub struct NovelBrief<'a> {
    pub title: &'a str,
    pub genre: &'a str,
    pub setting: &'a str,
}

/// 章节内容提示词的输入
#[derive(Debug, Clone)]
pub struct ChapterPromptInput<'a> {
    pub brief: NovelBrief<'a>,
    pub structure: &'a str,
    pub chapter_title: &'a str,
    pub chapter_summary: &'a str,
    /// 前文摘要（按章节顺序）
    pub previous_summaries: &'a [String],
    /// 检索到的相关片段（按相似度排序）
    pub snippets: &'a [String],
    pub word_count: Option<u32>,
}

pub fn structure_prompt(brief: NovelBrief<'_>, planned_chapters: Option<u32>) -> String {
    let planning = match planned_chapters {
        Some(n) if n > 0 => format!("规划{}章", n),
        _ => "至少规划15-20章".to_string(),
    };

    format!(
        "你是一位专业的小说创作顾问。请根据以下信息生成一部小说的详细架构：

【基本信息】
标题：{title}
题材：{genre}
世界观设定：{setting}

【要求】
请生成一份完整的小说架构，包含以下部分：

1. 【核心种子】
    - 故事的核心冲突或主题
    - 故事的独特卖点

2. 【主要角色】
    - 主角：姓名、性格特点、背景、目标与动机
    - 重要配角：姓名、性格特点、与主角的关系
    - 反派（如有）：姓名、性格特点、动机与目标

3. 【世界观设定】
    - 时代背景
    - 地理环境
    - 社会结构
    - 特殊规则或设定（如魔法、科技等）

4. 【故事结构】
    - 开端：故事如何开始，主角的初始状态
    - 发展：主要冲突的展开，角色关系的发展
    - 高潮：故事的关键转折点或最大冲突
    - 结局：故事的收尾方式

5. 【主要情节线】
    - 主线：故事的核心情节发展
    - 支线：次要情节线（至少2-3条）
    - 伏笔：需要埋下的重要线索

6. 【章节规划】
    - {planning}
    - 每章包含：章节序号、章节标题、章节核心事件、章节作用（推进主线/支线/人物塑造等）

【输出格式】
请使用清晰的分段和标题，确保结构清晰、内容详实，便于后续章节创作。
",
        title = brief.title,
        genre = brief.genre,
        setting = brief.setting,
        planning = planning,
    )
}

pub fn outline_prompt(brief: NovelBrief<'_>, structure: &str) -> String {
    let structure = if structure.trim().is_empty() {
        "无"
    } else {
        structure
    };

    format!(
        "你是一位专业的小说创作顾问。请根据以下信息生成详细的章节大纲：

【基本信息】
小说标题：{title}
题材：{genre}
世界观设定：{setting}

【小说架构】
{structure}

【要求】
请生成一份完整的章节大纲，要求：

1. 根据小说架构中的章节规划，为每一章生成详细大纲
2. 每章大纲应包含：
   - 章节序号和标题
   - 章节核心事件（主要发生什么）
   - 出场角色
   - 章节目标（推进主线/支线/人物塑造/世界观展示等）
   - 章节结尾的悬念或转折点
   - 与前后章的衔接点

3. 确保章节之间的逻辑连贯性
4. 合理分配情节节奏（紧张/舒缓交替）
5. 确保重要伏笔和线索的埋设时机

【输出格式】
请按照以下格式输出：

## 第X章 [章节标题]
- **核心事件**：[描述]
- **出场角色**：[角色列表]
- **章节目标**：[说明]
- **章节结尾**：[悬念或转折]
- **衔接点**：[与前后章的联系]

【注意事项】
- 章节数量应与架构中的规划一致
- 每章大纲应详细但不过于冗长
- 确保整体故事节奏的合理性
",
        title = brief.title,
        genre = brief.genre,
        setting = brief.setting,
        structure = structure,
    )
}

/// 字数要求：目标字数的 80%..120%，未设置时使用 3000-5000 字
pub fn word_count_requirement(word_count: Option<u32>) -> String {
    match word_count {
        Some(target) if target > 0 => {
            let min = (f64::from(target) * 0.8) as u32;
            let max = (f64::from(target) * 1.2) as u32;
            format!("字数控制在{}-{}字（目标字数：{}字）", min, max, target)
        }
        _ => "字数控制在3000-5000字".to_string(),
    }
}

pub fn chapter_prompt(input: &ChapterPromptInput<'_>) -> String {
    let mut context = String::new();
    if !input.previous_summaries.is_empty() {
        context.push_str("前文摘要：\n");
        for (i, summary) in input.previous_summaries.iter().enumerate() {
            context.push_str(&format!("第{}章：{}\n", i + 1, summary));
        }
    }
    if !input.snippets.is_empty() {
        if !context.is_empty() {
            context.push('\n');
        }
        context.push_str("相关片段参考：\n");
        for snippet in input.snippets {
            context.push_str(&format!("- {}\n", snippet));
        }
    }

    format!(
        "请根据以下信息生成小说章节内容：

小说标题：{title}
题材：{genre}
世界观设定：{setting}
小说结构：{structure}

{context}
章节标题：{chapter_title}
章节摘要：{chapter_summary}

请生成完整的章节内容，要求：
1. 内容符合世界观设定
2. 情节连贯，与前文衔接自然
3. 文笔流畅，符合{genre}题材的风格
4. {word_count}
5. 章节结尾要有适当的悬念或转折
",
        title = input.brief.title,
        genre = input.brief.genre,
        setting = input.brief.setting,
        structure = input.structure,
        context = context,
        chapter_title = input.chapter_title,
        chapter_summary = input.chapter_summary,
        word_count = word_count_requirement(input.word_count),
    )
}

pub fn abstract_prompt(content: &str) -> String {
    format!(
        "请为以下章节内容生成一个简洁的摘要（不超过200字）：\n\n{}\n",
        content
    )
}
