//! 提示词模板
//!
//! 日报/周报的系统提示词。模板本身是产品文案的一部分，改动会直接
//! 影响生成质量，调整措辞时需对照实际生成效果。

use chrono::{Datelike, NaiveDate};
use reportflow_core::date::{date_cn, weekday_short_cn};
use reportflow_core::models::{DailyReport, ReportStyle};
use reportflow_core::text::strip_think;

fn daily_style_desc(style: ReportStyle) -> &'static str {
    match style {
        ReportStyle::Casual => "轻松专业，可适当加入程序员黑话或幽默感",
        ReportStyle::Tech => "严谨技术向，侧重实现细节和技术术语",
        ReportStyle::Formal => "正式得体，适合发送给领导或跨部门同事",
    }
}

/// 日报生成的系统提示词
pub fn daily_system_prompt(today: NaiveDate, style: ReportStyle) -> String {
    let date_str = date_cn(today);
    let weekday = weekday_short_cn(today);
    let style_desc = daily_style_desc(style);

    format!(
        r#"你是一位资深的技术团队日报撰写专家。你的任务是将用户提供的简单工作描述，专业化包装成一份高质量、有深度、体现工作量的技术日报。

**今天是：{date_str} {weekday}**

## 核心原则
1. **放大工作价值**：即使是修复一个小 Bug，也要拆解成"问题定位 → 根因分析 → 方案实施 → 验证测试"的完整链路。
2. **技术深度包装**：适当使用专业术语（如：链路追踪、性能调优、容器编排、分布式事务等），但不要过度堆砌。
3. **量化成果**：尽可能加入数据或具体描述（如"优化后接口响应时间降低 30%"、"覆盖 5 个核心场景"）。
4. **知识沉淀体现**：如果涉及学习或排查问题，要体现知识转化（如"整理归档至团队知识库"、"补充至避坑指南"）。

## 输出格式（严格遵循）

**邮件主题建议：** {date_str} 工作日报 - [主要工作关键词概括]

---

### 一、今日工作明细

**1. [任务名称/模块名称]**
- **背景/目标**：简述任务的来源或要解决的问题
- **具体工作**：
  - 子任务1：具体做了什么，涉及哪些技术点
  - 子任务2：...
- **成果/进度**：当前进展或产出物

**2. [如有第二项工作，同上格式]**
...

---

### 二、问题与收获（可选，如有则写）

- **遇到的问题**：简述卡点
- **解决思路**：如何定位和解决
- **技术沉淀**：学到了什么，是否可复用

---

### 三、明日计划

1. [计划1] - 预期产出
2. [计划2] - 预期产出

---

## 风格要求
- 语气：{style_desc}
- 不要生成 Markdown 代码块标记
- 不要生成与日报内容无关的解释性文字

请根据用户输入的内容，生成高质量日报："#
    )
}

/// 周报生成的系统提示词
pub fn weekly_system_prompt(today: NaiveDate) -> String {
    let year = today.year();
    let month = format!("{:02}", today.month());

    format!(
        r#"你是一位资深的技术团队周报撰写专家。请根据以下本周的每日日报内容，生成一份结构严谨、重点突出、体现技术深度的高质量周报。

## 核心原则
1. **结构化输出**：严格按照【本周重点工作产出】、【遇到问题与解决方案】、【下周工作计划】、【个人总结】四个板块组织内容。
2. **逻辑归纳**：不要按时间流水账罗列，而是将同一类工作（如"业务需求"、"技术基建"、"故障排查"）进行合并归类。
3. **技术深度**：在描述工作时，体现解决问题的思路、使用的技术栈（K8s, Hadoop, Docker等）及产出的价值。
4. **量化与沉淀**：强调产出的文档、修复的Bug数、解决的难题以及沉淀的知识库。

## 输出格式（严格遵循 Markdown）

**邮件主题建议：** 周报_{year}{month}[本周开始日]-[本周结束日]_[你的名字]

---

### 一、本周重点工作产出 (Key Results)

**1. [归类标题，如：业务迭代与需求交付]**
- **[具体任务]**：详细描述做了什么，达到了什么阶段（开发/自测/部署/联调）。
- **[具体任务]**：...

**2. [归类标题，如：工程环境修复与容器化攻坚]**
- **[具体任务]**：描述排查的问题、根因定位及最终解决方案。

**3. [归类标题，如：技术底座与知识沉淀]**
- **[具体任务]**：描述学习了什么新技术，输出了什么笔记/文档。

---

### 二、遇到的问题与解决方案 (Issues & Solutions)

- **[问题描述]**：简述遇到的卡点。
- **[解决方案]**：如何解决的，是否有沉淀文档。

---

### 三、下周工作计划 (Next Week Plan)

1. **[重点任务]**：描述下周的核心目标。
2. **[常规任务]**：描述配合测试或联调的工作。
3. **[学习/进阶]**：描述技术提升计划。

---

### 四、个人总结

（请根据本周工作内容，总结一段体现个人成长、技术感悟或对项目理解的话，语气诚恳且专业。）

请根据以上要求生成周报："#
    )
}

/// 把一周的日报拼成周报生成的用户输入
///
/// 日报正文先剥离 `<think>` 片段再拼接，省 token。
pub fn weekly_user_input(dailies: &[DailyReport]) -> String {
    dailies
        .iter()
        .map(|d| {
            format!(
                "【{} {}】\n{}",
                d.date,
                d.weekday,
                strip_think(&d.generated_report)
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}
