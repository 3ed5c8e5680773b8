//! 日期工具包：今天的日期、本周起止、某日期是星期几
//!
//! 「今天」由 Today 提供，默认本地时区；测试可固定日期。

use async_trait::async_trait;
use chrono::{DateTime, Datelike, Duration, Local, NaiveDate, NaiveDateTime};
use serde_json::Value;

use crate::tools::{Tool, ToolRegistry};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Today {
    #[default]
    Local,
    Fixed(NaiveDate),
}

impl Today {
    pub fn date(self) -> NaiveDate {
        match self {
            Today::Local => Local::now().date_naive(),
            Today::Fixed(date) => date,
        }
    }
}

/// 注册全部日期工具
pub fn dateutils_toolpack(today: Today) -> ToolRegistry {
    let mut registry = ToolRegistry::new();
    registry
        .register(TodayDateTool { today })
        .register(CurrentWeekTool { today })
        .register(WeekdayFromDateTool);
    registry
}

pub struct TodayDateTool {
    today: Today,
}

#[async_trait]
impl Tool for TodayDateTool {
    fn name(&self) -> &str {
        "get_today_date"
    }

    fn description(&self) -> &str {
        "Returns today's date in MM/DD/YYYY format. No arguments."
    }

    async fn execute(&self, _args: Value) -> Result<String, String> {
        Ok(self.today.date().format("%m/%d/%Y").to_string())
    }
}

pub struct CurrentWeekTool {
    today: Today,
}

#[async_trait]
impl Tool for CurrentWeekTool {
    fn name(&self) -> &str {
        "get_current_week"
    }

    fn description(&self) -> &str {
        "Returns the first (Monday) and last (Sunday) day of the current week. No arguments."
    }

    async fn execute(&self, _args: Value) -> Result<String, String> {
        let today = self.today.date();
        let start = today - Duration::days(i64::from(today.weekday().num_days_from_monday()));
        let end = start + Duration::days(6);
        Ok(format!("This week starts at {start} and ends on {end}"))
    }
}

pub struct WeekdayFromDateTool;

#[async_trait]
impl Tool for WeekdayFromDateTool {
    fn name(&self) -> &str {
        "get_weekday_from_date"
    }

    fn description(&self) -> &str {
        "Returns the weekday name for a date, e.g. {\"date\": \"2024-03-15\"} -> Friday."
    }

    fn parameters_schema(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "date": { "type": "string", "description": "Date to establish a weekday for" }
            },
            "required": ["date"]
        })
    }

    async fn execute(&self, args: Value) -> Result<String, String> {
        let input = args
            .get("date")
            .and_then(|v| v.as_str())
            .ok_or_else(|| "missing 'date' argument".to_string())?;

        // 日期无法解析时把说明作为工具结果返回给 LLM，而不是失败
        Ok(match parse_date(input) {
            Some(date) => date.format("%A").to_string(),
            None => format!("The date is not of correct format - {input}"),
        })
    }
}

const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%d.%m.%Y",
    "%B %d %Y",
    "%b %d %Y",
    "%d %B %Y",
    "%d %b %Y",
    "%A %B %d %Y",
];

fn parse_exact(candidate: &str) -> Option<NaiveDate> {
    let candidate = candidate.replace(',', "");
    if let Ok(dt) = DateTime::parse_from_rfc3339(&candidate) {
        return Some(dt.date_naive());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(&candidate, "%Y-%m-%dT%H:%M:%S") {
        return Some(dt.date());
    }
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(&candidate, fmt).ok())
}

/// 宽松解析：先试整串，再在句子中按 4/3/2/1 个词的窗口查找日期
pub fn parse_date(input: &str) -> Option<NaiveDate> {
    let input = input.trim();
    if let Some(date) = parse_exact(input) {
        return Some(date);
    }

    let words: Vec<&str> = input
        .split_whitespace()
        .map(|w| w.trim_matches(|c: char| !c.is_alphanumeric() && c != '-' && c != '/' && c != '.'))
        .map(|w| w.trim_end_matches('.'))
        .filter(|w| !w.is_empty())
        .collect();

    (1..=4.min(words.len())).rev().find_map(|size| {
        words
            .windows(size)
            .find_map(|window| parse_exact(&window.join(" ")))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixed() -> Today {
        // 2024-03-13 是周三
        Today::Fixed(NaiveDate::from_ymd_opt(2024, 3, 13).unwrap())
    }

    #[tokio::test]
    async fn test_today_date_format() {
        let tool = TodayDateTool { today: fixed() };
        assert_eq!(tool.execute(Value::Null).await.unwrap(), "03/13/2024");
    }

    #[tokio::test]
    async fn test_current_week_runs_monday_to_sunday() {
        let tool = CurrentWeekTool { today: fixed() };
        assert_eq!(
            tool.execute(Value::Null).await.unwrap(),
            "This week starts at 2024-03-11 and ends on 2024-03-17"
        );

        let monday = CurrentWeekTool {
            today: Today::Fixed(NaiveDate::from_ymd_opt(2024, 3, 11).unwrap()),
        };
        assert_eq!(
            monday.execute(Value::Null).await.unwrap(),
            "This week starts at 2024-03-11 and ends on 2024-03-17"
        );
    }

    #[tokio::test]
    async fn test_weekday_from_date() {
        let tool = WeekdayFromDateTool;
        for input in [
            "2024-03-15",
            "03/15/2024",
            "15.03.2024",
            "March 15, 2024",
            "15 March 2024",
            "2024-03-15T10:30:00",
            "What day was 2024-03-15?",
        ] {
            assert_eq!(
                tool.execute(serde_json::json!({ "date": input })).await.unwrap(),
                "Friday",
                "input: {input}"
            );
        }
    }

    #[tokio::test]
    async fn test_weekday_reports_unparseable_date() {
        let tool = WeekdayFromDateTool;
        let out = tool
            .execute(serde_json::json!({ "date": "someday soon" }))
            .await
            .unwrap();
        assert!(out.starts_with("The date is not of correct format"));
        assert!(tool.execute(serde_json::json!({})).await.is_err());
    }

    #[test]
    fn test_toolpack_registers_all_tools() {
        let registry = dateutils_toolpack(Today::Local);
        assert_eq!(
            registry.tool_names(),
            vec!["get_current_week", "get_today_date", "get_weekday_from_date"]
        );
    }
}
