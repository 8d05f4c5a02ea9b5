//! cron调度表达式解析
//!
//! 支持5或6字段cron表达式，末尾可附带IANA时区名称，
//! 例如 `0 6 * * * America/Chicago` 表示每天当地时间06:00

use crate::error::ConfigError;
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use cron::Schedule;
use std::str::FromStr;

/// 解析后的cron调度
#[derive(Debug, Clone)]
pub struct CronSchedule {
    /// 解析后的调度表
    schedule: Schedule,
    /// 表达式时区，未指定时为UTC
    timezone: Tz,
    /// 原始表达式
    expression: String,
}

impl CronSchedule {
    /// 解析cron表达式
    ///
    /// 5字段表达式按分钟精度解析（自动补秒字段），6字段表达式
    /// 按秒精度解析。末尾token若是合法的IANA时区名称则作为
    /// 表达式时区，其余部分再作为cron字段解析。
    ///
    /// # 参数
    /// * `expression` - cron表达式，可附带时区后缀
    ///
    /// # 返回
    /// * `Result<Self, ConfigError>` - 解析结果
    pub fn parse(expression: &str) -> Result<Self, ConfigError> {
        let tokens: Vec<&str> = expression.split_whitespace().collect();

        let (fields, timezone) = match tokens.split_last() {
            // 6或7个token时末尾才可能是时区后缀
            Some((last, rest)) if tokens.len() == 6 || tokens.len() == 7 => {
                match Tz::from_str(last) {
                    Ok(tz) => (rest.to_vec(), tz),
                    Err(_) if looks_like_timezone(last) => {
                        return Err(ConfigError::InvalidTimezone {
                            zone: (*last).to_string(),
                        });
                    }
                    Err(_) => (tokens.clone(), Tz::UTC),
                }
            }
            _ => (tokens.clone(), Tz::UTC),
        };

        // 5字段表达式补上秒字段
        let normalized = if fields.len() == 5 {
            format!("0 {}", fields.join(" "))
        } else {
            fields.join(" ")
        };

        let schedule =
            Schedule::from_str(&normalized).map_err(|e| ConfigError::InvalidSchedule {
                expression: expression.to_string(),
                reason: e.to_string(),
            })?;

        Ok(Self {
            schedule,
            timezone,
            expression: expression.to_string(),
        })
    }

    /// 计算严格晚于给定时刻的下一次触发时间
    ///
    /// # 参数
    /// * `after` - 起点时刻
    ///
    /// # 返回
    /// * `Option<DateTime<Utc>>` - 下一次触发时间，调度已穷尽时返回None
    pub fn next_after(&self, after: DateTime<Utc>) -> Option<DateTime<Utc>> {
        let local = after.with_timezone(&self.timezone);
        self.schedule
            .after(&local)
            .next()
            .map(|dt| dt.with_timezone(&Utc))
    }

    /// 原始表达式
    pub fn expression(&self) -> &str {
        &self.expression
    }

    /// 表达式时区
    pub fn timezone(&self) -> Tz {
        self.timezone
    }
}

/// 判断token是否形如IANA时区名称
///
/// 区域名如 `America/Chicago` 含斜杠且不含数字，与合法的
/// cron步进字段（如 `*/5`、`Mon/2`）可以区分开。
fn looks_like_timezone(token: &str) -> bool {
    token.contains('/')
        && token.chars().any(|c| c.is_ascii_alphabetic())
        && !token.chars().any(|c| c.is_ascii_digit())
}
