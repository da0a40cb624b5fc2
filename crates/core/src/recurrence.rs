//! 重复规则计算
//!
//! 纯函数，无共享状态，可在任意并发环境下调用。
//! 两个重复维度的组合方式：小时级间隔在开始/结束窗口内推进，
//! 窗口耗尽后由星期回退机制跨天寻找下一次提醒。

use chrono::{DateTime, Datelike, Days, Duration, FixedOffset, TimeZone};

use crate::models::Task;

impl Task {
    /// 计算任务的下一次提醒时间
    ///
    /// `last_run` 为上一次提醒时间，`None` 表示尚未提醒过。
    /// 返回 `None` 表示不再有后续提醒。
    ///
    /// 非重复任务只有 `start_time` 这一次提醒，由调用方直接生成，
    /// 因此这里恒返回 `None`。间隔推进超出结束时间后，如果配置了
    /// 星期列表，则回退到下一个匹配的星期，用开始时间的时分秒在该
    /// 日期上重建时间戳；找到的结果不再与结束时间比对，周循环会
    /// 重新开启当天的小时级子调度。
    pub fn next_run_at(
        &self,
        last_run: Option<DateTime<FixedOffset>>,
    ) -> Option<DateTime<FixedOffset>> {
        if !self.is_recurring {
            return None;
        }

        let base = last_run.unwrap_or(self.start_time);
        let candidate = base + self.interval().unwrap_or_else(Duration::zero);

        if let Some(end) = self.end_time {
            if candidate > end {
                // 间隔已耗尽窗口，尝试星期回退
                if self.repeat_days.is_empty() {
                    return None;
                }
                let next_day = next_matching_weekday(candidate, &self.repeat_days)?;
                let rebuilt = next_day.date_naive().and_time(self.start_time.time());
                return next_day.timezone().from_local_datetime(&rebuilt).single();
            }
        }

        Some(candidate)
    }
}

/// 从给定时间起逐日前进，找到星期值落在 `days` 内的下一天
///
/// 返回的时间严格晚于 `after`。`days` 中出现越界值时立即返回 `None`；
/// 合法非空集合最多 7 次迭代必然命中。逐日步进使用日历日加法。
pub fn next_matching_weekday(
    after: DateTime<FixedOffset>,
    days: &[u8],
) -> Option<DateTime<FixedOffset>> {
    if days.is_empty() || days.iter().any(|&day| day > 6) {
        return None;
    }

    let mut day = after;
    for _ in 0..7 {
        day = day.checked_add_days(Days::new(1))?;
        let weekday = day.weekday().num_days_from_sunday() as u8;
        if days.contains(&weekday) {
            return Some(day);
        }
    }
    None
}
