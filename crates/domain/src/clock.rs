//! # Clock（時刻プロバイダ）
//!
//! 変更操作のタイムスタンプ付与やシードデータ生成での `Utc::now()` 直接呼び出しを置き換え、
//! テストで固定時刻を注入可能にするための抽象化。

use chrono::{DateTime, NaiveDate, Utc};

/// 現在時刻を提供するトレイト
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;

    /// 現在日付（UTC）
    fn today(&self) -> NaiveDate {
        self.now().date_naive()
    }
}

/// 実際のシステム時刻を返す実装
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// 固定時刻を返すテスト用実装
///
/// シードデータソースに渡すと、生成されるタイムスタンプも決定的になる。
pub struct FixedClock {
    now: DateTime<Utc>,
}

impl FixedClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self { now }
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.now
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_clock_は現在時刻を返す() {
        let before = Utc::now();
        let result = SystemClock.now();
        let after = Utc::now();

        assert!(result >= before);
        assert!(result <= after);
    }

    #[test]
    fn test_fixed_clock_のtodayは固定時刻の日付を返す() {
        let fixed_time = DateTime::from_timestamp(1_700_000_000, 0).unwrap();
        let clock = FixedClock::new(fixed_time);

        assert_eq!(clock.today(), NaiveDate::from_ymd_opt(2023, 11, 14).unwrap());
        assert_eq!(clock.now(), clock.now());
    }
}
