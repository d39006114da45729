//! 리포트 생성 유틸리티 -- 공유 헬퍼 함수

use crate::types::LineRange;

/// 리포트 생성 도구 이름
pub const TOOL_NAME: &str = "scanoss";

/// 리포트 생성 도구 버전
pub const TOOL_VERSION: &str = env!("CARGO_PKG_VERSION");

/// 현재 Unix 타임스탬프를 RFC3339 형식으로 반환합니다.
///
/// 시스템 시간을 가져올 수 없는 경우 epoch(1970-01-01T00:00:00Z)를 반환합니다.
pub fn current_timestamp() -> String {
    match std::time::SystemTime::now().duration_since(std::time::UNIX_EPOCH) {
        Ok(duration) => unix_to_rfc3339(duration.as_secs()),
        Err(_) => "1970-01-01T00:00:00Z".to_owned(),
    }
}

/// Unix timestamp를 RFC3339 형식 (YYYY-MM-DDTHH:MM:SSZ)으로 변환합니다.
pub fn unix_to_rfc3339(secs: u64) -> String {
    const SECONDS_PER_DAY: u64 = 86400;

    let mut days = secs / SECONDS_PER_DAY;
    let rem = secs % SECONDS_PER_DAY;
    let (hours, minutes, seconds) = (rem / 3600, (rem % 3600) / 60, rem % 60);

    let mut year = 1970;
    loop {
        let days_in_year = if is_leap_year(year) { 366 } else { 365 };
        if days < days_in_year {
            break;
        }
        days -= days_in_year;
        year += 1;
    }

    let february = if is_leap_year(year) { 29 } else { 28 };
    let days_in_months: [u64; 12] = [31, february, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31];

    let mut month = 1;
    let mut day = days + 1;
    for days_in_month in days_in_months {
        if day <= days_in_month {
            break;
        }
        day -= days_in_month;
        month += 1;
    }

    format!("{year:04}-{month:02}-{day:02}T{hours:02}:{minutes:02}:{seconds:02}Z")
}

fn is_leap_year(year: u64) -> bool {
    (year.is_multiple_of(4) && !year.is_multiple_of(100)) || year.is_multiple_of(400)
}

/// 대상 파일 라인 범위를 `"1-5,9-12"` 형식으로 만듭니다.
pub fn format_ranges(ranges: &[LineRange]) -> String {
    ranges
        .iter()
        .map(|r| format!("{}-{}", r.from, r.to))
        .collect::<Vec<_>>()
        .join(",")
}

/// 스토어 파일 라인 범위를 `"101-105"` 형식으로 만듭니다.
///
/// 범위 길이는 대상 쪽 범위와 같다고 봅니다.
pub fn format_oss_ranges(ranges: &[LineRange]) -> String {
    ranges
        .iter()
        .map(|r| {
            let len = r.to.saturating_sub(r.from);
            format!("{}-{}", r.oss_line, r.oss_line.saturating_add(len))
        })
        .collect::<Vec<_>>()
        .join(",")
}

/// SPDX ID에 허용되는 문자(`[A-Za-z0-9.-]`)만 남깁니다.
pub fn sanitize_spdx_id(s: &str) -> String {
    s.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' {
                c
            } else {
                '-'
            }
        })
        .collect()
}

/// XML 텍스트/속성 값 이스케이프
pub fn xml_escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

/// 값이 비어 있으면 `NOASSERTION`
pub fn or_noassertion(s: &str) -> &str {
    if s.is_empty() { "NOASSERTION" } else { s }
}
