//! Stamps the build date and time into `version::BUILD_DATE` / `BUILD_TIME`.
//!
//! Values already present in the environment win; otherwise the time comes
//! from `SOURCE_DATE_EPOCH` (reproducible builds) or the system clock, in UTC.

use std::env;
use std::time::{SystemTime, UNIX_EPOCH};

const MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-env-changed=SOURCE_DATE_EPOCH");
    println!("cargo:rerun-if-env-changed=CASMI_BUILD_DATE");
    println!("cargo:rerun-if-env-changed=CASMI_BUILD_TIME");

    let seconds = env::var("SOURCE_DATE_EPOCH")
        .ok()
        .and_then(|value| value.trim().parse::<u64>().ok())
        .unwrap_or_else(|| {
            SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|elapsed| elapsed.as_secs())
                .unwrap_or(0)
        });
    let (date, time) = format_timestamp(seconds);

    let date = env::var("CASMI_BUILD_DATE").unwrap_or(date);
    let time = env::var("CASMI_BUILD_TIME").unwrap_or(time);
    println!("cargo:rustc-env=CASMI_BUILD_DATE={date}");
    println!("cargo:rustc-env=CASMI_BUILD_TIME={time}");
}

/// `("Mmm dd yyyy", "hh:mm:ss")` for a UNIX timestamp
fn format_timestamp(seconds: u64) -> (String, String) {
    let days = (seconds / 86_400) as i64;
    let rest = seconds % 86_400;
    let (year, month, day) = civil_from_days(days);
    (
        format!("{} {:02} {}", MONTHS[(month - 1) as usize], day, year),
        format!("{:02}:{:02}:{:02}", rest / 3600, rest % 3600 / 60, rest % 60),
    )
}

/// Proleptic Gregorian date for days since 1970-01-01 (H. Hinnant's algorithm)
fn civil_from_days(days: i64) -> (i64, u32, u32) {
    let z = days + 719_468;
    let era = z.div_euclid(146_097);
    let doe = z.rem_euclid(146_097);
    let yoe = (doe - doe / 1460 + doe / 36_524 - doe / 146_096) / 365;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let day = (doy - (153 * mp + 2) / 5 + 1) as u32;
    let month = (if mp < 10 { mp + 3 } else { mp - 9 }) as u32;
    let year = yoe + era * 400 + i64::from(month <= 2);
    (year, month, day)
}
