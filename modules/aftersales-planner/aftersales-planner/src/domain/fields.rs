//! Field names and shared input rules.

pub struct EmployeeFields;

impl EmployeeFields {
    pub const NAME: &'static str = "name";
    pub const CATEGORY: &'static str = "category";
    pub const PERFORMANCE: &'static str = "performance";

    pub const NAME_MAX_CHARS: usize = 120;
    pub const PERFORMANCE_MAX: i32 = 300;
}

pub struct DayEntryFields;

impl DayEntryFields {
    pub const WORK_DAY: &'static str = "work_day";
    pub const CATEGORY: &'static str = "category";
    pub const TITLE: &'static str = "title";
    pub const WORK_TEXT: &'static str = "work_text";
    pub const DROP_OFF: &'static str = "drop_off";
    pub const PICK_UP: &'static str = "pick_up";
    pub const AW: &'static str = "aw";
    pub const FROM: &'static str = "from";
    pub const TO: &'static str = "to";

    pub const TITLE_MAX_CHARS: usize = 200;
    pub const WORK_TEXT_MAX_CHARS: usize = 2000;
    pub const AW_MAX: i32 = 10_000;
}

pub struct SettingsFields;

impl SettingsFields {
    pub const TIMEZONE: &'static str = "timezone";
    pub const OPENING: &'static str = "opening";

    pub const TIMEZONE_MAX_CHARS: usize = 64;
}

pub struct AccountFields;

impl AccountFields {
    pub const EMAIL: &'static str = "email";
    pub const PASSWORD: &'static str = "password";

    pub const EMAIL_MAX_CHARS: usize = 254;
    pub const PASSWORD_MIN_CHARS: usize = 8;
    pub const PASSWORD_MAX_CHARS: usize = 200;
}

/// Minutes since midnight for a strict `HH:MM` string.
#[must_use]
pub fn parse_hhmm(value: &str) -> Option<u16> {
    let bytes = value.as_bytes();
    if bytes.len() != 5 || bytes[2] != b':' {
        return None;
    }
    let digit = |b: u8| b.is_ascii_digit().then(|| u16::from(b - b'0'));
    let hours = digit(bytes[0])? * 10 + digit(bytes[1])?;
    let minutes = digit(bytes[3])? * 10 + digit(bytes[4])?;
    (hours < 24 && minutes < 60).then_some(hours * 60 + minutes)
}

/// Trim and turn blank strings into `None`.
#[must_use]
pub fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
}

#[must_use]
pub fn char_len(value: &str) -> usize {
    value.chars().count()
}
