//! Priority normalization for free-form model output.
//!
//! The model is allowed to express a task priority however it likes
//! ("priority 1", "p2", "3"). [`parse`] extracts a validated 1-4 value
//! or drops the input silently.

/// Extract a task priority (1-4) from a free-form expression.
///
/// Takes the first run of decimal digits found anywhere in the input.
/// Values outside [1,4], inputs without digits, and `None` all yield
/// `None`; "no priority" means "leave unset", never an error.
pub fn parse(raw: Option<&str>) -> Option<u8> {
    let raw = raw?;

    let digits: String = raw
        .chars()
        .skip_while(|c| !c.is_ascii_digit())
        .take_while(|c| c.is_ascii_digit())
        .collect();

    let value: u32 = digits.parse().ok()?;
    if (1..=4).contains(&value) {
        Some(value as u8)
    } else {
        None
    }
}
