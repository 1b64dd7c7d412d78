//! Money formatting helpers
//!
//! CRITICAL: All money values are i64 (whole currency units)

/// Format an amount with thousands separators, e.g. `1,250,000`
///
/// # Example
/// ```
/// use rebuild_funding_core::core::money::format_amount;
///
/// assert_eq!(format_amount(1_250_000), "1,250,000");
/// assert_eq!(format_amount(-950), "-950");
/// ```
pub fn format_amount(amount: i64) -> String {
    let digits = amount.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if amount < 0 {
        out.push('-');
    }
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
