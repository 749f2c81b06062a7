//! Number formatting for amounts and quantities.

use crate::config::Labels;

/// Formats `value` with `,` between every group of three digits (`#,###`).
pub fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (index, digit) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    grouped
}

/// Formats a currency amount using the grouped digits followed by the configured suffix.
pub fn format_amount(value: u64, labels: &Labels) -> String {
    format!("{}{}", group_thousands(value), labels.currency_suffix)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn groups_digits_by_three() {
        assert_eq!(group_thousands(0), "0");
        assert_eq!(group_thousands(5), "5");
        assert_eq!(group_thousands(999), "999");
        assert_eq!(group_thousands(1_000), "1,000");
        assert_eq!(group_thousands(250_000), "250,000");
        assert_eq!(group_thousands(4_500_000), "4,500,000");
        assert_eq!(group_thousands(u64::MAX), "18,446,744,073,709,551,615");
    }

    #[test]
    fn amount_uses_currency_suffix() {
        assert_eq!(format_amount(900_000, &Labels::default()), "900,000원");
        assert_eq!(format_amount(0, &Labels::default()), "0원");
        assert_eq!(format_amount(1_250, &Labels::english()), "1,250 KRW");
    }
}
