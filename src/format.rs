/// Indian-locale rendering of currency and percent values for the UI.
/// Non-finite inputs render as zero; NaN must never reach a screen.

pub fn format_currency(amount: f64) -> String {
    let amount = if amount.is_finite() { amount } else { 0.0 };
    let rendered = format!("{:.2}", amount.abs());
    let (whole, frac) = rendered.split_once('.').unwrap_or((rendered.as_str(), "00"));
    let sign = if amount <= -0.005 { "-" } else { "" };
    format!("{}\u{20B9}{}.{}", sign, group_indian(whole), frac)
}

pub fn format_percent(percent: f64) -> String {
    let percent = if percent.is_finite() { percent } else { 0.0 };
    let rounded = (percent * 100.0).round() / 100.0;
    if rounded > 0.0 {
        format!("+{rounded:.2}%")
    } else if rounded < 0.0 {
        format!("{rounded:.2}%")
    } else {
        "0.00%".to_string()
    }
}

// Indian digit grouping: last three digits, then pairs. 1234567 -> 12,34,567.
fn group_indian(digits: &str) -> String {
    if digits.len() <= 3 {
        return digits.to_string();
    }
    let (head, tail) = digits.split_at(digits.len() - 3);
    let mut pairs = Vec::new();
    let mut rest = head;
    while rest.len() > 2 {
        let (h, t) = rest.split_at(rest.len() - 2);
        pairs.push(t);
        rest = h;
    }
    pairs.push(rest);
    pairs.reverse();
    format!("{},{}", pairs.join(","), tail)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn currency_uses_indian_grouping() {
        assert_eq!(format_currency(0.0), "₹0.00");
        assert_eq!(format_currency(999.5), "₹999.50");
        assert_eq!(format_currency(1000.0), "₹1,000.00");
        assert_eq!(format_currency(123456.0), "₹1,23,456.00");
        assert_eq!(format_currency(12345678.9), "₹1,23,45,678.90");
    }

    #[test]
    fn currency_handles_negatives_and_non_finite() {
        assert_eq!(format_currency(-1500.25), "-₹1,500.25");
        assert_eq!(format_currency(f64::NAN), "₹0.00");
        assert_eq!(format_currency(f64::INFINITY), "₹0.00");
        // A sub-paisa negative rounds to zero, not "-₹0.00".
        assert_eq!(format_currency(-0.001), "₹0.00");
    }

    #[test]
    fn percent_is_signed_and_rounded() {
        assert_eq!(format_percent(5.432), "+5.43%");
        assert_eq!(format_percent(-1.2), "-1.20%");
        assert_eq!(format_percent(0.0), "0.00%");
        assert_eq!(format_percent(-0.0001), "0.00%");
        assert_eq!(format_percent(f64::NAN), "0.00%");
    }
}
