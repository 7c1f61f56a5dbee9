use std::borrow::Cow;

pub const DEFAULT_CURRENCY: &str = "USD";

/// Symbol printed before an amount. Unknown codes are printed as `"CODE "`.
#[must_use]
pub fn currency_symbol(code: &str) -> Cow<'static, str> {
    match code.trim().to_uppercase().as_str() {
        "USD" => Cow::Borrowed("$"),
        "KRW" => Cow::Borrowed("\u{20a9}"),
        "JPY" => Cow::Borrowed("\u{a5}"),
        "EUR" => Cow::Borrowed("\u{20ac}"),
        "GBP" => Cow::Borrowed("\u{a3}"),
        other => Cow::Owned(format!("{other} ")),
    }
}

/// Formats an amount as `-$1,234.56`: sign, symbol, thousands separators, two decimals.
#[must_use]
pub fn format_money(amount: f64, currency: &str) -> String {
    let digits = group_thousands(amount.abs());
    let sign = if amount < 0.0 && digits != "0.00" {
        "-"
    } else {
        ""
    };
    format!("{sign}{}{digits}", currency_symbol(currency))
}

fn group_thousands(value: f64) -> String {
    let fixed = format!("{value:.2}");
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), ""));

    let mut out = String::with_capacity(fixed.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    if !frac_part.is_empty() {
        out.push('.');
        out.push_str(frac_part);
    }
    out
}
