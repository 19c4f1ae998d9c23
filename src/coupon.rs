//! Fixed promotion table. Codes are compared case-insensitively and map to a
//! discount fraction in `[0, 1)`.

const COUPONS: &[(&str, f64)] = &[("PICKLE10", 0.10), ("PICKLE20", 0.20)];

pub fn lookup(code: &str) -> Option<f64> {
    let code = code.trim().to_uppercase();
    COUPONS
        .iter()
        .find(|(known, _)| *known == code)
        .map(|(_, fraction)| *fraction)
}

#[cfg(test)]
mod tests {
    use super::lookup;

    #[test]
    fn codes_match_regardless_of_case() {
        assert_eq!(lookup("picklE10"), Some(0.10));
        assert_eq!(lookup("  pickle20 "), Some(0.20));
        assert_eq!(lookup("BOGUS"), None);
    }
}
