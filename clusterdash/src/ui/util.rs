//! Small UI helpers: human-readable sizes, truncation, percentages.

pub fn human(b: f64) -> String {
    const K: f64 = 1024.0;
    if !b.is_finite() || b < 0.0 {
        return "-".into();
    }
    if b < K {
        return format!("{b:.0}B");
    }
    let kb = b / K;
    if kb < K {
        return format!("{kb:.1}KB");
    }
    let mb = kb / K;
    if mb < K {
        return format!("{mb:.1}MB");
    }
    let gb = mb / K;
    if gb < K {
        return format!("{gb:.1}GB");
    }
    format!("{:.2}TB", gb / K)
}

/// `used / total` as a whole percentage, 0 when `total` is not positive.
pub fn percent(used: f64, total: f64) -> u16 {
    if total > 0.0 && used.is_finite() {
        (used / total * 100.0).clamp(0.0, 100.0).round() as u16
    } else {
        0
    }
}

pub fn truncate_middle(s: &str, max: usize) -> String {
    let chars: Vec<char> = s.chars().collect();
    if chars.len() <= max {
        return s.to_string();
    }
    if max <= 3 {
        return "...".into();
    }
    let keep = max - 3;
    let left = keep / 2;
    let right = keep - left;
    let head: String = chars[..left].iter().collect();
    let tail: String = chars[chars.len() - right..].iter().collect();
    format!("{head}...{tail}")
}

/// Compact axis tick: 1.2k, 3.4M.
pub fn short_number(v: f64) -> String {
    let a = v.abs();
    if a >= 1e9 {
        format!("{:.1}G", v / 1e9)
    } else if a >= 1e6 {
        format!("{:.1}M", v / 1e6)
    } else if a >= 1e3 {
        format!("{:.1}k", v / 1e3)
    } else if a >= 10.0 || a == 0.0 {
        format!("{v:.0}")
    } else {
        format!("{v:.2}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn human_sizes() {
        assert_eq!(human(512.0), "512B");
        assert_eq!(human(1536.0), "1.5KB");
        assert_eq!(human(1073741824.0), "1.0GB");
        assert_eq!(human(f64::NAN), "-");
    }

    #[test]
    fn truncation_keeps_both_ends() {
        assert_eq!(truncate_middle("abcdefghij", 7), "ab...ij");
        assert_eq!(truncate_middle("short", 10), "short");
    }

    #[test]
    fn percent_guards_zero_total() {
        assert_eq!(percent(5.0, 0.0), 0);
        assert_eq!(percent(50.0, 200.0), 25);
    }
}
