//! Quantified-impact detection for resume bullets.

/// A bullet counts as quantified when it carries a number, a percentage or a
/// currency amount. Estimates (`~2 hours`) and multipliers (`3x faster`) are
/// covered by the digit check.
pub fn is_quantified(text: &str) -> bool {
    let has_digit = text.chars().any(|c| c.is_ascii_digit());
    let has_percent = text.contains('%');
    let has_currency = text.contains('$') || text.contains('€') || text.contains('£');

    has_digit || has_percent || has_currency
}

/// Share of quantified bullets, or `None` when there are no bullets.
pub fn quantified_share<'a, I>(bullets: I) -> Option<f64>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut total = 0usize;
    let mut quantified = 0usize;
    for bullet in bullets {
        if bullet.trim().is_empty() {
            continue;
        }
        total += 1;
        if is_quantified(bullet) {
            quantified += 1;
        }
    }
    (total > 0).then(|| quantified as f64 / total as f64)
}

/// Markdown bullet lines (`-`, `*`, `+`) of a text block.
pub fn markdown_bullets(text: &str) -> impl Iterator<Item = &str> {
    text.lines().filter_map(|line| {
        let line = line.trim_start();
        line.strip_prefix("- ")
            .or_else(|| line.strip_prefix("* "))
            .or_else(|| line.strip_prefix("+ "))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pass_with_percentage() {
        assert!(is_quantified("Reduced latency by 40% through caching"));
    }

    #[test]
    fn test_pass_with_dollar_amount() {
        assert!(is_quantified("Saved $50,000 annually by optimizing queries"));
    }

    #[test]
    fn test_pass_with_euro() {
        assert!(is_quantified("Generated €200k in new revenue"));
    }

    #[test]
    fn test_pass_with_count() {
        assert!(is_quantified("Trained 15 engineers on new deployment process"));
    }

    #[test]
    fn test_fail_improved_without_metrics() {
        assert!(!is_quantified("Improved the user experience"));
    }

    #[test]
    fn test_fail_vague_scale_word() {
        assert!(!is_quantified("Achieved significant performance improvements"));
    }

    #[test]
    fn test_share_mixed() {
        let share = quantified_share(["Reduced latency by 40%", "Improved the user experience"]);
        assert_eq!(share, Some(0.5));
    }

    #[test]
    fn test_share_none_without_bullets() {
        assert_eq!(quantified_share(Vec::<&str>::new()), None);
        assert_eq!(quantified_share(["  "]), None);
    }

    #[test]
    fn test_markdown_bullets() {
        let md = "# Jane\n- Cut costs 30%\n  * Led team\nplain line\n+ Shipped v2";
        let bullets: Vec<&str> = markdown_bullets(md).collect();
        assert_eq!(bullets, vec!["Cut costs 30%", "Led team", "Shipped v2"]);
    }
}
