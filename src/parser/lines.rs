/// Trimmed, non-empty lines of a paste. Built once, read-only afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Lines {
    lines: Vec<String>,
}

impl Lines {
    /// Literal `\n` escapes count as line breaks, as do `\r\n` endings.
    pub fn from_raw(raw: &str) -> Self {
        let lines = raw
            .replace("\\n", "\n")
            .replace("\r\n", "\n")
            .split('\n')
            .map(|l| l.trim().to_string())
            .filter(|l| !l.is_empty())
            .collect();
        Lines { lines }
    }

    pub fn as_slice(&self) -> &[String] {
        &self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn get(&self, idx: usize) -> Option<&str> {
        self.lines.get(idx).map(String::as_str)
    }

    /// Index of the first line at or after `from` satisfying `f`.
    pub fn position_from<F>(&self, from: usize, f: F) -> Option<usize>
    where
        F: Fn(&str) -> bool,
    {
        self.lines
            .iter()
            .enumerate()
            .skip(from)
            .find(|(_, l)| f(l))
            .map(|(i, _)| i)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trims_and_drops_blank_lines() {
        let lines = Lines::from_raw("  Product \n\n\t\nCute Mug\r\n  ");
        assert_eq!(lines.as_slice(), &["Product".to_string(), "Cute Mug".to_string()]);
    }

    #[test]
    fn literal_escapes_split() {
        let lines = Lines::from_raw("Mo. Sales\\n1,234\\nViews");
        assert_eq!(lines.len(), 3);
        assert_eq!(lines.get(1), Some("1,234"));
    }

    #[test]
    fn empty_input() {
        assert!(Lines::from_raw("").is_empty());
        assert!(Lines::from_raw(" \n \\n ").is_empty());
    }

    #[test]
    fn position_from_skips_earlier_lines() {
        let lines = Lines::from_raw("Tags\nx\nTags");
        assert_eq!(lines.position_from(0, |l| l == "Tags"), Some(0));
        assert_eq!(lines.position_from(1, |l| l == "Tags"), Some(2));
        assert_eq!(lines.position_from(3, |l| l == "Tags"), None);
    }
}
