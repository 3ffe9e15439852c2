use std::fmt;

/// `id channel start duration [label]`.
#[derive(Debug, Clone, PartialEq)]
pub struct CtmRecord {
    pub id: String,
    pub channel: String,
    pub start: f64,
    pub duration: f64,
    pub label: Option<String>,
}

impl CtmRecord {
    /// Fields past the label (such as confidences) are not kept.
    pub fn parse(line: &str) -> Option<Self> {
        let mut tokens = line.split_whitespace();
        let id = tokens.next()?.to_string();
        let channel = tokens.next()?.to_string();
        let start = tokens.next()?.parse().ok()?;
        let duration = tokens.next()?.parse().ok()?;
        let label = tokens.next().map(String::from);
        Some(Self {
            id,
            channel,
            start,
            duration,
            label,
        })
    }
}

impl fmt::Display for CtmRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {:.2} {:.2}",
            self.id, self.channel, self.start, self.duration
        )?;
        if let Some(label) = &self.label {
            write!(f, " {label}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_parse_with_label() {
        let r = CtmRecord::parse("seg_000 1 0.10 0.20 w").unwrap();
        assert_eq!(r.id, "seg_000");
        assert_eq!(r.channel, "1");
        assert_eq!(r.label.as_deref(), Some("w"));
    }

    #[test]
    fn test_parse_without_label() {
        let r = CtmRecord::parse("seg_000 1 0.1 0.2").unwrap();
        assert_eq!(r.label, None);
        assert_eq!(r.to_string(), "seg_000 1 0.10 0.20");
    }

    #[rstest]
    #[case("seg 1 0.1")]
    #[case("seg 1 x 0.2 w")]
    #[case("")]
    fn test_parse_rejects_malformed(#[case] line: &str) {
        assert!(CtmRecord::parse(line).is_none());
    }
}
