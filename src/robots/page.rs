//! Page-level robots directives
//!
//! Rules come from `X-Robots-Tag` headers and `<meta name="robots">` tags. Each
//! rule string is a comma-separated directive list, optionally scoped to one
//! user agent with a `"agent: "` prefix.

use super::parser::product_token;

/// Directive names that may legitimately carry a `name: value` form
const KNOWN_DIRECTIVES: &[&str] = &[
    "all",
    "none",
    "noindex",
    "nofollow",
    "noarchive",
    "nosnippet",
    "notranslate",
    "noimageindex",
    "indexifembedded",
    "unavailable_after",
    "max-snippet",
    "max-image-preview",
    "max-video-preview",
];

#[derive(Debug, Clone, PartialEq, Eq)]
struct PageRule {
    /// Lowercased agent token; `None` applies to every agent
    agent: Option<String>,
    directives: Vec<String>,
}

/// Interpreted page robots rules
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageRobotRules {
    rules: Vec<PageRule>,
}

impl PageRobotRules {
    /// Parses raw rule strings as found in headers and meta tags
    ///
    /// # Examples
    ///
    /// ```
    /// use site_crawler::robots::PageRobotRules;
    ///
    /// let rules = PageRobotRules::parse(&["noindex".to_string(), "otherbot: nofollow".to_string()]);
    /// assert!(!rules.can_index("MyBot/1.0"));
    /// assert!(rules.can_follow_links("MyBot/1.0"));
    /// assert!(!rules.can_follow_links("OtherBot"));
    /// ```
    pub fn parse(raw_rules: &[String]) -> Self {
        let rules = raw_rules
            .iter()
            .filter_map(|raw| parse_rule(raw))
            .collect();
        Self { rules }
    }

    /// Returns false if any applicable rule says `noindex` or `none`
    pub fn can_index(&self, user_agent: &str) -> bool {
        !self.has_directive(user_agent, "noindex")
    }

    /// Returns false if any applicable rule says `nofollow` or `none`
    pub fn can_follow_links(&self, user_agent: &str) -> bool {
        !self.has_directive(user_agent, "nofollow")
    }

    fn has_directive(&self, user_agent: &str, directive: &str) -> bool {
        let agent = product_token(user_agent).to_lowercase();

        self.rules
            .iter()
            .filter(|rule| rule.agent.as_ref().map_or(true, |a| *a == agent))
            .flat_map(|rule| rule.directives.iter())
            .any(|d| d == directive || d == "none")
    }
}

fn parse_rule(raw: &str) -> Option<PageRule> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    let (agent, body) = match raw.split_once(':') {
        Some((prefix, rest)) if is_agent_prefix(prefix) => {
            (Some(prefix.trim().to_lowercase()), rest)
        }
        _ => (None, raw),
    };

    let directives: Vec<String> = body
        .split(',')
        .map(|d| {
            // "max-snippet: 20" style values keep only the name
            let name = d.split(':').next().unwrap_or_default();
            name.trim().to_lowercase()
        })
        .filter(|d| !d.is_empty())
        .collect();

    if directives.is_empty() {
        return None;
    }

    Some(PageRule { agent, directives })
}

fn is_agent_prefix(prefix: &str) -> bool {
    let prefix = prefix.trim().to_lowercase();
    !prefix.is_empty()
        && !prefix.contains(',')
        && !prefix.contains(char::is_whitespace)
        && !KNOWN_DIRECTIVES.contains(&prefix.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rules(raw: &[&str]) -> PageRobotRules {
        let raw: Vec<String> = raw.iter().map(|r| r.to_string()).collect();
        PageRobotRules::parse(&raw)
    }

    #[test]
    fn test_empty_allows_everything() {
        let rules = rules(&[]);
        assert!(rules.can_index("TestBot"));
        assert!(rules.can_follow_links("TestBot"));
    }

    #[test]
    fn test_noindex_and_nofollow() {
        let rules = rules(&["NoIndex, nofollow"]);
        assert!(!rules.can_index("TestBot"));
        assert!(!rules.can_follow_links("TestBot"));
    }

    #[test]
    fn test_nofollow_only() {
        let rules = rules(&["index, nofollow"]);
        assert!(rules.can_index("TestBot"));
        assert!(!rules.can_follow_links("TestBot"));
    }

    #[test]
    fn test_none_means_both() {
        let rules = rules(&["none"]);
        assert!(!rules.can_index("TestBot"));
        assert!(!rules.can_follow_links("TestBot"));
    }

    #[test]
    fn test_all_allows() {
        let rules = rules(&["all"]);
        assert!(rules.can_index("TestBot"));
        assert!(rules.can_follow_links("TestBot"));
    }

    #[test]
    fn test_agent_scoped_rules() {
        let rules = rules(&["otherbot: noindex", "TestBot: nofollow"]);
        assert!(rules.can_index("TestBot/1.0"));
        assert!(!rules.can_follow_links("TestBot/1.0"));
        assert!(!rules.can_index("OtherBot"));
        assert!(rules.can_follow_links("OtherBot"));
    }

    #[test]
    fn test_valued_directives_are_not_agents() {
        let rules = rules(&["max-snippet: 20, noindex", "unavailable_after: 2030-01-01"]);
        assert!(!rules.can_index("TestBot"));
        assert!(rules.can_follow_links("TestBot"));
    }
}
