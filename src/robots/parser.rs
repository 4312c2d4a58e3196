//! Robots.txt rules
//!
//! Allow/disallow matching is delegated to the robotstxt crate. Crawl-delay
//! is not part of that crate's API, so the groups are scanned once here when
//! the rules are built.

use robotstxt::DefaultMatcher;
use std::time::Duration;

/// Upper bound for a robots.txt crawl delay
pub const MAX_CRAWL_DELAY: Duration = Duration::from_secs(60);

/// One `User-agent` group and the crawl delay it declares
#[derive(Debug, Clone)]
struct Group {
    agents: Vec<String>,
    crawl_delay: Option<f64>,
}

/// Parsed robots.txt for one origin
#[derive(Debug, Clone, Default)]
pub struct RobotsRules {
    /// Raw body; empty means everything is allowed
    content: String,
    groups: Vec<Group>,
}

impl RobotsRules {
    /// Builds rules from a robots.txt body
    pub fn from_content(content: &str) -> Self {
        Self {
            content: content.to_string(),
            groups: parse_groups(content),
        }
    }

    /// Rules that allow everything, used when robots.txt is missing or
    /// cannot be fetched
    pub fn allow_all() -> Self {
        Self::default()
    }

    /// Checks if a URL may be fetched by the given agent
    ///
    /// # Arguments
    ///
    /// * `url` - Absolute URL (or path) to check
    /// * `agent` - Product token of the crawler, e.g. `webharvest`
    pub fn is_allowed(&self, url: &str, agent: &str) -> bool {
        if self.content.trim().is_empty() {
            return true;
        }
        let mut matcher = DefaultMatcher::default();
        matcher.one_agent_allowed_by_robots(&self.content, agent, url)
    }

    /// Returns the crawl delay for an agent, preferring its own group over `*`
    ///
    /// Negative and NaN values are ignored; larger values are capped at
    /// [`MAX_CRAWL_DELAY`].
    pub fn crawl_delay(&self, agent: &str) -> Option<Duration> {
        let agent = agent.to_lowercase();
        let delay_for = |wanted: &dyn Fn(&str) -> bool| {
            self.groups
                .iter()
                .filter(|group| group.agents.iter().any(|a| wanted(a)))
                .find_map(|group| group.crawl_delay)
        };

        delay_for(&|a: &str| a != "*" && agent.contains(a))
            .or_else(|| delay_for(&|a: &str| a == "*"))
            .filter(|secs| *secs >= 0.0)
            .map(|secs| secs.min(MAX_CRAWL_DELAY.as_secs_f64()))
            .and_then(|secs| Duration::try_from_secs_f64(secs).ok())
    }
}

/// Splits robots.txt into user-agent groups
///
/// Consecutive `User-agent` lines share a group; any other directive closes
/// the run of agent lines, so the next `User-agent` starts a new group.
fn parse_groups(content: &str) -> Vec<Group> {
    let mut groups: Vec<Group> = Vec::new();
    let mut collecting_agents = false;

    for line in content.lines() {
        let line = line.split('#').next().unwrap_or("").trim();
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        let key = key.trim().to_lowercase();
        let value = value.trim();

        match key.as_str() {
            "user-agent" => {
                if !collecting_agents {
                    groups.push(Group {
                        agents: Vec::new(),
                        crawl_delay: None,
                    });
                    collecting_agents = true;
                }
                if let Some(group) = groups.last_mut() {
                    group.agents.push(value.to_lowercase());
                }
            }
            "crawl-delay" => {
                collecting_agents = false;
                if let (Some(group), Ok(delay)) = (groups.last_mut(), value.parse::<f64>()) {
                    group.crawl_delay.get_or_insert(delay);
                }
            }
            _ => collecting_agents = false,
        }
    }

    groups
}
