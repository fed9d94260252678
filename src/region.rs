// Regions offered by the setup prompt. The list order is the numbering the
// operator sees, starting at 1.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Region {
    pub code: &'static str,
    pub label: &'static str,
}

impl Region {
    const fn new(code: &'static str, label: &'static str) -> Self {
        Region { code, label }
    }
}

pub const REGIONS: [Region; 8] = [
    Region::new("us-east-1", "US East (N. Virginia)"),
    Region::new("us-west-1", "US West (N. California)"),
    Region::new("eu-west-1", "EU West (Ireland)"),
    Region::new("eu-west-2", "EU West (London)"),
    Region::new("eu-west-3", "EU West (Paris)"),
    Region::new("eu-central-1", "EU Central (Frankfurt)"),
    Region::new("ap-northeast-1", "Asia Pacific (Tokyo)"),
    Region::new("ap-southeast-1", "Asia Pacific (Singapore)"),
];

/// Lines shown before the region prompt, e.g. `  1. US East (N. Virginia) (us-east-1)`.
pub fn menu_lines() -> Vec<String> {
    REGIONS
        .iter()
        .enumerate()
        .map(|(i, r)| format!("  {}. {} ({})", i + 1, r.label, r.code))
        .collect()
}

/// Maps the operator's answer to a region. Blank, non-numeric and
/// out-of-range answers all fall back to the first entry.
pub fn parse_choice(input: &str) -> Region {
    input
        .trim()
        .parse::<usize>()
        .ok()
        .and_then(|n| n.checked_sub(1))
        .and_then(|i| REGIONS.get(i).copied())
        .unwrap_or(REGIONS[0])
}
