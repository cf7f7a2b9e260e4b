/// Zone-suffix predicate for one upstream pool.
///
/// Zones are normalized at construction (lower-cased, surrounding dots
/// stripped); lookups expect an already-normalized name. An empty zone is
/// the root and matches everything. Matching never validates domain
/// syntax.
#[derive(Debug, Clone)]
pub struct ZoneMatcher {
    zones: Vec<String>,
}

impl ZoneMatcher {
    pub fn new<I, S>(zones: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let zones = zones
            .into_iter()
            .map(|z| {
                z.as_ref()
                    .to_ascii_lowercase()
                    .trim_matches('.')
                    .to_string()
            })
            .collect();
        Self { zones }
    }

    pub fn matches(&self, name: &str) -> bool {
        self.zones.iter().any(|zone| zone_matches(zone, name))
    }

    pub fn zones(&self) -> &[String] {
        &self.zones
    }
}

fn zone_matches(zone: &str, name: &str) -> bool {
    if zone.is_empty() {
        return true;
    }
    match name.strip_suffix(zone) {
        Some("") => true,
        Some(head) => head.ends_with('.'),
        None => false,
    }
}
