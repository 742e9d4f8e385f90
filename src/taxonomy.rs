//! Closed classification taxonomies for provider records.
//!
//! Provider records are tagged with labels from these lists at classification time.
//! The search core does not reject labels outside the lists; they are published so
//! clients can build filter controls, and [`Region::from_country`] buckets free-text
//! country strings into the region taxonomy.

use serde::Serialize;
use std::fmt;

/// AI use case labels.
pub const USE_CASES: &[&str] = &[
    "Voice AI",
    "Agentic AI",
    "CRM & Sales Automation",
    "Workflow & Process Automation",
    "AI Content & Marketing",
    "RAG & Knowledge Bases",
    "Data Dashboards & Analytics",
    "Document & Data Processing",
    "Custom AI Development",
    "On-Premise & Private AI",
    "AI Web & App Design",
    "AI Consulting & Education",
];

/// Business function labels.
pub const BUSINESS_FUNCTIONS: &[&str] = &[
    "Marketing",
    "Sales",
    "Customer Service",
    "Operations",
    "Finance",
    "People / HR",
    "Leadership / Strategy",
    "Legal / Compliance",
];

/// Industry labels.
pub const INDUSTRIES: &[&str] = &[
    "E-commerce / Retail",
    "SaaS / Technology",
    "Healthcare / Medical",
    "Financial Services / Insurance",
    "Real Estate",
    "Legal Services",
    "Education / EdTech",
    "Construction / Trades / Home Services",
    "Professional Services / Consulting",
    "Media / Entertainment",
    "Cybersecurity",
    "Government / Public Sector",
    "Manufacturing / Logistics",
    "Hospitality / Travel / Food Services",
    "Industry Agnostic",
];

/// Geographic region of a provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Region {
    NorthAmerica,
    Europe,
    AsiaPacific,
    LatinAmerica,
    MiddleEast,
    Africa,
    /// Default bucket for unknown, remote or unparseable locations.
    RemoteOther,
}

const NORTH_AMERICA: &[&str] = &["united states", "usa", "u.s.", "canada", "mexico"];

const EUROPE: &[&str] = &[
    "united kingdom",
    "uk",
    "england",
    "scotland",
    "wales",
    "ireland",
    "germany",
    "france",
    "spain",
    "portugal",
    "italy",
    "netherlands",
    "belgium",
    "luxembourg",
    "switzerland",
    "austria",
    "sweden",
    "norway",
    "denmark",
    "finland",
    "iceland",
    "poland",
    "czech",
    "slovakia",
    "hungary",
    "romania",
    "bulgaria",
    "greece",
    "croatia",
    "serbia",
    "slovenia",
    "estonia",
    "latvia",
    "lithuania",
    "ukraine",
    "malta",
    "cyprus",
];

const ASIA_PACIFIC: &[&str] = &[
    "australia",
    "new zealand",
    "india",
    "pakistan",
    "bangladesh",
    "sri lanka",
    "singapore",
    "malaysia",
    "indonesia",
    "philippines",
    "thailand",
    "vietnam",
    "china",
    "hong kong",
    "taiwan",
    "japan",
    "south korea",
    "korea",
    "nepal",
];

const LATIN_AMERICA: &[&str] = &[
    "brazil",
    "argentina",
    "chile",
    "colombia",
    "peru",
    "venezuela",
    "ecuador",
    "uruguay",
    "paraguay",
    "bolivia",
    "costa rica",
    "panama",
    "guatemala",
    "dominican republic",
    "puerto rico",
];

const MIDDLE_EAST: &[&str] = &[
    "united arab emirates",
    "uae",
    "dubai",
    "saudi arabia",
    "qatar",
    "kuwait",
    "bahrain",
    "oman",
    "israel",
    "jordan",
    "lebanon",
    "turkey",
    "egypt",
];

const AFRICA: &[&str] = &[
    "south africa",
    "nigeria",
    "kenya",
    "ghana",
    "morocco",
    "tunisia",
    "ethiopia",
    "uganda",
    "tanzania",
    "rwanda",
];

impl Region {
    /// All regions in display order.
    pub const ALL: [Region; 7] = [
        Region::NorthAmerica,
        Region::Europe,
        Region::AsiaPacific,
        Region::LatinAmerica,
        Region::MiddleEast,
        Region::Africa,
        Region::RemoteOther,
    ];

    /// Taxonomy label used in records and filters.
    pub fn label(&self) -> &'static str {
        match self {
            Region::NorthAmerica => "North America",
            Region::Europe => "Europe",
            Region::AsiaPacific => "Asia Pacific",
            Region::LatinAmerica => "Latin America",
            Region::MiddleEast => "Middle East",
            Region::Africa => "Africa",
            Region::RemoteOther => "Remote / Other",
        }
    }

    /// Parse a taxonomy label (case-insensitive).
    pub fn from_label(label: &str) -> Option<Region> {
        let label = label.trim();
        Region::ALL
            .into_iter()
            .find(|r| r.label().eq_ignore_ascii_case(label))
    }

    /// Classify a free-text country string into a region.
    ///
    /// Matching is case-insensitive on whole words, so "Remote (USA)" resolves to
    /// North America while "Russia" does not match "usa". Anything that matches no
    /// list falls into [`Region::RemoteOther`].
    pub fn from_country(country: &str) -> Region {
        let normalized = country.trim().to_lowercase();
        if normalized.is_empty() {
            return Region::RemoteOther;
        }

        let table: [(Region, &[&str]); 6] = [
            (Region::MiddleEast, MIDDLE_EAST),
            (Region::NorthAmerica, NORTH_AMERICA),
            (Region::Europe, EUROPE),
            (Region::AsiaPacific, ASIA_PACIFIC),
            (Region::LatinAmerica, LATIN_AMERICA),
            (Region::Africa, AFRICA),
        ];

        table
            .into_iter()
            .find(|(_, names)| names.iter().any(|name| contains_word(&normalized, name)))
            .map(|(region, _)| region)
            .unwrap_or(Region::RemoteOther)
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// True if `needle` occurs in `haystack` bounded by non-alphanumeric characters.
fn contains_word(haystack: &str, needle: &str) -> bool {
    haystack.match_indices(needle).any(|(start, _)| {
        let end = start + needle.len();
        let before_ok = haystack[..start]
            .chars()
            .next_back()
            .map_or(true, |c| !c.is_alphanumeric());
        let after_ok = haystack[end..]
            .chars()
            .next()
            .map_or(true, |c| !c.is_alphanumeric());
        before_ok && after_ok
    })
}

/// Serializable snapshot of every taxonomy.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaxonomyCatalog {
    pub use_cases: Vec<&'static str>,
    pub business_functions: Vec<&'static str>,
    pub industries: Vec<&'static str>,
    pub regions: Vec<&'static str>,
}

impl TaxonomyCatalog {
    pub fn current() -> Self {
        Self {
            use_cases: USE_CASES.to_vec(),
            business_functions: BUSINESS_FUNCTIONS.to_vec(),
            industries: INDUSTRIES.to_vec(),
            regions: Region::ALL.iter().map(|r| r.label()).collect(),
        }
    }
}
