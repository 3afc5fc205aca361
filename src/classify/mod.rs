// Classification engine: six independent taggers over lower-cased
// posting text. Pure functions, no network or storage access. The
// pipeline runs seniority before employment type because the internship
// conflict rule consumes the seniority result.

pub mod seniority;
pub mod vocab;

use std::sync::LazyLock;

use regex::Regex;

/// Bumped whenever vocabularies or tagger rules change, so repeated
/// enrichment passes are distinguishable in the store.
pub const ENRICHED_VERSION: &str = "2";

pub const FULL_TIME: &str = "full-time";
pub const PART_TIME: &str = "part-time";
pub const CONTRACT: &str = "contract";

pub const REMOTE: &str = "remote";
pub const HYBRID: &str = "hybrid";
pub const ON_SITE: &str = "on-site";

/// Raw text of one posting, pre-concatenation. `body` is the listing
/// text (location, description, source-provided skills); `location` is
/// kept separately for the on-site default rule.
#[derive(Debug, Default)]
pub struct JobText<'a> {
    pub title: &'a str,
    pub body: &'a str,
    pub company: &'a str,
    pub location: &'a str,
}

/// Externally supplied classification hints (e.g. a provider category
/// field). Empty strings mean no hint.
#[derive(Debug, Default)]
pub struct Hints<'a> {
    pub seniority: &'a str,
}

/// Output of one classification pass. Sets are de-duplicated;
/// `experience_levels` is a singleton in practice.
#[derive(Debug, Default, PartialEq)]
pub struct Tags {
    pub employment_types: Vec<String>,
    pub work_locations: Vec<String>,
    pub experience_levels: Vec<String>,
    pub industries: Vec<String>,
    pub technologies: Vec<String>,
    pub skills: Vec<String>,
}

/// Run all six taggers over a posting. Degrades to defaults on empty
/// input rather than failing.
pub fn classify(text: &JobText, hints: &Hints) -> Tags {
    let title = text.title.to_lowercase();
    let body = text.body.to_lowercase();
    let company = text.company.to_lowercase();
    let hint = hints.seniority.to_lowercase();
    let full = format!("{title} {body}");
    let full_with_company = format!("{full} {company}");

    let seniority_label = seniority::tag(&title, &body, &hint);

    Tags {
        employment_types: tag_employment(&title, &full, &hint, seniority_label),
        work_locations: tag_work_location(&full, text.location),
        experience_levels: vec![seniority_label.to_string()],
        industries: vocab::match_rules(&vocab::INDUSTRIES, &full_with_company),
        technologies: vocab::match_rules(&vocab::TECHNOLOGIES, &full),
        skills: vocab::match_rules(&vocab::SKILLS, &full),
    }
}

static RE_FULL_TIME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(full[- ]?time|permanent position|unbefristet|40 hours)\b")
        .expect("invalid full-time pattern")
});

static RE_PART_TIME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(part[- ]?time|teilzeit|deeltijd)\b").expect("invalid part-time pattern")
});

static RE_CONTRACT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(contract(or)?|freelance(r)?|temporary|fixed[- ]term|b2b)\b")
        .expect("invalid contract pattern")
});

static RE_INTERNSHIP: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(internship|intern|working student|werkstudent)\b")
        .expect("invalid internship pattern")
});

/// Employment types matched in the text. Conflict rule: an internship
/// match is dropped when the title or the seniority signal carries a
/// senior/lead term, so "Senior ... International Markets" titles are
/// never filed as internships. Defaults to full-time.
fn tag_employment(title: &str, full: &str, hint: &str, seniority_label: &str) -> Vec<String> {
    let mut types = Vec::new();
    if RE_FULL_TIME.is_match(full) {
        types.push(FULL_TIME.to_string());
    }
    if RE_PART_TIME.is_match(full) {
        types.push(PART_TIME.to_string());
    }
    if RE_CONTRACT.is_match(full) {
        types.push(CONTRACT.to_string());
    }

    let senior_signal = seniority::has_lead_term(title)
        || seniority::has_senior_term(title)
        || seniority::has_lead_term(hint)
        || seniority::has_senior_term(hint)
        || matches!(seniority_label, seniority::SENIOR | seniority::LEAD);

    if RE_INTERNSHIP.is_match(full) && !senior_signal {
        types.push(seniority::INTERNSHIP.to_string());
    }

    if types.is_empty() {
        types.push(FULL_TIME.to_string());
    }
    types
}

static RE_REMOTE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(remote|work from home|wfh|home[- ]office|fully distributed|teletrabajo|teletravail|thuiswerken)\b")
        .expect("invalid remote pattern")
});

static RE_HYBRID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(hybrid|hybride|hibrido)\b").expect("invalid hybrid pattern"));

static RE_ON_SITE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(on[- ]?site|in[- ]office|in the office|office[- ]based|vor ort|au bureau|presencial)\b")
        .expect("invalid on-site pattern")
});

/// Work-location families, diacritic-insensitive ("télétravail",
/// "híbrido"). Hybrid is additionally inferred when remote and office
/// language co-occur. Defaults to on-site when nothing matches and the
/// posting carries a location string.
fn tag_work_location(full: &str, location: &str) -> Vec<String> {
    let folded = fold_diacritics(full);
    let mut locations = Vec::new();

    let remote = RE_REMOTE.is_match(&folded);
    let on_site = RE_ON_SITE.is_match(&folded);
    let hybrid = RE_HYBRID.is_match(&folded) || (remote && on_site);

    if remote {
        locations.push(REMOTE.to_string());
    }
    if hybrid {
        locations.push(HYBRID.to_string());
    }
    if on_site {
        locations.push(ON_SITE.to_string());
    }
    if locations.is_empty() && !location.trim().is_empty() {
        locations.push(ON_SITE.to_string());
    }
    locations
}

/// Fold the accented characters seen in European postings onto their
/// ASCII base so the location patterns match regardless of spelling.
fn fold_diacritics(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            'à' | 'á' | 'â' | 'ã' | 'ä' | 'å' => 'a',
            'è' | 'é' | 'ê' | 'ë' => 'e',
            'ì' | 'í' | 'î' | 'ï' => 'i',
            'ò' | 'ó' | 'ô' | 'õ' | 'ö' => 'o',
            'ù' | 'ú' | 'û' | 'ü' => 'u',
            'ç' => 'c',
            'ñ' => 'n',
            other => other,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classify_simple(title: &str, body: &str) -> Tags {
        classify(
            &JobText {
                title,
                body,
                company: "",
                location: "",
            },
            &Hints::default(),
        )
    }

    #[test]
    fn test_employment_defaults_to_full_time() {
        let tags = classify_simple("software engineer", "write rust all day");
        assert_eq!(tags.employment_types, vec![FULL_TIME.to_string()]);
    }

    #[test]
    fn test_internship_conflict_resolved_by_senior_title() {
        let tags = classify_simple(
            "senior growth manager",
            "you will mentor our internship cohort, full-time position",
        );
        assert!(tags.employment_types.contains(&FULL_TIME.to_string()));
        assert!(!tags.employment_types.contains(&"internship".to_string()));
        assert_eq!(tags.experience_levels, vec!["senior".to_string()]);
    }

    #[test]
    fn test_internship_conflict_resolved_by_hint() {
        let tags = classify(
            &JobText {
                title: "growth manager",
                body: "join as an intern",
                company: "",
                location: "",
            },
            &Hints { seniority: "Lead" },
        );
        assert!(!tags.employment_types.contains(&"internship".to_string()));
    }

    #[test]
    fn test_genuine_internship_keeps_the_tag() {
        let tags = classify_simple("marketing intern", "internship for students");
        assert!(tags.employment_types.contains(&"internship".to_string()));
        assert_eq!(tags.experience_levels, vec!["internship".to_string()]);
    }

    #[test]
    fn test_part_time_and_contract_can_coexist() {
        let tags = classify_simple("designer", "part-time freelance engagement");
        assert!(tags.employment_types.contains(&PART_TIME.to_string()));
        assert!(tags.employment_types.contains(&CONTRACT.to_string()));
    }

    #[test]
    fn test_remote_tagging() {
        let tags = classify_simple("engineer", "fully remote team");
        assert_eq!(tags.work_locations, vec![REMOTE.to_string()]);
    }

    #[test]
    fn test_hybrid_inferred_from_remote_plus_office() {
        let tags = classify_simple("engineer", "remote fridays, otherwise in the office");
        assert!(tags.work_locations.contains(&HYBRID.to_string()));
    }

    #[test]
    fn test_diacritic_insensitive_location_match() {
        let tags = classify_simple("ingenieur", "télétravail possible");
        assert!(tags.work_locations.contains(&REMOTE.to_string()));
        let tags = classify_simple("ingeniero", "modelo híbrido");
        assert!(tags.work_locations.contains(&HYBRID.to_string()));
    }

    #[test]
    fn test_on_site_default_requires_location_string() {
        let no_location = classify_simple("engineer", "write code");
        assert!(no_location.work_locations.is_empty());

        let with_location = classify(
            &JobText {
                title: "engineer",
                body: "write code",
                company: "",
                location: "Berlin",
            },
            &Hints::default(),
        );
        assert_eq!(with_location.work_locations, vec![ON_SITE.to_string()]);
    }

    #[test]
    fn test_company_text_feeds_industry_only() {
        let tags = classify(
            &JobText {
                title: "account executive",
                body: "sell our product",
                company: "a leading fintech scale-up",
                location: "",
            },
            &Hints::default(),
        );
        assert!(tags.industries.contains(&"finance".to_string()));
        // company text must not leak technologies
        assert!(tags.technologies.is_empty());
    }

    #[test]
    fn test_empty_input_degrades_to_defaults() {
        let tags = classify(&JobText::default(), &Hints::default());
        assert_eq!(tags.employment_types, vec![FULL_TIME.to_string()]);
        assert_eq!(tags.experience_levels, vec!["mid".to_string()]);
        assert!(tags.work_locations.is_empty());
        assert!(tags.industries.is_empty());
    }

    #[test]
    fn test_classification_is_idempotent() {
        let a = classify_simple("senior rust engineer", "remote, kubernetes, postgres");
        let b = classify_simple("senior rust engineer", "remote, kubernetes, postgres");
        assert_eq!(a, b);
    }
}
