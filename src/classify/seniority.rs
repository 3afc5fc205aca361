// Seniority is a strict priority cascade, evaluated top to bottom with
// first match winning. The ordering and the title-vs-body distinction
// for internships are load-bearing: "Senior Manager, International
// Expansion" must classify as senior, never as an internship, and a
// body mention of an "internship program" must not demote a senior role.

use std::sync::LazyLock;

use regex::Regex;

pub const LEAD: &str = "lead";
pub const SENIOR: &str = "senior";
pub const MID: &str = "mid";
pub const ENTRY: &str = "entry";
pub const INTERNSHIP: &str = "internship";

static RE_LEAD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\b(lead|principal|staff (engineer|developer)|architect|director|vp|vice president|chief \w+ officer|c[eiot]o|founding \w+|head of)\b",
    )
    .expect("invalid lead pattern")
});

static RE_SENIOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(senior|sr\.?)\b").expect("invalid senior pattern"));

// "5+ years" through "10+ years"
static RE_SENIOR_YEARS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b([5-9]|10)\s*\+\s*(years?|yrs)\b").expect("invalid senior-years pattern")
});

static RE_MID: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(mid[- ]?level|mid|intermediate|medior)\b").expect("invalid mid pattern")
});

static RE_ENTRY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(entry[- ]?level|entry|junior|jr\.?|graduate|associate)\b")
        .expect("invalid entry pattern")
});

// "2-5 years", "3 to 6 years" style ranges
static RE_YEAR_RANGE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(\d{1,2})\s*(?:-|–|to)\s*(\d{1,2})\s*\+?\s*(?:years?|yrs)\b")
        .expect("invalid year-range pattern")
});

static RE_INTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(internship|intern|stage|stagiaire?|werkstudent)\b")
        .expect("invalid intern pattern")
});

static RE_STUDENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(student|university|college|bachelor|master|campus|enrolled|degree program(me)?)\b")
        .expect("invalid student pattern")
});

/// True when the text carries a lead/executive-class term. Shared with
/// the employment-type tagger's internship conflict rule.
pub fn has_lead_term(text: &str) -> bool {
    RE_LEAD.is_match(text)
}

pub fn has_senior_term(text: &str) -> bool {
    RE_SENIOR.is_match(text)
}

/// An explicit "N-M years" range whose bounds both fall within
/// `[lo, hi]`.
fn year_range_within(text: &str, lo: u32, hi: u32) -> bool {
    RE_YEAR_RANGE.captures_iter(text).any(|caps| {
        let from: u32 = caps[1].parse().unwrap_or(u32::MAX);
        let to: u32 = caps[2].parse().unwrap_or(u32::MAX);
        from >= lo && from <= hi && to >= lo && to <= hi
    })
}

/// Assign the single seniority label for a posting.
///
/// `title` and `body` are lower-cased; `hint` is an externally supplied
/// seniority string (e.g. a provider category) also lower-cased.
pub fn tag(title: &str, body: &str, hint: &str) -> &'static str {
    // Priority 1: lead / executive
    if RE_LEAD.is_match(title) || RE_LEAD.is_match(hint) {
        return LEAD;
    }

    // Priority 2: senior in the title, or senior in the body backed by
    // an explicit "5+ years" style requirement
    if RE_SENIOR.is_match(title)
        || RE_SENIOR.is_match(hint)
        || (RE_SENIOR.is_match(body) && RE_SENIOR_YEARS.is_match(body))
    {
        return SENIOR;
    }

    // Priority 3: mid
    if RE_MID.is_match(title) || RE_MID.is_match(hint) || year_range_within(body, 2, 7) {
        return MID;
    }

    // Priority 4: entry
    if RE_ENTRY.is_match(title) || RE_ENTRY.is_match(hint) || year_range_within(body, 0, 3) {
        return ENTRY;
    }

    // Priority 5: internship only from the title, or from the body when
    // a student/university keyword confirms it
    if RE_INTERN.is_match(title) || (RE_INTERN.is_match(body) && RE_STUDENT.is_match(body)) {
        return INTERNSHIP;
    }

    MID
}
