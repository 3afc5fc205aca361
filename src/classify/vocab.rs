// Curated taxonomy vocabularies, kept declarative so label updates are
// reviewable independent of the matching logic. All patterns carry their
// own word boundaries; bare substring matching is never used.

use std::sync::LazyLock;

use regex::Regex;

/// One taxonomy rule: a label, a word-boundary pattern that assigns it,
/// and exclusion patterns whose matches are stripped from the text
/// before the positive pattern runs (so "technician" can never feed a
/// "tech" match, "social media" never feeds "media").
pub struct TaxonomyRule {
    pub label: &'static str,
    pub pattern: &'static str,
    pub exclusions: &'static [&'static str],
}

pub struct CompiledRule {
    pub label: &'static str,
    pub pattern: Regex,
    pub exclusions: Vec<Regex>,
}

fn compile(rules: &[TaxonomyRule]) -> Vec<CompiledRule> {
    rules
        .iter()
        .map(|r| CompiledRule {
            label: r.label,
            pattern: Regex::new(r.pattern).expect("invalid taxonomy pattern"),
            exclusions: r
                .exclusions
                .iter()
                .map(|e| Regex::new(e).expect("invalid exclusion pattern"))
                .collect(),
        })
        .collect()
}

/// Labels whose rules match the text, in rule order, de-duplicated.
pub fn match_rules(rules: &[CompiledRule], text: &str) -> Vec<String> {
    let mut labels = Vec::new();
    for rule in rules {
        let mut stripped = std::borrow::Cow::Borrowed(text);
        for exclusion in &rule.exclusions {
            if exclusion.is_match(&stripped) {
                stripped = std::borrow::Cow::Owned(exclusion.replace_all(&stripped, " ").into_owned());
            }
        }
        if rule.pattern.is_match(&stripped) && !labels.iter().any(|l| l == rule.label) {
            labels.push(rule.label.to_string());
        }
    }
    labels
}

const INDUSTRY_RULES: &[TaxonomyRule] = &[
    TaxonomyRule {
        label: "tech",
        pattern: r"\b(tech|software|saas|technology|engineering|developer tools)\b",
        exclusions: &[r"\btechni\w+"],
    },
    TaxonomyRule {
        label: "finance",
        pattern: r"\b(finance|financial|fintech|banking|investment|trading|insurance)\b",
        exclusions: &[],
    },
    TaxonomyRule {
        label: "ecommerce",
        pattern: r"\b(e-?commerce|marketplace|retail|webshop|online store)\b",
        exclusions: &[],
    },
    TaxonomyRule {
        label: "healthcare",
        pattern: r"\b(healthcare|health ?tech|medical|pharma|pharmaceutical|biotech|clinical)\b",
        exclusions: &[],
    },
    TaxonomyRule {
        label: "education",
        pattern: r"\b(education|edtech|e-?learning|tutoring|curriculum)\b",
        exclusions: &[],
    },
    TaxonomyRule {
        label: "media",
        pattern: r"\b(media|publishing|entertainment|streaming|journalism|broadcasting)\b",
        exclusions: &[r"\bsocial media\b"],
    },
    TaxonomyRule {
        label: "marketing",
        pattern: r"\b(marketing|advertising|adtech|brand agency|social media)\b",
        exclusions: &[],
    },
    TaxonomyRule {
        label: "consulting",
        pattern: r"\b(consulting|consultancy|professional services|advisory)\b",
        exclusions: &[],
    },
];

/// Technology names with synonyms normalized to one canonical spelling.
/// Patterns are matched against lower-cased text.
const TECHNOLOGY_RULES: &[TaxonomyRule] = &[
    TaxonomyRule { label: "javascript", pattern: r"\b(javascript|js)\b", exclusions: &[r"\b(next|node|react|vue)\.?js\b"] },
    TaxonomyRule { label: "typescript", pattern: r"\b(typescript|ts)\b", exclusions: &[] },
    TaxonomyRule { label: "python", pattern: r"\bpython\b", exclusions: &[] },
    TaxonomyRule { label: "java", pattern: r"\bjava\b", exclusions: &[r"\bjavascript\b"] },
    TaxonomyRule { label: "kotlin", pattern: r"\bkotlin\b", exclusions: &[] },
    TaxonomyRule { label: "swift", pattern: r"\bswift(ui)?\b", exclusions: &[r"\bswift code\b"] },
    TaxonomyRule { label: "go", pattern: r"\b(golang|go)\b", exclusions: &[r"\bgo[- ]to[- ]market\b", r"\bgo live\b"] },
    TaxonomyRule { label: "rust", pattern: r"\brust\b", exclusions: &[] },
    TaxonomyRule { label: "c++", pattern: r"\bc\+\+", exclusions: &[] },
    TaxonomyRule { label: "c#", pattern: r"\bc#|\.net\b|\bdotnet\b", exclusions: &[] },
    TaxonomyRule { label: "ruby", pattern: r"\bruby\b", exclusions: &[] },
    TaxonomyRule { label: "php", pattern: r"\bphp\b", exclusions: &[] },
    TaxonomyRule { label: "scala", pattern: r"\bscala\b", exclusions: &[r"\bscalab\w+"] },
    TaxonomyRule { label: "elixir", pattern: r"\belixir\b", exclusions: &[] },
    TaxonomyRule { label: "react", pattern: r"\breact(\.?js)?\b", exclusions: &[r"\breact native\b"] },
    TaxonomyRule { label: "react-native", pattern: r"\breact native\b", exclusions: &[] },
    TaxonomyRule { label: "next.js", pattern: r"\bnext\.?js\b", exclusions: &[] },
    TaxonomyRule { label: "vue", pattern: r"\bvue(\.?js)?\b", exclusions: &[] },
    TaxonomyRule { label: "nuxt", pattern: r"\bnuxt(\.?js)?\b", exclusions: &[] },
    TaxonomyRule { label: "angular", pattern: r"\bangular(js)?\b", exclusions: &[] },
    TaxonomyRule { label: "svelte", pattern: r"\bsvelte(kit)?\b", exclusions: &[] },
    TaxonomyRule { label: "node.js", pattern: r"\bnode(\.?js)?\b", exclusions: &[] },
    TaxonomyRule { label: "deno", pattern: r"\bdeno\b", exclusions: &[] },
    TaxonomyRule { label: "django", pattern: r"\bdjango\b", exclusions: &[] },
    TaxonomyRule { label: "flask", pattern: r"\bflask\b", exclusions: &[] },
    TaxonomyRule { label: "fastapi", pattern: r"\bfastapi\b", exclusions: &[] },
    TaxonomyRule { label: "rails", pattern: r"\b(ruby on rails|rails)\b", exclusions: &[] },
    TaxonomyRule { label: "laravel", pattern: r"\blaravel\b", exclusions: &[] },
    TaxonomyRule { label: "spring", pattern: r"\bspring( boot)?\b", exclusions: &[] },
    TaxonomyRule { label: "graphql", pattern: r"\bgraphql\b", exclusions: &[] },
    TaxonomyRule { label: "rest", pattern: r"\brest(ful)? apis?\b", exclusions: &[] },
    TaxonomyRule { label: "grpc", pattern: r"\bgrpc\b", exclusions: &[] },
    TaxonomyRule { label: "postgresql", pattern: r"\bpostgres(ql)?\b", exclusions: &[] },
    TaxonomyRule { label: "mysql", pattern: r"\bmysql\b", exclusions: &[] },
    TaxonomyRule { label: "mariadb", pattern: r"\bmariadb\b", exclusions: &[] },
    TaxonomyRule { label: "sqlite", pattern: r"\bsqlite\b", exclusions: &[] },
    TaxonomyRule { label: "mongodb", pattern: r"\bmongo(db)?\b", exclusions: &[] },
    TaxonomyRule { label: "redis", pattern: r"\bredis\b", exclusions: &[] },
    TaxonomyRule { label: "elasticsearch", pattern: r"\belastic(search)?\b", exclusions: &[] },
    TaxonomyRule { label: "kafka", pattern: r"\bkafka\b", exclusions: &[] },
    TaxonomyRule { label: "rabbitmq", pattern: r"\brabbitmq\b", exclusions: &[] },
    TaxonomyRule { label: "clickhouse", pattern: r"\bclickhouse\b", exclusions: &[] },
    TaxonomyRule { label: "snowflake", pattern: r"\bsnowflake\b", exclusions: &[] },
    TaxonomyRule { label: "bigquery", pattern: r"\bbigquery\b", exclusions: &[] },
    TaxonomyRule { label: "dbt", pattern: r"\bdbt\b", exclusions: &[] },
    TaxonomyRule { label: "spark", pattern: r"\b(apache )?spark\b", exclusions: &[] },
    TaxonomyRule { label: "airflow", pattern: r"\bairflow\b", exclusions: &[] },
    TaxonomyRule { label: "aws", pattern: r"\b(aws|amazon web services)\b", exclusions: &[] },
    TaxonomyRule { label: "gcp", pattern: r"\b(gcp|google cloud)\b", exclusions: &[] },
    TaxonomyRule { label: "azure", pattern: r"\bazure\b", exclusions: &[] },
    TaxonomyRule { label: "kubernetes", pattern: r"\b(kubernetes|k8s)\b", exclusions: &[] },
    TaxonomyRule { label: "docker", pattern: r"\bdocker\b", exclusions: &[] },
    TaxonomyRule { label: "terraform", pattern: r"\bterraform\b", exclusions: &[] },
    TaxonomyRule { label: "ansible", pattern: r"\bansible\b", exclusions: &[] },
    TaxonomyRule { label: "ci/cd", pattern: r"\b(ci/cd|continuous integration|github actions|gitlab ci|jenkins)\b", exclusions: &[] },
    TaxonomyRule { label: "linux", pattern: r"\blinux\b", exclusions: &[] },
    TaxonomyRule { label: "git", pattern: r"\bgit\b", exclusions: &[r"\bgithub\b", r"\bgitlab\b"] },
    TaxonomyRule { label: "figma", pattern: r"\bfigma\b", exclusions: &[] },
    TaxonomyRule { label: "tableau", pattern: r"\btableau\b", exclusions: &[] },
    TaxonomyRule { label: "power-bi", pattern: r"\bpower ?bi\b", exclusions: &[] },
    TaxonomyRule { label: "salesforce", pattern: r"\bsalesforce\b", exclusions: &[] },
    TaxonomyRule { label: "hubspot", pattern: r"\bhubspot\b", exclusions: &[] },
    TaxonomyRule { label: "shopify", pattern: r"\bshopify\b", exclusions: &[] },
    TaxonomyRule { label: "wordpress", pattern: r"\bwordpress\b", exclusions: &[] },
    TaxonomyRule { label: "pytorch", pattern: r"\bpytorch\b", exclusions: &[] },
    TaxonomyRule { label: "tensorflow", pattern: r"\btensorflow\b", exclusions: &[] },
    TaxonomyRule { label: "pandas", pattern: r"\bpandas\b", exclusions: &[] },
    TaxonomyRule { label: "numpy", pattern: r"\bnumpy\b", exclusions: &[] },
    TaxonomyRule { label: "sql", pattern: r"\bsql\b", exclusions: &[r"\b(my|postgre)sql\b", r"\bsql server\b", r"\bnosql\b"] },
    TaxonomyRule { label: "sql-server", pattern: r"\bsql server\b", exclusions: &[] },
    TaxonomyRule { label: "flutter", pattern: r"\bflutter\b", exclusions: &[] },
    TaxonomyRule { label: "android", pattern: r"\bandroid\b", exclusions: &[] },
    TaxonomyRule { label: "ios", pattern: r"\bios\b", exclusions: &[] },
];

/// Soft and functional skills, normalized to slugs.
const SKILL_RULES: &[TaxonomyRule] = &[
    TaxonomyRule { label: "seo", pattern: r"\b(seo|search engine optimi[sz]ation)\b", exclusions: &[] },
    TaxonomyRule { label: "sea", pattern: r"\b(sea|google ads|paid search)\b", exclusions: &[r"\bsea\w+"] },
    TaxonomyRule { label: "product-management", pattern: r"\bproduct (management|owner|manager)\b", exclusions: &[] },
    TaxonomyRule { label: "project-management", pattern: r"\bproject (management|manager)\b", exclusions: &[] },
    TaxonomyRule { label: "agile", pattern: r"\bagile\b", exclusions: &[] },
    TaxonomyRule { label: "scrum", pattern: r"\bscrum\b", exclusions: &[] },
    TaxonomyRule { label: "kanban", pattern: r"\bkanban\b", exclusions: &[] },
    TaxonomyRule { label: "leadership", pattern: r"\b(leadership|people management|team lead)\b", exclusions: &[] },
    TaxonomyRule { label: "stakeholder-management", pattern: r"\bstakeholder(s| management)?\b", exclusions: &[] },
    TaxonomyRule { label: "communication", pattern: r"\bcommunication( skills)?\b", exclusions: &[] },
    TaxonomyRule { label: "data-analysis", pattern: r"\bdata anal(ysis|ytics|yst)\b", exclusions: &[] },
    TaxonomyRule { label: "copywriting", pattern: r"\bcopywrit(ing|er)\b", exclusions: &[] },
    TaxonomyRule { label: "content-marketing", pattern: r"\bcontent (marketing|strategy)\b", exclusions: &[] },
    TaxonomyRule { label: "customer-success", pattern: r"\bcustomer (success|support|service)\b", exclusions: &[] },
    TaxonomyRule { label: "sales", pattern: r"\b(sales|business development)\b", exclusions: &[r"\bsalesforce\b"] },
    TaxonomyRule { label: "account-management", pattern: r"\baccount manage(ment|r)\b", exclusions: &[] },
    TaxonomyRule { label: "recruiting", pattern: r"\b(recruiting|recruitment|talent acquisition)\b", exclusions: &[] },
    TaxonomyRule { label: "ux-design", pattern: r"\b(ux|user experience)\b", exclusions: &[] },
    TaxonomyRule { label: "ui-design", pattern: r"\b(ui|user interface)\b", exclusions: &[] },
    TaxonomyRule { label: "negotiation", pattern: r"\bnegotiation\b", exclusions: &[] },
    TaxonomyRule { label: "public-speaking", pattern: r"\bpublic speaking\b", exclusions: &[] },
];

pub static INDUSTRIES: LazyLock<Vec<CompiledRule>> = LazyLock::new(|| compile(INDUSTRY_RULES));
pub static TECHNOLOGIES: LazyLock<Vec<CompiledRule>> = LazyLock::new(|| compile(TECHNOLOGY_RULES));
pub static SKILLS: LazyLock<Vec<CompiledRule>> = LazyLock::new(|| compile(SKILL_RULES));

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_vocabularies_compile() {
        assert!(!INDUSTRIES.is_empty());
        assert!(TECHNOLOGIES.len() >= 70);
        assert!(!SKILLS.is_empty());
    }

    #[test]
    fn test_technician_does_not_match_tech() {
        let labels = match_rules(&INDUSTRIES, "lab technician wanted");
        assert!(!labels.contains(&"tech".to_string()));
    }

    #[test]
    fn test_social_media_is_marketing_not_media() {
        let labels = match_rules(&INDUSTRIES, "own our social media channels");
        assert!(labels.contains(&"marketing".to_string()));
        assert!(!labels.contains(&"media".to_string()));
    }

    #[test]
    fn test_synonyms_normalize_to_canonical() {
        let labels = match_rules(&TECHNOLOGIES, "we run k8s and postgres, ui in nextjs");
        assert!(labels.contains(&"kubernetes".to_string()));
        assert!(labels.contains(&"postgresql".to_string()));
        assert!(labels.contains(&"next.js".to_string()));
    }

    #[test]
    fn test_javascript_not_inferred_from_framework_suffix() {
        let labels = match_rules(&TECHNOLOGIES, "experience with next.js required");
        assert!(!labels.contains(&"javascript".to_string()));
    }

    #[test]
    fn test_sql_excluded_when_only_dialect_named() {
        let labels = match_rules(&TECHNOLOGIES, "deep postgresql knowledge");
        assert!(labels.contains(&"postgresql".to_string()));
        assert!(!labels.contains(&"sql".to_string()));
    }

    #[test]
    fn test_labels_are_deduplicated() {
        let labels = match_rules(&TECHNOLOGIES, "rust rust rust");
        assert_eq!(labels.iter().filter(|l| *l == "rust").count(), 1);
    }

    #[test]
    fn test_skill_slugs() {
        let labels = match_rules(&SKILLS, "seo and product management in a scrum team");
        assert!(labels.contains(&"seo".to_string()));
        assert!(labels.contains(&"product-management".to_string()));
        assert!(labels.contains(&"scrum".to_string()));
    }
}
