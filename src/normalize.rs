const LEGAL_SUFFIXES: &[&str] = &[
    "pvt",
    "private",
    "ltd",
    "limited",
    "inc",
    "incorporated",
    "llc",
    "llp",
    "plc",
    "corp",
    "corporation",
    "company",
    "co",
    "gmbh",
    "pte",
];

const INDUSTRY_WORDS: &[&str] = &[
    "technologies",
    "technology",
    "tech",
    "solutions",
    "services",
    "service",
    "systems",
    "software",
    "group",
    "consulting",
    "infotech",
    "global",
    "international",
    "enterprises",
    "industries",
];

const PLACE_NAMES: &[&str] = &[
    "india",
    "usa",
    "uk",
    "chennai",
    "bangalore",
    "bengaluru",
    "hyderabad",
    "mumbai",
    "pune",
    "delhi",
    "noida",
    "gurgaon",
    "gurugram",
    "kolkata",
    "coimbatore",
    "madurai",
    "trichy",
    "kochi",
    "tamilnadu",
    "tamil",
    "nadu",
    "karnataka",
    "kerala",
];

const CONJUNCTIONS: &[&str] = &["and", "the", "of", "&"];

fn is_stop_word(token: &str) -> bool {
    LEGAL_SUFFIXES.contains(&token)
        || INDUSTRY_WORDS.contains(&token)
        || PLACE_NAMES.contains(&token)
        || CONJUNCTIONS.contains(&token)
}

fn is_acronym_noise(token: &str) -> bool {
    LEGAL_SUFFIXES.contains(&token) || PLACE_NAMES.contains(&token) || CONJUNCTIONS.contains(&token)
}

pub fn tokens(raw: &str) -> Vec<String> {
    let cleaned: String = raw
        .trim()
        .to_lowercase()
        .chars()
        .map(|ch| if ch.is_alphanumeric() { ch } else { ' ' })
        .collect();

    cleaned.split_whitespace().map(str::to_string).collect()
}

/// Returns the comparable key for `raw`, or `None` when nothing identifying
/// survives stop-word removal. Callers treat `None` as "do not cluster".
pub fn normalize(raw: &str) -> Option<String> {
    let kept: Vec<String> = tokens(raw)
        .into_iter()
        .filter(|token| !is_stop_word(token))
        .collect();

    let key = kept.join(" ");
    let key = key.trim();
    if key.is_empty() {
        None
    } else {
        Some(key.to_string())
    }
}

fn initials<'a>(tokens: impl Iterator<Item = &'a str>) -> String {
    tokens.filter_map(|token| token.chars().next()).collect()
}

/// First letter of each token of the normalised key.
pub fn acronym(raw: &str) -> String {
    normalize(raw)
        .map(|key| initials(key.split(' ')))
        .unwrap_or_default()
}

/// Like `acronym`, but industry words are kept: "Tata Consultancy Services"
/// expands to "tcs" where `acronym` gives "tc".
pub fn expanded_acronym(raw: &str) -> String {
    let tokens = tokens(raw);
    initials(
        tokens
            .iter()
            .map(String::as_str)
            .filter(|token| !is_acronym_noise(token)),
    )
}

/// Cached for group canonical names, which never change after creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedName {
    pub key: String,
    pub acronym: String,
    pub expanded_acronym: String,
}

impl NormalizedName {
    pub fn from_raw(raw: &str) -> Option<Self> {
        let key = normalize(raw)?;
        Some(Self {
            acronym: initials(key.split(' ')),
            expanded_acronym: expanded_acronym(raw),
            key,
        })
    }

    /// A single-token key such as "tcs" may itself be an acronym.
    pub fn is_single_token(&self) -> bool {
        !self.key.contains(' ')
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_suffixes_places_and_punctuation() {
        assert_eq!(normalize("Infosys Limited, Bangalore").as_deref(), Some("infosys"));
        assert_eq!(normalize("  infosys ltd ").as_deref(), Some("infosys"));
        assert_eq!(
            normalize("Tata Consultancy Services - Chennai").as_deref(),
            Some("tata consultancy")
        );
        assert_eq!(
            normalize("Tata Consultancy Services Pvt. Ltd.").as_deref(),
            Some("tata consultancy")
        );
    }

    #[test]
    fn empty_after_stop_words_is_unnormalizable() {
        assert_eq!(normalize(""), None);
        assert_eq!(normalize("   "), None);
        assert_eq!(normalize("Software Solutions Pvt Ltd"), None);
        assert_eq!(normalize("&&& -- !!"), None);
    }

    #[test]
    fn normalizing_a_key_is_stable() {
        for raw in ["Zoho Corp", "L&T Infotech", "HCL Technologies, Noida", "Wipro"] {
            let key = normalize(raw).expect("identifying tokens remain");
            assert_eq!(normalize(&key).as_deref(), Some(key.as_str()));
        }
    }

    #[test]
    fn acronym_uses_normalized_tokens() {
        assert_eq!(acronym("Tata Consultancy Services"), "tc");
        assert_eq!(acronym("Tech Mahindra"), "m");
        assert_eq!(acronym("Tata Motors Ltd"), "tm");
        assert_eq!(acronym("TCS"), "t");
        assert_eq!(acronym("Software Solutions"), "");
    }

    #[test]
    fn expanded_acronym_keeps_industry_words() {
        assert_eq!(expanded_acronym("Tata Consultancy Services"), "tcs");
        assert_eq!(expanded_acronym("Tata Consultancy Services Pvt Ltd"), "tcs");
        assert_eq!(expanded_acronym("Tech Mahindra, Pune"), "tm");
    }

    #[test]
    fn single_token_detection() {
        let name = NormalizedName::from_raw("TCS").expect("normalizes");
        assert!(name.is_single_token());
        let name = NormalizedName::from_raw("Tata Consultancy").expect("normalizes");
        assert!(!name.is_single_token());
    }
}
