use std::collections::HashMap;

/// One African country the map can display, keyed by its ISO 3166 codes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Territory {
    /// English name, also the canonical name used in prompts and selection.
    pub name: String,
    /// German display name.
    pub german_name: String,
    /// ISO 3166-1 alpha-2 code.
    pub iso_a2: String,
    /// ISO 3166-1 alpha-3 code.
    pub iso_a3: String,
    /// Alternative spellings found in geography datasets.
    pub aliases: Vec<String>,
    /// Name used during the colonial era, given to the model as a hint.
    pub colonial_name: Option<String>,
    /// Whether the territory was British-administered.
    pub british: bool,
}

impl Territory {
    fn spellings(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.name.as_str()).chain(self.aliases.iter().map(String::as_str))
    }

    pub fn has_code(&self, code: &str) -> bool {
        let code = code.trim();
        self.iso_a2.eq_ignore_ascii_case(code) || self.iso_a3.eq_ignore_ascii_case(code)
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TerritoryError {
    #[error("territory table must not be empty")]
    Empty,
    #[error("ISO code {code} is used by both {first} and {second}")]
    DuplicateCode {
        code: String,
        first: String,
        second: String,
    },
    #[error("name {name} is used by both {first} and {second}")]
    DuplicateName {
        name: String,
        first: String,
        second: String,
    },
    #[error("feature name {feature} matches several territories: {}", .candidates.join(", "))]
    AmbiguousName {
        feature: String,
        candidates: Vec<String>,
    },
}

/// Validated lookup table from ISO codes and spellings to territories.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TerritoryTable {
    entries: Vec<Territory>,
}

impl TerritoryTable {
    /// Builds a table, rejecting duplicate codes and spellings.
    pub fn new(entries: Vec<Territory>) -> Result<Self, TerritoryError> {
        if entries.is_empty() {
            return Err(TerritoryError::Empty);
        }

        let mut codes: HashMap<String, &str> = HashMap::new();
        let mut names: HashMap<String, &str> = HashMap::new();

        for entry in &entries {
            for code in [&entry.iso_a2, &entry.iso_a3] {
                if let Some(first) = codes.insert(code.to_ascii_uppercase(), &entry.name) {
                    return Err(TerritoryError::DuplicateCode {
                        code: code.clone(),
                        first: first.to_string(),
                        second: entry.name.clone(),
                    });
                }
            }

            for spelling in entry.spellings() {
                if let Some(first) = names.insert(normalize(spelling), &entry.name) {
                    return Err(TerritoryError::DuplicateName {
                        name: spelling.to_string(),
                        first: first.to_string(),
                        second: entry.name.clone(),
                    });
                }
            }
        }

        Ok(Self { entries })
    }

    /// The built-in table of African countries.
    pub fn africa() -> Self {
        Self {
            entries: africa_entries(),
        }
    }

    pub fn entries(&self) -> &[Territory] {
        &self.entries
    }

    /// Formerly British-administered territories in their fixed order.
    pub fn british_colonies(&self) -> impl Iterator<Item = &Territory> {
        self.entries.iter().filter(|entry| entry.british)
    }

    /// Canonical names of the British colonies, used to seed highlighting.
    pub fn colony_names(&self) -> Vec<&str> {
        self.british_colonies()
            .map(|entry| entry.name.as_str())
            .collect()
    }

    pub fn by_code(&self, code: &str) -> Option<&Territory> {
        self.entries.iter().find(|entry| entry.has_code(code))
    }

    /// Exact lookup by canonical name or alias, ignoring case.
    pub fn by_name(&self, name: &str) -> Option<&Territory> {
        let key = normalize(name);
        self.entries
            .iter()
            .find(|entry| entry.spellings().any(|spelling| normalize(spelling) == key))
    }

    /// Resolves a geography feature to a territory.
    ///
    /// ISO codes win over names. Names are matched exactly first, then by
    /// whole-word containment ("Republic of Ghana" → Ghana). A containment
    /// match that is part of a longer match is dropped, so "Republic of South
    /// Sudan" resolves to South Sudan. Several remaining candidates are
    /// reported as [`TerritoryError::AmbiguousName`].
    pub fn resolve(&self, name: &str, codes: &[&str]) -> Result<Option<&Territory>, TerritoryError> {
        if let Some(entry) = codes.iter().find_map(|code| self.by_code(code)) {
            return Ok(Some(entry));
        }

        self.resolve_name(name)
    }

    pub fn resolve_name(&self, name: &str) -> Result<Option<&Territory>, TerritoryError> {
        if let Some(entry) = self.by_name(name) {
            return Ok(Some(entry));
        }

        let feature_words = words(name);
        if feature_words.is_empty() {
            return Ok(None);
        }

        let mut candidates: Vec<(&Territory, Vec<String>)> = Vec::new();
        for entry in &self.entries {
            let longest = entry
                .spellings()
                .map(words)
                .filter(|phrase| contains_phrase(&feature_words, phrase))
                .max_by_key(Vec::len);

            if let Some(phrase) = longest {
                candidates.push((entry, phrase));
            }
        }

        let survivors: Vec<&Territory> = candidates
            .iter()
            .filter(|(entry, phrase)| {
                !candidates.iter().any(|(other, other_phrase)| {
                    other.name != entry.name
                        && other_phrase.len() > phrase.len()
                        && contains_phrase(other_phrase, phrase)
                })
            })
            .map(|(entry, _)| *entry)
            .collect();

        match survivors.as_slice() {
            [] => Ok(None),
            [single] => Ok(Some(*single)),
            several => Err(TerritoryError::AmbiguousName {
                feature: name.to_string(),
                candidates: several.iter().map(|entry| entry.name.clone()).collect(),
            }),
        }
    }

    /// Returns the British colony a feature belongs to, or `None` for other
    /// territories and unresolvable names.
    pub fn colony_for(&self, name: &str, codes: &[&str]) -> Result<Option<&Territory>, TerritoryError> {
        Ok(self.resolve(name, codes)?.filter(|entry| entry.british))
    }

    /// German label for a feature name, falling back to the name itself.
    pub fn german_name(&self, name: &str) -> String {
        match self.resolve_name(name) {
            Ok(Some(entry)) => entry.german_name.clone(),
            _ => name.to_string(),
        }
    }

    /// Colonial-era name of a modern country, if it had a different one.
    pub fn colonial_hint(&self, modern_name: &str) -> Option<&str> {
        self.by_name(modern_name)
            .and_then(|entry| entry.colonial_name.as_deref())
    }
}

impl Default for TerritoryTable {
    fn default() -> Self {
        Self::africa()
    }
}

fn normalize(value: &str) -> String {
    words(value).join(" ")
}

fn words(value: &str) -> Vec<String> {
    value
        .split(|c: char| !c.is_alphanumeric())
        .filter(|word| !word.is_empty())
        .map(str::to_lowercase)
        .collect()
}

fn contains_phrase(haystack: &[String], phrase: &[String]) -> bool {
    !phrase.is_empty()
        && phrase.len() <= haystack.len()
        && haystack.windows(phrase.len()).any(|window| window == phrase)
}

struct Row {
    name: &'static str,
    german_name: &'static str,
    iso_a2: &'static str,
    iso_a3: &'static str,
    british: bool,
    colonial_name: Option<&'static str>,
    aliases: &'static [&'static str],
}

const fn colony(
    name: &'static str,
    german_name: &'static str,
    iso_a2: &'static str,
    iso_a3: &'static str,
    colonial_name: Option<&'static str>,
    aliases: &'static [&'static str],
) -> Row {
    Row {
        name,
        german_name,
        iso_a2,
        iso_a3,
        british: true,
        colonial_name,
        aliases,
    }
}

const fn other(
    name: &'static str,
    german_name: &'static str,
    iso_a2: &'static str,
    iso_a3: &'static str,
    aliases: &'static [&'static str],
) -> Row {
    Row {
        name,
        german_name,
        iso_a2,
        iso_a3,
        british: false,
        colonial_name: None,
        aliases,
    }
}

const AFRICA: &[Row] = &[
    colony("Egypt", "Ägypten", "EG", "EGY", None, &[]),
    colony("Sudan", "Sudan", "SD", "SDN", None, &[]),
    colony("South Sudan", "Südsudan", "SS", "SSD", None, &["S. Sudan"]),
    colony("Kenya", "Kenia", "KE", "KEN", None, &[]),
    colony("Uganda", "Uganda", "UG", "UGA", None, &[]),
    colony(
        "Tanzania",
        "Tansania",
        "TZ",
        "TZA",
        Some("Tanganjika/Sansibar"),
        &["United Republic of Tanzania"],
    ),
    colony("South Africa", "Südafrika", "ZA", "ZAF", None, &[]),
    colony("Lesotho", "Lesotho", "LS", "LSO", Some("Basutoland"), &[]),
    colony(
        "Eswatini",
        "Eswatini",
        "SZ",
        "SWZ",
        Some("Swasiland"),
        &["Swaziland", "Kingdom of eSwatini"],
    ),
    colony("Botswana", "Botswana", "BW", "BWA", Some("Betschuanaland"), &[]),
    colony("Zimbabwe", "Simbabwe", "ZW", "ZWE", Some("Südrhodesien"), &[]),
    colony("Zambia", "Sambia", "ZM", "ZMB", Some("Nordrhodesien"), &[]),
    colony("Malawi", "Malawi", "MW", "MWI", Some("Njassaland"), &[]),
    colony("Nigeria", "Nigeria", "NG", "NGA", None, &[]),
    colony("Ghana", "Ghana", "GH", "GHA", Some("Goldküste"), &[]),
    colony("Sierra Leone", "Sierra Leone", "SL", "SLE", None, &[]),
    colony("Gambia", "Gambia", "GM", "GMB", None, &["The Gambia"]),
    colony(
        "Somalia",
        "Somalia",
        "SO",
        "SOM",
        Some("Britisch-Somaliland"),
        &[],
    ),
    colony("Seychelles", "Seychellen", "SC", "SYC", None, &[]),
    colony("Mauritius", "Mauritius", "MU", "MUS", None, &[]),
    other("Ethiopia", "Äthiopien", "ET", "ETH", &[]),
    other("Eritrea", "Eritrea", "ER", "ERI", &[]),
    other("Djibouti", "Dschibuti", "DJ", "DJI", &[]),
    other(
        "Central African Republic",
        "Zentralafrikanische Republik",
        "CF",
        "CAF",
        &["Central African Rep."],
    ),
    other("Chad", "Tschad", "TD", "TCD", &[]),
    other("Niger", "Niger", "NE", "NER", &[]),
    other("Cameroon", "Kamerun", "CM", "CMR", &[]),
    other("Libya", "Libyen", "LY", "LBY", &[]),
    other("Algeria", "Algerien", "DZ", "DZA", &[]),
    other("Morocco", "Marokko", "MA", "MAR", &[]),
    other("Tunisia", "Tunesien", "TN", "TUN", &[]),
    other("Western Sahara", "Westsahara", "EH", "ESH", &["W. Sahara"]),
    other("Mauritania", "Mauretanien", "MR", "MRT", &[]),
    other("Mali", "Mali", "ML", "MLI", &[]),
    other("Senegal", "Senegal", "SN", "SEN", &[]),
    other("Guinea", "Guinea", "GN", "GIN", &[]),
    other("Guinea-Bissau", "Guinea-Bissau", "GW", "GNB", &[]),
    other("Liberia", "Liberia", "LR", "LBR", &[]),
    other(
        "Ivory Coast",
        "Elfenbeinküste",
        "CI",
        "CIV",
        &["Côte d'Ivoire", "Cote d'Ivoire"],
    ),
    other("Burkina Faso", "Burkina Faso", "BF", "BFA", &[]),
    other("Benin", "Benin", "BJ", "BEN", &[]),
    other("Togo", "Togo", "TG", "TGO", &[]),
    other("Gabon", "Gabun", "GA", "GAB", &[]),
    other(
        "Republic of Congo",
        "Republik Kongo",
        "CG",
        "COG",
        &["Republic of the Congo", "Congo-Brazzaville"],
    ),
    other(
        "Democratic Republic of the Congo",
        "Demokratische Republik Kongo",
        "CD",
        "COD",
        &["Dem. Rep. Congo", "Democratic Republic of Congo", "Congo-Kinshasa"],
    ),
    other("Angola", "Angola", "AO", "AGO", &[]),
    other("Namibia", "Namibia", "NA", "NAM", &[]),
    other("Mozambique", "Mosambik", "MZ", "MOZ", &[]),
    other("Madagascar", "Madagaskar", "MG", "MDG", &[]),
    other("Rwanda", "Ruanda", "RW", "RWA", &[]),
    other("Burundi", "Burundi", "BI", "BDI", &[]),
    other("Equatorial Guinea", "Äquatorialguinea", "GQ", "GNQ", &["Eq. Guinea"]),
];

fn africa_entries() -> Vec<Territory> {
    AFRICA
        .iter()
        .map(|row| Territory {
            name: row.name.to_string(),
            german_name: row.german_name.to_string(),
            iso_a2: row.iso_a2.to_string(),
            iso_a3: row.iso_a3.to_string(),
            aliases: row.aliases.iter().map(|alias| alias.to_string()).collect(),
            colonial_name: row.colonial_name.map(str::to_string),
            british: row.british,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn territory(name: &str, iso_a2: &str, iso_a3: &str) -> Territory {
        Territory {
            name: name.to_string(),
            german_name: name.to_string(),
            iso_a2: iso_a2.to_string(),
            iso_a3: iso_a3.to_string(),
            aliases: Vec::new(),
            colonial_name: None,
            british: true,
        }
    }

    #[test]
    fn builtin_table_passes_validation() {
        let table = TerritoryTable::new(africa_entries()).expect("built-in table should be valid");
        assert_eq!(table, TerritoryTable::africa());
    }

    #[test]
    fn colony_list_is_fixed_and_unique() {
        let table = TerritoryTable::africa();
        let names = table.colony_names();

        assert_eq!(names.len(), 20);
        let unique: std::collections::HashSet<_> = names.iter().collect();
        assert_eq!(unique.len(), names.len());
        assert_eq!(names[0], "Egypt");
        assert_eq!(names[19], "Mauritius");
    }

    #[test]
    fn rejects_duplicate_codes() {
        let error = TerritoryTable::new(vec![
            territory("Ghana", "GH", "GHA"),
            territory("Gold Coast", "GH", "GCO"),
        ])
        .expect_err("duplicate code should be rejected");

        assert_eq!(
            error,
            TerritoryError::DuplicateCode {
                code: "GH".to_string(),
                first: "Ghana".to_string(),
                second: "Gold Coast".to_string(),
            }
        );
    }

    #[test]
    fn rejects_duplicate_spellings() {
        let mut second = territory("Congo", "CD", "COD");
        second.aliases.push("congo".to_string());

        let error = TerritoryTable::new(vec![territory("Congo", "CG", "COG"), second])
            .expect_err("duplicate name should be rejected");

        assert!(matches!(error, TerritoryError::DuplicateName { .. }));
    }

    #[test]
    fn rejects_empty_table() {
        assert_eq!(TerritoryTable::new(Vec::new()), Err(TerritoryError::Empty));
    }

    #[test]
    fn resolves_by_iso_code_before_name() {
        let table = TerritoryTable::africa();
        let entry = table
            .resolve("Gold Coast Colony", &["GH"])
            .expect("code lookup cannot be ambiguous")
            .expect("code should resolve");

        assert_eq!(entry.name, "Ghana");
    }

    #[test]
    fn resolves_aliases_exactly() {
        let table = TerritoryTable::africa();

        let swaziland = table.resolve_name("Swaziland").unwrap().unwrap();
        assert_eq!(swaziland.name, "Eswatini");

        let tanzania = table
            .resolve_name("United Republic of Tanzania")
            .unwrap()
            .unwrap();
        assert_eq!(tanzania.name, "Tanzania");
    }

    #[test]
    fn resolves_containing_names_by_whole_word() {
        let table = TerritoryTable::africa();
        let entry = table.resolve_name("Republic of Ghana").unwrap().unwrap();

        assert_eq!(entry.name, "Ghana");
    }

    #[test]
    fn longer_match_subsumes_shorter_one() {
        let table = TerritoryTable::africa();
        let entry = table
            .resolve_name("Republic of South Sudan")
            .unwrap()
            .unwrap();

        assert_eq!(entry.name, "South Sudan");
    }

    #[test]
    fn exact_match_wins_over_containment() {
        let table = TerritoryTable::africa();

        assert_eq!(table.resolve_name("Guinea-Bissau").unwrap().unwrap().name, "Guinea-Bissau");
        assert_eq!(table.resolve_name("Niger").unwrap().unwrap().name, "Niger");
        assert_eq!(table.resolve_name("Nigeria").unwrap().unwrap().name, "Nigeria");
    }

    #[test]
    fn congo_variants_do_not_collide() {
        let table = TerritoryTable::africa();

        assert_eq!(
            table.resolve_name("Dem. Rep. Congo").unwrap().unwrap().name,
            "Democratic Republic of the Congo"
        );
        assert_eq!(
            table
                .resolve_name("Democratic Republic of the Congo")
                .unwrap()
                .unwrap()
                .name,
            "Democratic Republic of the Congo"
        );
        assert_eq!(
            table.resolve_name("Republic of Congo").unwrap().unwrap().name,
            "Republic of Congo"
        );
    }

    #[test]
    fn reports_ambiguous_names() {
        let table = TerritoryTable::africa();
        let error = table
            .resolve_name("Kenya Uganda Railway Zone")
            .expect_err("two territories match");

        assert_eq!(
            error,
            TerritoryError::AmbiguousName {
                feature: "Kenya Uganda Railway Zone".to_string(),
                candidates: vec!["Kenya".to_string(), "Uganda".to_string()],
            }
        );
    }

    #[test]
    fn substring_inside_a_word_does_not_match() {
        let table = TerritoryTable::africa();
        assert_eq!(table.resolve_name("Nigerian Delta").unwrap(), None);
    }

    #[test]
    fn colony_for_filters_non_british() {
        let table = TerritoryTable::africa();

        assert!(table.colony_for("Ethiopia", &[]).unwrap().is_none());
        assert_eq!(table.colony_for("Kenya", &[]).unwrap().unwrap().name, "Kenya");
    }

    #[test]
    fn german_names_fall_back_to_feature_name() {
        let table = TerritoryTable::africa();

        assert_eq!(table.german_name("Equatorial Guinea"), "Äquatorialguinea");
        assert_eq!(table.german_name("Guinea"), "Guinea");
        assert_eq!(table.german_name("Atlantis"), "Atlantis");
    }

    #[test]
    fn colonial_hints_follow_modern_names() {
        let table = TerritoryTable::africa();

        assert_eq!(table.colonial_hint("Zimbabwe"), Some("Südrhodesien"));
        assert_eq!(table.colonial_hint("Kenya"), None);
        assert_eq!(table.colonial_hint("Atlantis"), None);
    }
}
