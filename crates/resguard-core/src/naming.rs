//! Resource naming: singular/plural forms of snake_case resource names.
//!
//! Only the final `_`-separated word is inflected, so `line_item` becomes
//! `line_items` and `order_statuses` becomes `order_status`.

/// Words whose singular and plural forms are identical.
const UNCOUNTABLE: &[&str] = &[
    "equipment", "information", "rice", "money", "species", "series", "fish", "sheep", "news",
    "metadata", "data",
];

/// (singular, plural)
const IRREGULAR: &[(&str, &str)] = &[
    ("person", "people"),
    ("man", "men"),
    ("woman", "women"),
    ("child", "children"),
    ("mouse", "mice"),
    ("tooth", "teeth"),
    ("foot", "feet"),
    ("goose", "geese"),
    ("ox", "oxen"),
    ("quiz", "quizzes"),
];

/// Singulars ending in `-s` that pluralize with `-es` (`status` -> `statuses`).
/// Any other `-ses` plural is `-se` + `s` (`warehouses`, `causes`).
const SIBILANT_SINGULARS: &[&str] = &[
    "status", "bus", "omnibus", "virus", "census", "consensus", "campus", "bonus", "focus",
    "nexus", "genus", "radius", "genius", "nucleus", "apparatus", "prospectus", "syllabus",
    "cactus", "corpus", "circus", "chorus", "surplus", "plus", "minus", "sinus", "walrus",
    "octopus", "abacus", "fungus", "stimulus", "terminus", "lotus", "hiatus", "alias", "atlas",
    "canvas", "gas", "bias",
];

/// Singulars ending in `-che`; other `-ches` plurals drop `es` (`batches`).
const CHE_SINGULARS: &[&str] = &[
    "cache", "niche", "ache", "headache", "avalanche", "moustache", "mustache", "cliche",
    "creche", "psyche", "quiche", "panache",
];

/// Singulars ending in `-ie`; other `-ies` plurals come from `-y`.
const IE_SINGULARS: &[&str] = &[
    "movie", "cookie", "pie", "tie", "lie", "zombie", "rookie", "calorie", "selfie", "goalie",
    "hoodie", "brownie", "genie", "prairie", "smoothie",
];

/// Derive the variable/association name for `base`: plural when the value is a
/// collection, singular otherwise.
pub fn inflect(base: &str, is_collection: bool) -> String {
    if is_collection {
        pluralize(base)
    } else {
        singularize(base)
    }
}

pub fn pluralize(name: &str) -> String {
    map_last_word(name, pluralize_word)
}

pub fn singularize(name: &str) -> String {
    map_last_word(name, singularize_word)
}

/// `invoice` -> `Invoice`, `line_item` -> `Line item` (used in not-found messages).
pub fn humanize(name: &str) -> String {
    let spaced = name.replace('_', " ");
    let mut chars = spaced.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn map_last_word(name: &str, f: fn(&str) -> String) -> String {
    match name.rsplit_once('_') {
        Some((head, last)) if !last.is_empty() => format!("{head}_{}", f(last)),
        _ => f(name),
    }
}

fn pluralize_word(word: &str) -> String {
    let lower = word.to_ascii_lowercase();
    if word.is_empty() || UNCOUNTABLE.contains(&lower.as_str()) {
        return word.to_string();
    }
    for (singular, plural) in IRREGULAR {
        if lower == *singular || lower == *plural {
            return plural.to_string();
        }
    }
    if ends_with_any(&lower, &["s", "x", "z", "ch", "sh"]) {
        return format!("{word}es");
    }
    if let Some(stem) = lower.strip_suffix('y') {
        if !ends_with_vowel(stem) {
            return format!("{}ies", &word[..stem.len()]);
        }
    }
    format!("{word}s")
}

fn singularize_word(word: &str) -> String {
    let lower = word.to_ascii_lowercase();
    if word.is_empty() || UNCOUNTABLE.contains(&lower.as_str()) {
        return word.to_string();
    }
    for (singular, plural) in IRREGULAR {
        if lower == *plural || lower == *singular {
            return singular.to_string();
        }
    }
    let strip = |n: usize| word[..word.len() - n].to_string();

    if let Some(stem) = lower.strip_suffix("ies") {
        if IE_SINGULARS.contains(&&lower[..lower.len() - 1]) {
            return strip(1);
        }
        if !stem.is_empty() {
            return format!("{}y", &word[..stem.len()]);
        }
    }

    if let Some(base) = lower.strip_suffix("es") {
        if ends_with_any(base, &["ss", "sh", "x", "zz", "tz"]) {
            return strip(2);
        }
        if base.ends_with("ch") {
            // cache -> caches, but batch -> batches
            return if CHE_SINGULARS.contains(&&lower[..lower.len() - 1]) {
                strip(1)
            } else {
                strip(2)
            };
        }
        if SIBILANT_SINGULARS.contains(&base) {
            return strip(2);
        }
    }

    if ends_with_any(&lower, &["ss", "is"]) || SIBILANT_SINGULARS.contains(&lower.as_str()) {
        return word.to_string();
    }
    if let Some(stem) = lower.strip_suffix("us") {
        // nucleus, genius, gorgeous stay; menus -> menu
        if ends_with_vowel(stem) {
            return word.to_string();
        }
    }
    match lower.strip_suffix('s') {
        Some(stem) if !stem.is_empty() => word[..stem.len()].to_string(),
        _ => word.to_string(),
    }
}

fn ends_with_any(word: &str, suffixes: &[&str]) -> bool {
    suffixes.iter().any(|s| word.ends_with(s))
}

fn ends_with_vowel(word: &str) -> bool {
    matches!(word.chars().last(), Some('a' | 'e' | 'i' | 'o' | 'u'))
}
