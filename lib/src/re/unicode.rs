/*! Unicode classification backed by the tables in [`regex_syntax`].

The engine needs three questions answered about code points: which code
points belong to a named class like `Greek` or `Lu`, which code points are
equivalent to a given one under simple case folding, and which ones are word
characters. Every function here is total and pure.
*/

use regex_syntax::hir::{Class, ClassUnicode, ClassUnicodeRange, HirKind};
use regex_syntax::ParserBuilder;

/// General categories, by their short name. Long names like `Letter` are
/// not accepted.
const CATEGORIES: &[&str] = &[
    "C", "Cc", "Cf", "Co", "Cs", "L", "Ll", "Lm", "Lo", "Lt", "Lu", "M", "Mc",
    "Me", "Mn", "N", "Nd", "Nl", "No", "P", "Pc", "Pd", "Pe", "Pf", "Pi",
    "Po", "Ps", "S", "Sc", "Sk", "Sm", "So", "Z", "Zl", "Zp", "Zs",
];

/// Scripts, by their canonical name. Sorted, so that it can be searched with
/// a binary search.
const SCRIPTS: &[&str] = &[
    "Adlam", "Ahom", "Anatolian_Hieroglyphs", "Arabic", "Armenian", "Avestan",
    "Balinese", "Bamum", "Bassa_Vah", "Batak", "Bengali", "Bhaiksuki",
    "Bopomofo", "Brahmi", "Braille", "Buginese", "Buhid",
    "Canadian_Aboriginal", "Carian", "Caucasian_Albanian", "Chakma", "Cham",
    "Cherokee", "Chorasmian", "Common", "Coptic", "Cuneiform", "Cypriot",
    "Cypro_Minoan", "Cyrillic", "Deseret", "Devanagari", "Dives_Akuru",
    "Dogra", "Duployan", "Egyptian_Hieroglyphs", "Elbasan", "Elymaic",
    "Ethiopic", "Garay", "Georgian", "Glagolitic", "Gothic", "Grantha",
    "Greek", "Gujarati", "Gunjala_Gondi", "Gurmukhi", "Gurung_Khema", "Han",
    "Hangul", "Hanifi_Rohingya", "Hanunoo", "Hatran", "Hebrew", "Hiragana",
    "Imperial_Aramaic", "Inherited", "Inscriptional_Pahlavi",
    "Inscriptional_Parthian", "Javanese", "Kaithi", "Kannada", "Katakana",
    "Kawi", "Kayah_Li", "Kharoshthi", "Khitan_Small_Script", "Khmer",
    "Khojki", "Khudawadi", "Kirat_Rai", "Lao", "Latin", "Lepcha", "Limbu",
    "Linear_A", "Linear_B", "Lisu", "Lycian", "Lydian", "Mahajani", "Makasar",
    "Malayalam", "Mandaic", "Manichaean", "Marchen", "Masaram_Gondi",
    "Medefaidrin", "Meetei_Mayek", "Mende_Kikakui", "Meroitic_Cursive",
    "Meroitic_Hieroglyphs", "Miao", "Modi", "Mongolian", "Mro", "Multani",
    "Myanmar", "Nabataean", "Nag_Mundari", "Nandinagari", "New_Tai_Lue",
    "Newa", "Nko", "Nushu", "Nyiakeng_Puachue_Hmong", "Ogham", "Ol_Chiki",
    "Ol_Onal", "Old_Hungarian", "Old_Italic", "Old_North_Arabian",
    "Old_Permic", "Old_Persian", "Old_Sogdian", "Old_South_Arabian",
    "Old_Turkic", "Old_Uyghur", "Oriya", "Osage", "Osmanya", "Pahawh_Hmong",
    "Palmyrene", "Pau_Cin_Hau", "Phags_Pa", "Phoenician", "Psalter_Pahlavi",
    "Rejang", "Runic", "Samaritan", "Saurashtra", "Sharada", "Shavian",
    "Siddham", "SignWriting", "Sinhala", "Sogdian", "Sora_Sompeng", "Soyombo",
    "Sundanese", "Sunuwar", "Syloti_Nagri", "Syriac", "Tagalog", "Tagbanwa",
    "Tai_Le", "Tai_Tham", "Tai_Viet", "Takri", "Tamil", "Tangsa", "Tangut",
    "Telugu", "Thaana", "Thai", "Tibetan", "Tifinagh", "Tirhuta", "Todhri",
    "Toto", "Tulu_Tigalari", "Ugaritic", "Vai", "Vithkuqi", "Wancho",
    "Warang_Citi", "Yezidi", "Yi", "Zanabazar_Square",
];

/// Returns the set of code points in the Unicode class named `name`.
///
/// `name` can be `Any`, a general category given by its short name (`L`,
/// `Lu`) or a script given by its canonical name (`Greek`, `Old_Italic`).
/// Names are case-sensitive and aliases like `Letter`, `greek` or `Grek`
/// are not accepted. Returns `None` if the name is unknown.
pub fn property_class(name: &str) -> Option<ClassUnicode> {
    if name == "Any" {
        return Some(ClassUnicode::new([ClassUnicodeRange::new(
            '\0',
            char::MAX,
        )]));
    }

    match name {
        // Surrogates are not chars.
        "Cs" => return Some(ClassUnicode::empty()),
        // `C` doesn't include unassigned code points.
        "C" => {
            let mut class = ClassUnicode::empty();
            for other in ["Cc", "Cf", "Co"] {
                class.union(&lookup("gc", other)?);
            }
            return Some(class);
        }
        _ => {}
    }

    if CATEGORIES.contains(&name) {
        lookup("gc", name)
    } else if SCRIPTS.binary_search(&name).is_ok() {
        lookup("sc", name)
    } else {
        None
    }
}

/// Asks [`regex_syntax`] for the class `\p{property=value}`.
fn lookup(property: &str, value: &str) -> Option<ClassUnicode> {
    let hir = ParserBuilder::new()
        .build()
        .parse(format!(r"\p{{{}={}}}", property, value).as_str())
        .ok()?;

    match hir.into_kind() {
        HirKind::Class(Class::Unicode(class)) => Some(class),
        // Classes that contain a single code point are returned as a
        // literal.
        HirKind::Literal(lit) => {
            let c = std::str::from_utf8(&lit.0).ok()?.chars().next()?;
            Some(ClassUnicode::new([ClassUnicodeRange::new(c, c)]))
        }
        _ => None,
    }
}

/// Returns true if `c` belongs to the Unicode class named `name`.
pub fn contains(name: &str, c: char) -> bool {
    property_class(name).is_some_and(|class| {
        class.ranges().iter().any(|r| r.start() <= c && c <= r.end())
    })
}

/// Returns the simple case folding orbit of `c`: every code point that is
/// equal to `c` when case is ignored, including `c` itself.
///
/// For instance, the orbit of `k` is `K`, `k` and `K` (KELVIN SIGN).
pub fn fold_orbit(c: char) -> ClassUnicode {
    let mut class = ClassUnicode::new([ClassUnicodeRange::new(c, c)]);
    class.case_fold_simple();
    class
}

/// Returns true if `c` has other code points in its case folding orbit.
pub fn has_case_variants(c: char) -> bool {
    let orbit = fold_orbit(c);
    orbit.ranges().len() > 1
        || orbit.ranges().first().is_some_and(|r| r.start() != r.end())
}

/// Returns true if `c` is a word character according to Unicode.
#[inline]
pub fn is_word_char(c: char) -> bool {
    regex_syntax::is_word_character(c)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn property_classes() {
        assert!(contains("Greek", 'α'));
        assert!(!contains("Greek", 'a'));
        assert!(contains("Lu", 'A'));
        assert!(!contains("Lu", 'a'));
        assert!(contains("L", 'ñ'));
        assert!(contains("Nd", '٣'));
        assert!(contains("Any", '\u{10FFFF}'));
        assert!(contains("C", '\u{7F}'));
        assert!(property_class("Cs").is_some());
        assert!(!contains("C", '\u{378}'));
        assert!(contains("Old_Italic", '\u{10300}'));
        assert!(property_class("NotAClass").is_none());
        assert!(property_class("greek").is_none());
        assert!(property_class("Grek").is_none());
        assert!(property_class("Letter").is_none());
        assert!(property_class("sc=Greek").is_none());
        assert!(property_class("lu").is_none());
        assert!(property_class("Alphabetic").is_none());
        assert!(property_class("L}|a").is_none());
        assert!(property_class("").is_none());
    }

    #[test]
    fn case_folding() {
        let orbit: Vec<(char, char)> = fold_orbit('k')
            .ranges()
            .iter()
            .map(|r| (r.start(), r.end()))
            .collect();

        assert_eq!(
            orbit,
            vec![('K', 'K'), ('k', 'k'), ('\u{212A}', '\u{212A}')]
        );

        assert!(has_case_variants('a'));
        assert!(has_case_variants('Σ'));
        assert!(!has_case_variants('1'));
        assert!(!has_case_variants('_'));
    }

    #[test]
    fn word_chars() {
        assert!(is_word_char('a'));
        assert!(is_word_char('_'));
        assert!(is_word_char('ж'));
        assert!(!is_word_char(' '));
        assert!(!is_word_char('-'));
    }
}
