//! HTML named character references.
//!
//! Lookup tables for the named entities of the HTML standard, split into
//! the full reference list and the legacy "base" subset that is
//! recognized without a trailing semicolon.
//!
//! @see https://html.spec.whatwg.org/multipage/named-characters.html

use lazy_static::lazy_static;
use rustc_hash::{FxHashMap, FxHashSet};

mod generated;

use generated::{BASE_ENTITIES, NAMED_ENTITIES};

lazy_static! {
    static ref NAMED: FxHashMap<&'static str, (u32, u32)> = {
        let mut map = FxHashMap::default();
        for &(name, cp1, cp2) in NAMED_ENTITIES {
            map.insert(name, (cp1, cp2));
        }
        map
    };
    static ref BASE: FxHashSet<&'static str> =
        BASE_ENTITIES.iter().copied().collect();
}

/// Is the given name a known named entity, e.g. "lt" or "notin"?
pub fn is_named_entity(name: &str) -> bool {
    NAMED.contains_key(name)
}

/// Is the given name a known named entity in the base (legacy) set?
///
/// References in the base set may appear without a trailing semicolon,
/// e.g. `&amp` or `&LT`.
pub fn is_base_named_entity(name: &str) -> bool {
    BASE.contains(name)
}

/// Fills `codepoints` with the codepoint(s) the named entity represents
/// and returns how many were written: 0 (unknown name), 1, or 2.
pub fn codepoints_for_name(name: &str, codepoints: &mut [u32; 2]) -> usize {
    match NAMED.get(name) {
        Some(&(cp1, 0)) => {
            codepoints[0] = cp1;
            1
        }
        Some(&(cp1, cp2)) => {
            codepoints[0] = cp1;
            codepoints[1] = cp2;
            2
        }
        None => 0,
    }
}

/// The character(s) represented by the named entity, or an empty string
/// for an unknown name.
pub fn by_name(name: &str) -> String {
    let mut codepoints = [0u32; 2];
    let count = codepoints_for_name(name, &mut codepoints);
    codepoints[..count]
        .iter()
        .filter_map(|&cp| char::from_u32(cp))
        .collect()
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn named_entities() {
        assert!(is_named_entity("amp"));
        assert!(is_named_entity("notin"));
        assert!(is_named_entity("AElig"));
        assert!(!is_named_entity("notareference"));
        assert!(!is_named_entity(""));
    }

    #[test]
    fn base_is_a_subset() {
        assert!(is_base_named_entity("amp"));
        assert!(is_base_named_entity("AMP"));
        assert!(is_base_named_entity("Aacute"));
        assert!(!is_base_named_entity("notin"));
        for name in generated::BASE_ENTITIES {
            assert!(is_named_entity(name), "{name} missing from full set");
        }
    }

    #[test]
    fn single_codepoint() {
        let mut cps = [0u32; 2];
        assert_eq!(codepoints_for_name("amp", &mut cps), 1);
        assert_eq!(cps[0], '&' as u32);
        assert_eq!(codepoints_for_name("nbsp", &mut cps), 1);
        assert_eq!(cps[0], 0xA0);
    }

    #[test]
    fn multi_codepoint() {
        let mut cps = [0u32; 2];
        assert_eq!(codepoints_for_name("NotEqualTilde", &mut cps), 2);
        assert_eq!(cps, [0x2242, 0x338]);
        assert_eq!(by_name("NotEqualTilde"), "\u{2242}\u{338}");
    }

    #[test]
    fn unknown_name() {
        let mut cps = [0u32; 2];
        assert_eq!(codepoints_for_name("xyzzy", &mut cps), 0);
        assert_eq!(by_name("xyzzy"), "");
    }

    #[test]
    fn case_sensitive() {
        // Aring (U+C5) and aring (U+E5) are distinct references.
        assert_eq!(by_name("Aring"), "\u{C5}");
        assert_eq!(by_name("aring"), "\u{E5}");
    }
}
