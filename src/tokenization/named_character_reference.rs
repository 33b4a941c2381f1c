//! Lookup for [named character references](https://html.spec.whatwg.org/multipage/syntax.html#character-references).
//!
//! The reference names are laid out as a flat trie: one contiguous node
//! array where every node stores its edge label, an optional replacement
//! string, and a 16-bit index to its (contiguous) children. The tokenizer
//! walks it one code point at a time, which is what makes matching
//! restartable across chunk boundaries.
//!
//! The built-in table is the complete set of names that are valid without
//! a trailing semicolon, plus the common semicolon-terminated names. It is
//! regenerable from the WHATWG `entities.json` dump; the trie itself is
//! agnostic to the table size.

use std::collections::BTreeMap;
use std::sync::OnceLock;

/// Names that are recognized both with and without a trailing semicolon.
const PREFIX_ENTITIES: &[(&str, &str)] = &[
    ("AElig", "\u{C6}"),
    ("AMP", "&"),
    ("Aacute", "\u{C1}"),
    ("Acirc", "\u{C2}"),
    ("Agrave", "\u{C0}"),
    ("Aring", "\u{C5}"),
    ("Atilde", "\u{C3}"),
    ("Auml", "\u{C4}"),
    ("COPY", "\u{A9}"),
    ("Ccedil", "\u{C7}"),
    ("ETH", "\u{D0}"),
    ("Eacute", "\u{C9}"),
    ("Ecirc", "\u{CA}"),
    ("Egrave", "\u{C8}"),
    ("Euml", "\u{CB}"),
    ("GT", ">"),
    ("Iacute", "\u{CD}"),
    ("Icirc", "\u{CE}"),
    ("Igrave", "\u{CC}"),
    ("Iuml", "\u{CF}"),
    ("LT", "<"),
    ("Ntilde", "\u{D1}"),
    ("Oacute", "\u{D3}"),
    ("Ocirc", "\u{D4}"),
    ("Ograve", "\u{D2}"),
    ("Oslash", "\u{D8}"),
    ("Otilde", "\u{D5}"),
    ("Ouml", "\u{D6}"),
    ("QUOT", "\""),
    ("REG", "\u{AE}"),
    ("THORN", "\u{DE}"),
    ("Uacute", "\u{DA}"),
    ("Ucirc", "\u{DB}"),
    ("Ugrave", "\u{D9}"),
    ("Uuml", "\u{DC}"),
    ("Yacute", "\u{DD}"),
    ("aacute", "\u{E1}"),
    ("acirc", "\u{E2}"),
    ("acute", "\u{B4}"),
    ("aelig", "\u{E6}"),
    ("agrave", "\u{E0}"),
    ("amp", "&"),
    ("aring", "\u{E5}"),
    ("atilde", "\u{E3}"),
    ("auml", "\u{E4}"),
    ("brvbar", "\u{A6}"),
    ("ccedil", "\u{E7}"),
    ("cedil", "\u{B8}"),
    ("cent", "\u{A2}"),
    ("copy", "\u{A9}"),
    ("curren", "\u{A4}"),
    ("deg", "\u{B0}"),
    ("divide", "\u{F7}"),
    ("eacute", "\u{E9}"),
    ("ecirc", "\u{EA}"),
    ("egrave", "\u{E8}"),
    ("eth", "\u{F0}"),
    ("euml", "\u{EB}"),
    ("frac12", "\u{BD}"),
    ("frac14", "\u{BC}"),
    ("frac34", "\u{BE}"),
    ("gt", ">"),
    ("iacute", "\u{ED}"),
    ("icirc", "\u{EE}"),
    ("iexcl", "\u{A1}"),
    ("igrave", "\u{EC}"),
    ("iquest", "\u{BF}"),
    ("iuml", "\u{EF}"),
    ("laquo", "\u{AB}"),
    ("lt", "<"),
    ("macr", "\u{AF}"),
    ("micro", "\u{B5}"),
    ("middot", "\u{B7}"),
    ("nbsp", "\u{A0}"),
    ("not", "\u{AC}"),
    ("ntilde", "\u{F1}"),
    ("oacute", "\u{F3}"),
    ("ocirc", "\u{F4}"),
    ("ograve", "\u{F2}"),
    ("ordf", "\u{AA}"),
    ("ordm", "\u{BA}"),
    ("oslash", "\u{F8}"),
    ("otilde", "\u{F5}"),
    ("ouml", "\u{F6}"),
    ("para", "\u{B6}"),
    ("plusmn", "\u{B1}"),
    ("pound", "\u{A3}"),
    ("quot", "\""),
    ("raquo", "\u{BB}"),
    ("reg", "\u{AE}"),
    ("sect", "\u{A7}"),
    ("shy", "\u{AD}"),
    ("sup1", "\u{B9}"),
    ("sup2", "\u{B2}"),
    ("sup3", "\u{B3}"),
    ("szlig", "\u{DF}"),
    ("thorn", "\u{FE}"),
    ("times", "\u{D7}"),
    ("uacute", "\u{FA}"),
    ("ucirc", "\u{FB}"),
    ("ugrave", "\u{F9}"),
    ("uml", "\u{A8}"),
    ("uuml", "\u{FC}"),
    ("yacute", "\u{FD}"),
    ("yen", "\u{A5}"),
    ("yuml", "\u{FF}"),
];

/// Names that require the trailing semicolon.
const SEMICOLON_ENTITIES: &[(&str, &str)] = &[
    ("Alpha", "\u{391}"),
    ("Beta", "\u{392}"),
    ("Chi", "\u{3A7}"),
    ("Dagger", "\u{2021}"),
    ("Delta", "\u{394}"),
    ("Epsilon", "\u{395}"),
    ("Eta", "\u{397}"),
    ("Gamma", "\u{393}"),
    ("Iota", "\u{399}"),
    ("Kappa", "\u{39A}"),
    ("Lambda", "\u{39B}"),
    ("Mu", "\u{39C}"),
    ("Nu", "\u{39D}"),
    ("OElig", "\u{152}"),
    ("Omega", "\u{3A9}"),
    ("Omicron", "\u{39F}"),
    ("Phi", "\u{3A6}"),
    ("Pi", "\u{3A0}"),
    ("Prime", "\u{2033}"),
    ("Psi", "\u{3A8}"),
    ("Rho", "\u{3A1}"),
    ("Scaron", "\u{160}"),
    ("Sigma", "\u{3A3}"),
    ("Tau", "\u{3A4}"),
    ("Theta", "\u{398}"),
    ("Upsilon", "\u{3A5}"),
    ("Xi", "\u{39E}"),
    ("Yuml", "\u{178}"),
    ("Zeta", "\u{396}"),
    ("alefsym", "\u{2135}"),
    ("alpha", "\u{3B1}"),
    ("and", "\u{2227}"),
    ("ang", "\u{2220}"),
    ("apos", "'"),
    ("asymp", "\u{2248}"),
    ("bdquo", "\u{201E}"),
    ("beta", "\u{3B2}"),
    ("bull", "\u{2022}"),
    ("cap", "\u{2229}"),
    ("chi", "\u{3C7}"),
    ("circ", "\u{2C6}"),
    ("clubs", "\u{2663}"),
    ("cong", "\u{2245}"),
    ("crarr", "\u{21B5}"),
    ("cup", "\u{222A}"),
    ("dArr", "\u{21D3}"),
    ("dagger", "\u{2020}"),
    ("darr", "\u{2193}"),
    ("delta", "\u{3B4}"),
    ("diams", "\u{2666}"),
    ("empty", "\u{2205}"),
    ("emsp", "\u{2003}"),
    ("ensp", "\u{2002}"),
    ("epsilon", "\u{3B5}"),
    ("equiv", "\u{2261}"),
    ("eta", "\u{3B7}"),
    ("euro", "\u{20AC}"),
    ("exist", "\u{2203}"),
    ("fnof", "\u{192}"),
    ("forall", "\u{2200}"),
    ("frasl", "\u{2044}"),
    ("gamma", "\u{3B3}"),
    ("ge", "\u{2265}"),
    ("hArr", "\u{21D4}"),
    ("harr", "\u{2194}"),
    ("hearts", "\u{2665}"),
    ("hellip", "\u{2026}"),
    ("image", "\u{2111}"),
    ("infin", "\u{221E}"),
    ("int", "\u{222B}"),
    ("iota", "\u{3B9}"),
    ("isin", "\u{2208}"),
    ("kappa", "\u{3BA}"),
    ("lArr", "\u{21D0}"),
    ("lambda", "\u{3BB}"),
    ("lang", "\u{27E8}"),
    ("larr", "\u{2190}"),
    ("lceil", "\u{2308}"),
    ("ldquo", "\u{201C}"),
    ("le", "\u{2264}"),
    ("lfloor", "\u{230A}"),
    ("lowast", "\u{2217}"),
    ("loz", "\u{25CA}"),
    ("lrm", "\u{200E}"),
    ("lsaquo", "\u{2039}"),
    ("lsquo", "\u{2018}"),
    ("mdash", "\u{2014}"),
    ("minus", "\u{2212}"),
    ("mu", "\u{3BC}"),
    ("nabla", "\u{2207}"),
    ("ndash", "\u{2013}"),
    ("ne", "\u{2260}"),
    ("ni", "\u{220B}"),
    ("notin", "\u{2209}"),
    ("nsub", "\u{2284}"),
    ("nu", "\u{3BD}"),
    ("oelig", "\u{153}"),
    ("oline", "\u{203E}"),
    ("omega", "\u{3C9}"),
    ("omicron", "\u{3BF}"),
    ("oplus", "\u{2295}"),
    ("or", "\u{2228}"),
    ("otimes", "\u{2297}"),
    ("part", "\u{2202}"),
    ("permil", "\u{2030}"),
    ("perp", "\u{22A5}"),
    ("phi", "\u{3C6}"),
    ("pi", "\u{3C0}"),
    ("piv", "\u{3D6}"),
    ("prime", "\u{2032}"),
    ("prod", "\u{220F}"),
    ("prop", "\u{221D}"),
    ("psi", "\u{3C8}"),
    ("rArr", "\u{21D2}"),
    ("radic", "\u{221A}"),
    ("rang", "\u{27E9}"),
    ("rarr", "\u{2192}"),
    ("rceil", "\u{2309}"),
    ("rdquo", "\u{201D}"),
    ("real", "\u{211C}"),
    ("rfloor", "\u{230B}"),
    ("rho", "\u{3C1}"),
    ("rlm", "\u{200F}"),
    ("rsaquo", "\u{203A}"),
    ("rsquo", "\u{2019}"),
    ("sbquo", "\u{201A}"),
    ("scaron", "\u{161}"),
    ("sdot", "\u{22C5}"),
    ("sigma", "\u{3C3}"),
    ("sigmaf", "\u{3C2}"),
    ("sim", "\u{223C}"),
    ("spades", "\u{2660}"),
    ("sub", "\u{2282}"),
    ("sube", "\u{2286}"),
    ("sum", "\u{2211}"),
    ("sup", "\u{2283}"),
    ("supe", "\u{2287}"),
    ("tau", "\u{3C4}"),
    ("there4", "\u{2234}"),
    ("theta", "\u{3B8}"),
    ("thetasym", "\u{3D1}"),
    ("thinsp", "\u{2009}"),
    ("tilde", "\u{2DC}"),
    ("trade", "\u{2122}"),
    ("uArr", "\u{21D1}"),
    ("uarr", "\u{2191}"),
    ("upsih", "\u{3D2}"),
    ("upsilon", "\u{3C5}"),
    ("weierp", "\u{2118}"),
    ("xi", "\u{3BE}"),
    ("zeta", "\u{3B6}"),
    ("zwj", "\u{200D}"),
    ("zwnj", "\u{200C}"),
];

/// One trie node. Children are contiguous in the node array and sorted by
/// label, so stepping is a binary search over a small slice.
#[derive(Clone, Copy, Debug)]
struct Node {
    /// Edge label (ASCII) leading from the parent to this node.
    label: u8,

    /// Replacement text, if a reference name ends at this node.
    value: Option<&'static str>,

    /// Index of the first child in the node array.
    first_child: u16,

    /// Number of children.
    child_count: u16,
}

/// The flattened reference-name trie.
#[derive(Debug)]
pub struct EntityTrie {
    nodes: Vec<Node>,
}

/// A position inside the trie while matching a name code point by code
/// point.
#[derive(Clone, Copy, Debug)]
pub struct TrieCursor {
    node: u16,
}

impl EntityTrie {
    fn build() -> Self {
        #[derive(Default)]
        struct Scratch {
            children: BTreeMap<u8, Scratch>,
            value: Option<&'static str>,
        }

        fn insert(root: &mut Scratch, name: &str, value: &'static str) {
            let mut node = root;
            for byte in name.bytes() {
                node = node.children.entry(byte).or_default();
            }
            node.value = Some(value);
        }

        let mut root = Scratch::default();
        for &(name, value) in PREFIX_ENTITIES {
            insert(&mut root, name, value);
            insert(&mut root, &format!("{name};"), value);
        }
        for &(name, value) in SEMICOLON_ENTITIES {
            insert(&mut root, &format!("{name};"), value);
        }

        // Flatten breadth-first so each node's children are contiguous.
        let mut nodes = vec![Node {
            label: 0,
            value: None,
            first_child: 0,
            child_count: 0,
        }];
        let mut queue = std::collections::VecDeque::from([(root, 0usize)]);

        while let Some((scratch, index)) = queue.pop_front() {
            let first_child = u16::try_from(nodes.len()).expect("trie fits in 16-bit offsets");
            let child_count =
                u16::try_from(scratch.children.len()).expect("trie fits in 16-bit offsets");

            nodes[index].first_child = first_child;
            nodes[index].child_count = child_count;

            for (label, child) in scratch.children {
                let child_index = nodes.len();
                nodes.push(Node {
                    label,
                    value: child.value,
                    first_child: 0,
                    child_count: 0,
                });
                queue.push_back((child, child_index));
            }
        }

        Self { nodes }
    }

    /// Cursor at the trie root, before any character has been matched.
    #[must_use]
    pub const fn root(&self) -> TrieCursor {
        TrieCursor { node: 0 }
    }

    /// Follows the edge labelled `c`, if there is one.
    #[must_use]
    pub fn step(&self, cursor: TrieCursor, c: char) -> Option<TrieCursor> {
        if !c.is_ascii() {
            return None;
        }
        let label = c as u8;

        let node = self.nodes[cursor.node as usize];
        let children_start = node.first_child as usize;
        let children = &self.nodes[children_start..children_start + node.child_count as usize];

        children
            .binary_search_by_key(&label, |child| child.label)
            .ok()
            .map(|found| TrieCursor {
                node: u16::try_from(children_start + found).expect("node index fits in u16"),
            })
    }

    /// Replacement text if a complete reference name ends at the cursor.
    #[must_use]
    pub fn value(&self, cursor: TrieCursor) -> Option<&'static str> {
        self.nodes[cursor.node as usize].value
    }
}

/// The process-wide trie, built on first use.
pub fn entity_trie() -> &'static EntityTrie {
    static TRIE: OnceLock<EntityTrie> = OnceLock::new();
    TRIE.get_or_init(EntityTrie::build)
}

/// Longest match of a reference name at the start of `input`.
///
/// Returns the matched length in characters and the replacement text.
#[must_use]
pub fn lookup_character_reference(input: &str) -> Option<(usize, &'static str)> {
    let trie = entity_trie();
    let mut cursor = trie.root();
    let mut best: Option<(usize, &'static str)> = None;

    for (consumed, c) in input.chars().enumerate() {
        let Some(next) = trie.step(cursor, c) else {
            break;
        };
        cursor = next;

        if let Some(value) = trie.value(cursor) {
            best = Some((consumed + 1, value));
        }

        if c == ';' {
            break;
        }
    }

    best
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn semicolon_and_legacy_forms() {
        assert_eq!(lookup_character_reference("amp;x"), Some((4, "&")));
        assert_eq!(lookup_character_reference("amp x"), Some((3, "&")));
        assert_eq!(lookup_character_reference("AMP;"), Some((4, "&")));
        assert_eq!(lookup_character_reference("quot;"), Some((5, "\"")));
    }

    #[test]
    fn longest_match_wins() {
        // "not" is valid without a semicolon, but "notin;" keeps matching
        assert_eq!(lookup_character_reference("notin;"), Some((6, "\u{2209}")));
        assert_eq!(lookup_character_reference("notit;"), Some((3, "\u{AC}")));
        assert_eq!(lookup_character_reference("not"), Some((3, "\u{AC}")));
    }

    #[test]
    fn semicolon_only_names_do_not_match_bare() {
        assert_eq!(lookup_character_reference("apos "), None);
        assert_eq!(lookup_character_reference("apos;"), Some((5, "'")));
        assert_eq!(lookup_character_reference("ndash;"), Some((6, "\u{2013}")));
    }

    #[test]
    fn no_match() {
        assert_eq!(lookup_character_reference("zz;"), None);
        assert_eq!(lookup_character_reference(""), None);
        assert_eq!(lookup_character_reference("💚"), None);
    }
}
