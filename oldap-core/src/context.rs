/*!
`Context`: prefix to namespace registry used to resolve `QName`s to full IRIs, and to render the
`PREFIX`/`@prefix` prologues that every emitted SPARQL or Turtle document needs. §2/§3: "A
`Context` carries the default prefix set (`rdf`, `rdfs`, `owl`, `xsd`, `sh`, `dcterms`, `schema`,
`oldap`, plus a project's own `shared` ontology) and any project-specific prefixes layered on top."
*/
use crate::iri::{Iri, NamespaceIri, QName};
use oldap_errors::{not_found_error, Result};
use std::collections::BTreeMap;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Prefix to namespace registry, bidirectional: resolves `QName -> Iri` and reduces an absolute
/// IRI back to its shortest known `QName` when possible.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Context {
    prefixes: BTreeMap<String, NamespaceIri>,
}

impl Context {
    /// A `Context` carrying only the default prefixes every OLDAP document needs.
    pub fn new() -> Self {
        let mut prefixes = BTreeMap::new();
        for (prefix, ns) in DEFAULT_PREFIXES {
            prefixes.insert(
                prefix.to_string(),
                NamespaceIri::new(*ns, false).expect("built-in namespace is well-formed"),
            );
        }
        Self { prefixes }
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>, namespace: NamespaceIri) -> Self {
        self.prefixes.insert(prefix.into(), namespace);
        self
    }

    pub fn add_prefix(&mut self, prefix: impl Into<String>, namespace: NamespaceIri) {
        self.prefixes.insert(prefix.into(), namespace);
    }

    pub fn namespace(&self, prefix: &str) -> Option<&NamespaceIri> {
        self.prefixes.get(prefix)
    }

    pub fn prefixes(&self) -> impl Iterator<Item = (&String, &NamespaceIri)> {
        self.prefixes.iter()
    }

    /// Resolve a `QName` to its full IRI, given a registered namespace for its prefix.
    pub fn qname_to_iri(&self, qname: &QName) -> Result<String> {
        let ns = self.prefixes.get(qname.prefix()).ok_or_else(|| {
            not_found_error(format!("no namespace registered for prefix '{}'", qname.prefix()))
        })?;
        Ok(format!("{}{}", ns.as_str(), qname.local()))
    }

    /// Resolve any `Iri` (full or `QName`) to its full IRI string.
    pub fn iri_to_full(&self, iri: &Iri) -> Result<String> {
        match iri {
            Iri::Full(s) => Ok(s.clone()),
            Iri::QName(q) => self.qname_to_iri(q),
        }
    }

    /// Reduce a full IRI to a `QName` under the longest matching registered namespace, or `None`
    /// if no registered prefix covers it.
    pub fn iri_to_qname(&self, full: &str) -> Option<QName> {
        self.prefixes
            .iter()
            .filter_map(|(prefix, ns)| {
                ns.strip_prefix_of(full)
                    .map(|local| (ns.as_str().len(), prefix, local))
            })
            .max_by_key(|(len, _, _)| *len)
            .and_then(|(_, prefix, local)| QName::new(prefix, local).ok())
    }

    /// The `PREFIX p: <ns>` lines for a SPARQL query/update.
    pub fn sparql_prologue(&self) -> String {
        self.prefixes
            .iter()
            .map(|(prefix, ns)| format!("PREFIX {prefix}: <{}>", ns.as_str()))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// The `@prefix p: <ns> .` lines for a Turtle document.
    pub fn turtle_prologue(&self) -> String {
        self.prefixes
            .iter()
            .map(|(prefix, ns)| format!("@prefix {prefix}: <{}> .", ns.as_str()))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::new()
    }
}

const DEFAULT_PREFIXES: &[(&str, &str)] = &[
    ("rdf", "http://www.w3.org/1999/02/22-rdf-syntax-ns#"),
    ("rdfs", "http://www.w3.org/2000/01/rdf-schema#"),
    ("owl", "http://www.w3.org/2002/07/owl#"),
    ("xsd", "http://www.w3.org/2001/XMLSchema#"),
    ("sh", "http://www.w3.org/ns/shacl#"),
    ("dcterms", "http://purl.org/dc/terms/"),
    ("schema", "http://schema.org/"),
    ("oldap", "http://oldap.org/base#"),
    ("shared", "http://oldap.org/shared#"),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_context_resolves_builtin_prefixes() {
        let ctx = Context::new();
        let q = QName::parse("xsd:string").unwrap();
        assert_eq!(
            ctx.qname_to_iri(&q).unwrap(),
            "http://www.w3.org/2001/XMLSchema#string"
        );
    }

    #[test]
    fn unknown_prefix_is_not_found() {
        let ctx = Context::new();
        let q = QName::parse("bogus:thing").unwrap();
        assert!(ctx.qname_to_iri(&q).is_err());
    }

    #[test]
    fn iri_to_qname_picks_longest_namespace_match() {
        let mut ctx = Context::new();
        ctx.add_prefix(
            "oldap-book",
            NamespaceIri::new("http://oldap.org/base#Book-", false).unwrap(),
        );
        let q = ctx
            .iri_to_qname("http://oldap.org/base#Book-title")
            .unwrap();
        assert_eq!(q.prefix(), "oldap-book");
        assert_eq!(q.local(), "title");
    }

    #[test]
    fn sparql_prologue_includes_all_registered_prefixes() {
        let ctx = Context::new();
        let prologue = ctx.sparql_prologue();
        assert!(prologue.contains("PREFIX rdf: <http://www.w3.org/1999/02/22-rdf-syntax-ns#>"));
        assert!(prologue.contains("PREFIX oldap: <http://oldap.org/base#>"));
    }
}
