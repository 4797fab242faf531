/*!
`ModelBase`: the audit fields and change-set every metadata entity (C4–C7) carries. §3: "Every
metadata entity carries audit fields `creator`, `created`, `contributor`, `modified` (the last used
as the optimistic-concurrency token) … and a per-entity change-set."
*/
use oldap_core::changeset::{ChangeAction, ChangeSet};
use oldap_core::iri::Iri;
use oldap_core::xsd::{Xsd_dateTime, XsdValue};
use serde::{Deserialize, Serialize};

/// Audit fields shared by every persisted metadata entity.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AuditFields {
    pub creator: Iri,
    pub created: Xsd_dateTime,
    pub contributor: Iri,
    pub modified: Xsd_dateTime,
}

impl AuditFields {
    /// Audit fields for a brand-new, not-yet-persisted entity: `creator == contributor`,
    /// `created == modified == now`.
    pub fn new_at(actor: Iri, now: Xsd_dateTime) -> Self {
        Self {
            creator: actor.clone(),
            created: now.clone(),
            contributor: actor,
            modified: now,
        }
    }

    /// Record that `actor` touched this entity at `now`; `creator`/`created` are untouched.
    pub fn touch(&mut self, actor: Iri, now: Xsd_dateTime) {
        self.contributor = actor;
        self.modified = now;
    }

    /// The SPARQL `dcterms:{creator,created,contributor,modified}` triples for `subject`.
    pub fn to_rdf_triples(&self, subject: &str) -> Vec<String> {
        vec![
            format!("{subject} dcterms:creator {} .", self.creator),
            format!("{subject} dcterms:created {} .", self.created.to_rdf()),
            format!("{subject} dcterms:contributor {} .", self.contributor),
            format!("{subject} dcterms:modified {} .", self.modified.to_rdf()),
        ]
    }
}

/// The attribute bag, change-set, and audit fields shared by `PropertyClass`, `HasProperty`,
/// `ResourceClass`, and `DataModel`. Embedded by composition rather than a generic mixin, since
/// Rust has no multiple-inheritance story for structs.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ModelBase {
    pub audit: AuditFields,
    pub change_set: ChangeSet,
}

impl ModelBase {
    pub fn new(audit: AuditFields) -> Self {
        Self {
            audit,
            change_set: ChangeSet::new(),
        }
    }

    /// Record a whole-attribute change. `was_present` distinguishes `CREATE` (attribute had no
    /// prior value) from `REPLACE`/`DELETE`.
    pub fn record_attribute_change(
        &mut self,
        field: &str,
        was_present: bool,
        is_present: bool,
        old_value: Option<String>,
    ) {
        let action = match (was_present, is_present) {
            (false, true) => ChangeAction::Create,
            (true, true) => ChangeAction::Replace,
            (true, false) => ChangeAction::Delete,
            (false, false) => return,
        };
        self.change_set.record(field, action, old_value);
    }

    /// Clear the change-set after a successful read or persist: the current state becomes the new
    /// baseline.
    pub fn clear_change_set(&mut self) {
        self.change_set.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use oldap_core::iri::QName;

    fn iri(local: &str) -> Iri {
        Iri::from_qname(QName::new("oldap", local).unwrap())
    }

    #[test]
    fn new_at_sets_creator_equal_to_contributor() {
        let audit = AuditFields::new_at(iri("alice"), Xsd_dateTime::new("2024-01-01T00:00:00Z", true).unwrap());
        assert_eq!(audit.creator, audit.contributor);
        assert_eq!(audit.created, audit.modified);
    }

    #[test]
    fn touch_updates_contributor_and_modified_only() {
        let created = Xsd_dateTime::new("2024-01-01T00:00:00Z", true).unwrap();
        let mut audit = AuditFields::new_at(iri("alice"), created.clone());
        let later = Xsd_dateTime::new("2024-06-01T00:00:00Z", true).unwrap();
        audit.touch(iri("bob"), later.clone());
        assert_eq!(audit.creator, iri("alice"));
        assert_eq!(audit.contributor, iri("bob"));
        assert_eq!(audit.created, created);
        assert_eq!(audit.modified, later);
    }

    #[test]
    fn record_attribute_change_distinguishes_create_replace_delete() {
        let mut base = ModelBase::new(AuditFields::new_at(
            iri("alice"),
            Xsd_dateTime::new("2024-01-01T00:00:00Z", true).unwrap(),
        ));
        base.record_attribute_change("NAME", false, true, None);
        assert_eq!(
            base.change_set.get("NAME").unwrap().action,
            ChangeAction::Create
        );
        base.clear_change_set();
        base.record_attribute_change("NAME", true, true, Some("old".into()));
        assert_eq!(
            base.change_set.get("NAME").unwrap().action,
            ChangeAction::Replace
        );
        base.clear_change_set();
        base.record_attribute_change("NAME", true, false, Some("old".into()));
        assert_eq!(
            base.change_set.get("NAME").unwrap().action,
            ChangeAction::Delete
        );
    }
}
