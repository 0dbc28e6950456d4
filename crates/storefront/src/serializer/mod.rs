//! Normalized response documents.
//!
//! Renders a resource into a JSON:API style document: a primary resource
//! object plus an `included` section side-loading every resource reachable
//! through the output spec's include paths, each `(type, id)` at most once.
//!
//! ```json
//! {
//!   "data": {
//!     "id": "42",
//!     "type": "product",
//!     "attributes": { "name": "Blue Shirt", "in_stock": true, "...": "..." },
//!     "relationships": {
//!       "default_variant": { "data": { "id": "1", "type": "variant" } },
//!       "variants": { "data": [{ "id": "1", "type": "variant" }, { "id": "2", "type": "variant" }] }
//!     }
//!   },
//!   "included": [{ "id": "1", "type": "variant", "...": "..." }]
//! }
//! ```

pub mod attributes;
pub mod resources;

use std::collections::{BTreeMap, HashSet};

use serde::Serialize;
use tracing::warn;

pub use attributes::{
    Attributes, ImageAttributes, OptionTypeAttributes, OptionValueAttributes, ProductAttributes,
    ProductPropertyAttributes, VariantAttributes,
};
pub use resources::{required_fetch_paths, serialize_product};

use crate::catalog::{IncludeTree, OutputSpec};
use crate::models::Relation;

/// Relationship objects keyed by relation name.
pub type Relationships = BTreeMap<&'static str, Relationship>;

/// A complete response document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Document {
    /// The primary resource.
    pub data: ResourceObject,
    /// Side-loaded resources, deduplicated by `(type, id)`.
    pub included: Vec<ResourceObject>,
}

impl Document {
    /// Find an included resource by type and id.
    #[must_use]
    pub fn find_included(&self, kind: &str, id: &str) -> Option<&ResourceObject> {
        self.included
            .iter()
            .find(|object| object.kind == kind && object.id == id)
    }
}

/// `{ "id": ..., "type": ... }`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ResourceIdentifier {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: &'static str,
}

impl ResourceIdentifier {
    #[must_use]
    pub fn new(kind: &'static str, id: impl ToString) -> Self {
        Self {
            id: id.to_string(),
            kind,
        }
    }
}

/// A rendered resource with attributes and relationship linkage.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResourceObject {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub attributes: Attributes,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub relationships: Relationships,
}

impl ResourceObject {
    #[must_use]
    pub fn identifier(&self) -> ResourceIdentifier {
        ResourceIdentifier {
            id: self.id.clone(),
            kind: self.kind,
        }
    }

    /// Identifiers linked under `relation`; empty for unknown or null relations.
    #[must_use]
    pub fn related(&self, relation: &str) -> Vec<&ResourceIdentifier> {
        match self.relationships.get(relation).map(|r| &r.data) {
            Some(RelationshipData::Many(ids)) => ids.iter().collect(),
            Some(RelationshipData::One(Some(id))) => vec![id],
            Some(RelationshipData::One(None)) | None => Vec::new(),
        }
    }
}

/// `{ "data": ... }` linkage for one relation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Relationship {
    pub data: RelationshipData,
}

/// To-many linkage is an array, to-one linkage is an object or `null`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum RelationshipData {
    Many(Vec<ResourceIdentifier>),
    One(Option<ResourceIdentifier>),
}

impl Relationship {
    #[must_use]
    pub fn many<'r, R: Resource + 'r>(resources: impl IntoIterator<Item = &'r R>) -> Self {
        Self {
            data: RelationshipData::Many(
                resources.into_iter().map(Resource::identifier).collect(),
            ),
        }
    }

    #[must_use]
    pub const fn one(identifier: Option<ResourceIdentifier>) -> Self {
        Self {
            data: RelationshipData::One(identifier),
        }
    }
}

/// A model that can be rendered as a resource object.
pub trait Resource {
    /// The `type` member.
    const TYPE: &'static str;

    /// The `id` member.
    fn id(&self) -> String;

    fn attributes(&self) -> Attributes;

    fn relationships(&self) -> Relationships {
        Relationships::new()
    }

    /// Side-load the resources under `relation`, recursing into `tree`.
    ///
    /// Returns `false` when this resource has no such relation.
    fn include(&self, relation: &str, tree: &IncludeTree, included: &mut Included) -> bool {
        let _ = (relation, tree, included);
        false
    }

    fn identifier(&self) -> ResourceIdentifier {
        ResourceIdentifier::new(Self::TYPE, self.id())
    }

    fn to_resource_object(&self) -> ResourceObject {
        ResourceObject {
            id: self.id(),
            kind: Self::TYPE,
            attributes: self.attributes(),
            relationships: self.relationships(),
        }
    }
}

/// The `included` section under construction.
#[derive(Debug, Default)]
pub struct Included {
    seen: HashSet<ResourceIdentifier>,
    objects: Vec<ResourceObject>,
}

impl Included {
    /// Add a resource (once) and side-load its nested includes.
    pub fn add<R: Resource>(&mut self, resource: &R, tree: &IncludeTree) {
        if self.seen.insert(resource.identifier()) {
            self.objects.push(resource.to_resource_object());
        }
        // A resource reached again may be asked for deeper includes.
        self.walk(resource, tree);
    }

    pub fn add_all<'r, R: Resource + 'r>(
        &mut self,
        resources: impl IntoIterator<Item = &'r R>,
        tree: &IncludeTree,
    ) {
        for resource in resources {
            self.add(resource, tree);
        }
    }

    /// Side-load each relation named in `tree` from `resource`.
    pub fn walk<R: Resource>(&mut self, resource: &R, tree: &IncludeTree) {
        for (relation, subtree) in tree.children() {
            if !resource.include(relation, subtree, self) {
                warn!(
                    resource_type = R::TYPE,
                    relation, "Skipping unknown include path"
                );
            }
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    #[must_use]
    pub fn into_vec(self) -> Vec<ResourceObject> {
        self.objects
    }
}

/// Render `resource` with everything the output spec side-loads.
#[must_use]
pub fn serialize<R: Resource>(resource: &R, output: &OutputSpec) -> Document {
    let tree = output.include_tree();
    let mut included = Included::default();
    // The primary resource never repeats in `included`.
    included.seen.insert(resource.identifier());
    included.walk(resource, &tree);

    Document {
        data: resource.to_resource_object(),
        included: included.into_vec(),
    }
}

/// Read a relation for rendering, warning when it was never eager-loaded.
///
/// A `None` here renders as an empty collection or a null link.
pub(crate) fn loaded<'a, T>(
    relation: &'a Relation<T>,
    resource_type: &'static str,
    name: &'static str,
) -> Option<&'a T> {
    let value = relation.get();
    if value.is_none() {
        warn!(
            resource_type,
            relation = name,
            "Relation rendered without being eager-loaded"
        );
    }
    value
}
