//! Relationship plans.
//!
//! A [`RelationshipPlan`] pairs the eager-loading tree handed to the store
//! ([`FetchSpec`]) with the dotted relation paths the serializer side-loads
//! ([`OutputSpec`]). Both halves are authored together, and
//! [`RelationshipPlan::verify`] checks that everything rendered is fetched.
//!
//! ```text
//! fetch                                output
//! ─────                                ──────
//! product_properties ─ property        variants
//! variants ─┬─ default_price           variants.images
//!           └─ images                  option_types
//! option_types ─ option_values         option_types.option_values
//!                                      product_properties
//! ```

use std::sync::LazyLock;

use thiserror::Error;

/// The plan behind `GET /api/v2/storefront/products/{id}`.
pub static PRODUCT_SHOW: LazyLock<RelationshipPlan> = LazyLock::new(|| {
    RelationshipPlan::new(
        FetchSpec::new()
            .nest("product_properties", FetchSpec::new().leaf("property"))
            .nest(
                "variants",
                FetchSpec::new().leaf("default_price").leaf("images"),
            )
            .nest("option_types", FetchSpec::new().leaf("option_values")),
        OutputSpec::new([
            "variants",
            "variants.images",
            "option_types",
            "option_types.option_values",
            "product_properties",
        ]),
    )
    .alias("default_variant", "variants")
});

// =============================================================================
// Fetch Spec
// =============================================================================

/// An ordered tree of relation names to eager-load.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FetchSpec {
    nodes: Vec<FetchNode>,
}

/// One relation in a [`FetchSpec`] together with its nested relations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchNode {
    name: &'static str,
    children: FetchSpec,
}

impl FetchNode {
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    #[must_use]
    pub const fn children(&self) -> &FetchSpec {
        &self.children
    }
}

impl FetchSpec {
    /// An empty spec (load no relations).
    #[must_use]
    pub const fn new() -> Self {
        Self { nodes: Vec::new() }
    }

    /// Add a relation with no nested relations.
    #[must_use]
    pub fn leaf(self, name: &'static str) -> Self {
        self.nest(name, Self::new())
    }

    /// Add a relation with nested relations.
    ///
    /// Naming a relation twice merges the nested trees.
    #[must_use]
    pub fn nest(mut self, name: &'static str, children: Self) -> Self {
        if let Some(existing) = self.nodes.iter_mut().find(|node| node.name == name) {
            let merged = std::mem::take(&mut existing.children);
            existing.children = children
                .nodes
                .into_iter()
                .fold(merged, |spec, node| spec.nest(node.name, node.children));
        } else {
            self.nodes.push(FetchNode { name, children });
        }
        self
    }

    /// Top-level relations in declaration order.
    #[must_use]
    pub fn nodes(&self) -> &[FetchNode] {
        &self.nodes
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Nested spec for a top-level relation.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Self> {
        self.nodes
            .iter()
            .find(|node| node.name == name)
            .map(FetchNode::children)
    }

    /// Whether a dotted path (e.g. `variants.images`) is eager-loaded.
    #[must_use]
    pub fn covers(&self, path: &str) -> bool {
        let mut spec = self;
        for segment in path.split('.').filter(|s| !s.is_empty()) {
            match spec.get(segment) {
                Some(children) => spec = children,
                None => return false,
            }
        }
        true
    }

    /// Every loaded path in dotted form, depth first.
    #[must_use]
    pub fn paths(&self) -> Vec<String> {
        let mut paths = Vec::new();
        self.collect_paths("", &mut paths);
        paths
    }

    fn collect_paths(&self, prefix: &str, paths: &mut Vec<String>) {
        for node in &self.nodes {
            let path = join_path(prefix, node.name);
            node.children.collect_paths(&path, paths);
            paths.push(path);
        }
    }
}

// =============================================================================
// Output Spec
// =============================================================================

/// Ordered dotted relation paths to side-load into the response document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OutputSpec {
    paths: Vec<&'static str>,
}

impl OutputSpec {
    #[must_use]
    pub fn new(paths: impl IntoIterator<Item = &'static str>) -> Self {
        Self {
            paths: paths.into_iter().collect(),
        }
    }

    #[must_use]
    pub fn paths(&self) -> &[&'static str] {
        &self.paths
    }

    /// The paths folded into a tree.
    #[must_use]
    pub fn include_tree(&self) -> IncludeTree {
        IncludeTree::parse(self.paths.iter().copied())
    }
}

/// Include paths folded into a tree; `a.b` implies `a`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IncludeTree {
    children: Vec<(String, IncludeTree)>,
}

impl IncludeTree {
    /// Parse dotted paths, skipping empty segments.
    pub fn parse<'a>(paths: impl IntoIterator<Item = &'a str>) -> Self {
        let mut tree = Self::default();
        for path in paths {
            tree.insert(path.split('.').filter(|segment| !segment.is_empty()));
        }
        tree
    }

    fn insert<'a>(&mut self, mut segments: impl Iterator<Item = &'a str>) {
        let Some(head) = segments.next() else {
            return;
        };
        let position = self
            .children
            .iter()
            .position(|(name, _)| name == head)
            .unwrap_or_else(|| {
                self.children.push((head.to_string(), Self::default()));
                self.children.len() - 1
            });
        if let Some((_, child)) = self.children.get_mut(position) {
            child.insert(segments);
        }
    }

    /// Direct children in first-mention order.
    pub fn children(&self) -> impl Iterator<Item = (&str, &Self)> {
        self.children
            .iter()
            .map(|(name, tree)| (name.as_str(), tree))
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }
}

// =============================================================================
// Relationship Plan
// =============================================================================

/// Rendered relation paths that the fetch spec does not load.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("relation paths rendered but not eager-loaded: {}", missing.join(", "))]
pub struct PlanMismatchError {
    /// Missing paths, in fetch-side naming.
    pub missing: Vec<String>,
}

/// A fetch spec and output spec authored together.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationshipPlan {
    fetch: FetchSpec,
    output: OutputSpec,
    aliases: Vec<(&'static str, &'static str)>,
}

impl RelationshipPlan {
    #[must_use]
    pub const fn new(fetch: FetchSpec, output: OutputSpec) -> Self {
        Self {
            fetch,
            output,
            aliases: Vec::new(),
        }
    }

    /// Declare an output relation name that renders data fetched under another name.
    #[must_use]
    pub fn alias(mut self, output_name: &'static str, fetch_name: &'static str) -> Self {
        self.aliases.push((output_name, fetch_name));
        self
    }

    #[must_use]
    pub const fn fetch(&self) -> &FetchSpec {
        &self.fetch
    }

    #[must_use]
    pub const fn output(&self) -> &OutputSpec {
        &self.output
    }

    /// Translate an output path to the fetch path that loads it.
    #[must_use]
    pub fn fetch_path(&self, output_path: &str) -> String {
        output_path
            .split('.')
            .filter(|segment| !segment.is_empty())
            .map(|segment| {
                self.aliases
                    .iter()
                    .find(|(alias, _)| *alias == segment)
                    .map_or(segment, |(_, target)| *target)
            })
            .collect::<Vec<_>>()
            .join(".")
    }

    /// Check that every output path, plus every extra `required` path the
    /// renderer reads, is covered by the fetch spec.
    ///
    /// # Errors
    ///
    /// Returns `PlanMismatchError` listing each uncovered path once.
    pub fn verify<I, S>(&self, required: I) -> Result<(), PlanMismatchError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut missing: Vec<String> = Vec::new();
        let output = self.output.paths.iter().map(|path| (*path).to_string());
        let extra = required.into_iter().map(|path| path.as_ref().to_string());

        for path in output.chain(extra) {
            let fetch_path = self.fetch_path(&path);
            if !self.fetch.covers(&fetch_path) && !missing.contains(&fetch_path) {
                missing.push(fetch_path);
            }
        }

        if missing.is_empty() {
            Ok(())
        } else {
            Err(PlanMismatchError { missing })
        }
    }
}

fn join_path(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{prefix}.{name}")
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::serializer::required_fetch_paths;

    #[test]
    fn test_product_show_plan_is_consistent() {
        let plan = &*PRODUCT_SHOW;
        plan.verify(required_fetch_paths(plan.output())).unwrap();
    }

    #[test]
    fn test_product_show_fetch_paths() {
        assert_eq!(
            PRODUCT_SHOW.fetch().paths(),
            vec![
                "product_properties.property",
                "product_properties",
                "variants.default_price",
                "variants.images",
                "variants",
                "option_types.option_values",
                "option_types",
            ]
        );
    }

    #[test]
    fn test_verify_reports_unfetched_output() {
        let plan = RelationshipPlan::new(
            FetchSpec::new().leaf("variants"),
            OutputSpec::new(["variants", "variants.images", "option_types"]),
        );
        let err = plan.verify(Vec::<String>::new()).unwrap_err();
        assert_eq!(err.missing, vec!["variants.images", "option_types"]);
        assert_eq!(
            err.to_string(),
            "relation paths rendered but not eager-loaded: variants.images, option_types"
        );
    }

    #[test]
    fn test_verify_reports_renderer_dependencies() {
        let plan = RelationshipPlan::new(
            FetchSpec::new().leaf("variants"),
            OutputSpec::new(["variants"]),
        );
        let err = plan
            .verify(required_fetch_paths(plan.output()))
            .unwrap_err();
        assert!(err.missing.contains(&"variants.default_price".to_string()));
        assert!(err.missing.contains(&"variants.images".to_string()));
        assert!(err.missing.contains(&"product_properties".to_string()));
    }

    #[test]
    fn test_alias_maps_to_fetch_side() {
        let plan = RelationshipPlan::new(
            FetchSpec::new().nest("variants", FetchSpec::new().leaf("images")),
            OutputSpec::new(["default_variant", "default_variant.images"]),
        )
        .alias("default_variant", "variants");

        assert_eq!(plan.fetch_path("default_variant.images"), "variants.images");
        plan.verify(Vec::<String>::new()).unwrap();
    }

    #[test]
    fn test_fetch_spec_covers() {
        let spec = FetchSpec::new().nest("variants", FetchSpec::new().leaf("images"));
        assert!(spec.covers("variants"));
        assert!(spec.covers("variants.images"));
        assert!(!spec.covers("variants.default_price"));
        assert!(!spec.covers("option_types"));
        assert!(spec.covers(""));
    }

    #[test]
    fn test_fetch_spec_nest_merges_duplicates() {
        let spec = FetchSpec::new()
            .nest("variants", FetchSpec::new().leaf("images"))
            .nest("variants", FetchSpec::new().leaf("default_price").leaf("images"));

        assert_eq!(spec.nodes().len(), 1);
        assert_eq!(
            spec.paths(),
            vec!["variants.images", "variants.default_price", "variants"]
        );
    }

    #[test]
    fn test_include_tree_implies_parents() {
        let tree = IncludeTree::parse(["variants.images", "option_types", "variants"]);
        let children: Vec<_> = tree.children().map(|(name, _)| name).collect();
        assert_eq!(children, vec!["variants", "option_types"]);

        let (_, variants) = tree.children().next().unwrap();
        let nested: Vec<_> = variants.children().map(|(name, _)| name).collect();
        assert_eq!(nested, vec!["images"]);
    }

    #[test]
    fn test_include_tree_skips_empty_segments() {
        let tree = IncludeTree::parse(["", "variants..images"]);
        let (name, variants) = tree.children().next().unwrap();
        assert_eq!(name, "variants");
        assert_eq!(variants.children().count(), 1);
        assert_eq!(tree.children().count(), 1);
    }
}
