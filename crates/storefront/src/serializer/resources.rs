//! Resource definitions for catalog models.
//!
//! | model             | type               | relationships                                             |
//! |-------------------|--------------------|-----------------------------------------------------------|
//! | `Product`         | `product`          | variants, option_types, product_properties, default_variant |
//! | `Variant`         | `variant`          | images                                                    |
//! | `Image`           | `image`            |                                                           |
//! | `OptionType`      | `option_type`      | option_values                                             |
//! | `OptionValue`     | `option_value`     |                                                           |
//! | `ProductProperty` | `product_property` |                                                           |
//!
//! `default_variant` is the master variant: the same row that appears in
//! `variants`, linked by `master_id` and rendered with type `variant`.

use crate::catalog::{IncludeTree, OutputSpec};
use crate::models::{Image, OptionType, OptionValue, Product, ProductProperty, Variant};

use super::{
    Attributes, Document, ImageAttributes, Included, OptionTypeAttributes, OptionValueAttributes,
    ProductAttributes, ProductPropertyAttributes, Relationship, Relationships, Resource,
    ResourceIdentifier, VariantAttributes, loaded, serialize,
};

/// Render a product with the relations `output` side-loads.
///
/// Pure: reads only what is already loaded on `product`.
#[must_use]
pub fn serialize_product(product: &Product, output: &OutputSpec) -> Document {
    serialize(product, output)
}

fn as_slice<T>(items: Option<&Vec<T>>) -> &[T] {
    items.map_or(&[], Vec::as_slice)
}

impl Resource for Product {
    const TYPE: &'static str = "product";

    fn id(&self) -> String {
        self.id.to_string()
    }

    fn attributes(&self) -> Attributes {
        let price = self.price();
        Attributes::Product(ProductAttributes {
            name: self.name.clone(),
            description: self.description.clone(),
            price: price.map(|price| price.amount),
            currency: price.map(|price| price.currency_code),
            display_price: price.map(|price| price.display()),
            available_on: self.available_on,
            slug: self.slug.clone(),
            meta_description: self.meta_description.clone(),
            meta_keywords: self.meta_keywords.clone(),
            updated_at: self.updated_at,
            purchasable: self.purchasable(),
            in_stock: self.in_stock(),
            backorderable: self.backorderable(),
        })
    }

    fn relationships(&self) -> Relationships {
        let variants = as_slice(loaded(&self.variants, Self::TYPE, "variants"));
        let option_types = as_slice(loaded(&self.option_types, Self::TYPE, "option_types"));
        let product_properties = as_slice(loaded(
            &self.product_properties,
            Self::TYPE,
            "product_properties",
        ));
        let default_variant = self
            .master_id
            .map(|id| ResourceIdentifier::new(Variant::TYPE, id));

        Relationships::from([
            ("variants", Relationship::many(variants)),
            ("option_types", Relationship::many(option_types)),
            ("product_properties", Relationship::many(product_properties)),
            ("default_variant", Relationship::one(default_variant)),
        ])
    }

    fn include(&self, relation: &str, tree: &IncludeTree, included: &mut Included) -> bool {
        match relation {
            "variants" => {
                included.add_all(as_slice(loaded(&self.variants, Self::TYPE, "variants")), tree);
            }
            "default_variant" => {
                let master = loaded(&self.variants, Self::TYPE, "variants").and(self.master());
                if let Some(master) = master {
                    included.add(master, tree);
                }
            }
            "option_types" => included.add_all(
                as_slice(loaded(&self.option_types, Self::TYPE, "option_types")),
                tree,
            ),
            "product_properties" => included.add_all(
                as_slice(loaded(
                    &self.product_properties,
                    Self::TYPE,
                    "product_properties",
                )),
                tree,
            ),
            _ => return false,
        }
        true
    }
}

impl Resource for Variant {
    const TYPE: &'static str = "variant";

    fn id(&self) -> String {
        self.id.to_string()
    }

    fn attributes(&self) -> Attributes {
        let price = loaded(&self.default_price, Self::TYPE, "default_price")
            .copied()
            .flatten();
        Attributes::Variant(VariantAttributes {
            sku: self.sku.clone(),
            price: price.map(|price| price.amount),
            currency: price.map(|price| price.currency_code),
            display_price: price.map(|price| price.display()),
            weight: self.weight,
            height: self.height,
            width: self.width,
            depth: self.depth,
            is_master: self.is_master,
            purchasable: self.purchasable(),
            in_stock: self.in_stock(),
            backorderable: self.backorderable(),
        })
    }

    fn relationships(&self) -> Relationships {
        let images = as_slice(loaded(&self.images, Self::TYPE, "images"));
        Relationships::from([("images", Relationship::many(images))])
    }

    fn include(&self, relation: &str, tree: &IncludeTree, included: &mut Included) -> bool {
        if relation != "images" {
            return false;
        }
        included.add_all(as_slice(loaded(&self.images, Self::TYPE, "images")), tree);
        true
    }
}

impl Resource for Image {
    const TYPE: &'static str = "image";

    fn id(&self) -> String {
        self.id.to_string()
    }

    fn attributes(&self) -> Attributes {
        Attributes::Image(ImageAttributes {
            position: self.position,
            alt: self.alt.clone(),
            url: self.url.clone(),
        })
    }
}

impl Resource for OptionType {
    const TYPE: &'static str = "option_type";

    fn id(&self) -> String {
        self.id.to_string()
    }

    fn attributes(&self) -> Attributes {
        Attributes::OptionType(OptionTypeAttributes {
            name: self.name.clone(),
            presentation: self.presentation.clone(),
            position: self.position,
        })
    }

    fn relationships(&self) -> Relationships {
        let values = as_slice(loaded(&self.option_values, Self::TYPE, "option_values"));
        Relationships::from([("option_values", Relationship::many(values))])
    }

    fn include(&self, relation: &str, tree: &IncludeTree, included: &mut Included) -> bool {
        if relation != "option_values" {
            return false;
        }
        included.add_all(
            as_slice(loaded(&self.option_values, Self::TYPE, "option_values")),
            tree,
        );
        true
    }
}

impl Resource for OptionValue {
    const TYPE: &'static str = "option_value";

    fn id(&self) -> String {
        self.id.to_string()
    }

    fn attributes(&self) -> Attributes {
        Attributes::OptionValue(OptionValueAttributes {
            name: self.name.clone(),
            presentation: self.presentation.clone(),
            position: self.position,
        })
    }
}

impl Resource for ProductProperty {
    const TYPE: &'static str = "product_property";

    fn id(&self) -> String {
        self.id.to_string()
    }

    fn attributes(&self) -> Attributes {
        let property = loaded(&self.property, Self::TYPE, "property").and_then(Option::as_ref);
        Attributes::ProductProperty(ProductPropertyAttributes {
            value: self.value.clone(),
            name: property.map(|property| property.name.clone()),
            presentation: property.map(|property| property.presentation.clone()),
        })
    }
}

// =============================================================================
// Fetch Dependencies
// =============================================================================

/// Resource kinds reachable from a product, for dependency analysis.
#[derive(Debug, Clone, Copy)]
enum Kind {
    Product,
    Variant,
    Image,
    OptionType,
    OptionValue,
    ProductProperty,
}

impl Kind {
    /// Relation paths (relative to the resource) read while rendering it.
    const fn dependencies(self) -> &'static [&'static str] {
        match self {
            Self::Product => &[
                "variants",
                "variants.default_price",
                "option_types",
                "product_properties",
                "default_variant",
            ],
            Self::Variant => &["default_price", "images"],
            Self::OptionType => &["option_values"],
            Self::ProductProperty => &["property"],
            Self::Image | Self::OptionValue => &[],
        }
    }

    fn target(self, relation: &str) -> Option<Self> {
        match (self, relation) {
            (Self::Product, "variants" | "default_variant") => Some(Self::Variant),
            (Self::Product, "option_types") => Some(Self::OptionType),
            (Self::Product, "product_properties") => Some(Self::ProductProperty),
            (Self::Variant, "images") => Some(Self::Image),
            (Self::OptionType, "option_values") => Some(Self::OptionValue),
            _ => None,
        }
    }
}

/// Every relation path, in output-side naming, that rendering a product with
/// `output` will read. Feed this to `RelationshipPlan::verify`.
#[must_use]
pub fn required_fetch_paths(output: &OutputSpec) -> Vec<String> {
    let mut paths = Vec::new();
    collect_dependencies(Kind::Product, "", &output.include_tree(), &mut paths);
    paths
}

fn collect_dependencies(kind: Kind, prefix: &str, tree: &IncludeTree, paths: &mut Vec<String>) {
    let join = |name: &str| {
        if prefix.is_empty() {
            name.to_string()
        } else {
            format!("{prefix}.{name}")
        }
    };

    for dependency in kind.dependencies() {
        paths.push(join(dependency));
    }
    for (relation, subtree) in tree.children() {
        let path = join(relation);
        match kind.target(relation) {
            Some(target) => collect_dependencies(target, &path, subtree, paths),
            None => paths.push(path),
        }
    }
}
