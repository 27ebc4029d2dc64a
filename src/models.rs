//! Catalog Data Model
//! Mission: One vocabulary for products, edges, and assembled looks

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Exclusive wardrobe role a product fills. At most one occupant per slot
/// per look.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Slot {
    BaseTop,
    Outerwear,
    PrimaryBottom,
    SecondaryBottom,
    Footwear,
    Accessory,
}

impl Slot {
    /// Fixed order in which the assembler attempts to fill slots.
    pub const ASSEMBLY_ORDER: [Slot; 6] = [
        Slot::Outerwear,
        Slot::BaseTop,
        Slot::PrimaryBottom,
        Slot::SecondaryBottom,
        Slot::Footwear,
        Slot::Accessory,
    ];

    pub const COUNT: usize = 6;

    pub fn wire_name(&self) -> &'static str {
        match self {
            Slot::BaseTop => "base_top",
            Slot::Outerwear => "outerwear",
            Slot::PrimaryBottom => "primary_bottom",
            Slot::SecondaryBottom => "secondary_bottom",
            Slot::Footwear => "footwear",
            Slot::Accessory => "accessory",
        }
    }

    /// Parse a stored slot name. Accepts the wire form and the spaced
    /// display form ("Base Top"), case-insensitively.
    pub fn parse(s: &str) -> Option<Slot> {
        match s.to_ascii_lowercase().replace(' ', "_").as_str() {
            "base_top" => Some(Slot::BaseTop),
            "outerwear" => Some(Slot::Outerwear),
            "primary_bottom" => Some(Slot::PrimaryBottom),
            "secondary_bottom" => Some(Slot::SecondaryBottom),
            "footwear" => Some(Slot::Footwear),
            "accessory" => Some(Slot::Accessory),
            _ => None,
        }
    }

    pub fn is_bottom(&self) -> bool {
        matches!(self, Slot::PrimaryBottom | Slot::SecondaryBottom)
    }
}

/// Facet along which a look is coherent. Declaration order is the cluster
/// selection priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dimension {
    Occasion,
    Aesthetic,
    Color,
    Formality,
}

impl Dimension {
    pub fn wire_name(&self) -> &'static str {
        match self {
            Dimension::Occasion => "occasion",
            Dimension::Aesthetic => "aesthetic",
            Dimension::Color => "color",
            Dimension::Formality => "formality",
        }
    }

    /// Human label used when naming looks ("Gym Occasion").
    pub fn title(&self) -> &'static str {
        match self {
            Dimension::Occasion => "Occasion",
            Dimension::Aesthetic => "Aesthetic",
            Dimension::Color => "Color",
            Dimension::Formality => "Formality",
        }
    }
}

/// A catalog product. Tag sets are open vocabularies matched
/// case-insensitively; an empty `season` set means all-season.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub sku: String,
    pub slot: Slot,
    #[serde(default)]
    pub occasion: Vec<String>,
    #[serde(default)]
    pub aesthetics: Vec<String>,
    #[serde(default)]
    pub season: Vec<String>,
    /// 1..=5. `None` keeps the product out of formality clustering and
    /// formality gap checks.
    #[serde(default)]
    pub formality_score: Option<u8>,
    #[serde(default)]
    pub formality_level: String,
    #[serde(default)]
    pub primary_color: String,
    #[serde(default)]
    pub statement_piece: bool,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub brand: String,
    #[serde(default)]
    pub image_url: String,
    #[serde(rename = "type", default)]
    pub item_type: String,
    #[serde(default)]
    pub category: String,
}

impl Product {
    pub fn has_occasion(&self, value: &str) -> bool {
        contains_ci(&self.occasion, value)
    }

    pub fn has_aesthetic(&self, value: &str) -> bool {
        contains_ci(&self.aesthetics, value)
    }

    pub fn is_statement_top(&self) -> bool {
        self.statement_piece && self.slot == Slot::BaseTop
    }
}

/// True when the two tag sets share at least one value, ignoring case.
pub fn sets_intersect_ci(a: &[String], b: &[String]) -> bool {
    a.iter().any(|x| b.iter().any(|y| x.eq_ignore_ascii_case(y)))
}

fn contains_ci(set: &[String], value: &str) -> bool {
    set.iter().any(|x| x.eq_ignore_ascii_case(value))
}

/// A directed compatibility edge. `target_slot` always equals the slot of
/// `to_sku`; scores live in [0,1] with three decimals of precision.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Edge {
    pub from_sku: String,
    pub to_sku: String,
    pub target_slot: Slot,
    pub score: f64,
}

/// A product that survived edge retrieval, carrying its compatibility score
/// to the anchor. Lives only for the duration of one request.
#[derive(Debug, Clone)]
pub struct Candidate {
    pub product: Product,
    pub anchor_score: f64,
}

impl Candidate {
    pub fn sku(&self) -> &str {
        &self.product.sku
    }

    pub fn slot(&self) -> Slot {
        self.product.slot
    }
}

/// An assembled look, anchor included. Internal form; the wire shape is
/// [`GeneratedLook`].
#[derive(Debug, Clone)]
pub struct Look {
    pub dimension: Dimension,
    pub dimension_value: String,
    pub items: BTreeMap<Slot, Product>,
    /// Anchor slot first, then slots in the order the assembler filled them.
    pub slots_filled: Vec<Slot>,
    pub coherence: f64,
}

impl Look {
    pub fn skus(&self) -> BTreeSet<String> {
        self.items.values().map(|p| p.sku.clone()).collect()
    }
}

/// Wire shape of a single item inside a look.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LookItem {
    pub sku: String,
    pub title: String,
    pub brand: String,
    pub image_url: String,
    #[serde(rename = "type")]
    pub item_type: String,
    pub color: String,
    pub slot: String,
}

impl LookItem {
    pub fn from_product(product: &Product) -> Self {
        Self {
            sku: product.sku.clone(),
            title: product.title.clone(),
            brand: product.brand.clone(),
            image_url: product.image_url.clone(),
            item_type: product.item_type.clone(),
            color: product.primary_color.clone(),
            slot: product.slot.wire_name().to_string(),
        }
    }
}

/// Wire shape of one generated look.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedLook {
    pub id: String,
    pub name: String,
    pub dimension: Dimension,
    pub dimension_value: String,
    pub coherence: f64,
    pub items: BTreeMap<String, LookItem>,
    pub slots_filled: Vec<String>,
}

impl GeneratedLook {
    /// `index` is 1-based; ids have the form `look_<index>`.
    pub fn from_look(look: &Look, index: usize) -> Self {
        let items = look
            .items
            .iter()
            .map(|(slot, product)| (slot.wire_name().to_string(), LookItem::from_product(product)))
            .collect();
        Self {
            id: format!("look_{}", index),
            name: format!("{} {}", look.dimension_value, look.dimension.title()),
            dimension: look.dimension,
            dimension_value: look.dimension_value.clone(),
            coherence: look.coherence,
            items,
            slots_filled: look
                .slots_filled
                .iter()
                .map(|s| s.wire_name().to_string())
                .collect(),
        }
    }
}

/// Full response for one `(anchor, num_looks)` request. Cached values are
/// shared behind `Arc` and must never be mutated.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LooksResponse {
    pub anchor: LookItem,
    pub looks: Vec<GeneratedLook>,
    pub total_looks: usize,
}
