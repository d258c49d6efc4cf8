use crate::domain::listing::CleanedListing;
use crate::domain::logic::looks_like_rental;

/// How a property kind treats suspiciously priced rows during extraction.
///
/// Sale kinds drop rows that look like mislabeled rentals; rent kinds are
/// the complement and keep exactly those rows. Kinds sharing a label pick
/// matching floor/ceiling values so the split over that label is exhaustive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PriceRule {
    /// Sale dataset: drop rental-looking rows and anything below the floor.
    SaleFloor(f64),
    /// Rental dataset: keep only rental-looking rows or anything below the
    /// ceiling.
    RentCeiling(f64),
    /// No price filtering (land has no rental counterpart).
    Unfiltered,
}

/// One property type, fully data-driven: alias used for storage/schema
/// lookups, the decoded label it matches on, and its price rule.
#[derive(Debug, Clone, Copy)]
pub struct PropertyKind {
    pub alias: &'static str,
    pub label: &'static str,
    pub rule: PriceRule,
}

pub const ALL_PROPERTY: [PropertyKind; 6] = [
    PropertyKind {
        alias: "res_apartment",
        label: "residential apartment",
        rule: PriceRule::SaleFloor(10_00_000.0),
    },
    PropertyKind {
        alias: "rent_apartment",
        label: "residential apartment",
        rule: PriceRule::RentCeiling(10_00_000.0),
    },
    PropertyKind {
        alias: "ind_floor",
        label: "independent/builder floor",
        rule: PriceRule::SaleFloor(8_00_000.0),
    },
    PropertyKind {
        alias: "rent_ind_floor",
        label: "independent/builder floor",
        rule: PriceRule::RentCeiling(8_00_000.0),
    },
    PropertyKind {
        alias: "ind_house",
        label: "independent house/villa",
        rule: PriceRule::SaleFloor(6_00_000.0),
    },
    PropertyKind {
        alias: "res_land",
        label: "residential land",
        rule: PriceRule::Unfiltered,
    },
];

impl PropertyKind {
    pub fn by_alias(alias: &str) -> Option<&'static PropertyKind> {
        ALL_PROPERTY.iter().find(|k| k.alias == alias)
    }

    fn is_rental_row(&self, row: &CleanedListing, threshold: f64) -> bool {
        looks_like_rental(row.description.as_deref(), row.price) || row.price < threshold
    }

    /// Filters the cleaned dataset down to this kind's rows: exact label
    /// match, then the kind's price rule.
    pub fn extract(&self, rows: &[CleanedListing]) -> Vec<CleanedListing> {
        rows.iter()
            .filter(|r| r.property_type.as_deref() == Some(self.label))
            .filter(|r| match self.rule {
                PriceRule::SaleFloor(floor) => !self.is_rental_row(r, floor),
                PriceRule::RentCeiling(ceiling) => self.is_rental_row(r, ceiling),
                PriceRule::Unfiltered => true,
            })
            .cloned()
            .collect()
    }

    /// Canonical stored id for per-type datasets: the source listing URL.
    pub fn canonical_prop_id(prop_id: &str) -> String {
        format!("https://99acres.com/{}", prop_id.to_uppercase())
    }
}
