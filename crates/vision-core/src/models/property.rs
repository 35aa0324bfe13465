use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use super::RecordId;
use crate::api::request::{FilePart, MultipartForm, Query};

/// Multipart field name the backend reads uploaded images from.
pub const IMAGES_FIELD: &str = "images";

fn default_true() -> bool {
    true
}

/// A listed property as returned by `/properties`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS))]
pub struct Property {
    #[serde(rename = "_id", alias = "id")]
    pub id: RecordId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "type", default)]
    pub property_type: String,
    #[serde(default)]
    pub price: f64,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub area: f64,
    #[serde(default)]
    pub bedrooms: u32,
    #[serde(default)]
    pub bathrooms: u32,
    #[serde(default)]
    pub garages: u32,
    /// Absolute URLs (CDN uploads) or server-relative paths (older uploads)
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default = "default_true")]
    pub active: bool,
    #[serde(default)]
    pub featured: bool,
    #[serde(rename = "createdAt", default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Property {
    pub fn main_image(&self) -> Option<&str> {
        self.images.first().map(String::as_str).filter(|s| !s.is_empty())
    }

    pub fn photo_count(&self) -> usize {
        self.images.len()
    }
}

/// Number of properties currently shown on the public site.
pub fn count_active(properties: &[Property]) -> usize {
    properties.iter().filter(|p| p.active).count()
}

/// Filters accepted by `GET /properties`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PropertyFilters {
    pub property_type: Option<String>,
    pub location: Option<String>,
    pub max_price: Option<f64>,
    pub active: Option<bool>,
}

impl PropertyFilters {
    /// Build filters from the raw values of the home-page search box.
    /// Blank inputs are dropped; an unparseable price is ignored.
    pub fn from_search(location: &str, property_type: &str, max_price: &str) -> Self {
        let non_blank = |s: &str| {
            let s = s.trim();
            (!s.is_empty()).then(|| s.to_string())
        };

        let max_price = non_blank(max_price).and_then(|raw| match raw.parse::<f64>() {
            Ok(price) if price.is_finite() && price >= 0.0 => Some(price),
            _ => {
                warn!(input = %raw, "Ignoring invalid max price filter");
                None
            }
        });

        Self {
            property_type: non_blank(property_type),
            location: non_blank(location),
            max_price,
            active: None,
        }
    }

    pub fn query(&self) -> Query {
        let mut query = Query::new();
        query.push_opt("type", self.property_type.as_deref());
        query.push_opt("location", self.location.as_deref());
        query.push_opt("maxPrice", self.max_price);
        query.push_opt("active", self.active);
        query
    }
}

/// Visibility filter for the admin property table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListingStatus {
    Active,
    Inactive,
}

impl std::str::FromStr for ListingStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "active" | "ativo" => Ok(ListingStatus::Active),
            "inactive" | "inativo" => Ok(ListingStatus::Inactive),
            other => Err(format!("Unknown status: {}", other)),
        }
    }
}

/// Client-side narrowing of an already fetched admin table.
///
/// The search text matches title or location, case-insensitively.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AdminPropertyFilter {
    pub search: Option<String>,
    pub property_type: Option<String>,
    pub status: Option<ListingStatus>,
}

impl AdminPropertyFilter {
    pub fn matches(&self, property: &Property) -> bool {
        if let Some(search) = self.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            let needle = search.to_lowercase();
            if !property.title.to_lowercase().contains(&needle)
                && !property.location.to_lowercase().contains(&needle)
            {
                return false;
            }
        }

        if let Some(kind) = self.property_type.as_deref().filter(|t| !t.is_empty()) {
            if property.property_type != kind {
                return false;
            }
        }

        match self.status {
            Some(ListingStatus::Active) => property.active,
            Some(ListingStatus::Inactive) => !property.active,
            None => true,
        }
    }

    pub fn apply<'a>(&self, properties: &'a [Property]) -> Vec<&'a Property> {
        properties.iter().filter(|p| self.matches(p)).collect()
    }
}

/// Multipart payload for creating or updating a property.
///
/// Every scalar is optional so the same form serves partial updates; only
/// the fields that are set are sent.
#[derive(Debug, Clone, Default)]
pub struct PropertyForm {
    pub title: Option<String>,
    pub description: Option<String>,
    pub property_type: Option<String>,
    pub price: Option<f64>,
    pub location: Option<String>,
    pub area: Option<f64>,
    pub bedrooms: Option<u32>,
    pub bathrooms: Option<u32>,
    pub garages: Option<u32>,
    pub active: Option<bool>,
    pub images: Vec<FilePart>,
}

impl PropertyForm {
    /// Form that only flips the listing's visibility.
    pub fn active_only(active: bool) -> Self {
        Self {
            active: Some(active),
            ..Default::default()
        }
    }

    pub fn with_image(mut self, image: FilePart) -> Self {
        self.images.push(image);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.to_multipart().is_empty()
    }

    pub fn to_multipart(&self) -> MultipartForm {
        let mut form = MultipartForm::new();
        form.push_opt("title", self.title.as_deref());
        form.push_opt("description", self.description.as_deref());
        form.push_opt("type", self.property_type.as_deref());
        form.push_opt("price", self.price);
        form.push_opt("location", self.location.as_deref());
        form.push_opt("area", self.area);
        form.push_opt("bedrooms", self.bedrooms);
        form.push_opt("bathrooms", self.bathrooms);
        form.push_opt("garages", self.garages);
        form.push_opt("active", self.active);
        for image in &self.images {
            form.push_file(IMAGES_FIELD, image.clone());
        }
        form
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_property_with_defaults() {
        let json = r#"{"_id":"p1","title":"Casa no Centro","type":"venda","price":450000,"location":"Centro","images":["/uploads/a.jpg"]}"#;
        let property: Property = serde_json::from_str(json).unwrap();
        assert_eq!(property.id, "p1");
        assert_eq!(property.property_type, "venda");
        assert_eq!(property.price, 450000.0);
        assert_eq!(property.bedrooms, 0);
        assert!(property.active);
        assert!(!property.featured);
        assert_eq!(property.main_image(), Some("/uploads/a.jpg"));
        assert!(property.created_at.is_none());
    }

    #[test]
    fn test_count_active() {
        let mut a: Property = serde_json::from_str(r#"{"_id":"a","title":"A"}"#).unwrap();
        let b = a.clone();
        a.active = false;
        assert_eq!(count_active(&[a, b]), 1);
        assert_eq!(count_active(&[]), 0);
    }

    #[test]
    fn test_filters_omit_blank_values() {
        let filters = PropertyFilters::from_search("Downtown", "  ", "");
        let query = filters.query();
        assert_eq!(query.pairs(), &[("location".to_string(), "Downtown".to_string())]);
    }

    #[test]
    fn test_filters_parse_price() {
        let filters = PropertyFilters::from_search("", "aluguel", "2500");
        assert_eq!(filters.max_price, Some(2500.0));
        assert_eq!(filters.query().get("maxPrice"), Some("2500"));
        assert_eq!(filters.query().get("type"), Some("aluguel"));

        let filters = PropertyFilters::from_search("", "", "cheap");
        assert_eq!(filters.max_price, None);
        assert!(filters.query().is_empty());
    }

    #[test]
    fn test_admin_filter() {
        let properties: Vec<Property> = serde_json::from_str(
            r#"[
                {"_id":"a","title":"Casa Verde","location":"Centro","type":"venda"},
                {"_id":"b","title":"Apartamento","location":"Jardim Verde","type":"aluguel","active":false},
                {"_id":"c","title":"Sala Comercial","location":"Centro","type":"venda","active":false}
            ]"#,
        )
        .unwrap();

        let ids = |filter: &AdminPropertyFilter| -> Vec<String> {
            filter.apply(&properties).iter().map(|p| p.id.to_string()).collect()
        };

        assert_eq!(ids(&AdminPropertyFilter::default()), vec!["a", "b", "c"]);

        let search = AdminPropertyFilter {
            search: Some("VERDE".into()),
            ..Default::default()
        };
        assert_eq!(ids(&search), vec!["a", "b"]);

        let inactive_sales = AdminPropertyFilter {
            property_type: Some("venda".into()),
            status: Some(ListingStatus::Inactive),
            ..Default::default()
        };
        assert_eq!(ids(&inactive_sales), vec!["c"]);

        assert_eq!("ativo".parse::<ListingStatus>(), Ok(ListingStatus::Active));
        assert!("maybe".parse::<ListingStatus>().is_err());
    }

    #[test]
    fn test_active_only_form() {
        let form = PropertyForm::active_only(false).to_multipart();
        assert_eq!(form.text_fields().len(), 1);
        assert_eq!(form.text_value("active"), Some("false"));
        assert_eq!(form.file_count(IMAGES_FIELD), 0);
    }

    #[test]
    fn test_full_form_has_every_field_and_images() {
        let form = PropertyForm {
            title: Some("Apartamento".into()),
            description: Some("Vista para o mar".into()),
            property_type: Some("venda".into()),
            price: Some(850000.0),
            location: Some("Praia".into()),
            area: Some(92.5),
            bedrooms: Some(3),
            bathrooms: Some(2),
            garages: Some(1),
            active: None,
            images: Vec::new(),
        }
        .with_image(FilePart::new("front.jpg", "image/jpeg", vec![1, 2, 3]))
        .with_image(FilePart::new("back.png", "image/png", vec![4]));

        let multipart = form.to_multipart();
        for field in ["title", "description", "type", "price", "location", "area", "bedrooms", "bathrooms", "garages"] {
            assert!(multipart.text_value(field).is_some(), "missing {}", field);
        }
        assert_eq!(multipart.text_value("area"), Some("92.5"));
        assert_eq!(multipart.text_value("active"), None);
        assert_eq!(multipart.file_count(IMAGES_FIELD), 2);
        assert!(!form.is_empty());
        assert!(PropertyForm::default().is_empty());
    }
}
