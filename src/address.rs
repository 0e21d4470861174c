//! Address extraction from place-lookup records.
//!
//! A place record carries tagged address components (`locality`,
//! `postal_code`, `country`, ...) and optional geometry. [`extract`] maps it
//! onto the flat address fields the form uses. Missing components or
//! geometry produce a partial result, never an error.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Deserializer, Serialize};
use tracing::debug;

/// Countries the place lookup is restricted to: (short code, long name).
pub const COUNTRIES: &[(&str, &str)] = &[
    ("AE", "United Arab Emirates"),
    ("SA", "Saudi Arabia"),
    ("US", "United States"),
    ("GB", "United Kingdom"),
    ("CA", "Canada"),
    ("IN", "India"),
    ("PK", "Pakistan"),
    ("EG", "Egypt"),
    ("JO", "Jordan"),
    ("KW", "Kuwait"),
    ("QA", "Qatar"),
    ("BH", "Bahrain"),
    ("OM", "Oman"),
];

/// Place record as returned by the external lookup.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PlaceRecord {
    pub place_id: Option<String>,
    pub formatted_address: Option<String>,
    pub name: Option<String>,
    pub address_components: Option<Vec<AddressComponent>>,
    pub geometry: Option<Geometry>,
    pub formatted_phone_number: Option<String>,
    pub website: Option<String>,
    pub rating: Option<f64>,
}

/// One tagged fragment of an address.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AddressComponent {
    pub long_name: String,
    pub short_name: String,
    pub types: Vec<String>,
}

impl AddressComponent {
    pub fn new(long_name: &str, short_name: &str, types: &[&str]) -> Self {
        Self {
            long_name: long_name.to_string(),
            short_name: short_name.to_string(),
            types: types.iter().map(|t| t.to_string()).collect(),
        }
    }

    fn has_type(&self, tag: &str) -> bool {
        self.types.iter().any(|t| t == tag)
    }
}

/// Geometry payload of a place.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Geometry {
    pub location: Option<PlaceLocation>,
}

/// Coordinates exposed through accessor methods.
pub trait LatLngAccessor {
    fn lat(&self) -> f64;
    fn lng(&self) -> f64;
}

/// Coordinates of a place, in either of the two lookup conventions.
#[derive(Clone)]
pub enum PlaceLocation {
    /// Plain numeric fields.
    Plain { lat: f64, lng: f64 },
    /// Values read through `lat()` / `lng()`.
    Accessor(Arc<dyn LatLngAccessor + Send + Sync>),
}

impl PlaceLocation {
    pub fn coordinates(&self) -> (f64, f64) {
        match self {
            PlaceLocation::Plain { lat, lng } => (*lat, *lng),
            PlaceLocation::Accessor(accessor) => (accessor.lat(), accessor.lng()),
        }
    }
}

impl fmt::Debug for PlaceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (lat, lng) = self.coordinates();
        let kind = match self {
            PlaceLocation::Plain { .. } => "Plain",
            PlaceLocation::Accessor(_) => "Accessor",
        };
        f.debug_struct(kind)
            .field("lat", &lat)
            .field("lng", &lng)
            .finish()
    }
}

impl<'de> Deserialize<'de> for PlaceLocation {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        struct Plain {
            #[serde(alias = "latitude")]
            lat: f64,
            #[serde(alias = "longitude")]
            lng: f64,
        }

        let Plain { lat, lng } = Plain::deserialize(deserializer)?;
        Ok(PlaceLocation::Plain { lat, lng })
    }
}

/// Options controlling which fields the extractor resolves.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExtractOptions {
    /// Default `area_served` to the resolved city.
    pub area_served: bool,
    /// Pass through the place's phone number and website.
    pub business_details: bool,
}

/// Flat address fields resolved from a place. `None` means unresolved.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressFields {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub street: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub postal_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latitude: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub longitude: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub area_served: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub telephone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
}

impl AddressFields {
    /// True when street, city and both coordinates were resolved.
    ///
    /// A partial result can be re-requested once the lookup has more data.
    pub fn is_complete(&self) -> bool {
        self.street.is_some()
            && self.city.is_some()
            && self.latitude.is_some()
            && self.longitude.is_some()
    }
}

/// City tags in priority order.
const CITY_TAGS: &[&[&str]] = &[
    &["locality"],
    &["sublocality", "sublocality_level_1"],
    &["administrative_area_level_2"],
];

/// Resolve flat address fields from a place record.
pub fn extract(place: &PlaceRecord, options: &ExtractOptions) -> AddressFields {
    let mut fields = AddressFields::default();
    let mut street_number = "";
    let mut route = "";
    // (priority, value); lower priority wins, ties keep the first seen
    let mut city: Option<(usize, &str)> = None;

    let components = place.address_components.as_deref().unwrap_or_default();
    for component in components {
        let long_name = component.long_name.trim();

        if component.has_type("street_number") && street_number.is_empty() {
            street_number = long_name;
        }
        if component.has_type("route") && route.is_empty() {
            route = long_name;
        }
        if let Some(rank) = city_rank(component) {
            if !long_name.is_empty() && city.map_or(true, |(best, _)| rank < best) {
                city = Some((rank, long_name));
            }
        }
        if component.has_type("administrative_area_level_1") {
            set_once(&mut fields.region, long_name);
        }
        if component.has_type("postal_code") {
            set_once(&mut fields.postal_code, long_name);
        }
        if component.has_type("country") && fields.country.is_none() {
            fields.country = resolve_country(component);
        }
    }

    let street = format!("{} {}", street_number, route);
    set_once(&mut fields.street, street.trim());
    fields.city = city.map(|(_, name)| name.to_string());

    if let Some((lat, lng)) = coordinates(place) {
        fields.latitude = Some(lat.to_string());
        fields.longitude = Some(lng.to_string());
    }

    if options.area_served {
        fields.area_served = fields.city.clone();
    }

    if options.business_details {
        set_once(
            &mut fields.telephone,
            place.formatted_phone_number.as_deref().unwrap_or_default(),
        );
        set_once(&mut fields.website, place.website.as_deref().unwrap_or_default());
    }

    debug!(
        place_id = place.place_id.as_deref().unwrap_or(""),
        complete = fields.is_complete(),
        "extracted address fields"
    );

    fields
}

/// Map a country component onto the fixed table, else its raw short code.
pub fn resolve_country(component: &AddressComponent) -> Option<String> {
    let short = component.short_name.trim();
    let long = component.long_name.trim();

    COUNTRIES
        .iter()
        .find(|(code, name)| code.eq_ignore_ascii_case(short) || name.eq_ignore_ascii_case(long))
        .map(|(code, _)| code.to_string())
        .or_else(|| (!short.is_empty()).then(|| short.to_string()))
}

fn city_rank(component: &AddressComponent) -> Option<usize> {
    CITY_TAGS
        .iter()
        .position(|tags| tags.iter().any(|tag| component.has_type(tag)))
}

fn coordinates(place: &PlaceRecord) -> Option<(f64, f64)> {
    let location = place.geometry.as_ref()?.location.as_ref()?;
    let (lat, lng) = location.coordinates();
    (lat.is_finite() && lng.is_finite()).then_some((lat, lng))
}

fn set_once(slot: &mut Option<String>, value: &str) {
    if slot.is_none() && !value.trim().is_empty() {
        *slot = Some(value.trim().to_string());
    }
}
