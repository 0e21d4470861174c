//! Form state: everything the user has entered, as typed records.
//!
//! Fields are updated through enums (`TextField`, `PostalField`,
//! `LocationField`, `SocialPlatform`) rather than dotted path strings, so
//! every mutation names a field that exists.

use serde::{Deserialize, Serialize};

use crate::address::AddressFields;
use crate::types::{Cardinality, Shape};

/// Weekdays in schema.org spelling.
pub const WEEKDAYS: &[&str] = &["Monday", "Tuesday", "Wednesday", "Thursday", "Friday"];

/// Flat record of everything entered in the wizard.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FormState {
    pub name: String,
    pub legal_name: String,
    pub honorific_suffix: String,
    pub job_title: String,
    pub description: String,
    pub url: String,
    pub logo: String,
    pub image: String,
    pub telephone: String,
    pub email: String,
    pub price_range: String,
    pub address: PostalFields,
    pub latitude: String,
    pub longitude: String,
    pub area_served: String,
    pub currency: String,
    pub price: String,
    pub service_type: String,
    pub valid_from: String,
    pub opening_hours: Vec<OpeningHours>,
    pub services: Vec<ServiceEntry>,
    pub socials: SocialHandles,
    pub same_as: Vec<String>,
    pub rating_value: String,
    pub review_count: String,
    pub reviews: Vec<ReviewEntry>,
    pub locations: Vec<Location>,
}

/// Postal address parts.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PostalFields {
    pub street: String,
    pub city: String,
    pub region: String,
    pub postal_code: String,
    pub country: String,
}

/// One opening-hours row: a set of days sharing the same times.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OpeningHours {
    pub days: Vec<String>,
    pub opens: String,
    pub closes: String,
}

impl OpeningHours {
    pub fn new<I, S>(days: I, opens: &str, closes: &str) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            days: days.into_iter().map(Into::into).collect(),
            opens: opens.to_string(),
            closes: closes.to_string(),
        }
    }
}

/// A service or treatment offered at a location.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceEntry {
    pub name: String,
    pub price: String,
    pub url: String,
}

impl ServiceEntry {
    pub fn new(name: &str, price: &str) -> Self {
        Self {
            name: name.to_string(),
            price: price.to_string(),
            url: String::new(),
        }
    }
}

/// A single customer review.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ReviewEntry {
    pub author: String,
    pub rating_value: String,
    pub body: String,
}

/// Raw social handles, one per supported platform.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SocialHandles {
    pub instagram: String,
    pub facebook: String,
    pub tiktok: String,
    pub linkedin: String,
    pub twitter: String,
    pub youtube: String,
}

/// A workplace, department, branch or provider.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Location {
    pub name: String,
    pub url: String,
    pub telephone: String,
    pub address: PostalFields,
    pub latitude: String,
    pub longitude: String,
    pub opening_hours: Vec<OpeningHours>,
    pub services: Vec<ServiceEntry>,
    pub reviews: Vec<ReviewEntry>,
}

/// Top-level scalar fields of [`FormState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextField {
    Name,
    LegalName,
    HonorificSuffix,
    JobTitle,
    Description,
    Url,
    Logo,
    Image,
    Telephone,
    Email,
    PriceRange,
    Latitude,
    Longitude,
    AreaServed,
    Currency,
    Price,
    ServiceType,
    ValidFrom,
    RatingValue,
    ReviewCount,
}

impl TextField {
    pub const ALL: &'static [TextField] = &[
        TextField::Name,
        TextField::LegalName,
        TextField::HonorificSuffix,
        TextField::JobTitle,
        TextField::Description,
        TextField::Url,
        TextField::Logo,
        TextField::Image,
        TextField::Telephone,
        TextField::Email,
        TextField::PriceRange,
        TextField::Latitude,
        TextField::Longitude,
        TextField::AreaServed,
        TextField::Currency,
        TextField::Price,
        TextField::ServiceType,
        TextField::ValidFrom,
        TextField::RatingValue,
        TextField::ReviewCount,
    ];

    /// JSON key of the field in a form file.
    pub fn key(&self) -> &'static str {
        match self {
            TextField::Name => "name",
            TextField::LegalName => "legalName",
            TextField::HonorificSuffix => "honorificSuffix",
            TextField::JobTitle => "jobTitle",
            TextField::Description => "description",
            TextField::Url => "url",
            TextField::Logo => "logo",
            TextField::Image => "image",
            TextField::Telephone => "telephone",
            TextField::Email => "email",
            TextField::PriceRange => "priceRange",
            TextField::Latitude => "latitude",
            TextField::Longitude => "longitude",
            TextField::AreaServed => "areaServed",
            TextField::Currency => "currency",
            TextField::Price => "price",
            TextField::ServiceType => "serviceType",
            TextField::ValidFrom => "validFrom",
            TextField::RatingValue => "ratingValue",
            TextField::ReviewCount => "reviewCount",
        }
    }

    /// Parse a field from its JSON key. Returns `None` for unknown keys.
    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|f| f.key() == s)
    }
}

/// Parts of a [`PostalFields`] record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PostalField {
    Street,
    City,
    Region,
    PostalCode,
    Country,
}

impl PostalField {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "street" => Some(PostalField::Street),
            "city" => Some(PostalField::City),
            "region" => Some(PostalField::Region),
            "postalCode" => Some(PostalField::PostalCode),
            "country" => Some(PostalField::Country),
            _ => None,
        }
    }
}

/// Scalar fields of a [`Location`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LocationField {
    Name,
    Url,
    Telephone,
    Latitude,
    Longitude,
    Address(PostalField),
}

impl LocationField {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "name" => Some(LocationField::Name),
            "url" => Some(LocationField::Url),
            "telephone" => Some(LocationField::Telephone),
            "latitude" => Some(LocationField::Latitude),
            "longitude" => Some(LocationField::Longitude),
            other => PostalField::parse(other).map(LocationField::Address),
        }
    }
}

/// Platforms with a synthesized profile URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SocialPlatform {
    Instagram,
    Facebook,
    Tiktok,
    Linkedin,
    Twitter,
    Youtube,
}

impl SocialPlatform {
    /// Platforms in the order their links appear in `sameAs`.
    pub const ALL: &'static [SocialPlatform] = &[
        SocialPlatform::Instagram,
        SocialPlatform::Facebook,
        SocialPlatform::Tiktok,
        SocialPlatform::Linkedin,
        SocialPlatform::Twitter,
        SocialPlatform::Youtube,
    ];

    /// URL prefix the handle is appended to.
    pub fn prefix(&self) -> &'static str {
        match self {
            SocialPlatform::Instagram => "https://www.instagram.com/",
            SocialPlatform::Facebook => "https://www.facebook.com/",
            SocialPlatform::Tiktok => "https://www.tiktok.com/@",
            SocialPlatform::Linkedin => "https://www.linkedin.com/company/",
            SocialPlatform::Twitter => "https://x.com/",
            SocialPlatform::Youtube => "https://www.youtube.com/@",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "instagram" => Some(SocialPlatform::Instagram),
            "facebook" => Some(SocialPlatform::Facebook),
            "tiktok" => Some(SocialPlatform::Tiktok),
            "linkedin" => Some(SocialPlatform::Linkedin),
            "twitter" | "x" => Some(SocialPlatform::Twitter),
            "youtube" => Some(SocialPlatform::Youtube),
            _ => None,
        }
    }
}

/// Any single top-level field a value can be written to.
///
/// Address parts and social handles are addressed by their own names
/// (`city`, `instagram`), which do not collide with [`TextField`] keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormField {
    Text(TextField),
    Address(PostalField),
    Social(SocialPlatform),
}

impl FormField {
    pub fn parse(s: &str) -> Option<Self> {
        TextField::parse(s)
            .map(FormField::Text)
            .or_else(|| PostalField::parse(s).map(FormField::Address))
            .or_else(|| SocialPlatform::parse(s).map(FormField::Social))
    }
}

impl FormState {
    /// Default form for a shape, pre-populated with example values where
    /// the wizard offers them.
    pub fn for_shape(shape: &Shape) -> Self {
        match shape {
            Shape::Medical { cardinality, .. } => {
                let mut form = FormState {
                    opening_hours: vec![OpeningHours::new(
                        WEEKDAYS.iter().copied(),
                        "09:00",
                        "18:00",
                    )],
                    ..Default::default()
                };
                if *cardinality == Cardinality::Single {
                    form.locations.push(Location::default());
                }
                form
            }
            Shape::LocalBusiness { .. } => FormState {
                address: PostalFields {
                    country: "AE".to_string(),
                    ..Default::default()
                },
                currency: "AED".to_string(),
                rating_value: "4.9".to_string(),
                review_count: "187".to_string(),
                services: vec![
                    ServiceEntry::new("Anti-Wrinkle Injections", "900"),
                    ServiceEntry::new("Dermal Filler (1ml)", "1200"),
                ],
                opening_hours: vec![
                    OpeningHours::new(WEEKDAYS.iter().copied(), "09:00", "18:00"),
                    OpeningHours::new(["Saturday"], "10:00", "16:00"),
                ],
                ..Default::default()
            },
            Shape::Service => FormState {
                currency: "AED".to_string(),
                locations: vec![Location {
                    address: PostalFields {
                        country: "AE".to_string(),
                        ..Default::default()
                    },
                    ..Default::default()
                }],
                ..Default::default()
            },
        }
    }

    /// Current value of a top-level scalar field.
    pub fn text(&self, field: TextField) -> &str {
        match field {
            TextField::Name => &self.name,
            TextField::LegalName => &self.legal_name,
            TextField::HonorificSuffix => &self.honorific_suffix,
            TextField::JobTitle => &self.job_title,
            TextField::Description => &self.description,
            TextField::Url => &self.url,
            TextField::Logo => &self.logo,
            TextField::Image => &self.image,
            TextField::Telephone => &self.telephone,
            TextField::Email => &self.email,
            TextField::PriceRange => &self.price_range,
            TextField::Latitude => &self.latitude,
            TextField::Longitude => &self.longitude,
            TextField::AreaServed => &self.area_served,
            TextField::Currency => &self.currency,
            TextField::Price => &self.price,
            TextField::ServiceType => &self.service_type,
            TextField::ValidFrom => &self.valid_from,
            TextField::RatingValue => &self.rating_value,
            TextField::ReviewCount => &self.review_count,
        }
    }

    /// Set a top-level scalar field.
    pub fn set_text(&mut self, field: TextField, value: impl Into<String>) {
        let slot = match field {
            TextField::Name => &mut self.name,
            TextField::LegalName => &mut self.legal_name,
            TextField::HonorificSuffix => &mut self.honorific_suffix,
            TextField::JobTitle => &mut self.job_title,
            TextField::Description => &mut self.description,
            TextField::Url => &mut self.url,
            TextField::Logo => &mut self.logo,
            TextField::Image => &mut self.image,
            TextField::Telephone => &mut self.telephone,
            TextField::Email => &mut self.email,
            TextField::PriceRange => &mut self.price_range,
            TextField::Latitude => &mut self.latitude,
            TextField::Longitude => &mut self.longitude,
            TextField::AreaServed => &mut self.area_served,
            TextField::Currency => &mut self.currency,
            TextField::Price => &mut self.price,
            TextField::ServiceType => &mut self.service_type,
            TextField::ValidFrom => &mut self.valid_from,
            TextField::RatingValue => &mut self.rating_value,
            TextField::ReviewCount => &mut self.review_count,
        };
        *slot = value.into();
    }

    /// Set any top-level field.
    pub fn set(&mut self, field: FormField, value: impl Into<String>) {
        match field {
            FormField::Text(f) => self.set_text(f, value),
            FormField::Address(part) => self.address.set(part, value),
            FormField::Social(platform) => self.socials.set(platform, value),
        }
    }

    /// Mutable access to a location; `None` if the index is out of range.
    pub fn location_mut(&mut self, index: usize) -> Option<&mut Location> {
        self.locations.get_mut(index)
    }

    /// Merge extracted address fields into the top-level address.
    ///
    /// Resolved values overwrite; unresolved ones leave the field as is.
    pub fn apply_place(&mut self, place: &AddressFields) {
        self.address.apply_place(place);
        fill(&mut self.latitude, &place.latitude);
        fill(&mut self.longitude, &place.longitude);
        fill(&mut self.area_served, &place.area_served);
        fill(&mut self.telephone, &place.telephone);
        fill(&mut self.url, &place.website);
    }
}

impl PostalFields {
    pub fn get(&self, field: PostalField) -> &str {
        match field {
            PostalField::Street => &self.street,
            PostalField::City => &self.city,
            PostalField::Region => &self.region,
            PostalField::PostalCode => &self.postal_code,
            PostalField::Country => &self.country,
        }
    }

    pub fn set(&mut self, field: PostalField, value: impl Into<String>) {
        let slot = match field {
            PostalField::Street => &mut self.street,
            PostalField::City => &mut self.city,
            PostalField::Region => &mut self.region,
            PostalField::PostalCode => &mut self.postal_code,
            PostalField::Country => &mut self.country,
        };
        *slot = value.into();
    }

    fn apply_place(&mut self, place: &AddressFields) {
        fill(&mut self.street, &place.street);
        fill(&mut self.city, &place.city);
        fill(&mut self.region, &place.region);
        fill(&mut self.postal_code, &place.postal_code);
        fill(&mut self.country, &place.country);
    }
}

impl Location {
    pub fn set(&mut self, field: LocationField, value: impl Into<String>) {
        let slot = match field {
            LocationField::Name => &mut self.name,
            LocationField::Url => &mut self.url,
            LocationField::Telephone => &mut self.telephone,
            LocationField::Latitude => &mut self.latitude,
            LocationField::Longitude => &mut self.longitude,
            LocationField::Address(part) => return self.address.set(part, value),
        };
        *slot = value.into();
    }

    /// Merge extracted address fields into this location.
    pub fn apply_place(&mut self, place: &AddressFields) {
        self.address.apply_place(place);
        fill(&mut self.latitude, &place.latitude);
        fill(&mut self.longitude, &place.longitude);
        fill(&mut self.telephone, &place.telephone);
        fill(&mut self.url, &place.website);
    }
}

impl SocialHandles {
    pub fn get(&self, platform: SocialPlatform) -> &str {
        match platform {
            SocialPlatform::Instagram => &self.instagram,
            SocialPlatform::Facebook => &self.facebook,
            SocialPlatform::Tiktok => &self.tiktok,
            SocialPlatform::Linkedin => &self.linkedin,
            SocialPlatform::Twitter => &self.twitter,
            SocialPlatform::Youtube => &self.youtube,
        }
    }

    pub fn set(&mut self, platform: SocialPlatform, handle: impl Into<String>) {
        let slot = match platform {
            SocialPlatform::Instagram => &mut self.instagram,
            SocialPlatform::Facebook => &mut self.facebook,
            SocialPlatform::Tiktok => &mut self.tiktok,
            SocialPlatform::Linkedin => &mut self.linkedin,
            SocialPlatform::Twitter => &mut self.twitter,
            SocialPlatform::Youtube => &mut self.youtube,
        };
        *slot = handle.into();
    }
}

fn fill(slot: &mut String, value: &Option<String>) {
    if let Some(v) = value.as_deref().filter(|v| !v.trim().is_empty()) {
        *slot = v.to_string();
    }
}
