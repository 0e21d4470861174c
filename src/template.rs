//! Per-flavor document templates.
//!
//! A template is an ordered list of entries: plain field mappings copied
//! from the form, and sections that build a nested substructure. The
//! builder walks the entries in order, so key order in the output follows
//! the template. Adding a flavor means adding a template here.

use serde_json::{Number, Value};

use crate::form::TextField;
use crate::types::{parse_number, EntityKind, Shape};

/// How the root `@type` is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RootType {
    Fixed(&'static str),
    /// Taken from the shape's business-type tags, `fallback` when none.
    BusinessTypes { fallback: &'static str },
}

/// Conversion applied to a raw form value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transform {
    Text,
    /// Decimal number; unparseable input is dropped.
    Number,
    /// Whole number; unparseable input is dropped.
    Integer,
}

impl Transform {
    /// Convert a raw form value. Blank or unparseable input yields `None`.
    pub fn apply(&self, raw: &str) -> Option<Value> {
        let raw = raw.trim();
        if raw.is_empty() {
            return None;
        }
        match self {
            Transform::Text => Some(Value::String(raw.to_string())),
            Transform::Number => match raw.parse::<i64>() {
                Ok(whole) => Some(Value::from(whole)),
                Err(_) => parse_number(raw)
                    .and_then(Number::from_f64)
                    .map(Value::Number),
            },
            Transform::Integer => raw.parse::<u64>().ok().map(Value::from),
        }
    }
}

/// Visible stand-in for a blank field in placeholder mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placeholder {
    Text(&'static str),
    /// `https://{domain}` followed by the given path.
    SiteUrl(&'static str),
}

/// Copy one form field to one document key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldMapping {
    pub source: TextField,
    pub target: &'static str,
    pub transform: Transform,
    pub placeholder: Option<Placeholder>,
}

impl FieldMapping {
    pub const fn text(source: TextField, target: &'static str) -> Self {
        Self {
            source,
            target,
            transform: Transform::Text,
            placeholder: None,
        }
    }

    pub const fn or(mut self, placeholder: Placeholder) -> Self {
        self.placeholder = Some(placeholder);
        self
    }
}

/// Placeholders for postal address parts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PostalPlaceholders {
    pub street: &'static str,
    pub city: &'static str,
    pub region: &'static str,
    pub postal_code: &'static str,
}

/// How services are rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceStyle {
    /// `availableService` list of `MedicalProcedure`.
    Procedures,
    /// `makesOffer` list of `Offer` with a price specification.
    Offers,
}

/// A nested substructure built from several form fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    /// `@id` of the root: `https://{domain}/#{fragment}`.
    Identifier(&'static str),
    /// `image` list of hero image then logo.
    Images,
    SameAs,
    Address(Option<&'static PostalPlaceholders>),
    /// `geo` and the `hasMap` link.
    Geo,
    AreaServed,
    OpeningHours,
    Services(ServiceStyle),
    /// Workplaces or departments: one object or an array by cardinality.
    Locations {
        key: &'static str,
        type_name: &'static str,
    },
    AggregateRating,
    Reviews,
    /// `provider` list of businesses offering the service.
    Providers { type_name: &'static str },
    /// `offers` of a service document.
    ServiceOffer,
    /// `@graph` of an organization and its branches.
    BranchGraph,
}

/// One step of a template.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entry {
    Field(FieldMapping),
    Section(Section),
}

/// Declarative description of one document flavor.
#[derive(Debug)]
pub struct Template {
    pub name: &'static str,
    pub root_type: RootType,
    pub entries: &'static [Entry],
}

impl Template {
    /// Template for a shape.
    pub fn for_shape(shape: &Shape) -> &'static Template {
        match shape {
            Shape::Medical {
                entity: EntityKind::Practitioner,
                ..
            } => &PRACTITIONER,
            Shape::Medical {
                entity: EntityKind::Clinic,
                ..
            } => &CLINIC,
            Shape::LocalBusiness { .. } => &LOCAL_BUSINESS,
            Shape::Service => &SERVICE,
        }
    }

    pub fn fields(&self) -> impl Iterator<Item = &FieldMapping> {
        self.entries.iter().filter_map(|e| match e {
            Entry::Field(f) => Some(f),
            Entry::Section(_) => None,
        })
    }
}

pub const TELEPHONE_PLACEHOLDER: &str = "+971-XX-XXX-XXXX";
pub const CURRENCY_PLACEHOLDER: &str = "AED";
pub const ORGANIZATION_PLACEHOLDER: &str = "YOUR BRAND";

pub static BUSINESS_ADDRESS: PostalPlaceholders = PostalPlaceholders {
    street: "STREET, BUILDING, UNIT",
    city: "CITY",
    region: "EMIRATE/REGION",
    postal_code: "POSTCODE",
};

use Entry::{Field, Section as S};
use FieldMapping as F;

pub static PRACTITIONER: Template = Template {
    name: "practitioner",
    root_type: RootType::Fixed("Person"),
    entries: &[
        Field(F::text(TextField::Name, "name")),
        Field(F::text(TextField::HonorificSuffix, "honorificSuffix")),
        Field(F::text(TextField::JobTitle, "jobTitle")),
        Field(F::text(TextField::Description, "description")),
        Field(F::text(TextField::Url, "url")),
        Field(F::text(TextField::Telephone, "telephone")),
        Field(F::text(TextField::Email, "email")),
        S(Section::SameAs),
        S(Section::Locations {
            key: "worksFor",
            type_name: "MedicalClinic",
        }),
        S(Section::Reviews),
    ],
};

pub static CLINIC: Template = Template {
    name: "clinic",
    root_type: RootType::Fixed("MedicalBusiness"),
    entries: &[
        Field(F::text(TextField::Name, "name")),
        Field(F::text(TextField::Description, "description")),
        Field(F::text(TextField::Url, "url")),
        Field(F::text(TextField::Telephone, "telephone")),
        Field(F::text(TextField::Email, "email")),
        Field(F::text(TextField::PriceRange, "priceRange")),
        Field(F::text(TextField::Logo, "logo")),
        Field(F::text(TextField::Image, "image")),
        S(Section::SameAs),
        S(Section::Address(None)),
        S(Section::Geo),
        S(Section::OpeningHours),
        S(Section::Services(ServiceStyle::Procedures)),
        S(Section::Locations {
            key: "department",
            type_name: "MedicalClinic",
        }),
        S(Section::AggregateRating),
        S(Section::Reviews),
    ],
};

pub static LOCAL_BUSINESS: Template = Template {
    name: "local-business",
    root_type: RootType::BusinessTypes {
        fallback: "LocalBusiness",
    },
    entries: &[
        S(Section::Identifier("business")),
        Field(F::text(TextField::Name, "name").or(Placeholder::Text("YOUR CLINIC NAME"))),
        Field(
            F::text(TextField::LegalName, "legalName")
                .or(Placeholder::Text("YOUR LEGAL ENTITY (OPTIONAL)")),
        ),
        Field(F::text(TextField::Description, "description")),
        Field(F::text(TextField::Url, "url").or(Placeholder::Text("https://YOUR-DOMAIN/"))),
        Field(
            F::text(TextField::Telephone, "telephone")
                .or(Placeholder::Text(TELEPHONE_PLACEHOLDER)),
        ),
        Field(F::text(TextField::Email, "email").or(Placeholder::Text("INFO@YOUR-DOMAIN"))),
        S(Section::Images),
        Field(F::text(TextField::Logo, "logo").or(Placeholder::SiteUrl("/path/logo.png"))),
        Field(F::text(TextField::PriceRange, "priceRange")),
        S(Section::Address(Some(&BUSINESS_ADDRESS))),
        S(Section::Geo),
        S(Section::AreaServed),
        S(Section::SameAs),
        S(Section::OpeningHours),
        S(Section::Services(ServiceStyle::Offers)),
        S(Section::AggregateRating),
        S(Section::Reviews),
        S(Section::BranchGraph),
    ],
};

pub static SERVICE: Template = Template {
    name: "service",
    root_type: RootType::Fixed("Service"),
    entries: &[
        Field(F::text(TextField::Name, "name")),
        Field(F::text(TextField::Description, "description")),
        Field(F::text(TextField::ServiceType, "serviceType")),
        Field(F::text(TextField::Url, "url")),
        S(Section::Providers {
            type_name: "MedicalBusiness",
        }),
        S(Section::AreaServed),
        S(Section::ServiceOffer),
    ],
};
