//! Local Schema
//!
//! Builds schema.org JSON-LD documents for local and medical businesses
//! from wizard-style form state.
//!
//! The pipeline is: pick a [`Shape`], fill a [`FormState`] (by hand, or by
//! merging [`AddressFields`] extracted from a place-lookup record), then
//! [`build`] the document. The builder omits blank input and finishes with
//! [`clean`], so the output never carries empty strings, objects or lists.
//!
//! # Example
//!
//! ```
//! use local_schema::{build, BuildOptions, FormState, Shape, SocialPlatform};
//! use serde_json::json;
//!
//! let shape = Shape::local_business(["Dentist"]);
//! let mut form = FormState::default();
//! form.name = "Bright Smile".to_string();
//! form.url = "https://brightsmile.ae".to_string();
//! form.socials.set(SocialPlatform::Instagram, "brightsmile");
//!
//! let doc = build(&shape, &form, &BuildOptions::default());
//!
//! assert_eq!(doc["@type"], "Dentist");
//! assert_eq!(doc["@id"], "https://brightsmile.ae/#business");
//! assert_eq!(doc["sameAs"], json!(["https://www.instagram.com/brightsmile"]));
//! assert!(doc.get("address").is_none());
//! ```
//!
//! # Shapes
//!
//! | Shape | Root `@type` | Locations become |
//! |-------|--------------|------------------|
//! | Medical practitioner | `Person` | `worksFor` |
//! | Medical clinic | `MedicalBusiness` | `department` |
//! | Local business | business types, or `LocalBusiness` | `@graph` branches |
//! | Service | `Service` | `provider` |
//!
//! With `Single` cardinality the first location is emitted as one object;
//! with `Multiple` every location is emitted with a `#branch-...` id.

mod address;
mod builder;
mod cleaner;
mod config;
mod error;
mod export;
mod form;
mod loader;
mod store;
mod template;
mod types;

pub use address::{
    extract, resolve_country, AddressComponent, AddressFields, ExtractOptions, Geometry,
    LatLngAccessor, PlaceLocation, PlaceRecord, COUNTRIES,
};
pub use builder::{build, build_raw};
pub use cleaner::{clean, clean_or_empty};
pub use config::{Config, PlacesConfig, DEFAULT_HISTORY_PATH};
pub use error::{LoadError, StoreError};
pub use export::{render, script_tag, suggested_file_name};
pub use form::{
    FormField, FormState, Location, LocationField, OpeningHours, PostalField, PostalFields,
    ReviewEntry, ServiceEntry, SocialHandles, SocialPlatform, TextField, WEEKDAYS,
};
pub use loader::{
    is_url, load_form, load_json, load_json_auto, load_json_str, load_place, parse_form,
    parse_place,
};
pub use store::{merge, FileStore, History, Notice, Snapshot, SnapshotStore, WithNotice};
pub use template::{
    Entry, FieldMapping, Placeholder, PostalPlaceholders, RootType, Section, ServiceStyle,
    Template, Transform,
};
pub use types::{
    domain_of, slugify, BlankPolicy, BuildOptions, Cardinality, EntityKind, Shape,
    SCHEMA_CONTEXT,
};

#[cfg(feature = "remote")]
pub use loader::load_json_url;
#[cfg(feature = "remote")]
pub use store::HttpStore;
