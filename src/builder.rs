//! Document construction - turns form state into a schema.org JSON-LD document.
//!
//! The builder walks the template for the shape and emits each field or
//! section in order. Blank input is left out (or replaced by the template's
//! placeholder in [`BlankPolicy::Placeholder`] mode), numbers that do not
//! parse are treated as absent, and no input makes it fail.
//!
//! [`BlankPolicy::Placeholder`]: crate::BlankPolicy::Placeholder

use std::collections::HashSet;

use serde_json::{json, Map, Value};
use tracing::debug;

use crate::cleaner::clean_or_empty;
use crate::form::{
    FormState, Location, OpeningHours, PostalFields, ReviewEntry, ServiceEntry, SocialPlatform,
};
use crate::template::{
    Entry, FieldMapping, Placeholder, PostalPlaceholders, RootType, Section, ServiceStyle,
    Template, Transform, BUSINESS_ADDRESS, CURRENCY_PLACEHOLDER, ORGANIZATION_PLACEHOLDER,
    TELEPHONE_PLACEHOLDER,
};
use crate::types::{
    domain_of, is_blank, slugify, BuildOptions, Cardinality, Shape, IN_STOCK, MAP_LINK_BASE,
    PLACEHOLDER_DOMAIN, SCHEMA_CONTEXT,
};

/// Build the cleaned document for a shape and form.
///
/// # Example
///
/// ```
/// use local_schema::{build, BuildOptions, Cardinality, EntityKind, FormState, Shape};
///
/// let mut form = FormState::default();
/// form.name = "Dr. A".to_string();
///
/// let shape = Shape::medical(EntityKind::Practitioner, Cardinality::Single);
/// let doc = build(&shape, &form, &BuildOptions::default());
///
/// assert_eq!(doc["@type"], "Person");
/// assert_eq!(doc["name"], "Dr. A");
/// assert!(doc.get("worksFor").is_none());
/// ```
pub fn build(shape: &Shape, form: &FormState, options: &BuildOptions) -> Value {
    let document = clean_or_empty(&build_raw(shape, form, options));
    debug!(
        shape = %shape.label(),
        keys = document.as_object().map_or(0, Map::len),
        "built document"
    );
    document
}

/// Build the document without the final cleaning pass.
pub fn build_raw(shape: &Shape, form: &FormState, options: &BuildOptions) -> Value {
    let template = Template::for_shape(shape);
    let ctx = Context::new(shape, form, options);

    let mut doc = Map::new();
    doc.insert("@context".to_string(), Value::from(SCHEMA_CONTEXT));
    doc.insert("@type".to_string(), root_type(template.root_type, shape));

    for entry in template.entries {
        match entry {
            Entry::Field(mapping) => put(&mut doc, mapping.target, ctx.field(mapping)),
            Entry::Section(section) => ctx.section(*section, &mut doc),
        }
    }

    Value::Object(doc)
}

struct Context<'a> {
    shape: &'a Shape,
    form: &'a FormState,
    placeholders: bool,
    /// Site domain; the placeholder domain stands in when placeholders are on.
    domain: Option<String>,
}

impl<'a> Context<'a> {
    fn new(shape: &'a Shape, form: &'a FormState, options: &BuildOptions) -> Self {
        let placeholders = options.placeholders();
        let domain = Some(domain_of(&form.url))
            .filter(|d| !d.is_empty())
            .or_else(|| placeholders.then(|| PLACEHOLDER_DOMAIN.to_string()));

        Self {
            shape,
            form,
            placeholders,
            domain,
        }
    }

    fn cardinality(&self) -> Cardinality {
        match self.shape {
            Shape::Medical { cardinality, .. } => *cardinality,
            _ => Cardinality::Multiple,
        }
    }

    fn site_url(&self, path: &str) -> Option<String> {
        self.domain
            .as_ref()
            .map(|domain| format!("https://{}{}", domain, path))
    }

    fn or_placeholder(
        &self,
        value: Option<Value>,
        placeholder: Option<Placeholder>,
    ) -> Option<Value> {
        if value.is_some() || !self.placeholders {
            return value;
        }
        match placeholder? {
            Placeholder::Text(text) => Some(Value::from(text)),
            Placeholder::SiteUrl(path) => self.site_url(path).map(Value::from),
        }
    }

    fn text_or(&self, raw: &str, placeholder: &'static str) -> Option<Value> {
        self.or_placeholder(text(raw), Some(Placeholder::Text(placeholder)))
    }

    fn field(&self, mapping: &FieldMapping) -> Option<Value> {
        let value = mapping.transform.apply(self.form.text(mapping.source));
        self.or_placeholder(value, mapping.placeholder)
    }

    fn section(&self, section: Section, doc: &mut Map<String, Value>) {
        let form = self.form;
        match section {
            Section::Identifier(fragment) => put(
                doc,
                "@id",
                self.site_url(&format!("/#{}", fragment)).map(Value::from),
            ),
            Section::Images => put(doc, "image", self.images()),
            Section::SameAs => put(doc, "sameAs", same_as(form)),
            Section::Address(placeholders) => put(
                doc,
                "address",
                self.postal_address(&form.address, placeholders, ""),
            ),
            Section::Geo => insert_geo(doc, &form.latitude, &form.longitude),
            Section::AreaServed => {
                let mut area = Map::new();
                put(&mut area, "name", text(&form.area_served));
                put(doc, "areaServed", typed("City", area));
            }
            Section::OpeningHours => put(
                doc,
                "openingHoursSpecification",
                opening_hours(&form.opening_hours),
            ),
            Section::Services(ServiceStyle::Procedures) => {
                put(doc, "availableService", self.procedures(&form.services))
            }
            Section::Services(ServiceStyle::Offers) => {
                put(doc, "makesOffer", self.offers(&form.services))
            }
            Section::Locations { key, type_name } => {
                put(doc, key, self.locations(&form.locations, type_name))
            }
            Section::AggregateRating => put(doc, "aggregateRating", aggregate_rating(form)),
            Section::Reviews => put(doc, "review", reviews(&form.reviews)),
            Section::Providers { type_name } => put(doc, "provider", self.providers(type_name)),
            Section::ServiceOffer => put(doc, "offers", service_offer(form)),
            Section::BranchGraph => put(doc, "@graph", self.branch_graph()),
        }
    }

    fn images(&self) -> Option<Value> {
        let form = self.form;
        if is_blank(&form.image) && is_blank(&form.logo) {
            return None;
        }
        let hero = self.or_placeholder(
            text(&form.image),
            Some(Placeholder::SiteUrl("/path/hero.jpg")),
        );
        let logo = self.or_placeholder(
            text(&form.logo),
            Some(Placeholder::SiteUrl("/path/logo.png")),
        );
        non_empty(hero.into_iter().chain(logo).collect())
    }

    fn postal_address(
        &self,
        fields: &PostalFields,
        placeholders: Option<&PostalPlaceholders>,
        fallback_country: &str,
    ) -> Option<Value> {
        let ph = placeholders.filter(|_| self.placeholders);
        let part = |raw: &str, placeholder: Option<&'static str>| {
            text(raw).or_else(|| placeholder.map(Value::from))
        };

        let mut address = Map::new();
        put(&mut address, "streetAddress", part(&fields.street, ph.map(|p| p.street)));
        put(&mut address, "addressLocality", part(&fields.city, ph.map(|p| p.city)));
        put(&mut address, "addressRegion", part(&fields.region, ph.map(|p| p.region)));
        put(
            &mut address,
            "postalCode",
            part(&fields.postal_code, ph.map(|p| p.postal_code)),
        );
        put(
            &mut address,
            "addressCountry",
            text(&fields.country).or_else(|| text(fallback_country)),
        );
        typed("PostalAddress", address)
    }

    fn service_url(&self, service: &ServiceEntry) -> Option<Value> {
        text(&service.url).or_else(|| {
            let slug = slugify(&service.name);
            if slug.is_empty() {
                return None;
            }
            self.site_url(&format!("/treatments/{}/", slug)).map(Value::from)
        })
    }

    fn procedures(&self, services: &[ServiceEntry]) -> Option<Value> {
        let items = services
            .iter()
            .filter_map(|service| {
                let name = text(&service.name)?;
                let mut procedure = Map::new();
                procedure.insert("name".to_string(), name);
                put(&mut procedure, "url", self.service_url(service));
                typed("MedicalProcedure", procedure)
            })
            .collect();
        non_empty(items)
    }

    fn offers(&self, services: &[ServiceEntry]) -> Option<Value> {
        let currency = self.text_or(&self.form.currency, CURRENCY_PLACEHOLDER);

        let items = services
            .iter()
            .filter(|s| !is_blank(&s.name))
            .filter_map(|service| {
                let price = Transform::Number
                    .apply(&service.price)
                    .or_else(|| self.placeholders.then(|| Value::from(0)));

                let mut offer = Map::new();
                put(&mut offer, "name", text(&service.name));
                put(&mut offer, "url", self.service_url(service));
                put(&mut offer, "priceCurrency", currency.clone());
                if price.is_some() {
                    let mut spec = Map::new();
                    put(&mut spec, "price", price);
                    put(&mut spec, "priceCurrency", currency.clone());
                    put(&mut offer, "priceSpecification", typed("PriceSpecification", spec));
                }
                offer.insert("availability".to_string(), Value::from(IN_STOCK));
                typed("Offer", offer)
            })
            .collect();
        non_empty(items)
    }

    fn branch_id(&self, fragment: &str) -> String {
        match &self.domain {
            Some(domain) => format!("https://{}/#branch-{}", domain, fragment),
            None => format!("#branch-{}", fragment),
        }
    }

    fn locations(&self, locations: &[Location], type_name: &str) -> Option<Value> {
        match self.cardinality() {
            Cardinality::Single => locations
                .first()
                .and_then(|loc| self.location(loc, type_name, None)),
            Cardinality::Multiple => {
                let items = locations
                    .iter()
                    .zip(branch_fragments(locations))
                    .filter_map(|(loc, fragment)| {
                        self.location(loc, type_name, Some(self.branch_id(&fragment)))
                    })
                    .collect();
                non_empty(items)
            }
        }
    }

    fn location(&self, loc: &Location, type_name: &str, id: Option<String>) -> Option<Value> {
        let mut content = Map::new();
        put(&mut content, "name", text(&loc.name));
        put(&mut content, "url", text(&loc.url));
        put(&mut content, "telephone", text(&loc.telephone));
        put(&mut content, "address", self.postal_address(&loc.address, None, ""));
        insert_geo(&mut content, &loc.latitude, &loc.longitude);
        put(
            &mut content,
            "openingHoursSpecification",
            opening_hours(&loc.opening_hours),
        );
        put(&mut content, "availableService", self.procedures(&loc.services));
        put(&mut content, "review", reviews(&loc.reviews));
        typed_with_id(type_name, id, content)
    }

    fn providers(&self, type_name: &str) -> Option<Value> {
        let items = self
            .form
            .locations
            .iter()
            .filter_map(|loc| {
                let mut provider = Map::new();
                put(&mut provider, "name", text(&loc.name));
                put(&mut provider, "url", text(&loc.url));
                put(&mut provider, "address", self.postal_address(&loc.address, None, ""));
                put(&mut provider, "telephone", text(&loc.telephone));
                typed(type_name, provider)
            })
            .collect();
        non_empty(items)
    }

    fn branch_graph(&self) -> Option<Value> {
        let form = self.form;
        let org_id = self.site_url("/#org");

        let branches: Vec<Value> = form
            .locations
            .iter()
            .zip(branch_fragments(&form.locations))
            .enumerate()
            .filter_map(|(i, (branch, fragment))| {
                self.branch(branch, i, &fragment, org_id.as_deref())
            })
            .collect();
        if branches.is_empty() {
            return None;
        }

        let mut org = Map::new();
        put(&mut org, "name", self.text_or(&form.name, ORGANIZATION_PLACEHOLDER));
        put(
            &mut org,
            "url",
            self.or_placeholder(text(&form.url), Some(Placeholder::SiteUrl("/"))),
        );
        put(
            &mut org,
            "logo",
            self.or_placeholder(text(&form.logo), Some(Placeholder::SiteUrl("/path/logo.png"))),
        );
        put(&mut org, "sameAs", same_as(form));

        let graph = typed_with_id("Organization", org_id, org)
            .into_iter()
            .chain(branches)
            .collect();
        Some(Value::Array(graph))
    }

    fn branch(
        &self,
        branch: &Location,
        index: usize,
        fragment: &str,
        org_id: Option<&str>,
    ) -> Option<Value> {
        let form = self.form;
        let number = index + 1;

        let name = text(&branch.name).or_else(|| {
            self.placeholders.then(|| {
                let business = if is_blank(&form.name) {
                    ORGANIZATION_PLACEHOLDER
                } else {
                    form.name.trim()
                };
                Value::from(format!("{} Branch {}", business, number))
            })
        });
        let url = text(&branch.url).or_else(|| {
            if self.placeholders {
                self.site_url(&format!("/locations/branch-{}/", number))
                    .map(Value::from)
            } else {
                None
            }
        });

        let mut content = Map::new();
        put(&mut content, "name", name);
        put(&mut content, "url", url);
        put(
            &mut content,
            "telephone",
            self.text_or(&branch.telephone, TELEPHONE_PLACEHOLDER),
        );
        put(
            &mut content,
            "address",
            self.postal_address(
                &branch.address,
                Some(&BUSINESS_ADDRESS),
                &form.address.country,
            ),
        );
        insert_geo(&mut content, &branch.latitude, &branch.longitude);
        if content.is_empty() {
            return None;
        }

        let mut node = Map::new();
        node.insert("@type".to_string(), Value::from("LocalBusiness"));
        node.insert("@id".to_string(), Value::from(self.branch_id(fragment)));
        if let Some(org) = org_id {
            node.insert("branchOf".to_string(), json!({ "@id": org }));
        }
        node.extend(content);
        Some(Value::Object(node))
    }
}

/// One `#branch-...` fragment per location, unique within the list.
///
/// Named locations use their slug and unnamed ones their index; a fragment
/// that is already taken gets a `-2`, `-3`, ... suffix.
fn branch_fragments(locations: &[Location]) -> Vec<String> {
    let mut used = HashSet::new();
    locations
        .iter()
        .enumerate()
        .map(|(i, loc)| {
            let base = Some(slugify(&loc.name))
                .filter(|slug| !slug.is_empty())
                .unwrap_or_else(|| i.to_string());
            let mut fragment = base.clone();
            let mut n = 2;
            while !used.insert(fragment.clone()) {
                fragment = format!("{}-{}", base, n);
                n += 1;
            }
            fragment
        })
        .collect()
}

fn root_type(rule: RootType, shape: &Shape) -> Value {
    match rule {
        RootType::Fixed(type_name) => Value::from(type_name),
        RootType::BusinessTypes { fallback } => {
            let tags: &[String] = match shape {
                Shape::LocalBusiness { business_types } => business_types,
                _ => &[],
            };

            let mut selected: Vec<&str> = Vec::new();
            for tag in tags.iter().map(|t| t.trim()) {
                if !tag.is_empty() && !selected.contains(&tag) {
                    selected.push(tag);
                }
            }

            match selected.as_slice() {
                [] => Value::from(fallback),
                [single] => Value::from(*single),
                many => Value::Array(many.iter().map(|t| Value::from(*t)).collect()),
            }
        }
    }
}

/// Profile URLs: one per non-blank social handle, then the extra links.
fn same_as(form: &FormState) -> Option<Value> {
    let socials = SocialPlatform::ALL.iter().filter_map(|platform| {
        let handle = form.socials.get(*platform).trim().trim_start_matches('@');
        (!handle.is_empty()).then(|| Value::from(format!("{}{}", platform.prefix(), handle)))
    });
    let extra = form.same_as.iter().filter_map(|url| text(url));
    non_empty(socials.chain(extra).collect())
}

/// `geo` plus `hasMap`, only when both coordinates parse.
fn insert_geo(map: &mut Map<String, Value>, latitude: &str, longitude: &str) {
    let (Some(lat), Some(lng)) = (
        Transform::Number.apply(latitude),
        Transform::Number.apply(longitude),
    ) else {
        return;
    };

    map.insert(
        "geo".to_string(),
        json!({ "@type": "GeoCoordinates", "latitude": lat, "longitude": lng }),
    );
    map.insert(
        "hasMap".to_string(),
        Value::from(format!(
            "{}{},{}",
            MAP_LINK_BASE,
            latitude.trim(),
            longitude.trim()
        )),
    );
}

fn opening_hours(rows: &[OpeningHours]) -> Option<Value> {
    let items = rows
        .iter()
        .filter_map(|row| {
            let days: Vec<Value> = row.days.iter().filter_map(|d| text(d)).collect();
            if days.is_empty() {
                return None;
            }
            let mut spec = Map::new();
            spec.insert("dayOfWeek".to_string(), Value::Array(days));
            put(&mut spec, "opens", text(&row.opens));
            put(&mut spec, "closes", text(&row.closes));
            typed("OpeningHoursSpecification", spec)
        })
        .collect();
    non_empty(items)
}

fn aggregate_rating(form: &FormState) -> Option<Value> {
    let rating = Transform::Number.apply(&form.rating_value)?;
    let mut aggregate = Map::new();
    aggregate.insert("ratingValue".to_string(), rating);
    put(
        &mut aggregate,
        "reviewCount",
        Transform::Integer.apply(&form.review_count),
    );
    typed("AggregateRating", aggregate)
}

fn reviews(entries: &[ReviewEntry]) -> Option<Value> {
    let items = entries
        .iter()
        .filter_map(|review| {
            let rating = Transform::Number.apply(&review.rating_value)?;

            let mut author = Map::new();
            put(&mut author, "name", text(&review.author));

            let mut node = Map::new();
            node.insert(
                "reviewRating".to_string(),
                json!({ "@type": "Rating", "ratingValue": rating, "bestRating": 5 }),
            );
            put(&mut node, "author", typed("Person", author));
            put(&mut node, "reviewBody", text(&review.body));
            typed("Review", node)
        })
        .collect();
    non_empty(items)
}

fn service_offer(form: &FormState) -> Option<Value> {
    let price = Transform::Number.apply(&form.price);
    let url = text(&form.url);
    if price.is_none() && url.is_none() {
        return None;
    }

    let mut offer = Map::new();
    put(&mut offer, "url", url);
    put(&mut offer, "priceCurrency", text(&form.currency));
    put(&mut offer, "price", price);
    offer.insert("availability".to_string(), Value::from(IN_STOCK));
    put(&mut offer, "validFrom", text(&form.valid_from));
    typed("Offer", offer)
}

fn text(raw: &str) -> Option<Value> {
    Transform::Text.apply(raw)
}

fn put(map: &mut Map<String, Value>, key: &str, value: Option<Value>) {
    if let Some(value) = value {
        map.insert(key.to_string(), value);
    }
}

fn typed(type_name: &str, content: Map<String, Value>) -> Option<Value> {
    typed_with_id(type_name, None, content)
}

/// Tag `content` with `@type` (and `@id`); `None` if there is no content.
fn typed_with_id(
    type_name: &str,
    id: Option<String>,
    content: Map<String, Value>,
) -> Option<Value> {
    if content.is_empty() {
        return None;
    }
    let mut node = Map::new();
    node.insert("@type".to_string(), Value::from(type_name));
    if let Some(id) = id {
        node.insert("@id".to_string(), Value::from(id));
    }
    node.extend(content);
    Some(Value::Object(node))
}

fn non_empty(items: Vec<Value>) -> Option<Value> {
    (!items.is_empty()).then(|| Value::Array(items))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::TextField;
    use crate::types::{BlankPolicy, EntityKind};

    fn practitioner(cardinality: Cardinality) -> Shape {
        Shape::medical(EntityKind::Practitioner, cardinality)
    }

    fn located(name: &str, city: &str) -> Location {
        let mut loc = Location {
            name: name.to_string(),
            ..Default::default()
        };
        loc.address.city = city.to_string();
        loc
    }

    #[test]
    fn practitioner_with_only_name() {
        let mut form = FormState::default();
        form.set_text(TextField::Name, "Dr. A");

        let doc = build(&practitioner(Cardinality::Single), &form, &BuildOptions::default());
        assert_eq!(
            doc,
            json!({ "@context": "https://schema.org", "@type": "Person", "name": "Dr. A" })
        );
    }

    #[test]
    fn default_forms_build_without_empty_objects() {
        let shapes = [
            practitioner(Cardinality::Single),
            practitioner(Cardinality::Multiple),
            Shape::medical(EntityKind::Clinic, Cardinality::Single),
            Shape::medical(EntityKind::Clinic, Cardinality::Multiple),
            Shape::local_business(["MedicalSpa"]),
            Shape::Service,
        ];
        for shape in shapes {
            let doc = build(&shape, &FormState::for_shape(&shape), &BuildOptions::default());
            assert_eq!(doc["@context"], SCHEMA_CONTEXT);
            assert!(doc.get("worksFor").is_none(), "{:?}", shape);
            assert!(no_bare_types(&doc), "{:?}: {}", shape, doc);
        }
    }

    /// True when no object consists of `@type` alone.
    fn no_bare_types(value: &Value) -> bool {
        match value {
            Value::Object(map) => {
                !(map.len() == 1 && map.contains_key("@type")) && map.values().all(no_bare_types)
            }
            Value::Array(items) => items.iter().all(no_bare_types),
            _ => true,
        }
    }

    #[test]
    fn single_cardinality_uses_first_location_as_object() {
        let mut form = FormState::default();
        form.url = "https://acme.ae".into();
        form.locations = vec![located("Downtown", "Dubai"), located("Marina", "Dubai")];

        let doc = build(&practitioner(Cardinality::Single), &form, &BuildOptions::default());
        let works_for = doc["worksFor"].as_object().unwrap();
        assert_eq!(works_for["name"], "Downtown");
        assert!(works_for.get("@id").is_none());
    }

    #[test]
    fn multiple_cardinality_carries_branch_ids() {
        let mut form = FormState::default();
        form.url = "https://acme.ae/".into();
        form.locations = vec![
            located("Downtown Clinic", "Dubai"),
            located("", "Sharjah"),
            Location::default(),
        ];

        let doc = build(&practitioner(Cardinality::Multiple), &form, &BuildOptions::default());
        let works_for = doc["worksFor"].as_array().unwrap();
        assert_eq!(works_for.len(), 2);
        assert_eq!(works_for[0]["@id"], "https://acme.ae/#branch-downtown-clinic");
        assert_eq!(works_for[1]["@id"], "https://acme.ae/#branch-1");
        assert_eq!(works_for[1]["address"]["addressLocality"], "Sharjah");
    }

    #[test]
    fn branch_id_without_domain_is_fragment() {
        let mut form = FormState::default();
        form.locations = vec![located("North", "Ajman")];
        let doc = build(&practitioner(Cardinality::Multiple), &form, &BuildOptions::default());
        assert_eq!(doc["worksFor"][0]["@id"], "#branch-north");
    }

    #[test]
    fn branch_ids_are_unique() {
        let mut form = FormState::default();
        form.url = "https://acme.ae".into();
        form.locations = vec![
            located("Downtown", "Dubai"),
            located("downtown", "Dubai"),
            located("1", "Ajman"),
            located("", "Sharjah"),
            located("", "Fujairah"),
        ];

        let shape = Shape::medical(EntityKind::Clinic, Cardinality::Multiple);
        let doc = build(&shape, &form, &BuildOptions::default());
        let ids: Vec<&str> = doc["department"]
            .as_array()
            .unwrap()
            .iter()
            .map(|d| d["@id"].as_str().unwrap())
            .collect();
        assert_eq!(
            ids,
            [
                "https://acme.ae/#branch-downtown",
                "https://acme.ae/#branch-downtown-2",
                "https://acme.ae/#branch-1",
                "https://acme.ae/#branch-3",
                "https://acme.ae/#branch-4",
            ]
        );

        form.locations = vec![
            located("", "Dubai"),
            located("", "Ajman"),
            located("1", "Sharjah"),
        ];
        let doc = build(
            &Shape::local_business(["Dentist"]),
            &form,
            &BuildOptions::default(),
        );
        let graph_ids: Vec<&str> = doc["@graph"]
            .as_array()
            .unwrap()
            .iter()
            .skip(1)
            .map(|b| b["@id"].as_str().unwrap())
            .collect();
        assert_eq!(
            graph_ids,
            [
                "https://acme.ae/#branch-0",
                "https://acme.ae/#branch-1",
                "https://acme.ae/#branch-1-2",
            ]
        );
    }

    #[test]
    fn location_reviews_are_emitted() {
        let mut loc = located("Marina", "Dubai");
        loc.reviews = vec![
            ReviewEntry {
                author: "Noor".into(),
                rating_value: "4".into(),
                body: String::new(),
            },
            ReviewEntry {
                author: "Unrated".into(),
                ..Default::default()
            },
        ];
        let mut form = FormState::default();
        form.locations = vec![loc];

        let doc = build(&practitioner(Cardinality::Single), &form, &BuildOptions::default());
        assert_eq!(
            doc["worksFor"]["review"],
            json!([{
                "@type": "Review",
                "reviewRating": { "@type": "Rating", "ratingValue": 4, "bestRating": 5 },
                "author": { "@type": "Person", "name": "Noor" }
            }])
        );
    }

    #[test]
    fn geo_requires_both_coordinates() {
        let shape = Shape::medical(EntityKind::Clinic, Cardinality::Single);
        let mut form = FormState::default();
        form.latitude = "25.2048".into();
        form.longitude = "east".into();

        let doc = build(&shape, &form, &BuildOptions::default());
        assert!(doc.get("geo").is_none());
        assert!(doc.get("hasMap").is_none());

        form.longitude = " 55.2708 ".into();
        let doc = build(&shape, &form, &BuildOptions::default());
        assert_eq!(doc["geo"]["latitude"], json!(25.2048));
        assert_eq!(doc["geo"]["longitude"], json!(55.2708));
        assert_eq!(doc["hasMap"], "https://maps.google.com/?q=25.2048,55.2708");
    }

    #[test]
    fn zero_coordinates_survive() {
        let shape = Shape::medical(EntityKind::Clinic, Cardinality::Single);
        let mut form = FormState::default();
        form.latitude = "0".into();
        form.longitude = "0".into();

        let doc = build(&shape, &form, &BuildOptions::default());
        assert_eq!(doc["geo"]["latitude"], json!(0));
        assert_eq!(doc["geo"]["longitude"], json!(0));
    }

    #[test]
    fn sameas_from_handles() {
        let mut form = FormState::default();
        form.socials.set(SocialPlatform::Instagram, "acme");
        form.socials.set(SocialPlatform::Facebook, "   ");

        let doc = build(&practitioner(Cardinality::Single), &form, &BuildOptions::default());
        assert_eq!(doc["sameAs"], json!(["https://www.instagram.com/acme"]));
    }

    #[test]
    fn sameas_strips_at_and_appends_extra_links() {
        let mut form = FormState::default();
        form.socials.set(SocialPlatform::Tiktok, "@acme");
        form.same_as = vec!["https://example.com/profile".into(), "".into()];

        let doc = build(&practitioner(Cardinality::Single), &form, &BuildOptions::default());
        assert_eq!(
            doc["sameAs"],
            json!(["https://www.tiktok.com/@acme", "https://example.com/profile"])
        );
    }

    #[test]
    fn opening_hours_without_days_dropped() {
        let shape = Shape::medical(EntityKind::Clinic, Cardinality::Single);
        let mut form = FormState::default();
        form.opening_hours = vec![
            OpeningHours::new(Vec::<String>::new(), "09:00", "18:00"),
            OpeningHours::new(["Saturday", " "], "10:00", ""),
        ];

        let doc = build(&shape, &form, &BuildOptions::default());
        assert_eq!(
            doc["openingHoursSpecification"],
            json!([{
                "@type": "OpeningHoursSpecification",
                "dayOfWeek": ["Saturday"],
                "opens": "10:00"
            }])
        );

        form.opening_hours.truncate(1);
        let doc = build(&shape, &form, &BuildOptions::default());
        assert!(doc.get("openingHoursSpecification").is_none());
    }

    #[test]
    fn business_types_select_root_type() {
        let form = FormState::default();
        let options = BuildOptions::default();

        let doc = build(&Shape::local_business(["Dentist"]), &form, &options);
        assert_eq!(doc["@type"], "Dentist");

        let shape = Shape::local_business(["Dentist", " ", "MedicalSpa", "Dentist"]);
        let doc = build(&shape, &form, &options);
        assert_eq!(doc["@type"], json!(["Dentist", "MedicalSpa"]));

        let doc = build(&Shape::local_business(Vec::<String>::new()), &form, &options);
        assert_eq!(doc["@type"], "LocalBusiness");
    }

    #[test]
    fn offers_fall_back_to_slugged_url() {
        let mut form = FormState::default();
        form.url = "https://glow.ae/".into();
        form.currency = "AED".into();
        form.services = vec![
            ServiceEntry::new("Dermal Filler (1ml)", "1200"),
            ServiceEntry::new("", "50"),
            ServiceEntry {
                name: "Peel".into(),
                price: "cheap".into(),
                url: "https://glow.ae/peel".into(),
            },
        ];

        let doc = build(&Shape::local_business(["MedicalSpa"]), &form, &BuildOptions::default());
        let offers = doc["makesOffer"].as_array().unwrap();
        assert_eq!(offers.len(), 2);
        assert_eq!(offers[0]["url"], "https://glow.ae/treatments/dermal-filler-1ml/");
        assert_eq!(offers[0]["priceSpecification"]["price"], json!(1200));
        assert_eq!(offers[0]["availability"], IN_STOCK);
        assert_eq!(offers[1]["url"], "https://glow.ae/peel");
        assert!(offers[1].get("priceSpecification").is_none());
    }

    #[test]
    fn clinic_procedures_share_url_fallback() {
        let shape = Shape::medical(EntityKind::Clinic, Cardinality::Single);
        let mut form = FormState::default();
        form.url = "https://skin.ae".into();
        form.services = vec![ServiceEntry::new("Chemical Peel", ""), ServiceEntry::new(" ", "")];

        let doc = build(&shape, &form, &BuildOptions::default());
        assert_eq!(
            doc["availableService"],
            json!([{
                "@type": "MedicalProcedure",
                "name": "Chemical Peel",
                "url": "https://skin.ae/treatments/chemical-peel/"
            }])
        );
    }

    #[test]
    fn offers_without_domain_have_no_fallback_url() {
        let mut form = FormState::default();
        form.services = vec![ServiceEntry::new("Botox", "900")];
        let doc = build(&Shape::local_business(["MedicalSpa"]), &form, &BuildOptions::default());
        assert!(doc["makesOffer"][0].get("url").is_none());
    }

    #[test]
    fn placeholder_mode_fills_blanks() {
        let form = FormState::default();
        let options = BuildOptions::new().blank_policy(BlankPolicy::Placeholder);
        let doc = build(&Shape::local_business(["MedicalClinic"]), &form, &options);

        assert_eq!(doc["@id"], "https://YOUR-DOMAIN/#business");
        assert_eq!(doc["name"], "YOUR CLINIC NAME");
        assert_eq!(doc["url"], "https://YOUR-DOMAIN/");
        assert_eq!(doc["telephone"], "+971-XX-XXX-XXXX");
        assert_eq!(doc["logo"], "https://YOUR-DOMAIN/path/logo.png");
        assert_eq!(doc["address"]["streetAddress"], "STREET, BUILDING, UNIT");
        assert_eq!(doc["address"]["addressLocality"], "CITY");
        assert!(doc.get("geo").is_none());
    }

    #[test]
    fn omit_mode_leaves_blanks_out() {
        let doc = build(
            &Shape::local_business(["MedicalClinic"]),
            &FormState::default(),
            &BuildOptions::default(),
        );
        assert_eq!(
            doc,
            json!({ "@context": "https://schema.org", "@type": "MedicalClinic" })
        );
    }

    #[test]
    fn placeholder_mode_ignored_by_medical_templates() {
        let options = BuildOptions::new().blank_policy(BlankPolicy::Placeholder);
        let doc = build(&practitioner(Cardinality::Single), &FormState::default(), &options);
        assert_eq!(doc, json!({ "@context": "https://schema.org", "@type": "Person" }));
    }

    #[test]
    fn branch_graph_links_to_organization() {
        let mut form = FormState::default();
        form.name = "Glow".into();
        form.url = "https://glow.ae".into();
        form.address.country = "AE".into();
        form.socials.set(SocialPlatform::Instagram, "glow");
        form.locations = vec![located("JLT", "Dubai")];

        let doc = build(&Shape::local_business(["MedicalSpa"]), &form, &BuildOptions::default());
        let graph = doc["@graph"].as_array().unwrap();
        assert_eq!(graph.len(), 2);
        assert_eq!(
            graph[0],
            json!({
                "@type": "Organization",
                "@id": "https://glow.ae/#org",
                "name": "Glow",
                "url": "https://glow.ae",
                "sameAs": ["https://www.instagram.com/glow"]
            })
        );
        assert_eq!(graph[1]["@id"], "https://glow.ae/#branch-jlt");
        assert_eq!(graph[1]["branchOf"], json!({ "@id": "https://glow.ae/#org" }));
        assert_eq!(graph[1]["address"]["addressCountry"], "AE");
    }

    #[test]
    fn placeholder_branches_are_numbered() {
        let mut form = FormState::default();
        form.name = "Glow".into();
        form.locations = vec![Location::default()];
        let options = BuildOptions::new().blank_policy(BlankPolicy::Placeholder);

        let doc = build(&Shape::local_business(["MedicalSpa"]), &form, &options);
        let branch = &doc["@graph"][1];
        assert_eq!(branch["name"], "Glow Branch 1");
        assert_eq!(branch["url"], "https://YOUR-DOMAIN/locations/branch-1/");
        assert_eq!(branch["@id"], "https://YOUR-DOMAIN/#branch-0");
    }

    #[test]
    fn rating_requires_value() {
        let shape = Shape::medical(EntityKind::Clinic, Cardinality::Single);
        let mut form = FormState::default();
        form.review_count = "12".into();
        assert!(build(&shape, &form, &BuildOptions::default())
            .get("aggregateRating")
            .is_none());

        form.rating_value = "4.8".into();
        let doc = build(&shape, &form, &BuildOptions::default());
        assert_eq!(
            doc["aggregateRating"],
            json!({ "@type": "AggregateRating", "ratingValue": 4.8, "reviewCount": 12 })
        );
    }

    #[test]
    fn reviews_without_rating_dropped() {
        let mut form = FormState::default();
        form.reviews = vec![
            ReviewEntry {
                author: "Sam".into(),
                rating_value: "".into(),
                body: "Great".into(),
            },
            ReviewEntry {
                author: "Lee".into(),
                rating_value: "5".into(),
                body: "".into(),
            },
        ];

        let doc = build(&practitioner(Cardinality::Single), &form, &BuildOptions::default());
        assert_eq!(
            doc["review"],
            json!([{
                "@type": "Review",
                "reviewRating": { "@type": "Rating", "ratingValue": 5, "bestRating": 5 },
                "author": { "@type": "Person", "name": "Lee" }
            }])
        );
    }

    #[test]
    fn service_flavor_document() {
        let mut form = FormState::for_shape(&Shape::Service);
        form.name = "Laser Hair Removal".into();
        form.service_type = "Cosmetic".into();
        form.url = "https://glow.ae/laser".into();
        form.price = "499".into();
        form.area_served = "Dubai".into();
        form.locations[0].name = "Glow Clinic".into();

        let doc = build(&Shape::Service, &form, &BuildOptions::default());
        assert_eq!(doc["@type"], "Service");
        assert_eq!(
            doc["provider"],
            json!([{
                "@type": "MedicalBusiness",
                "name": "Glow Clinic",
                "address": { "@type": "PostalAddress", "addressCountry": "AE" }
            }])
        );
        assert_eq!(doc["areaServed"], json!({ "@type": "City", "name": "Dubai" }));
        assert_eq!(
            doc["offers"],
            json!({
                "@type": "Offer",
                "url": "https://glow.ae/laser",
                "priceCurrency": "AED",
                "price": 499,
                "availability": "https://schema.org/InStock"
            })
        );
    }

    #[test]
    fn raw_and_cleaned_agree_on_builder_output() {
        let shape = Shape::local_business(["MedicalSpa"]);
        let form = FormState::for_shape(&shape);
        let raw = build_raw(&shape, &form, &BuildOptions::default());
        assert_eq!(clean_or_empty(&raw), build(&shape, &form, &BuildOptions::default()));
    }
}
