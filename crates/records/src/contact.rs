//! Contacts and their locations.

use std::sync::Arc;

use once_cell::sync::Lazy;

use indivo_document::{DocumentRef, DocumentSchema, FieldBinding, ScalarKind, typed_document};

use crate::INDIVO_NAMESPACE;

pub static CONTACT_LOCATION_SCHEMA: Lazy<Arc<DocumentSchema>> = Lazy::new(|| {
    let schema = DocumentSchema::builder("ContactLocation")
        .namespace(INDIVO_NAMESPACE)
        .field(FieldBinding::scalar("type", ScalarKind::String).as_attribute())
        .field(FieldBinding::scalar("latitude", ScalarKind::String))
        .field(FieldBinding::scalar("longitude", ScalarKind::String))
        .field(FieldBinding::reference("contact", "Contact"))
        .build()
        .expect("ContactLocation schema is valid");
    Arc::new(schema)
});

pub static CONTACT_SCHEMA: Lazy<Arc<DocumentSchema>> = Lazy::new(|| {
    let schema = DocumentSchema::builder("Contact")
        .namespace(INDIVO_NAMESPACE)
        .field(FieldBinding::scalar("fullName", ScalarKind::String).required())
        .field(FieldBinding::scalar("givenName", ScalarKind::String))
        .field(FieldBinding::scalar("familyName", ScalarKind::String))
        .field(FieldBinding::scalar("email", ScalarKind::String).repeated())
        .field(FieldBinding::scalar("phoneNumber", ScalarKind::String).repeated())
        .field(FieldBinding::document("location", Arc::clone(&*CONTACT_LOCATION_SCHEMA)).repeated())
        .build()
        .expect("Contact schema is valid");
    Arc::new(schema)
});

typed_document! {
    /// A person or organization involved in a patient's care.
    pub struct Contact("Contact", CONTACT_SCHEMA) {
        "fullName" => full_name, set_full_name: one String;
        "givenName" => given_name, set_given_name: one String;
        "familyName" => family_name, set_family_name: one String;
        "email" => emails, set_emails: many String;
        "phoneNumber" => phone_numbers, set_phone_numbers: many String;
        "location" => locations, set_locations: many ContactLocation;
    }
}

typed_document! {
    /// A place where a contact can be reached. `type` is written as an
    /// attribute: `<location type="work">`.
    pub struct ContactLocation("ContactLocation", CONTACT_LOCATION_SCHEMA) {
        "type" => location_type, set_location_type: one String;
        "latitude" => latitude, set_latitude: one String;
        "longitude" => longitude, set_longitude: one String;
        "contact" => contact, set_contact: one DocumentRef;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indivo_document::WireElement;

    fn contact_wire() -> WireElement {
        WireElement::new("Contact")
            .with_attribute("id", "contact-1")
            .with_child(WireElement::new("fullName").with_text("Gregory House"))
            .with_child(WireElement::new("email").with_text("house@ppth.org"))
            .with_child(WireElement::new("email").with_text("greg@example.org"))
            .with_child(
                WireElement::new("location")
                    .with_attribute("type", "work")
                    .with_child(WireElement::new("latitude").with_text("40.34"))
                    .with_child(WireElement::new("contact").with_attribute("id", "contact-1")),
            )
    }

    #[test]
    fn test_repeated_fields() {
        let contact = Contact::from_wire(&contact_wire()).unwrap();
        assert_eq!(contact.full_name().as_deref(), Some("Gregory House"));
        assert_eq!(contact.emails(), ["house@ppth.org", "greg@example.org"]);
        assert!(contact.phone_numbers().is_empty());

        let locations = contact.locations();
        assert_eq!(locations.len(), 1);
        assert_eq!(locations[0].location_type().as_deref(), Some("work"));
        assert_eq!(
            locations[0].contact(),
            Some(DocumentRef::new("Contact", "contact-1"))
        );
    }

    #[test]
    fn test_location_type_is_an_attribute() {
        let contact = Contact::from_wire(&contact_wire()).unwrap();
        let wire = contact.serialize().unwrap();
        let location = wire.children_named("location").next().unwrap();
        assert_eq!(location.attribute("type"), Some("work"));
        assert!(location.children_named("type").next().is_none());
        assert_eq!(wire.attribute("id"), Some("contact-1"));
    }

    #[test]
    fn test_set_locations() {
        let mut home = ContactLocation::new();
        home.set_location_type(Some("home".to_string())).unwrap();
        let mut contact = Contact::new();
        contact.set_full_name(Some("Lisa Cuddy".to_string())).unwrap();
        contact.set_locations(vec![home.clone(), home]).unwrap();
        assert_eq!(contact.locations().len(), 2);
        contact.set_locations(Vec::new()).unwrap();
        assert!(contact.get("location").is_absent());
    }
}
