//! Prescription records.

use std::sync::Arc;

use once_cell::sync::Lazy;

use indivo_document::{
    DocumentRef, DocumentSchema, FieldBinding, IndivoDate, ScalarKind, typed_document,
};

use crate::INDIVO_NAMESPACE;

pub static PRESCRIPTION_SCHEMA: Lazy<Arc<DocumentSchema>> = Lazy::new(|| {
    let schema = DocumentSchema::builder("Prescription")
        .namespace(INDIVO_NAMESPACE)
        .field(FieldBinding::reference("by", "Contact"))
        .field(FieldBinding::scalar("on", ScalarKind::Date))
        .field(FieldBinding::scalar("stopOn", ScalarKind::Date))
        .field(FieldBinding::scalar("dispenseAsWritten", ScalarKind::String))
        .field(FieldBinding::scalar("duration", ScalarKind::String))
        .field(FieldBinding::scalar("refillInfo", ScalarKind::String))
        .field(FieldBinding::scalar("instructions", ScalarKind::String))
        .build()
        .expect("Prescription schema is valid");
    Arc::new(schema)
});

typed_document! {
    /// The order behind a medication: who prescribed it, when, and how to take it.
    pub struct Prescription("Prescription", PRESCRIPTION_SCHEMA) {
        /// The prescribing [`Contact`](crate::Contact).
        "by" => by, set_by: one DocumentRef;
        "on" => on, set_on: one IndivoDate;
        "stopOn" => stop_on, set_stop_on: one IndivoDate;
        "dispenseAsWritten" => dispense_as_written, set_dispense_as_written: one String;
        "duration" => duration, set_duration: one String;
        "refillInfo" => refill_info, set_refill_info: one String;
        "instructions" => instructions, set_instructions: one String;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indivo_document::{BindingError, WireElement};

    #[test]
    fn test_prescriber_reference() {
        let mut prescription = Prescription::new();
        prescription
            .set_by(Some(DocumentRef::new("Contact", "dr-house")))
            .unwrap();
        prescription
            .set_on(IndivoDate::from_ymd(2011, 9, 26))
            .unwrap();

        let wire = prescription.serialize().unwrap();
        assert_eq!(wire.children[0].name, "by");
        assert_eq!(wire.children[0].attribute("id"), Some("dr-house"));
        assert_eq!(wire.children[1].text.as_deref(), Some("2011-09-26"));

        assert!(matches!(
            prescription.set_by(Some(DocumentRef::new("Medication", "m1"))),
            Err(BindingError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn test_reference_without_id_is_absent() {
        let wire = WireElement::new("Prescription")
            .with_child(WireElement::new("by"))
            .with_child(WireElement::new("instructions").with_text("twice daily"));
        let prescription = Prescription::from_wire(&wire).unwrap();
        assert_eq!(prescription.by(), None);
        assert_eq!(prescription.instructions().as_deref(), Some("twice daily"));
    }
}
