//! Medication records and their pill images.

use std::sync::Arc;

use once_cell::sync::Lazy;
use tracing::debug;

use indivo_document::{
    Asset, AssetError, AssetFetcher, AssetRef, CodedValue, DocumentSchema, FieldBinding,
    IndivoDate, ScalarKind, TypedDocument, UnitValue, typed_document,
};

use crate::INDIVO_NAMESPACE;
use crate::prescription::{PRESCRIPTION_SCHEMA, Prescription};

pub static MEDICATION_SCHEMA: Lazy<Arc<DocumentSchema>> = Lazy::new(|| {
    let schema = DocumentSchema::builder("Medication")
        .namespace(INDIVO_NAMESPACE)
        .field(FieldBinding::scalar("dateStarted", ScalarKind::Date))
        .field(FieldBinding::scalar("dateStopped", ScalarKind::Date))
        .field(FieldBinding::scalar("reasonStopped", ScalarKind::String))
        .field(FieldBinding::scalar("name", ScalarKind::CodedValue).required())
        .field(FieldBinding::scalar("brandName", ScalarKind::CodedValue))
        .field(FieldBinding::scalar("dose", ScalarKind::UnitValue))
        .field(FieldBinding::scalar("route", ScalarKind::CodedValue))
        .field(FieldBinding::scalar("strength", ScalarKind::UnitValue))
        .field(FieldBinding::scalar("frequency", ScalarKind::CodedValue))
        .field(FieldBinding::document(
            "prescription",
            Arc::clone(&*PRESCRIPTION_SCHEMA),
        ))
        .field(FieldBinding::scalar("details", ScalarKind::String))
        .build()
        .expect("Medication schema is valid");
    Arc::new(schema)
});

typed_document! {
    /// A medication a patient takes or has taken.
    ///
    /// `name` is the only required field; it holds the drug code, which also
    /// keys the pill image.
    pub struct Medication("Medication", MEDICATION_SCHEMA) {
        "dateStarted" => date_started, set_date_started: one IndivoDate;
        "dateStopped" => date_stopped, set_date_stopped: one IndivoDate;
        "reasonStopped" => reason_stopped, set_reason_stopped: one String;
        "name" => name, set_name: one CodedValue;
        "brandName" => brand_name, set_brand_name: one CodedValue;
        "dose" => dose, set_dose: one UnitValue;
        "route" => route, set_route: one CodedValue;
        "strength" => strength, set_strength: one UnitValue;
        "frequency" => frequency, set_frequency: one CodedValue;
        "prescription" => prescription, set_prescription: one Prescription;
        "details" => details, set_details: one String;
    }
}

impl Medication {
    /// The pill image key: the code of the medication name.
    pub fn pill_image_ref(&self) -> Option<AssetRef> {
        self.name().map(|name| AssetRef::new(name.code()))
    }

    /// Fetches the pill image through `fetcher`.
    ///
    /// Fails with [`AssetError::NoReference`] when the medication has no name
    /// yet. Dropping the future cancels the fetch.
    pub async fn load_pill_image(
        &self,
        fetcher: &dyn AssetFetcher,
        bypass_cache: bool,
    ) -> Result<Asset, AssetError> {
        let asset = self.pill_image_ref().ok_or(AssetError::NoReference)?;
        debug!(
            type_name = Self::TYPE_NAME,
            asset = %asset,
            bypass_cache,
            "loading pill image"
        );
        fetcher.fetch_asset(&asset, bypass_cache).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indivo_document::{BindingError, Field, WireElement};
    use rust_decimal_macros::dec;

    #[test]
    fn test_name_is_required() {
        let medication = Medication::new();
        assert_eq!(
            medication.serialize().unwrap_err(),
            BindingError::MissingRequired {
                type_name: "Medication".to_string(),
                field: "name".to_string(),
            }
        );
    }

    #[test]
    fn test_dose_rejects_coded_value() {
        let mut medication = Medication::new();
        let err = medication
            .set("dose", CodedValue::new("10"))
            .unwrap_err();
        assert!(matches!(err, BindingError::TypeMismatch { .. }));
        assert_eq!(medication.get("dose"), Field::Absent);
    }

    #[test]
    fn test_nested_prescription() {
        let mut prescription = Prescription::new();
        prescription
            .set_instructions(Some("with food".to_string()))
            .unwrap();

        let mut medication = Medication::new();
        medication.set_name(Some(CodedValue::new("123"))).unwrap();
        medication.set_strength(Some(UnitValue::new(dec!(500), "mg"))).unwrap();
        medication
            .set_prescription(Some(prescription.clone()))
            .unwrap();

        let wire = medication.serialize().unwrap();
        let nested = wire.children_named("prescription").next().unwrap();
        assert_eq!(
            nested.children_named("instructions").next().unwrap().text.as_deref(),
            Some("with food")
        );

        let back = Medication::from_wire(&wire).unwrap();
        assert_eq!(back.prescription(), Some(prescription));
        assert_eq!(back, medication);
    }

    #[test]
    fn test_pill_image_ref_is_name_code() {
        let wire = WireElement::new("Medication").with_child(
            WireElement::new("name")
                .with_attribute("code", "RX-42")
                .with_text("Ibuprofen"),
        );
        let medication = Medication::from_wire(&wire).unwrap();
        assert_eq!(medication.pill_image_ref(), Some(AssetRef::new("RX-42")));
        assert_eq!(Medication::new().pill_image_ref(), None);
    }
}
