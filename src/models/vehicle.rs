//! Vehicle records and identifiers.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

/// Unique identifier for a vehicle.
///
/// Assigned by the repository on creation and never changed afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VehicleId(u64);

impl VehicleId {
    /// Identifier given to the first vehicle of an empty collection.
    pub const BASELINE: Self = Self(1);

    /// Creates a new vehicle ID.
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw numeric value.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }

    /// Returns the identifier following this one, or `None` on overflow.
    #[must_use]
    pub const fn next(self) -> Option<Self> {
        match self.0.checked_add(1) {
            Some(n) => Some(Self(n)),
            None => None,
        }
    }
}

impl fmt::Display for VehicleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for VehicleId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl FromStr for VehicleId {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<u64>()
            .map(Self)
            .map_err(|_| crate::Error::InvalidInput(format!("id must be numeric: {s}")))
    }
}

/// A persisted vehicle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vehicle {
    /// Repository-assigned identifier.
    pub id: VehicleId,
    /// Display name (e.g. "Corolla").
    pub name: String,
    /// Free-text description.
    pub description: String,
    /// Free-form category (e.g. "Sedan", "Luxo"). Matched by exact equality.
    pub category: String,
    /// Whether the vehicle is listed as active.
    pub active: bool,
    /// Photo URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
    /// Video URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_url: Option<String>,
    /// Latitude, kept as the caller supplied it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latitude: Option<String>,
    /// Longitude, kept as the caller supplied it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub longitude: Option<String>,
    /// Asking price in minor currency units.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<i64>,
    /// Reference valuation price in minor currency units.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference_price: Option<i64>,
    /// National registration number.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub registration_number: Option<u64>,
    /// License plate.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub license_plate: Option<String>,
    /// Keys found in the stored record that are not fields above. Written
    /// back unchanged.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Vehicle {
    /// Builds a stored vehicle from creation input and an assigned identifier.
    #[must_use]
    pub fn from_new(id: VehicleId, new: NewVehicle) -> Self {
        Self {
            id,
            name: new.name,
            description: new.description,
            category: new.category,
            active: new.active,
            photo_url: new.photo_url,
            video_url: new.video_url,
            latitude: new.latitude,
            longitude: new.longitude,
            price: new.price,
            reference_price: new.reference_price,
            registration_number: new.registration_number,
            license_plate: new.license_plate,
            extra: Map::new(),
        }
    }

    /// Merges the fields present in `patch` onto this vehicle.
    ///
    /// Fields absent from the patch keep their value. The identifier is never
    /// touched, whatever the patch carries.
    pub fn apply(&mut self, patch: VehiclePatch) {
        let VehiclePatch {
            name,
            description,
            category,
            active,
            photo_url,
            video_url,
            latitude,
            longitude,
            price,
            reference_price,
            registration_number,
            license_plate,
        } = patch;

        if let Some(v) = name {
            self.name = v;
        }
        if let Some(v) = description {
            self.description = v;
        }
        if let Some(v) = category {
            self.category = v;
        }
        if let Some(v) = active {
            self.active = v;
        }
        merge_optional(&mut self.photo_url, photo_url);
        merge_optional(&mut self.video_url, video_url);
        merge_optional(&mut self.latitude, latitude);
        merge_optional(&mut self.longitude, longitude);
        merge_optional(&mut self.price, price);
        merge_optional(&mut self.reference_price, reference_price);
        merge_optional(&mut self.registration_number, registration_number);
        merge_optional(&mut self.license_plate, license_plate);
    }
}

fn merge_optional<T>(slot: &mut Option<T>, update: Option<Option<T>>) {
    if let Some(value) = update {
        *slot = value;
    }
}

/// Input for creating a vehicle. Identical to [`Vehicle`] minus the identifier.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewVehicle {
    /// Display name.
    pub name: String,
    /// Free-text description.
    pub description: String,
    /// Free-form category.
    pub category: String,
    /// Whether the vehicle is listed as active.
    pub active: bool,
    /// Photo URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
    /// Video URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_url: Option<String>,
    /// Latitude.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latitude: Option<String>,
    /// Longitude.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub longitude: Option<String>,
    /// Asking price.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<i64>,
    /// Reference valuation price.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference_price: Option<i64>,
    /// Registration number.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub registration_number: Option<u64>,
    /// License plate.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub license_plate: Option<String>,
}

impl NewVehicle {
    /// Creates input with the required fields set and every optional field absent.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        category: impl Into<String>,
        active: bool,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            category: category.into(),
            active,
            ..Self::default()
        }
    }

    /// Sets the license plate.
    #[must_use]
    pub fn with_license_plate(mut self, plate: impl Into<String>) -> Self {
        self.license_plate = Some(plate.into());
        self
    }

    /// Sets the asking price.
    #[must_use]
    pub const fn with_price(mut self, price: i64) -> Self {
        self.price = Some(price);
        self
    }
}

/// A partial update.
///
/// Outer `None` means "leave unchanged". For optional fields,
/// `Some(None)` (JSON `null`) clears the stored value. Keys that are not
/// fields, `id` among them, are dropped whatever their value, so callers can
/// send back a full record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct VehiclePatch {
    /// New name.
    #[serde(default)]
    pub name: Option<String>,
    /// New description.
    #[serde(default)]
    pub description: Option<String>,
    /// New category.
    #[serde(default)]
    pub category: Option<String>,
    /// New active flag.
    #[serde(default)]
    pub active: Option<bool>,
    /// New photo URL, or `Some(None)` to clear it.
    #[serde(default, deserialize_with = "present")]
    pub photo_url: Option<Option<String>>,
    /// New video URL, or `Some(None)` to clear it.
    #[serde(default, deserialize_with = "present")]
    pub video_url: Option<Option<String>>,
    /// New latitude, or `Some(None)` to clear it.
    #[serde(default, deserialize_with = "present")]
    pub latitude: Option<Option<String>>,
    /// New longitude, or `Some(None)` to clear it.
    #[serde(default, deserialize_with = "present")]
    pub longitude: Option<Option<String>>,
    /// New price, or `Some(None)` to clear it.
    #[serde(default, deserialize_with = "present")]
    pub price: Option<Option<i64>>,
    /// New reference price, or `Some(None)` to clear it.
    #[serde(default, deserialize_with = "present")]
    pub reference_price: Option<Option<i64>>,
    /// New registration number, or `Some(None)` to clear it.
    #[serde(default, deserialize_with = "present")]
    pub registration_number: Option<Option<u64>>,
    /// New license plate, or `Some(None)` to clear it.
    #[serde(default, deserialize_with = "present")]
    pub license_plate: Option<Option<String>>,
}

impl VehiclePatch {
    /// Creates an empty patch.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the active flag.
    #[must_use]
    pub const fn with_active(mut self, active: bool) -> Self {
        self.active = Some(active);
        self
    }

    /// Sets the name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Sets the category.
    #[must_use]
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Returns `true` if the patch changes nothing.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.category.is_none()
            && self.active.is_none()
            && self.photo_url.is_none()
            && self.video_url.is_none()
            && self.latitude.is_none()
            && self.longitude.is_none()
            && self.price.is_none()
            && self.reference_price.is_none()
            && self.registration_number.is_none()
            && self.license_plate.is_none()
    }
}

/// Maps a present key to `Some(value)`, including an explicit `null`.
fn present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Public projection of a vehicle.
///
/// Omits the identifier and the registration number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VehicleView {
    /// Display name.
    pub name: String,
    /// Free-text description.
    pub description: String,
    /// Category.
    pub category: String,
    /// Active flag.
    pub active: bool,
    /// Photo URL.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
    /// Video URL.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video_url: Option<String>,
    /// Latitude.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latitude: Option<String>,
    /// Longitude.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub longitude: Option<String>,
    /// Asking price.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<i64>,
    /// Reference valuation price.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference_price: Option<i64>,
    /// License plate.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub license_plate: Option<String>,
}

impl From<&Vehicle> for VehicleView {
    fn from(v: &Vehicle) -> Self {
        Self {
            name: v.name.clone(),
            description: v.description.clone(),
            category: v.category.clone(),
            active: v.active,
            photo_url: v.photo_url.clone(),
            video_url: v.video_url.clone(),
            latitude: v.latitude.clone(),
            longitude: v.longitude.clone(),
            price: v.price,
            reference_price: v.reference_price,
            license_plate: v.license_plate.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    fn civic() -> Vehicle {
        Vehicle::from_new(
            VehicleId::new(5),
            NewVehicle::new("Civic", "hatch", "Sedan", true).with_license_plate("ABC1D23"),
        )
    }

    #[test]
    fn test_apply_keeps_absent_fields() {
        let mut vehicle = civic();
        vehicle.apply(VehiclePatch::new().with_active(false));

        assert_eq!(vehicle.id, VehicleId::new(5));
        assert_eq!(vehicle.name, "Civic");
        assert_eq!(vehicle.category, "Sedan");
        assert!(!vehicle.active);
        assert_eq!(vehicle.license_plate.as_deref(), Some("ABC1D23"));
    }

    #[test_case("99"; "other id")]
    #[test_case("-1"; "negative")]
    #[test_case(r#""5""#; "string")]
    #[test_case("1.5"; "fraction")]
    #[test_case("null"; "null")]
    fn test_apply_ignores_supplied_id(id: &str) {
        let mut vehicle = civic();
        let patch: VehiclePatch =
            serde_json::from_str(&format!(r#"{{"id": {id}, "name": "Fit"}}"#)).unwrap();
        vehicle.apply(patch);

        assert_eq!(vehicle.id, VehicleId::new(5));
        assert_eq!(vehicle.name, "Fit");
    }

    #[test]
    fn test_patch_null_clears_optional_field() {
        let mut vehicle = civic();
        let patch: VehiclePatch = serde_json::from_str(r#"{"license_plate": null}"#).unwrap();
        assert_eq!(patch.license_plate, Some(None));

        vehicle.apply(patch);
        assert!(vehicle.license_plate.is_none());
    }

    #[test]
    fn test_patch_missing_key_is_none() {
        let patch: VehiclePatch = serde_json::from_str("{}").unwrap();
        assert!(patch.is_empty());
        assert!(patch.license_plate.is_none());
    }

    #[test]
    fn test_patch_null_required_field_is_absent() {
        let patch: VehiclePatch = serde_json::from_str(r#"{"name": null}"#).unwrap();
        assert!(patch.name.is_none());
        assert!(patch.is_empty());
    }

    #[test]
    fn test_unknown_record_keys_round_trip() {
        let json = r#"{"id":3,"name":"Gol","description":"d","category":"Hatch","active":true,"RENAVAN":"00123"}"#;
        let mut vehicle: Vehicle = serde_json::from_str(json).unwrap();
        assert_eq!(vehicle.extra.get("RENAVAN"), Some(&Value::from("00123")));

        vehicle.apply(VehiclePatch::new().with_active(false));
        let written = serde_json::to_value(&vehicle).unwrap();

        assert_eq!(written["RENAVAN"], "00123");
        assert_eq!(written["active"], false);
        assert!(written.get("extra").is_none());
    }

    #[test]
    fn test_absent_optionals_are_not_serialized() {
        let vehicle = Vehicle::from_new(
            VehicleId::new(1),
            NewVehicle::new("Corolla", "sedan", "Sedan", true),
        );
        let json = serde_json::to_value(&vehicle).unwrap();
        let object = json.as_object().unwrap();

        assert_eq!(object.len(), 5);
        assert!(!object.contains_key("price"));
    }

    #[test]
    fn test_view_hides_id_and_registration_number() {
        let mut vehicle = civic();
        vehicle.registration_number = Some(123_456_789);

        let json = serde_json::to_value(VehicleView::from(&vehicle)).unwrap();
        assert!(json.get("id").is_none());
        assert!(json.get("registration_number").is_none());
        assert_eq!(json["license_plate"], "ABC1D23");
    }

    #[test]
    fn test_vehicle_id_parse() {
        assert_eq!("42".parse::<VehicleId>().unwrap(), VehicleId::new(42));
        assert_eq!(" 7 ".parse::<VehicleId>().unwrap(), VehicleId::new(7));
        assert!("abc".parse::<VehicleId>().is_err());
        assert!("-1".parse::<VehicleId>().is_err());
    }

    #[test]
    fn test_vehicle_id_next_overflow() {
        assert_eq!(VehicleId::new(7).next(), Some(VehicleId::new(8)));
        assert_eq!(VehicleId::new(u64::MAX).next(), None);
    }
}
