//! Vehicle CLI commands.

use crate::cli::{CommandStatus, write_json};
use crate::models::{NewVehicle, VehicleId, VehiclePatch, VehicleView};
use crate::repository::{DeleteOutcome, VehicleRepository};
use crate::storage::CollectionStore;
use crate::{Error, Result};
use std::io::Write;

/// Arguments for `create`.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct CreateArgs {
    /// Display name.
    #[arg(long)]
    pub name: String,

    /// Free-text description.
    #[arg(long)]
    pub description: String,

    /// Category, e.g. "Sedan".
    #[arg(long)]
    pub category: String,

    /// Whether the vehicle is listed as active.
    #[arg(long, action = clap::ArgAction::Set)]
    pub active: bool,

    /// Photo URL.
    #[arg(long)]
    pub photo_url: Option<String>,

    /// Video URL.
    #[arg(long)]
    pub video_url: Option<String>,

    /// Latitude.
    #[arg(long, allow_hyphen_values = true)]
    pub latitude: Option<String>,

    /// Longitude.
    #[arg(long, allow_hyphen_values = true)]
    pub longitude: Option<String>,

    /// Asking price.
    #[arg(long)]
    pub price: Option<i64>,

    /// Reference valuation price.
    #[arg(long)]
    pub reference_price: Option<i64>,

    /// National registration number.
    #[arg(long)]
    pub registration_number: Option<u64>,

    /// License plate.
    #[arg(long)]
    pub license_plate: Option<String>,
}

impl CreateArgs {
    /// Validates the arguments and converts them into creation input.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidInput` if a required text field is blank.
    pub fn into_new_vehicle(self) -> Result<NewVehicle> {
        for (field, value) in [
            ("name", &self.name),
            ("description", &self.description),
            ("category", &self.category),
        ] {
            if value.trim().is_empty() {
                return Err(Error::InvalidInput(format!("{field} must not be empty")));
            }
        }

        Ok(NewVehicle {
            name: self.name,
            description: self.description,
            category: self.category,
            active: self.active,
            photo_url: self.photo_url,
            video_url: self.video_url,
            latitude: self.latitude,
            longitude: self.longitude,
            price: self.price,
            reference_price: self.reference_price,
            registration_number: self.registration_number,
            license_plate: self.license_plate,
        })
    }
}

/// Prints every vehicle.
///
/// # Errors
///
/// Returns an error if the store cannot be read.
pub fn cmd_list<S: CollectionStore, W: Write>(
    repo: &VehicleRepository<S>,
    out: &mut W,
) -> Result<CommandStatus> {
    let views: Vec<VehicleView> = repo.list_all()?.iter().map(VehicleView::from).collect();
    write_json(out, &views)?;
    Ok(CommandStatus::Success)
}

/// Prints the vehicle with the given id.
///
/// # Errors
///
/// Returns an error if `id` is not numeric or the store cannot be read.
pub fn cmd_get<S: CollectionStore, W: Write>(
    repo: &VehicleRepository<S>,
    id: &str,
    out: &mut W,
) -> Result<CommandStatus> {
    let id: VehicleId = id.parse()?;
    match repo.find_by_id(id)? {
        Some(vehicle) => {
            write_json(out, &VehicleView::from(&vehicle))?;
            Ok(CommandStatus::Success)
        },
        None => Ok(CommandStatus::NotFound(id)),
    }
}

/// Prints the vehicles in a category. An empty result is still a success.
///
/// # Errors
///
/// Returns an error if the store cannot be read.
pub fn cmd_category<S: CollectionStore, W: Write>(
    repo: &VehicleRepository<S>,
    category: &str,
    out: &mut W,
) -> Result<CommandStatus> {
    let views: Vec<VehicleView> = repo
        .find_by_category(category)?
        .iter()
        .map(VehicleView::from)
        .collect();
    write_json(out, &views)?;
    Ok(CommandStatus::Success)
}

/// Creates a vehicle and prints the whole collection, ids included.
///
/// # Errors
///
/// Returns an error if validation fails or the store cannot be updated.
pub fn cmd_create<S: CollectionStore, W: Write>(
    repo: &VehicleRepository<S>,
    args: CreateArgs,
    out: &mut W,
) -> Result<CommandStatus> {
    let vehicles = repo.create(args.into_new_vehicle()?)?;
    write_json(out, &vehicles)?;
    Ok(CommandStatus::Success)
}

/// Merges a JSON object into the vehicle with the given id and prints it.
///
/// # Errors
///
/// Returns an error if `id` or `patch` cannot be parsed, or the store cannot
/// be updated.
pub fn cmd_update<S: CollectionStore, W: Write>(
    repo: &VehicleRepository<S>,
    id: &str,
    patch: &str,
    out: &mut W,
) -> Result<CommandStatus> {
    let id: VehicleId = id.parse()?;
    let patch = parse_patch(patch)?;

    match repo.partial_update(id, patch)? {
        Some(vehicle) => {
            write_json(out, &VehicleView::from(&vehicle))?;
            Ok(CommandStatus::Success)
        },
        None => Ok(CommandStatus::NotFound(id)),
    }
}

/// Deletes the vehicle with the given id.
///
/// # Errors
///
/// Returns an error if `id` is not numeric or the store cannot be updated.
pub fn cmd_delete<S: CollectionStore, W: Write>(
    repo: &VehicleRepository<S>,
    id: &str,
    out: &mut W,
) -> Result<CommandStatus> {
    let id: VehicleId = id.parse()?;
    match repo.delete(id)? {
        DeleteOutcome::Deleted => {
            write_json(out, &serde_json::json!({ "deleted": id }))?;
            Ok(CommandStatus::Success)
        },
        DeleteOutcome::NotFound => Ok(CommandStatus::NotFound(id)),
    }
}

/// Parses a patch document. Only JSON objects are accepted.
fn parse_patch(input: &str) -> Result<VehiclePatch> {
    let value: serde_json::Value = serde_json::from_str(input)
        .map_err(|e| Error::InvalidInput(format!("patch is not valid JSON: {e}")))?;

    if !value.is_object() {
        return Err(Error::InvalidInput(
            "patch must be a JSON object".to_string(),
        ));
    }

    serde_json::from_value(value).map_err(|e| Error::InvalidInput(format!("invalid patch: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConcurrencyMode;
    use crate::models::Vehicle;
    use crate::storage::InMemoryStore;
    use test_case::test_case;

    fn seeded() -> VehicleRepository<InMemoryStore> {
        let vehicles = vec![
            Vehicle::from_new(
                VehicleId::new(1),
                NewVehicle::new("Corolla", "Compact sedan", "Sedan", true),
            ),
            Vehicle::from_new(
                VehicleId::new(2),
                NewVehicle::new("Hilux", "Pickup", "Truck", false).with_license_plate("XYZ9A88"),
            ),
        ];
        VehicleRepository::new(
            InMemoryStore::with_vehicles(vehicles),
            ConcurrencyMode::Serialized,
        )
    }

    fn output(out: Vec<u8>) -> serde_json::Value {
        serde_json::from_slice(&out).unwrap()
    }

    fn create_args(name: &str) -> CreateArgs {
        CreateArgs {
            name: name.to_string(),
            description: "Sports".to_string(),
            category: "Luxo".to_string(),
            active: true,
            ..CreateArgs::default()
        }
    }

    #[test]
    fn test_list_prints_views_without_ids() {
        let mut out = Vec::new();
        cmd_list(&seeded(), &mut out).unwrap();

        let value = output(out);
        let items = value.as_array().unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0]["name"], "Corolla");
        assert!(items[0].get("id").is_none());
    }

    #[test]
    fn test_get_found_and_missing() {
        let repo = seeded();

        let mut out = Vec::new();
        assert_eq!(cmd_get(&repo, "2", &mut out).unwrap(), CommandStatus::Success);
        assert_eq!(output(out)["license_plate"], "XYZ9A88");

        let mut out = Vec::new();
        assert_eq!(
            cmd_get(&repo, "99", &mut out).unwrap(),
            CommandStatus::NotFound(VehicleId::new(99))
        );
        assert!(out.is_empty());
    }

    #[test_case("abc"; "letters")]
    #[test_case("-1"; "negative")]
    #[test_case(""; "empty")]
    fn test_get_rejects_bad_id(id: &str) {
        let result = cmd_get(&seeded(), id, &mut Vec::new());
        assert!(matches!(result, Err(Error::InvalidInput(_))));
    }

    #[test]
    fn test_category_empty_is_success() {
        let mut out = Vec::new();
        let status = cmd_category(&seeded(), "Boat", &mut out).unwrap();

        assert!(status.is_success());
        assert_eq!(output(out), serde_json::json!([]));
    }

    #[test]
    fn test_create_prints_collection_with_new_id() {
        let repo = seeded();
        let mut out = Vec::new();
        cmd_create(&repo, create_args("Porsche"), &mut out).unwrap();

        let value = output(out);
        let items = value.as_array().unwrap();
        assert_eq!(items.len(), 3);
        assert_eq!(items[2]["id"], 3);
        assert_eq!(items[2]["name"], "Porsche");
    }

    #[test_case(CreateArgs { name: " ".to_string(), ..create_args("x") }; "blank name")]
    #[test_case(CreateArgs { description: String::new(), ..create_args("x") }; "empty description")]
    #[test_case(CreateArgs { category: String::new(), ..create_args("x") }; "empty category")]
    fn test_create_validates_required_fields(args: CreateArgs) {
        let repo = seeded();
        let result = cmd_create(&repo, args, &mut Vec::new());

        assert!(matches!(result, Err(Error::InvalidInput(_))));
        assert_eq!(repo.list_all().unwrap().len(), 2);
    }

    #[test]
    fn test_update_merges_patch() {
        let repo = seeded();
        let mut out = Vec::new();
        let status = cmd_update(&repo, "1", r#"{"active": false, "id": 50}"#, &mut out).unwrap();

        assert!(status.is_success());
        assert_eq!(output(out)["active"], false);
        let stored = repo.find_by_id(VehicleId::new(1)).unwrap().unwrap();
        assert_eq!(stored.id, VehicleId::new(1));
        assert_eq!(stored.name, "Corolla");
    }

    #[test_case("-1"; "negative")]
    #[test_case(r#""5""#; "string")]
    #[test_case("1.5"; "fraction")]
    fn test_update_ignores_any_id_value(id: &str) {
        let repo = seeded();
        let patch = format!(r#"{{"id": {id}, "active": false}}"#);

        let status = cmd_update(&repo, "1", &patch, &mut Vec::new()).unwrap();

        assert!(status.is_success());
        let stored = repo.find_by_id(VehicleId::new(1)).unwrap().unwrap();
        assert!(!stored.active);
        assert_eq!(stored.name, "Corolla");
    }

    #[test]
    fn test_update_missing_vehicle() {
        let status = cmd_update(&seeded(), "7", "{}", &mut Vec::new()).unwrap();
        assert_eq!(status, CommandStatus::NotFound(VehicleId::new(7)));
    }

    #[test_case("not json"; "malformed")]
    #[test_case("[1, 2]"; "array")]
    #[test_case(r#"{"active": "yes"}"#; "wrong type")]
    fn test_update_rejects_bad_patch(patch: &str) {
        let result = cmd_update(&seeded(), "1", patch, &mut Vec::new());
        assert!(matches!(result, Err(Error::InvalidInput(_))));
    }

    #[test]
    fn test_delete_then_missing() {
        let repo = seeded();

        let mut out = Vec::new();
        assert!(cmd_delete(&repo, "1", &mut out).unwrap().is_success());
        assert_eq!(output(out), serde_json::json!({ "deleted": 1 }));

        assert_eq!(
            cmd_delete(&repo, "1", &mut Vec::new()).unwrap(),
            CommandStatus::NotFound(VehicleId::new(1))
        );
    }
}
