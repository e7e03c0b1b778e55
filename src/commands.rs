// ABOUTME: Subcommands of the petstore CLI, each built on a single gateway operation.
// ABOUTME: Renders results as a plain table or JSON and maps zero-row outcomes to errors.

use std::fmt::Write as _;

use anyhow::{Context, bail};
use clap::Subcommand;
use petstore_core::contract::COLUMN_ID;
use petstore_core::{Field, Gender, Pet, PetFields, Route};
use petstore_store::PetGateway;

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List pets, optionally filtered and sorted
    List {
        /// SQL predicate with `?` placeholders, e.g. "weight > ?"
        #[arg(long)]
        filter: Option<String>,
        /// Value bound to the next `?` in the filter (repeatable)
        #[arg(long = "arg")]
        args: Vec<String>,
        /// SQL ordering, e.g. "name ASC"
        #[arg(long)]
        sort: Option<String>,
    },
    /// Print the number of stored pets
    Count,
    /// Show one pet by id
    Show { id: i64 },
    /// Add a pet
    Add {
        #[arg(long)]
        name: String,
        #[arg(long)]
        breed: Option<String>,
        /// unknown, male, female (or 0-2)
        #[arg(long, default_value = "unknown")]
        gender: Gender,
        /// Weight in kg
        #[arg(long, allow_negative_numbers = true)]
        weight: i64,
    },
    /// Change some fields of a pet
    Update {
        id: i64,
        #[arg(long)]
        name: Option<String>,
        #[arg(long, conflicts_with = "clear_breed")]
        breed: Option<String>,
        /// Store no breed for this pet
        #[arg(long)]
        clear_breed: bool,
        #[arg(long)]
        gender: Option<Gender>,
        #[arg(long, allow_negative_numbers = true)]
        weight: Option<i64>,
    },
    /// Delete one pet by id
    Delete { id: i64 },
    /// Delete every pet
    DeleteAll,
    /// Insert a sample pet
    Seed,
    /// Print the content kind of a resource URI
    Type { uri: String },
}

/// Execute one command and return what should be printed on stdout.
pub fn run(gateway: &PetGateway, command: Command, json: bool) -> anyhow::Result<String> {
    let router = gateway.router();
    let collection = router.collection_uri();

    match command {
        Command::List { filter, args, sort } => {
            let args: Vec<&str> = args.iter().map(String::as_str).collect();
            let sort = sort.as_deref().unwrap_or(COLUMN_ID);
            let pets = gateway
                .query(&collection, None, filter.as_deref(), &args, Some(sort))?
                .into_pets()?;
            render_pets(&pets, json)
        }

        Command::Count => {
            let count = gateway
                .query(&collection, Some(&[COLUMN_ID][..]), None, &[], None)?
                .count();
            if json {
                Ok(format!("{}\n", serde_json::json!({ "count": count })))
            } else {
                Ok(format!("{count}\n"))
            }
        }

        Command::Show { id } => {
            let pets = gateway
                .query(&router.item_uri(id), None, None, &[], None)?
                .into_pets()?;
            if pets.is_empty() {
                bail!("no pet with id {id}");
            }
            render_pets(&pets, json)
        }

        Command::Add {
            name,
            breed,
            gender,
            weight,
        } => {
            let fields = PetFields::for_pet(&name, breed.as_deref(), gender, weight);
            insert(gateway, &collection, &fields)
        }

        Command::Update {
            id,
            name,
            breed,
            clear_breed,
            gender,
            weight,
        } => {
            let mut fields = PetFields::new();
            if let Some(name) = name {
                fields = fields.with_name(name);
            }
            if let Some(breed) = breed {
                fields = fields.with_breed(breed);
            }
            if clear_breed {
                fields = fields.with_null(Field::Breed);
            }
            if let Some(gender) = gender {
                fields = fields.with_gender(gender);
            }
            if let Some(weight) = weight {
                fields = fields.with_weight(weight);
            }
            if fields.is_empty() {
                return Ok("nothing to update\n".to_string());
            }

            let updated = gateway.update(&router.item_uri(id), &fields, None, &[])?;
            if updated == 0 {
                bail!("no pet with id {id}");
            }
            Ok(format!("pet {id} updated\n"))
        }

        Command::Delete { id } => {
            let deleted = gateway.delete(&router.item_uri(id), None, &[])?;
            if deleted == 0 {
                bail!("no pet with id {id}");
            }
            Ok(format!("pet {id} deleted\n"))
        }

        Command::DeleteAll => {
            let deleted = gateway.delete(&collection, None, &[])?;
            Ok(format!("deleted {deleted} pets\n"))
        }

        Command::Seed => {
            let fields = PetFields::for_pet("Toto", Some("Terrier"), Gender::Male, 7);
            insert(gateway, &collection, &fields)
        }

        Command::Type { uri } => Ok(format!("{}\n", gateway.resource_type(&uri)?)),
    }
}

fn insert(gateway: &PetGateway, collection: &str, fields: &PetFields) -> anyhow::Result<String> {
    let uri = gateway.insert(collection, fields)?;
    let id = match gateway.router().classify(&uri)? {
        Route::Item(id) => id,
        Route::Collection => bail!("insert returned a collection uri: {uri}"),
    };
    Ok(format!("pet saved with id {id}: {uri}\n"))
}

fn render_pets(pets: &[Pet], json: bool) -> anyhow::Result<String> {
    if json {
        let mut out = serde_json::to_string_pretty(pets).context("serializing pets")?;
        out.push('\n');
        return Ok(out);
    }

    let mut out = String::new();
    writeln!(out, "{:>5}  {:<20} {:<16} {:<8} {:>6}", "ID", "NAME", "BREED", "GENDER", "WEIGHT")?;
    for pet in pets {
        writeln!(
            out,
            "{:>5}  {:<20} {:<16} {:<8} {:>6}",
            pet.id,
            pet.name,
            pet.breed.as_deref().unwrap_or("-"),
            pet.gender,
            pet.weight
        )?;
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use petstore_core::contract::DEFAULT_AUTHORITY;
    use tempfile::TempDir;

    fn gateway(dir: &TempDir) -> PetGateway {
        PetGateway::open(dir.path().join("pets.db"), DEFAULT_AUTHORITY)
    }

    #[test]
    fn seed_then_list() {
        let dir = TempDir::new().unwrap();
        let gw = gateway(&dir);

        let out = run(&gw, Command::Seed, false).unwrap();
        assert_eq!(
            out,
            "pet saved with id 1: content://com.example.android.pets/pets/1\n"
        );

        let table = run(
            &gw,
            Command::List {
                filter: None,
                args: vec![],
                sort: None,
            },
            false,
        )
        .unwrap();
        assert!(table.contains("Toto"));
        assert!(table.contains("Terrier"));
        assert!(table.contains("male"));

        let json = run(&gw, Command::Show { id: 1 }, true).unwrap();
        let parsed: Vec<Pet> = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed[0].name, "Toto");
    }

    #[test]
    fn add_with_zero_weight_is_rejected() {
        let dir = TempDir::new().unwrap();
        let gw = gateway(&dir);
        let err = run(
            &gw,
            Command::Add {
                name: "Rex".to_string(),
                breed: None,
                gender: Gender::Unknown,
                weight: 0,
            },
            false,
        )
        .unwrap_err();
        assert!(err.to_string().contains("weight"), "{err}");
        assert_eq!(run(&gw, Command::Count, false).unwrap(), "0\n");
    }

    #[test]
    fn update_clears_breed() {
        let dir = TempDir::new().unwrap();
        let gw = gateway(&dir);
        run(&gw, Command::Seed, false).unwrap();

        run(
            &gw,
            Command::Update {
                id: 1,
                name: None,
                breed: None,
                clear_breed: true,
                gender: None,
                weight: Some(0),
            },
            false,
        )
        .unwrap();

        let json = run(&gw, Command::Show { id: 1 }, true).unwrap();
        let parsed: Vec<Pet> = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed[0].breed, None);
        assert_eq!(parsed[0].weight, 0);
    }

    #[test]
    fn missing_ids_are_errors() {
        let dir = TempDir::new().unwrap();
        let gw = gateway(&dir);
        assert!(run(&gw, Command::Show { id: 5 }, false).is_err());
        assert!(run(&gw, Command::Delete { id: 5 }, false).is_err());
    }

    #[test]
    fn delete_all_and_count() {
        let dir = TempDir::new().unwrap();
        let gw = gateway(&dir);
        run(&gw, Command::Seed, false).unwrap();
        run(&gw, Command::Seed, false).unwrap();
        assert_eq!(run(&gw, Command::Count, true).unwrap(), "{\"count\":2}\n");
        assert_eq!(
            run(&gw, Command::DeleteAll, false).unwrap(),
            "deleted 2 pets\n"
        );
        assert_eq!(run(&gw, Command::Count, false).unwrap(), "0\n");
    }

    #[test]
    fn type_reports_kind() {
        let dir = TempDir::new().unwrap();
        let gw = gateway(&dir);
        let out = run(
            &gw,
            Command::Type {
                uri: "content://com.example.android.pets/pets/3".to_string(),
            },
            false,
        )
        .unwrap();
        assert_eq!(out, "vnd.android.cursor.item/com.example.android.pets.pets\n");
    }
}
