// Sample data for trying out a fresh data directory

use scribble::Store;
use serde::{Deserialize, Serialize};

pub const COLLECTION: &str = "user";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Address {
    pub city: String,
    pub state: String,
    pub country: String,
    pub pincode: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct User {
    pub name: String,
    pub age: String,
    pub contact: String,
    pub company: String,
    pub address: Address,
}

fn sample_users() -> Vec<User> {
    let user = |name: &str, age: &str, contact: &str, company: &str, city: &str, pincode: &str| User {
        name: name.to_string(),
        age: age.to_string(),
        contact: contact.to_string(),
        company: company.to_string(),
        address: Address {
            city: city.to_string(),
            state: "Oregon".to_string(),
            country: "USA".to_string(),
            pincode: pincode.to_string(),
        },
    };

    vec![
        user("Ada Park", "34", "5035550101", "Lumen Labs", "Portland", "97201"),
        user("Ben Ortiz", "27", "5415550142", "Harbor Freight Co", "Eugene", "97401"),
        user("Chloe Novak", "45", "5035550199", "Ridgeline Software", "Salem", "97301"),
    ]
}

/// Write the sample users, then read the whole collection back.
///
/// Records that fail to decode as a `User` are logged and skipped.
pub fn populate(store: &Store) -> scribble::Result<Vec<User>> {
    for user in sample_users() {
        store.write(COLLECTION, &user.name, &user)?;
    }

    let mut users = Vec::new();
    for raw in store.read_all(COLLECTION)? {
        match serde_json::from_str::<User>(&raw) {
            Ok(user) => users.push(user),
            Err(e) => log::warn!("Skipping undecodable record in '{COLLECTION}': {e}"),
        }
    }
    users.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(users)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_populate_round_trips_samples() {
        let tmp = TempDir::new().unwrap();
        let store = Store::new(tmp.path(), None).unwrap();

        let users = populate(&store).unwrap();
        assert_eq!(users, sample_users());
    }

    #[test]
    fn test_populate_skips_foreign_records() {
        let tmp = TempDir::new().unwrap();
        let store = Store::new(tmp.path(), None).unwrap();
        store
            .write(COLLECTION, "stray", &serde_json::json!({ "unexpected": true }))
            .unwrap();

        let users = populate(&store).unwrap();
        assert_eq!(users.len(), 3);
    }
}
