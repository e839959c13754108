//! Aircraft lookups built on authenticated requests.

use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::client::Jetnet;
use crate::error::{ErrorKind, Result};
use crate::rest::endpoints::{pictures_path, reg_number_path, RELATIONSHIPS_PATH};
use crate::types::{aircraft_id, AircraftProfile};

impl Jetnet {
    /// Look up an aircraft by tail number.
    ///
    /// Returns `None` when the provider answers without an `aircraftresult`
    /// carrying an `aircraftid`.
    pub async fn lookup_registration(&self, registration: &str) -> Result<Option<Value>> {
        let path = reg_number_path(registration)?;
        let mut response = self.get(&path).await?;

        let aircraft = response
            .get_mut("aircraftresult")
            .map(Value::take)
            .filter(|ac| aircraft_id(ac).is_some());
        Ok(aircraft)
    }

    /// Owner/operator relationships of one aircraft.
    pub async fn relationships(&self, aircraft_id: u64) -> Result<Vec<Value>> {
        let body = json!({
            "aircraftid": aircraft_id,
            "aclist": [aircraft_id],
            "modlist": [],
            "actiondate": "",
            "showHistoricalAcRefs": false,
        });
        let response = self.post(RELATIONSHIPS_PATH, &body).await?;
        Ok(take_list(response, "relationships"))
    }

    /// Pictures of one aircraft.
    pub async fn pictures(&self, aircraft_id: u64) -> Result<Vec<Value>> {
        let response = self.get(&pictures_path(aircraft_id)).await?;
        Ok(take_list(response, "pictures"))
    }

    /// Aircraft record with its relationships and pictures.
    ///
    /// The two secondary lookups run concurrently. A provider-side rejection
    /// of either one is logged and leaves that list empty; auth and
    /// transport failures are returned.
    pub async fn aircraft_profile(&self, registration: &str) -> Result<Option<AircraftProfile>> {
        let Some(aircraft) = self.lookup_registration(registration).await? else {
            debug!(registration, "no aircraft found");
            return Ok(None);
        };
        let Some(id) = aircraft_id(&aircraft) else {
            return Ok(None);
        };

        let (relationships, pictures) = tokio::join!(self.relationships(id), self.pictures(id));

        Ok(Some(AircraftProfile {
            aircraft,
            relationships: or_empty(relationships, id, "relationships")?,
            pictures: or_empty(pictures, id, "pictures")?,
        }))
    }
}

fn take_list(mut response: Value, key: &str) -> Vec<Value> {
    match response.get_mut(key).map(Value::take) {
        Some(Value::Array(items)) => items,
        _ => Vec::new(),
    }
}

fn or_empty(result: Result<Vec<Value>>, aircraft_id: u64, what: &str) -> Result<Vec<Value>> {
    match result {
        Err(e) if e.kind() == ErrorKind::Api => {
            warn!(aircraft_id, what, error = %e, "lookup rejected, continuing without it");
            Ok(Vec::new())
        }
        other => other,
    }
}
