use jetnet::Jetnet;
use tracing::info;

use crate::error::CliError;
use crate::output::write_json;

/// Print the aircraft profile for one tail number.
pub async fn run_lookup(client: &Jetnet, registration: &str) -> Result<(), CliError> {
    let Some(profile) = client.aircraft_profile(registration).await? else {
        return Err(CliError::NotFound(registration.to_string()));
    };

    info!(
        registration,
        aircraft_id = ?profile.aircraft_id(),
        relationships = profile.relationships.len(),
        pictures = profile.pictures.len(),
        "aircraft profile fetched"
    );
    write_json(&mut std::io::stdout().lock(), &profile)
}
