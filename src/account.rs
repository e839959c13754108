use jetnet::Jetnet;
use tracing::info;

use crate::error::CliError;
use crate::output::write_json;

/// Log in and print the account-info response.
pub async fn run_account(client: &Jetnet) -> Result<(), CliError> {
    let account = client.account_info().await?;
    info!(generation = client.session().await.generation(), "account info fetched");
    write_json(&mut std::io::stdout().lock(), &account)
}
