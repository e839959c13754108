use std::fmt;
use std::str::FromStr;

use crate::error::{JetnetError, Result};

// --- Admin ---

/// POST - credentials in, bearer + API token out.
pub const LOGIN_PATH: &str = "/api/Admin/APILogin";

/// GET - account metadata; cheapest call that needs a valid token.
pub const ACCOUNT_INFO_PATH: &str = "/api/Admin/getAccountInfo/{apiToken}";

// --- Aircraft ---

/// POST - owner/operator relationships for a list of aircraft.
pub const RELATIONSHIPS_PATH: &str = "/api/Aircraft/getRelationships/{apiToken}";

/// GET /api/Aircraft/getRegNumber/{reg}/{apiToken} - aircraft by tail number.
pub fn reg_number_path(registration: &str) -> Result<String> {
    let reg = normalize_registration(registration)?;
    Ok(format!("/api/Aircraft/getRegNumber/{reg}/{{apiToken}}"))
}

/// GET /api/Aircraft/getPictures/{aircraft_id}/{apiToken}
pub fn pictures_path(aircraft_id: u64) -> String {
    format!("/api/Aircraft/getPictures/{aircraft_id}/{{apiToken}}")
}

/// Trim and upper-case a tail number.
///
/// # Errors
///
/// Returns `JetnetError::Validation` if it is empty or contains anything
/// other than ASCII letters, digits and `-`.
pub fn normalize_registration(registration: &str) -> Result<String> {
    let reg = registration.trim().to_ascii_uppercase();
    if reg.is_empty() {
        return Err(JetnetError::Validation("registration is empty".into()));
    }
    if !reg.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
        return Err(JetnetError::Validation(format!(
            "invalid registration {registration:?}"
        )));
    }
    Ok(reg)
}

// --- Paged ---

/// The provider's paged endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PagedEndpoint {
    History,
    FlightData,
    Events,
    BulkAircraftExport,
    Companies,
    Contacts,
    FractionalOwnership,
}

impl PagedEndpoint {
    pub const ALL: [PagedEndpoint; 7] = [
        PagedEndpoint::History,
        PagedEndpoint::FlightData,
        PagedEndpoint::Events,
        PagedEndpoint::BulkAircraftExport,
        PagedEndpoint::Companies,
        PagedEndpoint::Contacts,
        PagedEndpoint::FractionalOwnership,
    ];

    /// Path without token, page size or page number.
    pub fn path(self) -> &'static str {
        match self {
            PagedEndpoint::History => "/api/Aircraft/getHistoryListPaged",
            PagedEndpoint::FlightData => "/api/Aircraft/getFlightDataPaged",
            PagedEndpoint::Events => "/api/Aircraft/getEventListPaged",
            PagedEndpoint::BulkAircraftExport => "/api/Aircraft/getBulkAircraftExportPaged",
            PagedEndpoint::Companies => "/api/Company/getCompanyListPaged",
            PagedEndpoint::Contacts => "/api/Contact/getContactListPaged",
            PagedEndpoint::FractionalOwnership => {
                "/api/Aircraft/getAcCompanyFractionalReportPaged"
            }
        }
    }

    /// Response field holding this endpoint's records.
    pub fn record_key(self) -> &'static str {
        match self {
            PagedEndpoint::History => "history",
            PagedEndpoint::FlightData => "flightdata",
            PagedEndpoint::Events => "events",
            PagedEndpoint::BulkAircraftExport => "aircraft",
            PagedEndpoint::Companies => "companylist",
            PagedEndpoint::Contacts => "contactlist",
            PagedEndpoint::FractionalOwnership => "aircraftcompfractionalrefs",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            PagedEndpoint::History => "history",
            PagedEndpoint::FlightData => "flight-data",
            PagedEndpoint::Events => "events",
            PagedEndpoint::BulkAircraftExport => "bulk-export",
            PagedEndpoint::Companies => "companies",
            PagedEndpoint::Contacts => "contacts",
            PagedEndpoint::FractionalOwnership => "fractional",
        }
    }

    /// Provider default page size; bulk export records are large.
    pub fn default_page_size(self) -> u32 {
        match self {
            PagedEndpoint::BulkAircraftExport => 50,
            _ => 100,
        }
    }
}

impl fmt::Display for PagedEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for PagedEndpoint {
    type Err = JetnetError;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim().to_ascii_lowercase().replace('_', "-");
        Self::ALL
            .into_iter()
            .find(|e| e.name() == wanted)
            .ok_or_else(|| {
                let names: Vec<&str> = Self::ALL.iter().map(|e| e.name()).collect();
                JetnetError::Validation(format!(
                    "unknown paged endpoint {s:?} (expected one of: {})",
                    names.join(", ")
                ))
            })
    }
}
