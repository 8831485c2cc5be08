//! Service registry commands.

use anyhow::{Context, Result};
use common::{ServiceResponse, ServiceStore, Services};
use tabled::Tabled;

use crate::output::OutputFormatter;

/// List services recorded for the configured enclave
pub fn list_services(store: &ServiceStore, formatter: &OutputFormatter) -> Result<()> {
    let services = store
        .read_all()
        .with_context(|| format!("Failed to read service registry {}", store.path().display()))?;

    if formatter.json_mode {
        return formatter.json(&services);
    }

    if services.is_empty() {
        formatter.info(&format!(
            "No services recorded in {}",
            store.path().display()
        ));
        return Ok(());
    }

    formatter.header(&format!("Running Services ({})", services.len()));
    formatter.table(service_rows(&services), "No services to display");
    println!();
    formatter.info(&format!("Registry: {}", store.path().display()));

    Ok(())
}

fn service_rows(services: &Services) -> Vec<ServiceTableRow> {
    services.values().map(ServiceTableRow::from).collect()
}

/// Table row for service list
#[derive(Tabled)]
struct ServiceTableRow {
    #[tabled(rename = "Service")]
    service_name: String,
    #[tabled(rename = "Endpoint")]
    endpoint: String,
    #[tabled(rename = "Public Endpoint")]
    public_endpoint: String,
    #[tabled(rename = "Network")]
    network: String,
    #[tabled(rename = "NID / Chain ID")]
    network_id: String,
}

impl From<&ServiceResponse> for ServiceTableRow {
    fn from(response: &ServiceResponse) -> Self {
        let network_id = if response.network_id.is_empty() {
            &response.chain_id
        } else {
            &response.network_id
        };

        Self {
            service_name: response.service_name.clone(),
            endpoint: OutputFormatter::or_dash(&response.private_endpoint),
            public_endpoint: OutputFormatter::or_dash(&response.public_endpoint),
            network: OutputFormatter::or_dash(&response.network),
            network_id: OutputFormatter::or_dash(network_id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rows_fall_back_to_chain_id() {
        let mut services = Services::new();
        services.insert(
            "el-1-geth".to_string(),
            ServiceResponse {
                service_name: "el-1-geth".to_string(),
                private_endpoint: "http://172.16.0.5:8545".to_string(),
                chain_id: "3151908".to_string(),
                ..Default::default()
            },
        );

        let rows = service_rows(&services);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].network_id, "3151908");
        assert_eq!(rows[0].public_endpoint, "-");
    }

    #[test]
    fn test_list_empty_registry() {
        let dir = tempfile::tempdir().unwrap();
        let store = ServiceStore::for_enclave(dir.path(), "bridge");
        let formatter = OutputFormatter::new(false, false);

        assert!(list_services(&store, &formatter).is_ok());
    }
}
