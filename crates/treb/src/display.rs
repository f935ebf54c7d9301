//! `comfy-table` rendering for `list`/`networks`/`show`/`tag` (§6). Display
//! is read-only and never mutates registry state (§2 data flow: "Display
//! uses C3/C4/C8 read-only").

use comfy_table::{presets::UTF8_FULL, Table};
use treb_config::NetworkEntry;
use treb_registry::Deployment;

pub fn deployments_table(deployments: &[Deployment]) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL).set_header(vec!["id", "type", "address", "tags"]);
    for d in deployments {
        let tags = d.tags.iter().cloned().collect::<Vec<_>>().join(",");
        table.add_row(vec![d.id(), format!("{:?}", d.ty), treb_common::address_hex(&d.address), tags]);
    }
    table
}

pub fn networks_table(networks: &[NetworkEntry]) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL).set_header(vec!["name", "url", "chain_id"]);
    for n in networks {
        table.add_row(vec![n.name.clone(), n.url.clone(), n.chain_id.map(|c| c.to_string()).unwrap_or_else(|| "-".to_string())]);
    }
    table
}

pub fn deployment_detail(d: &Deployment) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL).set_header(vec!["field", "value"]);
    table.add_row(vec!["id".to_string(), d.id()]);
    table.add_row(vec!["address".to_string(), treb_common::address_hex(&d.address)]);
    table.add_row(vec!["type".to_string(), format!("{:?}", d.ty)]);
    table.add_row(vec!["verification".to_string(), format!("{:?}", d.verification_status)]);
    table.add_row(vec!["tags".to_string(), d.tags.iter().cloned().collect::<Vec<_>>().join(",")]);
    if let Some(proxy) = &d.proxy_info {
        table.add_row(vec!["implementation".to_string(), proxy.implementation_deployment_id.clone()]);
    }
    table
}
