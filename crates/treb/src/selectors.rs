//! `dialoguer`-backed interactive disambiguation (§4.10, §4.6): the one
//! concrete implementation of the `Selector` seams each of `treb-resolver`
//! and `treb-params` draws around terminal rendering.

use dialoguer::Select;
use treb_registry::Deployment;

pub struct InteractiveDeploymentSelector;

impl treb_resolver::Selector for InteractiveDeploymentSelector {
    fn select(&self, candidates: &[Deployment]) -> Option<Deployment> {
        let labels: Vec<String> = candidates.iter().map(|d| d.id()).collect();
        let choice = Select::new().with_prompt("Multiple deployments match").items(&labels).interact_opt().ok().flatten()?;
        candidates.get(choice).cloned()
    }
}

pub struct InteractiveStringSelector;

impl treb_params::Selector for InteractiveStringSelector {
    fn select(&self, candidates: &[String]) -> Option<String> {
        let choice = Select::new().with_prompt("Multiple candidates match").items(candidates).interact_opt().ok().flatten()?;
        candidates.get(choice).cloned()
    }
}
