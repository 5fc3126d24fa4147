//! `dtnctl endpoint`: print the endpoint identifier the daemon will use.

use anyhow::Result;

use dtn_core::IdentityResolver;

use super::load_preferences;
use crate::HostArgs;

pub fn run(host: &HostArgs) -> Result<()> {
    let prefs = load_preferences(host)?;
    let eid = match prefs.endpoint_id {
        Some(eid) => eid,
        None => IdentityResolver::new().resolve(&host.device_id()?),
    };
    println!("{eid}");
    Ok(())
}
