//! SNMPv2c GET over snmp2.

use std::net::Ipv4Addr;
use std::thread;
use std::time::Duration;

use anyhow::{Context, anyhow};
use snmp2::{AsyncSession, Oid, Value};
use tokio::sync::oneshot;
use tokio::time::timeout;
use tracing::trace;

pub const SNMP_PORT: u16 = 161;

/// `SNMPv2-MIB::sysDescr.0`
pub const SYS_DESCR: &[u64] = &[1, 3, 6, 1, 2, 1, 1, 1, 0];

/// Stack for the SNMP exchange thread. The snmp2 GET path needs far more than
/// a tokio worker's 2 MiB in unoptimised builds.
const SNMP_STACK_SIZE: usize = 64 * 1024 * 1024;

/// Fetches one OID and renders its value as text.
///
/// `Ok(None)` covers every way an agent can fail to answer: silence, a wrong
/// community, `noSuchObject`/`noSuchInstance`/`endOfMibView`. `Err` means the
/// local UDP session could not be created at all.
///
/// The exchange runs on its own thread and current-thread runtime, so it is safe
/// to await from any tokio worker.
pub async fn get(
    ip: Ipv4Addr,
    oid: &[u64],
    community: &str,
    probe_timeout: Duration,
) -> anyhow::Result<Option<String>> {
    let oid = oid.to_vec();
    let community = community.to_string();
    let (tx, rx) = oneshot::channel();

    thread::Builder::new()
        .name(format!("snmp-{ip}"))
        .stack_size(SNMP_STACK_SIZE)
        .spawn(move || {
            let result = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .context("building the SNMP runtime")
                .and_then(|rt| rt.block_on(exchange(ip, &oid, &community, probe_timeout)));
            let _ = tx.send(result);
        })
        .context("spawning the SNMP thread")?;

    rx.await.map_err(|_| anyhow!("SNMP thread for {ip} ended without a result"))?
}

async fn exchange(
    ip: Ipv4Addr,
    oid: &[u64],
    community: &str,
    probe_timeout: Duration,
) -> anyhow::Result<Option<String>> {
    let oid = Oid::from(oid).map_err(|_| anyhow!("invalid OID {oid:?}"))?;
    let addr = format!("{ip}:{SNMP_PORT}");

    let mut session = match timeout(probe_timeout, AsyncSession::new_v2c(&addr, community.as_bytes(), 0)).await {
        Ok(session) => session.map_err(|e| anyhow!("opening SNMP session to {addr}: {e:?}"))?,
        Err(_elapsed) => return Ok(None),
    };

    let mut response = match timeout(probe_timeout, session.get(&oid)).await {
        Ok(Ok(response)) => response,
        Ok(Err(e)) => {
            trace!("SNMP GET to {ip} failed: {e:?}");
            return Ok(None);
        }
        Err(_elapsed) => return Ok(None),
    };

    if response.error_status != 0 {
        trace!("SNMP agent {ip} answered with error status {}", response.error_status);
        return Ok(None);
    }

    Ok(response.varbinds.next().and_then(|(_, value)| render(&value)))
}

fn render(value: &Value<'_>) -> Option<String> {
    let text = match value {
        Value::OctetString(bytes) => String::from_utf8_lossy(bytes).trim().to_string(),
        Value::Integer(n) => n.to_string(),
        Value::Counter32(n) | Value::Unsigned32(n) => n.to_string(),
        Value::Timeticks(n) => n.to_string(),
        Value::Counter64(n) => n.to_string(),
        Value::IpAddress(octets) => Ipv4Addr::from(*octets).to_string(),
        _ => return None,
    };
    (!text.is_empty()).then_some(text)
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
