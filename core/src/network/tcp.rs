use std::net::{Ipv4Addr, SocketAddr};
use std::time::Duration;

use tokio::net::TcpStream;
use tokio::time::timeout;

/// Full connect probe. Only an established connection counts as open; refused,
/// unreachable and timed out are all closed.
pub async fn handshake_probe(ip: Ipv4Addr, port: u16, probe_timeout: Duration) -> bool {
    let socket_addr = SocketAddr::from((ip, port));
    matches!(timeout(probe_timeout, TcpStream::connect(socket_addr)).await, Ok(Ok(_)))
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::net::TcpListener;

    #[tokio::test]
    async fn listening_port_is_open() {
        let listener = TcpListener::bind((Ipv4Addr::LOCALHOST, 0)).await.unwrap();
        let port = listener.local_addr().unwrap().port();
        assert!(handshake_probe(Ipv4Addr::LOCALHOST, port, Duration::from_millis(300)).await);
    }

    #[tokio::test]
    async fn closed_port_is_not_open() {
        let port = {
            let listener = TcpListener::bind((Ipv4Addr::LOCALHOST, 0)).await.unwrap();
            listener.local_addr().unwrap().port()
        };
        assert!(!handshake_probe(Ipv4Addr::LOCALHOST, port, Duration::from_millis(300)).await);
    }

    #[tokio::test]
    #[ignore]
    async fn unreachable_address_times_out() {
        let ip = Ipv4Addr::new(203, 0, 113, 1);
        assert!(!handshake_probe(ip, 443, Duration::from_millis(100)).await);
    }
}
