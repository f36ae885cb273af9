use std::net::SocketAddr;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use log::debug;
use timeguard_core::Timestamp;
use timeguard_ports::{NetworkError, NetworkResult, TrustedTimeSource};
use tokio::net::{UdpSocket, lookup_host};
use tokio::time::timeout;

/// Default server queried when none is configured
pub const DEFAULT_NTP_SERVER: &str = "0.beevik-ntp.pool.ntp.org:123";

/// Default per-query timeout
pub const DEFAULT_QUERY_TIMEOUT: Duration = Duration::from_secs(5);

const NTP_PORT: u16 = 123;
const PACKET_LEN: usize = 48;
/// Seconds between 1900-01-01 (NTP epoch) and 1970-01-01
const NTP_UNIX_OFFSET: i64 = 2_208_988_800;
/// Length of one NTP era in seconds
const NTP_ERA: i64 = 1 << 32;

const MODE_CLIENT: u8 = 3;
const MODE_SERVER: u8 = 4;
const VERSION: u8 = 4;
const LEAP_ALARM: u8 = 3;

/// 64-bit NTP timestamp (seconds and fraction since the NTP epoch)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct NtpTimestamp {
    secs: u32,
    frac: u32,
}

impl NtpTimestamp {
    fn read(bytes: &[u8]) -> Self {
        Self {
            secs: u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]),
            frac: u32::from_be_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]),
        }
    }

    fn write(&self, bytes: &mut [u8]) {
        bytes[0..4].copy_from_slice(&self.secs.to_be_bytes());
        bytes[4..8].copy_from_slice(&self.frac.to_be_bytes());
    }

    fn is_zero(&self) -> bool {
        self.secs == 0 && self.frac == 0
    }

    #[cfg(test)]
    fn from_timestamp(instant: Timestamp) -> Self {
        let secs = (instant.timestamp() + NTP_UNIX_OFFSET).rem_euclid(NTP_ERA) as u32;
        let frac = ((u64::from(instant.timestamp_subsec_nanos()) << 32) / 1_000_000_000) as u32;
        Self { secs, frac }
    }

    /// Convert to UTC
    ///
    /// Values with the top bit clear are taken to be in era 1 (after
    /// 2036-02-07), which keeps the conversion valid until 2104.
    fn to_timestamp(self) -> Option<Timestamp> {
        let mut secs = i64::from(self.secs);
        if self.secs & 0x8000_0000 == 0 {
            secs += NTP_ERA;
        }
        let nanos = ((u64::from(self.frac) * 1_000_000_000) >> 32) as u32;
        DateTime::<Utc>::from_timestamp(secs - NTP_UNIX_OFFSET, nanos)
    }
}

/// Random origin for one request
///
/// The local clock may be rolled back, so it is never used here: an
/// off-path responder has to guess all 64 bits.
fn request_nonce() -> NtpTimestamp {
    NtpTimestamp {
        secs: rand::random(),
        frac: rand::random(),
    }
}

/// Build a client request carrying `nonce` as transmit timestamp
fn build_request(nonce: NtpTimestamp) -> [u8; PACKET_LEN] {
    let mut packet = [0u8; PACKET_LEN];
    packet[0] = (VERSION << 3) | MODE_CLIENT;
    nonce.write(&mut packet[40..48]);
    packet
}

/// Extract the server transmit time from a response
///
/// Only the sanity checks of RFC 4330 section 5 are applied; no offset or
/// delay is computed.
fn parse_response(packet: &[u8], nonce: NtpTimestamp) -> NetworkResult<Timestamp> {
    if packet.len() < PACKET_LEN {
        return Err(NetworkError::InvalidResponse(format!(
            "short packet: {} bytes",
            packet.len()
        )));
    }

    let leap = packet[0] >> 6;
    let mode = packet[0] & 0x07;
    let stratum = packet[1];

    if mode != MODE_SERVER {
        return Err(NetworkError::InvalidResponse(format!(
            "unexpected mode {}",
            mode
        )));
    }
    if stratum == 0 {
        let code = String::from_utf8_lossy(&packet[12..16]).to_string();
        return Err(NetworkError::InvalidResponse(format!(
            "kiss-o'-death {}",
            code.trim_end_matches('\0')
        )));
    }
    if leap == LEAP_ALARM {
        return Err(NetworkError::InvalidResponse(
            "server clock not synchronized".to_string(),
        ));
    }
    if NtpTimestamp::read(&packet[24..32]) != nonce {
        return Err(NetworkError::InvalidResponse(
            "originate timestamp does not match request".to_string(),
        ));
    }

    let transmit = NtpTimestamp::read(&packet[40..48]);
    if transmit.is_zero() {
        return Err(NetworkError::InvalidResponse(
            "zero transmit timestamp".to_string(),
        ));
    }

    transmit.to_timestamp().ok_or_else(|| {
        NetworkError::InvalidResponse(format!("transmit timestamp out of range: {:?}", transmit))
    })
}

/// Minimal SNTPv4 client
///
/// One query per `fetch`: the server's transmit timestamp is returned as is.
/// Server selection, failover and clock filtering are left to the caller.
#[derive(Debug, Clone)]
pub struct SntpSource {
    server: String,
    timeout: Duration,
}

impl SntpSource {
    /// `server` is `host` or `host:port`; port 123 is assumed when absent
    pub fn new(server: impl Into<String>) -> Self {
        Self {
            server: server.into(),
            timeout: DEFAULT_QUERY_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    async fn resolve(&self) -> NetworkResult<SocketAddr> {
        let target = if self.server.rsplit_once(':').is_some_and(|(host, port)| {
            !host.is_empty() && !host.ends_with(':') && port.parse::<u16>().is_ok()
        }) {
            self.server.clone()
        } else {
            format!("{}:{}", self.server, NTP_PORT)
        };

        let mut addrs = lookup_host(target.clone())
            .await
            .map_err(|e| NetworkError::Unresolved(format!("{}: {}", target, e)))?;
        addrs.next().ok_or(NetworkError::Unresolved(target))
    }

    async fn query(&self) -> NetworkResult<Timestamp> {
        let addr = self.resolve().await?;
        let bind: SocketAddr = if addr.is_ipv4() {
            SocketAddr::from(([0, 0, 0, 0], 0))
        } else {
            SocketAddr::from(([0u16; 8], 0))
        };

        let socket = UdpSocket::bind(bind).await?;
        socket.connect(addr).await?;

        let nonce = request_nonce();
        socket.send(&build_request(nonce)).await?;
        debug!("Sent SNTP request to {}", addr);

        let mut buf = [0u8; 128];
        let len = socket.recv(&mut buf).await?;
        parse_response(&buf[..len], nonce)
    }
}

impl Default for SntpSource {
    fn default() -> Self {
        Self::new(DEFAULT_NTP_SERVER)
    }
}

#[async_trait]
impl TrustedTimeSource for SntpSource {
    async fn fetch(&self) -> NetworkResult<Timestamp> {
        timeout(self.timeout, self.query())
            .await
            .map_err(|_| NetworkError::Timeout(self.server.clone()))?
    }

    fn server(&self) -> &str {
        &self.server
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use timeguard_core::from_unix_seconds;

    fn response_for(request: &[u8], transmit: NtpTimestamp) -> [u8; PACKET_LEN] {
        let mut packet = [0u8; PACKET_LEN];
        packet[0] = (VERSION << 3) | MODE_SERVER;
        packet[1] = 2;
        packet[24..32].copy_from_slice(&request[40..48]);
        transmit.write(&mut packet[40..48]);
        packet
    }

    #[test]
    fn test_ntp_timestamp_conversion() {
        let instant = from_unix_seconds(1_700_000_500).unwrap();
        let ntp = NtpTimestamp::from_timestamp(instant);

        assert_eq!(i64::from(ntp.secs), 1_700_000_500 + NTP_UNIX_OFFSET);
        assert_eq!(ntp.to_timestamp().unwrap(), instant);
    }

    #[test]
    fn test_ntp_era_rollover() {
        // Era 1 second 0 is 2036-02-07T06:28:16Z
        let ntp = NtpTimestamp { secs: 0, frac: 0 };
        assert_eq!(
            ntp.to_timestamp().unwrap().timestamp(),
            NTP_ERA - NTP_UNIX_OFFSET
        );
    }

    #[test]
    fn test_parse_valid_response() {
        let nonce = NtpTimestamp { secs: 7, frac: 9 };
        let request = build_request(nonce);
        assert_eq!(request[0], 0x23);

        let instant = from_unix_seconds(1_700_000_500).unwrap();
        let response = response_for(&request, NtpTimestamp::from_timestamp(instant));

        assert_eq!(parse_response(&response, nonce).unwrap(), instant);
    }

    #[test]
    fn test_parse_rejects_invalid_responses() {
        let nonce = NtpTimestamp { secs: 7, frac: 9 };
        let request = build_request(nonce);
        let instant = from_unix_seconds(1_700_000_500).unwrap();
        let valid = response_for(&request, NtpTimestamp::from_timestamp(instant));

        assert!(parse_response(&valid[..20], nonce).is_err());

        let mut wrong_mode = valid;
        wrong_mode[0] = (VERSION << 3) | MODE_CLIENT;
        assert!(parse_response(&wrong_mode, nonce).is_err());

        let mut kiss = valid;
        kiss[1] = 0;
        kiss[12..16].copy_from_slice(b"RATE");
        match parse_response(&kiss, nonce) {
            Err(NetworkError::InvalidResponse(msg)) => assert!(msg.contains("RATE")),
            other => panic!("expected kiss-o'-death, got {:?}", other),
        }

        let mut alarm = valid;
        alarm[0] |= LEAP_ALARM << 6;
        assert!(parse_response(&alarm, nonce).is_err());

        let other_nonce = NtpTimestamp { secs: 8, frac: 9 };
        assert!(parse_response(&valid, other_nonce).is_err());

        let mut zero = valid;
        zero[40..48].fill(0);
        assert!(parse_response(&zero, nonce).is_err());
    }

    #[tokio::test]
    async fn test_fetch_from_local_server() {
        let server = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let addr = server.local_addr().unwrap();
        let instant = from_unix_seconds(1_700_000_500).unwrap();

        tokio::spawn(async move {
            let mut buf = [0u8; 128];
            let (len, peer) = server.recv_from(&mut buf).await.unwrap();
            assert_eq!(len, PACKET_LEN);
            let reply = response_for(&buf[..len], NtpTimestamp::from_timestamp(instant));
            server.send_to(&reply, peer).await.unwrap();
        });

        let source = SntpSource::new(addr.to_string());
        assert_eq!(source.fetch().await.unwrap(), instant);
    }

    #[test]
    fn test_request_nonce_is_random() {
        let nonces: Vec<NtpTimestamp> = (0..4).map(|_| request_nonce()).collect();
        assert!(nonces.windows(2).all(|pair| pair[0] != pair[1]));

        let request = build_request(nonces[0]);
        assert_eq!(request[0], 0x23);
        assert_eq!(NtpTimestamp::read(&request[40..48]), nonces[0]);
    }

    #[tokio::test]
    async fn test_resolve_adds_default_port() {
        let bare = SntpSource::new("127.0.0.1");
        let expected: SocketAddr = "127.0.0.1:123".parse().unwrap();
        assert_eq!(bare.resolve().await.unwrap(), expected);

        let explicit = SntpSource::new("127.0.0.1:4123");
        let expected: SocketAddr = "127.0.0.1:4123".parse().unwrap();
        assert_eq!(explicit.resolve().await.unwrap(), expected);
    }

    #[tokio::test]
    async fn test_fetch_times_out() {
        // Bound but never answering
        let silent = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let addr = silent.local_addr().unwrap();

        let source = SntpSource::new(addr.to_string()).with_timeout(Duration::from_millis(50));
        assert_eq!(
            source.fetch().await,
            Err(NetworkError::Timeout(addr.to_string()))
        );
    }
}
