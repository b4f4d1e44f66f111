//! Wi-Fi station, network stack tasks, and the HTTP and SNTP clients

use alloc::string::String;

use embassy_executor::Spawner;
use embassy_net::dns::DnsQueryType;
use embassy_net::tcp::{self, TcpSocket};
use embassy_net::udp::{PacketMetadata, UdpSocket};
use embassy_net::{
    Config as NetConfig, DhcpConfig, IpAddress, IpEndpoint, Ipv4Address, Runner, Stack,
    StackResources,
};
use embassy_time::{Duration, Timer, with_timeout};
use esp_hal::peripherals::WIFI;
use esp_hal::rng::Rng;
use esp_radio::wifi::{ClientConfig, ModeConfig, WifiController, WifiDevice, WifiEvent};
use log::{debug, error, info, warn};
use static_cell::StaticCell;
use thiserror_no_std::Error;

use reporter_core::request::parse_status_line;
use reporter_core::sntp;
use reporter_core::traits::{ResponseSummary, Transport};
use reporter_core::{HttpRequest, MacAddress, PostError, ReporterConfig, SntpError};

use crate::config::WifiCredentials;

const SOCKET_COUNT: usize = 4;
const TCP_BUFFER_LEN: usize = 1024;
const RECEIVE_CHUNK_LEN: usize = 64;
const STATUS_HEAD_LEN: usize = 64;
const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);
const RECEIVE_TIMEOUT: Duration = Duration::from_secs(5);
const SNTP_TIMEOUT: Duration = Duration::from_secs(5);
const SNTP_LOCAL_PORT: u16 = 50_123;
const RECONNECT_DELAY: Duration = Duration::from_secs(5);
const RESTART_DELAY: Duration = Duration::from_secs(10);

static RADIO: StaticCell<esp_radio::Controller<'static>> = StaticCell::new();
static NET_RESOURCES: StaticCell<StackResources<SOCKET_COUNT>> = StaticCell::new();

#[derive(Error, Debug)]
pub enum SetupError {
    #[error("radio controller init failed")]
    Radio,
    #[error("Wi-Fi driver init failed")]
    WifiDriver,
    #[error("failed to spawn network task")]
    Spawn,
}

/// Handle to the running network: the stack plus the station MAC.
pub struct Network {
    pub stack: Stack<'static>,
    pub mac: MacAddress,
}

/// Brings up the radio and spawns the Wi-Fi supervisor and the stack runner.
pub fn start(
    spawner: &Spawner,
    wifi: WIFI<'static>,
    credentials: WifiCredentials,
) -> Result<Network, SetupError> {
    let radio = esp_radio::init().map_err(|e| {
        error!("Failed to initialize Wi-Fi/BLE controller: {:?}", e);
        SetupError::Radio
    })?;
    let radio = RADIO.init(radio);

    let (controller, interfaces) =
        esp_radio::wifi::new(radio, wifi, Default::default()).map_err(|e| {
            error!("Failed to initialize Wi-Fi controller: {:?}", e);
            SetupError::WifiDriver
        })?;

    let device = interfaces.sta;
    let mac = MacAddress(device.mac_address());

    let rng = Rng::new();
    let seed = (u64::from(rng.random()) << 32) | u64::from(rng.random());

    let resources = NET_RESOURCES.init(StackResources::new());
    let (stack, runner) = embassy_net::new(
        device,
        NetConfig::dhcpv4(DhcpConfig::default()),
        resources,
        seed,
    );

    spawner
        .spawn(connection_task(controller, credentials))
        .map_err(|_| SetupError::Spawn)?;
    spawner
        .spawn(net_task(runner))
        .map_err(|_| SetupError::Spawn)?;

    Ok(Network { stack, mac })
}

/// Waits for DHCP and returns the station address.
pub async fn wait_for_ip(stack: Stack<'_>) -> Ipv4Address {
    stack.wait_config_up().await;
    loop {
        if let Some(config) = stack.config_v4() {
            info!("Got IP: {}", config.address);
            return config.address.address();
        }
        Timer::after(Duration::from_millis(500)).await;
    }
}

#[embassy_executor::task]
async fn net_task(mut runner: Runner<'static, WifiDevice<'static>>) {
    runner.run().await
}

#[embassy_executor::task]
async fn connection_task(mut controller: WifiController<'static>, credentials: WifiCredentials) {
    info!("Wi-Fi task starting (ssid=\"{}\")", credentials.ssid);

    loop {
        if !matches!(controller.is_started(), Ok(true)) {
            let client_config = ModeConfig::Client(
                ClientConfig::default()
                    .with_ssid(String::from(credentials.ssid))
                    .with_password(String::from(credentials.password)),
            );
            if let Err(e) = controller.set_config(&client_config) {
                warn!("Wi-Fi set_config error: {:?}", e);
                Timer::after(RESTART_DELAY).await;
                continue;
            }

            info!("Starting Wi-Fi STA");
            if let Err(e) = controller.start_async().await {
                warn!("Wi-Fi start error: {:?}", e);
                Timer::after(RESTART_DELAY).await;
                continue;
            }
        }

        info!("Connecting to Wi-Fi SSID=\"{}\"", credentials.ssid);
        match controller.connect_async().await {
            Ok(()) => {
                info!("Wi-Fi connected");
                controller.wait_for_event(WifiEvent::StaDisconnected).await;
                warn!("Wi-Fi disconnected; will retry");
                Timer::after(RECONNECT_DELAY).await;
            }
            Err(e) => {
                warn!("Wi-Fi connect error: {:?}", e);
                Timer::after(RESTART_DELAY).await;
            }
        }
    }
}

async fn resolve(stack: Stack<'_>, host: &str) -> Result<IpAddress, PostError> {
    let addresses = stack
        .dns_query(host, DnsQueryType::A)
        .await
        .map_err(|e| {
            error!("DNS lookup failed err={:?}", e);
            PostError::Dns
        })?;
    addresses.first().copied().ok_or_else(|| {
        error!("DNS lookup returned no address for {}", host);
        PostError::NoAddress
    })
}

/// One connection per request: resolve, connect, write, drain, close.
pub struct TcpTransport {
    stack: Stack<'static>,
    server_ip: &'static str,
    server_port: u16,
    rx_buffer: [u8; TCP_BUFFER_LEN],
    tx_buffer: [u8; TCP_BUFFER_LEN],
}

impl TcpTransport {
    pub fn new(stack: Stack<'static>, config: &ReporterConfig) -> Self {
        Self {
            stack,
            server_ip: config.server_ip,
            server_port: config.server_port,
            rx_buffer: [0; TCP_BUFFER_LEN],
            tx_buffer: [0; TCP_BUFFER_LEN],
        }
    }
}

impl Transport for TcpTransport {
    async fn post(&mut self, request: &HttpRequest) -> Result<ResponseSummary, PostError> {
        let address = resolve(self.stack, self.server_ip).await?;
        info!("DNS lookup succeeded. IP={}", address);

        let mut socket = TcpSocket::new(self.stack, &mut self.rx_buffer, &mut self.tx_buffer);
        // Without a timeout smoltcp retransmits an unanswered SYN forever.
        socket.set_timeout(Some(CONNECT_TIMEOUT));
        info!("... allocated socket");

        if let Err(e) = socket
            .connect(IpEndpoint::new(address, self.server_port))
            .await
        {
            error!("... socket connect failed: {:?}", e);
            socket.abort();
            return Err(PostError::Connect);
        }
        info!("... connected");

        if let Err(e) = write_all(&mut socket, request.as_bytes()).await {
            error!("... socket send failed: {:?}", e);
            socket.abort();
            return Err(PostError::Send);
        }
        info!("... socket send success");

        socket.set_timeout(Some(RECEIVE_TIMEOUT));
        info!("... set socket receiving timeout success");

        let summary = drain(&mut socket).await;
        info!("... done reading from socket, {} bytes", summary.bytes);

        socket.close();
        let _ = socket.flush().await;
        Ok(summary)
    }
}

async fn write_all(socket: &mut TcpSocket<'_>, mut data: &[u8]) -> Result<(), tcp::Error> {
    while !data.is_empty() {
        let written = socket.write(data).await?;
        if written == 0 {
            return Err(tcp::Error::ConnectionReset);
        }
        data = &data[written..];
    }
    socket.flush().await
}

/// Reads until the peer closes, the timeout fires or the read fails.
async fn drain(socket: &mut TcpSocket<'_>) -> ResponseSummary {
    let mut chunk = [0u8; RECEIVE_CHUNK_LEN];
    let mut head = heapless::Vec::<u8, STATUS_HEAD_LEN>::new();
    let mut bytes = 0;

    loop {
        match socket.read(&mut chunk).await {
            Ok(0) => break,
            Ok(n) => {
                bytes += n;
                let room = head.capacity() - head.len();
                let _ = head.extend_from_slice(&chunk[..n.min(room)]);
                if let Ok(text) = core::str::from_utf8(&chunk[..n]) {
                    debug!("{}", text);
                }
            }
            Err(e) => {
                warn!("... read ended: {:?}", e);
                break;
            }
        }
    }

    ResponseSummary {
        status: parse_status_line(&head).map(|line| line.code),
        bytes,
    }
}

/// Asks `server` for the current time and returns Unix seconds.
pub async fn sync_time(stack: Stack<'_>, server: &str) -> Result<u64, SntpError> {
    let address = resolve(stack, server)
        .await
        .map_err(|_| SntpError::Network)?;

    let mut rx_meta = [PacketMetadata::EMPTY; 2];
    let mut tx_meta = [PacketMetadata::EMPTY; 2];
    let mut rx_buffer = [0u8; 128];
    let mut tx_buffer = [0u8; 128];
    let mut socket = UdpSocket::new(
        stack,
        &mut rx_meta,
        &mut rx_buffer,
        &mut tx_meta,
        &mut tx_buffer,
    );
    socket.bind(SNTP_LOCAL_PORT).map_err(|e| {
        warn!("SNTP bind failed: {:?}", e);
        SntpError::Network
    })?;

    socket
        .send_to(&sntp::request(), IpEndpoint::new(address, sntp::NTP_PORT))
        .await
        .map_err(|e| {
            warn!("SNTP send failed: {:?}", e);
            SntpError::Network
        })?;

    let mut reply = [0u8; 128];
    let (len, _) = with_timeout(SNTP_TIMEOUT, socket.recv_from(&mut reply))
        .await
        .map_err(|_| SntpError::Network)?
        .map_err(|e| {
            warn!("SNTP receive failed: {:?}", e);
            SntpError::Network
        })?;

    sntp::parse_response(&reply[..len])
}
