// hearth-link: transport contracts, device discovery, and the
// proof-of-possession handshake surface for Hearth onboarding.

pub mod bridge;
pub mod device;
pub mod discovery;
pub mod error;
pub mod optical;

pub use bridge::{Connection, SecurityLevel, SessionToken, TransportBridge};
pub use device::{DeviceCandidate, DeviceSighting, TransportKind};
pub use discovery::{DiscoveryConfig, discover};
pub use error::Error;
pub use optical::{OpticalCode, parse_optical_code};
