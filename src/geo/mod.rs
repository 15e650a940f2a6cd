pub use database::GeoIpDatabase;
#[cfg(feature = "embedded")]
pub use embedded::{embedded, lookup, LazyDatabase};
pub use error::GeoError;
pub use record::{IpInfo, RecordShape};

mod database;
#[cfg(feature = "embedded")]
mod embedded;
mod error;
mod record;

use std::net::IpAddr;

pub trait GeoLookup: Send + Sync {
    fn lookup_code(&self, address: IpAddr) -> Result<String, GeoError>;
}
