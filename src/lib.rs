//! Country and continent codes for IP addresses.
//!
//! ```no_run
//! let code = geoip::lookup("8.8.8.8".parse().unwrap()).unwrap();
//! assert_eq!(code, "us");
//! ```

pub mod geo;

#[cfg(feature = "embedded")]
pub use geo::{embedded, lookup, LazyDatabase};
pub use geo::{GeoError, GeoIpDatabase, GeoLookup};
