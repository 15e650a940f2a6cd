use crate::geo::{GeoError, GeoLookup, RecordShape};

use maxminddb::{Metadata, Reader};
use std::net::IpAddr;
use std::path::Path;

/// Parsed MaxMind DB, read-only after creation
pub struct GeoIpDatabase<S: AsRef<[u8]>> {
    reader: Reader<S>,
}

impl GeoIpDatabase<Vec<u8>> {
    pub fn from_file<P: AsRef<Path>>(filepath: P) -> Result<Self, GeoError> {
        Ok(Reader::open_readfile(filepath)
            .map_err(GeoError::load)?
            .into())
    }
}

impl<S: AsRef<[u8]>> GeoIpDatabase<S> {
    pub fn from_source(source: S) -> Result<Self, GeoError> {
        Ok(Reader::from_source(source).map_err(GeoError::load)?.into())
    }

    pub fn metadata(&self) -> &Metadata {
        &self.reader.metadata
    }

    /// Lowercase country code of the address, or continent code if the record has no country
    pub fn lookup_code(&self, address: IpAddr) -> Result<String, GeoError> {
        for shape in RecordShape::LOOKUP_ORDER {
            if let Some(code) = shape.decode(&self.reader, address)? {
                log::trace!("{address} resolved to {code:?} from {shape:?} record");
                return Ok(code.to_lowercase());
            }
        }
        Err(GeoError::NotFound)
    }
}

impl<S: AsRef<[u8]>> From<Reader<S>> for GeoIpDatabase<S> {
    fn from(reader: Reader<S>) -> Self {
        Self { reader }
    }
}

impl<S> GeoLookup for GeoIpDatabase<S>
where
    S: AsRef<[u8]> + Send + Sync,
{
    fn lookup_code(&self, address: IpAddr) -> Result<String, GeoError> {
        GeoIpDatabase::lookup_code(self, address)
    }
}
