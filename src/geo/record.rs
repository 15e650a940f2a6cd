use crate::geo::GeoError;

use maxminddb::Reader;
use serde::Deserialize;
use std::net::IpAddr;

/// Structured record, as found in IPinfo-like databases
#[derive(Deserialize, Debug, Default)]
pub struct IpInfo<'a> {
    #[serde(borrow)]
    pub country: Option<&'a str>,
    #[serde(borrow)]
    pub country_name: Option<&'a str>,
    #[serde(borrow)]
    pub continent: Option<&'a str>,
    #[serde(borrow)]
    pub continent_name: Option<&'a str>,
}

impl<'a> IpInfo<'a> {
    /// Country code if present, continent code otherwise
    pub fn code(&self) -> Option<&'a str> {
        non_empty(self.country).or_else(|| non_empty(self.continent))
    }
}

fn non_empty(s: Option<&str>) -> Option<&str> {
    s.filter(|s| !s.is_empty())
}

/// Known layouts of a per-prefix record
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum RecordShape {
    /// A map with country and continent fields
    Structured,
    /// A bare string, usually a country code
    Raw,
}

impl RecordShape {
    pub const LOOKUP_ORDER: [RecordShape; 2] = [RecordShape::Structured, RecordShape::Raw];

    /// Decodes the record for `address` assuming this shape.
    ///
    /// Structured decoding never fails: a record of another shape, or a missing one, gives `None`
    /// so the next shape can be tried. Raw decoding is the last resort and reports its errors.
    pub fn decode<'de, S>(
        self,
        reader: &'de Reader<S>,
        address: IpAddr,
    ) -> Result<Option<&'de str>, GeoError>
    where
        S: AsRef<[u8]>,
    {
        match self {
            Self::Structured => Ok(reader
                .lookup::<IpInfo>(address)
                .ok()
                .and_then(|info| info.code())),
            Self::Raw => {
                let code: &str = reader.lookup(address)?;
                Ok(non_empty(Some(code)))
            }
        }
    }
}
