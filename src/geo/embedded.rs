use crate::geo::{GeoError, GeoIpDatabase, GeoLookup};

use maxminddb::{MaxMindDBError, Reader};
use std::net::IpAddr;
use std::sync::{Arc, OnceLock};

pub(crate) const EMBEDDED_DATABASE: &[u8] =
    include_bytes!(concat!(env!("CARGO_MANIFEST_DIR"), "/geoip/geoip.db"));

static EMBEDDED: LazyDatabase = LazyDatabase::new(EMBEDDED_DATABASE);

type LoadResult = Result<GeoIpDatabase<&'static [u8]>, Arc<MaxMindDBError>>;

/// Database parsed from a static buffer on first use.
///
/// Concurrent first callers wait for a single parse and all of them see its outcome. A parse
/// failure is kept and returned forever, the buffer is never parsed twice.
pub struct LazyDatabase {
    source: &'static [u8],
    database: OnceLock<LoadResult>,
}

impl LazyDatabase {
    pub const fn new(source: &'static [u8]) -> Self {
        Self {
            source,
            database: OnceLock::new(),
        }
    }

    pub fn get(&self) -> Result<&GeoIpDatabase<&'static [u8]>, GeoError> {
        self.database
            .get_or_init(|| self.load())
            .as_ref()
            .map_err(|error| GeoError::Load(error.clone()))
    }

    pub fn lookup_code(&self, address: IpAddr) -> Result<String, GeoError> {
        self.get()?.lookup_code(address)
    }

    fn load(&self) -> LoadResult {
        let database: GeoIpDatabase<_> = Reader::from_source(self.source)
            .map_err(Arc::new)?
            .into();
        let metadata = database.metadata();
        log::debug!(
            "{} geo-IP database loaded: built at {}, {} nodes",
            metadata.database_type,
            metadata.build_epoch,
            metadata.node_count,
        );
        Ok(database)
    }
}

impl GeoLookup for LazyDatabase {
    fn lookup_code(&self, address: IpAddr) -> Result<String, GeoError> {
        LazyDatabase::lookup_code(self, address)
    }
}

/// The database bundled into this build, parsed on first call
pub fn embedded() -> Result<&'static GeoIpDatabase<&'static [u8]>, GeoError> {
    EMBEDDED.get()
}

/// Lowercase country (or continent) code of `address` according to the bundled database
pub fn lookup(address: IpAddr) -> Result<String, GeoError> {
    EMBEDDED.lookup_code(address)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::database::tests::STRUCTURED_DB;

    use std::net::{Ipv4Addr, Ipv6Addr};

    const GARBAGE: &[u8] = b"this is not a MaxMind database";

    #[test]
    fn embedded_snapshot() {
        assert_eq!(lookup(Ipv4Addr::new(8, 8, 8, 8).into()).unwrap(), "us");
        assert_eq!(lookup(Ipv4Addr::new(1, 1, 1, 1).into()).unwrap(), "au");
        assert_eq!(lookup(Ipv4Addr::new(46, 4, 1, 2).into()).unwrap(), "de");
        assert_eq!(lookup("2a01:4f8::1".parse().unwrap()).unwrap(), "de");
        assert_eq!(
            lookup("2001:4860:4860::8888".parse().unwrap()).unwrap(),
            "us"
        );
    }

    #[test]
    fn embedded_continent_only_record() {
        assert_eq!(lookup(Ipv4Addr::new(193, 0, 0, 1).into()).unwrap(), "eu");
    }

    #[test]
    fn embedded_loopback_is_not_found() {
        assert!(matches!(
            lookup(Ipv6Addr::LOCALHOST.into()),
            Err(GeoError::NotFound)
        ));
        assert!(matches!(
            lookup(Ipv4Addr::LOCALHOST.into()),
            Err(GeoError::NotFound)
        ));
    }

    #[test]
    fn embedded_metadata() {
        let database = embedded().unwrap();
        assert_eq!(database.metadata().database_type, "ipinfo-lite");
        assert!(std::ptr::eq(database, embedded().unwrap()));
    }

    #[test]
    fn concurrent_first_use_parses_once() {
        static DATABASE: LazyDatabase = LazyDatabase::new(STRUCTURED_DB);

        let results: Vec<_> = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..100)
                .map(|_| {
                    scope.spawn(|| {
                        let database = DATABASE.get().unwrap();
                        let code = DATABASE
                            .lookup_code(Ipv4Addr::new(8, 8, 8, 8).into())
                            .unwrap();
                        (database as *const GeoIpDatabase<_> as usize, code)
                    })
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        let first = results[0].0;
        for (address, code) in results {
            assert_eq!(address, first);
            assert_eq!(code, "us");
        }
    }

    #[test]
    fn corrupt_database_fails_every_call() {
        static DATABASE: LazyDatabase = LazyDatabase::new(GARBAGE);

        for _ in 0..10 {
            assert!(matches!(DATABASE.get(), Err(GeoError::Load(_))));
            assert!(matches!(
                DATABASE.lookup_code(Ipv4Addr::new(8, 8, 8, 8).into()),
                Err(GeoError::Load(_))
            ));
        }
    }

    #[test]
    fn load_error_is_shared() {
        let truncated = &EMBEDDED_DATABASE[..EMBEDDED_DATABASE.len() / 2];
        let database = LazyDatabase::new(truncated);
        let first = match database.get() {
            Err(GeoError::Load(error)) => error,
            _ => panic!("truncated database must not load"),
        };
        let second = match database.lookup_code(Ipv4Addr::new(8, 8, 8, 8).into()) {
            Err(GeoError::Load(error)) => error,
            other => panic!("unexpected result: {other:?}"),
        };
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn behind_trait_object() {
        let database: &dyn GeoLookup = &EMBEDDED;
        assert_eq!(
            database
                .lookup_code(Ipv4Addr::new(8, 8, 4, 4).into())
                .unwrap(),
            "us"
        );
    }
}
