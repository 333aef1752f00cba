use antgrid::command::CommandToken;
use antgrid::record::{Collection, DeviceRecord};

use indexmap::IndexMap;

use reqwest::Url;

use serde::Deserialize;

use tracing::debug;

use crate::error::{Error, ErrorKind, Result};

fn invalid_address(address: &str, cause: impl std::fmt::Display) -> Error {
    Error::new(
        ErrorKind::EndpointUnresolved,
        format!("Invalid device controller address `{address}`."),
    )
    .with_cause(cause)
}

/// The network address of the light controller embedded in a device.
///
/// Every command route is computed once, when the endpoint is parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    base: Url,
    switch_on: Url,
    switch_off: Url,
    status: Url,
}

impl Endpoint {
    /// Parses an absolute `http` or `https` base address.
    ///
    /// The base address may end with or without a slash: the command
    /// routes are always appended as a new path segment.
    ///
    /// # Errors
    ///
    /// An [`ErrorKind::EndpointUnresolved`] error is returned when the
    /// address is not a valid absolute `http` or `https` URL.
    pub fn parse(address: &str) -> Result<Self> {
        let mut base = Url::parse(address.trim()).map_err(|e| invalid_address(address, e))?;

        if !matches!(base.scheme(), "http" | "https") {
            return Err(invalid_address(
                address,
                format!("unsupported scheme `{}`", base.scheme()),
            ));
        }

        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }

        let route = |command: CommandToken| {
            base.join(command.device_route())
                .map_err(|e| invalid_address(address, e))
        };

        Ok(Self {
            switch_on: route(CommandToken::On)?,
            switch_off: route(CommandToken::Off)?,
            status: route(CommandToken::StatusQuery)?,
            base,
        })
    }

    /// Returns the base address.
    #[must_use]
    pub const fn base(&self) -> &Url {
        &self.base
    }

    /// Returns the address which executes the given command.
    #[must_use]
    pub const fn command_url(&self, command: CommandToken) -> &Url {
        match command {
            CommandToken::On => &self.switch_on,
            CommandToken::Off => &self.switch_off,
            CommandToken::StatusQuery => &self.status,
        }
    }
}

impl std::fmt::Display for Endpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.base.fmt(f)
    }
}

/// Maps a device record to the address of its light controller.
pub trait EndpointResolver: std::fmt::Debug + Send + Sync {
    /// Resolves the [`Endpoint`] of the given record of a [`Collection`].
    ///
    /// # Errors
    ///
    /// An [`ErrorKind::EndpointUnresolved`] error is returned when no
    /// address can be determined. A resolver never falls back to an
    /// address which was not explicitly configured.
    fn resolve(&self, collection: Collection, record: &DeviceRecord) -> Result<Endpoint>;
}

/// A resolver which assigns the same configured address to every device.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StaticResolver {
    endpoint: Option<Endpoint>,
}

impl StaticResolver {
    /// Creates a [`StaticResolver`] for the given [`Endpoint`].
    #[must_use]
    #[inline]
    pub const fn new(endpoint: Endpoint) -> Self {
        Self {
            endpoint: Some(endpoint),
        }
    }

    /// Creates a [`StaticResolver`] without any address.
    ///
    /// Every resolution fails until an address is configured.
    #[must_use]
    #[inline]
    pub const fn unconfigured() -> Self {
        Self { endpoint: None }
    }

    /// Creates a [`StaticResolver`] from an optional raw address.
    ///
    /// # Errors
    ///
    /// An error is returned when the address is present but invalid.
    pub fn from_address(address: Option<&str>) -> Result<Self> {
        address
            .map(Endpoint::parse)
            .transpose()
            .map(|endpoint| Self { endpoint })
    }
}

impl EndpointResolver for StaticResolver {
    fn resolve(&self, collection: Collection, record: &DeviceRecord) -> Result<Endpoint> {
        self.endpoint
            .clone()
            .ok_or_else(|| Error::endpoint_unresolved(collection, &record.id))
    }
}

// The JSON address table: one identifier-to-address object per collection.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct AddressTable {
    #[serde(default)]
    ants: IndexMap<String, String>,
    #[serde(default)]
    spokes: IndexMap<String, String>,
}

/// A resolver backed by a per-device address table.
///
/// Identifiers are scoped to their [`Collection`], as in the record store.
/// Devices missing from the table are delegated to the fallback resolver,
/// when one is configured.
#[derive(Debug, Default)]
pub struct TableResolver {
    ants: IndexMap<String, Endpoint>,
    spokes: IndexMap<String, Endpoint>,
    fallback: Option<Box<dyn EndpointResolver>>,
}

impl TableResolver {
    /// Creates an empty [`TableResolver`].
    #[must_use]
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a [`TableResolver`] from a JSON document with an `ants` and a
    /// `spokes` object, each mapping device identifiers to base addresses:
    ///
    /// ```json
    /// {
    ///     "ants": { "node-1": "http://192.168.1.240:5100/led/" },
    ///     "spokes": { "node-1": "http://192.168.1.238:5100/led/" }
    /// }
    /// ```
    ///
    /// # Errors
    ///
    /// An error is returned when the document does not have this shape or
    /// when one of its addresses is invalid.
    pub fn from_json(document: &str) -> Result<Self> {
        let table: AddressTable = serde_json::from_str(document).map_err(|e| {
            Error::new(
                ErrorKind::EndpointUnresolved,
                "Invalid device address table.",
            )
            .with_cause(e)
        })?;

        let mut resolver = Self::new();
        let collections = [
            (Collection::Ant, table.ants),
            (Collection::Spoke, table.spokes),
        ];
        for (collection, entries) in collections {
            for (id, address) in entries {
                resolver = resolver.insert(collection, id, Endpoint::parse(&address)?);
            }
        }
        Ok(resolver)
    }

    /// Adds the [`Endpoint`] of a device of a [`Collection`].
    #[must_use]
    #[inline]
    pub fn insert(
        mut self,
        collection: Collection,
        id: impl Into<String>,
        endpoint: Endpoint,
    ) -> Self {
        let _ = self.table_mut(collection).insert(id.into(), endpoint);
        self
    }

    /// Sets the resolver used for devices missing from the table.
    #[must_use]
    #[inline]
    pub fn fallback(mut self, resolver: impl EndpointResolver + 'static) -> Self {
        self.fallback = Some(Box::new(resolver));
        self
    }

    /// Returns the number of devices in the table.
    #[must_use]
    pub fn len(&self) -> usize {
        self.ants.len() + self.spokes.len()
    }

    /// Whether the table is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ants.is_empty() && self.spokes.is_empty()
    }

    const fn table(&self, collection: Collection) -> &IndexMap<String, Endpoint> {
        match collection {
            Collection::Ant => &self.ants,
            Collection::Spoke => &self.spokes,
        }
    }

    const fn table_mut(&mut self, collection: Collection) -> &mut IndexMap<String, Endpoint> {
        match collection {
            Collection::Ant => &mut self.ants,
            Collection::Spoke => &mut self.spokes,
        }
    }
}

impl EndpointResolver for TableResolver {
    fn resolve(&self, collection: Collection, record: &DeviceRecord) -> Result<Endpoint> {
        if let Some(endpoint) = self.table(collection).get(&record.id) {
            return Ok(endpoint.clone());
        }

        match &self.fallback {
            Some(fallback) => {
                debug!(
                    device_id = %record.id,
                    %collection,
                    "Device missing from the address table, using fallback"
                );
                fallback.resolve(collection, record)
            }
            None => Err(Error::endpoint_unresolved(collection, &record.id)),
        }
    }
}

#[cfg(test)]
mod tests {
    use antgrid::command::CommandToken;
    use antgrid::record::{Collection, DeviceRecord, NodeType};

    use crate::error::{Error, ErrorKind};

    use super::{Endpoint, EndpointResolver, StaticResolver, TableResolver};

    fn ant(id: &str) -> DeviceRecord {
        DeviceRecord::new(id, id, NodeType::Ant, "us")
    }

    fn spoke(id: &str) -> DeviceRecord {
        DeviceRecord::new(id, id, NodeType::Spoke, "us")
    }

    #[test]
    fn command_urls() {
        for address in ["http://192.168.1.238:5100/led/", "http://192.168.1.238:5100/led"] {
            let endpoint = Endpoint::parse(address).unwrap();

            assert_eq!(
                endpoint.command_url(CommandToken::On).as_str(),
                "http://192.168.1.238:5100/led/switchon"
            );
            assert_eq!(
                endpoint.command_url(CommandToken::Off).as_str(),
                "http://192.168.1.238:5100/led/switchoff"
            );
            assert_eq!(
                endpoint.command_url(CommandToken::StatusQuery).as_str(),
                "http://192.168.1.238:5100/led/status"
            );
        }
    }

    #[test]
    fn command_urls_without_path() {
        let endpoint = Endpoint::parse("http://10.0.0.2:8080").unwrap();

        assert_eq!(
            endpoint.command_url(CommandToken::On).as_str(),
            "http://10.0.0.2:8080/switchon"
        );
    }

    #[test]
    fn invalid_addresses() {
        for address in ["", "not a url", "ftp://10.0.0.2/led", "/led/switchon"] {
            let error = Endpoint::parse(address).unwrap_err();
            assert_eq!(error.kind(), ErrorKind::EndpointUnresolved);
            assert!(error.cause().is_some());
        }
    }

    #[test]
    fn static_resolver() {
        let endpoint = Endpoint::parse("http://10.0.0.2/led").unwrap();
        let resolver = StaticResolver::new(endpoint.clone());

        assert_eq!(
            resolver.resolve(Collection::Ant, &ant("ant-1")),
            Ok(endpoint.clone())
        );
        assert_eq!(
            resolver.resolve(Collection::Spoke, &spoke("spoke-7")),
            Ok(endpoint)
        );
    }

    #[test]
    fn unconfigured_static_resolver() {
        let resolver = StaticResolver::from_address(None).unwrap();

        assert_eq!(resolver, StaticResolver::unconfigured());
        assert_eq!(
            resolver.resolve(Collection::Ant, &ant("ant-1")),
            Err(Error::endpoint_unresolved(Collection::Ant, "ant-1"))
        );
    }

    #[test]
    fn table_resolver() {
        let resolver = TableResolver::from_json(
            r#"{
                "ants": { "ant-1": "http://10.0.0.1/led", "ant-2": "http://10.0.0.2/led/" },
                "spokes": { "spoke-7": "http://10.0.1.7/led" }
            }"#,
        )
        .unwrap();

        assert_eq!(resolver.len(), 3);
        assert_eq!(
            resolver
                .resolve(Collection::Ant, &ant("ant-2"))
                .unwrap()
                .base()
                .as_str(),
            "http://10.0.0.2/led/"
        );
        assert_eq!(
            resolver.resolve(Collection::Ant, &ant("ant-3")),
            Err(Error::endpoint_unresolved(Collection::Ant, "ant-3"))
        );
    }

    #[test]
    fn table_identifiers_are_scoped_to_their_collection() {
        let resolver = TableResolver::from_json(
            r#"{
                "ants": { "node-1": "http://10.0.0.1/led" },
                "spokes": { "node-1": "http://10.0.1.1/led" }
            }"#,
        )
        .unwrap();

        assert_eq!(
            resolver
                .resolve(Collection::Ant, &ant("node-1"))
                .unwrap()
                .base()
                .as_str(),
            "http://10.0.0.1/led/"
        );
        assert_eq!(
            resolver
                .resolve(Collection::Spoke, &spoke("node-1"))
                .unwrap()
                .base()
                .as_str(),
            "http://10.0.1.1/led/"
        );

        // An ant entry never answers for a spoke with the same identifier.
        let ants_only = TableResolver::new().insert(
            Collection::Ant,
            "node-2",
            Endpoint::parse("http://10.0.0.2/led").unwrap(),
        );
        assert_eq!(
            ants_only.resolve(Collection::Spoke, &spoke("node-2")),
            Err(Error::endpoint_unresolved(Collection::Spoke, "node-2"))
        );
    }

    #[test]
    fn table_resolver_with_fallback() {
        let fallback = Endpoint::parse("http://10.0.0.254/led").unwrap();
        let resolver = TableResolver::new()
            .insert(
                Collection::Ant,
                "ant-1",
                Endpoint::parse("http://10.0.0.1/led").unwrap(),
            )
            .fallback(StaticResolver::new(fallback.clone()));

        assert_eq!(
            resolver
                .resolve(Collection::Ant, &ant("ant-1"))
                .unwrap()
                .base()
                .as_str(),
            "http://10.0.0.1/led/"
        );
        assert_eq!(
            resolver.resolve(Collection::Ant, &ant("ant-9")),
            Ok(fallback)
        );
    }

    #[test]
    fn invalid_table() {
        for document in [
            "[1, 2]",
            r#"{ "ants": { "ant-1": "nowhere" } }"#,
            // Identifiers must be listed under their collection.
            r#"{ "ant-1": "http://10.0.0.1/led" }"#,
        ] {
            assert_eq!(
                TableResolver::from_json(document).unwrap_err().kind(),
                ErrorKind::EndpointUnresolved
            );
        }
    }
}
