//! PostgreSQL catalog adapter using information_schema
//!
//! This adapter joins information_schema.table_constraints,
//! key_column_usage, and constraint_column_usage to enumerate foreign-key
//! constraints. It works with:
//! - PostgreSQL 9.4+
//! - Amazon Redshift
//! - Other PostgreSQL-compatible databases
//!
//! ## Usage
//!
//! ```rust,ignore
//! // Using direct credentials
//! let catalog = PostgresCatalog::connect(
//!     "localhost", 5432, "app", "backup", "secret"
//! ).await?;
//!
//! // Using a connection string
//! let catalog = PostgresCatalog::from_connection_string(
//!     "host=localhost port=5432 dbname=app user=backup password=secret"
//! ).await?;
//! ```

use crate::adapter::{CatalogAdapter, CatalogError};
use restoreplan_core::ForeignKeyEdge;

#[cfg(feature = "postgres")]
use restoreplan_core::TableId;

#[cfg(feature = "postgres")]
use native_tls::TlsConnector;

#[cfg(feature = "postgres")]
use postgres_native_tls::MakeTlsConnector;

#[cfg(feature = "postgres")]
use tokio_postgres::{Client, NoTls};

/// Foreign-key constraint query scoped to a schema set
///
/// Both endpoints must lie within the requested schemas; constraints that
/// reach outside the set are not returned.
#[cfg(feature = "postgres")]
const FOREIGN_KEY_QUERY: &str = r#"
    SELECT
        tc.table_schema,
        tc.table_name,
        ccu.table_schema AS referenced_schema,
        ccu.table_name   AS referenced_table,
        kcu.column_name,
        ccu.column_name  AS referenced_column
    FROM information_schema.table_constraints tc
    JOIN information_schema.key_column_usage kcu
      ON tc.constraint_name = kcu.constraint_name
     AND tc.table_schema = kcu.table_schema
    JOIN information_schema.constraint_column_usage ccu
      ON tc.constraint_name = ccu.constraint_name
     AND tc.constraint_schema = ccu.constraint_schema
    WHERE tc.constraint_type = 'FOREIGN KEY'
      AND tc.table_schema = ANY($1)
      AND ccu.table_schema = ANY($1)
"#;

/// PostgreSQL catalog adapter
///
/// Connects to a PostgreSQL database and enumerates foreign-key constraints
/// from information_schema. Supports both plain and TLS connections.
pub struct PostgresCatalog {
    /// PostgreSQL client (only available with postgres feature)
    #[cfg(feature = "postgres")]
    client: Client,

    /// Connection host
    host: String,

    /// Connection port
    port: u16,

    /// Database name
    database: String,

    /// Placeholder for when feature is disabled
    #[cfg(not(feature = "postgres"))]
    _phantom: std::marker::PhantomData<()>,
}

impl PostgresCatalog {
    /// Create a new PostgreSQL catalog adapter with direct credentials
    #[cfg(feature = "postgres")]
    pub async fn connect(
        host: impl Into<String>,
        port: u16,
        database: impl Into<String>,
        user: impl Into<String>,
        password: impl Into<String>,
    ) -> Result<Self, CatalogError> {
        let host = host.into();
        let database = database.into();
        let user = user.into();
        let password = password.into();

        let config = format!(
            "host={} port={} dbname={} user={} password={}",
            host, port, database, user, password
        );

        let (client, connection) = tokio_postgres::connect(&config, NoTls)
            .await
            .map_err(|e| {
                CatalogError::AuthenticationError(format!(
                    "Failed to connect to PostgreSQL at {}:{}: {}",
                    host, port, e
                ))
            })?;

        // Drive the connection in the background
        let host_clone = host.clone();
        tokio::spawn(async move {
            if let Err(e) = connection.await {
                eprintln!("PostgreSQL connection error ({}:{}): {}", host_clone, port, e);
            }
        });

        Ok(Self {
            client,
            host,
            port,
            database,
        })
    }

    /// Create adapter without postgres feature (returns error)
    #[cfg(not(feature = "postgres"))]
    pub async fn connect(
        _host: impl Into<String>,
        _port: u16,
        _database: impl Into<String>,
        _user: impl Into<String>,
        _password: impl Into<String>,
    ) -> Result<Self, CatalogError> {
        Err(CatalogError::ConfigError(
            "PostgreSQL support not compiled. Rebuild with: cargo build --features postgres"
                .to_string(),
        ))
    }

    /// Create a PostgreSQL catalog adapter with TLS
    ///
    /// Use this for production environments where connection encryption is
    /// required.
    #[cfg(feature = "postgres")]
    pub async fn connect_with_tls(
        host: impl Into<String>,
        port: u16,
        database: impl Into<String>,
        user: impl Into<String>,
        password: impl Into<String>,
    ) -> Result<Self, CatalogError> {
        let host = host.into();
        let database = database.into();
        let user = user.into();
        let password = password.into();

        let config = format!(
            "host={} port={} dbname={} user={} password={}",
            host, port, database, user, password
        );

        let connector = TlsConnector::builder().build().map_err(|e| {
            CatalogError::ConfigError(format!("Failed to create TLS connector: {}", e))
        })?;
        let tls = MakeTlsConnector::new(connector);

        let (client, connection) = tokio_postgres::connect(&config, tls)
            .await
            .map_err(|e| {
                CatalogError::AuthenticationError(format!(
                    "Failed to connect to PostgreSQL at {}:{} with TLS: {}",
                    host, port, e
                ))
            })?;

        let host_clone = host.clone();
        tokio::spawn(async move {
            if let Err(e) = connection.await {
                eprintln!(
                    "PostgreSQL TLS connection error ({}:{}): {}",
                    host_clone, port, e
                );
            }
        });

        Ok(Self {
            client,
            host,
            port,
            database,
        })
    }

    /// Create adapter without postgres feature (returns error)
    #[cfg(not(feature = "postgres"))]
    pub async fn connect_with_tls(
        _host: impl Into<String>,
        _port: u16,
        _database: impl Into<String>,
        _user: impl Into<String>,
        _password: impl Into<String>,
    ) -> Result<Self, CatalogError> {
        Err(CatalogError::ConfigError(
            "PostgreSQL support not compiled. Rebuild with: cargo build --features postgres"
                .to_string(),
        ))
    }

    /// Create adapter from a PostgreSQL connection string
    ///
    /// Supports the standard key/value format:
    /// `host=localhost port=5432 dbname=app user=backup password=secret`
    #[cfg(feature = "postgres")]
    pub async fn from_connection_string(conn_str: &str) -> Result<Self, CatalogError> {
        let config: tokio_postgres::Config = conn_str
            .parse()
            .map_err(|e| CatalogError::ConfigError(format!("Invalid connection string: {}", e)))?;

        // Extract connection info for logging
        let host = config
            .get_hosts()
            .first()
            .map(|h| format!("{:?}", h))
            .unwrap_or_else(|| "localhost".to_string());
        let port = config.get_ports().first().copied().unwrap_or(5432);
        let database = config.get_dbname().unwrap_or("postgres").to_string();

        let (client, connection) = tokio_postgres::connect(conn_str, NoTls)
            .await
            .map_err(|e| CatalogError::AuthenticationError(format!("Failed to connect: {}", e)))?;

        let host_clone = host.clone();
        tokio::spawn(async move {
            if let Err(e) = connection.await {
                eprintln!("PostgreSQL connection error ({}:{}): {}", host_clone, port, e);
            }
        });

        Ok(Self {
            client,
            host,
            port,
            database,
        })
    }

    /// Create adapter without postgres feature (returns error)
    #[cfg(not(feature = "postgres"))]
    pub async fn from_connection_string(_conn_str: &str) -> Result<Self, CatalogError> {
        Err(CatalogError::ConfigError(
            "PostgreSQL support not compiled. Rebuild with: cargo build --features postgres"
                .to_string(),
        ))
    }

    /// Create adapter from a PostgreSQL connection string with TLS
    ///
    /// TLS is always used; an sslmode setting in the string is ignored.
    #[cfg(feature = "postgres")]
    pub async fn from_connection_string_with_tls(conn_str: &str) -> Result<Self, CatalogError> {
        let config: tokio_postgres::Config = conn_str
            .parse()
            .map_err(|e| CatalogError::ConfigError(format!("Invalid connection string: {}", e)))?;

        let host = config
            .get_hosts()
            .first()
            .map(|h| format!("{:?}", h))
            .unwrap_or_else(|| "localhost".to_string());
        let port = config.get_ports().first().copied().unwrap_or(5432);
        let database = config.get_dbname().unwrap_or("postgres").to_string();

        let connector = TlsConnector::builder().build().map_err(|e| {
            CatalogError::ConfigError(format!("Failed to create TLS connector: {}", e))
        })?;
        let tls = MakeTlsConnector::new(connector);

        let (client, connection) = tokio_postgres::connect(conn_str, tls).await.map_err(|e| {
            CatalogError::AuthenticationError(format!("Failed to connect with TLS: {}", e))
        })?;

        let host_clone = host.clone();
        tokio::spawn(async move {
            if let Err(e) = connection.await {
                eprintln!(
                    "PostgreSQL TLS connection error ({}:{}): {}",
                    host_clone, port, e
                );
            }
        });

        Ok(Self {
            client,
            host,
            port,
            database,
        })
    }

    /// Create adapter without postgres feature (returns error)
    #[cfg(not(feature = "postgres"))]
    pub async fn from_connection_string_with_tls(_conn_str: &str) -> Result<Self, CatalogError> {
        Err(CatalogError::ConfigError(
            "PostgreSQL support not compiled. Rebuild with: cargo build --features postgres"
                .to_string(),
        ))
    }

    /// Get the connection host
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Get the connection port
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Get the database name
    pub fn database(&self) -> &str {
        &self.database
    }

    /// Validate a raw catalog row into a typed edge
    ///
    /// Catalog views can surface empty names for damaged constraints; those
    /// rows are rejected here rather than poisoning the graph.
    #[cfg(feature = "postgres")]
    fn edge_from_row(row: &tokio_postgres::Row) -> Result<ForeignKeyEdge, CatalogError> {
        let table_schema: String = row.get(0);
        let table_name: String = row.get(1);
        let referenced_schema: String = row.get(2);
        let referenced_table: String = row.get(3);
        let column_name: String = row.get(4);
        let referenced_column: String = row.get(5);

        for (field, value) in [
            ("table_schema", &table_schema),
            ("table_name", &table_name),
            ("referenced_schema", &referenced_schema),
            ("referenced_table", &referenced_table),
            ("column_name", &column_name),
            ("referenced_column", &referenced_column),
        ] {
            if value.is_empty() {
                return Err(CatalogError::InvalidRow(format!(
                    "empty {} in foreign-key constraint row",
                    field
                )));
            }
        }

        Ok(ForeignKeyEdge::new(
            TableId::new(table_schema, table_name),
            TableId::new(referenced_schema, referenced_table),
            column_name,
            referenced_column,
        ))
    }
}

#[async_trait::async_trait]
impl CatalogAdapter for PostgresCatalog {
    fn name(&self) -> &'static str {
        "PostgreSQL"
    }

    #[cfg(feature = "postgres")]
    async fn fetch_foreign_keys(
        &self,
        schemas: &[String],
    ) -> Result<Vec<ForeignKeyEdge>, CatalogError> {
        let rows = self
            .client
            .query(FOREIGN_KEY_QUERY, &[&schemas])
            .await
            .map_err(|e| {
                let err_str = e.to_string();
                if err_str.contains("permission denied") {
                    CatalogError::PermissionDenied(format!(
                        "Cannot read information_schema on {}: {}",
                        self.database, err_str
                    ))
                } else {
                    CatalogError::QueryError(err_str)
                }
            })?;

        let mut edges = Vec::with_capacity(rows.len());
        for row in &rows {
            edges.push(Self::edge_from_row(row)?);
        }

        Ok(edges)
    }

    #[cfg(not(feature = "postgres"))]
    async fn fetch_foreign_keys(
        &self,
        _schemas: &[String],
    ) -> Result<Vec<ForeignKeyEdge>, CatalogError> {
        Err(CatalogError::ConfigError(
            "PostgreSQL support not compiled. Rebuild with: cargo build --features postgres"
                .to_string(),
        ))
    }

    #[cfg(feature = "postgres")]
    async fn test_connection(&self) -> Result<(), CatalogError> {
        self.client
            .query("SELECT 1", &[])
            .await
            .map_err(|e| CatalogError::QueryError(format!("Connection test failed: {}", e)))?;
        Ok(())
    }

    #[cfg(not(feature = "postgres"))]
    async fn test_connection(&self) -> Result<(), CatalogError> {
        Err(CatalogError::ConfigError(
            "PostgreSQL support not compiled. Rebuild with: cargo build --features postgres"
                .to_string(),
        ))
    }
}
