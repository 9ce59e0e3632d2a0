//! Neo4j connection management and shared graph client.

use std::time::Duration;

use neo4rs::{ConfigBuilder, Graph, Query};
use tokio::time::timeout;

/// Errors from graph operations.
#[derive(Debug, thiserror::Error)]
pub enum GraphError {
    #[error("Neo4j connection error: {0}")]
    Connection(String),

    #[error("Neo4j query error: {0}")]
    Query(#[source] neo4rs::Error),

    #[error("Neo4j query timed out after {0}s")]
    Timeout(u64),

    #[error("uniqueness constraint violated: {0}")]
    ConstraintViolation(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Configuration for connecting to Neo4j.
#[derive(Debug, Clone)]
pub struct GraphConfig {
    pub uri: String,
    pub user: String,
    pub password: String,
    pub database: String,
    pub max_connections: u32,
    pub fetch_size: usize,
    /// Upper bound on any single store call; expiry surfaces as
    /// [`GraphError::Timeout`].
    pub query_timeout_secs: u64,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            uri: "bolt://localhost:7687".to_string(),
            user: "neo4j".to_string(),
            password: "prodgraph-dev".to_string(),
            database: "neo4j".to_string(),
            max_connections: 16,
            fetch_size: 256,
            query_timeout_secs: 10,
        }
    }
}

/// Thread-safe Neo4j graph client with connection pooling.
///
/// This is the single point of access for all ontology graph operations.
/// Clone is cheap (inner Arc).
#[derive(Clone)]
pub struct GraphClient {
    graph: Graph,
    query_timeout: Duration,
}

impl GraphClient {
    /// Connect to Neo4j with the given configuration.
    pub async fn connect(config: &GraphConfig) -> Result<Self, GraphError> {
        let neo_config = ConfigBuilder::default()
            .uri(&config.uri)
            .user(&config.user)
            .password(&config.password)
            .db(config.database.as_str())
            .max_connections(config.max_connections as usize)
            .fetch_size(config.fetch_size)
            .build()
            .map_err(|e| GraphError::Connection(e.to_string()))?;

        let graph = Graph::connect(neo_config)
            .await
            .map_err(|e| GraphError::Connection(e.to_string()))?;

        tracing::info!(uri = %config.uri, db = %config.database, "Connected to Neo4j");
        Ok(Self {
            graph,
            query_timeout: Duration::from_secs(config.query_timeout_secs),
        })
    }

    /// Execute a write-only query (CREATE, MERGE, DELETE, SET).
    pub async fn run(&self, query: Query) -> Result<(), GraphError> {
        match timeout(self.query_timeout, self.graph.run(query)).await {
            Ok(res) => res.map(|_| ()).map_err(classify),
            Err(_) => Err(GraphError::Timeout(self.query_timeout.as_secs())),
        }
    }

    /// Execute a query and collect all rows.
    pub async fn query_rows(&self, query: Query) -> Result<Vec<neo4rs::Row>, GraphError> {
        let fetch = async {
            let mut stream = self.graph.execute(query).await.map_err(classify)?;
            let mut rows = Vec::new();
            while let Some(row) = stream.next().await.map_err(classify)? {
                rows.push(row);
            }
            Ok(rows)
        };

        match timeout(self.query_timeout, fetch).await {
            Ok(res) => res,
            Err(_) => Err(GraphError::Timeout(self.query_timeout.as_secs())),
        }
    }

    /// Execute a query and return the first row, if any.
    pub async fn query_one(&self, query: Query) -> Result<Option<neo4rs::Row>, GraphError> {
        let fetch = async {
            let mut stream = self.graph.execute(query).await.map_err(classify)?;
            stream.next().await.map_err(classify)
        };

        match timeout(self.query_timeout, fetch).await {
            Ok(res) => res,
            Err(_) => Err(GraphError::Timeout(self.query_timeout.as_secs())),
        }
    }
}

/// Separate uniqueness-constraint failures from other query errors so the
/// store layer can report `DuplicateCode` instead of a generic failure.
fn classify(err: neo4rs::Error) -> GraphError {
    let detail = err.to_string();
    if detail.contains("ConstraintValidationFailed") || detail.contains("already exists") {
        GraphError::ConstraintViolation(detail)
    } else {
        GraphError::Query(err)
    }
}
