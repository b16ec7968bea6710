pub mod category;
pub mod config;
pub mod credentials;
pub mod diagnostics;
pub mod indexers;
pub mod metrics;
pub mod registry;
pub mod search;
pub mod session;
pub mod testing;
pub mod transport;

pub use category::{Category, CategoryMap, CategoryMapping, CategoryTable};
pub use config::{
    load_config, load_config_from_str, validate_config, Config, ConfigError, IndexerConfig,
    IndexerKind, SanitizedConfig,
};
pub use credentials::{CredentialStore, Credentials, StaticCredentialStore};
pub use diagnostics::{ParseError, ParseErrorSink, ParseScope, TracingParseErrorSink};
pub use indexers::{
    IndexerAdapter, IndexerError, IndexerInfo, IndexerPrivacy, Operation, XtremeZoneIndexer,
    XtremeZoneSettings,
};
pub use registry::{create_indexer, create_indexer_with_transport, IndexerRegistry, RegistryError};
pub use search::{QueryParams, Release, SearchQuery};
pub use session::{AuthError, AuthorizedClient, Token, TokenSession};
pub use transport::{
    HttpMethod, HttpRequest, HttpResponse, ReqwestTransport, Transport, TransportConfig,
    TransportError,
};
