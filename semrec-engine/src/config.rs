//! Run configuration resolution
//!
//! Each setting is taken from the first source that provides it:
//! 1. Command-line arguments
//! 2. Environment variables (`SEMREC_*`)
//! 3. TOML config file
//! 4. Compiled defaults
//!
//! Endpoint lists and query settings have no command-line form.

use crate::orchestrator::{FlushPolicy, DEFAULT_FLUSH_THRESHOLD, DEFAULT_MAX_FLUSH_ATTEMPTS};
use crate::querier::RecommendationType;
use crate::sparql::query::{RelatedQuery, DEFAULT_LIMIT, DEFAULT_TEMPLATE};
use semrec_common::config::TomlConfig;
use semrec_common::{Error, Result};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, warn};

pub const ENV_SOURCE_FILE: &str = "SEMREC_SOURCE_FILE";
pub const ENV_OUTPUT_FILE: &str = "SEMREC_OUTPUT_FILE";
pub const ENV_TYPE_RECOMMENDATION: &str = "SEMREC_TYPE_RECOMMENDATION";
pub const ENV_FEDERATED_ENDPOINT: &str = "SEMREC_FEDERATED_ENDPOINT";
pub const ENV_SINGLE_ENDPOINT: &str = "SEMREC_SINGLE_ENDPOINT";
pub const ENV_FLUSH_THRESHOLD: &str = "SEMREC_FLUSH_THRESHOLD";

pub const DEFAULT_SOURCE_FILE: &str = "input/uris.txt";
pub const DEFAULT_OUTPUT_FILE: &str = "output/recommendations.rdf";
pub const DEFAULT_TYPE_RECOMMENDATION: &str = "federated";
pub const DEFAULT_FEDERATED_ENDPOINT: &str = "http://localhost:8080/SemaGrow/sparql";

/// Values given on the command line
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub source_file_path: Option<PathBuf>,
    pub output_file_path: Option<PathBuf>,
    pub type_recommendation: Option<String>,
}

/// Fully resolved settings for one run
#[derive(Debug, Clone)]
pub struct RecommenderConfig {
    pub source_file_path: PathBuf,
    pub output_file_path: PathBuf,
    pub recommendation_type: RecommendationType,
    /// Endpoints for the selected querier (exactly one unless `Individual`)
    pub endpoints: Vec<String>,
    pub request_timeout: Option<Duration>,
    pub query: RelatedQuery,
    pub flush_policy: FlushPolicy,
}

impl RecommenderConfig {
    pub fn resolve(toml: &TomlConfig, cli: &CliOverrides) -> Result<Self> {
        let source_file_path = pick(
            "source_file_path",
            cli.source_file_path.clone(),
            env_value(ENV_SOURCE_FILE).map(PathBuf::from),
            toml.source_file_path.clone(),
        )
        .unwrap_or_else(|| PathBuf::from(DEFAULT_SOURCE_FILE));

        let output_file_path = pick(
            "output_file_path",
            cli.output_file_path.clone(),
            env_value(ENV_OUTPUT_FILE).map(PathBuf::from),
            toml.output_file_path.clone(),
        )
        .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_FILE));

        let flag = pick(
            "type_recommendation",
            cli.type_recommendation.clone(),
            env_value(ENV_TYPE_RECOMMENDATION),
            toml.type_recommendation.clone(),
        )
        .unwrap_or_else(|| DEFAULT_TYPE_RECOMMENDATION.to_string());
        let recommendation_type = RecommendationType::from_flag(&flag);
        if recommendation_type == RecommendationType::Individual
            && !flag.trim().eq_ignore_ascii_case("individual")
        {
            warn!(flag = %flag, "Unrecognized type_recommendation, using individual querier");
        }

        let endpoints = resolve_endpoints(toml, recommendation_type)?;

        let request_timeout = toml
            .endpoints
            .request_timeout_secs
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs);

        let template = toml
            .query
            .template
            .clone()
            .unwrap_or_else(|| DEFAULT_TEMPLATE.to_string());
        let query = RelatedQuery::new(template, toml.query.limit.unwrap_or(DEFAULT_LIMIT))
            .ok_or_else(|| Error::Config("query template must contain a {uri} placeholder".to_string()))?;

        let threshold = pick(
            "flush_threshold",
            None,
            env_parsed::<usize>(ENV_FLUSH_THRESHOLD)?,
            toml.flush_threshold,
        )
        .unwrap_or(DEFAULT_FLUSH_THRESHOLD);
        if threshold == 0 {
            return Err(Error::Config("flush_threshold must be at least 1".to_string()));
        }

        let max_attempts = toml.max_flush_attempts.unwrap_or(DEFAULT_MAX_FLUSH_ATTEMPTS);
        if max_attempts == 0 {
            return Err(Error::Config("max_flush_attempts must be at least 1".to_string()));
        }

        Ok(Self {
            source_file_path,
            output_file_path,
            recommendation_type,
            endpoints,
            request_timeout,
            query,
            flush_policy: FlushPolicy {
                threshold,
                max_attempts,
            },
        })
    }
}

fn resolve_endpoints(toml: &TomlConfig, kind: RecommendationType) -> Result<Vec<String>> {
    match kind {
        RecommendationType::Federated => {
            let url = pick(
                "endpoints.federated",
                None,
                env_value(ENV_FEDERATED_ENDPOINT),
                toml.endpoints.federated.clone(),
            )
            .unwrap_or_else(|| DEFAULT_FEDERATED_ENDPOINT.to_string());
            Ok(vec![url])
        }
        RecommendationType::SingleEndpoint => pick(
            "endpoints.single",
            None,
            env_value(ENV_SINGLE_ENDPOINT),
            toml.endpoints.single.clone(),
        )
        .map(|url| vec![url])
        .ok_or_else(|| {
            Error::Config(format!(
                "single endpoint querier selected but neither {} nor endpoints.single is set",
                ENV_SINGLE_ENDPOINT
            ))
        }),
        RecommendationType::Individual => {
            let urls: Vec<String> = toml
                .endpoints
                .individual
                .iter()
                .map(|u| u.trim().to_string())
                .filter(|u| !u.is_empty())
                .collect();
            if urls.is_empty() {
                return Err(Error::Config(
                    "individual querier selected but endpoints.individual is empty".to_string(),
                ));
            }
            Ok(urls)
        }
    }
}

/// First available value, logging which source supplied it
fn pick<T>(name: &str, cli: Option<T>, env: Option<T>, toml: Option<T>) -> Option<T> {
    let (source, value) = match (cli, env, toml) {
        (Some(v), _, _) => ("command line", Some(v)),
        (None, Some(v), _) => ("environment", Some(v)),
        (None, None, Some(v)) => ("config file", Some(v)),
        (None, None, None) => ("default", None),
    };
    debug!(setting = name, source, "Configuration value resolved");
    value
}

fn env_value(var: &str) -> Option<String> {
    std::env::var(var).ok().filter(|v| !v.trim().is_empty())
}

fn env_parsed<T: FromStr>(var: &str) -> Result<Option<T>>
where
    T::Err: std::fmt::Display,
{
    env_value(var)
        .map(|raw| {
            raw.trim()
                .parse::<T>()
                .map_err(|e| Error::InvalidInput(format!("{}='{}': {}", var, raw, e)))
        })
        .transpose()
}
