pub use elasticsearch::http::transport::Transport;
use elasticsearch::{
    cluster::ClusterHealthParts,
    http::{headers::HeaderMap, request::JsonBody, response::Response, Method, StatusCode},
    indices::{IndicesCreateParts, IndicesDeleteParts, IndicesRefreshParts},
    ingest::IngestPutPipelineParts,
    params::WaitForStatus,
    Elasticsearch as Client, IndexParts,
};
use log::debug;
use serde::Serialize;
use serde_json::{json, Value};
use thiserror::Error;

use crate::data::{match_all, KnnSearch, Pipeline, VectorDocument};

/// Client for the handful of calls the smoke test makes, one typed function per
/// endpoint
pub struct Elasticsearch {
    client: Client,
}

#[derive(Error, Debug)]
pub enum ElasticsearchError {
    #[error("Transport failed to initialize: {0}")]
    TransportInitError(elasticsearch::Error),

    #[error("Request to {endpoint} failed: {source}")]
    RequestError {
        endpoint: &'static str,
        source: elasticsearch::Error,
    },

    #[error("Failed to read the response of {endpoint}: {source}")]
    ResponseError {
        endpoint: &'static str,
        source: elasticsearch::Error,
    },
}

/// Status and (if it was JSON) body of a response
#[derive(Debug, Clone, PartialEq)]
pub struct StepResponse {
    pub status: StatusCode,
    pub body: Option<Value>,
}

impl StepResponse {
    async fn read(response: Response, endpoint: &'static str) -> Result<Self, ElasticsearchError> {
        let status = response.status_code();
        let text = response
            .text()
            .await
            .map_err(|source| ElasticsearchError::ResponseError { endpoint, source })?;
        let body = serde_json::from_str(&text).ok();
        Ok(StepResponse { status, body })
    }
}

impl Elasticsearch {
    pub fn new(url: &str) -> Result<Self, ElasticsearchError> {
        let transport =
            Transport::single_node(url).map_err(ElasticsearchError::TransportInitError)?;
        Ok(Self::with_transport(transport))
    }

    pub fn with_transport(transport: Transport) -> Self {
        let client = Client::new(transport);
        Elasticsearch { client }
    }

    /// `GET /_cluster/health`, blocking server side until the cluster is at
    /// least yellow or `timeout` passed
    pub async fn wait_for_health(&self, timeout: &str) -> Result<StepResponse, ElasticsearchError> {
        let endpoint = "cluster health";
        let response = self
            .client
            .cluster()
            .health(ClusterHealthParts::None)
            .wait_for_status(WaitForStatus::Yellow)
            .timeout(timeout)
            .send()
            .await
            .map_err(|source| ElasticsearchError::RequestError { endpoint, source })?;

        StepResponse::read(response, endpoint).await
    }

    /// `POST /_elastiknn/setup`, the plugin's one time installation endpoint
    pub async fn setup_plugin(&self) -> Result<StepResponse, ElasticsearchError> {
        let endpoint = "elastiknn setup";
        let response = self
            .client
            .send(
                Method::Post,
                "/_elastiknn/setup",
                HeaderMap::new(),
                None::<&()>,
                None::<JsonBody<Value>>,
                None,
            )
            .await
            .map_err(|source| ElasticsearchError::RequestError { endpoint, source })?;

        StepResponse::read(response, endpoint).await
    }

    pub async fn put_pipeline(
        &self,
        id: &str,
        pipeline: &Pipeline,
    ) -> Result<StepResponse, ElasticsearchError> {
        let endpoint = "put pipeline";
        debug!(
            "Pipeline {}: {}",
            id,
            serde_json::to_string(pipeline).unwrap_or_default()
        );
        let response = self
            .client
            .ingest()
            .put_pipeline(IngestPutPipelineParts::Id(id))
            .body(pipeline)
            .send()
            .await
            .map_err(|source| ElasticsearchError::RequestError { endpoint, source })?;

        StepResponse::read(response, endpoint).await
    }

    pub async fn delete_index(&self, index: &str) -> Result<StepResponse, ElasticsearchError> {
        let endpoint = "delete index";
        let response = self
            .client
            .indices()
            .delete(IndicesDeleteParts::Index(&[index]))
            .send()
            .await
            .map_err(|source| ElasticsearchError::RequestError { endpoint, source })?;

        StepResponse::read(response, endpoint).await
    }

    /// Creates `index` with default settings and mappings
    pub async fn create_index(&self, index: &str) -> Result<StepResponse, ElasticsearchError> {
        let endpoint = "create index";
        let response = self
            .client
            .indices()
            .create(IndicesCreateParts::Index(index))
            .body(json!({}))
            .send()
            .await
            .map_err(|source| ElasticsearchError::RequestError { endpoint, source })?;

        StepResponse::read(response, endpoint).await
    }

    /// `POST /<index>/_doc?pipeline=<pipeline>`
    pub async fn index_document(
        &self,
        index: &str,
        pipeline: &str,
        document: &VectorDocument,
    ) -> Result<StepResponse, ElasticsearchError> {
        let endpoint = "index document";
        let response = self
            .client
            .index(IndexParts::Index(index))
            .pipeline(pipeline)
            .body(document)
            .send()
            .await
            .map_err(|source| ElasticsearchError::RequestError { endpoint, source })?;

        StepResponse::read(response, endpoint).await
    }

    /// `POST /_refresh`, makes everything indexed so far visible to searches
    pub async fn refresh(&self) -> Result<StepResponse, ElasticsearchError> {
        let endpoint = "refresh";
        let response = self
            .client
            .indices()
            .refresh(IndicesRefreshParts::None)
            .send()
            .await
            .map_err(|source| ElasticsearchError::RequestError { endpoint, source })?;

        StepResponse::read(response, endpoint).await
    }

    pub async fn search_match_all(&self, index: &str) -> Result<StepResponse, ElasticsearchError> {
        self.search(index, match_all(), "match all search").await
    }

    pub async fn search_knn(
        &self,
        index: &str,
        search: &KnnSearch,
    ) -> Result<StepResponse, ElasticsearchError> {
        self.search(index, search, "knn search").await
    }

    // The typed search builder switches to POST as soon as a body is set,
    // searches are sent as GET with a body instead.
    async fn search<B: Serialize>(
        &self,
        index: &str,
        body: B,
        endpoint: &'static str,
    ) -> Result<StepResponse, ElasticsearchError> {
        let path = format!("/{}/_search", index);
        let response = self
            .client
            .send(
                Method::Get,
                &path,
                HeaderMap::new(),
                None::<&()>,
                Some(JsonBody::new(body)),
                None,
            )
            .await
            .map_err(|source| ElasticsearchError::RequestError { endpoint, source })?;

        StepResponse::read(response, endpoint).await
    }
}

#[cfg(test)]
mod tests {
    use wiremock::matchers::{body_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::data::{Distance, Fixture};

    fn es_response(status: u16) -> ResponseTemplate {
        ResponseTemplate::new(status).insert_header("x-elastic-product", "Elasticsearch")
    }

    #[tokio::test]
    async fn test_health_query() -> Result<(), Box<dyn std::error::Error>> {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/_cluster/health"))
            .and(query_param("wait_for_status", "yellow"))
            .and(query_param("timeout", "60s"))
            .respond_with(es_response(200).set_body_json(json!({ "status": "yellow" })))
            .expect(1)
            .mount(&server)
            .await;

        let es = Elasticsearch::new(&server.uri())?;
        let response = es.wait_for_health("60s").await?;

        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(response.body, Some(json!({ "status": "yellow" })));
        Ok(())
    }

    #[tokio::test]
    async fn test_setup_without_body() -> Result<(), Box<dyn std::error::Error>> {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/_elastiknn/setup"))
            .respond_with(es_response(200))
            .expect(1)
            .mount(&server)
            .await;

        let es = Elasticsearch::new(&server.uri())?;
        let response = es.setup_plugin().await?;

        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(response.body, None);
        Ok(())
    }

    #[tokio::test]
    async fn test_index_document_through_pipeline() -> Result<(), Box<dyn std::error::Error>> {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/elastiknn-index-01/_doc"))
            .and(query_param("pipeline", "elastiknn-pipeline-01"))
            .and(body_json(json!({ "vec_raw": [0.0, 0.11] })))
            .respond_with(es_response(201).set_body_json(json!({ "_id": "doc-1", "result": "created" })))
            .expect(1)
            .mount(&server)
            .await;

        let fixture = Fixture::default();
        let es = Elasticsearch::new(&server.uri())?;
        let response = es
            .index_document(&fixture.index, &fixture.pipeline, &fixture.document())
            .await?;

        assert_eq!(response.status, StatusCode::CREATED);
        Ok(())
    }

    #[tokio::test]
    async fn test_searches_use_get() -> Result<(), Box<dyn std::error::Error>> {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/elastiknn-index-01/_search"))
            .and(body_json(json!({ "query": { "match_all": {} } })))
            .respond_with(es_response(200).set_body_json(json!({ "hits": { "hits": [] } })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/elastiknn-index-01/_search"))
            .and(body_json(json!({
                "query": {
                    "elastiknn_knn": {
                        "pipelineId": "elastiknn-pipeline-01",
                        "processorId": "elastiknn",
                        "k": 2,
                        "exact": { "distance": "DISTANCE_L2" },
                        "given": { "vector": [0.11, 0.22] }
                    }
                }
            })))
            .respond_with(es_response(200).set_body_json(json!({ "hits": { "hits": [] } })))
            .expect(1)
            .mount(&server)
            .await;

        let fixture = Fixture {
            distance: Distance::L2,
            ..Fixture::default()
        };
        let es = Elasticsearch::new(&server.uri())?;

        assert_eq!(es.search_match_all(&fixture.index).await?.status, StatusCode::OK);
        assert_eq!(
            es.search_knn(&fixture.index, &fixture.knn_search()).await?.status,
            StatusCode::OK
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_unreachable_cluster() -> Result<(), Box<dyn std::error::Error>> {
        // nothing listens on port 1
        let es = Elasticsearch::new("http://127.0.0.1:1")?;
        let result = es.refresh().await;

        assert!(matches!(
            result,
            Err(ElasticsearchError::RequestError {
                endpoint: "refresh",
                ..
            })
        ));
        Ok(())
    }
}
