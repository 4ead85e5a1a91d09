//! Engine client: fixed endpoints composed from the encoder and the monitor.

use std::{fmt, sync::Arc};

use crate::{
    cancel::CancelToken,
    error::Result,
    monitor::{
        MessageSink, MessageStream, MonitorOptions, MonitorOutcome, monitor_with_options, spawn,
    },
    params::{
        ContainerLogsParameters, ContainerStopParameters, ContainersListParameters,
        EventsParameters, ImagePushParameters, ImagesCreateParameters, ServiceFilter,
    },
    request::{ApiRequest, Method},
    transport::{ResponseBody, Transport},
    types::{EventMessage, ProgressMessage},
};

/// Options shared by every request a [`Client`] makes.
#[derive(Debug, Clone, Default)]
pub struct ClientOptions {
    /// API version prefix (`1.41` becomes `/v1.41/...`). `None` lets the
    /// engine pick its default version.
    pub api_version: Option<String>,

    /// Options for every streaming call.
    pub monitor: MonitorOptions,
}

/// Client builder.
pub struct ClientBuilder {
    transport: Arc<dyn Transport>,
    options: ClientOptions,
}

impl ClientBuilder {
    /// Pin the API version.
    #[must_use]
    pub fn api_version(mut self, version: impl Into<String>) -> Self {
        self.options.api_version = Some(version.into());
        self
    }

    /// Set options for streaming calls.
    #[must_use]
    pub fn monitor_options(mut self, options: MonitorOptions) -> Self {
        self.options.monitor = options;
        self
    }

    /// Build the client.
    #[must_use]
    pub fn build(self) -> Client {
        Client {
            inner: Arc::new(Inner {
                transport: self.transport,
                options: self.options,
            }),
        }
    }
}

impl fmt::Debug for ClientBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientBuilder")
            .field("options", &self.options)
            .finish()
    }
}

/// A container-engine client over a caller-supplied [`Transport`].
///
/// Cheap to clone; clones share the transport.
#[derive(Clone)]
pub struct Client {
    inner: Arc<Inner>,
}

struct Inner {
    transport: Arc<dyn Transport>,
    options: ClientOptions,
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("options", &self.inner.options)
            .finish()
    }
}

impl Client {
    /// Create a builder over `transport`.
    #[must_use]
    pub fn builder(transport: Arc<dyn Transport>) -> ClientBuilder {
        ClientBuilder {
            transport,
            options: ClientOptions::default(),
        }
    }

    /// Create a client with default options.
    #[must_use]
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self::builder(transport).build()
    }

    /// Options in effect.
    #[must_use]
    pub fn options(&self) -> &ClientOptions {
        &self.inner.options
    }

    /// A request for `path`, carrying the configured API version.
    #[must_use]
    pub fn request(&self, method: Method, path: impl Into<String>) -> ApiRequest {
        ApiRequest::new(method, path).with_api_version(self.inner.options.api_version.clone())
    }

    /// Send a prepared request and return the raw body.
    pub async fn send(&self, request: &ApiRequest) -> Result<ResponseBody> {
        #[cfg(feature = "tracing")]
        tracing::trace!(request = %request, "sending engine request");

        self.inner.transport.send(request).await
    }

    /// `POST /images/create`: pull (or import) an image, reporting progress.
    ///
    /// The query is validated before anything is sent.
    pub async fn create_image<S>(
        &self,
        params: &ImagesCreateParameters,
        sink: S,
        cancel: &CancelToken,
    ) -> Result<MonitorOutcome>
    where
        S: MessageSink<ProgressMessage>,
    {
        let request = self
            .request(Method::Post, "images/create")
            .with_query(params)?;
        self.stream::<ProgressMessage, _>(&request, sink, cancel).await
    }

    /// `POST /images/{name}/push`: push an image, reporting progress.
    pub async fn push_image<S>(
        &self,
        name: &str,
        params: &ImagePushParameters,
        sink: S,
        cancel: &CancelToken,
    ) -> Result<MonitorOutcome>
    where
        S: MessageSink<ProgressMessage>,
    {
        let request = self
            .request(Method::Post, format!("images/{name}/push"))
            .with_query(params)?;
        self.stream::<ProgressMessage, _>(&request, sink, cancel).await
    }

    /// `GET /events`: deliver engine events until the stream ends or `cancel`
    /// fires.
    pub async fn monitor_events<S>(
        &self,
        params: &EventsParameters,
        sink: S,
        cancel: &CancelToken,
    ) -> Result<MonitorOutcome>
    where
        S: MessageSink<EventMessage>,
    {
        let request = self.request(Method::Get, "events").with_query(params)?;
        self.stream::<EventMessage, _>(&request, sink, cancel).await
    }

    /// `GET /events` as a channel-backed [`MessageStream`].
    pub async fn events(&self, params: &EventsParameters) -> Result<MessageStream<EventMessage>> {
        let request = self.request(Method::Get, "events").with_query(params)?;
        let body = self.send(&request).await?;
        Ok(spawn(body, self.inner.options.monitor.clone()))
    }

    /// `POST /images/create` as a channel-backed [`MessageStream`].
    pub async fn pull_image(
        &self,
        params: &ImagesCreateParameters,
    ) -> Result<MessageStream<ProgressMessage>> {
        let request = self
            .request(Method::Post, "images/create")
            .with_query(params)?;
        let body = self.send(&request).await?;
        Ok(spawn(body, self.inner.options.monitor.clone()))
    }

    /// Request for `GET /containers/json`.
    pub fn list_containers_request(&self, params: &ContainersListParameters) -> Result<ApiRequest> {
        self.request(Method::Get, "containers/json").with_query(params)
    }

    /// Request for `GET /containers/{id}/logs`.
    pub fn container_logs_request(
        &self,
        id: &str,
        params: &ContainerLogsParameters,
    ) -> Result<ApiRequest> {
        self.request(Method::Get, format!("containers/{id}/logs"))
            .with_query(params)
    }

    /// Request for `POST /containers/{id}/stop`.
    pub fn stop_container_request(
        &self,
        id: &str,
        params: &ContainerStopParameters,
    ) -> Result<ApiRequest> {
        self.request(Method::Post, format!("containers/{id}/stop"))
            .with_query(params)
    }

    /// Request for `GET /services` with filters.
    pub fn list_services_request(&self, filter: &ServiceFilter) -> Result<ApiRequest> {
        self.request(Method::Get, "services").with_filters(filter)
    }

    async fn stream<M, S>(
        &self,
        request: &ApiRequest,
        sink: S,
        cancel: &CancelToken,
    ) -> Result<MonitorOutcome>
    where
        M: serde::de::DeserializeOwned,
        S: MessageSink<M>,
    {
        let body = self.send(request).await?;
        monitor_with_options::<M, _, _>(body, sink, cancel, &self.inner.options.monitor).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        error::{Error, ErrorKind},
        mock::{MockBody, MockTransport},
    };

    const PULL_SESSION: &str = r#"
{"status":"Pulling from library/alpine","id":"3.19"}
{"status":"Downloading","progressDetail":{"current":1024,"total":3400},"progress":"[=>   ]","id":"c6a83fedfae6"}
{"status":"Pull complete","progressDetail":{},"id":"c6a83fedfae6"}
{"status":"Digest: sha256:13b7e62e8df80264dbb747995705a986aa530415763a6c58f84a3ca8af9a5bcd"}
{"status":"Status: Downloaded newer image for alpine:3.19"}
"#;

    #[tokio::test]
    async fn create_image_replays_a_pull_session() -> Result<()> {
        let body = MockBody::from_jsonl_str(PULL_SESSION)?;
        let transport = Arc::new(MockTransport::new().respond("images/create", body));
        let client = Client::builder(transport.clone()).api_version("1.41").build();

        let mut statuses = Vec::new();
        let outcome = client
            .create_image(
                &ImagesCreateParameters::pull("alpine", "3.19"),
                |msg: ProgressMessage| statuses.push(msg.status.unwrap_or_default()),
                &CancelToken::new(),
            )
            .await?;

        assert_eq!(outcome, MonitorOutcome::Completed);
        assert_eq!(statuses.len(), 5);
        assert_eq!(statuses[2], "Pull complete");

        let requests = transport.requests().await;
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].method(), Method::Post);
        assert_eq!(
            requests[0].target(),
            "/v1.41/images/create?fromImage=alpine&tag=3.19"
        );
        Ok(())
    }

    #[tokio::test]
    async fn invalid_query_sends_nothing() {
        let transport = Arc::new(MockTransport::new().respond("images/create", MockBody::new()));
        let client = Client::new(transport.clone());

        let err = client
            .create_image(
                &ImagesCreateParameters::default(),
                |_msg: ProgressMessage| {},
                &CancelToken::new(),
            )
            .await
            .err();

        assert!(matches!(
            err,
            Some(Error::MissingRequiredParameter { field: "from_image" })
        ));
        assert!(transport.requests().await.is_empty());
    }

    #[tokio::test]
    async fn push_reports_engine_errors_as_messages() -> Result<()> {
        let body = MockBody::new()
            .frame(serde_json::json!({
                "status": "The push refers to repository [registry.local/app]"
            }))
            .frame(serde_json::json!({
                "errorDetail": {"message": "denied: requested access to the resource is denied"},
                "error": "denied: requested access to the resource is denied"
            }));
        let transport =
            Arc::new(MockTransport::new().respond("images/registry.local/app/push", body));
        let client = Client::new(transport.clone());

        let mut errors = Vec::new();
        let outcome = client
            .push_image(
                "registry.local/app",
                &ImagePushParameters {
                    tag: Some("v2".to_string()),
                    ..ImagePushParameters::default()
                },
                |msg: ProgressMessage| {
                    if msg.is_error() {
                        errors.push(msg.error_message().map(str::to_string));
                    }
                },
                &CancelToken::new(),
            )
            .await?;

        assert_eq!(outcome, MonitorOutcome::Completed);
        assert_eq!(
            errors,
            vec![Some("denied: requested access to the resource is denied".to_string())]
        );
        assert_eq!(
            transport.requests().await[0].target(),
            "/images/registry.local/app/push?tag=v2"
        );
        Ok(())
    }

    #[tokio::test]
    async fn idle_event_stream_is_cancelled() -> Result<()> {
        let body = MockBody::new()
            .frame(serde_json::json!({
                "Type": "container",
                "Action": "start",
                "Actor": {"ID": "abc"}
            }))
            .hang();
        let transport = Arc::new(MockTransport::new().respond("events", body));
        let client = Client::new(transport);

        let cancel = CancelToken::new();
        let trigger = cancel.clone();
        let mut actions = Vec::new();
        let outcome = client
            .monitor_events(
                &EventsParameters::default().filter("type", "container"),
                |event: EventMessage| {
                    actions.push(event.action().map(str::to_string));
                    trigger.cancel();
                },
                &cancel,
            )
            .await?;

        assert_eq!(outcome, MonitorOutcome::Cancelled);
        assert_eq!(actions, vec![Some("start".to_string())]);
        Ok(())
    }

    #[tokio::test]
    async fn events_stream_delivers_over_a_channel() -> Result<()> {
        let body = MockBody::new()
            .frame(serde_json::json!({"Type": "network", "Action": "create"}))
            .pause(std::time::Duration::from_millis(5))
            .frame(serde_json::json!({"Type": "network", "Action": "destroy"}));
        let transport = Arc::new(MockTransport::new().respond("events", body));
        let client = Client::new(transport);

        let mut stream = client.events(&EventsParameters::default()).await?;
        let mut actions = Vec::new();
        while let Some(event) = stream.recv().await {
            actions.push(event.action.unwrap_or_default());
        }

        assert_eq!(actions, vec!["create", "destroy"]);
        assert_eq!(stream.finish().await?, MonitorOutcome::Completed);
        Ok(())
    }

    #[tokio::test]
    async fn transport_failures_are_retryable() {
        let transport = Arc::new(MockTransport::new().fail("events", "connection refused"));
        let client = Client::new(transport);

        let err = client
            .monitor_events(
                &EventsParameters::default(),
                |_event: EventMessage| {},
                &CancelToken::new(),
            )
            .await
            .err();

        assert_eq!(err.as_ref().map(Error::kind), Some(ErrorKind::Transport));
        assert!(err.is_some_and(|e| e.is_retryable()));
    }

    #[test]
    fn request_builders_encode_their_queries() -> Result<()> {
        let client = Client::new(Arc::new(MockTransport::new()));

        let list = client.list_containers_request(&ContainersListParameters {
            all: true,
            limit: 5,
            ..ContainersListParameters::default()
        })?;
        assert_eq!(list.to_string(), "GET /containers/json?all=1&limit=5");

        let stop = client.stop_container_request(
            "web",
            &ContainerStopParameters {
                wait_before_kill: Some(std::time::Duration::from_secs(10)),
                ..ContainerStopParameters::default()
            },
        )?;
        assert_eq!(stop.target(), "/containers/web/stop?t=10");

        let logs = client.container_logs_request(
            "web",
            &ContainerLogsParameters {
                stdout: true,
                tail: Some("all".to_string()),
                ..ContainerLogsParameters::default()
            },
        )?;
        assert_eq!(logs.query(), "stdout=1&tail=all");

        let services = client.list_services_request(&ServiceFilter {
            mode: "replicated".to_string(),
            ..ServiceFilter::default()
        })?;
        assert_eq!(
            services.target(),
            "/services?filters=%7B%22mode%22%3A%7B%22replicated%22%3Atrue%7D%7D"
        );
        Ok(())
    }
}
