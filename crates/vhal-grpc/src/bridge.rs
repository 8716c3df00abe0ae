//! GrpcVehicleHardware - VehicleHardware backed by a remote vehicle server
//!
//! Every contract call is proxied to the server through a
//! [`VehicleServerStub`]. Values reaching the caller, from get results or
//! from the push stream, pass the shared [`TimestampTable`] first.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};
use vhal_core::{
    DumpResult, GetValueRequest, GetValueResult, GetValuesCallback, PropertyChangeCallback,
    PropertySetErrorCallback, SetValueRequest, SetValuesCallback, StatusCode, SubscribeOptions,
    VehicleHardware, VehiclePropConfig,
};

use crate::callbacks::CallbackRegistry;
use crate::config::{BridgeConfig, StreamConfig};
use crate::error::BridgeError;
use crate::stream;
use crate::timestamps::TimestampTable;
use crate::transport::{GrpcVehicleServerStub, RpcResult, VehicleServerStub};

/// Runtime options of the bridge
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BridgeOptions {
    pub stream: StreamConfig,
    /// RPC attempts per `get_values` call
    pub max_get_values_attempts: usize,
}

impl Default for BridgeOptions {
    fn default() -> Self {
        Self {
            stream: StreamConfig::default(),
            max_get_values_attempts: 5,
        }
    }
}

/// State shared with the stream task
pub(crate) struct Shared {
    pub(crate) timestamps: TimestampTable,
    pub(crate) callbacks: CallbackRegistry,
}

impl Shared {
    pub(crate) fn new() -> Self {
        Self {
            timestamps: TimestampTable::new(),
            callbacks: CallbackRegistry::new(),
        }
    }
}

/// Vehicle hardware proxied over gRPC
pub struct GrpcVehicleHardware {
    stub: Arc<dyn VehicleServerStub>,
    shared: Arc<Shared>,
    max_get_values_attempts: usize,
    shutdown_tx: watch::Sender<bool>,
    stream_task: Mutex<Option<JoinHandle<()>>>,
}

impl GrpcVehicleHardware {
    /// Connect to `config.server.address` and start the value stream.
    ///
    /// The channel connects lazily; use [`wait_for_connected`] to block
    /// until the server is reachable. Must be called within a Tokio runtime.
    ///
    /// [`wait_for_connected`]: GrpcVehicleHardware::wait_for_connected
    pub fn connect(config: &BridgeConfig) -> Result<Self, BridgeError> {
        config.validate()?;
        let stub = GrpcVehicleServerStub::connect_lazy(&config.server)?;
        info!(address = %config.server.address, "Connecting to vehicle server");
        Ok(Self::with_stub(Arc::new(stub), config.options()))
    }

    /// Create a bridge over `stub` and start the value stream.
    ///
    /// Must be called within a Tokio runtime.
    pub fn with_stub(stub: Arc<dyn VehicleServerStub>, options: BridgeOptions) -> Self {
        let bridge = Self::new(stub, options.max_get_values_attempts);

        let task = tokio::spawn(stream::run_value_stream(
            bridge.stub.clone(),
            bridge.shared.clone(),
            options.stream,
            bridge.shutdown_tx.subscribe(),
        ));
        *bridge.stream_task.lock() = Some(task);

        bridge
    }

    fn new(stub: Arc<dyn VehicleServerStub>, max_get_values_attempts: usize) -> Self {
        if max_get_values_attempts == 0 {
            warn!("max_get_values_attempts is 0, using 1");
        }
        let (shutdown_tx, _) = watch::channel(false);
        Self {
            stub,
            shared: Arc::new(Shared::new()),
            max_get_values_attempts: max_get_values_attempts.max(1),
            shutdown_tx,
            stream_task: Mutex::new(None),
        }
    }

    /// Bridge without a stream task, for driving sessions by hand
    #[cfg(test)]
    fn without_stream(stub: Arc<dyn VehicleServerStub>) -> Self {
        Self::new(stub, BridgeOptions::default().max_get_values_attempts)
    }

    /// Wait until the vehicle server is reachable or `timeout` elapses
    pub async fn wait_for_connected(&self, timeout: Duration) -> bool {
        self.stub.wait_for_ready(timeout).await
    }

    /// Stop the value stream and wait for it to finish.
    ///
    /// No property change callback runs once this returns.
    pub async fn shutdown(&self) {
        self.shutdown_tx.send_replace(true);

        let task = self.stream_task.lock().take();
        if let Some(task) = task {
            if let Err(e) = task.await {
                if !e.is_cancelled() {
                    error!(error = %e, "Property value stream task panicked");
                }
            }
        }

        self.shared.callbacks.close();
        debug!("Vehicle hardware bridge shut down");
    }

    /// One `get_values` RPC round; returns the requests that must be retried
    async fn get_values_round(
        &self,
        pending: Vec<GetValueRequest>,
        results: &mut Vec<GetValueResult>,
    ) -> RpcResult<Vec<GetValueRequest>> {
        let by_id: HashMap<i64, GetValueRequest> = pending
            .iter()
            .map(|request| (request.request_id, request.clone()))
            .collect();

        let remote = self.stub.get_values(pending).await?;

        let mut retries = Vec::new();
        for mut result in remote {
            let Some(request) = by_id.get(&result.request_id) else {
                error!(
                    request_id = result.request_id,
                    "Ignoring get result with unknown request id"
                );
                continue;
            };

            let Some(value) = result.prop.as_mut() else {
                results.push(result);
                continue;
            };

            if self.shared.timestamps.admit(value) {
                results.push(result);
            } else {
                warn!(
                    prop_id = value.prop,
                    area_id = value.area_id,
                    request_id = request.request_id,
                    "Get result is outdated, retrying"
                );
                retries.push(request.clone());
            }
        }

        Ok(retries)
    }

    /// Log a failed passthrough call and map it to a status
    fn status_of(call: &str, result: RpcResult<StatusCode>) -> StatusCode {
        match result {
            Ok(status) => status,
            Err(status) => {
                error!(call, %status, "Vehicle server call failed");
                StatusCode::InternalError
            }
        }
    }
}

impl Drop for GrpcVehicleHardware {
    fn drop(&mut self) {
        self.shutdown_tx.send_replace(true);
        if let Some(task) = self.stream_task.get_mut().take() {
            task.abort();
        }
        // Waits for an in-flight dispatch to return.
        self.shared.callbacks.close();
    }
}

#[async_trait]
impl VehicleHardware for GrpcVehicleHardware {
    async fn get_all_property_configs(&self) -> Vec<VehiclePropConfig> {
        match self.stub.get_all_property_config().await {
            Ok(configs) => {
                debug!(count = configs.len(), "Fetched property configs");
                configs
            }
            Err(status) => {
                error!(%status, "Failed to get property configs");
                Vec::new()
            }
        }
    }

    async fn set_values(
        &self,
        callback: SetValuesCallback,
        requests: Vec<SetValueRequest>,
    ) -> StatusCode {
        match self.stub.set_values(requests).await {
            Ok(results) => {
                callback(results);
                StatusCode::Ok
            }
            Err(status) => {
                error!(call = "set_values", %status, "Vehicle server call failed");
                StatusCode::InternalError
            }
        }
    }

    async fn get_values(
        &self,
        callback: GetValuesCallback,
        requests: Vec<GetValueRequest>,
    ) -> StatusCode {
        let mut results = Vec::with_capacity(requests.len());
        let mut pending = requests;
        let mut attempt = 0;

        while !pending.is_empty() {
            attempt += 1;
            if attempt > self.max_get_values_attempts {
                error!(
                    attempts = self.max_get_values_attempts,
                    pending = pending.len(),
                    "Failed to get the latest values, giving up"
                );
                return StatusCode::TryAgain;
            }

            pending = match self.get_values_round(pending, &mut results).await {
                Ok(retries) => retries,
                Err(status) => {
                    error!(call = "get_values", attempt, %status, "Vehicle server call failed");
                    return StatusCode::InternalError;
                }
            };
        }

        if !results.is_empty() {
            callback(results);
        }
        StatusCode::Ok
    }

    async fn dump(&self, options: &[String]) -> DumpResult {
        match self.stub.dump(options.to_vec()).await {
            Ok(result) => result,
            Err(status) => {
                error!(call = "dump", %status, "Vehicle server call failed");
                DumpResult::default()
            }
        }
    }

    async fn check_health(&self) -> StatusCode {
        Self::status_of("check_health", self.stub.check_health().await)
    }

    fn register_on_property_change_event(&self, callback: PropertyChangeCallback) {
        self.shared.callbacks.register_property_change(callback);
    }

    fn register_on_property_set_error_event(&self, callback: PropertySetErrorCallback) {
        self.shared.callbacks.register_set_error(callback);
    }

    async fn update_sample_rate(
        &self,
        prop_id: i32,
        area_id: i32,
        sample_rate: f32,
    ) -> StatusCode {
        Self::status_of(
            "update_sample_rate",
            self.stub
                .update_sample_rate(prop_id, area_id, sample_rate)
                .await,
        )
    }

    async fn subscribe(&self, options: SubscribeOptions) -> StatusCode {
        match self.stub.subscribe(options).await {
            Err(status) if status.is_unimplemented() => {
                info!("Vehicle server does not support subscribe, treating as success");
                StatusCode::Ok
            }
            result => Self::status_of("subscribe", result),
        }
    }

    async fn unsubscribe(&self, prop_id: i32, area_id: i32) -> StatusCode {
        match self.stub.unsubscribe(prop_id, area_id).await {
            Err(status) if status.is_unimplemented() => {
                info!("Vehicle server does not support unsubscribe, treating as success");
                StatusCode::Ok
            }
            result => Self::status_of("unsubscribe", result),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::elapsed_realtime_nanos;
    use crate::stream::{poll_values, SessionEnd};
    use crate::transport::{MockVehicleServer, RpcStatus};
    use pretty_assertions::assert_eq;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use vhal_core::{SetValueResult, VehiclePropValue};

    const PROP: i32 = 54321;

    fn bridge(mock: &Arc<MockVehicleServer>) -> GrpcVehicleHardware {
        GrpcVehicleHardware::without_stream(mock.clone())
    }

    fn record_events(hardware: &GrpcVehicleHardware) -> Arc<Mutex<Vec<VehiclePropValue>>> {
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = events.clone();
        hardware.register_on_property_change_event(Box::new(move |values: Vec<VehiclePropValue>| {
            sink.lock().extend(values);
        }));
        events
    }

    fn record_get_results() -> (GetValuesCallback, Arc<Mutex<Vec<Vec<GetValueResult>>>>) {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let sink = calls.clone();
        (Arc::new(move |results: Vec<GetValueResult>| sink.lock().push(results)), calls)
    }

    fn get_result(request_id: i64, timestamp: i64, value: i32) -> GetValueResult {
        GetValueResult {
            request_id,
            status: StatusCode::Ok,
            prop: Some(
                VehiclePropValue::new(PROP, 0)
                    .with_timestamp(timestamp)
                    .with_int32_values(vec![value]),
            ),
        }
    }

    fn get_request(request_id: i64) -> GetValueRequest {
        GetValueRequest {
            request_id,
            prop: VehiclePropValue::new(PROP, 0),
        }
    }

    /// Deliver one pushed batch through a single stream session
    async fn push_event(hardware: &GrpcVehicleHardware, mock: &MockVehicleServer, timestamp: i64) {
        mock.queue_value_batches(vec![vec![
            VehiclePropValue::new(PROP, 0).with_timestamp(timestamp)
        ]]);
        let (_tx, mut rx) = watch::channel(false);
        let end = poll_values(mock, &hardware.shared, &mut rx).await;
        assert!(matches!(end, SessionEnd::Closed { batches: 1 }));
    }

    #[tokio::test]
    async fn test_poll_value_restamps_to_local_time() {
        let mock = Arc::new(MockVehicleServer::new());
        let hardware = bridge(&mock);
        let events = record_events(&hardware);
        let start = elapsed_realtime_nanos();

        push_event(&hardware, &mock, 12345).await;

        let events = events.lock();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].prop, PROP);
        assert!(events[0].timestamp >= start);
        assert!(events[0].timestamp <= elapsed_realtime_nanos());
    }

    #[tokio::test]
    async fn test_poll_value_ignores_outdated_value() {
        let mock = Arc::new(MockVehicleServer::new());
        let hardware = bridge(&mock);
        let events = record_events(&hardware);
        mock.queue_value_batches(vec![
            vec![VehiclePropValue::new(PROP, 0)
                .with_timestamp(12345)
                .with_int32_values(vec![1324])],
            vec![VehiclePropValue::new(PROP, 0)
                .with_timestamp(12340)
                .with_int32_values(vec![1423])],
        ]);

        let (_tx, mut rx) = watch::channel(false);
        poll_values(mock.as_ref(), &hardware.shared, &mut rx).await;

        let events = events.lock();
        assert_eq!(events.len(), 1, "outdated event must be ignored");
        assert_eq!(events[0].value.int32_values, vec![1324]);
    }

    #[tokio::test]
    async fn test_get_values() {
        let mock = Arc::new(MockVehicleServer::new());
        let hardware = bridge(&mock);
        mock.push_get_values_response(Ok(vec![get_result(1234, 0, 123456)]));
        let (callback, calls) = record_get_results();

        let status = hardware.get_values(callback, vec![get_request(1234)]).await;

        assert_eq!(status, StatusCode::Ok);
        let requests = mock.get_values_requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0][0].request_id, 1234);
        assert_eq!(requests[0][0].prop.prop, PROP);

        let calls = calls.lock();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0][0].request_id, 1234);
        assert_eq!(calls[0][0].prop.as_ref().unwrap().value.int32_values, vec![123456]);
    }

    #[tokio::test]
    async fn test_get_values_retries_outdated_result() {
        let mock = Arc::new(MockVehicleServer::new());
        let hardware = bridge(&mock);
        let start = elapsed_realtime_nanos();

        // An update for timestamp 2000 arrives before the get result.
        push_event(&hardware, &mock, 2000).await;
        mock.push_get_values_response(Ok(vec![get_result(1234, 1000, 123456)]));
        mock.push_get_values_response(Ok(vec![get_result(1234, 2000, 654321)]));
        let (callback, calls) = record_get_results();

        let status = hardware.get_values(callback, vec![get_request(1234)]).await;

        assert_eq!(status, StatusCode::Ok);
        assert_eq!(mock.get_values_calls(), 2);
        let calls = calls.lock();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].len(), 1);
        let value = calls[0][0].prop.as_ref().unwrap();
        assert_eq!(value.value.int32_values, vec![654321]);
        assert!(value.timestamp >= start);
        assert!(value.timestamp <= elapsed_realtime_nanos());
    }

    #[tokio::test]
    async fn test_get_values_retries_only_stale_requests() {
        let mock = Arc::new(MockVehicleServer::new());
        let hardware = bridge(&mock);
        push_event(&hardware, &mock, 2000).await;

        let fresh = GetValueResult {
            request_id: 2,
            status: StatusCode::Ok,
            prop: Some(
                VehiclePropValue::new(PROP, 1)
                    .with_timestamp(5)
                    .with_int32_values(vec![9]),
            ),
        };
        mock.push_get_values_response(Ok(vec![get_result(1, 1000, 1), fresh]));
        mock.push_get_values_response(Ok(vec![get_result(1, 2000, 2)]));
        let (callback, calls) = record_get_results();

        let requests = vec![
            get_request(1),
            GetValueRequest {
                request_id: 2,
                prop: VehiclePropValue::new(PROP, 1),
            },
        ];
        let status = hardware.get_values(callback, requests).await;

        assert_eq!(status, StatusCode::Ok);
        let rpc_ids: Vec<Vec<i64>> = mock
            .get_values_requests()
            .iter()
            .map(|batch| batch.iter().map(|r| r.request_id).collect())
            .collect();
        assert_eq!(rpc_ids, vec![vec![1, 2], vec![1]]);

        let calls = calls.lock();
        assert_eq!(calls.len(), 1);
        let delivered: Vec<(i64, i32)> = calls[0]
            .iter()
            .map(|r| (r.request_id, r.prop.as_ref().unwrap().value.int32_values[0]))
            .collect();
        assert_eq!(delivered, vec![(2, 9), (1, 2)]);
    }

    #[tokio::test]
    async fn test_get_values_keeps_results_sharing_a_request_id() {
        let mock = Arc::new(MockVehicleServer::new());
        let hardware = bridge(&mock);
        mock.push_get_values_response(Ok(vec![
            get_result(1, 10, 1),
            GetValueResult {
                request_id: 1,
                status: StatusCode::NotAvailable,
                prop: None,
            },
        ]));
        let (callback, calls) = record_get_results();

        let status = hardware
            .get_values(callback, vec![get_request(1), get_request(1)])
            .await;

        assert_eq!(status, StatusCode::Ok);
        assert_eq!(calls.lock()[0].len(), 2);
    }

    #[tokio::test]
    async fn test_zero_attempts_still_makes_one_call() {
        let mock = Arc::new(MockVehicleServer::new());
        let options = BridgeOptions {
            max_get_values_attempts: 0,
            ..Default::default()
        };
        let hardware = GrpcVehicleHardware::with_stub(mock.clone(), options);
        mock.push_get_values_response(Ok(vec![get_result(1, 10, 1)]));
        let (callback, calls) = record_get_results();

        let status = hardware.get_values(callback, vec![get_request(1)]).await;

        assert_eq!(status, StatusCode::Ok);
        assert_eq!(mock.get_values_calls(), 1);
        assert_eq!(calls.lock().len(), 1);
        hardware.shutdown().await;
    }

    #[tokio::test]
    async fn test_get_values_gives_up_after_max_attempts() {
        let mock = Arc::new(MockVehicleServer::new());
        let hardware = bridge(&mock);
        push_event(&hardware, &mock, 2000).await;
        mock.respond_to_get_values(|requests| {
            Ok(requests
                .iter()
                .map(|r| get_result(r.request_id, 1000, 0))
                .collect())
        });
        let (callback, calls) = record_get_results();

        let status = hardware.get_values(callback, vec![get_request(1)]).await;

        assert_eq!(status, StatusCode::TryAgain);
        assert_eq!(mock.get_values_calls(), 5);
        assert!(calls.lock().is_empty());
    }

    #[tokio::test]
    async fn test_get_values_keeps_results_without_value() {
        let mock = Arc::new(MockVehicleServer::new());
        let hardware = bridge(&mock);
        mock.push_get_values_response(Ok(vec![
            GetValueResult {
                request_id: 1,
                status: StatusCode::NotAvailable,
                prop: None,
            },
            get_result(99, 1, 0),
        ]));
        let (callback, calls) = record_get_results();

        let status = hardware.get_values(callback, vec![get_request(1)]).await;

        assert_eq!(status, StatusCode::Ok);
        let calls = calls.lock();
        assert_eq!(calls[0].len(), 1, "unknown request id must be ignored");
        assert_eq!(calls[0][0].status, StatusCode::NotAvailable);
    }

    #[tokio::test]
    async fn test_get_values_transport_failure() {
        let mock = Arc::new(MockVehicleServer::new());
        let hardware = bridge(&mock);
        mock.push_get_values_response(Err(RpcStatus::unavailable("down")));
        let (callback, calls) = record_get_results();

        let status = hardware.get_values(callback, vec![get_request(1)]).await;

        assert_eq!(status, StatusCode::InternalError);
        assert!(calls.lock().is_empty());
    }

    #[tokio::test]
    async fn test_set_values_invokes_callback_once() {
        let mock = Arc::new(MockVehicleServer::new());
        let hardware = bridge(&mock);
        mock.push_set_values_response(Ok(vec![
            SetValueResult {
                request_id: 1,
                status: StatusCode::Ok,
            },
            SetValueResult {
                request_id: 2,
                status: StatusCode::AccessDenied,
            },
        ]));
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let callback: SetValuesCallback = Arc::new(move |results: Vec<SetValueResult>| {
            assert_eq!(results.len(), 2);
            counter.fetch_add(1, Ordering::SeqCst);
        });

        let requests = vec![
            SetValueRequest {
                request_id: 1,
                value: VehiclePropValue::new(PROP, 0),
            },
            SetValueRequest {
                request_id: 2,
                value: VehiclePropValue::new(PROP, 1),
            },
        ];
        let status = hardware.set_values(callback, requests).await;

        assert_eq!(status, StatusCode::Ok);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_set_values_unimplemented_is_an_error() {
        let mock = Arc::new(MockVehicleServer::new());
        let hardware = bridge(&mock);
        mock.push_set_values_response(Err(RpcStatus::unimplemented("")));
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let callback: SetValuesCallback = Arc::new(move |_: Vec<SetValueResult>| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        let status = hardware.set_values(callback, Vec::new()).await;

        assert_eq!(status, StatusCode::InternalError);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_subscribe_forwards_options() {
        let mock = Arc::new(MockVehicleServer::new());
        let hardware = bridge(&mock);
        let options = SubscribeOptions {
            prop_id: 1,
            area_ids: vec![1, 2, 3, 4],
            sample_rate: 1.234,
            resolution: 0.01,
            enable_variable_update_rate: true,
        };

        assert_eq!(hardware.subscribe(options.clone()).await, StatusCode::Ok);
        assert_eq!(mock.subscribe_requests(), vec![options]);
    }

    #[tokio::test]
    async fn test_subscribe_legacy_server() {
        let mock = Arc::new(MockVehicleServer::new());
        let hardware = bridge(&mock);
        mock.push_subscribe_response(Err(RpcStatus::unimplemented("")));
        mock.push_unsubscribe_response(Err(RpcStatus::unimplemented("")));

        assert_eq!(
            hardware.subscribe(SubscribeOptions::default()).await,
            StatusCode::Ok
        );
        assert_eq!(hardware.unsubscribe(1, 2).await, StatusCode::Ok);
        assert_eq!(mock.unsubscribe_requests(), vec![(1, 2)]);
    }

    #[tokio::test]
    async fn test_subscribe_transport_failure() {
        let mock = Arc::new(MockVehicleServer::new());
        let hardware = bridge(&mock);
        mock.push_subscribe_response(Err(RpcStatus::internal("GRPC Error")));
        mock.push_unsubscribe_response(Err(RpcStatus::internal("GRPC Error")));

        assert_eq!(
            hardware.subscribe(SubscribeOptions::default()).await,
            StatusCode::InternalError
        );
        assert_eq!(hardware.unsubscribe(1, 2).await, StatusCode::InternalError);
    }

    #[tokio::test]
    async fn test_remote_status_passes_through() {
        let mock = Arc::new(MockVehicleServer::new());
        let hardware = bridge(&mock);
        mock.push_subscribe_response(Ok(StatusCode::NotAvailableSpeedLow));
        mock.push_unsubscribe_response(Ok(StatusCode::NotAvailableSpeedLow));
        mock.push_update_sample_rate_response(Ok(StatusCode::InvalidArg));

        assert_eq!(
            hardware.subscribe(SubscribeOptions::default()).await,
            StatusCode::NotAvailableSpeedLow
        );
        assert_eq!(
            hardware.unsubscribe(1, 2).await,
            StatusCode::NotAvailableSpeedLow
        );
        assert_eq!(
            hardware.update_sample_rate(1, 0, 10.0).await,
            StatusCode::InvalidArg
        );
        assert_eq!(mock.sample_rate_requests(), vec![(1, 0, 10.0)]);
    }

    #[tokio::test]
    async fn test_update_sample_rate_unimplemented_is_an_error() {
        let mock = Arc::new(MockVehicleServer::new());
        let hardware = bridge(&mock);
        mock.push_update_sample_rate_response(Err(RpcStatus::unimplemented("")));

        assert_eq!(
            hardware.update_sample_rate(1, 0, 10.0).await,
            StatusCode::InternalError
        );
    }

    #[tokio::test]
    async fn test_dump_and_health_failures_use_defaults() {
        let mock = Arc::new(MockVehicleServer::new());
        let hardware = bridge(&mock);
        mock.push_dump_response(Err(RpcStatus::unavailable("down")));
        mock.push_check_health_response(Err(RpcStatus::unavailable("down")));

        assert_eq!(hardware.dump(&["--list".to_string()]).await, DumpResult::default());
        assert_eq!(hardware.check_health().await, StatusCode::InternalError);
        assert_eq!(mock.dump_requests(), vec![vec!["--list".to_string()]]);
    }

    #[tokio::test]
    async fn test_property_configs_failure_is_empty() {
        let mock = Arc::new(MockVehicleServer::new());
        let hardware = bridge(&mock);
        mock.push_property_configs_response(Err(RpcStatus::unavailable("down")));

        assert!(hardware.get_all_property_configs().await.is_empty());
    }

    #[tokio::test]
    async fn test_second_registration_is_ignored() {
        let mock = Arc::new(MockVehicleServer::new());
        let hardware = bridge(&mock);
        let first = record_events(&hardware);
        let second = record_events(&hardware);

        push_event(&hardware, &mock, 1).await;

        assert_eq!(first.lock().len(), 1);
        assert!(second.lock().is_empty());
    }

    #[tokio::test]
    async fn test_shutdown_with_blocked_stream() {
        let mock = Arc::new(MockVehicleServer::new());
        let sender = mock.open_value_stream();
        let hardware = GrpcVehicleHardware::with_stub(mock.clone(), BridgeOptions::default());
        let events = record_events(&hardware);

        sender
            .send(Ok(vec![VehiclePropValue::new(PROP, 0).with_timestamp(1)]))
            .unwrap();
        for _ in 0..100 {
            if !events.lock().is_empty() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        assert_eq!(events.lock().len(), 1);

        tokio::time::timeout(Duration::from_secs(1), hardware.shutdown())
            .await
            .expect("shutdown must not hang on an open stream");

        let _ = sender.send(Ok(vec![VehiclePropValue::new(PROP, 0).with_timestamp(2)]));
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(events.lock().len(), 1, "no callback after shutdown");
    }

    #[tokio::test]
    async fn test_drop_stops_the_stream_task() {
        let mock = Arc::new(MockVehicleServer::new());
        let sender = mock.open_value_stream();
        let hardware = GrpcVehicleHardware::with_stub(mock.clone(), BridgeOptions::default());
        let events = record_events(&hardware);

        sender
            .send(Ok(vec![VehiclePropValue::new(PROP, 0).with_timestamp(1)]))
            .unwrap();
        for _ in 0..100 {
            if !events.lock().is_empty() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        assert_eq!(events.lock().len(), 1);

        drop(hardware);
        let _ = sender.send(Ok(vec![VehiclePropValue::new(PROP, 0).with_timestamp(2)]));
        tokio::time::sleep(Duration::from_millis(20)).await;

        assert!(sender.is_closed(), "stream must be dropped with the bridge");
        assert_eq!(events.lock().len(), 1, "no callback after drop");
    }
}
