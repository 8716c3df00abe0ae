//! Mock vehicle server stub for testing
//!
//! Without scripting, the mock behaves like a small in-memory vehicle server:
//! set values are stored, echoed on every open value stream, and returned by
//! later gets. Scripted responses take precedence, in FIFO order per method.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use futures::StreamExt;
use parking_lot::{Mutex, RwLock};
use tokio::sync::mpsc;
use tokio_stream::wrappers::UnboundedReceiverStream;
use vhal_core::{
    DumpResult, GetValueRequest, GetValueResult, PropIdAreaId, SetValueRequest, SetValueResult,
    StatusCode, SubscribeOptions, VehiclePropConfig, VehiclePropValue,
};

use super::{PropertyValueStream, RpcResult, RpcStatus, VehicleServerStub};

/// Sender half of a mock property value stream
pub type ValueStreamSender = mpsc::UnboundedSender<RpcResult<Vec<VehiclePropValue>>>;

type GetValuesResponder = Box<dyn Fn(&[GetValueRequest]) -> RpcResult<Vec<GetValueResult>> + Send + Sync>;

/// Mock vehicle server stub
pub struct MockVehicleServer {
    connected: AtomicBool,
    configs: RwLock<Vec<VehiclePropConfig>>,
    values: RwLock<HashMap<PropIdAreaId, VehiclePropValue>>,

    config_script: Mutex<VecDeque<RpcResult<Vec<VehiclePropConfig>>>>,
    get_values_script: Mutex<VecDeque<RpcResult<Vec<GetValueResult>>>>,
    get_values_responder: RwLock<Option<GetValuesResponder>>,
    set_values_script: Mutex<VecDeque<RpcResult<Vec<SetValueResult>>>>,
    dump_script: Mutex<VecDeque<RpcResult<DumpResult>>>,
    check_health_script: Mutex<VecDeque<RpcResult<StatusCode>>>,
    subscribe_script: Mutex<VecDeque<RpcResult<StatusCode>>>,
    unsubscribe_script: Mutex<VecDeque<RpcResult<StatusCode>>>,
    update_sample_rate_script: Mutex<VecDeque<RpcResult<StatusCode>>>,

    /// Streams handed out by the next stream starts
    stream_script: Mutex<VecDeque<RpcResult<PropertyValueStream>>>,
    /// Senders of unscripted streams, fed by `inject_values`
    live_streams: Mutex<Vec<ValueStreamSender>>,

    get_values_requests: Mutex<Vec<Vec<GetValueRequest>>>,
    set_values_requests: Mutex<Vec<Vec<SetValueRequest>>>,
    subscribe_requests: Mutex<Vec<SubscribeOptions>>,
    unsubscribe_requests: Mutex<Vec<(i32, i32)>>,
    sample_rate_requests: Mutex<Vec<(i32, i32, f32)>>,
    dump_requests: Mutex<Vec<Vec<String>>>,
    stream_starts: AtomicUsize,
}

impl Default for MockVehicleServer {
    fn default() -> Self {
        Self::new()
    }
}

impl MockVehicleServer {
    pub fn new() -> Self {
        Self {
            connected: AtomicBool::new(true),
            configs: RwLock::new(Vec::new()),
            values: RwLock::new(HashMap::new()),
            config_script: Mutex::new(VecDeque::new()),
            get_values_script: Mutex::new(VecDeque::new()),
            get_values_responder: RwLock::new(None),
            set_values_script: Mutex::new(VecDeque::new()),
            dump_script: Mutex::new(VecDeque::new()),
            check_health_script: Mutex::new(VecDeque::new()),
            subscribe_script: Mutex::new(VecDeque::new()),
            unsubscribe_script: Mutex::new(VecDeque::new()),
            update_sample_rate_script: Mutex::new(VecDeque::new()),
            stream_script: Mutex::new(VecDeque::new()),
            live_streams: Mutex::new(Vec::new()),
            get_values_requests: Mutex::new(Vec::new()),
            set_values_requests: Mutex::new(Vec::new()),
            subscribe_requests: Mutex::new(Vec::new()),
            unsubscribe_requests: Mutex::new(Vec::new()),
            sample_rate_requests: Mutex::new(Vec::new()),
            dump_requests: Mutex::new(Vec::new()),
            stream_starts: AtomicUsize::new(0),
        }
    }

    /// Create a mock serving `configs` with one stored value per config area
    pub fn with_configs(configs: Vec<VehiclePropConfig>) -> Self {
        let mock = Self::new();
        {
            let mut values = mock.values.write();
            for config in &configs {
                let areas: Vec<i32> = if config.area_configs.is_empty() {
                    vec![0]
                } else {
                    config.area_configs.iter().map(|a| a.area_id).collect()
                };
                for area_id in areas {
                    let value = VehiclePropValue::new(config.prop, area_id);
                    values.insert(value.key(), value);
                }
            }
        }
        *mock.configs.write() = configs;
        mock
    }

    // =========================================================================
    // Scripting
    // =========================================================================

    pub fn push_property_configs_response(&self, response: RpcResult<Vec<VehiclePropConfig>>) {
        self.config_script.lock().push_back(response);
    }

    pub fn push_get_values_response(&self, response: RpcResult<Vec<GetValueResult>>) {
        self.get_values_script.lock().push_back(response);
    }

    /// Answer every unscripted `get_values` call with `responder`
    pub fn respond_to_get_values<F>(&self, responder: F)
    where
        F: Fn(&[GetValueRequest]) -> RpcResult<Vec<GetValueResult>> + Send + Sync + 'static,
    {
        *self.get_values_responder.write() = Some(Box::new(responder));
    }

    pub fn push_set_values_response(&self, response: RpcResult<Vec<SetValueResult>>) {
        self.set_values_script.lock().push_back(response);
    }

    pub fn push_dump_response(&self, response: RpcResult<DumpResult>) {
        self.dump_script.lock().push_back(response);
    }

    pub fn push_check_health_response(&self, response: RpcResult<StatusCode>) {
        self.check_health_script.lock().push_back(response);
    }

    pub fn push_subscribe_response(&self, response: RpcResult<StatusCode>) {
        self.subscribe_script.lock().push_back(response);
    }

    pub fn push_unsubscribe_response(&self, response: RpcResult<StatusCode>) {
        self.unsubscribe_script.lock().push_back(response);
    }

    pub fn push_update_sample_rate_response(&self, response: RpcResult<StatusCode>) {
        self.update_sample_rate_script.lock().push_back(response);
    }

    /// Queue a stream for the next stream start and return its sender.
    ///
    /// The stream stays open until the sender is dropped.
    pub fn open_value_stream(&self) -> ValueStreamSender {
        let (tx, rx) = mpsc::unbounded_channel();
        self.stream_script
            .lock()
            .push_back(Ok(UnboundedReceiverStream::new(rx).boxed()));
        tx
    }

    /// Queue a finite stream delivering `batches`, then closing
    pub fn queue_value_batches(&self, batches: Vec<Vec<VehiclePropValue>>) {
        let stream = futures::stream::iter(batches.into_iter().map(Ok)).boxed();
        self.stream_script.lock().push_back(Ok(stream));
    }

    /// Make the next stream start fail with `status`
    pub fn fail_next_stream_start(&self, status: RpcStatus) {
        self.stream_script.lock().push_back(Err(status));
    }

    /// Push a batch to every unscripted stream that is still open
    pub fn inject_values(&self, values: Vec<VehiclePropValue>) {
        {
            let mut stored = self.values.write();
            for value in &values {
                stored.insert(value.key(), value.clone());
            }
        }
        self.live_streams
            .lock()
            .retain(|tx| tx.send(Ok(values.clone())).is_ok());
    }

    /// Set connection state reported by `wait_for_ready`
    pub fn set_connected(&self, connected: bool) {
        self.connected.store(connected, Ordering::SeqCst);
    }

    // =========================================================================
    // Inspection
    // =========================================================================

    pub fn get_values_requests(&self) -> Vec<Vec<GetValueRequest>> {
        self.get_values_requests.lock().clone()
    }

    pub fn get_values_calls(&self) -> usize {
        self.get_values_requests.lock().len()
    }

    pub fn set_values_requests(&self) -> Vec<Vec<SetValueRequest>> {
        self.set_values_requests.lock().clone()
    }

    pub fn subscribe_requests(&self) -> Vec<SubscribeOptions> {
        self.subscribe_requests.lock().clone()
    }

    pub fn unsubscribe_requests(&self) -> Vec<(i32, i32)> {
        self.unsubscribe_requests.lock().clone()
    }

    pub fn sample_rate_requests(&self) -> Vec<(i32, i32, f32)> {
        self.sample_rate_requests.lock().clone()
    }

    pub fn dump_requests(&self) -> Vec<Vec<String>> {
        self.dump_requests.lock().clone()
    }

    pub fn stream_starts(&self) -> usize {
        self.stream_starts.load(Ordering::SeqCst)
    }

    // =========================================================================
    // Unscripted behavior
    // =========================================================================

    fn default_get_values(&self, requests: &[GetValueRequest]) -> Vec<GetValueResult> {
        let values = self.values.read();
        requests
            .iter()
            .map(|request| match values.get(&request.prop.key()) {
                Some(value) => GetValueResult {
                    request_id: request.request_id,
                    status: StatusCode::Ok,
                    prop: Some(value.clone()),
                },
                None => GetValueResult {
                    request_id: request.request_id,
                    status: StatusCode::NotAvailable,
                    prop: None,
                },
            })
            .collect()
    }

    fn default_set_values(&self, requests: &[SetValueRequest]) -> Vec<SetValueResult> {
        let values: Vec<VehiclePropValue> = requests.iter().map(|r| r.value.clone()).collect();
        if !values.is_empty() {
            self.inject_values(values);
        }
        requests
            .iter()
            .map(|request| SetValueResult {
                request_id: request.request_id,
                status: StatusCode::Ok,
            })
            .collect()
    }
}

fn next_scripted<T>(script: &Mutex<VecDeque<RpcResult<T>>>) -> Option<RpcResult<T>> {
    script.lock().pop_front()
}

#[async_trait]
impl VehicleServerStub for MockVehicleServer {
    async fn get_all_property_config(&self) -> RpcResult<Vec<VehiclePropConfig>> {
        next_scripted(&self.config_script).unwrap_or_else(|| Ok(self.configs.read().clone()))
    }

    async fn set_values(&self, requests: Vec<SetValueRequest>) -> RpcResult<Vec<SetValueResult>> {
        self.set_values_requests.lock().push(requests.clone());
        next_scripted(&self.set_values_script)
            .unwrap_or_else(|| Ok(self.default_set_values(&requests)))
    }

    async fn get_values(&self, requests: Vec<GetValueRequest>) -> RpcResult<Vec<GetValueResult>> {
        self.get_values_requests.lock().push(requests.clone());
        if let Some(response) = next_scripted(&self.get_values_script) {
            return response;
        }
        if let Some(responder) = self.get_values_responder.read().as_ref() {
            return responder(&requests);
        }
        Ok(self.default_get_values(&requests))
    }

    async fn dump(&self, options: Vec<String>) -> RpcResult<DumpResult> {
        self.dump_requests.lock().push(options);
        next_scripted(&self.dump_script).unwrap_or_else(|| {
            Ok(DumpResult {
                caller_should_dump_state: true,
                buffer: format!("mock vehicle server: {} values\n", self.values.read().len()),
                refresh_property_configs: false,
            })
        })
    }

    async fn check_health(&self) -> RpcResult<StatusCode> {
        next_scripted(&self.check_health_script).unwrap_or(Ok(StatusCode::Ok))
    }

    async fn subscribe(&self, options: SubscribeOptions) -> RpcResult<StatusCode> {
        self.subscribe_requests.lock().push(options);
        next_scripted(&self.subscribe_script).unwrap_or(Ok(StatusCode::Ok))
    }

    async fn unsubscribe(&self, prop_id: i32, area_id: i32) -> RpcResult<StatusCode> {
        self.unsubscribe_requests.lock().push((prop_id, area_id));
        next_scripted(&self.unsubscribe_script).unwrap_or(Ok(StatusCode::Ok))
    }

    async fn update_sample_rate(
        &self,
        prop_id: i32,
        area_id: i32,
        sample_rate: f32,
    ) -> RpcResult<StatusCode> {
        self.sample_rate_requests
            .lock()
            .push((prop_id, area_id, sample_rate));
        next_scripted(&self.update_sample_rate_script).unwrap_or(Ok(StatusCode::Ok))
    }

    async fn start_property_values_stream(&self) -> RpcResult<PropertyValueStream> {
        self.stream_starts.fetch_add(1, Ordering::SeqCst);
        if let Some(scripted) = next_scripted(&self.stream_script) {
            return scripted;
        }

        let (tx, rx) = mpsc::unbounded_channel();
        self.live_streams.lock().push(tx);
        tracing::debug!("Mock server: opened live value stream");
        Ok(UnboundedReceiverStream::new(rx).boxed())
    }

    async fn wait_for_ready(&self, _timeout: Duration) -> bool {
        self.connected.load(Ordering::SeqCst)
    }
}
