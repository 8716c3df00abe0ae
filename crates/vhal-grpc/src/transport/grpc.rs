//! gRPC stub backed by a tonic channel

use std::time::Duration;

use async_trait::async_trait;
use futures::StreamExt;
use tonic::client::Grpc;
use tonic::codec::ProstCodec;
use tonic::codegen::http::uri::PathAndQuery;
use tonic::transport::{Channel, Endpoint};
use tonic::Request;
use tracing::debug;
use vhal_core::{
    DumpResult, GetValueRequest, GetValueResult, SetValueRequest, SetValueResult, StatusCode,
    SubscribeOptions, VehiclePropConfig,
};

use super::proto;
use super::{PropertyValueStream, RpcResult, RpcStatus, VehicleServerStub};
use crate::config::ServerConfig;
use crate::error::BridgeError;

/// Stub calling the remote `VehicleServer` service over a tonic channel.
///
/// The channel connects lazily and reconnects on demand, so construction
/// succeeds even when the server is not up yet.
#[derive(Clone)]
pub struct GrpcVehicleServerStub {
    inner: Grpc<Channel>,
    endpoint: Endpoint,
    address: String,
}

impl GrpcVehicleServerStub {
    /// Create a stub for `config.address` without waiting for the connection
    pub fn connect_lazy(config: &ServerConfig) -> Result<Self, BridgeError> {
        let endpoint = Endpoint::from_shared(config.address.clone())
            .map_err(|e| BridgeError::InvalidAddress {
                address: config.address.clone(),
                reason: e.to_string(),
            })?
            .connect_timeout(config.connect_timeout());

        debug!(address = %config.address, "Created lazy gRPC channel");

        Ok(Self {
            inner: Grpc::new(endpoint.connect_lazy()),
            endpoint,
            address: config.address.clone(),
        })
    }

    /// A ready client handle; cloning the channel is cheap
    async fn client(&self) -> RpcResult<Grpc<Channel>> {
        let mut client = self.inner.clone();
        client
            .ready()
            .await
            .map_err(|e| RpcStatus::unavailable(format!("Service was not ready: {}", e)))?;
        Ok(client)
    }

    async fn unary<Req, Resp>(&self, path: &'static str, request: Req) -> RpcResult<Resp>
    where
        Req: prost::Message + Send + Sync + 'static,
        Resp: prost::Message + Default + Send + Sync + 'static,
    {
        let mut client = self.client().await?;
        let codec: ProstCodec<Req, Resp> = ProstCodec::default();
        let response = client
            .unary(Request::new(request), PathAndQuery::from_static(path), codec)
            .await?;
        Ok(response.into_inner())
    }

    async fn server_streaming<Req, Resp>(
        &self,
        path: &'static str,
        request: Req,
    ) -> RpcResult<tonic::codec::Streaming<Resp>>
    where
        Req: prost::Message + Send + Sync + 'static,
        Resp: prost::Message + Default + Send + Sync + 'static,
    {
        let mut client = self.client().await?;
        let codec: ProstCodec<Req, Resp> = ProstCodec::default();
        let response = client
            .server_streaming(Request::new(request), PathAndQuery::from_static(path), codec)
            .await?;
        Ok(response.into_inner())
    }
}

macro_rules! method {
    ($name:literal) => {
        concat!(
            "/android.hardware.automotive.vehicle.proto.VehicleServer/",
            $name
        )
    };
}

#[async_trait]
impl VehicleServerStub for GrpcVehicleServerStub {
    async fn get_all_property_config(&self) -> RpcResult<Vec<VehiclePropConfig>> {
        let mut stream = self
            .server_streaming::<(), proto::VehiclePropConfig>(
                method!("GetAllPropertyConfig"),
                (),
            )
            .await?;

        let mut configs = Vec::new();
        while let Some(config) = stream.message().await? {
            configs.push(config.into());
        }
        Ok(configs)
    }

    async fn set_values(&self, requests: Vec<SetValueRequest>) -> RpcResult<Vec<SetValueResult>> {
        let request = proto::VehiclePropValueRequests::from(requests.as_slice());
        let results: proto::SetValueResults = self.unary(method!("SetValues"), request).await?;
        Ok(results.results.into_iter().map(Into::into).collect())
    }

    async fn get_values(&self, requests: Vec<GetValueRequest>) -> RpcResult<Vec<GetValueResult>> {
        let request = proto::VehiclePropValueRequests::from(requests.as_slice());
        let results: proto::GetValueResults = self.unary(method!("GetValues"), request).await?;
        Ok(results.results.into_iter().map(Into::into).collect())
    }

    async fn dump(&self, options: Vec<String>) -> RpcResult<DumpResult> {
        let request = proto::DumpOptions { options };
        let result: proto::DumpResult = self.unary(method!("Dump"), request).await?;
        Ok(result.into())
    }

    async fn check_health(&self) -> RpcResult<StatusCode> {
        let status: proto::VehicleHalCallStatus =
            self.unary(method!("CheckHealth"), ()).await?;
        Ok(StatusCode::from_wire(status.status_code))
    }

    async fn subscribe(&self, options: SubscribeOptions) -> RpcResult<StatusCode> {
        let request = proto::SubscribeRequest {
            options: Some((&options).into()),
        };
        let status: proto::VehicleHalCallStatus =
            self.unary(method!("Subscribe"), request).await?;
        Ok(StatusCode::from_wire(status.status_code))
    }

    async fn unsubscribe(&self, prop_id: i32, area_id: i32) -> RpcResult<StatusCode> {
        let request = proto::UnsubscribeRequest { prop_id, area_id };
        let status: proto::VehicleHalCallStatus =
            self.unary(method!("Unsubscribe"), request).await?;
        Ok(StatusCode::from_wire(status.status_code))
    }

    async fn update_sample_rate(
        &self,
        prop_id: i32,
        area_id: i32,
        sample_rate: f32,
    ) -> RpcResult<StatusCode> {
        let request = proto::UpdateSampleRateRequest {
            prop: prop_id,
            area_id,
            sample_rate,
        };
        let status: proto::VehicleHalCallStatus =
            self.unary(method!("UpdateSampleRate"), request).await?;
        Ok(StatusCode::from_wire(status.status_code))
    }

    async fn start_property_values_stream(&self) -> RpcResult<PropertyValueStream> {
        let stream = self
            .server_streaming::<(), proto::VehiclePropValues>(
                method!("StartPropertyValuesStream"),
                (),
            )
            .await?;

        Ok(stream
            .map(|batch| batch.map(Into::into).map_err(RpcStatus::from))
            .boxed())
    }

    async fn wait_for_ready(&self, timeout: Duration) -> bool {
        // A lazy channel reports ready before it has connected, so probe
        // the endpoint with a dedicated connection.
        match tokio::time::timeout(timeout, self.endpoint.connect()).await {
            Ok(Ok(_)) => true,
            Ok(Err(e)) => {
                debug!(address = %self.address, error = %e, "Vehicle server not reachable");
                false
            }
            Err(_) => false,
        }
    }
}
