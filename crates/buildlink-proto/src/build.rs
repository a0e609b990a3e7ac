//! Build configuration and build-control payloads.

use std::fmt;

use buildlink_msgpack::Value;
use buildlink_rpc::{
    check_arity, parse_args, parse_bool, parse_object, parse_optional_string, parse_string,
    parse_uint64, parse_unknown, DecodeError, DecodePayload, EncodePayload, Path,
};

/// An SDK variant name. Encoded on the wire as a bare string rather than
/// an argument array.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SdkVariant {
    pub raw_value: String,
}

impl DecodePayload for SdkVariant {
    fn decode(values: &[Value], path: &Path) -> Result<Self, DecodeError> {
        Ok(Self {
            raw_value: parse_string(values, path)?,
        })
    }
}

impl EncodePayload for SdkVariant {
    fn encode(&self) -> Value {
        Value::from(self.raw_value.as_str())
    }
}

impl fmt::Display for SdkVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw_value)
    }
}

/// Where the build's products are meant to run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunDestinationInfo {
    pub platform: String,
    pub sdk: String,
    pub sdk_variant: SdkVariant,
    pub target_architecture: String,
}

impl DecodePayload for RunDestinationInfo {
    fn decode(values: &[Value], path: &Path) -> Result<Self, DecodeError> {
        let args = parse_args(values, path)?;
        check_arity(args, 4, path)?;

        Ok(Self {
            platform: parse_string(args, &path.child(0))?,
            sdk: parse_string(args, &path.child(1))?,
            sdk_variant: parse_object(args, &path.child(2))?,
            target_architecture: parse_string(args, &path.child(3))?,
        })
    }
}

impl EncodePayload for RunDestinationInfo {
    fn encode(&self) -> Value {
        Value::Array(vec![
            Value::from(self.platform.as_str()),
            Value::from(self.sdk.as_str()),
            self.sdk_variant.encode(),
            Value::from(self.target_architecture.as_str()),
        ])
    }
}

/// Filesystem layout for one build arena.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArenaInfo {
    pub derived_data_path: String,
    pub build_products_path: String,
    pub build_intermediates_path: String,
    pub pch_path: String,
    pub index_data_store_path: Option<String>,
    pub index_enable_data_store: bool,
}

impl DecodePayload for ArenaInfo {
    fn decode(values: &[Value], path: &Path) -> Result<Self, DecodeError> {
        let args = parse_args(values, path)?;
        check_arity(args, 6, path)?;

        Ok(Self {
            derived_data_path: parse_string(args, &path.child(0))?,
            build_products_path: parse_string(args, &path.child(1))?,
            build_intermediates_path: parse_string(args, &path.child(2))?,
            pch_path: parse_string(args, &path.child(3))?,
            index_data_store_path: parse_optional_string(args, &path.child(4))?,
            index_enable_data_store: parse_bool(args, &path.child(5))?,
        })
    }
}

impl EncodePayload for ArenaInfo {
    fn encode(&self) -> Value {
        Value::Array(vec![
            Value::from(self.derived_data_path.as_str()),
            Value::from(self.build_products_path.as_str()),
            Value::from(self.build_intermediates_path.as_str()),
            Value::from(self.pch_path.as_str()),
            Value::from(self.index_data_store_path.clone()),
            Value::Bool(self.index_enable_data_store),
        ])
    }
}

/// Build-setting override tables. Their contents are consumed downstream
/// of this protocol layer, so each table passes through untyped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettingsOverrides {
    pub synthesized: Value,
    pub command_line: Value,
    pub environment: Value,
}

impl DecodePayload for SettingsOverrides {
    fn decode(values: &[Value], path: &Path) -> Result<Self, DecodeError> {
        let args = parse_args(values, path)?;
        check_arity(args, 3, path)?;

        Ok(Self {
            synthesized: parse_unknown(args, &path.child(0))?,
            command_line: parse_unknown(args, &path.child(1))?,
            environment: parse_unknown(args, &path.child(2))?,
        })
    }
}

impl EncodePayload for SettingsOverrides {
    fn encode(&self) -> Value {
        Value::Array(vec![
            self.synthesized.clone(),
            self.command_line.clone(),
            self.environment.clone(),
        ])
    }
}

/// Everything that parameterizes one build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildParameters {
    /// e.g. "build", "clean"
    pub action: String,
    /// e.g. "Debug", "Release"
    pub configuration: String,
    pub active_run_destination: RunDestinationInfo,
    /// e.g. "x86_64", "arm64"
    pub active_architecture: String,
    pub arena_info: ArenaInfo,
    pub overrides: SettingsOverrides,
    /// Service-internal parameters, opaque to this layer.
    pub service_parameters: Value,
}

impl DecodePayload for BuildParameters {
    fn decode(values: &[Value], path: &Path) -> Result<Self, DecodeError> {
        let args = parse_args(values, path)?;
        check_arity(args, 7, path)?;

        Ok(Self {
            action: parse_string(args, &path.child(0))?,
            configuration: parse_string(args, &path.child(1))?,
            active_run_destination: parse_object(args, &path.child(2))?,
            active_architecture: parse_string(args, &path.child(3))?,
            arena_info: parse_object(args, &path.child(4))?,
            overrides: parse_object(args, &path.child(5))?,
            service_parameters: parse_unknown(args, &path.child(6))?,
        })
    }
}

impl EncodePayload for BuildParameters {
    fn encode(&self) -> Value {
        Value::Array(vec![
            Value::from(self.action.as_str()),
            Value::from(self.configuration.as_str()),
            self.active_run_destination.encode(),
            Value::from(self.active_architecture.as_str()),
            self.arena_info.encode(),
            self.overrides.encode(),
            self.service_parameters.clone(),
        ])
    }
}

/// The full description of a requested build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildRequest {
    pub parameters: BuildParameters,
    /// Target list, opaque to this layer.
    pub configured_targets: Value,
    pub continue_building_after_errors: bool,
    pub use_parallel_targets: bool,
    pub use_implicit_dependencies: bool,
}

impl DecodePayload for BuildRequest {
    fn decode(values: &[Value], path: &Path) -> Result<Self, DecodeError> {
        let args = parse_args(values, path)?;
        check_arity(args, 5, path)?;

        Ok(Self {
            parameters: parse_object(args, &path.child(0))?,
            configured_targets: parse_unknown(args, &path.child(1))?,
            continue_building_after_errors: parse_bool(args, &path.child(2))?,
            use_parallel_targets: parse_bool(args, &path.child(3))?,
            use_implicit_dependencies: parse_bool(args, &path.child(4))?,
        })
    }
}

impl EncodePayload for BuildRequest {
    fn encode(&self) -> Value {
        Value::Array(vec![
            self.parameters.encode(),
            self.configured_targets.clone(),
            Value::Bool(self.continue_building_after_errors),
            Value::Bool(self.use_parallel_targets),
            Value::Bool(self.use_implicit_dependencies),
        ])
    }
}

/// Registers a build for a session.
///
/// The current shape carries a dedicated response channel at element 1;
/// the V1 catalog predates it and decodes via [`CreateBuildRequest::decode_legacy`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateBuildRequest {
    pub session_handle: String,
    pub response_channel: Option<u64>,
    pub build_request: BuildRequest,
    pub only_create_build_description: bool,
}

impl DecodePayload for CreateBuildRequest {
    fn decode(values: &[Value], path: &Path) -> Result<Self, DecodeError> {
        let args = parse_args(values, path)?;
        check_arity(args, 4, path)?;

        Ok(Self {
            session_handle: parse_string(args, &path.child(0))?,
            response_channel: Some(parse_uint64(args, &path.child(1))?),
            build_request: parse_object(args, &path.child(2))?,
            only_create_build_description: parse_bool(args, &path.child(3))?,
        })
    }
}

impl CreateBuildRequest {
    /// The V1 shape, without the response channel element.
    pub(crate) fn decode_legacy(values: &[Value], path: &Path) -> Result<Self, DecodeError> {
        let args = parse_args(values, path)?;
        check_arity(args, 3, path)?;

        Ok(Self {
            session_handle: parse_string(args, &path.child(0))?,
            response_channel: None,
            build_request: parse_object(args, &path.child(1))?,
            only_create_build_description: parse_bool(args, &path.child(2))?,
        })
    }
}

impl EncodePayload for CreateBuildRequest {
    fn encode(&self) -> Value {
        let mut fields = vec![Value::from(self.session_handle.as_str())];
        if let Some(channel) = self.response_channel {
            fields.push(Value::Uint(channel));
        }
        fields.push(self.build_request.encode());
        fields.push(Value::Bool(self.only_create_build_description));
        Value::Array(fields)
    }
}

/// Starts a previously created build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildStartRequest {
    pub session_handle: String,
    pub build_number: u64,
}

impl DecodePayload for BuildStartRequest {
    fn decode(values: &[Value], path: &Path) -> Result<Self, DecodeError> {
        let args = parse_args(values, path)?;
        check_arity(args, 2, path)?;

        Ok(Self {
            session_handle: parse_string(args, &path.child(0))?,
            build_number: parse_uint64(args, &path.child(1))?,
        })
    }
}

impl EncodePayload for BuildStartRequest {
    fn encode(&self) -> Value {
        Value::Array(vec![
            Value::from(self.session_handle.as_str()),
            Value::Uint(self.build_number),
        ])
    }
}

/// Cancels a running build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildCancelRequest {
    pub session_handle: String,
    pub build_number: u64,
}

impl DecodePayload for BuildCancelRequest {
    fn decode(values: &[Value], path: &Path) -> Result<Self, DecodeError> {
        let args = parse_args(values, path)?;
        check_arity(args, 2, path)?;

        Ok(Self {
            session_handle: parse_string(args, &path.child(0))?,
            build_number: parse_uint64(args, &path.child(1))?,
        })
    }
}

impl EncodePayload for BuildCancelRequest {
    fn encode(&self) -> Value {
        Value::Array(vec![
            Value::from(self.session_handle.as_str()),
            Value::Uint(self.build_number),
        ])
    }
}

/// Asks for indexing data; the answer arrives on a dedicated channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexingInfoRequest {
    pub session_handle: String,
    pub response_channel: u64,
    /// Request details, opaque to this layer.
    pub request: Value,
}

impl DecodePayload for IndexingInfoRequest {
    fn decode(values: &[Value], path: &Path) -> Result<Self, DecodeError> {
        let args = parse_args(values, path)?;
        check_arity(args, 3, path)?;

        Ok(Self {
            session_handle: parse_string(args, &path.child(0))?,
            response_channel: parse_uint64(args, &path.child(1))?,
            request: parse_unknown(args, &path.child(2))?,
        })
    }
}

impl EncodePayload for IndexingInfoRequest {
    fn encode(&self) -> Value {
        Value::Array(vec![
            Value::from(self.session_handle.as_str()),
            Value::Uint(self.response_channel),
            self.request.clone(),
        ])
    }
}

/// Asks for preview build info; the answer arrives on a dedicated channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewInfoRequest {
    pub session_handle: String,
    pub response_channel: u64,
    /// Request details, opaque to this layer.
    pub request: Value,
}

impl DecodePayload for PreviewInfoRequest {
    fn decode(values: &[Value], path: &Path) -> Result<Self, DecodeError> {
        let args = parse_args(values, path)?;
        check_arity(args, 3, path)?;

        Ok(Self {
            session_handle: parse_string(args, &path.child(0))?,
            response_channel: parse_uint64(args, &path.child(1))?,
            request: parse_unknown(args, &path.child(2))?,
        })
    }
}

impl EncodePayload for PreviewInfoRequest {
    fn encode(&self) -> Value {
        Value::Array(vec![
            Value::from(self.session_handle.as_str()),
            Value::Uint(self.response_channel),
            self.request.clone(),
        ])
    }
}
