use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::engine::assets::building_registry::BuildingRegistry;
use crate::engine::camera::navigator::{FlyToBuilding, FlyToPart};
use crate::engine::camera::pad::PadMove;
use crate::tools::selection::{ActivePopup, DismissPopup, SelectionState};

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::JsValue;

#[cfg(target_arch = "wasm32")]
use web_sys::{MessageEvent, window};

/// JSON-RPC 2.0 request structure.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RpcRequest {
    pub jsonrpc: String,
    pub method: String,
    pub params: serde_json::Value,
    pub id: Option<serde_json::Value>,
}

/// JSON-RPC 2.0 response structure.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RpcResponse {
    pub jsonrpc: String,
    pub result: Option<serde_json::Value>,
    pub error: Option<RpcError>,
    pub id: Option<serde_json::Value>,
}

/// JSON-RPC 2.0 notification structure for one-way communication.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RpcNotification {
    pub jsonrpc: String,
    pub method: String,
    pub params: serde_json::Value,
}

/// JSON-RPC error structure following specification.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RpcError {
    pub code: i32,
    pub message: String,
    pub data: Option<serde_json::Value>,
}

/// Resource managing bidirectional RPC communication between the embedding
/// page and the viewer. Handles both request-response patterns and
/// notification broadcasting.
#[derive(Resource, Default)]
pub struct WebRpcInterface {
    outgoing_notifications: Vec<RpcNotification>,
    outgoing_responses: Vec<RpcResponse>,
}

impl WebRpcInterface {
    /// Send notification to the embedding page without expecting a response.
    pub fn send_notification(&mut self, method: &str, params: serde_json::Value) {
        self.outgoing_notifications.push(RpcNotification {
            jsonrpc: "2.0".to_string(),
            method: method.to_string(),
            params,
        });
    }

    /// Queue response for transmission to the embedding page.
    fn queue_response(&mut self, response: RpcResponse) {
        self.outgoing_responses.push(response);
    }
}

/// Plugin establishing the RPC communication layer for iframe deployments.
pub struct WebRpcPlugin;

impl Plugin for WebRpcPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<WebRpcInterface>()
            .add_event::<IncomingRpcMessage>()
            .add_systems(
                Update,
                (
                    process_incoming_messages,
                    handle_rpc_messages,
                    notify_popup_changed.run_if(resource_changed::<ActivePopup>),
                    send_outgoing_messages,
                )
                    .chain(),
            );

        #[cfg(target_arch = "wasm32")]
        app.add_systems(Startup, setup_message_listener);
    }
}

#[cfg(target_arch = "wasm32")]
fn setup_message_listener(mut commands: Commands) {
    use std::sync::Arc;
    use std::sync::Mutex;

    // Thread-safe message queue for cross-thread communication.
    let message_queue: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
    let queue_clone = message_queue.clone();

    let closure = Closure::wrap(Box::new(move |event: MessageEvent| {
        // Filter messages to ensure they contain string data.
        if let Ok(data) = event.data().dyn_into::<js_sys::JsString>() {
            let message_str: String = data.into();

            // Attempt JSON parsing to validate RPC format before queuing.
            if message_str.contains("jsonrpc") {
                if let Ok(mut queue) = queue_clone.lock() {
                    queue.push(message_str);
                }
            }
        }
    }) as Box<dyn FnMut(MessageEvent)>);

    if let Some(window) = window() {
        window
            .add_event_listener_with_callback("message", closure.as_ref().unchecked_ref())
            .expect("Failed to register message listener");
    }

    // Prevent closure from being dropped by transferring ownership to JS.
    closure.forget();
    commands.insert_resource(MessageQueue(message_queue));
}

/// Resource wrapping thread-safe message queue for WASM event handling.
#[derive(Resource)]
struct MessageQueue(std::sync::Arc<std::sync::Mutex<Vec<String>>>);

/// Event representing incoming RPC message from the embedding page.
#[derive(Event)]
struct IncomingRpcMessage {
    content: String,
}

fn process_incoming_messages(
    message_queue: Option<Res<MessageQueue>>,
    mut message_events: EventWriter<IncomingRpcMessage>,
) {
    let Some(queue_res) = message_queue else {
        return;
    };

    let messages = if let Ok(mut queue) = queue_res.0.lock() {
        std::mem::take(&mut *queue)
    } else {
        Vec::new()
    };

    for message_str in messages {
        message_events.write(IncomingRpcMessage {
            content: message_str,
        });
    }
}

fn handle_rpc_messages(
    mut events: EventReader<IncomingRpcMessage>,
    registry: Res<BuildingRegistry>,
    mut rpc_interface: ResMut<WebRpcInterface>,
    mut fly_building_events: EventWriter<FlyToBuilding>,
    mut fly_part_events: EventWriter<FlyToPart>,
    mut pad_events: EventWriter<PadMove>,
    mut dismiss_events: EventWriter<DismissPopup>,
) {
    for event in events.read() {
        match serde_json::from_str::<RpcRequest>(&event.content) {
            Ok(request) => {
                if let Some(response) = handle_rpc_request(
                    &request,
                    &registry,
                    &mut fly_building_events,
                    &mut fly_part_events,
                    &mut pad_events,
                    &mut dismiss_events,
                ) {
                    rpc_interface.queue_response(response);
                }
            }
            Err(parse_error) => {
                warn!("Discarding malformed RPC message: {parse_error}");
            }
        }
    }
}

/// Handle individual RPC request and generate response based on method.
fn handle_rpc_request(
    request: &RpcRequest,
    registry: &BuildingRegistry,
    fly_building_events: &mut EventWriter<FlyToBuilding>,
    fly_part_events: &mut EventWriter<FlyToPart>,
    pad_events: &mut EventWriter<PadMove>,
    dismiss_events: &mut EventWriter<DismissPopup>,
) -> Option<RpcResponse> {
    // Only generate responses for requests with IDs (notifications have no ID).
    let id = request.id.clone()?;

    let result = match request.method.as_str() {
        "list_buildings" => handle_list_buildings(registry),
        "fly_to_building" => handle_fly_to_building(&request.params, fly_building_events),
        "fly_to_part" => handle_fly_to_part(&request.params, fly_part_events),
        "camera_move" => handle_camera_move(&request.params, pad_events),
        "dismiss_popup" => {
            dismiss_events.write(DismissPopup);
            Ok(serde_json::json!({ "success": true }))
        }
        _ => {
            warn!("Unknown RPC method: {}", request.method);
            return Some(create_error_response(
                id,
                -32601,
                "Method not found",
                Some(serde_json::json!({"method": request.method})),
            ));
        }
    };

    match result {
        Ok(result_value) => Some(RpcResponse {
            jsonrpc: "2.0".to_string(),
            result: Some(result_value),
            error: None,
            id: Some(id),
        }),
        Err(error) => Some(RpcResponse {
            jsonrpc: "2.0".to_string(),
            result: None,
            error: Some(error),
            id: Some(id),
        }),
    }
}

/// The sidebar listing: every building group in traversal order.
fn handle_list_buildings(registry: &BuildingRegistry) -> Result<serde_json::Value, RpcError> {
    Ok(serde_json::json!({
        "buildings": registry
            .iter()
            .map(|group| serde_json::json!({
                "id": group.id,
                "name": group.display_name,
                "parts": group.members.len(),
            }))
            .collect::<Vec<_>>()
    }))
}

fn handle_fly_to_building(
    params: &serde_json::Value,
    fly_building_events: &mut EventWriter<FlyToBuilding>,
) -> Result<serde_json::Value, RpcError> {
    #[derive(Deserialize)]
    struct FlyToBuildingParams {
        id: String,
    }

    let fly_params = serde_json::from_value::<FlyToBuildingParams>(params.clone())
        .map_err(|_| RpcError::invalid_params("Expected 'id' parameter"))?;

    fly_building_events.write(FlyToBuilding {
        id: fly_params.id.clone(),
    });
    Ok(serde_json::json!({ "success": true, "id": fly_params.id }))
}

fn handle_fly_to_part(
    params: &serde_json::Value,
    fly_part_events: &mut EventWriter<FlyToPart>,
) -> Result<serde_json::Value, RpcError> {
    #[derive(Deserialize)]
    struct FlyToPartParams {
        building: String,
        index: usize,
    }

    let fly_params = serde_json::from_value::<FlyToPartParams>(params.clone())
        .map_err(|_| RpcError::invalid_params("Expected 'building' and 'index' parameters"))?;

    fly_part_events.write(FlyToPart {
        building: fly_params.building,
        index: fly_params.index,
    });
    Ok(serde_json::json!({ "success": true }))
}

fn handle_camera_move(
    params: &serde_json::Value,
    pad_events: &mut EventWriter<PadMove>,
) -> Result<serde_json::Value, RpcError> {
    #[derive(Deserialize)]
    struct CameraMoveParams {
        direction: String,
    }

    let move_params = serde_json::from_value::<CameraMoveParams>(params.clone())
        .map_err(|_| RpcError::invalid_params("Expected 'direction' parameter"))?;

    let pad_move = PadMove::from_string(&move_params.direction).ok_or_else(|| {
        RpcError::invalid_params(&format!("Unknown direction: {}", move_params.direction))
    })?;

    pad_events.write(pad_move);
    Ok(serde_json::json!({ "success": true, "direction": move_params.direction }))
}

/// Stream popup state to the embedding page whenever it changes.
fn notify_popup_changed(
    popup: Res<ActivePopup>,
    selection: Res<SelectionState>,
    mut rpc_interface: ResMut<WebRpcInterface>,
) {
    let mut params = match &popup.0 {
        Some(popup) => popup.to_notification(),
        None => serde_json::json!({ "visible": false }),
    };
    if let Some(object) = params.as_object_mut() {
        let _ = object.insert(
            "selected_id".to_string(),
            serde_json::json!(selection.selected_id),
        );
    }
    rpc_interface.send_notification("popup_changed", params);
}

/// Create standardized error response with optional data payload.
fn create_error_response(
    id: serde_json::Value,
    code: i32,
    message: &str,
    data: Option<serde_json::Value>,
) -> RpcResponse {
    RpcResponse {
        jsonrpc: "2.0".to_string(),
        result: None,
        error: Some(RpcError {
            code,
            message: message.to_string(),
            data,
        }),
        id: Some(id),
    }
}

/// Send queued notifications and responses to the embedding page.
fn send_outgoing_messages(mut rpc_interface: ResMut<WebRpcInterface>) {
    // Send notifications first.
    for notification in rpc_interface.outgoing_notifications.drain(..) {
        send_message_to_parent(&notification);
    }

    // Send responses second to maintain order.
    for response in rpc_interface.outgoing_responses.drain(..) {
        send_message_to_parent(&response);
    }
}

/// Send serialized message to the parent window (embedding page).
fn send_message_to_parent<T: Serialize>(message: &T) {
    #[cfg(target_arch = "wasm32")]
    {
        match serde_json::to_string(message) {
            Ok(json) => {
                if let Some(window) = window() {
                    if let Some(parent) = window.parent().ok().flatten() {
                        if let Err(e) = parent.post_message(&JsValue::from_str(&json), "*") {
                            error!("Failed to send message to parent: {:?}", e);
                        }
                    } else {
                        warn!("No parent window available for message transmission");
                    }
                } else {
                    error!("Window object not available");
                }
            }
            Err(e) => {
                error!("Failed to serialize message: {}", e);
            }
        }
    }

    #[cfg(not(target_arch = "wasm32"))]
    {
        // No-op for non-WASM targets.
        let _ = message;
    }
}

/// Standard RPC error codes and constructors.
impl RpcError {
    pub fn invalid_params(message: &str) -> Self {
        Self {
            code: -32602,
            message: message.to_string(),
            data: None,
        }
    }

    pub fn internal_error(message: &str) -> Self {
        Self {
            code: -32603,
            message: message.to_string(),
            data: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn requests_without_ids_are_notifications() {
        let request: RpcRequest = serde_json::from_str(
            r#"{ "jsonrpc": "2.0", "method": "dismiss_popup", "params": {} }"#,
        )
        .unwrap();
        assert!(request.id.is_none());
    }

    #[test]
    fn error_constructors_use_standard_codes() {
        assert_eq!(RpcError::invalid_params("bad").code, -32602);
        assert_eq!(RpcError::internal_error("boom").code, -32603);
    }
}
