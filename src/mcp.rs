//! img2palette MCP (Model Context Protocol) server
//!
//! This is a standalone MCP server binary that exposes palette extraction
//! over JSON-RPC on stdin/stdout, allowing AI assistants to pull the dominant
//! colors out of image files. Logs go to stderr.

use anyhow::{Context, Result};
use img2palette::{
    extract_palette_from_path, ExtractOptions, DEFAULT_PALETTE_SIZE, MAX_UPLOAD_SIZE,
};
use log::{info, warn};
use serde_json::{json, Value};
use std::io::{self, BufRead, Write};
use std::path::Path;

const PARSE_ERROR: i32 = -32700;
const METHOD_NOT_FOUND: i32 = -32601;
const INVALID_PARAMS: i32 = -32602;
const EXTRACTION_FAILED: i32 = -32000;

/// MCP Request structure
#[derive(Debug, serde::Deserialize)]
struct McpRequest {
    #[serde(default)]
    #[allow(dead_code)]
    jsonrpc: String,
    /// Absent for notifications, which get no response. An explicit `null` is kept.
    #[serde(default, deserialize_with = "deserialize_present")]
    id: Option<Value>,
    method: String,
    #[serde(default)]
    params: Value,
}

fn deserialize_present<'de, D>(deserializer: D) -> std::result::Result<Option<Value>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    <Value as serde::Deserialize>::deserialize(deserializer).map(Some)
}

#[derive(Debug, serde::Deserialize)]
struct ToolCallParams {
    name: String,
    #[serde(default)]
    arguments: Value,
}

#[derive(Debug, serde::Deserialize)]
struct ExtractArgs {
    input_path: String,
    palette_size: Option<usize>,
    max_width: Option<u32>,
    quantization_step: Option<u8>,
    transparency_threshold: Option<u16>,
}

/// MCP Response structure
#[derive(Debug, serde::Serialize)]
struct McpResponse {
    jsonrpc: String,
    id: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<McpError>,
}

#[derive(Debug, serde::Serialize)]
struct McpError {
    code: i32,
    message: String,
}

impl McpResponse {
    fn success(id: Value, result: Value) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: Some(result),
            error: None,
        }
    }

    fn failure(id: Value, code: i32, message: impl Into<String>) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: None,
            error: Some(McpError {
                code,
                message: message.into(),
            }),
        }
    }
}

/// Process-wide settings, read once from the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
struct ServerConfig {
    /// `IMG2PALETTE_MAX_UPLOAD`, in bytes
    max_upload: u64,
    /// `IMG2PALETTE_PALETTE_SIZE`
    palette_size: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            max_upload: MAX_UPLOAD_SIZE,
            palette_size: DEFAULT_PALETTE_SIZE,
        }
    }
}

impl ServerConfig {
    fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            max_upload: parse_setting(&lookup, "IMG2PALETTE_MAX_UPLOAD", defaults.max_upload),
            palette_size: parse_setting(
                &lookup,
                "IMG2PALETTE_PALETTE_SIZE",
                defaults.palette_size,
            ),
        }
    }
}

fn parse_setting<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> T
where
    T: std::str::FromStr + std::fmt::Display,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!("ignoring invalid {}={:?}, using {}", key, raw, default);
            default
        }),
        None => default,
    }
}

struct Img2PaletteMcpServer {
    config: ServerConfig,
}

impl Img2PaletteMcpServer {
    fn new(config: ServerConfig) -> Self {
        Self { config }
    }

    fn handle_initialize(&self, id: Value) -> McpResponse {
        McpResponse::success(
            id,
            json!({
                "protocolVersion": "2024-11-05",
                "serverInfo": {
                    "name": "img2palette",
                    "version": env!("CARGO_PKG_VERSION")
                },
                "capabilities": {
                    "tools": {
                        "listChanged": false
                    }
                }
            }),
        )
    }

    fn handle_tools_list(&self, id: Value) -> McpResponse {
        McpResponse::success(
            id,
            json!({
                "tools": [
                    {
                        "name": "extract_palette",
                        "description": "Extract the dominant colors of a PNG or JPEG image. The image is downscaled, near-transparent pixels are skipped, channels are quantized, and the most frequent colors are returned with their pixel counts.",
                        "inputSchema": {
                            "type": "object",
                            "properties": {
                                "input_path": {
                                    "type": "string",
                                    "description": "Path to the input image file (PNG or JPEG)"
                                },
                                "palette_size": {
                                    "type": "integer",
                                    "description": "Maximum number of colors to return (default: 6).",
                                    "minimum": 0,
                                    "default": self.config.palette_size
                                },
                                "max_width": {
                                    "type": "integer",
                                    "description": "Images wider than this are downscaled before sampling (default: 200, 0 disables).",
                                    "minimum": 0,
                                    "default": 200
                                },
                                "quantization_step": {
                                    "type": "integer",
                                    "description": "Channels are rounded down to multiples of this (1-255, default: 32). Smaller steps keep more distinct shades.",
                                    "minimum": 1,
                                    "maximum": 255,
                                    "default": 32
                                },
                                "transparency_threshold": {
                                    "type": "integer",
                                    "description": "Pixels with alpha below this on a 16-bit scale are ignored (default: 32768).",
                                    "minimum": 0,
                                    "maximum": 65535,
                                    "default": 32768
                                }
                            },
                            "required": ["input_path"]
                        }
                    },
                    {
                        "name": "health",
                        "description": "Report whether the palette service is up.",
                        "inputSchema": {
                            "type": "object",
                            "properties": {}
                        }
                    }
                ]
            }),
        )
    }

    fn handle_tools_call(&self, params: ToolCallParams, id: Value) -> McpResponse {
        match params.name.as_str() {
            "extract_palette" => {
                let args: ExtractArgs = match serde_json::from_value(params.arguments) {
                    Ok(args) => args,
                    Err(e) => {
                        return McpResponse::failure(
                            id,
                            INVALID_PARAMS,
                            format!("Invalid arguments: {}", e),
                        );
                    }
                };

                let defaults = ExtractOptions::default();
                let options = ExtractOptions {
                    max_width: args.max_width.unwrap_or(defaults.max_width),
                    transparency_threshold: args
                        .transparency_threshold
                        .unwrap_or(defaults.transparency_threshold),
                    quantization_step: args
                        .quantization_step
                        .unwrap_or(defaults.quantization_step),
                    palette_size: args.palette_size.unwrap_or(self.config.palette_size),
                    max_upload: self.config.max_upload,
                };

                info!("Processing image: {}", args.input_path);
                let palette = match extract_palette_from_path(Path::new(&args.input_path), &options)
                {
                    Ok(palette) => palette,
                    Err(e) => {
                        warn!("extraction failed for {}: {}", args.input_path, e);
                        return McpResponse::failure(id, EXTRACTION_FAILED, e.to_string());
                    }
                };

                match serde_json::to_string(&palette) {
                    Ok(text) => McpResponse::success(
                        id,
                        json!({
                            "content": [
                                {
                                    "type": "text",
                                    "text": text
                                }
                            ]
                        }),
                    ),
                    Err(e) => McpResponse::failure(id, EXTRACTION_FAILED, e.to_string()),
                }
            }
            "health" => McpResponse::success(
                id,
                json!({
                    "content": [
                        {
                            "type": "text",
                            "text": json!({"status": "healthy", "service": "img2palette"}).to_string()
                        }
                    ]
                }),
            ),
            _ => McpResponse::failure(
                id,
                METHOD_NOT_FOUND,
                format!("Unknown tool: {}", params.name),
            ),
        }
    }

    /// Handle one line of input; `None` when nothing should be written back.
    fn handle_line(&self, line: &str) -> Option<McpResponse> {
        let req = match serde_json::from_str::<McpRequest>(line) {
            Ok(req) => req,
            Err(e) => {
                return Some(McpResponse::failure(
                    Value::Null,
                    PARSE_ERROR,
                    format!("Parse error: {}", e),
                ));
            }
        };

        let id = req.id?;
        let response = match req.method.as_str() {
            "initialize" => self.handle_initialize(id),
            "ping" => McpResponse::success(id, json!({})),
            "tools/list" => self.handle_tools_list(id),
            "tools/call" => match serde_json::from_value::<ToolCallParams>(req.params) {
                Ok(params) => self.handle_tools_call(params, id),
                Err(e) => McpResponse::failure(id, INVALID_PARAMS, format!("Invalid params: {}", e)),
            },
            other => McpResponse::failure(id, METHOD_NOT_FOUND, format!("Unknown method: {}", other)),
        };
        Some(response)
    }

    fn run(&self) -> Result<()> {
        let stdin = io::stdin();
        let stdout = io::stdout();
        let mut stdout_lock = stdout.lock();

        for line in stdin.lock().lines() {
            let line = line.context("failed to read request")?;
            if line.trim().is_empty() {
                continue;
            }

            if let Some(response) = self.handle_line(&line) {
                let response_json =
                    serde_json::to_string(&response).context("failed to encode response")?;
                writeln!(stdout_lock, "{}", response_json)?;
                stdout_lock.flush()?;
            }
        }
        Ok(())
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = ServerConfig::from_env();
    info!(
        "img2palette MCP server starting (max upload: {} MB, default palette size: {})",
        config.max_upload >> 20,
        config.palette_size
    );

    Img2PaletteMcpServer::new(config).run()
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};
    use std::path::PathBuf;

    fn server() -> Img2PaletteMcpServer {
        Img2PaletteMcpServer::new(ServerConfig::default())
    }

    fn call(server: &Img2PaletteMcpServer, request: Value) -> Value {
        let response = server
            .handle_line(&request.to_string())
            .expect("request with id should get a response");
        serde_json::to_value(response).unwrap()
    }

    fn write_test_png(name: &str) -> PathBuf {
        let path = std::env::temp_dir().join(name);
        let mut img = RgbaImage::from_pixel(4, 4, Rgba([0, 0, 255, 255]));
        img.put_pixel(0, 0, Rgba([255, 0, 0, 255]));
        img.save(&path).expect("Failed to save test image");
        path
    }

    #[test]
    fn test_initialize_reports_server_info() {
        let response = call(&server(), json!({"jsonrpc": "2.0", "id": 1, "method": "initialize", "params": {}}));
        assert_eq!(response["id"], 1);
        assert_eq!(response["result"]["serverInfo"]["name"], "img2palette");
    }

    #[test]
    fn test_tools_list_names_both_tools() {
        let response = call(&server(), json!({"jsonrpc": "2.0", "id": 2, "method": "tools/list"}));
        let names: Vec<&str> = response["result"]["tools"]
            .as_array()
            .unwrap()
            .iter()
            .map(|t| t["name"].as_str().unwrap())
            .collect();
        assert_eq!(names, vec!["extract_palette", "health"]);
    }

    #[test]
    fn test_health_tool() {
        let response = call(
            &server(),
            json!({"jsonrpc": "2.0", "id": 3, "method": "tools/call", "params": {"name": "health"}}),
        );
        let text = response["result"]["content"][0]["text"].as_str().unwrap();
        let body: Value = serde_json::from_str(text).unwrap();
        assert_eq!(body["status"], "healthy");
    }

    #[test]
    fn test_extract_palette_tool() {
        let path = write_test_png("img2palette_mcp_extract.png");
        let response = call(
            &server(),
            json!({
                "jsonrpc": "2.0",
                "id": 4,
                "method": "tools/call",
                "params": {"name": "extract_palette", "arguments": {"input_path": path.to_str().unwrap()}}
            }),
        );

        let text = response["result"]["content"][0]["text"].as_str().unwrap();
        let body: Value = serde_json::from_str(text).unwrap();
        assert_eq!(body["colors"][0]["hex"], "#0000e0");
        assert_eq!(body["colors"][0]["count"], 15);
        assert_eq!(body["colors"][1]["hex"], "#e00000");
        assert_eq!(body["colors"][1]["rgb"]["r"], 224);

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_extract_palette_honours_palette_size() {
        let path = write_test_png("img2palette_mcp_size.png");
        let response = call(
            &server(),
            json!({
                "jsonrpc": "2.0",
                "id": 5,
                "method": "tools/call",
                "params": {"name": "extract_palette", "arguments": {"input_path": path.to_str().unwrap(), "palette_size": 1}}
            }),
        );

        let text = response["result"]["content"][0]["text"].as_str().unwrap();
        let body: Value = serde_json::from_str(text).unwrap();
        assert_eq!(body["colors"].as_array().unwrap().len(), 1);

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_extract_palette_rejects_oversized_file() {
        let path = write_test_png("img2palette_mcp_oversized.png");
        let server = Img2PaletteMcpServer::new(ServerConfig {
            max_upload: 8,
            ..Default::default()
        });
        let response = call(
            &server,
            json!({
                "jsonrpc": "2.0",
                "id": 6,
                "method": "tools/call",
                "params": {"name": "extract_palette", "arguments": {"input_path": path.to_str().unwrap()}}
            }),
        );

        assert_eq!(response["error"]["code"], EXTRACTION_FAILED);
        assert!(response["error"]["message"].as_str().unwrap().contains("too large"));

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_missing_input_path_is_invalid_params() {
        let response = call(
            &server(),
            json!({"jsonrpc": "2.0", "id": 7, "method": "tools/call", "params": {"name": "extract_palette", "arguments": {}}}),
        );
        assert_eq!(response["error"]["code"], INVALID_PARAMS);
    }

    #[test]
    fn test_unknown_tool_and_method() {
        let response = call(
            &server(),
            json!({"jsonrpc": "2.0", "id": 8, "method": "tools/call", "params": {"name": "nope"}}),
        );
        assert_eq!(response["error"]["code"], METHOD_NOT_FOUND);

        let response = call(&server(), json!({"jsonrpc": "2.0", "id": 9, "method": "resources/list"}));
        assert_eq!(response["error"]["code"], METHOD_NOT_FOUND);
    }

    #[test]
    fn test_notifications_get_no_response() {
        let line = json!({"jsonrpc": "2.0", "method": "notifications/initialized"}).to_string();
        assert!(server().handle_line(&line).is_none());
    }

    #[test]
    fn test_null_id_still_gets_response() {
        let response = call(&server(), json!({"jsonrpc": "2.0", "id": null, "method": "ping"}));
        assert_eq!(response["id"], Value::Null);
        assert_eq!(response["result"], json!({}));
    }

    #[test]
    fn test_malformed_json_is_parse_error() {
        let response = server().handle_line("{not json").unwrap();
        let value = serde_json::to_value(response).unwrap();
        assert_eq!(value["error"]["code"], PARSE_ERROR);
        assert_eq!(value["id"], Value::Null);
    }

    #[test]
    fn test_config_from_lookup() {
        let config = ServerConfig::from_lookup(|key| match key {
            "IMG2PALETTE_MAX_UPLOAD" => Some("1024".to_string()),
            "IMG2PALETTE_PALETTE_SIZE" => Some("not a number".to_string()),
            _ => None,
        });
        assert_eq!(config.max_upload, 1024);
        assert_eq!(config.palette_size, DEFAULT_PALETTE_SIZE);

        assert_eq!(ServerConfig::from_lookup(|_| None), ServerConfig::default());
    }
}
