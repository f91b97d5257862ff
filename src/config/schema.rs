use serde_json::{json, Value};
use std::sync::LazyLock;

pub static CONFIG_SCHEMA: LazyLock<Value> = LazyLock::new(|| {
    json!({
        "$schema": "http://json-schema.org/draft-07/schema#",
        "type": "object",
        "properties": {
            "scan": {
                "type": "object",
                "properties": {
                    "max_hosts": { "type": "integer", "minimum": 1 },
                    "stage_pause_ms": { "type": "integer", "minimum": 0 },
                    "kill_grace_ms": { "type": "integer", "minimum": 0 },
                    "output_limit_bytes": { "type": "integer", "minimum": 1 },
                    "extra_path": { "type": "array", "items": { "type": "string" } }
                }
            },
            "tools": {
                "type": "object",
                "properties": {
                    "enumerator": { "$ref": "#/$defs/tool" },
                    "port_prober": { "$ref": "#/$defs/tool" },
                    "vuln_matcher": { "$ref": "#/$defs/tool" },
                    "web_fingerprinter": { "$ref": "#/$defs/tool" }
                }
            },
            "jobs": {
                "type": "object",
                "properties": {
                    "retention_secs": { "type": "integer", "minimum": 0 },
                    "cleanup_interval_secs": { "type": "integer", "minimum": 0 }
                }
            },
            "notifications": {
                "type": "object",
                "properties": {
                    "webhook_url": { "type": "string", "format": "uri" },
                    "alert_score_threshold": { "type": "integer", "minimum": 0, "maximum": 100 },
                    "timeout_secs": { "type": "integer", "minimum": 1 }
                }
            },
            "server": {
                "type": "object",
                "properties": {
                    "host": { "type": "string" },
                    "port": { "type": "integer", "minimum": 1, "maximum": 65535 }
                }
            },
            "storage": {
                "type": "object",
                "properties": {
                    "path": { "type": "string" }
                }
            }
        },
        "$defs": {
            "tool": {
                "type": "object",
                "properties": {
                    "program": { "type": "string" },
                    "timeout_secs": { "type": "integer", "minimum": 1 },
                    "max_time_secs": { "type": "integer", "minimum": 1 }
                }
            }
        }
    })
});
