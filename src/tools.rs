// Tool catalog: names, descriptions, and input schemas for the time tools.
use serde_json::json;

const DEFAULT_FORMAT_HELP: &str =
    "strftime-style format of the input string (default: '%Y-%m-%d %H:%M:%S')";

fn annotations(title: &str) -> serde_json::Value {
    json!({
        "title": title,
        "readOnlyHint": true,
        "destructiveHint": false,
        "idempotentHint": false,
        "openWorldHint": false
    })
}

pub fn get_tools_description_json() -> serde_json::Value {
    json!([
        {
            "name": "get_current_time",
            "description": "Get the current date and time, optionally in a specific timezone",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "tz": {
                        "type": "string",
                        "description": "IANA timezone name (e.g., 'America/New_York', 'UTC'). Defaults to local time"
                    }
                }
            },
            "annotations": annotations("Get Current Time")
        },
        {
            "name": "get_timezone_info",
            "description": "Get current offset, abbreviation and local time for a timezone",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "tz": {
                        "type": "string",
                        "description": "IANA timezone name (e.g., 'America/New_York', 'Europe/London')"
                    }
                },
                "required": ["tz"]
            },
            "annotations": annotations("Get Timezone Info")
        },
        {
            "name": "list_timezones",
            "description": "List available IANA timezones, optionally filtered by text",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "filter_text": {
                        "type": "string",
                        "description": "Case-insensitive substring to filter timezone names"
                    }
                }
            },
            "annotations": annotations("List Timezones")
        },
        {
            "name": "parse_datetime",
            "description": "Parse a date/time string and return its components",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "date_string": {
                        "type": "string",
                        "description": "The date/time string to parse"
                    },
                    "format_string": {
                        "type": "string",
                        "description": DEFAULT_FORMAT_HELP
                    }
                },
                "required": ["date_string"]
            },
            "annotations": annotations("Parse Datetime")
        },
        {
            "name": "compare_times",
            "description": "Compare two datetime strings and return the signed difference",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "time1": {
                        "type": "string",
                        "description": "First datetime string"
                    },
                    "time2": {
                        "type": "string",
                        "description": "Second datetime string"
                    },
                    "format_string": {
                        "type": "string",
                        "description": DEFAULT_FORMAT_HELP
                    }
                },
                "required": ["time1", "time2"]
            },
            "annotations": annotations("Compare Times")
        },
        {
            "name": "add_time_delta",
            "description": "Shift a datetime by signed days/hours/minutes/seconds",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "base_time": {
                        "type": "string",
                        "description": "The starting datetime string"
                    },
                    "days": { "type": "integer", "description": "Days to add (may be negative)" },
                    "hours": { "type": "integer", "description": "Hours to add (may be negative)" },
                    "minutes": { "type": "integer", "description": "Minutes to add (may be negative)" },
                    "seconds": { "type": "integer", "description": "Seconds to add (may be negative)" },
                    "format_string": {
                        "type": "string",
                        "description": DEFAULT_FORMAT_HELP
                    }
                },
                "required": ["base_time"]
            },
            "annotations": annotations("Add Time Delta")
        },
        {
            "name": "is_valid_datetime",
            "description": "Check whether a string is a valid datetime in the given format",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "date_string": {
                        "type": "string",
                        "description": "The date/time string to validate"
                    },
                    "format_string": {
                        "type": "string",
                        "description": DEFAULT_FORMAT_HELP
                    }
                },
                "required": ["date_string"]
            },
            "annotations": annotations("Is Valid Datetime")
        },
        {
            "name": "unix_to_datetime",
            "description": "Convert a Unix timestamp (seconds since epoch) to a datetime",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "timestamp": {
                        "type": "integer",
                        "description": "Unix timestamp in seconds"
                    },
                    "tz": {
                        "type": "string",
                        "description": "IANA timezone name for the output. Defaults to local time"
                    }
                },
                "required": ["timestamp"]
            },
            "annotations": annotations("Unix To Datetime")
        }
    ])
}
